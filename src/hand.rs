//! Hand: three pieces drawn with replacement from the shape catalog.

use crate::drag::{Geometry, Point};
use crate::shapes::ShapeKind;
use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng as _};

/// Pieces per hand.
pub const HAND_SIZE: usize = 3;

/// A live piece in the tray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPiece {
    pub kind: ShapeKind,
    pub placed: bool,
    /// Resting centre in the tray (board-local).
    pub rest: Point,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hand {
    pieces: Vec<HandPiece>,
}

impl Hand {
    /// Hand with `kinds` laid out in tray slots 0..n.
    pub fn from_kinds(kinds: &[ShapeKind], geometry: &Geometry) -> Self {
        let pieces = kinds
            .iter()
            .enumerate()
            .map(|(slot, &kind)| HandPiece {
                kind,
                placed: false,
                rest: geometry.slot_center(slot),
            })
            .collect();
        Self { pieces }
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&HandPiece> {
        self.pieces.get(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HandPiece> {
        self.pieces.iter()
    }

    /// (slot, piece) for every piece not yet placed.
    pub fn unplaced(&self) -> impl Iterator<Item = (usize, &HandPiece)> {
        self.pieces.iter().enumerate().filter(|(_, p)| !p.placed)
    }

    /// True when a new hand should be dealt: empty, or every piece placed.
    pub fn is_exhausted(&self) -> bool {
        self.pieces.iter().all(|p| p.placed)
    }

    pub fn mark_placed(&mut self, slot: usize) {
        if let Some(p) = self.pieces.get_mut(slot) {
            p.placed = true;
        }
    }
}

/// Uniform draw with replacement. Seeded for reproducible sessions.
#[derive(Debug, Clone)]
pub struct HandGenerator {
    rng: StdRng,
}

impl HandGenerator {
    /// The random seed comes from the OS unless `seed` is given.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self { rng }
    }

    pub fn next_kind(&mut self) -> ShapeKind {
        ShapeKind::ALL[self.rng.random_range(0..ShapeKind::ALL.len())]
    }

    pub fn deal(&mut self, geometry: &Geometry) -> Hand {
        let kinds: [ShapeKind; HAND_SIZE] = std::array::from_fn(|_| self.next_kind());
        Hand::from_kinds(&kinds, geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deal_lays_out_three_slots() {
        let g = Geometry::default();
        let hand = HandGenerator::new(Some(7)).deal(&g);
        assert_eq!(hand.len(), HAND_SIZE);
        for (slot, piece) in hand.iter().enumerate() {
            assert!(!piece.placed);
            assert_eq!(piece.rest, g.slot_center(slot));
        }
    }

    #[test]
    fn test_same_seed_same_hands() {
        let g = Geometry::default();
        let mut a = HandGenerator::new(Some(42));
        let mut b = HandGenerator::new(Some(42));
        for _ in 0..10 {
            assert_eq!(a.deal(&g), b.deal(&g));
        }
    }

    #[test]
    fn test_draw_covers_whole_catalog() {
        let mut generator = HandGenerator::new(Some(1));
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            seen.insert(generator.next_kind());
        }
        assert_eq!(seen.len(), ShapeKind::ALL.len());
    }

    #[test]
    fn test_exhausted_only_when_all_placed() {
        let g = Geometry::default();
        assert!(Hand::default().is_exhausted());
        let mut hand = Hand::from_kinds(&[ShapeKind::Mono; 3], &g);
        assert!(!hand.is_exhausted());
        hand.mark_placed(0);
        hand.mark_placed(2);
        assert!(!hand.is_exhausted());
        assert_eq!(hand.unplaced().map(|(i, _)| i).collect::<Vec<_>>(), vec![1]);
        hand.mark_placed(1);
        assert!(hand.is_exhausted());
    }
}
