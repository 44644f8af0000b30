//! Shape catalog: the seven fixed polyomino masks and their colour slots.

/// Row-major occupancy mask; non-zero entries are covered cells.
pub type Mask = &'static [&'static [u8]];

/// The fixed set of pieces a hand is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Square,
    IBeam,
    Tromino,
    Tee,
    Skew,
    Mono,
    Ell,
}

impl ShapeKind {
    pub const ALL: [Self; 7] = [
        Self::Square,
        Self::IBeam,
        Self::Tromino,
        Self::Tee,
        Self::Skew,
        Self::Mono,
        Self::Ell,
    ];

    pub fn mask(&self) -> Mask {
        match self {
            Self::Square => &[&[1, 1], &[1, 1]],
            Self::IBeam => &[&[1, 1, 1, 1]],
            Self::Tromino => &[&[1, 1, 1]],
            Self::Tee => &[&[1, 1, 1], &[0, 1, 0]],
            Self::Skew => &[&[1, 1, 0], &[0, 1, 1]],
            Self::Mono => &[&[1]],
            Self::Ell => &[&[1, 0], &[1, 0], &[1, 1]],
        }
    }

    /// Colour slot 0..7 for `Theme::piece_color`.
    pub fn color_index(&self) -> u8 {
        match self {
            Self::Square => 0,
            Self::IBeam => 1,
            Self::Tromino => 2,
            Self::Tee => 3,
            Self::Skew => 4,
            Self::Mono => 5,
            Self::Ell => 6,
        }
    }

    /// (columns, rows) of the mask's bounding box.
    pub fn dims(&self) -> (usize, usize) {
        let mask = self.mask();
        (mask.first().map_or(0, |row| row.len()), mask.len())
    }

    /// Number of board cells this shape covers.
    pub fn cell_count(&self) -> usize {
        self.cells().count()
    }

    /// Covered (x, y) offsets relative to the mask's top-left.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        mask_cells(self.mask())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::IBeam => "I-beam",
            Self::Tromino => "tromino",
            Self::Tee => "T",
            Self::Skew => "S",
            Self::Mono => "mono",
            Self::Ell => "L",
        }
    }
}

/// Covered (x, y) offsets of an arbitrary mask.
pub fn mask_cells<'a>(mask: &'a [&'a [u8]]) -> impl Iterator<Item = (usize, usize)> + 'a {
    mask.iter().enumerate().flat_map(|(y, row)| {
        row.iter()
            .enumerate()
            .filter(|&(_, v)| *v != 0)
            .map(move |(x, _)| (x, y))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_cell_counts() {
        let counts: Vec<usize> = ShapeKind::ALL.iter().map(ShapeKind::cell_count).collect();
        assert_eq!(counts, vec![4, 4, 3, 4, 4, 1, 4]);
    }

    #[test]
    fn test_masks_are_rectangular() {
        for kind in ShapeKind::ALL {
            let (w, _) = kind.dims();
            assert!(kind.mask().iter().all(|row| row.len() == w), "{kind:?}");
        }
    }

    #[test]
    fn test_ell_dims_and_cells() {
        assert_eq!(ShapeKind::Ell.dims(), (2, 3));
        let cells: Vec<_> = ShapeKind::Ell.cells().collect();
        assert_eq!(cells, vec![(0, 0), (0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn test_colour_slots_are_distinct() {
        let mut slots: Vec<u8> = ShapeKind::ALL.iter().map(ShapeKind::color_index).collect();
        slots.sort_unstable();
        slots.dedup();
        assert_eq!(slots.len(), 7);
    }
}
