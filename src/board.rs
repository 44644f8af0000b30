//! Board: the 8×8 occupancy grid, placement validation and line clearing.

use crate::error::GameError;
use crate::shapes::mask_cells;

/// Board edge length in cells.
pub const BOARD_SIZE: usize = 8;

/// Single cell: empty or filled with a piece colour slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(u8),
}

impl Cell {
    #[inline]
    pub fn is_filled(self) -> bool {
        matches!(self, Self::Filled(_))
    }
}

/// Rows and columns emptied by one `clear_lines` pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearOutcome {
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
    /// Distinct (row, col, colour) cells emptied; intersections appear once.
    pub cells: Vec<(usize, usize, u8)>,
}

impl ClearOutcome {
    /// Full rows plus full columns; an intersection counts for both.
    pub fn lines(&self) -> u32 {
        (self.rows.len() + self.cols.len()) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.cols.is_empty()
    }
}

/// Grid indexed `[row][col]`, row 0 on top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    #[inline]
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_some_and(Cell::is_filled)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell; BOARD_SIZE]> {
        self.cells.iter()
    }

    pub fn occupied_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|c| c.is_filled())
            .count()
    }

    /// True if every covered cell of `mask` at origin (gx, gy) is on the board and empty.
    pub fn can_place(&self, mask: &[&[u8]], gx: i32, gy: i32) -> bool {
        for (x, y) in mask_cells(mask) {
            let row = gy + y as i32;
            let col = gx + x as i32;
            if row < 0 || col < 0 || row >= BOARD_SIZE as i32 || col >= BOARD_SIZE as i32 {
                return false;
            }
            if self.is_occupied(row as usize, col as usize) {
                return false;
            }
        }
        true
    }

    /// Fill every covered cell with `color`. Returns the number of cells written.
    /// Nothing is written when the placement does not validate.
    pub fn place(
        &mut self,
        mask: &[&[u8]],
        color: u8,
        gx: i32,
        gy: i32,
    ) -> Result<usize, GameError> {
        if !self.can_place(mask, gx, gy) {
            return Err(GameError::InvalidPlacement { gx, gy });
        }
        let mut written = 0;
        for (x, y) in mask_cells(mask) {
            self.cells[(gy + y as i32) as usize][(gx + x as i32) as usize] = Cell::Filled(color);
            written += 1;
        }
        Ok(written)
    }

    pub fn full_rows(&self) -> Vec<usize> {
        (0..BOARD_SIZE)
            .filter(|&r| self.cells[r].iter().all(|c| c.is_filled()))
            .collect()
    }

    pub fn full_cols(&self) -> Vec<usize> {
        (0..BOARD_SIZE)
            .filter(|&c| self.cells.iter().all(|row| row[c].is_filled()))
            .collect()
    }

    /// Find all full rows and columns first, then empty them in one pass.
    pub fn clear_lines(&mut self) -> ClearOutcome {
        let rows = self.full_rows();
        let cols = self.full_cols();
        let mut cells = Vec::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                if !(rows.contains(&row) || cols.contains(&col)) {
                    continue;
                }
                if let Cell::Filled(color) = self.cells[row][col] {
                    self.cells[row][col] = Cell::Empty;
                    cells.push((row, col, color));
                }
            }
        }
        ClearOutcome { rows, cols, cells }
    }

    #[cfg(test)]
    pub(crate) fn fill(&mut self, row: usize, col: usize, color: u8) {
        self.cells[row][col] = Cell::Filled(color);
    }

    #[cfg(test)]
    pub(crate) fn empty(&mut self, row: usize, col: usize) {
        self.cells[row][col] = Cell::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapeKind;

    fn full_board() -> Board {
        let mut b = Board::new();
        for r in 0..BOARD_SIZE {
            for c in 0..BOARD_SIZE {
                b.fill(r, c, 0);
            }
        }
        b
    }

    #[test]
    fn test_can_place_rejects_out_of_bounds() {
        let b = Board::new();
        let mono = ShapeKind::Mono.mask();
        assert!(!b.can_place(mono, -1, 0));
        assert!(!b.can_place(mono, 0, -1));
        assert!(!b.can_place(mono, 8, 0));
        assert!(!b.can_place(mono, 0, 8));
        assert!(b.can_place(mono, 7, 7));
        // I-beam overhangs from column 5 onward.
        assert!(b.can_place(ShapeKind::IBeam.mask(), 4, 0));
        assert!(!b.can_place(ShapeKind::IBeam.mask(), 5, 0));
    }

    #[test]
    fn test_can_place_ignores_empty_mask_cells() {
        let mut b = Board::new();
        // Tee's bottom-left corner is a hole in the mask.
        b.fill(1, 0, 3);
        assert!(b.can_place(ShapeKind::Tee.mask(), 0, 0));
        b.fill(1, 1, 3);
        assert!(!b.can_place(ShapeKind::Tee.mask(), 0, 0));
    }

    #[test]
    fn test_place_then_same_origin_is_rejected() {
        let mut b = Board::new();
        let mask = ShapeKind::Skew.mask();
        assert_eq!(b.place(mask, 4, 2, 3), Ok(4));
        assert!(!b.can_place(mask, 2, 3));
        assert_eq!(
            b.place(mask, 4, 2, 3),
            Err(GameError::InvalidPlacement { gx: 2, gy: 3 })
        );
        assert_eq!(b.occupied_count(), 4);
    }

    #[test]
    fn test_place_writes_colour() {
        let mut b = Board::new();
        b.place(ShapeKind::Ell.mask(), 6, 0, 0).unwrap();
        assert_eq!(b.get(2, 1), Some(Cell::Filled(6)));
        assert_eq!(b.get(0, 1), Some(Cell::Empty));
    }

    #[test]
    fn test_clear_row_and_column_share_cell_once() {
        let mut b = Board::new();
        for i in 0..BOARD_SIZE {
            b.fill(3, i, 1);
            b.fill(i, 5, 2);
        }
        b.fill(0, 0, 1);
        let outcome = b.clear_lines();
        assert_eq!(outcome.rows, vec![3]);
        assert_eq!(outcome.cols, vec![5]);
        assert_eq!(outcome.lines(), 2);
        assert_eq!(outcome.cells.len(), 15);
        assert_eq!(b.occupied_count(), 1);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut b = Board::new();
        for c in 0..BOARD_SIZE {
            b.fill(7, c, 0);
        }
        assert_eq!(b.clear_lines().lines(), 1);
        let before = b.clone();
        let second = b.clear_lines();
        assert!(second.is_empty());
        assert!(second.cells.is_empty());
        assert_eq!(b, before);
    }

    #[test]
    fn test_full_board_clears_everything() {
        let mut b = full_board();
        let outcome = b.clear_lines();
        assert_eq!(outcome.lines(), 16);
        assert_eq!(outcome.cells.len(), 64);
        assert_eq!(b.occupied_count(), 0);
    }

    #[test]
    fn test_nothing_fits_on_full_board_until_a_cell_opens() {
        let mut b = full_board();
        assert!(!b.can_place(ShapeKind::Mono.mask(), 4, 4));
        b.empty(4, 4);
        assert!(b.can_place(ShapeKind::Mono.mask(), 4, 4));
        assert!(!b.can_place(ShapeKind::Mono.mask(), 3, 4));
    }
}
