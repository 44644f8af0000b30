//! Drag interaction: board-local geometry and the Idle/Dragging state machine.

use crate::board::BOARD_SIZE;
use crate::shapes::ShapeKind;

/// Gap between board cells in board-local units.
pub const CELL_GAP: f32 = 4.0;
/// The dragged piece is drawn this far above the pointer so it stays visible.
pub const DRAG_LIFT: f32 = 110.0;
/// Half-size of the square hit region around a resting piece.
pub const HIT_RADIUS: f32 = 45.0;
/// Canvas height as a multiple of its width (board on top, hand tray below).
const CANVAS_ASPECT: f32 = 1.45;

/// Board-local coordinate; origin at the canvas top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Canvas layout: cell pitch, drag lift, hit region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub cell_size: f32,
    pub gap: f32,
    pub lift: f32,
    pub hit_radius: f32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::for_board_width(450.0)
    }
}

impl Geometry {
    /// Square board of `width` units with the hand tray underneath.
    pub fn for_board_width(width: f32) -> Self {
        let n = BOARD_SIZE as f32;
        Self {
            canvas_width: width,
            canvas_height: width * CANVAS_ASPECT,
            cell_size: (width - CELL_GAP * (n + 1.0)) / n,
            gap: CELL_GAP,
            lift: DRAG_LIFT,
            hit_radius: HIT_RADIUS,
        }
    }

    /// Distance between the top-left corners of neighbouring cells.
    #[inline]
    pub fn pitch(&self) -> f32 {
        self.cell_size + self.gap
    }

    /// Top-left of board cell (col, row).
    pub fn cell_origin(&self, col: i32, row: i32) -> Point {
        Point::new(
            self.gap + col as f32 * self.pitch(),
            self.gap + row as f32 * self.pitch(),
        )
    }

    /// Centre of hand slot `slot` in the tray below the board.
    pub fn slot_center(&self, slot: usize) -> Point {
        let third = self.canvas_width / 3.0;
        Point::new(
            third * slot as f32 + self.canvas_width / 6.0,
            self.canvas_width + (self.canvas_height - self.canvas_width) / 1.8,
        )
    }

    /// True if `p` falls in the square hit region around `center`.
    pub fn hits(&self, center: Point, p: Point) -> bool {
        (p.x - center.x).abs() < self.hit_radius && (p.y - center.y).abs() < self.hit_radius
    }

    /// Nearest board origin (gx, gy) for a full-size piece centred at `center`.
    pub fn grid_offset(&self, kind: ShapeKind, center: Point) -> (i32, i32) {
        let (w, h) = kind.dims();
        let left = center.x - w as f32 * self.cell_size / 2.0;
        let top = center.y - h as f32 * self.cell_size / 2.0;
        (
            (left / self.pitch()).round() as i32,
            (top / self.pitch()).round() as i32,
        )
    }
}

/// Pointer interaction state. At most one piece is grabbed at a time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        slot: usize,
        /// Press position minus the piece centre at grab time.
        grab: Point,
        pointer: Point,
    },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    pub fn slot(&self) -> Option<usize> {
        match self {
            Self::Dragging { slot, .. } => Some(*slot),
            Self::Idle => None,
        }
    }

    pub fn grab(&mut self, slot: usize, press: Point, piece_center: Point) {
        *self = Self::Dragging {
            slot,
            grab: press - piece_center,
            pointer: press,
        };
    }

    /// Track the pointer while dragging; no-op when idle.
    pub fn track(&mut self, p: Point) {
        if let Self::Dragging { pointer, .. } = self {
            *pointer = p;
        }
    }

    /// Where the grabbed piece's centre is drawn: pointer minus grab offset, lifted.
    pub fn piece_center(&self, lift: f32) -> Option<Point> {
        match self {
            Self::Dragging { grab, pointer, .. } => {
                Some(*pointer - *grab - Point::new(0.0, lift))
            }
            Self::Idle => None,
        }
    }

    /// Back to idle; returns the slot and the drop centre if a piece was held.
    pub fn release(&mut self, lift: f32) -> Option<(usize, Point)> {
        let dropped = self.slot().zip(self.piece_center(lift));
        *self = Self::Idle;
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry_matches_board() {
        let g = Geometry::default();
        assert!((g.cell_size - 51.75).abs() < 1e-4);
        assert!((g.pitch() - 55.75).abs() < 1e-4);
        let last = g.cell_origin(7, 7);
        assert!((last.x + g.cell_size + g.gap - g.canvas_width).abs() < 1e-3);
    }

    #[test]
    fn test_slot_centres_split_tray_in_thirds() {
        let g = Geometry::default();
        assert_eq!(g.slot_center(0).x, 75.0);
        assert_eq!(g.slot_center(1).x, 225.0);
        assert_eq!(g.slot_center(2).x, 375.0);
        assert!(g.slot_center(0).y > g.canvas_width);
        assert!(g.slot_center(0).y < g.canvas_height);
    }

    #[test]
    fn test_grid_offset_round_trips_cell_centres() {
        let g = Geometry::default();
        for kind in ShapeKind::ALL {
            let (w, h) = kind.dims();
            let origin = g.cell_origin(2, 3);
            let center = Point::new(
                origin.x + w as f32 * g.cell_size / 2.0,
                origin.y + h as f32 * g.cell_size / 2.0,
            );
            assert_eq!(g.grid_offset(kind, center), (2, 3), "{kind:?}");
        }
    }

    #[test]
    fn test_grid_offset_rounds_to_nearest() {
        let g = Geometry::default();
        let origin = g.cell_origin(4, 4);
        let half = g.cell_size / 2.0;
        let nudge = g.pitch() * 0.4;
        let center = Point::new(origin.x + half + nudge, origin.y + half - nudge);
        assert_eq!(g.grid_offset(ShapeKind::Mono, center), (4, 4));
        let center = Point::new(origin.x + half + g.pitch() * 0.6, origin.y + half);
        assert_eq!(g.grid_offset(ShapeKind::Mono, center), (5, 4));
    }

    #[test]
    fn test_grid_offset_rounds_left_edge_in_pitch_units() {
        let g = Geometry::default();
        let half = g.cell_size / 2.0;
        let at = |frac: f32| Point::new(g.pitch() * frac + half, g.pitch() * frac + half);
        assert_eq!(g.grid_offset(ShapeKind::Mono, at(0.48)), (0, 0));
        assert_eq!(g.grid_offset(ShapeKind::Mono, at(0.52)), (1, 1));
        assert_eq!(g.grid_offset(ShapeKind::Mono, at(-0.52)), (-1, -1));
    }

    #[test]
    fn test_hit_region_is_a_square() {
        let g = Geometry::default();
        let c = Point::new(100.0, 100.0);
        assert!(g.hits(c, Point::new(144.0, 56.0)));
        assert!(!g.hits(c, Point::new(145.0, 100.0)));
        assert!(!g.hits(c, Point::new(100.0, 146.0)));
    }

    #[test]
    fn test_drag_keeps_grab_offset() {
        let mut d = DragState::default();
        d.grab(1, Point::new(210.0, 570.0), Point::new(200.0, 560.0));
        assert_eq!(d.slot(), Some(1));
        d.track(Point::new(110.0, 370.0));
        assert_eq!(d.piece_center(0.0), Some(Point::new(100.0, 360.0)));
        assert_eq!(d.piece_center(110.0), Some(Point::new(100.0, 250.0)));
        let dropped = d.release(110.0);
        assert_eq!(dropped, Some((1, Point::new(100.0, 250.0))));
        assert_eq!(d, DragState::Idle);
    }

    #[test]
    fn test_idle_ignores_moves_and_release() {
        let mut d = DragState::Idle;
        d.track(Point::new(5.0, 5.0));
        assert_eq!(d, DragState::Idle);
        assert_eq!(d.release(DRAG_LIFT), None);
    }
}
