//! Game session: board, hand, score, drag state, drop sequence and game-over detection.

use crate::board::{BOARD_SIZE, Board, ClearOutcome};
use crate::drag::{DragState, Geometry, Point};
use crate::error::GameError;
use crate::hand::{Hand, HandGenerator};
use crate::shapes::ShapeKind;
use log::{debug, info, warn};

/// Flat award for every successful placement.
pub const PLACEMENT_POINTS: u32 = 10;
/// Award per full row or column removed by a clear.
pub const LINE_POINTS: u32 = 100;

/// Discrete sound cues for an external tone generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Grab,
    PlaceSuccess,
    PlaceFail,
    LineClear,
}

/// Result of a drop or direct placement attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Placed {
        slot: usize,
        gx: i32,
        gy: i32,
        clear: ClearOutcome,
    },
    Rejected {
        slot: usize,
        gx: i32,
        gy: i32,
    },
    /// Nothing was held, the slot was already placed, or the session is gated.
    Ignored,
}

/// Where the dragged piece would land if released now (only when valid).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ghost {
    pub kind: ShapeKind,
    pub gx: i32,
    pub gy: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceView {
    pub slot: usize,
    pub kind: ShapeKind,
    pub dragging: bool,
}

/// Read-only per-frame view for the presentation layer.
#[derive(Debug, Clone)]
pub struct Snapshot<'a> {
    pub board: &'a Board,
    /// Unplaced hand pieces only.
    pub pieces: Vec<PieceView>,
    pub ghost: Option<Ghost>,
    pub score: u32,
    pub best_score: u32,
    pub paused: bool,
    pub game_over: bool,
}

/// One game from first hand to game over. All logical state is owned here.
#[derive(Debug)]
pub struct GameSession {
    geometry: Geometry,
    board: Board,
    hand: Hand,
    generator: HandGenerator,
    drag: DragState,
    pub score: u32,
    pub best_score: u32,
    /// Set when the best score was raised and not yet taken for persisting.
    new_best: bool,
    paused: bool,
    game_over: bool,
    pub lines_cleared: u32,
    pub hands_dealt: u32,
    /// Cells written by placements minus cells removed by clears.
    placed_cells: usize,
    cues: Vec<Cue>,
}

impl GameSession {
    pub fn new(geometry: Geometry, config: &crate::GameConfig, best_score: u32) -> Self {
        let generator = HandGenerator::new(config.seed);
        let mut session = Self {
            geometry,
            board: Board::new(),
            hand: Hand::default(),
            generator,
            drag: DragState::Idle,
            score: 0,
            best_score,
            new_best: false,
            paused: false,
            game_over: false,
            lines_cleared: 0,
            hands_dealt: 0,
            placed_cells: 0,
            cues: Vec::new(),
        };
        session.deal_if_exhausted();
        info!("new game (best {})", best_score);
        session
    }

    /// Fresh board and hand, same generator and best score.
    pub fn restart(&mut self) {
        self.board = Board::new();
        self.hand = Hand::default();
        self.drag = DragState::Idle;
        self.score = 0;
        self.paused = false;
        self.game_over = false;
        self.lines_cleared = 0;
        self.hands_dealt = 0;
        self.placed_cells = 0;
        self.cues.clear();
        self.deal_if_exhausted();
        info!("game restarted (best {})", self.best_score);
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Input is only accepted while playing.
    fn accepts_input(&self) -> bool {
        !self.paused && !self.game_over
    }

    /// Pause is refused once the game is over.
    pub fn toggle_pause(&mut self) {
        if self.game_over {
            return;
        }
        self.paused = !self.paused;
        if self.paused {
            self.cancel_drag();
        }
        debug!("paused: {}", self.paused);
    }

    /// Drop whatever is held without placing it; the piece returns to its slot.
    pub fn cancel_drag(&mut self) {
        if let Some(slot) = self.drag.slot() {
            debug!("drag of slot {} cancelled", slot);
        }
        self.drag = DragState::Idle;
    }

    /// Pointer down. Grabs the first unplaced piece whose hit region contains `p`.
    pub fn press(&mut self, p: Point) -> bool {
        if !self.accepts_input() || self.drag.is_dragging() {
            return false;
        }
        let hit = self
            .hand
            .unplaced()
            .find(|(_, piece)| self.geometry.hits(piece.rest, p))
            .map(|(slot, piece)| (slot, piece.rest));
        match hit {
            Some((slot, rest)) => {
                self.drag.grab(slot, p, rest);
                self.cues.push(Cue::Grab);
                true
            }
            None => false,
        }
    }

    pub fn pointer_move(&mut self, p: Point) {
        if self.accepts_input() {
            self.drag.track(p);
        }
    }

    /// Pointer up: validate the candidate origin, place on success, then check liveness.
    pub fn release(&mut self) -> Result<DropOutcome, GameError> {
        if !self.accepts_input() {
            return Ok(DropOutcome::Ignored);
        }
        let Some((slot, center)) = self.drag.release(self.geometry.lift) else {
            return Ok(DropOutcome::Ignored);
        };
        let Some(kind) = self.hand.get(slot).map(|p| p.kind) else {
            return Ok(DropOutcome::Ignored);
        };
        let (gx, gy) = self.geometry.grid_offset(kind, center);
        self.drop_at(slot, gx, gy)
    }

    /// Place hand piece `slot` at (gx, gy) directly, bypassing the pointer.
    pub fn try_place(&mut self, slot: usize, gx: i32, gy: i32) -> Result<DropOutcome, GameError> {
        if !self.accepts_input() {
            return Ok(DropOutcome::Ignored);
        }
        self.drag = DragState::Idle;
        self.drop_at(slot, gx, gy)
    }

    fn drop_at(&mut self, slot: usize, gx: i32, gy: i32) -> Result<DropOutcome, GameError> {
        let Some(piece) = self.hand.get(slot).copied() else {
            return Ok(DropOutcome::Ignored);
        };
        if piece.placed {
            return Ok(DropOutcome::Ignored);
        }
        let outcome = if self.board.can_place(piece.kind.mask(), gx, gy) {
            let clear = self.commit(slot, piece.kind, gx, gy)?;
            DropOutcome::Placed { slot, gx, gy, clear }
        } else {
            debug!("rejected {} at ({}, {})", piece.kind.name(), gx, gy);
            self.cues.push(Cue::PlaceFail);
            DropOutcome::Rejected { slot, gx, gy }
        };
        self.check_game_over();
        self.verify_integrity()?;
        Ok(outcome)
    }

    /// Validated placement: write cells, award, clear lines, maybe deal.
    fn commit(
        &mut self,
        slot: usize,
        kind: ShapeKind,
        gx: i32,
        gy: i32,
    ) -> Result<ClearOutcome, GameError> {
        let written = self
            .board
            .place(kind.mask(), kind.color_index(), gx, gy)?;
        debug_assert_eq!(written, kind.cell_count());
        self.placed_cells += written;
        self.hand.mark_placed(slot);
        self.award(PLACEMENT_POINTS);
        self.cues.push(Cue::PlaceSuccess);
        debug!("placed {} at ({}, {})", kind.name(), gx, gy);

        let clear = self.clear_lines()?;
        self.deal_if_exhausted();
        Ok(clear)
    }

    /// Run one clear pass over the board and award it.
    pub fn clear_lines(&mut self) -> Result<ClearOutcome, GameError> {
        let clear = self.board.clear_lines();
        if clear.is_empty() {
            return Ok(clear);
        }
        self.placed_cells = self
            .placed_cells
            .checked_sub(clear.cells.len())
            .ok_or_else(|| GameError::Corruption {
                occupied: self.board.occupied_count() + clear.cells.len(),
                expected: self.placed_cells,
            })?;
        self.lines_cleared += clear.lines();
        self.award(LINE_POINTS * clear.lines());
        self.cues.push(Cue::LineClear);
        info!(
            "cleared rows {:?} cols {:?} (+{})",
            clear.rows,
            clear.cols,
            LINE_POINTS * clear.lines()
        );
        Ok(clear)
    }

    fn award(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
        if self.score > self.best_score {
            self.best_score = self.score;
            self.new_best = true;
        }
    }

    /// Returns the best score once after each time it is raised.
    pub fn take_new_best(&mut self) -> Option<u32> {
        std::mem::take(&mut self.new_best).then_some(self.best_score)
    }

    fn deal_if_exhausted(&mut self) {
        if self.hand.is_exhausted() {
            self.hand = self.generator.deal(&self.geometry);
            self.hands_dealt += 1;
            debug!(
                "dealt hand #{}: {:?}",
                self.hands_dealt,
                self.hand.iter().map(|p| p.kind.name()).collect::<Vec<_>>()
            );
        }
    }

    /// True if some unplaced piece fits at some origin.
    pub fn is_alive(&self) -> bool {
        self.hand.unplaced().any(|(_, piece)| {
            let mask = piece.kind.mask();
            (0..BOARD_SIZE as i32)
                .any(|gy| (0..BOARD_SIZE as i32).any(|gx| self.board.can_place(mask, gx, gy)))
        })
    }

    pub fn check_game_over(&mut self) {
        if !self.game_over && !self.hand.is_empty() && !self.is_alive() {
            self.game_over = true;
            self.drag = DragState::Idle;
            info!("game over: score {}", self.score);
        }
    }

    /// Board occupancy must equal what placements account for.
    pub fn verify_integrity(&self) -> Result<(), GameError> {
        let occupied = self.board.occupied_count();
        if occupied != self.placed_cells {
            warn!(
                "grid corruption: {} occupied, {} expected",
                occupied, self.placed_cells
            );
            return Err(GameError::Corruption {
                occupied,
                expected: self.placed_cells,
            });
        }
        Ok(())
    }

    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    /// Valid landing spot of the dragged piece, if any.
    pub fn ghost(&self) -> Option<Ghost> {
        let slot = self.drag.slot()?;
        let kind = self.hand.get(slot)?.kind;
        let center = self.drag.piece_center(self.geometry.lift)?;
        let (gx, gy) = self.geometry.grid_offset(kind, center);
        self.board
            .can_place(kind.mask(), gx, gy)
            .then_some(Ghost { kind, gx, gy })
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let dragged = self.drag.slot();
        Snapshot {
            board: &self.board,
            pieces: self
                .hand
                .unplaced()
                .map(|(slot, p)| PieceView {
                    slot,
                    kind: p.kind,
                    dragging: dragged == Some(slot),
                })
                .collect(),
            ghost: self.ghost(),
            score: self.score,
            best_score: self.best_score,
            paused: self.paused,
            game_over: self.game_over,
        }
    }

    #[cfg(test)]
    pub(crate) fn set_hand(&mut self, kinds: &[ShapeKind]) {
        self.hand = Hand::from_kinds(kinds, &self.geometry);
    }

    #[cfg(test)]
    pub(crate) fn fill_cell(&mut self, row: usize, col: usize) {
        self.board.fill(row, col, 0);
        self.placed_cells += 1;
    }

    #[cfg(test)]
    pub(crate) fn empty_cell(&mut self, row: usize, col: usize) {
        self.board.empty(row, col);
        self.placed_cells -= 1;
    }
}
