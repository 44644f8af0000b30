//! App: terminal init, main loop, mouse/key handling, animation and cue output.

use crate::game::{Cue, DropOutcome, GameSession};
use crate::drag::{Geometry, Point};
use crate::highscores;
use crate::input::{Action, Pointer, key_to_action, mouse_to_pointer};
use crate::shapes::ShapeKind;
use crate::theme::Theme;
use crate::ui::CanvasMap;
use crate::{Args, GameConfig};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use log::{debug, info, warn};
use ratatui::DefaultTerminal;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// Fraction of the remaining distance a piece covers each frame.
const LERP: f32 = 0.25;
/// Scale of a resting piece in the tray.
pub const TRAY_SCALE: f32 = 0.55;
/// How long a cue stays in the sidebar.
const CUE_DISPLAY_MS: u64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    GameOver,
    QuitMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOption {
    Resume,
    MainMenu,
    Exit,
}

/// Displayed top-left and scale of a hand piece; eased toward its target every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceAnimation {
    pub top_left: Point,
    pub scale: f32,
}

impl PieceAnimation {
    fn target(geometry: &Geometry, kind: ShapeKind, center: Point, scale: f32) -> Self {
        let (w, h) = kind.dims();
        Self {
            top_left: Point::new(
                center.x - w as f32 * geometry.cell_size * scale / 2.0,
                center.y - h as f32 * geometry.cell_size * scale / 2.0,
            ),
            scale,
        }
    }

    fn step_toward(&mut self, target: Self) {
        self.top_left.x += (target.top_left.x - self.top_left.x) * LERP;
        self.top_left.y += (target.top_left.y - self.top_left.y) * LERP;
        self.scale += (target.scale - self.scale) * LERP;
    }
}

/// Keyboard placement: a hand slot and a board origin under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardPick {
    pub slot: usize,
    pub kind: ShapeKind,
    pub gx: i32,
    pub gy: i32,
}

impl KeyboardPick {
    /// Move the origin, keeping the whole mask on the board.
    fn nudge(&mut self, dx: i32, dy: i32) {
        let (w, h) = self.kind.dims();
        let max_x = crate::board::BOARD_SIZE as i32 - w as i32;
        let max_y = crate::board::BOARD_SIZE as i32 - h as i32;
        self.gx = (self.gx + dx).clamp(0, max_x);
        self.gy = (self.gy + dy).clamp(0, max_y);
    }
}

/// Cells of the most recent clear, faded out by TachyonFX.
pub struct ClearFlash {
    pub cells: Vec<(usize, usize, u8)>,
    pub effect: Option<Effect>,
    pub last_process: Option<Instant>,
}

pub struct App {
    args: Args,
    theme: Theme,
    session: GameSession,
    screen: Screen,
    quit_selected: QuitOption,
    best_score_path: PathBuf,
    animations: Vec<PieceAnimation>,
    /// `hands_dealt` value the animations were laid out for.
    animated_hand: u32,
    keyboard: Option<KeyboardPick>,
    last_cue: Option<(Cue, Instant)>,
    flash: Option<ClearFlash>,
    /// Canvas placement from the last draw; maps mouse cells to board-local points.
    canvas: Option<CanvasMap>,
}

impl App {
    pub fn new(args: Args, config: GameConfig, theme: Theme) -> Self {
        let best_score_path = args
            .best_score_file
            .clone()
            .unwrap_or_else(highscores::default_path);
        let best = highscores::load_best_score(&best_score_path);
        let session = GameSession::new(Geometry::default(), &config, best);
        let screen = if args.no_menu {
            Screen::Playing
        } else {
            Screen::Menu
        };
        let mut app = Self {
            args,
            theme,
            session,
            screen,
            quit_selected: QuitOption::Resume,
            best_score_path,
            animations: Vec::new(),
            animated_hand: 0,
            keyboard: None,
            last_cue: None,
            flash: None,
            canvas: None,
        };
        app.sync_animations();
        app
    }

    fn start_game(&mut self) {
        self.session.restart();
        self.screen = Screen::Playing;
        self.keyboard = None;
        self.flash = None;
        self.last_cue = None;
        self.sync_animations();
    }

    /// Snap animations to resting positions whenever a new hand was dealt.
    fn sync_animations(&mut self) {
        if self.animated_hand == self.session.hands_dealt
            && self.animations.len() == self.session.hand().len()
        {
            return;
        }
        let geometry = *self.session.geometry();
        self.animations = self
            .session
            .hand()
            .iter()
            .map(|p| PieceAnimation::target(&geometry, p.kind, p.rest, TRAY_SCALE))
            .collect();
        self.animated_hand = self.session.hands_dealt;
    }

    /// Ease every unplaced piece toward the pointer (dragged) or its tray slot.
    fn tick_animations(&mut self) {
        self.sync_animations();
        let geometry = *self.session.geometry();
        let drag_center = self.session.drag().piece_center(geometry.lift);
        let dragged = self.session.drag().slot();
        for (slot, piece) in self.session.hand().unplaced() {
            let target = match (dragged, drag_center) {
                (Some(s), Some(center)) if s == slot => {
                    PieceAnimation::target(&geometry, piece.kind, center, 1.0)
                }
                _ => PieceAnimation::target(&geometry, piece.kind, piece.rest, TRAY_SCALE),
            };
            if let Some(anim) = self.animations.get_mut(slot) {
                anim.step_toward(target);
            }
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;
        terminal.show_cursor()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.args.frame_rate.max(1.0));
        loop {
            let now = Instant::now();
            if self.screen == Screen::Playing && !self.session.is_paused() {
                self.tick_animations();
            }
            if self
                .flash
                .as_ref()
                .and_then(|f| f.effect.as_ref())
                .is_some_and(Effect::done)
            {
                self.flash = None;
            }
            if self
                .last_cue
                .is_some_and(|(_, at)| at.elapsed() > Duration::from_millis(CUE_DISPLAY_MS))
            {
                self.last_cue = None;
            }

            let mut canvas = None;
            terminal.draw(|f| {
                let view = crate::ui::View {
                    screen: self.screen,
                    snapshot: self.session.snapshot(),
                    theme: &self.theme,
                    animations: &self.animations,
                    keyboard: self.keyboard,
                    cue: self.last_cue.map(|(c, _)| c),
                    lines_cleared: self.session.lines_cleared,
                    quit_selected: (self.screen == Screen::QuitMenu).then_some(self.quit_selected),
                    geometry: self.session.geometry(),
                };
                canvas = Some(crate::ui::draw(f, &view, &mut self.flash, now));
            })?;
            self.canvas = canvas;

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if !self.handle_action(key_to_action(key))? {
                                return Ok(());
                            }
                        }
                        Event::Mouse(mouse) => {
                            if let Some(pointer) = mouse_to_pointer(mouse) {
                                self.handle_pointer(pointer)?;
                            }
                        }
                        _ => {}
                    }
                }
            }

            self.after_input();
        }
    }

    /// Cues, best-score persistence and game-over screen after each batch of input.
    fn after_input(&mut self) {
        for cue in self.session.drain_cues() {
            self.last_cue = Some((cue, Instant::now()));
            if self.args.bell && matches!(cue, Cue::PlaceFail | Cue::LineClear) {
                ring_bell(&mut std::io::stdout());
            }
        }
        if let Some(best) = self.session.take_new_best() {
            if let Err(e) = highscores::save_best_score(&self.best_score_path, best) {
                warn!("could not persist best score: {e:#}");
            }
        }
        if self.screen == Screen::Playing && self.session.is_game_over() {
            self.screen = Screen::GameOver;
            self.keyboard = None;
        }
    }

    fn record_drop(&mut self, outcome: &DropOutcome) {
        match outcome {
            DropOutcome::Placed { slot, gx, gy, clear } => {
                debug!("slot {} landed at ({}, {}), {} lines", slot, gx, gy, clear.lines());
                if !clear.is_empty() && !self.args.no_animation {
                    self.flash = Some(ClearFlash {
                        cells: clear.cells.clone(),
                        effect: None,
                        last_process: None,
                    });
                }
            }
            DropOutcome::Rejected { slot, gx, gy } => {
                debug!("slot {} does not fit at ({}, {})", slot, gx, gy);
            }
            DropOutcome::Ignored => {}
        }
    }

    fn handle_pointer(&mut self, pointer: Pointer) -> Result<()> {
        match self.screen {
            Screen::Menu => {
                if matches!(pointer, Pointer::Press(..)) {
                    self.start_game();
                }
                return Ok(());
            }
            Screen::Playing => {}
            Screen::GameOver | Screen::QuitMenu => return Ok(()),
        }
        let Some(map) = self.canvas else {
            return Ok(());
        };
        match pointer {
            Pointer::Press(col, row) => {
                if self.session.press(map.to_local(col, row)) {
                    self.keyboard = None;
                }
            }
            Pointer::Move(col, row) => self.session.pointer_move(map.to_local(col, row)),
            Pointer::Release(col, row) => {
                self.session.pointer_move(map.to_local(col, row));
                let outcome = self.session.release()?;
                self.record_drop(&outcome);
            }
        }
        Ok(())
    }

    /// Returns false when the app should exit.
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match self.screen {
            Screen::Menu => match action {
                Action::Quit => return Ok(false),
                Action::Drop => self.start_game(),
                _ => {}
            },
            Screen::GameOver => match action {
                Action::Quit => return Ok(false),
                Action::Restart | Action::Drop => self.start_game(),
                _ => {}
            },
            Screen::QuitMenu => match action {
                Action::Down | Action::Right => {
                    self.quit_selected = match self.quit_selected {
                        QuitOption::Resume => QuitOption::MainMenu,
                        QuitOption::MainMenu => QuitOption::Exit,
                        QuitOption::Exit => QuitOption::Resume,
                    };
                }
                Action::Up | Action::Left => {
                    self.quit_selected = match self.quit_selected {
                        QuitOption::Resume => QuitOption::Exit,
                        QuitOption::MainMenu => QuitOption::Resume,
                        QuitOption::Exit => QuitOption::MainMenu,
                    };
                }
                Action::Drop => match self.quit_selected {
                    QuitOption::Resume => self.screen = Screen::Playing,
                    QuitOption::MainMenu => self.screen = Screen::Menu,
                    QuitOption::Exit => return Ok(false),
                },
                Action::Quit | Action::Cancel => self.screen = Screen::Playing,
                _ => {}
            },
            Screen::Playing => self.handle_play_action(action)?,
        }
        Ok(true)
    }

    fn handle_play_action(&mut self, action: Action) -> Result<()> {
        if self.session.is_paused() && !matches!(action, Action::Pause | Action::Quit) {
            return Ok(());
        }
        match action {
            Action::Pause => self.session.toggle_pause(),
            Action::Quit => {
                // Release events are not delivered to the quit menu.
                self.session.cancel_drag();
                self.screen = Screen::QuitMenu;
                self.quit_selected = QuitOption::Resume;
            }
            Action::Restart => {
                info!("restart requested at score {}", self.session.score);
                self.start_game();
            }
            Action::Select(slot) => {
                self.keyboard = self
                    .session
                    .hand()
                    .get(slot)
                    .filter(|p| !p.placed)
                    .map(|p| KeyboardPick {
                        slot,
                        kind: p.kind,
                        gx: 0,
                        gy: 0,
                    });
            }
            Action::Left => self.nudge_pick(-1, 0),
            Action::Right => self.nudge_pick(1, 0),
            Action::Up => self.nudge_pick(0, -1),
            Action::Down => self.nudge_pick(0, 1),
            Action::Drop => {
                if let Some(pick) = self.keyboard {
                    let outcome = self.session.try_place(pick.slot, pick.gx, pick.gy)?;
                    if matches!(outcome, DropOutcome::Placed { .. }) {
                        self.keyboard = None;
                    }
                    self.record_drop(&outcome);
                }
            }
            Action::Cancel => self.keyboard = None,
            Action::None => {}
        }
        Ok(())
    }

    fn nudge_pick(&mut self, dx: i32, dy: i32) {
        if let Some(pick) = self.keyboard.as_mut() {
            pick.nudge(dx, dy);
        }
    }
}

/// Write BEL; a terminal that refuses it only costs the cue.
fn ring_bell(out: &mut impl std::io::Write) -> bool {
    match out.write_all(b"\x07").and_then(|()| out.flush()) {
        Ok(()) => true,
        Err(e) => {
            debug!("could not ring bell: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_converges_on_target() {
        let g = Geometry::default();
        let target = PieceAnimation::target(&g, ShapeKind::Square, Point::new(200.0, 200.0), 1.0);
        let mut anim = PieceAnimation::target(&g, ShapeKind::Square, g.slot_center(0), TRAY_SCALE);
        for _ in 0..60 {
            anim.step_toward(target);
        }
        assert!((anim.top_left.x - target.top_left.x).abs() < 0.01);
        assert!((anim.top_left.y - target.top_left.y).abs() < 0.01);
        assert!((anim.scale - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_target_centres_scaled_piece() {
        let g = Geometry::default();
        let t = PieceAnimation::target(&g, ShapeKind::IBeam, Point::new(100.0, 100.0), 0.5);
        assert!((t.top_left.x - (100.0 - g.cell_size)).abs() < 1e-4);
        assert!((t.top_left.y - (100.0 - g.cell_size / 4.0)).abs() < 1e-4);
    }

    #[test]
    fn test_quit_menu_cancels_drag() {
        use clap::Parser as _;
        let scratch = std::env::temp_dir().join(format!(
            "blocktui-test-{}-quit-menu/best_score",
            std::process::id()
        ));
        let path = scratch.to_string_lossy().into_owned();
        let args = Args::parse_from([
            "blocktui",
            "--no-menu",
            "--seed",
            "5",
            "--best-score-file",
            path.as_str(),
        ]);
        let mut app = App::new(args, GameConfig { seed: Some(5) }, Theme::default());
        let rest = app.session.hand().get(0).unwrap().rest;
        assert!(app.session.press(rest));
        assert!(app.handle_action(Action::Quit).unwrap());
        assert_eq!(app.screen, Screen::QuitMenu);
        assert!(!app.session.drag().is_dragging());
        assert!(app.handle_action(Action::Cancel).unwrap());
        assert_eq!(app.screen, Screen::Playing);
        assert!(app.session.press(rest));
    }

    struct ClosedPipe;

    impl std::io::Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_bell_failure_is_reported_not_raised() {
        let mut out = Vec::new();
        assert!(ring_bell(&mut out));
        assert_eq!(out, b"\x07");
        assert!(!ring_bell(&mut ClosedPipe));
    }

    #[test]
    fn test_keyboard_pick_stays_on_board() {
        let mut pick = KeyboardPick {
            slot: 0,
            kind: ShapeKind::IBeam,
            gx: 0,
            gy: 0,
        };
        pick.nudge(-1, -1);
        assert_eq!((pick.gx, pick.gy), (0, 0));
        pick.nudge(10, 10);
        assert_eq!((pick.gx, pick.gy), (4, 7));
    }
}
