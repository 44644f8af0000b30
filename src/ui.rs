//! Layout and drawing: menu, board, hand tray, dragged piece, sidebar, overlays.

use crate::app::{ClearFlash, KeyboardPick, PieceAnimation, QuitOption, Screen};
use crate::board::{BOARD_SIZE, Cell};
use crate::drag::{Geometry, Point};
use crate::game::{Cue, Snapshot};
use crate::shapes::ShapeKind;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, EffectRenderer, Interpolation, fx, ref_count,
};

/// Terminal columns per board cell (the last one is the gap).
const CELL_COLS: u16 = 4;
/// Terminal rows per board cell.
const CELL_ROWS: u16 = 2;
const BOARD_COLS: u16 = BOARD_SIZE as u16 * CELL_COLS;
const BOARD_ROWS: u16 = BOARD_SIZE as u16 * CELL_ROWS;
const SIDEBAR_WIDTH: u16 = 24;
const LINE_CLEAR_FADE_MS: u32 = 350;

/// Everything one frame needs.
pub struct View<'a> {
    pub screen: Screen,
    pub snapshot: Snapshot<'a>,
    pub theme: &'a Theme,
    pub animations: &'a [PieceAnimation],
    pub keyboard: Option<KeyboardPick>,
    pub cue: Option<Cue>,
    pub lines_cleared: u32,
    pub quit_selected: Option<QuitOption>,
    pub geometry: &'a Geometry,
}

/// Maps terminal cells to board-local points and back for the canvas rect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasMap {
    pub rect: Rect,
    px_per_col: f32,
    px_per_row: f32,
}

impl CanvasMap {
    pub fn new(rect: Rect, geometry: &Geometry) -> Self {
        Self {
            rect,
            px_per_col: geometry.canvas_width / f32::from(BOARD_COLS),
            px_per_row: geometry.canvas_width / f32::from(BOARD_ROWS),
        }
    }

    /// Canvas rows needed to show board and tray.
    pub fn rows_for(geometry: &Geometry) -> u16 {
        let px_per_row = geometry.canvas_width / f32::from(BOARD_ROWS);
        (geometry.canvas_height / px_per_row).ceil() as u16
    }

    /// Board-local point at the centre of terminal cell (col, row). Works outside the rect.
    pub fn to_local(&self, col: u16, row: u16) -> Point {
        Point::new(
            (f32::from(col) - f32::from(self.rect.x) + 0.5) * self.px_per_col,
            (f32::from(row) - f32::from(self.rect.y) + 0.5) * self.px_per_row,
        )
    }

    /// Fractional terminal (col, row) of a board-local point.
    fn to_term(&self, p: Point) -> (f32, f32) {
        (
            p.x / self.px_per_col + f32::from(self.rect.x),
            p.y / self.px_per_row + f32::from(self.rect.y),
        )
    }
}

/// Outer bordered rect, canvas (inside border) and sidebar, centred in `area`.
fn game_layout(area: Rect, geometry: &Geometry) -> (Rect, Rect, Rect) {
    let canvas_rows = CanvasMap::rows_for(geometry);
    let total_w = BOARD_COLS + 2 + SIDEBAR_WIDTH;
    let total_h = canvas_rows + 2;

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_h),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(BOARD_COLS + 2),
            Constraint::Length(SIDEBAR_WIDTH),
        ])
        .split(vert[1]);
    let outer = inner[0];
    let canvas = Rect {
        x: outer.x + 1,
        y: outer.y + 1,
        width: BOARD_COLS.min(outer.width.saturating_sub(2)),
        height: canvas_rows.min(outer.height.saturating_sub(2)),
    };
    (outer, canvas, inner[1])
}

/// Draw the current screen. Returns the canvas mapping used, for mouse input.
pub fn draw(
    frame: &mut Frame,
    view: &View,
    flash: &mut Option<ClearFlash>,
    now: Instant,
) -> CanvasMap {
    let area = frame.area();
    let (outer, canvas, sidebar) = game_layout(area, view.geometry);
    let map = CanvasMap::new(canvas, view.geometry);
    match view.screen {
        Screen::Menu => draw_menu(frame, view, area),
        Screen::Playing | Screen::QuitMenu => {
            draw_game(frame, view, outer, &map, sidebar, flash.as_ref());
            if let Some(f) = flash.as_mut() {
                apply_line_clear_effect(frame, view.theme, canvas, f, now);
            }
            if view.snapshot.paused {
                draw_pause_overlay(frame, view.theme, area);
            }
            if let Some(opt) = view.quit_selected {
                draw_quit_menu(frame, view.theme, opt);
            }
        }
        Screen::GameOver => {
            draw_game(frame, view, outer, &map, sidebar, None);
            draw_game_over(frame, view, outer);
        }
    }
    map
}

/// Terminal rect of board cell (row, col), excluding the gap column.
fn cell_rect(canvas: Rect, row: usize, col: usize) -> Rect {
    Rect {
        x: canvas.x + col as u16 * CELL_COLS,
        y: canvas.y + row as u16 * CELL_ROWS,
        width: CELL_COLS - 1,
        height: CELL_ROWS,
    }
}

fn fill_rect(buf: &mut Buffer, rect: Rect, symbol: &str, color: Color) {
    let clipped = rect.intersection(buf.area);
    for y in clipped.top()..clipped.bottom() {
        for x in clipped.left()..clipped.right() {
            buf[(x, y)].set_symbol(symbol).set_fg(color);
        }
    }
}

fn draw_game(
    frame: &mut Frame,
    view: &View,
    outer: Rect,
    map: &CanvasMap,
    sidebar: Rect,
    flash: Option<&ClearFlash>,
) {
    let theme = view.theme;
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" blocktui ", Style::default().fg(theme.title)))
        .style(Style::default().bg(theme.bg))
        .render(outer, frame.buffer_mut());

    draw_board(frame.buffer_mut(), view, map.rect, flash);
    draw_keyboard_pick(frame.buffer_mut(), view, map.rect);
    draw_hand(frame.buffer_mut(), view, map);
    draw_sidebar(frame, view, sidebar);
}

fn draw_board(buf: &mut Buffer, view: &View, canvas: Rect, flash: Option<&ClearFlash>) {
    let theme = view.theme;
    for (r, row) in view.snapshot.board.rows().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let color = match cell {
                Cell::Filled(i) => theme.piece_color(*i),
                Cell::Empty => theme.empty_cell,
            };
            fill_rect(buf, cell_rect(canvas, r, c), "█", color);
        }
    }
    // Cleared cells keep their colour until the fade finishes.
    if let Some(f) = flash {
        for &(r, c, color) in &f.cells {
            if !view.snapshot.board.is_occupied(r, c) {
                fill_rect(buf, cell_rect(canvas, r, c), "█", theme.piece_color(color));
            }
        }
    }
    if let Some(ghost) = view.snapshot.ghost {
        draw_mask_on_board(buf, canvas, ghost.kind, ghost.gx, ghost.gy, "▒", theme.shape_color(ghost.kind));
    }
}

fn draw_mask_on_board(
    buf: &mut Buffer,
    canvas: Rect,
    kind: ShapeKind,
    gx: i32,
    gy: i32,
    symbol: &str,
    color: Color,
) {
    for (x, y) in kind.cells() {
        let (col, row) = (gx + x as i32, gy + y as i32);
        if (0..BOARD_SIZE as i32).contains(&col) && (0..BOARD_SIZE as i32).contains(&row) {
            fill_rect(buf, cell_rect(canvas, row as usize, col as usize), symbol, color);
        }
    }
}

/// Keyboard cursor: shaded when the piece fits, crossed out when it does not.
fn draw_keyboard_pick(buf: &mut Buffer, view: &View, canvas: Rect) {
    let Some(pick) = view.keyboard else {
        return;
    };
    let fits = view
        .snapshot
        .board
        .can_place(pick.kind.mask(), pick.gx, pick.gy);
    let (symbol, color) = if fits {
        ("▒", view.theme.shape_color(pick.kind))
    } else {
        ("╳", Color::Red)
    };
    draw_mask_on_board(buf, canvas, pick.kind, pick.gx, pick.gy, symbol, color);
}

/// Hand pieces at their animated position and scale; the dragged one last so it is on top.
fn draw_hand(buf: &mut Buffer, view: &View, map: &CanvasMap) {
    let mut pieces = view.snapshot.pieces.clone();
    pieces.sort_by_key(|p| p.dragging);
    for piece in pieces {
        let Some(anim) = view.animations.get(piece.slot) else {
            continue;
        };
        let highlighted = view.keyboard.is_some_and(|k| k.slot == piece.slot);
        let color = if view.snapshot.game_over {
            view.theme.inactive_fg
        } else if highlighted {
            view.theme.title
        } else {
            view.theme.shape_color(piece.kind)
        };
        rasterize_piece(buf, map, view.geometry, piece.kind, *anim, color);
    }
}

/// Fill every terminal cell whose centre lands inside a covered, scaled mask cell.
fn rasterize_piece(
    buf: &mut Buffer,
    map: &CanvasMap,
    geometry: &Geometry,
    kind: ShapeKind,
    anim: PieceAnimation,
    color: Color,
) {
    let size = geometry.cell_size * anim.scale;
    let pitch = size + geometry.gap * anim.scale;
    if pitch <= 0.0 {
        return;
    }
    let (w, h) = kind.dims();
    let mask = kind.mask();
    let extent = Point::new(w as f32 * pitch, h as f32 * pitch);
    let (c0, r0) = map.to_term(anim.top_left);
    let (c1, r1) = map.to_term(anim.top_left + extent);
    let area = buf.area;
    let col_lo = (c0.floor() as i32).max(i32::from(area.left()));
    let col_hi = (c1.ceil() as i32).min(i32::from(area.right()));
    let row_lo = (r0.floor() as i32).max(i32::from(area.top()));
    let row_hi = (r1.ceil() as i32).min(i32::from(area.bottom()));
    for row in row_lo..row_hi {
        for col in col_lo..col_hi {
            let p = map.to_local(col as u16, row as u16) - anim.top_left;
            if p.x < 0.0 || p.y < 0.0 {
                continue;
            }
            let (ix, iy) = ((p.x / pitch) as usize, (p.y / pitch) as usize);
            if p.x - ix as f32 * pitch > size || p.y - iy as f32 * pitch > size {
                continue;
            }
            let covered = mask.get(iy).and_then(|r| r.get(ix)).is_some_and(|v| *v != 0);
            if covered {
                buf[(col as u16, row as u16)].set_symbol("█").set_fg(color);
            }
        }
    }
}

/// Fade the last clear's cells to the background (TachyonFX).
fn apply_line_clear_effect(
    frame: &mut Frame,
    theme: &Theme,
    canvas: Rect,
    flash: &mut ClearFlash,
    now: Instant,
) {
    let delta = flash
        .last_process
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    flash.last_process = Some(now);

    if flash.effect.is_none() {
        let positions: HashSet<(u16, u16)> = flash
            .cells
            .iter()
            .flat_map(|&(r, c, _)| {
                let rect = cell_rect(canvas, r, c);
                rect.positions().map(|p| (p.x, p.y)).collect::<Vec<_>>()
            })
            .collect();
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            positions.contains(&(pos.x, pos.y))
        }));
        let effect = fx::fade_to(theme.empty_cell, theme.bg, (LINE_CLEAR_FADE_MS, Interpolation::Linear))
            .with_filter(filter)
            .with_area(canvas);
        flash.effect = Some(effect);
    }

    if let Some(effect) = flash.effect.as_mut() {
        frame.render_effect(effect, canvas, TfxDuration::from_millis(delta_ms));
    }
}

fn cue_label(cue: Cue) -> &'static str {
    match cue {
        Cue::Grab => "♪ grab",
        Cue::PlaceSuccess => "♪ place",
        Cue::PlaceFail => "♪ no fit",
        Cue::LineClear => "♪ clear!",
    }
}

fn draw_sidebar(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Stats
            Constraint::Length(1),
            Constraint::Length(3), // Cue
            Constraint::Length(1),
            Constraint::Min(8), // Controls
        ])
        .split(area);

    let stats_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let stats_inner = stats_block.inner(chunks[0]);
    stats_block.render(chunks[0], frame.buffer_mut());
    let left = view.snapshot.pieces.len();
    let stats = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(view.snapshot.score.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Best: ", title_style),
            Span::styled(view.snapshot.best_score.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Lines: ", title_style),
            Span::styled(view.lines_cleared.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Hand: ", title_style),
            Span::styled(format!("{left} left"), fg_style),
        ]),
    ];
    Paragraph::new(ratatui::text::Text::from(stats)).render(stats_inner, frame.buffer_mut());

    let cue_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let cue_inner = cue_block.inner(chunks[2]);
    cue_block.render(chunks[2], frame.buffer_mut());
    let cue_style = match view.cue {
        Some(Cue::PlaceFail) => Style::default().fg(Color::Red),
        Some(Cue::LineClear) => Style::default().fg(Color::Yellow).bold(),
        _ => fg_style,
    };
    Paragraph::new(Line::from(Span::styled(view.cue.map_or("", cue_label), cue_style)))
        .render(cue_inner, frame.buffer_mut());

    let help_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let help_inner = help_block.inner(chunks[4]);
    help_block.render(chunks[4], frame.buffer_mut());
    let dim = Style::default().fg(theme.inactive_fg);
    let help = vec![
        Line::from(Span::styled("Drag pieces with mouse", dim)),
        Line::from(Span::styled("1-3   pick piece", dim)),
        Line::from(Span::styled("←↑↓→  move", dim)),
        Line::from(Span::styled("Enter drop  Esc cancel", dim)),
        Line::from(Span::styled("P pause  R restart", dim)),
        Line::from(Span::styled("Q quit", dim)),
    ];
    Paragraph::new(ratatui::text::Text::from(help)).render(help_inner, frame.buffer_mut());
}

fn centered(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_menu(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let popup = centered(area, 40, 14);
    let swatch: Vec<Span> = ShapeKind::ALL
        .iter()
        .map(|k| Span::styled("██ ", Style::default().fg(theme.shape_color(*k))))
        .collect();
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(" blocktui ", Style::default().fg(theme.title).bold())),
        Line::from(""),
        Line::from(swatch),
        Line::from(""),
        Line::from(Span::styled(
            "Fill rows and columns to clear them.",
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!("Best: {}", view.snapshot.best_score),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " [ Enter / click — Start ] ",
            Style::default().fg(Color::Black).bg(theme.title).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled("Q — Quit", Style::default().fg(theme.inactive_fg))),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P — Resume    Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, view: &View, outer: Rect) {
    let theme = view.theme;
    let popup = centered(outer, 28, 9);
    let new_record = view.snapshot.score > 0 && view.snapshot.score == view.snapshot.best_score;
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " No moves left ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {} ", view.snapshot.score),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!(" Best: {} ", view.snapshot.best_score),
            Style::default().fg(theme.main_fg),
        )),
    ];
    if new_record {
        lines.push(Line::from(Span::styled(
            " New record! ",
            Style::default().fg(Color::Yellow).bold(),
        )));
    }
    lines.push(Line::from(Span::styled(
        " R — Restart    Q — Quit ",
        Style::default().fg(theme.main_fg),
    )));
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" Game Over ", Style::default().fg(theme.title))),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_quit_menu(frame: &mut Frame, theme: &Theme, selected: QuitOption) {
    let quit_rect = centered(frame.area(), 24, 8);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.title))
        .title(" Quit? ");

    // Clear background
    for pos in quit_rect.positions() {
        frame.buffer_mut()[pos].set_style(Style::default().bg(theme.bg));
    }

    let inner = block.inner(quit_rect);
    block.render(quit_rect, frame.buffer_mut());

    let options = [
        (QuitOption::Resume, " Resume "),
        (QuitOption::MainMenu, " Main Menu "),
        (QuitOption::Exit, " Exit "),
    ];
    for (i, (opt, label)) in options.iter().enumerate() {
        let style = if *opt == selected {
            Style::default().fg(theme.bg).bg(theme.title).bold()
        } else {
            Style::default().fg(theme.title)
        };
        let rx = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        let ry = inner.y + 1 + i as u16 * 2;
        frame.buffer_mut().set_string(rx, ry, label, style);
    }
}
