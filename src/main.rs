//! blocktui — drag-and-drop block puzzle in the terminal: fill rows and columns on an 8×8 board.

mod app;
mod board;
mod drag;
mod error;
mod game;
mod hand;
mod highscores;
mod input;
mod shapes;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Options derived from CLI that affect game behaviour.
#[derive(Debug, Clone, Default)]
pub struct GameConfig {
    /// Fixed seed for hand generation; random when None.
    pub seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        init_logging(path)?;
    }
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let config = GameConfig { seed: args.seed };
    let mut app = App::new(args, config, theme);
    app.run()?;
    Ok(())
}

/// Send `log` records to a file; the terminal belongs to the game.
fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Drag-and-drop block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blocktui",
    version,
    about = "Drag-and-drop block puzzle in the terminal. Fill rows and columns to clear them.",
    long_about = "blocktui is a terminal block puzzle played on an 8x8 board.\n\n\
        Each hand deals three pieces. Drag a piece from the tray onto the board with the \
        mouse; it lands where it is shown. Every full row or column is cleared. A new hand \
        is dealt once all three are placed. The game ends when no remaining piece fits.\n\n\
        SCORING:\n  +10 per piece placed   +100 per row or column cleared\n\n\
        CONTROLS (keyboard):\n  1/2/3       Pick piece   Arrows/hjkl  Move   Enter/Space  Drop\n  \
        Esc         Cancel       P            Pause  R            Restart   Q  Quit\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Path to theme file (btop-style theme[key]=\"value\"). Uses the built-in palette if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Skip main menu and start game immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Disable line-clear fade (cells vanish instantly).
    #[arg(long)]
    pub no_animation: bool,

    /// Target render frames per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Seed for hand generation (reproducible games).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Ring the terminal bell on a rejected drop or a line clear.
    #[arg(long)]
    pub bell: bool,

    /// Write diagnostics to this file (filter with RUST_LOG).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Where the best score is kept. Defaults to $XDG_CONFIG_HOME/blocktui/best_score.
    #[arg(long, value_name = "FILE")]
    pub best_score_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["blocktui"]);
        assert_eq!(args.palette, Palette::Normal);
        assert!(!args.no_menu);
        assert!(args.seed.is_none());
        assert!((args.frame_rate - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_palette_aliases_and_seed() {
        let args = Args::parse_from(["blocktui", "--palette", "colourblind", "--seed", "42"]);
        assert_eq!(args.palette, Palette::Colorblind);
        assert_eq!(args.seed, Some(42));
    }
}
