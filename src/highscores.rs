//! Persist the best score to disk (XDG config or ~/.config/blocktui).

use anyhow::Result;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

const FILENAME: &str = "best_score";

/// Default location: config dir / blocktui / best_score.
pub fn default_path() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join("blocktui").join(FILENAME)
}

/// Load the best score. 0 on missing file, unreadable storage or parse error.
pub fn load_best_score(path: &Path) -> u32 {
    match fs::read_to_string(path) {
        Ok(content) => content.trim().parse::<u32>().unwrap_or_else(|_| {
            warn!("ignoring malformed best score in {}", path.display());
            0
        }),
        Err(_) => 0,
    }
}

/// Save the best score. Creates the parent directory if needed.
pub fn save_best_score(path: &Path, score: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format!("{}\n", score))?;
    Ok(())
}
