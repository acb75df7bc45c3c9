//! File I/O for the CLI

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use gloss_core::{sort_highlights, Highlight};

/// Highlight files are either a bare array or wrapped in an object
#[derive(Deserialize)]
#[serde(untagged)]
enum HighlightFile {
    List(Vec<Highlight>),
    Wrapped { highlights: Vec<Highlight> },
}

/// Read the markup document
pub fn load_markup(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read markup: {}", path.display()))
}

/// Parse highlight records and put them in document order
pub fn parse_highlights(raw: &str) -> Result<Vec<Highlight>> {
    let file: HighlightFile =
        serde_json::from_str(raw).context("Expected a highlight array or {\"highlights\": [...]}")?;
    let mut highlights = match file {
        HighlightFile::List(list) => list,
        HighlightFile::Wrapped { highlights } => highlights,
    };
    sort_highlights(&mut highlights);
    Ok(highlights)
}

pub fn load_highlights(path: &Path) -> Result<Vec<Highlight>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read highlights: {}", path.display()))?;
    parse_highlights(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write to `path`, or stdout when none is given
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n").context("Failed to write to stdout")?;
            }
            Ok(())
        }
    }
}

/// The ~/.gloss directory under `home`; never created here
pub fn gloss_dir_in(home: &Path) -> PathBuf {
    home.join(".gloss")
}

/// Default config location, ~/.gloss/config.toml
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(gloss_dir_in(&home).join("config.toml"))
}
