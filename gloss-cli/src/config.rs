//! User configuration loaded from ~/.gloss/config.toml

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use gloss_core::{MarkerFormat, Palette};

use crate::io::config_path;

/// Output target
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    Latex,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub format: OutputFormat,
    pub marker_format: MarkerFormat,
    pub standalone: bool,
    /// Per-tag colors and labels
    pub tags: Palette,
}

impl Config {
    pub fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("Invalid config")
    }

    /// Load an explicit config file, or the default one if it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::read(path),
            None => Self::load_default(&config_path()?),
        }
    }

    /// Defaults when `path` does not exist
    pub fn load_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::read(path)
    }

    fn read(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config =
            Self::parse(&raw).with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
