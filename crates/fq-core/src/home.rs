//! Canonical home directory resolution for fq
//!
//! # Precedence
//!
//! 1. `FQ_HOME` environment variable (if set and non-empty)
//! 2. `dirs::home_dir()` platform default
//!
//! Integration tests point `FQ_HOME` at a temp dir so a developer's global
//! `~/.config/fq/config.toml` never leaks into them.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Get the home directory used to locate the global config
pub fn get_home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("FQ_HOME") {
        let trimmed = home.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    dirs::home_dir().context("Could not determine home directory")
}
