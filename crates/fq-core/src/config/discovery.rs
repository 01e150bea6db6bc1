//! Configuration discovery and resolution

use super::types::Config;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Command-line overrides for configuration
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Override data directory
    pub data_dir: Option<PathBuf>,
    /// Override default pending file
    pub pending: Option<PathBuf>,
    /// Override lock retry count
    pub lock_retries: Option<u32>,
    /// Explicit config file, used instead of repo-local discovery
    pub config_path: Option<PathBuf>,
}

/// Resolve configuration from all sources
///
/// Priority (highest to lowest):
/// 1. Command-line overrides
/// 2. Environment variables
/// 3. Repo-local config (.fq.toml in current dir or up to git root),
///    or the explicit `config_path` override
/// 4. Global config (~/.config/fq/config.toml)
/// 5. Defaults
///
/// Unparsable discovered files are skipped with a warning. An explicit
/// `config_path` that cannot be read or parsed is an error.
pub fn resolve_config(
    overrides: &ConfigOverrides,
    current_dir: &Path,
    home_dir: &Path,
) -> Result<Config, ConfigError> {
    let mut config = Config::default();

    // 4. Try global config
    let global_config_path = home_dir.join(".config/fq/config.toml");
    if global_config_path.exists() {
        if let Ok(file_config) = load_config_file(&global_config_path) {
            merge_config(&mut config, file_config);
        } else {
            warn!("Failed to parse global config at {global_config_path:?}");
        }
    }

    // 3. Explicit config file, or repo-local config
    if let Some(ref explicit) = overrides.config_path {
        merge_config(&mut config, load_config_file(explicit)?);
    } else if let Some(repo_config) = find_repo_local_config(current_dir) {
        if let Ok(file_config) = load_config_file(&repo_config) {
            merge_config(&mut config, file_config);
        } else {
            warn!("Failed to parse repo config at {repo_config:?}");
        }
    }

    // 2. Apply environment variables
    apply_env_overrides(&mut config);

    // 1. Apply command-line overrides
    apply_cli_overrides(&mut config, overrides);

    Ok(config)
}

/// Find repo-local config file
///
/// Searches current directory and parent directories up to git root
fn find_repo_local_config(current_dir: &Path) -> Option<PathBuf> {
    let mut dir = current_dir;

    loop {
        let config_path = dir.join(".fq.toml");
        if config_path.exists() {
            return Some(config_path);
        }

        // Stop at git root
        if dir.join(".git").exists() {
            break;
        }

        dir = dir.parent()?;
    }

    None
}

/// Load config from a TOML file
fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

/// Merge file config into base config; only fields the file sets win
fn merge_config(base: &mut Config, file: Config) {
    if file.queue.data_dir.is_some() {
        base.queue.data_dir = file.queue.data_dir;
    }
    if file.queue.pending.is_some() {
        base.queue.pending = file.queue.pending;
    }
    if file.queue.running.is_some() {
        base.queue.running = file.queue.running;
    }
    if file.queue.done.is_some() {
        base.queue.done = file.queue.done;
    }

    if file.lock.max_retries.is_some() {
        base.lock.max_retries = file.lock.max_retries;
    }
}

/// Apply environment variable overrides
fn apply_env_overrides(config: &mut Config) {
    if let Ok(data_dir) = std::env::var("FQ_DATA_DIR") {
        config.queue.data_dir = Some(PathBuf::from(data_dir));
    }

    if let Ok(pending) = std::env::var("FQ_PENDING") {
        config.queue.pending = Some(PathBuf::from(pending));
    }

    if let Ok(retries) = std::env::var("FQ_LOCK_RETRIES") {
        match retries.trim().parse::<u32>() {
            Ok(n) => config.lock.max_retries = Some(n),
            Err(_) => warn!("Ignoring invalid FQ_LOCK_RETRIES value {retries:?}"),
        }
    }
}

/// Apply command-line overrides
fn apply_cli_overrides(config: &mut Config, overrides: &ConfigOverrides) {
    if let Some(ref data_dir) = overrides.data_dir {
        config.queue.data_dir = Some(data_dir.clone());
    }

    if let Some(ref pending) = overrides.pending {
        config.queue.pending = Some(pending.clone());
    }

    if let Some(retries) = overrides.lock_retries {
        config.lock.max_retries = Some(retries);
    }
}
