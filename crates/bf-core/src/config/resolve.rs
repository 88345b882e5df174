//! Layout file discovery.
//!
//! Resolution order: CLI argument → `BF_LAYOUT` → `BF_CONFIG_DIR/layout.json`
//! → XDG config dir (`bf-type/layout.json`) → built-in preset.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::ConfigError;

/// Where the layout came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    CliArgument,
    Environment,
    XdgConfig,
    #[default]
    BuiltinPreset,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinPreset => write!(f, "builtin preset"),
        }
    }
}

pub const ENV_LAYOUT_PATH: &str = "BF_LAYOUT";
pub const ENV_CONFIG_DIR: &str = "BF_CONFIG_DIR";
pub const LAYOUT_FILENAME: &str = "layout.json";
pub const APP_NAME: &str = "bf-type";

/// Find the layout file to load, if any.
///
/// Explicit paths (CLI argument, `BF_LAYOUT`) must exist; directory-based
/// candidates are skipped when absent.
pub fn resolve_layout_path(
    cli_path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
    xdg_dir: Option<PathBuf>,
) -> Result<(Option<PathBuf>, ConfigSource), ConfigError> {
    if let Some(path) = cli_path {
        return existing(path.to_path_buf(), ConfigSource::CliArgument);
    }

    if let Some(path) = env(ENV_LAYOUT_PATH).filter(|p| !p.is_empty()) {
        return existing(PathBuf::from(path), ConfigSource::Environment);
    }

    if let Some(dir) = env(ENV_CONFIG_DIR).filter(|p| !p.is_empty()) {
        let path = PathBuf::from(dir).join(LAYOUT_FILENAME);
        if path.is_file() {
            return Ok((Some(path), ConfigSource::Environment));
        }
    }

    if let Some(dir) = xdg_dir {
        let path = dir.join(LAYOUT_FILENAME);
        if path.is_file() {
            return Ok((Some(path), ConfigSource::XdgConfig));
        }
    }

    Ok((None, ConfigSource::BuiltinPreset))
}

fn existing(
    path: PathBuf,
    source: ConfigSource,
) -> Result<(Option<PathBuf>, ConfigSource), ConfigError> {
    if path.is_file() {
        Ok((Some(path), source))
    } else {
        Err(ConfigError::NotFound { path })
    }
}

/// XDG config directory for bf-type.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
