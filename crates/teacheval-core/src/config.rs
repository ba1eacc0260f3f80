//! Local settings for the teacheval tools.
//!
//! These are operator settings (where state lives, how output is rendered),
//! distinct from the persisted domain [`Config`](crate::model::Config).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `data_dir`.
pub const DATA_DIR_ENV: &str = "TEACHEVAL_DATA_DIR";

/// Top-level teacheval settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding one JSON file per storage key.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Output format used when a command is not given `--format`.
    #[serde(default = "default_format")]
    pub default_format: String,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./teacheval-data")
}
fn default_format() -> String {
    "text".to_string()
}
fn default_log_filter() -> String {
    "teacheval=info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_format: default_format(),
            log_filter: default_log_filter(),
        }
    }
}

/// Replace `${VAR_NAME}` references with environment values. Unset
/// variables expand to the empty string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

/// Load settings from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `teacheval.toml` in the current directory
/// 2. `~/.config/teacheval/config.toml`
///
/// `TEACHEVAL_DATA_DIR` overrides the file's `data_dir`.
pub fn load_settings_from(path: Option<&Path>) -> Result<Settings> {
    let settings_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("teacheval.toml");
            if local.exists() {
                Some(local)
            } else {
                config_dir()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut settings = match settings_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_settings(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => Settings::default(),
    };

    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            settings.data_dir = PathBuf::from(dir);
        }
    }

    Ok(settings)
}

/// Parse a settings document and expand environment references in `data_dir`.
pub fn parse_settings(content: &str) -> Result<Settings> {
    let mut settings: Settings = toml::from_str(content)?;
    let raw = settings.data_dir.to_string_lossy().into_owned();
    settings.data_dir = PathBuf::from(resolve_env_vars(&raw));
    Ok(settings)
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("teacheval"))
}
