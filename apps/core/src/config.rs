use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action_executor::DEFAULT_TERMINAL;

const APP_DIR_NAME: &str = "sshrunner";
const CONFIG_FILE_NAME: &str = "config.toml";
const KDE_GLOBALS_FILE_NAME: &str = "kdeglobals";
const KDE_GENERAL_GROUP: &str = "[General]";
const KDE_TERMINAL_KEY: &str = "TerminalApplication";

pub const DEFAULT_LOG_FILTER: &str = "sshrunner_core=info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Terminal program used to host the ssh session, optionally with its own
    /// arguments. Unset means "ask the desktop, then fall back to konsole".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_application: Option<String>,
    pub log_filter: String,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            terminal_application: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            config_path: default_config_path(),
        }
    }
}

impl Config {
    pub fn terminal(&self) -> String {
        let globals = dirs::config_dir().map(|dir| dir.join(KDE_GLOBALS_FILE_NAME));
        resolve_terminal(self.terminal_application.as_deref(), globals.as_deref())
    }
}

pub fn stable_app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);

    let mut cfg = match std::fs::read_to_string(&config_path) {
        Ok(raw) => toml::from_str::<Config>(&raw).map_err(|source| ConfigError::Parse {
            path: config_path.clone(),
            source,
        })?,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(source) => {
            return Err(ConfigError::Read {
                path: config_path,
                source,
            })
        }
    };
    cfg.config_path = config_path;

    validate(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    validate(cfg).map_err(ConfigError::Invalid)?;
    let encoded = toml::to_string_pretty(cfg)?;

    if let Some(parent) = cfg.config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(&cfg.config_path, encoded).map_err(|source| ConfigError::Write {
        path: cfg.config_path.clone(),
        source,
    })
}

pub fn validate(cfg: &Config) -> Result<(), String> {
    if let Some(terminal) = cfg.terminal_application.as_deref() {
        match shlex::split(terminal) {
            Some(parts) if !parts.is_empty() => {}
            Some(_) => return Err("terminal_application is empty".into()),
            None => return Err(format!("terminal_application cannot be parsed: {terminal}")),
        }
    }

    if cfg.log_filter.trim().is_empty() {
        return Err("log_filter is required".into());
    }

    if cfg.config_path.as_os_str().is_empty() {
        return Err("config_path is required".into());
    }

    Ok(())
}

/// Picks the terminal program: explicit setting, then the desktop-wide
/// preference in `kdeglobals`, then [`DEFAULT_TERMINAL`].
pub fn resolve_terminal(configured: Option<&str>, kde_globals: Option<&Path>) -> String {
    if let Some(terminal) = configured.map(str::trim).filter(|t| !t.is_empty()) {
        return terminal.to_string();
    }

    kde_globals
        .and_then(|path| std::fs::read_to_string(path).ok())
        .and_then(|raw| kde_terminal_preference(&raw))
        .unwrap_or_else(|| DEFAULT_TERMINAL.to_string())
}

fn kde_terminal_preference(raw: &str) -> Option<String> {
    let mut in_general = false;
    for line in raw.lines().map(str::trim) {
        if line.starts_with('[') {
            in_general = line == KDE_GENERAL_GROUP;
            continue;
        }
        if !in_general {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        // Path entries may carry the `[$e]` expansion marker.
        let key = key.trim().trim_end_matches("[$e]");
        if key != KDE_TERMINAL_KEY {
            continue;
        }

        let value = expand_home(value.trim());
        if !value.is_empty() {
            return Some(value);
        }
    }
    None
}

fn expand_home(value: &str) -> String {
    let home = dirs::home_dir();
    match (value.strip_prefix("~/"), value.strip_prefix("$HOME/"), home) {
        (Some(rest), _, Some(home)) | (_, Some(rest), Some(home)) => {
            home.join(rest).to_string_lossy().into_owned()
        }
        _ => value.to_string(),
    }
}
