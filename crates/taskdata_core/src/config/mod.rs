use crate::error::AppError;
use crate::logging::LogLevel;
use crate::storage::{DEFAULT_DATA_FOLDER, DataFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TASKDATA_CONFIG_PATH";
pub const DATA_DIR_ENV_VAR: &str = "TASKDATA_DIR";

/// Settings as written in the config file; every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub data_dir: Option<String>,
    pub format: Option<String>,
    pub log_level: Option<String>,
}

/// Typed, validated view of a [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_folder: PathBuf,
    pub format: DataFormat,
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_folder: PathBuf::from(DEFAULT_DATA_FOLDER),
            format: DataFormat::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    pub fn resolve(&self) -> Result<Settings, AppError> {
        let defaults = Settings::default();
        Ok(Settings {
            data_folder: non_blank(self.data_dir.as_deref())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_folder),
            format: match non_blank(self.format.as_deref()) {
                Some(format) => format.parse()?,
                None => defaults.format,
            },
            log_level: match non_blank(self.log_level.as_deref()) {
                Some(level) => level.parse()?,
                None => defaults.log_level,
            },
        })
    }
}

impl ConfigOverrides {
    /// Sets one override by key; see [`canonical_key`] for accepted spellings.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), AppError> {
        let slot = match canonical_key(key) {
            Some("data_dir") => &mut self.data_dir,
            Some("format") => &mut self.format,
            Some("log_level") => &mut self.log_level,
            _ => {
                return Err(AppError::invalid_input(format!(
                    "unknown config key '{key}'. Valid keys are: data_dir, format, log_level"
                )));
            }
        };
        *slot = Some(value.into());
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Maps `data-dir`, `DataDir`, `log.level` and similar onto field names.
pub fn canonical_key(raw: &str) -> Option<&'static str> {
    let squashed: String = raw
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_lowercase())
        .collect();

    match squashed.as_str() {
        "datadir" | "dir" | "folder" | "datafolder" => Some("data_dir"),
        "format" | "dataformat" => Some("format"),
        "loglevel" | "log" | "level" => Some("log_level"),
        _ => None,
    }
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("taskdata")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("taskdata")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config() -> Result<Config, AppError> {
    let path = config_path()?;
    load_config_from_path(&path)
}

/// Never fails: problems come back in `error` next to the default config.
pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })
}

/// `TASKDATA_DIR`, when set, replaces the configured data folder.
pub fn apply_env(base: &Config) -> Config {
    apply_data_dir_env(base, std::env::var(DATA_DIR_ENV_VAR).ok())
}

fn apply_data_dir_env(base: &Config, data_dir: Option<String>) -> Config {
    let mut merged = base.clone();
    if let Some(dir) = data_dir
        && !dir.trim().is_empty()
    {
        merged.data_dir = Some(dir);
    }
    merged
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(dir) = overrides.data_dir.as_ref() {
        merged.data_dir = Some(dir.clone());
    }
    if let Some(format) = overrides.format.as_ref() {
        merged.format = Some(format.clone());
    }
    if let Some(level) = overrides.log_level.as_ref() {
        merged.log_level = Some(level.clone());
    }
    merged
}
