use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the configuration directory (tests, portable installs).
pub const CONFIG_DIR_ENV: &str = "RTAGTRACKER_CONFIG_DIR";

/// Fields every configuration file is expected to carry.
pub const KNOWN_FIELDS: [&str; 6] = [
    "database",
    "timezone",
    "metrics_window_days",
    "default_days",
    "lookback_hours",
    "log_level",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    /// IANA name of the reference timezone used for day bucketing.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_window_days")]
    pub metrics_window_days: u32,
    /// Days shown by `blocks` / `events` when no period is given.
    #[serde(default = "default_days")]
    pub default_days: u32,
    /// Hours of events loaded on each side of a window. Sessions reaching past
    /// that margin are still completed by per-tag lookups.
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_timezone() -> String {
    "UTC".to_string()
}
fn default_window_days() -> u32 {
    7
}
fn default_days() -> u32 {
    2
}
fn default_lookback_hours() -> u32 {
    24
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            timezone: default_timezone(),
            metrics_window_days: default_window_days(),
            default_days: default_days(),
            lookback_hours: default_lookback_hours(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if let Ok(dir) = env::var(CONFIG_DIR_ENV)
            && !dir.trim().is_empty()
        {
            return PathBuf::from(dir);
        }

        if cfg!(target_os = "windows") {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("rtagtracker")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".rtagtracker")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rtagtracker.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rtagtracker.sqlite")
    }

    /// Load configuration from the standard file, or defaults if not found.
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> AppResult<()> {
        self.tz()?;
        if self.metrics_window_days == 0 {
            return Err(AppError::Config(
                "metrics_window_days must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Parsed reference timezone.
    pub fn tz(&self) -> AppResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| AppError::InvalidTimezone(self.timezone.clone()))
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    /// Fields from [`KNOWN_FIELDS`] absent from a YAML config text.
    pub fn missing_fields(content: &str) -> AppResult<Vec<&'static str>> {
        let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
        let Some(map) = yaml.as_mapping() else {
            return Ok(KNOWN_FIELDS.to_vec());
        };

        Ok(KNOWN_FIELDS
            .iter()
            .copied()
            .filter(|k| !map.contains_key(serde_yaml::Value::String((*k).to_string())))
            .collect())
    }

    /// Initialize configuration and database files.
    /// Returns the database path.
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = match custom_name {
            Some(name) => {
                let p = Path::new(&name);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => dir.join("rtagtracker.sqlite"),
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        // Write config file
        if !is_test {
            config.save_to(&Self::config_file())?;
            success(format!("Config file: {:?}", Self::config_file()));
        }

        Ok(db_path)
    }
}
