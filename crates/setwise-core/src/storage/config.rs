//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Timer tick granularity and default rest
//! - Progression defaults for newly created exercises
//! - Log level
//!
//! Configuration is stored at `<data dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::model::DEFAULT_DAYS_BEFORE_INCREASE;

/// Timer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// How often hosts should tick a running session.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_rest_secs")]
    pub default_rest_secs: u64,
}

/// Defaults applied to exercises created without explicit progression values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    #[serde(default = "default_days_before_increase")]
    pub days_before_increase: i64,
    #[serde(default = "default_weight_increment")]
    pub weight_increment: f64,
    #[serde(default = "default_duration_increment_secs")]
    pub duration_increment_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub progression: ProgressionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// Default functions
fn default_tick_interval_ms() -> u64 {
    100
}
fn default_rest_secs() -> u64 {
    90
}
fn default_days_before_increase() -> i64 {
    DEFAULT_DAYS_BEFORE_INCREASE
}
fn default_weight_increment() -> f64 {
    2.5
}
fn default_duration_increment_secs() -> u64 {
    15
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            default_rest_secs: default_rest_secs(),
        }
    }
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            days_before_increase: default_days_before_increase(),
            weight_increment: default_weight_increment(),
            duration_increment_secs: default_duration_increment_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(n) => {
                        if n.is_f64() {
                            value
                                .parse::<f64>()
                                .ok()
                                .and_then(serde_json::Number::from_f64)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as integer")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Update a value in memory by dot-separated key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field's type.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Update a value and persist.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(%e, "falling back to default configuration");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.timer.tick_interval_ms, 100);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: Config = toml::from_str("[timer]\ntick_interval_ms = 250\n").unwrap();
        assert_eq!(parsed.timer.tick_interval_ms, 250);
        assert_eq!(parsed.timer.default_rest_secs, 90);
        assert_eq!(parsed.progression.days_before_increase, 4);
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.tick_interval_ms").as_deref(), Some("100"));
        assert_eq!(cfg.get("logging.level").as_deref(), Some("info"));
        assert_eq!(cfg.get("progression.weight_increment").as_deref(), Some("2.5"));
        assert!(cfg.get("timer.missing_key").is_none());
    }

    #[test]
    fn apply_updates_integer_float_and_string() {
        let mut cfg = Config::default();
        cfg.apply("timer.default_rest_secs", "120").unwrap();
        cfg.apply("progression.weight_increment", "5").unwrap();
        cfg.apply("progression.days_before_increase", "-1").unwrap();
        cfg.apply("logging.level", "debug").unwrap();
        assert_eq!(cfg.timer.default_rest_secs, 120);
        assert_eq!(cfg.progression.weight_increment, 5.0);
        assert_eq!(cfg.progression.days_before_increase, -1);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("timer.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.apply("", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        let result = cfg.apply("timer.tick_interval_ms", "fast");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        // Negative values do not fit an unsigned field.
        assert!(cfg.apply("timer.tick_interval_ms", "-5").is_err());
        assert_eq!(cfg.timer.tick_interval_ms, 100);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn save_then_load_preserves_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.apply("timer.tick_interval_ms", "50").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().timer.tick_interval_ms, 50);
    }

    #[test]
    fn load_from_garbage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timer = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
