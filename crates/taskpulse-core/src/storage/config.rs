//! TOML-based application configuration.
//!
//! Stores:
//! - Risk evaluation tuning (bias clamps, default coefficient, warning cap)
//! - List display preferences (sort order, default estimate for new tasks)
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::stats::{BiasPolicy, RiskPolicy, DEFAULT_MAX_WARNINGS};
use crate::task::query::SortOrder;

const FILE_NAME: &str = "config.toml";

/// Risk evaluation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    #[serde(default = "default_max_warnings")]
    pub max_warnings: usize,
    #[serde(default = "default_bias")]
    pub default_bias: f64,
    #[serde(default = "default_ratio_min")]
    pub ratio_min: f64,
    #[serde(default = "default_ratio_max")]
    pub ratio_max: f64,
    #[serde(default = "default_coefficient_min")]
    pub coefficient_min: f64,
    #[serde(default = "default_coefficient_max")]
    pub coefficient_max: f64,
}

/// List display configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub sort: SortOrder,
    /// Estimate given to new tasks created without one
    #[serde(default = "default_estimate_minutes")]
    pub default_estimate_minutes: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_max_warnings() -> usize {
    DEFAULT_MAX_WARNINGS
}
fn default_bias() -> f64 {
    BiasPolicy::new().default_coefficient
}
fn default_ratio_min() -> f64 {
    BiasPolicy::new().ratio_min
}
fn default_ratio_max() -> f64 {
    BiasPolicy::new().ratio_max
}
fn default_coefficient_min() -> f64 {
    BiasPolicy::new().coefficient_min
}
fn default_coefficient_max() -> f64 {
    BiasPolicy::new().coefficient_max
}
fn default_estimate_minutes() -> u32 {
    30
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_warnings: default_max_warnings(),
            default_bias: default_bias(),
            ratio_min: default_ratio_min(),
            ratio_max: default_ratio_max(),
            coefficient_min: default_coefficient_min(),
            coefficient_max: default_coefficient_max(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            sort: SortOrder::default(),
            default_estimate_minutes: default_estimate_minutes(),
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
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            value
                                .parse::<f64>()
                                .ok()
                                .and_then(serde_json::Number::from_f64)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(unknown());
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

    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(FILE_NAME)
    }

    /// Load from the default data directory, falling back to defaults.
    pub fn load() -> Self {
        match data_dir() {
            Ok(dir) => Self::load_from(&dir),
            Err(e) => {
                tracing::warn!("data directory unavailable, using default config: {e}");
                Self::default()
            }
        }
    }

    /// Load `config.toml` from `dir`, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load_from(dir: &Path) -> Self {
        let path = Self::path_in(dir);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };
        match Self::parse(&content) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring config: {e}");
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default data directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&data_dir()?)
    }

    pub fn save_to(&self, dir: &Path) -> Result<()> {
        let path = Self::path_in(dir);
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.clone(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::create_dir_all(dir).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| save_failed(e.to_string()))?;
        tracing::info!(path = %path.display(), "config saved");
        Ok(())
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

    /// Set a config value by dot-separated key, keeping the existing type.
    ///
    /// Does not persist; call [`Config::save`] afterwards.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let next: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Reject clamp ranges that are inverted, non-positive or non-finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.risk;
        let finite = [
            ("risk.default_bias", r.default_bias),
            ("risk.ratio_min", r.ratio_min),
            ("risk.ratio_max", r.ratio_max),
            ("risk.coefficient_min", r.coefficient_min),
            ("risk.coefficient_max", r.coefficient_max),
        ];
        if let Some((key, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: "must be a finite number".to_string(),
            });
        }
        let check = |ok: bool, key: &str, message: &str| {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: message.to_string(),
                })
            }
        };
        check(r.ratio_min > 0.0, "risk.ratio_min", "must be positive")?;
        check(r.ratio_min <= r.ratio_max, "risk.ratio_max", "must not be below risk.ratio_min")?;
        check(r.coefficient_min > 0.0, "risk.coefficient_min", "must be positive")?;
        check(
            r.coefficient_min <= r.coefficient_max,
            "risk.coefficient_max",
            "must not be below risk.coefficient_min",
        )?;
        check(r.default_bias > 0.0, "risk.default_bias", "must be positive")
    }

    pub fn bias_policy(&self) -> BiasPolicy {
        BiasPolicy {
            ratio_min: self.risk.ratio_min,
            ratio_max: self.risk.ratio_max,
            coefficient_min: self.risk.coefficient_min,
            coefficient_max: self.risk.coefficient_max,
            default_coefficient: self.risk.default_bias,
        }
    }

    pub fn risk_policy(&self) -> RiskPolicy {
        RiskPolicy {
            bias: self.bias_policy(),
            max_warnings: self.risk.max_warnings,
        }
    }
}
