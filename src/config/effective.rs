//! Effective settings with provenance
//!
//! Captures the merged settings plus where each contributing layer came
//! from, so a patch output can be traced back to the exact inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

use shift_patcher::PatchSettings;
use shift_records::{FormKey, ModKey};

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;

/// Schema version for effective_config
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "tree-shift/effective_config@1";

/// Origin of a settings layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing settings layer with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Effective settings with full provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub schema_version: u32,

    pub schema_id: String,

    /// When these settings were computed
    pub created_at: DateTime<Utc>,

    /// Run ID (set later)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,

    /// The merged settings object
    pub config: Value,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,
}

impl EffectiveConfig {
    /// Build effective settings from the defaults, an optional settings file
    /// and optional CLI overrides.
    pub fn build(
        settings_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        if let Some(path) = settings_path {
            let (value, digest) = Self::load_file(path)?;
            layers.push(value);
            sources.push(ConfigSource {
                origin: ConfigOrigin::File,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        Self::validate_config(&merged)?;

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            run_id: None,
            config: merged,
            sources,
        })
    }

    /// Load a settings file, returning the value and digest.
    ///
    /// Files ending in `.json` are read as JSON; anything else as TOML.
    fn load_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let value = if is_json {
            serde_json::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e)))?
        } else {
            let toml_value: toml::Value = toml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;
            Self::toml_to_json(toml_value)
        };

        Ok((value, digest))
    }

    /// Convert TOML Value to JSON Value
    fn toml_to_json(toml: toml::Value) -> Value {
        match toml {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Number(i.into()),
            toml::Value::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Self::toml_to_json).collect())
            }
            toml::Value::Table(table) => {
                let map: serde_json::Map<String, Value> = table
                    .into_iter()
                    .map(|(k, v)| (k, Self::toml_to_json(v)))
                    .collect();
                Value::Object(map)
            }
        }
    }

    /// Validate merged values
    fn validate_config(config: &Value) -> Result<(), ConfigError> {
        match config.get("target") {
            Some(Value::String(target)) => {
                target.parse::<FormKey>().map_err(|e| {
                    ConfigError::ValidationError(format!("target: {}", e))
                })?;
            }
            Some(_) => {
                return Err(ConfigError::ValidationError(
                    "target must be a form key string like 0A1B2C:Skyrim.esm".to_string(),
                ));
            }
            None => {
                return Err(ConfigError::ValidationError(
                    "target is required (settings file or --target)".to_string(),
                ));
            }
        }

        let patch_name = config
            .get("patch_name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ConfigError::ValidationError("patch_name must be a string".to_string()))?;
        patch_name
            .parse::<ModKey>()
            .map_err(|e| ConfigError::ValidationError(format!("patch_name: {}", e)))?;

        for axis in ["x", "y", "z"] {
            let Some(edit) = config.get(axis) else {
                continue;
            };
            if let Some(enabled) = edit.get("enabled") {
                if !enabled.is_boolean() {
                    return Err(ConfigError::ValidationError(format!(
                        "{}.enabled must be true or false",
                        axis
                    )));
                }
            }
            if let Some(delta) = edit.get("delta") {
                Self::validate_delta(axis, delta)?;
            }
        }

        Ok(())
    }

    /// Deltas are stored as `f32`. A value that overflows to infinity cannot be
    /// written back into a layer, and a non-zero value that underflows to zero
    /// would trip the zero-delta abandon.
    fn validate_delta(axis: &str, delta: &Value) -> Result<(), ConfigError> {
        let Some(wide) = delta.as_f64() else {
            return Err(ConfigError::ValidationError(format!(
                "{}.delta must be a finite number",
                axis
            )));
        };
        let narrow = wide as f32;
        if !narrow.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "{}.delta {} is out of range for a position offset",
                axis, wide
            )));
        }
        if narrow == 0.0 && wide != 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "{}.delta {} is too small for a position offset",
                axis, wide
            )));
        }
        Ok(())
    }

    /// Typed settings for the patcher.
    pub fn patch_settings(&self) -> Result<PatchSettings, ConfigError> {
        PatchSettings::deserialize(&self.config)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// Plugin name for the output layer.
    pub fn patch_name(&self) -> Result<ModKey, ConfigError> {
        self.get_str("patch_name")
            .ok_or_else(|| ConfigError::ValidationError("patch_name missing".to_string()))?
            .parse()
            .map_err(|e| ConfigError::ValidationError(format!("patch_name: {}", e)))
    }

    /// Set run context
    pub fn with_run_id(mut self, run_id: String) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }

    /// Get a value by path (dot-separated)
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.config;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    pub fn get_f64(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(|v| v.as_f64())
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(|v| v.as_bool())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
