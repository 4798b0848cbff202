//! Startup configuration.
//!
//! Initial control values for the effect, loaded from a JSON file given on
//! the command line. Missing fields fall back to the parameter defaults,
//! and every loaded value is clamped to its parameter range before it
//! reaches the engine.

use serde::{Deserialize, Serialize};

use crate::dsp::{control_parameters, PARAM_FREQUENCY, PARAM_MIX, PARAM_SHAPE, PARAM_VOLUME};

/// Startup values for the four control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Carrier frequency in Hz.
    pub frequency: f32,
    /// Carrier shape, 0.0-1.0.
    pub shape: f32,
    /// Dry/wet mix, 0.0-1.0.
    pub mix: f32,
    /// Output volume in dB.
    pub volume_db: f32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        let params = control_parameters();
        Self {
            frequency: params[PARAM_FREQUENCY].default,
            shape: params[PARAM_SHAPE].default,
            mix: params[PARAM_MIX].default,
            volume_db: params[PARAM_VOLUME].default,
        }
    }
}

impl EffectConfig {
    /// Returns a copy with every value clamped to its parameter range.
    pub fn clamped(&self) -> Self {
        let params = control_parameters();
        Self {
            frequency: params[PARAM_FREQUENCY].clamp(self.frequency),
            shape: params[PARAM_SHAPE].clamp(self.shape),
            mix: params[PARAM_MIX].clamp(self.mix),
            volume_db: params[PARAM_VOLUME].clamp(self.volume_db),
        }
    }
}

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON deserialization error.
    SerializationError(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "File error: {}", e),
            Self::SerializationError(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(e) => Some(e),
            Self::SerializationError(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err)
    }
}

/// Load a configuration from a JSON file.
pub fn load_from_file(path: &std::path::Path) -> Result<EffectConfig, ConfigError> {
    let json = std::fs::read_to_string(path)?;
    let config: EffectConfig = serde_json::from_str(&json)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_parameters() {
        let config = EffectConfig::default();
        assert_eq!(config.frequency, 440.0);
        assert_eq!(config.shape, 1.0);
        assert_eq!(config.mix, 1.0);
        assert_eq!(config.volume_db, 0.0);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = EffectConfig {
            frequency: 880.0,
            shape: 0.5,
            mix: 0.75,
            volume_db: -3.0,
        };

        let json = serde_json::to_string(&config).unwrap();
        let loaded: EffectConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let loaded: EffectConfig = serde_json::from_str(r#"{"frequency": 1000.0}"#).unwrap();
        assert_eq!(loaded.frequency, 1000.0);
        assert_eq!(loaded.shape, 1.0);
        assert_eq!(loaded.mix, 1.0);
        assert_eq!(loaded.volume_db, 0.0);
    }

    #[test]
    fn test_clamped_enforces_ranges() {
        let config = EffectConfig {
            frequency: 96_000.0,
            shape: 1.5,
            mix: -0.5,
            volume_db: -40.0,
        };

        let clamped = config.clamped();
        assert_eq!(clamped.frequency, 10_000.0);
        assert_eq!(clamped.shape, 1.0);
        assert_eq!(clamped.mix, 0.0);
        assert_eq!(clamped.volume_db, -12.0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_from_file(std::path::Path::new("/nonexistent/config.json"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let result: Result<EffectConfig, _> =
            serde_json::from_str("not json").map_err(ConfigError::from);
        assert!(matches!(result, Err(ConfigError::SerializationError(_))));
    }
}
