//! # Configuration Loading
//!
//! TOML configuration for the signalcast runner. Every section and field is
//! optional; omitted values fall back to the library defaults.
//!
//! ```toml
//! [forecast]
//! max_variation_coefficient = 0.5
//! horizon = 2
//!
//! [backtest]
//! window_size = 16
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use signalcast_eval::BacktestConfig;
use signalcast_forecast::ForecastConfig;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Root configuration schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub forecast: ForecastConfig,
    pub backtest: BacktestConfig,
}

impl RunnerConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.forecast
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.backtest
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RunnerConfig::from_toml_str("").unwrap();
        assert_eq!(config, RunnerConfig::default());
        assert_eq!(config.backtest.window_size, 16);
        assert_eq!(config.forecast.horizon, 2);
    }

    #[test]
    fn test_partial_sections() {
        let config = RunnerConfig::from_toml_str(
            r#"
            [forecast]
            max_variation_coefficient = 0.3

            [backtest]
            window_size = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.forecast.max_variation_coefficient, 0.3);
        assert_eq!(config.forecast.horizon, 2);
        assert_eq!(config.backtest.window_size, 8);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = RunnerConfig::from_toml_str("[backtest]\nwindow_size = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = RunnerConfig::from_toml_str("[forecast]\nhorizon = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = RunnerConfig::from_toml_str("[forecast]\nhorizon = 1000000\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[forecast]\nhorizon = 3").unwrap();
        let config = RunnerConfig::load(file.path()).unwrap();
        assert_eq!(config.forecast.horizon, 3);

        let missing = RunnerConfig::load(Path::new("/nonexistent/signalcast.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
