//! Configuration file loading and saving
//!
//! Small serde front-end over the two config formats the engine understands,
//! TOML and RON, dispatched on file extension.

use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

fn extension(path: &Path) -> Result<&str, ConfigError> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))
}

/// Load a configuration value from a TOML or RON file
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = std::fs::read_to_string(path)?;

    match extension(path)? {
        "toml" => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        "ron" => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Save a configuration value to a TOML or RON file
pub fn save<T: Serialize>(value: &T, path: &Path) -> Result<(), ConfigError> {
    let contents = match extension(path)? {
        "toml" => toml::to_string_pretty(value).map_err(|e| ConfigError::Serialize(e.to_string()))?,
        "ron" => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    };

    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        backend: String,
        retries: u32,
    }

    fn sample() -> Sample {
        Sample {
            backend: "agg".to_owned(),
            retries: 3,
        }
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");

        save(&sample(), &path).unwrap();
        let loaded: Sample = load(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_ron_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.ron");

        save(&sample(), &path).unwrap();
        let loaded: Sample = load(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.yaml");

        assert!(matches!(
            save(&sample(), &path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
