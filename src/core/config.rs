use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Per-environment settings read from `config/{environment}.json`
/// under the deploy root. Loaded once per invocation; a missing or
/// malformed artifact is fatal before any subprocess runs.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    pub aws_region: String,
    pub build_version: String,
}

impl EnvironmentConfig {
    pub fn load(base_dir: &Path, environment: &str) -> Result<Self> {
        let path = base_dir.join("config").join(format!("{environment}.json"));

        let raw = fs::read_to_string(&path).map_err(|e| Error::ConfigLoad {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&raw).map_err(|e| Error::ConfigLoad {
            path,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(dir: &Path, environment: &str, body: &str) {
        let config_dir = dir.join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join(format!("{environment}.json")), body).unwrap();
    }

    #[test]
    fn loads_region_and_version_for_environment() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            "development",
            r#"{"aws_region": "eu-central-1", "build_version": "1.2.3"}"#,
        );

        let config = EnvironmentConfig::load(dir.path(), "development").unwrap();
        assert_eq!(config.aws_region, "eu-central-1");
        assert_eq!(config.build_version, "1.2.3");
    }

    #[test]
    fn missing_artifact_is_config_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = EnvironmentConfig::load(dir.path(), "production").unwrap_err();

        assert!(matches!(err, Error::ConfigLoad { .. }));
        assert_eq!(err.code(), "CONFIG_LOAD_FAILED");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn malformed_artifact_is_config_load_error() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "development", "{not json");

        let err = EnvironmentConfig::load(dir.path(), "development").unwrap_err();
        assert!(matches!(err, Error::ConfigLoad { .. }));
    }
}
