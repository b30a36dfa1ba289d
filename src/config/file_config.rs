use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Every field overrides its CLI counterpart when present
    pub db_path: Option<String>,
    pub song_data: Option<String>,
    pub log_data: Option<String>,
    pub reset_schema: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("etl.toml");
        fs::write(&path, "db_path = \"/tmp/warehouse.db\"\nreset_schema = true\n").unwrap();

        let config = FileConfig::load(&path).unwrap();
        assert_eq!(config.db_path.as_deref(), Some("/tmp/warehouse.db"));
        assert_eq!(config.reset_schema, Some(true));
        assert!(config.song_data.is_none());
        assert!(config.log_data.is_none());
    }

    #[test]
    fn test_load_missing_file_error() {
        let dir = TempDir::new().unwrap();
        let result = FileConfig::load(&dir.path().join("missing.toml"));
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to read config file"));
    }

    #[test]
    fn test_load_invalid_toml_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("etl.toml");
        fs::write(&path, "reset_schema = \"yes please\"").unwrap();

        let result = FileConfig::load(&path);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to parse config file"));
    }
}
