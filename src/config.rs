use crate::error::{CatalogError, Result, ResultExt as _};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_CSV_INFER_SCHEMA_LENGTH: &str = "METATABLE_CSV_INFER_SCHEMA_LENGTH";
pub const ENV_PARQUET_ROW_GROUP_SIZE: &str = "METATABLE_PARQUET_ROW_GROUP_SIZE";

/// Settings for reading and writing table artifacts.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct IoSettings {
    /// Rows scanned when inferring CSV column types (`None` scans everything)
    pub csv_infer_schema_length: Option<usize>,
    /// Parse date-like CSV strings into temporal columns
    pub csv_try_parse_dates: bool,
    /// Indent the `.meta.json` sidecar
    pub pretty_sidecar: bool,
    /// Row group size for Parquet output (`None` uses the polars default)
    pub parquet_row_group_size: Option<usize>,
}

impl Default for IoSettings {
    fn default() -> Self {
        Self {
            csv_infer_schema_length: Some(10_000),
            csv_try_parse_dates: false,
            pretty_sidecar: true,
            parquet_row_group_size: None,
        }
    }
}

impl IoSettings {
    /// Load settings from a JSON file. Missing keys take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CatalogError::Config(e.to_string()))
    }

    /// Default settings with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `METATABLE_*` environment variables on top of these settings.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(n) = env_usize(ENV_CSV_INFER_SCHEMA_LENGTH)? {
            // 0 means "scan the whole file"
            self.csv_infer_schema_length = (n > 0).then_some(n);
        }
        if let Some(n) = env_usize(ENV_PARQUET_ROW_GROUP_SIZE)? {
            self.parquet_row_group_size = Some(n);
        }
        Ok(self)
    }
}

fn env_usize(key: &str) -> Result<Option<usize>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|e| CatalogError::Config(format!("{key}={raw:?}: {e}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() -> anyhow::Result<()> {
        let settings = IoSettings::from_json(r#"{"pretty_sidecar": false}"#)?;
        assert!(!settings.pretty_sidecar);
        assert_eq!(settings.csv_infer_schema_length, Some(10_000));
        Ok(())
    }

    #[test]
    fn test_from_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"parquet_row_group_size": 4096}"#)?;

        let settings = IoSettings::from_file(&path)?;
        assert_eq!(settings.parquet_row_group_size, Some(4096));
        Ok(())
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = IoSettings::from_json("{not json").expect_err("invalid JSON");
        assert!(matches!(err, CatalogError::Config(_)));
    }
}
