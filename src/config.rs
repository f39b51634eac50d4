//! Optional TOML configuration.
//!
//! ```toml
//! alert_sheet = "TOATE ALERTELE"
//! cluster = false
//! output_dir = "out"
//! preview_rows = 20
//!
//! [reference]
//! lat = 38.7223
//! lon = -9.1393
//!
//! [filters]
//! issues = ["DOWN", "INFRA"]
//! chain_code = "482"
//! ```
//!
//! Every key is optional; command-line flags override the file.

use crate::error::{MapError, Result};
use crate::filter::FilterState;
use crate::geo::GeoPoint;
use crate::loader::ALERT_SHEET;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Used when neither the file nor the command line gives a position.
pub const DEFAULT_REFERENCE: GeoPoint = GeoPoint {
    lat: 38.7223,
    lon: -9.1393,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub issues: Option<Vec<String>>,
    pub chain_code: Option<String>,
}

impl FilterConfig {
    pub fn to_state(&self) -> FilterState {
        FilterState {
            issues: self.issues.as_ref().map(|v| v.iter().cloned().collect()),
            chain_code: self.chain_code.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub alert_sheet: String,
    pub reference: Option<GeoPoint>,
    pub cluster: bool,
    pub output_dir: PathBuf,
    pub preview_rows: usize,
    pub filters: FilterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alert_sheet: ALERT_SHEET.to_string(),
            reference: None,
            cluster: false,
            output_dir: PathBuf::from("."),
            preview_rows: 20,
            filters: FilterConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|e| MapError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| MapError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text, path)?;
        debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    pub fn reference_or_default(&self) -> GeoPoint {
        self.reference.unwrap_or(DEFAULT_REFERENCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml_str("", Path::new("empty.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.alert_sheet, "TOATE ALERTELE");
        assert_eq!(config.reference_or_default(), DEFAULT_REFERENCE);
    }

    #[test]
    fn parses_all_sections() {
        let text = r#"
            alert_sheet = "Alerts"
            cluster = true
            preview_rows = 5

            [reference]
            lat = 44.43
            lon = 26.10

            [filters]
            issues = ["DOWN"]
            chain_code = "482"
        "#;
        let config = Config::from_toml_str(text, Path::new("field_map.toml")).unwrap();
        assert_eq!(config.alert_sheet, "Alerts");
        assert!(config.cluster);
        assert_eq!(config.preview_rows, 5);
        assert_eq!(config.reference, Some(GeoPoint::new(44.43, 26.10)));

        let state = config.filters.to_state();
        assert_eq!(state.chain_code.as_deref(), Some("482"));
        assert!(state.issues.unwrap().contains("DOWN"));
    }

    #[test]
    fn bad_toml_reports_path() {
        let err = Config::from_toml_str("cluster = \"yes\"", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, MapError::Config { ref path, .. } if path == Path::new("bad.toml")));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field_map.toml");
        std::fs::write(&path, "preview_rows = 3\n").unwrap();
        assert_eq!(Config::load(&path).unwrap().preview_rows, 3);
        assert!(matches!(
            Config::load(&dir.path().join("missing.toml")),
            Err(MapError::FileRead { .. })
        ));
    }
}
