use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// Default location of the optional config file (relative to the working directory).
pub const CONFIG_FILE: &str = "sales-dashboard.toml";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Everything the binary needs to know up front. Every field has a default, so
/// running without a config file reproduces the fixed 2009–2012 setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Page title shown above the KPI strip.
    pub title: String,

    /// Ordered source files, one per year. Concatenated in this order.
    pub sources: Vec<PathBuf>,

    /// Where the cleaned table is written (overwritten on every run).
    pub snapshot_path: PathBuf,

    /// Bounds of the year-range slider.
    pub year_min: i32,
    pub year_max: i32,

    /// Optional image shown at the top of the sidebar.
    pub sidebar_image: Option<PathBuf>,

    /// Short text shown under the sidebar header.
    pub sidebar_description: String,

    /// Value that replaces the "Not Specified" order priority.
    pub default_priority: String,

    /// Extra categorical spelling fixes, applied after the built-in ones.
    pub corrections: Vec<CorrectionRule>,
}

/// A single `column: from -> to` spelling fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRule {
    pub column: String,
    pub from: String,
    pub to: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "📊 Sales Dashboard (2009–2012)".to_string(),
            sources: ["2009.xlsx", "2010.xlsx", "2011.xlsx", "2012.xlsx"]
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            snapshot_path: PathBuf::from("cleaned_data.xlsx"),
            year_min: 2009,
            year_max: 2012,
            sidebar_image: Some(PathBuf::from("photo.jpg")),
            sidebar_description:
                "This dashboard provides a comprehensive view of sales data from 2009 to 2012."
                    .to_string(),
            default_priority: "Medium".to_string(),
            corrections: Vec::new(),
        }
    }
}

impl DashboardConfig {
    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, DashboardError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No {} found, using built-in defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, DashboardError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| DashboardError::Configuration(format!("Failed to read config: {e}")))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, DashboardError> {
        let config: DashboardConfig = toml::from_str(contents)
            .map_err(|e| DashboardError::Configuration(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Inclusive `(min, max)` span of the year-range slider.
    pub fn year_bounds(&self) -> (i32, i32) {
        (self.year_min, self.year_max)
    }

    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.sources.is_empty() {
            return Err(DashboardError::NoSources);
        }
        if self.year_min > self.year_max {
            return Err(DashboardError::Configuration(format!(
                "year_min ({}) is after year_max ({})",
                self.year_min, self.year_max
            )));
        }
        if self.default_priority.trim().is_empty() {
            return Err(DashboardError::Configuration(
                "default_priority must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_source_list() {
        let config = DashboardConfig::default();
        assert_eq!(config.sources.len(), 4);
        assert_eq!(config.sources[0], PathBuf::from("2009.xlsx"));
        assert_eq!(config.sources[3], PathBuf::from("2012.xlsx"));
        assert_eq!((config.year_min, config.year_max), (2009, 2012));
        assert_eq!(config.snapshot_path, PathBuf::from("cleaned_data.xlsx"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = DashboardConfig::from_toml(
            r#"
            sources = ["a.csv", "b.csv"]
            snapshot_path = "out.parquet"

            [[corrections]]
            column = "Region"
            from = "Quebecc"
            to = "Quebec"
            "#,
        )
        .unwrap();

        assert_eq!(config.sources, vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]);
        assert_eq!(config.snapshot_path, PathBuf::from("out.parquet"));
        assert_eq!(config.default_priority, "Medium");
        assert_eq!(config.corrections.len(), 1);
        assert_eq!(config.corrections[0].to, "Quebec");
    }

    #[test]
    fn inverted_year_bounds_are_rejected() {
        let err = DashboardConfig::from_toml("year_min = 2013\nyear_max = 2010").unwrap_err();
        assert!(matches!(err, DashboardError::Configuration(_)));
    }

    #[test]
    fn empty_source_list_is_rejected() {
        let err = DashboardConfig::from_toml("sources = []").unwrap_err();
        assert!(matches!(err, DashboardError::NoSources));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::load_or_default(dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, DashboardConfig::default());
    }
}
