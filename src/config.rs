use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::analysis::dispatch::AnalysisOptions;

/// Settings file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "climate-eda.json";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Session settings. Every field has a default, so a settings file only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Dataset opened at startup.
    pub data_path: PathBuf,
    /// Equal-width bin count for histograms.
    pub histogram_bins: usize,
    /// Default grouping keys for table views.
    pub group_by: Vec<String>,
    /// Scatter colour key.
    pub color_key: Option<String>,
    /// Extra fields shown when hovering scatter points.
    pub hover_columns: Vec<String>,
    /// Fit a trend line on scatter plots.
    pub trendline: bool,
    /// Columns filtered by value set even when numeric.
    pub multiselect_columns: Vec<String>,
    /// Columns declared categorical regardless of their cell type.
    pub categorical_columns: Vec<String>,
    /// Rows shown by the dataset preview.
    pub preview_rows: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("dataset/climate_change_dataset.csv"),
            histogram_bins: 40,
            group_by: vec!["Country".to_string(), "Year".to_string()],
            color_key: Some("Country".to_string()),
            hover_columns: vec!["Country".to_string(), "Year".to_string()],
            trendline: true,
            multiselect_columns: vec!["Year".to_string(), "Country".to_string()],
            categorical_columns: Vec::new(),
            preview_rows: 5,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from [`DEFAULT_CONFIG_FILE`] when it
    /// exists, or fall back to defaults.
    ///
    /// An explicit `path` that cannot be read is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_FILE);
                if implicit.exists() {
                    Self::from_file(implicit)?
                } else {
                    log::debug!("No {DEFAULT_CONFIG_FILE}, using default settings");
                    Settings::default()
                }
            }
        };
        settings.validate()?;
        Ok(settings)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&text)
            .with_context(|| format!("parsing settings file {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.histogram_bins == 0 {
            bail!("histogram_bins must be at least 1");
        }
        Ok(())
    }

    /// The subset of settings the dispatcher reads.
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            histogram_bins: self.histogram_bins,
            color_key: self.color_key.clone(),
            hover_columns: self.hover_columns.clone(),
            trendline: self.trendline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "histogram_bins": 12, "color_key": null }"#).unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.histogram_bins, 12);
        assert_eq!(settings.color_key, None);
        assert_eq!(settings.group_by, Settings::default().group_by);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/no/such/settings.json"))).is_err());
    }

    #[test]
    fn zero_bins_are_rejected() {
        let settings = Settings { histogram_bins: 0, ..Settings::default() };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn analysis_options_follow_settings() {
        let settings = Settings { trendline: false, ..Settings::default() };
        let options = settings.analysis_options();
        assert!(!options.trendline);
        assert_eq!(options.histogram_bins, 40);
        assert_eq!(options, AnalysisOptions { trendline: false, ..AnalysisOptions::default() });
    }
}
