//! Application configuration, read from a JSON file.

use crate::charts::{ChartKind, ChartOptions};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CHARTIFY_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Size of exported SVG charts, in pixels.
    pub chart_width: u32,
    pub chart_height: u32,
    pub histogram_bins: usize,
    pub violin_points: usize,
    /// Rows shown in the data preview.
    pub preview_rows: usize,
    pub default_chart: ChartKind,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chart_width: 800,
            chart_height: 600,
            histogram_bins: 10,
            violin_points: 100,
            preview_rows: 5,
            default_chart: ChartKind::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(text)?;
        anyhow::ensure!(config.histogram_bins > 0, "histogram_bins must be at least 1");
        anyhow::ensure!(config.violin_points > 1, "violin_points must be at least 2");
        anyhow::ensure!(
            config.chart_width > 0 && config.chart_height > 0,
            "chart size must be non-zero"
        );
        Ok(config)
    }

    /// Config from the file named by `CHARTIFY_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                let config = Self::load(&path)?;
                tracing::info!(path = %Path::new(&path).display(), "loaded config");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            histogram_bins: self.histogram_bins,
            violin_points: self.violin_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = AppConfig::from_json(r#"{"histogram_bins": 20}"#).unwrap();
        assert_eq!(config.histogram_bins, 20);
        assert_eq!(config.violin_points, 100);
        assert_eq!(config.default_chart, ChartKind::LinePlot);
    }

    #[test]
    fn test_chart_kind_by_label() {
        let config = AppConfig::from_json(r#"{"default_chart": "Pie Chart"}"#).unwrap();
        assert_eq!(config.default_chart, ChartKind::PieChart);
        assert!(AppConfig::from_json(r#"{"default_chart": "Radar"}"#).is_err());
    }

    #[test]
    fn test_zero_bins_rejected() {
        assert!(AppConfig::from_json(r#"{"histogram_bins": 0}"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"chart_width": 1024, "preview_rows": 3}}"#).unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.chart_width, 1024);
        assert_eq!(config.preview_rows, 3);
        assert_eq!(config.chart_options().histogram_bins, 10);
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = AppConfig::load("/nonexistent/chartify.json").unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/chartify.json"));
    }
}
