use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const APP_DIR: &str = "pagewise";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Zoom bounds and step, as scale factors (1.0 = 100%)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 2.0,
            step: 0.1,
            default: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Vertical gap between pages, in pixels
    pub page_spacing: f64,
    /// Render width of a page at 100% zoom, in pixels
    pub base_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_spacing: 10.0,
            base_width: 800.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub zoom: ZoomConfig,
    pub layout: LayoutConfig,
    /// Inserted before the extension of downloaded files (`report_en.pdf`)
    pub export_suffix: String,
    /// Duration of the smooth scroll used for page jumps
    pub scroll_animation_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            zoom: ZoomConfig::default(),
            layout: LayoutConfig::default(),
            export_suffix: "en".to_string(),
            scroll_animation_ms: 200,
        }
    }
}

impl ViewerConfig {
    /// Returns the path to the user's config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load the user's config, falling back to defaults when there is none
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("no config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "config file missing, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let zoom = &self.zoom;
        if !(zoom.min > 0.0 && zoom.min < zoom.max) {
            return Err(ConfigError::Invalid(format!(
                "zoom range {}..{} is empty",
                zoom.min, zoom.max
            )));
        }
        if zoom.step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "zoom step must be positive, got {}",
                zoom.step
            )));
        }
        if zoom.default < zoom.min || zoom.default > zoom.max {
            return Err(ConfigError::Invalid(format!(
                "default zoom {} is outside {}..{}",
                zoom.default, zoom.min, zoom.max
            )));
        }
        if self.layout.page_spacing < 0.0 {
            return Err(ConfigError::Invalid("page spacing is negative".to_string()));
        }
        if self.layout.base_width <= 0.0 {
            return Err(ConfigError::Invalid("base width must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.zoom.min, 0.5);
        assert_eq!(config.zoom.max, 2.0);
        assert_eq!(config.export_suffix, "en");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewerConfig::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "export_suffix": "ko", "zoom": {{ "step": 0.25 }} }}"#).unwrap();

        let config = ViewerConfig::load_from(file.path()).unwrap();
        assert_eq!(config.export_suffix, "ko");
        assert_eq!(config.zoom.step, 0.25);
        assert_eq!(config.zoom.max, 2.0);
        assert_eq!(config.layout, LayoutConfig::default());
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = ViewerConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_invalid_zoom_range_is_rejected() {
        let mut config = ViewerConfig::default();
        config.zoom.min = 3.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ViewerConfig::default();
        config.zoom.default = 5.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ViewerConfig::default();
        config.zoom.step = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
