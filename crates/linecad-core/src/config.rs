//! Editor configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::drawables::{DEFAULT_DIMENSION_OFFSET, DEFAULT_TEXT_HEIGHT};
use crate::geometry::DEFAULT_HIT_MARGIN;
use crate::layer::CleanupSettings;
use crate::snap::{ANGLE_SNAP_INCREMENT, SnapConfig};
use crate::tools::BuildDefaults;

/// Errors from loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Every tunable of the editor. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub snap: SnapConfig,
    pub cleanup: CleanupSettings,
    /// Margin for hit-test deletion, in world units.
    pub hit_margin: f64,
    /// Radius for grabbing a hotspot, in screen units.
    pub hotspot_grab_distance: f64,
    pub angle_increment_degrees: f64,
    pub text_height: f64,
    /// Content given to text drawables when they are created.
    pub text_placeholder: String,
    pub dimension_offset: f64,
    /// Zoom factor per wheel step towards the user.
    pub wheel_zoom_in: f64,
    /// Zoom factor per wheel step away from the user.
    pub wheel_zoom_out: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap: SnapConfig::default(),
            cleanup: CleanupSettings::default(),
            hit_margin: DEFAULT_HIT_MARGIN,
            hotspot_grab_distance: 5.0,
            angle_increment_degrees: ANGLE_SNAP_INCREMENT,
            text_height: DEFAULT_TEXT_HEIGHT,
            text_placeholder: "text".to_string(),
            dimension_offset: DEFAULT_DIMENSION_OFFSET,
            wheel_zoom_in: 1.1,
            wheel_zoom_out: 0.9,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// `<config dir>/linecad/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("linecad").join("config.json"))
    }

    /// Parameters for turning build sessions into drawables.
    pub fn build_defaults(&self) -> BuildDefaults {
        BuildDefaults {
            text_height: self.text_height,
            text_placeholder: self.text_placeholder.clone(),
            dimension_offset: self.dimension_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::SplitMode;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.snap.grid_spacing.x, 25.0);
        assert_eq!(config.snap.snap_distance, 5.0);
        assert_eq!(config.cleanup.tolerance, 2.0);
        assert_eq!(config.cleanup.min_length, 1.0);
        assert_eq!(config.cleanup.split_mode, SplitMode::SinglePass);
        assert_eq!(config.angle_increment_degrees, 15.0);
    }

    #[test]
    fn test_partial_json() {
        let config = EditorConfig::from_json(
            r#"{"snap": {"snap_distance": 12.0}, "cleanup": {"split_mode": {"mode": "Fixpoint", "max_passes": 4}}}"#,
        )
        .unwrap();
        assert_eq!(config.snap.snap_distance, 12.0);
        assert!(config.snap.grid_snap_enabled);
        assert_eq!(config.cleanup.split_mode, SplitMode::Fixpoint { max_passes: 4 });
        assert_eq!(config.cleanup.tolerance, 2.0);
        assert_eq!(config.text_height, 25.0);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(EditorConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"hit_margin": 8.0}}"#).unwrap();
        let config = EditorConfig::load(file.path()).unwrap();
        assert_eq!(config.hit_margin, 8.0);
        assert!(matches!(
            EditorConfig::load(file.path().with_extension("missing")),
            Err(ConfigError::Io(_))
        ));
    }
}
