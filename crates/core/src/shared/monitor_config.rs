use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::shared::landmark::Side;

/// Recognized monitoring options, persisted as JSON under the user
/// config directory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Body side whose ear/shoulder/hip landmarks drive the posture rule.
    pub tracked_side: Side,
    /// Horizontal misalignment tolerance, in pixels of the native frame.
    pub threshold_px: i32,
    /// Minimum gap between audible alerts.
    pub min_alert_interval_secs: u64,
    /// Frame-loop cadence.
    pub tick_interval_ms: u64,
    /// Person-detection confidence floor for the landmark model.
    #[serde(default = "default_detection_confidence")]
    pub detection_confidence: f64,
}

fn default_detection_confidence() -> f64 {
    0.25
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tracked_side: Side::Left,
            threshold_px: 40,
            min_alert_interval_secs: 3,
            tick_interval_ms: 30,
            detection_confidence: default_detection_confidence(),
        }
    }
}

impl MonitorConfig {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("SlouchGuard").join("config.json"))
    }

    /// Loads the stored config, falling back to defaults when no file
    /// exists or it fails to parse.
    pub fn load_or_default() -> Self {
        Self::config_path()
            .and_then(|p| Self::load_from(&p).ok())
            .unwrap_or_default()
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Persists to the default location, creating parent directories.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::config_path().ok_or("could not determine config directory")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
