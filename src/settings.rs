//! Lab configuration
//!
//! Scenario constants (track and field geometry, gravity, time scales, history
//! capacity) plus the initial slider values. Every field has a default, so a
//! JSON config only needs to name what it overrides.

use serde::{Deserialize, Serialize};

use crate::error::{self, Result, SimError};
use crate::sim::history::DEFAULT_HISTORY_CAPACITY;
use crate::sim::incline::InclineParams;
use crate::sim::induction::InductionParams;

/// Frame clock settings shared by both scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Upper bound on a single frame delta before scaling (seconds)
    pub max_frame_dt: f64,
    /// Time scale while slow motion is on
    pub slow_motion_scale: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            max_frame_dt: 0.033,
            slow_motion_scale: 0.25,
        }
    }
}

/// Track, field and plot constants for the induction scenario (meters, seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InductionConfig {
    pub world_left: f64,
    pub world_right: f64,
    pub field_start: f64,
    pub field_end: f64,
    /// Run ends once the leading edge passes `world_right + exit_margin`
    pub exit_margin: f64,
    /// Leading-edge position after reset
    pub start_x: f64,
    pub base_time_scale: f64,
    pub history_capacity: usize,
    /// Plot time axis never shows less than this many seconds
    pub min_plot_time: f64,
    pub initial: InductionParams,
}

impl Default for InductionConfig {
    fn default() -> Self {
        Self {
            world_left: 0.0,
            world_right: 8.0,
            field_start: 3.2,
            field_end: 6.2,
            exit_margin: 0.6,
            start_x: 0.7,
            base_time_scale: 0.75,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            min_plot_time: 5.0,
            initial: InductionParams::default(),
        }
    }
}

impl InductionConfig {
    /// Position past which the frame has left the track
    pub fn exit_x(&self) -> f64 {
        self.world_right + self.exit_margin
    }

    pub fn validate(&self) -> Result<()> {
        error::finite("world_left", self.world_left)?;
        error::finite("field_start", self.field_start)?;
        error::finite("start_x", self.start_x)?;
        if self.world_right <= self.world_left {
            return Err(SimError::InvalidParameter {
                name: "world_right",
                value: self.world_right,
                reason: "must be right of world_left",
            });
        }
        if self.field_end <= self.field_start {
            return Err(SimError::InvalidParameter {
                name: "field_end",
                value: self.field_end,
                reason: "must be right of field_start",
            });
        }
        error::non_negative("exit_margin", self.exit_margin)?;
        error::positive("base_time_scale", self.base_time_scale)?;
        error::positive("min_plot_time", self.min_plot_time)?;
        if self.history_capacity == 0 {
            return Err(SimError::InvalidParameter {
                name: "history_capacity",
                value: 0.0,
                reason: "must hold at least one entry",
            });
        }
        self.initial.validate()
    }
}

/// Constants for the inclined-plane scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InclineConfig {
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
    pub base_time_scale: f64,
    pub initial: InclineParams,
}

impl Default for InclineConfig {
    fn default() -> Self {
        Self {
            gravity: 10.0,
            base_time_scale: 1.0,
            initial: InclineParams::default(),
        }
    }
}

impl InclineConfig {
    pub fn validate(&self) -> Result<()> {
        error::positive("gravity", self.gravity)?;
        error::positive("base_time_scale", self.base_time_scale)?;
        self.initial.validate()
    }
}

/// Complete lab configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub clock: ClockConfig,
    pub induction: InductionConfig,
    pub incline: InclineConfig,
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        error::positive("max_frame_dt", self.clock.max_frame_dt)?;
        error::positive("slow_motion_scale", self.clock.slow_motion_scale)?;
        self.induction.validate()?;
        self.incline.validate()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.induction.field_start, 3.2);
        assert_eq!(settings.induction.field_end, 6.2);
        assert_eq!(settings.induction.history_capacity, 5000);
        assert_eq!(settings.clock.slow_motion_scale, 0.25);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            Settings::from_json(r#"{ "incline": { "gravity": 9.81 } }"#).unwrap();
        assert_eq!(settings.incline.gravity, 9.81);
        assert_eq!(settings.incline.base_time_scale, 1.0);
        assert_eq!(settings.induction.world_right, 8.0);
    }

    #[test]
    fn test_rejects_inverted_field() {
        let json = r#"{ "induction": { "field_start": 5.0, "field_end": 4.0 } }"#;
        assert!(matches!(
            Settings::from_json(json),
            Err(SimError::InvalidParameter { name: "field_end", .. })
        ));
    }

    #[test]
    fn test_rejects_zero_resistance_in_config() {
        let json = r#"{ "induction": { "initial": { "resistance": 0.0 } } }"#;
        assert!(Settings::from_json(json).is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Settings::from_json("{ nope"),
            Err(SimError::Config(_))
        ));
    }

    #[test]
    fn test_json_roundtrip_preserves_values() {
        let mut settings = Settings::default();
        settings.induction.start_x = 1.5;
        let json = settings.to_json().unwrap();
        let back = Settings::from_json(&json).unwrap();
        assert_eq!(back.induction.start_x, 1.5);
    }
}
