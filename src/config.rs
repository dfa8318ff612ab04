//! Synth configuration, loadable from JSON.
//!
//! Every field has a default, so `{}` is a valid config and hosts only
//! spell out what they change.

use serde::{Deserialize, Serialize};

use crate::dsp::resampler::CaptureRegion;
use crate::dsp::trigger::MAX_HISTORY_CAPACITY;
use crate::error::ConfigError;

/// Largest accepted `smoothingWindow`.
pub const MAX_SMOOTHING_WINDOW: usize = 64;
/// Largest accepted `arpDivision`.
pub const MAX_ARP_DIVISION: u32 = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SynthConfig {
    /// Audio sample rate in Hz.
    pub sample_rate: f64,
    /// Starting left-channel frequency in Hz.
    pub base_frequency: f64,
    /// Starting quantizer resolution (clamped to 4–64).
    pub glitch_steps: u32,
    /// How close to an integer a ratio must be to snap onto it.
    pub snap_threshold: f64,
    /// Screen rectangle XY curves are drawn in.
    pub capture_region: CaptureRegion,
    /// Phase estimates averaged by the non-integer trigger.
    pub trigger_history: usize,
    /// Moving-average width applied to analysis windows (1 disables).
    pub smoothing_window: usize,
    /// Arpeggiator tempo.
    pub arp_bpm: f64,
    /// Arpeggiator steps per beat.
    pub arp_division: u32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        SynthConfig {
            sample_rate: 44100.0,
            base_frequency: 440.0,
            glitch_steps: 64,
            snap_threshold: 0.05,
            capture_region: CaptureRegion::default(),
            trigger_history: 10,
            smoothing_window: 3,
            arp_bpm: 135.0,
            arp_division: 4,
        }
    }
}

impl SynthConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SynthConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        // A struct of plain numbers always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Reject values that cannot be clamped into something meaningful.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("sampleRate", self.sample_rate)?;
        check_positive("baseFrequency", self.base_frequency)?;
        check_positive("arpBpm", self.arp_bpm)?;
        check_positive("captureRegion.width", self.capture_region.width)?;
        check_positive("captureRegion.height", self.capture_region.height)?;
        check_range("triggerHistory", self.trigger_history, 1, MAX_HISTORY_CAPACITY)?;
        check_range("smoothingWindow", self.smoothing_window, 0, MAX_SMOOTHING_WINDOW)?;
        check_range("arpDivision", self.arp_division as usize, 1, MAX_ARP_DIVISION as usize)?;
        if !(0.0..0.5).contains(&self.snap_threshold) {
            return Err(ConfigError::OutOfRange {
                field: "snapThreshold",
                value: self.snap_threshold,
            });
        }
        Ok(())
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

fn check_range(field: &'static str, value: usize, min: usize, max: usize) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config = SynthConfig::from_json("{}").unwrap();
        assert_eq!(config, SynthConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let json = r#"{
            "sampleRate": 48000,
            "glitchSteps": 8,
            "captureRegion": { "x": 440, "y": 120, "width": 360, "height": 360 }
        }"#;
        let config = SynthConfig::from_json(json).unwrap();
        assert_eq!(config.sample_rate, 48000.0);
        assert_eq!(config.glitch_steps, 8);
        assert_eq!(config.capture_region.width, 360.0);
        assert_eq!(config.base_frequency, 440.0);
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = SynthConfig::from_json("{ sampleRate: ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = SynthConfig::from_json(r#"{ "sampleRate": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "sampleRate", .. }));

        let err = SynthConfig::from_json(r#"{ "snapThreshold": 0.7 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "snapThreshold", .. }));

        let err = SynthConfig::from_json(r#"{ "triggerHistory": 2305843009213693951 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "triggerHistory", .. }));

        let err = SynthConfig::from_json(r#"{ "triggerHistory": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "triggerHistory", .. }));

        let err = SynthConfig::from_json(r#"{ "smoothingWindow": 4000000000 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "smoothingWindow", .. }));

        let err = SynthConfig::from_json(r#"{ "arpDivision": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "arpDivision", .. }));
    }

    #[test]
    fn range_limits_are_inclusive() {
        let json = r#"{ "triggerHistory": 1024, "smoothingWindow": 64, "arpDivision": 64 }"#;
        assert!(SynthConfig::from_json(json).is_ok());
        assert!(SynthConfig::from_json(r#"{ "smoothingWindow": 0 }"#).is_ok());
    }

    #[test]
    fn json_round_trip() {
        let mut config = SynthConfig::default();
        config.arp_bpm = 90.0;
        let back = SynthConfig::from_json(&config.to_json()).unwrap();
        assert_eq!(back, config);
    }
}
