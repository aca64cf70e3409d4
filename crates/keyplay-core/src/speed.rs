//! Playback speed: a multiplier, or a target duration that implies one.

use crate::error::{Error, Result};

/// Exactly one of multiplier or target duration is authoritative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedConfig {
    /// `1.0` is the original tempo, `2.0` twice as fast.
    Multiplier(f64),
    /// Stretch or squeeze the whole recording to this many seconds.
    TargetDuration(f64),
}

impl Default for SpeedConfig {
    fn default() -> Self {
        SpeedConfig::Multiplier(1.0)
    }
}

fn check_positive(value: f64, what: &str) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidConfig(format!("{} must be positive, got {}", what, value)))
    }
}

impl SpeedConfig {
    pub fn multiplier(value: f64) -> Result<Self> {
        check_positive(value, "speed multiplier").map(SpeedConfig::Multiplier)
    }

    pub fn target_duration(seconds: f64) -> Result<Self> {
        check_positive(seconds, "target duration").map(SpeedConfig::TargetDuration)
    }

    /// Effective multiplier for a recording of `nominal_duration` seconds.
    ///
    /// A recording with no length plays at 1x under a target duration.
    pub fn effective_multiplier(&self, nominal_duration: f64) -> f64 {
        match *self {
            SpeedConfig::Multiplier(m) => m,
            SpeedConfig::TargetDuration(target) if nominal_duration > 0.0 => {
                nominal_duration / target
            }
            SpeedConfig::TargetDuration(_) => 1.0,
        }
    }

    pub fn as_multiplier(&self) -> Option<f64> {
        match *self {
            SpeedConfig::Multiplier(m) => Some(m),
            SpeedConfig::TargetDuration(_) => None,
        }
    }

    pub fn as_target_duration(&self) -> Option<f64> {
        match *self {
            SpeedConfig::TargetDuration(t) => Some(t),
            SpeedConfig::Multiplier(_) => None,
        }
    }
}
