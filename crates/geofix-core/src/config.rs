//! Tracking configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How often the provider should aim to deliver fixes.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(10);

/// Lower bound on the delivery rate.
pub const DEFAULT_FASTEST_INTERVAL: Duration = Duration::from_secs(2);

/// Minimum movement before a new fix is worth delivering.
pub const DEFAULT_MIN_DISPLACEMENT_M: f64 = 500.0;

/// Accuracy priority requested from the platform provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccuracyPriority {
    HighAccuracy,
    Balanced,
    LowPower,
    Passive,
}

impl AccuracyPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighAccuracy => "high-accuracy",
            Self::Balanced => "balanced",
            Self::LowPower => "low-power",
            Self::Passive => "passive",
        }
    }
}

/// Parameters of one location subscription.
///
/// Set once when the session is created and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Desired interval between fixes.
    pub update_interval: Duration,
    /// Fastest interval the consumer can handle.
    pub fastest_interval: Duration,
    /// Displacement threshold in meters.
    pub min_displacement_m: f64,
    /// Requested accuracy priority.
    pub priority: AccuracyPriority,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL,
            fastest_interval: DEFAULT_FASTEST_INTERVAL,
            min_displacement_m: DEFAULT_MIN_DISPLACEMENT_M,
            priority: AccuracyPriority::HighAccuracy,
        }
    }
}

impl TrackingConfig {
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    pub fn with_fastest_interval(mut self, interval: Duration) -> Self {
        self.fastest_interval = interval;
        self
    }

    pub fn with_min_displacement(mut self, meters: f64) -> Self {
        self.min_displacement_m = meters;
        self
    }

    pub fn with_priority(mut self, priority: AccuracyPriority) -> Self {
        self.priority = priority;
        self
    }
}
