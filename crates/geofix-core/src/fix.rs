//! Location fix type.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// One reported geographic position.
///
/// Produced by a location provider, delivered at most once to the
/// registered listener. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Unix timestamp in milliseconds, set when the fix was produced.
    pub timestamp_ms: u64,
    /// Estimated horizontal accuracy in meters, if known.
    pub accuracy_m: Option<f64>,
    /// Altitude above the WGS84 ellipsoid in meters, if known.
    pub altitude_m: Option<f64>,
}

impl Fix {
    /// Create a fix at the given coordinates, timestamped now.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            timestamp_ms: now_ms(),
            accuracy_m: None,
            altitude_m: None,
        }
    }

    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }

    pub fn with_altitude(mut self, altitude_m: f64) -> Self {
        self.altitude_m = Some(altitude_m);
        self
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_new() {
        let fix = Fix::new(12.9716, 77.5946);
        assert_eq!(fix.latitude, 12.9716);
        assert_eq!(fix.longitude, 77.5946);
        assert!(fix.timestamp_ms > 0);
        assert!(fix.accuracy_m.is_none());
        assert!(fix.altitude_m.is_none());
    }

    #[test]
    fn test_fix_builders() {
        let fix = Fix::new(0.0, 0.0).with_accuracy(12.5).with_altitude(920.0);
        assert_eq!(fix.accuracy_m, Some(12.5));
        assert_eq!(fix.altitude_m, Some(920.0));
    }
}
