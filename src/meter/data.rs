//! Data structures for SWR readings and meter configuration.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Format used when rendering snapshot timestamps at the HTTP boundary.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The result of one sampling tick.
///
/// Snapshots are small `Copy` records so the store can hand them out whole;
/// a reader always sees every field from the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwrSnapshot {
    /// Forward power in watts, rounded to 2 decimal places
    pub forward_power: f64,
    /// Reflected power in watts, rounded to 2 decimal places
    pub reverse_power: f64,
    /// Standing wave ratio (1.0 to 10.0)
    pub swr: f64,
    /// Reflection coefficient rho (0.0 to 1.0)
    pub reflection_coefficient: f64,
    /// Share of incident power that is reflected (0.0 to 100.0)
    pub power_loss_percent: f64,
    /// When this snapshot was taken
    pub timestamp: DateTime<Utc>,
}

impl SwrSnapshot {
    /// Render the timestamp as a local wall-clock string.
    pub fn local_timestamp(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }
}

impl Default for SwrSnapshot {
    /// The reading served before the first tick completes: no power, perfect match.
    fn default() -> Self {
        Self {
            forward_power: 0.0,
            reverse_power: 0.0,
            swr: 1.0,
            reflection_coefficient: 0.0,
            power_loss_percent: 0.0,
            timestamp: Utc::now(),
        }
    }
}

/// Per-channel calibration factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub forward: f64,
    pub reverse: f64,
}

/// ADC channel assignment for the two power sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pins {
    pub forward: u8,
    pub reverse: u8,
}

/// Immutable meter configuration, set once at startup.
///
/// Serializes to the `/api/config` document shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeterConfig {
    pub calibration: Calibration,
    pub pins: Pins,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            calibration: Calibration {
                forward: 1.0,
                reverse: 1.0,
            },
            pins: Pins {
                forward: 0,
                reverse: 1,
            },
        }
    }
}

impl MeterConfig {
    /// Set the forward and reverse calibration factors.
    pub fn with_calibration(mut self, forward: f64, reverse: f64) -> Self {
        self.calibration = Calibration { forward, reverse };
        self
    }

    /// Set the forward and reverse ADC channels.
    pub fn with_pins(mut self, forward: u8, reverse: u8) -> Self {
        self.pins = Pins { forward, reverse };
        self
    }

    /// Check that calibration factors are positive and finite and that the
    /// two sensors are wired to distinct channels.
    pub fn validate(&self) -> crate::Result<()> {
        for (name, factor) in [
            ("forward", self.calibration.forward),
            ("reverse", self.calibration.reverse),
        ] {
            if !factor.is_finite() || factor <= 0.0 {
                return Err(crate::SwrError::config_error(format!(
                    "{} calibration factor must be positive, got {}",
                    name, factor
                )));
            }
        }

        if self.pins.forward == self.pins.reverse {
            return Err(crate::SwrError::config_error(format!(
                "forward and reverse sensors share channel {}",
                self.pins.forward
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_is_perfect_match() {
        let snapshot = SwrSnapshot::default();
        assert_eq!(snapshot.forward_power, 0.0);
        assert_eq!(snapshot.reverse_power, 0.0);
        assert_eq!(snapshot.swr, 1.0);
        assert_eq!(snapshot.reflection_coefficient, 0.0);
        assert_eq!(snapshot.power_loss_percent, 0.0);
    }

    #[test]
    fn test_local_timestamp_format() {
        let rendered = SwrSnapshot::default().local_timestamp();
        // YYYY-MM-DD HH:MM:SS
        assert_eq!(rendered.len(), 19);
        assert_eq!(&rendered[4..5], "-");
        assert_eq!(&rendered[10..11], " ");
        assert_eq!(&rendered[13..14], ":");
    }

    #[test]
    fn test_config_serialization_shape() {
        let config = MeterConfig::default().with_calibration(1.5, 0.8);
        let value = serde_json::to_value(config).unwrap();
        assert_eq!(value["calibration"]["forward"], 1.5);
        assert_eq!(value["calibration"]["reverse"], 0.8);
        assert_eq!(value["pins"]["forward"], 0);
        assert_eq!(value["pins"]["reverse"], 1);
    }

    #[test]
    fn test_config_validation() {
        assert!(MeterConfig::default().validate().is_ok());
        assert!(MeterConfig::default()
            .with_calibration(0.0, 1.0)
            .validate()
            .is_err());
        assert!(MeterConfig::default()
            .with_calibration(1.0, f64::NAN)
            .validate()
            .is_err());
        assert!(MeterConfig::default().with_pins(2, 2).validate().is_err());
    }
}
