use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// GPS track sample reconstructed from a GPS-bearing row
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackPoint {
    pub time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    /// Horizontal dilution of precision
    pub hdop: Option<f64>,
    /// Ground speed as logged (m/s)
    pub speed: Option<f64>,
}
