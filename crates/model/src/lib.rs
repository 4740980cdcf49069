use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One timestamped GPS fix: degrees, plus seconds since the Unix epoch.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp_s: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64, timestamp_s: f64) -> Self {
        Self { latitude, longitude, timestamp_s }
    }
}

/// Identifier of one bounded trip (start → stop) inside a session.
pub type TripId = Uuid;

/// Read-only metrics view: speeds km/h, distance meters, acceleration m/s².
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct TripSnapshot {
    pub current_speed_kmh: f64,
    pub total_distance_m: f64,
    pub max_speed_kmh: f64,
    pub average_speed_kmh: f64,
    pub max_acceleration_mps2: f64,
    pub over_limit_triggered: bool,
    pub over_limit_distance_m: Option<f64>,
}

impl TripSnapshot {
    pub fn zeroed() -> Self {
        Self {
            current_speed_kmh: 0.0,
            total_distance_m: 0.0,
            max_speed_kmh: 0.0,
            average_speed_kmh: 0.0,
            max_acceleration_mps2: 0.0,
            over_limit_triggered: false,
            over_limit_distance_m: None,
        }
    }
}
