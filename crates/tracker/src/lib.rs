//! Trip metrics core: folds a stream of GPS fixes into per-trip driving metrics

pub mod geo;
mod session;

pub use session::{SessionError, TripSession};

use model::{Position, TripSnapshot};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MPS_TO_KMH: f64 = 3.6;

#[derive(Debug, Error, PartialEq)]
pub enum SampleError {
    #[error("non-finite coordinate ({latitude}, {longitude})")]
    NonFiniteCoordinate { latitude: f64, longitude: f64 },
    #[error("coordinate out of range ({latitude}, {longitude})")]
    CoordinateOutOfRange { latitude: f64, longitude: f64 },
    #[error("invalid timestamp {timestamp_s}s (non-finite or before the epoch)")]
    InvalidTimestamp { timestamp_s: f64 },
    #[error("timestamp went back {regression_s}s, past the {tolerance_s}s tolerance")]
    TimestampRegression { regression_s: f64, tolerance_s: f64 },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TripConfig {
    /// Speed above which the over-limit event latches, km/h.
    pub speed_limit_kmh: f64,
    /// How far a timestamp may step backwards before the sample is rejected
    /// outright. Smaller regressions are treated as degenerate intervals.
    pub regression_tolerance_s: f64,
}

impl Default for TripConfig {
    fn default() -> Self {
        Self { speed_limit_kmh: 115.0, regression_tolerance_s: 1.0 }
    }
}

/// Stateful accumulator for one trip: start, feed samples, snapshot, stop.
/// Single-owner; wrap in a [`TripSession`] when feed and control are on
/// different threads.
#[derive(Debug)]
pub struct TripTracker {
    cfg: TripConfig,
    active: bool,
    start_time_s: Option<f64>,
    last_sample: Option<Position>,
    // Tracked in m/s internally; converted to km/h only at the snapshot edge.
    last_speed_mps: f64,
    total_distance_m: f64,
    max_speed_kmh: f64,
    max_acceleration_mps2: f64,
    over_limit_triggered: bool,
    over_limit_distance_m: Option<f64>,
}

impl Default for TripTracker {
    fn default() -> Self {
        Self::new(TripConfig::default())
    }
}

impl TripTracker {
    pub fn new(cfg: TripConfig) -> Self {
        Self {
            cfg,
            active: false,
            start_time_s: None,
            last_sample: None,
            last_speed_mps: 0.0,
            total_distance_m: 0.0,
            max_speed_kmh: 0.0,
            max_acceleration_mps2: 0.0,
            over_limit_triggered: false,
            over_limit_distance_m: None,
        }
    }

    pub fn config(&self) -> &TripConfig {
        &self.cfg
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Begin a trip. Idempotent; restarting mid-trip discards prior state.
    pub fn start(&mut self) {
        self.reset();
        self.active = true;
    }

    /// End the trip and clear all metrics back to zero. Idempotent.
    pub fn stop(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.active = false;
        self.start_time_s = None;
        self.last_sample = None;
        self.last_speed_mps = 0.0;
        self.total_distance_m = 0.0;
        self.max_speed_kmh = 0.0;
        self.max_acceleration_mps2 = 0.0;
        self.over_limit_triggered = false;
        self.over_limit_distance_m = None;
    }

    /// Fold one fix into the trip. No-op while inactive; the first accepted
    /// fix only establishes the baseline.
    pub fn submit_sample(&mut self, sample: Position) -> Result<(), SampleError> {
        if !self.active {
            return Ok(());
        }
        validate(&sample)?;

        let last = match self.last_sample {
            Some(last) => last,
            None => {
                self.start_time_s = Some(sample.timestamp_s);
                self.last_sample = Some(sample);
                return Ok(());
            }
        };

        let dt = sample.timestamp_s - last.timestamp_s;
        if dt < -self.cfg.regression_tolerance_s {
            return Err(SampleError::TimestampRegression {
                regression_s: -dt,
                tolerance_s: self.cfg.regression_tolerance_s,
            });
        }
        if dt <= 0.0 {
            // Duplicate timestamps advance the reference position; a tolerated
            // backwards step is dropped so the reference stays monotonic.
            if dt == 0.0 {
                self.last_sample = Some(sample);
            }
            return Ok(());
        }

        let distance_m = geo::great_circle_m(
            last.latitude,
            last.longitude,
            sample.latitude,
            sample.longitude,
        );
        let speed_mps = distance_m / dt;
        let acceleration = (speed_mps - self.last_speed_mps) / dt;

        self.total_distance_m += distance_m;
        let speed_kmh = speed_mps * MPS_TO_KMH;
        self.max_speed_kmh = self.max_speed_kmh.max(speed_kmh);
        self.max_acceleration_mps2 = self.max_acceleration_mps2.max(acceleration);
        self.last_speed_mps = speed_mps;

        if speed_kmh > self.cfg.speed_limit_kmh && !self.over_limit_triggered {
            self.over_limit_triggered = true;
            self.over_limit_distance_m = Some(self.total_distance_m);
        }

        self.last_sample = Some(sample);
        Ok(())
    }

    /// Current metrics; all zero outside an active trip.
    pub fn snapshot(&self) -> TripSnapshot {
        TripSnapshot {
            current_speed_kmh: self.last_speed_mps * MPS_TO_KMH,
            total_distance_m: self.total_distance_m,
            max_speed_kmh: self.max_speed_kmh,
            average_speed_kmh: self.average_speed_kmh(),
            max_acceleration_mps2: self.max_acceleration_mps2,
            over_limit_triggered: self.over_limit_triggered,
            over_limit_distance_m: self.over_limit_distance_m,
        }
    }

    fn average_speed_kmh(&self) -> f64 {
        let (start, last) = match (self.start_time_s, &self.last_sample) {
            (Some(start), Some(last)) => (start, last),
            _ => return 0.0,
        };
        let elapsed = last.timestamp_s - start;
        if elapsed <= 0.0 {
            return 0.0;
        }
        (self.total_distance_m / elapsed) * MPS_TO_KMH
    }
}

fn validate(sample: &Position) -> Result<(), SampleError> {
    let (lat, lon) = (sample.latitude, sample.longitude);
    if !lat.is_finite() || !lon.is_finite() {
        return Err(SampleError::NonFiniteCoordinate { latitude: lat, longitude: lon });
    }
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(SampleError::CoordinateOutOfRange { latitude: lat, longitude: lon });
    }
    if !sample.timestamp_s.is_finite() || sample.timestamp_s < 0.0 {
        return Err(SampleError::InvalidTimestamp { timestamp_s: sample.timestamp_s });
    }
    Ok(())
}
