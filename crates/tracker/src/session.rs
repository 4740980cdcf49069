use std::collections::HashMap;

use model::{Position, TripId, TripSnapshot};
use parking_lot::Mutex;
use thiserror::Error;
use uuid::Uuid;

use crate::{SampleError, TripConfig, TripTracker};

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("unknown trip {0}")]
    UnknownTrip(TripId),
    #[error(transparent)]
    Sample(#[from] SampleError),
}

/// Shared registry of independent trip trackers. One mutex guards the whole
/// map, so control calls, feeds and snapshots never interleave mid-update.
pub struct TripSession {
    inner: Mutex<Inner>,
}

struct Inner {
    trips: HashMap<TripId, TripTracker>,
}

impl Default for TripSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TripSession {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner { trips: HashMap::new() }) }
    }

    /// Register a new trip; the tracker starts idle.
    pub fn create_trip(&self, cfg: TripConfig) -> TripId {
        let id = Uuid::new_v4();
        self.inner.lock().trips.insert(id, TripTracker::new(cfg));
        id
    }

    pub fn start_trip(&self, id: TripId) -> Result<(), SessionError> {
        self.with_trip(id, |t| {
            t.start();
            Ok(())
        })
    }

    pub fn stop_trip(&self, id: TripId) -> Result<(), SessionError> {
        self.with_trip(id, |t| {
            t.stop();
            Ok(())
        })
    }

    pub fn remove_trip(&self, id: TripId) -> Result<(), SessionError> {
        self.inner
            .lock()
            .trips
            .remove(&id)
            .map(|_| ())
            .ok_or(SessionError::UnknownTrip(id))
    }

    pub fn feed_sample(&self, id: TripId, sample: Position) -> Result<(), SessionError> {
        self.with_trip(id, |t| t.submit_sample(sample).map_err(SessionError::from))
    }

    pub fn snapshot(&self, id: TripId) -> Result<TripSnapshot, SessionError> {
        self.with_trip(id, |t| Ok(t.snapshot()))
    }

    fn with_trip<R>(
        &self,
        id: TripId,
        f: impl FnOnce(&mut TripTracker) -> Result<R, SessionError>,
    ) -> Result<R, SessionError> {
        let mut inner = self.inner.lock();
        let trip = inner.trips.get_mut(&id).ok_or(SessionError::UnknownTrip(id))?;
        f(trip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_unknown_trip_errors() {
        let session = TripSession::new();
        let id = Uuid::new_v4();
        assert_eq!(session.start_trip(id), Err(SessionError::UnknownTrip(id)));
        assert_eq!(session.snapshot(id), Err(SessionError::UnknownTrip(id)));
        assert_eq!(session.remove_trip(id), Err(SessionError::UnknownTrip(id)));
    }

    #[test]
    fn test_trips_are_independent() {
        let session = TripSession::new();
        let a = session.create_trip(TripConfig::default());
        let b = session.create_trip(TripConfig::default());
        session.start_trip(a).unwrap();
        session.start_trip(b).unwrap();

        session.feed_sample(a, Position::new(0.0, 0.0, 0.0)).unwrap();
        session.feed_sample(a, Position::new(0.0, 0.001, 10.0)).unwrap();

        assert!(session.snapshot(a).unwrap().total_distance_m > 100.0);
        assert_eq!(session.snapshot(b).unwrap(), TripSnapshot::zeroed());
    }

    #[test]
    fn test_feed_before_start_is_ignored() {
        let session = TripSession::new();
        let id = session.create_trip(TripConfig::default());
        session.feed_sample(id, Position::new(0.0, 0.0, 0.0)).unwrap();
        session.feed_sample(id, Position::new(0.0, 0.001, 10.0)).unwrap();
        assert_eq!(session.snapshot(id).unwrap(), TripSnapshot::zeroed());
    }

    #[test]
    fn test_sample_errors_pass_through() {
        let session = TripSession::new();
        let id = session.create_trip(TripConfig::default());
        session.start_trip(id).unwrap();
        let err = session.feed_sample(id, Position::new(f64::NAN, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, SessionError::Sample(_)));
    }

    #[test]
    fn test_concurrent_feed_and_snapshot() {
        let session = Arc::new(TripSession::new());
        let id = session.create_trip(TripConfig::default());
        session.start_trip(id).unwrap();

        let feeder = {
            let session = Arc::clone(&session);
            std::thread::spawn(move || {
                for i in 0..500u32 {
                    let sample = Position::new(0.0, i as f64 * 1e-5, i as f64);
                    session.feed_sample(id, sample).unwrap();
                }
            })
        };
        let reader = {
            let session = Arc::clone(&session);
            std::thread::spawn(move || {
                for _ in 0..500 {
                    let s = session.snapshot(id).unwrap();
                    // A torn update would let the running max fall behind.
                    assert!(s.max_speed_kmh >= s.current_speed_kmh);
                    assert!(s.total_distance_m >= 0.0);
                }
            })
        };
        feeder.join().unwrap();
        reader.join().unwrap();

        let final_snap = session.snapshot(id).unwrap();
        assert!((final_snap.total_distance_m - 499.0 * 1.11195).abs() < 0.5);
    }
}
