use std::time::{Duration, SystemTime, UNIX_EPOCH};

use model::Position;
use trip_ingest_core::{IngestError, PositionSource, PositionTx};

// One degree of longitude on the equator, meters.
const METERS_PER_DEGREE: f64 = 111_195.0;

/// Synthetic drive east along the equator: accelerates to a cruise above the
/// default 115 km/h limit, then settles back down. Emits one fix per second.
#[derive(Clone, Debug)]
pub struct SimSource {
    pub cruise_kmh: f64,
    pub accel_mps2: f64,
}

impl Default for SimSource {
    fn default() -> Self {
        Self { cruise_kmh: 130.0, accel_mps2: 2.0 }
    }
}

#[async_trait::async_trait]
impl PositionSource for SimSource {
    async fn run(&self, tx: PositionTx) -> Result<(), IngestError> {
        let cruise_mps = self.cruise_kmh / 3.6;
        let mut speed_mps = 0.0;
        let mut longitude = 0.0;
        let mut tick = tokio::time::interval(Duration::from_secs(1));
        let mut elapsed = 0u64;

        loop {
            tick.tick().await;
            // Hold cruise for a minute, then coast back below the limit.
            let target = if elapsed < 90 { cruise_mps } else { cruise_mps * 0.6 };
            if speed_mps < target {
                speed_mps = (speed_mps + self.accel_mps2).min(target);
            } else {
                speed_mps = (speed_mps - self.accel_mps2).max(target);
            }
            longitude += speed_mps / METERS_PER_DEGREE;
            elapsed += 1;

            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_err(|e| IngestError::Msg(e.to_string()))?
                .as_secs_f64();
            if tx.send(Position::new(0.0, longitude, now)).is_err() {
                return Ok(());
            }
        }
    }
}
