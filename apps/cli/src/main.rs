//! Trip metrics harness: `trip-cli [nmea|sim]` feeds a source into a trip
//! session and prints one JSON snapshot per second.

mod sim;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use model::TripId;
use tracker::{TripConfig, TripSession};
use trip_ingest_core::{channel, PositionRx, PositionSource};
use trip_ingest_nmea::{NmeaConfig, NmeaSource};

use sim::SimSource;

#[tokio::main]
async fn main() -> Result<()> {
    let mode = std::env::args().nth(1).unwrap_or_else(|| "nmea".into());

    let session = Arc::new(TripSession::new());
    let trip = session.create_trip(TripConfig::default());
    session.start_trip(trip)?;

    let (tx, rx) = channel();
    match mode.as_str() {
        "nmea" => {
            let src = NmeaSource::new(NmeaConfig::default());
            tokio::spawn(async move {
                if let Err(e) = src.run(tx).await {
                    eprintln!("nmea source stopped: {e}");
                }
            });
        }
        "sim" => {
            let src = SimSource::default();
            tokio::spawn(async move {
                if let Err(e) = src.run(tx).await {
                    eprintln!("sim source stopped: {e}");
                }
            });
        }
        other => bail!("unknown source '{other}' (expected nmea or sim)"),
    }

    run_pump(rx, Arc::clone(&session), trip);

    let mut tick = tokio::time::interval(Duration::from_secs(1));
    loop {
        tick.tick().await;
        let snap = session.snapshot(trip)?;
        println!("{}", serde_json::to_string(&snap)?);
    }
}

/// Drain the source channel into the session on a dedicated blocking thread.
/// Invalid samples are reported and dropped; the feed keeps going.
fn run_pump(rx: PositionRx, session: Arc<TripSession>, trip: TripId) {
    std::thread::spawn(move || {
        while let Ok(sample) = rx.recv() {
            if let Err(e) = session.feed_sample(trip, sample) {
                eprintln!("sample rejected: {e}");
            }
        }
    });
}
