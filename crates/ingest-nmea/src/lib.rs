//! NMEA 0183 position source: RMC sentences over UDP.
// RMC is the one sentence carrying both a date and a position, which the
// trip core needs for absolute timestamps.

use anyhow::Context;
use model::Position;
use time::{Date, Month, PrimitiveDateTime, Time};
use tokio::net::UdpSocket;
use trip_ingest_core::{IngestError, PositionSource, PositionTx};

#[derive(Clone, Debug)]
pub struct NmeaConfig {
    /// Local bind address for receiving sentences (default port 10110).
    pub bind_addr: String,
}

impl Default for NmeaConfig {
    fn default() -> Self {
        Self { bind_addr: "0.0.0.0:10110".into() }
    }
}

pub struct NmeaSource {
    cfg: NmeaConfig,
}

impl NmeaSource {
    pub fn new(cfg: NmeaConfig) -> Self {
        Self { cfg }
    }
}

#[async_trait::async_trait]
impl PositionSource for NmeaSource {
    async fn run(&self, tx: PositionTx) -> Result<(), IngestError> {
        let socket = UdpSocket::bind(&self.cfg.bind_addr)
            .await
            .with_context(|| format!("bind {}", self.cfg.bind_addr))?;
        let mut buf = vec![0u8; 2048];
        loop {
            let (len, _peer) = socket.recv_from(&mut buf).await.map_err(anyhow::Error::from)?;
            let Ok(text) = std::str::from_utf8(&buf[..len]) else { continue };
            for line in text.lines() {
                if let Some(fix) = parse_rmc(line) {
                    let _ = tx.send(fix);
                }
            }
        }
    }
}

/// Parse one RMC sentence into a fix. Returns `None` for any other sentence
/// type, a failed checksum, a void fix (`V`), or malformed fields.
pub fn parse_rmc(line: &str) -> Option<Position> {
    let line = line.trim();
    let body = line.strip_prefix('$')?;
    let (body, checksum) = body.split_once('*')?;
    if !checksum_ok(body, checksum) {
        return None;
    }

    let fields: Vec<&str> = body.split(',').collect();
    // $--RMC,time,status,lat,N/S,lon,E/W,speed,course,date,...
    if fields.len() < 10 || !fields[0].ends_with("RMC") {
        return None;
    }
    if fields[2] != "A" {
        return None;
    }

    let latitude = parse_coordinate(fields[3], fields[4], 2)?;
    let longitude = parse_coordinate(fields[5], fields[6], 3)?;
    let timestamp_s = parse_datetime(fields[1], fields[9])?;

    Some(Position::new(latitude, longitude, timestamp_s))
}

fn checksum_ok(body: &str, checksum: &str) -> bool {
    let Ok(expected) = u8::from_str_radix(checksum.trim(), 16) else {
        return false;
    };
    body.bytes().fold(0u8, |acc, b| acc ^ b) == expected
}

/// ddmm.mmmm / dddmm.mmmm with an N/S/E/W hemisphere into signed degrees.
fn parse_coordinate(value: &str, hemisphere: &str, deg_digits: usize) -> Option<f64> {
    // get() rather than indexing: a multibyte character in a checksum-valid
    // sentence must fail the parse, not panic on a char boundary.
    let degrees: f64 = value.get(..deg_digits)?.parse().ok()?;
    let minutes: f64 = value.get(deg_digits..)?.parse().ok()?;
    let magnitude = degrees + minutes / 60.0;
    match hemisphere {
        "N" | "E" => Some(magnitude),
        "S" | "W" => Some(-magnitude),
        _ => None,
    }
}

/// hhmmss(.sss) + ddmmyy into f64 Unix seconds.
fn parse_datetime(hms: &str, dmy: &str) -> Option<f64> {
    if hms.len() < 6 || dmy.len() != 6 {
        return None;
    }
    let hour: u8 = hms.get(0..2)?.parse().ok()?;
    let minute: u8 = hms.get(2..4)?.parse().ok()?;
    let second: f64 = hms.get(4..)?.parse().ok()?;

    let day: u8 = dmy.get(0..2)?.parse().ok()?;
    let month: u8 = dmy.get(2..4)?.parse().ok()?;
    let year_2d: i32 = dmy.get(4..6)?.parse().ok()?;
    // GPS-epoch century split: RMC dates only carry two digits.
    let year = if year_2d >= 80 { 1900 + year_2d } else { 2000 + year_2d };

    let date = Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()?;
    let whole = second as u8;
    if whole >= 60 {
        return None;
    }
    let time = Time::from_hms(hour, minute, whole).ok()?;
    let unix = PrimitiveDateTime::new(date, time).assume_utc().unix_timestamp();
    Some(unix as f64 + (second - whole as f64))
}
