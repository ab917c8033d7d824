use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::model::SignalRecord;

use super::error::FeedError;
use super::http::{decode_each, FlexibleId, JsonClient};
use super::Feed;

#[derive(Debug, Deserialize)]
struct RawSignal {
    id: FlexibleId,
    #[serde(alias = "frequency")]
    freq: f64,
    station_id: FlexibleId,
    start: DateTime<Utc>,
    duration: f64,
}

/// Unidentified radio signal reports (SatNOGS).
pub struct SignalFeed {
    client: JsonClient,
}

impl SignalFeed {
    pub fn new(client: JsonClient) -> Self {
        Self { client }
    }
}

impl Feed for SignalFeed {
    type Record = SignalRecord;

    async fn fetch(&self) -> Result<Vec<SignalRecord>, FeedError> {
        decode_signals(self.client.get_array().await?)
    }
}

pub fn decode_signals(items: Vec<Value>) -> Result<Vec<SignalRecord>, FeedError> {
    decode_each("signals", items, |raw: RawSignal| {
        if !raw.duration.is_finite() || raw.duration < 0.0 {
            return Err(format!("invalid duration {}", raw.duration));
        }
        Ok(SignalRecord {
            id: raw.id.into_string(),
            frequency_mhz: raw.freq,
            station_id: raw.station_id.into_string(),
            start_time: raw.start,
            duration_seconds: raw.duration,
        })
    })
}
