use serde::Deserialize;
use serde_json::Value;

use crate::model::PassRecord;

use super::error::FeedError;
use super::http::{decode_each, FlexibleTime, JsonClient};
use super::Feed;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPass {
    name: String,
    #[serde(rename = "startUTC")]
    start_utc: FlexibleTime,
    max_altitude: f64,
    magnitude: f64,
}

/// Visible pass predictions (Heavens-Above).
pub struct PassFeed {
    client: JsonClient,
}

impl PassFeed {
    pub fn new(client: JsonClient) -> Self {
        Self { client }
    }
}

impl Feed for PassFeed {
    type Record = PassRecord;

    async fn fetch(&self) -> Result<Vec<PassRecord>, FeedError> {
        decode_passes(self.client.get_array().await?)
    }
}

pub fn decode_passes(items: Vec<Value>) -> Result<Vec<PassRecord>, FeedError> {
    decode_each("passes", items, |raw: RawPass| {
        Ok(PassRecord {
            name: raw.name,
            start_time_utc: raw.start_utc.resolve()?,
            max_altitude_deg: raw.max_altitude,
            magnitude: raw.magnitude,
        })
    })
}
