use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::model::{CatalogRecord, ObjectType};
use crate::orbit::Orbit;

use super::error::FeedError;
use super::http::{decode_each, FlexibleId, JsonClient};
use super::Feed;

#[derive(Debug, Deserialize)]
struct RawCatalogEntry {
    #[serde(rename = "OBJECT_NAME")]
    object_name: String,
    #[serde(rename = "NORAD_CAT_ID")]
    norad_cat_id: FlexibleId,
    #[serde(rename = "OBJECT_TYPE", default)]
    object_type: Option<String>,
    #[serde(rename = "MEAN_MOTION")]
    mean_motion: f64,
    #[serde(rename = "INCLINATION")]
    inclination: f64,
    #[serde(rename = "ECCENTRICITY")]
    eccentricity: f64,
}

/// Orbital object catalog (Celestrak GP data in JSON).
pub struct CatalogFeed {
    client: JsonClient,
}

impl CatalogFeed {
    pub fn new(client: JsonClient) -> Self {
        Self { client }
    }
}

impl Feed for CatalogFeed {
    type Record = CatalogRecord;

    async fn fetch(&self) -> Result<Vec<CatalogRecord>, FeedError> {
        decode_catalog(self.client.get_array().await?)
    }
}

pub fn decode_catalog(items: Vec<Value>) -> Result<Vec<CatalogRecord>, FeedError> {
    // The full mean elements are optional; keep a copy for the orbit before
    // the strict record decode consumes the value.
    let orbits: Vec<Option<Arc<Orbit>>> = items
        .iter()
        .map(|item| match Orbit::from_omm_json(item) {
            Ok(orbit) => Some(Arc::new(orbit)),
            Err(e) => {
                log::trace!("catalog entry without usable elements: {}", e);
                None
            }
        })
        .collect();

    let records = decode_each("catalog", items, |raw: RawCatalogEntry| {
        Ok(CatalogRecord {
            name: raw.object_name,
            catalog_id: raw.norad_cat_id.into_string(),
            object_type: ObjectType::from_catalog(raw.object_type.as_deref()),
            mean_motion: raw.mean_motion,
            inclination_deg: raw.inclination,
            eccentricity: raw.eccentricity,
            orbit: None,
        })
    })?;

    Ok(records
        .into_iter()
        .zip(orbits)
        .map(|(record, orbit)| CatalogRecord { orbit, ..record })
        .collect())
}
