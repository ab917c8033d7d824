use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use strum_macros::Display;
use thiserror::Error;
use utoipa::ToSchema;

use crate::orbit::Orbit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectType {
    Payload,
    RocketBody,
    Debris,
    Other,
}

impl ObjectType {
    /// Maps the catalog's free-form `OBJECT_TYPE` text. Unknown values are `Other`.
    pub fn from_catalog(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return ObjectType::Other;
        };
        match raw.trim().to_ascii_uppercase().replace(' ', "_").as_str() {
            "PAYLOAD" => ObjectType::Payload,
            "ROCKET_BODY" => ObjectType::RocketBody,
            "DEBRIS" => ObjectType::Debris,
            _ => ObjectType::Other,
        }
    }
}

#[derive(Clone, Serialize, ToSchema)]
pub struct CatalogRecord {
    pub name: String,
    pub catalog_id: String,
    pub object_type: ObjectType,
    /// Revolutions per day.
    pub mean_motion: f64,
    pub inclination_deg: f64,
    pub eccentricity: f64,
    #[serde(skip)]
    pub orbit: Option<Arc<Orbit>>,
}

impl fmt::Debug for CatalogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogRecord")
            .field("name", &self.name)
            .field("catalog_id", &self.catalog_id)
            .field("object_type", &self.object_type)
            .field("mean_motion", &self.mean_motion)
            .field("inclination_deg", &self.inclination_deg)
            .field("eccentricity", &self.eccentricity)
            .field("has_orbit", &self.orbit.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SignalRecord {
    pub id: String,
    pub frequency_mhz: f64,
    pub station_id: String,
    pub start_time: DateTime<Utc>,
    pub duration_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PassRecord {
    pub name: String,
    pub start_time_utc: DateTime<Utc>,
    pub max_altitude_deg: f64,
    pub magnitude: f64,
}

/// Type filter applied by the catalog search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(ObjectType),
}

#[derive(Debug, Error)]
#[error("unknown object type filter: {0}")]
pub struct TypeFilterParseError(String);

impl FromStr for TypeFilter {
    type Err = TypeFilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        let filter = match normalized.as_str() {
            "" | "ALL" => TypeFilter::All,
            "PAYLOAD" => TypeFilter::Only(ObjectType::Payload),
            "ROCKET_BODY" => TypeFilter::Only(ObjectType::RocketBody),
            "DEBRIS" => TypeFilter::Only(ObjectType::Debris),
            "OTHER" => TypeFilter::Only(ObjectType::Other),
            _ => return Err(TypeFilterParseError(s.to_string())),
        };
        Ok(filter)
    }
}
