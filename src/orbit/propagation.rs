use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sgp4::{Constants, Elements};
use std::fmt;
use utoipa::ToSchema;

use super::error::OrbitError;
use super::ground_station::{ecef_to_geodetic, GroundStation};

/// Propagatable mean elements of one catalog object.
pub struct Orbit {
    elements: Elements,
    constants: Constants,
}

impl fmt::Debug for Orbit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orbit")
            .field("norad_id", &self.elements.norad_id)
            .field("epoch", &self.elements.datetime)
            .finish()
    }
}

impl Orbit {
    pub fn from_elements(elements: Elements) -> Result<Self, OrbitError> {
        let constants =
            Constants::from_elements(&elements).map_err(|e| OrbitError::Elements(e.to_string()))?;
        Ok(Self {
            elements,
            constants,
        })
    }

    /// Builds an orbit from a Celestrak OMM JSON object.
    pub fn from_omm_json(value: &serde_json::Value) -> Result<Self, OrbitError> {
        let elements: Elements = serde_json::from_value(value.clone())
            .map_err(|e| OrbitError::Elements(e.to_string()))?;
        Self::from_elements(elements)
    }

    /// Position in the TEME frame, km.
    fn position_teme_km(&self, timestamp: DateTime<Utc>) -> Result<[f64; 3], OrbitError> {
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
            .map_err(|e| OrbitError::Propagation(e.to_string()))?;
        let prediction = self
            .constants
            .propagate(minutes)
            .map_err(|e| OrbitError::Propagation(e.to_string()))?;
        Ok(prediction.position)
    }

    fn position_ecef_km(&self, timestamp: DateTime<Utc>) -> Result<[f64; 3], OrbitError> {
        let teme = self.position_teme_km(timestamp)?;
        let sidereal = sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(
            &timestamp.naive_utc(),
        ));
        Ok(teme_to_ecef_position(teme, sidereal))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct GeoPoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct LookAngles {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrackPoint {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub point: GeoPoint,
}

/// Sub-satellite point at `timestamp`.
pub fn subpoint(orbit: &Orbit, timestamp: DateTime<Utc>) -> Result<GeoPoint, OrbitError> {
    let (lat, lon, alt) = ecef_to_geodetic(orbit.position_ecef_km(timestamp)?);
    Ok(GeoPoint {
        latitude_deg: round4(lat.to_degrees()),
        longitude_deg: round4(lon.to_degrees()),
        altitude_km: round2(alt),
    })
}

/// Azimuth/elevation/range of the object as seen from `station`.
pub fn look_angles(
    station: &GroundStation,
    orbit: &Orbit,
    timestamp: DateTime<Utc>,
) -> Result<LookAngles, OrbitError> {
    let sat_ecef = orbit.position_ecef_km(timestamp)?;
    let sta_ecef = station.position_ecef_km();

    let dr = [
        sat_ecef[0] - sta_ecef[0],
        sat_ecef[1] - sta_ecef[1],
        sat_ecef[2] - sta_ecef[2],
    ];
    let range_km = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();

    let (east, north, up) = ecef_to_enu(dr, station.lat_rad(), station.lon_rad());
    let azimuth = east.atan2(north).to_degrees().rem_euclid(360.0);
    let elevation = if range_km > 0.0 {
        (up / range_km).asin().to_degrees()
    } else {
        0.0
    };

    Ok(LookAngles {
        azimuth_deg: round2(azimuth),
        elevation_deg: round2(elevation),
        range_km: round2(range_km),
    })
}

/// Samples the ground track from `start` to `end` inclusive.
pub fn ground_track(
    orbit: &Orbit,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
) -> Result<Vec<TrackPoint>, OrbitError> {
    if step <= Duration::zero() {
        return Err(OrbitError::Propagation("step must be positive".into()));
    }

    let mut cursor = Some(start);
    let mut points = Vec::new();
    while let Some(at) = cursor.filter(|at| *at <= end) {
        points.push(TrackPoint {
            timestamp: at,
            point: subpoint(orbit, at)?,
        });
        cursor = at.checked_add_signed(step);
    }
    Ok(points)
}

fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
