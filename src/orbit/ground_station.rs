use serde::Serialize;
use utoipa::ToSchema;

// WGS-84
pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.137;
pub const EARTH_ECCENTRICITY_SQ: f64 = 0.00669437999014;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct GroundStation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

impl GroundStation {
    /// Parses `"lat, lon"` in decimal degrees.
    pub fn from_coordinates(coordinates: &str, altitude_m: Option<f64>) -> Option<Self> {
        let mut parts = coordinates.split(',').map(|s| s.trim());
        let lat: f64 = parts.next()?.parse().ok()?;
        let lon: f64 = parts.next()?.parse().ok()?;
        if parts.next().is_some() || !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon)
        {
            return None;
        }
        Some(Self {
            latitude_deg: lat,
            longitude_deg: lon,
            altitude_m: altitude_m.unwrap_or(0.0),
        })
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        geodetic_to_ecef_km(self.lat_rad(), self.lon_rad(), self.altitude_m / 1000.0)
    }
}

pub fn geodetic_to_ecef_km(lat_rad: f64, lon_rad: f64, alt_km: f64) -> [f64; 3] {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let n = EARTH_EQUATORIAL_RADIUS_KM / (1.0 - EARTH_ECCENTRICITY_SQ * sin_lat * sin_lat).sqrt();
    [
        (n + alt_km) * cos_lat * lon_rad.cos(),
        (n + alt_km) * cos_lat * lon_rad.sin(),
        (n * (1.0 - EARTH_ECCENTRICITY_SQ) + alt_km) * sin_lat,
    ]
}

/// Returns `(lat_rad, lon_rad, alt_km)`.
pub fn ecef_to_geodetic(pos: [f64; 3]) -> (f64, f64, f64) {
    let [x, y, z] = pos;
    let lon = y.atan2(x);
    let p = (x * x + y * y).sqrt();
    let mut lat = z.atan2(p * (1.0 - EARTH_ECCENTRICITY_SQ));
    let mut alt = 0.0;
    for _ in 0..6 {
        let sin_lat = lat.sin();
        let n =
            EARTH_EQUATORIAL_RADIUS_KM / (1.0 - EARTH_ECCENTRICITY_SQ * sin_lat * sin_lat).sqrt();
        alt = p / lat.cos() - n;
        lat = z.atan2(p * (1.0 - EARTH_ECCENTRICITY_SQ * n / (n + alt)));
    }
    (lat, lon, alt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinates() {
        let station = GroundStation::from_coordinates("40.4168, -3.7038", Some(650.0)).unwrap();
        assert_eq!(station.latitude_deg, 40.4168);
        assert_eq!(station.longitude_deg, -3.7038);
        assert_eq!(station.altitude_m, 650.0);

        assert!(GroundStation::from_coordinates("40.4", None).is_none());
        assert!(GroundStation::from_coordinates("north, east", None).is_none());
        assert!(GroundStation::from_coordinates("95.0, 10.0", None).is_none());
    }

    #[test]
    fn geodetic_conversion_is_consistent() {
        let lat = 40.0_f64.to_radians();
        let lon = (-3.5_f64).to_radians();
        let ecef = geodetic_to_ecef_km(lat, lon, 420.0);
        let (lat2, lon2, alt2) = ecef_to_geodetic(ecef);
        assert!((lat - lat2).abs() < 1e-9);
        assert!((lon - lon2).abs() < 1e-9);
        assert!((alt2 - 420.0).abs() < 1e-6);
    }
}
