mod error;
mod ground_station;
mod propagation;

pub use error::OrbitError;
pub use ground_station::GroundStation;
pub use propagation::{ground_track, look_angles, subpoint, GeoPoint, LookAngles, Orbit, TrackPoint};

#[cfg(test)]
pub(crate) use propagation::tests::iss_orbit;
