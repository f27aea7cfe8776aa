//! Pure decision helpers for the sampling loop: geographic distance and the
//! accept/skip policy applied to each incoming fix.

use crate::models::{Fix, LocationRecord};

/// Minimum movement, in meters, for a fix to be worth recording.
pub const MIN_MOVE_DISTANCE_METERS: f64 = 3.0;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance between two points in meters.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    EARTH_RADIUS_METERS * 2.0 * a.sqrt().asin()
}

/// Decide whether a fix should be recorded, given the last persisted record.
///
/// The first fix is always accepted. A fix whose coordinates exactly equal
/// the last record's is rejected regardless of distance; anything else must
/// have moved at least [`MIN_MOVE_DISTANCE_METERS`].
pub fn should_accept(last: Option<&LocationRecord>, fix: &Fix) -> bool {
    let Some(last) = last else {
        return true;
    };

    if last.latitude == fix.latitude && last.longitude == fix.longitude {
        return false;
    }

    let distance = haversine_distance(last.latitude, last.longitude, fix.latitude, fix.longitude);
    distance >= MIN_MOVE_DISTANCE_METERS
}
