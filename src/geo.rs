//! Great-circle distance on a spherical Earth.
//!
//! Haversine formula. Inputs are not validated here: out-of-range or
//! non-finite coordinates yield NaN or meaningless distances, never a panic.
//! Use [`Coordinate::validated`] at the edges where user input arrives.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Earth's mean radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("latitude {0} is outside -90..90")]
    Latitude(f64),
    #[error("longitude {0} is outside -180..180")]
    Longitude(f64),
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Build a coordinate, rejecting values outside the valid ranges (NaN included).
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude(longitude));
        }
        Ok(Self::new(latitude, longitude))
    }

    fn to_radians(self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

/// Great-circle distance between `a` and `b` in miles.
#[inline]
pub fn distance_miles(a: Coordinate, b: Coordinate) -> f64 {
    haversine(a, b, EARTH_RADIUS_MILES)
}

/// Great-circle distance between `a` and `b` in kilometers.
#[inline]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    haversine(a, b, EARTH_RADIUS_KM)
}

fn haversine(a: Coordinate, b: Coordinate, radius: f64) -> f64 {
    let (lat1, lon1) = a.to_radians();
    let (lat2, lon2) = b.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1.0 for antipodal points. NaN passes through.
    let h = if h > 1.0 { 1.0 } else { h };

    2.0 * radius * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    const SAN_FRANCISCO: Coordinate = Coordinate::new(37.7749, -122.4194);
    const SACRAMENTO: Coordinate = Coordinate::new(38.5816, -121.4944);
    const LOS_ANGELES: Coordinate = Coordinate::new(34.0522, -118.2437);

    #[test]
    fn test_sf_to_la() {
        let d = distance_miles(SAN_FRANCISCO, LOS_ANGELES);
        // ~347 miles
        assert!((d - 347.4).abs() < 3.0, "SF-LA: {}", d);
    }

    #[test]
    fn test_sf_to_sacramento() {
        let d = distance_miles(SAN_FRANCISCO, SACRAMENTO);
        assert!((d - 75.0).abs() < 5.0, "SF-Sacramento: {}", d);
    }

    #[test]
    fn test_km_and_miles_agree() {
        let miles = distance_miles(SAN_FRANCISCO, LOS_ANGELES);
        let km = distance_km(SAN_FRANCISCO, LOS_ANGELES);
        assert_abs_diff_eq!(km / miles, EARTH_RADIUS_KM / EARTH_RADIUS_MILES, epsilon = 1e-9);
    }

    #[test]
    fn test_same_point_is_zero() {
        assert_abs_diff_eq!(distance_miles(SACRAMENTO, SACRAMENTO), 0.0);
    }

    #[test]
    fn test_antipodal_is_half_circumference() {
        let d = distance_miles(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0));
        assert_abs_diff_eq!(d, std::f64::consts::PI * EARTH_RADIUS_MILES, epsilon = 1e-6);
    }

    #[test]
    fn test_nan_input_yields_nan() {
        assert!(distance_miles(Coordinate::new(f64::NAN, 0.0), SACRAMENTO).is_nan());
        assert!(distance_miles(SACRAMENTO, Coordinate::new(0.0, f64::NAN)).is_nan());
        assert!(distance_km(Coordinate::new(f64::NAN, f64::NAN), SAN_FRANCISCO).is_nan());
    }

    #[test]
    fn test_validated_ranges() {
        assert!(Coordinate::validated(90.0, -180.0).is_ok());
        assert_eq!(Coordinate::validated(91.0, 0.0), Err(CoordinateError::Latitude(91.0)));
        assert_eq!(Coordinate::validated(0.0, 180.5), Err(CoordinateError::Longitude(180.5)));
        assert!(Coordinate::validated(f64::NAN, 0.0).is_err());
    }

    proptest! {
        #[test]
        fn prop_distance_is_symmetric(
            lat1 in -90.0f64..=90.0, lon1 in -180.0f64..=180.0,
            lat2 in -90.0f64..=90.0, lon2 in -180.0f64..=180.0,
        ) {
            let a = Coordinate::new(lat1, lon1);
            let b = Coordinate::new(lat2, lon2);
            prop_assert!((distance_miles(a, b) - distance_miles(b, a)).abs() < 1e-6);
        }

        #[test]
        fn prop_distance_to_self_is_zero(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let a = Coordinate::new(lat, lon);
            prop_assert_eq!(distance_miles(a, a), 0.0);
        }

        #[test]
        fn prop_distance_is_bounded(
            lat1 in -90.0f64..=90.0, lon1 in -180.0f64..=180.0,
            lat2 in -90.0f64..=90.0, lon2 in -180.0f64..=180.0,
        ) {
            let d = distance_miles(Coordinate::new(lat1, lon1), Coordinate::new(lat2, lon2));
            prop_assert!(d >= 0.0);
            prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_MILES + 1e-6);
        }
    }
}
