//! Great-circle distance between coordinate pairs

use serde::Serialize;

use crate::error::Result;
use crate::validate::validate_coordinates;

const KM_PER_NAUTICAL_MILE: f64 = 1.852;

/// A distance expressed in the three units travelers ask for
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct DistanceBreakdown {
    pub kilometers: f64,
    pub miles: f64,
    pub nautical_miles: f64,
}

/// Compute the great-circle distance between two points.
///
/// Both coordinate pairs are range-checked before computing. Values are
/// rounded to two decimals for presentation.
pub fn distance_between(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<DistanceBreakdown> {
    validate_coordinates(lat1, lon1)?;
    validate_coordinates(lat2, lon2)?;

    let kilometers = haversine::distance(
        haversine::Location {
            latitude: lat1,
            longitude: lon1,
        },
        haversine::Location {
            latitude: lat2,
            longitude: lon2,
        },
        haversine::Units::Kilometers,
    );
    let miles = haversine::distance(
        haversine::Location {
            latitude: lat1,
            longitude: lon1,
        },
        haversine::Location {
            latitude: lat2,
            longitude: lon2,
        },
        haversine::Units::Miles,
    );

    Ok(DistanceBreakdown {
        kilometers: round2(kilometers),
        miles: round2(miles),
        nautical_miles: round2(kilometers / KM_PER_NAUTICAL_MILE),
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paris_to_london() {
        // Paris 48.8566,2.3522 to London 51.5074,-0.1278 is roughly 343 km
        let d = distance_between(48.8566, 2.3522, 51.5074, -0.1278).unwrap();
        assert!((d.kilometers - 343.5).abs() < 2.0, "got {} km", d.kilometers);
        assert!((d.miles - 213.5).abs() < 2.0, "got {} mi", d.miles);
        assert!(
            (d.nautical_miles - d.kilometers / 1.852).abs() < 0.01,
            "got {} nm",
            d.nautical_miles
        );
    }

    #[test]
    fn test_zero_distance() {
        let d = distance_between(40.0, -70.0, 40.0, -70.0).unwrap();
        assert_eq!(d.kilometers, 0.0);
        assert_eq!(d.miles, 0.0);
    }

    #[test]
    fn test_out_of_range_coordinates_rejected() {
        assert!(distance_between(95.0, 0.0, 0.0, 0.0).is_err());
        assert!(distance_between(0.0, 0.0, 0.0, 181.0).is_err());
    }
}
