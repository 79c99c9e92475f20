//! Geodesy primitives: validated coordinates, haversine distance and the
//! bounding boxes used to prefilter candidates before exact distance checks.

use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};

/// Mean Earth radius used by every distance computation
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A legal WGS84 coordinate (latitude in `-90..=90`, longitude in `-180..=180`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = ValidationError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lat, raw.lon)
    }
}

impl Coordinate {
    /// Validate and build a coordinate
    pub fn new(lat: f64, lon: f64) -> Result<Self, ValidationError> {
        let legal = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        if !legal {
            return Err(ValidationError::InvalidCoordinates { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    /// Latitude in degrees
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Great-circle distance in meters
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        haversine_meters(*self, *other)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// Haversine great-circle distance between two coordinates, in meters
pub fn haversine_meters(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Axis-aligned latitude/longitude box enclosing a circle
///
/// Stores use it as a cheap parameterised prefilter; the exact radius test is
/// always the haversine distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southern edge
    pub min_lat: f64,
    /// Northern edge
    pub max_lat: f64,
    /// Western edge
    pub min_lon: f64,
    /// Eastern edge
    pub max_lon: f64,
}

impl BoundingBox {
    /// Box covering every point within `radius_meters` of `center`
    pub fn around(center: Coordinate, radius_meters: f64) -> Self {
        let radius = radius_meters.max(0.0);
        // Slightly widened so that points exactly on the circle survive rounding.
        let lat_delta = (radius / EARTH_RADIUS_METERS).to_degrees() * 1.000_1;
        let min_lat = (center.lat - lat_delta).max(-90.0);
        let max_lat = (center.lat + lat_delta).min(90.0);

        // Widest parallel inside the box decides the longitude span.
        let widest = min_lat.abs().max(max_lat.abs());
        let cos = widest.to_radians().cos();
        let (min_lon, max_lon) = if widest >= 89.0 || cos <= f64::EPSILON {
            (-180.0, 180.0)
        } else {
            let lon_delta = lat_delta / cos;
            let west = center.lon - lon_delta;
            let east = center.lon + lon_delta;
            if lon_delta >= 180.0 || west < -180.0 || east > 180.0 {
                // antimeridian crossing
                (-180.0, 180.0)
            } else {
                (west, east)
            }
        };

        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Whether the point lies inside the box (edges inclusive)
    pub fn contains(&self, point: &Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lon..=self.max_lon).contains(&point.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Coordinate::new(90.1, 0.0).is_err());
        assert!(Coordinate::new(-90.1, 0.0).is_err());
        assert!(Coordinate::new(0.0, 180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(90.0, -180.0).is_ok());
    }

    #[test]
    fn test_known_distance() {
        let a = Coordinate::new(0.0, 0.0).unwrap();
        let b = Coordinate::new(0.001, 0.001).unwrap();
        assert_eq!(a.distance_to(&b).round(), 157.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let a = Coordinate::new(0.0, 0.0).unwrap();
        let b = Coordinate::new(1.0, 0.0).unwrap();
        let d = a.distance_to(&b);
        assert!((d - 111_194.9).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<Coordinate, _> = serde_json::from_str(r#"{"lat": 10.0, "lon": 20.0}"#);
        assert!(ok.is_ok());
        let bad: Result<Coordinate, _> = serde_json::from_str(r#"{"lat": 100.0, "lon": 20.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_bounding_box_contains_circle() {
        let center = Coordinate::new(45.0, 10.0).unwrap();
        let bbox = BoundingBox::around(center, 5_000.0);
        let east = Coordinate::new(45.0, 10.06).unwrap();
        assert!(center.distance_to(&east) < 5_000.0);
        assert!(bbox.contains(&east));
    }

    #[test]
    fn test_bounding_box_polar_and_antimeridian() {
        let pole = Coordinate::new(89.9, 0.0).unwrap();
        let bbox = BoundingBox::around(pole, 50_000.0);
        assert_eq!((bbox.min_lon, bbox.max_lon), (-180.0, 180.0));

        let dateline = Coordinate::new(0.0, 179.99).unwrap();
        let bbox = BoundingBox::around(dateline, 10_000.0);
        assert_eq!((bbox.min_lon, bbox.max_lon), (-180.0, 180.0));
    }
}
