//! Leg geometry and distance helpers.
//!
//! Leg shapes arrive from the routing endpoint as Google encoded
//! polylines (precision 5). Straight-line distances are used to decide
//! which street-mode suggestions are worth querying at all.

use geo_types::{Coord, LineString};

use super::{DomainError, Location};

/// Mean earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// An encoded polyline as delivered by the routing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegGeometry {
    /// Encoded points string
    pub points: String,
    /// Point count as reported by the endpoint
    pub length: usize,
}

impl LegGeometry {
    /// Wrap an encoded points string.
    pub fn new(points: impl Into<String>, length: usize) -> Self {
        Self {
            points: points.into(),
            length,
        }
    }

    /// Decode to `(lat, lon)` pairs.
    pub fn decode(&self) -> Result<Vec<(f64, f64)>, DomainError> {
        let line: LineString<f64> = polyline::decode_polyline(&self.points, 5)
            .map_err(|e| DomainError::InvalidGeometry(e.to_string()))?;
        Ok(line.0.iter().map(|c| (c.y, c.x)).collect())
    }

    /// Encode `(lat, lon)` pairs into a geometry.
    pub fn encode(coords: &[(f64, f64)]) -> Result<Self, DomainError> {
        let line = coords
            .iter()
            .map(|&(lat, lon)| Coord { x: lon, y: lat })
            .collect::<Vec<_>>();
        let points = polyline::encode_coordinates(line, 5)
            .map_err(|e| DomainError::InvalidGeometry(e.to_string()))?;
        Ok(Self {
            points,
            length: coords.len(),
        })
    }

    /// Bounding box `(min_lat, min_lon, max_lat, max_lon)` of the
    /// decoded shape, or `None` for an empty geometry.
    pub fn bounds(&self) -> Result<Option<(f64, f64, f64, f64)>, DomainError> {
        let coords = self.decode()?;
        let mut iter = coords.into_iter();
        let Some((lat, lon)) = iter.next() else {
            return Ok(None);
        };
        let mut bounds = (lat, lon, lat, lon);
        for (lat, lon) in iter {
            bounds.0 = bounds.0.min(lat);
            bounds.1 = bounds.1.min(lon);
            bounds.2 = bounds.2.max(lat);
            bounds.3 = bounds.3.max(lon);
        }
        Ok(Some(bounds))
    }
}

/// Great-circle distance between two coordinates in metres.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Straight-line estimate of an itinerary's length in metres: the sum
/// of great-circle distances along origin, via points, destination.
pub fn estimated_distance(from: &Location, to: &Location, via: &[Location]) -> f64 {
    let mut total = 0.0;
    let mut prev = from;
    for point in via {
        total += haversine_distance(prev.lat, prev.lon, point.lat, point.lon);
        prev = point;
    }
    total + haversine_distance(prev.lat, prev.lon, to.lat, to.lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_zero_for_same_point() {
        assert_eq!(haversine_distance(60.17, 24.93, 60.17, 24.93), 0.0);
    }

    #[test]
    fn haversine_known_distance() {
        // Helsinki central railway station to Pasila, roughly 3.2 km
        let d = haversine_distance(60.1719, 24.9414, 60.1987, 24.9337);
        assert!((2900.0..3500.0).contains(&d), "got {d}");
    }

    #[test]
    fn haversine_symmetric() {
        let a = haversine_distance(60.1, 24.9, 61.5, 23.8);
        let b = haversine_distance(61.5, 23.8, 60.1, 24.9);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn estimated_distance_direct() {
        let from = Location::new(60.1719, 24.9414);
        let to = Location::new(60.1987, 24.9337);
        let direct = estimated_distance(&from, &to, &[]);
        assert_eq!(
            direct,
            haversine_distance(from.lat, from.lon, to.lat, to.lon)
        );
    }

    #[test]
    fn estimated_distance_with_via_is_longer() {
        let from = Location::new(60.1719, 24.9414);
        let to = Location::new(60.1987, 24.9337);
        let via = vec![Location::new(60.16, 25.0)];
        let direct = estimated_distance(&from, &to, &[]);
        let detour = estimated_distance(&from, &to, &via);
        assert!(detour > direct);
    }

    #[test]
    fn geometry_roundtrip() {
        let coords = vec![(60.1719, 24.9414), (60.18, 24.95), (60.1987, 24.9337)];
        let geometry = LegGeometry::encode(&coords).unwrap();
        assert_eq!(geometry.length, 3);

        let decoded = geometry.decode().unwrap();
        assert_eq!(decoded.len(), 3);
        for (orig, dec) in coords.iter().zip(decoded.iter()) {
            // Precision 5 quantises to ~1e-5 degrees
            assert!((orig.0 - dec.0).abs() < 1e-4);
            assert!((orig.1 - dec.1).abs() < 1e-4);
        }
    }

    #[test]
    fn decode_garbage_fails() {
        let geometry = LegGeometry::new("\u{1}\u{2}not a polyline", 4);
        assert!(geometry.decode().is_err());
    }

    #[test]
    fn bounds_of_shape() {
        let coords = vec![(60.1, 24.9), (60.3, 24.8), (60.2, 25.1)];
        let geometry = LegGeometry::encode(&coords).unwrap();
        let (min_lat, min_lon, max_lat, max_lon) = geometry.bounds().unwrap().unwrap();

        assert!((min_lat - 60.1).abs() < 1e-4);
        assert!((min_lon - 24.8).abs() < 1e-4);
        assert!((max_lat - 60.3).abs() < 1e-4);
        assert!((max_lon - 25.1).abs() < 1e-4);
    }

    #[test]
    fn bounds_of_empty_geometry() {
        let geometry = LegGeometry::encode(&[]).unwrap();
        assert_eq!(geometry.bounds().unwrap(), None);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Haversine distance is never negative and zero on the diagonal.
        #[test]
        fn non_negative(lat1 in -89.0f64..89.0, lon1 in -179.0f64..179.0,
                        lat2 in -89.0f64..89.0, lon2 in -179.0f64..179.0) {
            let d = haversine_distance(lat1, lon1, lat2, lon2);
            prop_assert!(d >= 0.0);
            prop_assert!(haversine_distance(lat1, lon1, lat1, lon1) < 1e-9);
        }

        /// Encoded shapes decode to the same number of points.
        #[test]
        fn encode_preserves_count(coords in proptest::collection::vec(
            (-80.0f64..80.0, -170.0f64..170.0), 0..20)) {
            let geometry = LegGeometry::encode(&coords).unwrap();
            let decoded = geometry.decode().unwrap();
            prop_assert_eq!(decoded.len(), coords.len());
        }
    }
}
