//! Geographic locations.

use std::fmt;

use super::DomainError;

/// A geographic point with an optional display name.
///
/// Locations are exchanged with the routing endpoint in the
/// `"Name::lat,lon"` string form, where the name part is optional.
///
/// # Examples
///
/// ```
/// use trip_server::domain::Location;
///
/// let loc = Location::parse("Kamppi::60.168992,24.932366").unwrap();
/// assert_eq!(loc.name.as_deref(), Some("Kamppi"));
///
/// // Bare coordinates are accepted
/// let loc = Location::parse("60.2,24.9").unwrap();
/// assert!(loc.name.is_none());
///
/// // Missing coordinates are rejected
/// assert!(Location::parse("Kamppi::").is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// Human-readable name, if one was supplied
    pub name: Option<String>,
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
}

impl Location {
    /// Create a location from bare coordinates.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            name: None,
            lat,
            lon,
        }
    }

    /// Create a named location.
    pub fn named(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: Some(name.into()),
            lat,
            lon,
        }
    }

    /// Parse a location from the `"Name::lat,lon"` endpoint string form.
    ///
    /// The name part (up to the `::` separator) is optional. Coordinates
    /// must be two comma-separated decimal numbers.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let (name, coords) = match s.split_once("::") {
            Some((name, coords)) => {
                let name = name.trim();
                let name = if name.is_empty() {
                    None
                } else {
                    Some(name.to_string())
                };
                (name, coords)
            }
            None => (None, s),
        };

        let (lat_str, lon_str) = coords
            .split_once(',')
            .ok_or_else(|| DomainError::InvalidLocation(s.to_string()))?;

        let lat: f64 = lat_str
            .trim()
            .parse()
            .map_err(|_| DomainError::InvalidLocation(s.to_string()))?;
        let lon: f64 = lon_str
            .trim()
            .parse()
            .map_err(|_| DomainError::InvalidLocation(s.to_string()))?;

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(DomainError::InvalidLocation(s.to_string()));
        }

        Ok(Self { name, lat, lon })
    }

    /// Format as the `"Name::lat,lon"` endpoint string form.
    pub fn to_place_string(&self) -> String {
        match &self.name {
            Some(name) => format!("{}::{},{}", name, self.lat, self.lon),
            None => format!("{},{}", self.lat, self.lon),
        }
    }

    /// True when this location has the same coordinates as another.
    ///
    /// Names are ignored; two pins on the same spot are the same place.
    pub fn same_point(&self, other: &Location) -> bool {
        self.lat == other.lat && self.lon == other.lon
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({}, {})", name, self.lat, self.lon),
            None => write!(f, "({}, {})", self.lat, self.lon),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_named() {
        let loc = Location::parse("Kamppi::60.168992,24.932366").unwrap();
        assert_eq!(loc.name.as_deref(), Some("Kamppi"));
        assert_eq!(loc.lat, 60.168992);
        assert_eq!(loc.lon, 24.932366);
    }

    #[test]
    fn parse_unnamed() {
        let loc = Location::parse("60.2,24.9").unwrap();
        assert!(loc.name.is_none());
        assert_eq!(loc.lat, 60.2);
        assert_eq!(loc.lon, 24.9);
    }

    #[test]
    fn parse_empty_name() {
        let loc = Location::parse("::60.2,24.9").unwrap();
        assert!(loc.name.is_none());
    }

    #[test]
    fn parse_negative_coordinates() {
        let loc = Location::parse("Somewhere::-33.86,151.21").unwrap();
        assert_eq!(loc.lat, -33.86);
        assert_eq!(loc.lon, 151.21);
    }

    #[test]
    fn reject_missing_coordinates() {
        assert!(Location::parse("Kamppi::").is_err());
        assert!(Location::parse("Kamppi::60.2").is_err());
        assert!(Location::parse("").is_err());
    }

    #[test]
    fn reject_non_numeric() {
        assert!(Location::parse("Kamppi::lat,lon").is_err());
        assert!(Location::parse("60.2,east").is_err());
    }

    #[test]
    fn reject_out_of_range() {
        assert!(Location::parse("91.0,24.9").is_err());
        assert!(Location::parse("60.2,181.0").is_err());
        assert!(Location::parse("-90.5,0.0").is_err());
    }

    #[test]
    fn place_string_roundtrip() {
        let loc = Location::named("Kamppi", 60.168992, 24.932366);
        let parsed = Location::parse(&loc.to_place_string()).unwrap();
        assert_eq!(parsed, loc);
    }

    #[test]
    fn same_point_ignores_name() {
        let a = Location::named("A", 60.2, 24.9);
        let b = Location::named("B", 60.2, 24.9);
        let c = Location::new(60.3, 24.9);
        assert!(a.same_point(&b));
        assert!(!a.same_point(&c));
    }
}
