//! Transport modes and qualifiers.
//!
//! Modes are stored in user settings as strings like `"BUS"` or
//! `"BICYCLE_RENT"` and sent to the routing endpoint as
//! `{mode, qualifier}` pairs. `CITYBIKE` is a legacy settings alias
//! for rented bikes and normalises to `BICYCLE_RENT`.

use std::fmt;

use super::DomainError;

/// Base transport mode as understood by the routing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransportMode {
    Airplane,
    Bicycle,
    Bus,
    Car,
    Ferry,
    Funicular,
    Rail,
    Subway,
    Tram,
    Walk,
}

impl TransportMode {
    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Airplane => "AIRPLANE",
            TransportMode::Bicycle => "BICYCLE",
            TransportMode::Bus => "BUS",
            TransportMode::Car => "CAR",
            TransportMode::Ferry => "FERRY",
            TransportMode::Funicular => "FUNICULAR",
            TransportMode::Rail => "RAIL",
            TransportMode::Subway => "SUBWAY",
            TransportMode::Tram => "TRAM",
            TransportMode::Walk => "WALK",
        }
    }

    /// Parse the canonical upper-case name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AIRPLANE" => Some(TransportMode::Airplane),
            "BICYCLE" => Some(TransportMode::Bicycle),
            "BUS" => Some(TransportMode::Bus),
            "CAR" => Some(TransportMode::Car),
            "FERRY" => Some(TransportMode::Ferry),
            "FUNICULAR" => Some(TransportMode::Funicular),
            "RAIL" => Some(TransportMode::Rail),
            "SUBWAY" => Some(TransportMode::Subway),
            "TRAM" => Some(TransportMode::Tram),
            "WALK" => Some(TransportMode::Walk),
            _ => None,
        }
    }

    /// True for modes a vehicle subscription can track (scheduled
    /// public transport; walking, cycling and driving are not it).
    pub fn is_transit(&self) -> bool {
        !matches!(
            self,
            TransportMode::Walk | TransportMode::Bicycle | TransportMode::Car
        )
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mode qualifier, e.g. the `PARK` in `BICYCLE_PARK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Qualifier {
    Park,
    Rent,
}

impl Qualifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Qualifier::Park => "PARK",
            Qualifier::Rent => "RENT",
        }
    }
}

/// A transport mode with an optional qualifier.
///
/// # Examples
///
/// ```
/// use trip_server::domain::{Mode, TransportMode, Qualifier};
///
/// let m = Mode::parse("BICYCLE_RENT").unwrap();
/// assert_eq!(m.mode, TransportMode::Bicycle);
/// assert_eq!(m.qualifier, Some(Qualifier::Rent));
/// assert_eq!(m.to_string(), "BICYCLE_RENT");
///
/// // CITYBIKE is the settings alias for rented bikes
/// assert_eq!(Mode::parse("CITYBIKE").unwrap(), m);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mode {
    pub mode: TransportMode,
    pub qualifier: Option<Qualifier>,
}

impl Mode {
    /// An unqualified mode.
    pub fn plain(mode: TransportMode) -> Self {
        Self {
            mode,
            qualifier: None,
        }
    }

    /// A qualified mode.
    pub fn qualified(mode: TransportMode, qualifier: Qualifier) -> Self {
        Self {
            mode,
            qualifier: Some(qualifier),
        }
    }

    /// Parse a settings string like `"BUS"` or `"BICYCLE_RENT"`.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        // Legacy settings alias
        if s == "CITYBIKE" {
            return Ok(Mode::qualified(TransportMode::Bicycle, Qualifier::Rent));
        }

        if let Some(mode) = TransportMode::parse(s) {
            return Ok(Mode::plain(mode));
        }

        if let Some((mode_str, qualifier_str)) = s.rsplit_once('_') {
            let mode = TransportMode::parse(mode_str)
                .ok_or_else(|| DomainError::UnknownMode(s.to_string()))?;
            let qualifier = match qualifier_str {
                "PARK" => Qualifier::Park,
                "RENT" => Qualifier::Rent,
                _ => return Err(DomainError::UnknownMode(s.to_string())),
            };
            return Ok(Mode::qualified(mode, qualifier));
        }

        Err(DomainError::UnknownMode(s.to_string()))
    }

    /// True for `BICYCLE_RENT` (rented city bikes).
    pub fn is_bike_rental(&self) -> bool {
        self.mode == TransportMode::Bicycle && self.qualifier == Some(Qualifier::Rent)
    }

    /// True when the base mode is scheduled public transport.
    pub fn is_transit(&self) -> bool {
        self.mode.is_transit()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.qualifier {
            Some(q) => write!(f, "{}_{}", self.mode.as_str(), q.as_str()),
            None => f.write_str(self.mode.as_str()),
        }
    }
}

/// Parse a list of settings mode strings, dropping unknown entries,
/// then sort and deduplicate.
///
/// Unknown strings are ignored rather than rejected so that settings
/// written by newer clients degrade gracefully.
pub fn parse_modes(strings: &[String]) -> Vec<Mode> {
    let mut modes: Vec<Mode> = strings
        .iter()
        .filter_map(|s| Mode::parse(s).ok())
        .collect();
    modes.sort();
    modes.dedup();
    modes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_modes() {
        assert_eq!(
            Mode::parse("BUS").unwrap(),
            Mode::plain(TransportMode::Bus)
        );
        assert_eq!(
            Mode::parse("WALK").unwrap(),
            Mode::plain(TransportMode::Walk)
        );
        assert_eq!(
            Mode::parse("FUNICULAR").unwrap(),
            Mode::plain(TransportMode::Funicular)
        );
    }

    #[test]
    fn parse_qualified_modes() {
        assert_eq!(
            Mode::parse("BICYCLE_RENT").unwrap(),
            Mode::qualified(TransportMode::Bicycle, Qualifier::Rent)
        );
        assert_eq!(
            Mode::parse("BICYCLE_PARK").unwrap(),
            Mode::qualified(TransportMode::Bicycle, Qualifier::Park)
        );
        assert_eq!(
            Mode::parse("CAR_PARK").unwrap(),
            Mode::qualified(TransportMode::Car, Qualifier::Park)
        );
    }

    #[test]
    fn citybike_alias() {
        assert_eq!(
            Mode::parse("CITYBIKE").unwrap(),
            Mode::qualified(TransportMode::Bicycle, Qualifier::Rent)
        );
    }

    #[test]
    fn reject_unknown() {
        assert!(Mode::parse("HOVERCRAFT").is_err());
        assert!(Mode::parse("BICYCLE_FLY").is_err());
        assert!(Mode::parse("bus").is_err());
        assert!(Mode::parse("").is_err());
    }

    #[test]
    fn display_roundtrip() {
        for s in ["BUS", "RAIL", "BICYCLE_RENT", "CAR_PARK"] {
            let mode = Mode::parse(s).unwrap();
            assert_eq!(mode.to_string(), s);
        }
    }

    #[test]
    fn is_bike_rental() {
        assert!(Mode::parse("BICYCLE_RENT").unwrap().is_bike_rental());
        assert!(Mode::parse("CITYBIKE").unwrap().is_bike_rental());
        assert!(!Mode::parse("BICYCLE").unwrap().is_bike_rental());
        assert!(!Mode::parse("BICYCLE_PARK").unwrap().is_bike_rental());
    }

    #[test]
    fn transit_classification() {
        assert!(TransportMode::Bus.is_transit());
        assert!(TransportMode::Rail.is_transit());
        assert!(TransportMode::Ferry.is_transit());
        assert!(!TransportMode::Walk.is_transit());
        assert!(!TransportMode::Bicycle.is_transit());
        assert!(!TransportMode::Car.is_transit());
    }

    #[test]
    fn parse_modes_drops_unknown_and_dedupes() {
        let input: Vec<String> = ["BUS", "TRAM", "HOVERCRAFT", "BUS", "CITYBIKE"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let modes = parse_modes(&input);

        assert_eq!(modes.len(), 3);
        assert!(modes.contains(&Mode::plain(TransportMode::Bus)));
        assert!(modes.contains(&Mode::plain(TransportMode::Tram)));
        assert!(modes.contains(&Mode::qualified(TransportMode::Bicycle, Qualifier::Rent)));
    }

    #[test]
    fn parse_modes_is_sorted() {
        let input: Vec<String> = ["TRAM", "BUS", "RAIL"].iter().map(|s| s.to_string()).collect();
        let modes = parse_modes(&input);
        let mut sorted = modes.clone();
        sorted.sort();
        assert_eq!(modes, sorted);
    }
}
