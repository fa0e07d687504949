//! Feed-scoped GTFS identifiers.

use std::fmt;

/// A GTFS identifier qualified by its source feed, e.g. `"HSL:1003"`.
///
/// Routing endpoints aggregate several GTFS feeds, so every route and
/// trip id carries a feed prefix. Real-time topics need the parts
/// separately: the feed selects the data source, the local part names
/// the route or trip within it.
///
/// # Examples
///
/// ```
/// use trip_server::domain::FeedScopedId;
///
/// let id = FeedScopedId::parse("HSL:1003");
/// assert_eq!(id.feed(), Some("HSL"));
/// assert_eq!(id.local(), "1003");
///
/// // Ids without a feed prefix keep the whole string as the local part
/// let bare = FeedScopedId::parse("1003");
/// assert_eq!(bare.feed(), None);
/// assert_eq!(bare.local(), "1003");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedScopedId {
    raw: String,
    colon: Option<usize>,
}

impl FeedScopedId {
    /// Parse an id of the form `feed:local`.
    ///
    /// Splits on the first colon. An id without a colon is treated as
    /// an unscoped local id.
    pub fn parse(s: impl Into<String>) -> Self {
        let raw = s.into();
        let colon = raw.find(':');
        Self { raw, colon }
    }

    /// The feed part, if the id carries one.
    pub fn feed(&self) -> Option<&str> {
        self.colon.map(|i| &self.raw[..i])
    }

    /// The local part (everything after the feed prefix).
    pub fn local(&self) -> &str {
        match self.colon {
            Some(i) => &self.raw[i + 1..],
            None => &self.raw,
        }
    }

    /// The full `feed:local` string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for FeedScopedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_scoped() {
        let id = FeedScopedId::parse("HSL:1003");
        assert_eq!(id.feed(), Some("HSL"));
        assert_eq!(id.local(), "1003");
        assert_eq!(id.as_str(), "HSL:1003");
    }

    #[test]
    fn parse_unscoped() {
        let id = FeedScopedId::parse("1003");
        assert_eq!(id.feed(), None);
        assert_eq!(id.local(), "1003");
    }

    #[test]
    fn splits_on_first_colon_only() {
        let id = FeedScopedId::parse("HSL:1003:2");
        assert_eq!(id.feed(), Some("HSL"));
        assert_eq!(id.local(), "1003:2");
    }

    #[test]
    fn empty_parts() {
        let id = FeedScopedId::parse(":x");
        assert_eq!(id.feed(), Some(""));
        assert_eq!(id.local(), "x");

        let id = FeedScopedId::parse("HSL:");
        assert_eq!(id.feed(), Some("HSL"));
        assert_eq!(id.local(), "");
    }

    #[test]
    fn display_roundtrip() {
        let id = FeedScopedId::parse("tampere:32A");
        assert_eq!(format!("{}", id), "tampere:32A");
    }
}
