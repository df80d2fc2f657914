//! Configuration of the text encoders.

use serde::{Deserialize, Serialize};

/// Options of the text encoders.
///
/// ```
/// use geostream::TextWriterOptions;
///
/// let options = TextWriterOptions::default()
///     .with_decimals(2)
///     .with_ignore_measured(true);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TextWriterOptions {
    /// Number of decimal places for coordinate values. When not set, the shortest representation
    /// that round-trips is used.
    pub decimals: Option<usize>,
    /// Drop `m` values of positions.
    pub ignore_measured: bool,
    /// Drop GeoJSON members that are not defined by the GeoJSON specification. Has no effect on
    /// other formats.
    pub ignore_foreign_members: bool,
}

impl TextWriterOptions {
    /// Rounds coordinate values to the given number of decimal places.
    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.decimals = Some(decimals);
        self
    }

    /// Sets whether `m` values are dropped.
    pub fn with_ignore_measured(mut self, ignore: bool) -> Self {
        self.ignore_measured = ignore;
        self
    }

    /// Sets whether foreign GeoJSON members are dropped.
    pub fn with_ignore_foreign_members(mut self, ignore: bool) -> Self {
        self.ignore_foreign_members = ignore;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_from_config() {
        let options: TextWriterOptions = serde_json::from_str(r#"{"decimals": 3}"#).unwrap();
        assert_eq!(options, TextWriterOptions::default().with_decimals(3));

        let options: TextWriterOptions =
            serde_json::from_str(r#"{"ignore_measured": true, "ignore_foreign_members": true}"#)
                .unwrap();
        assert_eq!(options.decimals, None);
        assert!(options.ignore_measured);
        assert!(options.ignore_foreign_members);
    }
}
