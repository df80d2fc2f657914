//! Error type used by the crate.

use thiserror::Error;

use crate::coords::Coords;

/// Error enum.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoTypesError {
    /// Number of values does not match the dimensionality of the positions.
    #[error("{count} values cannot be split into positions of {coords:?}")]
    ValueCount {
        /// Number of values given.
        count: usize,
        /// Expected dimensionality.
        coords: Coords,
    },
    /// Position or bounding box must have 2, 3 or 4 components.
    #[error("invalid number of coordinate components: {0}")]
    ComponentCount(usize),
    /// Geometry conversion error.
    #[error("invalid input geometry: {0}")]
    Conversion(String),
}
