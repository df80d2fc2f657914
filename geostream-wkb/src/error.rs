//! Error type used by the crate.

use geostream_types::{Coords, GeomKind};
use thiserror::Error;

/// WKB decoding error. Offsets are counted in bytes from the start of the buffer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WkbError {
    /// Buffer ends before the geometry is complete.
    #[error("unexpected end of data at offset {offset}: {needed} more bytes required")]
    Truncated {
        /// Offset of the incomplete value.
        offset: usize,
        /// Number of missing bytes.
        needed: usize,
    },
    /// Byte order flag is neither `0` nor `1`.
    #[error("invalid byte order flag {value} at offset {offset}")]
    InvalidByteOrder {
        /// Offset of the flag.
        offset: usize,
        /// Value of the flag.
        value: u8,
    },
    /// Geometry type code is not recognized.
    #[error("unknown geometry type code {code} at offset {offset}")]
    UnknownTypeCode {
        /// Offset of the type code.
        offset: usize,
        /// The type code.
        code: u32,
    },
    /// Part of a multi geometry has a wrong type.
    #[error("expected {expected} at offset {offset}, but found {found}")]
    UnexpectedGeometry {
        /// Offset of the type code.
        offset: usize,
        /// Kind required by the parent geometry.
        expected: GeomKind,
        /// Kind found in the data.
        found: GeomKind,
    },
    /// Part of a multi geometry has a dimensionality different from its parent.
    #[error("expected {expected:?} positions at offset {offset}, but found {found:?}")]
    MixedDimensions {
        /// Offset of the type code.
        offset: usize,
        /// Dimensionality of the parent geometry.
        expected: Coords,
        /// Dimensionality found in the data.
        found: Coords,
    },
    /// Geometry collections are nested deeper than the reader allows.
    #[error("geometry collections nested too deep at offset {offset}")]
    NestingTooDeep {
        /// Offset of the collection header.
        offset: usize,
    },
    /// Buffer contains data after the end of the geometry.
    #[error("unexpected data after the end of geometry at offset {offset}")]
    TrailingBytes {
        /// Offset of the first unread byte.
        offset: usize,
    },
}
