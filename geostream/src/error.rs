//! Error types used by the crate.

use geostream_wkb::WkbError;
use thiserror::Error;

/// Geostream error type.
#[derive(Debug, Error)]
pub enum GeostreamError {
    /// Input text does not follow the WKT grammar.
    #[error("invalid WKT at offset {offset}: {message}")]
    Wkt {
        /// Byte offset of the offending token.
        offset: usize,
        /// Description of the problem.
        message: String,
    },
    /// Input is valid JSON, but not a valid GeoJSON object.
    #[error("invalid GeoJSON at {path}: {message}")]
    GeoJson {
        /// Path to the offending member, e.g. `features[1].geometry`.
        path: String,
        /// Description of the problem.
        message: String,
    },
    /// Input is not valid JSON.
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Error decoding WKB.
    #[error("failed to decode WKB: {0}")]
    Wkb(#[from] WkbError),
    /// Input was decoded successfully, but contains nothing of the requested type.
    #[error("input does not contain a {0}")]
    NotFound(&'static str),
}
