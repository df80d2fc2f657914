//! Well-Known Binary (WKB) support.
//!
//! The codec itself lives in the `geostream-wkb` crate. This module re-exports it and adds
//! conversions between bytes and value objects.

use geostream_types::{Geometry, WriteGeometry};
pub use geostream_wkb::{decode, encode, Endian, WkbError, WkbOptions, WkbReader, WkbWriter};

use crate::builder::GeometryBuilder;
use crate::error::GeostreamError;

/// Encodes the geometry as WKB.
pub fn to_wkb(geometry: &(impl WriteGeometry + ?Sized), options: WkbOptions) -> Vec<u8> {
    encode(geometry, options)
}

/// Decodes a WKB geometry into a value object.
pub fn parse_geometry(bytes: &[u8]) -> Result<Geometry, GeostreamError> {
    let mut geometry = None;
    decode(bytes, &mut GeometryBuilder::new(|g| geometry = Some(g)))?;
    geometry.ok_or(GeostreamError::NotFound("geometry"))
}
