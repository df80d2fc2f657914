//! Well-Known Binary (WKB) geometry codec.
//!
//! [`WkbWriter`] is a [`GeometryContent`](geostream_types::GeometryContent) sink that serializes
//! geometries into bytes, and [`decode`] reads WKB bytes and writes the geometry into any
//! `GeometryContent` sink, so WKB can be transcoded into other formats without building
//! geometry objects.
//!
//! # Layout
//!
//! Every geometry starts with a byte order flag (`0` - big endian, `1` - little endian) followed
//! by a 4-byte type code. All multi-byte values of the geometry use that byte order. Coordinates
//! are IEEE-754 doubles; numbers of points, rings and parts are 4-byte unsigned integers placed
//! right before the block they count. Parts of multi geometries and members of collections are
//! complete geometries with their own byte order flag.
//!
//! Type codes use the ISO convention for dimensionality: the base code (`1` for point to `7` for
//! geometry collection) plus `1000` for Z, `2000` for M and `3000` for ZM. Other conventions
//! (like EWKB flag bits) are not supported.
//!
//! An empty point is written with all coordinates set to NaN, other empty geometries have zero
//! items.

use geostream_types::{Coords, GeomKind};

pub mod error;
mod reader;
mod writer;

pub use error::WkbError;
pub use reader::{decode, WkbReader};
pub use writer::{encode, WkbOptions, WkbWriter};

/// Byte order of multi-byte values.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Endian {
    /// Big endian (XDR).
    Big,
    /// Little endian (NDR).
    #[default]
    Little,
}

impl Endian {
    /// Value of the byte order flag.
    pub fn flag(&self) -> u8 {
        match self {
            Endian::Big => 0,
            Endian::Little => 1,
        }
    }

    /// Byte order for the given flag value.
    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0 => Some(Endian::Big),
            1 => Some(Endian::Little),
            _ => None,
        }
    }
}

fn base_code(kind: GeomKind) -> u32 {
    match kind {
        GeomKind::Point => 1,
        GeomKind::LineString => 2,
        GeomKind::Polygon => 3,
        GeomKind::MultiPoint => 4,
        GeomKind::MultiLineString => 5,
        GeomKind::MultiPolygon => 6,
        GeomKind::GeometryCollection => 7,
    }
}

fn coords_offset(coords: Coords) -> u32 {
    match coords {
        Coords::Xy => 0,
        Coords::Xyz => 1000,
        Coords::Xym => 2000,
        Coords::Xyzm => 3000,
    }
}

/// WKB type code of the geometry kind with the given dimensionality.
pub fn type_code(kind: GeomKind, coords: Coords) -> u32 {
    base_code(kind) + coords_offset(coords)
}

/// Splits a WKB type code into geometry kind and dimensionality.
pub fn parse_type_code(code: u32) -> Option<(GeomKind, Coords)> {
    let coords = match code / 1000 {
        0 => Coords::Xy,
        1 => Coords::Xyz,
        2 => Coords::Xym,
        3 => Coords::Xyzm,
        _ => return None,
    };

    let kind = GeomKind::ALL
        .into_iter()
        .find(|kind| base_code(*kind) == code % 1000)?;

    Some((kind, coords))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_codes() {
        assert_eq!(type_code(GeomKind::Point, Coords::Xy), 1);
        assert_eq!(type_code(GeomKind::Polygon, Coords::Xyz), 1003);
        assert_eq!(type_code(GeomKind::MultiPoint, Coords::Xym), 2004);
        assert_eq!(
            type_code(GeomKind::GeometryCollection, Coords::Xyzm),
            3007
        );

        assert_eq!(
            parse_type_code(3006),
            Some((GeomKind::MultiPolygon, Coords::Xyzm))
        );
        assert_eq!(parse_type_code(8), None);
        assert_eq!(parse_type_code(4001), None);
        assert_eq!(parse_type_code(0x2000_0001), None);
    }
}
