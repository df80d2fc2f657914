//! Geostream converts geospatial data between GeoJSON, WKT and WKB without building intermediate
//! geometry objects.
//!
//! # Content interfaces
//!
//! Every codec of the crate is either a producer or a consumer of content:
//!
//! * decoders ([`geojson::decode`], [`wkt::decode`], [`wkb::decode`]) read encoded input and
//!   call the methods of a [`GeometryContent`] or [`FeatureContent`] sink;
//! * writers ([`GeoJsonWriter`], [`WktWriter`], [`WktLikeWriter`], [`WkbWriter`]) implement these
//!   interfaces and serialize whatever they are given;
//! * builders ([`builder`] module) implement them too and produce [`Geometry`], [`Feature`] and
//!   [`FeatureCollection`] values, which in turn can be written into any sink.
//!
//! Connecting a decoder directly to a writer of another format transcodes the data in a single
//! pass:
//!
//! ```
//! use geostream::{wkt, GeoJsonWriter, TextWriterOptions};
//!
//! let mut writer = GeoJsonWriter::new(TextWriterOptions::default());
//! wkt::decode("LINESTRING(1 2,3 4)", &mut writer)?;
//! assert_eq!(
//!     writer.as_str(),
//!     r#"{"type":"LineString","coordinates":[[1,2],[3,4]]}"#
//! );
//! # Ok::<(), geostream::GeostreamError>(())
//! ```
//!
//! # Dimensionality
//!
//! Positions have `x` and `y` and optionally elevation `z` and measure `m` (see [`Coords`]).
//! Text writers keep the dimensionality of the input unless
//! [`TextWriterOptions::ignore_measured`] is set.
//!
//! # Geo types
//!
//! With the `geo-types` feature (enabled by default) geometries of the `geo-types` crate can be
//! written into any sink.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod builder;
pub mod error;
pub mod geojson;
pub mod options;
pub mod wkb;
pub mod wkt;
pub mod wkt_like;

mod shape;
mod text;

#[cfg(test)]
mod tests;

pub use error::GeostreamError;
pub use geojson::GeoJsonWriter;
pub use geostream_types::{
    BoundingBox, CollectionHeader, CoordinateContent, Coords, Feature, FeatureCollection,
    FeatureContent, FeatureHeader, FeatureId, GeoTypesError, GeomKind, Geometry, GeometryContent,
    GeometryHeader, NullContent, Position, PositionSeries, PropertyContent, PropertyMap, Value,
    WriteGeometry,
};
pub use options::TextWriterOptions;
pub use wkb::{WkbOptions, WkbWriter};
pub use wkt::WktWriter;
pub use wkt_like::{WktLikeStyle, WktLikeWriter};

// Reexport the underlying crates
pub use geostream_types;
pub use geostream_wkb;
