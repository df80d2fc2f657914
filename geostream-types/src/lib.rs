//! Coordinate data model and content traits shared by the `geostream` encoders and decoders.
//!
//! * [`Coords`], [`Position`], [`BoundingBox`] and [`PositionSeries`] describe coordinates.
//! * [`CoordinateContent`], [`GeometryContent`], [`PropertyContent`] and [`FeatureContent`] are
//!   the interfaces between producers and consumers of geospatial data. See [`content`] module.
//! * [`Geometry`], [`Feature`] and [`FeatureCollection`] are owned value objects that can be
//!   written into any content sink.

pub mod content;
pub mod coords;
pub mod error;
pub mod feature;
pub mod series;

mod bounding_rect;
mod geometry;
mod geometry_type;
mod point;

#[cfg(feature = "geo-types")]
mod geo_types;

pub use bounding_rect::BoundingBox;
pub use content::{
    CollectionHeader, CoordinateContent, FeatureContent, FeatureHeader, GeometryContent,
    GeometryHeader, NullContent, PropertyContent,
};
pub use coords::Coords;
pub use error::GeoTypesError;
pub use feature::{Feature, FeatureCollection, FeatureId, PropertyMap};
pub use geometry::{Geometry, WriteGeometry};
pub use geometry_type::GeomKind;
pub use point::Position;
pub use series::PositionSeries;
pub use serde_json::Value;
