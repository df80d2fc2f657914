//! GeoJSON encoder and decoder.
//!
//! [`GeoJsonWriter`] accepts both geometry and feature content, so geometries, features and
//! feature collections are all written with the same writer. The decoders validate the whole
//! document before writing anything into the sink.
//!
//! Measured positions without elevation are written with a `0` placeholder for the elevation,
//! since GeoJSON positions have no way to mark the third value as a measure.

mod reader;
mod writer;

use geostream_types::{Feature, FeatureCollection, Geometry, WriteGeometry};

pub use reader::{decode, decode_feature, decode_feature_collection, decode_geometry};
pub use writer::GeoJsonWriter;

use crate::builder::{FeatureBuilder, FeatureCollectionBuilder, GeometryBuilder};
use crate::error::GeostreamError;
use crate::options::TextWriterOptions;

/// Writes the geometry as a GeoJSON geometry object.
pub fn to_geojson(geometry: &(impl WriteGeometry + ?Sized), options: TextWriterOptions) -> String {
    let mut writer = GeoJsonWriter::new(options);
    geometry.write_geometry(&mut writer);
    writer.into_string()
}

/// Writes the feature as a GeoJSON `Feature` object.
pub fn feature_to_geojson(feature: &Feature, options: TextWriterOptions) -> String {
    let mut writer = GeoJsonWriter::new(options);
    feature.write_to(&mut writer);
    writer.into_string()
}

/// Writes the collection as a GeoJSON `FeatureCollection` object.
pub fn feature_collection_to_geojson(
    collection: &FeatureCollection,
    options: TextWriterOptions,
) -> String {
    let mut writer = GeoJsonWriter::new(options);
    collection.write_to(&mut writer);
    writer.into_string()
}

/// Parses a GeoJSON geometry object.
pub fn parse_geometry(text: &str) -> Result<Geometry, GeostreamError> {
    let mut geometry = None;
    decode_geometry(text, &mut GeometryBuilder::new(|g| geometry = Some(g)))?;
    geometry.ok_or(GeostreamError::NotFound("geometry"))
}

/// Parses a GeoJSON `Feature` object.
pub fn parse_feature(text: &str) -> Result<Feature, GeostreamError> {
    let mut feature = None;
    decode_feature(text, &mut FeatureBuilder::new(|f| feature = Some(f)))?;
    feature.ok_or(GeostreamError::NotFound("feature"))
}

/// Parses a GeoJSON `FeatureCollection` object.
pub fn parse_feature_collection(text: &str) -> Result<FeatureCollection, GeostreamError> {
    let mut builder = FeatureCollectionBuilder::new();
    decode_feature_collection(text, &mut builder)?;
    Ok(builder.into_collection())
}
