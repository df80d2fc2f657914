//! Well-Known Text (WKT) encoder and decoder.
//!
//! ```
//! use geostream::{wkt, Geometry, Position, TextWriterOptions};
//!
//! let point = wkt::parse_geometry("POINT Z (1 2 3)")?;
//! assert_eq!(point, Geometry::Point(Position::new_3d(1.0, 2.0, 3.0)));
//! assert_eq!(wkt::to_wkt(&point, TextWriterOptions::default()), "POINT Z(1 2 3)");
//! # Ok::<(), geostream::GeostreamError>(())
//! ```

mod reader;
pub(crate) mod writer;

use geostream_types::{Geometry, WriteGeometry};

pub use reader::decode;
pub use writer::WktWriter;

use crate::builder::GeometryBuilder;
use crate::error::GeostreamError;
use crate::options::TextWriterOptions;

/// Writes the geometry as WKT.
pub fn to_wkt(geometry: &(impl WriteGeometry + ?Sized), options: TextWriterOptions) -> String {
    let mut writer = WktWriter::new(options);
    geometry.write_geometry(&mut writer);
    writer.into_string()
}

/// Parses a WKT geometry into a value object.
pub fn parse_geometry(text: &str) -> Result<Geometry, GeostreamError> {
    let mut geometry = None;
    decode(text, &mut GeometryBuilder::new(|g| geometry = Some(g)))?;
    geometry.ok_or(GeostreamError::NotFound("geometry"))
}
