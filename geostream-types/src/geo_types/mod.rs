//! [`WriteGeometry`] implementations for `geo_types` geometries.

use geo_types::{Geometry, GeometryCollection, Line, Rect, Triangle};

use crate::content::{CollectionHeader, GeometryContent};
use crate::geometry::WriteGeometry;
use crate::point::Position;
use crate::series::PositionSeries;

mod coord;
mod linestring;
mod multi_linestring;
mod multi_point;
mod multi_polygon;
mod point;
mod polygon;

impl WriteGeometry for GeometryCollection<f64> {
    fn write_geometry(&self, sink: &mut dyn GeometryContent) {
        sink.geometry_collection(CollectionHeader::with_count(self.0.len()), &mut |inner| {
            for geometry in &self.0 {
                geometry.write_geometry(inner);
            }
        });
    }
}

impl WriteGeometry for Line<f64> {
    fn write_geometry(&self, sink: &mut dyn GeometryContent) {
        let positions = [Position::from(self.start), Position::from(self.end)];
        sink.line_string(&PositionSeries::from_positions(&positions, None));
    }
}

impl WriteGeometry for Rect<f64> {
    fn write_geometry(&self, sink: &mut dyn GeometryContent) {
        self.to_polygon().write_geometry(sink);
    }
}

impl WriteGeometry for Triangle<f64> {
    fn write_geometry(&self, sink: &mut dyn GeometryContent) {
        self.to_polygon().write_geometry(sink);
    }
}

impl WriteGeometry for Geometry<f64> {
    fn write_geometry(&self, sink: &mut dyn GeometryContent) {
        match self {
            Geometry::Point(g) => g.write_geometry(sink),
            Geometry::Line(g) => g.write_geometry(sink),
            Geometry::LineString(g) => g.write_geometry(sink),
            Geometry::Polygon(g) => g.write_geometry(sink),
            Geometry::MultiPoint(g) => g.write_geometry(sink),
            Geometry::MultiLineString(g) => g.write_geometry(sink),
            Geometry::MultiPolygon(g) => g.write_geometry(sink),
            Geometry::GeometryCollection(g) => g.write_geometry(sink),
            Geometry::Rect(g) => g.write_geometry(sink),
            Geometry::Triangle(g) => g.write_geometry(sink),
        }
    }
}
