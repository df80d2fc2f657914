use geo_types::LineString;

use super::coord::line_series;
use crate::content::GeometryContent;
use crate::geometry::WriteGeometry;
use crate::geometry_type::GeomKind;

impl WriteGeometry for LineString<f64> {
    fn write_geometry(&self, sink: &mut dyn GeometryContent) {
        if self.0.is_empty() {
            sink.empty_geometry(GeomKind::LineString, None);
        } else {
            sink.line_string(&line_series(self));
        }
    }
}
