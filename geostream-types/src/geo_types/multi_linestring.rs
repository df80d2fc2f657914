use geo_types::MultiLineString;

use super::coord::line_series;
use crate::content::GeometryContent;
use crate::geometry::WriteGeometry;
use crate::geometry_type::GeomKind;

impl WriteGeometry for MultiLineString<f64> {
    fn write_geometry(&self, sink: &mut dyn GeometryContent) {
        if self.0.is_empty() {
            sink.empty_geometry(GeomKind::MultiLineString, None);
        } else {
            let lines: Vec<_> = self.0.iter().map(line_series).collect();
            sink.multi_line_string(&lines);
        }
    }
}
