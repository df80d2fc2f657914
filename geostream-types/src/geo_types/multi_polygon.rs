use geo_types::MultiPolygon;

use super::polygon::polygon_rings;
use crate::content::GeometryContent;
use crate::geometry::WriteGeometry;
use crate::geometry_type::GeomKind;

impl WriteGeometry for MultiPolygon<f64> {
    fn write_geometry(&self, sink: &mut dyn GeometryContent) {
        if self.0.is_empty() {
            sink.empty_geometry(GeomKind::MultiPolygon, None);
        } else {
            let polygons: Vec<_> = self.0.iter().map(polygon_rings).collect();
            sink.multi_polygon(&polygons);
        }
    }
}
