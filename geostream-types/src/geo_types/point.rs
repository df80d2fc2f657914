use geo_types::Point;

use crate::content::GeometryContent;
use crate::geometry::WriteGeometry;
use crate::geometry_type::GeomKind;
use crate::point::Position;

impl WriteGeometry for Point<f64> {
    fn write_geometry(&self, sink: &mut dyn GeometryContent) {
        let position = Position::from(self.0);
        if position.is_nan() {
            sink.empty_geometry(GeomKind::Point, None);
        } else {
            sink.point(&position);
        }
    }
}
