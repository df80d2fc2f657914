use geo_types::Polygon;

use super::coord::line_series;
use crate::content::GeometryContent;
use crate::geometry::WriteGeometry;
use crate::geometry_type::GeomKind;
use crate::series::PositionSeries;

pub(super) fn polygon_rings(polygon: &Polygon<f64>) -> Vec<PositionSeries<'static>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(line_series)
        .collect()
}

impl WriteGeometry for Polygon<f64> {
    fn write_geometry(&self, sink: &mut dyn GeometryContent) {
        if self.exterior().0.is_empty() {
            sink.empty_geometry(GeomKind::Polygon, None);
        } else {
            sink.polygon(&polygon_rings(self));
        }
    }
}
