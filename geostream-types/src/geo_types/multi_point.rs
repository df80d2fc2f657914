use geo_types::MultiPoint;

use crate::content::GeometryContent;
use crate::coords::Coords;
use crate::geometry::WriteGeometry;
use crate::geometry_type::GeomKind;
use crate::series::PositionSeries;

impl WriteGeometry for MultiPoint<f64> {
    fn write_geometry(&self, sink: &mut dyn GeometryContent) {
        if self.0.is_empty() {
            sink.empty_geometry(GeomKind::MultiPoint, None);
            return;
        }

        let values = self.0.iter().flat_map(|p| [p.x(), p.y()]).collect();
        match PositionSeries::from_values(values, Coords::Xy) {
            Ok(series) => sink.multi_point(&series),
            Err(e) => log::warn!("failed to write multipoint: {e}"),
        }
    }
}
