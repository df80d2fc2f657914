use serde::{Deserialize, Serialize};

use crate::content::{CollectionHeader, GeometryContent};
use crate::coords::Coords;
use crate::geometry_type::GeomKind;
use crate::point::Position;
use crate::series::PositionSeries;

/// Producer of geometry content.
///
/// Types implementing this trait can be written into any [`GeometryContent`] sink: a text or
/// binary encoder, or a builder.
pub trait WriteGeometry {
    /// Writes the geometry into the sink.
    fn write_geometry(&self, sink: &mut dyn GeometryContent);
}

/// Owned geometry value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Point.
    Point(Position),
    /// Line string.
    LineString(PositionSeries<'static>),
    /// Polygon: exterior ring followed by interior rings.
    Polygon(Vec<PositionSeries<'static>>),
    /// Multipoint.
    MultiPoint(PositionSeries<'static>),
    /// Multi line string.
    MultiLineString(Vec<PositionSeries<'static>>),
    /// Multipolygon.
    MultiPolygon(Vec<Vec<PositionSeries<'static>>>),
    /// Geometry collection.
    GeometryCollection(Vec<Geometry>),
    /// Empty geometry of the given kind.
    Empty(GeomKind),
}

impl Geometry {
    /// Kind of the geometry.
    pub fn kind(&self) -> GeomKind {
        match self {
            Geometry::Point(_) => GeomKind::Point,
            Geometry::LineString(_) => GeomKind::LineString,
            Geometry::Polygon(_) => GeomKind::Polygon,
            Geometry::MultiPoint(_) => GeomKind::MultiPoint,
            Geometry::MultiLineString(_) => GeomKind::MultiLineString,
            Geometry::MultiPolygon(_) => GeomKind::MultiPolygon,
            Geometry::GeometryCollection(_) => GeomKind::GeometryCollection,
            Geometry::Empty(kind) => *kind,
        }
    }

    /// Dimensionality of the positions, if the geometry has any.
    pub fn coords(&self) -> Option<Coords> {
        match self {
            Geometry::Point(p) => Some(p.coords()),
            Geometry::LineString(s) | Geometry::MultiPoint(s) => Some(s.coords()),
            Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
                rings.first().map(PositionSeries::coords)
            }
            Geometry::MultiPolygon(polygons) => polygons
                .iter()
                .flat_map(|rings| rings.first())
                .map(PositionSeries::coords)
                .next(),
            Geometry::GeometryCollection(geometries) => {
                geometries.iter().find_map(Geometry::coords)
            }
            Geometry::Empty(_) => None,
        }
    }

    /// Returns true for [`Geometry::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Geometry::Empty(_))
    }
}

impl WriteGeometry for Geometry {
    fn write_geometry(&self, sink: &mut dyn GeometryContent) {
        match self {
            Geometry::Point(p) => sink.point(p),
            Geometry::LineString(s) => sink.line_string(s),
            Geometry::Polygon(rings) => sink.polygon(rings),
            Geometry::MultiPoint(s) => sink.multi_point(s),
            Geometry::MultiLineString(lines) => sink.multi_line_string(lines),
            Geometry::MultiPolygon(polygons) => sink.multi_polygon(polygons),
            Geometry::GeometryCollection(geometries) => sink.geometry_collection(
                CollectionHeader::with_count(geometries.len()),
                &mut |inner| {
                    for geometry in geometries {
                        geometry.write_geometry(inner);
                    }
                },
            ),
            Geometry::Empty(kind) => sink.empty_geometry(*kind, None),
        }
    }
}

impl From<Position> for Geometry {
    fn from(value: Position) -> Self {
        Self::Point(value)
    }
}
