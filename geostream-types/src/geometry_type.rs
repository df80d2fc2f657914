//! See documentation for [`GeomKind`].

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GeoTypesError;

/// Kind of a geometry, following the OGC Simple Features geometry types.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GeomKind {
    /// Single position.
    Point,
    /// Sequence of positions.
    LineString,
    /// Exterior ring followed by optional interior rings.
    Polygon,
    /// Set of points.
    MultiPoint,
    /// Set of line strings.
    MultiLineString,
    /// Set of polygons.
    MultiPolygon,
    /// Heterogeneous set of geometries.
    GeometryCollection,
}

impl GeomKind {
    /// All geometry kinds.
    pub const ALL: [GeomKind; 7] = [
        GeomKind::Point,
        GeomKind::LineString,
        GeomKind::Polygon,
        GeomKind::MultiPoint,
        GeomKind::MultiLineString,
        GeomKind::MultiPolygon,
        GeomKind::GeometryCollection,
    ];

    /// Name of the kind as used by GeoJSON `type` member (`"LineString"` etc).
    pub fn name(&self) -> &'static str {
        match self {
            GeomKind::Point => "Point",
            GeomKind::LineString => "LineString",
            GeomKind::Polygon => "Polygon",
            GeomKind::MultiPoint => "MultiPoint",
            GeomKind::MultiLineString => "MultiLineString",
            GeomKind::MultiPolygon => "MultiPolygon",
            GeomKind::GeometryCollection => "GeometryCollection",
        }
    }

    /// Number of nested position arrays the coordinates of the geometry consist of.
    ///
    /// A point is a bare position (`0`), a line string is an array of positions (`1`), a polygon
    /// is an array of rings (`2`) and so on. Geometry collection does not have coordinates and
    /// returns `None`.
    pub fn array_depth(&self) -> Option<usize> {
        match self {
            GeomKind::Point => Some(0),
            GeomKind::LineString | GeomKind::MultiPoint => Some(1),
            GeomKind::Polygon | GeomKind::MultiLineString => Some(2),
            GeomKind::MultiPolygon => Some(3),
            GeomKind::GeometryCollection => None,
        }
    }

    /// Kind of the parts of a multi geometry.
    pub fn part_kind(&self) -> Option<GeomKind> {
        match self {
            GeomKind::MultiPoint => Some(GeomKind::Point),
            GeomKind::MultiLineString => Some(GeomKind::LineString),
            GeomKind::MultiPolygon => Some(GeomKind::Polygon),
            _ => None,
        }
    }
}

impl Display for GeomKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GeomKind {
    type Err = GeoTypesError;

    /// Parses a kind name ignoring case, so both `LineString` and `LINESTRING` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeomKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| GeoTypesError::Conversion(format!("unknown geometry type: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_kind_ignores_case() {
        assert_eq!("MULTIPOLYGON".parse(), Ok(GeomKind::MultiPolygon));
        assert_eq!("lineString".parse(), Ok(GeomKind::LineString));
        assert!("Curve".parse::<GeomKind>().is_err());
    }

    #[test]
    fn array_depth() {
        assert_eq!(GeomKind::Point.array_depth(), Some(0));
        assert_eq!(GeomKind::MultiPoint.array_depth(), Some(1));
        assert_eq!(GeomKind::MultiPolygon.array_depth(), Some(3));
        assert_eq!(GeomKind::GeometryCollection.array_depth(), None);
    }
}
