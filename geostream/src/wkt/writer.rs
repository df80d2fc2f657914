use geostream_types::{
    BoundingBox, CollectionHeader, CoordinateContent, Coords, GeomKind, GeometryContent,
    GeometryHeader, Position,
};

use crate::options::TextWriterOptions;
use crate::text::{Container, TextSink};

/// WKT tag of the geometry kind.
pub(crate) fn wkt_tag(kind: GeomKind) -> &'static str {
    match kind {
        GeomKind::Point => "POINT",
        GeomKind::LineString => "LINESTRING",
        GeomKind::Polygon => "POLYGON",
        GeomKind::MultiPoint => "MULTIPOINT",
        GeomKind::MultiLineString => "MULTILINESTRING",
        GeomKind::MultiPolygon => "MULTIPOLYGON",
        GeomKind::GeometryCollection => "GEOMETRYCOLLECTION",
    }
}

fn dimension_suffix(coords: Coords) -> &'static str {
    match coords {
        Coords::Xy => "",
        Coords::Xyz => " Z",
        Coords::Xym => " M",
        Coords::Xyzm => " ZM",
    }
}

/// WKT encoder.
///
/// Writes geometries as OGC Simple Features text, e.g. `LINESTRING Z(1 2 3,4 5 6)`. The
/// dimensionality suffix comes from the geometry header or, if the header has none, from the
/// first position of the geometry. Geometries without positions are written as `<TAG> EMPTY`.
///
/// A bounding box written outside of a geometry becomes a closed 2d `POLYGON`.
///
/// WKT has no representation for features and properties, so this writer only implements
/// [`GeometryContent`] and [`CoordinateContent`].
#[derive(Debug)]
pub struct WktWriter {
    sink: TextSink,
    pending_suffix: Option<usize>,
    has_positions: bool,
}

impl Default for WktWriter {
    fn default() -> Self {
        Self::new(TextWriterOptions::default())
    }
}

impl WktWriter {
    /// Creates a writer with an empty output.
    pub fn new(options: TextWriterOptions) -> Self {
        Self::with_buffer(options, String::new())
    }

    /// Creates a writer appending to the given buffer.
    pub fn with_buffer(options: TextWriterOptions, buffer: String) -> Self {
        Self {
            sink: TextSink::new(options, buffer),
            pending_suffix: None,
            has_positions: false,
        }
    }

    /// Text written so far.
    pub fn as_str(&self) -> &str {
        self.sink.as_str()
    }

    /// Consumes the writer and returns the text.
    pub fn into_string(self) -> String {
        self.sink.into_string()
    }

    /// Clears the output and all nesting state.
    pub fn reset(&mut self) {
        self.sink.reset();
        self.pending_suffix = None;
        self.has_positions = false;
    }

    fn begin_geometry(&mut self) -> bool {
        match self.sink.stack.current() {
            Container::Root | Container::ObjectArray => {
                self.sink.separator(",");
                true
            }
            other => {
                debug_assert!(false, "geometry cannot be written inside {other:?}");
                false
            }
        }
    }

    /// Fixes the dimensionality of a geometry declared without one, once its first position is
    /// known.
    fn resolve_suffix(&mut self, coords: Coords) {
        self.sink.stack.infer_coords(coords);
        if let Some(index) = self.pending_suffix.take() {
            let suffix = dimension_suffix(self.sink.output_coords(coords));
            self.sink.insert_str(index, suffix);
        }
    }

    fn bare_position(&mut self, position: &Position) {
        let coords = self.sink.output_coords(position.coords());
        self.sink.position_values(position, coords, " ");
    }
}

impl CoordinateContent for WktWriter {
    fn position(&mut self, position: &Position) {
        self.has_positions = true;
        self.resolve_suffix(position.coords());
        self.sink.separator(",");

        match self.sink.stack.current() {
            Container::Geometry => {
                self.sink.push('(');
                self.bare_position(position);
                self.sink.push(')');
            }
            Container::CoordArray | Container::Root => self.bare_position(position),
            other => debug_assert!(false, "position cannot be written inside {other:?}"),
        }
    }

    fn bounding_box(&mut self, bbox: &BoundingBox) {
        let standalone = matches!(
            self.sink.stack.current(),
            Container::Root | Container::ObjectArray
        );
        self.has_positions = true;

        self.sink.separator(",");
        if standalone {
            self.sink.push_str(wkt_tag(GeomKind::Polygon));
            self.sink.push('(');
        }

        self.sink.push('(');
        for (index, corner) in bbox.corners_2d().iter().enumerate() {
            if index > 0 {
                self.sink.push(',');
            }
            self.sink.position_values(corner, Coords::Xy, " ");
        }
        self.sink.push(')');

        if standalone {
            self.sink.push(')');
        }
    }

    fn position_array_begin(&mut self, _count: Option<usize>) {
        self.sink.separator(",");
        self.sink.push('(');
        self.sink.stack.push(Container::CoordArray);
    }

    fn position_array_end(&mut self) {
        if self.sink.stack.current() != Container::CoordArray {
            debug_assert!(false, "position array end without a matching begin");
            return;
        }

        self.sink.stack.pop();
        self.sink.push(')');
    }
}

impl GeometryContent for WktWriter {
    fn geometry(
        &mut self,
        header: GeometryHeader<'_>,
        coordinates: &mut dyn FnMut(&mut dyn CoordinateContent),
    ) {
        if header.kind == GeomKind::GeometryCollection {
            debug_assert!(false, "geometry collections are written with geometry_collection");
            return;
        }

        if !self.begin_geometry() {
            return;
        }

        self.sink.push_str(wkt_tag(header.kind));
        match header.coords {
            Some(coords) => {
                let suffix = dimension_suffix(self.sink.output_coords(coords));
                self.sink.push_str(suffix);
            }
            None => self.pending_suffix = Some(self.sink.len()),
        }

        // Position arrays without positions still leave parentheses behind.
        let body_start = self.sink.len();
        self.has_positions = false;
        self.sink.stack.push_geometry(header.coords);
        coordinates(self);
        self.sink.stack.close(Container::Geometry);
        self.pending_suffix = None;

        if !self.has_positions {
            self.sink.truncate(body_start);
            self.sink.push_str(" EMPTY");
        }
    }

    fn geometry_collection(
        &mut self,
        _header: CollectionHeader<'_>,
        geometries: &mut dyn FnMut(&mut dyn GeometryContent),
    ) {
        if !self.begin_geometry() {
            return;
        }

        self.sink.push_str(wkt_tag(GeomKind::GeometryCollection));
        let body_start = self.sink.len();
        self.sink.push('(');

        self.sink.stack.push(Container::ObjectArray);
        geometries(self);
        let has_members = self.sink.stack.has_item();
        self.sink.stack.close(Container::ObjectArray);

        if has_members {
            self.sink.push(')');
        } else {
            self.sink.truncate(body_start);
            self.sink.push_str(" EMPTY");
        }
    }

    fn empty_geometry(&mut self, kind: GeomKind, _name: Option<&str>) {
        if !self.begin_geometry() {
            return;
        }

        self.sink.push_str(wkt_tag(kind));
        self.sink.push_str(" EMPTY");
    }
}

#[cfg(test)]
mod tests {
    use geostream_types::{Geometry, PositionSeries, WriteGeometry};
    use insta::assert_snapshot;

    use super::*;

    fn write(geometry: &impl WriteGeometry, options: TextWriterOptions) -> String {
        let mut writer = WktWriter::new(options);
        geometry.write_geometry(&mut writer);
        writer.into_string()
    }

    fn series(values: &[f64], coords: Coords) -> PositionSeries<'static> {
        PositionSeries::from_values(values.to_vec(), coords).unwrap()
    }

    #[test]
    fn point() {
        let point = Geometry::Point(Position::new(10.123, 20.25));
        assert_snapshot!(write(&point, TextWriterOptions::default()), @"POINT(10.123 20.25)");
        assert_snapshot!(write(&point, TextWriterOptions::default().with_decimals(1)), @"POINT(10.1 20.3)");
    }

    #[test]
    fn dimension_suffixes() {
        let options = TextWriterOptions::default();
        assert_snapshot!(write(&Geometry::Point(Position::new_3d(1.0, 2.0, 3.0)), options), @"POINT Z(1 2 3)");
        assert_snapshot!(write(&Geometry::Point(Position::new_measured(1.0, 2.0, 4.0)), options), @"POINT M(1 2 4)");
        assert_snapshot!(write(&Geometry::Point(Position::new_3d_measured(1.0, 2.0, 3.0, 4.0)), options), @"POINT ZM(1 2 3 4)");
        assert_snapshot!(
            write(&Geometry::Point(Position::new_3d_measured(1.0, 2.0, 3.0, 4.0)), options.with_ignore_measured(true)),
            @"POINT Z(1 2 3)"
        );
    }

    #[test]
    fn suffix_inferred_from_first_position() {
        let mut writer = WktWriter::default();
        writer.geometry(GeometryHeader::new(GeomKind::LineString), &mut |c| {
            c.position_array_begin(None);
            c.position(&Position::new_3d(1.0, 2.0, 3.0));
            c.position(&Position::new(4.0, 5.0));
            c.position_array_end();
        });
        assert_snapshot!(writer.as_str(), @"LINESTRING Z(1 2 3,4 5 0)");
    }

    #[test]
    fn line_string_separators() {
        let line = Geometry::LineString(series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], Coords::Xy));
        let text = write(&line, TextWriterOptions::default());
        assert_snapshot!(text, @"LINESTRING(1 2,3 4,5 6)");
        assert_eq!(text.matches(',').count(), 2);
    }

    #[test]
    fn nested_shapes() {
        let ring = series(&[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0], Coords::Xy);
        let options = TextWriterOptions::default();

        assert_snapshot!(write(&Geometry::Polygon(vec![ring.clone(), ring.clone()]), options), @"POLYGON((0 0,1 0,1 1,0 0),(0 0,1 0,1 1,0 0))");
        assert_snapshot!(write(&Geometry::MultiPoint(series(&[1.0, 2.0, 3.0, 4.0], Coords::Xy)), options), @"MULTIPOINT(1 2,3 4)");
        assert_snapshot!(write(&Geometry::MultiLineString(vec![ring.clone()]), options), @"MULTILINESTRING((0 0,1 0,1 1,0 0))");
        assert_snapshot!(write(&Geometry::MultiPolygon(vec![vec![ring.clone()], vec![ring]]), options), @"MULTIPOLYGON(((0 0,1 0,1 1,0 0)),((0 0,1 0,1 1,0 0)))");
    }

    #[test]
    fn empty_geometries() {
        let options = TextWriterOptions::default();
        assert_snapshot!(write(&Geometry::Empty(GeomKind::Point), options), @"POINT EMPTY");
        assert_snapshot!(write(&Geometry::Empty(GeomKind::MultiPolygon), options), @"MULTIPOLYGON EMPTY");
        assert_snapshot!(write(&Geometry::GeometryCollection(vec![]), options), @"GEOMETRYCOLLECTION EMPTY");

        let mut writer = WktWriter::default();
        writer.geometry(GeometryHeader::new(GeomKind::Polygon), &mut |_| {});
        assert_snapshot!(writer.as_str(), @"POLYGON EMPTY");
    }

    #[test]
    fn geometries_without_positions_are_empty() {
        let options = TextWriterOptions::default();
        assert_snapshot!(write(&Geometry::LineString(PositionSeries::empty(Coords::Xy)), options), @"LINESTRING EMPTY");
        assert_snapshot!(write(&Geometry::LineString(PositionSeries::empty(Coords::Xyz)), options), @"LINESTRING Z EMPTY");
        assert_snapshot!(write(&Geometry::Polygon(vec![]), options), @"POLYGON EMPTY");
        assert_snapshot!(write(&Geometry::MultiPolygon(vec![]), options), @"MULTIPOLYGON EMPTY");
        assert_snapshot!(
            write(&Geometry::MultiLineString(vec![PositionSeries::empty(Coords::Xy)]), options),
            @"MULTILINESTRING EMPTY"
        );

        let collection = Geometry::GeometryCollection(vec![
            Geometry::MultiPoint(PositionSeries::empty(Coords::Xy)),
            Geometry::Point(Position::new(1.0, 2.0)),
        ]);
        assert_snapshot!(write(&collection, options), @"GEOMETRYCOLLECTION(MULTIPOINT EMPTY,POINT(1 2))");
    }

    #[test]
    fn empty_output_parses_back() {
        let mut writer = WktWriter::default();
        crate::wkt::decode("MULTIPOINT(EMPTY)", &mut writer).unwrap();
        assert_snapshot!(writer.as_str(), @"MULTIPOINT EMPTY");

        let parsed = crate::wkt::parse_geometry(writer.as_str()).unwrap();
        assert_eq!(parsed, Geometry::Empty(GeomKind::MultiPoint));

        let text = write(&Geometry::Polygon(vec![]), TextWriterOptions::default());
        assert_eq!(
            crate::wkt::parse_geometry(&text).unwrap(),
            Geometry::Empty(GeomKind::Polygon)
        );
    }

    #[test]
    fn geometry_collection() {
        let collection = Geometry::GeometryCollection(vec![
            Geometry::Point(Position::new(1.0, 2.0)),
            Geometry::Empty(GeomKind::LineString),
            Geometry::GeometryCollection(vec![Geometry::Point(Position::new(3.0, 4.0))]),
        ]);
        assert_snapshot!(write(&collection, TextWriterOptions::default()), @"GEOMETRYCOLLECTION(POINT(1 2),LINESTRING EMPTY,GEOMETRYCOLLECTION(POINT(3 4)))");
    }

    #[test]
    fn bounding_box_as_polygon() {
        let mut writer = WktWriter::default();
        writer.bounding_box(&BoundingBox::from_edges(-20.0, 50.0, 20.0, 60.0));
        assert_snapshot!(writer.as_str(), @"POLYGON((-20 50,20 50,20 60,-20 60,-20 50))");
    }
}
