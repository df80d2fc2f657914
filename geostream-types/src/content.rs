//! Content traits connect producers of geospatial data (value objects, decoders) with consumers
//! (text and binary encoders, object builders).
//!
//! A producer describes data as a sequence of calls on one of the content traits. Nested
//! structures are written through callbacks: [`GeometryContent::geometry`] receives a closure that
//! is invoked with a [`CoordinateContent`] sink scoped to that single geometry, a feature
//! receives a closure writing its geometry into a [`GeometryContent`] sink and so on. Neither
//! side needs an intermediate object model, so any decoder can be connected directly to any
//! encoder.
//!
//! The shape of the coordinates of a geometry is determined by its [`GeomKind`]: a point is a
//! single [`CoordinateContent::position`] call, a line string or a multipoint is one position
//! array, a polygon or a multi line string is an array of position arrays, and a multipolygon
//! has three levels of arrays.
//!
//! Calls must be well formed: every [`CoordinateContent::position_array_begin`] must have a
//! matching [`CoordinateContent::position_array_end`], and the callbacks are invoked
//! synchronously and never retained. Implementations treat violations of this contract as bugs
//! (`debug_assert!`).

use serde_json::Value;

use crate::bounding_rect::BoundingBox;
use crate::coords::Coords;
use crate::feature::{FeatureId, PropertyMap};
use crate::geometry_type::GeomKind;
use crate::point::Position;
use crate::series::PositionSeries;

/// Consumer of positions, position arrays and bounding boxes.
pub trait CoordinateContent {
    /// Writes a single position.
    fn position(&mut self, position: &Position);

    /// Writes a bounding box.
    fn bounding_box(&mut self, bbox: &BoundingBox);

    /// Opens an array of positions (or of nested arrays). The `count` of items is a hint and can
    /// be omitted.
    fn position_array_begin(&mut self, count: Option<usize>);

    /// Closes the array opened by the last unmatched
    /// [`position_array_begin`](CoordinateContent::position_array_begin).
    fn position_array_end(&mut self);

    /// Writes all positions of the series as one array.
    fn positions(&mut self, series: &PositionSeries<'_>) {
        self.position_array_begin(Some(series.len()));
        for position in series.iter() {
            self.position(&position);
        }
        self.position_array_end();
    }
}

/// Geometry metadata passed to [`GeometryContent::geometry`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryHeader<'a> {
    /// Kind of the geometry.
    pub kind: GeomKind,
    /// Dimensionality of the positions. When given, it is authoritative; when omitted, consumers
    /// infer it from the positions.
    pub coords: Option<Coords>,
    /// Name of the geometry inside a feature. Unnamed geometry is the primary geometry.
    pub name: Option<&'a str>,
    /// Bounding box of the geometry.
    pub bounds: Option<&'a BoundingBox>,
    /// Members of the geometry object that the format does not define. Only encoders with a
    /// place for them (GeoJSON) write them back.
    pub foreign: Option<&'a PropertyMap>,
}

impl<'a> GeometryHeader<'a> {
    /// Header with only the kind set.
    pub fn new(kind: GeomKind) -> Self {
        Self {
            kind,
            coords: None,
            name: None,
            bounds: None,
            foreign: None,
        }
    }

    /// Sets the dimensionality.
    pub fn with_coords(mut self, coords: Coords) -> Self {
        self.coords = Some(coords);
        self
    }

    /// Sets the optional dimensionality.
    pub fn with_opt_coords(mut self, coords: Option<Coords>) -> Self {
        self.coords = coords;
        self
    }

    /// Sets the name.
    pub fn with_name(mut self, name: &'a str) -> Self {
        self.name = Some(name);
        self
    }

    /// Sets the bounding box.
    pub fn with_bounds(mut self, bounds: &'a BoundingBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Sets the foreign members.
    pub fn with_foreign(mut self, foreign: &'a PropertyMap) -> Self {
        self.foreign = Some(foreign);
        self
    }
}

/// Metadata of geometry collections and feature collections.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollectionHeader<'a> {
    /// Number of items in the collection, if known.
    pub count: Option<usize>,
    /// Name of the collection inside a feature (for geometry collections only).
    pub name: Option<&'a str>,
    /// Bounding box of the collection.
    pub bounds: Option<&'a BoundingBox>,
    /// Members of a geometry collection object that the format does not define.
    pub foreign: Option<&'a PropertyMap>,
}

impl<'a> CollectionHeader<'a> {
    /// Header with the given item count.
    pub fn with_count(count: usize) -> Self {
        Self {
            count: Some(count),
            ..Default::default()
        }
    }

    /// Sets the bounding box.
    pub fn with_bounds(mut self, bounds: &'a BoundingBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Sets the optional bounding box.
    pub fn with_opt_bounds(mut self, bounds: Option<&'a BoundingBox>) -> Self {
        self.bounds = bounds;
        self
    }

    /// Sets the name.
    pub fn with_name(mut self, name: &'a str) -> Self {
        self.name = Some(name);
        self
    }

    /// Sets the foreign members.
    pub fn with_foreign(mut self, foreign: &'a PropertyMap) -> Self {
        self.foreign = Some(foreign);
        self
    }
}

/// Consumer of geometries.
pub trait GeometryContent {
    /// Writes a geometry. `coordinates` is called exactly once with a sink scoped to this
    /// geometry.
    fn geometry(
        &mut self,
        header: GeometryHeader<'_>,
        coordinates: &mut dyn FnMut(&mut dyn CoordinateContent),
    );

    /// Writes a geometry collection. `geometries` is called exactly once with a sink for the
    /// members of the collection.
    fn geometry_collection(
        &mut self,
        header: CollectionHeader<'_>,
        geometries: &mut dyn FnMut(&mut dyn GeometryContent),
    );

    /// Writes an empty geometry of the given kind without any coordinates.
    fn empty_geometry(&mut self, kind: GeomKind, name: Option<&str>);

    /// Writes a point.
    fn point(&mut self, position: &Position) {
        self.geometry(
            GeometryHeader::new(GeomKind::Point).with_coords(position.coords()),
            &mut |c| c.position(position),
        );
    }

    /// Writes a line string.
    fn line_string(&mut self, series: &PositionSeries<'_>) {
        self.geometry(
            GeometryHeader::new(GeomKind::LineString).with_coords(series.coords()),
            &mut |c| c.positions(series),
        );
    }

    /// Writes a polygon given by its exterior ring and optional interior rings.
    fn polygon(&mut self, rings: &[PositionSeries<'_>]) {
        self.geometry(
            GeometryHeader::new(GeomKind::Polygon)
                .with_opt_coords(rings.first().map(PositionSeries::coords)),
            &mut |c| write_arrays(c, rings),
        );
    }

    /// Writes a multipoint.
    fn multi_point(&mut self, points: &PositionSeries<'_>) {
        self.geometry(
            GeometryHeader::new(GeomKind::MultiPoint).with_coords(points.coords()),
            &mut |c| c.positions(points),
        );
    }

    /// Writes a multi line string.
    fn multi_line_string(&mut self, lines: &[PositionSeries<'_>]) {
        self.geometry(
            GeometryHeader::new(GeomKind::MultiLineString)
                .with_opt_coords(lines.first().map(PositionSeries::coords)),
            &mut |c| write_arrays(c, lines),
        );
    }

    /// Writes a multipolygon.
    fn multi_polygon(&mut self, polygons: &[Vec<PositionSeries<'_>>]) {
        let coords = polygons
            .iter()
            .flat_map(|rings| rings.first())
            .map(PositionSeries::coords)
            .next();
        self.geometry(
            GeometryHeader::new(GeomKind::MultiPolygon).with_opt_coords(coords),
            &mut |c| {
                c.position_array_begin(Some(polygons.len()));
                for rings in polygons {
                    write_arrays(c, rings);
                }
                c.position_array_end();
            },
        );
    }
}

fn write_arrays(content: &mut dyn CoordinateContent, arrays: &[PositionSeries<'_>]) {
    content.position_array_begin(Some(arrays.len()));
    for series in arrays {
        content.positions(series);
    }
    content.position_array_end();
}

/// Consumer of named dynamically typed values (feature properties and foreign members).
pub trait PropertyContent {
    /// Writes a single named value. Arrays and objects are written recursively.
    fn property(&mut self, name: &str, value: &Value);

    /// Writes a named map of values.
    fn properties(&mut self, name: &str, map: &PropertyMap);
}

/// Feature metadata passed to [`FeatureContent::feature`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeatureHeader<'a> {
    /// Feature identifier.
    pub id: Option<&'a FeatureId>,
    /// Feature properties.
    pub properties: Option<&'a PropertyMap>,
    /// Bounding box of the feature.
    pub bounds: Option<&'a BoundingBox>,
}

/// Consumer of features and feature collections.
pub trait FeatureContent {
    /// Writes a feature. The `geometry` callback, if given, writes the geometries of the feature;
    /// the `custom` callback writes additional members.
    fn feature(
        &mut self,
        header: FeatureHeader<'_>,
        geometry: Option<&mut dyn FnMut(&mut dyn GeometryContent)>,
        custom: Option<&mut dyn FnMut(&mut dyn PropertyContent)>,
    );

    /// Writes a feature collection. `features` is called exactly once with a sink for the
    /// features of the collection.
    fn feature_collection(
        &mut self,
        header: CollectionHeader<'_>,
        features: &mut dyn FnMut(&mut dyn FeatureContent),
        custom: Option<&mut dyn FnMut(&mut dyn PropertyContent)>,
    );
}

/// Content sink that discards everything it is given.
///
/// All nested callbacks are still invoked, so a producer can be run against this sink to check
/// that it completes successfully before writing into a real sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullContent;

impl CoordinateContent for NullContent {
    fn position(&mut self, _position: &Position) {}

    fn bounding_box(&mut self, _bbox: &BoundingBox) {}

    fn position_array_begin(&mut self, _count: Option<usize>) {}

    fn position_array_end(&mut self) {}
}

impl GeometryContent for NullContent {
    fn geometry(
        &mut self,
        _header: GeometryHeader<'_>,
        coordinates: &mut dyn FnMut(&mut dyn CoordinateContent),
    ) {
        coordinates(self);
    }

    fn geometry_collection(
        &mut self,
        _header: CollectionHeader<'_>,
        geometries: &mut dyn FnMut(&mut dyn GeometryContent),
    ) {
        geometries(self);
    }

    fn empty_geometry(&mut self, _kind: GeomKind, _name: Option<&str>) {}
}

impl PropertyContent for NullContent {
    fn property(&mut self, _name: &str, _value: &Value) {}

    fn properties(&mut self, _name: &str, _map: &PropertyMap) {}
}

impl FeatureContent for NullContent {
    fn feature(
        &mut self,
        _header: FeatureHeader<'_>,
        geometry: Option<&mut dyn FnMut(&mut dyn GeometryContent)>,
        custom: Option<&mut dyn FnMut(&mut dyn PropertyContent)>,
    ) {
        if let Some(geometry) = geometry {
            geometry(self);
        }
        if let Some(custom) = custom {
            custom(self);
        }
    }

    fn feature_collection(
        &mut self,
        _header: CollectionHeader<'_>,
        features: &mut dyn FnMut(&mut dyn FeatureContent),
        custom: Option<&mut dyn FnMut(&mut dyn PropertyContent)>,
    ) {
        features(self);
        if let Some(custom) = custom {
            custom(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl CoordinateContent for Recorder {
        fn position(&mut self, position: &Position) {
            self.calls.push(format!("pos {} {}", position.x, position.y));
        }

        fn bounding_box(&mut self, _bbox: &BoundingBox) {
            self.calls.push("bbox".into());
        }

        fn position_array_begin(&mut self, count: Option<usize>) {
            self.calls.push(format!("begin {count:?}"));
        }

        fn position_array_end(&mut self) {
            self.calls.push("end".into());
        }
    }

    impl GeometryContent for Recorder {
        fn geometry(
            &mut self,
            header: GeometryHeader<'_>,
            coordinates: &mut dyn FnMut(&mut dyn CoordinateContent),
        ) {
            self.calls
                .push(format!("geometry {} {:?}", header.kind, header.coords));
            coordinates(self);
        }

        fn geometry_collection(
            &mut self,
            _header: CollectionHeader<'_>,
            geometries: &mut dyn FnMut(&mut dyn GeometryContent),
        ) {
            geometries(self);
        }

        fn empty_geometry(&mut self, kind: GeomKind, _name: Option<&str>) {
            self.calls.push(format!("empty {kind}"));
        }
    }

    #[test]
    fn polygon_writes_nested_arrays() {
        let ring = PositionSeries::view(&[0.0, 0.0, 1.0, 0.0, 0.0, 0.0], Coords::Xy).unwrap();
        let mut recorder = Recorder::default();
        recorder.polygon(&[ring]);

        assert_eq!(
            recorder.calls,
            [
                "geometry Polygon Some(Xy)",
                "begin Some(1)",
                "begin Some(3)",
                "pos 0 0",
                "pos 1 0",
                "pos 0 0",
                "end",
                "end"
            ]
        );
    }

    #[test]
    fn multi_polygon_writes_three_levels() {
        let ring = PositionSeries::view(&[0.0, 0.0, 1.0, 1.0], Coords::Xy).unwrap();
        let mut recorder = Recorder::default();
        recorder.multi_polygon(&[vec![ring.clone()], vec![ring]]);

        let begins = recorder
            .calls
            .iter()
            .filter(|c| c.starts_with("begin"))
            .count();
        let ends = recorder.calls.iter().filter(|c| *c == "end").count();
        assert_eq!(begins, 5);
        assert_eq!(ends, 5);
        assert_eq!(recorder.calls[1], "begin Some(2)");
    }

    #[test]
    fn null_content_drives_callbacks() {
        let mut called = false;
        NullContent.geometry_collection(CollectionHeader::default(), &mut |g| {
            g.geometry(GeometryHeader::new(GeomKind::Point), &mut |_| called = true);
        });
        assert!(called);
    }
}
