//! Scenarios that go through more than one format.

use approx::assert_abs_diff_eq;
use geostream_types::{
    BoundingBox, CollectionHeader, CoordinateContent, Coords, FeatureId, GeomKind, Geometry,
    GeometryContent, GeometryHeader, Position, PositionSeries, WriteGeometry,
};
use insta::assert_snapshot;

use crate::geojson::{self, GeoJsonWriter};
use crate::options::TextWriterOptions;
use crate::wkb::{self, Endian, WkbOptions};
use crate::wkt::{self, WktWriter};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn series(values: &[f64], coords: Coords) -> PositionSeries<'static> {
    PositionSeries::from_values(values.to_vec(), coords).unwrap()
}

/// Geometries of every kind with positions of the given dimensionality.
fn sample_geometries(coords: Coords) -> Vec<Geometry> {
    let dimension = coords.dimension();
    let positions = |count: usize, start: f64| -> Vec<f64> {
        (0..count * dimension)
            .map(|i| start + i as f64 * 0.5)
            .collect()
    };
    let ring = |start: f64| {
        let mut values = positions(3, start);
        values.extend_from_within(..dimension);
        series(&values, coords)
    };

    vec![
        Geometry::Point(Position::from_values(&positions(1, 1.25), Some(coords)).unwrap()),
        Geometry::LineString(series(&positions(3, -7.0), coords)),
        Geometry::Polygon(vec![ring(0.0), ring(0.125)]),
        Geometry::MultiPoint(series(&positions(2, 100.0), coords)),
        Geometry::MultiLineString(vec![
            series(&positions(2, 1.0), coords),
            series(&positions(3, 2.0), coords),
        ]),
        Geometry::MultiPolygon(vec![vec![ring(10.0)], vec![ring(-10.0), ring(-9.5)]]),
    ]
}

/// Flat list of all coordinate values of a geometry.
#[derive(Default)]
struct ValueCollector(Vec<f64>);

impl CoordinateContent for ValueCollector {
    fn position(&mut self, position: &Position) {
        self.0.extend(position.values());
    }

    fn bounding_box(&mut self, bbox: &BoundingBox) {
        self.0.extend(bbox.min.values());
        self.0.extend(bbox.max.values());
    }

    fn position_array_begin(&mut self, _count: Option<usize>) {}

    fn position_array_end(&mut self) {}
}

impl GeometryContent for ValueCollector {
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

fn values(geometry: &impl WriteGeometry) -> Vec<f64> {
    let mut collector = ValueCollector::default();
    geometry.write_geometry(&mut collector);
    collector.0
}

#[test]
fn wkb_transcoding_matches_direct_encoding() {
    init_logger();

    let mut geometries = Vec::new();
    for coords in [Coords::Xy, Coords::Xyz, Coords::Xym, Coords::Xyzm] {
        geometries.extend(sample_geometries(coords));
    }
    geometries.push(Geometry::Empty(GeomKind::Point));
    geometries.push(Geometry::Empty(GeomKind::MultiPolygon));
    geometries.push(Geometry::LineString(PositionSeries::empty(Coords::Xy)));
    geometries.push(Geometry::Polygon(vec![]));
    geometries.push(Geometry::GeometryCollection(vec![
        Geometry::Point(Position::new(1.0, 2.0)),
        Geometry::Empty(GeomKind::LineString),
        Geometry::GeometryCollection(vec![Geometry::Point(Position::new_3d(1.0, 2.0, 3.0))]),
    ]));

    let options = TextWriterOptions::default();
    for endian in [Endian::Little, Endian::Big] {
        for geometry in &geometries {
            let bytes = wkb::to_wkb(geometry, WkbOptions::default().with_endian(endian));

            let mut wkt_writer = WktWriter::new(options);
            wkb::decode(&bytes, &mut wkt_writer).unwrap();
            assert_eq!(wkt_writer.as_str(), wkt::to_wkt(geometry, options));

            let mut geojson_writer = GeoJsonWriter::new(options);
            wkb::decode(&bytes, &mut geojson_writer).unwrap();
            assert_eq!(geojson_writer.as_str(), geojson::to_geojson(geometry, options));
        }
    }
}

#[test]
fn empty_point() {
    let point = Geometry::Empty(GeomKind::Point);
    let options = TextWriterOptions::default();
    assert_eq!(wkt::to_wkt(&point, options), "POINT EMPTY");
    assert_eq!(
        geojson::to_geojson(&point, options),
        r#"{"type":"Point","coordinates":[]}"#
    );

    assert_eq!(wkt::parse_geometry("POINT EMPTY").unwrap(), point);
    assert_eq!(
        geojson::parse_geometry(r#"{"type":"Point","coordinates":[]}"#).unwrap(),
        point
    );
}

#[test]
fn rounding_to_decimals() {
    let point = Geometry::Point(Position::new(10.123, 20.25));
    let options = TextWriterOptions::default().with_decimals(1);
    assert_snapshot!(geojson::to_geojson(&point, options), @r#"{"type":"Point","coordinates":[10.1,20.3]}"#);
    assert_snapshot!(wkt::to_wkt(&point, options), @"POINT(10.1 20.3)");
}

#[test]
fn bounding_box_as_wkt() {
    let mut writer = WktWriter::default();
    writer.bounding_box(&BoundingBox::from_edges(-20.0, 50.0, 20.0, 60.0));
    assert_snapshot!(writer.as_str(), @"POLYGON((-20 50,20 50,20 60,-20 60,-20 50))");
}

#[test]
fn three_components_are_elevation() {
    let expected = Geometry::Point(Position::new_3d(1.0, 2.0, 3.0));
    assert_eq!(wkt::parse_geometry("POINT(1 2 3)").unwrap(), expected);
    assert_eq!(
        geojson::parse_geometry(r#"{"type":"Point","coordinates":[1,2,3]}"#).unwrap(),
        expected
    );

    let mut writer = WktWriter::default();
    geojson::decode_geometry(r#"{"type":"Point","coordinates":[1,2,3]}"#, &mut writer).unwrap();
    assert_snapshot!(writer.as_str(), @"POINT Z(1 2 3)");
}

#[test]
fn text_round_trips() {
    init_logger();

    let options = TextWriterOptions::default();
    for coords in [Coords::Xy, Coords::Xyz, Coords::Xym, Coords::Xyzm] {
        for geometry in sample_geometries(coords) {
            let text = wkt::to_wkt(&geometry, options);
            assert_eq!(wkt::parse_geometry(&text).unwrap(), geometry, "{text}");

            let bytes = wkb::to_wkb(&geometry, WkbOptions::default());
            assert_eq!(wkb::parse_geometry(&bytes).unwrap(), geometry);
        }
    }

    for coords in [Coords::Xy, Coords::Xyz, Coords::Xyzm] {
        for geometry in sample_geometries(coords) {
            let text = geojson::to_geojson(&geometry, options);
            assert_eq!(geojson::parse_geometry(&text).unwrap(), geometry, "{text}");
        }
    }
}

#[test]
fn measured_geojson_gets_elevation_placeholder() {
    let line = Geometry::LineString(series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], Coords::Xym));
    let text = geojson::to_geojson(&line, TextWriterOptions::default());
    assert_snapshot!(text, @r#"{"type":"LineString","coordinates":[[1,2,0,3],[4,5,0,6]]}"#);

    let parsed = geojson::parse_geometry(&text).unwrap();
    assert_eq!(parsed.coords(), Some(Coords::Xyzm));
    assert_eq!(values(&parsed), [1.0, 2.0, 0.0, 3.0, 4.0, 5.0, 0.0, 6.0]);
}

#[test]
fn round_trip_within_decimals() {
    let geometry = Geometry::MultiLineString(vec![
        series(&[0.123456, 1.987654, 2.000049, -3.5], Coords::Xy),
        series(&[10.0001, 20.0004, 30.00051, 40.1], Coords::Xy),
    ]);
    let options = TextWriterOptions::default().with_decimals(3);

    let from_wkt = wkt::parse_geometry(&wkt::to_wkt(&geometry, options)).unwrap();
    let from_geojson = geojson::parse_geometry(&geojson::to_geojson(&geometry, options)).unwrap();

    let expected = values(&geometry);
    for parsed in [from_wkt, from_geojson] {
        assert_eq!(parsed.kind(), GeomKind::MultiLineString);
        let actual = values(&parsed);
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(&expected) {
            assert_abs_diff_eq!(*a, *e, epsilon = 0.0005);
        }
    }
}

#[test]
fn wkt_collection_to_geojson() {
    let mut writer = GeoJsonWriter::default();
    wkt::decode(
        "GEOMETRYCOLLECTION (POINT (1 2), LINESTRING EMPTY, POLYGON ((0 0, 1 0, 1 1, 0 0)))",
        &mut writer,
    )
    .unwrap();
    assert_snapshot!(writer.as_str(), @r#"{"type":"GeometryCollection","geometries":[{"type":"Point","coordinates":[1,2]},{"type":"LineString","coordinates":[]},{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}]}"#);
}

#[test]
fn feature_survives_geojson_round_trip() {
    let text = r#"{"type":"Feature","id":7,"bbox":[0,0,1,1],"geometry":{"type":"Point","coordinates":[0.5,0.5]},"properties":{"name":"x","tags":[1,"a",null]},"title":"t"}"#;

    let feature = geojson::parse_feature(text).unwrap();
    assert_eq!(feature.id, Some(FeatureId::Int(7)));
    assert_eq!(feature.custom["title"], "t");
    assert_eq!(
        geojson::feature_to_geojson(&feature, TextWriterOptions::default()),
        text
    );

    let mut writer = GeoJsonWriter::default();
    geojson::decode(text, &mut writer).unwrap();
    assert_eq!(writer.as_str(), text);
}

#[test]
fn failed_decode_leaves_writer_untouched() {
    let mut writer = WktWriter::default();
    assert!(wkt::decode("LINESTRING(1 2,3)", &mut writer).is_err());
    assert_eq!(writer.as_str(), "");

    let mut writer = GeoJsonWriter::default();
    let bytes = wkb::to_wkb(
        &Geometry::LineString(series(&[1.0, 2.0, 3.0, 4.0], Coords::Xy)),
        WkbOptions::default(),
    );
    assert!(wkb::decode(&bytes[..bytes.len() - 1], &mut writer).is_err());
    assert_eq!(writer.as_str(), "");
}

#[cfg(feature = "geo-types")]
#[test]
fn geo_types_geometries() {
    use geo_types::{line_string, point, polygon};

    let options = TextWriterOptions::default();
    assert_eq!(wkt::to_wkt(&point!(x: 1.5, y: 2.0), options), "POINT(1.5 2)");
    assert_eq!(
        geojson::to_geojson(&line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)], options),
        r#"{"type":"LineString","coordinates":[[0,0],[1,1]]}"#
    );

    let polygon = polygon![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0), (x: 2.0, y: 2.0)];
    let built = wkb::parse_geometry(&wkb::to_wkb(&polygon, WkbOptions::default())).unwrap();
    assert_eq!(
        built,
        Geometry::Polygon(vec![series(
            &[0.0, 0.0, 2.0, 0.0, 2.0, 2.0, 0.0, 0.0],
            Coords::Xy
        )])
    );
}
