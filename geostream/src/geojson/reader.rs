use std::fmt::{Display, Formatter};

use geostream_types::{
    BoundingBox, CollectionHeader, FeatureContent, FeatureHeader, FeatureId, GeomKind,
    GeometryContent, GeometryHeader, NullContent, Position, PositionSeries, PropertyContent,
    PropertyMap, Value,
};
use serde_json::Map;

use crate::error::GeostreamError;
use crate::shape::{Dimensions, Shape};

const FEATURE_MEMBERS: [&str; 5] = ["type", "id", "bbox", "geometry", "properties"];
const COLLECTION_MEMBERS: [&str; 3] = ["type", "bbox", "features"];
const GEOMETRY_MEMBERS: [&str; 3] = ["type", "bbox", "coordinates"];
const GEOMETRY_COLLECTION_MEMBERS: [&str; 3] = ["type", "bbox", "geometries"];

/// Location of a value inside the document, used in error messages.
#[derive(Debug, Clone, Copy)]
enum Path<'a> {
    Root,
    Member(&'a Path<'a>, &'a str),
    Index(&'a Path<'a>, usize),
}

impl<'a> Path<'a> {
    fn member(&'a self, name: &'a str) -> Path<'a> {
        Path::Member(self, name)
    }

    fn index(&'a self, index: usize) -> Path<'a> {
        Path::Index(self, index)
    }

    fn error(&self, message: impl Into<String>) -> GeostreamError {
        GeostreamError::GeoJson {
            path: self.to_string(),
            message: message.into(),
        }
    }
}

impl Display for Path<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Path::Root => write!(f, "$"),
            Path::Member(parent, name) => write!(f, "{parent}.{name}"),
            Path::Index(parent, index) => write!(f, "{parent}[{index}]"),
        }
    }
}

/// Decodes a GeoJSON geometry object and writes it into the sink.
///
/// The whole document is validated before anything is written into the sink.
pub fn decode_geometry(text: &str, sink: &mut dyn GeometryContent) -> Result<(), GeostreamError> {
    let value: Value = serde_json::from_str(text)?;
    write_geometry(&value, Path::Root, None, &mut NullContent)?;
    write_geometry(&value, Path::Root, None, sink)
}

/// Decodes a GeoJSON `Feature` object and writes it into the sink.
pub fn decode_feature(text: &str, sink: &mut dyn FeatureContent) -> Result<(), GeostreamError> {
    let value: Value = serde_json::from_str(text)?;
    write_feature(&value, Path::Root, &mut NullContent)?;
    write_feature(&value, Path::Root, sink)
}

/// Decodes a GeoJSON `FeatureCollection` object and writes it into the sink.
pub fn decode_feature_collection(
    text: &str,
    sink: &mut dyn FeatureContent,
) -> Result<(), GeostreamError> {
    let value: Value = serde_json::from_str(text)?;
    write_feature_collection(&value, Path::Root, &mut NullContent)?;
    write_feature_collection(&value, Path::Root, sink)
}

/// Decodes any GeoJSON object, dispatching on its `type` member.
pub fn decode<S>(text: &str, sink: &mut S) -> Result<(), GeostreamError>
where
    S: FeatureContent + GeometryContent,
{
    let value: Value = serde_json::from_str(text)?;
    let path = Path::Root;
    match type_name(&value, path)? {
        "Feature" => {
            write_feature(&value, path, &mut NullContent)?;
            write_feature(&value, path, sink)
        }
        "FeatureCollection" => {
            write_feature_collection(&value, path, &mut NullContent)?;
            write_feature_collection(&value, path, sink)
        }
        _ => {
            write_geometry(&value, path, None, &mut NullContent)?;
            write_geometry(&value, path, None, sink)
        }
    }
}

fn as_object<'v>(
    value: &'v Value,
    path: Path<'_>,
) -> Result<&'v Map<String, Value>, GeostreamError> {
    value
        .as_object()
        .ok_or_else(|| path.error("expected an object"))
}

fn type_name<'v>(value: &'v Value, path: Path<'_>) -> Result<&'v str, GeostreamError> {
    as_object(value, path)?
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| path.error("missing `type` member"))
}

fn geometry_kind(name: &str) -> Option<GeomKind> {
    GeomKind::ALL.into_iter().find(|kind| kind.name() == name)
}

fn read_bbox(
    object: &Map<String, Value>,
    path: Path<'_>,
) -> Result<Option<BoundingBox>, GeostreamError> {
    let path = path.member("bbox");
    let values = match object.get("bbox") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(values)) => values,
        Some(_) => return Err(path.error("expected an array of numbers")),
    };

    let values = values
        .iter()
        .map(Value::as_f64)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| path.error("expected an array of numbers"))?;

    BoundingBox::from_values(&values, None)
        .map(Some)
        .map_err(|err| path.error(err.to_string()))
}

fn read_position(
    value: &Value,
    path: Path<'_>,
    dimensions: &mut Dimensions,
    out: &mut Vec<f64>,
) -> Result<(), GeostreamError> {
    let components = value
        .as_array()
        .ok_or_else(|| path.error("expected a position"))?;

    dimensions
        .accept(components.len())
        .map_err(|err| path.error(err.to_string()))?;

    for component in components {
        let component = component
            .as_f64()
            .ok_or_else(|| path.error("position components must be numbers"))?;
        out.push(component);
    }

    Ok(())
}

fn items<'v>(value: &'v Value, path: Path<'_>) -> Result<&'v [Value], GeostreamError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| path.error("expected an array"))
}

fn read_series(
    value: &Value,
    path: Path<'_>,
    dimensions: &mut Dimensions,
) -> Result<PositionSeries<'static>, GeostreamError> {
    let positions = items(value, path)?;
    let mut values = Vec::with_capacity(positions.len() * 3);
    for (index, position) in positions.iter().enumerate() {
        read_position(position, path.index(index), dimensions, &mut values)?;
    }

    dimensions
        .series(values)
        .map_err(|err| path.error(err.to_string()))
}

fn read_rings(
    value: &Value,
    path: Path<'_>,
    dimensions: &mut Dimensions,
) -> Result<Vec<PositionSeries<'static>>, GeostreamError> {
    items(value, path)?
        .iter()
        .enumerate()
        .map(|(index, ring)| read_series(ring, path.index(index), dimensions))
        .collect()
}

fn read_shape(
    kind: GeomKind,
    value: &Value,
    path: Path<'_>,
    dimensions: &mut Dimensions,
) -> Result<Shape, GeostreamError> {
    let shape = match kind {
        GeomKind::Point => {
            let mut values = Vec::with_capacity(4);
            read_position(value, path, dimensions, &mut values)?;
            let position = Position::from_values(&values, dimensions.coords())
                .map_err(|err| path.error(err.to_string()))?;
            Shape::Point(position)
        }
        GeomKind::LineString | GeomKind::MultiPoint => {
            Shape::Series(read_series(value, path, dimensions)?)
        }
        GeomKind::Polygon | GeomKind::MultiLineString => {
            Shape::Rings(read_rings(value, path, dimensions)?)
        }
        GeomKind::MultiPolygon => Shape::Polygons(
            items(value, path)?
                .iter()
                .enumerate()
                .map(|(index, polygon)| read_rings(polygon, path.index(index), dimensions))
                .collect::<Result<_, _>>()?,
        ),
        GeomKind::GeometryCollection => {
            return Err(path.error("geometry collection has no coordinates"))
        }
    };

    Ok(shape)
}

fn write_geometry(
    value: &Value,
    path: Path<'_>,
    name: Option<&str>,
    sink: &mut dyn GeometryContent,
) -> Result<(), GeostreamError> {
    let object = as_object(value, path)?;
    let type_name = type_name(value, path)?;
    let kind = geometry_kind(type_name)
        .ok_or_else(|| path.error(format!("unknown geometry type `{type_name}`")))?;
    let bounds = read_bbox(object, path)?;

    let known = match kind {
        GeomKind::GeometryCollection => GEOMETRY_COLLECTION_MEMBERS,
        _ => GEOMETRY_MEMBERS,
    };
    let foreign: PropertyMap = object
        .iter()
        .filter(|(name, _)| !known.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    let foreign = (!foreign.is_empty()).then_some(&foreign);

    if kind == GeomKind::GeometryCollection {
        let geometries_path = path.member("geometries");
        let geometries = object
            .get("geometries")
            .ok_or_else(|| path.error("missing `geometries` member"))
            .and_then(|value| items(value, geometries_path))?;

        if geometries.is_empty() {
            sink.empty_geometry(kind, name);
            return Ok(());
        }

        let mut header =
            CollectionHeader::with_count(geometries.len()).with_opt_bounds(bounds.as_ref());
        header.name = name;
        header.foreign = foreign;

        let mut result = Ok(());
        sink.geometry_collection(header, &mut |content| {
            for (index, geometry) in geometries.iter().enumerate() {
                result = write_geometry(geometry, geometries_path.index(index), None, content);
                if result.is_err() {
                    break;
                }
            }
        });

        return result;
    }

    let coordinates_path = path.member("coordinates");
    let coordinates = match object.get("coordinates") {
        Some(Value::Null) => None,
        Some(Value::Array(items)) if items.is_empty() => None,
        Some(value) => Some(value),
        None => return Err(path.error("missing `coordinates` member")),
    };

    let Some(coordinates) = coordinates else {
        sink.empty_geometry(kind, name);
        return Ok(());
    };

    let mut dimensions = Dimensions::default();
    let shape = read_shape(kind, coordinates, coordinates_path, &mut dimensions)?;

    let header = GeometryHeader {
        kind,
        coords: dimensions.coords(),
        name,
        bounds: bounds.as_ref(),
        foreign,
    };
    sink.geometry(header, &mut |content| shape.write(content));

    Ok(())
}

fn read_id(
    object: &Map<String, Value>,
    path: Path<'_>,
) -> Result<Option<FeatureId>, GeostreamError> {
    match object.get("id") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) => Ok(Some(FeatureId::Text(id.clone()))),
        Some(Value::Number(id)) => Ok(Some(
            id.as_i64()
                .map(FeatureId::Int)
                .unwrap_or_else(|| FeatureId::Text(id.to_string())),
        )),
        Some(_) => Err(path
            .member("id")
            .error("feature id must be a string or a number")),
    }
}

fn write_foreign_members<'v>(
    members: impl Iterator<Item = (&'v String, &'v Value)>,
    content: &mut dyn PropertyContent,
) {
    for (name, value) in members {
        match value {
            Value::Object(map) => content.properties(name, map),
            value => content.property(name, value),
        }
    }
}

fn write_feature(
    value: &Value,
    path: Path<'_>,
    sink: &mut dyn FeatureContent,
) -> Result<(), GeostreamError> {
    let object = as_object(value, path)?;
    let type_name = type_name(value, path)?;
    if type_name != "Feature" {
        return Err(path.error(format!("expected a Feature, found `{type_name}`")));
    }

    let id = read_id(object, path)?;
    let bounds = read_bbox(object, path)?;
    let geometry = object.get("geometry").filter(|value| !value.is_null());
    let properties: Option<&PropertyMap> = match object.get("properties") {
        None | Some(Value::Null) => None,
        Some(Value::Object(properties)) => Some(properties),
        Some(_) => {
            return Err(path
                .member("properties")
                .error("feature properties must be an object"))
        }
    };

    let foreign = || {
        object
            .iter()
            .filter(|(name, _)| !FEATURE_MEMBERS.contains(&name.as_str()))
    };
    let has_foreign = foreign().next().is_some();

    let header = FeatureHeader {
        id: id.as_ref(),
        properties,
        bounds: bounds.as_ref(),
    };

    let geometry_path = path.member("geometry");
    let mut result = Ok(());
    let mut write_primary = |content: &mut dyn GeometryContent| {
        if let Some(geometry) = geometry {
            result = write_geometry(geometry, geometry_path, None, content);
        }
    };
    let mut custom = |content: &mut dyn PropertyContent| write_foreign_members(foreign(), content);

    sink.feature(
        header,
        geometry
            .is_some()
            .then_some(&mut write_primary as &mut dyn FnMut(&mut dyn GeometryContent)),
        has_foreign.then_some(&mut custom as &mut dyn FnMut(&mut dyn PropertyContent)),
    );

    result
}

fn write_feature_collection(
    value: &Value,
    path: Path<'_>,
    sink: &mut dyn FeatureContent,
) -> Result<(), GeostreamError> {
    let object = as_object(value, path)?;
    let type_name = type_name(value, path)?;
    if type_name != "FeatureCollection" {
        return Err(path.error(format!("expected a FeatureCollection, found `{type_name}`")));
    }

    let bounds = read_bbox(object, path)?;
    let features_path = path.member("features");
    let features = object
        .get("features")
        .ok_or_else(|| path.error("missing `features` member"))
        .and_then(|value| items(value, features_path))?;

    let foreign = || {
        object
            .iter()
            .filter(|(name, _)| !COLLECTION_MEMBERS.contains(&name.as_str()))
    };
    let has_foreign = foreign().next().is_some();

    let header = CollectionHeader::with_count(features.len()).with_opt_bounds(bounds.as_ref());
    let mut result = Ok(());
    let mut custom = |content: &mut dyn PropertyContent| write_foreign_members(foreign(), content);

    sink.feature_collection(
        header,
        &mut |content| {
            for (index, feature) in features.iter().enumerate() {
                result = write_feature(feature, features_path.index(index), content);
                if result.is_err() {
                    break;
                }
            }
        },
        has_foreign.then_some(&mut custom as &mut dyn FnMut(&mut dyn PropertyContent)),
    );

    result
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use geostream_types::Coords;
    use insta::assert_snapshot;

    use super::*;
    use crate::geojson::GeoJsonWriter;
    use crate::options::TextWriterOptions;

    fn transcode(text: &str) -> String {
        let mut writer = GeoJsonWriter::new(TextWriterOptions::default());
        decode(text, &mut writer).unwrap();
        writer.into_string()
    }

    #[test]
    fn geometries_round_trip() {
        let inputs = [
            r#"{"type":"Point","coordinates":[1.5,-2]}"#,
            r#"{"type":"LineString","coordinates":[[1,2,3],[4,5,6]]}"#,
            r#"{"type":"Polygon","bbox":[0,0,1,1],"coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}"#,
            r#"{"type":"MultiPoint","coordinates":[[1,2,3,4]]}"#,
            r#"{"type":"MultiLineString","coordinates":[[[1,2],[3,4]],[[5,6],[7,8]]]}"#,
            r#"{"type":"MultiPolygon","coordinates":[[[[0,0],[1,0],[0,0]]],[[[5,5],[6,5],[5,5]]]]}"#,
            r#"{"type":"GeometryCollection","geometries":[{"type":"Point","coordinates":[1,2]},{"type":"Point","coordinates":[]}]}"#,
            r#"{"type":"Point","coordinates":[]}"#,
        ];

        for input in inputs {
            assert_eq!(transcode(input), input);
        }
    }

    #[test]
    fn member_order_is_normalized() {
        let text = r#"{"coordinates":[1,2],"bbox":[1,2,1,2],"type":"Point"}"#;
        assert_snapshot!(transcode(text), @r#"{"type":"Point","bbox":[1,2,1,2],"coordinates":[1,2]}"#);
    }

    #[test]
    fn three_components_are_3d() {
        let mut header_coords = None;
        let mut recorder = crate::builder::GeometryBuilder::new(|geometry| {
            header_coords = geometry.coords();
        });
        decode_geometry(r#"{"type":"Point","coordinates":[1,2,3]}"#, &mut recorder).unwrap();
        drop(recorder);

        assert_eq!(header_coords, Some(Coords::Xyz));
    }

    #[test]
    fn feature_with_foreign_members() {
        let text = r#"{"type":"Feature","id":12,"geometry":null,"properties":{"name":"a","nested":{"list":[1,2.5,null]}},"title":"x","extra":{"k":true}}"#;
        assert_eq!(transcode(text), text);
    }

    #[test]
    fn geometry_foreign_members() {
        let inputs = [
            r#"{"type":"Point","coordinates":[1,2],"title":"x"}"#,
            r#"{"type":"LineString","bbox":[1,2,3,4],"coordinates":[[1,2],[3,4]],"style":{"width":2},"id":null}"#,
            r#"{"type":"GeometryCollection","geometries":[{"type":"Point","coordinates":[1,2],"n":1}],"source":"survey"}"#,
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[1,2],"title":"x"},"properties":{}}"#,
        ];
        for input in inputs {
            assert_eq!(transcode(input), input);
        }

        let mut writer =
            GeoJsonWriter::new(TextWriterOptions::default().with_ignore_foreign_members(true));
        decode(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[1,2],"title":"x"},"properties":{}}"#,
            &mut writer,
        )
        .unwrap();
        assert_snapshot!(writer.as_str(), @r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]},"properties":{}}"#);

        let mut writer = crate::wkt::WktWriter::default();
        decode_geometry(r#"{"type":"Point","coordinates":[1,2],"title":"x"}"#, &mut writer).unwrap();
        assert_snapshot!(writer.as_str(), @"POINT(1 2)");
    }

    #[test]
    fn feature_ids() {
        let text = r#"{"type":"Feature","id":1.5,"geometry":null,"properties":null}"#;
        assert_snapshot!(transcode(text), @r#"{"type":"Feature","id":"1.5","geometry":null,"properties":{}}"#);

        let err = decode(r#"{"type":"Feature","id":[1],"geometry":null}"#, &mut NullContent);
        assert_matches!(err, Err(GeostreamError::GeoJson { path, .. }) if path == "$.id");
    }

    #[test]
    fn feature_collection() {
        let text = r#"{"type":"FeatureCollection","bbox":[-1.1,-3.49,10.123,20.25],"features":[{"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]},"properties":{}},{"type":"Feature","geometry":null,"properties":{"a":1}}],"name":"c"}"#;
        assert_eq!(transcode(text), text);
    }

    #[test]
    fn inconsistent_dimensions() {
        let err = decode_geometry(
            r#"{"type":"LineString","coordinates":[[1,2],[3,4,5]]}"#,
            &mut NullContent,
        );
        assert_matches!(err, Err(GeostreamError::GeoJson { path, .. }) if path == "$.coordinates[1]");
    }

    #[test]
    fn invalid_documents() {
        assert_matches!(decode_geometry("{", &mut NullContent), Err(GeostreamError::Json(_)));
        assert_matches!(
            decode_geometry(r#"{"type":"Circle","coordinates":[1,2]}"#, &mut NullContent),
            Err(GeostreamError::GeoJson { path, .. }) if path == "$"
        );
        assert_matches!(
            decode_geometry(r#"{"type":"Point","coordinates":[1,"2"]}"#, &mut NullContent),
            Err(GeostreamError::GeoJson { path, .. }) if path == "$.coordinates"
        );
        assert_matches!(
            decode_geometry(r#"{"type":"Point","coordinates":[1]}"#, &mut NullContent),
            Err(GeostreamError::GeoJson { .. })
        );
        assert_matches!(
            decode_feature_collection(
                r#"{"type":"FeatureCollection","features":[{"type":"Point","coordinates":[1,2]}]}"#,
                &mut NullContent
            ),
            Err(GeostreamError::GeoJson { path, .. }) if path == "$.features[0]"
        );
        assert_matches!(
            decode_feature(r#"{"type":"FeatureCollection","features":[]}"#, &mut NullContent),
            Err(GeostreamError::GeoJson { .. })
        );
    }

    #[test]
    fn failed_decode_leaves_sink_untouched() {
        let text = r#"{"type":"GeometryCollection","geometries":[{"type":"Point","coordinates":[1,2]},{"type":"Point"}]}"#;
        let mut writer = GeoJsonWriter::default();
        assert!(decode_geometry(text, &mut writer).is_err());
        assert_eq!(writer.as_str(), "");
    }
}
