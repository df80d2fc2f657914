//! Content sinks that build value objects.
//!
//! Builders are the counterpart of the `write_*` methods of [`Geometry`], [`Feature`] and
//! [`FeatureCollection`]: any decoder can be connected to a builder to get value objects instead
//! of encoded output.
//!
//! ```
//! use geostream::builder::GeometryBuilder;
//! use geostream::{wkt, GeomKind, Geometry};
//!
//! let mut points = Vec::new();
//! let mut builder = GeometryBuilder::new(|g| points.push(g)).with_filter(GeomKind::Point);
//! wkt::decode("GEOMETRYCOLLECTION(POINT(1 2),LINESTRING(0 0,1 1),POINT(3 4))", &mut builder)?;
//! assert_eq!(points.len(), 2);
//! # Ok::<(), geostream::GeostreamError>(())
//! ```

use geostream_types::{
    BoundingBox, CollectionHeader, CoordinateContent, Coords, Feature, FeatureCollection,
    FeatureContent, FeatureHeader, GeomKind, Geometry, GeometryContent, GeometryHeader, Position,
    PositionSeries, PropertyContent, PropertyMap, Value,
};

/// Member name of the primary geometry of a feature.
const PRIMARY_GEOMETRY: &str = "geometry";

/// Builds [`Geometry`] values and passes them to a closure.
///
/// With a filter set, only geometries of that kind are passed on, others are skipped. Geometry
/// collections are then treated as streams of their members, so a filtered builder picks matching
/// members out of collections.
pub struct GeometryBuilder<F>
where
    F: FnMut(Geometry),
{
    on_geometry: F,
    filter: Option<GeomKind>,
}

impl<F> GeometryBuilder<F>
where
    F: FnMut(Geometry),
{
    /// Creates a builder passing every geometry to `on_geometry`.
    pub fn new(on_geometry: F) -> Self {
        Self {
            on_geometry,
            filter: None,
        }
    }

    /// Only geometries of the given kind are built.
    pub fn with_filter(mut self, kind: GeomKind) -> Self {
        self.filter = Some(kind);
        self
    }

    fn accept(&mut self, geometry: Geometry) {
        match self.filter {
            Some(kind) if kind != geometry.kind() => {
                log::debug!("Skipping {}, expected {kind}", geometry.kind());
            }
            _ => (self.on_geometry)(geometry),
        }
    }
}

impl<F> GeometryContent for GeometryBuilder<F>
where
    F: FnMut(Geometry),
{
    fn geometry(
        &mut self,
        header: GeometryHeader<'_>,
        coordinates: &mut dyn FnMut(&mut dyn CoordinateContent),
    ) {
        if let Some(geometry) = build_geometry(&header, coordinates) {
            self.accept(geometry);
        }
    }

    fn geometry_collection(
        &mut self,
        header: CollectionHeader<'_>,
        geometries: &mut dyn FnMut(&mut dyn GeometryContent),
    ) {
        match self.filter {
            Some(kind) if kind != GeomKind::GeometryCollection => geometries(self),
            _ => {
                let collection = build_collection(&header, geometries);
                self.accept(collection);
            }
        }
    }

    fn empty_geometry(&mut self, kind: GeomKind, _name: Option<&str>) {
        self.accept(Geometry::Empty(kind));
    }
}

/// Builds [`Feature`] values and passes them to a closure.
///
/// Features of feature collections are passed on one by one, members of the collection itself
/// are dropped. With a filter set, only features with a primary geometry of that kind are passed
/// on.
pub struct FeatureBuilder<F>
where
    F: FnMut(Feature),
{
    on_feature: F,
    filter: Option<GeomKind>,
}

impl<F> FeatureBuilder<F>
where
    F: FnMut(Feature),
{
    /// Creates a builder passing every feature to `on_feature`.
    pub fn new(on_feature: F) -> Self {
        Self {
            on_feature,
            filter: None,
        }
    }

    /// Only features with a primary geometry of the given kind are built.
    pub fn with_filter(mut self, kind: GeomKind) -> Self {
        self.filter = Some(kind);
        self
    }
}

impl<F> FeatureContent for FeatureBuilder<F>
where
    F: FnMut(Feature),
{
    fn feature(
        &mut self,
        header: FeatureHeader<'_>,
        geometry: Option<&mut dyn FnMut(&mut dyn GeometryContent)>,
        custom: Option<&mut dyn FnMut(&mut dyn PropertyContent)>,
    ) {
        let feature = build_feature(&header, geometry, custom);
        if matches_filter(self.filter, &feature) {
            (self.on_feature)(feature);
        }
    }

    fn feature_collection(
        &mut self,
        _header: CollectionHeader<'_>,
        features: &mut dyn FnMut(&mut dyn FeatureContent),
        custom: Option<&mut dyn FnMut(&mut dyn PropertyContent)>,
    ) {
        features(self);
        if custom.is_some() {
            log::debug!("Dropping members of the feature collection");
        }
    }
}

/// Builds a [`FeatureCollection`].
///
/// Top level features are added to the collection as well, so the builder can collect features
/// from any feature content.
#[derive(Debug, Default)]
pub struct FeatureCollectionBuilder {
    collection: FeatureCollection,
    filter: Option<GeomKind>,
}

impl FeatureCollectionBuilder {
    /// Creates a builder with an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only features with a primary geometry of the given kind are added.
    pub fn with_filter(mut self, kind: GeomKind) -> Self {
        self.filter = Some(kind);
        self
    }

    /// Collection built so far.
    pub fn collection(&self) -> &FeatureCollection {
        &self.collection
    }

    /// Consumes the builder and returns the collection.
    pub fn into_collection(self) -> FeatureCollection {
        self.collection
    }
}

impl FeatureContent for FeatureCollectionBuilder {
    fn feature(
        &mut self,
        header: FeatureHeader<'_>,
        geometry: Option<&mut dyn FnMut(&mut dyn GeometryContent)>,
        custom: Option<&mut dyn FnMut(&mut dyn PropertyContent)>,
    ) {
        let feature = build_feature(&header, geometry, custom);
        if matches_filter(self.filter, &feature) {
            self.collection.features.push(feature);
        }
    }

    fn feature_collection(
        &mut self,
        header: CollectionHeader<'_>,
        features: &mut dyn FnMut(&mut dyn FeatureContent),
        custom: Option<&mut dyn FnMut(&mut dyn PropertyContent)>,
    ) {
        if let Some(count) = header.count {
            self.collection.features.reserve(count);
        }
        if let Some(bounds) = header.bounds {
            self.collection.bounds = Some(*bounds);
        }

        features(self);

        if let Some(custom) = custom {
            let mut members = PropertyCollector::default();
            custom(&mut members);
            self.collection.custom.extend(members.map);
        }
    }
}

fn matches_filter(filter: Option<GeomKind>, feature: &Feature) -> bool {
    let Some(kind) = filter else {
        return true;
    };

    let found = feature.geometry.as_ref().map(Geometry::kind);
    if found != Some(kind) {
        log::debug!("Skipping feature with {found:?} geometry, expected {kind}");
        return false;
    }

    true
}

fn build_feature(
    header: &FeatureHeader<'_>,
    geometry: Option<&mut dyn FnMut(&mut dyn GeometryContent)>,
    custom: Option<&mut dyn FnMut(&mut dyn PropertyContent)>,
) -> Feature {
    let mut primary = PrimaryGeometry::default();
    if let Some(geometry) = geometry {
        geometry(&mut primary);
    }

    let mut members = PropertyCollector::default();
    if let Some(custom) = custom {
        custom(&mut members);
    }

    Feature {
        id: header.id.cloned(),
        geometry: primary.geometry,
        properties: header.properties.cloned().unwrap_or_default(),
        bounds: header.bounds.copied(),
        custom: members.map,
    }
}

fn build_geometry(
    header: &GeometryHeader<'_>,
    coordinates: &mut dyn FnMut(&mut dyn CoordinateContent),
) -> Option<Geometry> {
    let mut collector = CoordinateCollector::default();
    coordinates(&mut collector);

    let geometry = collector.build(header.kind, header.coords);
    if geometry.is_none() {
        log::warn!(
            "Skipping {} with coordinates that do not match its shape",
            header.kind
        );
    }

    geometry
}

fn build_collection(
    header: &CollectionHeader<'_>,
    geometries: &mut dyn FnMut(&mut dyn GeometryContent),
) -> Geometry {
    let mut members = Vec::with_capacity(header.count.unwrap_or_default());
    geometries(&mut GeometryBuilder::new(|geometry| members.push(geometry)));

    if members.is_empty() {
        Geometry::Empty(GeomKind::GeometryCollection)
    } else {
        Geometry::GeometryCollection(members)
    }
}

/// Keeps the first unnamed geometry of a feature.
#[derive(Debug, Default)]
struct PrimaryGeometry {
    geometry: Option<Geometry>,
}

impl PrimaryGeometry {
    fn is_free_slot(&self, name: Option<&str>) -> bool {
        if name.is_some_and(|name| name != PRIMARY_GEOMETRY) {
            log::debug!("Skipping named geometry {name:?}");
            return false;
        }

        if self.geometry.is_some() {
            log::warn!("Feature already has a primary geometry, skipping the next one");
            return false;
        }

        true
    }
}

impl GeometryContent for PrimaryGeometry {
    fn geometry(
        &mut self,
        header: GeometryHeader<'_>,
        coordinates: &mut dyn FnMut(&mut dyn CoordinateContent),
    ) {
        if self.is_free_slot(header.name) {
            self.geometry = build_geometry(&header, coordinates);
        }
    }

    fn geometry_collection(
        &mut self,
        header: CollectionHeader<'_>,
        geometries: &mut dyn FnMut(&mut dyn GeometryContent),
    ) {
        if self.is_free_slot(header.name) {
            self.geometry = Some(build_collection(&header, geometries));
        }
    }

    fn empty_geometry(&mut self, kind: GeomKind, name: Option<&str>) {
        if self.is_free_slot(name) {
            self.geometry = Some(Geometry::Empty(kind));
        }
    }
}

#[derive(Debug, Default)]
struct PropertyCollector {
    map: PropertyMap,
}

impl PropertyContent for PropertyCollector {
    fn property(&mut self, name: &str, value: &Value) {
        self.map.insert(name.to_string(), value.clone());
    }

    fn properties(&mut self, name: &str, map: &PropertyMap) {
        self.map
            .insert(name.to_string(), Value::Object(map.clone()));
    }
}

#[derive(Debug)]
enum Node {
    Position(Position),
    Array(Vec<Node>),
}

impl Node {
    fn first_position(&self) -> Option<&Position> {
        match self {
            Node::Position(position) => Some(position),
            Node::Array(items) => items.iter().find_map(Node::first_position),
        }
    }
}

/// Records coordinate content as a tree of nested arrays.
#[derive(Debug, Default)]
struct CoordinateCollector {
    root: Vec<Node>,
    open: Vec<Vec<Node>>,
}

impl CoordinateCollector {
    fn current(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(items) => items,
            None => &mut self.root,
        }
    }

    /// Converts the collected coordinates into a geometry of the given kind. Returns `None` if
    /// the nesting does not match the kind.
    fn build(mut self, kind: GeomKind, coords: Option<Coords>) -> Option<Geometry> {
        if !self.open.is_empty() || self.root.len() > 1 {
            return None;
        }

        let Some(node) = self.root.pop() else {
            return Some(Geometry::Empty(kind));
        };
        let Some(first) = node.first_position() else {
            return Some(Geometry::Empty(kind));
        };
        let coords = coords.unwrap_or(first.coords());

        let geometry = match kind {
            GeomKind::Point => match node {
                Node::Position(position) => Geometry::Point(normalize(&position, coords)?),
                Node::Array(_) => return None,
            },
            GeomKind::LineString => Geometry::LineString(series(node, coords)?),
            GeomKind::MultiPoint => Geometry::MultiPoint(series(node, coords)?),
            GeomKind::Polygon => Geometry::Polygon(rings(node, coords)?),
            GeomKind::MultiLineString => Geometry::MultiLineString(rings(node, coords)?),
            GeomKind::MultiPolygon => Geometry::MultiPolygon(
                array(node)?
                    .into_iter()
                    .map(|polygon| rings(polygon, coords))
                    .collect::<Option<Vec<_>>>()?,
            ),
            GeomKind::GeometryCollection => return None,
        };

        Some(geometry)
    }
}

impl CoordinateContent for CoordinateCollector {
    fn position(&mut self, position: &Position) {
        self.current().push(Node::Position(*position));
    }

    fn bounding_box(&mut self, bbox: &BoundingBox) {
        let ring = bbox.corners_2d().into_iter().map(Node::Position).collect();
        self.current().push(Node::Array(ring));
    }

    fn position_array_begin(&mut self, count: Option<usize>) {
        self.open.push(Vec::with_capacity(count.unwrap_or_default()));
    }

    fn position_array_end(&mut self) {
        match self.open.pop() {
            Some(items) => self.current().push(Node::Array(items)),
            None => debug_assert!(false, "position array end without a matching begin"),
        }
    }
}

fn array(node: Node) -> Option<Vec<Node>> {
    match node {
        Node::Array(items) => Some(items),
        Node::Position(_) => None,
    }
}

fn normalize(position: &Position, coords: Coords) -> Option<Position> {
    let mut values = Vec::with_capacity(coords.dimension());
    position.write_values(coords, &mut values);
    Position::from_values(&values, Some(coords)).ok()
}

fn series(node: Node, coords: Coords) -> Option<PositionSeries<'static>> {
    let items = array(node)?;
    let mut values = Vec::with_capacity(items.len() * coords.dimension());
    for item in items {
        match item {
            Node::Position(position) => position.write_values(coords, &mut values),
            Node::Array(_) => return None,
        }
    }

    PositionSeries::from_values(values, coords).ok()
}

fn rings(node: Node, coords: Coords) -> Option<Vec<PositionSeries<'static>>> {
    array(node)?
        .into_iter()
        .map(|ring| series(ring, coords))
        .collect()
}

#[cfg(test)]
mod tests {
    use geostream_types::{FeatureId, WriteGeometry};
    use serde_json::json;

    use super::*;

    fn build(geometry: &impl WriteGeometry) -> Vec<Geometry> {
        let mut built = Vec::new();
        geometry.write_geometry(&mut GeometryBuilder::new(|g| built.push(g)));
        built
    }

    fn line(values: &[f64], coords: Coords) -> PositionSeries<'static> {
        PositionSeries::from_values(values.to_vec(), coords).unwrap()
    }

    #[test]
    fn geometries_are_rebuilt() {
        let ring = line(&[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0], Coords::Xy);
        let geometries = [
            Geometry::Point(Position::new_measured(1.0, 2.0, 3.0)),
            Geometry::LineString(line(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], Coords::Xyz)),
            Geometry::Polygon(vec![ring.clone(), ring.clone()]),
            Geometry::MultiPoint(line(&[1.0, 2.0], Coords::Xy)),
            Geometry::MultiLineString(vec![ring.clone()]),
            Geometry::MultiPolygon(vec![vec![ring.clone()], vec![ring]]),
            Geometry::GeometryCollection(vec![
                Geometry::Point(Position::new(1.0, 2.0)),
                Geometry::Empty(GeomKind::Polygon),
            ]),
            Geometry::Empty(GeomKind::LineString),
        ];

        for geometry in geometries {
            assert_eq!(build(&geometry), vec![geometry]);
        }
    }

    #[test]
    fn header_coords_normalize_positions() {
        let mut built = Vec::new();
        let mut builder = GeometryBuilder::new(|g| built.push(g));
        builder.geometry(
            GeometryHeader::new(GeomKind::LineString).with_coords(Coords::Xyz),
            &mut |c| {
                c.position_array_begin(Some(2));
                c.position(&Position::new(1.0, 2.0));
                c.position(&Position::new_3d_measured(3.0, 4.0, 5.0, 6.0));
                c.position_array_end();
            },
        );

        assert_eq!(
            built,
            vec![Geometry::LineString(line(
                &[1.0, 2.0, 0.0, 3.0, 4.0, 5.0],
                Coords::Xyz
            ))]
        );
    }

    #[test]
    fn mismatched_shape_is_skipped() {
        let mut built = Vec::new();
        let mut builder = GeometryBuilder::new(|g| built.push(g));
        builder.geometry(GeometryHeader::new(GeomKind::Polygon), &mut |c| {
            c.position_array_begin(None);
            c.position(&Position::new(1.0, 2.0));
            c.position_array_end();
        });
        builder.geometry(GeometryHeader::new(GeomKind::Point), &mut |c| {
            c.position_array_begin(None);
            c.position(&Position::new(1.0, 2.0));
            c.position_array_end();
        });
        builder.point(&Position::new(5.0, 6.0));

        assert_eq!(built, vec![Geometry::Point(Position::new(5.0, 6.0))]);
    }

    #[test]
    fn bounding_box_becomes_ring() {
        let mut built = Vec::new();
        let mut builder = GeometryBuilder::new(|g| built.push(g));
        builder.geometry(GeometryHeader::new(GeomKind::Polygon), &mut |c| {
            c.position_array_begin(Some(1));
            c.bounding_box(&BoundingBox::from_edges(0.0, 0.0, 2.0, 1.0));
            c.position_array_end();
        });

        assert_eq!(
            built,
            vec![Geometry::Polygon(vec![line(
                &[0.0, 0.0, 2.0, 0.0, 2.0, 1.0, 0.0, 1.0, 0.0, 0.0],
                Coords::Xy
            )])]
        );
    }

    #[test]
    fn filter_picks_collection_members() {
        let collection = Geometry::GeometryCollection(vec![
            Geometry::Point(Position::new(1.0, 2.0)),
            Geometry::LineString(line(&[0.0, 0.0, 1.0, 1.0], Coords::Xy)),
            Geometry::GeometryCollection(vec![Geometry::Point(Position::new(3.0, 4.0))]),
        ]);

        let mut points = Vec::new();
        collection.write_geometry(
            &mut GeometryBuilder::new(|g| points.push(g)).with_filter(GeomKind::Point),
        );
        assert_eq!(
            points,
            vec![
                Geometry::Point(Position::new(1.0, 2.0)),
                Geometry::Point(Position::new(3.0, 4.0))
            ]
        );

        let mut collections = Vec::new();
        collection.write_geometry(
            &mut GeometryBuilder::new(|g| collections.push(g))
                .with_filter(GeomKind::GeometryCollection),
        );
        assert_eq!(collections, vec![collection]);
    }

    #[test]
    fn features_are_rebuilt() {
        let mut feature = Feature::new(Geometry::Point(Position::new(1.0, 2.0)))
            .with_id("a")
            .with_property("name", "first")
            .with_bounds(BoundingBox::from_edges(1.0, 2.0, 1.0, 2.0));
        feature.custom.insert("extra".into(), json!({"k": [1, 2]}));

        let mut built = Vec::new();
        feature.write_to(&mut FeatureBuilder::new(|f| built.push(f)));
        assert_eq!(built, vec![feature]);
    }

    #[test]
    fn feature_filter() {
        let collection = FeatureCollection::new(vec![
            Feature::new(Geometry::Point(Position::new(1.0, 2.0))).with_id(1i64),
            Feature::new(Geometry::LineString(line(&[0.0, 0.0, 1.0, 1.0], Coords::Xy)))
                .with_id(2i64),
            Feature::default().with_id(3i64),
        ]);

        let mut ids = Vec::new();
        collection.write_to(
            &mut FeatureBuilder::new(|f| ids.push(f.id)).with_filter(GeomKind::LineString),
        );
        assert_eq!(ids, vec![Some(FeatureId::Int(2))]);

        let mut builder = FeatureCollectionBuilder::new().with_filter(GeomKind::Point);
        collection.write_to(&mut builder);
        assert_eq!(builder.collection().features.len(), 1);
    }

    #[test]
    fn feature_collection_is_rebuilt() {
        let mut collection = FeatureCollection::new(vec![
            Feature::new(Geometry::Point(Position::new(1.0, 2.0))),
            Feature::default().with_property("a", json!([true, null])),
        ])
        .with_bounds(BoundingBox::from_edges(-1.0, -1.0, 1.0, 1.0));
        collection.custom.insert("title".into(), json!("c"));

        let mut builder = FeatureCollectionBuilder::new();
        collection.write_to(&mut builder);
        assert_eq!(builder.into_collection(), collection);
    }

    #[test]
    fn only_primary_geometry_is_kept() {
        let mut built = Vec::new();
        let mut builder = FeatureBuilder::new(|f| built.push(f));
        builder.feature(
            FeatureHeader::default(),
            Some(&mut |g: &mut dyn GeometryContent| {
                g.geometry(
                    GeometryHeader::new(GeomKind::Point).with_name("label"),
                    &mut |c| c.position(&Position::new(0.0, 0.0)),
                );
                g.point(&Position::new(1.0, 1.0));
                g.point(&Position::new(2.0, 2.0));
            }),
            None,
        );

        assert_eq!(built.len(), 1);
        assert_eq!(
            built[0].geometry,
            Some(Geometry::Point(Position::new(1.0, 1.0)))
        );
    }
}
