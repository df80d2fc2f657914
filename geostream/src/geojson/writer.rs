use geostream_types::{
    BoundingBox, CollectionHeader, CoordinateContent, Coords, FeatureContent, FeatureHeader,
    FeatureId, GeomKind, GeometryContent, GeometryHeader, Position, PropertyContent, PropertyMap,
    Value,
};

use crate::options::TextWriterOptions;
use crate::text::{Container, TextSink};

/// Member name of the primary geometry of a feature.
const PRIMARY_GEOMETRY: &str = "geometry";

/// GeoJSON encoder.
///
/// Implements all content traits and writes the content into a string. Members are written in
/// a fixed order: `type`, `id`, `bbox`, then `coordinates`, `geometries`, `features` or
/// `geometry` with `properties`, and then foreign members.
///
/// Positions with a measure but without `z` are written with a `0` placeholder in the third slot,
/// so the measure is always the fourth value.
#[derive(Debug)]
pub struct GeoJsonWriter {
    sink: TextSink,
    primary_written: bool,
}

impl Default for GeoJsonWriter {
    fn default() -> Self {
        Self::new(TextWriterOptions::default())
    }
}

impl GeoJsonWriter {
    /// Creates a writer with an empty output.
    pub fn new(options: TextWriterOptions) -> Self {
        Self::with_buffer(options, String::new())
    }

    /// Creates a writer appending to the given buffer.
    pub fn with_buffer(options: TextWriterOptions, buffer: String) -> Self {
        Self {
            sink: TextSink::new(options, buffer).with_json_numbers(),
            primary_written: false,
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

    /// Clears the output and all nesting state, so the writer can be reused after an aborted
    /// write.
    pub fn reset(&mut self) {
        self.sink.reset();
        self.primary_written = false;
    }

    fn is_primary_slot(&self, name: Option<&str>) -> bool {
        self.sink.stack.current() == Container::Feature
            && name.is_none_or(|name| name == PRIMARY_GEOMETRY)
    }

    /// Writes whatever must precede a geometry object in the current container. Returns false if
    /// the geometry must not be written.
    fn begin_geometry(&mut self, name: Option<&str>) -> bool {
        match self.sink.stack.current() {
            Container::Feature if self.is_primary_slot(name) => {
                if self.primary_written {
                    log::warn!("Feature already has a primary geometry, skipping the next one");
                    return false;
                }

                self.primary_written = true;
                self.sink.separator(",");
                self.sink.json_key(PRIMARY_GEOMETRY);
            }
            Container::Feature => {
                let name = name.unwrap_or(PRIMARY_GEOMETRY);
                if self.sink.options().ignore_foreign_members {
                    log::debug!("Skipping foreign geometry member '{name}'");
                    return false;
                }

                self.sink.separator(",");
                self.sink.json_key(name);
            }
            Container::Root | Container::ObjectArray => self.sink.separator(","),
            other => {
                debug_assert!(false, "geometry cannot be written inside {other:?}");
                return false;
            }
        }

        true
    }

    fn object_head(&mut self, type_name: &str, bounds: Option<&BoundingBox>) {
        self.sink.push_str("{\"type\":");
        self.sink.json_string(type_name);
        if let Some(bounds) = bounds {
            self.sink.push_str(",\"bbox\":");
            self.bbox_array(bounds);
        }
    }

    /// Writes the foreign members of a geometry object before its closing brace.
    fn geometry_foreign_members(&mut self, members: Option<&PropertyMap>) {
        let Some(members) = members else { return };
        if self.sink.options().ignore_foreign_members {
            log::debug!("Skipping {} foreign members of a geometry", members.len());
            return;
        }

        for (name, value) in members {
            self.sink.push(',');
            self.sink.json_key(name);
            self.sink.json_value(value);
        }
    }

    fn bbox_array(&mut self, bbox: &BoundingBox) {
        let coords = if bbox.coords().is_3d() {
            Coords::Xyz
        } else {
            Coords::Xy
        };

        self.sink.push('[');
        self.sink.numbers(&bbox.values(coords), ",");
        self.sink.push(']');
    }

    fn begin_feature_object(&mut self) -> bool {
        match self.sink.stack.current() {
            Container::Root | Container::ObjectArray => {
                self.sink.separator(",");
                true
            }
            other => {
                debug_assert!(false, "feature cannot be written inside {other:?}");
                false
            }
        }
    }

    fn foreign_member_allowed(&self, name: &str) -> bool {
        let foreign = matches!(
            self.sink.stack.current(),
            Container::Feature | Container::FeatureCollection
        );
        if foreign && self.sink.options().ignore_foreign_members {
            log::debug!("Skipping foreign member '{name}'");
            return false;
        }

        true
    }
}

impl CoordinateContent for GeoJsonWriter {
    fn position(&mut self, position: &Position) {
        self.sink.stack.infer_coords(position.coords());
        let coords = match self.sink.output_coords(position.coords()) {
            Coords::Xym => Coords::Xyzm,
            coords => coords,
        };

        self.sink.separator(",");
        self.sink.push('[');
        self.sink.position_values(position, coords, ",");
        self.sink.push(']');
    }

    fn bounding_box(&mut self, bbox: &BoundingBox) {
        self.sink.separator(",");
        self.bbox_array(bbox);
    }

    fn position_array_begin(&mut self, _count: Option<usize>) {
        self.sink.separator(",");
        self.sink.push('[');
        self.sink.stack.push(Container::CoordArray);
    }

    fn position_array_end(&mut self) {
        if self.sink.stack.current() != Container::CoordArray {
            debug_assert!(false, "position array end without a matching begin");
            return;
        }

        self.sink.stack.pop();
        self.sink.push(']');
    }
}

impl GeometryContent for GeoJsonWriter {
    fn geometry(
        &mut self,
        header: GeometryHeader<'_>,
        coordinates: &mut dyn FnMut(&mut dyn CoordinateContent),
    ) {
        if header.kind == GeomKind::GeometryCollection {
            debug_assert!(false, "geometry collections are written with geometry_collection");
            return;
        }

        if !self.begin_geometry(header.name) {
            return;
        }

        self.object_head(header.kind.name(), header.bounds);
        self.sink.push_str(",\"coordinates\":");

        self.sink.stack.push_geometry(header.coords);
        coordinates(self);
        if !self.sink.stack.has_item() {
            self.sink.push_str("[]");
        }
        self.sink.stack.close(Container::Geometry);

        self.geometry_foreign_members(header.foreign);
        self.sink.push('}');
    }

    fn geometry_collection(
        &mut self,
        header: CollectionHeader<'_>,
        geometries: &mut dyn FnMut(&mut dyn GeometryContent),
    ) {
        if !self.begin_geometry(header.name) {
            return;
        }

        self.object_head(GeomKind::GeometryCollection.name(), header.bounds);
        self.sink.push_str(",\"geometries\":[");

        self.sink.stack.push(Container::ObjectArray);
        geometries(self);
        self.sink.stack.close(Container::ObjectArray);

        self.sink.push(']');
        self.geometry_foreign_members(header.foreign);
        self.sink.push('}');
    }

    fn empty_geometry(&mut self, kind: GeomKind, name: Option<&str>) {
        if self.is_primary_slot(name) && !self.primary_written {
            self.primary_written = true;
            self.sink.separator(",");
            self.sink.json_key(PRIMARY_GEOMETRY);
            self.sink.push_str("null");
            return;
        }

        if !self.begin_geometry(name) {
            return;
        }

        self.object_head(kind.name(), None);
        match kind {
            GeomKind::GeometryCollection => self.sink.push_str(",\"geometries\":[]}"),
            _ => self.sink.push_str(",\"coordinates\":[]}"),
        }
    }
}

impl PropertyContent for GeoJsonWriter {
    fn property(&mut self, name: &str, value: &Value) {
        if !self.foreign_member_allowed(name) {
            return;
        }

        self.sink.separator(",");
        self.sink.json_key(name);
        self.sink.json_value(value);
    }

    fn properties(&mut self, name: &str, map: &PropertyMap) {
        if !self.foreign_member_allowed(name) {
            return;
        }

        self.sink.separator(",");
        self.sink.json_key(name);
        self.sink.json_map(map);
    }
}

impl FeatureContent for GeoJsonWriter {
    fn feature(
        &mut self,
        header: FeatureHeader<'_>,
        geometry: Option<&mut dyn FnMut(&mut dyn GeometryContent)>,
        custom: Option<&mut dyn FnMut(&mut dyn PropertyContent)>,
    ) {
        if !self.begin_feature_object() {
            return;
        }

        self.object_head("Feature", None);
        match header.id {
            Some(FeatureId::Int(id)) => {
                self.sink.push_str(",\"id\":");
                self.sink.json_value(&Value::from(*id));
            }
            Some(FeatureId::Text(id)) => {
                self.sink.push_str(",\"id\":");
                self.sink.json_string(id);
            }
            None => {}
        }
        if let Some(bounds) = header.bounds {
            self.sink.push_str(",\"bbox\":");
            self.bbox_array(bounds);
        }

        self.sink.stack.push(Container::Feature);
        self.sink.stack.start_item();
        self.primary_written = false;

        if let Some(geometry) = geometry {
            geometry(self);
        }
        if !self.primary_written {
            self.sink.separator(",");
            self.sink.json_key(PRIMARY_GEOMETRY);
            self.sink.push_str("null");
        }

        self.sink.separator(",");
        self.sink.json_key("properties");
        match header.properties {
            Some(properties) => self.sink.json_map(properties),
            None => self.sink.push_str("{}"),
        }

        if let Some(custom) = custom {
            custom(self);
        }

        self.primary_written = false;
        self.sink.stack.close(Container::Feature);
        self.sink.push('}');
    }

    fn feature_collection(
        &mut self,
        header: CollectionHeader<'_>,
        features: &mut dyn FnMut(&mut dyn FeatureContent),
        custom: Option<&mut dyn FnMut(&mut dyn PropertyContent)>,
    ) {
        if !self.begin_feature_object() {
            return;
        }

        self.object_head("FeatureCollection", header.bounds);
        self.sink.push_str(",\"features\":[");

        self.sink.stack.push(Container::ObjectArray);
        features(self);
        self.sink.stack.close(Container::ObjectArray);
        self.sink.push(']');

        if let Some(custom) = custom {
            self.sink.stack.push(Container::FeatureCollection);
            self.sink.stack.start_item();
            custom(self);
            self.sink.stack.close(Container::FeatureCollection);
        }

        self.sink.push('}');
    }
}
