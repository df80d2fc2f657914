use bytes::BufMut;
use geostream_types::{
    BoundingBox, CollectionHeader, CoordinateContent, Coords, GeomKind, GeometryContent,
    GeometryHeader, Position, WriteGeometry,
};

use crate::{type_code, Endian};

/// Options of [`WkbWriter`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct WkbOptions {
    /// Byte order of the output. Defaults to little endian.
    pub endian: Endian,
}

impl WkbOptions {
    /// Sets the byte order.
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }
}

/// Encodes the geometry into a new WKB buffer.
pub fn encode(geometry: &(impl WriteGeometry + ?Sized), options: WkbOptions) -> Vec<u8> {
    let mut writer = WkbWriter::new(options);
    geometry.write_geometry(&mut writer);
    writer.into_bytes()
}

/// Place of a 4-byte item count that is written after the items are known.
#[derive(Debug)]
struct CountSlot {
    offset: usize,
    count: u32,
}

#[derive(Debug)]
struct GeometryFrame {
    kind: GeomKind,
    coords: Option<Coords>,
    // Type codes written before the dimensionality was known.
    pending_codes: Vec<(usize, GeomKind)>,
    arrays: Vec<CountSlot>,
    has_position: bool,
}

/// [`GeometryContent`] sink writing geometries as WKB.
///
/// Item counts are written as placeholders and filled in when the corresponding array is closed,
/// so producers do not have to know the counts in advance. If a geometry header does not specify
/// the dimensionality, it is taken from the first position of the geometry.
///
/// Several geometries written into the same writer are concatenated.
#[derive(Debug, Default)]
pub struct WkbWriter {
    buffer: Vec<u8>,
    options: WkbOptions,
    collections: Vec<CountSlot>,
    geometry: Option<GeometryFrame>,
}

impl WkbWriter {
    /// Creates a new writer with an empty buffer.
    pub fn new(options: WkbOptions) -> Self {
        Self::with_buffer(options, Vec::new())
    }

    /// Creates a new writer appending to the given buffer.
    pub fn with_buffer(options: WkbOptions, buffer: Vec<u8>) -> Self {
        Self {
            buffer,
            options,
            collections: vec![],
            geometry: None,
        }
    }

    /// Bytes written so far.
    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the writer and returns the buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        debug_assert!(
            self.geometry.is_none() && self.collections.is_empty(),
            "WKB writer is consumed in the middle of a geometry"
        );
        self.buffer
    }

    /// Clears the buffer and the nesting state.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.collections.clear();
        self.geometry = None;
    }

    fn put_u32(&mut self, value: u32) {
        match self.options.endian {
            Endian::Big => self.buffer.put_u32(value),
            Endian::Little => self.buffer.put_u32_le(value),
        }
    }

    fn put_f64(&mut self, value: f64) {
        match self.options.endian {
            Endian::Big => self.buffer.put_f64(value),
            Endian::Little => self.buffer.put_f64_le(value),
        }
    }

    fn patch_u32(&mut self, offset: usize, value: u32) {
        let bytes = match self.options.endian {
            Endian::Big => value.to_be_bytes(),
            Endian::Little => value.to_le_bytes(),
        };
        self.buffer[offset..offset + 4].copy_from_slice(&bytes);
    }

    /// Writes byte order flag and type code, returns the offset of the type code.
    fn put_header(&mut self, kind: GeomKind, coords: Coords) -> usize {
        self.buffer.put_u8(self.options.endian.flag());
        let offset = self.buffer.len();
        self.put_u32(type_code(kind, coords));
        offset
    }

    fn begin_count(&mut self) -> CountSlot {
        let offset = self.buffer.len();
        self.put_u32(0);
        CountSlot { offset, count: 0 }
    }

    fn end_count(&mut self, slot: CountSlot) {
        self.patch_u32(slot.offset, slot.count);
    }

    fn count_item(&mut self) {
        match &mut self.geometry {
            Some(frame) => {
                if let Some(slot) = frame.arrays.last_mut() {
                    slot.count += 1;
                }
            }
            None => {
                if let Some(slot) = self.collections.last_mut() {
                    slot.count += 1;
                }
            }
        }
    }

    /// Writes a header of a part of the current geometry, deferring the type code if the
    /// dimensionality is not known yet.
    fn put_part_header(&mut self, kind: GeomKind) {
        let coords = self.geometry.as_ref().and_then(|frame| frame.coords);
        let offset = self.put_header(kind, coords.unwrap_or_default());
        if coords.is_none() {
            if let Some(frame) = &mut self.geometry {
                frame.pending_codes.push((offset, kind));
            }
        }
    }

    fn resolve_coords(&mut self, position: &Position) -> Coords {
        let Some(frame) = &mut self.geometry else {
            return position.coords();
        };

        if let Some(coords) = frame.coords {
            return coords;
        }

        let coords = position.coords();
        frame.coords = Some(coords);
        let pending = std::mem::take(&mut frame.pending_codes);
        for (offset, kind) in pending {
            self.patch_u32(offset, type_code(kind, coords));
        }

        coords
    }

    fn write_position(&mut self, position: &Position) {
        let Some(frame) = &self.geometry else {
            debug_assert!(false, "position written outside of a geometry");
            return;
        };

        let depth = frame.arrays.len();
        if frame.kind.array_depth() != Some(depth) {
            debug_assert!(
                false,
                "position at array depth {depth} in {} geometry",
                frame.kind
            );
            return;
        }

        if frame.kind == GeomKind::Point && frame.has_position {
            debug_assert!(false, "point geometry with more than one position");
            return;
        }

        let is_part = frame.kind == GeomKind::MultiPoint;
        let coords = self.resolve_coords(position);
        self.count_item();
        if is_part {
            self.put_part_header(GeomKind::Point);
        }

        let mut values = Vec::with_capacity(4);
        position.write_values(coords, &mut values);
        for value in values {
            self.put_f64(value);
        }

        if let Some(frame) = &mut self.geometry {
            frame.has_position = true;
        }
    }

    fn begin_array(&mut self) {
        let Some(frame) = &self.geometry else {
            debug_assert!(false, "position array opened outside of a geometry");
            return;
        };

        let depth = frame.arrays.len();
        let part_kind = match (frame.kind, depth) {
            (GeomKind::MultiLineString, 1) => Some(GeomKind::LineString),
            (GeomKind::MultiPolygon, 1) => Some(GeomKind::Polygon),
            _ => None,
        };

        self.count_item();
        if let Some(kind) = part_kind {
            self.put_part_header(kind);
        }

        let slot = self.begin_count();
        if let Some(frame) = &mut self.geometry {
            frame.arrays.push(slot);
        }
    }

    fn end_array(&mut self) {
        let slot = self.geometry.as_mut().and_then(|frame| frame.arrays.pop());
        match slot {
            Some(slot) => self.end_count(slot),
            None => debug_assert!(false, "position array end without matching begin"),
        }
    }

    fn write_box(&mut self, bbox: &BoundingBox) {
        let remaining = self.geometry.as_ref().and_then(|frame| {
            frame
                .kind
                .array_depth()
                .and_then(|depth| depth.checked_sub(frame.arrays.len()))
        });

        // A box is written as a polygon ring, wrapped into the rings array if needed.
        let wrap = match remaining {
            Some(1) => false,
            Some(2) => true,
            _ => {
                debug_assert!(false, "bounding box cannot be written at this level of WKB");
                return;
            }
        };

        if wrap {
            self.begin_array();
        }
        self.begin_array();
        for corner in bbox.corners_2d() {
            self.write_position(&corner);
        }
        self.end_array();
        if wrap {
            self.end_array();
        }
    }
}

/// Coordinate sink of a single geometry being written by [`WkbWriter`].
struct WkbCoordinates<'a>(&'a mut WkbWriter);

impl CoordinateContent for WkbCoordinates<'_> {
    fn position(&mut self, position: &Position) {
        self.0.write_position(position);
    }

    fn bounding_box(&mut self, bbox: &BoundingBox) {
        self.0.write_box(bbox);
    }

    fn position_array_begin(&mut self, _count: Option<usize>) {
        self.0.begin_array();
    }

    fn position_array_end(&mut self) {
        self.0.end_array();
    }
}

impl GeometryContent for WkbWriter {
    fn geometry(
        &mut self,
        header: GeometryHeader<'_>,
        coordinates: &mut dyn FnMut(&mut dyn CoordinateContent),
    ) {
        if header.kind == GeomKind::GeometryCollection {
            debug_assert!(false, "geometry collection must be written with geometry_collection");
            return;
        }

        if self.geometry.is_some() {
            debug_assert!(false, "geometry cannot be nested into another geometry");
            return;
        }

        self.count_item();
        let offset = self.put_header(header.kind, header.coords.unwrap_or_default());
        self.geometry = Some(GeometryFrame {
            kind: header.kind,
            coords: header.coords,
            pending_codes: if header.coords.is_none() {
                vec![(offset, header.kind)]
            } else {
                vec![]
            },
            arrays: vec![],
            has_position: false,
        });

        coordinates(&mut WkbCoordinates(self));

        if let Some(frame) = self.geometry.take() {
            debug_assert!(frame.arrays.is_empty(), "unclosed position array");
            if frame.kind == GeomKind::Point && !frame.has_position {
                // Point without coordinates is an empty point.
                let dimension = frame.coords.unwrap_or_default().dimension();
                for _ in 0..dimension {
                    self.put_f64(f64::NAN);
                }
            }
        }
    }

    fn geometry_collection(
        &mut self,
        _header: CollectionHeader<'_>,
        geometries: &mut dyn FnMut(&mut dyn GeometryContent),
    ) {
        if self.geometry.is_some() {
            debug_assert!(false, "geometry collection cannot be nested into a geometry");
            return;
        }

        self.count_item();
        self.put_header(GeomKind::GeometryCollection, Coords::Xy);
        let slot = self.begin_count();
        self.collections.push(slot);

        geometries(self);

        if let Some(slot) = self.collections.pop() {
            self.end_count(slot);
        }
    }

    fn empty_geometry(&mut self, kind: GeomKind, _name: Option<&str>) {
        if self.geometry.is_some() {
            debug_assert!(false, "empty geometry cannot be nested into a geometry");
            return;
        }

        self.count_item();
        self.put_header(kind, Coords::Xy);
        if kind == GeomKind::Point {
            self.put_f64(f64::NAN);
            self.put_f64(f64::NAN);
        } else {
            self.put_u32(0);
        }
    }
}
