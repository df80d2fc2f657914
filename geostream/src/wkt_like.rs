//! Untagged coordinate text, either in a JSON-like or in a WKT-like notation.

use geostream_types::{
    BoundingBox, CollectionHeader, CoordinateContent, GeomKind, GeometryContent, GeometryHeader,
    Position, WriteGeometry,
};
use serde::{Deserialize, Serialize};

use crate::options::TextWriterOptions;
use crate::text::{Container, TextSink};

/// Notation used by [`WktLikeWriter`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WktLikeStyle {
    /// Components separated by commas, arrays in square brackets: `[1,2],[3,4]`.
    #[default]
    Default,
    /// Components separated by spaces, arrays in parentheses: `1 2,3 4`.
    WktLike,
}

impl WktLikeStyle {
    fn component_separator(&self) -> &'static str {
        match self {
            WktLikeStyle::Default => ",",
            WktLikeStyle::WktLike => " ",
        }
    }

    fn open(&self) -> char {
        match self {
            WktLikeStyle::Default => '[',
            WktLikeStyle::WktLike => '(',
        }
    }

    fn close(&self) -> char {
        match self {
            WktLikeStyle::Default => ']',
            WktLikeStyle::WktLike => ')',
        }
    }

    /// With comma separated components, positions inside arrays need their own brackets.
    fn brackets_positions(&self) -> bool {
        *self == WktLikeStyle::Default
    }
}

/// Encoder of bare coordinates without geometry tags.
///
/// The outermost level of a geometry written at the top level is not wrapped in brackets, so a
/// point is written as `1,2` and a line string as `[1,2],[3,4]` (or `1 2` and `1 2,3 4` in the
/// [`WktLikeStyle::WktLike`] notation). Members of geometry collections are wrapped. Empty
/// geometries produce no output.
#[derive(Debug)]
pub struct WktLikeWriter {
    sink: TextSink,
    style: WktLikeStyle,
    bracketed_arrays: Vec<bool>,
}

impl Default for WktLikeWriter {
    fn default() -> Self {
        Self::new(WktLikeStyle::default(), TextWriterOptions::default())
    }
}

impl WktLikeWriter {
    /// Creates a writer with an empty output.
    pub fn new(style: WktLikeStyle, options: TextWriterOptions) -> Self {
        Self::with_buffer(style, options, String::new())
    }

    /// Creates a writer appending to the given buffer.
    pub fn with_buffer(style: WktLikeStyle, options: TextWriterOptions, buffer: String) -> Self {
        Self {
            sink: TextSink::new(options, buffer),
            style,
            bracketed_arrays: Vec::new(),
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
        self.bracketed_arrays.clear();
    }

    /// Writes the separator before a geometry and returns whether the geometry must be wrapped.
    fn begin_geometry(&mut self) -> Option<bool> {
        match self.sink.stack.current() {
            Container::Root => {
                self.sink.separator(",");
                Some(false)
            }
            Container::ObjectArray => {
                self.sink.separator(",");
                Some(true)
            }
            other => {
                debug_assert!(false, "geometry cannot be written inside {other:?}");
                None
            }
        }
    }

    fn bracketed_position(&mut self, position: &Position, bracketed: bool) {
        let coords = self.sink.output_coords(position.coords());
        if bracketed {
            self.sink.push(self.style.open());
        }
        self.sink
            .position_values(position, coords, self.style.component_separator());
        if bracketed {
            self.sink.push(self.style.close());
        }
    }
}

impl CoordinateContent for WktLikeWriter {
    fn position(&mut self, position: &Position) {
        self.sink.stack.infer_coords(position.coords());
        self.sink.separator(",");

        let bracketed = self.sink.stack.current() == Container::CoordArray
            && self.style.brackets_positions();
        self.bracketed_position(position, bracketed);
    }

    fn bounding_box(&mut self, bbox: &BoundingBox) {
        self.sink.separator(",");
        self.bracketed_position(&bbox.min, true);
        self.sink.push(',');
        self.bracketed_position(&bbox.max, true);
    }

    fn position_array_begin(&mut self, _count: Option<usize>) {
        self.sink.separator(",");

        let bracketed = self.sink.stack.current() == Container::CoordArray;
        if bracketed {
            self.sink.push(self.style.open());
        }
        self.bracketed_arrays.push(bracketed);
        self.sink.stack.push(Container::CoordArray);
    }

    fn position_array_end(&mut self) {
        if self.sink.stack.current() != Container::CoordArray {
            debug_assert!(false, "position array end without a matching begin");
            return;
        }

        self.sink.stack.pop();
        if self.bracketed_arrays.pop() == Some(true) {
            self.sink.push(self.style.close());
        }
    }
}

impl GeometryContent for WktLikeWriter {
    fn geometry(
        &mut self,
        header: GeometryHeader<'_>,
        coordinates: &mut dyn FnMut(&mut dyn CoordinateContent),
    ) {
        let Some(wrapped) = self.begin_geometry() else {
            return;
        };

        if wrapped {
            self.sink.push(self.style.open());
        }

        self.sink.stack.push_geometry(header.coords);
        coordinates(self);
        self.sink.stack.close(Container::Geometry);

        if wrapped {
            self.sink.push(self.style.close());
        }
    }

    fn geometry_collection(
        &mut self,
        _header: CollectionHeader<'_>,
        geometries: &mut dyn FnMut(&mut dyn GeometryContent),
    ) {
        let Some(wrapped) = self.begin_geometry() else {
            return;
        };

        if wrapped {
            self.sink.push(self.style.open());
        }

        self.sink.stack.push(Container::ObjectArray);
        geometries(self);
        self.sink.stack.close(Container::ObjectArray);

        if wrapped {
            self.sink.push(self.style.close());
        }
    }

    fn empty_geometry(&mut self, kind: GeomKind, _name: Option<&str>) {
        log::trace!("Empty {kind} has no untagged representation");
    }
}

/// Writes the geometry as untagged coordinate text.
pub fn to_wkt_like(
    geometry: &(impl WriteGeometry + ?Sized),
    style: WktLikeStyle,
    options: TextWriterOptions,
) -> String {
    let mut writer = WktLikeWriter::new(style, options);
    geometry.write_geometry(&mut writer);
    writer.into_string()
}
