use geostream_types::Coords;

/// Kind of construct a text writer is currently nested in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Container {
    /// Top level of the output.
    Root,
    /// Array of geometries or features.
    ObjectArray,
    /// Array of positions or of nested position arrays.
    CoordArray,
    /// Coordinates of a single geometry.
    Geometry,
    /// Members of a feature.
    Feature,
    /// Members of a feature collection.
    FeatureCollection,
    /// Members of a property map.
    PropertyMap,
    /// Items of a property array.
    PropertyArray,
}

#[derive(Debug)]
struct Frame {
    container: Container,
    has_item: bool,
}

impl Frame {
    fn new(container: Container) -> Self {
        Self {
            container,
            has_item: false,
        }
    }
}

/// Stack of nesting frames shared by the text writers.
///
/// The root frame is never popped. The dimensionality tag is tracked only for geometry frames,
/// every other frame inherits the tag of the innermost open geometry.
#[derive(Debug)]
pub(crate) struct ContainerStack {
    frames: Vec<Frame>,
    coords: Vec<Option<Coords>>,
}

impl Default for ContainerStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerStack {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new(Container::Root)],
            coords: Vec::new(),
        }
    }

    /// Container of the innermost frame.
    pub fn current(&self) -> Container {
        self.frames
            .last()
            .map(|frame| frame.container)
            .unwrap_or(Container::Root)
    }

    pub fn is_root(&self) -> bool {
        self.frames.len() == 1
    }

    pub fn push(&mut self, container: Container) {
        debug_assert!(
            container != Container::Root,
            "root frame cannot be pushed"
        );
        debug_assert!(
            container != Container::Geometry,
            "geometry frames are pushed with push_geometry"
        );
        self.frames.push(Frame::new(container));
    }

    pub fn push_geometry(&mut self, coords: Option<Coords>) {
        self.frames.push(Frame::new(Container::Geometry));
        self.coords.push(coords);
    }

    /// Closes the innermost frame and returns its container kind. Popping the root frame is a
    /// contract violation and leaves the stack unchanged.
    pub fn pop(&mut self) -> Container {
        if self.frames.len() == 1 {
            debug_assert!(false, "root frame cannot be popped");
            return Container::Root;
        }

        let container = self.current();
        self.frames.pop();
        if container == Container::Geometry {
            self.coords.pop();
        }

        container
    }

    /// Closes the innermost frame of the given kind. Frames left open above it are a contract
    /// violation and are closed as well.
    pub fn close(&mut self, container: Container) {
        debug_assert_eq!(self.current(), container, "unbalanced nesting");
        while !self.is_root() {
            if self.pop() == container {
                return;
            }
        }
    }

    /// Registers a new item in the innermost frame. Returns true if a separator must be written
    /// before the item.
    pub fn start_item(&mut self) -> bool {
        match self.frames.last_mut() {
            Some(frame) => std::mem::replace(&mut frame.has_item, true),
            None => false,
        }
    }

    /// Returns true if the innermost frame already has items.
    pub fn has_item(&self) -> bool {
        self.frames.last().is_some_and(|frame| frame.has_item)
    }

    /// Dimensionality tag of the innermost open geometry.
    pub fn coords(&self) -> Option<Coords> {
        self.coords.last().copied().flatten()
    }

    /// Sets the dimensionality tag of the innermost open geometry, if it does not have one yet.
    pub fn infer_coords(&mut self, coords: Coords) {
        if let Some(slot @ None) = self.coords.last_mut() {
            *slot = Some(coords);
        }
    }

    /// Drops all frames except a fresh root frame.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.frames.push(Frame::new(Container::Root));
        self.coords.clear();
    }
}
