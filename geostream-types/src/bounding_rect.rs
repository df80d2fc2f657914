use serde::{Deserialize, Serialize};

use crate::coords::Coords;
use crate::error::GeoTypesError;
use crate::point::Position;

/// Bounding box given by its minimum and maximum positions.
///
/// The box is not normalized: `min` components are not required to be less than `max`
/// components, so degenerate boxes and boxes crossing the antimeridian can be represented.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum (south-west) corner.
    pub min: Position,
    /// Maximum (north-east) corner.
    pub max: Position,
}

impl BoundingBox {
    /// Creates a new box from two corners.
    pub fn new(min: Position, max: Position) -> Self {
        Self { min, max }
    }

    /// Creates a 2d box from its edges.
    pub fn from_edges(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self::new(Position::new(west, south), Position::new(east, north))
    }

    /// Creates a box from a flat list of `4`, `6` or `8` values: all components of the minimum
    /// position followed by all components of the maximum position.
    pub fn from_values(values: &[f64], coords: Option<Coords>) -> Result<Self, GeoTypesError> {
        if values.len() % 2 != 0 {
            return Err(GeoTypesError::ComponentCount(values.len()));
        }

        let half = values.len() / 2;
        let min = Position::from_values(&values[..half], coords)?;
        let max = Position::from_values(&values[half..], coords)?;

        Ok(Self { min, max })
    }

    /// Smallest box containing all the positions, or `None` if the iterator is empty.
    pub fn from_positions(positions: impl IntoIterator<Item = Position>) -> Option<Self> {
        let mut positions = positions.into_iter();
        let first = positions.next()?;
        let mut bbox = Self::new(first, first);

        for p in positions {
            bbox.min.x = bbox.min.x.min(p.x);
            bbox.min.y = bbox.min.y.min(p.y);
            bbox.max.x = bbox.max.x.max(p.x);
            bbox.max.y = bbox.max.y.max(p.y);
            bbox.min.z = merge_opt(bbox.min.z, p.z, f64::min);
            bbox.max.z = merge_opt(bbox.max.z, p.z, f64::max);
            bbox.min.m = merge_opt(bbox.min.m, p.m, f64::min);
            bbox.max.m = merge_opt(bbox.max.m, p.m, f64::max);
        }

        Some(bbox)
    }

    /// Dimensionality of the box, taken from the minimum corner.
    pub fn coords(&self) -> Coords {
        self.min.coords()
    }

    /// Flat list of values: minimum components followed by maximum components.
    pub fn values(&self, coords: Coords) -> Vec<f64> {
        let mut values = Vec::with_capacity(coords.dimension() * 2);
        self.min.write_values(coords, &mut values);
        self.max.write_values(coords, &mut values);
        values
    }

    /// Minimum x.
    pub fn west(&self) -> f64 {
        self.min.x
    }

    /// Minimum y.
    pub fn south(&self) -> f64 {
        self.min.y
    }

    /// Maximum x.
    pub fn east(&self) -> f64 {
        self.max.x
    }

    /// Maximum y.
    pub fn north(&self) -> f64 {
        self.max.y
    }

    /// Closed ring of the 2d corners of the box, counter-clockwise starting from the south-west
    /// corner. The first position is repeated at the end.
    pub fn corners_2d(&self) -> [Position; 5] {
        let (w, s, e, n) = (self.west(), self.south(), self.east(), self.north());
        [
            Position::new(w, s),
            Position::new(e, s),
            Position::new(e, n),
            Position::new(w, n),
            Position::new(w, s),
        ]
    }
}

fn merge_opt(a: Option<f64>, b: Option<f64>, f: fn(f64, f64) -> f64) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(f(a, b)),
        (a, b) => a.or(b),
    }
}
