use serde::{Deserialize, Serialize};

use crate::coords::Coords;
use crate::error::GeoTypesError;

/// A position with `x` and `y` (or longitude and latitude) components and optional `z`
/// (elevation) and `m` (measure) components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// X (or longitude) component.
    pub x: f64,
    /// Y (or latitude) component.
    pub y: f64,
    /// Optional elevation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Optional measure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m: Option<f64>,
}

impl Position {
    /// 2d position.
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            m: None,
        }
    }

    /// 3d position.
    pub const fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            m: None,
        }
    }

    /// 2d position with a measure.
    pub const fn new_measured(x: f64, y: f64, m: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            m: Some(m),
        }
    }

    /// 3d position with a measure.
    pub const fn new_3d_measured(x: f64, y: f64, z: f64, m: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            m: Some(m),
        }
    }

    /// Creates a position from a list of 2 to 4 numbers.
    ///
    /// Without explicit `coords` the dimensionality is inferred from the number of values with
    /// [`Coords::from_component_count`], so three values make a 3d position.
    pub fn from_values(values: &[f64], coords: Option<Coords>) -> Result<Self, GeoTypesError> {
        let coords = match coords {
            Some(coords) => coords,
            None => Coords::from_component_count(values.len())?,
        };

        if values.len() != coords.dimension() {
            return Err(GeoTypesError::ValueCount {
                count: values.len(),
                coords,
            });
        }

        Ok(Self::from_slice_unchecked(values, coords))
    }

    /// Reads a position at the start of the slice. The slice must contain at least
    /// `coords.dimension()` values.
    pub(crate) fn from_slice_unchecked(values: &[f64], coords: Coords) -> Self {
        let z = coords.is_3d().then(|| values[2]);
        let m = match coords {
            Coords::Xym => Some(values[2]),
            Coords::Xyzm => Some(values[3]),
            _ => None,
        };

        Self {
            x: values[0],
            y: values[1],
            z,
            m,
        }
    }

    /// Dimensionality of the position.
    pub fn coords(&self) -> Coords {
        Coords::select(self.z.is_some(), self.m.is_some())
    }

    /// Pushes the components of the position laid out for the given dimensionality.
    ///
    /// Missing components are written as `0.0`, extra components are omitted.
    pub fn write_values(&self, coords: Coords, out: &mut Vec<f64>) {
        out.push(self.x);
        out.push(self.y);
        if coords.is_3d() {
            out.push(self.z.unwrap_or(0.0));
        }
        if coords.is_measured() {
            out.push(self.m.unwrap_or(0.0));
        }
    }

    /// Components of the position in `x, y, z, m` order, only the present ones.
    pub fn values(&self) -> Vec<f64> {
        let mut values = Vec::with_capacity(4);
        self.write_values(self.coords(), &mut values);
        values
    }

    /// Returns true if all present components are NaN. Used as the empty point marker by
    /// binary formats.
    pub fn is_nan(&self) -> bool {
        self.x.is_nan()
            && self.y.is_nan()
            && self.z.is_none_or(f64::is_nan)
            && self.m.is_none_or(f64::is_nan)
    }
}

impl From<[f64; 2]> for Position {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<[f64; 3]> for Position {
    fn from(value: [f64; 3]) -> Self {
        Self::new_3d(value[0], value[1], value[2])
    }
}
