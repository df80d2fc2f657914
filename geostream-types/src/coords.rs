//! See documentation for [`Coords`].

use serde::{Deserialize, Serialize};

use crate::error::GeoTypesError;

/// Dimensionality of positions: which of `x`, `y`, `z` (elevation) and `m` (measure) components
/// every position of a geometry carries.
///
/// `Xym` (measured, but without elevation) is a separate case from `Xyz` even though both have
/// three components. A bare list of three numbers is always treated as `Xyz`, see
/// [`Coords::from_component_count`].
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Coords {
    /// Two dimensional positions.
    #[default]
    Xy,
    /// Three dimensional positions.
    Xyz,
    /// Two dimensional positions with a measure.
    Xym,
    /// Three dimensional positions with a measure.
    Xyzm,
}

impl Coords {
    /// Selects the dimensionality by presence of the optional components.
    pub fn select(has_z: bool, has_m: bool) -> Self {
        match (has_z, has_m) {
            (false, false) => Self::Xy,
            (true, false) => Self::Xyz,
            (false, true) => Self::Xym,
            (true, true) => Self::Xyzm,
        }
    }

    /// Infers the dimensionality from the number of numeric components of a position.
    ///
    /// Three components are `Xyz`, four components are `Xyzm`.
    pub fn from_component_count(count: usize) -> Result<Self, GeoTypesError> {
        match count {
            2 => Ok(Self::Xy),
            3 => Ok(Self::Xyz),
            4 => Ok(Self::Xyzm),
            _ => Err(GeoTypesError::ComponentCount(count)),
        }
    }

    /// Number of numeric components of a single position.
    pub fn dimension(&self) -> usize {
        match self {
            Self::Xy => 2,
            Self::Xyz | Self::Xym => 3,
            Self::Xyzm => 4,
        }
    }

    /// Number of spatial components (`x`, `y` and optional `z`).
    pub fn spatial_dimension(&self) -> usize {
        if self.is_3d() {
            3
        } else {
            2
        }
    }

    /// Whether positions have the `z` component.
    pub fn is_3d(&self) -> bool {
        matches!(self, Self::Xyz | Self::Xyzm)
    }

    /// Whether positions have the `m` component.
    pub fn is_measured(&self) -> bool {
        matches!(self, Self::Xym | Self::Xyzm)
    }

    /// Same dimensionality with the measure removed.
    pub fn without_measure(&self) -> Self {
        Self::select(self.is_3d(), false)
    }
}
