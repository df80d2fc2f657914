//! Position series is a flat buffer of coordinate values split into positions of a fixed
//! dimensionality.
//!
//! A series either owns its values or borrows them from a caller-provided slice (see
//! [`PositionSeries::view`]). A borrowed series cannot outlive the slice it was created from,
//! and the borrow checker guarantees that the slice is not mutated while the series is alive.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::coords::Coords;
use crate::error::GeoTypesError;
use crate::point::Position;

/// Sequence of positions stored as a flat list of numbers. See module documentation for details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSeries<'a> {
    values: Cow<'a, [f64]>,
    coords: Coords,
}

impl<'a> PositionSeries<'a> {
    /// Creates a series borrowing the given values.
    pub fn view(values: &'a [f64], coords: Coords) -> Result<Self, GeoTypesError> {
        check_count(values.len(), coords)?;
        Ok(Self {
            values: Cow::Borrowed(values),
            coords,
        })
    }

    /// Creates a series owning the given values.
    pub fn from_values(values: Vec<f64>, coords: Coords) -> Result<Self, GeoTypesError> {
        check_count(values.len(), coords)?;
        Ok(Self {
            values: Cow::Owned(values),
            coords,
        })
    }

    /// Empty series.
    pub fn empty(coords: Coords) -> Self {
        Self {
            values: Cow::Owned(vec![]),
            coords,
        }
    }

    /// Dimensionality of the positions in the series.
    pub fn coords(&self) -> Coords {
        self.coords
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.values.len() / self.coords.dimension()
    }

    /// Returns true if the series has no positions.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flat values of the series.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Position at the given index.
    pub fn get(&self, index: usize) -> Option<Position> {
        let dim = self.coords.dimension();
        let start = index.checked_mul(dim)?;
        let slice = self.values.get(start..start + dim)?;
        Some(Position::from_slice_unchecked(slice, self.coords))
    }

    /// First position of the series.
    pub fn first(&self) -> Option<Position> {
        self.get(0)
    }

    /// Last position of the series.
    pub fn last(&self) -> Option<Position> {
        self.len().checked_sub(1).and_then(|index| self.get(index))
    }

    /// Iterates over positions of the series.
    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        self.values
            .chunks_exact(self.coords.dimension())
            .map(|chunk| Position::from_slice_unchecked(chunk, self.coords))
    }

    /// Returns true if the series has at least one position and its first and last positions
    /// are the same.
    pub fn is_closed(&self) -> bool {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        }
    }

    /// Converts the series into one that owns its values.
    pub fn into_owned(self) -> PositionSeries<'static> {
        PositionSeries {
            values: Cow::Owned(self.values.into_owned()),
            coords: self.coords,
        }
    }
}

impl PositionSeries<'static> {
    /// Creates an owned series from positions. The positions are laid out with the given
    /// dimensionality, or with the dimensionality of the first position if none is given.
    pub fn from_positions(positions: &[Position], coords: Option<Coords>) -> Self {
        let coords = coords
            .or_else(|| positions.first().map(Position::coords))
            .unwrap_or_default();
        let mut values = Vec::with_capacity(positions.len() * coords.dimension());
        for position in positions {
            position.write_values(coords, &mut values);
        }

        Self {
            values: Cow::Owned(values),
            coords,
        }
    }
}

fn check_count(count: usize, coords: Coords) -> Result<(), GeoTypesError> {
    if count % coords.dimension() == 0 {
        Ok(())
    } else {
        Err(GeoTypesError::ValueCount { count, coords })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn view_over_slice() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let series = PositionSeries::view(&values, Coords::Xyz).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.get(1), Some(Position::new_3d(4.0, 5.0, 6.0)));
        assert_eq!(series.get(2), None);

        let series = PositionSeries::view(&values, Coords::Xy).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(
            series.iter().collect::<Vec<_>>(),
            vec![
                Position::new(1.0, 2.0),
                Position::new(3.0, 4.0),
                Position::new(5.0, 6.0)
            ]
        );
    }

    #[test]
    fn invalid_value_count() {
        assert_matches!(
            PositionSeries::view(&[1.0, 2.0, 3.0], Coords::Xy),
            Err(GeoTypesError::ValueCount { count: 3, .. })
        );
        assert!(PositionSeries::from_values(vec![1.0; 8], Coords::Xyzm).is_ok());
    }

    #[test]
    fn measured_series() {
        let series = PositionSeries::view(&[1.0, 2.0, 9.0], Coords::Xym).unwrap();
        assert_eq!(series.first(), Some(Position::new_measured(1.0, 2.0, 9.0)));
    }

    #[test]
    fn closed_series() {
        let ring = PositionSeries::from_positions(
            &[
                Position::new(0.0, 0.0),
                Position::new(1.0, 0.0),
                Position::new(0.0, 0.0),
            ],
            None,
        );
        assert!(ring.is_closed());
        assert!(!PositionSeries::empty(Coords::Xy).is_closed());
    }

    #[test]
    fn into_owned_keeps_values() {
        let values = vec![1.0, 2.0];
        let owned = PositionSeries::view(&values, Coords::Xy)
            .unwrap()
            .into_owned();
        drop(values);
        assert_eq!(owned.values(), &[1.0, 2.0]);
    }
}
