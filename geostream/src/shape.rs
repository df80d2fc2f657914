//! Coordinates of a single geometry collected by the text decoders before they are written into
//! a sink.

use geostream_types::{CoordinateContent, Coords, GeoTypesError, Position, PositionSeries};

/// Nested coordinate arrays of one geometry.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Shape {
    Point(Position),
    Series(PositionSeries<'static>),
    Rings(Vec<PositionSeries<'static>>),
    Polygons(Vec<Vec<PositionSeries<'static>>>),
}

impl Shape {
    pub fn write(&self, content: &mut dyn CoordinateContent) {
        match self {
            Shape::Point(position) => content.position(position),
            Shape::Series(series) => content.positions(series),
            Shape::Rings(rings) => write_rings(content, rings),
            Shape::Polygons(polygons) => {
                content.position_array_begin(Some(polygons.len()));
                for rings in polygons {
                    write_rings(content, rings);
                }
                content.position_array_end();
            }
        }
    }
}

fn write_rings(content: &mut dyn CoordinateContent, rings: &[PositionSeries<'_>]) {
    content.position_array_begin(Some(rings.len()));
    for ring in rings {
        content.positions(ring);
    }
    content.position_array_end();
}

/// Checks that all positions of a geometry have the same number of components.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Dimensions {
    coords: Option<Coords>,
}

impl Dimensions {
    /// Tracker with a known dimensionality.
    pub fn fixed(coords: Option<Coords>) -> Self {
        Self { coords }
    }

    pub fn coords(&self) -> Option<Coords> {
        self.coords
    }

    /// Registers a position with `count` components. The first position fixes the
    /// dimensionality if it was not known before.
    pub fn accept(&mut self, count: usize) -> Result<Coords, GeoTypesError> {
        match self.coords {
            Some(coords) if coords.dimension() == count => Ok(coords),
            Some(coords) => Err(GeoTypesError::ValueCount { count, coords }),
            None => {
                let coords = Coords::from_component_count(count)?;
                self.coords = Some(coords);
                Ok(coords)
            }
        }
    }

    /// Series from a flat list of values that were registered with [`Dimensions::accept`].
    pub fn series(&self, values: Vec<f64>) -> Result<PositionSeries<'static>, GeoTypesError> {
        PositionSeries::from_values(values, self.coords.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn dimensions_are_fixed_by_first_position() {
        let mut dimensions = Dimensions::default();
        assert_eq!(dimensions.accept(3).unwrap(), Coords::Xyz);
        assert_eq!(dimensions.accept(3).unwrap(), Coords::Xyz);
        assert_matches!(
            dimensions.accept(2),
            Err(GeoTypesError::ValueCount {
                count: 2,
                coords: Coords::Xyz
            })
        );

        let mut measured = Dimensions::fixed(Some(Coords::Xym));
        assert_eq!(measured.accept(3).unwrap(), Coords::Xym);
        assert_matches!(
            Dimensions::default().accept(5),
            Err(GeoTypesError::ComponentCount(5))
        );
    }

    #[test]
    fn empty_series_defaults_to_2d() {
        let series = Dimensions::default().series(Vec::new()).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.coords(), Coords::Xy);
    }
}
