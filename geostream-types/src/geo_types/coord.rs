use geo_types::{Coord, LineString};

use crate::coords::Coords;
use crate::point::Position;
use crate::series::PositionSeries;

impl From<Coord<f64>> for Position {
    fn from(value: Coord<f64>) -> Self {
        Position::new(value.x, value.y)
    }
}

impl From<Position> for Coord<f64> {
    fn from(value: Position) -> Self {
        Coord {
            x: value.x,
            y: value.y,
        }
    }
}

/// Flat 2d series of the line string coordinates. `geo_types` keep the closing coordinate of
/// rings, so it is copied as is.
pub(super) fn line_series(line: &LineString<f64>) -> PositionSeries<'static> {
    let mut values = Vec::with_capacity(line.0.len() * 2);
    for c in &line.0 {
        values.push(c.x);
        values.push(c.y);
    }

    PositionSeries::from_values(values, Coords::Xy)
        .unwrap_or_else(|_| PositionSeries::empty(Coords::Xy))
}
