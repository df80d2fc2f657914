use geostream_types::{
    CollectionHeader, Coords, GeomKind, GeometryContent, GeometryHeader, NullContent, Position,
    PositionSeries,
};

use crate::error::GeostreamError;
use crate::shape::{Dimensions, Shape};
use crate::wkt::writer::wkt_tag;

const MAX_NESTING: usize = 64;

/// Decodes a single WKT geometry and writes it into the sink.
///
/// Tags and dimension suffixes are case-insensitive. Without a `Z`, `M` or `ZM` suffix the
/// dimensionality is inferred from the number of values of the first position: three values are
/// `Z`, four values are `ZM`.
///
/// The whole text is validated before anything is written into the sink.
pub fn decode(text: &str, sink: &mut dyn GeometryContent) -> Result<(), GeostreamError> {
    WktParser::new(text).parse_all(&mut NullContent)?;
    WktParser::new(text).parse_all(sink)
}

struct WktParser<'a> {
    text: &'a str,
    offset: usize,
    depth: usize,
}

impl<'a> WktParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            offset: 0,
            depth: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> GeostreamError {
        GeostreamError::Wkt {
            offset: self.offset,
            message: message.into(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.offset..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.offset += rest.len() - rest.trim_start().len();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.rest().chars().next()
    }

    fn consume(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.offset += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), GeostreamError> {
        if self.consume(c) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{c}'")))
        }
    }

    /// Reads the next alphabetic word without consuming it.
    fn peek_word(&mut self) -> &'a str {
        self.skip_whitespace();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        &rest[..len]
    }

    fn word(&mut self) -> &'a str {
        let word = self.peek_word();
        self.offset += word.len();
        word
    }

    fn number(&mut self) -> Result<f64, GeostreamError> {
        self.skip_whitespace();
        let rest = self.rest();
        let len = rest
            .find(|c: char| c.is_whitespace() || matches!(c, ',' | '(' | ')'))
            .unwrap_or(rest.len());
        let token = &rest[..len];

        let value = token
            .parse::<f64>()
            .map_err(|_| self.error(format!("invalid number '{token}'")))?;
        self.offset += len;

        Ok(value)
    }

    fn parse_all(mut self, sink: &mut dyn GeometryContent) -> Result<(), GeostreamError> {
        self.parse_geometry(sink)?;
        if self.peek().is_some() {
            return Err(self.error("unexpected text after the geometry"));
        }

        Ok(())
    }

    fn parse_geometry(&mut self, sink: &mut dyn GeometryContent) -> Result<(), GeostreamError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error("geometry nesting is too deep"));
        }

        let tag_offset = self.offset;
        let tag = self.word();
        let Some((kind, mut coords)) = parse_tag(tag) else {
            self.offset = tag_offset;
            return Err(self.error(format!("unknown geometry tag '{tag}'")));
        };

        if coords.is_none() {
            if let Some(suffix) = parse_suffix(self.peek_word()).flatten() {
                self.word();
                coords = Some(suffix);
            }
        }

        if self.peek_word().eq_ignore_ascii_case("EMPTY") {
            self.word();
            sink.empty_geometry(kind, None);
            return Ok(());
        }

        if kind == GeomKind::GeometryCollection {
            return self.parse_collection(sink);
        }

        let mut dimensions = Dimensions::fixed(coords);
        let shape = self.parse_shape(kind, &mut dimensions)?;
        log::trace!("Parsed WKT {kind} {:?}", dimensions.coords());

        sink.geometry(
            GeometryHeader::new(kind).with_opt_coords(dimensions.coords()),
            &mut |content| shape.write(content),
        );

        Ok(())
    }

    fn parse_collection(&mut self, sink: &mut dyn GeometryContent) -> Result<(), GeostreamError> {
        self.expect('(')?;
        self.depth += 1;

        let mut result = Ok(());
        sink.geometry_collection(CollectionHeader::default(), &mut |content| loop {
            result = self.parse_geometry(content);
            if result.is_err() || !self.consume(',') {
                break;
            }
        });
        result?;

        self.depth -= 1;
        self.expect(')')
    }

    fn parse_shape(
        &mut self,
        kind: GeomKind,
        dimensions: &mut Dimensions,
    ) -> Result<Shape, GeostreamError> {
        let shape = match kind {
            GeomKind::Point => {
                self.expect('(')?;
                let mut values = Vec::with_capacity(4);
                self.parse_position(dimensions, &mut values)?;
                self.expect(')')?;

                let coords = dimensions.coords().unwrap_or_default();
                let position = Position::from_values(&values, Some(coords))
                    .map_err(|err| self.error(err.to_string()))?;
                Shape::Point(position)
            }
            GeomKind::LineString => Shape::Series(self.parse_series(dimensions)?),
            GeomKind::MultiPoint => Shape::Series(self.parse_multi_point(dimensions)?),
            GeomKind::Polygon | GeomKind::MultiLineString => {
                Shape::Rings(self.parse_rings(dimensions)?)
            }
            GeomKind::MultiPolygon => {
                let mut polygons = Vec::new();
                self.parse_list(|parser| {
                    polygons.push(parser.parse_rings(dimensions)?);
                    Ok(())
                })?;
                Shape::Polygons(polygons)
            }
            GeomKind::GeometryCollection => {
                return Err(self.error("geometry collection has no coordinates"))
            }
        };

        Ok(shape)
    }

    /// Parses a parenthesized comma separated list, calling `item` for every element.
    fn parse_list(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Result<(), GeostreamError>,
    ) -> Result<(), GeostreamError> {
        self.expect('(')?;
        loop {
            item(self)?;
            if !self.consume(',') {
                break;
            }
        }
        self.expect(')')
    }

    fn parse_position(
        &mut self,
        dimensions: &mut Dimensions,
        out: &mut Vec<f64>,
    ) -> Result<(), GeostreamError> {
        let start_offset = self.offset;
        let start = out.len();
        while !matches!(self.peek(), Some(',' | ')') | None) {
            out.push(self.number()?);
        }

        dimensions
            .accept(out.len() - start)
            .map_err(|err| GeostreamError::Wkt {
                offset: start_offset,
                message: err.to_string(),
            })?;

        Ok(())
    }

    fn parse_series(
        &mut self,
        dimensions: &mut Dimensions,
    ) -> Result<PositionSeries<'static>, GeostreamError> {
        let mut values = Vec::new();
        self.parse_list(|parser| parser.parse_position(dimensions, &mut values))?;
        dimensions
            .series(values)
            .map_err(|err| self.error(err.to_string()))
    }

    /// Multipoint members can be written either as bare positions or in parentheses.
    fn parse_multi_point(
        &mut self,
        dimensions: &mut Dimensions,
    ) -> Result<PositionSeries<'static>, GeostreamError> {
        let mut values = Vec::new();
        self.parse_list(|parser| {
            if parser.peek_word().eq_ignore_ascii_case("EMPTY") {
                parser.word();
                log::debug!("Skipping empty point in a WKT multipoint");
                return Ok(());
            }

            if parser.consume('(') {
                parser.parse_position(dimensions, &mut values)?;
                parser.expect(')')
            } else {
                parser.parse_position(dimensions, &mut values)
            }
        })?;

        dimensions
            .series(values)
            .map_err(|err| self.error(err.to_string()))
    }

    fn parse_rings(
        &mut self,
        dimensions: &mut Dimensions,
    ) -> Result<Vec<PositionSeries<'static>>, GeostreamError> {
        let mut rings = Vec::new();
        self.parse_list(|parser| {
            rings.push(parser.parse_series(dimensions)?);
            Ok(())
        })?;

        Ok(rings)
    }
}

/// Splits a tag like `POINT` or `POINTZM` into the kind and the optional attached suffix.
fn parse_tag(word: &str) -> Option<(GeomKind, Option<Coords>)> {
    GeomKind::ALL.into_iter().find_map(|kind| {
        let name = wkt_tag(kind);
        let head = word.get(..name.len())?;
        if !head.eq_ignore_ascii_case(name) {
            return None;
        }

        parse_suffix(&word[name.len()..]).map(|coords| (kind, coords))
    })
}

/// Dimension suffix. Returns `Some(None)` for an empty suffix and `None` if the word is not a
/// suffix.
fn parse_suffix(word: &str) -> Option<Option<Coords>> {
    if word.is_empty() {
        Some(None)
    } else if word.eq_ignore_ascii_case("Z") {
        Some(Some(Coords::Xyz))
    } else if word.eq_ignore_ascii_case("M") {
        Some(Some(Coords::Xym))
    } else if word.eq_ignore_ascii_case("ZM") {
        Some(Some(Coords::Xyzm))
    } else {
        None
    }
}
