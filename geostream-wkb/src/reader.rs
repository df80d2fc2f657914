use bytes::Buf;
use geostream_types::{
    CollectionHeader, CoordinateContent, Coords, GeomKind, GeometryContent, GeometryHeader,
    NullContent, Position,
};

use crate::error::WkbError;
use crate::{parse_type_code, Endian};

const MAX_NESTING: usize = 64;

/// Size of byte order flag and type code.
const HEADER_SIZE: usize = 5;

/// Decodes a single WKB geometry and writes it into the sink.
///
/// The whole buffer is validated before anything is written into the sink, so on error the sink
/// stays untouched. The buffer must contain exactly one geometry.
pub fn decode(bytes: &[u8], sink: &mut dyn GeometryContent) -> Result<(), WkbError> {
    WkbReader::new(bytes).read_all(&mut NullContent)?;
    WkbReader::new(bytes).read_all(sink)
}

/// Streaming WKB reader.
///
/// Unlike [`decode`], the reader writes into the sink while reading, so a failed read may leave
/// a partially written geometry in the sink.
#[derive(Debug, Clone)]
pub struct WkbReader<'a> {
    data: &'a [u8],
    cursor: &'a [u8],
    endian: Endian,
    depth: usize,
}

impl<'a> WkbReader<'a> {
    /// Creates a reader at the start of the buffer.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            cursor: data,
            endian: Endian::default(),
            depth: 0,
        }
    }

    /// Current offset from the start of the buffer.
    pub fn offset(&self) -> usize {
        self.data.len() - self.cursor.remaining()
    }

    /// Returns true if there is unread data.
    pub fn has_remaining(&self) -> bool {
        self.cursor.has_remaining()
    }

    /// Reads one geometry and checks that no data is left after it.
    pub fn read_all(mut self, sink: &mut dyn GeometryContent) -> Result<(), WkbError> {
        self.read_geometry(sink)?;
        if self.has_remaining() {
            return Err(WkbError::TrailingBytes {
                offset: self.offset(),
            });
        }

        Ok(())
    }

    /// Reads the next geometry of the buffer. Can be called repeatedly to read concatenated
    /// geometries.
    pub fn read_geometry(&mut self, sink: &mut dyn GeometryContent) -> Result<(), WkbError> {
        let offset = self.offset();
        let (kind, coords) = self.read_header()?;
        log::trace!("Reading WKB {kind} {coords:?} at offset {offset}");

        let header = GeometryHeader::new(kind).with_coords(coords);
        match kind {
            GeomKind::Point => {
                let values = self.read_values(1, coords)?;
                let position = position_at(&values, coords);
                if position.is_nan() {
                    sink.empty_geometry(kind, None);
                } else {
                    sink.geometry(header, &mut |c| c.position(&position));
                }
            }
            GeomKind::LineString => {
                let values = self.read_series(coords)?;
                if values.is_empty() {
                    sink.empty_geometry(kind, None);
                } else {
                    sink.geometry(header, &mut |c| write_series(c, &values, coords));
                }
            }
            GeomKind::Polygon => {
                let rings = self.read_rings(coords)?;
                if rings.is_empty() {
                    sink.empty_geometry(kind, None);
                } else {
                    sink.geometry(header, &mut |c| write_nested(c, &rings, coords));
                }
            }
            GeomKind::MultiPoint => {
                let count = self.read_count(HEADER_SIZE + coords.dimension() * 8)?;
                let mut values = Vec::with_capacity(count * coords.dimension());
                for _ in 0..count {
                    self.read_part_header(GeomKind::Point, coords)?;
                    values.extend(self.read_values(1, coords)?);
                }

                if values.is_empty() {
                    sink.empty_geometry(kind, None);
                } else {
                    sink.geometry(header, &mut |c| write_series(c, &values, coords));
                }
            }
            GeomKind::MultiLineString => {
                let count = self.read_count(HEADER_SIZE + 4)?;
                let mut lines = Vec::with_capacity(count);
                for _ in 0..count {
                    self.read_part_header(GeomKind::LineString, coords)?;
                    lines.push(self.read_series(coords)?);
                }

                if lines.is_empty() {
                    sink.empty_geometry(kind, None);
                } else {
                    sink.geometry(header, &mut |c| write_nested(c, &lines, coords));
                }
            }
            GeomKind::MultiPolygon => {
                let count = self.read_count(HEADER_SIZE + 4)?;
                let mut polygons = Vec::with_capacity(count);
                for _ in 0..count {
                    self.read_part_header(GeomKind::Polygon, coords)?;
                    polygons.push(self.read_rings(coords)?);
                }

                if polygons.is_empty() {
                    sink.empty_geometry(kind, None);
                } else {
                    sink.geometry(header, &mut |c| {
                        c.position_array_begin(Some(polygons.len()));
                        for rings in &polygons {
                            write_nested(c, rings, coords);
                        }
                        c.position_array_end();
                    });
                }
            }
            GeomKind::GeometryCollection => {
                if self.depth >= MAX_NESTING {
                    return Err(WkbError::NestingTooDeep { offset });
                }

                let count = self.read_count(HEADER_SIZE)?;
                if count == 0 {
                    sink.empty_geometry(kind, None);
                    return Ok(());
                }

                self.depth += 1;
                let mut result = Ok(());
                sink.geometry_collection(CollectionHeader::with_count(count), &mut |inner| {
                    for _ in 0..count {
                        if let Err(e) = self.read_geometry(inner) {
                            result = Err(e);
                            return;
                        }
                    }
                });
                self.depth -= 1;

                result?;
            }
        }

        Ok(())
    }

    fn ensure(&self, size: usize) -> Result<(), WkbError> {
        let remaining = self.cursor.remaining();
        if remaining < size {
            Err(WkbError::Truncated {
                offset: self.offset(),
                needed: size - remaining,
            })
        } else {
            Ok(())
        }
    }

    fn read_u32(&mut self) -> Result<u32, WkbError> {
        self.ensure(4)?;
        Ok(match self.endian {
            Endian::Big => self.cursor.get_u32(),
            Endian::Little => self.cursor.get_u32_le(),
        })
    }

    fn read_f64(&mut self) -> Result<f64, WkbError> {
        self.ensure(8)?;
        Ok(match self.endian {
            Endian::Big => self.cursor.get_f64(),
            Endian::Little => self.cursor.get_f64_le(),
        })
    }

    /// Reads byte order flag and type code. The byte order is used for all following values
    /// until the next header.
    fn read_header(&mut self) -> Result<(GeomKind, Coords), WkbError> {
        self.ensure(1)?;
        let offset = self.offset();
        let flag = self.cursor.get_u8();
        self.endian = Endian::from_flag(flag).ok_or(WkbError::InvalidByteOrder {
            offset,
            value: flag,
        })?;

        let offset = self.offset();
        let code = self.read_u32()?;
        parse_type_code(code).ok_or(WkbError::UnknownTypeCode { offset, code })
    }

    fn read_part_header(&mut self, expected: GeomKind, coords: Coords) -> Result<(), WkbError> {
        let offset = self.offset() + 1;
        let (kind, part_coords) = self.read_header()?;
        if kind != expected {
            return Err(WkbError::UnexpectedGeometry {
                offset,
                expected,
                found: kind,
            });
        }

        if part_coords != coords {
            return Err(WkbError::MixedDimensions {
                offset,
                expected: coords,
                found: part_coords,
            });
        }

        Ok(())
    }

    /// Reads an item count and checks that the buffer can contain that many items of at least
    /// `min_item_size` bytes.
    fn read_count(&mut self, min_item_size: usize) -> Result<usize, WkbError> {
        let count = self.read_u32()? as usize;
        self.ensure(count.saturating_mul(min_item_size))?;
        Ok(count)
    }

    fn read_values(&mut self, positions: usize, coords: Coords) -> Result<Vec<f64>, WkbError> {
        let count = positions * coords.dimension();
        self.ensure(count * 8)?;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(self.read_f64()?);
        }

        Ok(values)
    }

    fn read_series(&mut self, coords: Coords) -> Result<Vec<f64>, WkbError> {
        let count = self.read_count(coords.dimension() * 8)?;
        self.read_values(count, coords)
    }

    fn read_rings(&mut self, coords: Coords) -> Result<Vec<Vec<f64>>, WkbError> {
        let count = self.read_count(4)?;
        let mut rings = Vec::with_capacity(count);
        for _ in 0..count {
            rings.push(self.read_series(coords)?);
        }

        Ok(rings)
    }
}

fn position_at(values: &[f64], coords: Coords) -> Position {
    match coords {
        Coords::Xy => Position::new(values[0], values[1]),
        Coords::Xyz => Position::new_3d(values[0], values[1], values[2]),
        Coords::Xym => Position::new_measured(values[0], values[1], values[2]),
        Coords::Xyzm => Position::new_3d_measured(values[0], values[1], values[2], values[3]),
    }
}

fn write_series(content: &mut dyn CoordinateContent, values: &[f64], coords: Coords) {
    let dimension = coords.dimension();
    content.position_array_begin(Some(values.len() / dimension));
    for chunk in values.chunks_exact(dimension) {
        content.position(&position_at(chunk, coords));
    }
    content.position_array_end();
}

fn write_nested(content: &mut dyn CoordinateContent, arrays: &[Vec<f64>], coords: Coords) {
    content.position_array_begin(Some(arrays.len()));
    for values in arrays {
        write_series(content, values, coords);
    }
    content.position_array_end();
}
