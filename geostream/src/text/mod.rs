//! Output buffer and nesting bookkeeping shared by the text writers.

use std::fmt::Write;

use geostream_types::{Coords, Position, PropertyMap, Value};

use crate::options::TextWriterOptions;

mod state;

pub(crate) use state::{Container, ContainerStack};

/// Text output of a writer together with its nesting state.
#[derive(Debug)]
pub(crate) struct TextSink {
    out: String,
    pub stack: ContainerStack,
    options: TextWriterOptions,
    json_numbers: bool,
    scratch: Vec<f64>,
}

impl TextSink {
    /// Creates a sink appending to the given buffer.
    pub fn new(options: TextWriterOptions, buffer: String) -> Self {
        Self {
            out: buffer,
            stack: ContainerStack::new(),
            options,
            json_numbers: false,
            scratch: Vec::with_capacity(4),
        }
    }

    /// Writes non-finite numbers as JSON `null`.
    pub fn with_json_numbers(mut self) -> Self {
        self.json_numbers = true;
        self
    }

    pub fn options(&self) -> &TextWriterOptions {
        &self.options
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn truncate(&mut self, len: usize) {
        self.out.truncate(len);
    }

    pub fn insert_str(&mut self, index: usize, s: &str) {
        self.out.insert_str(index, s);
    }

    pub fn push(&mut self, c: char) {
        self.out.push(c);
    }

    pub fn push_str(&mut self, s: &str) {
        self.out.push_str(s);
    }

    /// Registers an item in the current frame and writes the separator if the frame already has
    /// items.
    pub fn separator(&mut self, separator: &str) {
        if self.stack.start_item() {
            self.out.push_str(separator);
        }
    }

    /// Clears the output and the nesting state.
    pub fn reset(&mut self) {
        self.out.clear();
        self.stack.reset();
    }

    /// Dimensionality used to print a position or a box: the tag of the enclosing geometry if it
    /// has one, otherwise the given one. Drops the measure when configured to.
    pub fn output_coords(&self, own: Coords) -> Coords {
        let coords = self.stack.coords().unwrap_or(own);
        if self.options.ignore_measured {
            coords.without_measure()
        } else {
            coords
        }
    }

    pub fn number(&mut self, value: f64) {
        if self.json_numbers && !value.is_finite() {
            self.out.push_str("null");
        } else {
            format_number(&mut self.out, value, self.options.decimals);
        }
    }

    /// Writes the components of the position in the given layout.
    pub fn position_values(&mut self, position: &Position, coords: Coords, separator: &str) {
        let mut values = std::mem::take(&mut self.scratch);
        values.clear();
        position.write_values(coords, &mut values);
        self.numbers(&values, separator);
        self.scratch = values;
    }

    pub fn numbers(&mut self, values: &[f64], separator: &str) {
        for (index, value) in values.iter().enumerate() {
            if index > 0 {
                self.out.push_str(separator);
            }
            self.number(*value);
        }
    }

    /// Writes a quoted and escaped JSON string.
    pub fn json_string(&mut self, s: &str) {
        let _ = write!(self.out, "{}", Value::from(s));
    }

    /// Writes a JSON object member name followed by the colon.
    pub fn json_key(&mut self, name: &str) {
        self.json_string(name);
        self.out.push(':');
    }

    /// Writes a dynamically typed value, recursing into arrays and maps.
    pub fn json_value(&mut self, value: &Value) {
        match value {
            Value::Array(items) => {
                self.out.push('[');
                self.stack.push(Container::PropertyArray);
                for item in items {
                    self.separator(",");
                    self.json_value(item);
                }
                self.stack.pop();
                self.out.push(']');
            }
            Value::Object(map) => self.json_map(map),
            leaf => {
                let _ = write!(self.out, "{leaf}");
            }
        }
    }

    pub fn json_map(&mut self, map: &PropertyMap) {
        self.out.push('{');
        self.stack.push(Container::PropertyMap);
        for (name, value) in map {
            self.separator(",");
            self.json_key(name);
            self.json_value(value);
        }
        self.stack.pop();
        self.out.push('}');
    }
}

/// Formats a coordinate value. With `decimals` set, the value is rounded half away from zero and
/// printed with exactly that many decimal places.
pub(crate) fn format_number(out: &mut String, value: f64, decimals: Option<usize>) {
    let Some(decimals) = decimals.filter(|_| value.is_finite()) else {
        let _ = write!(out, "{value}");
        return;
    };

    let factor = 10f64.powi(decimals.min(i32::MAX as usize) as i32);
    let scaled = value * factor;
    let mut rounded = if scaled.is_finite() {
        scaled.round() / factor
    } else {
        value
    };
    if rounded == 0.0 {
        rounded = 0.0;
    }

    let _ = write!(out, "{rounded:.decimals$}");
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn formatted(value: f64, decimals: Option<usize>) -> String {
        let mut out = String::new();
        format_number(&mut out, value, decimals);
        out
    }

    #[test]
    fn natural_number_format() {
        assert_eq!(formatted(10.0, None), "10");
        assert_eq!(formatted(-1.1, None), "-1.1");
        assert_eq!(formatted(10.123, None), "10.123");
        assert_eq!(formatted(0.1 + 0.2, None), "0.30000000000000004");
    }

    #[test]
    fn fixed_number_format() {
        assert_eq!(formatted(10.123, Some(1)), "10.1");
        assert_eq!(formatted(20.25, Some(1)), "20.3");
        assert_eq!(formatted(-20.25, Some(1)), "-20.3");
        assert_eq!(formatted(10.0, Some(2)), "10.00");
        assert_eq!(formatted(-0.04, Some(1)), "0.0");
        assert_eq!(formatted(2.5, Some(0)), "3");
        assert_eq!(formatted(1e300, Some(10)), format!("{:.10}", 1e300));
        assert_eq!(formatted(f64::NAN, Some(2)), "NaN");
    }

    #[test]
    fn json_numbers_replace_non_finite() {
        let mut sink = TextSink::new(TextWriterOptions::default(), String::new()).with_json_numbers();
        sink.numbers(&[1.5, f64::NAN, f64::INFINITY], ",");
        assert_eq!(sink.as_str(), "1.5,null,null");
    }

    #[test]
    fn json_values_are_nested() {
        let mut sink = TextSink::new(TextWriterOptions::default(), String::new());
        sink.json_value(&json!({"a": [1, "two", null, {"b": true}], "c\"": {}}));
        assert_eq!(sink.as_str(), r#"{"a":[1,"two",null,{"b":true}],"c\"":{}}"#);
        assert!(sink.stack.is_root());
    }

    #[test]
    fn output_coords_follow_geometry_and_options() {
        let mut sink = TextSink::new(TextWriterOptions::default(), String::new());
        assert_eq!(sink.output_coords(Coords::Xym), Coords::Xym);
        sink.stack.push_geometry(Some(Coords::Xyz));
        assert_eq!(sink.output_coords(Coords::Xym), Coords::Xyz);

        let sink = TextSink::new(
            TextWriterOptions::default().with_ignore_measured(true),
            String::new(),
        );
        assert_eq!(sink.output_coords(Coords::Xyzm), Coords::Xyz);
    }
}
