//! InfluxDB line protocol points.

use std::collections::BTreeMap;
use std::fmt::{self, Write};

/// Typed field value; integers render with the `i` suffix.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::Integer(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Integer(i64::from(v))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

/// One point: measurement, tags, fields and a millisecond timestamp.
///
/// Tags and fields are kept sorted, which is the order InfluxDB prefers on write.
/// Line breaks cannot be escaped in line protocol; they are replaced by spaces when a
/// measurement, key or text value enters the point.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    measurement: String,
    tags: BTreeMap<String, String>,
    fields: BTreeMap<String, FieldValue>,
    timestamp_ms: u64,
}

impl Point {
    pub fn new(measurement: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            measurement: single_line(measurement.into()),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            timestamp_ms,
        }
    }

    /// Empty values are not representable as tags and are skipped.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.tags.insert(single_line(key.into()), single_line(value));
        }
        self
    }

    pub fn tags<I, K, V>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in tags {
            self = self.tag(k, v);
        }
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let value = match value.into() {
            FieldValue::Text(text) => FieldValue::Text(single_line(text)),
            other => other,
        };
        self.fields.insert(single_line(key.into()), value);
        self
    }

    pub fn field_opt<V: Into<FieldValue>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.field(key, v),
            None => self,
        }
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn get_tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn get_field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    /// A point needs at least one field to be written.
    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_escaped(f, &self.measurement, &[',', ' '])?;
        for (k, v) in &self.tags {
            f.write_char(',')?;
            write_escaped(f, k, &[',', '=', ' '])?;
            f.write_char('=')?;
            write_escaped(f, v, &[',', '=', ' '])?;
        }
        for (i, (k, v)) in self.fields.iter().enumerate() {
            f.write_char(if i == 0 { ' ' } else { ',' })?;
            write_escaped(f, k, &[',', '=', ' '])?;
            f.write_char('=')?;
            match v {
                FieldValue::Integer(n) => write!(f, "{n}i")?,
                FieldValue::Float(x) => write!(f, "{x}")?,
                FieldValue::Boolean(b) => write!(f, "{b}")?,
                FieldValue::Text(s) => {
                    f.write_char('"')?;
                    write_escaped(f, s, &['"', '\\'])?;
                    f.write_char('"')?;
                }
            }
        }
        write!(f, " {}", self.timestamp_ms)
    }
}

fn single_line(s: String) -> String {
    if !s.contains(['\n', '\r']) {
        return s;
    }
    tracing::debug!(value = %s.escape_debug(), "line break replaced in influx point");
    s.replace(['\n', '\r'], " ")
}

fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str, special: &[char]) -> fmt::Result {
    for c in s.chars() {
        if special.contains(&c) {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    Ok(())
}

/// Line protocol body for a batch of points, one point per line.
pub fn to_line_protocol(points: &[Point]) -> String {
    points
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
