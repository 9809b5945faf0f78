//! The in-memory backing store: a tree of dynamically-typed values addressed
//! by dot-delimited paths, with a TOML bridge for persistence.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_value::Value;

use crate::error::Error;

/// A hierarchical key/value document.
///
/// Paths are dot-delimited (`"sound.volume"`); every non-leaf segment is a
/// nested table. Reads are cheap map walks; writes create intermediate tables
/// as needed, replacing any non-table node standing in the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    root: BTreeMap<Value, Value>,
}

fn key(segment: &str) -> Value {
    Value::String(segment.to_owned())
}

fn mismatch(path: &str, expected: &'static str, found: &Value) -> Error {
    Error::TypeMismatch {
        path: path.to_owned(),
        expected,
        found: value_kind(found),
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "a boolean",
        Value::U8(_)
        | Value::U16(_)
        | Value::U32(_)
        | Value::U64(_)
        | Value::I8(_)
        | Value::I16(_)
        | Value::I32(_)
        | Value::I64(_) => "an integer",
        Value::F32(_) | Value::F64(_) => "a float",
        Value::Char(_) => "a character",
        Value::String(_) => "a string",
        Value::Unit => "a unit",
        Value::Option(_) => "an optional value",
        Value::Newtype(_) => "a newtype value",
        Value::Seq(_) => "a list",
        Value::Map(_) => "a table",
        Value::Bytes(_) => "bytes",
    }
}

impl Document {
    /// An empty document.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// True iff `path` holds a value of any type, tables included.
    pub fn contains(&self, path: &str) -> bool {
        self.node(path).is_some()
    }

    /// The raw value at `path`, if any.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.node(path)
    }

    /// The value at `path` deserialized into `T`, or `default` if the path
    /// is absent. One walk serves both the fetch and the fallback.
    pub fn get_with<T>(&self, path: &str, default: &T) -> Result<T, Error>
    where
        T: Clone + DeserializeOwned,
    {
        match self.node(path) {
            Some(value) => Ok(T::deserialize(value.clone())?),
            None => Ok(default.clone()),
        }
    }

    pub fn get_str(&self, path: &str, default: &str) -> Result<String, Error> {
        match self.node(path) {
            None => Ok(default.to_owned()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(mismatch(path, "a string", other)),
        }
    }

    pub fn get_bool(&self, path: &str, default: bool) -> Result<bool, Error> {
        match self.node(path) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(mismatch(path, "a boolean", other)),
        }
    }

    pub fn get_i64(&self, path: &str, default: i64) -> Result<i64, Error> {
        let value = match self.node(path) {
            None => return Ok(default),
            Some(value) => value,
        };
        match value {
            Value::I8(n) => Ok(i64::from(*n)),
            Value::I16(n) => Ok(i64::from(*n)),
            Value::I32(n) => Ok(i64::from(*n)),
            Value::I64(n) => Ok(*n),
            Value::U8(n) => Ok(i64::from(*n)),
            Value::U16(n) => Ok(i64::from(*n)),
            Value::U32(n) => Ok(i64::from(*n)),
            Value::U64(n) => {
                i64::try_from(*n).map_err(|_| mismatch(path, "a 64-bit integer", value))
            }
            other => Err(mismatch(path, "an integer", other)),
        }
    }

    /// Integers stored at `path` widen to a float, as the document formats
    /// this crate persists do not distinguish `1` from `1.0` reliably.
    pub fn get_f64(&self, path: &str, default: f64) -> Result<f64, Error> {
        let value = match self.node(path) {
            None => return Ok(default),
            Some(value) => value,
        };
        match value {
            Value::F32(n) => Ok(f64::from(*n)),
            Value::F64(n) => Ok(*n),
            Value::I8(n) => Ok(f64::from(*n)),
            Value::I16(n) => Ok(f64::from(*n)),
            Value::I32(n) => Ok(f64::from(*n)),
            Value::I64(n) => Ok(*n as f64),
            Value::U8(n) => Ok(f64::from(*n)),
            Value::U16(n) => Ok(f64::from(*n)),
            Value::U32(n) => Ok(f64::from(*n)),
            Value::U64(n) => Ok(*n as f64),
            other => Err(mismatch(path, "a float", other)),
        }
    }

    pub fn get_list(&self, path: &str, default: &[Value]) -> Result<Vec<Value>, Error> {
        match self.node(path) {
            None => Ok(default.to_vec()),
            Some(Value::Seq(items)) => Ok(items.clone()),
            Some(other) => Err(mismatch(path, "a list", other)),
        }
    }

    /// Serializes `value` and stores it at `path`.
    pub fn set<T: Serialize>(&mut self, path: &str, value: &T) -> Result<(), Error> {
        self.set_value(path, serde_value::to_value(value)?);
        Ok(())
    }

    /// Stores a raw value at `path`, creating intermediate tables.
    pub fn set_value(&mut self, path: &str, value: Value) {
        let mut segments = path.split('.');
        let mut current = segments.next().unwrap_or(path);
        let mut map = &mut self.root;
        for next in segments {
            if !matches!(map.get(&key(current)), Some(Value::Map(_))) {
                map.insert(key(current), Value::Map(BTreeMap::new()));
            }
            map = match map.get_mut(&key(current)) {
                Some(Value::Map(inner)) => inner,
                _ => unreachable!("intermediate node was just replaced with a table"),
            };
            current = next;
        }
        map.insert(key(current), value);
    }

    /// Removes the value at `path`, returning it if it was present.
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        match path.rsplit_once('.') {
            None => self.root.remove(&key(path)),
            Some((parent, leaf)) => match self.node_mut(parent)? {
                Value::Map(map) => map.remove(&key(leaf)),
                _ => None,
            },
        }
    }

    /// Parses a TOML document. The root must be a table.
    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        let value: Value = toml::from_str(contents)?;
        match value {
            Value::Map(root) => Ok(Self { root }),
            _ => Err(Error::NotATable),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, Error> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn node(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.root.get(&key(segments.next()?))?;
        for segment in segments {
            current = match current {
                Value::Map(map) => map.get(&key(segment))?,
                _ => return None,
            };
        }
        Some(current)
    }

    fn node_mut(&mut self, path: &str) -> Option<&mut Value> {
        let mut segments = path.split('.');
        let mut current = self.root.get_mut(&key(segments.next()?))?;
        for segment in segments {
            current = match current {
                Value::Map(map) => map.get_mut(&key(segment))?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.root.len()))?;
        for (k, v) in &self.root {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
