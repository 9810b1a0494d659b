//! Free-form attribute values
//!
//! A closed JSON-like variant with dotted-path access. Map keys keep their
//! insertion order.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use digger_selector::{format_number, Literal, Operator};

use crate::StoreError;

/// Attribute tree node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Empty map
    pub fn map() -> Self {
        Value::Map(IndexMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Scalar rendered as text; `None` for null, lists and maps
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(format_number(*n)),
            Value::String(s) => Some(s.clone()),
            Value::Null | Value::List(_) | Value::Map(_) => None,
        }
    }

    /// Look up a dotted path. Numeric segments index into lists.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut current = self;
        for segment in path.split('.') {
            current = match current {
                Value::Map(map) => map.get(segment)?,
                Value::List(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Set a dotted path, creating intermediate maps as needed.
    ///
    /// A numeric segment indexes an existing list; writing up to
    /// [`MAX_LIST_PADDING`] slots past the end pads with nulls. Any scalar
    /// found on the way is replaced by a map.
    pub fn set_path(&mut self, path: &str, value: Value) -> Result<(), StoreError> {
        let segments: Vec<&str> = path.split('.').collect();
        set_segments(self, &segments, value).map_err(|(index, len)| {
            StoreError::ListIndexOutOfRange {
                path: path.to_string(),
                index,
                len,
            }
        })
    }

    /// Remove a top-level or nested key, returning the old value.
    pub fn remove_path(&mut self, path: &str) -> Option<Value> {
        let (parent, key) = match path.rsplit_once('.') {
            Some((parent, key)) => (self.get_path_mut(parent)?, key),
            None => (self, path),
        };
        match parent {
            Value::Map(map) => map.shift_remove(key),
            _ => None,
        }
    }

    fn get_path_mut(&mut self, path: &str) -> Option<&mut Value> {
        let mut current = self;
        for segment in path.split('.') {
            current = match current {
                Value::Map(map) => map.get_mut(segment)?,
                Value::List(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Evaluate `self <operator> literal`. Never fails: a type mismatch is
    /// simply no match.
    pub fn compare(&self, operator: Operator, literal: &Literal) -> bool {
        match operator {
            Operator::Eq => match (self, literal) {
                (Value::Number(a), Literal::Number(b)) => a == b,
                (Value::String(a), Literal::String(b)) => a == b,
                _ => false,
            },
            Operator::Prefix => match self.as_text() {
                Some(text) => text.starts_with(&literal.to_text()),
                None => false,
            },
            Operator::Lt => match (self.as_number(), literal.as_number()) {
                (Some(a), Some(b)) => a < b,
                _ => false,
            },
            Operator::Gt => match (self.as_number(), literal.as_number()) {
                (Some(a), Some(b)) => a > b,
                _ => false,
            },
        }
    }
}

/// Furthest a list write may land past the current end
pub const MAX_LIST_PADDING: usize = 1024;

/// Err carries `(index, len)` of a list write out of range.
fn set_segments(
    target: &mut Value,
    segments: &[&str],
    value: Value,
) -> Result<(), (usize, usize)> {
    let Some((segment, rest)) = segments.split_first() else {
        *target = value;
        return Ok(());
    };

    let list_index = match target {
        Value::List(_) => segment.parse::<usize>().ok(),
        _ => None,
    };
    if let (Some(index), Value::List(items)) = (list_index, &mut *target) {
        if index >= items.len() {
            let len = items.len();
            let new_len = index
                .checked_add(1)
                .filter(|new_len| new_len - len <= MAX_LIST_PADDING)
                .ok_or((index, len))?;
            items.resize(new_len, Value::Null);
        }
        return set_segments(&mut items[index], rest, value);
    }

    if !matches!(target, Value::Map(_)) {
        *target = Value::map();
    }
    match target {
        Value::Map(map) => {
            let slot = map.entry(segment.to_string()).or_insert(Value::Null);
            set_segments(slot, rest, value)
        }
        _ => Ok(()),
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Number(n) => Value::Number(n),
            Literal::String(s) => Value::String(s),
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}:{}", key, item)?;
                }
                f.write_str("}")
            }
        }
    }
}
