//! Published variable values.

use serde::{Deserialize, Serialize};

/// The value of one variable in the merged namespace.
///
/// Serialized untagged, so viewers receive plain JSON numbers, arrays,
/// and row-major `[y][x]` arrays for per-cell maps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A scalar metric.
    Number(f64),
    /// A per-cell map, one inner vector per grid row.
    Grid(Vec<Vec<f64>>),
    /// An ordered list, e.g. `[loss, tileTypeId]` pairs.
    List(Vec<Value>),
}

impl Value {
    /// The scalar, if this is a [`Value::Number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The elements, if this is a [`Value::List`].
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The rows, if this is a [`Value::Grid`].
    pub fn as_grid(&self) -> Option<&[Vec<f64>]> {
        match self {
            Self::Grid(rows) => Some(rows),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Self::Number(v as f64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Number(if v { 1.0 } else { 0.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_untagged() {
        let list = Value::List(vec![
            Value::List(vec![Value::Number(0.25), Value::Number(5.0)]),
            Value::List(vec![Value::Number(0.0), Value::Number(6.0)]),
        ]);
        assert_eq!(serde_json::to_string(&list).unwrap(), "[[0.25,5.0],[0.0,6.0]]");
        let grid = Value::Grid(vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
        assert_eq!(serde_json::to_string(&grid).unwrap(), "[[0.0,1.0],[1.0,0.0]]");
        assert_eq!(serde_json::to_string(&Value::from(3u32)).unwrap(), "3.0");
    }

    #[test]
    fn accessors_match_variant() {
        assert_eq!(Value::from(2.5).as_number(), Some(2.5));
        assert!(Value::from(2.5).as_list().is_none());
        assert_eq!(Value::Grid(vec![vec![1.0]]).as_grid().map(<[_]>::len), Some(1));
    }
}
