/*!
 * Passthrough value types for metadata and style maps.
 *
 * Metadata, global styles and per-line style overrides are opaque to the
 * parsing layer. They are stored as a key-ordered map of string keys to a
 * closed set of value shapes so that arbitrary JSON content survives a
 * round trip without an open dynamic type.
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Map used for `metadata`, `global_style` and `style_overrides`
pub type MetaMap = BTreeMap<String, MetaValue>;

/// A single passthrough value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    List(Vec<MetaValue>),
    Map(MetaMap),
}

impl MetaValue {
    /// Borrow the value as a string slice if it is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Read the value as a float, accepting integers and numeric text
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Read the value as an integer, accepting whole floats and numeric text
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Read the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Map(map) => {
                let parts: Vec<String> = map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<MetaMap> for MetaValue {
    fn from(value: MetaMap) -> Self {
        Self::Map(value)
    }
}

impl<T: Into<MetaValue>> From<Vec<T>> for MetaValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

// Style keys shared by the parsers and the ASS exporter
pub const FONT_FAMILY: &str = "font_family";
pub const FONT_SIZE: &str = "font_size";
pub const FONT_WEIGHT: &str = "font_weight";
pub const TEXT_COLOR: &str = "text_color";
pub const OUTLINE_COLOR: &str = "outline_color";
pub const SHADOW_COLOR: &str = "shadow_color";
pub const POSITION: &str = "position";

/// Global style applied when a source format carries no style table
pub fn default_global_style() -> MetaMap {
    let mut style = MetaMap::new();
    style.insert(FONT_FAMILY.to_string(), "Arial".into());
    style.insert(FONT_SIZE.to_string(), MetaValue::Integer(20));
    style.insert(FONT_WEIGHT.to_string(), "normal".into());
    style.insert(TEXT_COLOR.to_string(), vec![255i64, 255, 255, 255].into());
    style.insert(OUTLINE_COLOR.to_string(), vec![0i64, 0, 0, 255].into());
    style.insert(SHADOW_COLOR.to_string(), vec![0i64, 0, 0, 128].into());
    style.insert(
        POSITION.to_string(),
        MetaValue::List(vec!["center".into(), MetaValue::Integer(0), MetaValue::Integer(50)]),
    );
    style
}
