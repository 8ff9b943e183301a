//! Attribute values and how a pair of them is interpolated

use std::fmt::{self, Display};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{color::HexColor, morph::morph_path};

/// The value of a single attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl AttrValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Number(n) => write!(f, "{n}"),
            AttrValue::Text(s) => write!(f, "{s}"),
        }
    }
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Path command strings are recognized by their leading move, a command followed by a coordinate
pub fn is_path_data(s: &str) -> bool {
    static MOVE_TO: OnceLock<Regex> = OnceLock::new();
    MOVE_TO
        .get_or_init(|| Regex::new(r"^\s*[Mm][\s,]*[-+.\d]").unwrap())
        .is_match(s)
}

/// Interpolates text that is either a pair of colors or a pair of paths, holding `a` otherwise
pub fn interpolate_text(a: &str, b: &str, t: f64) -> String {
    if let (Some(ca), Some(cb)) = (HexColor::parse(a), HexColor::parse(b)) {
        return ca.lerp(&cb, t).to_string();
    }
    if is_path_data(a) && is_path_data(b) {
        return morph_path(a, b, t);
    }
    a.to_string()
}

/// Interpolates two attribute values by what they hold.
///
/// Numbers interpolate linearly, hex colors per channel, path data by morphing. Anything else,
/// including a pair of different kinds, holds `a` for the whole span.
pub fn interpolate_attribute(a: &AttrValue, b: &AttrValue, t: f64) -> AttrValue {
    match (a, b) {
        (AttrValue::Number(a), AttrValue::Number(b)) => AttrValue::Number(lerp(*a, *b, t)),
        (AttrValue::Text(a), AttrValue::Text(b)) => AttrValue::Text(interpolate_text(a, b, t)),
        _ => {
            if std::mem::discriminant(a) != std::mem::discriminant(b) {
                log::debug!("Holding {a} against mismatched {b}");
            }
            a.clone()
        }
    }
}
