//! Hex color strings

use std::fmt::{self, Display};
use std::str::FromStr;

/// A color parsed from `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`
///
/// Remembers whether alpha was written so formatting round-trips the short alpha-less form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: Option<u8>,
}

impl FromStr for HexColor {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').ok_or(())?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(());
        }
        let digits: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8).ok_or(()))
            .collect::<Result<_, _>>()?;
        let (channels, alpha) = match digits.len() {
            3 | 4 => (
                digits.iter().map(|d| d * 17).collect::<Vec<_>>(),
                digits.len() == 4,
            ),
            6 | 8 => (
                digits.chunks(2).map(|p| p[0] * 16 + p[1]).collect(),
                digits.len() == 8,
            ),
            _ => return Err(()),
        };
        Ok(HexColor {
            r: channels[0],
            g: channels[1],
            b: channels[2],
            a: alpha.then(|| channels[3]),
        })
    }
}

impl Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if let Some(a) = self.a {
            write!(f, "{a:02x}")?;
        }
        Ok(())
    }
}

fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8
}

impl HexColor {
    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Per channel interpolation.
    ///
    /// Alpha is carried if either side has it, a missing alpha counts as opaque.
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        let a = match (self.a, other.a) {
            (None, None) => None,
            (a0, a1) => Some(lerp_channel(a0.unwrap_or(255), a1.unwrap_or(255), t)),
        };
        HexColor {
            r: lerp_channel(self.r, other.r, t),
            g: lerp_channel(self.g, other.g, t),
            b: lerp_channel(self.b, other.b, t),
            a,
        }
    }
}
