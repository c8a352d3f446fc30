//! Memory quantity parsing.
//!
//! crictl prints memory as a magnitude followed by a unit suffix, e.g.
//! `20.18MB` or `167.9kB`. Charts are drawn in megabytes, so every quantity
//! is normalized to MB.
//!
//! Two entry points exist:
//! - [`MemoryQuantity::parse`] reports exactly what went wrong.
//! - [`normalize_mb`] never fails: anything unparseable counts as `0.0` MB.
//!
//! Both tools share these rules. A plain number without a suffix is read as
//! MB in both, including the strict two-line tool.

use std::str::FromStr;

/// Memory unit as printed after the magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryUnit {
    /// Bare bytes (`B`). Too small to register on an MB chart.
    Bytes,
    Kilobytes,
    Megabytes,
    Gigabytes,
}

impl MemoryUnit {
    /// Multiplier converting a magnitude in this unit to MB.
    pub fn mb_factor(self) -> f64 {
        match self {
            MemoryUnit::Bytes => 0.0,
            MemoryUnit::Kilobytes => 1.0 / 1024.0,
            MemoryUnit::Megabytes => 1.0,
            MemoryUnit::Gigabytes => 1024.0,
        }
    }
}

/// Recognized suffixes. Two-letter suffixes must come before `B`.
/// `kB` is crictl's spelling of kilobytes and is read as `KB`, not as bytes.
const SUFFIXES: &[(&str, MemoryUnit)] = &[
    ("KB", MemoryUnit::Kilobytes),
    ("kB", MemoryUnit::Kilobytes),
    ("MB", MemoryUnit::Megabytes),
    ("GB", MemoryUnit::Gigabytes),
    ("B", MemoryUnit::Bytes),
];

/// Error returned when a memory string cannot be parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseMemoryError {
    /// Input was empty or whitespace.
    Empty,
    /// Trailing characters are not a known unit.
    UnknownUnit(String),
    /// The numeric part is not a finite number.
    InvalidMagnitude(String),
}

impl std::fmt::Display for ParseMemoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseMemoryError::Empty => write!(f, "empty memory value"),
            ParseMemoryError::UnknownUnit(s) => write!(f, "unknown memory unit in '{}'", s),
            ParseMemoryError::InvalidMagnitude(s) => write!(f, "invalid memory magnitude '{}'", s),
        }
    }
}

impl std::error::Error for ParseMemoryError {}

/// A magnitude with its unit, e.g. `20.18MB`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryQuantity {
    pub magnitude: f64,
    pub unit: MemoryUnit,
}

impl MemoryQuantity {
    /// Parses a memory string.
    ///
    /// A plain number without any suffix is read as megabytes.
    pub fn parse(input: &str) -> Result<Self, ParseMemoryError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ParseMemoryError::Empty);
        }

        let (number, unit) = match SUFFIXES
            .iter()
            .find_map(|&(suffix, unit)| s.strip_suffix(suffix).map(|n| (n, unit)))
        {
            Some(found) => found,
            None if s.ends_with(|c: char| c.is_ascii_digit() || c == '.') => {
                (s, MemoryUnit::Megabytes)
            }
            None => return Err(ParseMemoryError::UnknownUnit(s.to_string())),
        };

        let magnitude = number
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ParseMemoryError::InvalidMagnitude(number.to_string()))?;

        Ok(Self { magnitude, unit })
    }

    /// Value in megabytes.
    pub fn to_mb(self) -> f64 {
        self.magnitude * self.unit.mb_factor()
    }
}

impl FromStr for MemoryQuantity {
    type Err = ParseMemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Converts a memory string to MB, degrading to `0.0` on any parse error.
pub fn normalize_mb(input: &str) -> f64 {
    MemoryQuantity::parse(input).map_or(0.0, MemoryQuantity::to_mb)
}
