//! Android layout length units
//!
//! Every length in a layout resource is normalized to [`Dip`], Android's
//! density-independent pixel (1/160 of an inch). Physical units are converted
//! through inches; scaled pixels are taken as dip.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Sentinel: size to the parent's corresponding dimension.
pub const MATCH_PARENT: &str = "match_parent";
/// Pre-API-8 spelling of [`MATCH_PARENT`].
pub const FILL_PARENT: &str = "fill_parent";
/// Sentinel: size to the element's own content.
pub const WRAP_CONTENT: &str = "wrap_content";

/// Dip per inch at the baseline density.
pub const DIP_PER_INCH: f64 = 160.0;

const INCHES_PER_MILLIMETER: f64 = 3.937_007_874_02e-2;
const POINTS_PER_INCH: f64 = 72.0;
const PICAS_PER_INCH: f64 = 6.0;

/// Errors produced while reading a length attribute
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("empty length value")]
    Empty,
    #[error("no recognized unit in length {0:?}")]
    UnknownUnit(String),
    #[error("length {0:?} does not start with an integer in range")]
    InvalidNumber(String),
    #[error("{0} does not fit in a 32-bit length")]
    OutOfRange(String),
}

/// Device-independent pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Dip(pub i32);

/// Length unit suffixes accepted in layout attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Dip,
    ScaledPixel,
    Inch,
    Millimeter,
    Centimeter,
    Point,
    Pica,
}

impl Unit {
    // Matched by anchored suffix; no entry is a suffix of another.
    const SUFFIXES: [(&'static str, Unit); 9] = [
        ("dip", Unit::Dip),
        ("sip", Unit::ScaledPixel),
        ("dp", Unit::Dip),
        ("sp", Unit::ScaledPixel),
        ("in", Unit::Inch),
        ("mm", Unit::Millimeter),
        ("cm", Unit::Centimeter),
        ("pt", Unit::Point),
        ("pc", Unit::Pica),
    ];

    /// `None` when the converted length does not fit a [`Dip`]
    fn to_dip(self, value: i32) -> Option<Dip> {
        let value = f64::from(value);
        let dips = match self {
            Unit::Dip | Unit::ScaledPixel => value,
            Unit::Inch => value * DIP_PER_INCH,
            Unit::Millimeter => value * INCHES_PER_MILLIMETER * DIP_PER_INCH,
            Unit::Centimeter => value * 10.0 * INCHES_PER_MILLIMETER * DIP_PER_INCH,
            Unit::Point => value / POINTS_PER_INCH * DIP_PER_INCH,
            Unit::Pica => value / PICAS_PER_INCH * DIP_PER_INCH,
        };
        round_to_i32(dips).map(Dip)
    }
}

impl Dip {
    pub const ZERO: Dip = Dip(0);

    pub fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn value(self) -> i32 {
        self.0
    }

    fn from_raw(value: f64) -> Self {
        Self(value.round() as i32)
    }

    /// Scaled pixels are treated as dip. This ignores the user's font scale,
    /// which no input currently provides.
    pub fn from_sp(sp: f64) -> Self {
        Self::from_raw(sp)
    }

    pub fn from_inches(inches: f64) -> Self {
        Self::from_raw(inches * DIP_PER_INCH)
    }

    pub fn from_millimeters(mm: f64) -> Self {
        Self::from_inches(mm * INCHES_PER_MILLIMETER)
    }

    pub fn from_centimeters(cm: f64) -> Self {
        Self::from_millimeters(cm * 10.0)
    }

    pub fn from_points(points: f64) -> Self {
        Self::from_inches(points / POINTS_PER_INCH)
    }

    pub fn from_picas(picas: f64) -> Self {
        Self::from_inches(picas / PICAS_PER_INCH)
    }

    /// Convert device pixels back to dip for a density scalar (dpi / 160)
    pub fn from_pixels(pixels: f64, density: f64) -> Self {
        Self::from_raw(pixels / density)
    }

    pub fn to_inches(self) -> f64 {
        f64::from(self.0) / DIP_PER_INCH
    }

    /// Typographic points, used to size fonts
    pub fn to_points(self) -> f64 {
        self.to_inches() * POINTS_PER_INCH
    }

    /// Device pixels for a density scalar (dpi / 160)
    pub fn to_pixels(self, density: f64) -> Result<i32, UnitError> {
        let pixels = f64::from(self.0) * density;
        round_to_i32(pixels).ok_or_else(|| UnitError::OutOfRange(format!("{}px", pixels)))
    }
}

impl From<i32> for Dip {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Dip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}dp", self.0)
    }
}

/// Parse an Android length attribute such as `"16dp"` or `"1 in"`.
///
/// Whitespace anywhere in the value is ignored. The unit must be one of
/// `dp`, `dip`, `sp`, `sip`, `in`, `mm`, `cm`, `pt`, `pc`, and the number in
/// front of it must be an integer. Sentinels like `match_parent` are not
/// lengths and fail with [`UnitError::UnknownUnit`].
pub fn parse_length(raw: &str) -> Result<Dip, UnitError> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(UnitError::Empty);
    }

    let (number, unit) = Unit::SUFFIXES
        .iter()
        .find_map(|(suffix, unit)| compact.strip_suffix(suffix).map(|n| (n, *unit)))
        .ok_or_else(|| UnitError::UnknownUnit(raw.to_string()))?;

    let value: i32 = number
        .parse()
        .map_err(|_| UnitError::InvalidNumber(raw.to_string()))?;

    unit.to_dip(value)
        .ok_or_else(|| UnitError::InvalidNumber(raw.to_string()))
}

/// Nearest `i32`, or `None` outside its range
pub(crate) fn round_to_i32(value: f64) -> Option<i32> {
    let rounded = value.round();
    (rounded >= f64::from(i32::MIN) && rounded <= f64::from(i32::MAX)).then_some(rounded as i32)
}

/// True for `match_parent` and its older alias `fill_parent`
pub fn is_parent_sentinel(value: &str) -> bool {
    value == MATCH_PARENT || value == FILL_PARENT
}
