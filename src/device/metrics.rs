use super::DeviceError;
use once_cell::sync::Lazy;
use rusttype::{point, Font as Face, Scale};
use serde::{Deserialize, Serialize};
use std::fmt;

static SANS: Lazy<Option<Face<'static>>> =
    Lazy::new(|| Face::try_from_bytes(include_bytes!("../../assets/fonts/DejaVuSans.ttf") as &[u8]));
static SERIF: Lazy<Option<Face<'static>>> =
    Lazy::new(|| Face::try_from_bytes(include_bytes!("../../assets/fonts/DejaVuSerif.ttf") as &[u8]));
static MONOSPACE: Lazy<Option<Face<'static>>> =
    Lazy::new(|| Face::try_from_bytes(include_bytes!("../../assets/fonts/DejaVuSansMono.ttf") as &[u8]));

/// Typeface family used to measure text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Font {
    #[default]
    SansSerif,
    Serif,
    Monospace,
}

impl Font {
    /// Map an `android:typeface` value; `normal`, `sans` and anything unknown are sans-serif
    pub fn from_typeface(typeface: &str) -> Self {
        match typeface {
            "monospace" => Font::Monospace,
            "serif" => Font::Serif,
            _ => Font::SansSerif,
        }
    }

    fn face(self) -> Option<&'static Face<'static>> {
        let face: &'static Lazy<Option<Face<'static>>> = match self {
            Font::SansSerif => &SANS,
            Font::Serif => &SERIF,
            Font::Monospace => &MONOSPACE,
        };
        Lazy::force(face).as_ref()
    }
}

/// Extent of a run of text, in multiples of the font size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextExtent {
    pub width: f64,
    pub height: f64,
}

/// Source of glyph metrics for text measurement
pub trait FontMetrics: Send + Sync + fmt::Debug {
    /// Measure `text` set in `font` at a size of 1 em
    fn measure(&self, text: &str, font: Font) -> Result<TextExtent, DeviceError>;
}

/// Metrics of the bundled DejaVu faces, read with rusttype.
///
/// Width is the kerned advance of the widest line. Height is one
/// ascent-to-descent box per line with the face's line gap between lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMetrics;

impl FontMetrics for StandardMetrics {
    fn measure(&self, text: &str, font: Font) -> Result<TextExtent, DeviceError> {
        let face = font.face().ok_or(DeviceError::FontUnavailable(font))?;

        // rusttype scales by ascent - descent; rescale so one unit is one em
        let unscaled = face.v_metrics_unscaled();
        let scale = Scale::uniform((unscaled.ascent - unscaled.descent) / f32::from(face.units_per_em()));
        let v_metrics = face.v_metrics(scale);

        let lines: Vec<&str> = text.split('\n').collect();
        let widest = lines
            .iter()
            .map(|line| line_width(face, line, scale))
            .fold(0.0_f32, f32::max);

        let count = lines.len() as f32;
        let line_height = v_metrics.ascent - v_metrics.descent;

        Ok(TextExtent {
            width: f64::from(widest),
            height: f64::from(line_height * count + v_metrics.line_gap * (count - 1.0)),
        })
    }
}

fn line_width(face: &Face<'_>, line: &str, scale: Scale) -> f32 {
    face.layout(line, scale, point(0.0, 0.0))
        .last()
        .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}
