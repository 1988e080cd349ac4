//! Simulated device profiles
//!
//! A device turns density-independent lengths into physical pixels and
//! measures rendered text, which is what auto-sized (`wrap_content`) widgets
//! need to estimate their box.

mod metrics;

pub use metrics::{Font, FontMetrics, StandardMetrics, TextExtent};

use crate::units::{round_to_i32, Dip, UnitError, DIP_PER_INCH};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::trace;

/// Errors produced by device queries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("Cannot give density: no densityDpi value defined for this device")]
    DensityUnset,
    #[error("Device has no pixel dimensions")]
    DimensionsUnset,
    #[error("Unknown device preset {0:?}")]
    UnknownPreset(String),
    #[error("No glyph data for the {0:?} typeface")]
    FontUnavailable(Font),
    #[error(transparent)]
    Unit(#[from] UnitError),
}

type TextKey = (String, Dip, Font);

/// Display metrics of a device, after Android's `DisplayMetrics`
pub struct AndroidDevice {
    name: String,
    // densityDpi, xdpi and ydpi are usually equal; when xdpi != ydpi a
    // densityDpi is chosen between them.
    density_dpi: Option<u32>,
    xdpi: Option<f64>,
    ydpi: Option<f64>,
    width_pixels: Option<u32>,
    height_pixels: Option<u32>,
    // Accounts for the user's font scale
    scaled_density: Option<f64>,
    metrics: Arc<dyn FontMetrics>,
    text_cache: Mutex<HashMap<TextKey, (i32, i32)>>,
}

impl AndroidDevice {
    pub const PRESETS: [&'static str; 3] = ["galaxy-s3", "nexus-one", "baseline"];

    /// A device with nothing set yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            density_dpi: None,
            xdpi: None,
            ydpi: None,
            width_pixels: None,
            height_pixels: None,
            scaled_density: None,
            metrics: Arc::new(StandardMetrics),
            text_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Samsung Galaxy S3: 306 dpi, 720x1280
    pub fn galaxy_s3() -> Self {
        Self::new("galaxy-s3")
            .with_density_dpi(306)
            .with_dpi(306.0, 306.0)
            .with_scaled_density(306.0 / DIP_PER_INCH)
            .with_pixels(720, 1280)
    }

    /// HTC Nexus One: 240 dpi (hdpi), 480x800
    pub fn nexus_one() -> Self {
        Self::new("nexus-one")
            .with_density_dpi(240)
            .with_dpi(254.0, 254.0)
            .with_scaled_density(1.5)
            .with_pixels(480, 800)
    }

    /// Baseline mdpi screen where one dip is one pixel
    pub fn baseline() -> Self {
        Self::new("baseline")
            .with_density_dpi(160)
            .with_dpi(160.0, 160.0)
            .with_scaled_density(1.0)
            .with_pixels(320, 480)
    }

    pub fn preset(name: &str) -> Result<Self, DeviceError> {
        match name {
            "galaxy-s3" => Ok(Self::galaxy_s3()),
            "nexus-one" => Ok(Self::nexus_one()),
            "baseline" => Ok(Self::baseline()),
            _ => Err(DeviceError::UnknownPreset(name.to_string())),
        }
    }

    pub fn with_density_dpi(mut self, density_dpi: u32) -> Self {
        self.density_dpi = Some(density_dpi);
        self
    }

    pub fn with_dpi(mut self, xdpi: f64, ydpi: f64) -> Self {
        self.xdpi = Some(xdpi);
        self.ydpi = Some(ydpi);
        self
    }

    pub fn with_pixels(mut self, width_pixels: u32, height_pixels: u32) -> Self {
        self.width_pixels = Some(width_pixels);
        self.height_pixels = Some(height_pixels);
        self
    }

    pub fn with_scaled_density(mut self, scaled_density: f64) -> Self {
        self.scaled_density = Some(scaled_density);
        self
    }

    /// Replace the font metrics used by [`AndroidDevice::text_dimensions`]
    pub fn with_metrics(mut self, metrics: Arc<dyn FontMetrics>) -> Self {
        self.metrics = metrics;
        self.text_cache = Mutex::new(HashMap::new());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn density_dpi(&self) -> Option<u32> {
        self.density_dpi
    }

    pub fn xdpi(&self) -> Option<f64> {
        self.xdpi
    }

    pub fn ydpi(&self) -> Option<f64> {
        self.ydpi
    }

    pub fn scaled_density(&self) -> Option<f64> {
        self.scaled_density
    }

    /// Pixels per dip: `densityDpi / 160`
    pub fn density(&self) -> Result<f64, DeviceError> {
        self.density_dpi
            .map(|dpi| f64::from(dpi) / DIP_PER_INCH)
            .ok_or(DeviceError::DensityUnset)
    }

    /// Screen width in dip
    pub fn width(&self) -> Result<Dip, DeviceError> {
        let pixels = self.width_pixels.ok_or(DeviceError::DimensionsUnset)?;
        Ok(Dip::from_pixels(f64::from(pixels), self.density()?))
    }

    /// Screen height in dip
    pub fn height(&self) -> Result<Dip, DeviceError> {
        let pixels = self.height_pixels.ok_or(DeviceError::DimensionsUnset)?;
        Ok(Dip::from_pixels(f64::from(pixels), self.density()?))
    }

    /// Convert a length to pixels on this device
    pub fn to_pixels(&self, length: Dip) -> Result<i32, DeviceError> {
        Ok(length.to_pixels(self.density()?)?)
    }

    /// Convert device pixels back to dip
    pub fn to_dip(&self, pixels: i32) -> Result<Dip, DeviceError> {
        Ok(Dip::from_pixels(f64::from(pixels), self.density()?))
    }

    /// Rendered `(width, height)` in pixels of `text` at `size` in `font`.
    ///
    /// The font size is taken in points and scaled by the vertical dpi.
    /// Results are memoized per `(text, size, font)`.
    pub fn text_dimensions(
        &self,
        text: &str,
        size: Dip,
        font: Font,
    ) -> Result<(i32, i32), DeviceError> {
        let key = (text.to_string(), size, font);
        {
            let cache = self.text_cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(dimensions) = cache.get(&key) {
                return Ok(*dimensions);
            }
        }

        let ydpi = match self.ydpi {
            Some(ydpi) => ydpi,
            None => self.density()? * DIP_PER_INCH,
        };
        let pixels_per_em = size.to_points() * ydpi / 72.0;
        let extent = self.metrics.measure(text, font)?;
        let to_pixels = |ems: f64| {
            let pixels = ems * pixels_per_em;
            round_to_i32(pixels).ok_or_else(|| UnitError::OutOfRange(format!("{}px", pixels)))
        };
        let dimensions = (to_pixels(extent.width)?, to_pixels(extent.height)?);
        trace!("Measured {:?} at {} as {:?}px", text, size, dimensions);

        self.text_cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, dimensions);

        Ok(dimensions)
    }

    /// Number of memoized measurements
    pub fn cached_measurements(&self) -> usize {
        self.text_cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl Clone for AndroidDevice {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            density_dpi: self.density_dpi,
            xdpi: self.xdpi,
            ydpi: self.ydpi,
            width_pixels: self.width_pixels,
            height_pixels: self.height_pixels,
            scaled_density: self.scaled_density,
            metrics: Arc::clone(&self.metrics),
            text_cache: Mutex::new(HashMap::new()),
        }
    }
}

impl fmt::Debug for AndroidDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AndroidDevice")
            .field("name", &self.name)
            .field("density_dpi", &self.density_dpi)
            .field("xdpi", &self.xdpi)
            .field("ydpi", &self.ydpi)
            .field("width_pixels", &self.width_pixels)
            .field("height_pixels", &self.height_pixels)
            .field("scaled_density", &self.scaled_density)
            .field("metrics", &self.metrics)
            .finish()
    }
}
