use crate::device::{AndroidDevice, DeviceError};
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for layoutstat runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Also count app-defined tags (names containing `.`)
    pub custom_tags: bool,

    /// Leave missing CSV cells blank instead of writing 0
    pub blanks: bool,

    /// Directory names skipped during discovery
    pub exclude_dirs: Vec<String>,

    /// File searched for upward from each layout directory
    pub rating_file: String,

    /// Simulated device; without one `wrap_content` widgets stay unsized
    pub device: Option<DeviceConfig>,
}

/// A device preset, or explicit display metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// One of [`AndroidDevice::PRESETS`]; explicit fields override it
    pub preset: Option<String>,
    pub name: Option<String>,
    pub density_dpi: Option<u32>,
    pub xdpi: Option<f64>,
    pub ydpi: Option<f64>,
    pub width_pixels: Option<u32>,
    pub height_pixels: Option<u32>,
    pub scaled_density: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            custom_tags: false,
            blanks: false,
            exclude_dirs: vec![".hg".to_string(), ".git".to_string(), "build".to_string()],
            rating_file: "rating.json".to_string(),
            device: None,
        }
    }
}

impl DeviceConfig {
    pub fn preset(name: impl Into<String>) -> Self {
        Self {
            preset: Some(name.into()),
            ..Self::default()
        }
    }

    /// Build the device these settings describe
    pub fn build(&self) -> std::result::Result<AndroidDevice, DeviceError> {
        let mut device = match &self.preset {
            Some(preset) => AndroidDevice::preset(preset)?,
            None => AndroidDevice::new(self.name.as_deref().unwrap_or("custom")),
        };

        if let Some(density_dpi) = self.density_dpi {
            device = device.with_density_dpi(density_dpi);
        }
        match (self.xdpi, self.ydpi) {
            (Some(xdpi), Some(ydpi)) => device = device.with_dpi(xdpi, ydpi),
            (Some(dpi), None) | (None, Some(dpi)) => device = device.with_dpi(dpi, dpi),
            (None, None) => {}
        }
        if let (Some(width), Some(height)) = (self.width_pixels, self.height_pixels) {
            device = device.with_pixels(width, height);
        }
        if let Some(scaled_density) = self.scaled_density {
            device = device.with_scaled_density(scaled_density);
        }

        // Every measurement needs the density
        device.density()?;

        Ok(device)
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(root: &Path) -> Result<Self> {
        let default_names = [
            ".layoutstat.yml",
            ".layoutstat.yaml",
            ".layoutstat.toml",
            "layoutstat.yml",
            "layoutstat.yaml",
            "layoutstat.toml",
        ];

        for name in &default_names {
            let path = root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        // No config file found, use defaults
        Ok(Self::default())
    }

    /// Load `explicit` if given, else look in `root`
    pub fn load(explicit: Option<&PathBuf>, root: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => Self::from_default_locations(root),
        }
    }

    /// Check if a directory name is excluded from discovery
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|excluded| excluded == name)
    }

    /// The configured device, if any
    pub fn build_device(&self) -> Result<Option<AndroidDevice>> {
        self.device
            .as_ref()
            .map(|device| device.build().into_diagnostic().wrap_err("Invalid device configuration"))
            .transpose()
    }
}
