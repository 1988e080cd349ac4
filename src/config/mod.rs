mod loader;

pub use loader::{Config, DeviceConfig};
