//! layoutstat - Statistics over Android layout XML
//!
//! This library models Android layout files as typed element trees and
//! gathers per-application statistics from them.
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **Discovery** - Find each app's `res/layout` and `res/values` directories
//! 2. **Parsing** - Build a [`LayoutTree`] per layout, resolving `@+` resources,
//!    parent sentinels and, with a simulated [`AndroidDevice`], `wrap_content`
//! 3. **Analysis** - Count tags and buttons, measure button coverage
//! 4. **Reporting** - Merge one row per app into a CSV file

pub mod analysis;
pub mod config;
pub mod device;
pub mod discovery;
pub mod model;
pub mod parser;
pub mod report;
pub mod resources;
pub mod units;

pub use analysis::{AppAnalyzer, AppStats, Stat};
pub use config::Config;
pub use device::AndroidDevice;
pub use discovery::{find_packages, AppPackage};
pub use model::{Element, ElementId, LayoutError, LayoutTree};
pub use parser::LayoutParser;
pub use report::CsvReport;
pub use resources::ResourceResolver;
pub use units::{parse_length, Dip};
