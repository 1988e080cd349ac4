//! Per-application layout statistics

mod app;
mod rating;
mod stats;
mod tags;

pub use app::{AppAnalyzer, AppStats};
pub use rating::{find_rating_file, read_rating_stats, RatingError};
pub use stats::{mean, median, mode, pvariance, stdev, Stat, Summary};
pub use tags::{count_app_tags, count_layout_buttons, count_tags, TAG_PREFIX};
