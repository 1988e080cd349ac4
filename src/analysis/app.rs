use super::rating::{read_rating_stats, RatingError};
use super::stats::{mean, Stat, Summary};
use super::tags::{count_layout_buttons, count_tags, merge_counts};
use crate::config::Config;
use crate::device::AndroidDevice;
use crate::discovery::{layout_files, AppPackage};
use crate::parser::{LayoutParser, XmlDocument, XmlError};
use crate::resources::ResourceResolver;
use miette::Result;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Statistics of one application, one CSV row
#[derive(Debug, Clone, PartialEq)]
pub struct AppStats {
    /// Location of the first layout directory
    pub package: String,
    pub layout_count: usize,
    pub tags: BTreeMap<String, usize>,
    pub buttons: Summary,
    /// Mean share of a root layout covered by buttons
    pub ratio_mean: Stat,
    pub layouts_modelled: usize,
    pub layouts_skipped: usize,
    pub decode_errors: usize,
    pub rating: BTreeMap<String, String>,
}

impl AppStats {
    /// CSV cells keyed by column name
    pub fn to_row(&self) -> BTreeMap<String, String> {
        let mut row: BTreeMap<String, String> = self
            .tags
            .iter()
            .map(|(tag, count)| (tag.clone(), count.to_string()))
            .collect();

        row.extend(
            self.buttons
                .entries("buttons")
                .into_iter()
                .map(|(key, stat)| (key, stat.to_string())),
        );
        row.extend(self.rating.clone());

        row.insert("package".to_string(), self.package.clone());
        row.insert("layoutCount".to_string(), self.layout_count.to_string());
        row.insert("ratio_mean".to_string(), self.ratio_mean.to_string());
        row.insert("layouts_modelled".to_string(), self.layouts_modelled.to_string());
        row.insert("layouts_skipped".to_string(), self.layouts_skipped.to_string());
        row.insert("decode_errors".to_string(), self.decode_errors.to_string());

        row
    }
}

/// What became of one layout file
#[derive(Debug, Default)]
struct LayoutOutcome {
    tags: BTreeMap<String, usize>,
    buttons: Option<usize>,
    ratio: Option<f64>,
    modelled: bool,
    decode_error: bool,
}

/// Analyzes the layouts of application packages
pub struct AppAnalyzer<'a> {
    config: &'a Config,
    device: Option<&'a AndroidDevice>,
    parallel: bool,
}

impl<'a> AppAnalyzer<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            device: None,
            parallel: false,
        }
    }

    /// Simulate `device` when sizing `wrap_content` widgets
    pub fn with_device(mut self, device: Option<&'a AndroidDevice>) -> Self {
        self.device = device;
        self
    }

    /// Analyze layout files in parallel
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Analyze every package, dropping the ones that yield no row
    pub fn analyze_all<F>(&self, packages: &[AppPackage], on_done: F) -> Result<Vec<AppStats>>
    where
        F: Fn() + Sync,
    {
        let results: Vec<Result<Option<AppStats>>> = if self.parallel {
            packages
                .par_iter()
                .map(|package| {
                    let stats = self.analyze(package);
                    on_done();
                    stats
                })
                .collect()
        } else {
            packages
                .iter()
                .map(|package| {
                    let stats = self.analyze(package);
                    on_done();
                    stats
                })
                .collect()
        };

        let mut rows = Vec::new();
        for result in results {
            if let Some(stats) = result? {
                rows.push(stats);
            }
        }
        Ok(rows)
    }

    /// Statistics of one package.
    ///
    /// `None` when the package has no layouts or no rating can be found.
    pub fn analyze(&self, package: &AppPackage) -> Result<Option<AppStats>> {
        let Some(location) = package.location() else {
            debug!("Skipping package without layouts");
            return Ok(None);
        };

        let mut files = Vec::new();
        for dir in &package.layout_dirs {
            files.extend(layout_files(dir)?);
        }
        if files.is_empty() {
            debug!("Skipping {}: no layouts", location.display());
            return Ok(None);
        }

        let rating = match read_rating_stats(location, &self.config.rating_file) {
            Ok(rating) => rating,
            Err(e @ RatingError::NotFound { .. }) => {
                warn!("Can't get rating: {}", e);
                return Ok(None);
            }
            Err(e) => {
                warn!("Skipping {}: {}", location.display(), e);
                return Ok(None);
            }
        };

        let resources = ResourceResolver::new(package.values_dirs.clone());
        let parser = LayoutParser::new(&resources, self.device);

        let outcomes: Vec<LayoutOutcome> = if self.parallel {
            files.par_iter().map(|file| self.analyze_layout(&parser, file)).collect()
        } else {
            files.iter().map(|file| self.analyze_layout(&parser, file)).collect()
        };

        let decode_errors = outcomes.iter().filter(|o| o.decode_error).count();
        if decode_errors > 0 {
            let plural = if decode_errors == 1 { "" } else { "s" };
            warn!("{} Unicode decode error{} in {}", decode_errors, plural, location.display());
        }

        let mut tags = BTreeMap::new();
        let mut button_counts = Vec::new();
        let mut ratios = Vec::new();
        let mut modelled = 0;
        for outcome in outcomes.iter().filter(|o| !o.decode_error) {
            merge_counts(&mut tags, outcome.tags.clone());
            button_counts.extend(outcome.buttons.map(|count| count as f64));
            ratios.extend(outcome.ratio);
            if outcome.modelled {
                modelled += 1;
            }
        }

        Ok(Some(AppStats {
            package: location.display().to_string(),
            layout_count: files.len(),
            tags,
            buttons: Summary::of(&button_counts),
            ratio_mean: mean(&ratios).into(),
            layouts_modelled: modelled,
            layouts_skipped: files.len() - decode_errors - modelled,
            decode_errors,
            rating,
        }))
    }

    fn analyze_layout(&self, parser: &LayoutParser<'_>, file: &Path) -> LayoutOutcome {
        let document = match XmlDocument::read(file) {
            Ok(document) => document,
            Err(XmlError::Decode(_)) => {
                return LayoutOutcome {
                    decode_error: true,
                    ..LayoutOutcome::default()
                }
            }
            Err(e) => {
                warn!("Skipping {}: {}", file.display(), e);
                return LayoutOutcome::default();
            }
        };

        let mut outcome = LayoutOutcome {
            tags: count_tags(&document, self.config.custom_tags),
            buttons: Some(count_layout_buttons(&document)),
            ..LayoutOutcome::default()
        };

        match parser.parse_document(&document) {
            Ok(tree) => {
                outcome.modelled = true;
                outcome.ratio = tree.root().and_then(|root| match tree.button_ratio(root) {
                    Ok(ratio) => Some(ratio),
                    Err(e) => {
                        debug!("No button ratio for {}: {}", file.display(), e);
                        None
                    }
                });
            }
            Err(e) if e.is_not_supported() => {
                debug!("Not modelling {}: {}", file.display(), e);
            }
            Err(e) => {
                warn!("Failed to model {}: {}", file.display(), e);
            }
        }

        outcome
    }
}
