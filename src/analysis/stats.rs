use std::collections::BTreeMap;
use std::fmt;

/// A statistic that may be undefined for its input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stat {
    Value(f64),
    /// Not available: too few values, or no single answer
    NA,
}

impl Stat {
    pub fn value(self) -> Option<f64> {
        match self {
            Stat::Value(value) => Some(value),
            Stat::NA => None,
        }
    }

    pub fn is_na(self) -> bool {
        matches!(self, Stat::NA)
    }
}

impl From<Option<f64>> for Stat {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Stat::NA, Stat::Value)
    }
}

/// Whole numbers print without a fraction
impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stat::NA => write!(f, "NA"),
            Stat::Value(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                write!(f, "{}", *value as i64)
            }
            Stat::Value(value) => write!(f, "{}", value),
        }
    }
}

/// Summary statistics of a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub mean: Stat,
    pub median: Stat,
    pub mode: Stat,
    pub min: Stat,
    pub max: Stat,
    /// Population variance
    pub pvariance: Stat,
    /// Sample standard deviation
    pub stdev: Stat,
}

impl Summary {
    pub fn of(values: &[f64]) -> Self {
        Self {
            mean: mean(values).into(),
            median: median(values).into(),
            mode: mode(values).into(),
            min: values.iter().copied().reduce(f64::min).into(),
            max: values.iter().copied().reduce(f64::max).into(),
            pvariance: pvariance(values).into(),
            stdev: stdev(values).into(),
        }
    }

    /// Named entries, prefixed with `prefix_`
    pub fn entries(&self, prefix: &str) -> BTreeMap<String, Stat> {
        [
            ("mean", self.mean),
            ("median", self.median),
            ("mode", self.mode),
            ("min", self.min),
            ("max", self.max),
            ("pvariance", self.pvariance),
            ("stdev", self.stdev),
        ]
        .into_iter()
        .map(|(name, stat)| (format!("{}_{}", prefix, name), stat))
        .collect()
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Middle value; the mean of the two middle values for even counts
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// The single most common value; `None` when several tie
pub fn mode(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut runs: Vec<(f64, usize)> = Vec::new();
    for value in sorted {
        match runs.last_mut() {
            Some((last, count)) if *last == value => *count += 1,
            _ => runs.push((value, 1)),
        }
    }

    let best = runs.iter().map(|(_, count)| *count).max()?;
    let mut modes = runs.iter().filter(|(_, count)| *count == best);
    match (modes.next(), modes.next()) {
        (Some((value, _)), None) => Some(*value),
        _ => None,
    }
}

fn sum_of_squares(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    Some(values.iter().map(|v| (v - mean).powi(2)).sum())
}

/// Population variance; needs at least one value
pub fn pvariance(values: &[f64]) -> Option<f64> {
    Some(sum_of_squares(values)? / values.len() as f64)
}

/// Sample standard deviation; needs at least two values
pub fn stdev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    Some((sum_of_squares(values)? / (values.len() - 1) as f64).sqrt())
}
