//! Pure summaries over a [`Dataset`] backing the explorer views and the report.

use std::collections::HashMap;

use tracing::trace;

use crate::dataset::{AirportRecord, Dataset};
use crate::domain::AirscopeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    Latitude,
    Longitude,
}

impl NumericField {
    pub fn value(self, record: &AirportRecord) -> f64 {
        match self {
            NumericField::Latitude => record.latitude,
            NumericField::Longitude => record.longitude,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NumericField::Latitude => "latitude",
            NumericField::Longitude => "longitude",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

impl CategoryCount {
    pub fn new(category: impl Into<String>, count: usize) -> Self {
        CategoryCount {
            category: category.into(),
            count,
        }
    }
}

/// Airports per region, largest first. Airports without a region are only
/// counted in `unknown`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryFrequencies {
    pub counts: Vec<CategoryCount>,
    pub unknown: usize,
}

impl CategoryFrequencies {
    pub fn known_total(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum()
    }

    pub fn total(&self) -> usize {
        self.known_total() + self.unknown
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }
}

/// Histogram bin covering `[lower, upper)`; the last bin of a histogram also
/// contains `upper`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Band covering `(lower, upper]`. Values equal to the smallest edge fall
/// into no band.
#[derive(Debug, Clone, PartialEq)]
pub struct BandCount {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extreme {
    pub row: usize,
    pub record: AirportRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extremes {
    pub north: Extreme,
    pub south: Extreme,
    pub east: Extreme,
    pub west: Extreme,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

pub fn category_frequencies(dataset: &Dataset) -> CategoryFrequencies {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut unknown = 0;
    for record in dataset.iter() {
        match record.region.as_deref() {
            Some(region) => *counts.entry(region).or_insert(0) += 1,
            None => unknown += 1,
        }
    }

    let mut sorted: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount::new(category, count))
        .collect();
    sorted.sort_unstable_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.category.cmp(&b.category))
    });

    trace!(
        "Counted {} regions, {} airports without region",
        sorted.len(),
        unknown
    );
    CategoryFrequencies {
        counts: sorted,
        unknown,
    }
}

pub fn top_n(
    frequencies: &CategoryFrequencies,
    n: usize,
) -> Result<Vec<CategoryCount>, AirscopeError> {
    if n == 0 {
        return Err(AirscopeError::InvalidParameter {
            name: "top-n count",
            reason: "must be positive".to_string(),
        });
    }
    Ok(frequencies.counts.iter().take(n).cloned().collect())
}

fn finite_values(dataset: &Dataset, field: NumericField) -> Vec<f64> {
    dataset
        .iter()
        .map(|r| field.value(r))
        .filter(|v| v.is_finite())
        .collect()
}

fn value_range(values: &[f64], field: NumericField) -> Result<(f64, f64), AirscopeError> {
    if values.is_empty() {
        return Err(AirscopeError::EmptyInput(field.name()));
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok((min, max))
}

pub fn histogram(
    dataset: &Dataset,
    field: NumericField,
    bin_count: usize,
) -> Result<Vec<HistogramBin>, AirscopeError> {
    if bin_count == 0 {
        return Err(AirscopeError::InvalidParameter {
            name: "histogram bin count",
            reason: "must be positive".to_string(),
        });
    }
    let values = finite_values(dataset, field);
    let (min, max) = value_range(&values, field)?;

    if min == max {
        return Ok(vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }]);
    }

    let width = (max - min) / bin_count as f64;
    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            lower: min + i as f64 * width,
            upper: if i + 1 == bin_count {
                max
            } else {
                min + (i + 1) as f64 * width
            },
            count: 0,
        })
        .collect();

    for v in values {
        let mut idx = std::cmp::min(((v - min) / width).floor() as usize, bin_count - 1);
        // Rounding in the division can land a value one bin off its edges.
        if idx > 0 && v < bins[idx].lower {
            idx -= 1;
        } else if idx + 1 < bin_count && v >= bins[idx].upper {
            idx += 1;
        }
        bins[idx].count += 1;
    }
    Ok(bins)
}

pub fn band_counts(
    dataset: &Dataset,
    field: NumericField,
    bands: usize,
) -> Result<Vec<BandCount>, AirscopeError> {
    if bands == 0 {
        return Err(AirscopeError::InvalidParameter {
            name: "band count",
            reason: "must be positive".to_string(),
        });
    }
    let values = finite_values(dataset, field);
    let (min, max) = value_range(&values, field)?;

    let step = (max - min) / bands as f64;
    let edges: Vec<f64> = (0..=bands)
        .map(|i| if i == bands { max } else { min + i as f64 * step })
        .collect();
    let mut counts: Vec<BandCount> = edges
        .windows(2)
        .map(|w| BandCount {
            lower: w[0],
            upper: w[1],
            count: 0,
        })
        .collect();

    for v in values.into_iter().filter(|&v| v > min) {
        let idx = counts
            .iter()
            .position(|band| v <= band.upper)
            .unwrap_or(bands - 1);
        counts[idx].count += 1;
    }
    Ok(counts)
}

pub fn describe(dataset: &Dataset, field: NumericField) -> Result<Summary, AirscopeError> {
    let mut values = finite_values(dataset, field);
    let (min, max) = value_range(&values, field)?;
    values.sort_unstable_by(|a, b| a.total_cmp(b));

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let median = if count % 2 == 0 {
        (values[count / 2 - 1] + values[count / 2]) / 2.0
    } else {
        values[count / 2]
    };
    Ok(Summary {
        count,
        mean,
        median,
        min,
        max,
    })
}

// Index of the first finite value that `better` prefers over every earlier one.
fn first_extreme(
    dataset: &Dataset,
    field: NumericField,
    better: impl Fn(f64, f64) -> bool,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (row, record) in dataset.iter().enumerate() {
        let v = field.value(record);
        if !v.is_finite() {
            continue;
        }
        match best {
            Some((_, current)) if !better(v, current) => {}
            _ => best = Some((row, v)),
        }
    }
    best.map(|(row, _)| row)
}

pub fn geographic_extremes(dataset: &Dataset) -> Result<Extremes, AirscopeError> {
    let extreme = |field: NumericField, better: fn(f64, f64) -> bool| {
        first_extreme(dataset, field, better)
            .and_then(|row| {
                dataset.get(row).map(|record| Extreme {
                    row,
                    record: record.clone(),
                })
            })
            .ok_or(AirscopeError::EmptyInput(field.name()))
    };

    Ok(Extremes {
        north: extreme(NumericField::Latitude, |v, best| v > best)?,
        south: extreme(NumericField::Latitude, |v, best| v < best)?,
        east: extreme(NumericField::Longitude, |v, best| v > best)?,
        west: extreme(NumericField::Longitude, |v, best| v < best)?,
    })
}
