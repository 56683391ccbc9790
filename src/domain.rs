use std::path::PathBuf;

use derive_setters::Setters;
use polars::error::PolarsError;
use thiserror::Error;

use crate::registry::ViewId;

pub const TOP_N_MIN: usize = 5;
pub const TOP_N_MAX: usize = 20;
pub const TOP_N_DEFAULT: usize = 10;

pub const HISTOGRAM_BINS_MAX: usize = 100;
pub const HISTOGRAM_BINS_DEFAULT: usize = 20;

pub const HELP_TEXT: &str = "\
 Mouse click   select the airport nearest to the click
 ] / [         move the map cursor to the next / previous airport
 Enter         show the airport under the map cursor
 + / -         show more / fewer states in the bar chart
 f             filter the map to the next top state
 a             show all airports on the map
 y             copy the selected airport to the clipboard
 ?             show this help
 Esc           close this help
 q             quit";

#[derive(Debug, Error)]
pub enum AirscopeError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Loading failed: {0}")]
    LoadingFailed(String),
    #[error("File not found")]
    FileNotFound,
    #[error("Permission denied")]
    PermissionDenied,
    #[error("Unknown file type")]
    UnknownFileType,
    #[error("Missing column \"{0}\"")]
    MissingColumn(String),
    #[error("No values to aggregate for {0}")]
    EmptyInput(&'static str),
    #[error("Mark {position} is outside of the {len} marks registered for {view:?}")]
    UnknownMark {
        view: ViewId,
        position: usize,
        len: usize,
    },
    #[error("Invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("Cannot expand path: {0}")]
    PathExpansion(String),
    #[error("Cannot set up logging: {0}")]
    LoggingFailed(String),
}

/// Number of states shown in the bar chart, bound to [`TOP_N_MIN`]..=[`TOP_N_MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopN(usize);

impl TopN {
    pub fn new(n: usize) -> Result<Self, AirscopeError> {
        if (TOP_N_MIN..=TOP_N_MAX).contains(&n) {
            Ok(TopN(n))
        } else {
            Err(AirscopeError::InvalidParameter {
                name: "top-n count",
                reason: format!("{n} is not within {TOP_N_MIN}..={TOP_N_MAX}"),
            })
        }
    }

    pub fn get(self) -> usize {
        self.0
    }

    pub fn increment(self) -> Self {
        TopN(std::cmp::min(self.0 + 1, TOP_N_MAX))
    }

    pub fn decrement(self) -> Self {
        TopN(std::cmp::max(self.0 - 1, TOP_N_MIN))
    }
}

impl Default for TopN {
    fn default() -> Self {
        TopN(TOP_N_DEFAULT)
    }
}

pub fn validate_bin_count(bins: usize) -> Result<usize, AirscopeError> {
    if (1..=HISTOGRAM_BINS_MAX).contains(&bins) {
        Ok(bins)
    } else {
        Err(AirscopeError::InvalidParameter {
            name: "histogram bin count",
            reason: format!("{bins} is not within 1..={HISTOGRAM_BINS_MAX}"),
        })
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct ExplorerConfig {
    pub event_poll_time: u64,
    pub top_n: TopN,
    pub histogram_bins: usize,
    pub log_file: Option<PathBuf>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        ExplorerConfig {
            event_poll_time: 100,
            top_n: TopN::default(),
            histogram_bins: HISTOGRAM_BINS_DEFAULT,
            log_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    Exit,
    Help,
    Resize(usize, usize),
    IncreaseTopN,
    DecreaseTopN,
    SelectMark(usize),
    MarkCursorNext,
    MarkCursorPrev,
    SelectCursorMark,
    NextMapFilter,
    ClearMapFilter,
    CopyDetail,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_n_bounds() {
        assert!(TopN::new(4).is_err());
        assert!(TopN::new(21).is_err());
        assert_eq!(TopN::new(5).unwrap().get(), 5);
        assert_eq!(TopN::default().get(), 10);
    }

    #[test]
    fn top_n_steps_saturate() {
        let max = TopN::new(TOP_N_MAX).unwrap();
        assert_eq!(max.increment(), max);
        let min = TopN::new(TOP_N_MIN).unwrap();
        assert_eq!(min.decrement(), min);
        assert_eq!(min.increment().get(), TOP_N_MIN + 1);
    }

    #[test]
    fn bin_count_bounds() {
        assert!(validate_bin_count(0).is_err());
        assert_eq!(validate_bin_count(20).unwrap(), 20);
        assert!(validate_bin_count(HISTOGRAM_BINS_MAX + 1).is_err());
    }

    #[test]
    fn config_setters() {
        let cfg = ExplorerConfig::default()
            .with_event_poll_time(50)
            .with_histogram_bins(5);
        assert_eq!(cfg.event_poll_time, 50);
        assert_eq!(cfg.histogram_bins, 5);
        assert_eq!(cfg.top_n, TopN::default());
    }
}
