use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{
    AirscopeError, ExplorerConfig, HISTOGRAM_BINS_DEFAULT, TOP_N_DEFAULT, TopN,
    validate_bin_count,
};
use crate::report::PageLayout;

/// Explore US airport data in the terminal or summarize it into a report.
#[derive(Debug, Parser)]
#[command(name = "airscope", version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Log filter used when RUST_LOG is not set (e.g. "debug", "airscope=trace").
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive dashboard.
    Explore {
        /// Airport table (csv, parquet or arrow).
        path: String,

        /// Number of states in the bar chart (5 to 20).
        #[arg(long, default_value_t = TOP_N_DEFAULT)]
        top_n: usize,

        /// Number of bins of the latitude and longitude histograms.
        #[arg(long, default_value_t = HISTOGRAM_BINS_DEFAULT)]
        bins: usize,

        /// Milliseconds to wait for terminal events before redrawing.
        #[arg(long, default_value_t = 100)]
        poll_ms: u64,

        /// File the explorer writes its log to.
        #[arg(long, default_value = "airscope.log")]
        log_file: String,
    },
    /// Write the text report.
    Report {
        /// Airport table (csv, parquet or arrow).
        path: String,

        /// Where to write the report.
        #[arg(short, long, default_value = "us_airports_analysis_report.txt")]
        output: String,

        /// Characters per line.
        #[arg(long, default_value_t = 80)]
        width: usize,

        /// Lines per page, including header and footer.
        #[arg(long, default_value_t = 50)]
        lines_per_page: usize,
    },
}

/// Expands `~` and environment variables in a path given on the command line.
pub fn expand_path(path: &str) -> Result<PathBuf, AirscopeError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| AirscopeError::PathExpansion(e.to_string()))
}

pub fn explorer_config(
    top_n: usize,
    bins: usize,
    poll_ms: u64,
    log_file: &str,
) -> Result<ExplorerConfig, AirscopeError> {
    Ok(ExplorerConfig::default()
        .with_top_n(TopN::new(top_n)?)
        .with_histogram_bins(validate_bin_count(bins)?)
        .with_event_poll_time(poll_ms)
        .with_log_file(Some(expand_path(log_file)?)))
}

pub fn page_layout(width: usize, lines_per_page: usize) -> Result<PageLayout, AirscopeError> {
    if width < 20 {
        return Err(AirscopeError::InvalidParameter {
            name: "page width",
            reason: format!("{width} is less than 20"),
        });
    }
    if lines_per_page < 10 {
        return Err(AirscopeError::InvalidParameter {
            name: "lines per page",
            reason: format!("{lines_per_page} is less than 10"),
        });
    }
    Ok(PageLayout::default()
        .with_width(width)
        .with_lines_per_page(lines_per_page))
}
