use rayon::prelude::*;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::dataset::{AirportRecord, Dataset, RawAirport};

static REGION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r", ([A-Z]{2})$").expect("region pattern is valid"));

/// Extracts the two letter state code from a "City, ST" line.
///
/// Returns `None` when the line does not end in a comma, a single space and
/// exactly two uppercase letters. An empty code is never produced, so a
/// missing region can not be confused with a real one.
pub fn derive_region(city_line: &str) -> Option<String> {
    REGION_PATTERN
        .captures(city_line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Builds the dataset by attaching a derived region to every airport.
///
/// Rows keep their input order. Rows without a recognizable region are kept
/// with `region == None`.
pub fn derive_regions(airports: Vec<RawAirport>) -> Dataset {
    let records: Vec<AirportRecord> = airports
        .into_par_iter()
        .enumerate()
        .map(|(row, airport)| {
            let region = derive_region(&airport.city_line);
            if region.is_none() {
                debug!(
                    "Row {row} ({}): no region in \"{}\"",
                    airport.code, airport.city_line
                );
            }
            AirportRecord {
                code: airport.code,
                display_name: airport.display_name,
                city_line: airport.city_line,
                latitude: airport.latitude,
                longitude: airport.longitude,
                region,
            }
        })
        .collect();

    let mismatches = records.iter().filter(|r| r.region.is_none()).count();
    if mismatches > 0 {
        info!(
            "{mismatches} of {} airports have no derivable region",
            records.len()
        );
    }
    Dataset::from_records(records)
}
