use std::path::PathBuf;

use airscope::dataset::{Dataset, load_data_file};
use airscope::deriver::derive_regions;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Loads `tests/fixtures/airports.csv` with the states derived.
pub fn airports() -> Dataset {
    derive_regions(load_data_file(fixture("airports.csv")).unwrap())
}
