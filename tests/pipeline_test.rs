mod common;

use std::fs::File;
use std::sync::Arc;

use polars::prelude::*;

use airscope::AirscopeError;
use airscope::aggregate::{
    NumericField, category_frequencies, describe, geographic_extremes, histogram, top_n,
};
use airscope::dataset::load_data_file;
use airscope::deriver::derive_regions;
use airscope::domain::{ExplorerConfig, Message};
use airscope::model::Model;
use airscope::registry::ViewId;
use airscope::selection::{DetailView, SelectionState};

#[test]
fn loads_and_derives_states_from_csv() {
    let dataset = common::airports();
    assert_eq!(dataset.len(), 15);

    let first = dataset.get(0).unwrap();
    assert_eq!(first.code, "ANC");
    assert_eq!(first.city_line, "Anchorage, AK");
    assert_eq!(first.region.as_deref(), Some("AK"));

    let unincorporated = dataset.get(13).unwrap();
    assert_eq!(unincorporated.code, "Z9Z");
    assert_eq!(unincorporated.region, None);

    let no_coordinates = dataset.get(14).unwrap();
    assert_eq!(no_coordinates.region.as_deref(), Some("ND"));
    assert!(!no_coordinates.has_coordinates());
}

#[test]
fn city_lines_are_kept_as_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("airports.csv");
    std::fs::write(
        &path,
        "AIRPORT,DISPLAY_AIRPORT_NAME,DISPLAY_AIRPORT_CITY_NAME_FULL,LATITUDE,LONGITUDE\n\
         SPI,Abraham Lincoln Capital,\"Springfield, IL \",39.84,-89.68\n\
         PIA,General Downing - Peoria International,\"Peoria, IL\",40.66,-89.69\n",
    )
    .unwrap();

    let dataset = derive_regions(load_data_file(path).unwrap());
    let springfield = dataset.get(0).unwrap();
    assert_eq!(springfield.city_line, "Springfield, IL ");
    assert_eq!(springfield.region, None);
    assert_eq!(dataset.get(1).unwrap().region.as_deref(), Some("IL"));
}

#[test]
fn aggregates_fixture() {
    let dataset = common::airports();
    let freqs = category_frequencies(&dataset);
    assert_eq!(freqs.unknown, 1);
    assert_eq!(freqs.distinct(), 7);
    assert_eq!(freqs.total(), 15);

    let top: Vec<(String, usize)> = top_n(&freqs, 4)
        .unwrap()
        .into_iter()
        .map(|c| (c.category, c.count))
        .collect();
    assert_eq!(
        top,
        vec![
            ("AK".to_string(), 4),
            ("TX".to_string(), 3),
            ("CA".to_string(), 2),
            ("FL".to_string(), 2),
        ]
    );

    let bins = histogram(&dataset, NumericField::Latitude, 10).unwrap();
    assert_eq!(bins.len(), 10);
    assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 14);

    let latitude = describe(&dataset, NumericField::Latitude).unwrap();
    assert_eq!(latitude.count, 14);

    let extremes = geographic_extremes(&dataset).unwrap();
    assert_eq!(extremes.north.record.code, "BRW");
    assert_eq!(extremes.south.record.code, "HNL");
    assert_eq!(extremes.east.record.code, "BGR");
    assert_eq!(extremes.west.record.code, "HNL");
}

#[test]
fn missing_column_is_reported() {
    let result = load_data_file(common::fixture("no_latitude.csv"));
    match result {
        Err(AirscopeError::MissingColumn(column)) => assert_eq!(column, "LATITUDE"),
        other => panic!("expected a missing column error, got {other:?}"),
    }
}

#[test]
fn unsupported_files_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("airports.txt");
    std::fs::write(&path, "AIRPORT\nANC\n").unwrap();
    assert!(matches!(
        load_data_file(path),
        Err(AirscopeError::UnknownFileType)
    ));
    assert!(matches!(
        load_data_file(dir.path().join("missing.csv")),
        Err(AirscopeError::FileNotFound)
    ));
}

#[test]
fn parquet_matches_csv() {
    let csv = load_data_file(common::fixture("airports.csv")).unwrap();

    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(common::fixture("airports.csv")))
        .unwrap()
        .finish()
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("airports.parquet");
    let mut file = File::create(&path).unwrap();
    ParquetWriter::new(&mut file).finish(&mut df).unwrap();

    let parquet = load_data_file(path).unwrap();
    assert_eq!(parquet.len(), csv.len());
    assert_eq!(parquet[0], csv[0]);
    assert_eq!(parquet[13], csv[13]);
    assert!(parquet[14].latitude.is_nan());
}

#[test]
fn map_selection_resolves_through_registry() {
    let dataset = Arc::new(common::airports());
    let mut model = Model::init("airports.csv", dataset, &ExplorerConfig::default()).unwrap();

    // The airport without coordinates has no mark on the map.
    let mapping = model.registry().mapping(ViewId::Map).unwrap();
    assert_eq!(mapping.len(), 14);
    assert!(!mapping.contains(&14));

    model.update(Some(Message::SelectMark(13))).unwrap();
    assert_eq!(model.selection_state(), SelectionState::Selected(13));

    // Filtering to the top state renumbers the marks.
    model.update(Some(Message::NextMapFilter)).unwrap();
    assert_eq!(
        model.registry().mapping(ViewId::Map).unwrap().as_slice(),
        &[0, 1, 2, 3]
    );
    model.update(Some(Message::SelectMark(2))).unwrap();
    assert_eq!(model.selection_state(), SelectionState::Selected(2));
    match &model.get_uidata().detail {
        DetailView::Record(summary) => {
            assert_eq!(summary.row, 2);
            assert_eq!(summary.title, "Juneau International (JNU)");
        }
        other => panic!("expected record details, got {other:?}"),
    }

    // A mark beyond the filtered map keeps the previous selection.
    model.update(Some(Message::SelectMark(4))).unwrap();
    assert_eq!(model.selection_state(), SelectionState::Selected(2));
}
