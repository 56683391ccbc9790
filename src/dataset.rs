use polars::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::domain::AirscopeError;

pub const CODE_COLUMN: &str = "AIRPORT";
pub const NAME_COLUMN: &str = "DISPLAY_AIRPORT_NAME";
pub const CITY_COLUMN: &str = "DISPLAY_AIRPORT_CITY_NAME_FULL";
pub const LATITUDE_COLUMN: &str = "LATITUDE";
pub const LONGITUDE_COLUMN: &str = "LONGITUDE";
/// Name of the column the region is derived into.
pub const STATE_COLUMN: &str = "STATE";

#[derive(Debug, PartialEq)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

#[derive(Debug)]
pub struct FileInfo {
    pub path: PathBuf,
    pub file_size: u64,
    file_type: FileType,
}

/// A row as it comes out of the data file, before the region is derived.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAirport {
    pub code: String,
    pub display_name: String,
    pub city_line: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirportRecord {
    pub code: String,
    pub display_name: String,
    pub city_line: String,
    pub latitude: f64,
    pub longitude: f64,
    pub region: Option<String>,
}

impl AirportRecord {
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// The airports in file order. The position of a record is its canonical row
/// index and is never changed after construction.
#[derive(Debug, Default)]
pub struct Dataset {
    records: Vec<AirportRecord>,
}

impl Dataset {
    pub(crate) fn from_records(records: Vec<AirportRecord>) -> Self {
        Dataset { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&AirportRecord> {
        self.records.get(row)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AirportRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[AirportRecord] {
        &self.records
    }
}

pub fn load_data_file(path: PathBuf) -> Result<Vec<RawAirport>, AirscopeError> {
    let file_info = get_file_info(path)?;
    debug!("Loading {:?}", file_info);
    let frame = match file_info.file_type {
        FileType::CSV => load_csv(&file_info.path)?,
        FileType::PARQUET => load_parquet(&file_info.path)?,
        FileType::ARROW => load_arrow(&file_info.path)?,
    };

    let start_time = Instant::now();
    let df = frame.collect()?;
    let airports = airports_from_frame(&df)?;

    let data_loading_duration = start_time.elapsed().as_millis();
    info!(
        "Loaded {} airports ({} bytes) in {data_loading_duration}ms ...",
        airports.len(),
        file_info.file_size
    );
    Ok(airports)
}

pub fn airports_from_frame(df: &DataFrame) -> Result<Vec<RawAirport>, AirscopeError> {
    let codes = string_column(df, CODE_COLUMN)?;
    let names = string_column(df, NAME_COLUMN)?;
    let cities = string_column(df, CITY_COLUMN)?;
    let latitudes = float_column(df, LATITUDE_COLUMN)?;
    let longitudes = float_column(df, LONGITUDE_COLUMN)?;

    let airports = codes
        .into_iter()
        .zip(names)
        .zip(cities)
        .zip(latitudes.into_iter().zip(longitudes))
        .map(
            |(((code, display_name), city_line), (latitude, longitude))| RawAirport {
                code,
                display_name,
                city_line,
                latitude,
                longitude,
            },
        )
        .collect();
    Ok(airports)
}

fn required_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, AirscopeError> {
    df.column(name)
        .map_err(|_| AirscopeError::MissingColumn(name.to_string()))
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>, AirscopeError> {
    let col = required_column(df, name)?.cast(&DataType::String)?;
    let series = col.str()?;
    Ok(series
        .into_iter()
        .map(|value| value.map(str::to_string).unwrap_or_default())
        .collect())
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<f64>, AirscopeError> {
    let col = required_column(df, name)?.cast(&DataType::Float64)?;
    let series = col.f64()?;
    Ok(series
        .into_iter()
        .map(|value| value.unwrap_or(f64::NAN))
        .collect())
}

fn detect_file_type(path: &Path) -> Result<FileType, AirscopeError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
        _ => Err(AirscopeError::UnknownFileType),
    }
}

fn get_file_info(path: PathBuf) -> Result<FileInfo, AirscopeError> {
    let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AirscopeError::FileNotFound,
        ErrorKind::PermissionDenied => AirscopeError::PermissionDenied,
        _ => AirscopeError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(AirscopeError::LoadingFailed("Not a file!".into()));
    }

    let file_size = metadata.len();
    let file_type = detect_file_type(&path)?;

    Ok(FileInfo {
        path,
        file_size,
        file_type,
    })
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}
