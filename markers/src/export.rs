use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::Path;

use polars::df;
use polars::prelude::{DataFrame, ParquetWriter};

use crate::constant::DataError;
use crate::marker::{Marker, MarkerRecord};

pub fn markers_to_records(markers: &[Marker]) -> Vec<MarkerRecord> {
    markers.iter().map(MarkerRecord::from).collect()
}

pub fn markers_to_dataframe(markers: &[Marker]) -> Result<DataFrame, DataError> {
    let marker_type: Vec<String> = markers.iter().map(|x| x.marker_type.to_string()).collect();
    let start_date: Vec<i64> = markers
        .iter()
        .map(|x| x.start_date.timestamp_millis())
        .collect();
    let main_date: Vec<i64> = markers
        .iter()
        .map(|x| x.main_date.timestamp_millis())
        .collect();
    let stop_date: Vec<i64> = markers
        .iter()
        .map(|x| x.stop_date.timestamp_millis())
        .collect();
    let duration_days: Vec<i64> = markers.iter().map(|x| x.duration_days()).collect();
    let value0: Vec<f64> = markers.iter().map(|x| x.values[0]).collect();
    let value1: Vec<f64> = markers.iter().map(|x| x.values[1]).collect();
    let value2: Vec<f64> = markers.iter().map(|x| x.values[2]).collect();

    let df = df!(
        "marker_type" => marker_type,
        "start_date" => start_date,
        "main_date" => main_date,
        "stop_date" => stop_date,
        "duration_days" => duration_days,
        "value0" => value0,
        "value1" => value1,
        "value2" => value2
    )?;
    Ok(df)
}

pub fn write_markers_csv<W: Write>(writer: W, markers: &[Marker]) -> Result<(), DataError> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in markers_to_records(markers) {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_markers_parquet(path: impl AsRef<Path>, markers: &[Marker]) -> Result<(), DataError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    let mut df = markers_to_dataframe(markers)?;
    ParquetWriter::new(&mut file).finish(&mut df)?;
    Ok(())
}
