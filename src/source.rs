//! Loading raw extracts from disk into a [`RawTable`].

use crate::error::PipelineError;
use crate::process::{RawTable, RawValue};
use arrow::{
    array::{Array, ArrayRef, AsArray},
    compute::cast,
    datatypes::{DataType, Date32Type, Float64Type},
    record_batch::RecordBatch,
};
use csv::ReaderBuilder;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::{borrow::Cow, fs::File, path::Path};
use tracing::{info, warn};

/// Load a CSV or Parquet extract, dispatching on the file extension.
#[tracing::instrument(level = "info", fields(path = %path.display()))]
pub fn load_source(path: &Path) -> Result<RawTable, PipelineError> {
    if !path.is_file() {
        return Err(PipelineError::unavailable(path, "file not found"));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let table = match ext.as_deref() {
        Some("csv") => load_csv(path)?,
        Some("parquet") => load_parquet(path)?,
        _ => return Err(PipelineError::UnsupportedFormat(path.to_path_buf())),
    };

    info!(
        rows = table.num_rows(),
        columns = table.headers.len(),
        "loaded source table"
    );
    Ok(table)
}

/// Every cell arrives as text; blank cells become [`RawValue::Blank`].
/// Bytes that are not valid UTF-8 (Latin-1 exports) are replaced, not fatal.
pub fn load_csv(path: &Path) -> Result<RawTable, PipelineError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| PipelineError::unavailable(path, e))?;

    let mut lossy = 0usize;
    let headers: Vec<String> = rdr
        .byte_headers()
        .map_err(|e| PipelineError::unavailable(path, e))?
        .iter()
        .map(|h| decode_cell(h, &mut lossy))
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in rdr.byte_records().enumerate() {
        let record = result
            .map_err(|e| PipelineError::unavailable(path, format!("record {}: {}", idx, e)))?;
        rows.push(
            record
                .iter()
                .map(|cell| RawValue::from_cell(&decode_cell(cell, &mut lossy)))
                .collect(),
        );
    }

    if lossy > 0 {
        warn!(cells = lossy, "invalid UTF-8 replaced while reading CSV");
    }

    Ok(RawTable::new(headers, rows))
}

fn decode_cell(bytes: &[u8], lossy: &mut usize) -> String {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => {
            *lossy += 1;
            s
        }
    }
}

/// Column values are kept typed where Arrow knows the type: numbers stay
/// numbers, dates and timestamps become calendar days.
pub fn load_parquet(path: &Path) -> Result<RawTable, PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::unavailable(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| PipelineError::unavailable(path, e))?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().to_string())
        .collect();
    let reader = builder
        .build()
        .map_err(|e| PipelineError::unavailable(path, e))?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e| PipelineError::unavailable(path, e))?;
        append_batch_rows(&batch, &mut rows);
    }

    Ok(RawTable::new(headers, rows))
}

fn append_batch_rows(batch: &RecordBatch, rows: &mut Vec<Vec<RawValue>>) {
    let columns: Vec<Vec<RawValue>> = batch
        .schema()
        .fields()
        .iter()
        .zip(batch.columns())
        .map(|(field, col)| column_values(field.name(), col))
        .collect();

    for row in 0..batch.num_rows() {
        rows.push(columns.iter().map(|c| c[row].clone()).collect());
    }
}

fn column_values(name: &str, col: &ArrayRef) -> Vec<RawValue> {
    let target = match col.data_type() {
        dt if dt.is_numeric() => DataType::Float64,
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => DataType::Date32,
        _ => DataType::Utf8,
    };

    let cast_col = match cast(col.as_ref(), &target) {
        Ok(c) => c,
        Err(e) => {
            warn!(column = name, error = %e, "column cannot be read, treating as blank");
            return vec![RawValue::Blank; col.len()];
        }
    };

    (0..cast_col.len())
        .map(|i| {
            if cast_col.is_null(i) {
                return RawValue::Blank;
            }
            match &target {
                DataType::Float64 => {
                    RawValue::Number(cast_col.as_primitive::<Float64Type>().value(i))
                }
                DataType::Date32 => cast_col
                    .as_primitive::<Date32Type>()
                    .value_as_date(i)
                    .map(RawValue::Date)
                    .unwrap_or(RawValue::Blank),
                _ => RawValue::from_cell(cast_col.as_string::<i32>().value(i)),
            }
        })
        .collect()
}
