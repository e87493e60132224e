use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int32Type, Int64Type, TimeUnit,
    TimestampMicrosecondType,
};
use calamine::{Data, DataType as _, Reader, open_workbook_auto};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{CellValue, RawTable};
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load every source in order and stack them into one table.
/// Row order is file order, then original row order within each file.
pub fn load_sources(paths: &[PathBuf]) -> Result<RawTable> {
    if paths.is_empty() {
        return Err(DashboardError::NoSources.into());
    }

    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        let table = load_file(path).with_context(|| format!("loading {}", path.display()))?;
        log::info!(
            "Loaded {} rows x {} columns from {}",
            table.len(),
            table.headers.len(),
            path.display()
        );
        if table.is_empty() {
            log::warn!("{} has a header but no data rows", path.display());
        }
        tables.push(table);
    }

    Ok(RawTable::concat(tables))
}

/// Load a single tabular file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first worksheet, header row first
/// * `.csv`     – header row, cell types guessed per cell
/// * `.parquet` – flat columns of strings, numbers, booleans or dates
pub fn load_file(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_excel(path),
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DashboardError::UnsupportedFormat(other.to_string()).into()),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

fn load_excel(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DashboardError::EmptyWorkbook(path.to_path_buf()))?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(header_text).collect(),
        None => return Ok(RawTable::default()),
    };

    let mut table = RawTable::new(headers);
    for row in rows {
        let cells: Vec<CellValue> = row.iter().map(excel_cell).collect();
        // Trailing formatted-but-empty rows show up in the used range.
        if cells.iter().all(CellValue::is_null) {
            continue;
        }
        table.rows.push(cells);
    }
    Ok(table)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// 2^53: beyond this an f64 no longer holds every integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn excel_cell(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) if s.trim().is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        // Workbooks store every number as a float.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_INTEGER => {
            CellValue::Integer(*f as i64)
        }
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => {
            cell.as_datetime().map_or(CellValue::Null, CellValue::from_datetime)
        }
        Data::DurationIso(s) => CellValue::String(s.clone()),
        _ => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = RawTable::new(headers);
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cells = (0..table.headers.len())
            .map(|i| guess_cell_type(record.get(i).unwrap_or("")))
            .collect();
        table.rows.push(cells);
    }
    Ok(table)
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.trim().is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Works with files written by this tool's snapshot writer as well as by
/// Pandas (`df.to_parquet()`) and Polars (`df.write_parquet()`), including
/// their dictionary-encoded and view string columns.
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut table = RawTable::new(headers);
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns = batch
            .columns()
            .iter()
            .map(normalise_column)
            .collect::<Result<Vec<_>>>()?;

        for row in 0..batch.num_rows() {
            table
                .rows
                .push(columns.iter().map(|col| arrow_cell(col, row)).collect());
        }
    }
    Ok(table)
}

/// Bring a column to one of the types `arrow_cell` reads: timestamps to
/// microseconds, dictionary and view strings to plain strings.
fn normalise_column(col: &ArrayRef) -> Result<ArrayRef> {
    let target = match col.data_type() {
        DataType::Timestamp(TimeUnit::Microsecond, None) => return Ok(col.clone()),
        DataType::Timestamp(_, _) => DataType::Timestamp(TimeUnit::Microsecond, None),
        DataType::Dictionary(_, value) => value.as_ref().clone(),
        DataType::Utf8View => DataType::Utf8,
        _ => return Ok(col.clone()),
    };
    arrow::compute::cast(col, &target)
        .map_err(|e| anyhow!("casting {} column to {target}: {e}", col.data_type()))
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => col
            .as_primitive::<Date32Type>()
            .value_as_date(row)
            .map_or(CellValue::Null, CellValue::Date),
        DataType::Date64 => col
            .as_primitive::<Date64Type>()
            .value_as_date(row)
            .map_or(CellValue::Null, CellValue::Date),
        DataType::Timestamp(TimeUnit::Microsecond, _) => col
            .as_primitive::<TimestampMicrosecondType>()
            .value_as_datetime(row)
            .map_or(CellValue::Null, CellValue::from_datetime),
        other => {
            log::debug!("Unsupported parquet column type {other:?}, reading as null");
            CellValue::Null
        }
    }
}
