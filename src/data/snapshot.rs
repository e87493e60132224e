use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::{Format, Workbook};

use super::model::{CellValue, ColumnKind, ColumnSlot, SalesRecord, TableSchema};
use crate::error::DashboardError;

/// Excel caps a sheet at 1,048,576 rows, one of which is the header.
const XLSX_MAX_DATA_ROWS: usize = 1_048_575;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Write `records` to `path`, replacing whatever is there. Dispatch by extension:
/// `.xlsx` (one sheet, dates as Excel dates, missing values as empty cells),
/// `.csv` (dates ISO-8601, missing values empty) or `.parquet`.
///
/// There is no temp-file swap: a crash mid-write leaves a partial file.
pub fn write_snapshot<'a, I>(path: &Path, schema: &TableSchema, records: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let written = match ext.as_str() {
        "xlsx" => write_xlsx(path, schema, records)?,
        "csv" => write_csv(path, schema, records)?,
        "parquet" | "pq" => write_parquet(path, schema, records)?,
        other => return Err(DashboardError::UnsupportedFormat(other.to_string()).into()),
    };

    log::info!("Wrote {written} rows to {}", path.display());
    Ok(written)
}

// ---------------------------------------------------------------------------
// Excel writer
// ---------------------------------------------------------------------------

fn write_xlsx<'a, I>(path: &Path, schema: &TableSchema, records: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    for (col, header) in schema.headers.iter().enumerate() {
        sheet
            .write_string(0, col as u16, header)
            .context("writing xlsx header")?;
    }

    let mut written = 0;
    for rec in records {
        if written == XLSX_MAX_DATA_ROWS {
            anyhow::bail!("snapshot has more rows than an xlsx sheet holds ({XLSX_MAX_DATA_ROWS})");
        }
        let row = written as u32 + 1;
        for (col, cell) in schema.row_cells(rec).iter().enumerate() {
            let col = col as u16;
            let result = match cell {
                CellValue::Null => continue,
                CellValue::String(v) => sheet.write_string(row, col, v),
                CellValue::Integer(v) => sheet.write_number(row, col, *v as f64),
                CellValue::Float(v) => sheet.write_number(row, col, *v),
                CellValue::Bool(v) => sheet.write_boolean(row, col, *v),
                CellValue::Date(d) => sheet.write_datetime_with_format(row, col, d, &date_format),
                CellValue::DateTime(dt) => {
                    sheet.write_datetime_with_format(row, col, dt, &datetime_format)
                }
            };
            result.with_context(|| format!("writing xlsx row {written}"))?;
        }
        written += 1;
    }

    workbook.save(path).context("saving xlsx snapshot")?;
    Ok(written)
}

// ---------------------------------------------------------------------------
// CSV writer
// ---------------------------------------------------------------------------

fn write_csv<'a, I>(path: &Path, schema: &TableSchema, records: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    let mut writer = csv::Writer::from_path(path).context("creating CSV snapshot")?;
    writer
        .write_record(&schema.headers)
        .context("writing CSV header")?;

    let mut written = 0;
    for rec in records {
        let fields: Vec<String> = schema
            .row_cells(rec)
            .iter()
            .map(CellValue::to_string)
            .collect();
        writer
            .write_record(&fields)
            .with_context(|| format!("writing CSV row {written}"))?;
        written += 1;
    }
    writer.flush().context("flushing CSV snapshot")?;
    Ok(written)
}

// ---------------------------------------------------------------------------
// Parquet writer
// ---------------------------------------------------------------------------

fn write_parquet<'a, I>(path: &Path, schema: &TableSchema, records: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    let records: Vec<&SalesRecord> = records.into_iter().collect();

    let mut fields = Vec::with_capacity(schema.slots.len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.slots.len());
    for (header, slot) in schema.headers.iter().zip(&schema.slots) {
        let kind = match slot {
            ColumnSlot::Known(col) => col.kind(),
            ColumnSlot::Extra(_) => ColumnKind::Text,
        };
        let cells = records.iter().map(|rec| match slot {
            ColumnSlot::Known(col) => rec.cell(*col),
            ColumnSlot::Extra(i) => rec.extra.get(*i).cloned().unwrap_or(CellValue::Null),
        });

        let (data_type, array): (DataType, ArrayRef) = match kind {
            ColumnKind::Text => (
                DataType::Utf8,
                Arc::new(StringArray::from_iter(
                    cells.map(|c| (!c.is_null()).then(|| c.to_string())),
                )),
            ),
            ColumnKind::Number => (
                DataType::Float64,
                Arc::new(Float64Array::from_iter(cells.map(|c| c.as_f64()))),
            ),
            ColumnKind::Date => (
                DataType::Timestamp(TimeUnit::Microsecond, None),
                Arc::new(TimestampMicrosecondArray::from_iter(cells.map(|c| {
                    c.as_datetime().map(|dt| dt.and_utc().timestamp_micros())
                }))),
            ),
        };
        fields.push(Field::new(header, data_type, true));
        columns.push(array);
    }

    let arrow_schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(arrow_schema.clone(), columns)
        .context("building snapshot record batch")?;

    let file = std::fs::File::create(path).context("creating parquet snapshot")?;
    let mut writer =
        ArrowWriter::try_new(file, arrow_schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    Ok(records.len())
}
