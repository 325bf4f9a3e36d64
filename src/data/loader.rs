use std::collections::{HashMap, HashSet};
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::{can_cast_types, cast};
use arrow::datatypes::{
    ArrowPrimitiveType, DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type,
    Int8Type, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::{FormatError, LoadError, LoadResult};
use super::model::{CellValue, Dataset};

/// Knobs for parsing delimited text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Field delimiter; when `None` it comes from the file extension.
    pub delimiter: Option<u8>,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read and parse a dataset from disk, without caching.
pub fn load_file(path: &Path, options: &LoadOptions) -> LoadResult<Dataset> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bytes(path, &bytes, options).map_err(|e| LoadError::format(path, e))
}

/// Parse file contents into a [`Dataset`].  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`          – comma-delimited, first row is the header
/// * `.tsv` / `.tab` – tab-delimited
/// * `.txt`          – delimiter sniffed from the header line
/// * `.json`         – `[{ "Team": "ARI", "Year": 2012, ... }, ...]`
/// * `.parquet`      – flat columns of strings, integers, floats, booleans
pub fn parse_bytes(
    path: &Path,
    bytes: &[u8],
    options: &LoadOptions,
) -> Result<Dataset, FormatError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => parse_delimited(bytes, options.delimiter.unwrap_or(b',')),
        "tsv" | "tab" => parse_delimited(bytes, options.delimiter.unwrap_or(b'\t')),
        "txt" => {
            let delimiter = options.delimiter.unwrap_or_else(|| detect_delimiter(bytes));
            parse_delimited(bytes, delimiter)
        }
        "json" => parse_json(bytes),
        "parquet" | "pq" => parse_parquet(bytes),
        other => Err(FormatError::UnsupportedExtension(other.to_string())),
    }?;

    log::info!(
        "Parsed {} rows with columns {:?} from {}",
        dataset.len(),
        dataset.column_names,
        path.display()
    );
    Ok(dataset)
}

/// Trim every header and reject blank or colliding names.
pub fn normalize_headers<'a>(
    raw: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<String>, FormatError> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for (index, name) in raw.into_iter().enumerate() {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(FormatError::EmptyColumnName { index });
        }
        if !seen.insert(trimmed.to_string()) {
            return Err(FormatError::DuplicateColumn(trimmed.to_string()));
        }
        names.push(trimmed.to_string());
    }
    Ok(names)
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names, one record per line.
/// Rows of a different width than the header are rejected by the parser.
fn parse_delimited(bytes: &[u8], delimiter: u8) -> Result<Dataset, FormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(FormatError::NoHeader);
    }
    let column_names = normalize_headers(headers.iter())?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(CellValue::parse).collect());
    }

    Dataset::from_rows(column_names, rows)
}

/// Pick the separator that occurs most often in the header line.
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or(&[]);

    let separators = [b',', b';', b'\t', b'|'];
    let mut best_sep = b',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.iter().filter(|b| **b == sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Team": "ARI", "Year": 2012, "W": 81, "Playoffs": 0 },
///   ...
/// ]
/// ```
///
/// Columns appear in first-seen order; keys missing from a record are null.
fn parse_json(bytes: &[u8]) -> Result<Dataset, FormatError> {
    let root: JsonValue = serde_json::from_slice(bytes)?;

    let records = root
        .as_array()
        .ok_or_else(|| FormatError::Layout("expected a top-level JSON array".into()))?;

    let mut column_names: Vec<String> = Vec::new();
    let mut by_raw_key: HashMap<String, usize> = HashMap::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<Vec<CellValue>> = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| FormatError::Layout(format!("record {i} is not a JSON object")))?;

        let mut row = vec![CellValue::Null; column_names.len()];
        for (key, val) in obj {
            let col = match by_raw_key.get(key) {
                Some(&col) => col,
                None => {
                    let trimmed = key.trim();
                    if trimmed.is_empty() {
                        return Err(FormatError::EmptyColumnName {
                            index: column_names.len(),
                        });
                    }
                    if by_name.contains_key(trimmed) {
                        return Err(FormatError::DuplicateColumn(trimmed.to_string()));
                    }
                    let col = column_names.len();
                    column_names.push(trimmed.to_string());
                    by_name.insert(trimmed.to_string(), col);
                    by_raw_key.insert(key.clone(), col);
                    col
                }
            };
            if col >= row.len() {
                row.resize(col + 1, CellValue::Null);
            }
            row[col] = json_to_cell(val);
        }
        rows.push(row);
    }

    Dataset::from_rows(column_names, rows)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per statistic.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn parse_parquet(bytes: &[u8]) -> Result<Dataset, FormatError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(bytes))?;
    let schema = builder.schema().clone();
    let column_names = normalize_headers(schema.fields().iter().map(|f| f.name().as_str()))?;
    let targets = schema
        .fields()
        .iter()
        .map(|f| {
            readable_type(f.data_type()).ok_or_else(|| {
                FormatError::UnsupportedType(format!("{} (column '{}')", f.data_type(), f.name()))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let columns = batch
            .columns()
            .iter()
            .zip(&targets)
            .map(|(col, target)| {
                if col.data_type() == target {
                    Ok(col.clone())
                } else {
                    cast(col, target)
                }
            })
            .collect::<Result<Vec<ArrayRef>, _>>()?;
        for row in 0..batch.num_rows() {
            let cells = columns
                .iter()
                .map(|col| extract_cell(col.as_ref(), row))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(cells);
        }
    }

    Dataset::from_rows(column_names, rows)
}

// -- Parquet / Arrow helpers --

/// Arrow type a column is read as: cell types as they are, dictionaries by
/// their value type, decimals as floats, anything else castable as text
/// (dates, timestamps, durations, all-null columns).
fn readable_type(data_type: &DataType) -> Option<DataType> {
    match data_type {
        DataType::Utf8
        | DataType::LargeUtf8
        | DataType::Utf8View
        | DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64
        | DataType::Boolean => Some(data_type.clone()),
        DataType::Dictionary(_, values) => readable_type(values),
        DataType::Float16 | DataType::Decimal128(..) | DataType::Decimal256(..) => {
            Some(DataType::Float64)
        }
        other if can_cast_types(other, &DataType::Utf8) => Some(DataType::Utf8),
        _ => None,
    }
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &dyn Array, row: usize) -> Result<CellValue, FormatError> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Utf8View => CellValue::String(col.as_string_view().value(row).to_string()),
        DataType::Int8 => integer::<Int8Type>(col, row),
        DataType::Int16 => integer::<Int16Type>(col, row),
        DataType::Int32 => integer::<Int32Type>(col, row),
        DataType::Int64 => integer::<Int64Type>(col, row),
        DataType::UInt8 => integer::<UInt8Type>(col, row),
        DataType::UInt16 => integer::<UInt16Type>(col, row),
        DataType::UInt32 => integer::<UInt32Type>(col, row),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            match i64::try_from(v) {
                Ok(i) => CellValue::Integer(i),
                Err(_) => CellValue::Float(v as f64),
            }
        }
        DataType::Float32 => float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        other => return Err(FormatError::UnsupportedType(other.to_string())),
    };
    Ok(cell)
}

fn integer<T>(col: &dyn Array, row: usize) -> CellValue
where
    T: ArrowPrimitiveType,
    T::Native: Into<i64>,
{
    CellValue::Integer(col.as_primitive::<T>().value(row).into())
}

fn float(v: f64) -> CellValue {
    if v.is_nan() {
        CellValue::Null
    } else {
        CellValue::Float(v)
    }
}
