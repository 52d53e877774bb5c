use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CellValue, RawTable};

/// Tokens read as missing values in delimited files (the pandas defaults).
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fatal conditions while loading the dataset. Any of these stops the
/// dashboard from being shown.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data file '{}' was not found", .0.display())]
    DataSourceNotFound(PathBuf),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("required column '{0}' is missing")]
    MissingColumn(String),

    #[error("failed to read '{}': {message}", path.display())]
    Read { path: PathBuf, message: String },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a raw table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` – header row followed by delimited records
/// * `.json`         – `[{ "price": 9400, "model": "bmw x5", ... }, ...]`
/// * `.parquet`      – flat columns (strings, ints, floats, bools)
pub fn load_file(path: &Path) -> Result<RawTable, LoadError> {
    if let Err(e) = std::fs::metadata(path) {
        return Err(match e.kind() {
            io::ErrorKind::NotFound => LoadError::DataSourceNotFound(path.to_path_buf()),
            _ => LoadError::Read {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let loaded = match ext.as_str() {
        "csv" => load_delimited(path, b','),
        "tsv" => load_delimited(path, b'\t'),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    loaded.map_err(|e| LoadError::Read {
        path: path.to_path_buf(),
        message: format!("{e:#}"),
    })
}

// ---------------------------------------------------------------------------
// Delimited loader
// ---------------------------------------------------------------------------

fn load_delimited(path: &Path, delimiter: u8) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .context("opening delimited file")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("row {row_no}"))?;
        if record.len() != headers.len() {
            log::debug!(
                "Row {row_no} has {} fields, header has {}",
                record.len(),
                headers.len()
            );
        }
        // Short records are padded with nulls, extra fields are ignored.
        let row: Vec<CellValue> = (0..headers.len())
            .map(|i| record.get(i).map(text_cell).unwrap_or(CellValue::Null))
            .collect();
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

/// Delimited cells stay text; numeric columns are coerced later.
fn text_cell(s: &str) -> CellValue {
    if NA_TOKENS.contains(&s) {
        CellValue::Null
    } else {
        CellValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`).  Columns are the
/// union of keys in first-seen order; absent keys become nulls.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("record {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .into_iter()
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
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

/// Load a Parquet file written by Pandas (`df.to_parquet()`) or Polars.
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

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        if batch.num_columns() != headers.len() {
            bail!(
                "record batch has {} columns, schema has {}",
                batch.num_columns(),
                headers.len()
            );
        }
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell(col, row))
                    .collect(),
            );
        }
    }

    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
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
        _ => array_value_to_string(col, row)
            .map(CellValue::String)
            .unwrap_or(CellValue::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn missing_file_is_data_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vehicles_us.csv");
        match load_file(&path) {
            Err(LoadError::DataSourceNotFound(p)) => assert_eq!(p, path),
            other => panic!("expected DataSourceNotFound, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_extension() {
        let file = write_temp(".xlsx", "irrelevant");
        assert!(matches!(
            load_file(file.path()),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn csv_cells_keep_their_text() {
        let file = write_temp(
            ".csv",
            "price,model_year,model,condition,odometer\n\
             9400,2011.0,007,1.50,145000\n\
             25500,,ford f-150,good,NaN\n",
        );
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.headers, ["price", "model_year", "model", "condition", "odometer"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], CellValue::String("9400".into()));
        assert_eq!(table.rows[0][2], CellValue::String("007".into()));
        assert_eq!(table.rows[0][3], CellValue::String("1.50".into()));
        assert_eq!(table.rows[1][1], CellValue::Null);
        assert_eq!(table.rows[1][4], CellValue::Null);
    }

    #[test]
    fn pandas_na_tokens_are_null() {
        for token in ["#NA", "-NaN", "#N/A N/A", "1.#IND", "1.#QNAN", "-1.#IND", "-1.#QNAN", "<NA>"] {
            assert_eq!(text_cell(token), CellValue::Null, "token {token}");
        }
        assert_eq!(text_cell("n/a!"), CellValue::String("n/a!".into()));
    }

    #[test]
    fn short_rows_are_padded_with_nulls() {
        let file = write_temp(
            ".csv",
            "price,odometer,model_year,model\n100,2000,2015,ford\n200,3000\n300\n400,1,2,a,extra\n",
        );
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.rows.len(), 4);
        assert!(table.rows.iter().all(|r| r.len() == 4));
        assert_eq!(
            table.rows[1],
            vec![
                CellValue::String("200".into()),
                CellValue::String("3000".into()),
                CellValue::Null,
                CellValue::Null,
            ]
        );
        assert_eq!(table.rows[2][1], CellValue::Null);
        assert_eq!(table.rows[3][3], CellValue::String("a".into()));
    }

    #[test]
    fn tsv_uses_tab_delimiter() {
        let file = write_temp(".tsv", "Price\tOdometer\n100\t2000\n");
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.headers, ["Price", "Odometer"]);
        assert_eq!(
            table.rows[0],
            vec![CellValue::String("100".into()), CellValue::String("2000".into())]
        );
    }

    #[test]
    fn json_records_fill_missing_keys_with_null() {
        let file = write_temp(
            ".json",
            r#"[{"price": 100, "odometer": 5.5}, {"price": "n/a", "fuel": "gas"}]"#,
        );
        let table = load_file(file.path()).unwrap();
        let fuel = table.headers.iter().position(|h| h == "fuel").unwrap();
        let odo = table.headers.iter().position(|h| h == "odometer").unwrap();
        assert_eq!(table.rows[0][fuel], CellValue::Null);
        assert_eq!(table.rows[0][odo], CellValue::Float(5.5));
        assert_eq!(table.rows[1][odo], CellValue::Null);
        assert_eq!(table.rows[1][fuel], CellValue::String("gas".into()));
    }

    #[test]
    fn malformed_json_is_a_read_error() {
        let file = write_temp(".json", "{\"price\": 1}");
        assert!(matches!(load_file(file.path()), Err(LoadError::Read { .. })));
    }

    #[test]
    fn parquet_flat_columns() {
        use std::sync::Arc;

        use arrow::array::{Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("Price", DataType::Int64, false),
            Field::new("odometer", DataType::Float64, true),
            Field::new("fuel", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![5000, 7200])),
                Arc::new(Float64Array::from(vec![Some(88000.0), None])),
                Arc::new(StringArray::from(vec![Some("gas"), None])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.headers, ["Price", "odometer", "fuel"]);
        assert_eq!(
            table.rows,
            vec![
                vec![
                    CellValue::Integer(5000),
                    CellValue::Float(88000.0),
                    CellValue::String("gas".into()),
                ],
                vec![CellValue::Integer(7200), CellValue::Null, CellValue::Null],
            ]
        );
    }
}
