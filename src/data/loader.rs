use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{DType, Dataset, Field, Row, Value};
use crate::error::DataLoadError;

/// Cell texts treated as missing in delimited files.
const MISSING_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` – header row, one record per line
/// * `.json`         – `[{ "Year": 2020, "Country": "A", ... }, ...]`
/// * `.parquet`      – flat columns of ints, floats, bools, strings or dictionaries
pub fn load(path: &Path) -> Result<Dataset, DataLoadError> {
    if !path.exists() {
        return Err(DataLoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "csv" => load_delimited(path, b','),
        "tsv" | "tab" => load_delimited(path, b'\t'),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => return Err(DataLoadError::UnsupportedFormat(other.to_string())),
    };

    let dataset = parsed.map_err(|e| DataLoadError::Malformed {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    })?;

    if dataset.fields().is_empty() {
        return Err(DataLoadError::NoColumns(path.to_path_buf()));
    }

    log::info!(
        "Loaded {} rows with columns {:?} from {}",
        dataset.len(),
        dataset.column_names(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

fn load_delimited(path: &Path, delimiter: u8) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening delimited file")?;

    let headers: Vec<String> = reader
        .headers()
        .context("reading header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("record {}", row_no + 1))?;
        records.push(record);
    }

    let mut fields = Vec::with_capacity(headers.len());
    for (col_idx, name) in headers.iter().enumerate() {
        let dtype = infer_text_dtype(records.iter().map(|r| r.get(col_idx).unwrap_or("")));
        fields.push(Field::new(name.clone(), dtype));
    }

    let rows: Vec<Row> = records
        .iter()
        .map(|record| {
            fields
                .iter()
                .enumerate()
                .map(|(col_idx, field)| parse_cell(record.get(col_idx).unwrap_or(""), field.dtype))
                .collect()
        })
        .collect();

    Ok(Dataset::new(fields, rows))
}

fn is_missing(s: &str) -> bool {
    MISSING_TOKENS.contains(&s)
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Declared dtype of a text column: the narrowest type every present cell fits.
/// A column with no present cells is `Float64`.
fn infer_text_dtype<'a>(cells: impl Iterator<Item = &'a str>) -> DType {
    let present: Vec<&str> = cells.filter(|s| !is_missing(s)).collect();
    if present.is_empty() {
        return DType::Float64;
    }
    if present.iter().all(|s| s.parse::<i64>().is_ok()) {
        DType::Int64
    } else if present.iter().all(|s| s.parse::<f64>().is_ok()) {
        DType::Float64
    } else if present.iter().all(|s| parse_bool(s).is_some()) {
        DType::Boolean
    } else {
        DType::Utf8
    }
}

fn parse_cell(s: &str, dtype: DType) -> Value {
    if is_missing(s) {
        return Value::Null;
    }
    match dtype {
        DType::Int64 => s.parse::<i64>().map_or(Value::Null, Value::Integer),
        DType::Float64 => s.parse::<f64>().map_or(Value::Null, Value::from),
        DType::Boolean => parse_bool(s).map_or(Value::Null, Value::Bool),
        DType::Utf8 | DType::Category => Value::Text(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Year": 2020, "Country": "A", "CO2": 1.0 },
///   ...
/// ]
/// ```
///
/// Columns appear in first-seen key order; a key absent from a record is missing.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let fields: Vec<Field> = names
        .iter()
        .map(|name| {
            let dtype = infer_json_dtype(objects.iter().filter_map(|o| o.get(name)));
            Field::new(name.clone(), dtype)
        })
        .collect();

    let rows: Vec<Row> = objects
        .iter()
        .map(|obj| {
            fields
                .iter()
                .map(|f| obj.get(&f.name).map_or(Value::Null, |v| json_to_value(v, f.dtype)))
                .collect()
        })
        .collect();

    Ok(Dataset::new(fields, rows))
}

fn infer_json_dtype<'a>(values: impl Iterator<Item = &'a JsonValue>) -> DType {
    let present: Vec<&JsonValue> = values.filter(|v| !v.is_null()).collect();
    if present.is_empty() {
        return DType::Float64;
    }
    if present.iter().all(|v| v.is_i64()) {
        DType::Int64
    } else if present.iter().all(|v| v.is_number()) {
        DType::Float64
    } else if present.iter().all(|v| v.is_boolean()) {
        DType::Boolean
    } else {
        DType::Utf8
    }
}

fn json_to_value(val: &JsonValue, dtype: DType) -> Value {
    match (val, dtype) {
        (JsonValue::Null, _) => Value::Null,
        (JsonValue::Number(n), DType::Int64) => n.as_i64().map_or(Value::Null, Value::Integer),
        (JsonValue::Number(n), DType::Float64) => n.as_f64().map_or(Value::Null, Value::from),
        (JsonValue::Bool(b), DType::Boolean) => Value::Bool(*b),
        (JsonValue::String(s), _) => Value::Text(s.clone()),
        (other, _) => Value::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns.
///
/// Integer columns of any width declare `Int64`, floats and decimals `Float64`,
/// dictionary-encoded columns `Category`; anything else is read as text.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let fields: Vec<Field> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| Field::new(f.name().clone(), arrow_dtype(f.data_type())))
        .collect();

    let reader = builder.build().context("building parquet reader")?;

    let mut rows: Vec<Row> = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let columns = batch
            .columns()
            .iter()
            .zip(&fields)
            .map(|(col, field)| {
                column_values(col, field.dtype)
                    .with_context(|| format!("column '{}'", field.name))
            })
            .collect::<Result<Vec<_>>>()?;

        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|c| c[row].clone()).collect());
        }
    }

    Ok(Dataset::new(fields, rows))
}

fn arrow_dtype(data_type: &DataType) -> DType {
    match data_type {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => DType::Int64,
        DataType::Float16
        | DataType::Float32
        | DataType::Float64
        | DataType::Decimal128(..)
        | DataType::Decimal256(..) => DType::Float64,
        DataType::Boolean => DType::Boolean,
        DataType::Dictionary(..) => DType::Category,
        _ => DType::Utf8,
    }
}

/// Convert an Arrow column into cells of the declared dtype.
fn column_values(col: &ArrayRef, dtype: DType) -> Result<Vec<Value>> {
    let target = match dtype {
        DType::Int64 => DataType::Int64,
        DType::Float64 => DataType::Float64,
        DType::Boolean => DataType::Boolean,
        DType::Utf8 | DType::Category => DataType::Utf8,
    };
    let cast = arrow::compute::cast(col.as_ref(), &target)
        .with_context(|| format!("converting {} to {target}", col.data_type()))?;

    let values = match dtype {
        DType::Int64 => cast
            .as_primitive::<Int64Type>()
            .iter()
            .map(|v| v.map_or(Value::Null, Value::Integer))
            .collect(),
        DType::Float64 => cast
            .as_primitive::<Float64Type>()
            .iter()
            .map(|v| v.map_or(Value::Null, Value::from))
            .collect(),
        DType::Boolean => cast
            .as_boolean()
            .iter()
            .map(|v| v.map_or(Value::Null, Value::Bool))
            .collect(),
        DType::Utf8 | DType::Category => cast
            .as_string::<i32>()
            .iter()
            .map(|v| v.map_or(Value::Null, |s| Value::Text(s.to_string())))
            .collect(),
    };
    debug_assert_eq!(cast.len(), col.len());
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int32Array, StringArray};
    use arrow::datatypes::{Field as ArrowField, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn csv_infers_declared_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "climate.csv",
            "Year,Country,CO2,Flag,Empty\n2020,A,1.0,true,\n2020,B,2,false,NA\n2021,A,NaN,True,\n",
        );
        let ds = load(&path).unwrap();

        let dtypes: Vec<DType> = ds.fields().iter().map(|f| f.dtype).collect();
        assert_eq!(
            dtypes,
            vec![DType::Int64, DType::Utf8, DType::Float64, DType::Boolean, DType::Float64]
        );
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.rows()[1][2], Value::Float(2.0));
        assert_eq!(ds.rows()[2][2], Value::Null);
        assert_eq!(ds.rows()[2][3], Value::Bool(true));
    }

    #[test]
    fn csv_overflowing_numbers_are_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "climate.csv", "CO2\n1.5\ninf\n1e400\n-inf\n");
        let ds = load(&path).unwrap();
        assert_eq!(ds.field("CO2").unwrap().dtype, DType::Float64);
        assert_eq!(ds.numeric_values(0), vec![1.5]);
        assert_eq!(ds.rows()[2][0], Value::Null);
    }

    #[test]
    fn tsv_uses_tab_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "climate.tsv", "Year\tCountry\n2020\tA\n");
        let ds = load(&path).unwrap();
        assert_eq!(ds.column_names(), vec!["Year", "Country"]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::NotFound(_)));
    }

    #[test]
    fn empty_file_has_no_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "empty.csv", "");
        assert!(matches!(load(&path).unwrap_err(), DataLoadError::NoColumns(_)));
    }

    #[test]
    fn ragged_rows_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "bad.csv", "a,b\n1,2\n3\n");
        assert!(matches!(load(&path).unwrap_err(), DataLoadError::Malformed { .. }));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "data.xlsx", "");
        assert!(matches!(
            load(&path).unwrap_err(),
            DataLoadError::UnsupportedFormat(ext) if ext == "xlsx"
        ));
    }

    #[test]
    fn json_records_keep_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "climate.json",
            r#"[{"Year": 2020, "Country": "A", "CO2": 1.5},
                {"Year": 2021, "CO2": 2},
                {"Year": 2022, "Country": null, "CO2": null}]"#,
        );
        let ds = load(&path).unwrap();
        assert_eq!(ds.column_names(), vec!["Year", "Country", "CO2"]);
        assert_eq!(ds.field("Year").unwrap().dtype, DType::Int64);
        assert_eq!(ds.field("CO2").unwrap().dtype, DType::Float64);
        assert_eq!(ds.rows()[1][1], Value::Null);
        assert_eq!(ds.rows()[1][2], Value::Float(2.0));
    }

    #[test]
    fn json_must_be_an_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "obj.json", r#"{"Year": 2020}"#);
        assert!(matches!(load(&path).unwrap_err(), DataLoadError::Malformed { .. }));
    }

    #[test]
    fn parquet_columns_map_to_dtypes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("climate.parquet");

        let schema = Arc::new(Schema::new(vec![
            ArrowField::new("Year", arrow::datatypes::DataType::Int32, false),
            ArrowField::new("Country", arrow::datatypes::DataType::Utf8, true),
            ArrowField::new("CO2", arrow::datatypes::DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int32Array::from(vec![2020, 2021])),
                Arc::new(StringArray::from(vec![Some("A"), None])),
                Arc::new(Float64Array::from(vec![Some(1.0), None])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load(&path).unwrap();
        assert_eq!(ds.field("Year").unwrap().dtype, DType::Int64);
        assert_eq!(ds.field("Country").unwrap().dtype, DType::Utf8);
        assert_eq!(ds.rows()[0], vec![Value::Integer(2020), Value::from("A"), Value::Float(1.0)]);
        assert_eq!(ds.rows()[1], vec![Value::Integer(2021), Value::Null, Value::Null]);
    }
}
