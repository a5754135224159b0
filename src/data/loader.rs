use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, Row, Value};

/// File extensions the loader understands.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["parquet", "pq", "json", "csv"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a player table from a file.  Dispatch by extension.
///
/// The table id is the file stem (`player_defense.csv` → `player_defense`).
///
/// Supported formats:
/// * `.parquet` – flat columns (strings, ints, floats, bools)
/// * `.json`    – `[{ "player": "...", "team": "...", ... }, ...]`
/// * `.csv`     – header row with column names
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))?
        .to_string();

    let (columns, rows) = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    Dataset::from_rows(id, columns, rows)
        .with_context(|| format!("validating {}", path.display()))
}

type RawTable = (Vec<String>, Vec<Row>);

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "player": "Aaron Mooy", "team": "Australia", "age": "32-096", "tackles": 7 },
///   ...
/// ]
/// ```
///
/// Column order is the order of first appearance across records.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut values = BTreeMap::new();
        for (key, val) in obj {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
            values.insert(key.clone(), json_to_value(val));
        }
        rows.push(Row { values });
    }

    Ok((columns, rows))
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one player per record.
fn load_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let values = headers
            .iter()
            .zip(record.iter())
            .map(|(col, raw)| (col.clone(), guess_value_type(raw)))
            .collect();

        rows.push(Row { values });
    }

    Ok((headers, rows))
}

/// `inf` and `NaN` cannot be ranked or scaled, so they load as missing.
fn float(f: f64) -> Value {
    if f.is_finite() { Value::Float(f) } else { Value::Null }
}

fn guess_value_type(s: &str) -> Value {
    let s = s.trim();
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return float(f);
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    Value::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing one player per row.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let n_rows = batch.num_rows();

        for row in 0..n_rows {
            let mut values = BTreeMap::new();
            for (col_idx, col_name) in columns.iter().enumerate() {
                let value = extract_value(batch.column(col_idx), row)
                    .with_context(|| format!("Row {row}: failed to read '{col_name}'"))?;
                values.insert(col_name.clone(), value);
            }
            rows.push(Row { values });
        }
    }

    Ok((columns, rows))
}

// -- Parquet / Arrow helpers --

/// Extract a single value from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Result<Value> {
    if col.is_null(row) {
        return Ok(Value::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => {
            let arr = downcast::<StringArray>(col)?;
            Value::String(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => {
            let s = col.as_string::<i64>();
            Value::String(s.value(row).to_string())
        }
        DataType::Int32 => Value::Integer(downcast::<Int32Array>(col)?.value(row) as i64),
        DataType::Int64 => Value::Integer(downcast::<Int64Array>(col)?.value(row)),
        DataType::Float32 => float(downcast::<Float32Array>(col)?.value(row) as f64),
        DataType::Float64 => float(downcast::<Float64Array>(col)?.value(row)),
        DataType::Boolean => Value::Bool(downcast::<BooleanArray>(col)?.value(row)),
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(value)
}

fn downcast<T: Array + 'static>(col: &Arc<dyn Array>) -> Result<&T> {
    col.as_any()
        .downcast_ref::<T>()
        .with_context(|| format!("unexpected array layout for {:?}", col.data_type()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_table_uses_file_stem_as_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "player_defense.csv",
            "player,team,position,age,tackles\n\
             Mooy,Australia,MF,32-096,7\n\
             Kante,France,MF,31-200,\n",
        );

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.id, "player_defense");
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows[0].get("age"), Some(&Value::Integer(32)));
        assert_eq!(ds.rows[1].get("tackles"), Some(&Value::Null));
        assert!(ds.is_numeric("tackles"));
        assert!(!ds.is_numeric("position"));
    }

    #[test]
    fn json_records_keep_first_seen_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "player_passing.json",
            r#"[{"player": "A", "team": "X", "passes": 10},
                {"player": "B", "team": "Y", "passes": 12.5, "assists": 1}]"#,
        );

        let ds = load_file(&path).unwrap();
        let names: Vec<_> = ds.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["player", "team", "passes", "assists"]);
        assert_eq!(ds.rows[1].number("passes"), Some(12.5));
    }

    #[test]
    fn non_finite_numbers_load_as_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "player_shooting.csv",
            "player,team,xg
A,X,inf
B,X,NaN
C,X,0.4
",
        );

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.rows[0].get("xg"), Some(&Value::Null));
        assert_eq!(ds.rows[1].get("xg"), Some(&Value::Null));
        assert!(ds.is_numeric("xg"));
    }

    #[test]
    fn parquet_columns_keep_schema_order_and_kinds() {
        use arrow::array::ArrayRef;
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("player", DataType::Utf8, false),
            Field::new("team", DataType::Utf8, false),
            Field::new("age", DataType::Utf8, true),
            Field::new("tackles", DataType::Int64, true),
            Field::new("xg", DataType::Float64, true),
            Field::new("starter", DataType::Boolean, false),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["Mooy", "Kante"])),
            Arc::new(StringArray::from(vec!["Australia", "France"])),
            Arc::new(StringArray::from(vec![Some("32-096"), None])),
            Arc::new(Int64Array::from(vec![Some(7), None])),
            Arc::new(Float64Array::from(vec![0.25, f64::INFINITY])),
            Arc::new(BooleanArray::from(vec![true, false])),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("player_defense.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        let names: Vec<_> = ds.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["player", "team", "age", "tackles", "xg", "starter"]);
        assert_eq!(ds.id, "player_defense");
        assert_eq!(ds.rows[0].get("age"), Some(&Value::Integer(32)));
        assert_eq!(ds.rows[1].get("age"), Some(&Value::Null));
        assert_eq!(ds.rows[0].get("tackles"), Some(&Value::Integer(7)));
        assert_eq!(ds.rows[1].get("xg"), Some(&Value::Null));
        assert_eq!(ds.rows[1].get("starter"), Some(&Value::Bool(false)));
        assert!(ds.is_numeric("age"));
        assert!(ds.is_numeric("tackles"));
        assert!(ds.is_numeric("xg"));
        assert!(!ds.is_numeric("team"));
        assert!(!ds.is_numeric("starter"));
    }

    #[test]
    fn table_without_team_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "broken.csv", "player,goals\nA,1\n");
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn unknown_extension_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "notes.txt", "player,team\n");
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }
}
