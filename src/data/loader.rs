use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Dataset};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a track table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row; UTF-8 or Latin-1 text
/// * `.json`    – `[{ "track_name": ..., "streams": ..., ... }, ...]`
/// * `.parquet` – one scalar column per field
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV")?;
            read_csv(file)
        }
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Read a CSV table with a header row.
///
/// Fields are decoded as UTF-8 when valid and as Latin-1 otherwise, so files
/// exported with a single-byte encoding load without errors.
pub fn read_csv<R: Read>(input: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers: Vec<String> = reader
        .byte_headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| decode_field(h).trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.byte_records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cells = record
            .iter()
            .map(|field| guess_cell_type(&decode_field(field)))
            .collect();
        rows.push(cells);
    }

    Dataset::from_rows(headers, rows)
}

fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1 maps every byte to the code point of the same value.
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "track_name": "Seven", "artist(s)_name": "Latto, Jung Kook", "streams": 141381703, ... },
///   ...
/// ]
/// ```
///
/// Column order follows the keys of the first record; keys first seen in
/// later records are appended.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Dataset::from_rows(columns, rows)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        // pandas writes object-dtype numeric columns as strings
        JsonValue::String(s) => guess_cell_type(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one scalar column per table field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
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
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell_value(col, row))
                .collect();
            rows.push(cells);
        }
    }

    Dataset::from_rows(columns, rows)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell_value(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Integer(col.as_boolean().value(row) as i64),
        other => CellValue::Text(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::fixtures::SAMPLE_CSV;

    const HEADER: &str = "track_name,artist(s)_name,streams,danceability_%,valence_%,energy_%,acousticness_%,instrumentalness_%,liveness_%,speechiness_%";

    #[test]
    fn csv_infers_cell_types() {
        let ds = read_csv(SAMPLE_CSV.as_bytes()).unwrap();
        let key = ds.column_index("key").unwrap();
        assert_eq!(ds.cell(0, key), &CellValue::Text("C#".into()));
        assert!(ds.cell(1, key).is_null());
        assert_eq!(ds.cell(0, ds.column_index("streams").unwrap()), &CellValue::Integer(100));
    }

    #[test]
    fn csv_tolerates_latin1_bytes() {
        let mut bytes = format!("{HEADER}\n").into_bytes();
        // "Canción" with 0xF3 for ó, invalid as UTF-8
        bytes.extend_from_slice(b"Canci\xf3n,Bad Bunny,12,1,2,3,4,5,6,7\n");
        let ds = read_csv(bytes.as_slice()).unwrap();
        assert_eq!(ds.tracks[0].name, "Canción");
    }

    #[test]
    fn load_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("tracks.csv");
        std::fs::write(&csv_path, SAMPLE_CSV).unwrap();
        assert_eq!(load_file(&csv_path).unwrap().len(), 3);

        let txt_path = dir.path().join("tracks.txt");
        std::fs::write(&txt_path, SAMPLE_CSV).unwrap();
        let err = load_file(&txt_path).unwrap_err();
        assert!(err.to_string().contains(".txt"));
    }

    #[test]
    fn json_records_keep_first_record_key_order() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[
              {{"track_name": "Seven", "artist(s)_name": "Latto, Jung Kook", "streams": 141381703,
                "danceability_%": 80, "valence_%": 89, "energy_%": 83, "acousticness_%": 31,
                "instrumentalness_%": 0, "liveness_%": 8, "speechiness_%": 4}},
              {{"track_name": "LALA", "artist(s)_name": "Myke Towers", "streams": 133716286,
                "danceability_%": 71, "valence_%": 61, "energy_%": 74, "acousticness_%": 7,
                "instrumentalness_%": 0, "liveness_%": 10, "speechiness_%": 4, "bpm": 92.5}}
            ]"#
        )
        .unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column_names[0], "track_name");
        assert_eq!(ds.column_names.last().map(String::as_str), Some("bpm"));
        assert_eq!(ds.tracks[0].artists, vec!["Latto", "Jung Kook"]);
        assert!(ds.cell(0, ds.column_index("bpm").unwrap()).is_null());
    }

    #[test]
    fn json_numeric_strings_are_numbers() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[
              {{"track_name": "Seven", "artist(s)_name": "Latto, Jung Kook", "streams": "141381703",
                "danceability_%": "80", "valence_%": 89, "energy_%": 83, "acousticness_%": 31,
                "instrumentalness_%": 0, "liveness_%": 8, "speechiness_%": 4, "key": "B"}}
            ]"#
        )
        .unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.tracks[0].streams, 141381703);
        assert_eq!(ds.tracks[0].features[0], 80.0);
        assert_eq!(ds.cell(0, ds.column_index("key").unwrap()), &CellValue::Text("B".into()));
    }

    #[test]
    fn json_with_only_corrupt_rows_fails() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[
              {{"track_name": "x", "artist(s)_name": "A", "streams": "BPM110KeyAModeMajor",
                "danceability_%": 1, "valence_%": 2, "energy_%": 3, "acousticness_%": 4,
                "instrumentalness_%": 5, "liveness_%": 6, "speechiness_%": 7}}
            ]"#
        )
        .unwrap();
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("skipped"));
    }

    #[test]
    fn parquet_scalar_columns_map_to_cells() {
        use arrow::array::{ArrayRef, Float64Array, Int32Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        use crate::data::model::AudioFeature;

        let mut fields = vec![
            Field::new("track_name", DataType::Utf8, false),
            Field::new("artist(s)_name", DataType::Utf8, false),
            Field::new("streams", DataType::Int64, false),
            Field::new("bpm", DataType::Float64, true),
        ];
        fields.extend(
            AudioFeature::ALL
                .iter()
                .map(|f| Field::new(f.column(), DataType::Int32, false)),
        );
        let schema = Arc::new(Schema::new(fields));

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["Seven", "LALA"])),
            Arc::new(StringArray::from(vec!["X, Y", "Z"])),
            Arc::new(Int64Array::from(vec![141381703, 133716286])),
            Arc::new(Float64Array::from(vec![Some(125.5), None])),
        ];
        columns.extend(
            (0..AudioFeature::ALL.len()).map(|i| Arc::new(Int32Array::from(vec![i as i32, 10])) as ArrayRef),
        );
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column_names[3], "bpm");
        assert_eq!(ds.tracks[0].artists, vec!["X", "Y"]);
        assert_eq!(ds.tracks[1].streams, 133716286);
        assert_eq!(ds.tracks[0].feature(AudioFeature::Valence), 1.0);
        assert_eq!(ds.cell(0, 0), &CellValue::Text("Seven".into()));
        assert_eq!(ds.cell(0, 2), &CellValue::Integer(141381703));
        assert_eq!(ds.cell(0, 3), &CellValue::Float(125.5));
        assert!(ds.cell(1, 3).is_null());
        assert!(ds.is_numeric_column(3));
    }

    #[test]
    fn json_must_be_an_array() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"track_name": "x"}}"#).unwrap();
        assert!(load_file(file.path()).is_err());
    }
}
