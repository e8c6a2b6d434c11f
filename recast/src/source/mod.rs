//! Input records: JSON, JSON Lines and CSV files turned into payloads.
//!
//! CSV input gets its encoding and delimiter detected. With `stream` set,
//! JSON Lines and CSV records come out as a single-pass [`PayloadStream`]
//! that parses one record per pull.

use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use crate::error::{SourceError, SourceResult};
use crate::value::{PayloadStream, Value, ValueMap};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Json,
    JsonLines,
    Csv,
}

impl InputFormat {
    /// Format from the file extension.
    pub fn from_path(path: &Path) -> SourceResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(Self::Json),
            "jsonl" | "ndjson" => Ok(Self::JsonLines),
            "csv" | "tsv" | "txt" => Ok(Self::Csv),
            other => Err(SourceError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// What was read, for reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputInfo {
    pub format: InputFormat,
    pub encoding: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,
    /// Record count; unknown for streamed input
    pub records: Option<usize>,
}

impl InputInfo {
    fn new(format: InputFormat, encoding: impl Into<String>) -> Self {
        Self {
            format,
            encoding: encoding.into(),
            delimiter: None,
            headers: Vec::new(),
            records: None,
        }
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes with `encoding`. Unknown encodings and invalid UTF-8 decode lossily.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        // WHATWG decodes the latin1 labels as windows-1252
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };
    // A BOM would end up glued to the first header
    match decoded.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => decoded,
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");
    let mut best = (';', 0);
    for separator in [';', ',', '\t', '|'] {
        let count = first_line.matches(separator).count();
        if count > best.1 {
            best = (separator, count);
        }
    }
    best.0
}

/// Read `path` into a payload.
pub fn read_input(path: &Path, stream: bool) -> SourceResult<(Value, InputInfo)> {
    match InputFormat::from_path(path)? {
        InputFormat::Json => read_json(path),
        InputFormat::JsonLines => read_json_lines(path, stream),
        InputFormat::Csv => read_csv(path, stream),
    }
}

fn read_json(path: &Path) -> SourceResult<(Value, InputInfo)> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Err(SourceError::Empty);
    }
    let json: serde_json::Value = serde_json::from_str(&content).map_err(|e| SourceError::Json {
        line: e.line(),
        message: e.to_string(),
    })?;
    let value = Value::from(json);
    let mut info = InputInfo::new(InputFormat::Json, "utf-8");
    info.records = Some(value.as_list().map_or(1, <[Value]>::len));
    Ok((value, info))
}

fn read_json_lines(path: &Path, stream: bool) -> SourceResult<(Value, InputInfo)> {
    let reader = BufReader::new(File::open(path)?);
    let records = reader
        .lines()
        .enumerate()
        .filter(|(_, line)| line.as_ref().map_or(true, |l| !l.trim().is_empty()))
        .map(|(index, line)| -> SourceResult<Value> {
            let line = line?;
            serde_json::from_str::<serde_json::Value>(&line)
                .map(Value::from)
                .map_err(|e| SourceError::Json {
                    line: index + 1,
                    message: e.to_string(),
                })
        });

    let mut info = InputInfo::new(InputFormat::JsonLines, "utf-8");
    if stream {
        return Ok((Value::Stream(PayloadStream::fallible(records)), info));
    }
    let items = records.collect::<SourceResult<Vec<_>>>()?;
    info.records = Some(items.len());
    Ok((Value::List(items), info))
}

fn read_csv(path: &Path, stream: bool) -> SourceResult<(Value, InputInfo)> {
    let bytes = std::fs::read(path)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(SourceError::Empty);
    }
    let encoding = detect_encoding(&bytes);
    let content = decode_content(&bytes, &encoding);
    let delimiter = detect_delimiter(&content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(Cursor::new(content));
    let headers: Vec<String> = reader.headers().map_err(csv_error)?.iter().map(str::to_string).collect();

    let mut info = InputInfo::new(InputFormat::Csv, encoding);
    info.delimiter = Some(delimiter);
    info.headers = headers.clone();

    let records = reader.into_records().map(move |record| -> SourceResult<Value> {
        let record = record.map_err(csv_error)?;
        Ok(Value::Map(
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| (header.as_str(), Value::from(record.get(i).unwrap_or(""))))
                .collect::<ValueMap>(),
        ))
    });

    if stream {
        return Ok((Value::Stream(PayloadStream::fallible(records)), info));
    }
    let items = records.collect::<SourceResult<Vec<_>>>()?;
    info.records = Some(items.len());
    Ok((Value::List(items), info))
}

fn csv_error(err: csv::Error) -> SourceError {
    SourceError::Csv {
        line: err.position().map_or(0, |position| position.line()),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(InputFormat::from_path(Path::new("a.JSON")).unwrap(), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("a.ndjson")).unwrap(), InputFormat::JsonLines);
        assert_eq!(InputFormat::from_path(Path::new("a.csv")).unwrap(), InputFormat::Csv);
        assert!(matches!(
            InputFormat::from_path(Path::new("a.xlsx")),
            Err(SourceError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("a|b|c"), '|');
        assert_eq!(detect_delimiter("single"), ';');
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        assert_eq!(decode_content(bytes, "iso-8859-1"), "Société");
        // 0xA4 is the currency sign in latin1, not the euro sign
        assert_eq!(decode_content(&[0x31, 0xA4], "latin1"), "1\u{a4}");
    }

    #[test]
    fn test_csv_rows_become_maps() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "rows.csv", b"name;age;city\n\"Alice\";30\n\nBob ; 25;Lyon;extra\n");
        let (value, info) = read_input(&path, false).unwrap();

        assert_eq!(info.delimiter, Some(';'));
        assert_eq!(info.headers, vec!["name", "age", "city"]);
        assert_eq!(info.records, Some(2));
        assert_eq!(
            value,
            Value::from(json!([
                {"name": "Alice", "age": "30", "city": ""},
                {"name": "Bob", "age": "25", "city": "Lyon"}
            ]))
        );
    }

    #[test]
    fn test_csv_stream_is_single_pass() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "rows.csv", b"a,b\n1,2\n3,4\n");
        let (value, info) = read_input(&path, true).unwrap();
        assert_eq!(info.records, None);

        let stream = match value {
            Value::Stream(stream) => stream,
            other => panic!("expected a stream, got {:?}", other),
        };
        let rows: Vec<Value> = stream.take().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(rows, vec![Value::from(json!({"a": "1", "b": "2"})), Value::from(json!({"a": "3", "b": "4"}))]);
        assert!(stream.take().is_none());
    }

    #[test]
    fn test_json_lines_errors_surface_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "rows.jsonl", b"{\"a\": 1}\n\n{broken\n");

        let (value, _) = read_input(&path, true).unwrap();
        let stream = match value {
            Value::Stream(stream) => stream,
            other => panic!("expected a stream, got {:?}", other),
        };
        let mut producer = stream.take().unwrap();
        assert_eq!(producer.next().unwrap().unwrap(), Value::from(json!({"a": 1})));
        assert!(matches!(producer.next(), Some(Err(SourceError::Json { line: 3, .. }))));

        assert!(matches!(read_input(&path, false), Err(SourceError::Json { line: 3, .. })));
    }

    #[test]
    fn test_json_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "order.json", br#"{"lines": [{"sku": "A"}]}"#);
        let (value, info) = read_input(&path, true).unwrap();
        assert_eq!(info.records, Some(1));
        assert_eq!(value, Value::from(json!({"lines": [{"sku": "A"}]})));

        let empty = write(&dir, "empty.json", b"  \n");
        assert!(matches!(read_input(&empty, false), Err(SourceError::Empty)));
    }
}
