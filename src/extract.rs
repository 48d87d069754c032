//! Reads raw CSV files into DataFrames.
//!
//! Files are sniffed for their byte encoding, decoded to UTF-8 and then
//! handed to the Polars CSV reader.

use crate::error::{EtlError, Result, ResultExt as _};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub const DEFAULT_CSV_DIR: &str = "CSV";

/// Markers parsed as missing values, matching what pandas treats as NaN.
const NULL_MARKERS: [&str; 8] = ["NA", "N/A", "NULL", "null", "NaN", "nan", "#N/A", "<NA>"];

const INFER_SCHEMA_ROWS: usize = 10_000;

/// Encoding detected for a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceEncoding {
    pub encoding: &'static Encoding,
    pub ascii_only: bool,
}

impl SourceEncoding {
    /// Guesses the encoding of `bytes`.
    ///
    /// A byte-order mark wins. Without one, valid UTF-8 is taken as UTF-8
    /// (reported as `ascii` when every byte is 7-bit) and anything else is
    /// treated as Windows-1252.
    pub fn detect(bytes: &[u8]) -> Self {
        if let Some((encoding, _)) = Encoding::for_bom(bytes) {
            return Self {
                encoding,
                ascii_only: false,
            };
        }

        if bytes.is_ascii() {
            return Self {
                encoding: UTF_8,
                ascii_only: true,
            };
        }

        let encoding = if std::str::from_utf8(bytes).is_ok() {
            UTF_8
        } else {
            WINDOWS_1252
        };
        Self {
            encoding,
            ascii_only: false,
        }
    }

    pub fn name(&self) -> &'static str {
        if self.ascii_only {
            "ascii"
        } else {
            self.encoding.name()
        }
    }

    /// Decodes `bytes` to UTF-8, dropping any byte-order mark.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::Encoding`] if the input contains sequences that are
    /// malformed for this encoding.
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        let (text, had_errors) = self.encoding.decode_with_bom_removal(bytes);
        if had_errors {
            return Err(EtlError::Encoding(format!(
                "input is not valid {}",
                self.encoding.name()
            )));
        }
        Ok(text.into_owned())
    }
}

/// Path of `file_name` inside `csv_dir`.
pub fn csv_path(csv_dir: &Path, file_name: &str) -> PathBuf {
    csv_dir.join(file_name)
}

/// Reads `<csv_dir>/<file_name>` into a DataFrame.
///
/// # Errors
///
/// - [`EtlError::InvalidPath`] if the file does not exist
/// - [`EtlError::Io`] if it cannot be read
/// - [`EtlError::Encoding`] if it cannot be decoded
/// - [`EtlError::DataProcessing`] if it is not valid CSV
pub fn extract_table(csv_dir: &Path, file_name: &str) -> Result<DataFrame> {
    let path = csv_path(csv_dir, file_name);
    if !path.is_file() {
        return Err(EtlError::InvalidPath(format!(
            "{} does not exist",
            path.display()
        )));
    }

    let raw = std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let encoding = SourceEncoding::detect(&raw);
    tracing::info!("Detected encoding {} for {file_name}", encoding.name());

    let text = encoding
        .decode(&raw)
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    parse_csv(text.into_bytes()).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parses UTF-8 CSV content with a header row, `,` separator and `"` quotes.
pub fn parse_csv(content: Vec<u8>) -> Result<DataFrame> {
    let null_values: Vec<PlSmallStr> = NULL_MARKERS
        .iter()
        .map(|m| PlSmallStr::from_static(m))
        .collect();

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .map_parse_options(|opts| {
            opts.with_separator(b',')
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(NullValues::AllColumns(null_values.clone())))
        })
        .into_reader_with_file_handle(Cursor::new(content))
        .finish()?;

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_ascii() {
        let detected = SourceEncoding::detect(b"CategoryID,CategoryName\n1,Confections\n");
        assert_eq!(detected.name(), "ascii");
        assert_eq!(detected.encoding, UTF_8);
    }

    #[test]
    fn test_detects_utf8() {
        let detected = SourceEncoding::detect("CityName\nSão Paulo\n".as_bytes());
        assert_eq!(detected.name(), "UTF-8");
    }

    #[test]
    fn test_falls_back_to_windows_1252() {
        // "Café" with 0xE9 as a single Latin-1 byte
        let bytes = b"Name\nCaf\xe9\n";
        let detected = SourceEncoding::detect(bytes);
        assert_eq!(detected.name(), "windows-1252");
        assert_eq!(detected.decode(bytes).expect("decode"), "Name\nCafé\n");
    }

    #[test]
    fn test_bom_wins_and_is_stripped() {
        let bytes = b"\xef\xbb\xbfName\nBob\n";
        let detected = SourceEncoding::detect(bytes);
        assert_eq!(detected.name(), "UTF-8");
        assert_eq!(detected.decode(bytes).expect("decode"), "Name\nBob\n");
    }

    #[test]
    fn test_parse_csv_quotes_and_nulls() -> Result<()> {
        let content = b"ProductID,ProductName,Class\n1,\"Widget, Large\",Low\n2,Bolt,NA\n3,Nut,\n";
        let df = parse_csv(content.to_vec())?;

        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 3);

        let names = df.column("ProductName")?.as_materialized_series().clone();
        assert_eq!(names.str()?.get(0), Some("Widget, Large"));

        let class = df.column("Class")?.as_materialized_series().clone();
        assert_eq!(class.null_count(), 2);
        Ok(())
    }

    #[test]
    fn test_extract_missing_file_is_invalid_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = extract_table(dir.path(), "sales.csv").unwrap_err();
        assert!(matches!(err, EtlError::InvalidPath(_)));
    }

    #[test]
    fn test_extract_latin1_file() -> Result<()> {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(
            dir.path().join("cities.csv"),
            b"CityID,CityName\n1,Montr\xe9al\n2,Z\xfcrich\n",
        )?;

        let df = extract_table(dir.path(), "cities.csv")?;
        let cities = df.column("CityName")?.as_materialized_series().clone();
        assert_eq!(cities.str()?.get(0), Some("Montréal"));
        assert_eq!(cities.str()?.get(1), Some("Zürich"));
        Ok(())
    }
}
