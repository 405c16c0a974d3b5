use std::io::Read;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use super::model::{Dataset, SurveyRecord, Value};
use super::schema::{Column, ColumnKind};
use crate::config::DataSource;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("survey CSV is missing column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: '{value}' in column '{column}' is not a number")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("failed to download {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the survey from a configured source.
pub fn load_source(source: &DataSource, timeout: Duration) -> Result<Dataset, LoadError> {
    match source {
        DataSource::Url(url) => fetch_url(url, timeout),
        DataSource::File(path) => load_file(path),
    }
}

/// Download the survey CSV and parse it. No retries.
pub fn fetch_url(url: &str, timeout: Duration) -> Result<Dataset, LoadError> {
    let fetch_err = |reason: String| LoadError::Fetch {
        url: url.to_string(),
        reason,
    };

    // ureq reports 4xx/5xx as Error::Status
    let response = ureq::get(url)
        .timeout(timeout)
        .call()
        .map_err(|e| fetch_err(e.to_string()))?;

    log::debug!("GET {url} -> {}", response.status());
    load_reader(response.into_reader())
}

pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_reader(file)
}

/// Parse survey CSV from any reader.
///
/// The header row is validated against [`Column::ALL`] before any record is
/// read; extra columns are ignored.
pub fn load_reader<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = reader.headers()?;
    let positions = column_positions(headers)?;
    for extra in headers.iter().filter(|h| Column::from_header(h).is_none()) {
        log::debug!("ignoring column '{extra}'");
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result?;
        let mut values = Vec::with_capacity(Column::COUNT);
        for (col, &pos) in Column::ALL.iter().zip(positions.iter()) {
            let raw = row.get(pos).unwrap_or("");
            values.push(parse_cell(*col, raw, row_no)?);
        }
        // arity is guaranteed by iterating Column::ALL
        if let Some(record) = SurveyRecord::from_values(values) {
            records.push(record);
        }
    }

    log::info!("Loaded {} survey records", records.len());
    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// For each schema column, the position of its header in the file.
fn column_positions(headers: &csv::StringRecord) -> Result<Vec<usize>, LoadError> {
    Column::ALL
        .iter()
        .map(|col| {
            headers
                .iter()
                .position(|h| h.trim() == col.header().trim())
                .ok_or_else(|| LoadError::MissingColumn(col.header().trim().to_string()))
        })
        .collect()
}

fn parse_cell(column: Column, raw: &str, row: usize) -> Result<Value, LoadError> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(Value::Null);
    }
    match column.kind() {
        ColumnKind::Categorical => Ok(Value::Text(s.to_string())),
        ColumnKind::Numeric => s
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Value::number)
            .ok_or_else(|| LoadError::InvalidNumber {
                row,
                column: column.header().trim().to_string(),
                value: s.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Header line carrying every schema column in declaration order.
    fn header_line() -> String {
        let mut w = csv::Writer::from_writer(Vec::new());
        w.write_record(Column::ALL.iter().map(|c| c.header())).unwrap();
        String::from_utf8(w.into_inner().unwrap()).unwrap()
    }

    /// A CSV row with the given cells set and all others blank.
    fn row_line(cells: &[(Column, &str)]) -> String {
        let mut fields = vec![""; Column::COUNT];
        for (col, v) in cells {
            fields[col.index()] = *v;
        }
        let mut w = csv::Writer::from_writer(Vec::new());
        w.write_record(&fields).unwrap();
        String::from_utf8(w.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn loads_rows_by_header_name() {
        let mut text = header_line();
        text.push_str(&row_line(&[
            (Column::District, "Jessore"),
            (Column::Age, "12.0"),
            (Column::Gender, "Female"),
            (Column::FamilyMembers, "5"),
        ]));
        text.push_str(&row_line(&[(Column::District, "Khulna")]));

        let ds = load_reader(text.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        let first = ds.record(0).unwrap();
        assert_eq!(first.text(Column::District), Some("Jessore"));
        assert_eq!(first.get(Column::Age), &Value::Integer(12));
        assert_eq!(first.number(Column::FamilyMembers), Some(5.0));
        assert!(ds.record(1).unwrap().get(Column::Gender).is_null());
    }

    #[test]
    fn column_order_in_file_does_not_matter() {
        let mut headers: Vec<&str> = Column::ALL.iter().map(|c| c.header()).collect();
        headers.reverse();
        let mut row = vec![""; Column::COUNT];
        row[0] = "Therapy answer"; // reversed: first header is DeviceAndTherapy
        row[Column::COUNT - 1] = "Barisal"; // last header is District

        let mut w = csv::Writer::from_writer(Vec::new());
        w.write_record(&headers).unwrap();
        w.write_record(&row).unwrap();
        let bytes = w.into_inner().unwrap();

        let ds = load_reader(bytes.as_slice()).unwrap();
        let rec = ds.record(0).unwrap();
        assert_eq!(rec.text(Column::District), Some("Barisal"));
        assert_eq!(rec.text(Column::DeviceAndTherapy), Some("Therapy answer"));
    }

    #[test]
    fn missing_column_fails_at_load() {
        let text = "District,Upazilla\nA,X\n";
        match load_reader(text.as_bytes()) {
            Err(LoadError::MissingColumn(name)) => assert_eq!(name, "Union"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn unparsable_number_is_reported_with_row() {
        let mut text = header_line();
        text.push_str(&row_line(&[(Column::Age, "ten")]));
        match load_reader(text.as_bytes()) {
            Err(LoadError::InvalidNumber { row, column, value }) => {
                assert_eq!(row, 0);
                assert_eq!(column, "Age");
                assert_eq!(value, "ten");
            }
            other => panic!("expected InvalidNumber, got {other:?}"),
        }
    }

    #[test]
    fn load_file_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", header_line()).unwrap();
        write!(file, "{}", row_line(&[(Column::Union, "Chanchra")])).unwrap();
        file.flush().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.record(0).unwrap().text(Column::Union), Some("Chanchra"));
    }

    #[test]
    fn load_file_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
