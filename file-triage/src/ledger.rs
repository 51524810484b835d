//! The CSV of downloaded PDFs that a triage session walks through.

use std::io;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

pub const PDF_COLUMN: &str = "pdf_filename";
pub const DATE_COLUMN: &str = "date";
pub const NOTE_COLUMN: &str = "note";

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger {source_name} has no `{column}` column")]
    MissingColumn {
        source_name: String,
        column: &'static str,
    },
    #[error("failed to read ledger {source_name}: {source}")]
    Read {
        source_name: String,
        #[source]
        source: csv::Error,
    },
    #[error("failed to write ledger {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("failed to write ledger {path}: {source}")]
    Flush {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Every column of the input is carried through untouched except `note`,
/// which is added when missing.
#[derive(Debug, Clone)]
pub struct Ledger {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    pdf_col: usize,
    date_col: usize,
    note_col: usize,
}

/// What a review needs to know about one ledger row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<'a> {
    pub pdf_filename: &'a str,
    pub date: &'a str,
}

impl Entry<'_> {
    /// File name without its extension, which is what image names start with.
    pub fn basename(&self) -> &str {
        Path::new(self.pdf_filename)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(self.pdf_filename)
    }

    pub fn display_date(&self) -> String {
        match parse_date(self.date) {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => self.date.to_string(),
        }
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DATE_FORMATS.iter().find_map(|format| {
                NaiveDate::parse_from_str(value, format)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
        })
}

fn column(headers: &[String], name: &'static str, source_name: &str) -> Result<usize, LedgerError> {
    headers
        .iter()
        .position(|header| header.trim() == name)
        .ok_or_else(|| LedgerError::MissingColumn {
            source_name: source_name.to_string(),
            column: name,
        })
}

impl Ledger {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let source_name = path.display().to_string();
        let file = std::fs::File::open(path).map_err(|err| LedgerError::Read {
            source_name: source_name.clone(),
            source: csv::Error::from(err),
        })?;
        Ledger::from_reader(file, &source_name)
    }

    pub fn from_reader<R: io::Read>(reader: R, source_name: &str) -> Result<Self, LedgerError> {
        let read_err = |source| LedgerError::Read {
            source_name: source_name.to_string(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let mut headers: Vec<String> = reader
            .headers()
            .map_err(read_err)?
            .iter()
            .map(|header| header.to_string())
            .collect();
        let pdf_col = column(&headers, PDF_COLUMN, source_name)?;
        let date_col = column(&headers, DATE_COLUMN, source_name)?;
        let note_col = match column(&headers, NOTE_COLUMN, source_name) {
            Ok(idx) => idx,
            Err(_) => {
                headers.push(NOTE_COLUMN.to_string());
                headers.len() - 1
            }
        };

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(read_err)?;
            let mut row: Vec<String> = record.iter().map(|field| field.to_string()).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Ledger {
            headers,
            rows,
            pdf_col,
            date_col,
            note_col,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Earliest first. Rows with unreadable dates go last, in file order.
    pub fn sort_by_date(&mut self) {
        let date_col = self.date_col;
        self.rows.sort_by_key(|row| {
            let date = parse_date(&row[date_col]);
            (date.is_none(), date)
        });
    }

    pub fn entry(&self, idx: usize) -> Entry<'_> {
        let row = &self.rows[idx];
        Entry {
            pdf_filename: row[self.pdf_col].trim(),
            date: &row[self.date_col],
        }
    }

    /// Add `message` to the row's note, keeping whatever was there.
    pub fn append_note(&mut self, idx: usize, message: &str) -> &str {
        let note = &mut self.rows[idx][self.note_col];
        if note.trim().is_empty() {
            *note = message.to_string();
        } else {
            *note = format!("{}; {}", note, message);
        }
        note
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), LedgerError> {
        let path = path.as_ref();
        let write_err = |source| LedgerError::Write {
            path: path.display().to_string(),
            source,
        };
        let mut writer = csv::Writer::from_path(path).map_err(write_err)?;
        writer.write_record(&self.headers).map_err(write_err)?;
        for row in &self.rows {
            writer.write_record(row).map_err(write_err)?;
        }
        writer.flush().map_err(|source| LedgerError::Flush {
            path: path.display().to_string(),
            source,
        })
    }
}
