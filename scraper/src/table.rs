use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A result row that can be looked up by the link it was scraped from.
pub trait Row: Serialize + DeserializeOwned {
    /// Column names, in field order. Written even when there are no rows.
    const HEADERS: &'static [&'static str];

    fn link(&self) -> &str;
}

/// Append-only table of rows, rewritten in full to a CSV file on every flush.
#[derive(Debug)]
pub struct ResultTable<R> {
    path: PathBuf,
    rows: Vec<R>,
}

impl<R: Row> ResultTable<R> {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ResultTable {
            path: path.as_ref().to_path_buf(),
            rows: Vec::new(),
        }
    }

    /// Pick up where a previous run left off. A missing file is an empty table.
    pub fn load_or_new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut table = ResultTable::new(path);
        if !path.exists() {
            return Ok(table);
        }

        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open saved table: {}", path.display()))?;
        for record in reader.deserialize() {
            let row: R = record
                .with_context(|| format!("Failed to read row from {}", path.display()))?;
            table.rows.push(row);
        }
        log::info!(
            "Loaded {} previously saved rows from {}",
            table.rows.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn push(&mut self, row: R) {
        self.rows.push(row);
    }

    pub fn contains_link(&self, link: &str) -> bool {
        self.rows.iter().any(|row| row.link() == link)
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn flush(&self) -> Result<()> {
        self.flush_to(&self.path)
    }

    /// Write every row to `path`, replacing whatever was there.
    pub fn flush_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        if self.rows.is_empty() {
            writer
                .write_record(R::HEADERS)
                .with_context(|| format!("Failed to write header to {}", path.display()))?;
        }
        for row in &self.rows {
            writer
                .serialize(row)
                .with_context(|| format!("Failed to write row to {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", path.display()))?;
        Ok(())
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestRow {
        link: String,
        month: String,
    }

    impl Row for TestRow {
        const HEADERS: &'static [&'static str] = &["link", "month"];

        fn link(&self) -> &str {
            &self.link
        }
    }

    fn row(link: &str, month: &str) -> TestRow {
        TestRow {
            link: link.to_string(),
            month: month.to_string(),
        }
    }

    #[test]
    fn test_flush_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut table = ResultTable::new(&path);
        table.push(row("https://a.example/1", "March"));
        table.push(row("https://a.example/2", ""));
        table.flush().unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "link,month\nhttps://a.example/1,March\nhttps://a.example/2,\n"
        );
    }

    #[test]
    fn test_flush_empty_table_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        let table: ResultTable<TestRow> = ResultTable::new(&path);
        table.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "link,month\n");

        let reloaded: ResultTable<TestRow> = ResultTable::load_or_new(&path).unwrap();
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_flush_rewrites_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut table = ResultTable::new(&path);
        table.push(row("one", "May"));
        table.flush().unwrap();
        table.push(row("two", "June"));
        table.flush().unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 3);
    }

    #[test]
    fn test_load_resumes_saved_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.csv");
        let mut table = ResultTable::new(&path);
        table.push(row("https://a.example/1", "March"));
        table.flush().unwrap();

        let resumed: ResultTable<TestRow> = ResultTable::load_or_new(&path).unwrap();
        assert_eq!(resumed.len(), 1);
        assert!(resumed.contains_link("https://a.example/1"));
        assert!(!resumed.contains_link("https://a.example/2"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table: ResultTable<TestRow> =
            ResultTable::load_or_new(dir.path().join("nope.csv")).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut table = ResultTable::new("unused.csv");
        table.push(row("same", "May"));
        table.push(row("same", "May"));
        assert_eq!(table.len(), 2);
    }
}
