//! Record table
//!
//! Columns are `anonymized_id`, `orig_filename`, then the match record fields
//! in first-seen order. Appending rewrites the whole table: rows that lack a
//! column get an empty cell.

use std::fs::File;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;
use twix_security::MatchRecord;

use crate::Result;

pub const ANONYMIZED_ID: &str = "anonymized_id";
pub const ORIG_FILENAME: &str = "orig_filename";

/// One row of the record table.
#[derive(Debug, Clone)]
pub struct Record {
    pub anonymized_id: String,
    pub orig_filename: String,
    pub matches: MatchRecord,
}

impl Record {
    fn cells(&self) -> impl Iterator<Item = (&str, &str)> {
        [
            (ANONYMIZED_ID, self.anonymized_id.as_str()),
            (ORIG_FILENAME, self.orig_filename.as_str()),
        ]
        .into_iter()
        .chain(self.matches.iter())
    }
}

/// Table contents as read from disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn column_index(&mut self, name: &str) -> usize {
        match self.columns.iter().position(|c| c == name) {
            Some(index) => index,
            None => {
                self.columns.push(name.to_string());
                self.columns.len() - 1
            }
        }
    }

    fn push(&mut self, record: &Record) {
        let mut row = vec![String::new(); self.columns.len()];
        for (name, value) in record.cells() {
            let index = self.column_index(name);
            if index >= row.len() {
                row.resize(index + 1, String::new());
            }
            row[index] = value.to_string();
        }
        self.rows.push(row);
    }

    /// Cell of `row` under `column`, if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(index).map(String::as_str)
    }
}

/// CSV file holding the records of every processed file.
#[derive(Debug, Clone)]
pub struct RecordTable {
    path: PathBuf,
}

impl RecordTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the table; a missing file is an empty table.
    pub fn read(&self) -> Result<Table> {
        if !self.path.exists() {
            return Ok(Table::default());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(File::open(&self.path)?);
        let columns = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for row in reader.records() {
            rows.push(row?.iter().map(str::to_string).collect());
        }

        Ok(Table { columns, rows })
    }

    /// Append `records` and rewrite the table. Returns the total row count.
    pub fn append(&self, records: &[Record]) -> Result<usize> {
        let mut table = self.read()?;
        if records.is_empty() {
            return Ok(table.rows.len());
        }
        for record in records {
            table.push(record);
        }
        self.write(&table)?;

        debug!(
            "Record table {}: {} row(s), {} column(s)",
            self.path.display(),
            table.rows.len(),
            table.columns.len()
        );
        Ok(table.rows.len())
    }

    fn write(&self, table: &Table) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = csv::Writer::from_writer(tmp.as_file());
            writer.write_record(&table.columns)?;
            for row in &table.rows {
                let mut padded = row.clone();
                padded.resize(table.columns.len(), String::new());
                writer.write_record(&padded)?;
            }
            writer.flush()?;
        }
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twix_security::EXAM_DATE;

    fn record(id: &str, fields: &[(&str, &str)]) -> Record {
        let mut matches = MatchRecord::new();
        for (name, value) in fields {
            matches.insert(*name, *value);
        }
        Record {
            anonymized_id: id.to_string(),
            orig_filename: format!("/data/{}.dat", id),
            matches,
        }
    }

    #[test]
    fn test_missing_table_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = RecordTable::new(dir.path().join("records.csv"));
        assert_eq!(table.read().unwrap(), Table::default());
    }

    #[test]
    fn test_append_creates_table() {
        let dir = tempfile::tempdir().unwrap();
        let table = RecordTable::new(dir.path().join("records.csv"));

        let rows = table
            .append(&[record("a1", &[(EXAM_DATE, "2023-06-15"), ("Patient_id", "PID-1")])])
            .unwrap();
        assert_eq!(rows, 1);

        let read = table.read().unwrap();
        assert_eq!(
            read.columns,
            vec![ANONYMIZED_ID, ORIG_FILENAME, EXAM_DATE, "Patient_id"]
        );
        assert_eq!(read.get(0, "Patient_id"), Some("PID-1"));
        assert_eq!(read.get(0, ORIG_FILENAME), Some("/data/a1.dat"));
    }

    #[test]
    fn test_append_unions_columns() {
        let dir = tempfile::tempdir().unwrap();
        let table = RecordTable::new(dir.path().join("records.csv"));

        table.append(&[record("a1", &[("Patient_id", "PID-1")])]).unwrap();
        table
            .append(&[record("b2", &[("Sequence", "t1_mprage"), ("Patient_id", "PID-2")])])
            .unwrap();

        let read = table.read().unwrap();
        assert_eq!(
            read.columns,
            vec![ANONYMIZED_ID, ORIG_FILENAME, "Patient_id", "Sequence"]
        );
        assert_eq!(read.rows.len(), 2);
        assert_eq!(read.get(0, "Sequence"), Some(""));
        assert_eq!(read.get(1, "Sequence"), Some("t1_mprage"));
        assert_eq!(read.get(1, "Patient_id"), Some("PID-2"));
    }

    #[test]
    fn test_values_with_delimiters() {
        let dir = tempfile::tempdir().unwrap();
        let table = RecordTable::new(dir.path().join("records.csv"));

        table
            .append(&[record("a1", &[("InstitutionAddress", "1 Main St, \"North\"")])])
            .unwrap();

        let read = table.read().unwrap();
        assert_eq!(read.get(0, "InstitutionAddress"), Some("1 Main St, \"North\""));
    }

    #[test]
    fn test_no_temp_files_left() {
        let dir = tempfile::tempdir().unwrap();
        let table = RecordTable::new(dir.path().join("records.csv"));
        table.append(&[record("a1", &[])]).unwrap();
        table.append(&[record("b2", &[])]).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
