//! Tabular snapshots: CSV exports of warehouse tables, read fully into memory.

use std::path::Path;

use crate::config::JobConfig;
use crate::error::ReconError;
use crate::model::InputRow;

/// A header row plus string cells. Short records are padded with "".
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column(&self, column: &str) -> Result<usize, ReconError> {
        self.headers.iter().position(|h| h == column).ok_or_else(|| {
            ReconError::MissingColumn {
                table: self.name.clone(),
                column: column.into(),
            }
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parse CSV text (header row required).
pub fn read_table(name: &str, csv_data: &str) -> Result<Table, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let csv_err = |e: csv::Error| ReconError::Csv {
        table: name.into(),
        message: e.to_string(),
    };

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    Ok(Table { name: name.into(), headers, rows })
}

/// Read a snapshot file from disk.
pub fn read_table_file(path: &Path) -> Result<Table, ReconError> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    read_table(&name, &data)
}

/// Write a header row plus records as CSV.
pub fn write_table(path: &Path, headers: &[String], rows: &[Vec<String>]) -> Result<(), ReconError> {
    let io_err = |e: csv::Error| ReconError::Io(format!("cannot write {}: {e}", path.display()));
    let mut writer = csv::Writer::from_path(path).map_err(io_err)?;
    writer.write_record(headers).map_err(io_err)?;
    for row in rows {
        writer.write_record(row).map_err(io_err)?;
    }
    writer
        .flush()
        .map_err(|e| ReconError::Io(format!("cannot write {}: {e}", path.display())))
}

/// Project the job's two key columns out of the association snapshot.
pub fn input_rows(job: &JobConfig, table: &Table) -> Result<Vec<InputRow>, ReconError> {
    let left_idx = table.column(&job.left.key_column)?;
    let right_idx = table.column(&job.right.key_column)?;

    Ok(table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| InputRow::new(i, &row[left_idx], &row[right_idx]))
        .collect())
}

/// Parse an association snapshot straight into input rows.
pub fn load_snapshot(csv_data: &str, job: &JobConfig) -> Result<Vec<InputRow>, ReconError> {
    let table = read_table(&job.input, csv_data)?;
    input_rows(job, &table)
}
