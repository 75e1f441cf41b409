use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::{debug, instrument};

use crate::mnu::ebooks::error::{ReportError, Result};
use crate::mnu::ebooks::io::unique_headers;
use crate::mnu::ebooks::model::{Cell, RecordSet};

/// Reads a delimited export with a header row into a record set.
///
/// Every value stays a string. Blank cells become null. Repeated headers get a
/// `.N` suffix. Rows shorter than the header are padded with nulls; longer rows
/// are a format error.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn read_records(path: &Path) -> Result<RecordSet> {
    if !path.exists() {
        return Err(ReportError::MissingInput(path.to_path_buf()));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::None)
        .from_path(path)?;

    let columns = unique_headers(
        reader
            .headers()
            .map_err(|error| format_error(path, &error))?
            .iter()
            .map(|header| header.trim_start_matches('\u{feff}').to_string()),
    );

    if columns.is_empty() {
        return Err(ReportError::Format {
            path: path.to_path_buf(),
            message: "no header row".into(),
        });
    }

    let label = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let width = columns.len();
    let mut records = RecordSet::new(label, columns);

    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|error| format_error(path, &error))?;
        if record.len() > width {
            return Err(ReportError::Format {
                path: path.to_path_buf(),
                message: format!(
                    "record {} has {} fields but the header has {width}",
                    line + 1,
                    record.len()
                ),
            });
        }
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let mut row: Vec<Cell> = record.iter().map(to_cell).collect();
        row.resize(width, None);
        records.push_row(row)?;
    }

    debug!(rows = records.len(), columns = width, "delimited file read");
    Ok(records)
}

fn to_cell(field: &str) -> Cell {
    if field.trim().is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

fn format_error(path: &Path, error: &csv::Error) -> ReportError {
    ReportError::Format {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}
