use std::path::Path;

use csv::WriterBuilder;
use tracing::{info, instrument};

use crate::mnu::ebooks::error::{ReportError, Result};
use crate::mnu::ebooks::model::RecordSet;

/// Writes a record set as CSV with a header row. Nulls become empty fields.
#[instrument(level = "info", skip(records), fields(path = %path.display()))]
pub fn write_records(path: &Path, records: &RecordSet) -> Result<()> {
    let write_error = |message: String| ReportError::Write {
        path: path.to_path_buf(),
        message,
    };

    let mut writer = WriterBuilder::new()
        .from_path(path)
        .map_err(|error| write_error(error.to_string()))?;
    writer
        .write_record(records.columns())
        .map_err(|error| write_error(error.to_string()))?;
    for row in records.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))
            .map_err(|error| write_error(error.to_string()))?;
    }
    writer.flush().map_err(|error| write_error(error.to_string()))?;

    info!(rows = records.len(), "intermediate export written");
    Ok(())
}
