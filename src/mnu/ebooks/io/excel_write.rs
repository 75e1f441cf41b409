use std::collections::HashSet;
use std::path::Path;

use rust_xlsxwriter::{Format, Table, Workbook, Worksheet};
use tracing::{info, instrument, warn};

use crate::mnu::ebooks::error::{ReportError, Result};
use crate::mnu::ebooks::io::excel_read::{TemplateSheet, WorkbookCell};
use crate::mnu::ebooks::io::unique_headers;
use crate::mnu::ebooks::model::RecordSet;

/// Longest sheet name Excel accepts.
const MAX_SHEET_NAME: usize = 31;

/// A record set that will be materialised as an Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub records: RecordSet,
}

/// Writes the report sheets in order, then the template sheets in order.
///
/// Report sheet names are reserved first; a template sheet with a clashing
/// name is renamed with a numeric suffix.
#[instrument(
    level = "info",
    skip_all,
    fields(path = %path.display(), report_sheets = tables.len(), template_sheets = template.len())
)]
pub fn write_workbook(path: &Path, tables: &[SheetTable], template: &[TemplateSheet]) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let mut sheet_names = SheetNameRegistry::default();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    for table in tables {
        let sheet_name = sheet_names.assign(&table.sheet_name);
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&sheet_name)?;
        write_records(worksheet, &table.records)?;
    }

    for sheet in template {
        let sheet_name = sheet_names.assign(&sheet.name);
        if sheet_name != sheet.name {
            warn!(original = %sheet.name, renamed = %sheet_name, "template sheet renamed");
        }
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&sheet_name)?;
        write_template(worksheet, sheet, &date_format)?;
    }

    workbook_writer
        .save(path)
        .map_err(|error| ReportError::Write {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
    info!("workbook saved");
    Ok(())
}

/// Table headers must be unique ignoring case, so clashing columns such as
/// `Publisher` and `publisher` are written as `Publisher` and `publisher.1`.
fn write_records(worksheet: &mut Worksheet, records: &RecordSet) -> Result<()> {
    let headers = unique_headers(records.columns().iter().cloned());
    for (col_idx, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, header)?;
    }

    for (row_idx, row) in records.rows().iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            if let Some(value) = cell {
                worksheet.write_string((row_idx + 1) as u32, col_idx as u16, value)?;
            }
        }
    }

    // Excel tables need at least one data row and one column.
    if records.is_empty() || records.columns().is_empty() {
        return Ok(());
    }

    let mut excel_table = Table::new();
    excel_table.set_autofilter(true);
    let col_end = (records.columns().len() as u16).saturating_sub(1);
    let row_end = records.len() as u32;
    worksheet.add_table(0, 0, row_end, col_end, &excel_table)?;
    Ok(())
}

fn write_template(worksheet: &mut Worksheet, sheet: &TemplateSheet, date_format: &Format) -> Result<()> {
    let (first_row, first_col) = sheet.origin;
    for (row_offset, row) in sheet.rows.iter().enumerate() {
        let row_idx = first_row + row_offset as u32;
        for (col_offset, cell) in row.iter().enumerate() {
            let col_idx = (first_col as usize + col_offset) as u16;
            match cell {
                WorkbookCell::Empty => {}
                WorkbookCell::Text(value) => {
                    worksheet.write_string(row_idx, col_idx, value)?;
                }
                WorkbookCell::Number(value) => {
                    worksheet.write_number(row_idx, col_idx, *value)?;
                }
                WorkbookCell::Bool(value) => {
                    worksheet.write_boolean(row_idx, col_idx, *value)?;
                }
                WorkbookCell::DateTime(value) => {
                    worksheet.write_number_with_format(row_idx, col_idx, *value, date_format)?;
                }
            }
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
struct SheetNameRegistry {
    used: HashSet<String>,
}

impl SheetNameRegistry {
    /// Excel compares sheet names case-insensitively.
    fn is_taken(&self, name: &str) -> bool {
        self.used.contains(&name.to_lowercase())
    }

    fn assign(&mut self, raw: &str) -> String {
        let base = sanitize_sheet_name(raw);
        if !self.is_taken(&base) {
            self.used.insert(base.to_lowercase());
            return base;
        }

        let mut counter = 1;
        loop {
            let suffix = format!("_{counter}");
            let max_chars = MAX_SHEET_NAME - suffix.len();
            let prefix: String = base.chars().take(max_chars).collect();
            let candidate = format!("{prefix}{suffix}");
            if !self.is_taken(&candidate) {
                self.used.insert(candidate.to_lowercase());
                return candidate;
            }
            counter += 1;
        }
    }
}

fn sanitize_sheet_name(raw: &str) -> String {
    let invalid = [':', '\\', '/', '?', '*', '[', ']'];
    let sanitized: String = raw
        .chars()
        .map(|ch| {
            if invalid.contains(&ch) || ch.is_control() {
                '_'
            } else {
                ch
            }
        })
        .collect();

    let sanitized = sanitized.trim().trim_matches('\'');
    if sanitized.is_empty() {
        return "Sheet".to_string();
    }
    sanitized.chars().take(MAX_SHEET_NAME).collect()
}
