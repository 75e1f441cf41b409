use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use tracing::{debug, info, instrument};

use crate::mnu::ebooks::error::{ReportError, Result};
use crate::mnu::ebooks::io::unique_headers;
use crate::mnu::ebooks::model::{Cell, RecordSet};

/// A cell carried over unchanged from the bookstore workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkbookCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel serial date, written back with a date format.
    DateTime(f64),
}

/// A sheet of the bookstore workbook, kept so it can be appended to the report.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSheet {
    pub name: String,
    /// Zero-based (row, column) of the first used cell.
    pub origin: (u32, u32),
    pub rows: Vec<Vec<WorkbookCell>>,
}

/// Everything the pipeline needs from the bookstore workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct BookstoreWorkbook {
    /// The selected sheet as a record set, first row used as headers.
    pub catalog: RecordSet,
    /// All sheets in workbook order, including the selected one.
    pub sheets: Vec<TemplateSheet>,
}

/// Reads the bookstore workbook: the named course-book sheet as the catalog,
/// plus every sheet verbatim for the report template.
#[instrument(level = "info", skip_all, fields(path = %path.display(), sheet = sheet))]
pub fn read_bookstore(path: &Path, sheet: &str) -> Result<BookstoreWorkbook> {
    if !path.exists() {
        return Err(ReportError::MissingInput(path.to_path_buf()));
    }
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let catalog_range = read_required_sheet(&mut workbook, path, sheet)?;
    let catalog = range_to_records(&catalog_range, sheet)?;

    let names: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = read_required_sheet(&mut workbook, path, &name)?;
        sheets.push(range_to_template(&range, name));
    }

    info!(
        catalog_rows = catalog.len(),
        sheet_count = sheets.len(),
        "bookstore workbook read"
    );
    Ok(BookstoreWorkbook { catalog, sheets })
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    path: &Path,
    name: &str,
) -> Result<Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ReportError::MissingSheet {
            path: path.to_path_buf(),
            sheet: name.to_string(),
        })?;
    let range = range_result.map_err(ReportError::from)?;
    Ok(range)
}

fn range_to_records(range: &Range<DataType>, sheet: &str) -> Result<RecordSet> {
    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(first_row) => {
            unique_headers(first_row.iter().map(|cell| cell_to_string(Some(cell))))
        }
        None => Vec::new(),
    };
    let width = headers.len();
    let mut records = RecordSet::new(sheet, headers);

    for row in rows {
        let mut cells: Vec<Cell> = row.iter().map(|cell| to_cell(Some(cell))).collect();
        if cells.iter().all(Option::is_none) {
            continue;
        }
        cells.resize(width, None);
        records.push_row(cells)?;
    }

    debug!(rows = records.len(), columns = width, "catalog sheet parsed");
    Ok(records)
}

fn range_to_template(range: &Range<DataType>, name: String) -> TemplateSheet {
    let origin = range.start().unwrap_or((0, 0));
    let rows = range
        .rows()
        .map(|row| row.iter().map(to_workbook_cell).collect())
        .collect();
    TemplateSheet { name, origin, rows }
}

fn to_workbook_cell(cell: &DataType) -> WorkbookCell {
    match cell {
        DataType::Empty => WorkbookCell::Empty,
        DataType::String(value) => WorkbookCell::Text(value.clone()),
        DataType::Float(value) => WorkbookCell::Number(*value),
        DataType::Int(value) => WorkbookCell::Number(*value as f64),
        DataType::Bool(value) => WorkbookCell::Bool(*value),
        DataType::DateTime(value) => WorkbookCell::DateTime(*value),
        other => WorkbookCell::Text(other.to_string()),
    }
}

fn to_cell(cell: Option<&DataType>) -> Cell {
    let value = cell_to_string(cell);
    if value.trim().is_empty() { None } else { Some(value) }
}

/// Renders a cell as text. Whole floats lose their fractional part so numeric
/// ISBNs compare equal to the textual ones from the CSV exports.
fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) if value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", *value as i64)
        }
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
