//! In-memory record sets passed from one pipeline stage to the next.
//!
//! A [`RecordSet`] is a named, ordered list of columns plus rows of nullable
//! string cells. Everything stays textual so identifiers such as MMS IDs or
//! ISBNs never lose leading zeros or pick up float formatting.

mod join;

pub use join::{JoinSpec, left_join};

use crate::mnu::ebooks::error::{ReportError, Result};

/// A single cell. `None` is the null produced by unmatched joins and blank input.
pub type Cell = Option<String>;

/// Row-oriented table with a label used in error messages.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    label: String,
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RecordSet {
    /// Creates an empty record set with the given columns.
    pub fn new(label: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            label: label.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Creates a record set from pre-built rows, checking every row's width.
    pub fn with_rows(
        label: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<Cell>>,
    ) -> Result<Self> {
        let mut set = Self::new(label, columns);
        for row in rows {
            set.push_row(row)?;
        }
        Ok(set)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a row. The row must have one cell per column.
    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ReportError::SchemaMismatch(format!(
                "{}: row {} has {} cells but {} columns are defined",
                self.label,
                self.rows.len() + 1,
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Looks up a column, failing with `MissingColumn` when it is absent.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| ReportError::missing_column(&self.label, name))
    }

    /// Fails with `MissingColumn` on the first absent column.
    pub fn require_columns(&self, names: &[&str]) -> Result<()> {
        for name in names {
            self.require_column(name)?;
        }
        Ok(())
    }

    /// Returns the cell at `row`/`column`, treating out-of-range as null.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)?.as_deref()
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<()> {
        let index = self.require_column(from)?;
        if from != to && self.has_column(to) {
            return Err(ReportError::SchemaMismatch(format!(
                "{}: cannot rename '{from}' to '{to}', the target column already exists",
                self.label
            )));
        }
        self.columns[index] = to.to_string();
        Ok(())
    }

    /// Removes every named column; all of them must exist.
    pub fn drop_columns(&mut self, names: &[&str]) -> Result<()> {
        self.require_columns(names)?;
        self.retain_columns(|column| !names.contains(&column));
        Ok(())
    }

    /// Removes the named columns that exist and ignores the rest.
    pub fn drop_columns_if_present(&mut self, names: &[&str]) {
        self.retain_columns(|column| !names.contains(&column));
    }

    fn retain_columns(&mut self, keep: impl Fn(&str) -> bool) {
        let kept: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, column)| keep(column.as_str()))
            .map(|(index, _)| index)
            .collect();
        if kept.len() == self.columns.len() {
            return;
        }

        self.columns = kept.iter().map(|&index| self.columns[index].clone()).collect();
        for row in &mut self.rows {
            let mut old = std::mem::take(row);
            *row = kept.iter().map(|&index| old[index].take()).collect();
        }
    }

    /// Rewrites every non-null cell of a column. Returning `None` nulls the cell.
    pub fn map_column(&mut self, name: &str, mut f: impl FnMut(&str) -> Cell) -> Result<()> {
        let index = self.require_column(name)?;
        for row in &mut self.rows {
            if let Some(value) = row[index].take() {
                row[index] = f(&value);
            }
        }
        Ok(())
    }

    /// Appends a column whose values are computed from each existing row.
    pub fn push_column(
        &mut self,
        name: &str,
        mut f: impl FnMut(&[Cell]) -> Cell,
    ) -> Result<()> {
        if self.has_column(name) {
            return Err(ReportError::SchemaMismatch(format!(
                "{}: column '{name}' already exists",
                self.label
            )));
        }
        for row in &mut self.rows {
            let value = f(row.as_slice());
            row.push(value);
        }
        self.columns.push(name.to_string());
        Ok(())
    }

    /// Returns a copy containing only the rows accepted by `keep`.
    pub fn filter_rows(&self, label: impl Into<String>, keep: impl Fn(&[Cell]) -> bool) -> Self {
        Self {
            label: label.into(),
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row.as_slice()))
                .cloned()
                .collect(),
        }
    }
}
