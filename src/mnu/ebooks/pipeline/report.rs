use tracing::{info, instrument};

use crate::mnu::ebooks::error::{ReportError, Result};
use crate::mnu::ebooks::io::excel_write::SheetTable;
use crate::mnu::ebooks::model::RecordSet;
use crate::mnu::ebooks::schema::{
    ALMA_TITLE, MMS_ID, PORTFOLIO_ID, PUBLICATION_DATE, PUBLICATION_PLACE, PUBLISHER,
    SUPPLIER_INTERFACE, TITLE, URL, alma_title, catalog_title,
};

pub const ALMA_DATA_SHEET: &str = "Alma Data";
pub const FULL_LIST_SHEET: &str = "Full List";
pub const ALREADY_OWNED_SHEET: &str = "Already Owned";
pub const NOT_OWNED_SHEET: &str = "Not Owned";

/// The four derived views written to the report workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportViews {
    /// URL enrichment output, unchanged.
    pub alma_data: RecordSet,
    /// Every catalog row with both titles.
    pub full_list: RecordSet,
    /// Catalog rows with a URL.
    pub already_owned: RecordSet,
    /// Catalog rows without a URL.
    pub not_owned: RecordSet,
}

impl ReportViews {
    /// Sheets in display order. Each view is placed ahead of the one built
    /// before it, so the last one built comes first.
    pub fn into_sheets(self) -> Vec<SheetTable> {
        let mut sheets = Vec::with_capacity(4);
        for (sheet_name, records) in [
            (ALMA_DATA_SHEET, self.alma_data),
            (FULL_LIST_SHEET, self.full_list),
            (ALREADY_OWNED_SHEET, self.already_owned),
            (NOT_OWNED_SHEET, self.not_owned),
        ] {
            sheets.insert(
                0,
                SheetTable {
                    sheet_name: sheet_name.to_string(),
                    records,
                },
            );
        }
        sheets
    }
}

/// Builds the report views from the URL enrichment and catalog merge outputs.
#[instrument(level = "info", skip_all, fields(enriched = enriched.len(), merged = merged.len()))]
pub fn assemble_report(enriched: &RecordSet, merged: &RecordSet) -> Result<ReportViews> {
    let catalog_title = catalog_title();
    let alma_title = alma_title();
    expect_columns(
        merged,
        &[URL, PORTFOLIO_ID, MMS_ID, catalog_title.as_str(), alma_title.as_str()],
    )?;

    let mut alma_data = enriched.clone();
    alma_data.set_label(ALMA_DATA_SHEET);

    let mut full_list = merged.clone();
    full_list.set_label(FULL_LIST_SHEET);
    full_list.drop_columns(&[PORTFOLIO_ID, MMS_ID])?;
    full_list.rename_column(&catalog_title, TITLE)?;
    full_list.rename_column(&alma_title, ALMA_TITLE)?;

    let url = merged.require_column(URL)?;

    let mut already_owned = merged.filter_rows(ALREADY_OWNED_SHEET, |row| row[url].is_some());
    already_owned.drop_columns(&[catalog_title.as_str(), PORTFOLIO_ID, MMS_ID])?;
    already_owned.rename_column(&alma_title, TITLE)?;

    let mut not_owned = merged.filter_rows(NOT_OWNED_SHEET, |row| row[url].is_none());
    let url_dependent = [
        PORTFOLIO_ID,
        MMS_ID,
        alma_title.as_str(),
        SUPPLIER_INTERFACE,
        PUBLISHER,
        PUBLICATION_PLACE,
        PUBLICATION_DATE,
        URL,
    ];
    expect_columns(&not_owned, &url_dependent)?;
    not_owned.drop_columns(&url_dependent)?;
    not_owned.rename_column(&catalog_title, TITLE)?;

    info!(
        full_list = full_list.len(),
        already_owned = already_owned.len(),
        not_owned = not_owned.len(),
        "report views assembled"
    );
    Ok(ReportViews {
        alma_data,
        full_list,
        already_owned,
        not_owned,
    })
}

/// A view source lacking a column it is built from is a schema mismatch.
fn expect_columns(records: &RecordSet, columns: &[&str]) -> Result<()> {
    let missing: Vec<&str> = columns
        .iter()
        .copied()
        .filter(|column| !records.has_column(column))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ReportError::SchemaMismatch(format!(
            "{} lacks column(s) {:?} needed for the report views",
            records.label(),
            missing
        )))
    }
}
