//! The four-stage join pipeline and its orchestration.

pub mod enrich;
pub mod merge;
pub mod report;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::mnu::ebooks::concordance::{ConcordanceTable, IsbnLookup};
use crate::mnu::ebooks::config::Config;
use crate::mnu::ebooks::error::{ReportError, Result, Stage};
use crate::mnu::ebooks::io::{csv_read, csv_write, excel_read, excel_write};
use crate::mnu::ebooks::model::RecordSet;
use crate::mnu::ebooks::schema;

pub use enrich::{ProxyRewrite, enrich_with_isbns, enrich_with_urls};
pub use merge::merge_catalog;
pub use report::{ReportViews, assemble_report};

/// File name of the intermediate export of the URL enrichment output.
pub const ALMA_DATA_EXPORT: &str = "alma_data.csv";
/// File name of the intermediate export of the catalog merge output.
pub const MERGED_EXPORT: &str = "bookstore_merged.csv";

/// Input files for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Alma Analytics CSV export.
    pub analytics: PathBuf,
    /// Alma Export URLs CSV.
    pub url_export: PathBuf,
    /// Bookstore workbook, also used as the report template.
    pub bookstore: PathBuf,
    /// Sheet of the bookstore workbook holding the course books.
    pub sheet: String,
    /// Date stamped into the output file name.
    pub date: NaiveDate,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Path of the report workbook that was written.
    pub output: PathBuf,
    /// Rows on the Alma Data sheet.
    pub alma_rows: usize,
    /// Rows on the Full List sheet.
    pub full_list_rows: usize,
    /// Rows on the Already Owned sheet.
    pub already_owned_rows: usize,
    /// Rows on the Not Owned sheet.
    pub not_owned_rows: usize,
}

/// Builds `<template stem><suffix><YYYY-MM-DD>.xlsx` beside the template.
pub fn output_path(template: &Path, suffix: &str, date: NaiveDate) -> PathBuf {
    let stem = template
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let file_name = format!("{stem}{suffix}{}.xlsx", date.format("%Y-%m-%d"));
    match template.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Runs the four stages over already loaded record sets.
///
/// Returns the URL enrichment output, the catalog merge output and the views.
pub fn build_report(
    analytics: RecordSet,
    urls: &RecordSet,
    catalog: &RecordSet,
    concordance: &dyn IsbnLookup,
    rewrite: &ProxyRewrite,
) -> Result<(RecordSet, RecordSet, ReportViews)> {
    let with_isbns =
        enrich_with_isbns(analytics, concordance).map_err(|e| e.in_stage(Stage::IsbnEnrichment))?;
    let enriched =
        enrich_with_urls(with_isbns, urls, rewrite).map_err(|e| e.in_stage(Stage::UrlEnrichment))?;
    let merged = merge_catalog(catalog, &enriched).map_err(|e| e.in_stage(Stage::CatalogMerge))?;
    let views =
        assemble_report(&enriched, &merged).map_err(|e| e.in_stage(Stage::ReportAssembly))?;
    Ok((enriched, merged, views))
}

/// Loads every input, runs the pipeline and writes the report workbook.
///
/// The concordance is loaded from `config.concordance`; use
/// [`run_with_concordance`] to supply another lookup.
pub fn run(request: &RunRequest, config: &Config) -> Result<RunSummary> {
    let concordance = ConcordanceTable::load(&config.concordance)
        .map_err(|e| e.in_stage(Stage::IsbnEnrichment))?;
    run_with_concordance(request, config, &concordance)
}

#[instrument(
    level = "info",
    skip_all,
    fields(
        analytics = %request.analytics.display(),
        urls = %request.url_export.display(),
        bookstore = %request.bookstore.display(),
        sheet = %request.sheet
    )
)]
pub fn run_with_concordance(
    request: &RunRequest,
    config: &Config,
    concordance: &dyn IsbnLookup,
) -> Result<RunSummary> {
    let analytics = csv_read::read_records(&request.analytics)
        .and_then(|records| schema::conform_analytics(records, &config.analytics))
        .map_err(|e| e.in_stage(Stage::IsbnEnrichment))?;
    let urls =
        csv_read::read_records(&request.url_export).map_err(|e| e.in_stage(Stage::UrlEnrichment))?;
    let bookstore = excel_read::read_bookstore(&request.bookstore, &request.sheet)
        .map_err(|e| e.in_stage(Stage::CatalogMerge))?;
    let catalog = schema::conform_catalog(bookstore.catalog, &config.catalog)
        .map_err(|e| e.in_stage(Stage::CatalogMerge))?;

    let rewrite = ProxyRewrite::from(&config.proxy);
    let (enriched, merged, views) = build_report(analytics, &urls, &catalog, concordance, &rewrite)?;

    if let Some(dir) = &config.export_dir {
        export_intermediate(dir, &enriched, &merged)?;
    }

    let summary = RunSummary {
        output: output_path(&request.bookstore, &config.output_suffix, request.date),
        alma_rows: views.alma_data.len(),
        full_list_rows: views.full_list.len(),
        already_owned_rows: views.already_owned.len(),
        not_owned_rows: views.not_owned.len(),
    };

    excel_write::write_workbook(&summary.output, &views.into_sheets(), &bookstore.sheets)
        .map_err(|e| e.in_stage(Stage::ReportAssembly))?;

    info!(
        output = %summary.output.display(),
        full_list = summary.full_list_rows,
        already_owned = summary.already_owned_rows,
        not_owned = summary.not_owned_rows,
        "report written"
    );
    Ok(summary)
}

fn export_intermediate(dir: &Path, enriched: &RecordSet, merged: &RecordSet) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|error| ReportError::Write {
        path: dir.to_path_buf(),
        message: error.to_string(),
    })?;
    csv_write::write_records(&dir.join(ALMA_DATA_EXPORT), enriched)?;
    csv_write::write_records(&dir.join(MERGED_EXPORT), merged)
}
