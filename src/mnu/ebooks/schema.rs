//! Column names shared by the pipeline stages and the checks applied at each
//! stage boundary.
//!
//! Source files are mapped onto canonical column names as soon as they are
//! loaded, so the join stages only ever see the names defined here.

use tracing::debug;

use crate::mnu::ebooks::config::{AnalyticsColumns, CatalogColumns};
use crate::mnu::ebooks::error::{ReportError, Result};
use crate::mnu::ebooks::model::RecordSet;

pub const MMS_ID: &str = "MMS Id";
pub const PORTFOLIO_ID: &str = "Portfolio Id";
pub const INTERFACE_NAME: &str = "Electronic Collection Public Name";
pub const SUPPLIER_INTERFACE: &str = "Supplier/Interface";
pub const PUBLISHER: &str = "Publisher";
pub const PUBLICATION_PLACE: &str = "Publication Place";
pub const PUBLICATION_DATE: &str = "Publication Date";
pub const TITLE: &str = "Title";
pub const ISBN: &str = "ISBN";
pub const AVAILABLE_FOR_GROUP: &str = "Available For Group";
pub const RESOURCE_TYPE: &str = "Resource Type";
pub const URL: &str = "URL";
pub const BOOKSTORE_ISBN: &str = "Bookstore ISBN";
pub const ALMA_TITLE: &str = "Alma Title";

/// Suffix given to catalog columns that also exist on the Alma side.
pub const CATALOG_SUFFIX: &str = " (Bookstore)";
/// Suffix given to Alma columns that also exist in the catalog.
pub const ALMA_SUFFIX: &str = " (Alma)";

/// Catalog title after the catalog merge.
pub fn catalog_title() -> String {
    format!("{TITLE}{CATALOG_SUFFIX}")
}

/// Alma title after the catalog merge.
pub fn alma_title() -> String {
    format!("{TITLE}{ALMA_SUFFIX}")
}

/// Renames the configured Analytics headers to their canonical names and
/// checks the columns the enrichment stages rely on.
pub fn conform_analytics(mut analytics: RecordSet, headers: &AnalyticsColumns) -> Result<RecordSet> {
    let mapping = [
        (headers.system_id.as_str(), MMS_ID),
        (headers.portfolio_id.as_str(), PORTFOLIO_ID),
        (headers.interface_name.as_str(), INTERFACE_NAME),
        (headers.publisher.as_str(), PUBLISHER),
        (headers.publication_place.as_str(), PUBLICATION_PLACE),
        (headers.publication_date.as_str(), PUBLICATION_DATE),
        (headers.title.as_str(), TITLE),
    ];
    for (source, canonical) in mapping {
        if analytics.has_column(source) {
            analytics.rename_column(source, canonical)?;
        }
    }
    analytics.require_columns(&[MMS_ID, PORTFOLIO_ID, INTERFACE_NAME, PUBLICATION_PLACE])?;
    debug!(columns = analytics.columns().len(), rows = analytics.len(), "analytics conformed");
    Ok(analytics)
}

/// Renames the configured catalog headers and checks the ISBN column.
pub fn conform_catalog(mut catalog: RecordSet, headers: &CatalogColumns) -> Result<RecordSet> {
    for (source, canonical) in [(headers.isbn.as_str(), ISBN), (headers.title.as_str(), TITLE)] {
        if catalog.has_column(source) {
            catalog.rename_column(source, canonical)?;
        }
    }
    catalog.require_column(ISBN)?;
    Ok(catalog)
}

/// Positions of the three semantic columns of an Export URLs file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlExportLayout {
    pub resource_type: usize,
    pub portfolio_id: usize,
    pub url: usize,
}

impl UrlExportLayout {
    /// Layout used when the headers are not recognisable.
    pub const POSITIONAL: UrlExportLayout = UrlExportLayout {
        resource_type: 0,
        portfolio_id: 1,
        url: 2,
    };

    /// Identifies the columns by header first, then by position when the file
    /// has exactly three columns.
    pub fn resolve(urls: &RecordSet) -> Result<Self> {
        let find = |candidates: &[&str]| {
            urls.columns().iter().position(|column| {
                let normalized = normalize_header(column);
                candidates.iter().any(|candidate| normalized == *candidate)
            })
        };

        let by_name = (
            find(&["resource type", "resourcetype", "type"]),
            find(&["portfolio id", "portfolioid", "portfolio"]),
            find(&["url", "link", "proxied url"]),
        );
        if let (Some(resource_type), Some(portfolio_id), Some(url)) = by_name {
            return Ok(Self {
                resource_type,
                portfolio_id,
                url,
            });
        }

        if urls.columns().len() == 3 {
            debug!(headers = ?urls.columns(), "URL export headers not recognised, using positions");
            return Ok(Self::POSITIONAL);
        }

        Err(ReportError::SchemaMismatch(format!(
            "{}: expected resource type, portfolio id and URL columns, found {} columns {:?}",
            urls.label(),
            urls.columns().len(),
            urls.columns()
        )))
    }

    /// Projects the export onto canonical `Resource Type`, `Portfolio Id`, `URL`.
    pub fn project(&self, urls: &RecordSet) -> Result<RecordSet> {
        let columns = vec![RESOURCE_TYPE.to_string(), PORTFOLIO_ID.to_string(), URL.to_string()];
        let mut projected = RecordSet::new(urls.label(), columns);
        for row in urls.rows() {
            projected.push_row(vec![
                row[self.resource_type].clone(),
                row[self.portfolio_id].clone(),
                row[self.url].clone(),
            ])?;
        }
        Ok(projected)
    }
}

fn normalize_header(header: &str) -> String {
    header
        .trim()
        .trim_matches(['"', '\''])
        .to_ascii_lowercase()
        .replace(['_', '-'], " ")
}
