use tracing::{info, instrument};

use crate::mnu::ebooks::error::Result;
use crate::mnu::ebooks::model::{JoinSpec, RecordSet, left_join};
use crate::mnu::ebooks::schema::{
    ALMA_SUFFIX, AVAILABLE_FOR_GROUP, BOOKSTORE_ISBN, CATALOG_SUFFIX, ISBN, RESOURCE_TYPE, URL,
};

/// Label of the record set produced by the catalog merge.
pub const MERGED_LABEL: &str = "Bookstore merged";

/// Left-joins the bookstore catalog against the enriched Alma records by ISBN.
///
/// Alma's own `ISBN`, `Available For Group` and `Resource Type` are dropped in
/// favour of the catalog's columns, and `Bookstore ISBN` becomes the join key.
/// Every catalog row is kept. Columns present on both sides are suffixed with
/// ` (Bookstore)` and ` (Alma)`.
#[instrument(level = "info", skip_all, fields(catalog = catalog.len(), enriched = enriched.len()))]
pub fn merge_catalog(catalog: &RecordSet, enriched: &RecordSet) -> Result<RecordSet> {
    catalog.require_column(ISBN)?;

    let mut alma = enriched.clone();
    alma.drop_columns_if_present(&[ISBN, AVAILABLE_FOR_GROUP, RESOURCE_TYPE]);
    alma.rename_column(BOOKSTORE_ISBN, ISBN)?;

    let merged = left_join(
        catalog,
        &alma,
        &JoinSpec {
            left_key: ISBN,
            right_key: ISBN,
            suffixes: (CATALOG_SUFFIX, ALMA_SUFFIX),
            label: MERGED_LABEL,
        },
    )?;

    let owned = match merged.column_index(URL) {
        Some(url) => merged.rows().iter().filter(|row| row[url].is_some()).count(),
        None => 0,
    };
    info!(rows = merged.len(), owned, "catalog merged");
    Ok(merged)
}
