use tracing::{info, instrument};

use crate::mnu::ebooks::concordance::IsbnLookup;
use crate::mnu::ebooks::config::ProxyConfig;
use crate::mnu::ebooks::error::Result;
use crate::mnu::ebooks::model::{JoinSpec, RecordSet, left_join};
use crate::mnu::ebooks::schema::{
    ALMA_SUFFIX, BOOKSTORE_ISBN, INTERFACE_NAME, MMS_ID, PORTFOLIO_ID, PUBLICATION_PLACE,
    RESOURCE_TYPE, SUPPLIER_INTERFACE, URL, UrlExportLayout,
};

/// Label of the record set produced by the URL enrichment stage.
pub const ENRICHED_LABEL: &str = "Alma data";

/// Rewrites an insecure proxy prefix into its secure form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRewrite {
    insecure_prefix: String,
    secure_prefix: String,
}

impl ProxyRewrite {
    pub fn new(insecure_prefix: impl Into<String>, secure_prefix: impl Into<String>) -> Self {
        Self {
            insecure_prefix: insecure_prefix.into(),
            secure_prefix: secure_prefix.into(),
        }
    }

    /// Replaces the prefix only; the rest of the URL is left byte-for-byte.
    pub fn apply(&self, url: &str) -> String {
        match url.strip_prefix(self.insecure_prefix.as_str()) {
            Some(rest) => format!("{}{rest}", self.secure_prefix),
            None => url.to_string(),
        }
    }
}

impl From<&ProxyConfig> for ProxyRewrite {
    fn from(config: &ProxyConfig) -> Self {
        Self::new(&config.insecure_prefix, &config.secure_prefix)
    }
}

/// Attaches the bookstore ISBN to every analytics row.
///
/// Also renames the interface column to `Supplier/Interface` and strips the
/// cataloguing punctuation from `Publication Place`. The row count and order
/// are unchanged.
#[instrument(level = "info", skip_all, fields(rows = analytics.len()))]
pub fn enrich_with_isbns(mut analytics: RecordSet, concordance: &dyn IsbnLookup) -> Result<RecordSet> {
    analytics.require_columns(&[MMS_ID, PORTFOLIO_ID, INTERFACE_NAME, PUBLICATION_PLACE])?;

    analytics.rename_column(INTERFACE_NAME, SUPPLIER_INTERFACE)?;
    analytics.map_column(PUBLICATION_PLACE, clean_publication_place)?;

    let system_id = analytics.require_column(MMS_ID)?;
    let mut matched = 0usize;
    analytics.push_column(BOOKSTORE_ISBN, |row| {
        let isbn = row[system_id]
            .as_deref()
            .and_then(|id| concordance.isbn_for(id))
            .map(str::to_string);
        if isbn.is_some() {
            matched += 1;
        }
        isbn
    })?;

    info!(matched, unmatched = analytics.len() - matched, "ISBNs attached");
    Ok(analytics)
}

/// `"Minneapolis :"` becomes `"Minneapolis"`; a value of only punctuation is null.
fn clean_publication_place(place: &str) -> Option<String> {
    let cleaned = place.trim_matches(|ch: char| ch == ':' || ch == ';' || ch.is_whitespace());
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Portfolio IDs arrive padded with whitespace or wrapped in quotes.
fn clean_portfolio_id(id: &str) -> Option<String> {
    let cleaned = id.trim().trim_matches(['\'', '"']).trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Left-joins the URL export onto the ISBN-enriched records by portfolio ID.
///
/// The URL export's resource type replaces any analytics column of that name.
/// Rows without a match keep null `URL` and `Resource Type`.
#[instrument(level = "info", skip_all, fields(rows = enriched.len(), urls = urls.len()))]
pub fn enrich_with_urls(
    mut enriched: RecordSet,
    urls: &RecordSet,
    rewrite: &ProxyRewrite,
) -> Result<RecordSet> {
    let layout = UrlExportLayout::resolve(urls)?;
    let mut url_records = layout.project(urls)?;
    url_records.map_column(URL, |url| Some(rewrite.apply(url)))?;
    url_records.map_column(PORTFOLIO_ID, clean_portfolio_id)?;

    enriched.map_column(PORTFOLIO_ID, clean_portfolio_id)?;
    enriched.drop_columns_if_present(&[RESOURCE_TYPE, URL]);

    let joined = left_join(
        &enriched,
        &url_records,
        &JoinSpec {
            left_key: PORTFOLIO_ID,
            right_key: PORTFOLIO_ID,
            suffixes: ("", ALMA_SUFFIX),
            label: ENRICHED_LABEL,
        },
    )?;

    let url = joined.require_column(URL)?;
    let with_url = joined.rows().iter().filter(|row| row[url].is_some()).count();
    info!(rows = joined.len(), with_url, "URLs attached");
    Ok(joined)
}
