//! MMS ID to bookstore ISBN lookup.
//!
//! The concordance is produced offline by a separate process. The pipeline
//! only needs a lookup, so it depends on [`IsbnLookup`]; [`ConcordanceTable`]
//! is the implementation backed by an exported CSV or JSON file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::mnu::ebooks::error::{ReportError, Result};

/// Lookup from a system (MMS) ID to the bookstore-supplied ISBN.
pub trait IsbnLookup {
    /// Returns the ISBN recorded for `system_id`, compared as a trimmed string.
    fn isbn_for(&self, system_id: &str) -> Option<&str>;
}

impl IsbnLookup for HashMap<String, String> {
    fn isbn_for(&self, system_id: &str) -> Option<&str> {
        self.get(system_id.trim()).map(String::as_str)
    }
}

/// In-memory concordance. The first entry for a system ID wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConcordanceTable {
    entries: HashMap<String, String>,
    ignored_duplicates: usize,
}

impl IsbnLookup for ConcordanceTable {
    fn isbn_for(&self, system_id: &str) -> Option<&str> {
        self.entries.get(system_id.trim()).map(String::as_str)
    }
}

/// JSON shapes accepted for the concordance export.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonConcordance {
    Map(HashMap<String, JsonScalar>),
    Pairs(Vec<(JsonScalar, JsonScalar)>),
    Records(Vec<JsonRecord>),
}

#[derive(Deserialize)]
struct JsonRecord {
    #[serde(alias = "MMS Id", alias = "mms_id")]
    system_id: JsonScalar,
    #[serde(alias = "Bookstore ISBN", alias = "bookstore_isbn")]
    isbn: Option<JsonScalar>,
}

/// IDs are sometimes serialised as numbers; both forms are accepted and
/// rendered as their exact digits.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonScalar {
    Text(String),
    Number(serde_json::Number),
}

impl JsonScalar {
    fn into_string(self) -> String {
        match self {
            JsonScalar::Text(text) => text,
            JsonScalar::Number(number) => number.to_string(),
        }
    }
}

impl ConcordanceTable {
    /// Builds a table from `(system id, isbn)` pairs. Blank keys and blank
    /// ISBNs are skipped; repeated system IDs keep their first ISBN.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut table = Self::default();
        for (system_id, isbn) in pairs {
            let system_id = system_id.as_ref().trim();
            let isbn = isbn.as_ref().trim();
            if system_id.is_empty() || isbn.is_empty() {
                continue;
            }
            if table.entries.contains_key(system_id) {
                table.ignored_duplicates += 1;
            } else {
                table.entries.insert(system_id.to_string(), isbn.to_string());
            }
        }
        table
    }

    /// Loads a concordance export. `.json` files hold an object map, an array
    /// of pairs, or an array of records; anything else is read as a two-column
    /// CSV with a header row.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ReportError::MissingInput(path.to_path_buf()));
        }

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let table = if is_json {
            Self::load_json(path)?
        } else {
            Self::load_csv(path)?
        };

        if table.ignored_duplicates > 0 {
            warn!(
                duplicates = table.ignored_duplicates,
                "concordance repeats system IDs, keeping the first ISBN for each"
            );
        }
        info!(entries = table.len(), "concordance loaded");
        Ok(table)
    }

    fn load_json(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let parsed: JsonConcordance = serde_json::from_str(&data)?;
        let pairs: Vec<(String, String)> = match parsed {
            JsonConcordance::Map(map) => {
                let mut pairs: Vec<_> = map
                    .into_iter()
                    .map(|(id, isbn)| (id, isbn.into_string()))
                    .collect();
                pairs.sort();
                pairs
            }
            JsonConcordance::Pairs(pairs) => pairs
                .into_iter()
                .map(|(id, isbn)| (id.into_string(), isbn.into_string()))
                .collect(),
            JsonConcordance::Records(records) => records
                .into_iter()
                .filter_map(|record| {
                    record
                        .isbn
                        .map(|isbn| (record.system_id.into_string(), isbn.into_string()))
                })
                .collect(),
        };
        Ok(Self::from_pairs(pairs))
    }

    fn load_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let width = reader.headers()?.len();
        if width < 2 {
            return Err(ReportError::Format {
                path: path.to_path_buf(),
                message: format!("concordance needs two columns, found {width}"),
            });
        }

        let mut pairs = Vec::new();
        for record in reader.records() {
            let record = record?;
            let system_id = record.get(0).unwrap_or_default().to_string();
            let isbn = record.get(1).unwrap_or_default().to_string();
            pairs.push((system_id, isbn));
        }
        Ok(Self::from_pairs(pairs))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of rows dropped because their system ID was already present.
    pub fn ignored_duplicates(&self) -> usize {
        self.ignored_duplicates
    }
}
