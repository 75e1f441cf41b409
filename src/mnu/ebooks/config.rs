//! Run configuration.
//!
//! Settings live in an optional `mnu-ebooks.toml`. Every field has a default,
//! so a missing file or a partial file both work.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mnu::ebooks::error::{ReportError, Result};

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "mnu-ebooks.toml";

/// Top-level configuration, deserialized from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path of the MMS ID to bookstore ISBN concordance export.
    #[serde(default = "default_concordance")]
    pub concordance: PathBuf,

    /// Inserted between the template's base name and the run date.
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    /// Directory receiving intermediate CSV exports. Disabled when unset.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,

    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default)]
    pub analytics: AnalyticsColumns,

    #[serde(default)]
    pub catalog: CatalogColumns,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concordance: default_concordance(),
            output_suffix: default_output_suffix(),
            export_dir: None,
            proxy: ProxyConfig::default(),
            analytics: AnalyticsColumns::default(),
            catalog: CatalogColumns::default(),
        }
    }
}

fn default_concordance() -> PathBuf {
    PathBuf::from("isbns_found_all.csv")
}
fn default_output_suffix() -> String {
    "_mnu_ebooks_".into()
}

/// `[proxy]` section: the URL prefix rewrite applied to the URL export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_insecure_prefix")]
    pub insecure_prefix: String,
    #[serde(default = "default_secure_prefix")]
    pub secure_prefix: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            insecure_prefix: default_insecure_prefix(),
            secure_prefix: default_secure_prefix(),
        }
    }
}

fn default_insecure_prefix() -> String {
    "http://login.ezproxy".into()
}
fn default_secure_prefix() -> String {
    "https://login.ezproxy".into()
}

/// `[analytics]` section: header of each semantic column in the Analytics export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsColumns {
    pub system_id: String,
    pub portfolio_id: String,
    pub interface_name: String,
    pub publisher: String,
    pub publication_place: String,
    pub publication_date: String,
    pub title: String,
}

impl Default for AnalyticsColumns {
    fn default() -> Self {
        Self {
            system_id: "MMS Id".into(),
            portfolio_id: "Portfolio Id".into(),
            interface_name: "Electronic Collection Public Name".into(),
            publisher: "Publisher".into(),
            publication_place: "Publication Place".into(),
            publication_date: "Publication Date".into(),
            title: "Title".into(),
        }
    }
}

/// `[catalog]` section: headers in the bookstore sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogColumns {
    pub isbn: String,
    pub title: String,
}

impl Default for CatalogColumns {
    fn default() -> Self {
        Self {
            isbn: "ISBN".into(),
            title: "Title".into(),
        }
    }
}

impl Config {
    /// Loads configuration from an explicit path. The file must exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ReportError::MissingInput(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Loads `path` when given, otherwise `mnu-ebooks.toml` from `dir` when it
    /// exists, otherwise the defaults.
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.proxy.insecure_prefix.is_empty() {
            return Err(ReportError::Config(
                "proxy.insecure_prefix must not be empty".into(),
            ));
        }
        if self.output_suffix.contains(['/', '\\']) {
            return Err(ReportError::Config(format!(
                "output_suffix '{}' must not contain path separators",
                self.output_suffix
            )));
        }
        Ok(())
    }
}
