use tracing_subscriber::EnvFilter;

use crate::mnu::ebooks::error::{ReportError, Result};

/// Installs the global fmt subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence; otherwise the filter follows the number of
/// `-v` flags given on the command line.
pub fn init_tracing(verbosity: u8) -> Result<()> {
    let default_filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ReportError::Logging(error.to_string()))
}
