pub mod concordance;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod schema;

pub use error::{ReportError, Result, Stage};
