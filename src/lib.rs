//! Core library for the mnu-ebooks report generator.
//!
//! The library merges an Alma Analytics export, an Alma URL export, an MMS ID
//! to ISBN concordance and a bookstore course-book workbook into one report
//! workbook. IO adapters live under [`mnu::ebooks::io`], the record sets and
//! join engine in [`mnu::ebooks::model`], column conventions in
//! [`mnu::ebooks::schema`], and the four pipeline stages with their
//! orchestration under [`mnu::ebooks::pipeline`].

pub mod mnu;

pub use mnu::ebooks::{
    ReportError, Result, Stage, concordance, config, error, io, logging, model, pipeline, schema,
};
