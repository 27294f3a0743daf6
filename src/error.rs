//! Crate-level error type and `Result` alias.
//! `OpenError` covers everything that can go wrong while turning a path into a
//! product; the reporter swallows it, so it never reaches callers of a report.
//! `Error` is what a report can actually return: a failing output sink.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors encountered when opening a product
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("No such product: {0}")]
    NotFound(PathBuf),

    #[error("No reader recognises {0}")]
    Unsupported(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed product: {0}")]
    Malformed(String),

    #[error("GDAL error: {0}")]
    Gdal(String),
}

#[cfg(feature = "gdal")]
impl From<gdal::errors::GdalError> for OpenError {
    fn from(e: gdal::errors::GdalError) -> Self {
        OpenError::Gdal(e.to_string())
    }
}

impl OpenError {
    pub fn malformed<E: std::fmt::Display>(e: E) -> Self {
        OpenError::Malformed(e.to_string())
    }
}
