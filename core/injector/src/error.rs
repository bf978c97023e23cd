//! FILENAME: core/injector/src/error.rs

use persistence::PersistenceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InjectError {
    /// A sheet the stage was told to copy does not exist in its template.
    #[error("Sheet '{0}' not found in template")]
    MissingSheet(String),

    /// An input could not be decoded. Raised before anything is mutated.
    #[error("Malformed document: {0}")]
    MalformedDocument(PersistenceError),

    #[error("Document error: {0}")]
    Document(#[from] PersistenceError),

    #[error("Sheet already exists: {0}")]
    DuplicateSheet(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl InjectError {
    /// Maps workbook structure errors onto the injector's own variants.
    pub(crate) fn from_structure(err: PersistenceError) -> Self {
        match err {
            PersistenceError::DuplicateSheet(name) => InjectError::DuplicateSheet(name),
            PersistenceError::SheetNotFound(name) => InjectError::MissingSheet(name),
            other => InjectError::Document(other),
        }
    }
}
