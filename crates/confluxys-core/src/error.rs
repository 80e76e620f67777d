//! Error types for the confluxys-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the confluxys library.
#[derive(Error, Debug)]
pub enum ConfluxysError {
    /// A document could not be decoded into text.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A field pattern could not be compiled.
    #[error("pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// The persistence collaborator failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Authoring input was rejected.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning a source file into text.
///
/// Every variant carries the file so failures stay attributable.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The file does not exist.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// No extractor is registered for the extension.
    #[error("no text extractor available for {path} (extension {extension:?})")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The PDF could not be parsed or decrypted.
    #[error("failed to parse PDF {path}: {reason}")]
    Pdf { path: PathBuf, reason: String },

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted: {0}")]
    Encrypted(PathBuf),

    /// The document has no pages.
    #[error("document has no pages: {0}")]
    NoPages(PathBuf),

    /// Reading the file failed.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A user-authored field pattern that cannot be evaluated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid pattern for field {field}: {reason}")]
pub struct PatternError {
    pub field: String,
    pub reason: String,
}

/// Errors from the persistence collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A table/collection name is already owned by another document type.
    #[error("table {0} is already used by another document type")]
    DuplicateTable(String),

    /// A document with the same source path was already ingested.
    #[error("document already exists: {0}")]
    DuplicateDocument(PathBuf),

    /// The requested document type does not exist.
    #[error("document type {0} not found")]
    UnknownDocumentType(u64),

    /// The requested table does not exist.
    #[error("table {0} not found")]
    UnknownTable(String),

    /// Storage backend failure.
    #[error("storage backend failure: {0}")]
    Backend(String),

    /// Serialization of persisted state failed.
    #[error("failed to (de)serialize store state: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Authoring-time rejections. No partial template is created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("template name is required")]
    MissingTemplateName,

    #[error("identifier text is required")]
    MissingIdentifier,

    #[error("a template needs at least one field")]
    NoFields,

    #[error("field name is required")]
    MissingFieldName,

    #[error("field value for {0} is empty")]
    EmptyFieldValue(String),

    #[error("value for field {field} does not occur in its context text")]
    ValueNotInContext { field: String },

    #[error("column {column} is already used by another field")]
    DuplicateColumn { column: String },

    #[error("pattern for field {field} is invalid: {reason}")]
    InvalidPattern { field: String, reason: String },

    #[error("no field at position {0}")]
    FieldIndex(usize),
}

/// Result type for the confluxys library.
pub type Result<T> = std::result::Result<T, ConfluxysError>;
