//! Core library for confluxys document templating.
//!
//! This crate provides:
//! - PDF word geometry and layout reconstruction
//! - Text extraction for plain, delimited, JSON, and XML files
//! - One-shot regex synthesis from a highlighted example value
//! - Template authoring, type matching, and field extraction
//! - Full reprocessing of every document type's table

pub mod error;
pub mod formats;
pub mod ingest;
pub mod layout;
pub mod matching;
pub mod models;
pub mod pdf;
pub mod store;
pub mod template;

pub use error::{ConfluxysError, Result};
pub use formats::{DocumentExtractor, SourceFormat};
pub use ingest::Ingestor;
pub use layout::{LayoutReconstructor, ReconstructedText};
pub use matching::{MatchingEngine, ReprocessReport, Reprocessor};
pub use models::config::ConfluxysConfig;
pub use models::document::Document;
pub use models::template::{DataType, DocumentField, DocumentType, ExtractedRow, Template};
pub use pdf::{PageWords, PdfWordSource, Word, WordSource};
pub use store::{DocumentStore, JsonStore, MemoryStore, RowStore, Store, TemplateStore};
pub use template::{synthesize_pattern, FieldDraft, TemplateDraft};
