//! Matching documents to types, extracting rows, and rebuilding tables.

mod engine;
mod reprocess;

pub use engine::{CompiledField, CompiledFields, MatchingEngine};
pub use reprocess::{ReprocessReport, Reprocessor, TypeFailure};
