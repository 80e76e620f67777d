//! Pattern synthesis and template authoring.

mod authoring;
pub mod patterns;
mod synthesizer;

pub use authoring::{DraftFile, FieldDraft, FieldPreview, Preview, TemplateDraft};
pub use synthesizer::{column_name, synthesize_pattern, table_name, ValueShape};
