//! Layout reconstruction: raw and line-clustered text from positioned words.

mod reconstructor;

pub use reconstructor::LayoutReconstructor;

use serde::{Deserialize, Serialize};

/// Text produced for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconstructedText {
    /// Source-order text, one marker per page.
    pub raw_text: String,
    /// Line-clustered text, one marker per page.
    pub layout_text: String,
    /// Pages processed.
    pub page_count: u32,
}
