//! Word geometry: positioned words per page.

mod extractor;

pub use extractor::PdfWordSource;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// A word and the lower-left corner of its bounding box.
///
/// `bottom` grows downward: a smaller value is nearer the top of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub left: f64,
    pub bottom: f64,
}

impl Word {
    pub fn new(text: impl Into<String>, left: f64, bottom: f64) -> Self {
        Self {
            text: text.into(),
            left,
            bottom,
        }
    }
}

/// The words of one page in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageWords {
    /// Page number (1-indexed).
    pub number: u32,
    /// Page text in the source's native reading order.
    pub text: String,
    /// Words in source order (not necessarily visual order).
    pub words: Vec<Word>,
}

impl PageWords {
    /// Build a page whose native text is its words joined in source order.
    pub fn from_words(number: u32, words: Vec<Word>) -> Self {
        let text = words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self { number, text, words }
    }
}

/// Supplies positioned words for a document.
pub trait WordSource {
    /// Read every page of the file. Any undecodable page fails the whole file.
    fn read_pages(&self, path: &Path) -> Result<Vec<PageWords>>;
}
