//! Line clustering of positioned words.

use tracing::debug;

use super::ReconstructedText;
use crate::models::config::LayoutConfig;
use crate::pdf::{PageWords, Word};

/// Turns positioned words into reading-order and layout-preserving text.
#[derive(Debug, Clone, Default)]
pub struct LayoutReconstructor {
    config: LayoutConfig,
}

impl LayoutReconstructor {
    /// Create a reconstructor with the given configuration.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Set the line tolerance.
    pub fn with_line_tolerance(mut self, tolerance: f64) -> Self {
        self.config.line_tolerance = tolerance;
        self
    }

    /// Reconstruct both text variants for a document's pages.
    pub fn reconstruct(&self, pages: &[PageWords]) -> ReconstructedText {
        let mut raw_text = String::new();
        let mut layout_text = String::new();
        let mut page_count = 0u32;

        for page in pages {
            page_count += 1;
            let marker = self.config.marker(page_count);

            raw_text.push_str(&marker);
            raw_text.push('\n');
            raw_text.push_str(&page.text);
            raw_text.push_str("\n\n");

            layout_text.push_str(&marker);
            layout_text.push('\n');
            for line in self.cluster_lines(&page.words) {
                layout_text.push_str(&line);
                layout_text.push('\n');
            }
            layout_text.push('\n');

            debug!("Page {}: {} words", page_count, page.words.len());
        }

        ReconstructedText {
            raw_text,
            layout_text,
            page_count,
        }
    }

    /// Group words into lines, top to bottom, left to right within a line.
    ///
    /// A word joins the current line while its `bottom` is within the
    /// tolerance of the previously placed word's `bottom`.
    pub fn cluster_lines(&self, words: &[Word]) -> Vec<String> {
        let mut sorted: Vec<&Word> = words.iter().collect();
        sorted.sort_by(|a, b| {
            a.bottom
                .total_cmp(&b.bottom)
                .then_with(|| a.left.total_cmp(&b.left))
        });

        let mut lines = Vec::new();
        let mut current = String::new();
        let mut last_bottom: Option<f64> = None;

        for word in sorted {
            if let Some(bottom) = last_bottom {
                if (word.bottom - bottom).abs() > self.config.line_tolerance {
                    lines.push(current.trim_end().to_string());
                    current.clear();
                }
            }
            current.push_str(&word.text);
            current.push(' ');
            last_bottom = Some(word.bottom);
        }

        if !current.is_empty() {
            lines.push(current.trim_end().to_string());
        }

        lines
    }
}
