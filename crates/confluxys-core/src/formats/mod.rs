//! Text extraction strategy table, keyed by file extension.
//!
//! Only PDFs go through layout reconstruction; the other formats are
//! identity or pretty-printing transforms of the file contents.

pub mod structured;

use std::path::Path;

use tracing::{debug, info};

use crate::error::DecodeError;
use crate::layout::{LayoutReconstructor, ReconstructedText};
use crate::models::config::ConfluxysConfig;
use crate::pdf::{PdfWordSource, WordSource};

/// Result type for extraction.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// A supported source format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    PlainText,
    Delimited,
    Json,
    Xml,
}

impl SourceFormat {
    /// Every format, in lookup order.
    pub const ALL: [SourceFormat; 5] = [
        SourceFormat::Pdf,
        SourceFormat::PlainText,
        SourceFormat::Delimited,
        SourceFormat::Json,
        SourceFormat::Xml,
    ];

    /// Extensions handled by this format (lower-case, with leading dot).
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            SourceFormat::Pdf => &[".pdf"],
            SourceFormat::PlainText => &[
                ".txt", ".md", ".log", ".cfg", ".conf", ".ini", ".yaml", ".yml",
            ],
            SourceFormat::Delimited => &[".csv", ".tsv"],
            SourceFormat::Json => &[".json", ".jsonl", ".ndjson"],
            SourceFormat::Xml => &[".xml", ".xhtml", ".svg", ".rss", ".atom"],
        }
    }

    /// Select a format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = extension_of(path);
        Self::ALL
            .into_iter()
            .find(|format| format.extensions().contains(&ext.as_str()))
    }
}

/// All supported extensions.
pub fn supported_extensions() -> Vec<&'static str> {
    SourceFormat::ALL
        .iter()
        .flat_map(|f| f.extensions().iter().copied())
        .collect()
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Extracts raw and layout text from any supported file.
pub struct DocumentExtractor<W: WordSource = PdfWordSource> {
    words: W,
    reconstructor: LayoutReconstructor,
    lines_per_page: usize,
}

impl DocumentExtractor<PdfWordSource> {
    /// Build an extractor backed by the PDF word source.
    pub fn from_config(config: &ConfluxysConfig) -> Self {
        Self::new(
            PdfWordSource::new(),
            LayoutReconstructor::new(config.layout.clone()),
            config.ingest.lines_per_page,
        )
    }
}

impl<W: WordSource> DocumentExtractor<W> {
    /// Create an extractor with an explicit word source.
    pub fn new(words: W, reconstructor: LayoutReconstructor, lines_per_page: usize) -> Self {
        Self {
            words,
            reconstructor,
            lines_per_page,
        }
    }

    /// Extract text from a file. Fails as a whole; there is no partial result.
    pub fn extract(&self, path: &Path) -> Result<ReconstructedText> {
        if !path.exists() {
            return Err(DecodeError::NotFound(path.to_path_buf()));
        }

        let format = SourceFormat::from_path(path).ok_or_else(|| {
            DecodeError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: extension_of(path),
            }
        })?;
        info!("Extracting {} as {:?}", path.display(), format);

        match format {
            SourceFormat::Pdf => self.extract_pdf(path),
            other => self.extract_structured(path, other),
        }
    }

    fn extract_pdf(&self, path: &Path) -> Result<ReconstructedText> {
        let pages = self.words.read_pages(path)?;
        if pages.is_empty() {
            return Err(DecodeError::NoPages(path.to_path_buf()));
        }
        Ok(self.reconstructor.reconstruct(&pages))
    }

    fn extract_structured(&self, path: &Path, format: SourceFormat) -> Result<ReconstructedText> {
        let raw_text = std::fs::read_to_string(path).map_err(|source| DecodeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let ext = extension_of(path);

        // Page estimates count raw lines for plain and delimited text,
        // layout lines for the pretty-printed formats.
        let (layout_text, count_layout) = match format {
            SourceFormat::Delimited => {
                (structured::delimited_layout(&raw_text, ext == ".tsv"), false)
            }
            SourceFormat::Json => (structured::json_layout(&raw_text, ext != ".json"), true),
            SourceFormat::Xml => (structured::xml_layout(&raw_text), true),
            _ => (raw_text.clone(), false),
        };

        let page_count = structured::estimate_pages(
            if count_layout { &layout_text } else { &raw_text },
            self.lines_per_page,
        );
        debug!("{}: estimated {} pages", path.display(), page_count);

        Ok(ReconstructedText {
            raw_text,
            layout_text,
            page_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::{PageWords, Word};
    use std::path::PathBuf;

    /// Serves fixed pages for any path.
    struct FixedWords(Vec<PageWords>);

    impl WordSource for FixedWords {
        fn read_pages(&self, _path: &Path) -> crate::pdf::Result<Vec<PageWords>> {
            Ok(self.0.clone())
        }
    }

    struct FailingWords;

    impl WordSource for FailingWords {
        fn read_pages(&self, path: &Path) -> crate::pdf::Result<Vec<PageWords>> {
            Err(DecodeError::Pdf {
                path: path.to_path_buf(),
                reason: "bad xref".to_string(),
            })
        }
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_format_selection() {
        assert_eq!(SourceFormat::from_path(Path::new("a.PDF")), Some(SourceFormat::Pdf));
        assert_eq!(SourceFormat::from_path(Path::new("a.yml")), Some(SourceFormat::PlainText));
        assert_eq!(SourceFormat::from_path(Path::new("a.tsv")), Some(SourceFormat::Delimited));
        assert_eq!(SourceFormat::from_path(Path::new("a.ndjson")), Some(SourceFormat::Json));
        assert_eq!(SourceFormat::from_path(Path::new("a.svg")), Some(SourceFormat::Xml));
        assert_eq!(SourceFormat::from_path(Path::new("a.docx")), None);
        assert_eq!(SourceFormat::from_path(Path::new("README")), None);
        assert!(supported_extensions().contains(&".csv"));
    }

    #[test]
    fn test_pdf_goes_through_reconstructor() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "invoice.pdf", "");
        let words = FixedWords(vec![PageWords::from_words(
            1,
            vec![Word::new("42", 80.0, 10.0), Word::new("Total:", 0.0, 10.0)],
        )]);
        let extractor = DocumentExtractor::new(words, LayoutReconstructor::default(), 60);

        let text = extractor.extract(&path).unwrap();
        assert_eq!(text.page_count, 1);
        assert_eq!(text.raw_text, "--- Page 1 ---\n42 Total:\n\n");
        assert_eq!(text.layout_text, "--- Page 1 ---\nTotal: 42\n\n");
    }

    #[test]
    fn test_pdf_decode_failure_is_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "broken.pdf", "");
        let extractor = DocumentExtractor::new(FailingWords, LayoutReconstructor::default(), 60);

        let err = extractor.extract(&path).unwrap_err();
        assert!(err.to_string().contains("broken.pdf"));
    }

    #[test]
    fn test_plain_text_is_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "notes.txt", "Order 7\nShipped");
        let extractor = DocumentExtractor::new(FailingWords, LayoutReconstructor::default(), 60);

        let text = extractor.extract(&path).unwrap();
        assert_eq!(text.raw_text, "Order 7\nShipped");
        assert_eq!(text.layout_text, text.raw_text);
        assert_eq!(text.page_count, 1);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "slides.pptx", "");
        let extractor = DocumentExtractor::new(FailingWords, LayoutReconstructor::default(), 60);

        let err = extractor.extract(&path).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_missing_file() {
        let extractor = DocumentExtractor::new(FailingWords, LayoutReconstructor::default(), 60);
        let err = extractor.extract(Path::new("/nope/missing.txt")).unwrap_err();
        assert!(matches!(err, DecodeError::NotFound(_)));
    }
}
