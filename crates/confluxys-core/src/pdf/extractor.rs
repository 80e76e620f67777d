//! PDF word geometry using lopdf and pdf-extract.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use lopdf::Document;
use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};
use tracing::{debug, trace};

use super::{PageWords, Result, Word, WordSource};
use crate::error::DecodeError;

/// Horizontal gap, as a fraction of the font size, that separates two words.
const WORD_GAP_RATIO: f64 = 0.1;

/// Baseline shift, as a fraction of the font size, that starts a new word.
const BASELINE_SHIFT_RATIO: f64 = 0.5;

/// Reads positioned words from PDF files.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfWordSource;

impl PdfWordSource {
    /// Create a new PDF word source.
    pub fn new() -> Self {
        Self
    }

    /// Read positioned words from PDF bytes. `path` is only used in errors.
    pub fn read_pages_from_mem(&self, path: &Path, data: &[u8]) -> Result<Vec<PageWords>> {
        let mut doc = Document::load_mem(data).map_err(|e| DecodeError::Pdf {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(DecodeError::Encrypted(path.to_path_buf()));
            }
            debug!("Decrypted {} with empty password", path.display());
        }

        if doc.get_pages().is_empty() {
            return Err(DecodeError::NoPages(path.to_path_buf()));
        }

        // pdf-extract panics on some malformed content streams
        let mut collector = WordCollector::default();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::output_doc(&doc, &mut collector)
        }));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(DecodeError::Pdf {
                    path: path.to_path_buf(),
                    reason: format!("{:?}", e),
                });
            }
            Err(payload) => {
                return Err(DecodeError::Pdf {
                    path: path.to_path_buf(),
                    reason: format!("extraction panicked: {}", panic_message(payload.as_ref())),
                });
            }
        }

        let pages = collector.pages;
        debug!(
            "Read {} words from {} pages of {}",
            pages.iter().map(|p| p.words.len()).sum::<usize>(),
            pages.len(),
            path.display()
        );
        Ok(pages)
    }
}

impl WordSource for PdfWordSource {
    fn read_pages(&self, path: &Path) -> Result<Vec<PageWords>> {
        if !path.exists() {
            return Err(DecodeError::NotFound(path.to_path_buf()));
        }
        let data = std::fs::read(path).map_err(|source| DecodeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.read_pages_from_mem(path, &data)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "malformed PDF".to_string()
    }
}

/// A word still receiving characters.
struct PendingWord {
    text: String,
    left: f64,
    baseline: f64,
    end: f64,
}

/// Groups the characters pdf-extract reports into words, page by page.
#[derive(Default)]
struct WordCollector {
    pages: Vec<PageWords>,
    page_number: u32,
    page_top: f64,
    words: Vec<Word>,
    pending: Option<PendingWord>,
}

impl WordCollector {
    fn flush_word(&mut self) {
        if let Some(word) = self.pending.take() {
            self.words.push(Word {
                text: word.text,
                left: word.left,
                bottom: self.page_top - word.baseline,
            });
        }
    }

    /// Source-order text: words joined by spaces, a newline where the baseline moves.
    fn page_text(words: &[Word]) -> String {
        let mut text = String::new();
        let mut last_bottom: Option<f64> = None;
        for word in words {
            if let Some(bottom) = last_bottom {
                if (word.bottom - bottom).abs() > 1.0 {
                    text.push('\n');
                } else {
                    text.push(' ');
                }
            }
            text.push_str(&word.text);
            last_bottom = Some(word.bottom);
        }
        text
    }
}

impl OutputDev for WordCollector {
    fn begin_page(
        &mut self,
        page_num: u32,
        media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        self.page_number = page_num;
        self.page_top = media_box.ury;
        self.words.clear();
        self.pending = None;
        trace!("Begin page {}", page_num);
        Ok(())
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        self.flush_word();
        let words = std::mem::take(&mut self.words);
        let text = Self::page_text(&words);
        self.pages.push(PageWords {
            number: self.page_number,
            text,
            words,
        });
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        char: &str,
    ) -> std::result::Result<(), OutputError> {
        if char.trim().is_empty() {
            self.flush_word();
            return Ok(());
        }

        let (x, y) = (trm.m31, trm.m32);
        let size = font_size * (trm.m11 * trm.m22 - trm.m12 * trm.m21).abs().sqrt();
        let advance = width * size;

        let starts_new_word = match &self.pending {
            Some(word) => {
                (y - word.baseline).abs() > size * BASELINE_SHIFT_RATIO
                    || x > word.end + size * WORD_GAP_RATIO
                    || x + size < word.left
            }
            None => true,
        };
        if starts_new_word {
            self.flush_word();
            self.pending = Some(PendingWord {
                text: String::new(),
                left: x,
                baseline: y,
                end: x,
            });
        }

        if let Some(word) = self.pending.as_mut() {
            word.text.push_str(char);
            word.end = x + advance;
        }
        Ok(())
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        self.flush_word();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    fn text_op(x: i64, y: i64, text: &str) -> Vec<Operation> {
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ]
    }

    fn build_pdf(lines: &[(i64, i64, &str)]) -> Vec<u8> {
        build_pdf_with_fonts(lines, true)
    }

    fn build_pdf_with_fonts(lines: &[(i64, i64, &str)], with_fonts: bool) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = if with_fonts {
            doc.add_object(dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            })
        } else {
            doc.add_object(dictionary! {})
        };
        let content: Content<Vec<Operation>> = Content {
            operations: lines
                .iter()
                .flat_map(|(x, y, text)| text_op(*x, *y, text))
                .collect(),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();
        data
    }

    #[test]
    fn test_reads_words_with_top_down_bottoms() {
        // Content order deliberately lists the lower line first.
        let data = build_pdf(&[(100, 600, "Second line"), (100, 700, "Total: 42")]);
        let pages = PdfWordSource::new()
            .read_pages_from_mem(Path::new("sample.pdf"), &data)
            .unwrap();

        assert_eq!(pages.len(), 1);
        let texts: Vec<&str> = pages[0].words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["Second", "line", "Total:", "42"]);

        // 792 - 600 = 192 and 792 - 700 = 92: the visually higher line is smaller.
        assert!(pages[0].words[2].bottom < pages[0].words[0].bottom);
        assert!(pages[0].words[0].left < pages[0].words[1].left);
        assert_eq!(pages[0].text, "Second line\nTotal: 42");
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = PdfWordSource::new()
            .read_pages_from_mem(Path::new("broken.pdf"), b"not a pdf")
            .unwrap_err();
        assert!(matches!(err, DecodeError::Pdf { .. }));
        assert!(err.to_string().contains("broken.pdf"));
    }

    #[test]
    fn test_unknown_font_is_decode_error() {
        let data = build_pdf_with_fonts(&[(100, 700, "Total: 42")], false);
        let err = PdfWordSource::new()
            .read_pages_from_mem(Path::new("fontless.pdf"), &data)
            .unwrap_err();
        assert!(matches!(err, DecodeError::Pdf { .. }));
        assert!(err.to_string().contains("fontless.pdf"));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = PdfWordSource::new()
            .read_pages(Path::new("/definitely/not/here.pdf"))
            .unwrap_err();
        assert!(matches!(err, DecodeError::NotFound(_)));
    }
}
