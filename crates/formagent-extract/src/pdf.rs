//! PDF content extraction using pdf-extract.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use tracing::debug;

use crate::error::{ensure_exists, ExtractError, ExtractResult};
use crate::Extractor;

/// PDF text-layer extractor.
///
/// Concatenates the text of every page in page order. There is no OCR
/// fallback, so raster-only pages contribute nothing.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create new PDF extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract per-page text, in page order.
    pub fn extract_pages(&self, path: &Path) -> ExtractResult<Vec<String>> {
        ensure_exists(path)?;

        // pdf-extract panics on some malformed inputs instead of returning an error.
        let owned = path.to_path_buf();
        let outcome = catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_by_pages(&owned)));

        match outcome {
            Ok(Ok(pages)) => {
                debug!(path = %path.display(), pages = pages.len(), "Parsed PDF");
                Ok(pages)
            }
            Ok(Err(e)) => Err(ExtractError::CorruptDocument {
                path: owned,
                reason: e.to_string(),
            }),
            Err(_) => Err(ExtractError::CorruptDocument {
                path: owned,
                reason: "PDF parser aborted".to_string(),
            }),
        }
    }
}

impl Extractor for PdfExtractor {
    fn extract(&self, path: &Path) -> ExtractResult<String> {
        Ok(self.extract_pages(path)?.concat())
    }

    fn name(&self) -> &str {
        "pdf-extract"
    }
}
