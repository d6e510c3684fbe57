//! Image content extraction via OCR.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::{ensure_exists, ExtractResult};
use crate::ocr::TextRecognizer;
use crate::Extractor;

/// Image extractor that runs a shared recognizer over the whole image.
///
/// Fragments are joined with newlines in the order the engine reports them.
#[derive(Clone)]
pub struct ImageExtractor {
    recognizer: Arc<dyn TextRecognizer>,
}

impl ImageExtractor {
    /// Create an image extractor backed by `recognizer`.
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self { recognizer }
    }

    /// Recognizer in use.
    pub fn recognizer(&self) -> &Arc<dyn TextRecognizer> {
        &self.recognizer
    }
}

impl std::fmt::Debug for ImageExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageExtractor")
            .field("recognizer", &self.recognizer.name())
            .finish()
    }
}

impl Extractor for ImageExtractor {
    fn extract(&self, path: &Path) -> ExtractResult<String> {
        ensure_exists(path)?;

        let fragments = self.recognizer.recognize(path)?;
        debug!(
            path = %path.display(),
            engine = self.recognizer.name(),
            fragments = fragments.len(),
            "OCR complete"
        );

        Ok(fragments.join("\n"))
    }

    fn name(&self) -> &str {
        "image"
    }
}
