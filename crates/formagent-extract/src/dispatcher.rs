//! Routes one file to its format strategy and normalizes the result.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::ExtractionConfig;
use crate::error::{ExtractError, ExtractResult};
use crate::format::{extension_of, FormatKind, TextFormat};
use crate::image::ImageExtractor;
use crate::normalize::normalize_text;
use crate::ocr::{shared_recognizer, TextRecognizer};
use crate::tabular::TabularExtractor;
use crate::text::PlainTextExtractor;
use crate::Extractor;

#[cfg(feature = "pdf")]
use crate::pdf::PdfExtractor;

#[cfg(feature = "docx")]
use crate::docx::DocxExtractor;

/// Single-file extraction entry point.
///
/// Classification is a closed match over [`FormatKind`]; each variant names
/// exactly one strategy. Strategy errors are returned unchanged.
///
/// Unless a recognizer is injected through the builder, image files use the
/// process-wide [`shared_recognizer`], initialized on the first image.
pub struct ExtractionDispatcher {
    config: ExtractionConfig,
    #[cfg(feature = "pdf")]
    pdf: PdfExtractor,
    #[cfg(feature = "docx")]
    docx: DocxExtractor,
    tabular: TabularExtractor,
    text: PlainTextExtractor,
    recognizer: Option<Arc<dyn TextRecognizer>>,
}

impl ExtractionDispatcher {
    /// Create a dispatcher using the shared OCR recognizer.
    pub fn new(config: ExtractionConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Classify, extract and normalize `path`.
    pub fn extract_path(&self, path: &Path) -> ExtractResult<String> {
        let raw = self.extract_raw(path)?;
        Ok(normalize_text(&raw))
    }

    /// Strategy output before normalization.
    pub fn extract_raw(&self, path: &Path) -> ExtractResult<String> {
        let kind = FormatKind::from_path(path);
        debug!(path = %path.display(), format = %kind, "Dispatching extraction");

        match kind {
            FormatKind::Pdf => self.extract_pdf(path),
            FormatKind::Tabular(format) => self.tabular.extract_format(path, format),
            FormatKind::Image => self.image_extractor()?.extract(path),
            FormatKind::PlainText(TextFormat::Plain) => self.text.extract(path),
            FormatKind::PlainText(TextFormat::Docx) => self.extract_docx(path),
            FormatKind::Unsupported => Err(ExtractError::UnsupportedFormat(unsupported_label(path))),
        }
    }

    fn image_extractor(&self) -> ExtractResult<ImageExtractor> {
        let recognizer = match &self.recognizer {
            Some(recognizer) => Arc::clone(recognizer),
            None => shared_recognizer(&self.config.ocr)?,
        };
        Ok(ImageExtractor::new(recognizer))
    }

    #[cfg(feature = "pdf")]
    fn extract_pdf(&self, path: &Path) -> ExtractResult<String> {
        self.pdf.extract(path)
    }

    #[cfg(not(feature = "pdf"))]
    fn extract_pdf(&self, _path: &Path) -> ExtractResult<String> {
        Err(ExtractError::FeatureDisabled("pdf"))
    }

    #[cfg(feature = "docx")]
    fn extract_docx(&self, path: &Path) -> ExtractResult<String> {
        self.docx.extract(path)
    }

    #[cfg(not(feature = "docx"))]
    fn extract_docx(&self, _path: &Path) -> ExtractResult<String> {
        Err(ExtractError::FeatureDisabled("docx"))
    }
}

impl Default for ExtractionDispatcher {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

impl Extractor for ExtractionDispatcher {
    fn extract(&self, path: &Path) -> ExtractResult<String> {
        self.extract_path(path)
    }

    fn name(&self) -> &str {
        "dispatcher"
    }
}

/// Builder for [`ExtractionDispatcher`].
#[derive(Default)]
pub struct DispatcherBuilder {
    config: ExtractionConfig,
    recognizer: Option<Arc<dyn TextRecognizer>>,
}

impl DispatcherBuilder {
    pub fn config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Use `recognizer` for images instead of the shared one.
    pub fn recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn build(self) -> ExtractionDispatcher {
        ExtractionDispatcher {
            #[cfg(feature = "pdf")]
            pdf: PdfExtractor::new(),
            #[cfg(feature = "docx")]
            docx: DocxExtractor::new().with_tables(self.config.docx.preserve_tables),
            tabular: TabularExtractor::new(self.config.tabular.clone()),
            text: PlainTextExtractor::new(),
            recognizer: self.recognizer,
            config: self.config,
        }
    }
}

fn unsupported_label(path: &Path) -> String {
    let ext = extension_of(path);
    if ext.is_empty() {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        format!(".{}", ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct StubRecognizer;

    impl TextRecognizer for StubRecognizer {
        fn recognize(&self, _path: &Path) -> ExtractResult<Vec<String>> {
            Ok(vec!["Form 1040".to_string(), "  Name:   Jane  ".to_string()])
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn dispatcher() -> ExtractionDispatcher {
        ExtractionDispatcher::builder()
            .recognizer(Arc::new(StubRecognizer))
            .build()
    }

    fn write_temp(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(content)
            .unwrap();
        path
    }

    #[test]
    fn test_unsupported_extension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "data.xyz", b"content");

        match dispatcher().extract_path(&path) {
            Err(ExtractError::UnsupportedFormat(ext)) => assert_eq!(ext, ".xyz"),
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_without_extension() {
        match dispatcher().extract_path(Path::new("/tmp/README")) {
            Err(ExtractError::UnsupportedFormat(label)) => assert_eq!(label, "README"),
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_text_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "notes.TXT", b"a\\nb\n\n   c");

        assert_eq!(dispatcher().extract_path(&path).unwrap(), "a b c");
        assert_eq!(dispatcher().extract_raw(&path).unwrap(), "a\\nb\n\n   c");
    }

    #[test]
    fn test_image_uses_injected_recognizer() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "scan.jpeg", b"\xFF\xD8\xFF");

        assert_eq!(dispatcher().extract_path(&path).unwrap(), "Form 1040 Name: Jane");
    }

    #[test]
    fn test_tabular_is_summarized() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "scores.csv", b"score\n1\n2\n");

        let text = dispatcher().extract_path(&path).unwrap();
        assert!(text.starts_with("score count 2.000000 mean 1.500000"));
    }

    #[test]
    fn test_strategy_errors_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "broken.json", b"{");

        assert!(matches!(
            dispatcher().extract_path(&path),
            Err(ExtractError::Tabular(_))
        ));
        assert!(matches!(
            dispatcher().extract_path(&dir.path().join("gone.md")),
            Err(ExtractError::NotFound(_))
        ));
    }

    #[test]
    fn test_config_reaches_strategies() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "scores.csv", b"score\n1\n2\n");

        let dispatcher = ExtractionDispatcher::builder()
            .config(ExtractionConfig::builder().float_precision(1).build())
            .recognizer(Arc::new(StubRecognizer))
            .build();
        let text = dispatcher.extract_path(&path).unwrap();
        assert!(text.starts_with("score count 2.0 mean 1.5"));
        assert_eq!(dispatcher.config().tabular.float_precision, 1);
    }
}
