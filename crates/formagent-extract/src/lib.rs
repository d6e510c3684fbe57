//! formagent-extract - Text extraction for uploaded documents.
//!
//! Classifies files by extension, runs the matching format strategy, and
//! normalizes the text for downstream summarization and question answering.
//!
//! | Kind       | Extensions                 | Strategy                          |
//! |------------|----------------------------|-----------------------------------|
//! | pdf        | `pdf`                      | page text layer via pdf-extract   |
//! | tabular    | `csv`, `xls`, `xlsx`, `json` | descriptive statistics table    |
//! | image      | `png`, `jpg`, `jpeg`       | OCR via a shared recognizer       |
//! | plain-text | `txt`, `md`, `docx`        | UTF-8 read, DOCX via docx-rs      |
//!
//! # Features
//!
//! - `pdf` (default) - PDF text extraction via pdf-extract
//! - `docx` (default) - DOCX text extraction via docx-rs
//! - `ocr` (default) - Image OCR via tesseract (requires tesseract installed)
//!
//! # Example
//!
//! ```ignore
//! use formagent_extract::{BatchExtractor, ExtractionDispatcher, ExtractionConfig};
//!
//! let dispatcher = ExtractionDispatcher::new(ExtractionConfig::default());
//! let text = dispatcher.extract_path("form.pdf".as_ref())?;
//!
//! // One bad file never aborts the batch.
//! let results = BatchExtractor::new(dispatcher).extract_all(["a.pdf", "b.csv"]);
//! for entry in &results {
//!     println!("{}: {:?}", entry.source.name, entry.outcome.text());
//! }
//! ```

mod config;
mod dispatcher;
mod error;
mod format;
mod image;
mod normalize;
mod ocr;
mod pipeline;
mod session;
mod tabular;
mod text;
mod types;

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "docx")]
mod docx;

pub use config::{DocxConfig, ExtractionConfig, ExtractionConfigBuilder, OcrConfig, TabularConfig};
pub use dispatcher::{DispatcherBuilder, ExtractionDispatcher};
pub use error::{ExtractError, ExtractResult};
pub use format::{FormatKind, TabularFormat, TextFormat, SUPPORTED_EXTENSIONS};
pub use image::ImageExtractor;
pub use normalize::normalize_text;
pub use ocr::{shared_recognizer, TextRecognizer};
pub use pipeline::BatchExtractor;
pub use session::{ExtractionSession, SessionUpdate, Upload};
pub use tabular::{Cell, Summary, Table, TabularExtractor};
pub use text::PlainTextExtractor;
pub use types::{BatchSummary, ExtractionOutcome, ExtractionResults, FileExtraction, SourceFile};

#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;

#[cfg(feature = "docx")]
pub use docx::DocxExtractor;

#[cfg(feature = "ocr")]
pub use ocr::TesseractRecognizer;

use std::path::Path;

/// Core Extractor trait - every format strategy implements this.
///
/// Extraction is synchronous and blocking; a call runs to completion before
/// the next file starts.
pub trait Extractor: Send + Sync {
    /// Extract raw text from the file at `path`.
    fn extract(&self, path: &Path) -> ExtractResult<String>;

    /// Human-readable name for this extractor.
    fn name(&self) -> &str;
}
