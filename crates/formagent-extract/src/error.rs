//! Extraction error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during content extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Input path does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// PDF container could not be parsed.
    #[error("Corrupt document {}: {reason}", path.display())]
    CorruptDocument { path: PathBuf, reason: String },

    /// Text file could not be read or is not valid UTF-8.
    #[error("Could not read text file {}: {source}", path.display())]
    EncodingOrIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Extension is outside the recognized table.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// Tabular file could not be loaded as a table.
    #[error("Tabular extraction error: {0}")]
    Tabular(String),

    /// OCR engine failed to initialize or recognize.
    #[error("OCR error: {0}")]
    Ocr(String),

    /// DOCX container could not be parsed.
    #[error("DOCX extraction error: {0}")]
    Docx(String),

    /// Uploaded file name has no usable basename.
    #[error("Invalid upload name: {0:?}")]
    InvalidUpload(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Strategy was compiled out.
    #[error("Extraction backend not enabled: {0}")]
    FeatureDisabled(&'static str),

    /// IO error outside a specific strategy.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Fail with [`ExtractError::NotFound`] unless `path` exists.
pub(crate) fn ensure_exists(path: &std::path::Path) -> ExtractResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ExtractError::NotFound(path.to_path_buf()))
    }
}
