//! OCR recognizers.
//!
//! The recognizer is the only extraction resource with a start-up cost, so it
//! is shared: [`shared_recognizer`] builds the default Tesseract recognizer on
//! first use and hands out the same instance for the rest of the process.
//! Dispatchers take an `Arc<dyn TextRecognizer>` so tests can substitute a fake.

use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::config::OcrConfig;
use crate::error::{ExtractError, ExtractResult};

/// Optical character recognition over a raster image on disk.
pub trait TextRecognizer: Send + Sync {
    /// Recognize text fragments in engine order.
    fn recognize(&self, path: &Path) -> ExtractResult<Vec<String>>;

    /// Human-readable engine name.
    fn name(&self) -> &str;
}

static SHARED: OnceCell<Arc<dyn TextRecognizer>> = OnceCell::new();

/// Process-wide default recognizer.
///
/// Initialized exactly once, from the configuration passed on the first
/// successful call; later calls return that instance and ignore `config`.
/// A failed initialization is not cached, so the next call retries.
pub fn shared_recognizer(config: &OcrConfig) -> ExtractResult<Arc<dyn TextRecognizer>> {
    SHARED
        .get_or_try_init(|| default_recognizer(config))
        .map(Arc::clone)
}

#[cfg(feature = "ocr")]
fn default_recognizer(config: &OcrConfig) -> ExtractResult<Arc<dyn TextRecognizer>> {
    Ok(Arc::new(TesseractRecognizer::new(config)?))
}

#[cfg(not(feature = "ocr"))]
fn default_recognizer(_config: &OcrConfig) -> ExtractResult<Arc<dyn TextRecognizer>> {
    Ok(Arc::new(UnavailableRecognizer))
}

/// Recognizer used when the `ocr` feature is off; every call fails.
#[cfg(not(feature = "ocr"))]
struct UnavailableRecognizer;

#[cfg(not(feature = "ocr"))]
impl TextRecognizer for UnavailableRecognizer {
    fn recognize(&self, _path: &Path) -> ExtractResult<Vec<String>> {
        Err(ExtractError::FeatureDisabled("ocr"))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

/// Tesseract-backed recognizer restricted to the configured language.
#[cfg(feature = "ocr")]
pub struct TesseractRecognizer {
    args: rusty_tesseract::Args,
    version: String,
}

#[cfg(feature = "ocr")]
impl TesseractRecognizer {
    /// Probe the tesseract installation and fix the recognition arguments.
    pub fn new(config: &OcrConfig) -> ExtractResult<Self> {
        let version = rusty_tesseract::get_tesseract_version()
            .map_err(|e| ExtractError::Ocr(format!("Tesseract is not available: {}", e)))?;

        tracing::info!(
            version = %version.trim(),
            language = %config.language,
            "Initialized OCR engine"
        );

        Ok(Self {
            args: rusty_tesseract::Args {
                lang: config.language.clone(),
                dpi: config.dpi,
                psm: config.psm,
                ..rusty_tesseract::Args::default()
            },
            version: version.trim().to_string(),
        })
    }

    /// Reported tesseract version.
    pub fn version(&self) -> &str {
        &self.version
    }
}

#[cfg(feature = "ocr")]
impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, path: &Path) -> ExtractResult<Vec<String>> {
        let image = rusty_tesseract::Image::from_path(path.to_path_buf())
            .map_err(|e| ExtractError::Ocr(format!("Failed to load image: {}", e)))?;

        let raw = rusty_tesseract::image_to_string(&image, &self.args)
            .map_err(|e| ExtractError::Ocr(e.to_string()))?;

        Ok(raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}
