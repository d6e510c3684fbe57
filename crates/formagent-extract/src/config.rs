//! Extraction configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, ExtractResult};

/// OCR recognizer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract language code the recognizer is restricted to.
    pub language: String,
    /// Input resolution hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dpi: Option<i32>,
    /// Tesseract page segmentation mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psm: Option<i32>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            dpi: None,
            psm: None,
        }
    }
}

/// Tabular summarization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabularConfig {
    /// Field delimiter for `.csv` files.
    pub delimiter: char,
    /// Decimal places for rendered statistics.
    pub float_precision: usize,
}

impl Default for TabularConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            float_precision: 6,
        }
    }
}

/// DOCX extraction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocxConfig {
    /// Render tables row by row instead of one cell per line.
    pub preserve_tables: bool,
}

impl Default for DocxConfig {
    fn default() -> Self {
        Self {
            preserve_tables: true,
        }
    }
}

/// Top-level extraction configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub ocr: OcrConfig,
    pub tabular: TabularConfig,
    pub docx: DocxConfig,
}

impl ExtractionConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> ExtractResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => toml::from_str(&content).map_err(|e| ExtractError::Config(e.to_string())),
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| ExtractError::Config(e.to_string()))
            }
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&content).map_err(|e| ExtractError::Config(e.to_string()))
            }
            _ => Err(ExtractError::Config(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder::default()
    }
}

/// Builder for ExtractionConfig.
#[derive(Default)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    /// Set OCR language.
    pub fn ocr_language(mut self, language: impl Into<String>) -> Self {
        self.config.ocr.language = language.into();
        self
    }

    /// Set OCR configuration.
    pub fn ocr(mut self, config: OcrConfig) -> Self {
        self.config.ocr = config;
        self
    }

    /// Set CSV delimiter.
    pub fn csv_delimiter(mut self, delimiter: char) -> Self {
        self.config.tabular.delimiter = delimiter;
        self
    }

    /// Set decimal places for tabular statistics.
    pub fn float_precision(mut self, precision: usize) -> Self {
        self.config.tabular.float_precision = precision;
        self
    }

    /// Set whether DOCX tables keep their row layout.
    pub fn preserve_docx_tables(mut self, preserve: bool) -> Self {
        self.config.docx.preserve_tables = preserve;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ExtractionConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = ExtractionConfig::default();
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.tabular.delimiter, ',');
        assert_eq!(config.tabular.float_precision, 6);
        assert!(config.docx.preserve_tables);
    }

    #[test]
    fn test_toml_partial() {
        let file = write_config(".toml", "[ocr]\nlanguage = \"deu\"\npsm = 6\n");
        let config = ExtractionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.ocr.language, "deu");
        assert_eq!(config.ocr.psm, Some(6));
        assert_eq!(config.tabular, TabularConfig::default());
    }

    #[test]
    fn test_json_and_yaml() {
        let json = write_config(".json", r#"{"tabular": {"delimiter": ";"}}"#);
        assert_eq!(
            ExtractionConfig::from_file(json.path()).unwrap().tabular.delimiter,
            ';'
        );

        let yaml = write_config(".yml", "docx:\n  preserve_tables: false\n");
        assert!(!ExtractionConfig::from_file(yaml.path()).unwrap().docx.preserve_tables);
    }

    #[test]
    fn test_unknown_extension() {
        let file = write_config(".ini", "language=eng");
        assert!(matches!(
            ExtractionConfig::from_file(file.path()),
            Err(ExtractError::Config(_))
        ));
    }

    #[test]
    fn test_builder() {
        let config = ExtractionConfig::builder()
            .ocr_language("fra")
            .csv_delimiter('\t')
            .float_precision(2)
            .preserve_docx_tables(false)
            .build();
        assert_eq!(config.ocr.language, "fra");
        assert_eq!(config.tabular.delimiter, '\t');
        assert_eq!(config.tabular.float_precision, 2);
        assert!(!config.docx.preserve_tables);
    }
}
