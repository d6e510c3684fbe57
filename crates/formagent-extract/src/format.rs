//! File format classification by extension.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Extensions accepted for upload, lowercase and without the leading dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "pdf", "docx", "jpg", "jpeg", "png", "csv", "xlsx", "xls", "json", "txt", "md",
];

/// Structured file flavour handled by the tabular strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabularFormat {
    /// Delimited text (`.csv`).
    Csv,
    /// Spreadsheet workbook (`.xls`, `.xlsx`).
    Excel,
    /// JSON document (`.json`).
    Json,
}

/// Text-bearing document flavour handled by the plain-text strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    /// UTF-8 text (`.txt`, `.md`).
    Plain,
    /// Word processing container (`.docx`).
    Docx,
}

/// Extraction strategy a file is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "format")]
pub enum FormatKind {
    Pdf,
    Tabular(TabularFormat),
    Image,
    PlainText(TextFormat),
    Unsupported,
}

impl FormatKind {
    /// Classify a bare extension, with or without a leading dot.
    ///
    /// Matching is case-insensitive and total: anything outside the table is
    /// [`FormatKind::Unsupported`].
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Self::Pdf,
            "csv" => Self::Tabular(TabularFormat::Csv),
            "xls" | "xlsx" => Self::Tabular(TabularFormat::Excel),
            "json" => Self::Tabular(TabularFormat::Json),
            "png" | "jpg" | "jpeg" => Self::Image,
            "txt" | "md" => Self::PlainText(TextFormat::Plain),
            "docx" => Self::PlainText(TextFormat::Docx),
            _ => Self::Unsupported,
        }
    }

    /// Classify a path by its final extension. Paths without one are unsupported.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unsupported)
    }

    /// Whether a strategy exists for this kind.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    /// Short label used in logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Tabular(_) => "tabular",
            Self::Image => "image",
            Self::PlainText(_) => "plain-text",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lowercased extension of `path`, or an empty string when it has none.
pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}
