//! Core types for batch extraction results.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ExtractError;

/// An uploaded file awaiting extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    /// Basename, the key results are stored under.
    pub name: String,
    /// Location on disk.
    pub path: PathBuf,
}

impl SourceFile {
    /// Key a path by its final component.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            name,
            path: path.to_path_buf(),
        }
    }
}

/// Per-file extraction result.
///
/// `Failed` is the absence marker: it is distinct from a successful
/// extraction that produced empty text.
#[derive(Debug)]
pub enum ExtractionOutcome {
    Extracted(String),
    Failed(ExtractError),
}

impl ExtractionOutcome {
    /// Extracted text, or `None` for a failure.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Extracted(text) => Some(text.as_str()),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ExtractError> {
        match self {
            Self::Extracted(_) => None,
            Self::Failed(e) => Some(e),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Whether there is anything to summarize (a success with non-blank text).
    pub fn has_content(&self) -> bool {
        self.text().map(|t| !t.trim().is_empty()).unwrap_or(false)
    }
}

impl From<Result<String, ExtractError>> for ExtractionOutcome {
    fn from(result: Result<String, ExtractError>) -> Self {
        match result {
            Ok(text) => Self::Extracted(text),
            Err(e) => Self::Failed(e),
        }
    }
}

/// One entry of [`ExtractionResults`].
#[derive(Debug)]
pub struct FileExtraction {
    pub source: SourceFile,
    pub outcome: ExtractionOutcome,
}

/// Name-keyed extraction results in submission order.
///
/// Keys are unique: inserting an existing name replaces that entry in place.
#[derive(Debug, Default)]
pub struct ExtractionResults {
    entries: Vec<FileExtraction>,
}

impl ExtractionResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by `source.name`. Returns the replaced entry.
    pub fn insert(
        &mut self,
        source: SourceFile,
        outcome: ExtractionOutcome,
    ) -> Option<FileExtraction> {
        let entry = FileExtraction { source, outcome };
        match self.position(&entry.source.name) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index], entry)),
            None => {
                self.entries.push(entry);
                None
            }
        }
    }

    /// Remove the entry for `name`.
    pub fn remove(&mut self, name: &str) -> Option<FileExtraction> {
        self.position(name).map(|index| self.entries.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&FileExtraction> {
        self.entries.iter().find(|e| e.source.name == name)
    }

    /// Text for `name`; `None` when absent or failed.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|e| e.outcome.text())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.source.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileExtraction> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move every entry of `other` into `self`, replacing on name clashes.
    pub fn merge(&mut self, other: ExtractionResults) {
        for entry in other.entries {
            self.insert(entry.source, entry.outcome);
        }
    }

    /// Counts of successes and failures.
    pub fn summary(&self) -> BatchSummary {
        let failed = self.entries.iter().filter(|e| e.outcome.is_failed()).count();
        BatchSummary {
            total: self.entries.len(),
            extracted: self.entries.len() - failed,
            failed,
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.source.name == name)
    }
}

impl<'a> IntoIterator for &'a ExtractionResults {
    type Item = &'a FileExtraction;
    type IntoIter = std::slice::Iter<'a, FileExtraction>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Batch counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub extracted: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_file_uses_basename() {
        let source = SourceFile::from_path("/tmp/upload/abc/form.pdf");
        assert_eq!(source.name, "form.pdf");
        assert_eq!(source.path, PathBuf::from("/tmp/upload/abc/form.pdf"));
    }

    #[test]
    fn test_absence_differs_from_empty() {
        let empty = ExtractionOutcome::Extracted(String::new());
        let failed = ExtractionOutcome::Failed(ExtractError::UnsupportedFormat(".xyz".into()));

        assert_eq!(empty.text(), Some(""));
        assert_eq!(failed.text(), None);
        assert!(!empty.has_content());
        assert!(!failed.has_content());
        assert!(failed.is_failed());
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut results = ExtractionResults::new();
        results.insert(
            SourceFile::from_path("/a/x.txt"),
            ExtractionOutcome::Extracted("first".into()),
        );
        results.insert(
            SourceFile::from_path("/a/y.txt"),
            ExtractionOutcome::Extracted("y".into()),
        );
        let replaced = results.insert(
            SourceFile::from_path("/b/x.txt"),
            ExtractionOutcome::Extracted("second".into()),
        );

        assert!(replaced.is_some());
        assert_eq!(results.len(), 2);
        assert_eq!(results.names().collect::<Vec<_>>(), ["x.txt", "y.txt"]);
        assert_eq!(results.text("x.txt"), Some("second"));
        assert_eq!(
            results.get("x.txt").unwrap().source.path,
            PathBuf::from("/b/x.txt")
        );
    }

    #[test]
    fn test_remove_and_summary() {
        let mut results = ExtractionResults::new();
        results.insert(
            SourceFile::from_path("ok.txt"),
            ExtractionOutcome::Extracted("ok".into()),
        );
        results.insert(
            SourceFile::from_path("bad.pdf"),
            ExtractionOutcome::from(Err::<String, _>(ExtractError::NotFound("bad.pdf".into()))),
        );

        let summary = results.summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.extracted, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.is_success());

        assert!(results.remove("bad.pdf").is_some());
        assert!(!results.contains("bad.pdf"));
        assert!(results.summary().is_success());
    }
}
