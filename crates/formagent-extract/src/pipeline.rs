//! Batch extraction over a list of files.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::dispatcher::ExtractionDispatcher;
use crate::types::{ExtractionOutcome, ExtractionResults, SourceFile};
use crate::Extractor;

/// Runs an extractor over many files, one at a time, in input order.
///
/// This is the recovery boundary: a failing file is recorded as
/// [`ExtractionOutcome::Failed`] and the batch continues.
#[derive(Clone)]
pub struct BatchExtractor {
    extractor: Arc<dyn Extractor>,
}

impl BatchExtractor {
    /// Create a batch extractor around any single-file extractor.
    pub fn new(extractor: impl Extractor + 'static) -> Self {
        Self {
            extractor: Arc::new(extractor),
        }
    }

    /// Share an existing extractor.
    pub fn from_arc(extractor: Arc<dyn Extractor>) -> Self {
        Self { extractor }
    }

    /// Create a batch extractor over the default dispatcher.
    pub fn with_defaults() -> Self {
        Self::new(ExtractionDispatcher::default())
    }

    /// Extract every path, keyed by basename.
    ///
    /// Returns one entry per distinct basename. When two paths share a
    /// basename, the later one replaces the earlier.
    pub fn extract_all<I, P>(&self, paths: I) -> ExtractionResults
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut results = ExtractionResults::new();

        for path in paths {
            let source = SourceFile::from_path(path);
            let outcome = self.extract_one(&source);
            if let Some(previous) = results.insert(source, outcome) {
                warn!(
                    name = %previous.source.name,
                    replaced = %previous.source.path.display(),
                    "Duplicate file name in batch, keeping the later file"
                );
            }
        }

        let summary = results.summary();
        info!(
            total = summary.total,
            extracted = summary.extracted,
            failed = summary.failed,
            extractor = self.extractor.name(),
            "Batch extraction complete"
        );

        results
    }

    /// Extract one file, converting failure into an outcome.
    pub fn extract_one(&self, source: &SourceFile) -> ExtractionOutcome {
        match self.extractor.extract(&source.path) {
            Ok(text) => ExtractionOutcome::Extracted(text),
            Err(e) => {
                warn!(path = %source.path.display(), error = %e, "Failed to process file");
                ExtractionOutcome::Failed(e)
            }
        }
    }
}

impl Default for BatchExtractor {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractError, ExtractResult};
    use std::sync::Mutex;

    /// Fails on names starting with "bad", echoes the name otherwise.
    #[derive(Default)]
    struct EchoExtractor {
        seen: Mutex<Vec<String>>,
    }

    impl Extractor for EchoExtractor {
        fn extract(&self, path: &Path) -> ExtractResult<String> {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            self.seen.lock().unwrap().push(name.clone());
            if name.starts_with("bad") {
                Err(ExtractError::CorruptDocument {
                    path: path.to_path_buf(),
                    reason: "stub".to_string(),
                })
            } else {
                Ok(name)
            }
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[test]
    fn test_failures_do_not_abort() {
        let batch = BatchExtractor::new(EchoExtractor::default());
        let results = batch.extract_all(["/u/a.txt", "/u/bad.pdf", "/u/c.txt"]);

        assert_eq!(results.len(), 3);
        assert_eq!(results.text("a.txt"), Some("a.txt"));
        assert_eq!(results.text("bad.pdf"), None);
        assert!(results.get("bad.pdf").unwrap().outcome.is_failed());
        assert_eq!(results.text("c.txt"), Some("c.txt"));
    }

    #[test]
    fn test_processes_in_input_order() {
        let extractor = Arc::new(EchoExtractor::default());
        let batch = BatchExtractor::from_arc(extractor.clone());
        let results = batch.extract_all(["z.md", "a.md", "m.md"]);

        assert_eq!(*extractor.seen.lock().unwrap(), ["z.md", "a.md", "m.md"]);
        assert_eq!(results.names().collect::<Vec<_>>(), ["z.md", "a.md", "m.md"]);
    }

    #[test]
    fn test_one_key_per_basename() {
        let batch = BatchExtractor::new(EchoExtractor::default());
        let results = batch.extract_all(["/one/form.txt", "/two/form.txt", "/two/bad.txt"]);

        assert_eq!(results.len(), 2);
        assert_eq!(
            results.get("form.txt").unwrap().source.path,
            std::path::PathBuf::from("/two/form.txt")
        );
    }

    #[test]
    fn test_empty_batch() {
        let batch = BatchExtractor::new(EchoExtractor::default());
        let results = batch.extract_all(Vec::<&str>::new());
        assert!(results.is_empty());
        assert!(results.summary().is_success());
    }
}
