//! Extraction results cached across repeated uploads.
//!
//! A session owns a private temporary directory. Each call to
//! [`ExtractionSession::ingest`] receives the full current upload list:
//! results for files no longer listed are dropped, files already extracted
//! are reused, and only new files are written to disk and extracted. The
//! directory and everything in it is removed when the session is dropped.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::error::{ExtractError, ExtractResult};
use crate::pipeline::BatchExtractor;
use crate::types::{ExtractionOutcome, ExtractionResults, SourceFile};

/// An uploaded file: its client-side name and raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub content: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// Basename of the client-supplied filename.
    pub fn name(&self) -> String {
        Path::new(&self.filename)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.filename.clone())
    }
}

/// What one [`ExtractionSession::ingest`] call changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUpdate {
    /// Names extracted during this call.
    pub extracted: Vec<String>,
    /// Names dropped because they were no longer uploaded.
    pub removed: Vec<String>,
    /// Names served from earlier results.
    pub reused: Vec<String>,
}

/// Upload-to-text cache for one interactive session.
pub struct ExtractionSession {
    batch: BatchExtractor,
    workdir: TempDir,
    uploaded: Vec<String>,
    results: ExtractionResults,
    /// Per-upload subdirectory counter.
    next_slot: usize,
}

impl ExtractionSession {
    /// Create a session with its own temporary directory.
    pub fn new(batch: BatchExtractor) -> ExtractResult<Self> {
        let workdir = tempfile::Builder::new().prefix("formagent-").tempdir()?;
        debug!(workdir = %workdir.path().display(), "Created extraction session");
        Ok(Self {
            batch,
            workdir,
            uploaded: Vec::new(),
            results: ExtractionResults::new(),
            next_slot: 0,
        })
    }

    /// Synchronize the session with the current upload list.
    ///
    /// An upload that cannot be written to disk is recorded as failed under
    /// its name; the remaining uploads are still extracted.
    pub fn ingest(&mut self, uploads: &[Upload]) -> ExtractResult<SessionUpdate> {
        let names: Vec<String> = uploads.iter().map(Upload::name).collect();
        let mut update = SessionUpdate::default();

        let stale: Vec<String> = self
            .uploaded
            .iter()
            .filter(|name| !names.contains(*name))
            .cloned()
            .collect();
        for name in stale {
            self.results.remove(&name);
            update.removed.push(name);
        }
        self.uploaded = names.clone();

        let mut fresh = ExtractionResults::new();
        for (upload, name) in uploads.iter().zip(&names) {
            if self.results.contains(name) {
                if !update.reused.contains(name) {
                    update.reused.push(name.clone());
                }
                continue;
            }

            let (source, outcome) = match self.materialize(upload, name) {
                Ok(path) => {
                    let source = SourceFile::from_path(&path);
                    let outcome = self.batch.extract_one(&source);
                    (source, outcome)
                }
                Err(e) => {
                    warn!(name = %name, error = %e, "Failed to store upload");
                    let source = SourceFile {
                        name: name.clone(),
                        path: PathBuf::from(&upload.filename),
                    };
                    (source, ExtractionOutcome::Failed(e))
                }
            };
            fresh.insert(source, outcome);
        }

        if !fresh.is_empty() {
            let summary = fresh.summary();
            info!(
                extracted = summary.extracted,
                failed = summary.failed,
                reused = update.reused.len(),
                "Session uploads ingested"
            );
            update.extracted = fresh.names().map(String::from).collect();
            self.results.merge(fresh);
        }

        Ok(update)
    }

    /// Write an upload under its own subdirectory so the basename survives.
    fn materialize(&mut self, upload: &Upload, name: &str) -> ExtractResult<PathBuf> {
        if matches!(name, "" | "." | "..") {
            return Err(ExtractError::InvalidUpload(upload.filename.clone()));
        }

        let dir = self.workdir.path().join(format!("{:04}", self.next_slot));
        self.next_slot += 1;
        std::fs::create_dir_all(&dir)?;

        let path = dir.join(name);
        let mut file = std::fs::File::create(&path)?;
        file.write_all(&upload.content)?;
        debug!(path = %path.display(), bytes = upload.content.len(), "Materialized upload");
        Ok(path)
    }

    /// All results, in upload order of first extraction.
    pub fn results(&self) -> &ExtractionResults {
        &self.results
    }

    /// Names in the most recent upload list.
    pub fn uploaded(&self) -> &[String] {
        &self.uploaded
    }

    /// Successful, non-blank texts.
    pub fn usable_texts(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|e| e.outcome.has_content())
            .filter_map(|e| e.outcome.text())
            .collect()
    }

    /// Usable texts joined by a blank line, or `None` if there are none.
    pub fn combined_text(&self) -> Option<String> {
        let texts = self.usable_texts();
        if texts.is_empty() {
            None
        } else {
            Some(texts.join("\n\n"))
        }
    }

    /// Temporary directory uploads are written to.
    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Extractor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Returns file contents uppercased; `.bin` files fail.
    #[derive(Default)]
    struct UpperExtractor {
        calls: AtomicUsize,
    }

    impl Extractor for UpperExtractor {
        fn extract(&self, path: &Path) -> ExtractResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if path.extension().map(|e| e == "bin").unwrap_or(false) {
                return Err(ExtractError::UnsupportedFormat(".bin".to_string()));
            }
            Ok(std::fs::read_to_string(path)?.to_uppercase())
        }

        fn name(&self) -> &str {
            "upper"
        }
    }

    fn session() -> (ExtractionSession, Arc<UpperExtractor>) {
        let extractor = Arc::new(UpperExtractor::default());
        let session = ExtractionSession::new(BatchExtractor::from_arc(extractor.clone())).unwrap();
        (session, extractor)
    }

    #[test]
    fn test_only_new_uploads_are_extracted() {
        let (mut session, extractor) = session();

        let first = session
            .ingest(&[Upload::new("a.txt", "alpha"), Upload::new("b.txt", "beta")])
            .unwrap();
        assert_eq!(first.extracted, ["a.txt", "b.txt"]);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 2);

        let second = session
            .ingest(&[
                Upload::new("a.txt", "alpha"),
                Upload::new("b.txt", "beta"),
                Upload::new("c.txt", "gamma"),
            ])
            .unwrap();
        assert_eq!(second.extracted, ["c.txt"]);
        assert_eq!(second.reused, ["a.txt", "b.txt"]);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 3);
        assert_eq!(session.results().text("c.txt"), Some("GAMMA"));
    }

    #[test]
    fn test_removed_uploads_are_dropped() {
        let (mut session, _) = session();
        session
            .ingest(&[Upload::new("a.txt", "alpha"), Upload::new("b.txt", "beta")])
            .unwrap();

        let update = session.ingest(&[Upload::new("b.txt", "beta")]).unwrap();
        assert_eq!(update.removed, ["a.txt"]);
        assert!(update.extracted.is_empty());
        assert!(!session.results().contains("a.txt"));
        assert_eq!(session.uploaded(), ["b.txt"]);
    }

    #[test]
    fn test_failed_upload_is_cached_as_absent() {
        let (mut session, extractor) = session();
        session
            .ingest(&[Upload::new("blob.bin", vec![0u8, 1, 2]), Upload::new("a.txt", "alpha")])
            .unwrap();

        assert_eq!(session.results().len(), 2);
        assert_eq!(session.results().text("blob.bin"), None);

        session
            .ingest(&[Upload::new("blob.bin", vec![0u8, 1, 2]), Upload::new("a.txt", "alpha")])
            .unwrap();
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_combined_text_skips_blank_and_failed() {
        let (mut session, _) = session();
        assert_eq!(session.combined_text(), None);

        session
            .ingest(&[
                Upload::new("a.txt", "alpha"),
                Upload::new("empty.txt", "   "),
                Upload::new("blob.bin", vec![7u8]),
                Upload::new("b.txt", "beta"),
            ])
            .unwrap();

        assert_eq!(session.usable_texts(), ["ALPHA", "BETA"]);
        assert_eq!(session.combined_text().as_deref(), Some("ALPHA\n\nBETA"));
    }

    #[test]
    fn test_upload_name_is_basename() {
        let (mut session, _) = session();
        session
            .ingest(&[Upload::new("../../etc/evil.txt", "x")])
            .unwrap();

        let entry = session.results().get("evil.txt").unwrap();
        assert!(entry.source.path.starts_with(session.workdir()));
    }

    #[test]
    fn test_unstorable_upload_does_not_abort_ingest() {
        let (mut session, extractor) = session();
        let update = session
            .ingest(&[
                Upload::new("good.txt", "hello"),
                Upload::new("..", "x"),
                Upload::new("", "y"),
                Upload::new("later.txt", "world"),
            ])
            .unwrap();

        assert_eq!(update.extracted, ["good.txt", "..", "", "later.txt"]);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 2);
        assert_eq!(session.results().text("good.txt"), Some("HELLO"));
        assert_eq!(session.results().text("later.txt"), Some("WORLD"));
        assert!(matches!(
            session.results().get("..").unwrap().outcome.error(),
            Some(ExtractError::InvalidUpload(_))
        ));
        assert!(session.results().get("").unwrap().outcome.is_failed());
        assert_eq!(session.usable_texts(), ["HELLO", "WORLD"]);
    }

    #[test]
    fn test_workdir_removed_on_drop() {
        let (mut session, _) = session();
        session.ingest(&[Upload::new("a.txt", "alpha")]).unwrap();
        let workdir = session.workdir().to_path_buf();
        assert!(workdir.exists());

        drop(session);
        assert!(!workdir.exists());
    }
}
