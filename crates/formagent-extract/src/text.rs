//! Plain-text passthrough for `.txt` and `.md` files.

use std::path::Path;

use crate::error::{ExtractError, ExtractResult};
use crate::Extractor;

/// Reads the whole file as UTF-8.
#[derive(Debug, Clone, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> ExtractResult<String> {
        std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ExtractError::NotFound(path.to_path_buf())
            } else {
                ExtractError::EncodingOrIo {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })
    }

    fn name(&self) -> &str {
        "plain-text"
    }
}
