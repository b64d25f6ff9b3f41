//! Loading the consultation corpus from disk.

use qaryz_core::error::KnowledgeError;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// One source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// File name relative to the corpus directory.
    pub source: String,
    pub content: String,
}

/// Load every `*.txt` file directly under `dir`, sorted by file name.
///
/// Files that are not valid UTF-8 are skipped with a warning. A missing
/// directory is an error; an empty one is not.
pub fn load_documents(dir: &Path) -> Result<Vec<Document>, KnowledgeError> {
    let unavailable = |reason: String| KnowledgeError::CorpusUnavailable {
        path: dir.display().to_string(),
        reason,
    };

    let entries = std::fs::read_dir(dir).map_err(|e| unavailable(e.to_string()))?;

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
        })
        .collect();
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => {
                debug!(source = %source, "Skipping empty document");
            }
            Ok(content) => documents.push(Document { source, content }),
            Err(e) => warn!(source = %source, error = %e, "Skipping unreadable document"),
        }
    }

    info!(count = documents.len(), dir = %dir.display(), "Loaded documents");
    Ok(documents)
}
