//! Conflict discovery.
//!
//! The [`ConflictLocator`] asks a [`StatusSource`] which paths are conflicted
//! and loads each one's current, marker-bearing content.

use std::path::PathBuf;

use tracing::{debug, info, instrument, warn};

use crate::errors::DiscoveryError;
use crate::vcs::{parse_conflicted_paths, StatusSource};

/// A file reported as conflicted, as it was on disk at discovery time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictedFile {
    /// Path relative to the working copy root.
    pub path: PathBuf,
    /// Full text including conflict markers.
    pub content: String,
}

impl ConflictedFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Finds conflicted files in a working copy.
pub struct ConflictLocator {
    source: Box<dyn StatusSource>,
    marker: String,
    root: PathBuf,
}

impl ConflictLocator {
    pub fn new(source: Box<dyn StatusSource>, marker: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            source,
            marker: marker.into(),
            root: root.into(),
        }
    }

    /// Conflicted files in status-report order; an unavailable status query
    /// degrades to an empty list.
    pub async fn list_conflicts(&self) -> Vec<ConflictedFile> {
        match self.try_list_conflicts().await {
            Ok(files) => files,
            Err(e) => {
                warn!(error = %e, "status query failed, treating as no conflicts");
                Vec::new()
            }
        }
    }

    /// Like [`list_conflicts`](Self::list_conflicts) but surfaces query failure.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub async fn try_list_conflicts(&self) -> Result<Vec<ConflictedFile>, DiscoveryError> {
        let report = self.source.status().await?;
        let paths = parse_conflicted_paths(&report, &self.marker)?;

        let mut files = Vec::with_capacity(paths.len());
        for rel in paths {
            let full = self.root.join(&rel);
            if !full.is_file() {
                // Deleted on one side of the merge.
                debug!(path = %rel, "conflicted path not on disk, skipping");
                continue;
            }
            match std::fs::read_to_string(&full) {
                Ok(content) => files.push(ConflictedFile::new(rel, content)),
                Err(e) => warn!(path = %rel, error = %e, "cannot read conflicted file as text, skipping"),
            }
        }

        info!(count = files.len(), "located conflicted files");
        Ok(files)
    }
}
