//! Writing accepted resolutions back to the working copy.
//!
//! Applying is a full-file replacement: the proposed content overwrites the
//! conflicted file verbatim. There is no backup; the VCS history is the only
//! way back.

use std::path::PathBuf;

use tracing::{info, instrument};

use super::analysis::ConflictAnalysis;
use crate::errors::ResolutionError;

/// Applies proposed resolutions under a working copy root.
#[derive(Debug, Clone)]
pub struct ResolutionStore {
    root: PathBuf,
}

impl ResolutionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Overwrite the analysed file with its proposed resolution.
    #[instrument(skip(self, analysis), fields(path = %analysis.path.display()))]
    pub fn apply(&self, analysis: &ConflictAnalysis) -> Result<(), ResolutionError> {
        let target = self.root.join(&analysis.path);
        if !target.is_file() {
            return Err(ResolutionError::Missing(analysis.path.clone()));
        }

        std::fs::write(&target, analysis.proposed_resolution.as_bytes()).map_err(|source| {
            ResolutionError::WriteFailed {
                path: analysis.path.clone(),
                source,
            }
        })?;

        info!(bytes = analysis.proposed_resolution.len(), "resolution applied");
        Ok(())
    }
}
