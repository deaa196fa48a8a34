//! Conflict discovery, AI analysis, and resolution.
//!
//! The conflict subsystem is responsible for:
//! 1. **Discovery** -- asking the VCS which files are conflicted and reading them.
//! 2. **Analysis** -- asking the text-generation backend to classify each
//!    conflict and propose a resolved file.
//! 3. **Resolution** -- overwriting a file with an accepted proposal.

pub mod analysis;
pub mod locator;
pub mod store;

pub use analysis::{AnalysisRequester, ConflictAnalysis, Level};
pub use locator::{ConflictLocator, ConflictedFile};
pub use store::ResolutionStore;
