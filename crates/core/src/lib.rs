//! conflict-advisor core library.
//!
//! This crate provides the components of the AI-assisted merge conflict
//! advisor: configuration, conflict discovery through the VCS status report,
//! the text-generation backend, per-conflict analysis and resolution, and the
//! session state machine that ties them together.

pub mod ai;
pub mod config;
pub mod conflict;
pub mod errors;
pub mod session;
pub mod style;
pub mod vcs;

// Re-exports for convenience.
pub use config::AdvisorConfig;
pub use conflict::{AnalysisRequester, ConflictAnalysis, ConflictLocator, ConflictedFile, ResolutionStore};
pub use session::{Mode, ModeController, SessionDriver, SessionOutcome};
