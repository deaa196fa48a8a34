//! Version-control status query used to discover conflicted paths.

pub mod client;
pub mod parser;

use async_trait::async_trait;

use crate::errors::DiscoveryError;

pub use client::StatusCommand;
pub use parser::parse_conflicted_paths;

/// Anything that can produce a line-oriented status report.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Run the status query and return its textual report.
    async fn status(&self) -> Result<String, DiscoveryError>;
}
