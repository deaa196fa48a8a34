//! Error types for the conflict-advisor core library.
//!
//! Each subsystem has its own error type derived with `thiserror`. Discovery,
//! analysis, and resolution errors stay scoped to one file; configuration and
//! session errors end the run.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A required environment variable is not set.
    #[error("required environment variable '{var}' is not set (referenced by config field '{field}')")]
    EnvVarMissing { var: String, field: String },

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors from querying the version-control status.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The VCS binary was not found on `$PATH`.
    #[error("vcs binary not found: {0}")]
    BinaryNotFound(String),

    /// The status command exited with a non-zero status.
    #[error("vcs status failed (exit {exit_code}): {stderr}")]
    CommandFailed { exit_code: i32, stderr: String },

    /// The status marker could not be turned into a line pattern.
    #[error("invalid conflict marker '{0}'")]
    InvalidMarker(String),

    /// Generic I/O wrapper.
    #[error("vcs I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// AI backend errors
// ---------------------------------------------------------------------------

/// Errors from the text-generation backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP-level transport error (network, TLS, timeout).
    #[error("backend HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("backend API error (HTTP {status}): {body}")]
    ApiError { status: u16, body: String },

    /// The response carried no text content.
    #[error("backend returned no text content")]
    EmptyResponse,

    /// The response envelope could not be decoded.
    #[error("backend response parse error: {0}")]
    ParseError(String),
}

// ---------------------------------------------------------------------------
// Analysis errors
// ---------------------------------------------------------------------------

/// Errors from turning a conflicted file into a [`crate::conflict::ConflictAnalysis`].
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The backend call itself failed.
    #[error("analysis request failed: {0}")]
    Backend(#[from] BackendError),

    /// No JSON object could be found anywhere in the response text.
    #[error("unparseable response: no JSON object found")]
    NoJsonObject,

    /// A JSON object was located but is not valid JSON.
    #[error("unparseable response: {0}")]
    Unparseable(String),

    /// A required field is absent from the response object.
    #[error("response is missing field '{0}'")]
    MissingField(&'static str),

    /// A field is present but has the wrong shape.
    #[error("response field '{field}' is invalid: {detail}")]
    InvalidField { field: &'static str, detail: String },

    /// The proposed resolution is empty.
    #[error("response contains an empty resolvedCode")]
    EmptyResolution,
}

// ---------------------------------------------------------------------------
// Resolution errors
// ---------------------------------------------------------------------------

/// Errors from writing an accepted resolution back to disk.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The target file disappeared between discovery and apply.
    #[error("cannot apply resolution: '{0}' no longer exists")]
    Missing(PathBuf),

    /// Writing the file failed.
    #[error("failed to write resolution to '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Session errors
// ---------------------------------------------------------------------------

/// Errors that end a session early.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading operator input failed (stdin closed, terminal gone).
    #[error("failed to read operator input: {0}")]
    Prompt(#[from] std::io::Error),
}

/// Error from a best-effort clipboard copy.
#[derive(Debug, Error)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = ConfigError::EnvVarMissing {
            var: "ANTHROPIC_API_KEY".into(),
            field: "ai.api_key_env".into(),
        };
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));

        let err = DiscoveryError::CommandFailed {
            exit_code: 1,
            stderr: "There is no jj repo in \".\"".into(),
        };
        assert!(err.to_string().contains("exit 1"));

        let err = AnalysisError::NoJsonObject;
        assert!(err.to_string().starts_with("unparseable response"));

        let err = AnalysisError::MissingField("resolvedCode");
        assert_eq!(err.to_string(), "response is missing field 'resolvedCode'");

        let err = ResolutionError::Missing(PathBuf::from("src/A.cls"));
        assert!(err.to_string().contains("src/A.cls"));
    }

    #[test]
    fn test_backend_error_wraps_into_analysis() {
        let backend = BackendError::ApiError {
            status: 529,
            body: "overloaded".into(),
        };
        let analysis: AnalysisError = backend.into();
        assert!(matches!(analysis, AnalysisError::Backend(_)));
        assert!(analysis.to_string().contains("529"));
    }
}
