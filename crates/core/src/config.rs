//! Configuration for conflict-advisor.
//!
//! Every section and field has a default, so running without a config file
//! is the common case. A TOML file only needs the keys it overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::ConfigError;

/// File name looked up in the working directory when no `--config` is given.
pub const LOCAL_CONFIG_FILE: &str = ".conflict-advisor.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level conflict-advisor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Text-generation backend settings.
    #[serde(default)]
    pub ai: AiConfig,

    /// Version-control status query settings.
    #[serde(default)]
    pub vcs: VcsConfig,

    /// Interaction settings.
    #[serde(default)]
    pub session: SessionConfig,
}

// ---------------------------------------------------------------------------
// AI backend
// ---------------------------------------------------------------------------

/// Anthropic Messages API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// API base URL (default `https://api.anthropic.com`).
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum output tokens per request.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Resolved key (populated by `resolve_env_vars`).
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            api_key: None,
        }
    }
}

fn default_api_url() -> String {
    "https://api.anthropic.com".into()
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".into()
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".into()
}

fn default_timeout_secs() -> u64 {
    300
}

// ---------------------------------------------------------------------------
// VCS
// ---------------------------------------------------------------------------

/// How conflicted paths are discovered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcsConfig {
    /// Status command binary.
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments passed to the status command.
    #[serde(default = "default_status_args")]
    pub status_args: Vec<String>,

    /// Token that starts a conflicted-path line in the status report.
    #[serde(default = "default_conflict_marker")]
    pub conflict_marker: String,
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            status_args: default_status_args(),
            conflict_marker: default_conflict_marker(),
        }
    }
}

fn default_program() -> String {
    "jj".into()
}

fn default_status_args() -> Vec<String> {
    vec!["status".into()]
}

fn default_conflict_marker() -> String {
    "C".into()
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Interaction settings shared by all modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Lines of the proposed resolution shown in interactive mode.
    #[serde(default = "default_preview_lines")]
    pub preview_lines: usize,

    /// Exact phrase the operator must type to start auto mode.
    #[serde(default = "default_confirm_phrase")]
    pub confirm_phrase: String,

    /// Whether the model's reasoning is printed.
    #[serde(default = "default_true")]
    pub show_reasoning: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            preview_lines: default_preview_lines(),
            confirm_phrase: default_confirm_phrase(),
            show_reasoning: true,
        }
    }
}

fn default_preview_lines() -> usize {
    10
}

fn default_confirm_phrase() -> String {
    "YES".into()
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Loading & resolving
// ---------------------------------------------------------------------------

impl AdvisorConfig {
    /// Load an [`AdvisorConfig`] from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: AdvisorConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Load the config the CLI should use.
    ///
    /// An explicit path must exist. Otherwise the first of
    /// `<workdir>/.conflict-advisor.toml` and the user config file that
    /// exists is used, falling back to built-in defaults.
    pub fn discover(explicit: Option<&Path>, workdir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        let candidates = [Some(workdir.join(LOCAL_CONFIG_FILE)), user_config_path()];
        for candidate in candidates.into_iter().flatten() {
            if candidate.exists() {
                return Self::load_from_file(&candidate);
            }
        }

        debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Resolve all `*_env` fields from environment variables.
    pub fn resolve_env_vars(&mut self) -> Result<(), ConfigError> {
        self.ai.api_key = resolve_optional_env(&self.ai.api_key_env, "ai.api_key_env");
        Ok(())
    }

    /// The resolved API key, or the error that makes its absence fatal.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.ai
            .api_key
            .as_deref()
            .ok_or_else(|| ConfigError::EnvVarMissing {
                var: self.ai.api_key_env.clone(),
                field: "ai.api_key_env".into(),
            })
    }

    /// Validate that all fields are sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.ai.api_url, "ai.api_url")?;
        require_non_empty(&self.ai.model, "ai.model")?;
        require_non_empty(&self.ai.api_key_env, "ai.api_key_env")?;
        if self.ai.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ai.max_tokens".into(),
                detail: "max_tokens must be > 0".into(),
            });
        }
        if self.ai.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ai.timeout_secs".into(),
                detail: "timeout must be > 0".into(),
            });
        }
        require_non_empty(&self.vcs.program, "vcs.program")?;
        require_non_empty(self.vcs.conflict_marker.trim(), "vcs.conflict_marker")?;
        if self.session.preview_lines == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.preview_lines".into(),
                detail: "preview must show at least one line".into(),
            });
        }
        require_non_empty(&self.session.confirm_phrase, "session.confirm_phrase")?;
        Ok(())
    }

    /// Generate a default TOML config template string.
    pub fn default_template() -> &'static str {
        r#"# conflict-advisor configuration
# Every key is optional; the values below are the defaults.

[ai]
api_url = "https://api.anthropic.com"
model = "claude-3-5-sonnet-20241022"
max_tokens = 8192
api_key_env = "ANTHROPIC_API_KEY"
timeout_secs = 300

[vcs]
program = "jj"
status_args = ["status"]
conflict_marker = "C"

[session]
preview_lines = 10
confirm_phrase = "YES"
show_reasoning = true
"#
    }
}

/// `~/.config/conflict-advisor/config.toml`, when a config dir is known.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("conflict-advisor").join("config.toml"))
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.into(),
            detail: "must not be empty".into(),
        });
    }
    Ok(())
}

/// Try to read an environment variable by name.
fn resolve_optional_env(env_name: &str, field: &str) -> Option<String> {
    match std::env::var(env_name) {
        Ok(val) if !val.is_empty() => {
            debug!(field, env_name, "resolved env var");
            Some(val)
        }
        Ok(_) => {
            warn!(field, env_name, "env var is set but empty");
            None
        }
        Err(_) => {
            warn!(field, env_name, "env var not set");
            None
        }
    }
}
