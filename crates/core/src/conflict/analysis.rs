//! AI-backed conflict analysis.
//!
//! The [`AnalysisRequester`] sends one prompt per conflicted file and turns
//! the free-form reply into a validated [`ConflictAnalysis`]. The reply may
//! wrap its JSON in prose or code fences; the first JSON object found in the
//! text is used.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use super::locator::ConflictedFile;
use crate::ai::{CompletionBackend, CompletionRequest};
use crate::config::AiConfig;
use crate::errors::AnalysisError;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Three-level rating used for complexity and risk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Low,
    Medium,
    High,
    /// A rating outside the scale, kept verbatim.
    Unrecognized(String),
}

impl Level {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => Self::Unrecognized(raw.to_string()),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::Unrecognized(raw) => write!(f, "{}", raw),
        }
    }
}

/// The backend's classification of one conflict and its proposed fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictAnalysis {
    /// Path of the analysed file, relative to the working copy root.
    pub path: PathBuf,
    /// Short free-text classification, e.g. "Method additions".
    pub conflict_type: String,
    pub complexity: Level,
    pub risk: Level,
    pub reasoning: String,
    /// Full replacement content with conflict markers removed. Never empty.
    pub proposed_resolution: String,
}

impl ConflictAnalysis {
    /// Number of lines in the proposed resolution.
    pub fn line_count(&self) -> usize {
        self.proposed_resolution.lines().count()
    }

    /// The first `lines` lines of the proposed resolution.
    pub fn preview(&self, lines: usize) -> String {
        self.proposed_resolution
            .lines()
            .take(lines)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ---------------------------------------------------------------------------
// Requester
// ---------------------------------------------------------------------------

/// Asks the backend to classify and resolve conflicted files.
pub struct AnalysisRequester {
    backend: Box<dyn CompletionBackend>,
    model: String,
    max_tokens: u32,
}

impl AnalysisRequester {
    pub fn new(backend: Box<dyn CompletionBackend>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            backend,
            model: model.into(),
            max_tokens,
        }
    }

    pub fn from_config(backend: Box<dyn CompletionBackend>, config: &AiConfig) -> Self {
        Self::new(backend, config.model.clone(), config.max_tokens)
    }

    /// Analyse one conflicted file with a single backend request.
    #[instrument(skip(self, file), fields(path = %file.path.display()))]
    pub async fn analyze(&self, file: &ConflictedFile) -> Result<ConflictAnalysis, AnalysisError> {
        let language = language_for(&file.path);
        let request = CompletionRequest {
            model: self.model.clone(),
            prompt: build_prompt(file, language),
            max_tokens: self.max_tokens,
        };

        info!(language, model = %self.model, "requesting conflict analysis");
        let reply = self.backend.complete(&request).await?;
        debug!(len = reply.len(), "analysis reply received");

        parse_analysis(&file.path, &reply).map_err(|e| {
            warn!(error = %e, "analysis reply rejected");
            e
        })
    }
}

/// Prompt label for a file's extension; unknown extensions are `text`.
pub fn language_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    match ext {
        "cls" | "trigger" => "apex",
        "js" => "javascript",
        "ts" => "typescript",
        "html" => "html",
        "css" => "css",
        "xml" => "xml",
        "json" => "json",
        "sh" => "bash",
        "md" => "markdown",
        _ => "text",
    }
}

/// Build the analysis prompt for one file.
pub fn build_prompt(file: &ConflictedFile, language: &str) -> String {
    format!(
        r#"You are an expert code conflict analyzer.

Analyze this {language} file conflict and provide:
1. Conflict type (e.g., "Method additions", "Logic changes", etc.)
2. Complexity assessment (Low/Medium/High)
3. Risk level (Low/Medium/High)
4. Detailed reasoning
5. Resolved code suggestion

File: {path}

Conflicted Content:
```{language}
{content}
```

Respond in JSON format:
{{
  "type": "conflict type",
  "complexity": "Low|Medium|High",
  "risk": "Low|Medium|High",
  "reasoning": "why this conflict occurred and how to resolve",
  "resolvedCode": "complete resolved code without conflict markers"
}}"#,
        language = language,
        path = file.path.display(),
        content = file.content,
    )
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Validate a backend reply into a [`ConflictAnalysis`] for `path`.
pub fn parse_analysis(path: &Path, reply: &str) -> Result<ConflictAnalysis, AnalysisError> {
    let object = extract_json_object(reply)?;

    let conflict_type = required_str(&object, "type")?;
    let complexity = Level::parse(&required_str(&object, "complexity")?);
    let risk = Level::parse(&required_str(&object, "risk")?);
    let reasoning = required_str(&object, "reasoning")?;
    let proposed_resolution = required_str(&object, "resolvedCode")?;

    if proposed_resolution.trim().is_empty() {
        return Err(AnalysisError::EmptyResolution);
    }

    Ok(ConflictAnalysis {
        path: path.to_path_buf(),
        conflict_type,
        complexity,
        risk,
        reasoning,
        proposed_resolution,
    })
}

/// Find the first top-level `{...}` group of `text` that parses as a JSON
/// object. A group that fails to parse is skipped whole, so objects nested
/// inside it are never considered.
pub fn extract_json_object(text: &str) -> Result<Map<String, Value>, AnalysisError> {
    let mut first_error: Option<String> = None;
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find('{') {
        let start = cursor + offset;
        let Some(len) = balanced_len(&text[start..]) else {
            cursor = start + 1;
            continue;
        };
        match serde_json::from_str::<Value>(&text[start..start + len]) {
            Ok(Value::Object(map)) => return Ok(map),
            Ok(_) => {}
            Err(e) => {
                first_error.get_or_insert_with(|| e.to_string());
            }
        }
        cursor = start + len;
    }

    match first_error {
        Some(detail) => Err(AnalysisError::Unparseable(detail)),
        None => Err(AnalysisError::NoJsonObject),
    }
}

/// Byte length of the `{...}` group that `s` starts with, honouring JSON
/// string literals. `None` if it never closes.
fn balanced_len(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn required_str(object: &Map<String, Value>, field: &'static str) -> Result<String, AnalysisError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(AnalysisError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(AnalysisError::InvalidField {
            field,
            detail: format!("expected a string, got {}", json_kind(other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
