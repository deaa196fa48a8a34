//! Operator-facing I/O seams: the console and the clipboard.

use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::errors::ClipboardError;

/// Line-oriented operator console.
pub trait Console: Send {
    /// Print one line (may contain embedded newlines).
    fn say(&mut self, line: &str);

    /// Show `prompt` and read one line of input, surrounding whitespace
    /// removed.
    fn ask(&mut self, prompt: &str) -> io::Result<String>;

    /// Indicate that a long wait has begun.
    fn start_progress(&mut self, _message: &str) {}

    /// End the indication started by [`start_progress`](Self::start_progress).
    fn finish_progress(&mut self) {}
}

/// Best-effort clipboard.
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard backed by whichever platform copy command is installed.
#[derive(Debug, Clone, Default)]
pub struct SystemClipboard;

const COPY_COMMANDS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip.exe", &[]),
];

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        let mut last_failure = None;

        for (program, args) in COPY_COMMANDS {
            match pipe_to(program, args, text).await {
                Ok(true) => {
                    debug!(program, "copied to clipboard");
                    return Ok(());
                }
                Ok(false) => last_failure = Some(format!("{} exited with an error", program)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => last_failure = Some(format!("{}: {}", program, e)),
            }
        }

        Err(ClipboardError(
            last_failure.unwrap_or_else(|| "no clipboard command found".into()),
        ))
    }
}

async fn pipe_to(program: &str, args: &[&str], text: &str) -> io::Result<bool> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).await?;
    }
    Ok(child.wait().await?.success())
}
