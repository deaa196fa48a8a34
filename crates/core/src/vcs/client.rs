//! Asynchronous status-command client.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use super::StatusSource;
use crate::config::VcsConfig;
use crate::errors::DiscoveryError;

/// Runs the configured status command (default `jj status`) in a working copy.
#[derive(Debug, Clone)]
pub struct StatusCommand {
    program: String,
    args: Vec<String>,
    workdir: PathBuf,
}

impl StatusCommand {
    /// Create a status command for `workdir`.
    pub fn new(program: impl Into<String>, args: Vec<String>, workdir: impl Into<PathBuf>) -> Self {
        let cmd = Self {
            program: program.into(),
            args,
            workdir: workdir.into(),
        };
        info!(program = %cmd.program, workdir = %cmd.workdir.display(), "created StatusCommand");
        cmd
    }

    /// Build from the `[vcs]` config section.
    pub fn from_config(config: &VcsConfig, workdir: &Path) -> Self {
        Self::new(config.program.clone(), config.status_args.clone(), workdir)
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl StatusSource for StatusCommand {
    #[instrument(skip(self), fields(program = %self.program))]
    async fn status(&self) -> Result<String, DiscoveryError> {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&self.workdir)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(cmd = ?format!("{} {}", self.program, self.args.join(" ")), "running status command");
        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DiscoveryError::BinaryNotFound(self.program.clone())
            } else {
                DiscoveryError::IoError(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let exit_code = output.status.code().unwrap_or(-1);
            warn!(exit_code, %stderr, "status command failed");
            return Err(DiscoveryError::CommandFailed { exit_code, stderr });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let config = VcsConfig::default();
        let cmd = StatusCommand::from_config(&config, Path::new("."));
        assert_eq!(cmd.program(), "jj");
    }

    #[tokio::test]
    async fn test_missing_binary_is_binary_not_found() {
        let cmd = StatusCommand::new(
            "conflict-advisor-no-such-vcs-binary",
            vec!["status".into()],
            std::env::temp_dir(),
        );
        let result = cmd.status().await;
        assert!(matches!(result, Err(DiscoveryError::BinaryNotFound(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_stdout() {
        let cmd = StatusCommand::new(
            "sh",
            vec!["-c".into(), "printf 'C a.cls\\nM b.cls\\n'".into()],
            std::env::temp_dir(),
        );
        let report = cmd.status().await.unwrap();
        assert_eq!(report, "C a.cls\nM b.cls\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_command_failed() {
        let cmd = StatusCommand::new(
            "sh",
            vec!["-c".into(), "echo 'no repo here' >&2; exit 1".into()],
            std::env::temp_dir(),
        );
        match cmd.status().await {
            Err(DiscoveryError::CommandFailed { exit_code, stderr }) => {
                assert_eq!(exit_code, 1);
                assert_eq!(stderr, "no repo here");
            }
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }
}
