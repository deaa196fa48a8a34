//! The session driver.
//!
//! Runs one pass over the working copy: gate auto mode, discover conflicts,
//! then analyse and hand each one to the [`ModeController`] in discovery
//! order. A failure on one file never stops the others; only the operator's
//! quit does.

use tracing::{info, instrument, warn};

use super::console::{Clipboard, Console};
use super::mode::{ConflictOutcome, Mode, ModeController};
use super::summary::SessionSummary;
use crate::conflict::{AnalysisRequester, ConflictLocator};
use crate::errors::SessionError;
use crate::style;

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Discovery found nothing to do.
    NoConflicts,
    /// Auto mode was not confirmed; nothing was touched.
    Aborted,
    /// Every conflict was processed.
    Completed(SessionSummary),
    /// The operator quit part-way through.
    Quit(SessionSummary),
}

impl SessionOutcome {
    pub fn summary(&self) -> Option<&SessionSummary> {
        match self {
            Self::Completed(summary) | Self::Quit(summary) => Some(summary),
            Self::NoConflicts | Self::Aborted => None,
        }
    }
}

/// Sequences discovery, analysis, and interaction for one run.
pub struct SessionDriver {
    locator: ConflictLocator,
    requester: AnalysisRequester,
    controller: ModeController,
    confirm_phrase: String,
}

impl SessionDriver {
    pub fn new(
        locator: ConflictLocator,
        requester: AnalysisRequester,
        controller: ModeController,
        confirm_phrase: impl Into<String>,
    ) -> Self {
        Self {
            locator,
            requester,
            controller,
            confirm_phrase: confirm_phrase.into(),
        }
    }

    #[instrument(skip_all, fields(mode = %self.controller.mode()))]
    pub async fn run(
        &self,
        console: &mut dyn Console,
        clipboard: &dyn Clipboard,
    ) -> Result<SessionOutcome, SessionError> {
        let mode = self.controller.mode();
        console.say(&style::header(&format!(
            "AI Conflict Advisor [{} mode]",
            mode.to_string().to_uppercase()
        )));
        console.say("");

        if mode == Mode::Auto && !self.confirm_auto(console)? {
            info!("auto mode not confirmed");
            console.say("Aborted.");
            return Ok(SessionOutcome::Aborted);
        }

        console.say("Detecting conflicts...");
        let conflicts = match self.locator.try_list_conflicts().await {
            Ok(files) => files,
            Err(e) => {
                warn!(error = %e, "conflict discovery failed");
                console.say(&style::warn(&format!("Could not query conflicts: {}", e)));
                Vec::new()
            }
        };

        if conflicts.is_empty() {
            console.say(&style::success("No conflicts found"));
            return Ok(SessionOutcome::NoConflicts);
        }

        let total = conflicts.len();
        console.say(&format!("Found {} conflicted file(s)", total));
        console.say("");

        let mut summary = SessionSummary::default();
        for (index, file) in conflicts.iter().enumerate() {
            console.say(&style::banner_rule());
            console.say(&style::header(&format!(
                "Conflict {}/{}: {}",
                index + 1,
                total,
                file.path.display()
            )));
            console.say(&style::banner_rule());
            console.say("");

            console.start_progress(&format!("Analyzing {}...", file.path.display()));
            let analysis = self.requester.analyze(file).await;
            console.finish_progress();

            let outcome = match analysis {
                Ok(analysis) => self.controller.handle(&analysis, console, clipboard).await?,
                Err(e) => {
                    console.say(&style::error(&format!(
                        "Failed to analyze {}: {}",
                        file.path.display(),
                        e
                    )));
                    ConflictOutcome::Failed(e.to_string())
                }
            };

            if outcome == ConflictOutcome::Quit {
                info!(processed = index, total, "operator quit");
                console.say("Quitting...");
                for rest in &conflicts[index..] {
                    summary.record(rest.path.clone(), ConflictOutcome::Quit);
                }
                self.report(&summary, console);
                return Ok(SessionOutcome::Quit(summary));
            }

            summary.record(file.path.clone(), outcome);
            console.say("");
        }

        self.report(&summary, console);
        console.say(&style::success("Conflict advisor completed!"));
        Ok(SessionOutcome::Completed(summary))
    }

    /// Ask for the exact confirmation phrase before auto mode touches anything.
    fn confirm_auto(&self, console: &mut dyn Console) -> Result<bool, SessionError> {
        console.say(&style::warn("WARNING: AUTO MODE"));
        console.say("This will automatically resolve ALL conflicts without confirmation.");
        console.say("Every conflicted file is overwritten in full with the AI proposal;");
        console.say("only your VCS history can undo it.");
        console.say("");

        let answer = console.ask(&format!(
            "Are you absolutely sure? Type '{}' to continue",
            self.confirm_phrase
        ))?;
        Ok(answer == self.confirm_phrase)
    }

    fn report(&self, summary: &SessionSummary, console: &mut dyn Console) {
        console.say(&style::header(&format!(
            "Summary: {} applied, {} skipped, {} failed, {} not processed",
            summary.applied.len(),
            summary.skipped.len(),
            summary.failed.len(),
            summary.unprocessed.len()
        )));
        console.say(&summary.render());
    }
}
