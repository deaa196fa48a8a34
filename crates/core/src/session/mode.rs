//! Per-conflict interaction policies.
//!
//! Each conflict enters `Presented`; the active [`Mode`] decides what is
//! shown and which transitions are possible:
//!
//! - **advisor**: read-only. Show, copy, or move on; never writes.
//! - **interactive**: apply, skip, or view the full proposal first. Viewing
//!   (`ShowingFullDiff`) always returns to `Presented`.
//! - **auto**: apply without asking.
//!
//! Quit from any prompt ends the whole session.

use std::fmt;

use tracing::{info, warn};

use super::console::{Clipboard, Console};
use crate::conflict::{ConflictAnalysis, ResolutionStore};
use crate::errors::SessionError;
use crate::style;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Interaction policy for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Advisor,
    Interactive,
    Auto,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Advisor => write!(f, "advisor"),
            Self::Interactive => write!(f, "interactive"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

/// Terminal state of one conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictOutcome {
    /// The proposed resolution was written to disk.
    Applied,
    /// The file was left as discovered.
    Skipped,
    /// Analysis or the write failed; the file was left as discovered.
    Failed(String),
    /// The operator ended the session.
    Quit,
}

enum AdvisorChoice {
    ShowFull,
    Copy,
    Next,
    Quit,
}

impl AdvisorChoice {
    /// Anything unrecognised moves on to the next conflict.
    fn parse(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "1" => Self::ShowFull,
            "2" => Self::Copy,
            "q" | "quit" => Self::Quit,
            _ => Self::Next,
        }
    }
}

enum InteractiveChoice {
    Apply,
    ShowFull,
    Skip,
    Quit,
}

impl InteractiveChoice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Some(Self::Apply),
            "d" | "diff" => Some(Self::ShowFull),
            "n" | "no" => Some(Self::Skip),
            "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

enum InteractiveState {
    Presented,
    ShowingFullDiff,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Drives one conflict from `Presented` to a [`ConflictOutcome`].
pub struct ModeController {
    mode: Mode,
    store: ResolutionStore,
    show_reasoning: bool,
    preview_lines: usize,
}

impl ModeController {
    pub fn new(mode: Mode, store: ResolutionStore, show_reasoning: bool, preview_lines: usize) -> Self {
        Self {
            mode,
            store,
            show_reasoning,
            preview_lines,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Present `analysis` and carry out the operator's (or the policy's) choice.
    pub async fn handle(
        &self,
        analysis: &ConflictAnalysis,
        console: &mut dyn Console,
        clipboard: &dyn Clipboard,
    ) -> Result<ConflictOutcome, SessionError> {
        match self.mode {
            Mode::Advisor => self.advise(analysis, console, clipboard).await,
            Mode::Interactive => self.interact(analysis, console),
            Mode::Auto => Ok(self.auto_apply(analysis, console)),
        }
    }

    async fn advise(
        &self,
        analysis: &ConflictAnalysis,
        console: &mut dyn Console,
        clipboard: &dyn Clipboard,
    ) -> Result<ConflictOutcome, SessionError> {
        console.say("Conflict Analysis:");
        console.say(&format!("  Type:       {}", analysis.conflict_type));
        console.say(&format!("  Complexity: {}", style::level(&analysis.complexity)));
        console.say(&format!("  Risk:       {}", style::level(&analysis.risk)));
        console.say("");
        self.say_reasoning(analysis, console);
        console.say("AI Suggestion:");
        console.say(&style::dim("  (Use option 1 below to view full code)"));
        console.say("");
        console.say("Actions:");
        console.say("  1. Show full suggested code");
        console.say("  2. Copy suggestion to clipboard");
        console.say("  3. Next conflict");
        console.say("  q. Quit");

        let choice = console.ask("Choose [1/2/3/q]")?;
        match AdvisorChoice::parse(&choice) {
            AdvisorChoice::ShowFull => {
                say_full(analysis, console);
                console.ask("Press Enter to continue")?;
            }
            AdvisorChoice::Copy => match clipboard.copy(&analysis.proposed_resolution).await {
                Ok(()) => console.say(&style::success("Copied to clipboard")),
                Err(e) => {
                    warn!(error = %e, "clipboard copy failed");
                    console.say(&style::warn(&format!("{}. Suggestion:", e)));
                    console.say(&analysis.proposed_resolution);
                }
            },
            AdvisorChoice::Next => {}
            AdvisorChoice::Quit => return Ok(ConflictOutcome::Quit),
        }
        Ok(ConflictOutcome::Skipped)
    }

    fn interact(
        &self,
        analysis: &ConflictAnalysis,
        console: &mut dyn Console,
    ) -> Result<ConflictOutcome, SessionError> {
        let mut state = InteractiveState::Presented;
        loop {
            match state {
                InteractiveState::ShowingFullDiff => {
                    say_full(analysis, console);
                    state = InteractiveState::Presented;
                }
                InteractiveState::Presented => {
                    self.present_interactive(analysis, console);
                    match self.read_interactive_choice(console)? {
                        InteractiveChoice::Apply => return Ok(self.apply(analysis, console)),
                        InteractiveChoice::ShowFull => state = InteractiveState::ShowingFullDiff,
                        InteractiveChoice::Skip => {
                            info!(path = %analysis.path.display(), "operator skipped conflict");
                            console.say("Skipped");
                            return Ok(ConflictOutcome::Skipped);
                        }
                        InteractiveChoice::Quit => return Ok(ConflictOutcome::Quit),
                    }
                }
            }
        }
    }

    fn present_interactive(&self, analysis: &ConflictAnalysis, console: &mut dyn Console) {
        console.say("Analysis:");
        console.say(&format!(
            "  Type: {} | Complexity: {} | Risk: {}",
            analysis.conflict_type,
            style::level(&analysis.complexity),
            style::level(&analysis.risk)
        ));
        console.say("");
        self.say_reasoning(analysis, console);
        console.say("Suggested Resolution:");
        console.say(&analysis.preview(self.preview_lines));
        console.say(&style::dim(&format!(
            "  ... ({} lines total)",
            analysis.line_count()
        )));
        console.say("");
        console.say("Apply this suggestion?");
        console.say("  [y] Yes, apply and continue");
        console.say("  [d] Show full diff");
        console.say("  [n] No, skip this conflict");
        console.say("  [q] Quit");
    }

    fn read_interactive_choice(&self, console: &mut dyn Console) -> Result<InteractiveChoice, SessionError> {
        loop {
            let input = console.ask("Choose [y/d/n/q]")?;
            if let Some(choice) = InteractiveChoice::parse(&input) {
                return Ok(choice);
            }
            console.say(&style::warn(&format!("Unrecognised choice '{}'", input)));
        }
    }

    fn auto_apply(&self, analysis: &ConflictAnalysis, console: &mut dyn Console) -> ConflictOutcome {
        console.say(&format!("Auto-resolving: {}", analysis.path.display()));
        console.say(&format!(
            "   Type: {} | Risk: {}",
            analysis.conflict_type,
            style::level(&analysis.risk)
        ));
        self.apply(analysis, console)
    }

    /// Write the resolution; a failed write is reported, not propagated.
    fn apply(&self, analysis: &ConflictAnalysis, console: &mut dyn Console) -> ConflictOutcome {
        match self.store.apply(analysis) {
            Ok(()) => {
                console.say(&style::success(&format!(
                    "Applied resolution to {}",
                    analysis.path.display()
                )));
                ConflictOutcome::Applied
            }
            Err(e) => {
                warn!(error = %e, "failed to apply resolution");
                console.say(&style::error(&e.to_string()));
                ConflictOutcome::Failed(e.to_string())
            }
        }
    }

    fn say_reasoning(&self, analysis: &ConflictAnalysis, console: &mut dyn Console) {
        if !self.show_reasoning {
            return;
        }
        console.say("Reasoning:");
        console.say(&format!("  {}", analysis.reasoning));
        console.say("");
    }
}

fn say_full(analysis: &ConflictAnalysis, console: &mut dyn Console) {
    console.say("");
    console.say(&style::rule());
    console.say(&analysis.proposed_resolution);
    console.say(&style::rule());
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::conflict::Level;
    use crate::errors::ClipboardError;

    const CONFLICTED: &str = "<<<<<<< ours\na\n=======\nb\n>>>>>>> theirs\n";

    #[derive(Default)]
    struct Scripted {
        answers: VecDeque<String>,
        output: Vec<String>,
        prompts: Vec<String>,
    }

    impl Scripted {
        fn with(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            }
        }

        fn printed(&self) -> String {
            self.output.join("\n")
        }
    }

    impl Console for Scripted {
        fn say(&mut self, line: &str) {
            self.output.push(line.to_string());
        }

        fn ask(&mut self, prompt: &str) -> io::Result<String> {
            self.prompts.push(prompt.to_string());
            self.answers
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
        }
    }

    #[derive(Default)]
    struct FakeClipboard {
        fail: bool,
        copied: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Clipboard for FakeClipboard {
        async fn copy(&self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError("no clipboard command found".into()));
            }
            self.copied.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn fixture(dir: &Path) -> ConflictAnalysis {
        std::fs::write(dir.join("A.cls"), CONFLICTED).unwrap();
        ConflictAnalysis {
            path: PathBuf::from("A.cls"),
            conflict_type: "Logic changes".into(),
            complexity: Level::Medium,
            risk: Level::High,
            reasoning: "Both sides changed the guard clause.".into(),
            proposed_resolution: (1..=15).map(|i| format!("line {}\n", i)).collect(),
        }
    }

    fn controller(mode: Mode, dir: &Path) -> ModeController {
        ModeController::new(mode, ResolutionStore::new(dir), true, 10)
    }

    fn on_disk(dir: &Path) -> String {
        std::fs::read_to_string(dir.join("A.cls")).unwrap()
    }

    #[tokio::test]
    async fn test_advisor_choices_never_write() {
        for answers in [vec!["1", ""], vec!["2"], vec!["3"], vec!["whatever"]] {
            let dir = tempfile::tempdir().unwrap();
            let analysis = fixture(dir.path());
            let mut console = Scripted::with(&answers);

            let outcome = controller(Mode::Advisor, dir.path())
                .handle(&analysis, &mut console, &FakeClipboard::default())
                .await
                .unwrap();

            assert_eq!(outcome, ConflictOutcome::Skipped);
            assert_eq!(on_disk(dir.path()), CONFLICTED);
        }
    }

    #[tokio::test]
    async fn test_advisor_show_full_prints_everything() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = fixture(dir.path());
        let mut console = Scripted::with(&["1", ""]);

        controller(Mode::Advisor, dir.path())
            .handle(&analysis, &mut console, &FakeClipboard::default())
            .await
            .unwrap();

        assert!(console.printed().contains("line 15"));
        assert_eq!(console.prompts, vec!["Choose [1/2/3/q]", "Press Enter to continue"]);
    }

    #[tokio::test]
    async fn test_advisor_copy_and_copy_failure() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = fixture(dir.path());

        let clipboard = FakeClipboard::default();
        let mut console = Scripted::with(&["2"]);
        controller(Mode::Advisor, dir.path())
            .handle(&analysis, &mut console, &clipboard)
            .await
            .unwrap();
        assert_eq!(
            clipboard.copied.lock().unwrap().as_slice(),
            &[analysis.proposed_resolution.clone()]
        );
        assert!(console.printed().contains("Copied to clipboard"));

        let broken = FakeClipboard {
            fail: true,
            ..Default::default()
        };
        let mut console = Scripted::with(&["2"]);
        let outcome = controller(Mode::Advisor, dir.path())
            .handle(&analysis, &mut console, &broken)
            .await
            .unwrap();
        assert_eq!(outcome, ConflictOutcome::Skipped);
        assert!(console.printed().contains("clipboard unavailable"));
        assert!(console.printed().contains("line 15"));
    }

    #[tokio::test]
    async fn test_advisor_quit() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = fixture(dir.path());
        let mut console = Scripted::with(&["q"]);

        let outcome = controller(Mode::Advisor, dir.path())
            .handle(&analysis, &mut console, &FakeClipboard::default())
            .await
            .unwrap();
        assert_eq!(outcome, ConflictOutcome::Quit);
        assert_eq!(on_disk(dir.path()), CONFLICTED);
    }

    #[tokio::test]
    async fn test_interactive_apply_writes_proposal() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = fixture(dir.path());
        let mut console = Scripted::with(&["y"]);

        let outcome = controller(Mode::Interactive, dir.path())
            .handle(&analysis, &mut console, &FakeClipboard::default())
            .await
            .unwrap();

        assert_eq!(outcome, ConflictOutcome::Applied);
        assert_eq!(on_disk(dir.path()), analysis.proposed_resolution);
    }

    #[tokio::test]
    async fn test_interactive_skip_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = fixture(dir.path());
        let mut console = Scripted::with(&["n"]);

        let outcome = controller(Mode::Interactive, dir.path())
            .handle(&analysis, &mut console, &FakeClipboard::default())
            .await
            .unwrap();

        assert_eq!(outcome, ConflictOutcome::Skipped);
        assert_eq!(on_disk(dir.path()), CONFLICTED);
    }

    #[tokio::test]
    async fn test_interactive_preview_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = fixture(dir.path());
        let mut console = Scripted::with(&["n"]);

        controller(Mode::Interactive, dir.path())
            .handle(&analysis, &mut console, &FakeClipboard::default())
            .await
            .unwrap();

        let printed = console.printed();
        assert!(printed.contains("line 10"));
        assert!(!printed.contains("line 11"));
        assert!(printed.contains("(15 lines total)"));
    }

    #[tokio::test]
    async fn test_interactive_show_full_returns_to_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = fixture(dir.path());
        let mut console = Scripted::with(&["d", "d", "y"]);

        let outcome = controller(Mode::Interactive, dir.path())
            .handle(&analysis, &mut console, &FakeClipboard::default())
            .await
            .unwrap();

        assert_eq!(outcome, ConflictOutcome::Applied);
        assert_eq!(console.prompts.len(), 3);
        let presented = console
            .output
            .iter()
            .filter(|l| l.as_str() == "Apply this suggestion?")
            .count();
        assert_eq!(presented, 3);
        assert!(console.printed().contains("line 15"));
    }

    #[tokio::test]
    async fn test_interactive_unrecognised_input_reasks() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = fixture(dir.path());
        let mut console = Scripted::with(&["maybe", "", "n"]);

        let outcome = controller(Mode::Interactive, dir.path())
            .handle(&analysis, &mut console, &FakeClipboard::default())
            .await
            .unwrap();

        assert_eq!(outcome, ConflictOutcome::Skipped);
        assert_eq!(console.prompts.len(), 3);
        assert!(console.printed().contains("Unrecognised choice 'maybe'"));
    }

    #[tokio::test]
    async fn test_interactive_quit() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = fixture(dir.path());
        let mut console = Scripted::with(&["Q"]);

        let outcome = controller(Mode::Interactive, dir.path())
            .handle(&analysis, &mut console, &FakeClipboard::default())
            .await
            .unwrap();
        assert_eq!(outcome, ConflictOutcome::Quit);
        assert_eq!(on_disk(dir.path()), CONFLICTED);
    }

    #[tokio::test]
    async fn test_interactive_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = fixture(dir.path());
        std::fs::remove_file(dir.path().join("A.cls")).unwrap();
        let mut console = Scripted::with(&["y"]);

        let outcome = controller(Mode::Interactive, dir.path())
            .handle(&analysis, &mut console, &FakeClipboard::default())
            .await
            .unwrap();

        assert!(matches!(outcome, ConflictOutcome::Failed(_)));
        assert!(!dir.path().join("A.cls").exists());
    }

    #[tokio::test]
    async fn test_auto_applies_without_prompting() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = fixture(dir.path());
        let mut console = Scripted::default();

        let outcome = controller(Mode::Auto, dir.path())
            .handle(&analysis, &mut console, &FakeClipboard::default())
            .await
            .unwrap();

        assert_eq!(outcome, ConflictOutcome::Applied);
        assert!(console.prompts.is_empty());
        assert_eq!(on_disk(dir.path()), analysis.proposed_resolution);
    }

    #[tokio::test]
    async fn test_no_reasoning_hides_reasoning() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = fixture(dir.path());
        let mut console = Scripted::with(&["n"]);

        ModeController::new(Mode::Interactive, ResolutionStore::new(dir.path()), false, 10)
            .handle(&analysis, &mut console, &FakeClipboard::default())
            .await
            .unwrap();

        assert!(!console.printed().contains("guard clause"));
    }

    #[tokio::test]
    async fn test_closed_input_is_session_error() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = fixture(dir.path());
        let mut console = Scripted::default();

        let result = controller(Mode::Interactive, dir.path())
            .handle(&analysis, &mut console, &FakeClipboard::default())
            .await;
        assert!(matches!(result, Err(SessionError::Prompt(_))));
    }
}
