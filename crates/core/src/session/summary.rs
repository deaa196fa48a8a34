//! End-of-run bookkeeping and the summary table.

use std::path::PathBuf;

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

use super::mode::ConflictOutcome;

/// Per-file results of one session, grouped by outcome. Each list keeps
/// processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub applied: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
    /// Files left untouched because the operator quit first.
    pub unprocessed: Vec<PathBuf>,
}

impl SessionSummary {
    /// Record a terminal outcome. `Quit` marks the file as unprocessed.
    pub fn record(&mut self, path: PathBuf, outcome: ConflictOutcome) {
        match outcome {
            ConflictOutcome::Applied => self.applied.push(path),
            ConflictOutcome::Skipped => self.skipped.push(path),
            ConflictOutcome::Failed(reason) => self.failed.push((path, reason)),
            ConflictOutcome::Quit => self.unprocessed.push(path),
        }
    }

    pub fn total(&self) -> usize {
        self.applied.len() + self.skipped.len() + self.failed.len() + self.unprocessed.len()
    }

    /// Render the summary as a table, one row per file: applied first, then
    /// skipped, failed, and not processed.
    pub fn render(&self) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["File", "Outcome", "Detail"]);

        for path in &self.applied {
            table.add_row(vec![Cell::new(path.display()), Cell::new("applied"), Cell::new("")]);
        }
        for path in &self.skipped {
            table.add_row(vec![Cell::new(path.display()), Cell::new("skipped"), Cell::new("")]);
        }
        for (path, reason) in &self.failed {
            table.add_row(vec![Cell::new(path.display()), Cell::new("failed"), Cell::new(reason)]);
        }
        for path in &self.unprocessed {
            table.add_row(vec![
                Cell::new(path.display()),
                Cell::new("not processed"),
                Cell::new("session quit"),
            ]);
        }

        table.to_string()
    }
}
