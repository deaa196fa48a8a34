//! Shared styling utilities for operator-facing output.

use console::Style;

/// Create a success-styled string (green with checkmark).
pub fn success(msg: &str) -> String {
    let style = Style::new().green();
    format!("{} {}", style.apply_to("✓"), msg)
}

/// Create an error-styled string (red with cross).
pub fn error(msg: &str) -> String {
    let style = Style::new().red();
    format!("{} {}", style.apply_to("✗"), msg)
}

/// Create a warning-styled string (yellow).
pub fn warn(msg: &str) -> String {
    let style = Style::new().yellow();
    format!("{} {}", style.apply_to("⚠"), msg)
}

/// Create a header-styled string (bold, white).
pub fn header(msg: &str) -> String {
    let style = Style::new().bold();
    style.apply_to(msg).to_string()
}

/// Create a dim-styled string.
pub fn dim(msg: &str) -> String {
    let style = Style::new().dim();
    style.apply_to(msg).to_string()
}

/// Label for a risk or complexity rating (green/yellow/red by level).
pub fn level(level: &crate::conflict::Level) -> String {
    use crate::conflict::Level;

    let style = match level {
        Level::Low => Style::new().green(),
        Level::Medium => Style::new().yellow(),
        Level::High => Style::new().red().bold(),
        Level::Unrecognized(_) => Style::new().magenta(),
    };
    style.apply_to(level.to_string()).to_string()
}

/// Horizontal separator used around full code listings.
pub fn rule() -> String {
    "─".repeat(60)
}

/// Heavy separator framing each conflict.
pub fn banner_rule() -> String {
    "=".repeat(60)
}
