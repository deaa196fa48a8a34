//! Terminal implementation of the session console.

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use console::Term;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};

use conflict_advisor_core::session::Console;

/// Console on stdout/stdin; line editing via `dialoguer` when attached to a
/// terminal, plain line reads otherwise.
pub struct TerminalConsole {
    spinner: Option<ProgressBar>,
    tty: bool,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self {
            spinner: None,
            tty: io::stdin().is_terminal() && Term::stderr().is_term(),
        }
    }

    fn read_plain_line(&self, prompt: &str) -> io::Result<String> {
        print!("{}: ", prompt);
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
        }
        Ok(line.trim().to_string())
    }
}

impl Console for TerminalConsole {
    fn say(&mut self, line: &str) {
        println!("{}", line);
    }

    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        println!();
        if !self.tty {
            return self.read_plain_line(prompt);
        }
        let answer: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(answer.trim().to_string())
    }

    fn start_progress(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
            spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn finish_progress(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}
