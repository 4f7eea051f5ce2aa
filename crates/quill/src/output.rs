//! Terminal output.
//!
//! Command results go to stdout; diagnostics go to stderr in color.

use console::{Style, Term};

pub(crate) struct Output {
    stdout: Term,
    stderr: Term,
    yellow: Style,
    red: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            stdout: Term::stdout(),
            stderr: Term::stderr(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    /// Write a command result to stdout.
    pub(crate) fn emit(&self, text: &str) -> std::io::Result<()> {
        self.stdout.write_line(text)
    }

    /// Print a diagnostic (dim).
    pub(crate) fn info(&self, msg: &str) {
        let _ = self
            .stderr
            .write_line(&Style::new().dim().apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self
            .stderr
            .write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.stderr.write_line(&self.red.apply_to(msg).to_string());
    }
}
