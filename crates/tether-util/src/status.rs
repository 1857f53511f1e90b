use std::io::Write;

use console::Style;

/// Severity of a status line, selecting the label colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Something was done (bold green).
    Action,
    /// Informational only (bold cyan).
    Info,
    /// Something looks wrong but did not fail (bold yellow).
    Warn,
}

impl Status {
    fn style(self) -> Style {
        match self {
            Status::Action => Style::new().green().bold(),
            Status::Info => Style::new().cyan().bold(),
            Status::Warn => Style::new().yellow().bold(),
        }
    }
}

/// Format a Cargo-style status line: `   Resolving com.acme.app`.
///
/// The label is right-aligned to 12 columns so consecutive lines line up.
pub fn format_line(kind: Status, label: &str, message: &str) -> String {
    format!("{:>12} {message}", kind.style().apply_to(label))
}

/// Print a status line to stderr.
pub fn emit(kind: Status, label: &str, message: &str) {
    let _ = writeln!(std::io::stderr(), "{}", format_line(kind, label, message));
}
