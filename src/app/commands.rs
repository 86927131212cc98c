//! Inbound commands typed at the REPL.
//!
//! A line is either a built-in command that bypasses the model (`status`,
//! `help`, the exit words) or a prompt for the
//! [`Assistant`](super::service::Assistant).

const EXIT_WORDS: &[&str] = &["quit", "exit", "bye", "goodbye"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Leave the loop (cleanup still runs).
    Quit,
    /// Blank line.
    Skip,
    /// Print the GPIO snapshot without asking the model.
    Status,
    /// Print the command overview.
    Help,
    /// Forward to the language model.
    Prompt(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Skip;
        }
        let lower = trimmed.to_lowercase();
        if EXIT_WORDS.contains(&lower.as_str()) {
            Self::Quit
        } else if lower == "status" {
            Self::Status
        } else if lower == "help" {
            Self::Help
        } else {
            Self::Prompt(trimmed.to_string())
        }
    }
}
