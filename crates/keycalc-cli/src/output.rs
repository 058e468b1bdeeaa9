//! Output formatting for calculator state

use crate::error::CliResult;
use console::style;
use keycalc::core::history::History;
use keycalc::core::CalculatorEngine;
use keycalc::keypad;
use serde::{Deserialize, Serialize};

/// Output format for `run`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON engine snapshot
    Json,
}

/// Renders engine state as terminal text
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode: display line only
    pub quiet: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Renderer {
    /// Create a new renderer
    #[must_use]
    pub const fn new(use_color: bool, quiet: bool) -> Self {
        Self { use_color, quiet }
    }

    /// Main display and, when an operation is pending, the expression line
    #[must_use]
    pub fn display(&self, engine: &CalculatorEngine) -> String {
        let current = engine.current();
        let mut out = if self.use_color {
            style(current).bold().to_string()
        } else {
            current.to_string()
        };

        let expression = engine.current_expression();
        if !self.quiet && !expression.is_empty() {
            let line = if self.use_color {
                style(&expression).dim().to_string()
            } else {
                format!("({expression})")
            };
            out.push('\n');
            out.push_str(&line);
        }
        out
    }

    /// History list, newest first, indexed for `replay <n>`
    #[must_use]
    pub fn history(&self, history: &History) -> String {
        if history.is_empty() {
            return self.muted("No calculations yet");
        }
        history
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let index = if self.use_color {
                    style(index).cyan().to_string()
                } else {
                    index.to_string()
                };
                format!("{index:>3}: {}", entry.display())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Printing-calculator tape, oldest first
    #[must_use]
    pub fn tape(&self, history: &History) -> String {
        if history.is_empty() {
            return self.muted("Tape is empty");
        }
        let rule = "-".repeat(24);
        format!("{rule}\n{}\n{rule}", history.export_tape())
    }

    /// Error line
    #[must_use]
    pub fn error(&self, message: &str) -> String {
        if self.use_color {
            format!("{} {}", style("✗").red().bold(), style(message).red())
        } else {
            format!("Error: {message}")
        }
    }

    /// Section header
    #[must_use]
    pub fn header(&self, title: &str) -> String {
        if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        }
    }

    /// Help text for the interactive session
    #[must_use]
    pub fn repl_help(&self) -> String {
        [
            self.header("Keypad"),
            keypad::render_layout(),
            String::new(),
            self.header("Commands"),
            "history          list calculations (newest first)".to_string(),
            "history --json   print the history as JSON".to_string(),
            "tape             list calculations (oldest first)".to_string(),
            "replay <n>       re-run history entry n".to_string(),
            "clear-history    empty the history".to_string(),
            "snapshot         print engine state as JSON".to_string(),
            "help             show this help".to_string(),
            "quit             leave the session".to_string(),
        ]
        .join("\n")
    }

    /// Full `run` report in the requested format
    pub fn report(&self, engine: &CalculatorEngine, format: OutputFormat) -> CliResult<String> {
        match format {
            OutputFormat::Json => Ok(engine.snapshot().to_json()?),
            OutputFormat::Text => {
                let mut out = self.display(engine);
                if !self.quiet && !engine.history().is_empty() {
                    out.push_str("\n\n");
                    out.push_str(&self.header("History"));
                    out.push('\n');
                    out.push_str(&self.history(engine.history()));
                }
                Ok(out)
            }
        }
    }

    fn muted(&self, text: &str) -> String {
        if self.use_color {
            style(text).dim().to_string()
        } else {
            text.to_string()
        }
    }
}
