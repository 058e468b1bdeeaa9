//! Interactive keypad session
//!
//! A session owns one engine and applies the presentation convention for
//! errors: the message is shown, the display keeps its last state, and the
//! next input starts from a fully cleared engine.

use crate::error::{CliError, CliResult};
use crate::output::Renderer;
use keycalc::config::EngineConfig;
use keycalc::core::history::History;
use keycalc::core::{CalcError, CalcResult, CalculatorEngine, DisplayMode};
use keycalc::driver::{CalculatorDriver, HistoryItem};
use keycalc::keypad::KeypadAction;
use std::io::{BufRead, Write};
use std::path::Path;

/// Result of handling one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Text to show, then keep reading
    Output(String),
    /// Leave the session
    Quit,
}

/// Session meta commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    History { json: bool },
    Tape,
    Replay(usize),
    ClearHistory,
    Snapshot,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<CliResult<Self>> {
        let mut words = line.split_whitespace();
        let command = match words.next()? {
            "history" => match words.next() {
                None => Self::History { json: false },
                Some("--json") => Self::History { json: true },
                Some(_) => {
                    return Some(Err(CliError::invalid_argument("usage: history [--json]")));
                }
            },
            "tape" => Self::Tape,
            "clear-history" => Self::ClearHistory,
            "snapshot" => Self::Snapshot,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            "replay" => {
                let index = words
                    .next()
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(|| CliError::invalid_argument("usage: replay <n>"));
                return Some(index.map(Self::Replay));
            }
            _ => return None,
        };
        Some(Ok(command))
    }
}

/// Terminal calculator session
#[derive(Debug)]
pub struct Session {
    engine: CalculatorEngine,
    mode: DisplayMode,
    renderer: Renderer,
    clear_pending: bool,
}

impl Session {
    /// Creates a session over a fresh engine
    #[must_use]
    pub fn new(config: EngineConfig, mode: DisplayMode, renderer: Renderer) -> Self {
        Self {
            engine: CalculatorEngine::with_config(config),
            mode,
            renderer,
            clear_pending: false,
        }
    }

    /// Returns the underlying engine
    #[must_use]
    pub fn engine(&self) -> &CalculatorEngine {
        &self.engine
    }

    /// Loads history from a JSON file written by `history --json`
    pub fn load_history(&mut self, path: &Path) -> CliResult<()> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            CliError::invalid_argument(format!("cannot read {}: {e}", path.display()))
        })?;
        let history = History::from_json(&json, self.engine.config().history_capacity)?;
        self.engine.import_history(&history);
        tracing::debug!(path = %path.display(), entries = history.len(), "history loaded");
        Ok(())
    }

    /// Presses keys in order; on the first error the rest are skipped
    pub fn press_tokens<S: AsRef<str>>(&mut self, tokens: &[S]) -> CliResult<()> {
        let line = tokens
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        let actions = KeypadAction::parse_line(&line).map_err(|t| CliError::unknown_token(&t))?;
        self.press_all(&actions)?;
        Ok(())
    }

    /// Handles one line of interactive input
    pub fn handle_line(&mut self, line: &str) -> LineOutcome {
        let line = line.trim();
        if line.is_empty() {
            return LineOutcome::Output(self.renderer.display(&self.engine));
        }

        let result = match Command::parse(line) {
            Some(Ok(Command::Quit)) => return LineOutcome::Quit,
            Some(Ok(command)) => self.run_command(command),
            Some(Err(err)) => Err(err),
            None => self
                .press_tokens(&[line])
                .map(|()| self.renderer.display(&self.engine)),
        };

        LineOutcome::Output(match result {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!(%err, "input rejected");
                format!(
                    "{}\n{}",
                    self.renderer.error(&err.to_string()),
                    self.renderer.display(&self.engine)
                )
            }
        })
    }

    fn run_command(&mut self, command: Command) -> CliResult<String> {
        match command {
            Command::History { json: false } => Ok(self.renderer.history(self.engine.history())),
            Command::History { json: true } => Ok(self.engine.history().to_json()?),
            Command::Tape => Ok(self.renderer.tape(self.engine.history())),
            Command::Snapshot => Ok(self.engine.snapshot().to_json()?),
            Command::Help => Ok(self.renderer.repl_help()),
            Command::ClearHistory => {
                self.engine.clear_history();
                Ok(self.renderer.history(self.engine.history()))
            }
            Command::Replay(index) => {
                if index >= self.engine.history().len() {
                    return Err(CliError::invalid_argument(format!(
                        "no history entry {index}"
                    )));
                }
                CalculatorDriver::replay(self, index)?;
                Ok(self.renderer.display(&self.engine))
            }
            Command::Quit => Ok(String::new()),
        }
    }

    /// Reads lines until `quit` or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> CliResult<()> {
        writeln!(output, "{}", self.renderer.display(&self.engine))?;
        write!(output, "> ")?;
        output.flush()?;

        for line in input.lines() {
            match self.handle_line(&line?) {
                LineOutcome::Quit => return Ok(()),
                LineOutcome::Output(text) => {
                    writeln!(output, "{text}")?;
                    write!(output, "> ")?;
                    output.flush()?;
                }
            }
        }
        writeln!(output)?;
        Ok(())
    }

    fn begin_input(&mut self) {
        if self.clear_pending {
            self.engine.all_clear();
            self.clear_pending = false;
        }
    }

    fn finish_input<T>(&mut self, result: CalcResult<T>) -> CalcResult<T> {
        if result.is_err() {
            self.clear_pending = true;
        }
        result
    }
}

impl CalculatorDriver for Session {
    fn press(&mut self, action: KeypadAction) -> CalcResult<()> {
        self.begin_input();
        let result = action.apply(&mut self.engine, self.mode).map(|_| ());
        self.finish_input(result)
    }

    fn display(&self) -> String {
        self.engine.current().to_string()
    }

    fn expression(&self) -> String {
        self.engine.current_expression()
    }

    fn history(&self) -> Vec<HistoryItem> {
        self.engine.history().iter().map(HistoryItem::from).collect()
    }

    fn replay(&mut self, index: usize) -> CalcResult<()> {
        self.begin_input();
        let entry = self
            .engine
            .history()
            .get(index)
            .cloned()
            .ok_or_else(|| CalcError::ReplayUnsupported(format!("no history entry {index}")))?;
        let result = self.engine.replay(&entry).map(|_| ());
        self.finish_input(result)
    }

    fn reset(&mut self) {
        self.engine.all_clear();
        self.clear_pending = false;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use keycalc::driver::run_full_specification;

    fn session() -> Session {
        Session::new(
            EngineConfig::default(),
            DisplayMode::Normal,
            Renderer::new(false, false),
        )
    }

    fn output(outcome: LineOutcome) -> String {
        match outcome {
            LineOutcome::Output(text) => text,
            LineOutcome::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn test_keys_line_shows_display() {
        let mut session = session();
        assert_eq!(output(session.handle_line("12 + 3")), "3\n(12 + 3)");
        assert_eq!(output(session.handle_line("=")), "15");
    }

    #[test]
    fn test_error_then_next_input_starts_cleared() {
        let mut session = session();
        let text = output(session.handle_line("6 / 0 ="));
        assert_eq!(text, "Error: Cannot divide by zero\n0\n(6 ÷ 0)");

        assert_eq!(output(session.handle_line("2")), "2");
        assert_eq!(session.engine().operator(), None);
    }

    #[test]
    fn test_unknown_token_reports_error() {
        let mut session = session();
        let text = output(session.handle_line("1 + banana"));
        assert!(text.starts_with("Error: Invalid argument: unrecognized key 'banana'"));
        assert_eq!(session.engine().current(), "0");
    }

    #[test]
    fn test_history_and_tape_commands() {
        let mut session = session();
        session.handle_line("1 + 1 = 2 × 2 =");
        assert_eq!(
            output(session.handle_line("history")),
            "  0: 2 × 2 = 4\n  1: 1 + 1 = 2"
        );
        assert!(output(session.handle_line("tape")).contains("1 + 1 = 2\n2 × 2 = 4"));
    }

    #[test]
    fn test_history_json_command() {
        let mut session = session();
        session.handle_line("10 ^ 400 = AC 2 + 2 =");
        let json = output(session.handle_line("history --json"));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["expression"], "2 + 2");
        assert_eq!(value[1]["result"], "Infinity");

        let text = output(session.handle_line("history json"));
        assert!(text.contains("usage: history [--json]"));
    }

    #[test]
    fn test_load_history_from_exported_json() {
        let mut source = session();
        source.handle_line("3 × 4 = 1 ÷ 8 =");
        let json = output(source.handle_line("history --json"));

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, json).unwrap();

        let mut session = session();
        session.load_history(&path).unwrap();
        assert_eq!(
            output(session.handle_line("history")),
            "  0: 1 ÷ 8 = 0.125\n  1: 3 × 4 = 12"
        );
        assert_eq!(output(session.handle_line("replay 1")), "12");
    }

    #[test]
    fn test_load_history_errors() {
        let mut session = session();
        let err = session.load_history(Path::new("/nonexistent/history.json")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            session.load_history(&path),
            Err(CliError::Serialization { .. })
        ));
    }

    #[test]
    fn test_replay_command() {
        let mut session = session();
        session.handle_line("3 + 4 = AC");
        assert_eq!(output(session.handle_line("replay 0")), "7");
        assert_eq!(session.engine().history().len(), 2);
    }

    #[test]
    fn test_replay_command_bad_index() {
        let mut session = session();
        let text = output(session.handle_line("replay 5"));
        assert!(text.contains("no history entry 5"));
        let text = output(session.handle_line("replay"));
        assert!(text.contains("usage: replay <n>"));
    }

    #[test]
    fn test_clear_history_command() {
        let mut session = session();
        session.handle_line("1 + 1 =");
        assert_eq!(
            output(session.handle_line("clear-history")),
            "No calculations yet"
        );
    }

    #[test]
    fn test_snapshot_command() {
        let mut session = session();
        session.handle_line("5 ×");
        let json = output(session.handle_line("snapshot"));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["operator"], "*");
        assert_eq!(value["expression"], "5 × ");
    }

    #[test]
    fn test_quit_command() {
        let mut session = session();
        assert_eq!(session.handle_line("quit"), LineOutcome::Quit);
        assert_eq!(session.handle_line("  exit "), LineOutcome::Quit);
    }

    #[test]
    fn test_run_loop_reads_until_quit() {
        let mut session = session();
        let input = "2 ^ 8 =\nquit\n9 9\n".as_bytes();
        let mut out = Vec::new();
        session.run(input, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("256"));
        assert!(!text.contains("99"));
        assert_eq!(session.engine().current(), "256");
    }

    #[test]
    fn test_run_loop_handles_eof() {
        let mut session = session();
        let mut out = Vec::new();
        session.run("7 ×".as_bytes(), &mut out).unwrap();
        assert_eq!(session.engine().operand(), Some(7.0));
    }

    #[test]
    fn test_override_display_session() {
        let mut session = Session::new(
            EngineConfig::default(),
            DisplayMode::Override,
            Renderer::new(false, false),
        );
        assert_eq!(output(session.handle_line("2 + 2 =")), "Hello World");
        assert_eq!(
            output(session.handle_line("history")),
            "  0: 2 + 2 = Hello World"
        );
        assert_eq!(output(session.handle_line("replay 0")), "4");
    }

    #[test]
    fn test_session_full_specification() {
        let mut session = session();
        run_full_specification(&mut session);
    }
}
