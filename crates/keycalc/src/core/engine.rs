//! Calculator engine state machine
//!
//! The engine owns a small register file (display text, pending operation,
//! running expression, "waiting for operand" flag) plus the bounded history.
//! Every operation mutates those registers in place; failing operations
//! leave them exactly as they were.

use crate::config::EngineConfig;
use crate::core::history::{Calculation, History, HistoryEntry};
use crate::core::number::{format_number, parse_formatted, parse_number};
use crate::core::{CalcError, CalcResult, Operator};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// How `evaluate_with` presents a successful result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Display the formatted numeric result
    #[default]
    Normal,
    /// Display the configured override token; history records it next to the real result
    Override,
}

/// The value an evaluation put on the display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayValue {
    /// A numeric result
    Number(f64),
    /// Non-numeric display text (the override token)
    Text(String),
}

impl DisplayValue {
    /// Returns the numeric value, if this is a number
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => f.write_str(&format_number(*value)),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Left operand and operator of a binary operation awaiting its right operand
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PendingOperation {
    pub(crate) operand: f64,
    pub(crate) operator: Operator,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Registers {
    pub(crate) current: String,
    pub(crate) pending: Option<PendingOperation>,
    pub(crate) expression: String,
    pub(crate) waiting_for_operand: bool,
}

impl Default for Registers {
    fn default() -> Self {
        Self {
            current: "0".to_string(),
            pending: None,
            expression: String::new(),
            waiting_for_operand: false,
        }
    }
}

/// Keypad calculator engine
///
/// # Example
///
/// ```rust
/// use keycalc::prelude::*;
///
/// let mut engine = CalculatorEngine::new();
/// engine.input_digit(3);
/// engine.choose_operator(Operator::Add);
/// engine.input_digit(4);
/// assert_eq!(engine.current_expression(), "3 + 4");
///
/// let value = engine.evaluate().unwrap();
/// assert_eq!(value.to_string(), "7");
/// assert_eq!(engine.history().latest().unwrap().expression, "3 + 4");
/// ```
#[derive(Debug, Clone)]
pub struct CalculatorEngine {
    pub(crate) config: EngineConfig,
    pub(crate) registers: Registers,
    pub(crate) history: History,
}

impl Default for CalculatorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculatorEngine {
    /// Creates an engine with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an engine with a custom configuration
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        let token = config.override_token.clone();
        let config = config.with_override_token(token);
        Self {
            history: History::with_capacity(config.history_capacity),
            registers: Registers::default(),
            config,
        }
    }

    /// Returns the engine configuration
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ===== Read-only projections =====

    /// Text currently on the display
    #[must_use]
    pub fn current(&self) -> &str {
        &self.registers.current
    }

    /// Left operand of the pending operation
    #[must_use]
    pub fn operand(&self) -> Option<f64> {
        self.registers.pending.map(|p| p.operand)
    }

    /// Pending operator
    #[must_use]
    pub fn operator(&self) -> Option<Operator> {
        self.registers.pending.map(|p| p.operator)
    }

    /// Running expression (operand and formatted operator)
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.registers.expression
    }

    /// True right after an operator or an evaluation
    #[must_use]
    pub fn is_waiting_for_operand(&self) -> bool {
        self.registers.waiting_for_operand
    }

    /// Calculation history, newest first
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Maps an operator to its display symbol
    #[must_use]
    pub const fn format_operator(operator: Operator) -> char {
        operator.symbol()
    }

    /// Live expression preview for the secondary display line
    ///
    /// While waiting for the right operand only the running expression is
    /// shown; once digits are entered they are appended. Empty when nothing
    /// is pending.
    #[must_use]
    pub fn current_expression(&self) -> String {
        match self.registers.pending {
            Some(_) if self.registers.waiting_for_operand => self.registers.expression.clone(),
            Some(_) => format!("{}{}", self.registers.expression, self.registers.current),
            None => String::new(),
        }
    }

    // ===== Input =====

    /// Enters a digit (0-9). Larger values are ignored.
    pub fn input_digit(&mut self, digit: u8) {
        let Some(ch) = char::from_digit(u32::from(digit), 10) else {
            tracing::warn!(digit, "ignoring out-of-range digit");
            return;
        };

        let fresh = self.registers.waiting_for_operand || !self.is_editable();
        let registers = &mut self.registers;
        if fresh {
            registers.current = ch.to_string();
            registers.waiting_for_operand = false;
        } else if registers.current == "0" {
            registers.current = ch.to_string();
        } else if registers.current == "-0" {
            registers.current = format!("-{ch}");
        } else {
            registers.current.push(ch);
        }
    }

    /// Enters a decimal point, at most once per number
    pub fn input_decimal(&mut self) {
        let fresh = self.registers.waiting_for_operand || !self.is_editable();
        let registers = &mut self.registers;
        if fresh {
            registers.current = "0.".to_string();
            registers.waiting_for_operand = false;
        } else if !registers.current.contains('.') {
            registers.current.push('.');
        }
    }

    /// Selects the pending operator
    ///
    /// With an operation already pending, that operation is resolved first and
    /// the expression collapses to its result. If the resolution fails (a
    /// pending division by zero) the pending operand is kept and only the
    /// operator changes.
    pub fn choose_operator(&mut self, operator: Operator) {
        match self.registers.pending {
            None => {
                let operand = self.current_value();
                self.registers.expression = self.current_literal();
                self.registers.pending = Some(PendingOperation { operand, operator });
            }
            Some(pending) => match self.perform_calculation() {
                Ok(result) => {
                    let text = format_number(result);
                    self.registers.current.clone_from(&text);
                    self.registers.expression = text;
                    self.registers.pending = Some(PendingOperation {
                        operand: result,
                        operator,
                    });
                }
                Err(err) => {
                    tracing::warn!(%err, "chained operation left unresolved");
                    self.registers.expression = format_number(pending.operand);
                    self.registers.pending = Some(PendingOperation {
                        operand: pending.operand,
                        operator,
                    });
                }
            },
        }

        self.registers.waiting_for_operand = true;
        self.registers.expression.push(' ');
        self.registers.expression.push(operator.symbol());
        self.registers.expression.push(' ');
    }

    // ===== Evaluation =====

    /// Resolves the pending operation, or returns the display value if none
    fn perform_calculation(&self) -> CalcResult<f64> {
        let right = self.current_value();
        match self.registers.pending {
            Some(pending) => pending.operator.apply(pending.operand, right),
            None => Ok(right),
        }
    }

    /// Evaluates the pending operation and displays the numeric result
    pub fn evaluate(&mut self) -> CalcResult<DisplayValue> {
        self.evaluate_with(DisplayMode::Normal)
    }

    /// Evaluates the pending operation
    ///
    /// Without a pending operation this succeeds trivially with the current
    /// display value and records nothing. On success the full expression and
    /// the numeric result go to history, the pending operation is cleared and
    /// the engine waits for a fresh operand. In override mode the history
    /// entry also keeps the token that was shown.
    pub fn evaluate_with(&mut self, mode: DisplayMode) -> CalcResult<DisplayValue> {
        let Some(pending) = self.registers.pending else {
            let current = &self.registers.current;
            return Ok(parse_number(current)
                .map_or_else(|| DisplayValue::Text(current.clone()), DisplayValue::Number));
        };

        let right = self.current_value();
        let result = match self.perform_calculation() {
            Ok(result) => result,
            Err(err) => {
                tracing::debug!(%err, "evaluation failed");
                return Err(err);
            }
        };

        let expression = format!("{}{}", self.registers.expression, self.current_literal());
        tracing::debug!(%expression, result, ?mode, "evaluated");

        let calculation = Calculation::Binary {
            left: pending.operand,
            operator: pending.operator,
            right,
        };
        let entry = HistoryEntry::new(expression, result, Some(calculation));
        let display = match mode {
            DisplayMode::Normal => {
                self.history.push(entry);
                DisplayValue::Number(result)
            }
            DisplayMode::Override => {
                let token = self.config.override_token.clone();
                self.history.push(entry.shown_as(token.clone()));
                DisplayValue::Text(token)
            }
        };
        self.registers = Registers {
            current: display.to_string(),
            pending: None,
            expression: String::new(),
            waiting_for_operand: true,
        };
        Ok(display)
    }

    /// Square root of the display value
    pub fn sqrt(&mut self) -> CalcResult<f64> {
        let value = self.current_value();
        if value < 0.0 {
            tracing::debug!(value, "square root of negative value rejected");
            return Err(CalcError::NegativeSqrtDomain);
        }

        let result = value.sqrt();
        let expression = format!("√{}", format_number(value));
        self.history.record(
            &expression,
            result,
            Some(Calculation::SquareRoot { operand: value }),
        );
        tracing::debug!(%expression, result, "evaluated");

        self.registers = Registers {
            current: format_number(result),
            pending: None,
            expression: String::new(),
            waiting_for_operand: true,
        };
        Ok(result)
    }

    /// Divides the display value by 100; ignored if it is not a number
    pub fn percent(&mut self) {
        self.map_current(|value| value / 100.0);
    }

    /// Flips the sign of the display value; ignored if it is not a number
    pub fn negate(&mut self) {
        self.map_current(|value| value * -1.0);
    }

    fn map_current(&mut self, f: impl FnOnce(f64) -> f64) {
        if let Some(value) = parse_number(&self.registers.current) {
            self.registers.current = format_number(f(value));
        }
    }

    // ===== Clearing =====

    /// Cancels the number being entered; the pending operation survives
    pub fn clear(&mut self) {
        self.registers.current = "0".to_string();
        self.registers.waiting_for_operand = false;
    }

    /// Resets all registers. History is kept.
    pub fn all_clear(&mut self) {
        self.registers = Registers::default();
    }

    /// Removes the last character of the display
    ///
    /// Non-editable display text (the override token, `Infinity`, `NaN`,
    /// exponent forms) resets to `"0"` instead of being trimmed.
    pub fn backspace(&mut self) {
        let editable = self.is_editable();
        let current = &mut self.registers.current;
        if editable {
            current.pop();
        }
        if !editable || parse_number(current).is_none() {
            *current = "0".to_string();
        }
    }

    /// Empties the history
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Replaces the history with imported entries, newest first
    ///
    /// Entries past the configured capacity are dropped.
    pub fn import_history(&mut self, history: &History) {
        self.history = History::from_entries(history.to_vec(), self.config.history_capacity);
        tracing::debug!(entries = self.history.len(), "history imported");
    }

    // ===== Replay =====

    /// Re-executes a history entry
    ///
    /// Entries recorded by the engine carry a structured calculation. Entries
    /// without one (imported from text) are parsed from their expression,
    /// which must be `√<num>` or `<num> <op> <num>`.
    pub fn replay(&mut self, entry: &HistoryEntry) -> CalcResult<DisplayValue> {
        let calculation = match entry.calculation {
            Some(calculation) => calculation,
            None => parse_calculation(&entry.expression)?,
        };
        tracing::debug!(expression = %entry.expression, "replaying");

        let saved = self.registers.clone();
        let outcome = match calculation {
            Calculation::SquareRoot { operand } => {
                self.registers.current = format_number(operand);
                self.sqrt().map(DisplayValue::Number)
            }
            Calculation::Binary {
                left,
                operator,
                right,
            } => {
                self.registers = Registers {
                    current: format_number(right),
                    pending: Some(PendingOperation {
                        operand: left,
                        operator,
                    }),
                    expression: format!("{} {} ", format_number(left), operator.symbol()),
                    waiting_for_operand: false,
                };
                self.evaluate()
            }
        };

        if outcome.is_err() {
            self.registers = saved;
        }
        outcome
    }

    // ===== Helpers =====

    /// True when the display holds plain decimal text that keys can extend
    fn is_editable(&self) -> bool {
        let current = &self.registers.current;
        *current != self.config.override_token
            && current
                .bytes()
                .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-'))
            && parse_number(current).is_some()
    }

    /// Display value as a number; unparsable text counts as 0
    fn current_value(&self) -> f64 {
        parse_formatted(&self.registers.current).unwrap_or(0.0)
    }

    /// Display text if it is numeric, otherwise `"0"`
    fn current_literal(&self) -> String {
        if parse_formatted(&self.registers.current).is_some() {
            self.registers.current.clone()
        } else {
            format_number(0.0)
        }
    }
}

fn binary_expression_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(
                r"^\s*(-?\d+(?:\.\d*)?(?:e[+-]?\d+)?)\s*([-+−×÷^*/])\s*(-?\d+(?:\.\d*)?(?:e[+-]?\d+)?)\s*$",
            )
            .ok()
        })
        .as_ref()
}

/// Recovers a calculation from a history expression string
fn parse_calculation(expression: &str) -> CalcResult<Calculation> {
    let unsupported = || CalcError::ReplayUnsupported(expression.to_string());

    if let Some(radicand) = expression.trim().strip_prefix('√') {
        let operand = parse_number(radicand).ok_or_else(unsupported)?;
        return Ok(Calculation::SquareRoot { operand });
    }

    let captures = binary_expression_pattern()
        .and_then(|pattern| pattern.captures(expression))
        .ok_or_else(unsupported)?;
    let left = parse_number(&captures[1]).ok_or_else(unsupported)?;
    let operator = captures[2]
        .chars()
        .next()
        .and_then(Operator::from_symbol)
        .ok_or_else(unsupported)?;
    let right = parse_number(&captures[3]).ok_or_else(unsupported)?;

    Ok(Calculation::Binary {
        left,
        operator,
        right,
    })
}
