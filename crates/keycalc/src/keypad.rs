//! Keypad actions
//!
//! Every button (or typed token) maps 1:1 to an engine operation. Front ends
//! translate their input into [`KeypadAction`]s and call [`KeypadAction::apply`].

use crate::core::{CalcResult, CalculatorEngine, DisplayMode, DisplayValue, Operator};
use std::fmt;

/// Actions that keypad buttons can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeypadAction {
    /// Enter a digit (0-9)
    Digit(u8),
    /// Enter a decimal point
    Decimal,
    /// Choose a binary operator
    Operator(Operator),
    /// Evaluate the pending operation
    Equals,
    /// Clear the current entry
    Clear,
    /// Clear everything except history
    AllClear,
    /// Delete the last character
    Backspace,
    /// Divide by 100
    Percent,
    /// Flip the sign
    Negate,
    /// Square root
    Sqrt,
    /// Empty the history
    ClearHistory,
}

impl KeypadAction {
    /// Parses a keypad token
    ///
    /// Digits, `.`, operator tokens and display symbols, `=`, `C`, `AC`,
    /// `⌫`/`BS`/`backspace`, `%`, `±`/`+/-`/`neg`, `√`/`sqrt` and `CH`.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        let action = match token {
            "." => Self::Decimal,
            "=" => Self::Equals,
            "C" | "c" => Self::Clear,
            "AC" | "ac" => Self::AllClear,
            "⌫" | "BS" | "bs" | "backspace" => Self::Backspace,
            "%" => Self::Percent,
            "±" | "+/-" | "neg" => Self::Negate,
            "√" | "sqrt" => Self::Sqrt,
            "CH" | "ch" => Self::ClearHistory,
            other => {
                let mut chars = other.chars();
                let (Some(c), None) = (chars.next(), chars.next()) else {
                    return None;
                };
                if let Some(digit) = c.to_digit(10) {
                    Self::Digit(u8::try_from(digit).ok()?)
                } else {
                    Self::Operator(Operator::from_symbol(c)?)
                }
            }
        };
        Some(action)
    }

    /// Splits a whitespace-separated line into actions
    ///
    /// Multi-digit runs such as `12` or `3.5` expand into one action per
    /// character. Returns the first unrecognized token on failure.
    pub fn parse_line(line: &str) -> Result<Vec<Self>, String> {
        let mut actions = Vec::new();
        for token in line.split_whitespace() {
            if let Some(action) = Self::from_token(token) {
                actions.push(action);
                continue;
            }
            let expanded: Option<Vec<Self>> = token
                .chars()
                .map(|c| match c {
                    '.' => Some(Self::Decimal),
                    c => c
                        .to_digit(10)
                        .and_then(|d| u8::try_from(d).ok())
                        .map(Self::Digit),
                })
                .collect();
            match expanded {
                Some(expanded) => actions.extend(expanded),
                None => return Err(token.to_string()),
            }
        }
        Ok(actions)
    }

    /// Returns the button label for this action
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Digit(d) => d.to_string(),
            Self::Decimal => ".".to_string(),
            Self::Operator(op) => op.symbol().to_string(),
            Self::Equals => "=".to_string(),
            Self::Clear => "C".to_string(),
            Self::AllClear => "AC".to_string(),
            Self::Backspace => "⌫".to_string(),
            Self::Percent => "%".to_string(),
            Self::Negate => "±".to_string(),
            Self::Sqrt => "√".to_string(),
            Self::ClearHistory => "CH".to_string(),
        }
    }

    /// Runs the action against an engine
    ///
    /// Returns the evaluated value for `=` and `√`, `None` for input and
    /// clearing actions.
    pub fn apply(
        self,
        engine: &mut CalculatorEngine,
        mode: DisplayMode,
    ) -> CalcResult<Option<DisplayValue>> {
        match self {
            Self::Digit(d) => engine.input_digit(d),
            Self::Decimal => engine.input_decimal(),
            Self::Operator(op) => engine.choose_operator(op),
            Self::Equals => return engine.evaluate_with(mode).map(Some),
            Self::Clear => engine.clear(),
            Self::AllClear => engine.all_clear(),
            Self::Backspace => engine.backspace(),
            Self::Percent => engine.percent(),
            Self::Negate => engine.negate(),
            Self::Sqrt => return engine.sqrt().map(|v| Some(DisplayValue::Number(v))),
            Self::ClearHistory => engine.clear_history(),
        }
        Ok(None)
    }
}

impl fmt::Display for KeypadAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Keypad layout, row by row
/// ```text
/// [ AC ] [ C  ] [ ⌫ ] [ ÷ ]
/// [ 7  ] [ 8  ] [ 9 ] [ × ]
/// [ 4  ] [ 5  ] [ 6 ] [ − ]
/// [ 1  ] [ 2  ] [ 3 ] [ + ]
/// [ ±  ] [ 0  ] [ . ] [ = ]
/// [ %  ] [ √  ] [ ^ ] [ CH ]
/// ```
pub const LAYOUT: [[KeypadAction; 4]; 6] = [
    [
        KeypadAction::AllClear,
        KeypadAction::Clear,
        KeypadAction::Backspace,
        KeypadAction::Operator(Operator::Divide),
    ],
    [
        KeypadAction::Digit(7),
        KeypadAction::Digit(8),
        KeypadAction::Digit(9),
        KeypadAction::Operator(Operator::Multiply),
    ],
    [
        KeypadAction::Digit(4),
        KeypadAction::Digit(5),
        KeypadAction::Digit(6),
        KeypadAction::Operator(Operator::Subtract),
    ],
    [
        KeypadAction::Digit(1),
        KeypadAction::Digit(2),
        KeypadAction::Digit(3),
        KeypadAction::Operator(Operator::Add),
    ],
    [
        KeypadAction::Negate,
        KeypadAction::Digit(0),
        KeypadAction::Decimal,
        KeypadAction::Equals,
    ],
    [
        KeypadAction::Percent,
        KeypadAction::Sqrt,
        KeypadAction::Operator(Operator::Power),
        KeypadAction::ClearHistory,
    ],
];

/// Renders [`LAYOUT`] as a text grid
#[must_use]
pub fn render_layout() -> String {
    LAYOUT
        .iter()
        .map(|row| {
            row.iter()
                .map(|action| format!("[{:^4}]", action.label()))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
