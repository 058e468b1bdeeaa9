//! Unified calculator driver
//!
//! Scenario checks are written once against [`CalculatorDriver`] and run
//! against every front end: the bare engine here, the terminal session in
//! `keycalc-cli`.

use crate::core::history::HistoryEntry;
use crate::core::{CalcError, CalcResult, CalculatorEngine, DisplayMode};
use crate::keypad::KeypadAction;

/// Abstract driver trait for calculator interactions
///
/// # Example
///
/// ```rust
/// use keycalc::driver::{keys, CalculatorDriver, EngineDriver};
///
/// let mut driver = EngineDriver::new();
/// driver.press_all(&keys("12 × 3 =")).unwrap();
/// assert_eq!(driver.display(), "36");
/// assert_eq!(driver.history()[0].expression, "12 × 3");
/// ```
pub trait CalculatorDriver {
    /// Presses a single key
    fn press(&mut self, action: KeypadAction) -> CalcResult<()>;

    /// Presses keys in order, stopping at the first error
    fn press_all(&mut self, actions: &[KeypadAction]) -> CalcResult<()> {
        actions.iter().try_for_each(|action| self.press(*action))
    }

    /// Text on the main display
    fn display(&self) -> String;

    /// Live expression line
    fn expression(&self) -> String;

    /// History entries (newest first)
    fn history(&self) -> Vec<HistoryItem>;

    /// Replays the history entry at `index` (0 = newest)
    fn replay(&mut self, index: usize) -> CalcResult<()>;

    /// Clears everything except history
    fn reset(&mut self);
}

/// A simplified history item for driver results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    /// The expression that was evaluated
    pub expression: String,
    /// The result as display text
    pub result: String,
}

impl From<&HistoryEntry> for HistoryItem {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            expression: entry.expression.clone(),
            result: entry.result_text(),
        }
    }
}

/// Parses a keypad line for scenario scripts
///
/// # Panics
///
/// Panics on an unrecognized token.
#[must_use]
pub fn keys(line: &str) -> Vec<KeypadAction> {
    match KeypadAction::parse_line(line) {
        Ok(actions) => actions,
        Err(token) => panic!("unrecognized keypad token: {token}"),
    }
}

/// Driver backed directly by a [`CalculatorEngine`]
#[derive(Debug, Clone, Default)]
pub struct EngineDriver {
    engine: CalculatorEngine,
    mode: DisplayMode,
}

impl EngineDriver {
    /// Creates a driver over a fresh engine
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a driver over an existing engine
    #[must_use]
    pub fn with_engine(engine: CalculatorEngine) -> Self {
        Self {
            engine,
            mode: DisplayMode::Normal,
        }
    }

    /// Sets the display mode used by `=`
    #[must_use]
    pub const fn with_mode(mut self, mode: DisplayMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the underlying engine
    #[must_use]
    pub fn engine(&self) -> &CalculatorEngine {
        &self.engine
    }
}

impl CalculatorDriver for EngineDriver {
    fn press(&mut self, action: KeypadAction) -> CalcResult<()> {
        action.apply(&mut self.engine, self.mode).map(|_| ())
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
        let entry = self
            .engine
            .history()
            .get(index)
            .cloned()
            .ok_or_else(|| CalcError::ReplayUnsupported(format!("no history entry {index}")))?;
        self.engine.replay(&entry).map(|_| ())
    }

    fn reset(&mut self) {
        self.engine.all_clear();
    }
}

// ===== Unified scenario checks =====
// These run against ANY CalculatorDriver implementation

/// Verifies the four basic operations plus power
pub fn verify_basic_arithmetic<D: CalculatorDriver>(driver: &mut D) {
    for (line, expected) in [
        ("2 + 3 =", "5"),
        ("10 - 4 =", "6"),
        ("6 * 7 =", "42"),
        ("20 / 4 =", "5"),
        ("2 ^ 10 =", "1024"),
        ("7 / 2 =", "3.5"),
    ] {
        driver.reset();
        driver.press_all(&keys(line)).unwrap();
        assert_eq!(driver.display(), expected, "{line}");
    }
    driver.reset();
}

/// Verifies left-to-right chaining and operand reuse
pub fn verify_operator_chaining<D: CalculatorDriver>(driver: &mut D) {
    driver.reset();
    driver.press_all(&keys("2 + 3 -")).unwrap();
    assert_eq!(driver.display(), "5");
    assert_eq!(driver.expression(), "5 − ");
    driver.press_all(&keys("1")).unwrap();
    assert_eq!(driver.expression(), "5 − 1");
    driver.press_all(&keys("=")).unwrap();
    assert_eq!(driver.display(), "4");
    assert_eq!(driver.expression(), "");

    driver.reset();
    driver.press_all(&keys("5 + =")).unwrap();
    assert_eq!(driver.display(), "10");
    driver.reset();
}

/// Verifies that failing operations report errors and leave the display alone
pub fn verify_error_handling<D: CalculatorDriver>(driver: &mut D) {
    driver.reset();
    driver.press_all(&keys("6 / 0")).unwrap();
    let result = driver.press(KeypadAction::Equals);
    assert_eq!(result, Err(CalcError::DivisionByZero));
    assert_eq!(driver.display(), "0");
    assert_eq!(driver.expression(), "6 ÷ 0");

    driver.reset();
    driver.press_all(&keys("4 neg")).unwrap();
    let result = driver.press(KeypadAction::Sqrt);
    assert_eq!(result, Err(CalcError::NegativeSqrtDomain));
    assert_eq!(driver.display(), "-4");
    driver.reset();
}

/// Verifies history order and the default bound of 10 entries
pub fn verify_history<D: CalculatorDriver>(driver: &mut D) {
    driver.reset();
    driver.press(KeypadAction::ClearHistory).unwrap();

    driver.press_all(&keys("1 + 1 = 2 + 2 = 3 + 3 =")).unwrap();
    let history = driver.history();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].expression, "3 + 3");
    assert_eq!(history[0].result, "6");
    assert_eq!(history[2].expression, "1 + 1");

    driver.press(KeypadAction::ClearHistory).unwrap();
    for i in 0..11 {
        driver.press_all(&keys(&format!("{i} + 0 ="))).unwrap();
    }
    let history = driver.history();
    assert_eq!(history.len(), 10);
    assert_eq!(history[0].expression, "10 + 0");
    assert_eq!(history[9].expression, "1 + 0");
    assert!(history.iter().all(|item| item.expression != "0 + 0"));

    driver.press(KeypadAction::ClearHistory).unwrap();
    assert!(driver.history().is_empty());
    driver.reset();
}

/// Verifies that replaying an entry reproduces its result
pub fn verify_replay<D: CalculatorDriver>(driver: &mut D) {
    driver.reset();
    driver.press(KeypadAction::ClearHistory).unwrap();
    driver.press_all(&keys("3 + 4 = AC")).unwrap();
    assert_eq!(driver.display(), "0");

    driver.replay(0).unwrap();
    assert_eq!(driver.display(), "7");
    let history = driver.history();
    assert_eq!(history.len(), 2);
    assert_eq!(
        history[0],
        HistoryItem {
            expression: "3 + 4".into(),
            result: "7".into()
        }
    );
    driver.reset();
}

/// Verifies in-place edits of the display value
pub fn verify_display_edits<D: CalculatorDriver>(driver: &mut D) {
    driver.reset();
    driver.press_all(&keys("12 BS")).unwrap();
    assert_eq!(driver.display(), "1");
    driver.press_all(&keys("BS")).unwrap();
    assert_eq!(driver.display(), "0");

    driver.press_all(&keys("50 %")).unwrap();
    assert_eq!(driver.display(), "0.5");
    driver.press_all(&keys("neg")).unwrap();
    assert_eq!(driver.display(), "-0.5");

    driver.press_all(&keys("C")).unwrap();
    assert_eq!(driver.display(), "0");
    driver.reset();
}

/// Complete verification suite
pub fn run_full_specification<D: CalculatorDriver>(driver: &mut D) {
    verify_basic_arithmetic(driver);
    verify_operator_chaining(driver);
    verify_error_handling(driver);
    verify_display_edits(driver);
    verify_history(driver);
    verify_replay(driver);
}
