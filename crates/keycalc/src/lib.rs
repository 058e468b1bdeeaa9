//! keycalc - keypad calculator engine
//!
//! A small state machine behind a classic calculator keypad: digits
//! accumulate into the display, a binary operator waits for its right
//! operand, `=` resolves it and finished calculations land in a bounded,
//! newest-first history that can be replayed.
//!
//! Presentation (rendering, error timing, key handling) lives outside this
//! crate; front ends drive the engine through [`keypad::KeypadAction`] or the
//! [`driver::CalculatorDriver`] trait.
//!
//! # Example
//!
//! ```rust
//! use keycalc::prelude::*;
//!
//! let mut engine = CalculatorEngine::new();
//! for action in KeypadAction::parse_line("6 / 0").unwrap() {
//!     action.apply(&mut engine, DisplayMode::Normal).unwrap();
//! }
//! assert_eq!(engine.evaluate(), Err(CalcError::DivisionByZero));
//! assert_eq!(engine.current_expression(), "6 ÷ 0");
//! ```

#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::float_cmp
    )
)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

pub mod config;
pub mod core;
pub mod driver;
pub mod keypad;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::core::history::{Calculation, History, HistoryEntry};
    pub use crate::core::number::{format_number, parse_number};
    pub use crate::core::snapshot::Snapshot;
    pub use crate::core::{
        CalcError, CalcResult, CalculatorEngine, DisplayMode, DisplayValue, Operator,
    };
    pub use crate::driver::{CalculatorDriver, EngineDriver, HistoryItem};
    pub use crate::keypad::KeypadAction;
}
