//! Calculator core: operators, number text, history and the engine state machine
//!
//! Everything in here is synchronous and owned. The engine is the only
//! writer of its registers; callers read projections after each operation.

pub mod engine;
pub mod history;
pub mod number;
mod operations;
pub mod snapshot;

pub use engine::{CalculatorEngine, DisplayMode, DisplayValue};
pub use operations::Operator;

use thiserror::Error;

/// Result type for calculator operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Calculator error types
///
/// Every failing operation leaves the engine registers exactly as they were
/// before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    /// Division with a zero right-hand operand
    #[error("Cannot divide by zero")]
    DivisionByZero,
    /// Square root of a negative value
    #[error("Cannot calculate square root of negative number")]
    NegativeSqrtDomain,
    /// A history expression that has no replayable shape
    #[error("Cannot replay this calculation: {0}")]
    ReplayUnsupported(String),
    /// A snapshot that violates an engine invariant
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

impl CalcError {
    /// Short machine-friendly kind name, stable across message wording changes
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DivisionByZero => "DivisionByZero",
            Self::NegativeSqrtDomain => "NegativeSqrtDomain",
            Self::ReplayUnsupported(_) => "ReplayUnsupported",
            Self::InvalidSnapshot(_) => "InvalidSnapshot",
        }
    }
}
