//! Serializable engine state

use crate::config::EngineConfig;
use crate::core::engine::{CalculatorEngine, PendingOperation, Registers};
use crate::core::history::{History, HistoryEntry};
use crate::core::number::{parse_formatted, serde_float};
use crate::core::{CalcError, CalcResult, Operator};
use serde::{Deserialize, Serialize};

/// Point-in-time copy of the engine registers and history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Display text
    pub current: String,
    /// Left operand of the pending operation
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_float::option"
    )]
    pub operand: Option<f64>,
    /// Pending operator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    /// Running expression
    #[serde(default)]
    pub expression: String,
    /// Whether the next digit starts a fresh number
    #[serde(default)]
    pub waiting_for_operand: bool,
    /// History, newest first
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Snapshot {
    /// Serializes the snapshot to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn validate(&self, config: &EngineConfig) -> CalcResult<()> {
        if self.current.is_empty() {
            return Err(CalcError::InvalidSnapshot("current is empty".into()));
        }
        let displayable = parse_formatted(&self.current).is_some()
            || self.current == config.override_token;
        if !displayable {
            return Err(CalcError::InvalidSnapshot(format!(
                "current is not a number: {}",
                self.current
            )));
        }
        match (self.operand, self.operator) {
            (Some(_), Some(_)) => Ok(()),
            (None, None) if self.expression.is_empty() => Ok(()),
            (None, None) => Err(CalcError::InvalidSnapshot(
                "expression set without a pending operation".into(),
            )),
            _ => Err(CalcError::InvalidSnapshot(
                "operand and operator must be set together".into(),
            )),
        }
    }
}

impl CalculatorEngine {
    /// Captures the current registers and history
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let pending = self.registers.pending;
        Snapshot {
            current: self.registers.current.clone(),
            operand: pending.map(|p| p.operand),
            operator: pending.map(|p| p.operator),
            expression: self.registers.expression.clone(),
            waiting_for_operand: self.registers.waiting_for_operand,
            history: self.history.to_vec(),
        }
    }

    /// Rebuilds an engine from a snapshot
    ///
    /// History beyond the configured capacity is dropped, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::InvalidSnapshot`] if the snapshot breaks a
    /// register invariant.
    pub fn restore(snapshot: Snapshot, config: EngineConfig) -> CalcResult<Self> {
        let mut engine = Self::with_config(config);
        snapshot.validate(&engine.config)?;

        let pending = snapshot
            .operand
            .zip(snapshot.operator)
            .map(|(operand, operator)| PendingOperation { operand, operator });
        engine.registers = Registers {
            current: snapshot.current,
            pending,
            expression: snapshot.expression,
            waiting_for_operand: snapshot.waiting_for_operand,
        };
        engine.history = History::from_entries(snapshot.history, engine.config.history_capacity);

        tracing::debug!(entries = engine.history.len(), "engine restored from snapshot");
        Ok(engine)
    }
}
