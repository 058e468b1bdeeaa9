//! Calculation history
//!
//! A bounded, most-recent-first list of finished calculations. Entries keep
//! the display expression and, when the engine produced them, a structured
//! [`Calculation`] so replay does not have to re-parse formatted text.

use crate::core::number::{format_number, serde_float};
use crate::core::Operator;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Structured record of what a history entry computed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Calculation {
    /// `left operator right`
    Binary {
        /// Left-hand operand
        #[serde(with = "serde_float")]
        left: f64,
        /// Operator applied
        operator: Operator,
        /// Right-hand operand
        #[serde(with = "serde_float")]
        right: f64,
    },
    /// `√operand`
    SquareRoot {
        /// Radicand
        #[serde(with = "serde_float")]
        operand: f64,
    },
}

/// A single finished calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The expression as it was displayed, e.g. `"3 + 4"` or `"√16"`
    pub expression: String,
    /// The numeric result
    #[serde(with = "serde_float")]
    pub result: f64,
    /// Text the display showed in place of the result (override display mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shown: Option<String>,
    /// When the calculation was performed (Unix epoch millis)
    pub timestamp: u64,
    /// Structured replay record; absent for entries imported from text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation: Option<Calculation>,
}

impl HistoryEntry {
    /// Creates a new history entry stamped with the current time
    #[must_use]
    pub fn new(expression: String, result: f64, calculation: Option<Calculation>) -> Self {
        Self {
            expression,
            result,
            shown: None,
            timestamp: Self::current_timestamp(),
            calculation,
        }
    }

    /// Creates a history entry with a specific timestamp and no structured record
    #[must_use]
    pub fn with_timestamp(expression: String, result: f64, timestamp: u64) -> Self {
        Self {
            expression,
            result,
            shown: None,
            timestamp,
            calculation: None,
        }
    }

    /// Marks the entry as displayed with `text` instead of its result
    #[must_use]
    pub fn shown_as(mut self, text: impl Into<String>) -> Self {
        self.shown = Some(text.into());
        self
    }

    fn current_timestamp() -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    /// The result as it was displayed: the shown text, else the formatted number
    #[must_use]
    pub fn result_text(&self) -> String {
        self.shown
            .clone()
            .unwrap_or_else(|| format_number(self.result))
    }

    /// Returns a formatted display string, e.g. `"3 + 4 = 7"`
    #[must_use]
    pub fn display(&self) -> String {
        format!("{} = {}", self.expression, self.result_text())
    }
}

/// Bounded history, newest entry first
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    max_entries: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Default maximum history size
    pub const DEFAULT_MAX_ENTRIES: usize = 10;

    /// Creates a new history with the default bound
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_ENTRIES)
    }

    /// Creates a history with a custom bound
    #[must_use]
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries),
            max_entries,
        }
    }

    /// Adds an entry as the most recent one, evicting the oldest past the bound
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.max_entries == 0 {
            return;
        }
        self.entries.push_front(entry);
        while self.entries.len() > self.max_entries {
            if let Some(evicted) = self.entries.pop_back() {
                tracing::debug!(expression = %evicted.expression, "history entry evicted");
            }
        }
    }

    /// Records a calculation result
    pub fn record(&mut self, expression: &str, result: f64, calculation: Option<Calculation>) {
        self.push(HistoryEntry::new(expression.to_string(), result, calculation));
    }

    /// Returns the number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the history is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the maximum number of entries
    #[must_use]
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Clears all history entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates newest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Iterates oldest first (tape order)
    pub fn iter_oldest_first(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().rev()
    }

    /// Returns the most recent entry
    #[must_use]
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Returns the oldest retained entry
    #[must_use]
    pub fn oldest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Returns the entry at the given index (0 = most recent)
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Copies the entries out, newest first
    #[must_use]
    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Builds a history from newest-first entries, keeping at most `max_entries`
    #[must_use]
    pub fn from_entries(entries: Vec<HistoryEntry>, max_entries: usize) -> Self {
        let mut history = Self::with_capacity(max_entries);
        history
            .entries
            .extend(entries.into_iter().take(max_entries));
        history
    }

    /// Serializes the history to JSON (newest first)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }

    /// Deserializes history from JSON (newest first), keeping at most `max_entries`
    pub fn from_json(json: &str, max_entries: usize) -> Result<Self, serde_json::Error> {
        let entries: Vec<HistoryEntry> = serde_json::from_str(json)?;
        Ok(Self::from_entries(entries, max_entries))
    }

    /// Exports history as lines, oldest first
    #[must_use]
    pub fn export_tape(&self) -> String {
        self.iter_oldest_first()
            .map(HistoryEntry::display)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
