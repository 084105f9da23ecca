//! Resolves client supplied identifiers to expenses.

use serde_json::Value;

use crate::expense::Expense;

/// How a client refers to an expense in update and delete requests.
///
/// Identifiers that are plain non-negative integers are positional indices
/// into insertion order. Positions that are out of range, and everything
/// else, are matched against the stored [ExpenseId](crate::expense::ExpenseId)s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseKey {
    /// A zero-based offset into insertion order.
    Position {
        /// The offset.
        index: usize,
        /// The text the offset was parsed from, used as an ID when the offset
        /// is out of range.
        raw: String,
    },
    /// An expense ID.
    Id(String),
}

impl ExpenseKey {
    /// Interpret an identifier, or return `None` if it is empty.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }

        let key = match raw.parse::<usize>() {
            Ok(index) => ExpenseKey::Position {
                index,
                raw: raw.to_owned(),
            },
            Err(_) => ExpenseKey::Id(raw.to_owned()),
        };

        Some(key)
    }

    /// Interpret a JSON identifier, as sent in a request body.
    ///
    /// Strings are parsed with [ExpenseKey::parse] and integers are treated
    /// like their decimal text. Any other value gives `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(raw) => Self::parse(raw),
            Value::Number(number) => Self::parse(&number.to_string()),
            _ => None,
        }
    }

    /// Find the position of the expense this key refers to in `expenses`,
    /// which must be in insertion order.
    pub fn resolve(&self, expenses: &[Expense]) -> Option<usize> {
        let id = match self {
            ExpenseKey::Position { index, .. } if *index < expenses.len() => return Some(*index),
            ExpenseKey::Position { raw, .. } => raw,
            ExpenseKey::Id(id) => id,
        };

        expenses
            .iter()
            .position(|expense| expense.id.as_str() == id)
    }
}
