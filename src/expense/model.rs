//! Defines the expense model, its ID scheme and the chronological view.

use std::{cmp::Ordering, fmt};

use rand::Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// ============================================================================
// MODELS
// ============================================================================

/// The unique identifier of an [Expense].
///
/// IDs are the creation time in milliseconds since the Unix epoch written in
/// base 36, a hyphen, and a random base 36 suffix, e.g. `lr3k2a1b-x9f0q2m`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(String);

const SUFFIX_LENGTH: usize = 7;
const BASE_36_DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

impl ExpenseId {
    /// Generate a new ID for an expense created at `now`.
    ///
    /// Two calls with the same `now` will almost certainly produce different
    /// IDs, but callers that need uniqueness must still check for collisions.
    pub fn generate(now: OffsetDateTime) -> Self {
        let millis = (now.unix_timestamp_nanos() / 1_000_000).max(0) as u128;

        let mut rng = rand::rng();
        let suffix: String = (0..SUFFIX_LENGTH)
            .map(|_| BASE_36_DIGITS[rng.random_range(0..BASE_36_DIGITS.len())] as char)
            .collect();

        Self(format!("{}-{suffix}", to_base_36(millis)))
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExpenseId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

fn to_base_36(mut value: u128) -> String {
    if value == 0 {
        return "0".to_owned();
    }

    let mut digits = Vec::new();

    while value > 0 {
        digits.push(BASE_36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }

    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// A single expense entry.
///
/// To create a new `Expense`, add a [NewExpense] to an
/// [ExpenseStore](crate::stores::ExpenseStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// The ID of the expense. Never changes once assigned.
    pub id: ExpenseId,
    /// What the money was spent on.
    pub description: String,
    /// The amount spent, rounded to two decimal places.
    pub amount: f64,
    /// A free-form label, e.g. "Food" or "Transport".
    pub category: String,
    /// When the expense happened, expected to be `YYYY-MM-DD`.
    ///
    /// The date is stored exactly as the client sent it.
    pub date: String,
    /// When the expense was recorded. Never changes once assigned.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the expense was last updated, `None` if it never has been.
    #[serde(
        with = "time::serde::rfc3339::option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

impl Expense {
    /// Create an expense from validated fields.
    pub fn new(id: ExpenseId, fields: NewExpense, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            description: fields.description,
            amount: fields.amount,
            category: fields.category,
            date: fields.date,
            created_at,
            updated_at: None,
        }
    }

    /// Return a copy of this expense with every mutable field replaced by
    /// `fields` and `updated_at` set to `now`.
    ///
    /// The ID and creation time are kept.
    pub fn updated(&self, fields: NewExpense, now: OffsetDateTime) -> Self {
        Self {
            id: self.id.clone(),
            description: fields.description,
            amount: fields.amount,
            category: fields.category,
            date: fields.date,
            created_at: self.created_at,
            updated_at: Some(now),
        }
    }
}

/// The validated, client supplied fields of an expense.
///
/// Build one from a request body with
/// [ExpenseForm](crate::expense::ExpenseForm).
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// A non-empty description.
    pub description: String,
    /// The amount, already rounded to two decimal places.
    pub amount: f64,
    /// A non-empty category label.
    pub category: String,
    /// A non-empty date string.
    pub date: String,
}

// ============================================================================
// CHRONOLOGICAL VIEW
// ============================================================================

/// Sort a copy of `expenses` from oldest to newest.
///
/// Expenses are ordered by `date`, then by `created_at` when two expenses share
/// a date. The sort is stable, so expenses that tie on both keep their
/// insertion order. `expenses` itself is left untouched.
pub fn sort_chronologically(expenses: &[Expense]) -> Vec<Expense> {
    let mut sorted = expenses.to_vec();
    sorted.sort_by(compare_chronologically);
    sorted
}

fn compare_chronologically(a: &Expense, b: &Expense) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| a.created_at.cmp(&b.created_at))
}
