//! Expense management for the ledger.
//!
//! This module contains everything related to a single expense:
//! - The `Expense` model and its `ExpenseId` scheme
//! - Validation of client supplied fields
//! - Resolving client identifiers with `ExpenseKey`
//! - The chronological view used by every response

mod form;
mod key;
mod model;

pub use form::{ExpenseDraft, ExpenseForm, parse_amount, parse_json_body, round_to_cents};
pub use key::ExpenseKey;
pub use model::{Expense, ExpenseId, NewExpense, sort_chronologically};
