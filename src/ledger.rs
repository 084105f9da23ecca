//! The ledger operations behind the expenses endpoint.
//!
//! These functions know nothing about HTTP beyond the shape of the request
//! body, so they can be called directly with any [ExpenseStore].

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    expense::{Expense, ExpenseForm, ExpenseKey, parse_json_body, sort_chronologically},
    stores::{ExpenseStore, StoreChange},
};

/// The response to listing expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseList {
    /// Always `true`.
    pub success: bool,
    /// Every expense, oldest first.
    pub expenses: Vec<Expense>,
}

/// The response to creating, updating or deleting an expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseChange {
    /// Always `true`.
    pub success: bool,
    /// What happened, e.g. "Expense added".
    pub message: String,
    /// The expense that was added, updated or removed.
    pub expense: Expense,
    /// Every expense after the change, oldest first.
    pub expenses: Vec<Expense>,
}

impl ExpenseChange {
    fn new(message: &str, change: StoreChange) -> ExpenseChange {
        ExpenseChange {
            success: true,
            message: message.to_owned(),
            expense: change.expense,
            expenses: sort_chronologically(&change.expenses),
        }
    }
}

/// List every expense in chronological order.
pub fn list_expenses(store: &impl ExpenseStore) -> Result<ExpenseList, Error> {
    Ok(ExpenseList {
        success: true,
        expenses: sort_chronologically(&store.get_all()?),
    })
}

/// Create an expense from a JSON request `body`.
///
/// # Errors
/// Returns [Error::MalformedBody], [Error::MissingFields] or
/// [Error::InvalidAmount] if the body is not a valid expense.
pub fn create_expense(
    store: &impl ExpenseStore,
    body: &[u8],
    now: OffsetDateTime,
) -> Result<ExpenseChange, Error> {
    let fields = ExpenseForm::from_object(parse_json_body(body)?)
        .into_draft()?
        .finalize()?;

    let change = store.create(fields, now)?;
    tracing::info!("Added expense {}", change.expense.id);

    Ok(ExpenseChange::new("Expense added", change))
}

/// Replace the fields of the expense identified by `id` with those in `body`.
///
/// `id` is resolved as described in [ExpenseKey]. Checks happen in this
/// order: the ID is present, the body is JSON, the fields are present, the ID
/// refers to an expense, and finally the amount is valid.
///
/// # Errors
/// Returns [Error::MissingId] if `id` is absent or empty, [Error::NotFound] if
/// it does not refer to an expense, or the same validation errors as
/// [create_expense].
pub fn update_expense(
    store: &impl ExpenseStore,
    id: Option<&str>,
    body: &[u8],
    now: OffsetDateTime,
) -> Result<ExpenseChange, Error> {
    let key = id.and_then(ExpenseKey::parse).ok_or(Error::MissingId)?;
    let draft = ExpenseForm::from_object(parse_json_body(body)?).into_draft()?;

    let change = store.update(&key, |existing| {
        let fields = draft.finalize()?;
        Ok(existing.updated(fields, now))
    })?;
    tracing::info!("Updated expense {}", change.expense.id);

    Ok(ExpenseChange::new("Expense updated", change))
}

/// Remove the expense identified by the `id` field of `body`.
///
/// # Errors
/// Returns [Error::MalformedBody] if the body is not JSON,
/// [Error::MissingBodyId] if it has no usable `id`, or [Error::NotFound] if the
/// ID does not refer to an expense.
pub fn delete_expense(store: &impl ExpenseStore, body: &[u8]) -> Result<ExpenseChange, Error> {
    let object = parse_json_body(body)?;
    let key = object
        .get("id")
        .and_then(ExpenseKey::from_json)
        .ok_or(Error::MissingBodyId)?;

    let change = store.delete(&key)?;
    tracing::info!("Deleted expense {}", change.expense.id);

    Ok(ExpenseChange::new("Expense deleted", change))
}
