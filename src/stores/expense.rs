//! Defines the expense store trait.

use time::OffsetDateTime;

use crate::{
    Error,
    expense::{Expense, ExpenseKey, NewExpense},
};

/// The outcome of a change to an [ExpenseStore].
#[derive(Debug, Clone, PartialEq)]
pub struct StoreChange {
    /// The expense that was added, updated or removed.
    pub expense: Expense,
    /// Every expense in insertion order, read while the change was applied.
    pub expenses: Vec<Expense>,
}

/// Handles the creation, retrieval, update and removal of expenses.
///
/// Implementers keep expenses in insertion order and must apply each method
/// atomically with respect to the other methods. Methods that change the store
/// return a [StoreChange] whose snapshot is taken within the same atomic step,
/// so a committed change is never followed by a failed read.
pub trait ExpenseStore {
    /// Add a new expense to the end of the store with a freshly generated ID.
    fn create(&self, fields: NewExpense, created_at: OffsetDateTime)
    -> Result<StoreChange, Error>;

    /// Retrieve every expense in insertion order.
    fn get_all(&self) -> Result<Vec<Expense>, Error>;

    /// Replace the expense that `key` refers to with the result of `apply`.
    ///
    /// `apply` receives the current expense and is only called once the key
    /// has been resolved. If it fails the store is left unchanged.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `key` does not refer to an expense, or the
    /// error returned by `apply`.
    fn update<F>(&self, key: &ExpenseKey, apply: F) -> Result<StoreChange, Error>
    where
        F: FnOnce(&Expense) -> Result<Expense, Error>;

    /// Remove the expense that `key` refers to.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `key` does not refer to an expense.
    fn delete(&self, key: &ExpenseKey) -> Result<StoreChange, Error>;

    /// The number of expenses in the store.
    fn count(&self) -> Result<usize, Error>;
}
