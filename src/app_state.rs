//! Implements a struct that holds the state of the REST server.

use crate::stores::ExpenseStore;

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState<S>
where
    S: ExpenseStore + Send + Sync,
{
    /// The store for managing [expenses](crate::expense::Expense).
    pub expense_store: S,
}

impl<S> AppState<S>
where
    S: ExpenseStore + Send + Sync,
{
    /// Create a new [AppState] around `expense_store`.
    pub fn new(expense_store: S) -> Self {
        Self { expense_store }
    }
}
