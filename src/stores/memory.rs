//! Implements an in-memory expense store.
use std::sync::{Arc, Mutex, MutexGuard};

use time::OffsetDateTime;

use crate::{
    Error,
    expense::{Expense, ExpenseId, ExpenseKey, NewExpense},
    stores::{ExpenseStore, StoreChange},
};

/// Stores expenses in process memory.
///
/// Clones share the same underlying expenses. Everything is lost when the
/// last clone is dropped, e.g. when the server restarts.
#[derive(Debug, Clone, Default)]
pub struct InMemoryExpenseStore {
    expenses: Arc<Mutex<Vec<Expense>>>,
}

impl InMemoryExpenseStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Expense>>, Error> {
        self.expenses.lock().map_err(|error| {
            tracing::error!("Could not acquire expense store lock: {error}");
            Error::StoreLock
        })
    }
}

impl ExpenseStore for InMemoryExpenseStore {
    fn create(
        &self,
        fields: NewExpense,
        created_at: OffsetDateTime,
    ) -> Result<StoreChange, Error> {
        let mut expenses = self.lock()?;

        let id = loop {
            let id = ExpenseId::generate(created_at);

            if expenses.iter().all(|expense| expense.id != id) {
                break id;
            }

            tracing::debug!("Generated duplicate expense ID {id}, retrying");
        };

        let expense = Expense::new(id, fields, created_at);
        expenses.push(expense.clone());

        Ok(StoreChange {
            expense,
            expenses: expenses.clone(),
        })
    }

    fn get_all(&self) -> Result<Vec<Expense>, Error> {
        Ok(self.lock()?.clone())
    }

    fn update<F>(&self, key: &ExpenseKey, apply: F) -> Result<StoreChange, Error>
    where
        F: FnOnce(&Expense) -> Result<Expense, Error>,
    {
        let mut expenses = self.lock()?;
        let index = key.resolve(&expenses).ok_or(Error::NotFound)?;

        let updated = apply(&expenses[index])?;
        expenses[index] = updated.clone();

        Ok(StoreChange {
            expense: updated,
            expenses: expenses.clone(),
        })
    }

    fn delete(&self, key: &ExpenseKey) -> Result<StoreChange, Error> {
        let mut expenses = self.lock()?;
        let index = key.resolve(&expenses).ok_or(Error::NotFound)?;
        let expense = expenses.remove(index);

        Ok(StoreChange {
            expense,
            expenses: expenses.clone(),
        })
    }

    fn count(&self) -> Result<usize, Error> {
        Ok(self.lock()?.len())
    }
}
