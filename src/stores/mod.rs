//! Contains traits and implementations for objects that store [expenses](crate::expense::Expense).

mod expense;
mod memory;

pub use expense::{ExpenseStore, StoreChange};
pub use memory::InMemoryExpenseStore;
