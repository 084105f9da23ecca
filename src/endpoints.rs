//! The API endpoint URIs.

/// The single resource path for listing, creating, updating and deleting expenses.
pub const EXPENSES: &str = "/api/expenses";

/// The value of the `Allow` header sent for [EXPENSES].
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
