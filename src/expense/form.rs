//! Parses and validates expense fields from JSON request bodies.

use serde_json::{Map, Value};

use crate::{Error, expense::NewExpense};

/// The raw expense fields of a request body.
///
/// Fields are kept as loose JSON values so that a missing field can be told
/// apart from a field with the wrong shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseForm {
    description: Value,
    amount: Value,
    category: Value,
    date: Value,
}

/// An [ExpenseForm] with every required field present, but with the amount not
/// yet parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    description: String,
    amount: Value,
    category: String,
    date: String,
}

/// Parse a request body into a JSON object.
///
/// An empty body, or a valid JSON value that is not an object, is treated as
/// an empty object so that it is reported as missing fields.
///
/// # Errors
/// Returns [Error::MalformedBody] if `body` is not valid JSON.
pub fn parse_json_body(body: &[u8]) -> Result<Map<String, Value>, Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice(body) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Ok(Map::new()),
        Err(error) => {
            tracing::debug!("Could not parse request body as JSON: {error}");
            Err(Error::MalformedBody)
        }
    }
}

impl ExpenseForm {
    /// Read the expense fields from a JSON object, ignoring any other keys.
    pub fn from_object(mut object: Map<String, Value>) -> Self {
        let mut take = |key: &str| object.remove(key).unwrap_or(Value::Null);

        Self {
            description: take("description"),
            amount: take("amount"),
            category: take("category"),
            date: take("date"),
        }
    }

    /// Check that every required field is present.
    ///
    /// # Errors
    /// Returns [Error::MissingFields] if any text field is absent or empty, or
    /// the amount is absent or `null`.
    pub fn into_draft(self) -> Result<ExpenseDraft, Error> {
        let description = required_text(self.description);
        let category = required_text(self.category);
        let date = required_text(self.date);

        match (description, self.amount, category, date) {
            (Some(description), amount, Some(category), Some(date)) if !amount.is_null() => {
                Ok(ExpenseDraft {
                    description,
                    amount,
                    category,
                    date,
                })
            }
            _ => Err(Error::MissingFields),
        }
    }
}

impl ExpenseDraft {
    /// Parse the amount and produce the final validated fields.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if the amount is not a finite number,
    /// before or after rounding.
    pub fn finalize(self) -> Result<NewExpense, Error> {
        let amount = round_to_cents(parse_amount(&self.amount)?);

        // Scaling by 100 overflows for amounts close to f64::MAX.
        if !amount.is_finite() {
            tracing::debug!("Amount {} overflowed when rounded", self.amount);
            return Err(Error::InvalidAmount);
        }

        Ok(NewExpense {
            description: self.description,
            amount,
            category: self.category,
            date: self.date,
        })
    }
}

/// Convert a required text field, returning `None` if it should count as missing.
///
/// Non-empty strings are used as is, non-zero numbers are converted to their
/// shortest decimal text (`1.0` becomes `"1"`) and `true` becomes `"true"`.
/// Everything else is missing.
fn required_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text),
        Value::Number(number) if number.as_f64() != Some(0.0) => match number.as_f64() {
            Some(float) if number.is_f64() => Some(float.to_string()),
            _ => Some(number.to_string()),
        },
        Value::Bool(true) => Some(true.to_string()),
        _ => None,
    }
}

/// Parse an amount given either as a JSON number or a string.
///
/// Strings may use either `.` or `,` as the decimal separator.
///
/// # Errors
/// Returns [Error::InvalidAmount] if `value` is not a number, cannot be
/// parsed, or is not finite.
pub fn parse_amount(value: &Value) -> Result<f64, Error> {
    let amount = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().replacen(',', ".", 1).parse::<f64>().ok(),
        _ => None,
    };

    amount
        .filter(|amount| amount.is_finite())
        .ok_or(Error::InvalidAmount)
}

/// Round `amount` to two decimal places.
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
