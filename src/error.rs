//! Defines the app level error type and its conversion to JSON error responses.
use axum::{
    Json,
    http::{Method, StatusCode, header::ALLOW},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::endpoints::ALLOWED_METHODS;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request body could not be parsed as JSON.
    #[error("Invalid JSON body")]
    MalformedBody,

    /// The request body is larger than the server accepts.
    #[error("Request body too large")]
    PayloadTooLarge,

    /// One or more of the required expense fields were absent or empty.
    #[error("Missing required fields: description, amount, category, date")]
    MissingFields,

    /// An update request did not say which expense to update.
    #[error("Missing 'id' query parameter")]
    MissingId,

    /// A delete request did not say which expense to delete.
    #[error("Missing 'id' in request body")]
    MissingBodyId,

    /// The amount was given but could not be parsed as a finite number.
    #[error("Invalid amount")]
    InvalidAmount,

    /// The identifier did not match a position or an expense ID.
    #[error("Expense not found for given id")]
    NotFound,

    /// The route exists but does not support the HTTP method.
    #[error("Method {0} not allowed")]
    MethodNotAllowed(Method),

    /// No route matches the request path.
    #[error("Not found")]
    UnknownRoute,

    /// Could not acquire the lock on the expense store.
    #[error("could not acquire the expense store lock")]
    StoreLock,

    /// Some other unexpected failure.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("an unexpected error occurred: {0}")]
    Internal(String),
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// A human readable description of what went wrong.
    pub error: String,
}

impl Error {
    /// The HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MalformedBody
            | Error::MissingFields
            | Error::MissingId
            | Error::MissingBodyId
            | Error::InvalidAmount => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Error::NotFound | Error::UnknownRoute => StatusCode::NOT_FOUND,
            Error::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Error::StoreLock | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = if status_code.is_server_error() {
            tracing::error!("An unexpected error occurred: {self}");
            // Internal details are not intended to be shown to the client.
            "Internal server error".to_owned()
        } else {
            tracing::warn!("Rejecting request: {self}");
            self.to_string()
        };

        let body = Json(ErrorBody {
            success: false,
            error: message,
        });

        match self {
            Error::MethodNotAllowed(_) => {
                (status_code, [(ALLOW, ALLOWED_METHODS)], body).into_response()
            }
            _ => (status_code, body).into_response(),
        }
    }
}
