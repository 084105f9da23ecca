//! Application router configuration and the HTTP handlers for the expenses endpoint.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{FromRequest, RawQuery, Request, State},
    http::{Method, StatusCode, header::ALLOW},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    endpoints::{self, ALLOWED_METHODS},
    ledger::{self, ExpenseChange, ExpenseList},
    logging::logging_middleware,
    stores::ExpenseStore,
};

/// Return a router with all the app's routes.
pub fn build_router<S>(state: AppState<S>) -> Router
where
    S: ExpenseStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            endpoints::EXPENSES,
            get(get_expenses::<S>)
                .post(create_expense::<S>)
                .put(update_expense::<S>)
                .delete(delete_expense::<S>)
                .options(get_allowed_methods)
                .fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// The raw request body, with extraction failures reported as [Error]s.
///
/// Bodies over axum's default body limit are rejected with
/// [Error::PayloadTooLarge].
struct RequestBody(Bytes);

impl<S> FromRequest<S> for RequestBody
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Bytes::from_request(request, state).await {
            Ok(body) => Ok(RequestBody(body)),
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                Err(Error::PayloadTooLarge)
            }
            Err(rejection) => {
                tracing::debug!("Could not read request body: {rejection}");
                Err(Error::MalformedBody)
            }
        }
    }
}

/// Get the value of the first `id` parameter in a raw query string.
///
/// Repeated `id` parameters after the first are ignored.
fn first_id_param(query: Option<&str>) -> Option<String> {
    let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(query?) {
        Ok(pairs) => pairs,
        Err(error) => {
            tracing::debug!("Could not parse query string: {error}");
            return None;
        }
    };

    pairs
        .into_iter()
        .find_map(|(key, value)| (key == "id").then_some(value))
}

async fn get_expenses<S>(State(state): State<AppState<S>>) -> Result<Json<ExpenseList>, Error>
where
    S: ExpenseStore + Clone + Send + Sync,
{
    ledger::list_expenses(&state.expense_store).map(Json)
}

async fn create_expense<S>(
    State(state): State<AppState<S>>,
    RequestBody(body): RequestBody,
) -> Result<(StatusCode, Json<ExpenseChange>), Error>
where
    S: ExpenseStore + Clone + Send + Sync,
{
    let change = ledger::create_expense(&state.expense_store, &body, OffsetDateTime::now_utc())?;

    Ok((StatusCode::CREATED, Json(change)))
}

async fn update_expense<S>(
    State(state): State<AppState<S>>,
    RawQuery(query): RawQuery,
    RequestBody(body): RequestBody,
) -> Result<Json<ExpenseChange>, Error>
where
    S: ExpenseStore + Clone + Send + Sync,
{
    let id = first_id_param(query.as_deref());

    ledger::update_expense(
        &state.expense_store,
        id.as_deref(),
        &body,
        OffsetDateTime::now_utc(),
    )
    .map(Json)
}

async fn delete_expense<S>(
    State(state): State<AppState<S>>,
    RequestBody(body): RequestBody,
) -> Result<Json<ExpenseChange>, Error>
where
    S: ExpenseStore + Clone + Send + Sync,
{
    ledger::delete_expense(&state.expense_store, &body).map(Json)
}

/// Answer a CORS preflight or capability check with the supported methods.
async fn get_allowed_methods() -> Response {
    (StatusCode::NO_CONTENT, [(ALLOW, ALLOWED_METHODS)]).into_response()
}

async fn method_not_allowed(method: Method) -> Error {
    Error::MethodNotAllowed(method)
}

async fn not_found() -> Error {
    Error::UnknownRoute
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Bytes,
        http::{Method, StatusCode},
    };
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        AppState, build_router,
        endpoints::{self, ALLOWED_METHODS},
        ledger::{ExpenseChange, ExpenseList},
        stores::{ExpenseStore, InMemoryExpenseStore},
        test_utils::{assert_allow_header, assert_error_message},
    };

    use super::first_id_param;

    fn get_test_server() -> (InMemoryExpenseStore, TestServer) {
        let store = InMemoryExpenseStore::new();
        let app = build_router(AppState::new(store.clone()));
        let server = TestServer::new(app).expect("Could not create test server.");

        (store, server)
    }

    async fn must_post(server: &TestServer, date: &str) -> ExpenseChange {
        let response = server
            .post(endpoints::EXPENSES)
            .json(&json!({
                "description": "Coffee",
                "amount": 3.5,
                "category": "Food",
                "date": date,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        response.json()
    }

    #[tokio::test]
    async fn post_with_comma_amount_is_created() {
        let (store, server) = get_test_server();

        let response = server
            .post(endpoints::EXPENSES)
            .json(&json!({
                "description": "Coffee",
                "amount": "3,50",
                "category": "Food",
                "date": "2024-01-05",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: ExpenseChange = response.json();
        assert!(body.success);
        assert_eq!(body.message, "Expense added");
        assert_eq!(body.expense.amount, 3.5);
        assert_eq!(body.expenses, vec![body.expense.clone()]);
        assert_eq!(store.count(), Ok(1));
    }

    #[tokio::test]
    async fn post_without_amount_is_bad_request() {
        let (store, server) = get_test_server();

        let response = server
            .post(endpoints::EXPENSES)
            .json(&json!({
                "description": "Coffee",
                "category": "Food",
                "date": "2024-01-05",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_error_message(
            &response,
            "Missing required fields: description, amount, category, date",
        );
        assert_eq!(store.count(), Ok(0));
    }

    #[tokio::test]
    async fn post_with_malformed_json_is_bad_request() {
        let (_, server) = get_test_server();

        let response = server
            .post(endpoints::EXPENSES)
            .text("{\"description\": \"Coffee\"")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_error_message(&response, "Invalid JSON body");
    }

    #[tokio::test]
    async fn post_with_invalid_amount_is_bad_request() {
        let (_, server) = get_test_server();

        let response = server
            .post(endpoints::EXPENSES)
            .json(&json!({
                "description": "Coffee",
                "amount": "three fifty",
                "category": "Food",
                "date": "2024-01-05",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_error_message(&response, "Invalid amount");
    }

    #[tokio::test]
    async fn get_lists_expenses_chronologically() {
        let (_, server) = get_test_server();
        let newer = must_post(&server, "2024-01-01").await.expense;
        let older = must_post(&server, "2023-12-31").await.expense;

        let response = server.get(endpoints::EXPENSES).await;

        response.assert_status_ok();
        let body: ExpenseList = response.json();
        assert!(body.success);
        assert_eq!(body.expenses, vec![older, newer]);
    }

    #[tokio::test]
    async fn put_updates_expense_by_id() {
        let (_, server) = get_test_server();
        let created = must_post(&server, "2024-01-05").await.expense;

        let response = server
            .put(endpoints::EXPENSES)
            .add_query_param("id", created.id.as_str())
            .json(&json!({
                "description": "Tea",
                "amount": "2.10",
                "category": "Drinks",
                "date": "2024-01-06",
            }))
            .await;

        response.assert_status_ok();
        let body: ExpenseChange = response.json();
        assert_eq!(body.message, "Expense updated");
        assert_eq!(body.expense.id, created.id);
        assert_eq!(body.expense.created_at, created.created_at);
        assert_eq!(body.expense.description, "Tea");
        assert_eq!(body.expense.amount, 2.1);
        assert!(body.expense.updated_at.is_some());
    }

    #[tokio::test]
    async fn put_with_duplicate_id_param() {
        let (store, server) = get_test_server();
        let first = must_post(&server, "2024-01-05").await.expense;
        let second = must_post(&server, "2024-01-06").await.expense;

        let response = server
            .put(&format!("{}?id=0&id=1", endpoints::EXPENSES))
            .json(&json!({
                "description": "Tea",
                "amount": 2,
                "category": "Drinks",
                "date": "2024-01-07",
            }))
            .await;

        response.assert_status_ok();
        let body: ExpenseChange = response.json();
        assert_eq!(body.expense.id, first.id);
        assert_eq!(store.get_all().unwrap()[1], second);
    }

    #[test]
    fn first_id_param_ignores_other_parameters() {
        assert_eq!(first_id_param(None), None);
        assert_eq!(first_id_param(Some("")), None);
        assert_eq!(first_id_param(Some("other=1")), None);
        assert_eq!(
            first_id_param(Some("other=1&id=a%20b&id=c")),
            Some("a b".to_owned())
        );
    }

    #[tokio::test]
    async fn oversized_body_is_payload_too_large() {
        let (store, server) = get_test_server();
        let body = Bytes::from(vec![b' '; 3 * 1024 * 1024]);

        let response = server.post(endpoints::EXPENSES).bytes(body).await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert_error_message(&response, "Request body too large");
        assert_eq!(store.count(), Ok(0));
    }

    #[tokio::test]
    async fn post_with_overflowing_amount_is_bad_request() {
        let (store, server) = get_test_server();

        let response = server
            .post(endpoints::EXPENSES)
            .json(&json!({
                "description": "Yacht",
                "amount": 1.7e308,
                "category": "Leisure",
                "date": "2024-01-05",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_error_message(&response, "Invalid amount");
        assert_eq!(store.count(), Ok(0));
    }

    #[tokio::test]
    async fn put_with_unknown_id_is_not_found() {
        let (_, server) = get_test_server();
        must_post(&server, "2024-01-05").await;

        let response = server
            .put(endpoints::EXPENSES)
            .add_query_param("id", "missing")
            .json(&json!({
                "description": "Tea",
                "amount": 2,
                "category": "Drinks",
                "date": "2024-01-06",
            }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert_error_message(&response, "Expense not found for given id");
    }

    #[tokio::test]
    async fn put_without_id_is_bad_request() {
        let (_, server) = get_test_server();

        let response = server.put(endpoints::EXPENSES).json(&json!({})).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_error_message(&response, "Missing 'id' query parameter");
    }

    #[tokio::test]
    async fn delete_removes_expense() {
        let (store, server) = get_test_server();
        let created = must_post(&server, "2024-01-05").await.expense;

        let response = server
            .delete(endpoints::EXPENSES)
            .json(&json!({ "id": created.id }))
            .await;

        response.assert_status_ok();
        let body: ExpenseChange = response.json();
        assert_eq!(body.message, "Expense deleted");
        assert_eq!(body.expense.id, created.id);
        assert!(body.expenses.is_empty());
        assert_eq!(store.count(), Ok(0));
    }

    #[tokio::test]
    async fn options_lists_allowed_methods() {
        let (_, server) = get_test_server();

        let response = server.method(Method::OPTIONS, endpoints::EXPENSES).await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert_allow_header(&response);
        assert!(response.as_bytes().is_empty());
    }

    #[tokio::test]
    async fn unsupported_method_is_not_allowed() {
        let (_, server) = get_test_server();

        let response = server.method(Method::PATCH, endpoints::EXPENSES).await;

        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
        assert_allow_header(&response);
        assert_error_message(&response, "Method PATCH not allowed");
        assert_eq!(ALLOWED_METHODS, "GET, POST, PUT, DELETE, OPTIONS");
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let (_, server) = get_test_server();

        let response = server.get("/api/nothing-here").await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert_error_message(&response, "Not found");
    }
}
