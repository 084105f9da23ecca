use axum::http::header::ALLOW;
use axum_test::TestResponse;

use crate::{ErrorBody, endpoints::ALLOWED_METHODS};

#[track_caller]
pub(crate) fn assert_allow_header(response: &TestResponse) {
    let allow = response
        .headers()
        .get(ALLOW)
        .expect("Headers missing allow");

    assert_eq!(allow, ALLOWED_METHODS);
}

#[track_caller]
pub(crate) fn assert_error_message(response: &TestResponse, want: &str) {
    let body: ErrorBody = response.json();

    assert!(!body.success, "want success = false in error body");
    assert_eq!(body.error, want);
}
