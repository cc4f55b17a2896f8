use axum::{
    body::Body,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
    response::Response,
};

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::OK);
}

#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, content_type: &str) {
    assert_eq!(
        response.headers().get(CONTENT_TYPE),
        Some(&HeaderValue::from_str(content_type).unwrap()),
    );
}

/// Assert that an HTMX request is sent on to `endpoint` after it succeeded.
#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    assert_eq!(
        response.headers().get("hx-redirect"),
        Some(&HeaderValue::from_str(endpoint).unwrap()),
    );
}
