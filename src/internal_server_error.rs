//! The 500 page, and how HTMX requests are sent to it.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{endpoints, html::error_view};

/// A 500 page that tells the user what went wrong and what they can do about it.
pub struct InternalServerError<'a> {
    pub description: &'a str,
    pub fix: &'a str,
}

impl Default for InternalServerError<'_> {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs",
        }
    }
}

impl IntoResponse for InternalServerError<'_> {
    fn into_response(self) -> Response {
        let page = error_view("Internal Server Error", "500", self.description, self.fix);

        (StatusCode::INTERNAL_SERVER_ERROR, Html(page.into_string())).into_response()
    }
}

pub async fn get_internal_server_error_page() -> Response {
    InternalServerError::default().into_response()
}

/// Send an HTMX request to the 500 page. Plain page loads should render
/// [InternalServerError] instead.
pub fn get_internal_server_error_redirect() -> Response {
    let error_page = HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned());

    (StatusCode::INTERNAL_SERVER_ERROR, error_page, ()).into_response()
}
