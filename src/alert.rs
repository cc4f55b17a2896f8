//! Success and error messages shown after an HTMX request.
//!
//! Alerts are rendered as out-of-band swaps into the `#alert-container`
//! element defined in the base page layout, so any HTMX response can carry
//! one regardless of its swap target.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::html::ALERT_CONTAINER_POSITION;

/// An alert message to show the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message without details.
    SuccessSimple { message: String },
    /// An error message with details on how to fix it.
    Error { message: String, details: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (container_style, icon, message, details) = match self {
            Alert::SuccessSimple { message } => (SUCCESS_STYLE, "✓", message, String::new()),
            Alert::Error { message, details } => (ERROR_STYLE, "!", message, details),
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style=(ALERT_CONTAINER_POSITION)
            {
                div class=(container_style) role="alert"
                {
                    span class="font-bold me-2" { (icon) }

                    div class="flex-1"
                    {
                        p class="font-medium" { (message) }

                        @if !details.is_empty() {
                            p class="text-sm" { (details) }
                        }
                    }

                    button
                        type="button"
                        class="ms-2 text-lg leading-none"
                        aria-label="Close"
                        onclick="this.closest('#alert-container').classList.add('hidden')"
                    {
                        "×"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}

const SUCCESS_STYLE: &str = "flex items-start p-4 mb-4 text-green-800 border \
    border-green-300 rounded-lg bg-green-50 dark:bg-gray-800 dark:text-green-400 \
    dark:border-green-800";

const ERROR_STYLE: &str = "flex items-start p-4 mb-4 text-red-800 border \
    border-red-300 rounded-lg bg-red-50 dark:bg-gray-800 dark:text-red-400 \
    dark:border-red-800";
