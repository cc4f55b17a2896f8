//! The crate's error type, and how each error is shown as a page or an alert.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError};

/// Everything that can go wrong while handling a request.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request has no session cookie.
    #[error("the session cookie is missing")]
    CookieMissing,

    /// The session cookie could not be decoded.
    #[error("the auth token is invalid: {0}")]
    InvalidToken(String),

    /// The session has ended.
    #[error("the auth token has expired")]
    ExpiredToken,

    /// The password chosen at registration is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// bcrypt failed. Logged on the server and shown to the user as a 500.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An empty or whitespace-only string was used as a username.
    #[error("username cannot be empty")]
    EmptyUsername,

    /// The username has already been registered.
    #[error("the username \"{0}\" is already taken")]
    DuplicateUsername(String),

    /// An empty or whitespace-only string was used as an expense category.
    #[error("category cannot be empty")]
    EmptyCategory,

    /// The amount entered for an expense is not a valid amount of money.
    ///
    /// Amounts must be a positive number no larger than one trillion with at
    /// most two decimal places.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// The date entered for an expense could not be parsed.
    #[error("\"{0}\" is not a valid date, expected a date like 2024-01-31")]
    InvalidDate(String),

    /// A user or expense does not exist, or the expense belongs to someone else.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update an expense that does not exist or belongs to another user.
    #[error("tried to update an expense that is not in the database")]
    UpdateMissingExpense,

    /// Tried to delete an expense that does not exist or belongs to another user.
    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,

    /// Any other SQLite error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// The database mutex was poisoned by a panicking request.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The configured timezone is not a canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The session token could not be written as JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// A chart artifact could not be written to or removed from disk.
    #[error("could not write chart artifact: {0}")]
    ChartWriteError(String),

    /// A chart artifact exists but could not be read from disk.
    #[error("could not read chart artifact: {0}")]
    ChartReadError(String),

    /// The sum of a user's expenses is too large to be represented.
    #[error("the total of the expenses is too large to compute")]
    AmountOverflow,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound | Error::UpdateMissingExpense | Error::DeleteMissingExpense => {
                NotFoundError.into_response()
            }
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "\"{timezone}\" is not a known timezone. Start the server with a \
                    canonical timezone name, e.g. --timezone Pacific/Auckland."
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            Error::AmountOverflow => InternalServerError {
                description: "Your expenses add up to more than can be totalled",
                fix: "Edit or delete the expenses with unusually large amounts",
            }
            .into_response(),
            // Details of the remaining errors stay in the server log.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::EmptyCategory => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Invalid category".to_owned(),
                    details: "Enter a category for the expense, e.g. \"Groceries\".".to_owned(),
                },
            ),
            Error::InvalidAmount(amount) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Invalid amount".to_owned(),
                    details: format!(
                        "\"{amount}\" is not a valid amount. \
                        Enter a positive amount no larger than 1,000,000,000,000 \
                        with at most two decimal places, e.g. 12.50."
                    ),
                },
            ),
            Error::InvalidDate(date) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Invalid date".to_owned(),
                    details: format!(
                        "\"{date}\" is not a valid date. Enter a date like 2024-01-31."
                    ),
                },
            ),
            Error::UpdateMissingExpense => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update expense".to_owned(),
                    details: "The expense could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingExpense => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete expense".to_owned(),
                    details: "The expense could not be found. \
                    Try refreshing the page to see if the expense has already been deleted."
                        .to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "\"{timezone}\" is not a known timezone. Start the server with a \
                        canonical timezone name, e.g. --timezone Pacific/Auckland."
                    ),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}
