//! Defines the endpoint for recording a new expense.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    expense::{ExpenseForm, create_expense},
};

/// The state needed to create an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for recording a new expense, redirects to the dashboard on success.
///
/// Invalid form data is rejected with an alert before the database is touched.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let new_expense = match form.validate() {
        Ok(new_expense) => new_expense,
        Err(error) => {
            tracing::debug!("Rejected expense form {form:?}: {error}");
            return error.into_alert_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = create_expense(user_id, new_expense, &connection) {
        tracing::error!("Could not create expense for user {user_id}: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use rust_decimal::dec;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        PasswordHash,
        auth::{UserID, create_user},
        db::initialize,
        endpoints,
        expense::{
            ExpenseForm, get_expenses_for_user,
            create_endpoint::{CreateExpenseState, create_expense_endpoint},
        },
        test_utils::{assert_hx_redirect, parse_html_fragment},
    };

    fn get_test_state() -> (CreateExpenseState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user("alice", PasswordHash::new_unchecked("hunter2"), &connection)
            .expect("could not create test user");

        (
            CreateExpenseState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    fn valid_form() -> ExpenseForm {
        ExpenseForm {
            category: "Food".to_owned(),
            amount: "12.50".to_owned(),
            date: "2024-01-15".to_owned(),
            description: "Lunch".to_owned(),
        }
    }

    #[tokio::test]
    async fn can_create_expense() {
        let (state, user_id) = get_test_state();

        let response =
            create_expense_endpoint(State(state.clone()), Extension(user_id), Form(valid_form()))
                .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let expenses = get_expenses_for_user(user_id, &connection).unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].user_id, user_id);
        assert_eq!(expenses[0].category, "Food");
        assert_eq!(expenses[0].amount, dec!(12.50));
        assert_eq!(expenses[0].date, date!(2024 - 01 - 15));
        assert_eq!(expenses[0].description.as_deref(), Some("Lunch"));
    }

    #[tokio::test]
    async fn invalid_form_is_rejected_without_saving() {
        let (state, user_id) = get_test_state();
        let form = ExpenseForm {
            amount: "-1".to_owned(),
            ..valid_form()
        };

        let response =
            create_expense_endpoint(State(state.clone()), Extension(user_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let alert = parse_html_fragment(response).await;
        let message = Selector::parse("#alert-container p").unwrap();
        let message = alert
            .select(&message)
            .next()
            .expect("want an alert message")
            .text()
            .collect::<String>();
        assert_eq!(message, "Invalid amount");
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_expenses_for_user(user_id, &connection), Ok(vec![]));
    }
}
