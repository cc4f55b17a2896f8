use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::ExpenseId,
    endpoints,
    expense::{ExpenseForm, update_expense},
};

/// The state needed to edit an expense.
#[derive(Debug, Clone)]
pub struct EditExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for updating one of the user's expenses, redirects to the dashboard on success.
pub async fn edit_expense_endpoint(
    State(state): State<EditExpenseState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let update = match form.validate() {
        Ok(update) => update,
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

    match update_expense(expense_id, user_id, update, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingExpense) => {
            tracing::debug!("User {user_id} tried to update missing expense {expense_id}");
            Error::UpdateMissingExpense.into_alert_response()
        }
        Err(error) => {
            tracing::error!("Could not update expense {expense_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use rust_decimal::dec;
    use time::macros::date;

    use crate::{
        PasswordHash,
        auth::{UserID, create_user},
        db::initialize,
        endpoints,
        expense::{
            Expense, ExpenseForm, NewExpense, create_expense,
            edit_endpoint::{EditExpenseState, edit_expense_endpoint},
            get_expense,
        },
        test_utils::assert_hx_redirect,
    };

    struct Fixture {
        state: EditExpenseState,
        alice: UserID,
        bob: UserID,
        target: Expense,
        other: Expense,
    }

    fn setup() -> Fixture {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let alice = create_user("alice", PasswordHash::new_unchecked("hunter2"), &connection)
            .expect("could not create test user")
            .id;
        let bob = create_user("bob", PasswordHash::new_unchecked("hunter2"), &connection)
            .expect("could not create test user")
            .id;
        let new_expense = |category: &str| NewExpense {
            category: category.to_owned(),
            amount: dec!(10),
            date: date!(2024 - 01 - 15),
            description: None,
        };
        let target = create_expense(alice, new_expense("Food"), &connection).unwrap();
        let other = create_expense(alice, new_expense("Transport"), &connection).unwrap();

        Fixture {
            state: EditExpenseState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            alice,
            bob,
            target,
            other,
        }
    }

    fn update_form() -> ExpenseForm {
        ExpenseForm {
            category: "Groceries".to_owned(),
            amount: "42.00".to_owned(),
            date: "2024-02-01".to_owned(),
            description: "Weekly shop".to_owned(),
        }
    }

    #[tokio::test]
    async fn can_update_expense() {
        let fixture = setup();

        let response = edit_expense_endpoint(
            State(fixture.state.clone()),
            Extension(fixture.alice),
            Path(fixture.target.id),
            Form(update_form()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        let connection = fixture.state.db_connection.lock().unwrap();
        let got = get_expense(fixture.target.id, fixture.alice, &connection).unwrap();
        assert_eq!(
            got,
            Expense {
                id: fixture.target.id,
                user_id: fixture.alice,
                category: "Groceries".to_owned(),
                amount: dec!(42.00),
                date: date!(2024 - 02 - 01),
                description: Some("Weekly shop".to_owned()),
            }
        );
        assert_eq!(
            get_expense(fixture.other.id, fixture.alice, &connection),
            Ok(fixture.other)
        );
    }

    #[tokio::test]
    async fn update_of_other_users_expense_is_not_found() {
        let fixture = setup();

        let response = edit_expense_endpoint(
            State(fixture.state.clone()),
            Extension(fixture.bob),
            Path(fixture.target.id),
            Form(update_form()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let connection = fixture.state.db_connection.lock().unwrap();
        assert_eq!(
            get_expense(fixture.target.id, fixture.alice, &connection),
            Ok(fixture.target)
        );
    }

    #[tokio::test]
    async fn invalid_update_is_rejected() {
        let fixture = setup();
        let form = ExpenseForm {
            category: "  ".to_owned(),
            ..update_form()
        };

        let response = edit_expense_endpoint(
            State(fixture.state.clone()),
            Extension(fixture.alice),
            Path(fixture.target.id),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let connection = fixture.state.db_connection.lock().unwrap();
        assert_eq!(
            get_expense(fixture.target.id, fixture.alice, &connection),
            Ok(fixture.target)
        );
    }
}
