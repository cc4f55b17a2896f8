//! Defines the route handler for the page for editing an existing expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::ExpenseId,
    endpoints::{self, format_endpoint},
    expense::{
        Expense,
        form::{ExpenseFormDefaults, expense_form_fields},
        get_categories_for_user, get_expense,
    },
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, loading_spinner},
    navigation::NavBar,
};

fn edit_expense_view(expense: &Expense, known_categories: &[String]) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_EXPENSE_VIEW).into_html();
    let spinner = loading_spinner();
    let update_expense_route = format_endpoint(endpoints::EXPENSE, expense.id);
    let fields = expense_form_fields(
        &ExpenseFormDefaults {
            category: Some(&expense.category),
            amount: Some(expense.amount),
            date: expense.date,
            description: expense.description.as_deref(),
        },
        known_categories,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_expense_route)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Expense" }

                (fields)

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Save Expense"
                }
            }
        }
    };

    base("Edit Expense", &[], &content)
}

/// The state needed for the edit expense page.
#[derive(Debug, Clone)]
pub struct EditExpensePageState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditExpensePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the form for editing one of the user's expenses.
///
/// Responds with the 404 page if the expense does not exist or belongs to another user.
pub async fn get_edit_expense_page(
    State(state): State<EditExpensePageState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<Response, Error> {
    let (expense, known_categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let expense = get_expense(expense_id, user_id, &connection)?;
        let known_categories = get_categories_for_user(user_id, &connection)?;

        (expense, known_categories)
    };

    Ok(edit_expense_view(&expense, &known_categories).into_response())
}
