//! Defines the core data models and database queries for expenses.
//!
//! Every query is scoped to the user that owns the expense. An expense that
//! belongs to another user is treated exactly like one that does not exist.

use std::str::FromStr;

use rusqlite::{Connection, Row, params, types::Type};
use rust_decimal::Decimal;
use time::Date;

use crate::{Error, auth::UserID, database_id::ExpenseId};

// ============================================================================
// MODELS
// ============================================================================

/// A single dated spending record owned by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The user that recorded the expense.
    pub user_id: UserID,
    /// A free-text label such as "Food" or "Transport".
    ///
    /// Labels are compared exactly, so "Food" and "food" are different categories.
    pub category: String,
    /// How much was spent.
    pub amount: Decimal,
    /// When the money was spent.
    pub date: Date,
    /// An optional note about what the expense was for.
    pub description: Option<String>,
}

/// The validated fields of an expense that has not been saved yet.
///
/// Forms are turned into a `NewExpense` with
/// [ExpenseForm::validate](crate::expense::ExpenseForm::validate).
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// A free-text label such as "Food" or "Transport".
    pub category: String,
    /// How much was spent.
    pub amount: Decimal,
    /// When the money was spent.
    pub date: Date,
    /// An optional note about what the expense was for.
    pub description: Option<String>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the expense table.
///
/// Amounts are stored as text so that decimal values survive the round trip exactly.
///
/// # Errors
/// Returns an error if the SQL query fails.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category TEXT NOT NULL,
            amount TEXT NOT NULL,
            date TEXT NOT NULL,
            description TEXT,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    // Speeds up fetching a user's expenses for the expenses page and dashboard.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, date)",
        (),
    )?;

    Ok(())
}

/// Create a new expense owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `user_id` does not refer to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_expense(
    user_id: UserID,
    expense: NewExpense,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection
        .prepare(
            "INSERT INTO expense (user_id, category, amount, date, description)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, user_id, category, amount, date, description",
        )?
        .query_row(
            params![
                user_id.as_i64(),
                expense.category,
                expense.amount.to_string(),
                expense.date,
                expense.description,
            ],
            map_expense_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })
}

/// Retrieve the expense `id` if it belongs to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the expense does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_expense(
    id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category, amount, date, description
             FROM expense
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_expense_row,
        )
        .map_err(Error::from)
}

/// Retrieve every expense owned by `user_id`, most recent first.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or a stored row is malformed.
pub fn get_expenses_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category, amount, date, description
             FROM expense
             WHERE user_id = :user_id
             ORDER BY date DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// The distinct categories `user_id` has used, sorted alphabetically.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_categories_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<String>, Error> {
    connection
        .prepare(
            "SELECT DISTINCT category FROM expense WHERE user_id = :user_id ORDER BY category",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], |row| row.get(0))?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Overwrite the fields of expense `id` with `expense`.
///
/// Only the targeted expense is changed, and only if `user_id` owns it.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingExpense] if the expense does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_expense(
    id: ExpenseId,
    user_id: UserID,
    expense: NewExpense,
    connection: &Connection,
) -> Result<Expense, Error> {
    let rows_affected = connection.execute(
        "UPDATE expense
         SET category = ?1, amount = ?2, date = ?3, description = ?4
         WHERE id = ?5 AND user_id = ?6",
        params![
            expense.category,
            expense.amount.to_string(),
            expense.date,
            expense.description,
            id,
            user_id.as_i64(),
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingExpense);
    }

    Ok(Expense {
        id,
        user_id,
        category: expense.category,
        amount: expense.amount,
        date: expense.date,
        description: expense.description,
    })
}

/// Delete expense `id` if `user_id` owns it.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingExpense] if the expense does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_expense(
    id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = :id AND user_id = :user_id",
        &[(":id", &id), (":user_id", &user_id.as_i64())],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

/// Map a database row to an [Expense].
///
/// The row must contain the columns `id, user_id, category, amount, date, description`
/// in that order.
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id = row.get(1)?;
    let category = row.get(2)?;
    let raw_amount: String = row.get(3)?;
    let date = row.get(4)?;
    let description = row.get(5)?;

    let amount = Decimal::from_str(&raw_amount).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(error))
    })?;

    Ok(Expense {
        id,
        user_id: UserID::new(raw_user_id),
        category,
        amount,
        date,
        description,
    })
}


#[cfg(test)]
mod store_tests {
    use rusqlite::Connection;
    use rust_decimal::dec;
    use time::macros::date;

    use crate::{
        Error, PasswordHash,
        auth::{UserID, create_user},
        db::initialize,
        expense::{
            NewExpense, create_expense, delete_expense, get_categories_for_user, get_expense,
            get_expenses_for_user, update_expense,
        },
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn must_create_user(username: &str, connection: &Connection) -> UserID {
        create_user(
            username,
            PasswordHash::new_unchecked("hunter2"),
            connection,
        )
        .expect("could not create test user")
        .id
    }

    fn new_expense(category: &str, amount: rust_decimal::Decimal, date: time::Date) -> NewExpense {
        NewExpense {
            category: category.to_owned(),
            amount,
            date,
            description: None,
        }
    }

    #[test]
    fn create_expense_returns_saved_expense() {
        let connection = get_test_connection();
        let user_id = must_create_user("alice", &connection);
        let want = NewExpense {
            category: "Food".to_owned(),
            amount: dec!(12.34),
            date: date!(2024 - 01 - 15),
            description: Some("Lunch".to_owned()),
        };

        let expense = create_expense(user_id, want.clone(), &connection).unwrap();

        assert_eq!(expense.user_id, user_id);
        assert_eq!(expense.category, want.category);
        assert_eq!(expense.amount, want.amount);
        assert_eq!(expense.date, want.date);
        assert_eq!(expense.description, want.description);
        assert_eq!(get_expense(expense.id, user_id, &connection), Ok(expense));
    }

    #[test]
    fn create_expense_preserves_exact_amount() {
        let connection = get_test_connection();
        let user_id = must_create_user("alice", &connection);

        let expense = create_expense(
            user_id,
            new_expense("Food", dec!(0.10), date!(2024 - 01 - 15)),
            &connection,
        )
        .unwrap();

        let got = get_expense(expense.id, user_id, &connection).unwrap();
        assert_eq!(got.amount, dec!(0.10));
        assert_eq!(got.amount.to_string(), "0.10");
    }

    #[test]
    fn create_expense_fails_for_unknown_user() {
        let connection = get_test_connection();

        let result = create_expense(
            UserID::new(42),
            new_expense("Food", dec!(1), date!(2024 - 01 - 15)),
            &connection,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_expense_hides_other_users_expenses() {
        let connection = get_test_connection();
        let alice = must_create_user("alice", &connection);
        let bob = must_create_user("bob", &connection);
        let expense = create_expense(
            alice,
            new_expense("Food", dec!(10), date!(2024 - 01 - 15)),
            &connection,
        )
        .unwrap();

        assert_eq!(get_expense(expense.id, bob, &connection), Err(Error::NotFound));
    }

    #[test]
    fn get_expenses_for_user_only_returns_own_expenses() {
        let connection = get_test_connection();
        let alice = must_create_user("alice", &connection);
        let bob = must_create_user("bob", &connection);
        let older = create_expense(
            alice,
            new_expense("Food", dec!(10), date!(2024 - 01 - 15)),
            &connection,
        )
        .unwrap();
        let newer = create_expense(
            alice,
            new_expense("Transport", dec!(20), date!(2024 - 02 - 01)),
            &connection,
        )
        .unwrap();
        create_expense(
            bob,
            new_expense("Food", dec!(99), date!(2024 - 01 - 20)),
            &connection,
        )
        .unwrap();

        let got = get_expenses_for_user(alice, &connection).unwrap();

        assert_eq!(got, vec![newer, older]);
    }

    #[test]
    fn update_expense_changes_only_target() {
        let connection = get_test_connection();
        let user_id = must_create_user("alice", &connection);
        let target = create_expense(
            user_id,
            new_expense("Food", dec!(10), date!(2024 - 01 - 15)),
            &connection,
        )
        .unwrap();
        let untouched = create_expense(
            user_id,
            new_expense("Transport", dec!(20), date!(2024 - 01 - 16)),
            &connection,
        )
        .unwrap();
        let update = NewExpense {
            category: "Groceries".to_owned(),
            amount: dec!(15.50),
            date: date!(2024 - 01 - 17),
            description: Some("Weekly shop".to_owned()),
        };

        let updated = update_expense(target.id, user_id, update.clone(), &connection).unwrap();

        assert_eq!(updated.category, update.category);
        assert_eq!(get_expense(target.id, user_id, &connection), Ok(updated));
        assert_eq!(get_expense(untouched.id, user_id, &connection), Ok(untouched));
    }

    #[test]
    fn update_expense_rejects_other_users() {
        let connection = get_test_connection();
        let alice = must_create_user("alice", &connection);
        let bob = must_create_user("bob", &connection);
        let expense = create_expense(
            alice,
            new_expense("Food", dec!(10), date!(2024 - 01 - 15)),
            &connection,
        )
        .unwrap();

        let result = update_expense(
            expense.id,
            bob,
            new_expense("Stolen", dec!(1), date!(2024 - 01 - 15)),
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingExpense));
        assert_eq!(get_expense(expense.id, alice, &connection), Ok(expense));
    }

    #[test]
    fn delete_expense_removes_expense() {
        let connection = get_test_connection();
        let user_id = must_create_user("alice", &connection);
        let expense = create_expense(
            user_id,
            new_expense("Food", dec!(10), date!(2024 - 01 - 15)),
            &connection,
        )
        .unwrap();

        delete_expense(expense.id, user_id, &connection).unwrap();

        assert_eq!(
            get_expense(expense.id, user_id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_expense_leaves_store_unchanged_when_missing_or_not_owned() {
        let connection = get_test_connection();
        let alice = must_create_user("alice", &connection);
        let bob = must_create_user("bob", &connection);
        let expense = create_expense(
            alice,
            new_expense("Food", dec!(10), date!(2024 - 01 - 15)),
            &connection,
        )
        .unwrap();

        assert_eq!(
            delete_expense(expense.id, bob, &connection),
            Err(Error::DeleteMissingExpense)
        );
        assert_eq!(
            delete_expense(expense.id + 100, alice, &connection),
            Err(Error::DeleteMissingExpense)
        );
        assert_eq!(get_expenses_for_user(alice, &connection), Ok(vec![expense]));
    }

    #[test]
    fn get_categories_for_user_is_distinct_and_case_sensitive() {
        let connection = get_test_connection();
        let alice = must_create_user("alice", &connection);
        let bob = must_create_user("bob", &connection);
        for category in ["Food", "food", "Food", "Transport"] {
            create_expense(
                alice,
                new_expense(category, dec!(1), date!(2024 - 01 - 15)),
                &connection,
            )
            .unwrap();
        }
        create_expense(
            bob,
            new_expense("Rent", dec!(1), date!(2024 - 01 - 15)),
            &connection,
        )
        .unwrap();

        let got = get_categories_for_user(alice, &connection).unwrap();

        assert_eq!(got, vec!["Food", "Transport", "food"]);
    }
}
