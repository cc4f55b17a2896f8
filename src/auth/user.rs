//! The user table and the queries the log-in and registration flows need.

use std::fmt::Display;

use rusqlite::{Connection, Params};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::PasswordHash};

/// The ID of a registered user. Every expense is owned by one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserID,
    /// Unique, with surrounding whitespace removed.
    pub username: String,
    pub password_hash: PasswordHash,
}

pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Register `username` with `password_hash`.
///
/// # Errors
/// Returns:
/// - [Error::EmptyUsername] if `username` is blank,
/// - [Error::DuplicateUsername] if the trimmed `username` is taken,
/// - [Error::SqlError] for any other database error.
pub fn create_user(
    username: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let username = username.trim();

    if username.is_empty() {
        return Err(Error::EmptyUsername);
    }

    let insert_result = connection.execute(
        "INSERT INTO user (username, password) VALUES (?1, ?2)",
        (username, password_hash.as_ref()),
    );

    match insert_result {
        Ok(_) => Ok(User {
            id: UserID::new(connection.last_insert_rowid()),
            username: username.to_owned(),
            password_hash,
        }),
        Err(rusqlite::Error::SqliteFailure(sql_error, _))
            if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Err(Error::DuplicateUsername(username.to_owned()))
        }
        Err(error) => Err(error.into()),
    }
}

fn query_user(
    connection: &Connection,
    condition: &str,
    params: impl Params,
) -> Result<User, Error> {
    let sql = format!("SELECT id, username, password FROM user WHERE {condition}");

    connection
        .query_row(&sql, params, |row| {
            let password_hash: String = row.get(2)?;

            Ok(User {
                id: UserID::new(row.get(0)?),
                username: row.get(1)?,
                password_hash: PasswordHash::new_unchecked(&password_hash),
            })
        })
        .map_err(Error::from)
}

/// # Errors
/// Returns [Error::NotFound] if no user has the ID `user_id`.
pub fn get_user_by_id(user_id: UserID, db_connection: &Connection) -> Result<User, Error> {
    query_user(db_connection, "id = ?1", [user_id.as_i64()])
}

/// Look up a user by the name they log in with, ignoring surrounding whitespace.
///
/// # Errors
/// Returns [Error::NotFound] if no user has that username.
pub fn get_user_by_username(username: &str, db_connection: &Connection) -> Result<User, Error> {
    query_user(db_connection, "username = ?1", [username.trim()])
}

#[cfg(test)]
pub fn count_users(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user", [], |row| row.get(0))
        .map_err(Error::from)
}
