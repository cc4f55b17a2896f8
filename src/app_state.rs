//! Everything the handlers share. Each handler extracts only the part it
//! needs through a [FromRef] sub-state.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Error, auth::DEFAULT_COOKIE_DURATION, dashboard::ChartRenderer, db::initialize,
    timezone::get_local_offset,
};

/// The state shared by every route of the expense tracker.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Signs and encrypts the session cookie.
    pub cookie_key: Key,
    /// How long a session lasts after the latest request.
    pub cookie_duration: Duration,
    /// Canonical name of the server's timezone, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// Users and their expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Writes and locates each user's chart artifacts.
    pub chart_renderer: ChartRenderer,
}

impl AppState {
    /// Check the timezone, create any missing tables and wrap the connection
    /// for sharing between requests.
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezoneError] for an unknown `local_timezone`,
    /// or the error from creating the tables.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
        chart_renderer: ChartRenderer,
    ) -> Result<Self, Error> {
        get_local_offset(local_timezone)
            .ok_or_else(|| Error::InvalidTimezoneError(local_timezone.to_owned()))?;

        initialize(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection: Arc::new(Mutex::new(db_connection)),
            chart_renderer,
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Derive the cookie key from the server's `SECRET`.
pub fn create_cookie_key(secret: &str) -> Key {
    Key::from(&Sha512::digest(secret))
}
