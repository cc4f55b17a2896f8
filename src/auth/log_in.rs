//! The log-in page and the endpoint its form posts to.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        User, get_user_by_username, invalidate_auth_cookie, redirect::normalize_redirect_url,
        set_auth_cookie,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, LINK_STYLE, base, loading_spinner, log_in_register, password_input,
        username_input,
    },
    timezone::get_local_offset,
};

/// Session length when "Keep me logged in" is ticked.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// Shown for an unknown username and for a wrong password alike, so the
/// form does not reveal which usernames are registered.
pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect username or password.";

const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

/// The state needed to log a user in.
#[derive(Debug, Clone)]
pub struct LoginState {
    pub cookie_key: Key,
    /// Session length when "Keep me logged in" is not ticked.
    pub cookie_duration: Duration,
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// What the log-in form submits.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    pub username: String,
    /// Checked against the stored hash, never stored.
    pub password: String,
    /// Set to any value when the checkbox is ticked, missing otherwise.
    pub remember_me: Option<String>,
    /// Where to send the user once they are logged in.
    pub redirect_url: Option<String>,
}

fn log_in_form(username: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#username, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (username_input(username, None))
            (password_input("", 0, error_message))

            div class="flex items-center gap-x-3"
            {
                input type="checkbox" name="remember_me" id="remember_me" class="rounded-xs";
                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "New here? "
                a href=(endpoints::REGISTER_VIEW) class=(LINK_STYLE) { "Create an account" }
            }
        }
    }
}

/// Keep `raw_url` only if it points back into this app.
fn local_redirect_url(raw_url: Option<&str>) -> Option<String> {
    let raw_url = raw_url?;
    let redirect_url = normalize_redirect_url(raw_url);

    if redirect_url.is_none() {
        tracing::warn!("Ignoring redirect URL {raw_url:?}");
    }

    redirect_url
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = local_redirect_url(query.redirect_url.as_deref());
    let form = log_in_form("", None, redirect_url.as_deref());

    base("Log In", &[], &log_in_register("Log in to your account", &form)).into_response()
}

/// Why a log-in attempt was turned away.
enum LogInFailure {
    InvalidCredentials,
    Internal,
}

impl LogInFailure {
    fn message(&self) -> &'static str {
        match self {
            LogInFailure::InvalidCredentials => INVALID_CREDENTIALS_ERROR_MSG,
            LogInFailure::Internal => INTERNAL_ERROR_MSG,
        }
    }
}

fn check_credentials(
    username: &str,
    password: &str,
    db_connection: &Mutex<Connection>,
) -> Result<User, LogInFailure> {
    let user = {
        let connection = db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            LogInFailure::Internal
        })?;

        get_user_by_username(username, &connection)
    };

    let user = match user {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(LogInFailure::InvalidCredentials),
        Err(error) => {
            tracing::error!("could not look up user {username:?}: {error}");
            return Err(LogInFailure::Internal);
        }
    };

    match user.password_hash.verify(password) {
        Ok(true) => Ok(user),
        Ok(false) => Err(LogInFailure::InvalidCredentials),
        Err(error) => {
            tracing::error!("could not verify the password of user {}: {error}", user.id);
            Err(LogInFailure::Internal)
        }
    }
}

/// Start a session for the user in the log-in form.
///
/// On success the session cookie is set and HTMX is sent to the form's
/// redirect URL, or the dashboard. On failure the form is sent back with
/// the reason.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(log_in_data): Form<LogInData>,
) -> Response {
    let redirect_url = local_redirect_url(log_in_data.redirect_url.as_deref());

    let user = match check_credentials(
        &log_in_data.username,
        &log_in_data.password,
        &state.db_connection,
    ) {
        Ok(user) => user,
        Err(failure) => {
            let message = failure.message();
            return log_in_form(&log_in_data.username, Some(message), redirect_url.as_deref())
                .into_response();
        }
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let session_length = match log_in_data.remember_me {
        Some(_) => REMEMBER_ME_COOKIE_DURATION,
        None => state.cookie_duration,
    };

    match set_auth_cookie(jar.clone(), user.id, session_length, local_offset) {
        Ok(jar) => {
            tracing::info!("User {} logged in", user.id);
            let redirect_url = redirect_url.unwrap_or_else(|| endpoints::DASHBOARD_VIEW.to_owned());

            (StatusCode::SEE_OTHER, HxRedirect(redirect_url), jar).into_response()
        }
        Err(error) => {
            tracing::error!("could not set the session cookie for user {}: {error}", user.id);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod log_in_page_tests {
    use axum::{extract::Query, response::Response};
    use scraper::{Html, Selector};

    use crate::{
        auth::log_in::{RedirectQuery, get_log_in_page},
        endpoints,
        test_utils::{
            assert_content_type, assert_status_ok, assert_valid_html, must_get_form,
            parse_html_document,
        },
    };

    async fn log_in_page(redirect_url: Option<&str>) -> Response {
        get_log_in_page(Query(RedirectQuery {
            redirect_url: redirect_url.map(str::to_owned),
        }))
        .await
    }

    fn redirect_inputs(document: &Html) -> Vec<String> {
        let selector = Selector::parse("input[name=redirect_url]").unwrap();

        document
            .select(&selector)
            .filter_map(|input| input.value().attr("value").map(str::to_owned))
            .collect()
    }

    #[tokio::test]
    async fn log_in_page_displays_form() {
        let response = log_in_page(None).await;

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_eq!(form.value().attr("hx-post"), Some(endpoints::LOG_IN_API));
        for selector in [
            "input[type=text][name=username]",
            "input[type=password][name=password]",
            "input[type=checkbox][name=remember_me]",
            "button[type=submit]",
            "a[href=\"/register\"]",
        ] {
            let selector = Selector::parse(selector).unwrap();
            assert_eq!(form.select(&selector).count(), 1, "want one {selector:?}");
        }
    }

    #[tokio::test]
    async fn log_in_page_keeps_local_redirect_url() {
        let document = parse_html_document(log_in_page(Some("/expenses/3/edit")).await).await;

        assert_eq!(redirect_inputs(&document), vec!["/expenses/3/edit"]);
    }

    #[tokio::test]
    async fn log_in_page_drops_offsite_redirect_url() {
        let document = parse_html_document(log_in_page(Some("https://example.com")).await).await;

        assert!(redirect_inputs(&document).is_empty());
    }
}

#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::post};
    use axum_htmx::HX_REDIRECT;
    use axum_test::{TestResponse, TestServer};
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::{Duration, OffsetDateTime};

    use crate::{
        app_state::create_cookie_key,
        auth::{
            COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, PasswordHash, ValidatedPassword, create_user,
            create_user_table,
            log_in::{
                INVALID_CREDENTIALS_ERROR_MSG, LoginState, REMEMBER_ME_COOKIE_DURATION,
                post_log_in,
            },
        },
        endpoints,
    };

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        create_user_table(&connection).unwrap();
        let password_hash =
            PasswordHash::new(ValidatedPassword::new_unchecked("test"), 4).unwrap();
        create_user("alice", password_hash, &connection).unwrap();

        let state = LoginState {
            cookie_key: create_cookie_key("foobar"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(post_log_in))
            .with_state(state);

        TestServer::new(app)
    }

    async fn log_in_as_alice(extra_fields: &[(&str, &str)]) -> TestResponse {
        let mut form = vec![("username", "alice"), ("password", "test")];
        form.extend_from_slice(extra_fields);

        get_test_server()
            .post(endpoints::LOG_IN_API)
            .form(&form)
            .await
    }

    #[track_caller]
    fn assert_session_lasts(response: &TestResponse, duration: Duration) {
        let expires = response.cookie(COOKIE_TOKEN).expires_datetime().unwrap();
        let want = OffsetDateTime::now_utc() + duration;

        assert!(
            (expires - want).abs() < Duration::seconds(2),
            "session expires at {expires}, want about {want}"
        );
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let response = log_in_as_alice(&[]).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(HX_REDIRECT), endpoints::DASHBOARD_VIEW);
        assert_session_lasts(&response, DEFAULT_COOKIE_DURATION);
    }

    #[tokio::test]
    async fn remember_me_extends_session() {
        let response = log_in_as_alice(&[("remember_me", "on")]).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_session_lasts(&response, REMEMBER_ME_COOKIE_DURATION);
    }

    #[tokio::test]
    async fn log_in_follows_local_redirect_url_only() {
        let cases = [
            ("/expenses/new", "/expenses/new"),
            ("https://example.com", endpoints::DASHBOARD_VIEW),
        ];

        for (redirect_url, want) in cases {
            let response = log_in_as_alice(&[("redirect_url", redirect_url)]).await;

            assert_eq!(response.header(HX_REDIRECT), want);
        }
    }

    #[tokio::test]
    async fn log_in_fails_with_missing_fields() {
        get_test_server()
            .post(endpoints::LOG_IN_API)
            .form(&[("password", "test")])
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_get_same_message() {
        let server = get_test_server();

        for (username, password) in [("alice", "wrongpassword"), ("mallory", "test")] {
            let response = server
                .post(endpoints::LOG_IN_API)
                .form(&[("username", username), ("password", password)])
                .await;

            response.assert_status_ok();
            assert!(response.maybe_cookie(COOKIE_TOKEN).is_none());
            let fragment = Html::parse_fragment(&response.text());
            let error_selector = Selector::parse("p.text-red-500").unwrap();
            let error = fragment
                .select(&error_selector)
                .next()
                .expect("form should show an error");
            assert_eq!(
                error.text().collect::<String>().trim(),
                INVALID_CREDENTIALS_ERROR_MSG
            );
        }
    }
}
