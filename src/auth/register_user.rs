//! The registration page and the endpoint its form posts to.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
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
    auth::{PasswordHash, ValidatedPassword, create_user, set_auth_cookie},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, base, credential_field,
        loading_spinner, log_in_register, password_input, username_input,
    },
    internal_server_error::get_internal_server_error_redirect,
    timezone::get_local_offset,
};

/// Checked by the browser before the form is sent. The server applies the
/// full strength check on top.
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

const BLANK_USERNAME_MSG: &str = "Enter a username.";

/// The state needed to register and log in a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    pub cookie_key: Key,
    pub cookie_duration: Duration,
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Default, Serialize, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Username,
    Password,
    ConfirmPassword,
}

/// A problem with one field of the registration form.
struct FieldError {
    field: Field,
    message: String,
}

impl FieldError {
    fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn registration_form(form: &RegisterForm, error: Option<&FieldError>) -> Markup {
    let message_for = |field: Field| {
        error
            .filter(|error| error.field == field)
            .map(|error| error.message.as_str())
    };
    let password_error = message_for(Field::Password);
    let confirm_error = message_for(Field::ConfirmPassword);

    let confirm_input = html! {
        input
            type="password"
            name="confirm_password"
            id="confirm-password"
            placeholder="••••••••"
            class=(FORM_TEXT_INPUT_STYLE)
            required
            minlength=(PASSWORD_INPUT_MIN_LENGTH)
            autofocus[confirm_error.is_some()];
    };

    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#username, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (username_input(&form.username, message_for(Field::Username)))
            (password_input(&form.password, PASSWORD_INPUT_MIN_LENGTH, password_error))
            (credential_field("confirm-password", "Confirm Password", confirm_input, confirm_error))

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already registered? "
                a href=(endpoints::LOG_IN_VIEW) class=(LINK_STYLE) { "Log in" }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let form = registration_form(&RegisterForm::default(), None);

    base("Register", &[], &log_in_register("Create Account", &form)).into_response()
}

/// Check the form fields in the order they appear on the page.
fn validate_registration(form: &RegisterForm) -> Result<ValidatedPassword, FieldError> {
    let username = form.username.trim();

    if username.is_empty() {
        return Err(FieldError::new(Field::Username, BLANK_USERNAME_MSG));
    }

    let password = ValidatedPassword::new(&form.password, &[username])
        .map_err(|error| FieldError::new(Field::Password, error.to_string()))?;

    if form.password != form.confirm_password {
        return Err(FieldError::new(
            Field::ConfirmPassword,
            "Passwords do not match",
        ));
    }

    Ok(password)
}

/// Create a user from the registration form, log them in and send them to
/// the dashboard. Problems with the form are shown next to the field.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let show_error = |error: FieldError| registration_form(&form, Some(&error)).into_response();

    let password = match validate_registration(&form) {
        Ok(password) => password,
        Err(error) => return show_error(error),
    };

    let password_hash = match PasswordHash::new(password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("could not hash password: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let created = match state.db_connection.lock() {
        Ok(connection) => create_user(&form.username, password_hash, &connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let user = match created {
        Ok(user) => user,
        Err(Error::DuplicateUsername(username)) => {
            return show_error(FieldError::new(
                Field::Username,
                format!("The username \"{username}\" is already taken, choose another one."),
            ));
        }
        Err(Error::EmptyUsername) => {
            return show_error(FieldError::new(Field::Username, BLANK_USERNAME_MSG));
        }
        Err(error) => {
            tracing::error!("could not create user: {error}");
            return get_internal_server_error_redirect();
        }
    };

    tracing::info!("Registered user {} ({})", user.id, user.username);

    match set_auth_cookie(jar, user.id, state.cookie_duration, local_offset) {
        Ok(jar) => {
            let dashboard = HxRedirect(endpoints::DASHBOARD_VIEW.to_owned());
            (StatusCode::SEE_OTHER, dashboard, jar).into_response()
        }
        Err(error) => {
            tracing::error!("could not set the session cookie for user {}: {error}", user.id);
            get_internal_server_error_redirect()
        }
    }
}


#[cfg(test)]
mod register_user_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::post};
    use axum_htmx::HX_REDIRECT;
    use axum_test::{TestResponse, TestServer};
    use rusqlite::Connection;
    use scraper::{Html, Selector};

    use crate::{
        app_state::create_cookie_key,
        auth::{
            COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, count_users, create_user_table,
            get_user_by_username,
            register_user::{RegistrationState, register_user},
        },
        endpoints,
    };

    const STRONG_PASSWORD: &str = "averysafeandsecurepassword";

    struct TestApp {
        server: TestServer,
        connection: Arc<Mutex<Connection>>,
    }

    impl TestApp {
        fn new() -> Self {
            let connection = Connection::open_in_memory().unwrap();
            create_user_table(&connection).unwrap();
            let connection = Arc::new(Mutex::new(connection));

            let state = RegistrationState {
                cookie_key: create_cookie_key("foobar"),
                cookie_duration: DEFAULT_COOKIE_DURATION,
                local_timezone: "Etc/UTC".to_owned(),
                db_connection: connection.clone(),
            };
            let app = Router::new()
                .route(endpoints::USERS, post(register_user))
                .with_state(state);

            Self {
                server: TestServer::new(app),
                connection,
            }
        }

        async fn register(&self, username: &str, password: &str, confirm: &str) -> TestResponse {
            self.server
                .post(endpoints::USERS)
                .form(&[
                    ("username", username),
                    ("password", password),
                    ("confirm_password", confirm),
                ])
                .await
        }

        fn user_count(&self) -> usize {
            count_users(&self.connection.lock().unwrap()).unwrap()
        }
    }

    #[track_caller]
    fn assert_field_error(response: &TestResponse, field_id: &str) {
        let fragment = Html::parse_fragment(&response.text());
        let selector = Selector::parse(&format!("input#{field_id} + p.text-red-500")).unwrap();

        assert_eq!(
            fragment.select(&selector).count(),
            1,
            "want an error message under #{field_id}, got {}",
            response.text()
        );
    }

    #[tokio::test]
    async fn register_creates_user_and_logs_in() {
        let app = TestApp::new();

        let response = app
            .register(" alice ", STRONG_PASSWORD, STRONG_PASSWORD)
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(HX_REDIRECT), endpoints::DASHBOARD_VIEW);
        assert!(response.maybe_cookie(COOKIE_TOKEN).is_some());
        let user = get_user_by_username("alice", &app.connection.lock().unwrap()).unwrap();
        assert!(user.password_hash.verify(STRONG_PASSWORD).unwrap());
    }

    #[tokio::test]
    async fn invalid_forms_are_rejected_next_to_the_field() {
        let cases = [
            ("   ", STRONG_PASSWORD, STRONG_PASSWORD, "username"),
            ("alice", "password", "password", "password"),
            (
                "alice",
                STRONG_PASSWORD,
                "averysafeandsecurepasswort",
                "confirm-password",
            ),
        ];

        for (username, password, confirm, field_id) in cases {
            let app = TestApp::new();

            let response = app.register(username, password, confirm).await;

            response.assert_status_ok();
            assert_field_error(&response, field_id);
            assert_eq!(app.user_count(), 0);
        }
    }

    #[tokio::test]
    async fn register_rejects_taken_username() {
        let app = TestApp::new();
        app.register("alice", STRONG_PASSWORD, STRONG_PASSWORD)
            .await
            .assert_status(StatusCode::SEE_OTHER);

        let response = app
            .register("alice", STRONG_PASSWORD, STRONG_PASSWORD)
            .await;

        response.assert_status_ok();
        assert_field_error(&response, "username");
        assert_eq!(app.user_count(), 1);
    }
}
