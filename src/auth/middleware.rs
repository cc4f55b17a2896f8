//! Middleware that only lets requests with a live session through to the
//! expense pages and endpoints.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState,
    auth::{
        UserID,
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
    timezone::get_local_offset,
};

/// The state needed to check and refresh sessions.
#[derive(Clone)]
pub struct AuthState {
    /// Signs and encrypts the session cookie.
    pub cookie_key: Key,
    /// How long a session lasts after the latest authenticated request.
    pub cookie_duration: Duration,
    /// Canonical name of the server's timezone, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// How a request without a session is sent to the log-in page.
#[derive(Debug, Clone, Copy)]
enum LogInPrompt {
    /// A plain 303 redirect for full page loads.
    Redirect,
    /// An `HX-Redirect` header so HTMX navigates the whole page.
    HxRedirect,
}

impl LogInPrompt {
    fn respond(self, log_in_url: String) -> Response {
        match self {
            LogInPrompt::Redirect => Redirect::to(&log_in_url).into_response(),
            LogInPrompt::HxRedirect => (HxRedirect(log_in_url), StatusCode::OK).into_response(),
        }
    }
}

/// The log-in URL that returns the user to where they were after logging in.
fn log_in_url_for(request: &Request) -> String {
    build_log_in_redirect_url(request).unwrap_or_else(|| {
        tracing::warn!(
            "Could not work out where {} was requested from, returning to the dashboard \
            after log in",
            request.uri().path()
        );

        build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    })
}

/// Copy the refreshed session cookie onto `headers` unless the handler set
/// its own, e.g. when logging out.
fn attach_session_cookie(headers: &mut HeaderMap, jar: PrivateCookieJar) {
    if headers.contains_key(SET_COOKIE) {
        return;
    }

    let jar_response = jar.into_response();
    for cookie in jar_response.headers().get_all(SET_COOKIE) {
        headers.append(SET_COOKIE, cookie.to_owned());
    }
}

async fn guard(state: AuthState, request: Request, next: Next, prompt: LogInPrompt) -> Response {
    let log_in_url = log_in_url_for(&request);

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}, sending to log in", state.local_timezone);
        return prompt.respond(log_in_url);
    };

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Could not read cookies: {error:?}");
            return prompt.respond(log_in_url);
        }
    };
    let user_id: UserID = match get_token_from_cookies(&jar) {
        Ok(token) => token.user_id,
        Err(error) => {
            tracing::debug!("No valid session: {error}");
            return prompt.respond(log_in_url);
        }
    };

    parts.extensions.insert(user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    let refreshed =
        extend_auth_cookie_duration_if_needed(jar.clone(), state.cookie_duration, local_offset);
    let jar = refreshed.unwrap_or_else(|error| {
        tracing::error!("Could not extend session for user {user_id}: {error}");
        jar
    });

    let (mut parts, body) = response.into_parts();
    attach_session_cookie(&mut parts.headers, jar);

    Response::from_parts(parts, body)
}

/// Guards the pages. Handlers behind it get the user via `Extension<UserID>`.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard(state, request, next, LogInPrompt::Redirect).await
}

/// Guards the endpoints called by HTMX, see [auth_guard].
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, request, next, LogInPrompt::HxRedirect).await
}
