//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - The route handler for the dashboard page, which aggregates the user's
//!   expenses and renders the chart artifacts
//! - The route handler that serves a user's chart artifacts
//! - HTML view functions for rendering the dashboard UI

use std::{
    io,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{UserID, get_user_by_id},
    dashboard::{
        aggregation::{SpendingSummary, get_spending_summary},
        artifacts::{ChartArtifacts, ChartKind, ChartRenderer},
        charts::{DashboardChart, charts_script, charts_view},
        tables::{category_totals_table, monthly_totals_table},
    },
    endpoints,
    html::{HeadElement, LINK_STYLE, base, format_currency},
    navigation::NavBar,
    not_found::NotFoundError,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading the user's expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Writes the chart artifacts shown on the dashboard.
    pub chart_renderer: ChartRenderer,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            chart_renderer: state.chart_renderer.clone(),
        }
    }
}

/// The state needed for serving chart artifacts.
#[derive(Debug, Clone)]
pub struct ChartState {
    /// Knows where each user's chart artifacts live.
    pub chart_renderer: ChartRenderer,
}

impl FromRef<AppState> for ChartState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            chart_renderer: state.chart_renderer.clone(),
        }
    }
}

/// Display a page summarising the user's spending.
///
/// The user's expenses are aggregated and the chart artifacts are rewritten
/// on every visit, so the charts always reflect the latest expenses.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let username = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_user_by_id(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get user {user_id}: {error}"))?
            .username
    };

    let summary = get_spending_summary(user_id, &state.db_connection).inspect_err(|error| {
        tracing::error!("could not get spending summary for user {user_id}: {error}")
    })?;

    let artifacts = state.chart_renderer.render(user_id, &summary)?;
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    if summary.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar, &username).into_response());
    }

    let charts = dashboard_charts(&artifacts);

    Ok(dashboard_view(nav_bar, &username, &summary, &charts).into_response())
}

/// Serve one of the logged in user's chart artifacts as JSON.
///
/// Responds with 404 if the chart name is unknown or the artifact has not
/// been rendered, e.g. the category chart of a user without expenses.
pub async fn get_chart(
    State(state): State<ChartState>,
    Extension(user_id): Extension<UserID>,
    Path(chart_name): Path<String>,
) -> Response {
    let Some(kind) = ChartKind::from_name(&chart_name) else {
        tracing::debug!("Unknown chart {chart_name:?} requested by user {user_id}");
        return NotFoundError.into_response();
    };

    let path = state.chart_renderer.artifact_path(user_id, kind);

    match tokio::fs::read_to_string(&path).await {
        Ok(options) => (
            StatusCode::OK,
            [(CONTENT_TYPE, "application/json")],
            options,
        )
            .into_response(),
        Err(error) if error.kind() == io::ErrorKind::NotFound => NotFoundError.into_response(),
        Err(error) => {
            tracing::error!("Could not read chart artifact {}: {error}", path.display());
            Error::ChartReadError(error.to_string()).into_response()
        }
    }
}

/// The charts to show for the rendered `artifacts`.
///
/// The category chart is left out when no category artifact was written.
fn dashboard_charts(artifacts: &ChartArtifacts) -> Vec<DashboardChart> {
    let mut charts = vec![DashboardChart::new(ChartKind::MonthlySpending)];

    if artifacts.category_spending.is_some() {
        charts.push(DashboardChart::new(ChartKind::CategorySpending));
    }

    charts
}

/// Renders the dashboard page when the user has no expenses.
fn dashboard_no_data_view(nav_bar: NavBar<'_>, username: &str) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Hi " (username) ", charts will show up here once you add some expenses. "
                a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE) { "Add an expense" }
                " to get started."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the main dashboard page with charts and totals tables.
fn dashboard_view(
    nav_bar: NavBar<'_>,
    username: &str,
    summary: &SpendingSummary,
    charts: &[DashboardChart],
) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            header class="w-full mb-4"
            {
                h1 class="text-xl font-bold" { "Hi " (username) }
                p
                {
                    "You have spent " (format_currency(summary.total)) " in total."
                }
            }

            (charts_view(charts))

            div class="grid grid-cols-1 xl:grid-cols-2 gap-4 w-full"
            {
                (monthly_totals_table(&summary.monthly_totals, summary.total))
                (category_totals_table(&summary.category_totals, summary.total))
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(charts),
    ];

    base("Dashboard", &scripts, &content)
}
