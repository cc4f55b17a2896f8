//! Persisting the dashboard charts as per-user artifacts.
//!
//! Each user gets their own directory under the chart directory, e.g.
//! `charts/user-1/monthly_spending.json`. The files hold the ECharts options
//! for the chart and are served back to the owner by the chart endpoint.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use charming::Chart;

use crate::{
    Error,
    auth::UserID,
    dashboard::{
        aggregation::SpendingSummary,
        charts::{category_spending_chart, monthly_spending_chart},
    },
    endpoints,
};

/// The charts that are written as artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// The bar chart of spending per month.
    MonthlySpending,
    /// The pie chart of spending per category.
    CategorySpending,
}

impl ChartKind {
    /// The name used for the chart in URLs.
    pub fn name(self) -> &'static str {
        match self {
            ChartKind::MonthlySpending => "monthly_spending",
            ChartKind::CategorySpending => "category_spending",
        }
    }

    /// Look up a chart by the name used in URLs.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "monthly_spending" => Some(ChartKind::MonthlySpending),
            "category_spending" => Some(ChartKind::CategorySpending),
            _ => None,
        }
    }

    /// The file name of the chart's artifact.
    pub fn file_name(self) -> String {
        format!("{}.json", self.name())
    }

    /// The URL the chart's artifact is served from.
    pub fn url(self) -> String {
        endpoints::CHART.replace("{chart_name}", self.name())
    }

    /// The ID of the HTML element the chart is drawn in.
    pub fn element_id(self) -> &'static str {
        match self {
            ChartKind::MonthlySpending => "monthly-spending-chart",
            ChartKind::CategorySpending => "category-spending-chart",
        }
    }
}

/// Where the artifacts of one render were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartArtifacts {
    /// The monthly spending chart, always written.
    pub monthly_spending: PathBuf,
    /// The category chart, `None` when the user has no categories to chart.
    pub category_spending: Option<PathBuf>,
}

/// Writes the spending charts for a user to the chart directory.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    chart_dir: PathBuf,
}

impl ChartRenderer {
    /// Create a renderer that writes artifacts under `chart_dir`.
    ///
    /// The directory is created on the first render if it does not exist.
    pub fn new(chart_dir: impl Into<PathBuf>) -> Self {
        Self {
            chart_dir: chart_dir.into(),
        }
    }

    /// The path of the `kind` artifact for `user_id`.
    pub fn artifact_path(&self, user_id: UserID, kind: ChartKind) -> PathBuf {
        self.user_dir(user_id).join(kind.file_name())
    }

    fn user_dir(&self, user_id: UserID) -> PathBuf {
        self.chart_dir.join(format!("user-{user_id}"))
    }

    /// Build the charts for `summary` and write them as the artifacts of `user_id`.
    ///
    /// The monthly chart is always written. The category chart is only written
    /// when `summary` has categories, otherwise any category artifact left from
    /// an earlier render is removed and [ChartArtifacts::category_spending] is `None`.
    ///
    /// # Errors
    /// Returns [Error::ChartWriteError] if an artifact could not be written or removed.
    pub fn render(
        &self,
        user_id: UserID,
        summary: &SpendingSummary,
    ) -> Result<ChartArtifacts, Error> {
        let user_dir = self.user_dir(user_id);
        fs::create_dir_all(&user_dir).map_err(|error| chart_write_error(&user_dir, error))?;

        let monthly_spending = self.artifact_path(user_id, ChartKind::MonthlySpending);
        write_chart(&monthly_spending, &monthly_spending_chart(&summary.monthly_totals))?;

        let category_path = self.artifact_path(user_id, ChartKind::CategorySpending);
        let category_spending = match category_spending_chart(&summary.category_totals) {
            Some(chart) => {
                write_chart(&category_path, &chart)?;
                Some(category_path)
            }
            None => {
                remove_stale_artifact(&category_path)?;
                None
            }
        };

        tracing::debug!("Rendered charts for user {user_id} to {}", user_dir.display());

        Ok(ChartArtifacts {
            monthly_spending,
            category_spending,
        })
    }
}

/// Distinguishes the temporary files of renders running at the same time.
static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write `chart` next to `path` and then move it into place.
///
/// Readers of `path` see either the previous artifact or the new one, never
/// a partly written file.
fn write_chart(path: &Path, chart: &Chart) -> Result<(), Error> {
    let temp_path = temp_path_for(path);

    if let Err(error) = fs::write(&temp_path, chart.to_string()) {
        let _ = fs::remove_file(&temp_path);
        return Err(chart_write_error(&temp_path, error));
    }

    fs::rename(&temp_path, path).map_err(|error| {
        let _ = fs::remove_file(&temp_path);
        chart_write_error(path, error)
    })
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let count = TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed);

    path.with_file_name(format!(
        ".{file_name}.tmp-{}-{count}",
        std::process::id()
    ))
}

fn remove_stale_artifact(path: &Path) -> Result<(), Error> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(chart_write_error(path, error)),
    }
}

fn chart_write_error(path: &Path, error: io::Error) -> Error {
    tracing::error!("Could not write chart artifact {}: {error}", path.display());
    Error::ChartWriteError(format!("{}: {error}", path.display()))
}
