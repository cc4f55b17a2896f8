//! Route paths. Paths with an `{expense_id}` style parameter are filled in
//! with [format_endpoint].

pub const ROOT: &str = "/";
pub const DASHBOARD_VIEW: &str = "/dashboard";
pub const EXPENSES_VIEW: &str = "/expenses";
pub const NEW_EXPENSE_VIEW: &str = "/expenses/new";
pub const EDIT_EXPENSE_VIEW: &str = "/expenses/{expense_id}/edit";
pub const REGISTER_VIEW: &str = "/register";
pub const LOG_IN_VIEW: &str = "/log_in";
/// Where HTMX requests are sent after an unrecoverable error.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
pub const STATIC: &str = "/static";

pub const LOG_IN_API: &str = "/api/log_in";
pub const LOG_OUT: &str = "/api/log_out";
/// Registration form target.
pub const USERS: &str = "/api/users";
/// Create an expense.
pub const EXPENSES_API: &str = "/api/expenses";
/// Update or delete one expense.
pub const EXPENSE: &str = "/api/expenses/{expense_id}";
/// One of the current user's chart artifacts, e.g. `/api/charts/monthly_spending`.
pub const CHART: &str = "/api/charts/{chart_name}";

/// Put `id` in place of the first `{...}` parameter of `endpoint_path`.
///
/// Paths without a parameter are returned unchanged. An unclosed `{` is
/// treated as running to the end of the path.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let rest = &endpoint_path[start..];
    let end = rest.find('}').map_or(endpoint_path.len(), |end| start + end + 1);

    format!("{}{id}{}", &endpoint_path[..start], &endpoint_path[end..])
}
