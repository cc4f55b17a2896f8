//! Chart generation for the dashboard.
//!
//! This module builds ECharts options for two charts:
//! - **Monthly Spending**: a bar chart of the total spent in each month
//! - **Spending by Category**: a pie chart of each category's share of the total
//!
//! Charts only use string formatters so that their options serialize to plain
//! JSON, which is what gets written to the chart artifacts.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    datatype::DataPointItem,
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, Label, Tooltip, Trigger},
    series::{Pie, bar},
};
use maud::{Markup, PreEscaped, html};
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{
    dashboard::{
        aggregation::{CategoryTotal, MonthlyTotal},
        artifacts::ChartKind,
    },
    html::HeadElement,
};

/// The label shown on each slice of the category chart.
const PERCENTAGE_LABEL_FORMAT: &str = "{b}: {d}%";

/// The HTML container for a chart and the URL its options are loaded from.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// Where the browser fetches the chart artifact from.
    pub url: String,
}

impl DashboardChart {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            id: kind.element_id(),
            url: kind.url(),
        }
    }
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        data-chart-url=(chart.url)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript that loads each chart's options from its artifact
/// URL and draws it with ECharts, with dark mode support and responsive resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);

                    fetch("{}", {{ credentials: "same-origin" }})
                        .then((response) => response.json())
                        .then((option) => chart.setOption(option));

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// A bar chart with one bar per month, oldest month on the left.
pub fn monthly_spending_chart(monthly_totals: &[MonthlyTotal]) -> Chart {
    let labels = monthly_totals
        .iter()
        .map(|month| month.month.clone())
        .collect::<Vec<_>>();
    let values = monthly_totals
        .iter()
        .map(|month| decimal_to_chart_value(month.total))
        .collect::<Vec<_>>();

    Chart::new()
        .title(Title::new().text("Monthly Spending"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter("${value}")),
        )
        .series(bar::Bar::new().name("Spending").data(values))
}

/// A pie chart showing each category's share of the total, labelled with percentages.
///
/// Returns `None` when there are no categories, since there is nothing to draw.
pub fn category_spending_chart(category_totals: &[CategoryTotal]) -> Option<Chart> {
    if category_totals.is_empty() {
        return None;
    }

    let data = category_totals
        .iter()
        .map(|category| {
            DataPointItem::new(decimal_to_chart_value(category.total))
                .name(category.category.clone())
        })
        .collect::<Vec<_>>();

    let chart = Chart::new()
        .title(Title::new().text("Spending by Category"))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().top("bottom"))
        .series(
            Pie::new()
                .name("Spending")
                .radius(vec!["35%", "65%"])
                .label(Label::new().show(true).formatter(PERCENTAGE_LABEL_FORMAT))
                .data(data),
        );

    Some(chart)
}

/// Convert an exact amount into the floating point value ECharts plots.
fn decimal_to_chart_value(amount: Decimal) -> f64 {
    amount.round_dp(2).to_f64().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;
    use serde_json::Value;

    use crate::dashboard::{
        aggregation::{CategoryTotal, MonthlyTotal},
        charts::{category_spending_chart, monthly_spending_chart},
    };

    fn monthly_totals() -> Vec<MonthlyTotal> {
        vec![
            MonthlyTotal {
                month: "2024-01".to_owned(),
                total: dec!(15),
            },
            MonthlyTotal {
                month: "2024-02".to_owned(),
                total: dec!(20.50),
            },
        ]
    }

    fn category_totals() -> Vec<CategoryTotal> {
        vec![
            CategoryTotal {
                category: "Food".to_owned(),
                total: dec!(15),
            },
            CategoryTotal {
                category: "Transport".to_owned(),
                total: dec!(20),
            },
        ]
    }

    #[test]
    fn monthly_chart_has_month_labels_and_totals() {
        let chart = monthly_spending_chart(&monthly_totals());
        let options: Value = serde_json::from_str(&chart.to_string())
            .expect("monthly chart options should be valid JSON");

        let x_axis = &options["xAxis"];
        let labels = x_axis
            .get("data")
            .or_else(|| x_axis.get(0).and_then(|axis| axis.get("data")))
            .expect("x axis should have data");
        assert_eq!(labels, &serde_json::json!(["2024-01", "2024-02"]));

        let series = options["series"].get(0).unwrap_or(&options["series"]);
        assert_eq!(series["type"], "bar");
        assert_eq!(series["data"], serde_json::json!([15.0, 20.5]));
    }

    #[test]
    fn category_chart_is_pie_with_percentage_labels() {
        let chart = category_spending_chart(&category_totals()).expect("want a category chart");
        let options: Value = serde_json::from_str(&chart.to_string())
            .expect("category chart options should be valid JSON");

        let series = options["series"].get(0).unwrap_or(&options["series"]);
        assert_eq!(series["type"], "pie");
        assert_eq!(series["label"]["formatter"], "{b}: {d}%");
        let names = series["data"]
            .as_array()
            .expect("pie data should be an array")
            .iter()
            .map(|item| item["name"].as_str().unwrap_or_default().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Food", "Transport"]);
    }

    #[test]
    fn no_category_chart_without_categories() {
        assert!(category_spending_chart(&[]).is_none());
    }

    #[test]
    fn charts_are_deterministic() {
        assert_eq!(
            monthly_spending_chart(&monthly_totals()).to_string(),
            monthly_spending_chart(&monthly_totals()).to_string()
        );
        assert_eq!(
            category_spending_chart(&category_totals()).map(|chart| chart.to_string()),
            category_spending_chart(&category_totals()).map(|chart| chart.to_string())
        );
    }
}
