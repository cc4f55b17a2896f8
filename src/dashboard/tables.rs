//! Table views for the dashboard totals.

use maud::{Markup, html};
use rust_decimal::Decimal;

use crate::{
    dashboard::aggregation::{CategoryTotal, MonthlyTotal},
    html::{TABLE_CELL_STYLE, TABLE_ROW_STYLE, format_currency},
};

const TABLE_HEADER_ROW_STYLE: &str =
    "text-xs text-gray-900 uppercase bg-gray-100 dark:bg-gray-700 dark:text-gray-400";
const TABLE_HEADER_CELL_STYLE: &str = "px-3 py-3 font-semibold";
const TABLE_LABEL_CELL_STYLE: &str = "px-3 py-4 font-medium text-gray-900 dark:text-white";
const TABLE_AMOUNT_CELL_STYLE: &str = "text-right whitespace-nowrap";
const TABLE_TOTAL_CELL_STYLE: &str = "text-right whitespace-nowrap font-bold";

/// Renders a table with the total spent in each month, followed by the overall `total`.
pub(super) fn monthly_totals_table(monthly_totals: &[MonthlyTotal], total: Decimal) -> Markup {
    if monthly_totals.is_empty() {
        return html! {};
    }

    html! {
        div {
            h3 class="text-xl font-semibold mb-4" { "Monthly Totals" }

            div
                id="monthly-totals-table"
                class="overflow-x-auto rounded-lg shadow"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    thead class=(TABLE_HEADER_ROW_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_HEADER_CELL_STYLE) { "Month" }
                            th scope="col" class={(TABLE_HEADER_CELL_STYLE) " text-right"} {
                                "Total"
                            }
                        }
                    }
                    tbody {
                        @for month in monthly_totals {
                            tr class=(TABLE_ROW_STYLE) {
                                th scope="row" class=(TABLE_LABEL_CELL_STYLE) { (month.month) }
                                td class={(TABLE_CELL_STYLE) " " (TABLE_AMOUNT_CELL_STYLE)} {
                                    (format_currency(month.total))
                                }
                            }
                        }

                        tr class=(TABLE_ROW_STYLE) {
                            th scope="row" class={(TABLE_LABEL_CELL_STYLE) " font-bold"} {
                                "Total"
                            }
                            td class={(TABLE_CELL_STYLE) " " (TABLE_TOTAL_CELL_STYLE)} {
                                (format_currency(total))
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders a table with the total for each category and its share of `total`.
pub(super) fn category_totals_table(category_totals: &[CategoryTotal], total: Decimal) -> Markup {
    if category_totals.is_empty() {
        return html! {};
    }

    html! {
        div {
            h3 class="text-xl font-semibold mb-4" { "Category Totals" }

            div
                id="category-totals-table"
                class="overflow-x-auto rounded-lg shadow"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    thead class=(TABLE_HEADER_ROW_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_HEADER_CELL_STYLE) { "Category" }
                            th scope="col" class={(TABLE_HEADER_CELL_STYLE) " text-right"} {
                                "Total"
                            }
                            th scope="col" class={(TABLE_HEADER_CELL_STYLE) " text-right"} {
                                "Share"
                            }
                        }
                    }
                    tbody {
                        @for category in category_totals {
                            tr class=(TABLE_ROW_STYLE) {
                                th scope="row" class=(TABLE_LABEL_CELL_STYLE) {
                                    (category.category)
                                }
                                td class={(TABLE_CELL_STYLE) " " (TABLE_AMOUNT_CELL_STYLE)} {
                                    (format_currency(category.total))
                                }
                                td class={(TABLE_CELL_STYLE) " " (TABLE_AMOUNT_CELL_STYLE)} {
                                    (format_share(category.total, total))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Format `part` as a percentage of `whole` with one decimal place, e.g. "42.9%".
fn format_share(part: Decimal, whole: Decimal) -> String {
    if whole.is_zero() {
        return "-".to_owned();
    }

    match part
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(whole))
    {
        Some(share) => format!("{:.1}%", share.round_dp(1)),
        None => "-".to_owned(),
    }
}
