//! Aggregation of a user's expenses into monthly and category totals.
//!
//! Totals are computed with exact decimal arithmetic, so the monthly totals,
//! the category totals and the raw expense amounts always sum to the same value.
//! A sum that does not fit in a [Decimal] is reported as [Error::AmountOverflow].

use std::{collections::BTreeMap, sync::Mutex};

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    Error,
    auth::UserID,
    expense::{Expense, get_expenses_for_user},
};

/// The total amount spent in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyTotal {
    /// The month formatted as `YYYY-MM`, e.g. "2024-01".
    pub month: String,
    /// The sum of the amounts of the expenses dated in `month`.
    pub total: Decimal,
}

/// The total amount spent in one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    /// The category label exactly as it was entered.
    pub category: String,
    /// The sum of the amounts of the expenses with `category`.
    pub total: Decimal,
}

/// Both aggregate views of a user's expenses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpendingSummary {
    /// One entry per month with expenses, oldest month first.
    pub monthly_totals: Vec<MonthlyTotal>,
    /// One entry per category, sorted by category label.
    pub category_totals: Vec<CategoryTotal>,
    /// The sum of every expense in the summary.
    pub total: Decimal,
}

impl SpendingSummary {
    /// Whether there were no expenses to summarise.
    pub fn is_empty(&self) -> bool {
        self.monthly_totals.is_empty() && self.category_totals.is_empty()
    }
}

fn add_amount(total: &mut Decimal, amount: Decimal) -> Result<(), Error> {
    *total = total.checked_add(amount).ok_or(Error::AmountOverflow)?;

    Ok(())
}

/// Sum `expenses` by calendar month.
///
/// Returns one entry per distinct month in ascending order. Months without
/// expenses are not included.
///
/// # Errors
/// Returns [Error::AmountOverflow] if a month's total is too large for a [Decimal].
pub fn aggregate_by_month(expenses: &[Expense]) -> Result<Vec<MonthlyTotal>, Error> {
    let mut totals: BTreeMap<(i32, u8), Decimal> = BTreeMap::new();

    for expense in expenses {
        let month = (expense.date.year(), u8::from(expense.date.month()));
        add_amount(totals.entry(month).or_default(), expense.amount)?;
    }

    let monthly_totals = totals
        .into_iter()
        .map(|((year, month), total)| MonthlyTotal {
            month: format!("{year:04}-{month:02}"),
            total,
        })
        .collect();

    Ok(monthly_totals)
}

/// Sum `expenses` by category.
///
/// Categories are compared exactly, so "Food" and "food " are summed separately.
/// The result is sorted by category label.
///
/// # Errors
/// Returns [Error::AmountOverflow] if a category's total is too large for a [Decimal].
pub fn aggregate_by_category(expenses: &[Expense]) -> Result<Vec<CategoryTotal>, Error> {
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();

    for expense in expenses {
        add_amount(totals.entry(expense.category.as_str()).or_default(), expense.amount)?;
    }

    let category_totals = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_owned(),
            total,
        })
        .collect();

    Ok(category_totals)
}

/// Compute the monthly totals, the category totals and the overall total for `expenses`.
///
/// # Errors
/// Returns [Error::AmountOverflow] if any of the totals is too large for a [Decimal].
pub fn summarise(expenses: &[Expense]) -> Result<SpendingSummary, Error> {
    let mut total = Decimal::ZERO;

    for expense in expenses {
        add_amount(&mut total, expense.amount)?;
    }

    Ok(SpendingSummary {
        monthly_totals: aggregate_by_month(expenses)?,
        category_totals: aggregate_by_category(expenses)?,
        total,
    })
}

/// Fetch the expenses owned by `user_id` and summarise them.
///
/// The database lock is only held while the expenses are read.
///
/// # Errors
/// Returns:
/// - [Error::DatabaseLockError] if the database lock could not be acquired,
/// - any error from reading the expenses unchanged,
/// - [Error::AmountOverflow] if the totals are too large to compute.
pub fn get_spending_summary(
    user_id: UserID,
    db_connection: &Mutex<Connection>,
) -> Result<SpendingSummary, Error> {
    let expenses = {
        let connection = db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_expenses_for_user(user_id, &connection)?
    };

    summarise(&expenses)
}
