//! Decoding and rendering of the add/edit expense form.

use maud::{Markup, html};
use rust_decimal::{Decimal, dec};
use serde::Deserialize;
use time::{Date, macros::format_description};

use crate::{
    Error,
    expense::NewExpense,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

/// The largest number of decimal places allowed for an amount, i.e. whole cents.
const MAX_AMOUNT_DECIMAL_PLACES: u32 = 2;

/// The largest amount a single expense may have.
///
/// Keeps the sum of any realistic number of expenses far from [Decimal::MAX].
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// The raw form data submitted when creating or editing an expense.
///
/// Every field arrives as text and is checked by [ExpenseForm::validate]
/// before anything touches the database.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseForm {
    /// The category label.
    pub category: String,
    /// The amount as typed, e.g. "12.50".
    pub amount: String,
    /// The date in the format YYYY-MM-DD.
    pub date: String,
    /// Optional free text. A blank description is stored as no description.
    #[serde(default)]
    pub description: String,
}

impl ExpenseForm {
    /// Convert the submitted text into a typed [NewExpense].
    ///
    /// The category is kept exactly as entered, only blank categories are rejected.
    ///
    /// # Errors
    /// Returns:
    /// - [Error::EmptyCategory] if the category is empty or only whitespace,
    /// - [Error::InvalidAmount] if the amount is not a number, is not greater
    ///   than zero, is larger than [MAX_AMOUNT], or has more than two decimal places,
    /// - [Error::InvalidDate] if the date is not a valid YYYY-MM-DD date.
    pub fn validate(&self) -> Result<NewExpense, Error> {
        if self.category.trim().is_empty() {
            return Err(Error::EmptyCategory);
        }

        let amount = parse_amount(&self.amount)?;
        let date = parse_date(&self.date)?;
        let description = match self.description.trim() {
            "" => None,
            description => Some(description.to_owned()),
        };

        Ok(NewExpense {
            category: self.category.clone(),
            amount,
            date,
            description,
        })
    }
}

fn parse_amount(raw_amount: &str) -> Result<Decimal, Error> {
    let invalid_amount = || Error::InvalidAmount(raw_amount.to_owned());

    let amount = Decimal::from_str_exact(raw_amount.trim()).map_err(|_| invalid_amount())?;

    if amount <= Decimal::ZERO
        || amount > MAX_AMOUNT
        || amount.normalize().scale() > MAX_AMOUNT_DECIMAL_PLACES
    {
        return Err(invalid_amount());
    }

    Ok(amount.round_dp(MAX_AMOUNT_DECIMAL_PLACES))
}

fn parse_date(raw_date: &str) -> Result<Date, Error> {
    Date::parse(raw_date.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDate(raw_date.to_owned()))
}

/// The values used to fill in the expense form.
pub struct ExpenseFormDefaults<'a> {
    pub category: Option<&'a str>,
    pub amount: Option<Decimal>,
    pub date: Date,
    pub description: Option<&'a str>,
}

/// The inputs shared by the add and edit expense forms.
///
/// `known_categories` are offered as suggestions for the category input.
pub fn expense_form_fields(
    defaults: &ExpenseFormDefaults<'_>,
    known_categories: &[String],
) -> Markup {
    let amount_str = defaults.amount.map(|amount| format!("{amount:.2}"));

    html! {
        div
        {
            label
                for="category"
                class=(FORM_LABEL_STYLE)
            {
                "Category"
            }

            input
                name="category"
                id="category"
                type="text"
                list="category-suggestions"
                placeholder="Food"
                required
                autofocus
                value=[defaults.category]
                class=(FORM_TEXT_INPUT_STYLE);

            datalist id="category-suggestions"
            {
                @for category in known_categories {
                    option value=(category) {}
                }
            }
        }

        div
        {
            label
                for="amount"
                class=(FORM_LABEL_STYLE)
            {
                "Amount"
            }

            input
                name="amount"
                id="amount"
                type="number"
                step="0.01"
                min="0.01"
                placeholder="0.00"
                required
                value=[amount_str.as_deref()]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="date"
                class=(FORM_LABEL_STYLE)
            {
                "Date"
            }

            input
                name="date"
                id="date"
                type="date"
                value=(defaults.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="description"
                class=(FORM_LABEL_STYLE)
            {
                "Description"
            }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Description"
                value=[defaults.description]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}


#[cfg(test)]
mod fields_tests {
    use rust_decimal::dec;
    use scraper::{Html, Selector};
    use time::macros::date;

    use super::{ExpenseFormDefaults, expense_form_fields};

    #[test]
    fn fills_in_defaults_and_suggestions() {
        let fields = expense_form_fields(
            &ExpenseFormDefaults {
                category: Some("Food"),
                amount: Some(dec!(3)),
                date: date!(2024 - 03 - 04),
                description: None,
            },
            &["Food".to_owned(), "Rent".to_owned()],
        );
        let document = Html::parse_fragment(&maud::html! { form { (fields) } }.into_string());

        let value_of = |name: &str| {
            let selector = Selector::parse(&format!("input[name={name}]")).unwrap();
            document
                .select(&selector)
                .next()
                .and_then(|input| input.value().attr("value"))
                .map(str::to_owned)
        };
        assert_eq!(value_of("category").as_deref(), Some("Food"));
        assert_eq!(value_of("amount").as_deref(), Some("3.00"));
        assert_eq!(value_of("date").as_deref(), Some("2024-03-04"));
        assert_eq!(value_of("description"), None);

        let options = Selector::parse("datalist#category-suggestions option").unwrap();
        assert_eq!(document.select(&options).count(), 2);
    }
}
