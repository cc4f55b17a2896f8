//! Assertions on the expense forms rendered by the page handlers.

use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn must_get_form(document: &Html) -> ElementRef<'_> {
    let selector = Selector::parse("form").unwrap();

    document
        .select(&selector)
        .next()
        .expect("page should contain a form")
}

/// Assert that `form` sends its request to `endpoint` via the HTMX `attribute`,
/// e.g. `hx-post` or `hx-put`.
#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let got = form.value().attr(attribute);

    assert_eq!(
        got,
        Some(endpoint),
        "form should have {attribute}=\"{endpoint}\""
    );
}

#[track_caller]
fn must_find_input<'a>(form: &ElementRef<'a>, name: &str) -> ElementRef<'a> {
    let selector = Selector::parse(&format!("input[name=\"{name}\"]")).unwrap();

    form.select(&selector)
        .next()
        .unwrap_or_else(|| panic!("form has no input named {name:?}"))
}

/// Assert that `form` has a required input called `name` of type `type_`.
#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    let input = must_find_input(form, name);

    assert_eq!(
        input.value().attr("type"),
        Some(type_),
        "input {name:?} has the wrong type"
    );
    assert!(
        input.value().attr("required").is_some(),
        "input {name:?} should be required"
    );
}

/// Like [assert_form_input], and also checks the input is prefilled with `value`.
#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    assert_form_input(form, name, type_);

    let input = must_find_input(form, name);
    assert_eq!(
        input.value().attr("value").unwrap_or_default(),
        value,
        "input {name:?} has the wrong value"
    );
}

#[track_caller]
fn must_get_submit_button<'a>(form: &ElementRef<'a>) -> ElementRef<'a> {
    let selector = Selector::parse("button[type=\"submit\"]").unwrap();

    form.select(&selector)
        .next()
        .expect("form should have a submit button")
}

#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    must_get_submit_button(form);
}

#[track_caller]
pub(crate) fn assert_form_submit_button_with_text(form: &ElementRef<'_>, text: &str) {
    let button = must_get_submit_button(form);
    let label = button.text().collect::<String>();

    assert_eq!(label.trim(), text);
}
