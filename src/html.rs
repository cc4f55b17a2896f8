//! Page layout, shared styles and form fields used by every view.

use std::sync::OnceLock;

use maud::{DOCTYPE, Markup, PreEscaped, html};
use numfmt::{Formatter, Precision};
use rust_decimal::{Decimal, prelude::ToPrimitive};

pub const LINK_STYLE: &str =
    "underline text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400";

pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 rounded text-white bg-blue-500 \
    hover:enabled:bg-blue-600 disabled:bg-blue-700 dark:bg-blue-600 hover:enabled:dark:bg-blue-700";

pub const BUTTON_DELETE_STYLE: &str = "underline cursor-pointer bg-transparent border-none \
    text-red-600 hover:text-red-500 dark:text-red-500 dark:hover:text-red-400";

pub const FORM_CONTAINER_STYLE: &str = "flex flex-col items-center max-w-md px-6 py-8 lg:py-0 \
    mx-auto text-gray-900 dark:text-white";
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm border \
    text-gray-900 bg-gray-50 border-gray-300 disabled:text-gray-500 \
    focus:ring-blue-600 focus:border-blue-600 dark:text-white dark:bg-gray-700 \
    dark:border-gray-600 dark:placeholder-gray-400 focus:dark:border-blue-500 \
    focus:dark:ring-blue-500";

pub const TABLE_HEADER_STYLE: &str =
    "text-xs uppercase text-gray-700 bg-gray-50 dark:text-gray-400 dark:bg-gray-700";
pub const TABLE_ROW_STYLE: &str = "border-b bg-white dark:bg-gray-800 dark:border-gray-700";
pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 lg:py-5 mx-auto text-gray-900 dark:text-white";

const ERROR_TEXT_STYLE: &str = "text-base text-red-500";

pub const ALERT_CONTAINER_POSITION: &str =
    "position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;";

/// Extra scripts a page needs on top of HTMX.
pub enum HeadElement {
    /// Loaded from a path or URL.
    ScriptLink(String),
    /// Inlined into the page.
    ScriptSource(PreEscaped<String>),
}

const HTMX_SCRIPTS: [(&str, &str); 2] = [
    (
        "/static/htmx-2.0.8-min.js",
        "sha384-/TgkGk7p307TH7EXJDuUlgG3Ce1UVolAOFopFekQkkXihi5u/6OCvVKyz1W+idaz",
    ),
    (
        "/static/htmx-ext-response-targets-2.0.4.js",
        "sha384-T41oglUPvXLGBVyRdZsVRxNWnOOqCynaPubjUVjxhsjFTKrFJGEMm3/0KGmNQ+Pg",
    ),
];

/// Hides the spinner inside `#indicator` until HTMX marks a request in flight.
const INDICATOR_CSS: &str = "#indicator.htmx-indicator { display: none; }
#indicator.htmx-request .htmx-indicator,
#indicator.htmx-request.htmx-indicator { display: inline; }";

/// Wrap `content` in a full HTML page titled `title`.
pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Expense Tracker" }
                @for size in ["32x32", "128x128"] {
                    link
                        rel="icon"
                        type="image/png"
                        href={ "/static/favicon-" (size) ".png" }
                        sizes=(size);
                }
                link href="/static/main.css" rel="stylesheet";

                @for (src, integrity) in HTMX_SCRIPTS {
                    script src=(src) integrity=(integrity) {}
                }

                style { (PreEscaped(INDICATOR_CSS)) }

                @for element in head_elements {
                    @match element {
                        HeadElement::ScriptLink(src) => script src=(src) {},
                        HeadElement::ScriptSource(source) => script { (source) },
                    }
                }
            }

            body
                hx-ext="response-targets"
                class="container min-h-screen max-w-full bg-gray-50 dark:bg-gray-900
                    pb-[calc(5rem+env(safe-area-inset-bottom))] lg:pb-0"
            {
                (content)

                // Target of the out-of-band alert swaps.
                div
                    id="alert-container"
                    class="hidden w-full max-w-md px-4"
                    style=(ALERT_CONTAINER_POSITION)
                {}
            }
        }
    }
}

/// A full page explaining an error, e.g. a 404, with a link back home.
pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    let content = html!(
        section class="bg-white dark:bg-gray-900"
        {
            div class="max-w-screen-sm mx-auto px-4 py-8 lg:py-16 text-center"
            {
                h1
                    class="mb-4 text-7xl lg:text-9xl font-extrabold
                        text-blue-600 dark:text-blue-500"
                {
                    (header)
                }
                p class="mb-4 text-3xl md:text-4xl font-bold text-gray-900 dark:text-white"
                {
                    (description)
                }
                p class="mb-4 text-xl md:text-2xl text-gray-900 dark:text-white" { (fix) }
                a
                    href="/"
                    class="inline-flex my-4 px-5 py-2.5 rounded text-sm font-medium text-white
                        bg-blue-600 hover:bg-blue-800 focus:ring-4 focus:ring-blue-300"
                {
                    "Back to Homepage"
                }
            }
        }
    );

    base(title, &[], &content)
}

/// The card the log-in and registration forms are shown in.
pub fn log_in_register(form_title: &str, form: &Markup) -> Markup {
    html! {
        div class="flex flex-col items-center justify-center px-6 py-8 mx-auto"
        {
            div
                class="flex items-center gap-2 mb-6 text-2xl font-semibold
                    text-gray-900 dark:text-white"
            {
                img class="w-8 h-8" src="/static/favicon-128x128.png" alt="";
                "Expense Tracker"
            }

            div
                class="w-full sm:max-w-md p-6 sm:p-8 space-y-4 md:space-y-6 rounded-lg shadow
                    bg-white dark:bg-gray-800 dark:border dark:border-gray-700"
            {
                h1 class="text-xl md:text-2xl font-bold text-gray-900 dark:text-white"
                {
                    (form_title)
                }

                (form)
            }
        }
    }
}

/// A labelled, required input with an optional error message below it.
///
/// The input gets focus when there is an error so the user can fix it
/// straight away.
pub fn credential_field(
    name: &str,
    label: &str,
    input: Markup,
    error_message: Option<&str>,
) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }
            (input)
            @if let Some(error_message) = error_message {
                p class=(ERROR_TEXT_STYLE) { (error_message) }
            }
        }
    }
}

pub fn username_input(username: &str, error_message: Option<&str>) -> Markup {
    let input = html! {
        input
            type="text"
            name="username"
            id="username"
            placeholder="jane.doe"
            autocomplete="username"
            class=(FORM_TEXT_INPUT_STYLE)
            required
            autofocus[error_message.is_some() || username.is_empty()]
            value=(username);
    };

    credential_field("username", "Username", input, error_message)
}

pub fn password_input(password: &str, min_length: u8, error_message: Option<&str>) -> Markup {
    let input = html! {
        input
            type="password"
            name="password"
            id="password"
            placeholder="••••••••"
            class=(FORM_TEXT_INPUT_STYLE)
            required
            autofocus[error_message.is_some()]
            value=(password)
            minlength=(min_length);
    };

    credential_field("password", "Password", input, error_message)
}

pub fn loading_spinner() -> Markup {
    html! {
        svg
            aria-hidden="true"
            role="status"
            class="inline text-white w-4 h-4 me-2 mb-1 animate-spin"
            viewBox="0 0 100 101"
            fill="none"
            xmlns="http://www.w3.org/2000/svg"
        {
            path
                d="M100 50.5908C100 78.2051 77.6142 100.591 50 100.591C22.3858 100.591 0 78.2051 0 50.5908C0 22.9766 22.3858 0.59082 50 0.59082C77.6142 0.59082 100 22.9766 100 50.5908ZM9.08144 50.5908C9.08144 73.1895 27.4013 91.5094 50 91.5094C72.5987 91.5094 90.9186 73.1895 90.9186 50.5908C90.9186 27.9921 72.5987 9.67226 50 9.67226C27.4013 9.67226 9.08144 27.9921 9.08144 50.5908Z"
                fill="#E5E7EB" {}
            path
                d="M93.9676 39.0409C96.393 38.4038 97.8624 35.9116 97.0079 33.5539C95.2932 28.8227 92.871 24.3692 89.8167 20.348C85.8452 15.1192 80.8826 10.7238 75.2124 7.41289C69.5422 4.10194 63.2754 1.94025 56.7698 1.05124C51.7666 0.367541 46.6976 0.446843 41.7345 1.27873C39.2613 1.69328 37.813 4.19778 38.4501 6.62326C39.0873 9.04874 41.5694 10.4717 44.0505 10.1071C47.8511 9.54855 51.7191 9.52689 55.5402 10.0491C60.8642 10.7766 65.9928 12.5457 70.6331 15.2552C75.2735 17.9648 79.3347 21.5619 82.5849 25.841C84.9175 28.9121 86.7997 32.2913 88.1811 35.8758C89.083 38.2158 91.5421 39.6781 93.9676 39.0409Z"
                fill="currentColor" {}
        }
    }
}

/// Format `amount` as dollars and cents, e.g. "$12.50".
pub fn format_currency(amount: Decimal) -> String {
    static POSITIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();
    static NEGATIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();

    let build = |prefix: &str| {
        Formatter::currency(prefix)
            .ok()
            .map(|formatter| formatter.precision(Precision::Decimals(2)))
    };

    let amount = amount.round_dp(2);
    let number = amount.abs().to_f64().unwrap_or_default();
    let formatter = if amount.is_sign_negative() && !amount.is_zero() {
        NEGATIVE_FMT.get_or_init(|| build("-$")).as_ref()
    } else {
        POSITIVE_FMT.get_or_init(|| build("$")).as_ref()
    };

    // numfmt prints zero as "0" and drops the trailing zero of amounts like
    // "12.30", so both cases are padded out to two decimal places here.
    let formatted = match formatter {
        Some(formatter) if !amount.is_zero() => formatter.fmt_string(number),
        _ => return format!("${amount:.2}"),
    };

    match formatted.split_once('.') {
        Some((_, cents)) if cents.len() == 1 => format!("{formatted}0"),
        Some(_) => formatted,
        None => format!("{formatted}.00"),
    }
}
