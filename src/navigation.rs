//! The navigation bar shown at the top of every page for logged in users.
//!
//! Wide screens get the links in the header. Narrow screens get them in a
//! bar pinned to the bottom of the viewport.

use maud::{Markup, html};

use crate::endpoints;

/// The pages listed in the navigation bar, in display order.
const PAGES: [(&str, &str); 4] = [
    (endpoints::DASHBOARD_VIEW, "Dashboard"),
    (endpoints::EXPENSES_VIEW, "Expenses"),
    (endpoints::NEW_EXPENSE_VIEW, "Add Expense"),
    (endpoints::LOG_OUT, "Log out"),
];

const HEADER_LINK_STYLE: &str = "block py-2 px-3 rounded-sm lg:p-0 text-gray-900 \
    hover:bg-gray-100 lg:hover:bg-transparent lg:hover:text-blue-700 \
    dark:text-white dark:hover:bg-gray-700 lg:dark:hover:text-blue-500";
const HEADER_CURRENT_LINK_STYLE: &str = "block py-2 px-3 rounded-sm lg:p-0 text-white \
    bg-blue-700 lg:bg-transparent lg:text-blue-700 dark:text-white lg:dark:text-blue-500";
const FOOTER_LINK_STYLE: &str = "flex items-center justify-center min-w-0 rounded-lg \
    px-2.5 py-2 sm:px-4 text-xs sm:text-sm font-semibold text-gray-600 \
    hover:bg-blue-50/70 hover:text-blue-700 dark:text-gray-300 dark:hover:text-blue-200";
const FOOTER_CURRENT_LINK_STYLE: &str = "flex items-center justify-center min-w-0 rounded-lg \
    px-2.5 py-2 sm:px-4 text-xs sm:text-sm font-semibold text-blue-700 bg-blue-50 \
    shadow-sm dark:bg-blue-900/30 dark:text-blue-200";

/// The navigation bar with the link for the page being viewed highlighted.
pub struct NavBar<'a> {
    current_page: &'a str,
}

impl<'a> NavBar<'a> {
    /// Highlight the link to `current_page`, if there is one.
    pub fn new(current_page: &'a str) -> Self {
        Self { current_page }
    }

    fn is_current(&self, url: &str) -> bool {
        url != endpoints::LOG_OUT && url == self.current_page
    }

    pub fn into_html(self) -> Markup {
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div class="flex flex-wrap items-center justify-between max-w-screen-xl mx-auto p-4"
                {
                    a href=(endpoints::ROOT) class="flex items-center gap-3"
                    {
                        img src="/static/favicon-128x128.png" alt="" class="h-8";
                        span class="text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Expense Tracker"
                        }
                    }

                    ul class="hidden lg:flex lg:flex-row lg:space-x-8 font-medium"
                    {
                        @for (url, title) in PAGES {
                            li { (self.header_link(url, title)) }
                        }
                    }
                }
            }

            nav class="fixed inset-x-0 bottom-0 z-40 px-4 pb-4 lg:hidden"
            {
                ul
                    class="grid grid-cols-4 gap-2 px-4 py-3 mx-auto max-w-screen-xl
                    rounded-xl border border-gray-200 bg-white/95 shadow-lg backdrop-blur
                    dark:border-gray-700 dark:bg-gray-900/95"
                    aria-label="Primary"
                {
                    @for (url, title) in PAGES {
                        li class="min-w-0" { (self.footer_link(url, title)) }
                    }
                }
            }
        )
    }

    fn header_link(&self, url: &str, title: &str) -> Markup {
        let style = if self.is_current(url) {
            HEADER_CURRENT_LINK_STYLE
        } else {
            HEADER_LINK_STYLE
        };

        html!( a href=(url) class=(style) { (title) } )
    }

    fn footer_link(&self, url: &str, title: &str) -> Markup {
        let is_current = self.is_current(url);
        let style = if is_current {
            FOOTER_CURRENT_LINK_STYLE
        } else {
            FOOTER_LINK_STYLE
        };

        html! {
            a href=(url) class=(style) aria-current=[is_current.then_some("page")]
            {
                span class="truncate" { (title) }
            }
        }
    }
}
