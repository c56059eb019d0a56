//! Fetched HTML pages and the attribute queries run against them.
//!
//! The body is kept as text and parsed on demand: `scraper::Html` is not
//! `Send`, so parsed documents never live across an `.await`.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

static ANCHORS: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

/// Compiles a CSS selector known at compile time.
///
/// # Panics
///
/// Panics if `css` is not a valid selector. Only called with literals.
#[must_use]
#[allow(clippy::expect_used)]
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static CSS selector is valid")
}

/// An HTML page as returned by the portal, with the URL it was served from.
#[derive(Debug, Clone)]
pub struct Page {
    url: Url,
    body: String,
}

impl Page {
    /// Wraps a page body. `url` is the final URL after redirects.
    #[must_use]
    pub fn new(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            body: body.into(),
        }
    }

    /// URL the page was served from; relative hrefs resolve against it.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Raw page body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Parses the body into a document tree.
    #[must_use]
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }

    /// All anchor hrefs in document order, untouched.
    #[must_use]
    pub fn hrefs(&self) -> Vec<String> {
        self.document()
            .select(&ANCHORS)
            .filter_map(|a| a.value().attr("href"))
            .map(str::to_string)
            .collect()
    }

    /// Resolves an href against this page's URL.
    #[must_use]
    pub fn resolve(&self, href: &str) -> Option<Url> {
        self.url.join(href.trim()).ok()
    }
}
