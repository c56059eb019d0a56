//! Term and course discovery from the portal landing page.
//!
//! The landing page lists courses inside a single `div.jmu-mycourses`. Its
//! direct children alternate between toggle headers (one per term) and
//! category blocks holding the course anchors for the term above them.

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::fetch::constants::HOME_PATH;
use crate::fetch::{FetchError, Page, PortalClient, selector};

/// Class of the element holding the whole course list.
pub const COURSE_LIST_CLASS: &str = "jmu-mycourses";

/// Class marking a term header.
pub const TERM_CLASS: &str = "jmu-mycourses-toggle";

/// Class marking a block of course anchors.
pub const COURSE_CATEGORY_CLASS: &str = "jmu-mycourses-cat";

static COURSE_LIST: LazyLock<Selector> =
    LazyLock::new(|| selector(&format!("div.{COURSE_LIST_CLASS}")));
static ANCHORS: LazyLock<Selector> = LazyLock::new(|| selector("a"));

/// An academic period and its courses, in landing-page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    /// Header text as shown on the page.
    pub label: String,
    /// Courses listed under the header.
    pub courses: Vec<Course>,
}

/// A course link from the landing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    /// Absolute course page URL.
    pub url: String,
    /// Anchor text.
    pub name: String,
}

/// Errors that can occur while reading the course hierarchy.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The landing page could not be fetched.
    #[error("failed to fetch landing page: {0}")]
    Fetch(#[from] FetchError),

    /// No course list container on the page (often: not logged in).
    #[error("landing page at {url} has no course list")]
    MissingCourseList {
        /// The landing page URL.
        url: String,
    },

    /// A course block appeared before any term header.
    #[error("course block at position {position} appears before any term header")]
    CategoryBeforeTerm {
        /// Zero-based index among the container's child elements.
        position: usize,
    },
}

/// Fetches the landing page and returns its terms in page order.
///
/// # Errors
///
/// Returns [`DiscoveryError`] when the page cannot be fetched or is malformed.
#[instrument(skip(client))]
pub async fn discover(client: &PortalClient) -> Result<Vec<Term>, DiscoveryError> {
    let home_url = client.endpoint(HOME_PATH)?;
    let page = client.get_page(&home_url).await?;
    let terms = parse_terms(&page)?;
    info!(
        terms = terms.len(),
        courses = terms.iter().map(|t| t.courses.len()).sum::<usize>(),
        "Discovered course hierarchy"
    );
    Ok(terms)
}

/// Parses the term/course hierarchy out of a landing page.
///
/// Children of the course list that are neither term headers nor course
/// blocks are ignored. Course hrefs are resolved against the page URL.
///
/// # Errors
///
/// Returns [`DiscoveryError::MissingCourseList`] when the container is absent
/// and [`DiscoveryError::CategoryBeforeTerm`] for a course block with no term.
pub fn parse_terms(page: &Page) -> Result<Vec<Term>, DiscoveryError> {
    let document = page.document();
    let container = document
        .select(&COURSE_LIST)
        .next()
        .ok_or_else(|| DiscoveryError::MissingCourseList {
            url: page.url().to_string(),
        })?;

    let mut terms: Vec<Term> = Vec::new();
    for (position, child) in container.children().filter_map(ElementRef::wrap).enumerate() {
        if has_class(child, TERM_CLASS) {
            terms.push(Term {
                label: element_text(child),
                courses: Vec::new(),
            });
        } else if has_class(child, COURSE_CATEGORY_CLASS) {
            let term = terms
                .last_mut()
                .ok_or(DiscoveryError::CategoryBeforeTerm { position })?;
            term.courses.extend(courses_in(page, child));
        }
    }
    Ok(terms)
}

fn courses_in(page: &Page, category: ElementRef<'_>) -> Vec<Course> {
    category
        .select(&ANCHORS)
        .filter_map(|anchor| {
            let Some(href) = anchor.value().attr("href") else {
                debug!(text = %element_text(anchor), "course anchor without href skipped");
                return None;
            };
            let url = page
                .resolve(href)
                .map_or_else(|| href.to_string(), |url| url.to_string());
            Some(Course {
                url,
                name: element_text(anchor),
            })
        })
        .collect()
}

fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
