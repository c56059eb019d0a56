//! Error types for resource resolution.

use thiserror::Error;

use crate::fetch::FetchError;

/// Errors that can occur while resolving a course's downloadable files.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A course page or resource view page could not be fetched.
    #[error("{kind} page {url} unreachable: {source}")]
    Unreachable {
        /// `"course"` or `"resource"`.
        kind: &'static str,
        /// The page URL.
        url: String,
        /// The underlying fetch error.
        #[source]
        source: FetchError,
    },
}

impl ResolveError {
    /// Creates an unreachable-course-page error.
    pub fn course_unreachable(url: impl Into<String>, source: FetchError) -> Self {
        Self::Unreachable {
            kind: "course",
            url: url.into(),
            source,
        }
    }

    /// Creates an unreachable-resource-page error.
    pub fn resource_unreachable(url: impl Into<String>, source: FetchError) -> Self {
        Self::Unreachable {
            kind: "resource",
            url: url.into(),
            source,
        }
    }
}
