//! Link classification on course and resource view pages.

use std::collections::HashSet;

use tracing::debug;
use url::Url;

use crate::discover::Course;
use crate::fetch::Page;

/// Path fragment identifying a resource view link on a course page.
pub const RESOURCE_VIEW_MARKER: &str = "/moodle/mod/resource/view.php?id=";

/// Extension marker for PDF files.
pub const PDF_MARKER: &str = ".pdf";

/// Extension marker for ZIP archives.
pub const ZIP_MARKER: &str = ".zip";

/// A resource view link found on a course page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLink {
    /// The course the link was found on.
    pub course: Course,
    /// Absolute URL of the resource view page.
    pub target_url: String,
}

/// A file to mirror, with the names that place it in the local tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    /// Raw term label (sanitized later by the writer).
    pub term_label: String,
    /// Raw course name (sanitized later by the writer).
    pub course_name: String,
    /// Final path segment of the file URL, percent-decoded.
    pub file_name: String,
    /// Absolute file URL.
    pub source_url: String,
}

/// Whether a URL points at a resource view page.
#[must_use]
pub fn is_resource_view(url: &str) -> bool {
    url.contains(RESOURCE_VIEW_MARKER)
}

/// Whether a URL names a downloadable PDF or ZIP file.
#[must_use]
pub fn is_file_link(url: &str) -> bool {
    url.contains(PDF_MARKER) || url.contains(ZIP_MARKER)
}

/// Collects the resource view links worth following on a course page.
///
/// Links carrying a PDF marker are skipped: they are terminal PDF views with
/// no indirection page behind them. Duplicates keep their first position.
#[must_use]
pub fn resource_links(page: &Page, course: &Course) -> Vec<ResourceLink> {
    let mut seen = HashSet::new();
    page.hrefs()
        .iter()
        .filter_map(|href| page.resolve(href))
        .map(String::from)
        .filter(|url| is_resource_view(url))
        .filter(|url| {
            if url.contains(PDF_MARKER) {
                debug!(url = %url, "skipping direct PDF resource view");
                return false;
            }
            true
        })
        .filter(|url| seen.insert(url.clone()))
        .map(|target_url| ResourceLink {
            course: course.clone(),
            target_url,
        })
        .collect()
}

/// Collects the PDF and ZIP files linked from a resource view page.
#[must_use]
pub fn download_targets(page: &Page, term_label: &str, course: &Course) -> Vec<DownloadTarget> {
    let mut seen = HashSet::new();
    page.hrefs()
        .iter()
        .filter_map(|href| page.resolve(href))
        .filter(|url| is_file_link(url.as_str()))
        .filter(|url| seen.insert(url.to_string()))
        .filter_map(|url| {
            let Some(file_name) = file_name_from_url(&url) else {
                debug!(url = %url, "file link without a usable name skipped");
                return None;
            };
            Some(DownloadTarget {
                term_label: term_label.to_string(),
                course_name: course.name.clone(),
                file_name,
                source_url: url.to_string(),
            })
        })
        .collect()
}

/// Returns the final path segment of a URL, percent-decoded.
///
/// Query and fragment are ignored. Path separators that appear after decoding
/// are replaced so the name stays a single path component; `.` and `..` are
/// rejected.
#[must_use]
pub fn file_name_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    let decoded = urlencoding::decode(segment)
        .map_or_else(|_| segment.to_string(), std::borrow::Cow::into_owned);
    let name = decoded.replace(['/', '\\'], "_");
    let name = name.trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}
