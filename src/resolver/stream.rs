//! Lazy, page-at-a-time resolution of a course's files.

use std::collections::VecDeque;

use tracing::{debug, instrument};
use url::Url;

use super::error::ResolveError;
use super::links::{DownloadTarget, ResourceLink, download_targets, resource_links};
use crate::discover::Course;
use crate::fetch::{FetchError, PortalClient};

/// Download targets of one course, fetched on demand.
///
/// The course page is fetched on the first call to
/// [`next_target`](Self::next_target); each resource view page is fetched only
/// once the targets from the previous one have been handed out.
#[derive(Debug)]
pub struct ResourceStream<'a> {
    client: &'a PortalClient,
    term_label: String,
    course: Course,
    pending: Option<VecDeque<ResourceLink>>,
    ready: VecDeque<DownloadTarget>,
}

/// Starts resolving the files of `course`. No request is made until the
/// stream is polled.
#[must_use]
pub fn resolve<'a>(client: &'a PortalClient, term_label: &str, course: &Course) -> ResourceStream<'a> {
    ResourceStream {
        client,
        term_label: term_label.to_string(),
        course: course.clone(),
        pending: None,
        ready: VecDeque::new(),
    }
}

impl ResourceStream<'_> {
    /// Returns the next download target, or `None` when the course is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Unreachable`] when the course page or a resource
    /// view page cannot be fetched.
    pub async fn next_target(&mut self) -> Result<Option<DownloadTarget>, ResolveError> {
        loop {
            if let Some(target) = self.ready.pop_front() {
                return Ok(Some(target));
            }
            if self.pending.is_none() {
                self.pending = Some(self.fetch_resource_links().await?);
            }
            let Some(link) = self.pending.as_mut().and_then(VecDeque::pop_front) else {
                return Ok(None);
            };
            let targets = self.fetch_download_targets(&link).await?;
            self.ready.extend(targets);
        }
    }

    /// Drains the stream into a vector.
    ///
    /// # Errors
    ///
    /// Same as [`next_target`](Self::next_target).
    pub async fn collect_all(mut self) -> Result<Vec<DownloadTarget>, ResolveError> {
        let mut targets = Vec::new();
        while let Some(target) = self.next_target().await? {
            targets.push(target);
        }
        Ok(targets)
    }

    #[instrument(skip(self), fields(course = %self.course.name))]
    async fn fetch_resource_links(&self) -> Result<VecDeque<ResourceLink>, ResolveError> {
        let url = Url::parse(&self.course.url).map_err(|_| {
            ResolveError::course_unreachable(
                &self.course.url,
                FetchError::invalid_url(&self.course.url),
            )
        })?;
        let page = self
            .client
            .get_page(&url)
            .await
            .map_err(|e| ResolveError::course_unreachable(&self.course.url, e))?;
        let links = resource_links(&page, &self.course);
        debug!(resources = links.len(), "course page scanned");
        Ok(links.into())
    }

    #[instrument(skip(self, link), fields(url = %link.target_url))]
    async fn fetch_download_targets(
        &self,
        link: &ResourceLink,
    ) -> Result<Vec<DownloadTarget>, ResolveError> {
        let url = Url::parse(&link.target_url).map_err(|_| {
            ResolveError::resource_unreachable(
                &link.target_url,
                FetchError::invalid_url(&link.target_url),
            )
        })?;
        let page = self
            .client
            .get_page(&url)
            .await
            .map_err(|e| ResolveError::resource_unreachable(&link.target_url, e))?;
        let targets = download_targets(&page, &self.term_label, &link.course);
        debug!(files = targets.len(), "resource page scanned");
        Ok(targets)
    }
}
