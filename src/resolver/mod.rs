//! Resource resolution: from a course page to downloadable file URLs.
//!
//! Files are never taken from the course page directly. Resolution always
//! goes through two hops:
//!
//! 1. the course page, scanned for resource view links
//!    ([`RESOURCE_VIEW_MARKER`]); views already marked as PDF are skipped
//! 2. each resource view page, scanned for links to `.pdf` or `.zip` files
//!
//! # Example
//!
//! ```no_run
//! use moodle_sync_core::discover::Course;
//! use moodle_sync_core::fetch::PortalClient;
//! use moodle_sync_core::resolver::resolve;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PortalClient::new("https://portal.example/")?;
//! let course = Course {
//!     url: "https://portal.example/moodle/course/view.php?id=1".to_string(),
//!     name: "Algo".to_string(),
//! };
//! let mut files = resolve(&client, "WS23", &course);
//! while let Some(target) = files.next_target().await? {
//!     println!("{} <- {}", target.file_name, target.source_url);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod links;
mod stream;

pub use error::ResolveError;
pub use links::{
    DownloadTarget, PDF_MARKER, RESOURCE_VIEW_MARKER, ResourceLink, ZIP_MARKER, download_targets,
    file_name_from_url, is_file_link, is_resource_view, resource_links,
};
pub use stream::{ResourceStream, resolve};
