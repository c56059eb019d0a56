//! Page fetcher: authenticated HTTP access to the portal.
//!
//! # Features
//!
//! - One cookie jar per [`PortalClient`], so the session established by login
//!   rides along on every later request
//! - Connect and total-request timeouts on every call
//! - HTML pages returned as [`Page`] values, queried by attribute via `scraper`
//! - Structured [`FetchError`] with the failing URL attached

mod client;
pub mod constants;
mod error;
mod page;

pub use client::PortalClient;
pub use error::FetchError;
pub use page::Page;

pub(crate) use page::selector;
