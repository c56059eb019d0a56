//! Moodle Sync Core Library
//!
//! This library logs into a Moodle portal, walks the term -> course ->
//! resource hierarchy visible to the account, and mirrors new PDF and ZIP
//! files into a local directory tree. Files already on disk are never
//! fetched again, so the tree doubles as the download ledger.
//!
//! # Architecture
//!
//! Data flows strictly downward through these modules:
//! - [`fetch`] - Cookie-bearing HTTP client and parsed pages
//! - [`auth`] - Token login and `sesskey` logout, owning the [`Session`]
//! - [`discover`] - Landing page to ordered terms and courses
//! - [`resolver`] - Course page to resource views to file URLs
//! - [`sync`] - Idempotent writes into `<target>/<term>/<course>/<file>`
//! - [`pipeline`] - Runs the stages in order with guaranteed logout
//! - [`config`] - Run configuration and its INI-file source

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod discover;
pub mod fetch;
pub mod pipeline;
pub mod resolver;
pub mod sync;

mod user_agent;

// Re-export commonly used types
pub use auth::{AuthError, Credentials, Session};
pub use config::{ConfigError, FileConfig, LogLevel, PortalConfig, TermSelection};
pub use discover::{Course, DiscoveryError, Term};
pub use fetch::{FetchError, PortalClient};
pub use pipeline::{Pipeline, PipelineError, PipelineState, RunReport};
pub use resolver::{DownloadTarget, ResolveError, ResourceLink};
pub use sync::{SyncError, WriteResult};
