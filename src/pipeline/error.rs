//! Aggregate error for a pipeline run.

use thiserror::Error;

use crate::auth::AuthError;
use crate::discover::DiscoveryError;
use crate::fetch::FetchError;
use crate::resolver::ResolveError;
use crate::sync::SyncError;

/// Unrecovered failure of a run, tagged with the stage it came from.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The portal client could not be set up (bad base URL, TLS init).
    #[error("portal client setup failed: {0}")]
    Client(#[source] FetchError),

    /// Login or logout failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The course hierarchy could not be read.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// A course's resources could not be resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A file could not be written.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// The shutdown signal fired before the run finished.
    #[error("run interrupted")]
    Interrupted,
}

impl PipelineError {
    /// Whether the run stopped because of the shutdown signal.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}
