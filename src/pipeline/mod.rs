//! Pipeline controller: one authenticated crawl-and-sync run.
//!
//! A run moves through
//! `Idle -> LoggingIn -> Discovering -> Syncing(course)... -> LoggingOut -> Idle`.
//! Once login has succeeded, logout runs on every exit path: normal
//! completion, a failed stage, or the shutdown future resolving mid-run.
//! Everything happens in sequence on the caller's task.
//!
//! # Example
//!
//! ```no_run
//! use moodle_sync_core::auth::Credentials;
//! use moodle_sync_core::config::PortalConfig;
//! use moodle_sync_core::pipeline::Pipeline;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = PortalConfig::new(Credentials::new("s123456", "secret"));
//! config.target_dir = "./courses".into();
//!
//! let mut pipeline = Pipeline::new(config);
//! let report = pipeline
//!     .run_until(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//! println!("{} new files", report.written);
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::PipelineError;

use std::future::Future;

use tracing::{debug, error, info, warn};

use crate::auth::{self, Session};
use crate::config::{PortalConfig, TermSelection};
use crate::discover::{Term, discover};
use crate::fetch::PortalClient;
use crate::resolver::resolve;
use crate::sync::{WriteResult, clear_partial_files, destination_dir, materialize};

/// Where a run currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// No run in progress.
    #[default]
    Idle,
    /// Fetching the login form and posting credentials.
    LoggingIn,
    /// Reading terms and courses from the landing page.
    Discovering,
    /// Resolving and writing the files of one course.
    Syncing {
        /// Name of the course being synced.
        course: String,
    },
    /// Ending the session; reached after every successful login.
    LoggingOut,
}

/// Counts from a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Courses fully processed.
    pub courses: usize,
    /// Files downloaded in this run.
    pub written: usize,
    /// Files already present on disk.
    pub skipped: usize,
}

/// Runs the crawl-and-sync pipeline for one account.
#[derive(Debug)]
pub struct Pipeline {
    config: PortalConfig,
    state: PipelineState,
}

impl Pipeline {
    /// Creates an idle pipeline.
    #[must_use]
    pub fn new(config: PortalConfig) -> Self {
        Self {
            config,
            state: PipelineState::Idle,
        }
    }

    /// The configuration runs use.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// Current state; `Idle` between runs.
    #[must_use]
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Runs to completion with no shutdown signal.
    ///
    /// # Errors
    ///
    /// See [`run_until`](Self::run_until).
    pub async fn run(&mut self) -> Result<RunReport, PipelineError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs until done or until `shutdown` resolves, whichever comes first.
    ///
    /// After a successful login, logout is attempted exactly once before this
    /// returns. A logout failure is returned only when the run itself
    /// succeeded; otherwise it is logged and the stage error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Interrupted`] when `shutdown` fired, or the
    /// error of the first failing stage.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<RunReport, PipelineError>
    where
        F: Future<Output = ()>,
    {
        let client = PortalClient::with_timeouts(
            &self.config.base_url,
            self.config.connect_timeout_secs,
            self.config.read_timeout_secs,
        )
        .map_err(PipelineError::Client)?;
        tokio::pin!(shutdown);

        self.transition(PipelineState::LoggingIn);
        let login = tokio::select! {
            result = auth::login(client, &self.config.credentials) => Some(result),
            () = &mut shutdown => None,
        };
        let mut session = match login {
            Some(Ok(session)) => session,
            Some(Err(e)) => {
                self.transition(PipelineState::Idle);
                return Err(e.into());
            }
            None => {
                self.transition(PipelineState::Idle);
                return Err(PipelineError::Interrupted);
            }
        };

        let outcome = tokio::select! {
            result = self.sync_session(&session) => result,
            () = &mut shutdown => Err(PipelineError::Interrupted),
        };
        if outcome.as_ref().is_err_and(PipelineError::is_interrupted) {
            warn!("Run interrupted; logging out");
        }

        self.transition(PipelineState::LoggingOut);
        let logout = auth::logout(&mut session).await;
        self.transition(PipelineState::Idle);

        match (outcome, logout) {
            (Ok(report), Ok(())) => Ok(report),
            (Ok(_), Err(logout_error)) => Err(logout_error.into()),
            (Err(run_error), Ok(())) => Err(run_error),
            (Err(run_error), Err(logout_error)) => {
                error!(error = %logout_error, "Logout after failed run also failed");
                Err(run_error)
            }
        }
    }

    async fn sync_session(&mut self, session: &Session) -> Result<RunReport, PipelineError> {
        let client = session.client();

        self.transition(PipelineState::Discovering);
        let terms = discover(client).await?;
        let selected = select_terms(&terms, self.config.term_selection);
        if selected.is_empty() {
            warn!("No terms discovered; nothing to sync");
        }

        let mut report = RunReport::default();
        for term in selected {
            info!(term = %term.label, courses = term.courses.len(), "Syncing term");
            for course in &term.courses {
                self.transition(PipelineState::Syncing {
                    course: course.name.clone(),
                });
                let course_dir =
                    destination_dir(&self.config.target_dir, &term.label, &course.name);
                let stale = clear_partial_files(&course_dir).await?;
                if stale > 0 {
                    info!(course = %course.name, stale, "Removed unfinished downloads");
                }
                let mut files = resolve(client, &term.label, course);
                while let Some(target) = files.next_target().await? {
                    match materialize(client, &target, &self.config.target_dir).await? {
                        WriteResult::Written(_) => report.written += 1,
                        WriteResult::Skipped(_) => report.skipped += 1,
                    }
                }
                report.courses += 1;
            }
        }

        info!(
            courses = report.courses,
            written = report.written,
            skipped = report.skipped,
            "Sync finished"
        );
        Ok(report)
    }

    fn transition(&mut self, next: PipelineState) {
        debug!(from = ?self.state, to = ?next, "pipeline state");
        self.state = next;
    }
}

/// Picks the terms a run syncs. `Newest` takes the first term only.
#[must_use]
pub fn select_terms(terms: &[Term], selection: TermSelection) -> &[Term] {
    match selection {
        TermSelection::Newest => &terms[..terms.len().min(1)],
        TermSelection::All => terms,
    }
}
