//! Error types for login and logout.

use thiserror::Error;

use crate::fetch::FetchError;

/// Errors that can occur while establishing or tearing down a session.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The login page has no `logintoken` input, or it has no value.
    #[error("login page at {url} has no login token\n  Suggestion: check that the base URL points at the portal root")]
    MissingLoginToken {
        /// The login page URL.
        url: String,
    },

    /// The landing page has no logout anchor carrying a `sesskey`.
    #[error("no logout session key found on {url}\n  Suggestion: the login probably failed; check the credentials")]
    MissingSessionKey {
        /// The landing page URL.
        url: String,
    },

    /// A request made during login or logout failed.
    #[error("{stage} request failed: {source}")]
    Fetch {
        /// `"login"` or `"logout"`.
        stage: &'static str,
        /// The underlying fetch error.
        #[source]
        source: FetchError,
    },
}

impl AuthError {
    /// Wraps a fetch failure that happened during login.
    pub fn login_fetch(source: FetchError) -> Self {
        Self::Fetch {
            stage: "login",
            source,
        }
    }

    /// Wraps a fetch failure that happened during logout.
    pub fn logout_fetch(source: FetchError) -> Self {
        Self::Fetch {
            stage: "logout",
            source,
        }
    }
}
