//! Session establishment and teardown.
//!
//! Login fetches the portal's login form, lifts the single-use `logintoken`
//! out of it and posts it back with the credentials. Logout lifts the
//! `sesskey` from the landing page's logout anchor and calls the logout
//! endpoint with it.

mod error;
mod session;

pub use error::AuthError;
pub use session::{
    Credentials, Session, extract_login_token, extract_session_key, login, logout,
};
