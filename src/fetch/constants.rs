//! Constants for the fetch module (timeouts, portal endpoints).

/// Default HTTP connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default total request timeout (5 minutes, large course files included).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Login form endpoint, relative to the portal base URL.
pub const LOGIN_PATH: &str = "moodle/login/index.php";

/// Landing page holding the course list and the logout anchor.
pub const HOME_PATH: &str = "moodle/";

/// Logout endpoint, called with a `sesskey` query parameter.
pub const LOGOUT_PATH: &str = "moodle/login/logout.php";
