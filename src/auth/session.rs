//! Token-based login and `sesskey` logout against the Moodle login form.

use std::fmt;
use std::sync::LazyLock;

use scraper::Selector;
use tracing::{debug, info, instrument};

use super::error::AuthError;
use crate::fetch::constants::{HOME_PATH, LOGIN_PATH, LOGOUT_PATH};
use crate::fetch::{Page, PortalClient, selector};

static LOGIN_TOKEN: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"input[name="logintoken"]"#));
static LOGOUT_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"a[data-title="logout,moodle"]"#));

/// Portal account credentials.
///
/// The password is redacted in Debug output so it never reaches a log line.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The account name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The password (sensitive, never log).
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// An authenticated portal session.
///
/// Created by [`login`]; the cookies set by the portal live in the wrapped
/// client. Valid until [`logout`] runs.
#[derive(Debug)]
pub struct Session {
    client: PortalClient,
    logged_in: bool,
}

impl Session {
    /// The session's HTTP client. Every authenticated request goes through it.
    #[must_use]
    pub fn client(&self) -> &PortalClient {
        &self.client
    }

    /// Whether logout still has to run for this session.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }
}

/// Logs in by posting the credentials together with the login page's token.
///
/// The portal is trusted to set its session cookies on the response; the
/// response body is not inspected. A wrong password therefore surfaces later,
/// when the landing page carries no course list or logout anchor.
///
/// # Errors
///
/// Returns [`AuthError::MissingLoginToken`] when the login page has no token,
/// or [`AuthError::Fetch`] when either request fails.
#[instrument(skip(client, credentials), fields(user = %credentials.username()))]
pub async fn login(client: PortalClient, credentials: &Credentials) -> Result<Session, AuthError> {
    let login_url = client.endpoint(LOGIN_PATH).map_err(AuthError::login_fetch)?;
    let page = client
        .get_page(&login_url)
        .await
        .map_err(AuthError::login_fetch)?;
    let token = extract_login_token(&page).ok_or_else(|| AuthError::MissingLoginToken {
        url: login_url.to_string(),
    })?;
    debug!("login token found");

    client
        .post_form(
            &login_url,
            &[
                ("logintoken", token.as_str()),
                ("username", credentials.username()),
                ("password", credentials.password()),
            ],
        )
        .await
        .map_err(AuthError::login_fetch)?;

    info!("Logged in");
    Ok(Session {
        client,
        logged_in: true,
    })
}

/// Ends the session via the landing page's logout anchor.
///
/// Calling this on a session that is already logged out is a no-op. The
/// logged-in flag is cleared before any request goes out, so a failed logout
/// is never repeated.
///
/// # Errors
///
/// Returns [`AuthError::MissingSessionKey`] when the landing page has no logout
/// anchor, or [`AuthError::Fetch`] when a request fails.
#[instrument(skip(session))]
pub async fn logout(session: &mut Session) -> Result<(), AuthError> {
    if !session.logged_in {
        debug!("logout skipped: no active session");
        return Ok(());
    }
    session.logged_in = false;

    let client = &session.client;
    let home_url = client.endpoint(HOME_PATH).map_err(AuthError::logout_fetch)?;
    let page = client
        .get_page(&home_url)
        .await
        .map_err(AuthError::logout_fetch)?;
    let sesskey = extract_session_key(&page).ok_or_else(|| AuthError::MissingSessionKey {
        url: home_url.to_string(),
    })?;

    let mut logout_url = client.endpoint(LOGOUT_PATH).map_err(AuthError::logout_fetch)?;
    logout_url.query_pairs_mut().append_pair("sesskey", &sesskey);
    client
        .get(&logout_url)
        .await
        .map_err(AuthError::logout_fetch)?;

    info!("Logged out");
    Ok(())
}

/// Reads the single-use token from the login form.
#[must_use]
pub fn extract_login_token(page: &Page) -> Option<String> {
    page.document()
        .select(&LOGIN_TOKEN)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Reads the `sesskey` query value from the logout anchor's href.
#[must_use]
pub fn extract_session_key(page: &Page) -> Option<String> {
    let href = page
        .document()
        .select(&LOGOUT_ANCHOR)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::to_string)?;

    let from_query = page.resolve(&href).and_then(|url| {
        url.query_pairs()
            .find(|(key, _)| key == "sesskey")
            .map(|(_, value)| value.into_owned())
    });
    // Hrefs that do not parse as URLs still carry the key after the marker.
    let key = from_query.or_else(|| {
        href.split_once("sesskey=")
            .map(|(_, rest)| rest.split(['&', '#']).next().unwrap_or_default().to_string())
    })?;
    (!key.is_empty()).then_some(key)
}
