//! Mock Moodle portal shared by the integration tests.
//!
//! Each test file uses a different subset of these helpers.
#![allow(dead_code)]

use std::path::Path;

use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use moodle_sync_core::{Credentials, PortalConfig};

pub const USERNAME: &str = "s123456";
pub const PASSWORD: &str = "hunter2";
pub const LOGIN_TOKEN: &str = "tok4711";
pub const SESSKEY: &str = "sk0815";
pub const SESSION_COOKIE: &str = "MoodleSession=abc123";

pub const LOGIN_PATH: &str = "/moodle/login/index.php";
pub const HOME_PATH: &str = "/moodle/";
pub const LOGOUT_PATH: &str = "/moodle/login/logout.php";
pub const COURSE_PATH: &str = "/moodle/course/view.php";
pub const RESOURCE_PATH: &str = "/moodle/mod/resource/view.php";

pub fn credentials() -> Credentials {
    Credentials::new(USERNAME, PASSWORD)
}

/// Run configuration pointing at the mock server.
pub fn portal_config(server: &MockServer, target_dir: &Path) -> PortalConfig {
    let mut config = PortalConfig::new(credentials());
    config.base_url = format!("{}/", server.uri());
    config.target_dir = target_dir.to_path_buf();
    config.connect_timeout_secs = 2;
    config.read_timeout_secs = 10;
    config
}

pub fn login_page() -> String {
    format!(
        r#"<html><body><form action="/moodle/login/index.php" method="post">
             <input type="hidden" name="logintoken" value="{LOGIN_TOKEN}">
             <input name="username"><input name="password" type="password">
           </form></body></html>"#
    )
}

/// Landing page with the course list and the logout anchor.
///
/// `terms` pairs each term label with `(course name, course id)` entries.
pub fn landing_page(server: &MockServer, terms: &[(&str, &[(&str, u32)])]) -> String {
    let uri = server.uri();
    let mut list = String::new();
    for (label, courses) in terms {
        list.push_str(&format!(r#"<div class="jmu-mycourses-toggle">{label}</div>"#));
        list.push_str(r#"<div class="jmu-mycourses-cat">"#);
        for (name, id) in *courses {
            list.push_str(&format!(
                r#"<a href="{uri}{COURSE_PATH}?id={id}">{name}</a>"#
            ));
        }
        list.push_str("</div>");
    }
    format!(
        r#"<html><body>
             <div class="jmu-mycourses">{list}</div>
             <a data-title="logout,moodle" href="{uri}{LOGOUT_PATH}?sesskey={SESSKEY}">Log out</a>
           </body></html>"#
    )
}

/// Any page made of the given hrefs.
pub fn link_page(hrefs: &[String]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{href}">link</a>"#))
        .collect();
    format!("<html><body>{anchors}</body></html>")
}

pub fn resource_view_url(server: &MockServer, id: u32) -> String {
    format!("{}{RESOURCE_PATH}?id={id}", server.uri())
}

pub fn file_url(server: &MockServer, name: &str) -> String {
    format!("{}/moodle/pluginfile.php/42/mod_resource/content/1/{name}", server.uri())
}

/// Login form plus the credential POST that sets the session cookie.
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(login_page()))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .and(body_string_contains(format!("logintoken={LOGIN_TOKEN}")))
        .and(body_string_contains(format!("username={USERNAME}")))
        .and(body_string_contains(format!("password={PASSWORD}")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", format!("{SESSION_COOKIE}; Path=/").as_str())
                .set_body_string("<html><body>Welcome</body></html>"),
        )
        .mount(server)
        .await;
}

/// Landing page, served only to requests carrying the session cookie.
pub async fn mount_landing(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path(HOME_PATH))
        .and(header("cookie", SESSION_COOKIE))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Logout endpoint, verified to be hit exactly `times` times.
pub async fn mount_logout(server: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path(LOGOUT_PATH))
        .and(query_param("sesskey", SESSKEY))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>bye</html>"))
        .expect(times)
        .named("logout")
        .mount(server)
        .await;
}

pub async fn mount_course(server: &MockServer, id: u32, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(COURSE_PATH))
        .and(query_param("id", id.to_string()))
        .respond_with(response)
        .mount(server)
        .await;
}

pub async fn mount_resource_view(server: &MockServer, id: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(RESOURCE_PATH))
        .and(query_param("id", id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

pub async fn mount_file(server: &MockServer, name: &str, content: &[u8], times: u64) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/moodle/pluginfile.php/42/mod_resource/content/1/{name}"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .expect(times)
        .mount(server)
        .await;
}

/// The single-course portal used by most pipeline tests: term `WS23`, course
/// `Algo` (id 1) with one resource view (id 7) linking `notes.pdf`.
pub async fn mount_basic_portal(server: &MockServer, logout_times: u64, file_times: u64) {
    mount_login(server).await;
    mount_landing(server, landing_page(server, &[("WS23", &[("Algo", 1)])])).await;
    mount_logout(server, logout_times).await;
    mount_course(
        server,
        1,
        ResponseTemplate::new(200).set_body_string(link_page(&[resource_view_url(server, 7)])),
    )
    .await;
    mount_resource_view(server, 7, link_page(&[file_url(server, "notes.pdf")])).await;
    mount_file(server, "notes.pdf", b"%PDF-1.4 notes", file_times).await;
}
