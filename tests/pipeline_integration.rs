//! End-to-end runs of the sync pipeline against a mock portal.

use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use moodle_sync_core::{Pipeline, PipelineError, PipelineState, TermSelection};
mod support;
use support::{
    LOGIN_PATH, LOGOUT_PATH, RESOURCE_PATH, file_url, landing_page, link_page, mount_basic_portal, mount_course,
    mount_file, mount_landing, mount_login, mount_logout, mount_resource_view, portal_config,
    resource_view_url,
};

#[tokio::test]
async fn test_run_mirrors_new_file_into_sanitized_tree() {
    let server = MockServer::start().await;
    let temp_dir = tempfile::TempDir::new().unwrap();
    mount_basic_portal(&server, 1, 1).await;

    let mut pipeline = Pipeline::new(portal_config(&server, temp_dir.path()));
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.courses, 1);
    assert_eq!(report.written, 1);
    assert_eq!(report.skipped, 0);
    let written = temp_dir.path().join("WS23").join("Algo").join("notes.pdf");
    assert_eq!(std::fs::read(&written).unwrap(), b"%PDF-1.4 notes");
    assert_eq!(pipeline.state(), &PipelineState::Idle);
}

#[tokio::test]
async fn test_second_run_skips_existing_file_without_fetching() {
    let server = MockServer::start().await;
    let temp_dir = tempfile::TempDir::new().unwrap();
    // File fetched once across both runs; one logout per run.
    mount_basic_portal(&server, 2, 1).await;

    let mut pipeline = Pipeline::new(portal_config(&server, temp_dir.path()));
    let first = pipeline.run().await.unwrap();
    let second = pipeline.run().await.unwrap();

    assert_eq!(first.written, 1);
    assert_eq!(second.written, 0);
    assert_eq!(second.skipped, 1);
}

#[tokio::test]
async fn test_existing_file_is_never_overwritten() {
    let server = MockServer::start().await;
    let temp_dir = tempfile::TempDir::new().unwrap();
    mount_basic_portal(&server, 1, 0).await;
    let existing = temp_dir.path().join("WS23").join("Algo");
    std::fs::create_dir_all(&existing).unwrap();
    std::fs::write(existing.join("notes.pdf"), b"local copy").unwrap();

    let mut pipeline = Pipeline::new(portal_config(&server, temp_dir.path()));
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(std::fs::read(existing.join("notes.pdf")).unwrap(), b"local copy");
}

#[tokio::test]
async fn test_failed_course_page_still_logs_out_once() {
    let server = MockServer::start().await;
    let temp_dir = tempfile::TempDir::new().unwrap();
    mount_login(&server).await;
    mount_landing(&server, landing_page(&server, &[("WS23", &[("Algo", 1)])])).await;
    mount_logout(&server, 1).await;
    mount_course(&server, 1, ResponseTemplate::new(500)).await;

    let mut pipeline = Pipeline::new(portal_config(&server, temp_dir.path()));
    let result = pipeline.run().await;

    assert!(matches!(result, Err(PipelineError::Resolve(_))), "got: {result:?}");
    assert_eq!(pipeline.state(), &PipelineState::Idle);
}

#[tokio::test]
async fn test_failed_logout_does_not_hide_stage_error() {
    let server = MockServer::start().await;
    let temp_dir = tempfile::TempDir::new().unwrap();
    mount_login(&server).await;
    mount_landing(&server, landing_page(&server, &[("WS23", &[("Algo", 1)])])).await;
    Mock::given(method("GET"))
        .and(path(LOGOUT_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_course(&server, 1, ResponseTemplate::new(500)).await;

    let mut pipeline = Pipeline::new(portal_config(&server, temp_dir.path()));
    let result = pipeline.run().await;

    assert!(matches!(result, Err(PipelineError::Resolve(_))), "got: {result:?}");
}

#[tokio::test]
async fn test_failed_logout_after_clean_run_is_reported() {
    let server = MockServer::start().await;
    let temp_dir = tempfile::TempDir::new().unwrap();
    mount_login(&server).await;
    mount_landing(&server, landing_page(&server, &[])).await;
    Mock::given(method("GET"))
        .and(path(LOGOUT_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut pipeline = Pipeline::new(portal_config(&server, temp_dir.path()));
    let result = pipeline.run().await;

    assert!(matches!(result, Err(PipelineError::Auth(_))), "got: {result:?}");
}

#[tokio::test]
async fn test_unfinished_downloads_are_cleared_before_course_sync() {
    let server = MockServer::start().await;
    let temp_dir = tempfile::TempDir::new().unwrap();
    mount_basic_portal(&server, 1, 1).await;
    let course_dir = temp_dir.path().join("WS23").join("Algo");
    std::fs::create_dir_all(&course_dir).unwrap();
    // Left by an interrupted run; the file is no longer on the portal.
    std::fs::write(course_dir.join("withdrawn.pdf.part"), b"half").unwrap();

    let mut pipeline = Pipeline::new(portal_config(&server, temp_dir.path()));
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.written, 1);
    assert!(!course_dir.join("withdrawn.pdf.part").exists());
    assert!(course_dir.join("notes.pdf").exists());
}

#[tokio::test]
async fn test_interrupted_run_still_logs_out_once() {
    let server = MockServer::start().await;
    let temp_dir = tempfile::TempDir::new().unwrap();
    mount_login(&server).await;
    mount_landing(&server, landing_page(&server, &[("WS23", &[("Algo", 1)])])).await;
    mount_logout(&server, 1).await;
    mount_course(
        &server,
        1,
        ResponseTemplate::new(200)
            .set_body_string(link_page(&[]))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let mut pipeline = Pipeline::new(portal_config(&server, temp_dir.path()));
    let result = pipeline
        .run_until(tokio::time::sleep(Duration::from_millis(300)))
        .await;

    assert!(
        matches!(result, Err(PipelineError::Interrupted)),
        "got: {result:?}"
    );
}

#[tokio::test]
async fn test_failed_login_never_logs_out() {
    let server = MockServer::start().await;
    let temp_dir = tempfile::TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_logout(&server, 0).await;

    let mut pipeline = Pipeline::new(portal_config(&server, temp_dir.path()));
    let result = pipeline.run().await;

    assert!(matches!(result, Err(PipelineError::Auth(_))), "got: {result:?}");
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_pdf_resource_view_is_never_followed() {
    let server = MockServer::start().await;
    let temp_dir = tempfile::TempDir::new().unwrap();
    mount_login(&server).await;
    mount_landing(&server, landing_page(&server, &[("WS23", &[("Algo", 1)])])).await;
    mount_logout(&server, 1).await;
    let direct_pdf_view = format!("{}&file=slides.pdf", resource_view_url(&server, 9));
    mount_course(
        &server,
        1,
        ResponseTemplate::new(200).set_body_string(link_page(&[
            direct_pdf_view,
            resource_view_url(&server, 7),
        ])),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(RESOURCE_PATH))
        .and(query_param("id", "9"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_resource_view(&server, 7, link_page(&[file_url(&server, "notes.pdf")])).await;
    mount_file(&server, "notes.pdf", b"%PDF", 1).await;

    let mut pipeline = Pipeline::new(portal_config(&server, temp_dir.path()));
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.written, 1);
}

#[tokio::test]
async fn test_zip_files_are_mirrored_alongside_pdfs() {
    let server = MockServer::start().await;
    let temp_dir = tempfile::TempDir::new().unwrap();
    mount_login(&server).await;
    mount_landing(&server, landing_page(&server, &[("WS23", &[("Algo", 1)])])).await;
    mount_logout(&server, 1).await;
    mount_course(
        &server,
        1,
        ResponseTemplate::new(200).set_body_string(link_page(&[resource_view_url(&server, 7)])),
    )
    .await;
    mount_resource_view(
        &server,
        7,
        link_page(&[
            file_url(&server, "sheet1.zip"),
            file_url(&server, "notes.pdf"),
            file_url(&server, "readme.txt"),
        ]),
    )
    .await;
    mount_file(&server, "sheet1.zip", b"PK\x03\x04", 1).await;
    mount_file(&server, "notes.pdf", b"%PDF", 1).await;
    mount_file(&server, "readme.txt", b"text", 0).await;

    let mut pipeline = Pipeline::new(portal_config(&server, temp_dir.path()));
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.written, 2);
    let course_dir = temp_dir.path().join("WS23").join("Algo");
    assert!(course_dir.join("sheet1.zip").exists());
    assert!(!course_dir.join("readme.txt").exists());
}

#[tokio::test]
async fn test_only_newest_term_synced_by_default() {
    let server = MockServer::start().await;
    let temp_dir = tempfile::TempDir::new().unwrap();
    mount_login(&server).await;
    mount_landing(
        &server,
        landing_page(&server, &[("WS 23/24", &[("Algo", 1)]), ("SS 23", &[("Old", 2)])]),
    )
    .await;
    mount_logout(&server, 1).await;
    mount_course(&server, 1, ResponseTemplate::new(200).set_body_string(link_page(&[]))).await;
    Mock::given(method("GET"))
        .and(path("/moodle/course/view.php"))
        .and(query_param("id", "2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut pipeline = Pipeline::new(portal_config(&server, temp_dir.path()));
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.courses, 1);
}

#[tokio::test]
async fn test_all_terms_selection_syncs_every_term() {
    let server = MockServer::start().await;
    let temp_dir = tempfile::TempDir::new().unwrap();
    mount_login(&server).await;
    mount_landing(
        &server,
        landing_page(&server, &[("WS23", &[("Algo", 1)]), ("SS23", &[("Old", 2)])]),
    )
    .await;
    mount_logout(&server, 1).await;
    mount_course(&server, 1, ResponseTemplate::new(200).set_body_string(link_page(&[]))).await;
    mount_course(&server, 2, ResponseTemplate::new(200).set_body_string(link_page(&[]))).await;

    let mut config = portal_config(&server, temp_dir.path());
    config.term_selection = TermSelection::All;
    let report = Pipeline::new(config).run().await.unwrap();

    assert_eq!(report.courses, 2);
}
