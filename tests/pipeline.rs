//! Integration tests for pdf2md-client against a mock conversion service.
//!
//! Every test starts its own `wiremock` server, so they run in parallel and
//! need no network access.

use pdf2md_client::{
    AssetError, CandidateFile, ClientConfig, ClientError, Converter, DirectorySink, ImageAsset,
    MemorySink, SessionState, ValidationError,
};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config_for(server: &MockServer) -> ClientConfig {
    init_tracing();
    ClientConfig::builder()
        .base_url(server.uri())
        .download_delay_ms(0)
        .settle_delay_ms(0)
        .build()
        .expect("valid config")
}

fn pdf_candidate(name: &str, size: usize) -> CandidateFile {
    let mut content = b"%PDF-1.7\n".to_vec();
    content.resize(size.max(content.len()), b' ');
    CandidateFile::from_bytes(name, "application/pdf", content)
}

fn markdown_body(server: &MockServer, names: &[&str]) -> serde_json::Value {
    let markdown: String = names
        .iter()
        .enumerate()
        .map(|(i, n)| format!("## Figure {}\n\n![fig{}]({}/api/images/{})\n\n", i + 1, i + 1, server.uri(), n))
        .collect();
    json!({
        "status": "success",
        "message": "PDF converted to Markdown.",
        "filename": "report.pdf",
        "markdown_content": format!("# Report\n\n{markdown}"),
        "images": names.iter().map(|n| json!({ "filename": n })).collect::<Vec<_>>(),
        "image_count": names.len(),
    })
}

async fn mount_markdown(server: &MockServer, names: &[&str]) {
    Mock::given(method("POST"))
        .and(path("/api/convert_pdf_to_md"))
        .respond_with(ResponseTemplate::new(200).set_body_json(markdown_body(server, names)))
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, name: &str, status: u16) {
    let template = if status == 200 {
        ResponseTemplate::new(200).set_body_bytes(format!("PNG:{name}").into_bytes())
    } else {
        ResponseTemplate::new(status)
            .set_body_json(json!({ "status": "error", "message": "Image not found" }))
    };
    Mock::given(method("GET"))
        .and(path(format!("/api/images/{name}")))
        .respond_with(template)
        .mount(server)
        .await;
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn report_scenario_end_to_end() {
    let server = MockServer::start().await;
    let images = ["p1_img1.png", "p2_img1.png", "p3_img1.png"];
    mount_markdown(&server, &images).await;
    for name in images {
        mount_image(&server, name, 200).await;
    }

    let out = tempfile::tempdir().unwrap();
    let mut converter =
        Converter::new(config_for(&server), DirectorySink::new(out.path())).unwrap();
    let mut session = SessionState::new();

    converter
        .select(&mut session, pdf_candidate("report.pdf", 2 * 1024 * 1024))
        .unwrap();
    let result = converter.to_markdown(&mut session).await.unwrap();

    assert_eq!(result.image_count(), 3);
    for (i, name) in images.iter().enumerate() {
        let local_ref = format!("![fig{}]({})", i + 1, name);
        assert!(result.markdown.contains(&local_ref), "missing {local_ref}");
    }
    assert!(!result.markdown.contains("/api/images/"));
    assert!(result.images.iter().all(|img| img.path.as_deref() == Some(img.filename.as_str())));

    let summary = converter.download_all_images(&mut session).await.unwrap();
    assert_eq!(summary.counts(), (3, 3));

    let report = converter.save_local_composite(&mut session).await.unwrap();
    assert_eq!(report.markdown_path, out.path().join("report.md"));
    assert!(report.guidance.is_some());
    assert_eq!(session.ledger().len(), 3);

    let saved_md = std::fs::read_to_string(out.path().join("report.md")).unwrap();
    assert_eq!(saved_md, result.markdown);
    for name in images {
        let bytes = std::fs::read(out.path().join(name)).unwrap();
        assert_eq!(bytes, format!("PNG:{name}").into_bytes());
    }
    assert!(session.error().is_none());
    assert!(session.notice().is_some());
}

#[tokio::test]
async fn oversized_file_never_reaches_the_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let big = dir.path().join("big.pdf");
    let file = std::fs::File::create(&big).unwrap();
    file.set_len(60 * 1024 * 1024).unwrap();

    let converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let mut session = SessionState::new();

    let err = converter.select_path(&mut session, &big).unwrap_err();
    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::TooLarge { .. })
    ));
    assert!(session.selected().is_none());
    assert!(session.error().is_some());

    let err = converter.to_markdown(&mut session).await.unwrap_err();
    assert!(matches!(err, ClientError::NoFileSelected));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn non_pdf_is_rejected() {
    let server = MockServer::start().await;
    let converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let mut session = SessionState::new();

    let err = converter
        .select(
            &mut session,
            CandidateFile::from_bytes("notes.txt", "text/plain", b"hello".to_vec()),
        )
        .unwrap_err();
    assert!(matches!(err, ValidationError::InvalidType { .. }));
    assert!(session.selected().is_none());
}

#[tokio::test]
async fn partial_download_failures_are_tallied() {
    let server = MockServer::start().await;
    mount_image(&server, "a.png", 200).await;
    mount_image(&server, "b.png", 404).await;
    mount_image(&server, "c.png", 200).await;
    mount_image(&server, "d.png", 500).await;

    let mut converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let mut session = SessionState::new();
    let assets: Vec<ImageAsset> = ["a.png", "b.png", "c.png", "d.png"]
        .into_iter()
        .map(ImageAsset::new)
        .collect();

    let summary = pdf2md_client::pipeline::download::download_all(
        converter.service(),
        &mut MemorySink::new(),
        &mut session,
        &assets,
        converter.config(),
    )
    .await
    .unwrap();

    assert_eq!(summary.counts(), (2, 4));
    assert_eq!(summary.failures.len(), 2);
    assert_eq!(summary.failures[0].filename(), "b.png");
    assert_eq!(summary.failures[1].filename(), "d.png");
    assert_eq!(session.ledger().iter().collect::<Vec<_>>(), vec!["a.png", "c.png"]);
    assert!(session.error().unwrap().contains("2/4"));

    // A single failed download leaves the ledger alone.
    let err = converter
        .download_image(&mut session, &ImageAsset::new("b.png"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Asset(_)));
    assert!(!session.is_downloaded("b.png"));
    assert_eq!(session.ledger().len(), 2);
}

#[tokio::test]
async fn nested_image_name_is_not_saved_or_recorded() {
    let server = MockServer::start().await;
    mount_image(&server, "x.png", 200).await;

    let out = tempfile::tempdir().unwrap();
    let mut converter =
        Converter::new(config_for(&server), DirectorySink::new(out.path())).unwrap();
    let mut session = SessionState::new();

    let err = converter
        .download_image(&mut session, &ImageAsset::new("sub/x.png"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Asset(AssetError::InvalidName { .. })));
    assert!(!session.is_downloaded("sub/x.png"));
    assert!(session.ledger().is_empty());
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    assert!(server.received_requests().await.unwrap().is_empty());

    converter
        .download_image(&mut session, &ImageAsset::new("x.png"))
        .await
        .unwrap();
    assert!(session.is_downloaded("x.png"));
    assert!(out.path().join("x.png").is_file());
}

#[tokio::test]
async fn download_all_with_nothing_to_download() {
    let server = MockServer::start().await;
    let mut converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let mut session = SessionState::new();

    let err = converter.download_all_images(&mut session).await.unwrap_err();
    assert!(matches!(err, ClientError::NothingToDownload { .. }));
}

#[tokio::test]
async fn service_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/convert_pdf_to_md"))
        .respond_with(
            ResponseTemplate::new(415)
                .set_body_json(json!({ "status": "error", "message": "Invalid file type." })),
        )
        .mount(&server)
        .await;

    let converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let mut session = SessionState::new();
    converter.select(&mut session, pdf_candidate("a.pdf", 16)).unwrap();

    let err = converter.to_markdown(&mut session).await.unwrap_err();
    match err {
        ClientError::Service { status, ref message } => {
            assert_eq!(status, 415);
            assert_eq!(message, "Invalid file type.");
        }
        other => panic!("expected service error, got {other:?}"),
    }
    assert_eq!(session.error(), Some("Invalid file type."));
    assert!(!session.is_busy());
    assert!(session.result().is_none());
}

#[tokio::test]
async fn service_error_without_message_is_generic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/convert_pdf_to_md"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "status": "error" })))
        .mount(&server)
        .await;

    let converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let mut session = SessionState::new();
    converter.select(&mut session, pdf_candidate("a.pdf", 16)).unwrap();

    let err = converter.to_markdown(&mut session).await.unwrap_err();
    assert_eq!(err.to_string(), pdf2md_client::error::GENERIC_FAILURE);
}

/// Base URL of a local port with nothing listening on it.
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

fn unreachable_converter() -> Converter<MemorySink> {
    init_tracing();
    let config = ClientConfig::builder()
        .base_url(closed_port_url())
        .request_timeout_secs(5)
        .build()
        .unwrap();
    Converter::new(config, MemorySink::new()).unwrap()
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let converter = unreachable_converter();
    let mut session = SessionState::new();
    converter.select(&mut session, pdf_candidate("a.pdf", 16)).unwrap();

    let err = converter.to_markdown(&mut session).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. }), "got {err:?}");
    assert!(session.error().unwrap().contains("conversion service is running"));
    assert!(!session.is_busy());
}

#[tokio::test]
async fn unreachable_service_fails_word_and_cropped_images() {
    let mut converter = unreachable_converter();
    let mut session = SessionState::new();
    converter.select(&mut session, pdf_candidate("a.pdf", 16)).unwrap();

    let err = converter.to_word(&mut session).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. }), "got {err:?}");
    assert!(!session.is_busy());

    let err = converter.to_cropped_images(&mut session).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. }), "got {err:?}");
    assert!(!session.is_busy());
    assert!(session.error().unwrap().contains("conversion service is running"));
    assert!(converter.into_sink().artifacts.is_empty());
}

#[tokio::test]
async fn abandoned_conversion_releases_busy_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/convert_pdf_to_md"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(markdown_body(&server, &[]))
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let mut session = SessionState::new();
    converter.select(&mut session, pdf_candidate("a.pdf", 16)).unwrap();

    let outcome =
        tokio::time::timeout(Duration::from_millis(200), converter.to_markdown(&mut session)).await;
    assert!(outcome.is_err());
    assert!(!session.is_busy());
    assert!(session.begin_conversion().is_ok());
}

#[tokio::test]
async fn failed_reconversion_leaves_session_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/convert_pdf_to_md"))
        .respond_with(ResponseTemplate::new(200).set_body_json(markdown_body(&server, &["x.png"])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/convert_pdf_to_md"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "status": "error", "message": "boom" })),
        )
        .mount(&server)
        .await;

    let converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let mut session = SessionState::new();
    converter.select(&mut session, pdf_candidate("a.pdf", 16)).unwrap();

    converter.to_markdown(&mut session).await.unwrap();
    assert!(session.result().is_some());

    converter.to_markdown(&mut session).await.unwrap_err();
    assert!(session.result().is_none());
    assert_eq!(session.error(), Some("boom"));
}

#[tokio::test]
async fn busy_session_blocks_second_conversion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let mut session = SessionState::new();
    converter.select(&mut session, pdf_candidate("a.pdf", 16)).unwrap();
    session.begin_conversion().unwrap();

    let err = converter.to_markdown(&mut session).await.unwrap_err();
    assert!(matches!(err, ClientError::Busy));
    assert!(session.is_busy());
    assert_eq!(session.error(), Some("A conversion is already in progress."));
}

#[tokio::test]
async fn new_selection_clears_completed_conversion() {
    let server = MockServer::start().await;
    mount_markdown(&server, &["x.png"]).await;
    mount_image(&server, "x.png", 200).await;

    let mut converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let mut session = SessionState::new();
    converter.select(&mut session, pdf_candidate("a.pdf", 16)).unwrap();
    converter.to_markdown(&mut session).await.unwrap();
    converter.download_all_images(&mut session).await.unwrap();
    assert!(session.notice().is_some());

    converter.select(&mut session, pdf_candidate("b.pdf", 16)).unwrap();
    assert!(session.result().is_none());
    assert!(session.ledger().is_empty());
    assert!(session.error().is_none());
    assert!(session.notice().is_none());
}

// ── Binary deliverables ──────────────────────────────────────────────────────

#[tokio::test]
async fn cropped_images_use_disposition_filename() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/convert_pdf_to_images"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", r#"attachment; filename="report_cropped.zip""#)
                .set_body_bytes(b"PK\x03\x04zip".to_vec()),
        )
        .mount(&server)
        .await;

    let mut converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let mut session = SessionState::new();
    converter.select(&mut session, pdf_candidate("report.pdf", 16)).unwrap();

    let saved = converter.to_cropped_images(&mut session).await.unwrap();
    assert_eq!(saved.filename, "report_cropped.zip");
    assert_eq!(saved.bytes, 7);
    assert!(session.notice().unwrap().contains("report_cropped.zip"));
    assert!(!session.is_busy());

    let sink = converter.into_sink();
    assert_eq!(sink.get("report_cropped.zip").unwrap().as_ref(), b"PK\x03\x04zip");
}

#[tokio::test]
async fn word_defaults_to_converted_docx() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/convert_pdf_to_word"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"docx".to_vec()))
        .mount(&server)
        .await;

    let mut converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let mut session = SessionState::new();
    converter.select(&mut session, pdf_candidate("report.pdf", 16)).unwrap();

    let saved = converter.to_word(&mut session).await.unwrap();
    assert_eq!(saved.filename, "converted.docx");
    assert_eq!(saved.path, PathBuf::from("converted.docx"));
}

#[tokio::test]
async fn word_failure_surfaces_service_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/convert_pdf_to_word"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "status": "error", "message": "Word export failed" })),
        )
        .mount(&server)
        .await;

    let mut converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let mut session = SessionState::new();
    converter.select(&mut session, pdf_candidate("report.pdf", 16)).unwrap();

    let err = converter.to_word(&mut session).await.unwrap_err();
    assert_eq!(err.to_string(), "Word export failed");
    assert_eq!(session.error(), Some("Word export failed"));
    assert!(!session.is_busy());
    assert!(converter.into_sink().artifacts.is_empty());
}

// ── Packaging ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn server_archive_is_saved_as_package_zip() {
    let server = MockServer::start().await;
    mount_markdown(&server, &["a.png", "b.png"]).await;
    Mock::given(method("POST"))
        .and(path("/api/create_package"))
        .and(body_partial_json(json!({
            "filename": "report.pdf",
            "images": [
                { "filename": "a.png", "path": "a.png" },
                { "filename": "b.png", "path": "b.png" },
            ],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PKzip".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let mut converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let mut session = SessionState::new();
    converter.select(&mut session, pdf_candidate("report.pdf", 16)).unwrap();
    converter.to_markdown(&mut session).await.unwrap();

    let report = converter.save_server_archive(&mut session).await.unwrap();
    assert_eq!(report.filename, "report_package.zip");
    assert_eq!(report.image_count, 2);
    assert!(session.notice().unwrap().contains("report_package.zip"));

    let requests = server.received_requests().await.unwrap();
    let package_request = requests
        .iter()
        .find(|r| r.url.path() == "/api/create_package")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&package_request.body).unwrap();
    assert!(body["markdown_content"].as_str().unwrap().contains("![fig1](a.png)"));
}

#[tokio::test]
async fn server_archive_failure_keeps_session() {
    let server = MockServer::start().await;
    mount_markdown(&server, &["a.png"]).await;
    Mock::given(method("POST"))
        .and(path("/api/create_package"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "zip failed" })))
        .mount(&server)
        .await;

    let mut converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let mut session = SessionState::new();
    converter.select(&mut session, pdf_candidate("report.pdf", 16)).unwrap();
    converter.to_markdown(&mut session).await.unwrap();

    let err = converter.save_server_archive(&mut session).await.unwrap_err();
    assert_eq!(err.to_string(), "zip failed");
    assert!(session.error().unwrap().contains("zip failed"));
    assert!(session.result().is_some());
}

#[tokio::test]
async fn local_composite_without_images_saves_markdown_only() {
    let server = MockServer::start().await;
    mount_markdown(&server, &[]).await;

    let mut converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let mut session = SessionState::new();
    converter.select(&mut session, pdf_candidate("notes.PDF", 16)).unwrap();
    converter.to_markdown(&mut session).await.unwrap();

    let report = converter.save_local_composite(&mut session).await.unwrap();
    assert!(report.images.is_none());
    assert!(report.guidance.is_none());
    // The service renamed the upload to report.pdf.
    assert_eq!(converter.into_sink().names(), vec!["report.md"]);
}

#[tokio::test]
async fn packaging_without_markdown_is_refused() {
    let server = MockServer::start().await;
    let mut converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let mut session = SessionState::new();

    assert!(matches!(
        converter.save_local_composite(&mut session).await,
        Err(ClientError::NothingToDownload { .. })
    ));
    assert!(matches!(
        converter.save_server_archive(&mut session).await,
        Err(ClientError::NothingToDownload { .. })
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn copy_markdown_goes_to_clipboard() {
    let server = MockServer::start().await;
    mount_markdown(&server, &["a.png"]).await;

    let mut converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let mut session = SessionState::new();
    converter.select(&mut session, pdf_candidate("report.pdf", 16)).unwrap();
    let result = converter.to_markdown(&mut session).await.unwrap();

    converter.copy_markdown(&mut session).await.unwrap();
    assert_eq!(session.notice(), Some("Copied!"));
    assert_eq!(converter.into_sink().clipboard, Some(result.markdown));
}

#[tokio::test]
async fn server_archive_passes_image_metadata_back() {
    let server = MockServer::start().await;
    let body = json!({
        "status": "success",
        "filename": "report.pdf",
        "markdown_content": "![fig](/api/images/a.png)",
        "images": [
            { "filename": "a.png", "path": "/srv/a.png", "page": 2, "index": 1, "width": 640, "height": 480 },
        ],
        "image_count": 1,
    });
    Mock::given(method("POST"))
        .and(path("/api/convert_pdf_to_md"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/create_package"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PKzip".to_vec()))
        .mount(&server)
        .await;

    let mut converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let mut session = SessionState::new();
    converter.select(&mut session, pdf_candidate("report.pdf", 16)).unwrap();
    converter.to_markdown(&mut session).await.unwrap();
    converter.save_server_archive(&mut session).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let package_request = requests
        .iter()
        .find(|r| r.url.path() == "/api/create_package")
        .unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&package_request.body).unwrap();
    assert_eq!(
        sent["images"][0],
        json!({ "filename": "a.png", "path": "/srv/a.png", "page": 2, "index": 1, "width": 640, "height": 480 })
    );
}

#[tokio::test]
async fn copy_without_markdown_records_error() {
    let server = MockServer::start().await;
    let mut converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let mut session = SessionState::new();

    let err = converter.copy_markdown(&mut session).await.unwrap_err();
    assert!(matches!(err, ClientError::NothingToDownload { .. }));
    assert_eq!(session.error(), Some("There is no content to copy."));
    assert!(converter.into_sink().clipboard.is_none());
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_check_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "ok", "message": "Backend is running" })),
        )
        .mount(&server)
        .await;

    let converter = Converter::new(config_for(&server), MemorySink::new()).unwrap();
    let health = converter.health().await.unwrap();
    assert!(health.is_ok());
    assert_eq!(health.message, "Backend is running");
}
