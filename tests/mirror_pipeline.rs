//! End-to-end pipeline tests against a mock HTTP server
//!
//! Each test stands up a wiremock server serving the listing page, the
//! document API, and image assets, then runs a full mirror into a temp
//! directory and inspects the produced tree.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};
use yuque_dl::{BookMirror, Config, RetryConfig};

/// Build the host page with the URL-encoded embedded listing payload
fn listing_page(book_id: i64, toc: &[serde_json::Value]) -> String {
    let payload = serde_json::json!({ "book": { "id": book_id, "toc": toc } });
    let encoded = urlencoding::encode(&payload.to_string()).into_owned();
    format!(
        "<!doctype html><script>window.appData = JSON.parse(decodeURIComponent(\"{}\"));</script>",
        encoded
    )
}

fn container(uuid: &str, title: &str, parent: &str) -> serde_json::Value {
    serde_json::json!({
        "uuid": uuid, "title": title, "parent_uuid": parent,
        "type": "TITLE", "url": "", "child_uuid": "x"
    })
}

fn document(uuid: &str, title: &str, parent: &str, slug: &str) -> serde_json::Value {
    serde_json::json!({
        "uuid": uuid, "title": title, "parent_uuid": parent,
        "type": "DOC", "url": slug, "child_uuid": ""
    })
}

fn doc_response(markdown: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "data": { "sourcecode": markdown }
    }))
}

fn mirror_for(server: &MockServer, download_dir: &TempDir) -> BookMirror {
    let config = Config {
        download_dir: download_dir.path().to_path_buf(),
        max_concurrent_downloads: 4,
        retry: RetryConfig {
            max_attempts: 2,
            delay: std::time::Duration::from_millis(1),
        },
        ..Default::default()
    };
    BookMirror::with_api_base(config, &server.uri()).unwrap()
}

#[tokio::test]
async fn mirrors_a_small_book_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/book"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            4242,
            &[
                container("a", "Guide", ""),
                document("b", "Intro", "a", "intro"),
                document("c", "Setup", "a", "setup"),
            ],
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/docs/intro"))
        .respond_with(doc_response("# Intro"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/docs/setup"))
        .respond_with(doc_response("# Setup"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mirror = mirror_for(&server, &dir);
    let report = mirror
        .mirror(&format!("{}/book", server.uri()))
        .await
        .unwrap();

    assert_eq!(report.book_id, "4242");
    assert_eq!(report.documents.written, 2);
    assert_eq!(report.documents.total(), 2);

    let root = dir.path().join("4242");
    assert!(root.join("Guide").is_dir());
    assert_eq!(
        std::fs::read_to_string(root.join("Guide/Intro.md")).unwrap(),
        "# Intro"
    );
    assert_eq!(
        std::fs::read_to_string(root.join("Guide/Setup.md")).unwrap(),
        "# Setup"
    );

    let summary = std::fs::read_to_string(root.join("SUMMARY.md")).unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines[0], "## Guide");
    assert_eq!(lines[1], "  * [Intro](Guide/Intro.md)");
    assert_eq!(lines[2], "  * [Setup](Guide/Setup.md)");
}

#[tokio::test]
async fn missing_document_is_skipped_but_still_listed_in_summary() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/book"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            7,
            &[
                document("a", "Alive", "", "alive"),
                document("b", "Deleted", "", "deleted"),
            ],
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/docs/alive"))
        .respond_with(doc_response("still here"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/docs/deleted"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mirror = mirror_for(&server, &dir);
    let report = mirror
        .mirror(&format!("{}/book", server.uri()))
        .await
        .unwrap();

    assert_eq!(report.documents.written, 1);
    assert_eq!(report.documents.skipped, 1);

    let root = dir.path().join("7");
    assert!(root.join("Alive.md").exists());
    assert!(!root.join("Deleted.md").exists());

    // The summary was planned before fetching, so the dead link is present
    let summary = std::fs::read_to_string(root.join("SUMMARY.md")).unwrap();
    assert!(summary.contains("[Deleted](Deleted.md)"));
}

#[tokio::test]
async fn remote_images_are_localized_into_sibling_images_dir() {
    let server = MockServer::start().await;
    let image_url = format!("{}/assets/diagram.png", server.uri());

    Mock::given(method("GET"))
        .and(path("/book"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            9,
            &[document("a", "Pics", "", "pics")],
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/docs/pics"))
        .respond_with(doc_response(&format!(
            "![d]({image_url}) and again ![d]({image_url})"
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/assets/diagram.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pngbytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mirror = mirror_for(&server, &dir);
    mirror
        .mirror(&format!("{}/book", server.uri()))
        .await
        .unwrap();

    let root = dir.path().join("9");
    let written = std::fs::read_to_string(root.join("Pics.md")).unwrap();
    assert!(!written.contains(&image_url), "both references rewritten");
    assert_eq!(written.matches("](images/").count(), 2);

    let images: Vec<_> = std::fs::read_dir(root.join("images"))
        .unwrap()
        .collect::<std::io::Result<Vec<_>>>()
        .unwrap();
    assert_eq!(images.len(), 1, "duplicate locator fetched once");
    assert_eq!(std::fs::read(images[0].path()).unwrap(), b"pngbytes");
}

#[tokio::test]
async fn unreachable_image_falls_back_to_remote_url() {
    let server = MockServer::start().await;
    let image_url = format!("{}/assets/broken.png", server.uri());

    Mock::given(method("GET"))
        .and(path("/book"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            11,
            &[document("a", "Doc", "", "doc")],
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/docs/doc"))
        .respond_with(doc_response(&format!("![b]({image_url})")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/assets/broken.png"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mirror = mirror_for(&server, &dir);
    let report = mirror
        .mirror(&format!("{}/book", server.uri()))
        .await
        .unwrap();

    // The document itself is still written
    assert_eq!(report.documents.written, 1);
    let written = std::fs::read_to_string(dir.path().join("11/Doc.md")).unwrap();
    assert!(written.contains(&image_url), "remote reference preserved");
}

#[tokio::test]
async fn larger_book_drains_fully_through_bounded_pool() {
    let server = MockServer::start().await;

    let mut toc = vec![container("root", "Book", "")];
    for i in 0..50 {
        toc.push(document(
            &format!("u{i}"),
            &format!("Page {i}"),
            "root",
            &format!("page{i}"),
        ));
    }

    Mock::given(method("GET"))
        .and(path("/book"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(13, &toc)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/api/docs/page\d+$"))
        .respond_with(doc_response("page body"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = Config {
        download_dir: dir.path().to_path_buf(),
        max_concurrent_downloads: 5,
        ..Default::default()
    };
    let mirror = BookMirror::with_api_base(config, &server.uri()).unwrap();
    let report = mirror
        .mirror(&format!("{}/book", server.uri()))
        .await
        .unwrap();

    assert_eq!(report.documents.written, 50);
    assert_eq!(report.documents.total(), 50);
    for i in 0..50 {
        assert!(
            dir.path().join(format!("13/Book/Page {i}.md")).exists(),
            "page {i} missing"
        );
    }
}

#[tokio::test]
async fn listing_failure_is_fatal_and_produces_no_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mirror = mirror_for(&server, &dir);
    let result = mirror.mirror(&format!("{}/book", server.uri())).await;

    assert!(result.is_err());
    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .collect::<std::io::Result<Vec<_>>>()
        .unwrap();
    assert!(entries.is_empty(), "no partial output on fatal failure");
}

#[tokio::test]
async fn unicode_titles_map_to_unicode_paths() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/book"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            21,
            &[
                container("a", "指南", ""),
                document("b", "简介", "a", "jianjie"),
            ],
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/docs/jianjie"))
        .respond_with(doc_response("内容"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mirror = mirror_for(&server, &dir);
    mirror
        .mirror(&format!("{}/book", server.uri()))
        .await
        .unwrap();

    let root = dir.path().join("21");
    assert!(root.join("指南/简介.md").exists());

    // Link targets are percent-encoded, link text stays readable
    let summary = std::fs::read_to_string(root.join("SUMMARY.md")).unwrap();
    assert!(summary.contains("[简介]"));
    assert!(summary.contains("%E6%8C%87%E5%8D%97/")); // "指南"
}
