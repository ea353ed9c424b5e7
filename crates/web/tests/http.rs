//! HTTP surface exercised through the router without binding a socket

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::{RecordingRemote, RecordingStore};
use foris_common::ConfigTree;
use foris_web::WebServer;
use std::sync::Arc;
use tower::ServiceExt;

fn server(store: &Arc<RecordingStore>, remote: &Arc<RecordingRemote>) -> Router {
    WebServer::new(store.clone(), remote.clone(), "en").router()
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let store = Arc::new(RecordingStore::default());
    let remote = Arc::new(RecordingRemote::default());
    let response = server(&store, &remote).oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], "ok");
}

#[tokio::test]
async fn lists_registered_pages() {
    let store = Arc::new(RecordingStore::default());
    let remote = Arc::new(RecordingRemote::default());
    let response = server(&store, &remote).oneshot(get("/config")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let pages = body["pages"].as_array().unwrap();
    assert_eq!(pages.len(), 9);
    assert_eq!(pages[0]["slug"], "wan");
}

#[tokio::test]
async fn unknown_page_is_not_found() {
    let store = Arc::new(RecordingStore::default());
    let remote = Arc::new(RecordingRemote::default());
    let app = server(&store, &remote);

    let response = app.clone().oneshot(get("/config/firewall")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(form_post("/config/firewall", "a=b")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn displays_page_form() {
    let store = Arc::new(RecordingStore::default());
    let remote = Arc::new(RecordingRemote::default());
    let response = server(&store, &remote).oneshot(get("/config/ucollect")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["name"], "ucollect");
    assert_eq!(body["sections"][0]["fields"][0]["name"], "services");
    assert!(store.applied().is_empty());
}

#[tokio::test]
async fn urlencoded_submission_is_committed() {
    let store = Arc::new(RecordingStore::default());
    let remote = Arc::new(RecordingRemote::default());
    let response = server(&store, &remote)
        .oneshot(form_post(
            "/config/ucollect",
            "services=23tcp&services=80tcp",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["tag"], "edit_config");
    assert_eq!(body["success"], true);
    assert_eq!(
        store.list("ucollect.fakes.disable"),
        Some(vec![
            "2323tcp".to_string(),
            "3128tcp".to_string(),
            "8123tcp".to_string(),
            "8080tcp".to_string(),
        ])
    );
}

#[tokio::test]
async fn invalid_submission_is_unprocessable() {
    let mut tree = ConfigTree::new();
    tree.set_option("network.lan.ipaddr", "192.168.1.1").unwrap();
    let store = Arc::new(RecordingStore::with_tree(tree));
    let remote = Arc::new(RecordingRemote::default());

    let response = server(&store, &remote)
        .oneshot(form_post("/config/lan", "lan_ipaddr=192.168.1."))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = read_json(response).await;
    assert_eq!(body["tag"], "form_invalid");
    assert_eq!(body["errors"][0]["field"], "lan_ipaddr");
    assert_eq!(body["form"]["state"], "invalid");
    assert!(store.applied().is_empty());
    assert_eq!(store.value("network.lan.ipaddr").as_deref(), Some("192.168.1.1"));
}

#[tokio::test]
async fn failing_callback_is_server_error() {
    let store = Arc::new(RecordingStore::default());
    let remote = Arc::new(RecordingRemote::failing_updates());
    let response = server(&store, &remote)
        .oneshot(form_post("/config/collection-toggle", "enable=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = read_json(response).await;
    assert_eq!(body["tag"], "callback_failed");
    assert_eq!(body["callback"], 2);
    assert!(store.applied().is_empty());
}

#[tokio::test]
async fn failing_store_is_bad_gateway() {
    let store = Arc::new(RecordingStore::failing());
    let remote = Arc::new(RecordingRemote::default());
    let response = server(&store, &remote)
        .oneshot(form_post("/config/lan", "lan_ipaddr=192.168.1.2&dhcp_enabled=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(read_json(response).await["success"], false);
}

#[tokio::test]
async fn backup_restores_into_fresh_store() {
    let mut tree = ConfigTree::new();
    tree.set_option("network.lan.ipaddr", "192.168.1.1").unwrap();
    tree.set_list("updater.pkglists.lists", ["extra", "i_agree_datacollect"])
        .unwrap();
    let source = Arc::new(RecordingStore::with_tree(tree));
    let remote = Arc::new(RecordingRemote::default());

    let response = server(&source, &remote)
        .oneshot(get("/config/maintenance/backup"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/gzip"
    );
    let archive = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let target = Arc::new(RecordingStore::default());
    let request = Request::builder()
        .method("POST")
        .uri("/config/maintenance/restore")
        .header(header::CONTENT_TYPE, "application/gzip")
        .body(Body::from(archive))
        .unwrap();
    let response = server(&target, &remote).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["configs"], serde_json::json!(["network", "updater"]));
    assert_eq!(target.snapshot(), source.snapshot());
}

#[tokio::test]
async fn garbage_restore_is_rejected() {
    let store = Arc::new(RecordingStore::default());
    let remote = Arc::new(RecordingRemote::default());
    let request = Request::builder()
        .method("POST")
        .uri("/config/maintenance/restore")
        .body(Body::from("not an archive"))
        .unwrap();
    let response = server(&store, &remote).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(store.applied().is_empty());
}

#[tokio::test]
async fn restore_rejects_oversized_entry() {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    // compresses to a few kilobytes, expands past the entry limit
    let config = vec![b' '; foris_web::maintenance::MAX_ENTRY_BYTES as usize + 1];
    let mut header = tar::Header::new_gnu();
    header.set_size(config.len() as u64);
    header.set_mode(0o600);
    header.set_cksum();
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::best()));
    builder
        .append_data(&mut header, "config.json", config.as_slice())
        .unwrap();
    let archive = builder.into_inner().unwrap().finish().unwrap();
    assert!(archive.len() < 64 * 1024);

    let store = Arc::new(RecordingStore::default());
    let remote = Arc::new(RecordingRemote::default());
    let request = Request::builder()
        .method("POST")
        .uri("/config/maintenance/restore")
        .body(Body::from(archive))
        .unwrap();
    let response = server(&store, &remote).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("exceeds"));
    assert!(store.applied().is_empty());
}

#[tokio::test]
async fn reboot_invokes_remote() {
    let store = Arc::new(RecordingStore::default());
    let remote = Arc::new(RecordingRemote::default());
    let request = Request::builder()
        .method("POST")
        .uri("/config/maintenance/reboot")
        .body(Body::empty())
        .unwrap();
    let response = server(&store, &remote).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(remote.reboots(), 1);
}
