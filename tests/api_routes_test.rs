mod common;

use axum::http::{Method, StatusCode, header};
use axum_test::TestServer;
use serde_json::{Value, json};
use std::time::Duration;

use common::{SONARR_SVG, TestEnv};
use homedash::web::router;

async fn server_with_icons() -> (TestEnv, TestServer) {
    let env = TestEnv::new();
    env.catalog.refresh().await.unwrap();
    let server = TestServer::new(router(env.state())).unwrap();
    (env, server)
}

fn names(items: &Value) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_status_get_and_head() {
    let (_env, server) = server_with_icons().await;

    let response = server.get("/api/v1/status").await;
    response.assert_status_ok();
    assert_eq!(response.json::<String>(), "OK");
    assert!(
        response
            .header(header::CONTENT_TYPE)
            .to_str()
            .unwrap()
            .starts_with("application/json")
    );

    let response = server.method(Method::HEAD, "/api/v1/status").await;
    response.assert_status_ok();
    assert!(response.as_bytes().is_empty());
}

#[tokio::test]
async fn test_register_echoes_normalized_payload() {
    let (env, server) = server_with_icons().await;

    let response = server
        .post("/api/v1/applications")
        .json(&json!({
            "uuid": "sidecar-1",
            "containers": [
                {"name": "Plex", "url": "http://plex.lan", "icon": "plex", "iconFile": "/tampered"},
                {"name": "Unknown", "url": "http://unknown.lan", "icon": "nope", "comment": "no icon"}
            ]
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["uuid"], "sidecar-1");
    assert_eq!(body["containers"][0]["iconFile"], "/api/v1/icons/plex.png");
    assert_eq!(body["containers"][1]["iconFile"], "/static/default-icon.svg");
    assert_eq!(body["containers"][1]["comment"], "no icon");

    assert_eq!(env.registry.list_source_ids().await, vec!["sidecar-1"]);
    let stored = env.registry.snapshot().await;
    let plex = stored.iter().find(|item| item.name == "Plex").unwrap();
    assert_eq!(plex.icon_file, "/api/v1/icons/plex.png");
}

#[tokio::test]
async fn test_register_null_containers() {
    let (env, server) = server_with_icons().await;

    let response = server
        .post("/api/v1/applications")
        .json(&json!({"uuid": "empty", "containers": null}))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["containers"], json!([]));
    assert!(env.registry.last_seen("empty").await.is_some());
}

#[tokio::test]
async fn test_register_rejects_missing_uuid() {
    let (env, server) = server_with_icons().await;

    let response = server
        .post("/api/v1/applications")
        .json(&json!({"uuid": "", "containers": [{"name": "x"}]}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "missing uuid in payload");
    assert!(env.registry.is_empty().await);
}

#[tokio::test]
async fn test_register_accepts_whitespace_uuid() {
    let (env, server) = server_with_icons().await;

    let response = server
        .post("/api/v1/applications")
        .json(&json!({"uuid": " ", "containers": [{"name": "x"}]}))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(env.registry.list_source_ids().await, vec![" "]);
}

#[tokio::test]
async fn test_register_rejects_invalid_json() {
    let (env, server) = server_with_icons().await;

    let response = server
        .post("/api/v1/applications")
        .text("{\"uuid\": ")
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid JSON payload");
    assert!(env.registry.is_empty().await);
}

#[tokio::test]
async fn test_list_applications_sorted_with_static_items() {
    let (_env, server) = server_with_icons().await;

    server
        .post("/api/v1/applications")
        .json(&json!({"uuid": "A", "containers": [{"name": "zeta", "icon": "sonarr"}]}))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post("/api/v1/applications")
        .json(&json!({"uuid": "B", "containers": [{"name": "alpha", "icon": "plex"}]}))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.get("/api/v1/applications").await;
    response.assert_status_ok();
    let items: Value = response.json();

    assert_eq!(names(&items), vec!["Router", "alpha", "grafana", "zeta"]);
    assert_eq!(items[0]["iconFile"], "/static/default-icon.svg");
    assert_eq!(items[1]["iconFile"], "/api/v1/icons/plex.png");
    assert_eq!(items[2]["iconFile"], "/api/v1/icons/grafana.png");
    assert_eq!(items[3]["iconFile"], "/api/v1/icons/sonarr.svg");

    let again: Value = server.get("/api/v1/applications").await.json();
    assert_eq!(items, again);
}

#[tokio::test]
async fn test_reregistration_replaces_items() {
    let (_env, server) = server_with_icons().await;

    for containers in [
        json!([{"name": "old-1"}, {"name": "old-2"}]),
        json!([{"name": "new"}]),
    ] {
        server
            .post("/api/v1/applications")
            .json(&json!({"uuid": "A", "containers": containers}))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let items: Value = server.get("/api/v1/applications").await.json();
    assert_eq!(names(&items), vec!["Router", "grafana", "new"]);
}

#[tokio::test]
async fn test_sidecar_lookup_and_delete() {
    let (_env, server) = server_with_icons().await;

    server
        .post("/api/v1/applications")
        .json(&json!({"uuid": "A", "containers": [{"name": "one"}]}))
        .await;
    server
        .post("/api/v1/applications")
        .json(&json!({"uuid": "B", "containers": []}))
        .await;

    let ids: Vec<String> = server.get("/api/v1/sidecars").await.json();
    assert_eq!(ids, vec!["A", "B"]);

    let response = server.get("/api/v1/sidecars/A").await;
    response.assert_status_ok();
    let status: Value = response.json();
    assert_eq!(status["uuid"], "A");
    assert!(status["lastSeen"].is_string());

    server
        .delete("/api/v1/sidecars/A")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get("/api/v1/sidecars/A")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // Deleting an unknown sidecar is a no-op
    server
        .delete("/api/v1/sidecars/A")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let ids: Vec<String> = server.get("/api/v1/sidecars").await.json();
    assert_eq!(ids, vec!["B"]);
    let items: Value = server.get("/api/v1/applications").await.json();
    assert_eq!(names(&items), vec!["Router", "grafana"]);
}

#[tokio::test]
async fn test_serve_icon_content_types() {
    let (_env, server) = server_with_icons().await;

    let response = server.get("/api/v1/icons/sonarr.svg").await;
    response.assert_status_ok();
    assert_eq!(response.header(header::CONTENT_TYPE), "image/svg+xml");
    assert_eq!(response.as_bytes().as_ref(), SONARR_SVG);

    let response = server.get("/api/v1/icons/plex.png").await;
    response.assert_status_ok();
    assert_eq!(response.header(header::CONTENT_TYPE), "image/png");
}

#[tokio::test]
async fn test_serve_icon_missing_and_traversal() {
    let (_env, server) = server_with_icons().await;

    server
        .get("/api/v1/icons/missing.png")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/api/v1/icons/..%2Fapplications_index.json")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_icons_default_before_catalog_loads() {
    let env = TestEnv::new();
    let server = TestServer::new(router(env.state())).unwrap();

    let response = server
        .post("/api/v1/applications")
        .json(&json!({"uuid": "A", "containers": [{"name": "Plex", "icon": "plex"}]}))
        .await;
    let body: Value = response.json();
    assert_eq!(body["containers"][0]["iconFile"], "/static/default-icon.svg");

    env.catalog.initialize(false).await.unwrap();

    // Previously registered items pick up the new index
    let items: Value = server.get("/api/v1/applications").await.json();
    let plex = items
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["name"] == "Plex")
        .unwrap();
    assert_eq!(plex["iconFile"], "/api/v1/icons/plex.png");
}

#[tokio::test]
async fn test_refresh_endpoint() {
    let env = TestEnv::new();
    let server = TestServer::new(router(env.state())).unwrap();

    let held = env.catalog.begin_refresh().unwrap();
    server
        .post("/api/v1/icons/refresh")
        .await
        .assert_status(StatusCode::CONFLICT);
    drop(held);

    server
        .post("/api/v1/icons/refresh")
        .await
        .assert_status(StatusCode::ACCEPTED);

    for _ in 0..200 {
        if !env.catalog.index().is_empty() && !env.catalog.is_refreshing() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    assert_eq!(env.catalog.index().len(), 3);
    assert!(env.catalog.has_cache());
}
