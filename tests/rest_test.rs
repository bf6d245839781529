//! REST API tests. Spins the axum server up on a random port and talks
//! plain HTTP/1.1 over a TcpStream.

use prospectord::{config::ServerConfig, storage::Storage, AppContext};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Find a free local port by binding to port 0.
fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Build a minimal AppContext on a random port and start the server.
async fn start_server(dir: &TempDir) -> u16 {
    let port = find_free_port();
    let config = Arc::new(ServerConfig::new(
        Some(port),
        Some(dir.path().to_path_buf()),
        Some("error".to_string()),
        None,
    ));
    let storage = Arc::new(Storage::new(dir.path()).await.unwrap());
    let ctx = Arc::new(AppContext::new(config, storage));

    tokio::spawn(async move {
        let _ = prospectord::rest::start_rest_server(ctx).await;
    });

    // Give the server a moment to start
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    port
}

/// Send one HTTP/1.1 request and return (status code, parsed JSON body).
async fn request(
    port: u16,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<&str>,
) -> (u16, Value) {
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n");
    if let Some(token) = token {
        req.push_str(&format!("Authorization: Bearer {token}\r\n"));
    }
    if let Some(body) = body {
        req.push_str(&format!(
            "Content-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        ));
    } else {
        req.push_str("\r\n");
    }

    let mut stream = TcpStream::connect(format!("127.0.0.1:{port}")).await.unwrap();
    stream.write_all(req.as_bytes()).await.unwrap();

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    let response = String::from_utf8_lossy(&buf).to_string();

    let status: u16 = response
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .expect("malformed status line");

    let body_start = response
        .find("\r\n\r\n")
        .map(|i| i + 4)
        .expect("no body separator");
    let body_text = response[body_start..].trim();
    let json = if body_text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body_text).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn register(port: u16, email: &str) -> String {
    let (status, body) = request(
        port,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(&format!(r#"{{"email":"{email}","name":"Test User"}}"#)),
    )
    .await;
    assert_eq!(status, 201);
    body["apiToken"].as_str().expect("token in response").to_string()
}

#[tokio::test]
async fn health_endpoint_is_open() {
    let dir = TempDir::new().unwrap();
    let port = start_server(&dir).await;

    let (status, body) = request(port, "GET", "/api/v1/health", None, None).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"].as_str().unwrap(), env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn entity_endpoints_require_a_token() {
    let dir = TempDir::new().unwrap();
    let port = start_server(&dir).await;

    let (status, body) = request(port, "GET", "/api/v1/prospects", None, None).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = request(port, "GET", "/api/v1/prospects", Some("bogus"), None).await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn prospect_creation_applies_defaults() {
    let dir = TempDir::new().unwrap();
    let port = start_server(&dir).await;
    let token = register(port, "defaults@crm.example").await;

    let (status, body) = request(
        port,
        "POST",
        "/api/v1/prospects",
        Some(&token),
        Some(r#"{"name":"Acme Corp","company":"Acme"}"#),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(body["status"], "NEW");
    assert_eq!(body["priority"], "MEDIUM");
    assert_eq!(body["sourceChannel"], "WEB");

    // Blank name is rejected before any store call.
    let (status, body) = request(
        port,
        "POST",
        "/api/v1/prospects",
        Some(&token),
        Some(r#"{"name":"  "}"#),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "missing name");
}

#[tokio::test]
async fn list_filters_by_status_over_http() {
    let dir = TempDir::new().unwrap();
    let port = start_server(&dir).await;
    let token = register(port, "filters@crm.example").await;

    for (name, status) in [("A", "NEW"), ("B", "CONTACTED"), ("C", "QUALIFIED")] {
        let (code, _) = request(
            port,
            "POST",
            "/api/v1/prospects",
            Some(&token),
            Some(&format!(r#"{{"name":"{name}","status":"{status}"}}"#)),
        )
        .await;
        assert_eq!(code, 201);
    }

    let (_, all) = request(port, "GET", "/api/v1/prospects", Some(&token), None).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, contacted) = request(
        port,
        "GET",
        "/api/v1/prospects?status=CONTACTED",
        Some(&token),
        None,
    )
    .await;
    let contacted = contacted.as_array().unwrap();
    assert_eq!(contacted.len(), 1);
    assert_eq!(contacted[0]["name"], "B");

    let (_, todos) = request(
        port,
        "GET",
        "/api/v1/prospects?status=TODOS",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(todos.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn other_owners_records_are_indistinguishable_from_absent() {
    let dir = TempDir::new().unwrap();
    let port = start_server(&dir).await;
    let token_a = register(port, "alice@crm.example").await;
    let token_b = register(port, "bob@crm.example").await;

    let (_, created) = request(
        port,
        "POST",
        "/api/v1/prospects",
        Some(&token_a),
        Some(r#"{"name":"Private Lead"}"#),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (_, b_list) = request(port, "GET", "/api/v1/prospects", Some(&token_b), None).await;
    assert!(b_list.as_array().unwrap().is_empty());

    let (status, body) = request(
        port,
        "DELETE",
        &format!("/api/v1/prospects/{id}"),
        Some(&token_b),
        None,
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "not found");

    // The owner can still delete it.
    let (status, _) = request(
        port,
        "DELETE",
        &format!("/api/v1/prospects/{id}"),
        Some(&token_a),
        None,
    )
    .await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn interaction_creation_requires_an_existing_prospect() {
    let dir = TempDir::new().unwrap();
    let port = start_server(&dir).await;
    let token = register(port, "interactions@crm.example").await;

    let (status, body) = request(
        port,
        "POST",
        "/api/v1/interactions",
        Some(&token),
        Some(r#"{"prospectId":"no-such-prospect","channel":"CALL","subject":"Hi"}"#),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "prospect not found");
}

#[tokio::test]
async fn followup_status_is_forced_to_pending() {
    let dir = TempDir::new().unwrap();
    let port = start_server(&dir).await;
    let token = register(port, "followups@crm.example").await;

    let (_, prospect) = request(
        port,
        "POST",
        "/api/v1/prospects",
        Some(&token),
        Some(r#"{"name":"Followup Target"}"#),
    )
    .await;
    let prospect_id = prospect["id"].as_str().unwrap();

    let body = format!(
        r#"{{"prospectId":"{prospect_id}","title":"Call back","scheduledAt":"2024-06-01T09:00:00+00:00","status":"COMPLETED"}}"#
    );
    let (status, created) = request(
        port,
        "POST",
        "/api/v1/followups",
        Some(&token),
        Some(&body),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(created["status"], "PENDING", "client-supplied status is ignored");
}

#[tokio::test]
async fn move_endpoint_transplants_a_routed_contact() {
    let dir = TempDir::new().unwrap();
    let port = start_server(&dir).await;
    let token = register(port, "mover@crm.example").await;

    let (status, routed) = request(
        port,
        "POST",
        "/api/v1/routed-contacts",
        Some(&token),
        Some(r#"{"name":"Laura Medina","company":"Clinica Norte","bucket":"clinics"}"#),
    )
    .await;
    assert_eq!(status, 201);
    let routed_id = routed["id"].as_str().unwrap();

    let body = format!(
        r#"{{"sourceKind":"routed-contacts","sourceId":"{routed_id}","destinationKind":"prospects"}}"#
    );
    let (status, report) = request(port, "POST", "/api/v1/moves", Some(&token), Some(&body)).await;
    assert_eq!(status, 200);
    assert_eq!(report["status"], "moved");
    assert_eq!(report["destinationKind"], "prospects");

    let (_, routed_left) = request(port, "GET", "/api/v1/routed-contacts", Some(&token), None).await;
    assert!(routed_left.as_array().unwrap().is_empty());

    let (_, prospects) = request(port, "GET", "/api/v1/prospects", Some(&token), None).await;
    let prospects = prospects.as_array().unwrap();
    assert_eq!(prospects.len(), 1);
    assert_eq!(prospects[0]["name"], "Laura Medina");
    assert_eq!(prospects[0]["status"], "NEW");

    // Missing sub-type on a destination that needs one: 400, nothing created.
    let prospect_id = prospects[0]["id"].as_str().unwrap();
    let body = format!(
        r#"{{"sourceKind":"prospects","sourceId":"{prospect_id}","destinationKind":"interactions"}}"#
    );
    let (status, err) = request(port, "POST", "/api/v1/moves", Some(&token), Some(&body)).await;
    assert_eq!(status, 400);
    assert_eq!(err["error"], "missing type");
    let (_, still_there) = request(port, "GET", "/api/v1/prospects", Some(&token), None).await;
    assert_eq!(still_there.as_array().unwrap().len(), 1);

    // Unknown source id: 404 before anything else.
    let (status, err) = request(
        port,
        "POST",
        "/api/v1/moves",
        Some(&token),
        Some(r#"{"sourceKind":"prospects","sourceId":"x","destinationKind":"followups"}"#),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(err["error"], "not found");
}
