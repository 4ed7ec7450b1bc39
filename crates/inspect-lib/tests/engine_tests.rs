//! Integration tests for the engine client against a fake engine

use axum::{
    extract::{Path, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use ctrinspect_lib::{
    render_details, ContainerInspector, ContainerStatus, EngineClient, EngineConfig, Endpoint,
    Error,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// Unusual but valid JSON: odd key order, spacing and escapes
const RAW_BODY: &str = "{\"State\":{\"Pid\":4242,\"Running\":true,\"Status\":\"running\"},\n  \"Name\" : \"/web\",\"Id\":\"4fa6e0f0c678\",\"Labels\":{\"z\":\"\\u00e9\",\"a\":\"1\"}}\n";

/// Valid JSON with `null` where the engine normally sends strings
const NULL_FIELDS_BODY: &str = "{\"Id\":\"abc\",\"Name\":\"/web\",\"Driver\":null,\"Platform\":null,\"State\":{\"Status\":\"running\",\"Running\":true,\"Pid\":7,\"Error\":null}}";

#[derive(Clone, Default)]
struct FakeEngine {
    requests: Arc<Mutex<Vec<String>>>,
    api_version: Option<&'static str>,
}

impl FakeEngine {
    fn record(&self, uri: &Uri) {
        self.requests.lock().unwrap().push(uri.to_string());
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn ping(State(engine): State<FakeEngine>, uri: Uri) -> Response {
    engine.record(&uri);
    match engine.api_version {
        Some(version) => ([("api-version", version)], "OK").into_response(),
        None => "OK".into_response(),
    }
}

async fn inspect(
    State(engine): State<FakeEngine>,
    Path((_version, id)): Path<(String, String)>,
    uri: Uri,
) -> Response {
    engine.record(&uri);
    match id.as_str() {
        "4fa6e0f0c678" | "web" => {
            ([(header::CONTENT_TYPE, "application/json")], RAW_BODY).into_response()
        }
        "abc" => ([(header::CONTENT_TYPE, "application/json")], NULL_FIELDS_BODY).into_response(),
        "garbled" => ([(header::CONTENT_TYPE, "application/json")], "{not json").into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": format!("No such container: {}", id) })),
        )
            .into_response(),
    }
}

async fn spawn_engine(engine: FakeEngine) -> SocketAddr {
    let app = Router::new()
        .route("/_ping", get(ping))
        .route("/:version/containers/:id/json", get(inspect))
        .with_state(engine);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn config_for(addr: SocketAddr, api_version: Option<&str>) -> EngineConfig {
    EngineConfig {
        endpoint: Endpoint::Tcp {
            host: addr.ip().to_string(),
            port: addr.port(),
        },
        api_version: api_version.map(str::to_string),
        tls: None,
    }
}

#[tokio::test]
async fn test_raw_body_is_passed_through_unchanged() {
    let engine = FakeEngine {
        api_version: Some("1.41"),
        ..Default::default()
    };
    let addr = spawn_engine(engine.clone()).await;

    let mut client = EngineClient::connect(&config_for(addr, None)).await.unwrap();
    let inspection = client.inspect("4fa6e0f0c678", false).await.unwrap();
    client.close().await;

    assert_eq!(inspection.raw, RAW_BODY.as_bytes());
    assert_eq!(inspection.record.id, "4fa6e0f0c678");
    assert_eq!(inspection.record.name, "/web");
    let state = inspection.record.state.unwrap();
    assert_eq!(state.status, ContainerStatus::Running);
    assert_eq!(state.live_pid(), Some(4242));
}

#[tokio::test]
async fn test_null_string_fields_are_tolerated() {
    let addr = spawn_engine(FakeEngine::default()).await;

    let mut client = EngineClient::connect(&config_for(addr, Some("1.43")))
        .await
        .unwrap();
    let inspection = client.inspect("abc", false).await.unwrap();
    client.close().await;

    assert_eq!(inspection.raw, NULL_FIELDS_BODY.as_bytes());
    assert_eq!(inspection.record.driver, "");
    assert_eq!(inspection.record.state.as_ref().unwrap().live_pid(), Some(7));

    let details = render_details(&inspection.record, false);
    assert!(details.contains("Name: /web\n"), "{}", details);
    assert!(details.contains("Driver: \n"), "{}", details);
}

#[tokio::test]
async fn test_negotiates_lower_server_version() {
    let engine = FakeEngine {
        api_version: Some("1.41"),
        ..Default::default()
    };
    let addr = spawn_engine(engine.clone()).await;

    let mut client = EngineClient::connect(&config_for(addr, None)).await.unwrap();
    assert_eq!(client.api_version(), "1.41");
    client.inspect("web", false).await.unwrap();
    client.close().await;

    assert_eq!(
        engine.requests(),
        vec![
            "/_ping".to_string(),
            "/v1.41/containers/web/json?size=false".to_string()
        ]
    );
}

#[tokio::test]
async fn test_missing_version_header_falls_back() {
    let engine = FakeEngine::default();
    let addr = spawn_engine(engine.clone()).await;

    let client = EngineClient::connect(&config_for(addr, None)).await.unwrap();
    assert_eq!(client.api_version(), "1.24");
    client.close().await;
}

#[tokio::test]
async fn test_pinned_version_skips_ping_and_requests_size() {
    let engine = FakeEngine::default();
    let addr = spawn_engine(engine.clone()).await;

    let mut client = EngineClient::connect(&config_for(addr, Some("1.40")))
        .await
        .unwrap();
    client.inspect("web", true).await.unwrap();
    client.close().await;

    assert_eq!(
        engine.requests(),
        vec!["/v1.40/containers/web/json?size=true".to_string()]
    );
}

#[tokio::test]
async fn test_unknown_container_is_inspection_error() {
    let addr = spawn_engine(FakeEngine::default()).await;

    let mut client = EngineClient::connect(&config_for(addr, Some("1.43")))
        .await
        .unwrap();
    let err = client.inspect("nope", false).await.unwrap_err();
    client.close().await;

    assert!(matches!(err, Error::Inspection { ref id, .. } if id == "nope"));
    assert_eq!(
        err.to_string(),
        "inspect for 'nope' failed: engine returned 404 Not Found: No such container: nope"
    );
}

#[tokio::test]
async fn test_undecodable_body_is_inspection_error() {
    let addr = spawn_engine(FakeEngine::default()).await;

    let mut client = EngineClient::connect(&config_for(addr, Some("1.43")))
        .await
        .unwrap();
    let err = client.inspect("garbled", false).await.unwrap_err();
    client.close().await;

    assert!(err.to_string().contains("invalid response body"));
}

#[tokio::test]
async fn test_refused_connection() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = EngineClient::connect(&config_for(addr, None))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, Error::Connection { .. }));
    assert!(err.to_string().contains(&format!("tcp://127.0.0.1:{}", addr.port())));
}
