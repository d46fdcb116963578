/// HTTP integration tests with a mocked Gemini endpoint
/// Drives the full router through `oneshot` against an in-memory lead store
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use osint_leads_api::config::{Config, MalformedResponsePolicy};
use osint_leads_api::csv_io::read_export;
use osint_leads_api::db::Database;
use osint_leads_api::db_storage::LeadStore;
use osint_leads_api::handlers::{build_router, AppState};
use osint_leads_api::services::GeminiService;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/models/test-model:generateContent";
const TENDA: &str = "Construtora Tenda, João Silva, Diretor de Marketing";

/// Helper function to create test config
fn create_test_config(base_url: String) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        port: 3000,
        gemini_api_key: "test-key".to_string(),
        gemini_model: "test-model".to_string(),
        gemini_base_url: base_url,
        gemini_timeout_secs: Some(5),
        reset_on_start: false,
        malformed_policy: MalformedResponsePolicy::Blank,
        batch_concurrency: 1,
        export_utc_offset_hours: -3,
    }
}

async fn test_app(mock_server: &MockServer) -> (Router, LeadStore) {
    let config = create_test_config(mock_server.uri());
    let db = Database::new(&config.database_url).await.unwrap();
    let store = LeadStore::new(db.pool.clone());
    let enricher = GeminiService::new(&config).unwrap();

    let state = Arc::new(AppState {
        store: store.clone(),
        enricher: Arc::new(enricher),
        config,
    });
    (build_router(state), store)
}

async fn mount_tenda(mock_server: &MockServer) {
    let answer = json!({
        "Nome e Sobrenome": "João Silva",
        "Cargo": "Diretor de Marketing",
        "Empresa": "Construtora Tenda",
        "Email 1": "joao.silva@tenda.com",
        "Estado": "SP"
    });
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_string_contains("Construtora Tenda"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": answer.to_string() }] } }]
        })))
        .with_priority(1)
        .mount(mock_server)
        .await;
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let mock_server = MockServer::start().await;
    let (app, _) = test_app(&mock_server).await;

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "osint-leads-api");
}

#[tokio::test]
async fn test_enrich_endpoint_stores_lead_first_in_list() {
    let mock_server = MockServer::start().await;
    mount_tenda(&mock_server).await;
    let (app, store) = test_app(&mock_server).await;

    let (status, body) = send(&app, post_json("/api/leads/enrich", json!({ "input": TENDA }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let created: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(created["input_data"], TENDA);
    assert_eq!(created["empresa"], "Construtora Tenda");
    assert_eq!(created["cargo"], "Diretor de Marketing");
    assert_eq!(created["whatsapp"], "");

    let (status, body) = send(&app, get("/api/leads")).await;
    assert_eq!(status, StatusCode::OK);
    let leads: Vec<Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0]["input_data"], TENDA);
    assert_eq!(leads[0]["id"], created["id"]);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_enrich_rejects_blank_input() {
    let mock_server = MockServer::start().await;
    let (app, store) = test_app(&mock_server).await;

    let (status, body) = send(&app, post_json("/api/leads/enrich", json!({ "input": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].is_string());
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_enrich_upstream_failure_is_bad_gateway() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    let (app, store) = test_app(&mock_server).await;

    let (status, _) = send(&app, post_json("/api/leads/enrich", json!({ "input": TENDA }))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_get_delete_cycle() {
    let mock_server = MockServer::start().await;
    let (app, _) = test_app(&mock_server).await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/leads",
            json!({
                "input_data": "Editora Abril",
                "Empresa": "Editora Abril",
                "Telefone 1": "(11) 3037-2000"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = serde_json::from_slice::<Value>(&body).unwrap()["id"]
        .as_i64()
        .unwrap();

    let (status, body) = send(&app, get(&format!("/api/leads/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    let lead: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(lead["empresa"], "Editora Abril");
    assert_eq!(lead["telefone_1"], "(11) 3037-2000");
    assert_eq!(lead["site"], "");

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/api/leads/{}", id))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, delete).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({ "success": true }));

    let (status, _) = send(&app, get(&format!("/api/leads/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_unknown_id_still_succeeds() {
    let mock_server = MockServer::start().await;
    let (app, _) = test_app(&mock_server).await;

    let delete = Request::builder()
        .method("DELETE")
        .uri("/api/leads/4242")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, delete).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap()["success"], true);
}

#[tokio::test]
async fn test_create_with_empty_body_stores_blank_lead() {
    let mock_server = MockServer::start().await;
    let (app, store) = test_app(&mock_server).await;

    let (status, _) = send(&app, post_json("/api/leads", json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    let leads = store.list().await.unwrap();
    assert_eq!(leads.len(), 1);
    assert!(leads[0].enrichment().is_blank());
}

#[tokio::test]
async fn test_import_endpoint_counts_failures() {
    let mock_server = MockServer::start().await;
    mount_tenda(&mock_server).await;
    // Anything not mentioning Tenda fails upstream
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    let (app, store) = test_app(&mock_server).await;

    let csv = "Construtora Tenda,João Silva,Diretor de Marketing\nEditora Abril,Maria Souza\n\n";
    let request = Request::builder()
        .method("POST")
        .uri("/api/leads/import")
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(csv))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let summary: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(summary["total"], 2);
    assert_eq!(summary["inserted"], 1);
    assert_eq!(summary["failed"], 1);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_export_endpoint_serves_csv() {
    let mock_server = MockServer::start().await;
    mount_tenda(&mock_server).await;
    let (app, _) = test_app(&mock_server).await;

    let (status, _) = send(&app, post_json("/api/leads/enrich", json!({ "input": TENDA }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let response = app.clone().oneshot(get("/api/leads/export")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"leads_"));
    assert!(disposition.ends_with(".csv\""));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let exported = read_export(&body[..]).unwrap();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].enrichment.empresa, "Construtora Tenda");
    assert_eq!(exported[0].enrichment.email_1, "joao.silva@tenda.com");
}

#[tokio::test]
async fn test_openapi_document_lists_lead_routes() {
    let mock_server = MockServer::start().await;
    let (app, _) = test_app(&mock_server).await;

    let (status, body) = send(&app, get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);

    let doc: Value = serde_json::from_slice(&body).unwrap();
    assert!(doc["paths"]["/api/leads"].is_object());
    assert!(doc["paths"]["/api/leads/{id}"].is_object());
}
