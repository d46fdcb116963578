use crate::batch::{BatchOrchestrator, BatchSummary};
use crate::config::Config;
use crate::csv_io;
use crate::db_storage::LeadStore;
use crate::enrichment::{process_lead, LeadEnricher};
use crate::errors::AppError;
use crate::models::*;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// The lead table.
    pub store: LeadStore,
    /// Enrichment service client.
    pub enricher: Arc<dyn LeadEnricher>,
    /// Application configuration.
    pub config: Config,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list_leads,
        create_lead,
        get_lead,
        delete_lead,
        enrich_lead,
        import_leads,
        export_leads
    ),
    components(schemas(
        Lead,
        NewLead,
        EnrichmentResult,
        CreatedLead,
        DeleteResult,
        EnrichRequest,
        BatchSummary
    )),
    tags((name = "leads", description = "OSINT-enriched sales leads"))
)]
pub struct ApiDoc;

/// Routes that are never rate limited: health and API docs.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/docs", get(serve_swagger_ui))
        .route("/api-docs/openapi.json", get(serve_openapi_spec))
}

/// Lead API routes.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/leads", get(list_leads).post(create_lead))
        .route("/api/leads/enrich", post(enrich_lead))
        .route("/api/leads/import", post(import_leads))
        .route("/api/leads/export", get(export_leads))
        .route("/api/leads/:id", get(get_lead).delete(delete_lead))
}

/// Full router without middleware layers.
pub fn build_router(state: Arc<AppState>) -> Router {
    public_routes().merge(api_routes()).with_state(state)
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "osint-leads-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Serves the generated OpenAPI document.
pub async fn serve_openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Serves a Swagger UI page that loads `/api-docs/openapi.json`.
pub async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>OSINT Leads API - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api-docs/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}

/// GET /api/leads
///
/// Every stored lead, newest first. No filtering or pagination.
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "leads",
    responses((status = 200, description = "Leads, newest first", body = [Lead]))
)]
pub async fn list_leads(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Lead>>, AppError> {
    let leads = state.store.list().await?;
    tracing::debug!("GET /api/leads - {} lead(s)", leads.len());
    Ok(Json(leads))
}

/// POST /api/leads
///
/// Stores an already-enriched lead. Omitted fields are stored as empty strings.
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "leads",
    request_body = NewLead,
    responses((status = 200, description = "Id of the new lead", body = CreatedLead))
)]
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewLead>,
) -> Result<Json<CreatedLead>, AppError> {
    let id = state.store.insert(&body).await?;
    tracing::info!("POST /api/leads - stored lead {}", id);
    Ok(Json(CreatedLead { id }))
}

/// GET /api/leads/:id
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "leads",
    params(("id" = i64, Path, description = "Lead id")),
    responses(
        (status = 200, description = "The lead", body = Lead),
        (status = 404, description = "No lead with this id")
    )
)]
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Lead>, AppError> {
    let lead = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lead with id {} not found", id)))?;
    Ok(Json(lead))
}

/// DELETE /api/leads/:id
///
/// Succeeds whether or not the lead existed.
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "leads",
    params(("id" = i64, Path, description = "Lead id")),
    responses((status = 200, description = "Always `{success: true}`", body = DeleteResult))
)]
pub async fn delete_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResult>, AppError> {
    let removed = state.store.delete(id).await?;
    tracing::info!("DELETE /api/leads/{} - removed: {}", id, removed);
    Ok(Json(DeleteResult { success: true }))
}

/// POST /api/leads/enrich
///
/// Enriches raw lead text through the AI service and stores the result.
#[utoipa::path(
    post,
    path = "/api/leads/enrich",
    tag = "leads",
    request_body = EnrichRequest,
    responses(
        (status = 201, description = "The stored lead", body = Lead),
        (status = 400, description = "Blank input"),
        (status = 502, description = "Enrichment service failed")
    )
)]
pub async fn enrich_lead(
    State(state): State<Arc<AppState>>,
    Json(body): Json<EnrichRequest>,
) -> Result<(StatusCode, Json<Lead>), AppError> {
    if body.input.trim().is_empty() {
        return Err(AppError::BadRequest("input must not be blank".to_string()));
    }

    tracing::info!("POST /api/leads/enrich - input: {}", body.input);
    let id = process_lead(state.enricher.as_ref(), &state.store, &body.input).await?;

    let lead = state.store.get(id).await?.ok_or_else(|| {
        AppError::InternalError(format!("Lead {} vanished right after insert", id))
    })?;

    Ok((StatusCode::CREATED, Json(lead)))
}

/// POST /api/leads/import
///
/// Runs a batch import over a header-less CSV body. Rows that fail are logged
/// and counted; they never abort the batch.
#[utoipa::path(
    post,
    path = "/api/leads/import",
    tag = "leads",
    request_body(content = String, description = "CSV, one lead per row", content_type = "text/csv"),
    responses(
        (status = 200, description = "Batch outcome", body = BatchSummary),
        (status = 400, description = "Body is not valid CSV")
    )
)]
pub async fn import_leads(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<BatchSummary>, AppError> {
    let rows = csv_io::read_import_rows(body.as_bytes())
        .map_err(|e| AppError::BadRequest(format!("Invalid CSV: {}", e)))?;

    let orchestrator = BatchOrchestrator::with_concurrency(state.config.batch_concurrency);
    let summary = orchestrator
        .run(state.enricher.as_ref(), &state.store, rows, |progress| {
            tracing::info!(
                "Batch import progress: {} of {}",
                progress.current,
                progress.total
            );
        })
        .await;

    Ok(Json(summary))
}

/// GET /api/leads/export
///
/// All leads as CSV with human-readable headers. `input_data` is not exported.
#[utoipa::path(
    get,
    path = "/api/leads/export",
    tag = "leads",
    responses((status = 200, description = "CSV export", body = String, content_type = "text/csv"))
)]
pub async fn export_leads(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let leads = state.store.list().await?;
    let body = csv_io::export_csv(&leads, state.config.export_utc_offset_hours)?;
    let filename = csv_io::export_filename(chrono::Utc::now().date_naive());

    tracing::info!("GET /api/leads/export - {} lead(s)", leads.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    ))
}
