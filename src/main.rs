use axum::extract::DefaultBodyLimit;
use osint_leads_api::config::Config;
use osint_leads_api::db::Database;
use osint_leads_api::db_storage::LeadStore;
use osint_leads_api::handlers::{self, AppState};
use osint_leads_api::services::GeminiService;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// Initializes logging, configuration, the lead store (migrations and the
/// optional reset), the Gemini client and the HTTP routes, then serves.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "osint_leads_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Open the lead store; failure here is fatal
    let db = Database::new(&config.database_url).await?;
    let store = LeadStore::new(db.pool.clone());
    if config.reset_on_start {
        store.reset().await?;
    }
    tracing::info!("Lead store ready with {} lead(s)", store.count().await?);

    let enricher = GeminiService::new(&config)?;
    tracing::info!("✓ Gemini client initialized: {}", config.gemini_model);

    let app_state = Arc::new(AppState {
        store,
        enricher: Arc::new(enricher),
        config: config.clone(),
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("invalid rate limiter configuration"))?,
    );

    let protected_routes = handlers::api_routes().layer(
        ServiceBuilder::new()
            // CSV imports may exceed axum's default extractor limit
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(5 * 1024 * 1024))
            .layer(GovernorLayer {
                config: governor_conf,
            }),
    );

    // Health and docs bypass rate limiting
    let app = handlers::public_routes()
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
