mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use config::Settings;
use core::{InvestmentAnalyzer, MarketAnalyzer};
use routes::AppState;
use services::{FileStore, ListingsClient, LlmClient, ProfileManager, SearchService, UsageTracker};
use std::sync::Arc;
use tracing::{error, info};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting HomeScout search service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize local storage
    let store: Arc<dyn services::BlobStore> = Arc::new(
        FileStore::new(&settings.storage.data_dir).unwrap_or_else(|e| {
            error!("Failed to open data directory {}: {}", settings.storage.data_dir, e);
            panic!("Storage error: {}", e);
        }),
    );

    info!("File store initialized at {}", settings.storage.data_dir);

    // Initialize listings client
    let listings = Arc::new(ListingsClient::new(
        settings.listings.base_url.clone(),
        settings.listings.api_key.clone(),
        settings.listings.timeout_secs,
    ));

    info!("Listings client initialized ({})", settings.listings.base_url);

    // Remote interpreter is optional; without a key the rule-based
    // interpreter handles every query.
    let llm = if settings.llm.api_key.is_empty() {
        info!("No interpreter API key configured, using rule-based interpretation only");
        None
    } else {
        info!("Remote interpreter enabled (model: {})", settings.llm.model);
        Some(Arc::new(LlmClient::new(
            settings.llm.endpoint.clone(),
            settings.llm.api_key.clone(),
            settings.llm.model.clone(),
            settings.llm.max_tokens,
            settings.llm.temperature,
            settings.llm.timeout_secs,
        )))
    };

    // Initialize profile and usage state from storage
    let profiles = Arc::new(ProfileManager::load(Arc::clone(&store)));
    let usage = Arc::new(UsageTracker::load(
        Arc::clone(&store),
        settings.usage.tracking,
        settings.usage.monthly_cost_limit,
    ));

    let market = Arc::new(MarketAnalyzer::new(settings.market.cache_size));

    let capabilities = settings.features.enabled();
    info!("Enabled capabilities: {}", capabilities.len());

    let search = Arc::new(SearchService::new(
        llm,
        listings,
        Arc::clone(&market),
        Arc::clone(&profiles),
        Arc::clone(&usage),
        capabilities,
        settings.listings.max_results,
    ));

    // Build application state
    let app_state = AppState {
        search,
        market,
        investment: InvestmentAnalyzer::new(),
        profiles,
        usage,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
