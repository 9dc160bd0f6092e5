use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::{InvestmentAnalyzer, MarketAnalyzer};
use crate::models::{
    ErrorResponse, HealthResponse, InteractionAction, InterpretRequest, PropertyRecord,
    RecordInteractionRequest, RecordInteractionResponse, SearchRequest, SearchResponse,
};
use crate::services::{ProfileManager, SearchService, UsageTracker};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
    pub market: Arc<MarketAnalyzer>,
    pub investment: InvestmentAnalyzer,
    pub profiles: Arc<ProfileManager>,
    pub usage: Arc<UsageTracker>,
}

/// Configure all search-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/search", web::post().to(search))
        .route("/search/interpret", web::post().to(interpret))
        .route("/search/interaction", web::post().to(record_interaction))
        .route("/market", web::get().to(market_report))
        .route("/investment", web::post().to(investment_report))
        .route("/usage", web::get().to(usage_summary))
        .route("/profile", web::get().to(profile_snapshot));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Full search endpoint
///
/// POST /api/v1/search
///
/// Request body:
/// ```json
/// {
///   "query": "3 bedroom houses in Austin, TX under 500k",
///   "limit": 20
/// }
/// ```
async fn search(state: web::Data<AppState>, req: web::Json<SearchRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for search request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    tracing::info!("Search: \"{}\", limit: {}", req.query, req.limit);

    let outcome = state.search.search(&req.query, req.limit as usize).await;

    let response = SearchResponse {
        total_results: outcome.properties.len(),
        params: outcome.params,
        properties: outcome.properties,
        recommendations: outcome.scored,
        market: outcome.market,
        diagnostics: outcome.diagnostics,
    };

    HttpResponse::Ok().json(response)
}

/// Interpret-only endpoint
///
/// POST /api/v1/search/interpret
///
/// Returns the filter parameters extracted from the query without
/// fetching any listings.
async fn interpret(state: web::Data<AppState>, req: web::Json<InterpretRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let (params, _) = state.search.interpret(&req.query).await;
    HttpResponse::Ok().json(params)
}

/// Record interaction endpoint
///
/// POST /api/v1/search/interaction
///
/// Request body:
/// ```json
/// {
///   "property": { "formattedAddress": "...", "price": 450000, ... },
///   "action": "viewed|saved|contacted|dismissed"
/// }
/// ```
async fn record_interaction(
    state: web::Data<AppState>,
    req: web::Json<RecordInteractionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let action = match req.action.to_lowercase().as_str() {
        "viewed" => InteractionAction::Viewed,
        "saved" => InteractionAction::Saved,
        "contacted" => InteractionAction::Contacted,
        "dismissed" => InteractionAction::Dismissed,
        _ => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid action".to_string(),
                message: "Action must be one of: viewed, saved, contacted, dismissed".to_string(),
                status_code: 400,
            });
        }
    };

    // Best-effort persistence; the profile update itself cannot fail
    state.profiles.record(&req.property, action).await;

    HttpResponse::Ok().json(RecordInteractionResponse {
        success: true,
        event_id: uuid::Uuid::new_v4().to_string(),
    })
}

/// Cached market report lookup
///
/// GET /api/v1/market?location={location}
///
/// Returns the most recent market report computed for the location, if
/// one exists. Reports are produced as a side effect of searches.
async fn market_report(
    state: web::Data<AppState>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let location = match query.get("location") {
        Some(location) => location,
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Missing location parameter".to_string(),
                message: "location query parameter is required".to_string(),
                status_code: 400,
            });
        }
    };

    match state.market.cached(location) {
        Some(report) => HttpResponse::Ok().json(report),
        None => HttpResponse::NotFound().json(ErrorResponse {
            error: "No market report".to_string(),
            message: format!("No report computed yet for {}", location),
            status_code: 404,
        }),
    }
}

/// Investment analysis endpoint
///
/// POST /api/v1/investment
///
/// Request body: a single property record. Returns 422 when the record
/// carries no usable price.
async fn investment_report(
    state: web::Data<AppState>,
    req: web::Json<PropertyRecord>,
) -> impl Responder {
    match state.investment.analyze(&req) {
        Some(report) => HttpResponse::Ok().json(report),
        None => HttpResponse::UnprocessableEntity().json(ErrorResponse {
            error: "Unanalyzable property".to_string(),
            message: "Property has no usable listing price".to_string(),
            status_code: 422,
        }),
    }
}

/// Month-to-date usage summary
///
/// GET /api/v1/usage
async fn usage_summary(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.usage.monthly_summary().await)
}

/// Current user profile snapshot
///
/// GET /api/v1/profile
async fn profile_snapshot(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.profiles.snapshot().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }
}
