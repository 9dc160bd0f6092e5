use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::domain::{
    Capability, FilterParameters, MarketReport, PropertyRecord, ScoredProperty,
};

/// Response for the full search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub params: FilterParameters,
    pub properties: Vec<PropertyRecord>,
    pub recommendations: Vec<ScoredProperty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<MarketReport>,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Record interaction response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordInteractionResponse {
    pub success: bool,
    #[serde(rename = "eventId")]
    pub event_id: String,
}

/// Month-to-date usage summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageSummaryResponse {
    pub year: i32,
    pub month: u32,
    #[serde(rename = "monthlyCost")]
    pub monthly_cost: f64,
    #[serde(rename = "monthlyLimit")]
    pub monthly_limit: f64,
    pub calls: HashMap<Capability, u32>,
}
