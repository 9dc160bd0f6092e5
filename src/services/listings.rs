use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::{FilterParameters, PropertyRecord};

/// Errors that can occur when calling the listings provider
#[derive(Debug, Error)]
pub enum ListingsError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// RentCast-style listings provider client.
///
/// Issues a single best-effort request per search with a fixed page-size
/// cap; there is no retry or backoff.
pub struct ListingsClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl ListingsClient {
    pub fn new(base_url: String, api_key: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }

    /// Fetch active sale listings matching the filter parameters.
    ///
    /// A non-2xx status or a non-array body is a hard failure for this
    /// call; callers recover by proceeding with an empty result set.
    pub async fn search_sale(
        &self,
        params: &FilterParameters,
        limit: usize,
    ) -> Result<Vec<PropertyRecord>, ListingsError> {
        let mut query = String::from("?");

        if let Some(city) = &params.city {
            query.push_str(&format!("city={}&", urlencoding::encode(city)));
        }
        if let Some(state) = &params.state {
            query.push_str(&format!("state={}&", urlencoding::encode(state)));
        }
        if let Some(min_price) = params.min_price {
            query.push_str(&format!("minPrice={}&", min_price));
        }
        if let Some(max_price) = params.max_price {
            query.push_str(&format!("maxPrice={}&", max_price));
        }
        if let Some(bedrooms) = params.min_bedrooms {
            query.push_str(&format!("bedrooms={}&", bedrooms));
        }
        if let Some(property_type) = params.property_type {
            query.push_str(&format!(
                "propertyType={}&",
                urlencoding::encode(&property_type.to_string())
            ));
        }
        query.push_str(&format!("status=Active&limit={}", limit));

        let url = format!(
            "{}/listings/sale{}",
            self.base_url.trim_end_matches('/'),
            query
        );

        tracing::debug!("Fetching listings from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .header("accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ListingsError::ApiError(format!(
                "Failed to fetch listings: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let items = json
            .as_array()
            .ok_or_else(|| ListingsError::InvalidResponse("Expected a JSON array".into()))?;

        let properties: Vec<PropertyRecord> = items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect();

        tracing::debug!(
            "Fetched {} listings ({} raw items)",
            properties.len(),
            items.len()
        );

        Ok(properties)
    }
}
