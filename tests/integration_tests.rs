// Integration tests for HomeScout

use std::collections::HashSet;
use std::sync::Arc;

use homescout::core::MarketAnalyzer;
use homescout::models::Capability;
use homescout::services::{
    BlobStore, FileStore, ListingsClient, LlmClient, ProfileManager, SearchService, UsageTracker,
};

fn temp_store() -> Arc<dyn BlobStore> {
    let dir = std::env::temp_dir().join(format!("homescout-it-{}", uuid::Uuid::new_v4()));
    Arc::new(FileStore::new(dir).expect("temp store"))
}

fn all_capabilities() -> HashSet<Capability> {
    Capability::ALL.into_iter().collect()
}

fn build_service(
    listings_url: String,
    llm: Option<Arc<LlmClient>>,
    capabilities: HashSet<Capability>,
) -> SearchService {
    let store = temp_store();
    let listings = Arc::new(ListingsClient::new(listings_url, "test_key".to_string(), 5));
    let market = Arc::new(MarketAnalyzer::new(10));
    let profiles = Arc::new(ProfileManager::load(Arc::clone(&store)));
    let usage = Arc::new(UsageTracker::load(store, true, 25.0));

    SearchService::new(llm, listings, market, profiles, usage, capabilities, 100)
}

fn listing_json(address: &str, price: f64, bedrooms: u32) -> serde_json::Value {
    serde_json::json!({
        "formattedAddress": address,
        "price": price,
        "bedrooms": bedrooms,
        "bathrooms": 2.0,
        "propertyType": "Single Family",
        "squareFootage": 1800.0,
        "daysOnMarket": 25
    })
}

#[tokio::test]
async fn test_end_to_end_search_pipeline() {
    let mut server = mockito::Server::new_async().await;

    let body = serde_json::json!([
        listing_json("101 Congress Ave", 450_000.0, 3),
        listing_json("202 Lamar Blvd", 380_000.0, 3),
        listing_json("303 Guadalupe St", 495_000.0, 4),
    ]);

    let listings_mock = server
        .mock("GET", "/listings/sale")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let service = build_service(server.url(), None, all_capabilities());
    let outcome = service
        .search("3 bedroom houses in Austin, TX under 500k", 20)
        .await;

    listings_mock.assert_async().await;

    assert_eq!(outcome.params.city.as_deref(), Some("Austin"));
    assert_eq!(outcome.params.max_price, Some(500_000));
    assert_eq!(outcome.properties.len(), 3);
    assert_eq!(outcome.scored.len(), 3);
    assert!(outcome.diagnostics.is_empty());

    // Scored results are sorted best-first
    for i in 1..outcome.scored.len() {
        assert!(outcome.scored[i - 1].score >= outcome.scored[i].score);
    }

    let market = outcome.market.expect("market report present");
    assert_eq!(market.location, "Austin, TX");
    assert_eq!(market.listing_count, 3);
}

#[tokio::test]
async fn test_search_survives_listings_outage() {
    let mut server = mockito::Server::new_async().await;

    let listings_mock = server
        .mock("GET", "/listings/sale")
        .match_query(mockito::Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let service = build_service(server.url(), None, all_capabilities());
    let outcome = service.search("condos in Denver, CO", 20).await;

    listings_mock.assert_async().await;

    assert!(outcome.properties.is_empty());
    assert!(outcome.scored.is_empty());
    assert!(
        !outcome.diagnostics.is_empty(),
        "listings outage should surface a diagnostic"
    );

    // An empty result set still yields a report with zeroed aggregates
    let market = outcome.market.expect("market report present");
    assert_eq!(market.listing_count, 0);
    assert_eq!(market.average_price, 0.0);
}

#[tokio::test]
async fn test_remote_interpreter_result_is_used() {
    let mut listings_server = mockito::Server::new_async().await;
    let mut llm_server = mockito::Server::new_async().await;

    let completion = serde_json::json!({
        "choices": [{
            "message": {
                "content": "{\"city\":\"Denver\",\"state\":\"CO\",\"maxPrice\":600000,\"propertyType\":\"Condo\"}"
            }
        }]
    });

    let llm_mock = llm_server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion.to_string())
        .create_async()
        .await;

    let listings_mock = listings_server
        .mock("GET", "/listings/sale")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let llm = Arc::new(LlmClient::new(
        llm_server.url(),
        "test_key".to_string(),
        "test-model".to_string(),
        150,
        0.1,
        5,
    ));

    let service = build_service(listings_server.url(), Some(llm), all_capabilities());
    let outcome = service.search("affordable downtown condos near the park", 20).await;

    llm_mock.assert_async().await;
    listings_mock.assert_async().await;

    assert_eq!(outcome.params.city.as_deref(), Some("Denver"));
    assert_eq!(outcome.params.max_price, Some(600_000));
    assert!(outcome.diagnostics.is_empty());
}

#[tokio::test]
async fn test_remote_interpreter_state_is_normalized() {
    let mut listings_server = mockito::Server::new_async().await;
    let mut llm_server = mockito::Server::new_async().await;

    // Lowercase and spelled-out states both come back from models in
    // practice; only a 2-letter code may reach the listings provider
    let completion = serde_json::json!({
        "choices": [{
            "message": {
                "content": "{\"city\":\"Austin\",\"state\":\"tx\",\"maxPrice\":500000}"
            }
        }]
    });

    let llm_mock = llm_server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion.to_string())
        .create_async()
        .await;

    let listings_mock = listings_server
        .mock("GET", "/listings/sale")
        .match_query(mockito::Matcher::UrlEncoded(
            "state".to_string(),
            "TX".to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let llm = Arc::new(LlmClient::new(
        llm_server.url(),
        "test_key".to_string(),
        "test-model".to_string(),
        150,
        0.1,
        5,
    ));

    let service = build_service(listings_server.url(), Some(llm), all_capabilities());
    let outcome = service.search("homes around austin texas", 20).await;

    llm_mock.assert_async().await;
    listings_mock.assert_async().await;

    assert_eq!(outcome.params.state.as_deref(), Some("TX"));
}

#[tokio::test]
async fn test_interpreter_outage_falls_back_to_rules() {
    let mut listings_server = mockito::Server::new_async().await;
    let mut llm_server = mockito::Server::new_async().await;

    let llm_mock = llm_server
        .mock("POST", "/chat/completions")
        .with_status(503)
        .create_async()
        .await;

    let listings_mock = listings_server
        .mock("GET", "/listings/sale")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let llm = Arc::new(LlmClient::new(
        llm_server.url(),
        "test_key".to_string(),
        "test-model".to_string(),
        150,
        0.1,
        5,
    ));

    let service = build_service(listings_server.url(), Some(llm), all_capabilities());
    let outcome = service.search("2 bedroom apartments in Portland, OR", 20).await;

    llm_mock.assert_async().await;
    listings_mock.assert_async().await;

    // Rule-based fallback still extracts the filters
    assert_eq!(outcome.params.city.as_deref(), Some("Portland"));
    assert_eq!(outcome.params.min_bedrooms, Some(2));
    assert!(
        !outcome.diagnostics.is_empty(),
        "fallback should surface a diagnostic"
    );
}

#[tokio::test]
async fn test_disabled_capabilities_are_skipped() {
    let mut server = mockito::Server::new_async().await;

    let listings_mock = server
        .mock("GET", "/listings/sale")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!([listing_json("1 Main St", 300_000.0, 3)]).to_string())
        .create_async()
        .await;

    // Only recommendations enabled: no market report should be produced
    let capabilities: HashSet<Capability> = [Capability::Recommendations].into_iter().collect();

    let service = build_service(server.url(), None, capabilities);
    let outcome = service.search("houses in Austin, TX", 20).await;

    listings_mock.assert_async().await;

    assert_eq!(outcome.properties.len(), 1);
    assert_eq!(outcome.scored.len(), 1);
    assert!(outcome.market.is_none());
}
