use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Property type enumeration used by the listings provider.
///
/// Anything outside the known set deserializes to `Unknown` rather than
/// failing the whole record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "Single Family")]
    SingleFamily,
    Condo,
    Townhouse,
    #[serde(rename = "Multi-Family")]
    MultiFamily,
    #[serde(other)]
    Unknown,
}

impl Default for PropertyType {
    fn default() -> Self {
        PropertyType::Unknown
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PropertyType::SingleFamily => "Single Family",
            PropertyType::Condo => "Condo",
            PropertyType::Townhouse => "Townhouse",
            PropertyType::MultiFamily => "Multi-Family",
            PropertyType::Unknown => "Unknown",
        };
        write!(f, "{}", label)
    }
}

/// A single sale listing as returned by the listings provider.
///
/// Every field is defaulted so a sparse provider record still parses;
/// metrics that need a missing field skip the record instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRecord {
    #[serde(rename = "formattedAddress", default)]
    pub formatted_address: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: f64,
    #[serde(rename = "propertyType", default)]
    pub property_type: PropertyType,
    #[serde(rename = "squareFootage", default)]
    pub square_footage: Option<f64>,
    #[serde(rename = "daysOnMarket", default)]
    pub days_on_market: Option<u32>,
}

impl PropertyRecord {
    /// Price per square foot, when both values are positive.
    pub fn price_per_sqft(&self) -> Option<f64> {
        match self.square_footage {
            Some(area) if area > 0.0 && self.price > 0.0 => Some(self.price / area),
            _ => None,
        }
    }
}

/// Structured search filters extracted from free text.
///
/// Absent fields mean "unconstrained". Built fresh for every query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(rename = "minPrice", default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<u64>,
    #[serde(rename = "maxPrice", default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u64>,
    #[serde(rename = "minBedrooms", default, skip_serializing_if = "Option::is_none")]
    pub min_bedrooms: Option<u32>,
    #[serde(rename = "maxBedrooms", default, skip_serializing_if = "Option::is_none")]
    pub max_bedrooms: Option<u32>,
    #[serde(rename = "propertyType", default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
}

impl FilterParameters {
    pub fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.state.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_bedrooms.is_none()
            && self.max_bedrooms.is_none()
            && self.property_type.is_none()
    }

    /// Enforce field invariants on parameters from an external source.
    ///
    /// The state must be a 2-letter code and is stored uppercase; any
    /// other shape is dropped rather than passed to the listings
    /// provider. Blank strings count as absent.
    pub fn normalize(&mut self) {
        if let Some(city) = &self.city {
            let trimmed = city.trim();
            self.city = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
        if let Some(state) = &self.state {
            let trimmed = state.trim();
            self.state = (trimmed.len() == 2
                && trimmed.chars().all(|c| c.is_ascii_alphabetic()))
            .then(|| trimmed.to_uppercase());
        }
    }

    /// Human-readable location for market reports, e.g. "Austin, TX".
    pub fn location_label(&self) -> String {
        match (&self.city, &self.state) {
            (Some(city), Some(state)) => format!("{}, {}", city, state),
            (Some(city), None) => city.clone(),
            (None, Some(state)) => state.clone(),
            (None, None) => "your search area".to_string(),
        }
    }
}

/// A property annotated with a suitability score and up to three reasons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredProperty {
    #[serde(flatten)]
    pub property: PropertyRecord,
    pub score: u8,
    pub reasons: Vec<String>,
}

/// User action recorded against a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionAction {
    Viewed,
    Saved,
    Contacted,
    Dismissed,
}

/// One entry in the chronological interaction log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub property: PropertyRecord,
    pub action: InteractionAction,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Accumulated preferences for the single local user.
///
/// Grows monotonically; derived fields are recomputed from the log on
/// every interaction. Missing or corrupt persisted state decodes to the
/// default empty profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "avgPrice", default)]
    pub avg_price: Option<f64>,
    #[serde(rename = "preferredTypes", default)]
    pub preferred_types: HashMap<PropertyType, u32>,
    #[serde(rename = "preferredBedrooms", default)]
    pub preferred_bedrooms: Option<u32>,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

/// Analysis capabilities that can be toggled per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    NaturalLanguageSearch,
    Recommendations,
    MarketIntelligence,
    InvestmentAnalysis,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::NaturalLanguageSearch,
        Capability::Recommendations,
        Capability::MarketIntelligence,
        Capability::InvestmentAnalysis,
    ];
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Capability::NaturalLanguageSearch => "natural_language_search",
            Capability::Recommendations => "recommendations",
            Capability::MarketIntelligence => "market_intelligence",
            Capability::InvestmentAnalysis => "investment_analysis",
        };
        write!(f, "{}", label)
    }
}

/// Calls and accumulated cost for one capability on one day.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FeatureUsage {
    pub calls: u32,
    pub cost: f64,
}

/// Per-day, per-capability usage counters. Append-only by day key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageLedger {
    #[serde(default)]
    pub days: BTreeMap<chrono::NaiveDate, HashMap<Capability, FeatureUsage>>,
}

impl UsageLedger {
    pub fn record(&mut self, day: chrono::NaiveDate, capability: Capability, cost: f64) {
        let entry = self
            .days
            .entry(day)
            .or_default()
            .entry(capability)
            .or_default();
        entry.calls += 1;
        entry.cost += cost;
    }

    /// Total cost across all capabilities for the given month.
    pub fn monthly_cost(&self, year: i32, month: u32) -> f64 {
        use chrono::Datelike;
        self.days
            .iter()
            .filter(|(day, _)| day.year() == year && day.month() == month)
            .flat_map(|(_, features)| features.values())
            .map(|usage| usage.cost)
            .sum()
    }

    /// Total calls per capability for the given month.
    pub fn monthly_calls(&self, year: i32, month: u32) -> HashMap<Capability, u32> {
        use chrono::Datelike;
        let mut calls: HashMap<Capability, u32> = HashMap::new();
        for (_, features) in self
            .days
            .iter()
            .filter(|(day, _)| day.year() == year && day.month() == month)
        {
            for (capability, usage) in features {
                *calls.entry(*capability).or_default() += usage.calls;
            }
        }
        calls
    }
}

/// Market trend classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketTrend {
    Hot,
    #[serde(rename = "Seller's")]
    Sellers,
    Balanced,
    #[serde(rename = "Buyer's")]
    Buyers,
}

/// Competition label derived from the 0-8 point competition score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompetitionLevel {
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

/// Overall market rating bucketed from the 0-100 market score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    StaleListings,
    UnderpricedListings,
    FreshInventory,
}

/// A market opportunity, reported only when its condition set is non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub kind: OpportunityKind,
    pub count: usize,
    pub description: String,
}

/// Aggregate market statistics and qualitative labels for a result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketReport {
    pub location: String,
    #[serde(rename = "listingCount")]
    pub listing_count: usize,
    #[serde(rename = "averagePrice")]
    pub average_price: f64,
    #[serde(rename = "medianPrice")]
    pub median_price: f64,
    #[serde(rename = "priceRange")]
    pub price_range: PriceRange,
    #[serde(rename = "averagePricePerSqft")]
    pub average_price_per_sqft: f64,
    #[serde(rename = "averageDaysOnMarket")]
    pub average_days_on_market: f64,
    #[serde(rename = "recentListingPct")]
    pub recent_listing_pct: f64,
    pub trend: MarketTrend,
    #[serde(rename = "competitionScore")]
    pub competition_score: u8,
    #[serde(rename = "competitionLevel")]
    pub competition_level: CompetitionLevel,
    pub opportunities: Vec<Opportunity>,
    #[serde(rename = "marketScore")]
    pub market_score: u8,
    pub rating: MarketRating,
}

/// Investment rating bucketed from the 0-100 investment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvestmentRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Strong Buy")]
    StrongBuy,
    Consider,
    Caution,
    Avoid,
}

/// Heuristic rental economics for a single property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentReport {
    #[serde(rename = "estimatedRent")]
    pub estimated_rent: f64,
    #[serde(rename = "monthlyExpenses")]
    pub monthly_expenses: f64,
    #[serde(rename = "cashFlow")]
    pub cash_flow: f64,
    #[serde(rename = "capRate")]
    pub cap_rate: f64,
    #[serde(rename = "annualRoi")]
    pub annual_roi: f64,
    pub score: u8,
    pub rating: InvestmentRating,
    pub recommendation: Recommendation,
    pub risks: Vec<String>,
    pub opportunities: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_enforces_state_shape() {
        let mut params = FilterParameters {
            city: Some("  Austin ".to_string()),
            state: Some("tx".to_string()),
            ..FilterParameters::default()
        };
        params.normalize();
        assert_eq!(params.city.as_deref(), Some("Austin"));
        assert_eq!(params.state.as_deref(), Some("TX"));

        // A spelled-out state is dropped, not forwarded
        let mut params = FilterParameters {
            state: Some("Texas".to_string()),
            ..FilterParameters::default()
        };
        params.normalize();
        assert_eq!(params.state, None);

        let mut params = FilterParameters {
            city: Some("   ".to_string()),
            state: Some("T2".to_string()),
            ..FilterParameters::default()
        };
        params.normalize();
        assert_eq!(params.city, None);
        assert_eq!(params.state, None);
    }

    #[test]
    fn test_property_type_parses_provider_labels() {
        let t: PropertyType = serde_json::from_str("\"Single Family\"").unwrap();
        assert_eq!(t, PropertyType::SingleFamily);

        let t: PropertyType = serde_json::from_str("\"Multi-Family\"").unwrap();
        assert_eq!(t, PropertyType::MultiFamily);

        // Unrecognized labels fall through to Unknown instead of failing
        let t: PropertyType = serde_json::from_str("\"Mobile Home\"").unwrap();
        assert_eq!(t, PropertyType::Unknown);
    }

    #[test]
    fn test_sparse_record_parses_with_defaults() {
        let record: PropertyRecord =
            serde_json::from_str(r#"{"formattedAddress":"1 Main St","price":250000}"#).unwrap();

        assert_eq!(record.bedrooms, 0);
        assert_eq!(record.square_footage, None);
        assert_eq!(record.days_on_market, None);
        assert_eq!(record.property_type, PropertyType::Unknown);
    }

    #[test]
    fn test_price_per_sqft_requires_positive_values() {
        let mut record: PropertyRecord = serde_json::from_str(r#"{"price":300000}"#).unwrap();
        assert_eq!(record.price_per_sqft(), None);

        record.square_footage = Some(1500.0);
        assert_eq!(record.price_per_sqft(), Some(200.0));

        record.price = 0.0;
        assert_eq!(record.price_per_sqft(), None);
    }

    #[test]
    fn test_filter_parameters_camel_case_wire_format() {
        let params = FilterParameters {
            city: Some("Austin".to_string()),
            max_price: Some(400_000),
            ..Default::default()
        };

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["city"], "Austin");
        assert_eq!(json["maxPrice"], 400_000);
        // Absent fields are omitted entirely
        assert!(json.get("minPrice").is_none());
    }

    #[test]
    fn test_corrupt_profile_defaults_to_empty() {
        let profile: UserProfile = serde_json::from_str("{}").unwrap();
        assert!(profile.avg_price.is_none());
        assert!(profile.interactions.is_empty());
    }

    #[test]
    fn test_usage_ledger_monthly_filtering() {
        let mut ledger = UsageLedger::default();
        let july = chrono::NaiveDate::from_ymd_opt(2026, 7, 15).unwrap();
        let august = chrono::NaiveDate::from_ymd_opt(2026, 8, 2).unwrap();

        ledger.record(july, Capability::NaturalLanguageSearch, 0.01);
        ledger.record(august, Capability::NaturalLanguageSearch, 0.01);
        ledger.record(august, Capability::MarketIntelligence, 0.01);

        assert!((ledger.monthly_cost(2026, 8) - 0.02).abs() < 1e-9);
        assert!((ledger.monthly_cost(2026, 7) - 0.01).abs() < 1e-9);

        let calls = ledger.monthly_calls(2026, 8);
        assert_eq!(calls.get(&Capability::NaturalLanguageSearch), Some(&1));
    }
}
