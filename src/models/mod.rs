// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Capability, CompetitionLevel, FeatureUsage, FilterParameters, Interaction, InteractionAction,
    InvestmentRating, InvestmentReport, MarketRating, MarketReport, MarketTrend, Opportunity,
    OpportunityKind, PriceRange, PropertyRecord, PropertyType, Recommendation, ScoredProperty,
    UsageLedger, UserProfile,
};
pub use requests::{InterpretRequest, RecordInteractionRequest, SearchRequest};
pub use responses::{
    ErrorResponse, HealthResponse, RecordInteractionResponse, SearchResponse, UsageSummaryResponse,
};
