//! HomeScout - AI-assisted property search service
//!
//! This library implements the search pipeline behind HomeScout: free-text
//! query interpretation, listing retrieval, profile-based suitability
//! scoring, market analysis, and investment analysis.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{InvestmentAnalyzer, MarketAnalyzer, QueryInterpreter, ScoringEngine};
pub use models::{
    FilterParameters, InvestmentReport, MarketReport, PropertyRecord, ScoredProperty, UserProfile,
};
