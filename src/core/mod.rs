// Core heuristics exports
pub mod interpreter;
pub mod investment;
pub mod market;
pub mod scoring;

pub use interpreter::QueryInterpreter;
pub use investment::InvestmentAnalyzer;
pub use market::MarketAnalyzer;
pub use scoring::{track_interaction, ScoringEngine};
