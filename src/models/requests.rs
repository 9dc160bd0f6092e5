use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::PropertyRecord;

/// Request to run a full natural-language search.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1))]
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: u16,
}

fn default_limit() -> u16 {
    20
}

/// Request to interpret free text into filter parameters without searching.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InterpretRequest {
    #[validate(length(min = 1))]
    pub query: String,
}

/// Request to record a user interaction with a property.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordInteractionRequest {
    pub property: PropertyRecord,
    #[validate(length(min = 1))]
    pub action: String,
}
