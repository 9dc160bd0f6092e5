use chrono::Datelike;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{Capability, UsageLedger, UsageSummaryResponse};
use crate::services::store::{BlobStore, StoreKey};

/// Default cost charged per tracked capability call, in dollars.
pub const DEFAULT_CALL_COST: f64 = 0.01;

/// Per-day, per-capability usage accounting with a monthly cost ceiling.
///
/// Tracking is best-effort: a persistence failure is logged, never
/// surfaced to the search path.
pub struct UsageTracker {
    store: Arc<dyn BlobStore>,
    ledger: RwLock<UsageLedger>,
    enabled: bool,
    monthly_limit: f64,
}

impl UsageTracker {
    pub fn load(store: Arc<dyn BlobStore>, enabled: bool, monthly_limit: f64) -> Self {
        let ledger = match store.load(StoreKey::USAGE) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!("Corrupt usage ledger, starting empty: {}", e);
                UsageLedger::default()
            }),
            Ok(None) => UsageLedger::default(),
            Err(e) => {
                tracing::warn!("Failed to read usage ledger, starting empty: {}", e);
                UsageLedger::default()
            }
        };

        Self {
            store,
            ledger: RwLock::new(ledger),
            enabled,
            monthly_limit,
        }
    }

    /// Record one call against today's counters and check the ceiling.
    pub async fn track(&self, capability: Capability, cost: f64) {
        if !self.enabled {
            return;
        }

        let now = chrono::Utc::now().date_naive();
        let mut ledger = self.ledger.write().await;
        ledger.record(now, capability, cost);

        let monthly = ledger.monthly_cost(now.year(), now.month());
        if monthly > self.monthly_limit {
            tracing::warn!(
                "Monthly AI cost limit exceeded: ${:.2} (limit ${:.2})",
                monthly,
                self.monthly_limit
            );
        }

        match serde_json::to_vec(&*ledger) {
            Ok(bytes) => {
                if let Err(e) = self.store.save(StoreKey::USAGE, &bytes) {
                    tracing::warn!("Failed to persist usage ledger: {}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize usage ledger: {}", e),
        }
    }

    /// Month-to-date summary for the usage endpoint.
    pub async fn monthly_summary(&self) -> UsageSummaryResponse {
        let now = chrono::Utc::now().date_naive();
        let ledger = self.ledger.read().await;

        UsageSummaryResponse {
            year: now.year(),
            month: now.month(),
            monthly_cost: ledger.monthly_cost(now.year(), now.month()),
            monthly_limit: self.monthly_limit,
            calls: ledger.monthly_calls(now.year(), now.month()),
        }
    }
}
