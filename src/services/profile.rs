use std::sync::Arc;
use tokio::sync::RwLock;

use crate::core::track_interaction;
use crate::models::{InteractionAction, PropertyRecord, UserProfile};
use crate::services::store::{BlobStore, StoreKey};

/// Owner of the single local user profile.
///
/// The profile is loaded once at startup and written back through the
/// blob store after every interaction. Missing or corrupt persisted
/// data yields the empty profile, never an error.
pub struct ProfileManager {
    store: Arc<dyn BlobStore>,
    profile: RwLock<UserProfile>,
}

impl ProfileManager {
    pub fn load(store: Arc<dyn BlobStore>) -> Self {
        let profile = match store.load(StoreKey::PROFILE) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!("Corrupt profile blob, starting empty: {}", e);
                UserProfile::default()
            }),
            Ok(None) => UserProfile::default(),
            Err(e) => {
                tracing::warn!("Failed to read profile, starting empty: {}", e);
                UserProfile::default()
            }
        };

        Self {
            store,
            profile: RwLock::new(profile),
        }
    }

    /// Current profile state for a scoring pass.
    pub async fn snapshot(&self) -> UserProfile {
        self.profile.read().await.clone()
    }

    /// Record an interaction and persist the updated profile.
    ///
    /// Persistence is best-effort: the in-memory profile always absorbs
    /// the interaction, and a failed write is logged so the next
    /// successful save carries the full state.
    pub async fn record(&self, property: &PropertyRecord, action: InteractionAction) {
        let mut profile = self.profile.write().await;
        track_interaction(&mut profile, property, action);

        match serde_json::to_vec(&*profile) {
            Ok(bytes) => {
                if let Err(e) = self.store.save(StoreKey::PROFILE, &bytes) {
                    tracing::warn!("Failed to persist profile: {}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize profile: {}", e),
        }

        tracing::debug!(
            "Recorded {:?} interaction ({} total)",
            action,
            profile.interactions.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyType;
    use crate::services::store::{FileStore, StoreError};

    fn temp_store() -> Arc<dyn BlobStore> {
        let dir = std::env::temp_dir().join(format!("homescout-profile-{}", uuid::Uuid::new_v4()));
        Arc::new(FileStore::new(dir).expect("Failed to create file store"))
    }

    fn condo(price: f64) -> PropertyRecord {
        PropertyRecord {
            formatted_address: "55 Pine Ct".to_string(),
            price,
            bedrooms: 2,
            bathrooms: 1.0,
            property_type: PropertyType::Condo,
            square_footage: None,
            days_on_market: None,
        }
    }

    #[tokio::test]
    async fn test_record_persists_across_reload() {
        let store = temp_store();

        let manager = ProfileManager::load(store.clone());
        manager.record(&condo(250_000.0), InteractionAction::Saved).await;

        let reloaded = ProfileManager::load(store);
        let profile = reloaded.snapshot().await;
        assert_eq!(profile.interactions.len(), 1);
        assert_eq!(profile.avg_price, Some(250_000.0));
    }

    #[tokio::test]
    async fn test_failed_save_still_updates_memory() {
        struct BrokenStore;

        impl BlobStore for BrokenStore {
            fn load(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
                Ok(None)
            }
            fn save(&self, _key: &str, _bytes: &[u8]) -> Result<(), StoreError> {
                Err(StoreError::IoError(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only store",
                )))
            }
        }

        let manager = ProfileManager::load(Arc::new(BrokenStore));
        manager.record(&condo(250_000.0), InteractionAction::Viewed).await;

        // The interaction is kept in memory even though the write failed
        let profile = manager.snapshot().await;
        assert_eq!(profile.interactions.len(), 1);
        assert_eq!(profile.avg_price, Some(250_000.0));
    }

    #[tokio::test]
    async fn test_corrupt_blob_starts_empty() {
        let store = temp_store();
        store.save(StoreKey::PROFILE, b"not json at all").unwrap();

        let manager = ProfileManager::load(store);
        let profile = manager.snapshot().await;
        assert!(profile.interactions.is_empty());
        assert!(profile.avg_price.is_none());
    }
}
