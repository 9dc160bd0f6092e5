use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur with the persistence port
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Key-value blob persistence port.
///
/// UserProfile and UsageLedger are read through this at startup and
/// written back after each mutation. Implementations must be cheap
/// enough to call on every mutation.
pub trait BlobStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

/// File-backed blob store; one JSON file per key under a data directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl BlobStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match std::fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        std::fs::write(self.path_for(key), bytes)?;
        Ok(())
    }
}

/// Store key builder
pub struct StoreKey;

impl StoreKey {
    pub const PROFILE: &'static str = "user_profile";
    pub const USAGE: &'static str = "usage_ledger";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> FileStore {
        let dir = std::env::temp_dir().join(format!("homescout-store-{}", uuid::Uuid::new_v4()));
        FileStore::new(dir).expect("Failed to create file store")
    }

    #[test]
    fn test_missing_key_loads_none() {
        let store = temp_store();
        assert!(store.load("nothing").unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let store = temp_store();
        store.save(StoreKey::PROFILE, b"{\"avgPrice\":null}").unwrap();

        let bytes = store.load(StoreKey::PROFILE).unwrap().unwrap();
        assert_eq!(bytes, b"{\"avgPrice\":null}");
    }

    #[test]
    fn test_save_overwrites_previous_blob() {
        let store = temp_store();
        store.save("k", b"one").unwrap();
        store.save("k", b"two").unwrap();

        assert_eq!(store.load("k").unwrap().unwrap(), b"two");
    }
}
