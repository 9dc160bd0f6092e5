pub mod listings;
pub mod llm;
pub mod profile;
pub mod search;
pub mod store;
pub mod usage;

pub use listings::ListingsClient;
pub use llm::LlmClient;
pub use profile::ProfileManager;
pub use search::{SearchOutcome, SearchService};
pub use store::{BlobStore, FileStore, StoreKey};
pub use usage::UsageTracker;
