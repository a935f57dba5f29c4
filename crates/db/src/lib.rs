pub mod records;
pub mod repositories;

pub use records::{PolicyId, PolicyRecord, PolicyVersion, PromptLogEntry, StoredPolicy};
pub use repositories::{InMemoryPolicyStore, PolicyStore, StoreError};
