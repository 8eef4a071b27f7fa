pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::group::Group;
use async_trait::async_trait;

/// Persistence contract the engine depends on.
///
/// Calls are atomic per record. The engine does read-modify-write with
/// whole-record overwrite and no version checks, so concurrent writers
/// to the same group lose to the last one. Acceptable under a single
/// active admin and occasional buyers; a multi-writer deployment would
/// need per-group versioning on `put`.
#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Group>>;

    /// Case-insensitive match against the stored uppercase codes.
    async fn find_by_invite_code(&self, code: &str) -> Result<Option<Group>>;

    /// Public pools that have not completed, newest first.
    async fn list_public_active(&self) -> Result<Vec<Group>>;

    async fn put(&self, group: &Group) -> Result<()>;

    /// Returns whether a record existed to remove.
    async fn remove(&self, id: &str) -> Result<bool>;
}
