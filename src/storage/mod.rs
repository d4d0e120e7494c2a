use std::sync::Arc;

use chrono::Duration;

use crate::error::StoreResult;
use crate::models::{Limits, NewPaste, PasteView};

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// How many fresh ids a create tries before giving up.
pub(crate) const MAX_ID_ATTEMPTS: usize = 8;

/// Boxed id source, swappable so collisions can be forced in tests.
pub type IdGenerator = Box<dyn Fn() -> String + Send + Sync>;

/// A keyed store of pastes that forgets them once they expire.
///
/// Expired pastes are removed lazily: the first `get` that sees one past
/// its expiry deletes it and reports [`StoreError::Expired`], and every
/// later `get` for that id reports [`StoreError::NotFound`].
///
/// There is no background sweep. An expired paste that is never read again
/// stays resident (in memory, or as a file on disk) for the life of the
/// store, and keeps its id out of circulation.
///
/// [`StoreError::Expired`]: crate::error::StoreError::Expired
/// [`StoreError::NotFound`]: crate::error::StoreError::NotFound
pub trait PasteStore: Send + Sync {
    /// Limits applied by [`PasteStore::create`].
    fn limits(&self) -> &Limits;

    /// Store `content` with an explicit time-to-live.
    fn create_with_ttl(&self, content: &str, ttl: Duration) -> StoreResult<NewPaste>;

    /// Look up a paste by id.
    fn get(&self, id: &str) -> StoreResult<PasteView>;

    /// Store `content` with the configured time-to-live.
    fn create(&self, content: &str) -> StoreResult<NewPaste> {
        self.create_with_ttl(content, self.limits().ttl())
    }
}

#[derive(Clone)]
pub enum AnyStore {
    Memory(Arc<MemoryStore>),
    File(Arc<FileStore>),
}

impl PasteStore for AnyStore {
    fn limits(&self) -> &Limits {
        match self {
            AnyStore::Memory(store) => store.limits(),
            AnyStore::File(store) => store.limits(),
        }
    }

    fn create_with_ttl(&self, content: &str, ttl: Duration) -> StoreResult<NewPaste> {
        match self {
            AnyStore::Memory(store) => store.create_with_ttl(content, ttl),
            AnyStore::File(store) => store.create_with_ttl(content, ttl),
        }
    }

    fn get(&self, id: &str) -> StoreResult<PasteView> {
        match self {
            AnyStore::Memory(store) => store.get(id),
            AnyStore::File(store) => store.get(id),
        }
    }
}

impl From<MemoryStore> for AnyStore {
    fn from(value: MemoryStore) -> Self {
        AnyStore::Memory(Arc::new(value))
    }
}

impl From<FileStore> for AnyStore {
    fn from(value: FileStore) -> Self {
        AnyStore::File(Arc::new(value))
    }
}
