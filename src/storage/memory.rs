use std::sync::Arc;

use chrono::Duration;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{info, warn};

use super::{IdGenerator, PasteStore, MAX_ID_ATTEMPTS};
use crate::clock::{Clock, SystemClock};
use crate::error::{StoreError, StoreResult};
use crate::id::generate_id;
use crate::models::{Limits, NewPaste, Paste, PasteView};

/// Process-local paste store.
///
/// Every insert and every expiry check-and-remove goes through the map's
/// entry API, which holds the shard lock for the whole sequence.
pub struct MemoryStore {
    pastes: DashMap<String, Paste>,
    limits: Limits,
    clock: Arc<dyn Clock>,
    generate_id: IdGenerator,
}

impl MemoryStore {
    pub fn new(limits: Limits) -> Self {
        MemoryStore {
            pastes: DashMap::new(),
            limits,
            clock: Arc::new(SystemClock),
            generate_id: Box::new(generate_id),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_id_generator(mut self, generate: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.generate_id = Box::new(generate);
        self
    }

    /// Number of records held, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.pastes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pastes.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl PasteStore for MemoryStore {
    fn limits(&self) -> &Limits {
        &self.limits
    }

    fn create_with_ttl(&self, content: &str, ttl: Duration) -> StoreResult<NewPaste> {
        let size = self.limits.validate(content)?;
        if ttl <= Duration::zero() {
            return Err(StoreError::InvalidTtl);
        }

        for _ in 0..MAX_ID_ATTEMPTS {
            match self.pastes.entry((self.generate_id)()) {
                Entry::Occupied(entry) => {
                    warn!("id collision on '{}', retrying", entry.key());
                }
                Entry::Vacant(entry) => {
                    let paste = Paste::new(
                        entry.key().clone(),
                        content.to_owned(),
                        self.clock.now(),
                        ttl,
                    )?;
                    let summary = paste.summary();
                    entry.insert(paste);

                    info!(
                        "new paste: id='{id}', size={size}, expires_at={expires_at}",
                        id = summary.id,
                        expires_at = summary.expires_at,
                    );
                    return Ok(summary);
                }
            }
        }

        Err(StoreError::IdsExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    fn get(&self, id: &str) -> StoreResult<PasteView> {
        let now = self.clock.now();

        match self.pastes.entry(id.to_owned()) {
            Entry::Vacant(_) => Err(StoreError::NotFound),
            Entry::Occupied(entry) => match entry.get().view(&now) {
                Some(view) => Ok(view),
                None => {
                    let (_, paste) = entry.remove_entry();
                    info!("deleting expired paste: {}", paste.id);
                    Err(StoreError::Expired {
                        expired_at: paste.expires_at,
                    })
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::clock::ManualClock;

    fn store_at_epoch() -> (MemoryStore, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        let store = MemoryStore::default().with_clock(clock.clone());
        (store, clock)
    }

    #[test]
    fn create_and_get() {
        let (store, _clock) = store_at_epoch();

        let created = store.create("hello").unwrap();
        assert_eq!(created.expires_at - created.created_at, Duration::days(7));

        let view = store.get(&created.id).unwrap();
        assert_eq!(view.id, created.id);
        assert_eq!(view.content, "hello");
        assert_eq!(view.created_at, created.created_at);
        assert_eq!(view.expires_at, created.expires_at);
        assert_eq!(view.seconds_until_expiry, 7 * 24 * 60 * 60);
    }

    #[test]
    fn content_is_stored_verbatim() {
        let (store, _clock) = store_at_epoch();

        for content in ["  padded  ", "line\nbreaks\n", "ünïcödé ✓", "<script>"] {
            let created = store.create(content).unwrap();
            assert_eq!(store.get(&created.id).unwrap().content, content);
        }
    }

    #[test]
    fn rejects_blank_content() {
        let (store, _clock) = store_at_epoch();

        assert!(matches!(store.create(""), Err(StoreError::EmptyContent)));
        assert!(matches!(store.create("   "), Err(StoreError::EmptyContent)));
        assert!(store.is_empty());
    }

    #[test]
    fn rejects_oversized_content() {
        let (store, _clock) = store_at_epoch();
        let content = "a".repeat(2_000_000);

        match store.create(&content) {
            Err(StoreError::ContentTooLarge {
                max_size,
                current_size,
            }) => {
                assert_eq!(max_size, 1_048_576);
                assert_eq!(current_size, 2_000_000);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(store.is_empty());
    }

    #[test]
    fn accepts_content_at_the_limit() {
        let store = MemoryStore::new(Limits::new(5, Duration::days(1)).unwrap());
        assert!(store.create("abcde").is_ok());
        assert!(matches!(
            store.create("abcdef"),
            Err(StoreError::ContentTooLarge { .. })
        ));
    }

    #[test]
    fn rejects_non_positive_ttl() {
        let (store, _clock) = store_at_epoch();
        assert!(matches!(
            store.create_with_ttl("x", Duration::zero()),
            Err(StoreError::InvalidTtl)
        ));
    }

    #[test]
    fn get_unknown_id() {
        let (store, _clock) = store_at_epoch();
        assert!(matches!(store.get("nope"), Err(StoreError::NotFound)));
        assert!(matches!(store.get(""), Err(StoreError::NotFound)));
        assert!(matches!(store.get("../etc/passwd"), Err(StoreError::NotFound)));
    }

    #[test]
    fn expired_once_then_not_found() {
        let (store, clock) = store_at_epoch();
        let ttl = Duration::seconds(60);
        let created = store.create_with_ttl("bye", ttl).unwrap();

        clock.advance(ttl + Duration::milliseconds(1));

        match store.get(&created.id) {
            Err(StoreError::Expired { expired_at }) => assert_eq!(expired_at, created.expires_at),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(store.is_empty());
        assert!(matches!(store.get(&created.id), Err(StoreError::NotFound)));
        assert!(matches!(store.get(&created.id), Err(StoreError::NotFound)));
    }

    #[test]
    fn live_just_before_expiry() {
        let (store, clock) = store_at_epoch();
        let ttl = Duration::seconds(60);
        let created = store.create_with_ttl("soon", ttl).unwrap();

        clock.advance(ttl - Duration::milliseconds(1_500));
        assert_eq!(store.get(&created.id).unwrap().seconds_until_expiry, 1);

        clock.advance(Duration::milliseconds(1_500));
        assert_eq!(store.get(&created.id).unwrap().seconds_until_expiry, 0);
    }

    #[test]
    fn expired_entries_linger_until_read() {
        let (store, clock) = store_at_epoch();
        let a = store.create_with_ttl("a", Duration::seconds(1)).unwrap();
        let b = store.create_with_ttl("b", Duration::seconds(1)).unwrap();

        clock.advance(Duration::seconds(5));
        assert_eq!(store.len(), 2);

        assert!(matches!(store.get(&a.id), Err(StoreError::Expired { .. })));
        assert_eq!(store.len(), 1);
        assert!(matches!(store.get(&b.id), Err(StoreError::Expired { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn retries_on_id_collision() {
        let ids = ["dup", "dup", "fresh"];
        let calls = AtomicUsize::new(0);
        let store = MemoryStore::default().with_id_generator(move || {
            ids[calls.fetch_add(1, Ordering::SeqCst).min(ids.len() - 1)].to_owned()
        });

        assert_eq!(store.create("one").unwrap().id, "dup");
        assert_eq!(store.create("two").unwrap().id, "fresh");
        assert_eq!(store.get("dup").unwrap().content, "one");
    }

    #[test]
    fn expired_unread_id_is_not_reused() {
        let (store, clock) = store_at_epoch();
        let store = store.with_id_generator(|| "same".to_owned());

        store.create_with_ttl("old", Duration::seconds(1)).unwrap();
        clock.advance(Duration::seconds(10));

        assert!(matches!(
            store.create("new"),
            Err(StoreError::IdsExhausted { .. })
        ));
        assert!(matches!(store.get("same"), Err(StoreError::Expired { .. })));
        assert_eq!(store.create("new").unwrap().id, "same");
    }

    #[test]
    fn concurrent_creates_get_distinct_ids() {
        let store = MemoryStore::default();

        let ids: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|t| {
                    let store = &store;
                    s.spawn(move || {
                        (0..250)
                            .map(|i| store.create(&format!("paste {t}-{i}")).unwrap().id)
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), 2_000);
        assert_eq!(store.len(), 2_000);
    }

    #[test]
    fn concurrent_reads_of_expired_paste_see_one_expiry() {
        let (store, clock) = store_at_epoch();
        let created = store.create_with_ttl("race", Duration::seconds(1)).unwrap();
        clock.advance(Duration::seconds(2));

        let expired = AtomicUsize::new(0);
        let not_found = AtomicUsize::new(0);
        std::thread::scope(|s| {
            for _ in 0..16 {
                s.spawn(|| match store.get(&created.id) {
                    Err(StoreError::Expired { .. }) => {
                        expired.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(StoreError::NotFound) => {
                        not_found.fetch_add(1, Ordering::SeqCst);
                    }
                    other => panic!("unexpected result: {other:?}"),
                });
            }
        });

        assert_eq!(expired.load(Ordering::SeqCst), 1);
        assert_eq!(not_found.load(Ordering::SeqCst), 15);
    }
}
