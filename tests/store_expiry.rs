//! Store behaviour against the real system clock.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration as StdDuration;

use chrono::Duration;
use shortpaste::models::Limits;
use shortpaste::{AnyStore, FileStore, MemoryStore, PasteStore, StoreError};
use tempfile::TempDir;

fn check_short_ttl_lifecycle(store: &dyn PasteStore) {
    let created = store.create_with_ttl("hello", Duration::seconds(1)).unwrap();
    assert_eq!(created.expires_at - created.created_at, Duration::seconds(1));

    let view = store.get(&created.id).unwrap();
    assert_eq!(view.content, "hello");
    assert!(view.seconds_until_expiry <= 1);

    thread::sleep(StdDuration::from_secs(2));

    assert!(matches!(
        store.get(&created.id),
        Err(StoreError::Expired { .. })
    ));
    assert!(matches!(store.get(&created.id), Err(StoreError::NotFound)));
}

#[test]
fn memory_store_short_ttl() {
    check_short_ttl_lifecycle(&MemoryStore::default());
}

#[test]
fn file_store_short_ttl() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path(), Limits::default()).unwrap();
    check_short_ttl_lifecycle(&store);
}

#[test]
fn concurrent_creates_through_any_store() {
    let dir = TempDir::new().unwrap();
    let stores: Vec<AnyStore> = vec![
        MemoryStore::default().into(),
        FileStore::new(dir.path(), Limits::default()).unwrap().into(),
    ];

    for store in stores {
        let ids = Arc::new(std::sync::Mutex::new(Vec::new()));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = store.clone();
                let ids = Arc::clone(&ids);
                thread::spawn(move || {
                    for i in 0..50 {
                        let id = store.create(&format!("{t}/{i}")).unwrap().id;
                        ids.lock().unwrap().push(id);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let ids = ids.lock().unwrap();
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), 200);
        for id in ids.iter() {
            assert!(store.get(id).is_ok());
        }
    }
}
