use std::time::Duration;

use super::knowledge::{KnowledgeCache, KnowledgeCaches};
use super::types::{CacheEntry, CacheLookup};
use crate::hashing::{RUBRIC_KEY_KIND, lookup_key};

fn key(parts: &[&str]) -> [u8; 32] {
    lookup_key(RUBRIC_KEY_KIND, parts)
}

#[test]
fn test_empty_cache_misses() {
    let cache: KnowledgeCache<String> = KnowledgeCache::new(Duration::from_secs(60));

    assert!(cache.get(&key(&["a"])).is_miss());
    assert!(cache.is_empty());
}

#[test]
fn test_put_then_get_hits() {
    let cache = KnowledgeCache::new(Duration::from_secs(60));
    cache.put(key(&["a"]), Some("rubric text".to_string()));

    assert_eq!(
        cache.get(&key(&["a"])),
        CacheLookup::Hit(Some("rubric text".to_string()))
    );
    assert!(cache.get(&key(&["b"])).is_miss());
}

#[test]
fn test_cached_not_found_is_a_hit() {
    let cache: KnowledgeCache<String> = KnowledgeCache::new(Duration::from_secs(60));
    cache.put(key(&["missing"]), None);

    assert_eq!(cache.get(&key(&["missing"])), CacheLookup::Hit(None));
    assert!(cache.contains(&key(&["missing"])));
}

#[test]
fn test_put_overwrites() {
    let cache = KnowledgeCache::new(Duration::from_secs(60));
    cache.put(key(&["a"]), None);
    cache.put(key(&["a"]), Some(7u32));

    assert_eq!(cache.get(&key(&["a"])), CacheLookup::Hit(Some(7)));

    cache.run_pending_tasks();
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_entry_expires_after_ttl() {
    let cache = KnowledgeCache::new(Duration::from_millis(50));
    cache.put(key(&["a"]), Some(1u8));
    assert!(cache.get(&key(&["a"])).is_hit());

    std::thread::sleep(Duration::from_millis(120));

    assert!(cache.get(&key(&["a"])).is_miss());
}

#[test]
fn test_invalidate_all() {
    let cache = KnowledgeCache::new(Duration::from_secs(60));
    cache.put(key(&["a"]), Some(1u8));
    cache.put(key(&["b"]), None);

    cache.invalidate_all();

    assert!(cache.get(&key(&["a"])).is_miss());
    assert!(cache.get(&key(&["b"])).is_miss());
}

#[test]
fn test_cache_entry_freshness() {
    let entry = CacheEntry::new(Some("x"));
    assert!(entry.is_fresh(Duration::from_secs(60)));
    assert!(!entry.is_fresh(Duration::ZERO));
    assert_eq!(entry.record(), Some(&"x"));
}

#[test]
fn test_caches_are_independent_per_collection() {
    let caches = KnowledgeCaches::new(Duration::from_secs(60));
    let shared = caches.clone();

    caches.rubrics().put(key(&["a"]), None);

    assert!(shared.rubrics().get(&key(&["a"])).is_hit());
    assert!(shared.examples().get(&key(&["a"])).is_miss());
    assert_eq!(caches.ttl(), Duration::from_secs(60));

    shared.invalidate_all();
    assert!(caches.rubrics().get(&key(&["a"])).is_miss());
}
