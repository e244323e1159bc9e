use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::merge::merge_pantry_records;
use crate::sources::{InventorySource, PantryItemRecord};

pub const DEFAULT_TTL_SECS: u64 = 300;

#[derive(Debug)]
struct CacheEntry {
    items: Arc<Vec<PantryItemRecord>>,
    /// `None` until the first successful fetch, and again after `invalidate`.
    fetched_at: Option<Instant>,
}

/// Time-to-live cache in front of an [`InventorySource`].
///
/// The snapshot is replaced wholesale on refresh and never mutated in place, so readers always
/// see a complete inventory. Concurrent refreshes are collapsed into a single fetch.
pub struct PantryCache<S> {
    source: S,
    ttl: Duration,
    entry: RwLock<CacheEntry>,
    refresh: Mutex<()>,
}

impl<S: InventorySource> PantryCache<S> {
    pub fn new(source: S) -> Self {
        Self::with_ttl(source, Duration::from_secs(DEFAULT_TTL_SECS))
    }

    pub fn with_ttl(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entry: RwLock::new(CacheEntry {
                items: Arc::new(Vec::new()),
                fetched_at: None,
            }),
            refresh: Mutex::new(()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// True when never fetched, invalidated, or older than the TTL.
    pub fn is_stale(&self) -> bool {
        let entry = self.entry.read().unwrap_or_else(|e| e.into_inner());
        match entry.fetched_at {
            None => true,
            Some(at) => at.elapsed() > self.ttl,
        }
    }

    fn snapshot(&self) -> Arc<Vec<PantryItemRecord>> {
        let entry = self.entry.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&entry.items)
    }

    /// Returns the inventory, refetching first when the snapshot is stale.
    ///
    /// A failed fetch leaves the previous snapshot and its timestamp in place and returns that
    /// snapshot, which is empty if nothing was ever fetched.
    pub async fn get_items(&self) -> Arc<Vec<PantryItemRecord>> {
        if !self.is_stale() {
            return self.snapshot();
        }

        let _guard = self.refresh.lock().await;
        // Another caller may have refreshed while we waited.
        if !self.is_stale() {
            debug!("Pantry inventory refreshed by a concurrent caller");
            return self.snapshot();
        }

        match self.source.fetch_inventory().await {
            Ok(records) => {
                let items = Arc::new(merge_pantry_records(records));
                info!("Pantry cache refreshed with {} items", items.len());
                let mut entry = self.entry.write().unwrap_or_else(|e| e.into_inner());
                entry.items = Arc::clone(&items);
                entry.fetched_at = Some(Instant::now());
                items
            }
            Err(e) => {
                warn!("Pantry inventory fetch failed, keeping previous snapshot: {:#}", e);
                self.snapshot()
            }
        }
    }

    /// Lowercased names of in-stock items in the current snapshot, without refreshing.
    pub fn get_item_names(&self) -> HashSet<String> {
        self.snapshot()
            .iter()
            .filter(|item| item.available)
            .map(|item| item.name.to_lowercase())
            .collect()
    }

    /// In-stock items, optionally restricted to one category (case-insensitive). An empty
    /// category returns every in-stock item. Refreshes first when stale.
    pub async fn available_in(&self, category: &str) -> Vec<PantryItemRecord> {
        let category = category.trim().to_lowercase();
        self.get_items()
            .await
            .iter()
            .filter(|item| item.available)
            .filter(|item| category.is_empty() || item.category.to_lowercase() == category)
            .cloned()
            .collect()
    }

    /// Forces the next [`get_items`](Self::get_items) to refetch. The current snapshot stays
    /// readable until then.
    pub fn invalidate(&self) {
        let mut entry = self.entry.write().unwrap_or_else(|e| e.into_inner());
        entry.fetched_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    #[async_trait]
    impl InventorySource for CountingSource {
        async fn fetch_inventory(&self) -> Result<Vec<PantryItemRecord>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(anyhow!("pantry database unreachable"));
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(vec![
                PantryItemRecord {
                    name: "Rice".into(),
                    category: "Dry/Baking Goods".into(),
                    available: false,
                },
                PantryItemRecord {
                    name: "rice".into(),
                    category: "Dry/Baking Goods".into(),
                    available: true,
                },
                PantryItemRecord {
                    name: format!("Batch {}", call),
                    category: "Produce".into(),
                    available: true,
                },
                PantryItemRecord {
                    name: "Soda".into(),
                    category: "Drinks".into(),
                    available: false,
                },
            ])
        }
    }

    impl CountingSource {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_after_fetch_then_stale_after_ttl() {
        let cache = PantryCache::new(CountingSource::default());
        assert!(cache.is_stale());
        assert!(cache.get_item_names().is_empty());

        let items = cache.get_items().await;
        assert_eq!(items.len(), 3); // Rice duplicates merged
        assert!(!cache.is_stale());

        tokio::time::advance(Duration::from_secs(DEFAULT_TTL_SECS - 1)).await;
        cache.get_items().await;
        assert_eq!(cache.source.calls(), 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.is_stale());
        cache.get_items().await;
        assert_eq!(cache.source.calls(), 2);
        assert!(!cache.is_stale());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_forces_refetch() {
        let cache = PantryCache::new(CountingSource::default());
        cache.get_items().await;
        cache.invalidate();
        assert!(cache.is_stale());
        // names stay readable until the refetch
        assert!(cache.get_item_names().contains("batch 0"));

        cache.get_items().await;
        assert_eq!(cache.source.calls(), 2);
        assert!(cache.get_item_names().contains("batch 1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_item_names_are_available_only() {
        let cache = PantryCache::new(CountingSource::default());
        cache.get_items().await;
        let names = cache.get_item_names();
        assert!(names.contains("rice"));
        assert!(names.contains("batch 0"));
        assert!(!names.contains("soda"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_available_in_filters_by_category() {
        let cache = PantryCache::new(CountingSource::default());

        let dry = cache.available_in("dry/baking goods").await;
        let names: Vec<&str> = dry.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["rice"]);

        let produce = cache.available_in("PRODUCE").await;
        assert_eq!(produce.len(), 1);
        assert_eq!(produce[0].name, "Batch 0");

        // out-of-stock Soda never shows up
        assert!(cache.available_in("Drinks").await.is_empty());
        assert_eq!(cache.available_in("").await.len(), 2);
        assert_eq!(cache.source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_keeps_previous_snapshot() {
        let cache = PantryCache::with_ttl(CountingSource::default(), Duration::from_secs(60));
        let first = cache.get_items().await;

        cache.source.fail.store(true, Ordering::SeqCst);
        tokio::time::advance(Duration::from_secs(61)).await;
        let after_failure = cache.get_items().await;

        assert_eq!(first, after_failure);
        assert!(cache.is_stale());
        assert_eq!(cache.source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_first_fetch_yields_empty() {
        let source = CountingSource::default();
        source.fail.store(true, Ordering::SeqCst);
        let cache = PantryCache::new(source);
        assert!(cache.get_items().await.is_empty());
        assert!(cache.is_stale());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_refreshes_collapse() {
        let cache = PantryCache::new(CountingSource::default());
        let (a, b, c) = tokio::join!(cache.get_items(), cache.get_items(), cache.get_items());
        assert_eq!(cache.source.calls(), 1);
        assert_eq!(a, b);
        assert_eq!(b, c);
    }
}
