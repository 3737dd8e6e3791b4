use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};
use tracing::debug;

use super::{enrich, Enrichment};
use crate::{
    error::PipelineError,
    lead_time::LeadTimeOrder,
    record::{Dataset, SnapshotId},
};

type Key = (SnapshotId, LeadTimeOrder);

/// Thread-safe memo of pipeline results keyed by dataset snapshot.
///
/// An unchanged dataset is enriched once; later requests share the same
/// `Arc`. Entries only go away through [`invalidate`](Self::invalidate) or
/// [`clear`](Self::clear).
#[derive(Debug, Default)]
pub struct EnrichmentCache {
    map: RwLock<HashMap<Key, Arc<Enrichment>>>,
}

impl EnrichmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, snapshot: SnapshotId, order: LeadTimeOrder) -> Option<Arc<Enrichment>> {
        let map = self.map.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&(snapshot, order)).cloned()
    }

    pub fn get_or_enrich(
        &self,
        dataset: &Dataset,
        order: LeadTimeOrder,
    ) -> Result<Arc<Enrichment>, PipelineError> {
        let key = (dataset.snapshot(), order);
        if let Some(hit) = self.get(key.0, key.1) {
            debug!(snapshot = %key.0, "enrichment cache hit");
            return Ok(hit);
        }

        // computed outside the lock; a concurrent miss keeps whichever lands first
        let fresh = Arc::new(enrich(dataset, order)?);
        let mut map = self.map.write().unwrap_or_else(PoisonError::into_inner);
        let cached = Arc::clone(map.entry(key).or_insert(fresh));
        debug!(snapshot = %key.0, entries = map.len(), "enrichment cached");
        Ok(cached)
    }

    /// Drop every entry computed from `snapshot`. Returns how many were removed.
    pub fn invalidate(&self, snapshot: SnapshotId) -> usize {
        let mut map = self.map.write().unwrap_or_else(PoisonError::into_inner);
        let before = map.len();
        map.retain(|(s, _), _| *s != snapshot);
        before - map.len()
    }

    pub fn clear(&self) {
        self.map
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.map.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DateField, ReservationRecord};
    use std::thread;

    fn dataset(address: &str) -> Dataset {
        Dataset::from_records(vec![ReservationRecord {
            address: Some(address.into()),
            channel: Some("じゃらん".into()),
            plan_name: Some("会席".into()),
            application_date: DateField::Missing,
            checkin_date: DateField::Missing,
        }])
    }

    #[test]
    fn reuses_result_for_same_snapshot() {
        let cache = EnrichmentCache::new();
        let ds = dataset("北海道札幌市");
        let a = cache.get_or_enrich(&ds, LeadTimeOrder::default()).unwrap();
        let b = cache
            .get_or_enrich(&ds.clone(), LeadTimeOrder::default())
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        let other = cache
            .get_or_enrich(&ds, LeadTimeOrder::CheckinMinusApplication)
            .unwrap();
        assert!(!Arc::ptr_eq(&a, &other));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn reload_gets_fresh_entry() {
        let cache = EnrichmentCache::new();
        let old = dataset("北海道札幌市");
        let new = dataset("沖縄県那覇市");
        cache.get_or_enrich(&old, LeadTimeOrder::default()).unwrap();
        cache
            .get_or_enrich(&old, LeadTimeOrder::CheckinMinusApplication)
            .unwrap();
        let fresh = cache.get_or_enrich(&new, LeadTimeOrder::default()).unwrap();
        assert_eq!(fresh.snapshot, new.snapshot());

        assert_eq!(cache.invalidate(old.snapshot()), 2);
        assert_eq!(cache.invalidate(old.snapshot()), 0);
        assert!(cache.get(old.snapshot(), LeadTimeOrder::default()).is_none());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_callers_share_one_entry() {
        let cache = Arc::new(EnrichmentCache::new());
        let ds = Arc::new(dataset("京都府京都市"));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let ds = Arc::clone(&ds);
                thread::spawn(move || {
                    cache
                        .get_or_enrich(&ds, LeadTimeOrder::default())
                        .unwrap()
                })
            })
            .collect();
        let results: Vec<Arc<Enrichment>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(cache.len(), 1);
    }
}
