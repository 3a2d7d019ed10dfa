//! In-memory counter store backed by a sharded concurrent map.
//!
//! The default backend - rows are lost on process restart. A persistent
//! backend only has to honor the same atomic-increment contract.

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

use super::{CounterKey, CounterRow, CounterStore, DateRange};
use crate::Result;

/// In-memory counter store using a lock-free sharded hashmap.
///
/// Each increment resolves the row through the map's entry API, which
/// holds the key's shard for the duration of the update - a single atomic
/// read-modify-write per key, with zero-initialized rows created on first
/// touch.
pub struct MemoryCounterStore {
    rows: DashMap<CounterKey, CounterRow, FxBuildHasher>,
}

impl MemoryCounterStore {
    /// Create a new in-memory counter store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: DashMap::with_hasher(FxBuildHasher),
        }
    }

    /// Create with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: DashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
        }
    }

    /// Get the number of accumulator rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the store holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drop all rows. Administrative reset only; normal operation never
    /// decrements.
    pub fn clear(&self) {
        self.rows.clear();
    }

    fn snapshot(&self, experiment_id: &str, range: Option<DateRange>) -> Vec<(CounterKey, CounterRow)> {
        let mut rows: Vec<(CounterKey, CounterRow)> = self
            .rows
            .iter()
            .filter(|entry| {
                entry.key().experiment_id() == experiment_id
                    && range.map_or(true, |r| r.contains(entry.key().date()))
            })
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        rows.sort_by(|(a, _), (b, _)| {
            a.date()
                .cmp(&b.date())
                .then_with(|| a.variant_id().cmp(b.variant_id()))
        });
        rows
    }
}

impl Default for MemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterStore for MemoryCounterStore {
    async fn record_impression(&self, key: &CounterKey, first_touch: bool) -> Result<()> {
        self.rows
            .entry(key.clone())
            .or_default()
            .apply_impression(first_touch);
        Ok(())
    }

    async fn record_click(&self, key: &CounterKey) -> Result<()> {
        self.rows.entry(key.clone()).or_default().apply_click();
        Ok(())
    }

    async fn record_conversion(&self, key: &CounterKey, order_value_cents: u64) -> Result<()> {
        self.rows
            .entry(key.clone())
            .or_default()
            .apply_conversion(order_value_cents);
        Ok(())
    }

    async fn rows_for_experiment(
        &self,
        experiment_id: &str,
        range: Option<DateRange>,
    ) -> Result<Vec<(CounterKey, CounterRow)>> {
        Ok(self.snapshot(experiment_id, range))
    }
}
