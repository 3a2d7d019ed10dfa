//! Daily Counter Store - accumulators for experiment traffic
//!
//! One accumulator row exists per (experiment, variant, day). Rows are
//! monotonically non-decreasing: writers only ever add, and a row is
//! zero-created by the first increment that addresses it.
//!
//! The central correctness property lives here: every increment must be a
//! single atomic read-modify-write per key. Reading the current value into
//! the caller and writing back a computed value loses updates under
//! concurrency.
//!
//! # Example
//!
//! ```rust
//! use balanza::counter::{CounterKey, CounterStore, MemoryCounterStore};
//! use chrono::NaiveDate;
//!
//! # async fn example() -> balanza::Result<()> {
//! let store = MemoryCounterStore::new();
//! let key = CounterKey::new(
//!     "exp-1",
//!     "var-a",
//!     NaiveDate::from_ymd_opt(2025, 10, 25).unwrap(),
//! );
//! store.record_impression(&key, true).await?;
//! store.record_conversion(&key, 4_999).await?;
//!
//! let rows = store.rows_for_experiment("exp-1", None).await?;
//! assert_eq!(rows[0].1.conversions(), 1);
//! # Ok(())
//! # }
//! ```

mod memory;

pub use memory::MemoryCounterStore;

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Key addressing one accumulator row: (experiment, variant, day).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CounterKey {
    experiment_id: String,
    variant_id: String,
    date: NaiveDate,
}

impl CounterKey {
    /// Create a new counter key.
    #[must_use]
    pub fn new(
        experiment_id: impl Into<String>,
        variant_id: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            experiment_id: experiment_id.into(),
            variant_id: variant_id.into(),
            date,
        }
    }

    /// Get the experiment ID.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Get the variant ID.
    #[must_use]
    pub fn variant_id(&self) -> &str {
        &self.variant_id
    }

    /// Get the day this row accumulates.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }
}

/// One accumulator row. All fields only ever increase.
///
/// Revenue is held in integer cents so concurrent adds never drift the
/// way accumulated floats do; conversion to dollars happens at the
/// metrics boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRow {
    impressions: u64,
    unique_users: u64,
    clicks: u64,
    conversions: u64,
    revenue_cents: u64,
}

impl CounterRow {
    /// Get the impression count (repeat views included).
    #[must_use]
    pub const fn impressions(&self) -> u64 {
        self.impressions
    }

    /// Get the unique-user count (first-touch impressions only).
    #[must_use]
    pub const fn unique_users(&self) -> u64 {
        self.unique_users
    }

    /// Get the click count.
    #[must_use]
    pub const fn clicks(&self) -> u64 {
        self.clicks
    }

    /// Get the conversion (order) count.
    #[must_use]
    pub const fn conversions(&self) -> u64 {
        self.conversions
    }

    /// Get the accumulated revenue in cents.
    #[must_use]
    pub const fn revenue_cents(&self) -> u64 {
        self.revenue_cents
    }

    /// Accumulated revenue in dollars.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn revenue(&self) -> f64 {
        self.revenue_cents as f64 / 100.0
    }

    /// Add one impression; `first_touch` also counts a unique user.
    ///
    /// The caller must hold the row exclusively (the memory backend calls
    /// this under its per-key entry lock).
    pub fn apply_impression(&mut self, first_touch: bool) {
        self.impressions += 1;
        if first_touch {
            self.unique_users += 1;
        }
    }

    /// Add one click.
    pub fn apply_click(&mut self) {
        self.clicks += 1;
    }

    /// Add one conversion worth `order_value_cents`.
    pub fn apply_conversion(&mut self, order_value_cents: u64) {
        self.conversions += 1;
        self.revenue_cents += order_value_cents;
    }
}

/// Inclusive day range for read-side filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create an inclusive range; reversed bounds are swapped.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Get the first day of the range.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Get the last day of the range.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Counter store trait for experiment traffic accumulators.
///
/// Implementations must make each increment a single atomic
/// read-modify-write per key, auto-creating absent rows with zeroed
/// counters. Increments never fail with "row not found".
///
/// Unique-user counting is driven by the caller: `first_touch` comes from
/// the assignment registry's assign-if-absent outcome, never from a
/// per-call scan of previously seen users.
pub trait CounterStore: Send + Sync {
    /// Atomically add one impression to the row at `key`.
    fn record_impression(
        &self,
        key: &CounterKey,
        first_touch: bool,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Atomically add one click to the row at `key`.
    fn record_click(&self, key: &CounterKey) -> impl Future<Output = Result<()>> + Send;

    /// Atomically add one conversion worth `order_value_cents` to the row
    /// at `key`.
    fn record_conversion(
        &self,
        key: &CounterKey,
        order_value_cents: u64,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Point-in-time snapshot of an experiment's rows, ordered by
    /// (date, variant id).
    ///
    /// Readers never coordinate with writers; rows touched by in-flight
    /// increments may or may not reflect them.
    fn rows_for_experiment(
        &self,
        experiment_id: &str,
        range: Option<DateRange>,
    ) -> impl Future<Output = Result<Vec<(CounterKey, CounterRow)>>> + Send;
}
