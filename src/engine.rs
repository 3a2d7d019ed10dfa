//! Experiment Engine - the ingestion and reporting facade.
//!
//! The engine owns the experiment catalog and is explicitly constructed
//! with injected counter and assignment stores; it keeps no process-wide
//! state. Ingestion calls are single-key point operations safe under
//! arbitrary concurrency; reporting recomputes everything from a counter
//! snapshot on every call.
//!
//! # Example
//!
//! ```rust
//! use balanza::engine::ExperimentEngine;
//! use balanza::experiment::{AssignmentContext, ExperimentRecord, VariantRecord};
//!
//! # async fn example() -> balanza::Result<()> {
//! let engine = ExperimentEngine::in_memory();
//! engine.register_experiment(
//!     ExperimentRecord::new("exp-001", "Checkout Button Color"),
//!     vec![
//!         VariantRecord::builder("var-a", "exp-001", "control", "Blue")
//!             .is_control(true)
//!             .build(),
//!         VariantRecord::builder("var-b", "exp-001", "variant_b", "Green").build(),
//!     ],
//! )?;
//!
//! let receipt = engine
//!     .record_impression("exp-001", "var-b", "user-1", None, AssignmentContext::default())
//!     .await?;
//! assert!(receipt.is_new_assignment);
//!
//! engine.record_conversion("exp-001", "var-b", None, 49_99).await?;
//! let report = engine.experiment_stats("exp-001", None).await?;
//! assert_eq!(report.summary.total_orders, 1);
//! # Ok(())
//! # }
//! ```

use chrono::{NaiveDate, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::counter::{CounterKey, CounterStore, DateRange, MemoryCounterStore};
use crate::error::Result;
use crate::experiment::{
    AssignmentContext, DeviceType, ExperimentCatalog, ExperimentRecord, VariantRecord,
};
use crate::registry::{AssignmentRegistry, MemoryAssignmentRegistry};
use crate::stats::{
    aggregate_experiment_summary, aggregate_totals, aggregate_variant_metrics, build_time_series,
    compare_variant_to_control, ExperimentStatsReport, SegmentBreakdown, SegmentRow,
    VariantMetrics,
};

/// Acknowledgement returned for a recorded impression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpressionReceipt {
    /// Whether this impression created the user's assignment for the
    /// experiment (first touch).
    pub is_new_assignment: bool,
    /// The variant the registry pinned the user to. Under a first-touch
    /// race this is the winning variant, which may differ from the one
    /// this caller requested.
    pub assigned_variant_id: String,
    /// Device class captured from the caller's context.
    pub device_type: DeviceType,
}

/// A/B experiment engine over injected counter and assignment stores.
///
/// Generic over its backends; [`ExperimentEngine::in_memory`] wires the
/// bundled sharded-map implementations.
pub struct ExperimentEngine<C = MemoryCounterStore, A = MemoryAssignmentRegistry> {
    catalog: ExperimentCatalog,
    counters: C,
    assignments: A,
    config: EngineConfig,
}

impl ExperimentEngine {
    /// Create an engine over the in-memory stores with default config.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            MemoryCounterStore::new(),
            MemoryAssignmentRegistry::new(),
            EngineConfig::default(),
        )
    }

    /// Create an engine over the in-memory stores with a custom config.
    #[must_use]
    pub fn in_memory_with_config(config: EngineConfig) -> Self {
        Self::new(
            MemoryCounterStore::new(),
            MemoryAssignmentRegistry::new(),
            config,
        )
    }
}

impl<C, A> ExperimentEngine<C, A>
where
    C: CounterStore,
    A: AssignmentRegistry,
{
    /// Create an engine over the given stores.
    #[must_use]
    pub fn new(counters: C, assignments: A, config: EngineConfig) -> Self {
        Self {
            catalog: ExperimentCatalog::new(),
            counters,
            assignments,
            config,
        }
    }

    /// The experiment catalog backing this engine.
    #[must_use]
    pub const fn catalog(&self) -> &ExperimentCatalog {
        &self.catalog
    }

    /// The engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register an experiment with its variants.
    ///
    /// # Errors
    ///
    /// Propagates catalog validation failures (duplicate id, control
    /// cardinality, weight bounds).
    pub fn register_experiment(
        &self,
        experiment: ExperimentRecord,
        variants: Vec<VariantRecord>,
    ) -> Result<()> {
        self.catalog.register(experiment, variants)
    }

    /// Record an impression: ensure the user's assignment exists, then
    /// atomically bump the (experiment, variant, day) counters.
    ///
    /// The unique-user counter moves only when this call created the
    /// assignment, so repeated impressions by the same user count
    /// impressions but not visitors. `date` defaults to today (UTC).
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the experiment or variant is
    /// unknown; store failures pass through.
    pub async fn record_impression(
        &self,
        experiment_id: &str,
        variant_id: &str,
        user_id: &str,
        date: Option<NaiveDate>,
        context: AssignmentContext,
    ) -> Result<ImpressionReceipt> {
        self.catalog.require_variant(experiment_id, variant_id)?;
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let device_type = context.device_type;

        let outcome = self
            .assignments
            .assign_if_absent(user_id, experiment_id, variant_id, context)
            .await?;

        let key = CounterKey::new(experiment_id, variant_id, date);
        self.counters
            .record_impression(&key, outcome.created)
            .await?;

        tracing::debug!(
            experiment_id = %experiment_id,
            variant_id = %variant_id,
            user_id = %user_id,
            first_touch = outcome.created,
            "impression recorded"
        );

        Ok(ImpressionReceipt {
            is_new_assignment: outcome.created,
            assigned_variant_id: outcome.assignment.variant_id().to_string(),
            device_type,
        })
    }

    /// Record a click against the (experiment, variant, day) counters.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the experiment or variant is
    /// unknown.
    pub async fn record_click(
        &self,
        experiment_id: &str,
        variant_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<()> {
        self.catalog.require_variant(experiment_id, variant_id)?;
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let key = CounterKey::new(experiment_id, variant_id, date);
        self.counters.record_click(&key).await?;

        tracing::debug!(
            experiment_id = %experiment_id,
            variant_id = %variant_id,
            "click recorded"
        );
        Ok(())
    }

    /// Record a conversion worth `order_value_cents`.
    ///
    /// Delivery is at-least-once from webhook-style callers: a retried
    /// duplicate is counted again. Deduplication by external order id is
    /// a hardening concern outside this layer.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the experiment or variant is
    /// unknown.
    pub async fn record_conversion(
        &self,
        experiment_id: &str,
        variant_id: &str,
        date: Option<NaiveDate>,
        order_value_cents: u64,
    ) -> Result<()> {
        self.catalog.require_variant(experiment_id, variant_id)?;
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let key = CounterKey::new(experiment_id, variant_id, date);
        self.counters
            .record_conversion(&key, order_value_cents)
            .await?;

        tracing::debug!(
            experiment_id = %experiment_id,
            variant_id = %variant_id,
            order_value_cents,
            "conversion recorded"
        );
        Ok(())
    }

    /// Build the full statistics report for an experiment.
    ///
    /// Recomputed from a point-in-time counter snapshot on every call.
    /// A known experiment with no counter rows yields the zero-state
    /// report (zero totals, no variants, no winner, empty series), never
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ExperimentNotFound`] for an unknown id.
    pub async fn experiment_stats(
        &self,
        experiment_id: &str,
        range: Option<DateRange>,
    ) -> Result<ExperimentStatsReport> {
        let experiment = self.catalog.require_experiment(experiment_id)?;
        let variants = self.catalog.variants(experiment_id).unwrap_or_default();
        let rows = self
            .counters
            .rows_for_experiment(experiment_id, range)
            .await?;
        let now = Utc::now();

        let totals = aggregate_totals(&rows);
        let metrics: Vec<VariantMetrics> = variants
            .iter()
            .filter_map(|variant| {
                totals
                    .get(variant.variant_id())
                    .map(|t| aggregate_variant_metrics(*t, variant, &self.config))
            })
            .collect();

        if metrics.is_empty() {
            return Ok(ExperimentStatsReport {
                summary: aggregate_experiment_summary(&experiment, vec![], now),
                time_series: Vec::new(),
                segments: SegmentBreakdown::default(),
            });
        }

        let control = metrics
            .iter()
            .find(|m| m.is_control)
            .unwrap_or(&metrics[0])
            .clone();
        let comparisons = metrics
            .into_iter()
            .map(|m| compare_variant_to_control(m, &control, &self.config))
            .collect();

        let summary = aggregate_experiment_summary(&experiment, comparisons, now);
        let time_series = build_time_series(&rows, &variants);
        let segments = self.segment_breakdown(experiment_id).await?;

        Ok(ExperimentStatsReport {
            summary,
            time_series,
            segments,
        })
    }

    /// Assigned-visitor counts per variant, split by device class and by
    /// new/returning status, from the assignment registry.
    ///
    /// # Errors
    ///
    /// Store failures pass through.
    pub async fn segment_breakdown(&self, experiment_id: &str) -> Result<SegmentBreakdown> {
        let assignments = self
            .assignments
            .assignments_for_experiment(experiment_id)
            .await?;

        let mut device: FxHashMap<(&'static str, String), u64> = FxHashMap::default();
        let mut visitor_class: FxHashMap<(&'static str, String), u64> = FxHashMap::default();
        for assignment in &assignments {
            let variant = assignment.variant_id().to_string();
            *device
                .entry((assignment.context().device_type.as_str(), variant.clone()))
                .or_default() += 1;
            let class = if assignment.is_new_visitor() {
                "new"
            } else {
                "returning"
            };
            *visitor_class.entry((class, variant)).or_default() += 1;
        }

        Ok(SegmentBreakdown {
            device: into_segment_rows(device),
            new_vs_returning: into_segment_rows(visitor_class),
        })
    }
}

fn into_segment_rows(counts: FxHashMap<(&'static str, String), u64>) -> Vec<SegmentRow> {
    let mut rows: Vec<SegmentRow> = counts
        .into_iter()
        .map(|((segment, variant_id), assigned_visitors)| SegmentRow {
            segment: segment.to_string(),
            variant_id,
            assigned_visitors,
        })
        .collect();
    rows.sort_by(|a, b| {
        a.segment
            .cmp(&b.segment)
            .then_with(|| a.variant_id.cmp(&b.variant_id))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn engine_with_experiment() -> ExperimentEngine {
        let engine = ExperimentEngine::in_memory();
        engine
            .register_experiment(
                ExperimentRecord::new("exp-1", "Test"),
                vec![
                    VariantRecord::builder("var-a", "exp-1", "control", "Original")
                        .is_control(true)
                        .build(),
                    VariantRecord::builder("var-b", "exp-1", "variant_b", "Challenger").build(),
                ],
            )
            .unwrap();
        engine
    }

    #[tokio::test]
    async fn test_impression_requires_known_ids() {
        let engine = engine_with_experiment();

        let err = engine
            .record_impression("exp-x", "var-a", "u1", None, AssignmentContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ExperimentNotFound(_)));

        let err = engine
            .record_impression("exp-1", "var-z", "u1", None, AssignmentContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::VariantNotFound { .. }));
    }

    #[tokio::test]
    async fn test_repeat_impression_is_not_a_new_assignment() {
        let engine = engine_with_experiment();

        let first = engine
            .record_impression("exp-1", "var-a", "u1", None, AssignmentContext::default())
            .await
            .unwrap();
        assert!(first.is_new_assignment);

        let repeat = engine
            .record_impression("exp-1", "var-a", "u1", None, AssignmentContext::default())
            .await
            .unwrap();
        assert!(!repeat.is_new_assignment);
        assert_eq!(repeat.assigned_variant_id, "var-a");
    }

    #[tokio::test]
    async fn test_racing_caller_receives_winning_variant() {
        let engine = engine_with_experiment();

        engine
            .record_impression("exp-1", "var-a", "u1", None, AssignmentContext::default())
            .await
            .unwrap();
        let loser = engine
            .record_impression("exp-1", "var-b", "u1", None, AssignmentContext::default())
            .await
            .unwrap();
        assert!(!loser.is_new_assignment);
        assert_eq!(loser.assigned_variant_id, "var-a");
    }

    #[tokio::test]
    async fn test_segment_breakdown_counts() {
        let engine = engine_with_experiment();
        let desktop = AssignmentContext::from_user_agent(Some(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64)",
        ));
        let mobile = AssignmentContext::from_user_agent(Some(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 14_0 like Mac OS X)",
        ));

        engine
            .record_impression("exp-1", "var-a", "u1", None, desktop.clone())
            .await
            .unwrap();
        engine
            .record_impression("exp-1", "var-a", "u2", None, mobile)
            .await
            .unwrap();
        engine
            .record_impression("exp-1", "var-b", "u3", None, desktop)
            .await
            .unwrap();

        let segments = engine.segment_breakdown("exp-1").await.unwrap();
        assert_eq!(
            segments.device,
            vec![
                SegmentRow {
                    segment: "desktop".to_string(),
                    variant_id: "var-a".to_string(),
                    assigned_visitors: 1,
                },
                SegmentRow {
                    segment: "desktop".to_string(),
                    variant_id: "var-b".to_string(),
                    assigned_visitors: 1,
                },
                SegmentRow {
                    segment: "mobile".to_string(),
                    variant_id: "var-a".to_string(),
                    assigned_visitors: 1,
                },
            ]
        );
        // All three users were first-touch assignments
        assert!(segments
            .new_vs_returning
            .iter()
            .all(|row| row.segment == "new"));
    }
}
