//! Statistics Engine - pure functions from counters to decisions
//!
//! Everything in this module is side-effect-free: it consumes counter
//! snapshots and variant metadata and produces metrics, comparisons,
//! summaries and time series. Degenerate inputs (zero visitors, identical
//! proportions) yield defined values, never errors.
//!
//! ## Pipeline
//!
//! ```text
//! [(CounterKey, CounterRow)]
//!     │ aggregate_totals
//!     ▼
//! AggregatedTotals ── aggregate_variant_metrics ──> VariantMetrics
//!     │ compare_variant_to_control
//!     ▼
//! VariantComparison ── aggregate_experiment_summary ──> ExperimentSummary
//! ```

mod aggregate;
mod formulas;
mod metrics;
mod timeseries;

pub use aggregate::{
    aggregate_experiment_summary, aggregate_totals, aggregate_variant_metrics,
    compare_variant_to_control,
};
pub use formulas::{
    avg_order_value, click_through_rate, confidence_interval, conversion_rate, monthly_impact,
    p_value, relative_change, required_sample_size, revenue_per_visitor, z_score,
};
pub use metrics::{
    AggregatedTotals, ExperimentStatsReport, ExperimentSummary, SegmentBreakdown, SegmentRow,
    TimeSeriesDataPoint, VariantComparison, VariantMetrics,
};
pub use timeseries::build_time_series;
