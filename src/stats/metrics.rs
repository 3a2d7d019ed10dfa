//! Report types produced by the statistics pipeline.
//!
//! These are serialization-facing payloads consumed by a dashboard; they
//! carry public fields rather than accessors.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::experiment::ExperimentStatus;

/// Raw per-variant totals summed over a date range. Derived, never
/// persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedTotals {
    /// Unique visitors (first-touch impressions).
    pub visitors: u64,
    /// Impressions, repeat views included.
    pub impressions: u64,
    /// Clicks.
    pub clicks: u64,
    /// Orders (conversions).
    pub orders: u64,
    /// Revenue in integer cents.
    pub revenue_cents: u64,
}

impl AggregatedTotals {
    /// Revenue in dollars.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn revenue(&self) -> f64 {
        self.revenue_cents as f64 / 100.0
    }
}

/// Per-variant metrics derived from totals.
///
/// `confidence_level` and `p_value` stay `None` until the variant is
/// compared against a control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantMetrics {
    /// Variant ID.
    pub variant_id: String,
    /// Human-readable variant name.
    pub variant_name: String,
    /// Whether this variant is the control arm.
    pub is_control: bool,

    /// Unique visitors.
    pub visitors: u64,
    /// Impressions, repeat views included.
    pub impressions: u64,
    /// Clicks.
    pub clicks: u64,
    /// Orders (conversions).
    pub orders: u64,
    /// Revenue in dollars.
    pub revenue: f64,

    /// CVR: orders / visitors, percent.
    pub conversion_rate: f64,
    /// CTR: clicks / impressions, percent.
    pub click_through_rate: f64,
    /// RPV: revenue / visitors, dollars.
    pub revenue_per_visitor: f64,
    /// Profit / visitors after the configured cost ratio, dollars.
    pub profit_per_visitor: f64,
    /// AOV: revenue / orders, dollars.
    pub avg_order_value: f64,

    /// Confidence that the difference vs. control is real, percent.
    pub confidence_level: Option<f64>,
    /// Two-tailed p-value vs. control.
    pub p_value: Option<f64>,
}

/// A variant's metrics plus its comparison against the control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantComparison {
    /// The variant's own metrics (with significance fields filled in).
    #[serde(flatten)]
    pub metrics: VariantMetrics,

    /// CVR change vs. control, percent.
    pub conversion_rate_change: f64,
    /// RPV change vs. control, percent.
    pub revenue_per_visitor_change: f64,
    /// Profit-per-visitor change vs. control, percent.
    pub profit_per_visitor_change: f64,
    /// AOV change vs. control, percent.
    pub avg_order_value_change: f64,

    /// Conversion-rate confidence interval lower bound, percent.
    pub conversion_rate_ci_lower: f64,
    /// Conversion-rate confidence interval upper bound, percent.
    pub conversion_rate_ci_upper: f64,

    /// Projected incremental orders per month if rolled out.
    pub estimated_monthly_orders: f64,
    /// Projected incremental revenue per month if rolled out, dollars.
    pub estimated_monthly_revenue: f64,
}

/// Experiment-level rollup across all variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSummary {
    /// Experiment ID.
    pub experiment_id: String,
    /// Experiment name.
    pub experiment_name: String,
    /// Lifecycle status.
    pub status: ExperimentStatus,
    /// When the experiment started, if it has.
    pub started_at: Option<DateTime<Utc>>,
    /// Whole days since the experiment started.
    pub duration_days: Option<i64>,

    /// Visitors summed across variants.
    pub total_visitors: u64,
    /// Orders summed across variants.
    pub total_orders: u64,
    /// Revenue summed across variants, dollars.
    pub total_revenue: f64,

    /// Control conversion rate, percent.
    pub control_conversion_rate: f64,
    /// Control revenue per visitor, dollars.
    pub control_revenue_per_visitor: f64,
    /// Control average order value, dollars.
    pub control_avg_order_value: f64,

    /// Every variant's comparison against the control.
    pub variants: Vec<VariantComparison>,

    /// Non-control variant with the highest conversion rate, if any.
    pub winning_variant_id: Option<String>,
    /// The winner's conversion-rate change vs. control, percent.
    pub winning_variant_improvement: Option<f64>,
    /// Whether the winner's p-value is below 0.05.
    pub is_statistically_significant: bool,
}

/// One point of the per-day trend series. Points are independent; no
/// cross-day accumulation happens here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesDataPoint {
    /// Day this point covers.
    pub date: NaiveDate,
    /// Variant ID.
    pub variant_id: String,
    /// Human-readable variant name.
    pub variant_name: String,
    /// Unique visitors that day.
    pub visitors: u64,
    /// Orders that day.
    pub orders: u64,
    /// Revenue that day, dollars.
    pub revenue: f64,
    /// CVR that day, percent.
    pub conversion_rate: f64,
    /// RPV that day, dollars.
    pub revenue_per_visitor: f64,
}

/// Assigned-visitor count for one (segment, variant) cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRow {
    /// Segment label (e.g. "desktop", "new").
    pub segment: String,
    /// Variant ID.
    pub variant_id: String,
    /// Users assigned to the variant within the segment.
    pub assigned_visitors: u64,
}

/// Audience breakdowns derived from the assignment registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentBreakdown {
    /// Split by device class.
    pub device: Vec<SegmentRow>,
    /// Split by new vs. returning visitors.
    pub new_vs_returning: Vec<SegmentRow>,
}

/// The full reporting payload for one experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentStatsReport {
    /// Experiment-level rollup and per-variant comparisons.
    pub summary: ExperimentSummary,
    /// Per-day trend points.
    pub time_series: Vec<TimeSeriesDataPoint>,
    /// Audience breakdowns from the assignment registry.
    pub segments: SegmentBreakdown,
}
