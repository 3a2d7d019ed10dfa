//! Aggregation: counter rows -> totals -> metrics -> comparisons -> summary.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;

use super::formulas::{
    avg_order_value, click_through_rate, confidence_interval, conversion_rate, monthly_impact,
    p_value, relative_change, revenue_per_visitor, z_score,
};
use super::metrics::{AggregatedTotals, ExperimentSummary, VariantComparison, VariantMetrics};
use crate::config::EngineConfig;
use crate::counter::{CounterKey, CounterRow};
use crate::experiment::{ExperimentRecord, VariantRecord};

/// Sum counter rows into per-variant totals.
///
/// The result is the arithmetic sum of the rows it is given - nothing is
/// double counted and nothing is cached. An empty snapshot produces an
/// empty map (callers render a zero-state).
#[must_use]
pub fn aggregate_totals(rows: &[(CounterKey, CounterRow)]) -> FxHashMap<String, AggregatedTotals> {
    let mut totals: FxHashMap<String, AggregatedTotals> = FxHashMap::default();
    for (key, row) in rows {
        let entry = totals.entry(key.variant_id().to_string()).or_default();
        entry.visitors += row.unique_users();
        entry.impressions += row.impressions();
        entry.clicks += row.clicks();
        entry.orders += row.conversions();
        entry.revenue_cents += row.revenue_cents();
    }
    totals
}

/// Assemble a variant's metrics from its totals.
///
/// Significance fields stay `None` here; they are filled in by
/// [`compare_variant_to_control`].
#[must_use]
pub fn aggregate_variant_metrics(
    totals: AggregatedTotals,
    variant: &VariantRecord,
    config: &EngineConfig,
) -> VariantMetrics {
    let revenue = totals.revenue();
    let profit = revenue * (1.0 - config.cost_ratio);

    VariantMetrics {
        variant_id: variant.variant_id().to_string(),
        variant_name: variant.display_name().to_string(),
        is_control: variant.is_control(),

        visitors: totals.visitors,
        impressions: totals.impressions,
        clicks: totals.clicks,
        orders: totals.orders,
        revenue,

        conversion_rate: conversion_rate(totals.orders, totals.visitors),
        click_through_rate: click_through_rate(totals.clicks, totals.impressions),
        revenue_per_visitor: revenue_per_visitor(revenue, totals.visitors),
        profit_per_visitor: revenue_per_visitor(profit, totals.visitors),
        avg_order_value: avg_order_value(revenue, totals.orders),

        confidence_level: None,
        p_value: None,
    }
}

/// Compare a variant's metrics against the control's.
///
/// Computes the four relative changes, the conversion-rate confidence
/// interval, the z-test significance (skipped for the control itself and
/// whenever either side has zero visitors), and the projected monthly
/// impact.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compare_variant_to_control(
    metrics: VariantMetrics,
    control: &VariantMetrics,
    config: &EngineConfig,
) -> VariantComparison {
    let conversion_rate_change =
        relative_change(metrics.conversion_rate, control.conversion_rate);
    let revenue_per_visitor_change =
        relative_change(metrics.revenue_per_visitor, control.revenue_per_visitor);
    let profit_per_visitor_change =
        relative_change(metrics.profit_per_visitor, control.profit_per_visitor);
    let avg_order_value_change =
        relative_change(metrics.avg_order_value, control.avg_order_value);

    let mut metrics = metrics;
    if !metrics.is_control && metrics.visitors > 0 && control.visitors > 0 {
        let z = z_score(
            metrics.conversion_rate / 100.0,
            control.conversion_rate / 100.0,
            metrics.visitors,
        );
        let p = p_value(z);
        metrics.p_value = Some(p);
        metrics.confidence_level = Some((1.0 - p) * 100.0);
    }

    let (conversion_rate_ci_lower, conversion_rate_ci_upper) = confidence_interval(
        metrics.conversion_rate / 100.0,
        metrics.visitors,
        config.confidence,
    );

    let daily_visitors = if config.projection_window_days == 0 {
        0.0
    } else {
        metrics.visitors as f64 / f64::from(config.projection_window_days)
    };
    let estimated_monthly_orders = monthly_impact(
        daily_visitors,
        conversion_rate_change / 100.0,
        control.conversion_rate / 100.0,
    );
    let estimated_monthly_revenue = monthly_impact(
        daily_visitors,
        revenue_per_visitor_change / 100.0,
        control.revenue_per_visitor,
    );

    VariantComparison {
        metrics,
        conversion_rate_change,
        revenue_per_visitor_change,
        profit_per_visitor_change,
        avg_order_value_change,
        conversion_rate_ci_lower,
        conversion_rate_ci_upper,
        estimated_monthly_orders,
        estimated_monthly_revenue,
    }
}

/// Fold variant comparisons into the experiment-level summary.
///
/// The winner is the non-control variant with the highest conversion
/// rate; the first one encountered wins ties. Significance requires the
/// winner to carry a p-value below 0.05. With no non-control variants the
/// winner fields stay `None` and significance is false.
#[must_use]
pub fn aggregate_experiment_summary(
    experiment: &ExperimentRecord,
    comparisons: Vec<VariantComparison>,
    now: DateTime<Utc>,
) -> ExperimentSummary {
    let total_visitors = comparisons.iter().map(|c| c.metrics.visitors).sum();
    let total_orders = comparisons.iter().map(|c| c.metrics.orders).sum();
    let total_revenue = comparisons.iter().map(|c| c.metrics.revenue).sum();

    let duration_days = experiment
        .started_at()
        .map(|started| (now - started).num_days());

    let control = comparisons
        .iter()
        .find(|c| c.metrics.is_control)
        .or_else(|| comparisons.first());
    let (control_conversion_rate, control_revenue_per_visitor, control_avg_order_value) = control
        .map_or((0.0, 0.0, 0.0), |c| {
            (
                c.metrics.conversion_rate,
                c.metrics.revenue_per_visitor,
                c.metrics.avg_order_value,
            )
        });

    let mut winner: Option<&VariantComparison> = None;
    for comparison in comparisons.iter().filter(|c| !c.metrics.is_control) {
        let beats = winner.map_or(true, |best| {
            comparison.metrics.conversion_rate > best.metrics.conversion_rate
        });
        if beats {
            winner = Some(comparison);
        }
    }

    let winning_variant_id = winner.map(|w| w.metrics.variant_id.clone());
    let winning_variant_improvement = winner.map(|w| w.conversion_rate_change);
    let is_statistically_significant =
        winner.is_some_and(|w| w.metrics.p_value.is_some_and(|p| p < 0.05));

    ExperimentSummary {
        experiment_id: experiment.experiment_id().to_string(),
        experiment_name: experiment.name().to_string(),
        status: experiment.status(),
        started_at: experiment.started_at(),
        duration_days,

        total_visitors,
        total_orders,
        total_revenue,

        control_conversion_rate,
        control_revenue_per_visitor,
        control_avg_order_value,

        variants: comparisons,

        winning_variant_id,
        winning_variant_improvement,
        is_statistically_significant,
    }
}
