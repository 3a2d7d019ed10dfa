//! Time-series builder for trend visualization.

use rustc_hash::FxHashMap;

use super::formulas::{conversion_rate, revenue_per_visitor};
use super::metrics::TimeSeriesDataPoint;
use crate::counter::{CounterKey, CounterRow};
use crate::experiment::VariantRecord;

/// Map per-day counter rows into trend points.
///
/// Each point is computed independently from its own row with the same
/// zero-guarded formulas as the range aggregation; no cross-day
/// accumulation happens here. Rows are expected in (date, variant) order,
/// which is preserved. A row whose variant is missing from `variants`
/// falls back to the variant id as its display name.
#[must_use]
pub fn build_time_series(
    rows: &[(CounterKey, CounterRow)],
    variants: &[VariantRecord],
) -> Vec<TimeSeriesDataPoint> {
    let names: FxHashMap<&str, &str> = variants
        .iter()
        .map(|v| (v.variant_id(), v.display_name()))
        .collect();

    rows.iter()
        .map(|(key, row)| {
            let revenue = row.revenue();
            TimeSeriesDataPoint {
                date: key.date(),
                variant_id: key.variant_id().to_string(),
                variant_name: names
                    .get(key.variant_id())
                    .copied()
                    .unwrap_or_else(|| key.variant_id())
                    .to_string(),
                visitors: row.unique_users(),
                orders: row.conversions(),
                revenue,
                conversion_rate: conversion_rate(row.conversions(), row.unique_users()),
                revenue_per_visitor: revenue_per_visitor(revenue, row.unique_users()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    fn row(visitors: u64, orders: u64, revenue_cents: u64) -> CounterRow {
        let mut row = CounterRow::default();
        for _ in 0..visitors {
            row.apply_impression(true);
        }
        for _ in 0..orders {
            row.apply_conversion(revenue_cents / orders.max(1));
        }
        row
    }

    fn variants() -> Vec<VariantRecord> {
        vec![
            VariantRecord::builder("var-a", "exp-1", "control", "Original")
                .is_control(true)
                .build(),
            VariantRecord::builder("var-b", "exp-1", "variant_b", "Challenger").build(),
        ]
    }

    #[test]
    fn test_points_are_per_day_and_independent() {
        let rows = vec![
            (CounterKey::new("exp-1", "var-a", day(1)), row(10, 1, 10_00)),
            (CounterKey::new("exp-1", "var-b", day(1)), row(10, 2, 30_00)),
            (CounterKey::new("exp-1", "var-a", day(2)), row(20, 4, 80_00)),
        ];

        let points = build_time_series(&rows, &variants());
        assert_eq!(points.len(), 3);

        assert_eq!(points[0].date, day(1));
        assert_eq!(points[0].variant_name, "Original");
        assert!((points[0].conversion_rate - 10.0).abs() < 1e-9);
        assert!((points[0].revenue_per_visitor - 1.0).abs() < 1e-9);

        // Day 2 reflects only day 2, not day 1 + day 2
        assert_eq!(points[2].visitors, 20);
        assert!((points[2].conversion_rate - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_visitor_day_is_guarded() {
        let mut empty = CounterRow::default();
        empty.apply_click();
        let rows = vec![(CounterKey::new("exp-1", "var-a", day(1)), empty)];

        let points = build_time_series(&rows, &variants());
        assert!(points[0].conversion_rate.abs() < 1e-9);
        assert!(points[0].revenue_per_visitor.abs() < 1e-9);
    }

    #[test]
    fn test_unknown_variant_falls_back_to_id() {
        let rows = vec![(CounterKey::new("exp-1", "var-z", day(1)), row(5, 0, 0))];
        let points = build_time_series(&rows, &variants());
        assert_eq!(points[0].variant_name, "var-z");
    }

    #[test]
    fn test_empty_rows() {
        assert!(build_time_series(&[], &variants()).is_empty());
    }
}
