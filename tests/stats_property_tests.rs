//! Property-based tests for the statistics engine.
//!
//! - Test mathematical invariants of the significance formulas
//! - Test aggregation sum preservation
//! - Run with ProptestConfig::with_cases(100)

use chrono::NaiveDate;
use proptest::prelude::*;

use balanza::counter::{CounterKey, CounterRow};
use balanza::stats::{
    aggregate_totals, confidence_interval, conversion_rate, p_value, relative_change, z_score,
};
use balanza::ConfidenceLevel;

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Generate a proportion in [0, 1]
fn arb_proportion() -> impl Strategy<Value = f64> {
    0.0f64..=1.0
}

/// Generate counter rows for a handful of variants and days
fn arb_counter_rows(max_rows: usize) -> impl Strategy<Value = Vec<(CounterKey, CounterRow)>> {
    proptest::collection::vec(
        (0u8..4, 1u32..28, 0u64..500, 0u64..500, 0u64..100_000),
        1..max_rows,
    )
    .prop_map(|cells| {
        cells
            .into_iter()
            .map(|(variant, day, impressions, conversions, cents)| {
                let mut row = CounterRow::default();
                for i in 0..impressions {
                    row.apply_impression(i == 0);
                }
                for _ in 0..conversions {
                    row.apply_conversion(cents);
                }
                let key = CounterKey::new(
                    "exp-1",
                    format!("var-{variant}"),
                    NaiveDate::from_ymd_opt(2025, 10, day).unwrap(),
                );
                (key, row)
            })
            .collect()
    })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ========================================================================
    // Ratio Properties
    // ========================================================================

    /// Property: conversion rate is 0 for zero visitors, bounded otherwise
    #[test]
    fn prop_conversion_rate_bounded(orders in 0u64..1000, visitors in 0u64..1000) {
        let rate = conversion_rate(orders, visitors);
        if visitors == 0 {
            prop_assert!(rate.abs() < f64::EPSILON);
        } else if orders <= visitors {
            prop_assert!((0.0..=100.0).contains(&rate));
        }
    }

    /// Property: relative change against a zero control is always 0
    #[test]
    fn prop_relative_change_zero_control(value in -1e6f64..1e6) {
        prop_assert!(relative_change(value, 0.0).abs() < f64::EPSILON);
    }

    /// Property: relative change of a value against itself is 0
    #[test]
    fn prop_relative_change_identity(value in 0.001f64..1e6) {
        prop_assert!(relative_change(value, value).abs() < 1e-9);
    }

    // ========================================================================
    // Significance Properties
    // ========================================================================

    /// Property: the two-proportion z-test is anti-symmetric
    #[test]
    fn prop_z_score_antisymmetric(
        p1 in arb_proportion(),
        p2 in arb_proportion(),
        n in 1u64..100_000
    ) {
        let forward = z_score(p1, p2, n);
        let backward = z_score(p2, p1, n);
        prop_assert!((forward + backward).abs() < 1e-9,
            "z({p1},{p2}) = {forward}, z({p2},{p1}) = {backward}");
    }

    /// Property: p-value is in [0, 1]
    #[test]
    fn prop_p_value_in_unit_interval(z in -10.0f64..10.0) {
        let p = p_value(z);
        prop_assert!((0.0..=1.0).contains(&p));
    }

    /// Property: a larger |z| never produces a larger p-value
    #[test]
    fn prop_p_value_monotone_in_abs_z(a in -10.0f64..10.0, b in -10.0f64..10.0) {
        let (small, large) = if a.abs() <= b.abs() { (a, b) } else { (b, a) };
        prop_assert!(
            p_value(small) >= p_value(large) - 1e-12,
            "p({small}) < p({large})"
        );
    }

    /// Property: CI bounds satisfy 0 <= lower <= p <= upper <= 100
    #[test]
    fn prop_confidence_interval_brackets(
        p in arb_proportion(),
        n in 1u64..100_000
    ) {
        let (lower, upper) = confidence_interval(p, n, ConfidenceLevel::NinetyFive);
        let pct = p * 100.0;
        prop_assert!(lower >= 0.0);
        prop_assert!(lower <= pct + 1e-9);
        prop_assert!(pct <= upper + 1e-9);
        prop_assert!(upper <= 100.0);
    }

    /// Property: the 99% interval contains the 95% interval
    #[test]
    fn prop_wider_level_wider_interval(
        p in arb_proportion(),
        n in 1u64..100_000
    ) {
        let (lo95, hi95) = confidence_interval(p, n, ConfidenceLevel::NinetyFive);
        let (lo99, hi99) = confidence_interval(p, n, ConfidenceLevel::NinetyNine);
        prop_assert!(lo99 <= lo95 + 1e-9);
        prop_assert!(hi99 >= hi95 - 1e-9);
    }

    // ========================================================================
    // Aggregation Properties
    // ========================================================================

    /// Property: per-variant totals preserve the arithmetic sum of rows
    #[test]
    fn prop_aggregation_preserves_sums(rows in arb_counter_rows(30)) {
        let totals = aggregate_totals(&rows);

        let row_conversions: u64 = rows.iter().map(|(_, r)| r.conversions()).sum();
        let row_revenue: u64 = rows.iter().map(|(_, r)| r.revenue_cents()).sum();
        let row_visitors: u64 = rows.iter().map(|(_, r)| r.unique_users()).sum();

        let total_conversions: u64 = totals.values().map(|t| t.orders).sum();
        let total_revenue: u64 = totals.values().map(|t| t.revenue_cents).sum();
        let total_visitors: u64 = totals.values().map(|t| t.visitors).sum();

        prop_assert_eq!(total_conversions, row_conversions);
        prop_assert_eq!(total_revenue, row_revenue);
        prop_assert_eq!(total_visitors, row_visitors);
    }

    /// Property: aggregating a sub-range never exceeds the full range
    #[test]
    fn prop_subrange_totals_bounded(rows in arb_counter_rows(30)) {
        let full = aggregate_totals(&rows);
        let cutoff = NaiveDate::from_ymd_opt(2025, 10, 14).unwrap();
        let first_half: Vec<_> = rows
            .iter()
            .filter(|(k, _)| k.date() <= cutoff)
            .cloned()
            .collect();
        let partial = aggregate_totals(&first_half);

        for (variant, totals) in &partial {
            let full_totals = &full[variant];
            prop_assert!(totals.orders <= full_totals.orders);
            prop_assert!(totals.revenue_cents <= full_totals.revenue_cents);
        }
    }
}
