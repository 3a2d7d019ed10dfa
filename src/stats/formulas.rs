//! Core metric and significance formulas.
//!
//! Ratio functions return 0 for zero denominators; significance functions
//! return 0 for degenerate samples. Rates named `*_rate` are percentages
//! (0-100); proportion parameters are fractions (0-1).

use crate::config::ConfidenceLevel;

/// Days assumed per month when projecting impact.
const DAYS_PER_MONTH: f64 = 30.0;

/// Critical z for alpha = 0.05 in sample-size planning.
const Z_ALPHA: f64 = 1.96;
/// Critical z for 80% statistical power in sample-size planning.
const Z_BETA: f64 = 0.84;

/// Conversion rate as a percentage: orders / visitors * 100.
///
/// Defined as 0 when there are no visitors.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn conversion_rate(orders: u64, visitors: u64) -> f64 {
    if visitors == 0 {
        return 0.0;
    }
    orders as f64 / visitors as f64 * 100.0
}

/// Revenue per visitor: revenue / visitors. 0 when there are no visitors.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn revenue_per_visitor(revenue: f64, visitors: u64) -> f64 {
    if visitors == 0 {
        return 0.0;
    }
    revenue / visitors as f64
}

/// Average order value: revenue / orders. 0 when there are no orders.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn avg_order_value(revenue: f64, orders: u64) -> f64 {
    if orders == 0 {
        return 0.0;
    }
    revenue / orders as f64
}

/// Click-through rate as a percentage: clicks / impressions * 100.
///
/// Defined as 0 when there are no impressions.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn click_through_rate(clicks: u64, impressions: u64) -> f64 {
    if impressions == 0 {
        return 0.0;
    }
    clicks as f64 / impressions as f64 * 100.0
}

/// Relative change of a variant metric against the control, in percent.
///
/// Defined as 0 when the control value is 0. That floor avoids a division
/// by zero; it does not claim "no change".
#[must_use]
#[allow(clippy::float_cmp)]
pub fn relative_change(variant_value: f64, control_value: f64) -> f64 {
    if control_value == 0.0 {
        return 0.0;
    }
    (variant_value - control_value) / control_value * 100.0
}

/// Two-proportion z-score for a variant rate against the control rate.
///
/// Pools the proportions, derives the standard error, and returns
/// `(p1 - p2) / se`. Returns 0 when the sample is empty or the standard
/// error degenerates (identical or extreme proportions).
///
/// Both arms use the variant's own sample size.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn z_score(variant_proportion: f64, control_proportion: f64, sample_size: u64) -> f64 {
    if sample_size == 0 {
        return 0.0;
    }
    let n = sample_size as f64;
    let p1 = variant_proportion;
    let p2 = control_proportion;

    let pooled = (p1 * n + p2 * n) / (n + n);
    let se = (pooled * (1.0 - pooled) * (1.0 / n + 1.0 / n)).sqrt();
    if se < f64::EPSILON {
        return 0.0;
    }
    (p1 - p2) / se
}

/// Two-tailed p-value for a z-score, in [0, 1].
///
/// Uses the Zelen-Severo rational approximation to the standard normal
/// CDF (accurate to about 7 decimal digits).
#[must_use]
pub fn p_value(z: f64) -> f64 {
    const B1: f64 = 0.319_381_5;
    const B2: f64 = -0.356_563_8;
    const B3: f64 = 1.781_478;
    const B4: f64 = -1.821_256;
    const B5: f64 = 1.330_274;

    let abs_z = z.abs();
    let t = 1.0 / (1.0 + 0.231_641_9 * abs_z);
    let density = 0.398_942_3 * (-abs_z * abs_z / 2.0).exp();
    let tail = density * t * (B1 + t * (B2 + t * (B3 + t * (B4 + t * B5))));

    (2.0 * tail).clamp(0.0, 1.0)
}

/// Confidence interval for a conversion proportion, as a percentage pair.
///
/// `p ± z * sqrt(p(1-p)/n)`, clipped to [0, 1] before scaling to percent.
/// Returns (0, 0) for an empty sample.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn confidence_interval(
    proportion: f64,
    sample_size: u64,
    level: ConfidenceLevel,
) -> (f64, f64) {
    if sample_size == 0 {
        return (0.0, 0.0);
    }
    let n = sample_size as f64;
    let se = (proportion * (1.0 - proportion) / n).sqrt();
    let z = level.z_value();

    let lower = (proportion - z * se).max(0.0);
    let upper = (proportion + z * se).min(1.0);
    (lower * 100.0, upper * 100.0)
}

/// Projected monthly impact of an improvement rate over a baseline metric.
///
/// Scales the daily visitor estimate to a 30-day month and returns the
/// delta between the improved and baseline totals:
/// `(baseline * (1 + improvement) - baseline) * monthly_visitors`.
#[must_use]
pub fn monthly_impact(daily_visitors: f64, improvement_rate: f64, baseline_metric: f64) -> f64 {
    let monthly_visitors = daily_visitors * DAYS_PER_MONTH;
    let improved_metric = baseline_metric * (1.0 + improvement_rate);

    monthly_visitors * improved_metric - monthly_visitors * baseline_metric
}

/// Required per-variant sample size to detect `mde` at alpha 0.05 with
/// 80% power: `2 * (z_alpha + z_beta)^2 * p * (1 - p) / mde^2`.
///
/// Returns `u64::MAX` for a non-positive minimum detectable effect
/// (an unbounded experiment).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn required_sample_size(baseline_proportion: f64, mde: f64) -> u64 {
    if mde <= 0.0 {
        return u64::MAX;
    }
    let p = baseline_proportion;
    let numerator = 2.0 * (Z_ALPHA + Z_BETA).powi(2) * p * (1.0 - p);
    (numerator / (mde * mde)).ceil() as u64
}
