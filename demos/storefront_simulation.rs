//! Storefront simulation: drive synthetic traffic through an experiment
//! and print the resulting statistics report.
//!
//! Run with: cargo run --example storefront_simulation
//! Set RUST_LOG=debug to watch individual events flow through the engine.

use anyhow::Result;
use chrono::{Duration, Utc};
use rand::Rng;
use tracing_subscriber::EnvFilter;

use balanza::engine::ExperimentEngine;
use balanza::experiment::{AssignmentContext, ExperimentRecord, ExperimentStatus, VariantRecord};

const VISITORS: usize = 5_000;

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile",
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) Mobile",
    "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X)",
];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let engine = ExperimentEngine::in_memory();
    engine.register_experiment(
        ExperimentRecord::builder("exp-checkout", "Checkout Button Color")
            .hypothesis("A green checkout button converts better than blue")
            .status(ExperimentStatus::Running)
            .started_at(Utc::now() - Duration::days(14))
            .build(),
        vec![
            VariantRecord::builder("var-blue", "exp-checkout", "control", "Blue Button")
                .is_control(true)
                .weight(50)
                .build(),
            VariantRecord::builder("var-green", "exp-checkout", "variant_b", "Green Button")
                .weight(50)
                .build(),
        ],
    )?;

    let mut rng = rand::thread_rng();
    let today = Utc::now().date_naive();

    for visitor in 0..VISITORS {
        let user_id = format!("visitor-{visitor}");
        let date = today - Duration::days(rng.gen_range(0..14));
        let user_agent = USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())];

        // 50/50 split, green converting slightly better
        let (variant, conversion_rate) = if rng.gen_bool(0.5) {
            ("var-blue", 0.10)
        } else {
            ("var-green", 0.125)
        };

        engine
            .record_impression(
                "exp-checkout",
                variant,
                &user_id,
                Some(date),
                AssignmentContext::from_user_agent(Some(user_agent)),
            )
            .await?;

        if rng.gen_bool(0.35) {
            engine
                .record_click("exp-checkout", variant, Some(date))
                .await?;
        }

        if rng.gen_bool(conversion_rate) {
            let order_value_cents = rng.gen_range(20_00..150_00);
            engine
                .record_conversion("exp-checkout", variant, Some(date), order_value_cents)
                .await?;
        }
    }

    let report = engine.experiment_stats("exp-checkout", None).await?;
    println!("{}", serde_json::to_string_pretty(&report.summary)?);

    if let Some(winner) = &report.summary.winning_variant_id {
        let significant = if report.summary.is_statistically_significant {
            "statistically significant"
        } else {
            "not yet significant"
        };
        println!(
            "\nwinner: {winner} ({:+.1}% conversion, {significant})",
            report.summary.winning_variant_improvement.unwrap_or(0.0)
        );
    }

    Ok(())
}
