//! Concurrency tests for the counter store and assignment registry.
//!
//! These pin the two load-bearing guarantees: no increment is ever lost
//! under concurrent writers hitting one key, and at most one assignment
//! row exists per (user, experiment) no matter how many first
//! impressions race.

use std::sync::Arc;

use chrono::NaiveDate;

use balanza::engine::ExperimentEngine;
use balanza::experiment::{AssignmentContext, ExperimentRecord, VariantRecord};
use balanza::registry::{AssignmentRegistry, MemoryAssignmentRegistry};

fn test_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 25).unwrap()
}

fn engine_with_experiment() -> ExperimentEngine {
    let engine = ExperimentEngine::in_memory();
    engine
        .register_experiment(
            ExperimentRecord::new("exp-1", "Concurrency"),
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
async fn test_no_lost_conversion_updates() {
    let engine = Arc::new(engine_with_experiment());

    // 100 concurrent $1.00 conversions against the same counter key
    let mut handles = vec![];
    for _ in 0..100 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine
                .record_conversion("exp-1", "var-a", Some(test_day()), 100)
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let report = engine.experiment_stats("exp-1", None).await.unwrap();
    assert_eq!(report.summary.total_orders, 100);
    assert!((report.summary.total_revenue - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_no_lost_impression_updates_across_users() {
    let engine = Arc::new(engine_with_experiment());

    let mut handles = vec![];
    for i in 0..100 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            let user = format!("user-{i}");
            engine
                .record_impression(
                    "exp-1",
                    "var-a",
                    &user,
                    Some(test_day()),
                    AssignmentContext::default(),
                )
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let report = engine.experiment_stats("exp-1", None).await.unwrap();
    assert_eq!(report.summary.total_visitors, 100);
    assert_eq!(report.time_series[0].visitors, 100);
}

#[tokio::test]
async fn test_repeat_impressions_count_one_unique_user() {
    let engine = Arc::new(engine_with_experiment());

    let mut handles = vec![];
    for _ in 0..100 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine
                .record_impression(
                    "exp-1",
                    "var-a",
                    "user-1",
                    Some(test_day()),
                    AssignmentContext::default(),
                )
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let report = engine.experiment_stats("exp-1", None).await.unwrap();
    assert_eq!(report.summary.total_visitors, 1);
    let control = &report.summary.variants[0];
    assert_eq!(control.metrics.impressions, 100);
    assert_eq!(control.metrics.visitors, 1);
}

#[tokio::test]
async fn test_concurrent_assignment_dedup() {
    let registry = Arc::new(MemoryAssignmentRegistry::new());

    // 50 concurrent first impressions, each proposing a different variant
    let mut handles = vec![];
    for i in 0..50 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            let candidate = format!("var-{i}");
            registry
                .assign_if_absent("user-1", "exp-1", &candidate, AssignmentContext::default())
                .await
                .unwrap()
        }));
    }

    let mut outcomes = vec![];
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }

    // Exactly one row was created and every caller saw the same winner
    assert_eq!(registry.assignment_count(), 1);
    assert_eq!(outcomes.iter().filter(|o| o.created).count(), 1);
    let winner = registry
        .assignment("user-1", "exp-1")
        .await
        .unwrap()
        .unwrap();
    assert!(outcomes
        .iter()
        .all(|o| o.assignment.variant_id() == winner.variant_id()));
}

#[tokio::test]
async fn test_new_visitor_flag_is_serialized_per_user() {
    // A user's first two experiments race; exactly one assignment may
    // observe the user as new.
    for _ in 0..20 {
        let registry = Arc::new(MemoryAssignmentRegistry::new());

        let r1 = Arc::clone(&registry);
        let first = tokio::spawn(async move {
            r1.assign_if_absent("user-1", "exp-1", "var-a", AssignmentContext::default())
                .await
                .unwrap()
        });
        let r2 = Arc::clone(&registry);
        let second = tokio::spawn(async move {
            r2.assign_if_absent("user-1", "exp-2", "var-x", AssignmentContext::default())
                .await
                .unwrap()
        });

        let (a, b) = (first.await.unwrap(), second.await.unwrap());
        let new_flags = [a, b]
            .iter()
            .filter(|o| o.assignment.is_new_visitor())
            .count();
        assert_eq!(new_flags, 1, "exactly one first-touch may be 'new'");
        assert_eq!(registry.assignment_count(), 2);
    }
}
