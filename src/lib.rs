//! # Balanza: Embedded A/B Experiment Statistics Engine
//!
//! Balanza assigns storefront visitors to experiment variants, accumulates
//! impression/click/conversion counters under concurrent writers, and
//! turns those counters into decision-grade statistics: conversion rates,
//! revenue per visitor, two-proportion significance tests, confidence
//! intervals, and projected monthly impact.
//!
//! ## Design
//!
//! - **Atomic counters**: every increment is one read-modify-write per
//!   (experiment, variant, day) key; no caller ever computes a new value
//!   from a stale read.
//! - **Sticky assignments**: at most one (user, experiment) assignment
//!   exists; creation is compare-and-swap and the first committed write
//!   wins. New/returning classification is frozen at creation under a
//!   per-user critical section.
//! - **Pure read side**: aggregation, comparison, summary and time-series
//!   building are side-effect-free functions over a counter snapshot, so
//!   readers never coordinate with writers.
//! - **No globals**: stores are injected at construction; swapping the
//!   bundled in-memory backends for a persistent store only requires
//!   honoring the same atomicity contracts.
//!
//! ## Example
//!
//! ```rust
//! use balanza::engine::ExperimentEngine;
//! use balanza::experiment::{AssignmentContext, ExperimentRecord, VariantRecord};
//!
//! # async fn example() -> balanza::Result<()> {
//! let engine = ExperimentEngine::in_memory();
//! engine.register_experiment(
//!     ExperimentRecord::new("exp-001", "Free Shipping Banner"),
//!     vec![
//!         VariantRecord::builder("var-a", "exp-001", "control", "No Banner")
//!             .is_control(true)
//!             .build(),
//!         VariantRecord::builder("var-b", "exp-001", "variant_b", "Banner").build(),
//!     ],
//! )?;
//!
//! engine
//!     .record_impression("exp-001", "var-b", "visitor-42", None, AssignmentContext::default())
//!     .await?;
//! engine.record_conversion("exp-001", "var-b", None, 129_99).await?;
//!
//! let report = engine.experiment_stats("exp-001", None).await?;
//! println!("{}", serde_json::to_string_pretty(&report.summary).unwrap());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod counter;
pub mod engine;
pub mod error;
pub mod experiment;
pub mod registry;
pub mod stats;

pub use config::{ConfidenceLevel, EngineConfig};
pub use engine::{ExperimentEngine, ImpressionReceipt};
pub use error::{Error, Result};
