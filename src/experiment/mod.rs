//! Experiment definitions: experiments, variants, assignments
//!
//! This module holds the referential data the statistics engine validates
//! events against.
//!
//! ## Schema Overview
//!
//! ```text
//! ExperimentRecord (1) ──< VariantRecord (N)
//!                               │
//!                               └──< AssignmentRecord (N) [one per user]
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use balanza::experiment::{ExperimentCatalog, ExperimentRecord, VariantRecord};
//!
//! let catalog = ExperimentCatalog::new();
//! let experiment = ExperimentRecord::new("exp-001", "Checkout Button Color");
//! let variants = vec![
//!     VariantRecord::builder("var-a", "exp-001", "control", "Blue Button")
//!         .is_control(true)
//!         .weight(50)
//!         .build(),
//!     VariantRecord::builder("var-b", "exp-001", "variant_b", "Green Button")
//!         .weight(50)
//!         .build(),
//! ];
//! catalog.register(experiment, variants).unwrap();
//! ```

mod assignment_record;
mod catalog;
mod experiment_record;
mod variant_record;

pub use assignment_record::{AssignmentContext, AssignmentMethod, AssignmentRecord, DeviceType};
pub use catalog::ExperimentCatalog;
pub use experiment_record::{ExperimentRecord, ExperimentRecordBuilder, ExperimentStatus};
pub use variant_record::{VariantRecord, VariantRecordBuilder};
