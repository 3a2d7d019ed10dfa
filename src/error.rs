//! Error types for balanza
//!
//! Degenerate statistical inputs are never errors here: ratio functions
//! return 0 and significance fields stay unset. Errors are reserved for
//! referential problems (unknown experiment/variant) and invalid
//! registration input.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Balanza error types
#[derive(Error, Debug)]
pub enum Error {
    /// A request referenced an experiment the catalog does not know.
    #[error("experiment not found: {0}")]
    ExperimentNotFound(String),

    /// A request referenced a variant that is not part of the experiment.
    #[error("variant {variant_id} not found in experiment {experiment_id}")]
    VariantNotFound {
        /// Experiment the caller addressed
        experiment_id: String,
        /// Variant that could not be resolved within it
        variant_id: String,
    },

    /// An experiment was registered without exactly one control variant.
    #[error("experiment {experiment_id} must have exactly one control variant, found {control_count}")]
    ControlCardinality {
        /// Experiment being registered
        experiment_id: String,
        /// Number of variants flagged as control
        control_count: usize,
    },

    /// A variant carried a traffic weight outside 0-100.
    #[error("variant {variant_id} has weight {weight}, expected 0-100")]
    WeightOutOfRange {
        /// Variant being registered
        variant_id: String,
        /// Rejected weight value
        weight: u32,
    },

    /// The same experiment id was registered twice.
    #[error("experiment already registered: {0}")]
    DuplicateExperiment(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
