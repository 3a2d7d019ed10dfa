//! Variant Record - one arm of an A/B experiment

use serde::{Deserialize, Serialize};

/// Variant Record represents one arm of an experiment.
///
/// Exactly one variant per experiment carries `is_control = true`; the
/// catalog enforces this at registration. `weight` is the traffic share
/// in percent (0-100). Weights of all variants are expected to sum to
/// 100 before the experiment runs; that run guard lives in the lifecycle
/// layer, and projections here assume it held.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariantRecord {
    variant_id: String,
    experiment_id: String,
    name: String,
    display_name: String,
    is_control: bool,
    weight: u32,
}

impl VariantRecord {
    /// Create a non-control variant with an even 50% weight.
    #[must_use]
    pub fn new(
        variant_id: impl Into<String>,
        experiment_id: impl Into<String>,
        name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            variant_id: variant_id.into(),
            experiment_id: experiment_id.into(),
            name: name.into(),
            display_name: display_name.into(),
            is_control: false,
            weight: 50,
        }
    }

    /// Create a builder for constructing a variant with optional fields.
    #[must_use]
    pub fn builder(
        variant_id: impl Into<String>,
        experiment_id: impl Into<String>,
        name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> VariantRecordBuilder {
        VariantRecordBuilder::new(variant_id, experiment_id, name, display_name)
    }

    /// Get the variant ID.
    #[must_use]
    pub fn variant_id(&self) -> &str {
        &self.variant_id
    }

    /// Get the parent experiment ID.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Get the machine name (e.g. "control", "variant_b").
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the human-readable display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Whether this variant is the control arm.
    #[must_use]
    pub const fn is_control(&self) -> bool {
        self.is_control
    }

    /// Get the traffic weight in percent (0-100).
    #[must_use]
    pub const fn weight(&self) -> u32 {
        self.weight
    }
}

/// Builder for `VariantRecord`.
#[derive(Debug)]
pub struct VariantRecordBuilder {
    variant_id: String,
    experiment_id: String,
    name: String,
    display_name: String,
    is_control: bool,
    weight: u32,
}

impl VariantRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(
        variant_id: impl Into<String>,
        experiment_id: impl Into<String>,
        name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            variant_id: variant_id.into(),
            experiment_id: experiment_id.into(),
            name: name.into(),
            display_name: display_name.into(),
            is_control: false,
            weight: 50,
        }
    }

    /// Mark this variant as the control arm.
    #[must_use]
    pub const fn is_control(mut self, is_control: bool) -> Self {
        self.is_control = is_control;
        self
    }

    /// Set the traffic weight in percent (0-100).
    #[must_use]
    pub const fn weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    /// Build the `VariantRecord`.
    #[must_use]
    pub fn build(self) -> VariantRecord {
        VariantRecord {
            variant_id: self.variant_id,
            experiment_id: self.experiment_id,
            name: self.name,
            display_name: self.display_name,
            is_control: self.is_control,
            weight: self.weight,
        }
    }
}
