//! Experiment Catalog - concurrent registry of experiments and variants
//!
//! The catalog is the referential-integrity boundary: ingestion and
//! reporting validate ids against it before touching counters. It is
//! shared across request workers, so lookups clone the records out of the
//! sharded map rather than handing out references.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{Error, Result};
use crate::experiment::{ExperimentRecord, VariantRecord};

#[derive(Debug, Clone)]
struct CatalogEntry {
    experiment: ExperimentRecord,
    variants: Vec<VariantRecord>,
}

/// Concurrent registry of experiments and their variants.
#[derive(Debug, Default)]
pub struct ExperimentCatalog {
    entries: DashMap<String, CatalogEntry>,
}

impl ExperimentCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the catalog has no experiments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the number of registered experiments.
    #[must_use]
    pub fn experiment_count(&self) -> usize {
        self.entries.len()
    }

    /// Register an experiment with its variants.
    ///
    /// Validates that exactly one variant is the control and that every
    /// weight lies in 0-100. The weights-sum-to-100 run guard stays with
    /// the lifecycle layer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateExperiment`], [`Error::ControlCardinality`],
    /// or [`Error::WeightOutOfRange`] when the input is rejected.
    pub fn register(
        &self,
        experiment: ExperimentRecord,
        variants: Vec<VariantRecord>,
    ) -> Result<()> {
        let experiment_id = experiment.experiment_id().to_string();

        let control_count = variants.iter().filter(|v| v.is_control()).count();
        if control_count != 1 {
            return Err(Error::ControlCardinality {
                experiment_id,
                control_count,
            });
        }
        if let Some(bad) = variants.iter().find(|v| v.weight() > 100) {
            return Err(Error::WeightOutOfRange {
                variant_id: bad.variant_id().to_string(),
                weight: bad.weight(),
            });
        }

        match self.entries.entry(experiment_id.clone()) {
            Entry::Occupied(_) => Err(Error::DuplicateExperiment(experiment_id)),
            Entry::Vacant(slot) => {
                tracing::info!(
                    experiment_id = %experiment_id,
                    variants = variants.len(),
                    "registered experiment"
                );
                slot.insert(CatalogEntry {
                    experiment,
                    variants,
                });
                Ok(())
            }
        }
    }

    /// Get an experiment by ID.
    #[must_use]
    pub fn experiment(&self, experiment_id: &str) -> Option<ExperimentRecord> {
        self.entries
            .get(experiment_id)
            .map(|entry| entry.experiment.clone())
    }

    /// Get all variants of an experiment.
    #[must_use]
    pub fn variants(&self, experiment_id: &str) -> Option<Vec<VariantRecord>> {
        self.entries
            .get(experiment_id)
            .map(|entry| entry.variants.clone())
    }

    /// Get one variant of an experiment.
    #[must_use]
    pub fn variant(&self, experiment_id: &str, variant_id: &str) -> Option<VariantRecord> {
        self.entries.get(experiment_id).and_then(|entry| {
            entry
                .variants
                .iter()
                .find(|v| v.variant_id() == variant_id)
                .cloned()
        })
    }

    /// Resolve an experiment or fail with [`Error::ExperimentNotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExperimentNotFound`] when the id is unknown.
    pub fn require_experiment(&self, experiment_id: &str) -> Result<ExperimentRecord> {
        self.experiment(experiment_id)
            .ok_or_else(|| Error::ExperimentNotFound(experiment_id.to_string()))
    }

    /// Resolve a variant within an experiment or fail.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExperimentNotFound`] for an unknown experiment and
    /// [`Error::VariantNotFound`] for a variant outside it.
    pub fn require_variant(&self, experiment_id: &str, variant_id: &str) -> Result<VariantRecord> {
        let entry = self
            .entries
            .get(experiment_id)
            .ok_or_else(|| Error::ExperimentNotFound(experiment_id.to_string()))?;
        entry
            .variants
            .iter()
            .find(|v| v.variant_id() == variant_id)
            .cloned()
            .ok_or_else(|| Error::VariantNotFound {
                experiment_id: experiment_id.to_string(),
                variant_id: variant_id.to_string(),
            })
    }

    /// Transition an experiment to Running.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExperimentNotFound`] when the id is unknown.
    pub fn start_experiment(&self, experiment_id: &str) -> Result<()> {
        let mut entry = self
            .entries
            .get_mut(experiment_id)
            .ok_or_else(|| Error::ExperimentNotFound(experiment_id.to_string()))?;
        entry.experiment.start();
        tracing::info!(experiment_id = %experiment_id, "experiment started");
        Ok(())
    }
}
