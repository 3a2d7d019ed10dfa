//! Experiment Record - identity and lifecycle of one A/B experiment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an experiment.
///
/// Transition guard checks (e.g. "weights must sum to 100 before running")
/// belong to the lifecycle layer driving this record, not to the
/// statistics engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentStatus {
    /// Experiment is being drafted and receives no traffic.
    Draft,
    /// Experiment is live and accumulating events.
    Running,
    /// Experiment is temporarily stopped.
    Paused,
    /// Experiment finished and a decision was made.
    Completed,
    /// Experiment is retired from all views.
    Archived,
}

/// Experiment Record represents one A/B experiment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExperimentRecord {
    experiment_id: String,
    name: String,
    description: Option<String>,
    hypothesis: Option<String>,
    status: ExperimentStatus,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl ExperimentRecord {
    /// Create a new experiment record in Draft status.
    #[must_use]
    pub fn new(experiment_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            experiment_id: experiment_id.into(),
            name: name.into(),
            description: None,
            hypothesis: None,
            status: ExperimentStatus::Draft,
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
        }
    }

    /// Create a builder for constructing an experiment with optional fields.
    #[must_use]
    pub fn builder(
        experiment_id: impl Into<String>,
        name: impl Into<String>,
    ) -> ExperimentRecordBuilder {
        ExperimentRecordBuilder::new(experiment_id, name)
    }

    /// Get the experiment ID.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Get the experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the free-form description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Get the hypothesis being tested, if recorded.
    #[must_use]
    pub fn hypothesis(&self) -> Option<&str> {
        self.hypothesis.as_deref()
    }

    /// Get the current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ExperimentStatus {
        self.status
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get the start timestamp, if the experiment has started.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Get the end timestamp, if the experiment has completed.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Start the experiment, transitioning to Running.
    ///
    /// Sets `started_at` on the first start only; resuming a paused
    /// experiment keeps the original start time.
    pub fn start(&mut self) {
        self.status = ExperimentStatus::Running;
        if self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
    }

    /// Pause a running experiment.
    pub fn pause(&mut self) {
        self.status = ExperimentStatus::Paused;
    }

    /// Complete the experiment, setting `ended_at` to now.
    pub fn complete(&mut self) {
        self.status = ExperimentStatus::Completed;
        self.ended_at = Some(Utc::now());
    }
}

/// Builder for `ExperimentRecord`.
#[derive(Debug)]
pub struct ExperimentRecordBuilder {
    experiment_id: String,
    name: String,
    description: Option<String>,
    hypothesis: Option<String>,
    status: ExperimentStatus,
    started_at: Option<DateTime<Utc>>,
}

impl ExperimentRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(experiment_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            experiment_id: experiment_id.into(),
            name: name.into(),
            description: None,
            hypothesis: None,
            status: ExperimentStatus::Draft,
            started_at: None,
        }
    }

    /// Set the free-form description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the hypothesis being tested.
    #[must_use]
    pub fn hypothesis(mut self, hypothesis: impl Into<String>) -> Self {
        self.hypothesis = Some(hypothesis.into());
        self
    }

    /// Set the lifecycle status.
    #[must_use]
    pub const fn status(mut self, status: ExperimentStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the start timestamp.
    #[must_use]
    pub const fn started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self
    }

    /// Build the `ExperimentRecord`.
    #[must_use]
    pub fn build(self) -> ExperimentRecord {
        ExperimentRecord {
            experiment_id: self.experiment_id,
            name: self.name,
            description: self.description,
            hypothesis: self.hypothesis,
            status: self.status,
            created_at: Utc::now(),
            started_at: self.started_at,
            ended_at: None,
        }
    }
}
