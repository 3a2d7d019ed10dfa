//! Assignment Registry - sticky user-to-variant mappings
//!
//! The registry guarantees at-most-one assignment per (user, experiment)
//! pair: creation is a compare-and-swap where the first committed write
//! wins and every concurrent caller observes the winning record. A
//! uniqueness conflict is the expected success path, not an error.
//!
//! The registry also owns the new/returning classification: whether a
//! user had ever been assigned to *any* experiment is snapshotted inside
//! the same critical section that inserts the assignment, so the flag is
//! deterministic even when a user's first two experiments race.
//!
//! # Example
//!
//! ```rust
//! use balanza::experiment::AssignmentContext;
//! use balanza::registry::{AssignmentRegistry, MemoryAssignmentRegistry};
//!
//! # async fn example() -> balanza::Result<()> {
//! let registry = MemoryAssignmentRegistry::new();
//! let outcome = registry
//!     .assign_if_absent("user-1", "exp-1", "var-a", AssignmentContext::default())
//!     .await?;
//! assert!(outcome.created);
//!
//! // A second caller racing with a different candidate loses silently.
//! let repeat = registry
//!     .assign_if_absent("user-1", "exp-1", "var-b", AssignmentContext::default())
//!     .await?;
//! assert!(!repeat.created);
//! assert_eq!(repeat.assignment.variant_id(), "var-a");
//! # Ok(())
//! # }
//! ```

mod memory;

pub use memory::MemoryAssignmentRegistry;

use std::future::Future;

use crate::experiment::{AssignmentContext, AssignmentRecord};
use crate::Result;

/// Result of an assign-if-absent call.
#[derive(Debug, Clone)]
pub struct AssignmentOutcome {
    /// The winning assignment - not necessarily for the variant this
    /// caller requested.
    pub assignment: AssignmentRecord,
    /// Whether this call created the record (first committed write).
    pub created: bool,
}

/// Registry trait for sticky experiment assignments.
pub trait AssignmentRegistry: Send + Sync {
    /// Create the (user, experiment) assignment if absent.
    ///
    /// Under N concurrent calls for the same pair, exactly one record is
    /// created and all callers receive it. The record's `is_new_visitor`
    /// flag is decided here, atomically with the insert.
    fn assign_if_absent(
        &self,
        user_id: &str,
        experiment_id: &str,
        variant_id: &str,
        context: AssignmentContext,
    ) -> impl Future<Output = Result<AssignmentOutcome>> + Send;

    /// Look up an existing assignment.
    fn assignment(
        &self,
        user_id: &str,
        experiment_id: &str,
    ) -> impl Future<Output = Result<Option<AssignmentRecord>>> + Send;

    /// Whether the user has ever been assigned to any experiment.
    fn has_any_assignment(&self, user_id: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Snapshot of all assignments for one experiment, for segment
    /// breakdowns.
    fn assignments_for_experiment(
        &self,
        experiment_id: &str,
    ) -> impl Future<Output = Result<Vec<AssignmentRecord>>> + Send;
}
