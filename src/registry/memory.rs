//! In-memory assignment registry backed by a sharded concurrent map.

use std::collections::HashMap;

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

use super::{AssignmentOutcome, AssignmentRegistry};
use crate::experiment::{AssignmentContext, AssignmentRecord};
use crate::Result;

/// In-memory assignment registry.
///
/// Assignments are grouped per user. `assign_if_absent` resolves the
/// user's group through the map's entry API and performs the existence
/// check, the new/returning snapshot, and the insert while holding that
/// entry - one critical section per user, which serializes first-touch
/// decisions across experiments for the same user.
pub struct MemoryAssignmentRegistry {
    users: DashMap<String, HashMap<String, AssignmentRecord>, FxBuildHasher>,
}

impl MemoryAssignmentRegistry {
    /// Create a new in-memory registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: DashMap::with_hasher(FxBuildHasher),
        }
    }

    /// Total number of assignment records across all users.
    #[must_use]
    pub fn assignment_count(&self) -> usize {
        self.users.iter().map(|entry| entry.value().len()).sum()
    }

    /// Check if the registry holds no assignments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Drop all assignments. Administrative purge only.
    pub fn clear(&self) {
        self.users.clear();
    }
}

impl Default for MemoryAssignmentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AssignmentRegistry for MemoryAssignmentRegistry {
    async fn assign_if_absent(
        &self,
        user_id: &str,
        experiment_id: &str,
        variant_id: &str,
        context: AssignmentContext,
    ) -> Result<AssignmentOutcome> {
        let mut user_assignments = self.users.entry(user_id.to_string()).or_default();

        if let Some(existing) = user_assignments.get(experiment_id) {
            // Expected success path: first committed write already won.
            return Ok(AssignmentOutcome {
                assignment: existing.clone(),
                created: false,
            });
        }

        let is_new_visitor = user_assignments.is_empty();
        let record =
            AssignmentRecord::new(user_id, experiment_id, variant_id, is_new_visitor, context);
        user_assignments.insert(experiment_id.to_string(), record.clone());

        Ok(AssignmentOutcome {
            assignment: record,
            created: true,
        })
    }

    async fn assignment(
        &self,
        user_id: &str,
        experiment_id: &str,
    ) -> Result<Option<AssignmentRecord>> {
        Ok(self
            .users
            .get(user_id)
            .and_then(|group| group.get(experiment_id).cloned()))
    }

    async fn has_any_assignment(&self, user_id: &str) -> Result<bool> {
        Ok(self
            .users
            .get(user_id)
            .is_some_and(|group| !group.is_empty()))
    }

    async fn assignments_for_experiment(
        &self,
        experiment_id: &str,
    ) -> Result<Vec<AssignmentRecord>> {
        Ok(self
            .users
            .iter()
            .filter_map(|entry| entry.value().get(experiment_id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_write_wins() {
        let registry = MemoryAssignmentRegistry::new();

        let first = registry
            .assign_if_absent("user-1", "exp-1", "var-a", AssignmentContext::default())
            .await
            .unwrap();
        assert!(first.created);
        assert_eq!(first.assignment.variant_id(), "var-a");

        let second = registry
            .assign_if_absent("user-1", "exp-1", "var-b", AssignmentContext::default())
            .await
            .unwrap();
        assert!(!second.created);
        assert_eq!(second.assignment.variant_id(), "var-a");
        assert_eq!(registry.assignment_count(), 1);
    }

    #[tokio::test]
    async fn test_new_visitor_frozen_at_first_assignment() {
        let registry = MemoryAssignmentRegistry::new();

        let first = registry
            .assign_if_absent("user-1", "exp-1", "var-a", AssignmentContext::default())
            .await
            .unwrap();
        assert!(first.assignment.is_new_visitor());

        let second_experiment = registry
            .assign_if_absent("user-1", "exp-2", "var-x", AssignmentContext::default())
            .await
            .unwrap();
        assert!(second_experiment.created);
        assert!(!second_experiment.assignment.is_new_visitor());

        // The original snapshot does not change retroactively.
        let replay = registry.assignment("user-1", "exp-1").await.unwrap().unwrap();
        assert!(replay.is_new_visitor());
    }

    #[tokio::test]
    async fn test_has_any_assignment() {
        let registry = MemoryAssignmentRegistry::new();
        assert!(!registry.has_any_assignment("user-1").await.unwrap());

        registry
            .assign_if_absent("user-1", "exp-1", "var-a", AssignmentContext::default())
            .await
            .unwrap();
        assert!(registry.has_any_assignment("user-1").await.unwrap());
        assert!(!registry.has_any_assignment("user-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_assignments_for_experiment() {
        let registry = MemoryAssignmentRegistry::new();
        for user in ["u1", "u2", "u3"] {
            registry
                .assign_if_absent(user, "exp-1", "var-a", AssignmentContext::default())
                .await
                .unwrap();
        }
        registry
            .assign_if_absent("u1", "exp-2", "var-x", AssignmentContext::default())
            .await
            .unwrap();

        let rows = registry.assignments_for_experiment("exp-1").await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|a| a.experiment_id() == "exp-1"));
    }
}
