pub mod engine;
pub mod errors;
pub mod filter;
pub mod resolver;
pub mod service;
pub mod types;
pub mod web;

use std::collections::HashSet;

use types::{PolicyTuple, POLICY_TYPE_PERMISSION};

/// Compiled in-memory policy model. Immutable after construction: every
/// mutation and reload builds a fresh index and publishes it whole, so
/// readers see either the old or the new model and never a mix.
#[derive(Debug)]
pub struct PolicyIndex {
    /// All tuples in store order (stable for listings and fixtures)
    tuples: Vec<PolicyTuple>,
    /// (role, resource, action) of permission rules, for exact-match lookups
    grants: HashSet<(String, String, String)>,
}

impl PolicyIndex {
    pub fn build(tuples: Vec<PolicyTuple>) -> Self {
        let grants = tuples
            .iter()
            .filter(|t| t.ptype == POLICY_TYPE_PERMISSION)
            .map(|t| (t.subject.clone(), t.resource.clone(), t.action.clone()))
            .collect();
        Self { tuples, grants }
    }

    /// Exact-string match on all three fields. No wildcards, no action
    /// hierarchy: "write" does not imply "read".
    pub fn grants(&self, role: &str, resource: &str, action: &str) -> bool {
        self.grants
            .contains(&(role.to_string(), resource.to_string(), action.to_string()))
    }

    pub fn contains(&self, tuple: &PolicyTuple) -> bool {
        self.tuples.contains(tuple)
    }

    pub fn tuples(&self) -> &[PolicyTuple] {
        &self.tuples
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_exact_match_only() {
        let index = PolicyIndex::build(vec![
            PolicyTuple::permission("ADMIN", "societes", "read"),
            PolicyTuple::permission("CLIENT", "demandes", "write"),
        ]);

        assert!(index.grants("ADMIN", "societes", "read"));
        // Neither a different action, nor a different resource, nor a
        // different role matches
        assert!(!index.grants("ADMIN", "societes", "write"));
        assert!(!index.grants("ADMIN", "sites", "read"));
        assert!(!index.grants("CLIENT", "societes", "read"));
    }

    #[test]
    fn test_index_keeps_store_order() {
        let tuples = vec![
            PolicyTuple::permission("B", "societes", "read"),
            PolicyTuple::permission("A", "societes", "read"),
        ];
        let index = PolicyIndex::build(tuples.clone());
        assert_eq!(index.tuples(), tuples.as_slice());
    }
}
