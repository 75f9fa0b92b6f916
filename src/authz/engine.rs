use std::sync::{Arc, RwLock};

use sea_orm::DatabaseConnection;

use crate::authz::errors::AuthzError;
use crate::authz::types::PolicyTuple;
use crate::authz::PolicyIndex;
use crate::storage;

/// In-memory authorization engine backed by the policy store.
///
/// The engine starts Unloaded; every query fails fast until the first
/// successful [`load`](Self::load). Reloads and mutations build a new
/// [`PolicyIndex`] and swap the published reference, so concurrent
/// `enforce` calls never observe a half-rebuilt model. Mutations do not
/// persist anything; that ordering belongs to the administration service.
pub struct PolicyEngine {
    db: DatabaseConnection,
    index: RwLock<Option<Arc<PolicyIndex>>>,
}

impl PolicyEngine {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            index: RwLock::new(None),
        }
    }

    /// Fetch all tuples from the store and publish a freshly built index.
    /// Idempotent; call again at any time to force a reload. On failure the
    /// previously published index stays authoritative.
    pub async fn load(&self) -> Result<(), AuthzError> {
        let tuples = storage::load_all(&self.db).await?;
        let index = PolicyIndex::build(tuples);
        tracing::info!(tuples = index.len(), "Loaded authorization policies");

        let mut guard = self.index.write().map_err(|_| AuthzError::EnginePoisoned)?;
        *guard = Some(Arc::new(index));
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.index
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// True iff a permission tuple `(role, resource, action)` exists in the
    /// loaded model. Exact-string match on all three fields.
    pub fn enforce(&self, role: &str, resource: &str, action: &str) -> Result<bool, AuthzError> {
        Ok(self.current()?.grants(role, resource, action))
    }

    /// Insert a tuple into the in-memory model. Returns false without
    /// touching anything if an identical tuple already exists.
    pub fn add_policy(&self, role: &str, resource: &str, action: &str) -> Result<bool, AuthzError> {
        let tuple = PolicyTuple::permission(role, resource, action);
        let mut guard = self.index.write().map_err(|_| AuthzError::EnginePoisoned)?;
        let current = guard.as_ref().ok_or(AuthzError::NotLoaded)?;
        if current.contains(&tuple) {
            return Ok(false);
        }
        let mut tuples = current.tuples().to_vec();
        tuples.push(tuple);
        *guard = Some(Arc::new(PolicyIndex::build(tuples)));
        Ok(true)
    }

    /// Remove a tuple from the in-memory model. Returns false if no
    /// matching tuple exists.
    pub fn remove_policy(
        &self,
        role: &str,
        resource: &str,
        action: &str,
    ) -> Result<bool, AuthzError> {
        let tuple = PolicyTuple::permission(role, resource, action);
        let mut guard = self.index.write().map_err(|_| AuthzError::EnginePoisoned)?;
        let current = guard.as_ref().ok_or(AuthzError::NotLoaded)?;
        if !current.contains(&tuple) {
            return Ok(false);
        }
        let tuples: Vec<PolicyTuple> = current
            .tuples()
            .iter()
            .filter(|t| **t != tuple)
            .cloned()
            .collect();
        *guard = Some(Arc::new(PolicyIndex::build(tuples)));
        Ok(true)
    }

    /// Full dump of the loaded model in store order.
    pub fn get_policy(&self) -> Result<Vec<PolicyTuple>, AuthzError> {
        Ok(self.current()?.tuples().to_vec())
    }

    /// Tuples whose positional field (0=role, 1=resource, 2=action, 3..=5
    /// extra slots) equals `value`.
    pub fn get_filtered_policy(
        &self,
        field_index: usize,
        value: &str,
    ) -> Result<Vec<PolicyTuple>, AuthzError> {
        Ok(self
            .current()?
            .tuples()
            .iter()
            .filter(|t| t.field(field_index) == Some(value))
            .cloned()
            .collect())
    }

    fn current(&self) -> Result<Arc<PolicyIndex>, AuthzError> {
        let guard = self.index.read().map_err(|_| AuthzError::EnginePoisoned)?;
        guard.as_ref().cloned().ok_or(AuthzError::NotLoaded)
    }
}
