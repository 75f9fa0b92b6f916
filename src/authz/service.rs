use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::authz::engine::PolicyEngine;
use crate::authz::errors::AuthzError;
use crate::authz::types::PolicyTuple;
use crate::storage;

/// Programmatic CRUD over policy tuples. Mutations go through the engine
/// first and are persisted only when the engine actually changed; if the
/// store save fails, the in-memory change is rolled back so the cache never
/// drifts ahead of the store.
#[derive(Clone)]
pub struct PolicyAdminService {
    db: DatabaseConnection,
    engine: Arc<PolicyEngine>,
}

impl PolicyAdminService {
    pub fn new(db: DatabaseConnection, engine: Arc<PolicyEngine>) -> Self {
        Self { db, engine }
    }

    /// Returns false without touching the store when the tuple already
    /// exists; otherwise persists the full current policy set.
    pub async fn add_policy(
        &self,
        role: &str,
        resource: &str,
        action: &str,
    ) -> Result<bool, AuthzError> {
        if !self.engine.add_policy(role, resource, action)? {
            return Ok(false);
        }
        if let Err(e) = self.persist().await {
            self.engine.remove_policy(role, resource, action)?;
            return Err(e);
        }
        tracing::info!(role, resource, action, "Policy added");
        Ok(true)
    }

    /// Returns false when no matching tuple exists; otherwise persists the
    /// remaining policy set.
    pub async fn remove_policy(
        &self,
        role: &str,
        resource: &str,
        action: &str,
    ) -> Result<bool, AuthzError> {
        if !self.engine.remove_policy(role, resource, action)? {
            return Ok(false);
        }
        if let Err(e) = self.persist().await {
            self.engine.add_policy(role, resource, action)?;
            return Err(e);
        }
        tracing::info!(role, resource, action, "Policy removed");
        Ok(true)
    }

    /// Pure read against the current in-memory model.
    pub fn has_policy(&self, role: &str, resource: &str, action: &str) -> Result<bool, AuthzError> {
        self.engine.enforce(role, resource, action)
    }

    pub fn policies_for_role(&self, role: &str) -> Result<Vec<PolicyTuple>, AuthzError> {
        self.engine.get_filtered_policy(0, role)
    }

    pub fn all_policies(&self) -> Result<Vec<PolicyTuple>, AuthzError> {
        self.engine.get_policy()
    }

    /// Force a reload from the store to pick up out-of-band edits (direct
    /// SQL) without a restart. A failed reload leaves the previous in-memory
    /// model authoritative; the error is propagated so callers can tell.
    pub async fn reload_policy(&self) -> Result<(), AuthzError> {
        self.engine.load().await.map_err(|e| {
            tracing::error!(error = %e, "Policy reload failed; previous model remains active");
            e
        })
    }

    async fn persist(&self) -> Result<(), AuthzError> {
        let snapshot = self.engine.get_policy()?;
        storage::save_all(&self.db, &snapshot).await
    }
}
