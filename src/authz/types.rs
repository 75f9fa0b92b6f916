use serde::{Deserialize, Serialize};

use crate::authz::errors::AuthzError;

/// Tag for permission rules. Grouping/role-inheritance rules would use a
/// different tag; the current model only carries `"p"` rows.
pub const POLICY_TYPE_PERMISSION: &str = "p";

pub const ACTION_READ: &str = "read";
pub const ACTION_WRITE: &str = "write";

/// The atomic authorization fact: `(subject role, resource, action)` plus
/// three reserved slots for richer rule shapes (tenant or time scoping).
///
/// A tuple is identified by the ordered combination of all non-null fields.
/// Tuples are never mutated in place; changes are remove + add.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PolicyTuple {
    pub ptype: String,
    pub subject: String,
    pub resource: String,
    pub action: String,
    pub extra: [Option<String>; 3],
}

impl PolicyTuple {
    /// Build a plain permission rule, the only shape the admin API produces.
    pub fn permission(role: &str, resource: &str, action: &str) -> Self {
        Self {
            ptype: POLICY_TYPE_PERMISSION.to_string(),
            subject: role.to_string(),
            resource: resource.to_string(),
            action: action.to_string(),
            extra: [None, None, None],
        }
    }

    /// Positional field access: 0=subject, 1=resource, 2=action, 3..=5 extras.
    pub fn field(&self, index: usize) -> Option<&str> {
        match index {
            0 => Some(self.subject.as_str()),
            1 => Some(self.resource.as_str()),
            2 => Some(self.action.as_str()),
            3..=5 => self.extra[index - 3].as_deref(),
            _ => None,
        }
    }
}

impl std::fmt::Display for PolicyTuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}",
            self.ptype, self.subject, self.resource, self.action
        )?;
        // Null slots are skipped, not rendered as empty strings
        for value in self.extra.iter().flatten() {
            write!(f, ", {value}")?;
        }
        Ok(())
    }
}

/// Outcome of one request-level authorization check. Computed per request
/// for logging and the 403 response; never persisted.
#[derive(Debug, Clone)]
pub struct AuthorizationDecision {
    pub allowed: bool,
    pub roles: Vec<String>,
    pub resource: String,
    pub action: String,
}

// ---------- Admin API request/response types ----------

#[derive(Debug, Deserialize)]
pub struct PolicyInput {
    pub role: String,
    pub resource: String,
    pub action: String,
}

impl PolicyInput {
    /// All three fields are required and must not be blank.
    pub fn normalized(&self) -> Result<(&str, &str, &str), AuthzError> {
        let role = self.role.trim();
        let resource = self.resource.trim();
        let action = self.action.trim();
        if role.is_empty() || resource.is_empty() || action.is_empty() {
            return Err(AuthzError::InvalidInput(
                "role, resource and action must not be blank".to_string(),
            ));
        }
        Ok((role, resource, action))
    }
}

#[derive(Debug, Serialize)]
pub struct PolicyView {
    pub role: String,
    pub resource: String,
    pub action: String,
}

impl From<&PolicyTuple> for PolicyView {
    fn from(tuple: &PolicyTuple) -> Self {
        Self {
            role: tuple.subject.clone(),
            resource: tuple.resource.clone(),
            action: tuple.action.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_tuple_shape() {
        let t = PolicyTuple::permission("ADMIN", "societes", "read");
        assert_eq!(t.ptype, "p");
        assert_eq!(t.subject, "ADMIN");
        assert_eq!(t.resource, "societes");
        assert_eq!(t.action, "read");
        assert_eq!(t.extra, [None, None, None]);
    }

    #[test]
    fn test_positional_field_access() {
        let mut t = PolicyTuple::permission("CLIENT", "demandes", "write");
        t.extra[0] = Some("tenant-7".to_string());

        assert_eq!(t.field(0), Some("CLIENT"));
        assert_eq!(t.field(1), Some("demandes"));
        assert_eq!(t.field(2), Some("write"));
        assert_eq!(t.field(3), Some("tenant-7"));
        assert_eq!(t.field(4), None);
        assert_eq!(t.field(6), None);
    }

    #[test]
    fn test_display_skips_null_slots() {
        let t = PolicyTuple::permission("ADMIN", "societes", "read");
        assert_eq!(t.to_string(), "p, ADMIN, societes, read");

        let mut scoped = t.clone();
        scoped.extra[0] = Some("tenant-7".to_string());
        assert_eq!(scoped.to_string(), "p, ADMIN, societes, read, tenant-7");
    }

    #[test]
    fn test_input_normalization_rejects_blanks() {
        let input = PolicyInput {
            role: "  ADMIN ".to_string(),
            resource: "societes".to_string(),
            action: "read".to_string(),
        };
        assert_eq!(input.normalized().unwrap(), ("ADMIN", "societes", "read"));

        let blank = PolicyInput {
            role: "ADMIN".to_string(),
            resource: "   ".to_string(),
            action: "read".to_string(),
        };
        assert!(matches!(
            blank.normalized(),
            Err(AuthzError::InvalidInput(_))
        ));
    }
}
