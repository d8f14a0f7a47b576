use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::permissions::{has_permission, permissions_for};
use crate::{Permission, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role '{role}' lacks permission '{permission}'")]
    Forbidden { role: Role, permission: Permission },
}

/// Action-level authorization contract.
///
/// Implement this on API operations that require permissions; the API layer
/// enforces the requirements before running the operation.
pub trait ActionAuthorization {
    fn required_permissions(&self) -> &[Permission];
}

/// Check a single permission for a role.
///
/// - No IO
/// - No panics
pub fn authorize(role: Role, required: Permission) -> Result<(), AuthzError> {
    if has_permission(role, required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            role,
            permission: required,
        })
    }
}

/// Check every permission an action requires.
pub fn authorize_action<A: ActionAuthorization + ?Sized>(
    role: Role,
    action: &A,
) -> Result<(), AuthzError> {
    for permission in action.required_permissions() {
        authorize(role, *permission)?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
///
/// Answers "why was this request allowed/denied?" for a role and permission.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub required_permission: String,
    pub granted: bool,
    pub reason: String,
    pub role: Option<Role>,
    pub effective_permissions: Vec<Permission>,
    /// Roles that would grant the permission (empty when granted).
    pub granting_roles: Vec<Role>,
    pub suggestions: Vec<String>,
}

/// Explain a decision from raw names, as received from a query string.
///
/// Unknown role or permission names are explained as denials.
pub fn explain_authorization(role: &str, required: &str) -> AuthorizationExplanation {
    let parsed_role = role.parse::<Role>().ok();
    let parsed_permission = required.parse::<Permission>().ok();

    let effective_permissions = parsed_role
        .map(|r| permissions_for(r).to_vec())
        .unwrap_or_default();

    let (Some(r), Some(p)) = (parsed_role, parsed_permission) else {
        let (reason, suggestion) = if parsed_role.is_none() {
            (
                format!("Unknown role '{role}': unknown roles are denied every permission"),
                format!("Valid roles are: {}", Role::ALL.map(|r| r.as_str()).join(", ")),
            )
        } else {
            (
                format!("Unknown permission '{required}': unknown permissions are always denied"),
                format!(
                    "Valid permissions are: {}",
                    Permission::ALL.map(|p| p.as_str()).join(", ")
                ),
            )
        };
        return AuthorizationExplanation {
            required_permission: required.to_string(),
            granted: false,
            reason,
            role: parsed_role,
            effective_permissions,
            granting_roles: Vec::new(),
            suggestions: vec![suggestion],
        };
    };

    if has_permission(r, p) {
        return AuthorizationExplanation {
            required_permission: required.to_string(),
            granted: true,
            reason: format!("Role '{r}' grants permission '{p}'"),
            role: Some(r),
            effective_permissions,
            granting_roles: Vec::new(),
            suggestions: Vec::new(),
        };
    }

    let granting_roles: Vec<Role> = Role::ALL
        .into_iter()
        .filter(|candidate| has_permission(*candidate, p))
        .collect();

    let mut suggestions = vec![format!(
        "Ask an administrator to change the role to one that grants '{p}'"
    )];
    if !granting_roles.is_empty() {
        suggestions.push(format!(
            "Roles granting '{p}': {}",
            granting_roles
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    AuthorizationExplanation {
        required_permission: required.to_string(),
        granted: false,
        reason: format!("Role '{r}' does not grant permission '{p}'"),
        role: Some(r),
        effective_permissions,
        granting_roles,
        suggestions,
    }
}

/// Role definition with its granted permissions (for audit/display).
#[derive(Debug, Clone, Serialize)]
pub struct RoleDefinition {
    pub name: Role,
    pub permissions: Vec<Permission>,
    pub description: &'static str,
}

/// Permission definition (for audit/display).
#[derive(Debug, Clone, Serialize)]
pub struct PermissionDefinition {
    pub name: Permission,
    pub description: &'static str,
    pub category: &'static str,
    pub granted_to: Vec<Role>,
}

/// Registry of all roles and permissions, built from the static table.
#[derive(Debug, Clone, Serialize)]
pub struct RbacRegistry {
    pub roles: BTreeMap<String, RoleDefinition>,
    pub permissions: BTreeMap<String, PermissionDefinition>,
}

impl RbacRegistry {
    pub fn build() -> Self {
        let roles = Role::ALL
            .into_iter()
            .map(|role| {
                (
                    role.as_str().to_string(),
                    RoleDefinition {
                        name: role,
                        permissions: permissions_for(role).to_vec(),
                        description: role.description(),
                    },
                )
            })
            .collect();

        let permissions = Permission::ALL
            .into_iter()
            .map(|permission| {
                (
                    permission.as_str().to_string(),
                    PermissionDefinition {
                        name: permission,
                        description: permission.description(),
                        category: permission.category(),
                        granted_to: Role::ALL
                            .into_iter()
                            .filter(|r| has_permission(*r, permission))
                            .collect(),
                    },
                )
            })
            .collect();

        Self { roles, permissions }
    }
}
