//! Stored per-identity profile.
//!
//! Profiles live in the document database as loosely-typed JSON. They are
//! validated into [`Profile`] on the way in: a document without a known
//! `role` is rejected, never defaulted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use bizdesk_core::{IdentityId, TenantId};

use crate::Role;

/// Attributes stored alongside the role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Company (tenant) the profile belongs to; `None` for platform accounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<TenantId>,

    /// Everything else the document carries, kept as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: IdentityId,
    pub role: Role,
    #[serde(flatten)]
    pub attributes: ProfileAttributes,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("profile document is not an object")]
    NotAnObject,

    #[error("profile document has no role")]
    MissingRole,

    #[error("profile document has unknown role '{0}'")]
    UnknownRole(String),

    #[error("profile document id '{found}' does not match key '{expected}'")]
    IdMismatch { expected: String, found: String },

    #[error("malformed profile document: {0}")]
    Malformed(String),
}

#[derive(Deserialize)]
struct ProfileDocument {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    role: Option<serde_json::Value>,
    #[serde(flatten)]
    attributes: ProfileAttributes,
}

impl Profile {
    pub fn new(id: IdentityId, role: Role) -> Self {
        Self {
            id,
            role,
            attributes: ProfileAttributes::default(),
        }
    }

    /// Validate a raw document stored under `id`.
    pub fn from_document(id: &IdentityId, document: serde_json::Value) -> Result<Self, ProfileError> {
        if !document.is_object() {
            return Err(ProfileError::NotAnObject);
        }

        let doc: ProfileDocument =
            serde_json::from_value(document).map_err(|e| ProfileError::Malformed(e.to_string()))?;

        if let Some(found) = doc.id {
            if found != id.as_str() {
                return Err(ProfileError::IdMismatch {
                    expected: id.to_string(),
                    found,
                });
            }
        }

        let role = match doc.role {
            None | Some(serde_json::Value::Null) => return Err(ProfileError::MissingRole),
            Some(serde_json::Value::String(name)) => name
                .parse::<Role>()
                .map_err(|_| ProfileError::UnknownRole(name))?,
            Some(other) => return Err(ProfileError::UnknownRole(other.to_string())),
        };

        Ok(Self {
            id: id.clone(),
            role,
            attributes: doc.attributes,
        })
    }

    /// Serialize back to the stored document shape.
    pub fn to_document(&self) -> serde_json::Value {
        // Profile has only string keys and plain data, so this cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
