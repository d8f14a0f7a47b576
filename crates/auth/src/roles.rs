use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role identifier used for RBAC.
///
/// The set is closed: a profile always carries exactly one of these.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform operator, above every company.
    Master,
    CompanyOwner,
    Partner,
    Employee,
    User,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Master,
        Role::CompanyOwner,
        Role::Partner,
        Role::Employee,
        Role::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::CompanyOwner => "companyowner",
            Role::Partner => "partner",
            Role::Employee => "employee",
            Role::User => "user",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::Master => "Platform administrator with every permission across companies",
            Role::CompanyOwner => "Owner of a company with full control over its workspace",
            Role::Partner => "Associate managing invoices, clients, catalogue and tickets",
            Role::Employee => "Staff member handling day-to-day invoices and clients",
            Role::User => "Basic account with dashboard access and ticket submission",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
