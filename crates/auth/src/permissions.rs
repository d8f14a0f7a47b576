use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Role;

/// Named capability gated by role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewDashboard,
    ManageCompanies,
    ManageUsers,
    ManageSettings,
    ViewCatalogue,
    EditCatalogue,
    ViewInvoices,
    EditInvoices,
    SendInvoices,
    ViewClients,
    EditClients,
    ViewReports,
    ManageTickets,
    CreateTickets,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown permission '{0}'")]
pub struct UnknownPermission(pub String);

impl Permission {
    pub const ALL: [Permission; 14] = [
        Permission::ViewDashboard,
        Permission::ManageCompanies,
        Permission::ManageUsers,
        Permission::ManageSettings,
        Permission::ViewCatalogue,
        Permission::EditCatalogue,
        Permission::ViewInvoices,
        Permission::EditInvoices,
        Permission::SendInvoices,
        Permission::ViewClients,
        Permission::EditClients,
        Permission::ViewReports,
        Permission::ManageTickets,
        Permission::CreateTickets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewDashboard => "view_dashboard",
            Permission::ManageCompanies => "manage_companies",
            Permission::ManageUsers => "manage_users",
            Permission::ManageSettings => "manage_settings",
            Permission::ViewCatalogue => "view_catalogue",
            Permission::EditCatalogue => "edit_catalogue",
            Permission::ViewInvoices => "view_invoices",
            Permission::EditInvoices => "edit_invoices",
            Permission::SendInvoices => "send_invoices",
            Permission::ViewClients => "view_clients",
            Permission::EditClients => "edit_clients",
            Permission::ViewReports => "view_reports",
            Permission::ManageTickets => "manage_tickets",
            Permission::CreateTickets => "create_tickets",
        }
    }

    /// Functional area the permission belongs to (for audit/display).
    pub fn category(&self) -> &'static str {
        match self {
            Permission::ViewDashboard => "dashboard",
            Permission::ManageCompanies | Permission::ManageUsers | Permission::ManageSettings => {
                "administration"
            }
            Permission::ViewCatalogue | Permission::EditCatalogue => "catalogue",
            Permission::ViewInvoices | Permission::EditInvoices | Permission::SendInvoices => {
                "invoices"
            }
            Permission::ViewClients | Permission::EditClients => "clients",
            Permission::ViewReports => "reports",
            Permission::ManageTickets | Permission::CreateTickets => "tickets",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Permission::ViewDashboard => "View the dashboard",
            Permission::ManageCompanies => "Create and administer companies",
            Permission::ManageUsers => "Invite users and change their roles",
            Permission::ManageSettings => "Enable or disable company modules",
            Permission::ViewCatalogue => "Browse the product catalogue",
            Permission::EditCatalogue => "Create/update/delete catalogue entries",
            Permission::ViewInvoices => "View/list invoices",
            Permission::EditInvoices => "Create/update invoices",
            Permission::SendInvoices => "Deliver invoices to clients by e-mail",
            Permission::ViewClients => "View/list clients",
            Permission::EditClients => "Create/update/delete clients",
            Permission::ViewReports => "View financial reports",
            Permission::ManageTickets => "Handle and close support tickets",
            Permission::CreateTickets => "Open support tickets",
        }
    }
}

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The static role → permissions table.
///
/// The match is exhaustive, so every role has an entry.
pub fn permissions_for(role: Role) -> &'static [Permission] {
    use Permission::*;

    match role {
        Role::Master => &Permission::ALL,
        Role::CompanyOwner => &[
            ViewDashboard,
            ManageUsers,
            ManageSettings,
            ViewCatalogue,
            EditCatalogue,
            ViewInvoices,
            EditInvoices,
            SendInvoices,
            ViewClients,
            EditClients,
            ViewReports,
            ManageTickets,
            CreateTickets,
        ],
        Role::Partner => &[
            ViewDashboard,
            ViewCatalogue,
            EditCatalogue,
            ViewInvoices,
            EditInvoices,
            SendInvoices,
            ViewClients,
            EditClients,
            ViewReports,
            ManageTickets,
        ],
        Role::Employee => &[
            ViewDashboard,
            ViewCatalogue,
            ViewInvoices,
            EditInvoices,
            ViewClients,
            EditClients,
            CreateTickets,
        ],
        Role::User => &[ViewDashboard, CreateTickets],
    }
}

/// Pure lookup in the permission table.
pub fn has_permission(role: Role, permission: Permission) -> bool {
    permissions_for(role).contains(&permission)
}

/// String-level lookup: unknown role or permission names are denied.
pub fn has_permission_str(role: &str, permission: &str) -> bool {
    match (role.parse::<Role>(), permission.parse::<Permission>()) {
        (Ok(role), Ok(permission)) => has_permission(role, permission),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn master_has_everything() {
        for p in Permission::ALL {
            assert!(has_permission(Role::Master, p), "master lacks {p}");
        }
    }

    #[test]
    fn only_master_manages_companies() {
        for role in Role::ALL {
            assert_eq!(
                has_permission(role, Permission::ManageCompanies),
                role == Role::Master
            );
        }
    }

    #[test]
    fn user_is_limited_to_dashboard_and_ticket_submission() {
        assert!(has_permission(Role::User, Permission::ViewDashboard));
        assert!(has_permission(Role::User, Permission::CreateTickets));
        assert!(!has_permission(Role::User, Permission::ViewInvoices));
        assert!(!has_permission(Role::User, Permission::ManageUsers));
    }

    #[test]
    fn employee_cannot_manage_users_or_settings() {
        assert!(!has_permission(Role::Employee, Permission::ManageUsers));
        assert!(!has_permission(Role::Employee, Permission::ManageSettings));
        assert!(has_permission(Role::Employee, Permission::EditInvoices));
    }

    #[test]
    fn string_lookup_denies_unknown_names() {
        assert!(has_permission_str("partner", "view_reports"));
        assert!(!has_permission_str("admin", "view_reports"));
        assert!(!has_permission_str("partner", "delete_everything"));
        assert!(!has_permission_str("", ""));
    }

    #[test]
    fn every_role_has_a_non_empty_entry() {
        for role in Role::ALL {
            assert!(!permissions_for(role).is_empty());
            assert!(has_permission(role, Permission::ViewDashboard));
        }
    }

    fn any_role() -> impl Strategy<Value = Role> {
        proptest::sample::select(Role::ALL.to_vec())
    }

    fn any_permission() -> impl Strategy<Value = Permission> {
        proptest::sample::select(Permission::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn string_and_typed_lookups_agree(role in any_role(), permission in any_permission()) {
            prop_assert_eq!(
                has_permission_str(role.as_str(), permission.as_str()),
                has_permission(role, permission)
            );
        }

        #[test]
        fn master_dominates_every_role(role in any_role(), permission in any_permission()) {
            if has_permission(role, permission) {
                prop_assert!(has_permission(Role::Master, permission));
            }
        }

        #[test]
        fn unknown_role_names_are_always_denied(name in "[a-z]{1,12}", permission in any_permission()) {
            prop_assume!(name.parse::<Role>().is_err());
            prop_assert!(!has_permission_str(&name, permission.as_str()));
        }
    }
}
