use bizdesk_auth::{ActionAuthorization, Permission};

/// Small helper to associate required permissions with a handler.
pub struct ActionAuth {
    pub required: &'static [Permission],
}

impl ActionAuthorization for ActionAuth {
    fn required_permissions(&self) -> &[Permission] {
        self.required
    }
}

pub const MANAGE_USERS: ActionAuth = ActionAuth {
    required: &[Permission::ManageUsers],
};

pub const MANAGE_SETTINGS: ActionAuth = ActionAuth {
    required: &[Permission::ManageSettings],
};
