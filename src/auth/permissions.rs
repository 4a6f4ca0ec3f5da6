use std::collections::{HashMap, HashSet};

use crate::auth::repo_types::Role;

/// Operations a role may perform on projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Read,
    Create,
    Update,
    Delete,
}

/// Immutable role -> permission mapping, built once at startup and shared
/// through `AppState`. This is the coarse gate only: ownership checks are
/// applied separately by the project handlers, so a plain user can still
/// mutate projects they own.
#[derive(Debug)]
pub struct RolePermissions {
    grants: HashMap<Role, HashSet<Permission>>,
}

impl RolePermissions {
    pub fn new() -> Self {
        let mut grants = HashMap::new();
        grants.insert(
            Role::Admin,
            HashSet::from([
                Permission::Read,
                Permission::Create,
                Permission::Update,
                Permission::Delete,
            ]),
        );
        grants.insert(Role::User, HashSet::from([Permission::Read]));
        Self { grants }
    }

    /// Roles without an entry have no permissions (fail closed).
    pub fn has(&self, role: Role, permission: Permission) -> bool {
        self.grants
            .get(&role)
            .map(|set| set.contains(&permission))
            .unwrap_or(false)
    }
}

impl Default for RolePermissions {
    fn default() -> Self {
        Self::new()
    }
}
