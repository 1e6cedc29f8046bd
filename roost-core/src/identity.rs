use serde::{Deserialize, Serialize};

/// Role tags carried by an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Admin,
    Superadmin,
}

/// The authenticated caller.
///
/// Created by the authentication layer (external) and immutable for the
/// duration of one request. `organisation_id` is `None` for a
/// platform-wide superadmin or for an actor not yet attached to a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: String,
    /// Federated identity the caller authenticated with.
    pub feduid: String,
    pub organisation_id: Option<String>,
    pub roles: Vec<Role>,
}

impl Actor {
    pub fn new(
        id: impl Into<String>,
        feduid: impl Into<String>,
        organisation_id: Option<String>,
        roles: Vec<Role>,
    ) -> Self {
        Self {
            id: id.into(),
            feduid: feduid.into(),
            organisation_id,
            roles,
        }
    }

    pub fn is_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Admins and superadmins bypass owner checks on owner-scoped operations.
    pub fn is_elevated(&self) -> bool {
        self.is_role(Role::Admin) || self.is_role(Role::Superadmin)
    }
}
