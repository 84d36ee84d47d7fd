//! Land permissions and roles.
//!
//! Permissions are a closed set. Each carries a weight: zero for everyday
//! actions, positive for managing members, roles and territory. A role's weight
//! is the sum over its permissions and ranks it for hierarchy checks.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

pub const OWNER_ROLE: &str = "owner";
pub const ADMIN_ROLE: &str = "admin";
pub const MEMBER_ROLE: &str = "member";
pub const OUTSIDER_ROLE: &str = "outsider";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LandPermission {
    Build,
    Break,
    Interact,
    Container,
    ManageMembers,
    ManageRoles,
    Claim,
    Unclaim,
}

impl LandPermission {
    pub const ALL: [Self; 8] = [
        Self::Build,
        Self::Break,
        Self::Interact,
        Self::Container,
        Self::ManageMembers,
        Self::ManageRoles,
        Self::Claim,
        Self::Unclaim,
    ];

    /// What members get by default: the zero-weight block actions.
    pub const BASIC: [Self; 4] = [Self::Build, Self::Break, Self::Interact, Self::Container];

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Build => "Place blocks",
            Self::Break => "Break blocks",
            Self::Interact => "Use doors/levers",
            Self::Container => "Access chests",
            Self::ManageMembers => "Add/remove members",
            Self::ManageRoles => "Edit roles",
            Self::Claim => "Create regions",
            Self::Unclaim => "Delete regions",
        }
    }

    #[must_use]
    pub const fn weight(self) -> u32 {
        match self {
            Self::Build | Self::Break | Self::Interact | Self::Container => 0,
            Self::Claim | Self::Unclaim => 1,
            Self::ManageMembers => 2,
            Self::ManageRoles => 4,
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        self.weight() > 0
    }

    /// Command-friendly name, e.g. `manage_members`.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Break => "break",
            Self::Interact => "interact",
            Self::Container => "container",
            Self::ManageMembers => "manage_members",
            Self::ManageRoles => "manage_roles",
            Self::Claim => "claim",
            Self::Unclaim => "unclaim",
        }
    }

    /// Parse from a string (for commands). Accepts any case, `-` or `_`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|p| p.key() == wanted)
    }
}

impl fmt::Display for LandPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A named permission set. `weight` and `is_admin` are recomputed on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RoleRecord", into = "RoleRecord")]
pub struct LandRole {
    name: String,
    permissions: BTreeSet<LandPermission>,
    weight: u32,
    is_admin: bool,
}

#[derive(Serialize, Deserialize)]
struct RoleRecord {
    name: String,
    permissions: BTreeSet<LandPermission>,
}

impl From<RoleRecord> for LandRole {
    fn from(r: RoleRecord) -> Self {
        Self::new(r.name, r.permissions)
    }
}

impl From<LandRole> for RoleRecord {
    fn from(r: LandRole) -> Self {
        Self {
            name: r.name,
            permissions: r.permissions,
        }
    }
}

impl LandRole {
    pub fn new(name: impl Into<String>, permissions: impl IntoIterator<Item = LandPermission>) -> Self {
        let mut role = Self {
            name: name.into(),
            permissions: BTreeSet::new(),
            weight: 0,
            is_admin: false,
        };
        role.set_permissions(permissions);
        role
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn permissions(&self) -> &BTreeSet<LandPermission> {
        &self.permissions
    }

    #[must_use]
    pub fn has(&self, permission: LandPermission) -> bool {
        self.permissions.contains(&permission)
    }

    #[must_use]
    pub const fn weight(&self) -> u32 {
        self.weight
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn set_permissions(&mut self, permissions: impl IntoIterator<Item = LandPermission>) {
        self.permissions = permissions.into_iter().collect();
        self.weight = weight_of(&self.permissions);
        self.is_admin = self.permissions.iter().any(|p| p.is_admin());
    }
}

/// Summed weight of a permission set.
#[must_use]
pub fn weight_of<'a>(permissions: impl IntoIterator<Item = &'a LandPermission>) -> u32 {
    permissions.into_iter().map(|p| p.weight()).sum()
}

/// Roles every new land starts with: owner, admin, member, outsider.
#[must_use]
pub fn default_roles() -> BTreeMap<String, LandRole> {
    let admin = LandPermission::ALL.into_iter().filter(|p| {
        !matches!(
            p,
            LandPermission::ManageRoles | LandPermission::Claim | LandPermission::Unclaim
        )
    });
    [
        LandRole::new(OWNER_ROLE, LandPermission::ALL),
        LandRole::new(ADMIN_ROLE, admin),
        LandRole::new(MEMBER_ROLE, LandPermission::BASIC),
        LandRole::new(OUTSIDER_ROLE, []),
    ]
    .into_iter()
    .map(|role| (role.name.clone(), role))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_management_permissions_are_admin() {
        for p in LandPermission::BASIC {
            assert_eq!(p.weight(), 0);
            assert!(!p.is_admin());
        }
        assert!(LandPermission::ManageMembers.is_admin());
        assert!(LandPermission::Unclaim.is_admin());
    }

    #[test]
    fn role_weight_tracks_mutation() {
        let mut role = LandRole::new("builder", [LandPermission::Build, LandPermission::Break]);
        assert_eq!(role.weight(), 0);
        assert!(!role.is_admin());

        role.set_permissions([LandPermission::Build, LandPermission::ManageMembers]);
        assert_eq!(role.weight(), 2);
        assert!(role.is_admin());
        assert!(!role.has(LandPermission::Break));
    }

    #[test]
    fn default_role_hierarchy() {
        let roles = default_roles();
        let weight = |name: &str| roles[name].weight();
        assert!(weight(OWNER_ROLE) > weight(ADMIN_ROLE));
        assert!(weight(ADMIN_ROLE) > weight(MEMBER_ROLE));
        assert_eq!(weight(MEMBER_ROLE), 0);
        assert!(roles[OUTSIDER_ROLE].permissions().is_empty());
        assert!(roles[ADMIN_ROLE].has(LandPermission::ManageMembers));
        assert!(!roles[ADMIN_ROLE].has(LandPermission::ManageRoles));
    }

    #[test]
    fn parses_loose_names() {
        assert_eq!(
            LandPermission::from_str_loose("Manage-Members"),
            Some(LandPermission::ManageMembers)
        );
        assert_eq!(LandPermission::from_str_loose(" BUILD "), Some(LandPermission::Build));
        assert_eq!(LandPermission::from_str_loose("fly"), None);
    }

    #[test]
    fn serialized_role_omits_derived_fields() {
        let role = LandRole::new("guard", [LandPermission::Container, LandPermission::Claim]);
        let json = serde_json::to_value(&role).expect("serializable");
        assert_eq!(
            json,
            serde_json::json!({ "name": "guard", "permissions": ["CONTAINER", "CLAIM"] })
        );
        let back: LandRole = serde_json::from_value(json).expect("deserializable");
        assert_eq!(back.weight(), 1);
    }
}
