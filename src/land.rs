//! The land aggregate: claimed territory plus members and roles.
//!
//! A `Land` enforces its own structural rules (the owner keeps the `owner`
//! role, every member's role exists, role names are unique). Who may ask for a
//! change is decided by [`Land::authorize`] and the manager.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LandError, LandResult};
use crate::graph::{RegionGraph, RegionId};
use crate::permission::{self, LandPermission, LandRole, MEMBER_ROLE, OWNER_ROLE};
use crate::region::{BlockPos, Region};

#[derive(Debug)]
pub struct Land {
    id: Uuid,
    name: String,
    owner: Uuid,
    regions: RegionGraph,
    /// Player -> role name.
    members: HashMap<Uuid, String>,
    roles: BTreeMap<String, LandRole>,
    /// Milliseconds since the Unix epoch.
    created_at: u64,
    volume: u64,
    /// Bumped on every mutation; lets a stale unclaim preview be detected.
    revision: u64,
}

/// How an actor is allowed to perform a management action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authority {
    /// The land owner: every permission, no hierarchy limits.
    Owner,
    /// A member acting through their role.
    Delegate { role: String, weight: u32 },
}

impl Authority {
    /// Whether the actor outranks (or matches) something of `weight`.
    #[must_use]
    pub const fn reaches(&self, weight: u32) -> bool {
        match self {
            Self::Owner => true,
            Self::Delegate { weight: own, .. } => weight <= *own,
        }
    }
}

impl Land {
    /// A fresh land holding one region, with the default roles and the owner
    /// registered under `owner`.
    #[must_use]
    pub fn new(id: Uuid, name: impl Into<String>, owner: Uuid, region: Region, created_at: u64) -> Self {
        let mut members = HashMap::new();
        members.insert(owner, OWNER_ROLE.to_owned());
        let regions = RegionGraph::from_regions([region]);
        Self {
            id,
            name: name.into(),
            owner,
            volume: regions.volume(),
            regions,
            members,
            roles: permission::default_roles(),
            created_at,
            revision: 0,
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn owner(&self) -> Uuid {
        self.owner
    }

    #[must_use]
    pub const fn created_at(&self) -> u64 {
        self.created_at
    }

    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Total claimed blocks. Kept in step with the region set.
    #[must_use]
    pub const fn volume(&self) -> u64 {
        self.volume
    }

    #[must_use]
    pub const fn regions(&self) -> &RegionGraph {
        &self.regions
    }

    #[must_use]
    pub fn contains(&self, pos: BlockPos) -> bool {
        self.regions.find_containing(pos).is_some()
    }

    #[must_use]
    pub fn overlaps(&self, region: &Region) -> bool {
        self.regions.iter().any(|(_, r)| r.overlaps(region))
    }

    #[must_use]
    pub const fn members(&self) -> &HashMap<Uuid, String> {
        &self.members
    }

    #[must_use]
    pub fn is_member(&self, player: Uuid) -> bool {
        self.members.contains_key(&player)
    }

    #[must_use]
    pub fn member_role(&self, player: Uuid) -> Option<&str> {
        self.members.get(&player).map(String::as_str)
    }

    #[must_use]
    pub const fn roles(&self) -> &BTreeMap<String, LandRole> {
        &self.roles
    }

    #[must_use]
    pub fn role(&self, name: &str) -> Option<&LandRole> {
        self.roles.get(name)
    }

    /// The owner has everything; anyone else needs a role that grants it.
    #[must_use]
    pub fn has_permission(&self, player: Uuid, permission: LandPermission) -> bool {
        if player == self.owner {
            return true;
        }
        self.member_role(player)
            .and_then(|name| self.roles.get(name))
            .is_some_and(|role| role.has(permission))
    }

    /// Decide whether `actor` may perform a member/role management action that
    /// requires `permission`.
    ///
    /// Unless `delegated` is set, only the owner passes, whatever the actor's
    /// role holds. With `delegated`, a member passes if their role holds
    /// `permission`; the returned authority carries their weight for the
    /// hierarchy checks that follow.
    pub fn authorize(
        &self,
        actor: Uuid,
        permission: LandPermission,
        delegated: bool,
    ) -> LandResult<Authority> {
        if actor == self.owner {
            return Ok(Authority::Owner);
        }
        let Some((role_name, role)) = self
            .members
            .get(&actor)
            .and_then(|name| self.roles.get(name).map(|role| (name, role)))
        else {
            return Err(LandError::denied("Player is not a member of the land."));
        };
        if !delegated {
            return Err(LandError::denied(format!(
                "Only the land owner may {} on this land.",
                permission.description().to_lowercase()
            )));
        }
        if !role.has(permission) {
            return Err(LandError::denied(format!(
                "Player does not have the {permission} permission on this land."
            )));
        }
        Ok(Authority::Delegate {
            role: role_name.clone(),
            weight: role.weight(),
        })
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn touch_regions(&mut self) {
        self.volume = self.regions.volume();
        self.touch();
    }

    /// Add regions to the land, linking them to whatever they touch. Overlap
    /// must already have been resolved by the caller.
    pub(crate) fn claim_regions(&mut self, regions: impl IntoIterator<Item = Region>) -> Vec<RegionId> {
        let ids = regions
            .into_iter()
            .map(|r| self.regions.insert_linked(r))
            .collect();
        self.touch_regions();
        ids
    }

    /// Coalesce coplanar neighbours. Returns the number of merges.
    pub(crate) fn merge_regions(&mut self, until_stable: bool) -> usize {
        let merged = self.regions.merge_pass(until_stable);
        if merged > 0 {
            self.touch_regions();
        }
        merged
    }

    /// Swap in a new territory wholesale.
    pub(crate) fn replace_regions(&mut self, regions: RegionGraph) {
        self.regions = regions;
        self.touch_regions();
    }

    /// Put `player` under `role`. The owner and the owner role are off limits.
    pub(crate) fn set_member(&mut self, player: Uuid, role: &str) -> LandResult<()> {
        if player == self.owner {
            return Err(LandError::invalid("Cannot assign role to the land owner."));
        }
        if role == OWNER_ROLE {
            return Err(LandError::invalid("The owner role cannot be assigned."));
        }
        if !self.roles.contains_key(role) {
            return Err(LandError::not_found(format!(
                "Role {role} does not exist in the land."
            )));
        }
        self.members.insert(player, role.to_owned());
        self.touch();
        Ok(())
    }

    /// Drop `player` from the land, returning the role they held.
    pub(crate) fn remove_member(&mut self, player: Uuid) -> LandResult<String> {
        if player == self.owner {
            return Err(LandError::invalid("Cannot untrust the land owner."));
        }
        let role = self
            .members
            .remove(&player)
            .ok_or_else(|| LandError::not_found("Player is not a member of the land."))?;
        self.touch();
        Ok(role)
    }

    pub(crate) fn add_role(&mut self, role: LandRole) -> LandResult<()> {
        if self.roles.contains_key(role.name()) {
            return Err(LandError::conflict(format!(
                "Role {} already exists in the land.",
                role.name()
            )));
        }
        self.roles.insert(role.name().to_owned(), role);
        self.touch();
        Ok(())
    }

    /// Delete a role and move its holders to a non-admin fallback, creating the
    /// default `member` role when no non-admin role is left. Returns the
    /// fallback role name.
    pub(crate) fn delete_role(&mut self, name: &str) -> LandResult<String> {
        if name == OWNER_ROLE {
            return Err(LandError::invalid("The owner role cannot be deleted."));
        }
        if self.roles.remove(name).is_none() {
            return Err(LandError::not_found(format!(
                "Role {name} does not exist in the land."
            )));
        }

        let fallback = match self
            .roles
            .values()
            .find(|r| !r.is_admin() && r.name() != OWNER_ROLE)
        {
            Some(role) => role.name().to_owned(),
            None => {
                let role = LandRole::new(MEMBER_ROLE, LandPermission::BASIC);
                self.roles.insert(MEMBER_ROLE.to_owned(), role);
                MEMBER_ROLE.to_owned()
            }
        };

        for role in self.members.values_mut() {
            if *role == name {
                role.clone_from(&fallback);
            }
        }
        self.touch();
        Ok(fallback)
    }

    pub(crate) fn set_role_permissions(
        &mut self,
        name: &str,
        permissions: impl IntoIterator<Item = LandPermission>,
    ) -> LandResult<()> {
        if name == OWNER_ROLE {
            return Err(LandError::invalid("The owner role cannot be modified."));
        }
        let role = self
            .roles
            .get_mut(name)
            .ok_or_else(|| LandError::not_found(format!("Role {name} does not exist in the land.")))?;
        role.set_permissions(permissions);
        self.touch();
        Ok(())
    }

    /// Plain-data form for persistence.
    #[must_use]
    pub fn to_record(&self) -> LandRecord {
        LandRecord {
            id: self.id,
            name: self.name.clone(),
            owner: self.owner,
            regions: self.regions.regions(),
            members: self.members.clone(),
            roles: self.roles.values().cloned().collect(),
            created_at: self.created_at,
        }
    }

    /// Rebuild a land from its record, checking the data model invariants and
    /// recomputing adjacency from geometry.
    pub fn from_record(record: LandRecord) -> LandResult<Self> {
        let LandRecord {
            id,
            name,
            owner,
            regions,
            members,
            roles,
            created_at,
        } = record;

        if regions.is_empty() {
            return Err(LandError::invalid(format!("Land {name} has no regions.")));
        }
        for (i, a) in regions.iter().enumerate() {
            if let Some(b) = regions[i + 1..].iter().find(|b| a.overlaps(b)) {
                return Err(LandError::invalid(format!(
                    "Land {name} has overlapping regions {a} and {b}."
                )));
            }
        }

        let mut role_map = BTreeMap::new();
        for role in roles {
            let key = role.name().to_owned();
            if role_map.insert(key.clone(), role).is_some() {
                return Err(LandError::conflict(format!(
                    "Land {name} defines role {key} twice."
                )));
            }
        }
        if !role_map.contains_key(OWNER_ROLE) || members.get(&owner).map(String::as_str) != Some(OWNER_ROLE) {
            return Err(LandError::invalid(format!(
                "Land {name} does not register its owner under the owner role."
            )));
        }
        if let Some((player, role)) = members.iter().find(|(_, role)| !role_map.contains_key(*role)) {
            return Err(LandError::not_found(format!(
                "Member {player} of land {name} holds unknown role {role}."
            )));
        }
        if let Some((player, _)) = members
            .iter()
            .find(|(player, role)| **player != owner && role.as_str() == OWNER_ROLE)
        {
            return Err(LandError::invalid(format!(
                "Member {player} of land {name} holds the owner role."
            )));
        }

        let graph = RegionGraph::from_regions(regions);
        if !graph.is_contiguous() {
            log::warn!("lands_pmc: Land '{name}' restored with disconnected territory");
        }
        Ok(Self {
            id,
            name,
            owner,
            volume: graph.volume(),
            regions: graph,
            members,
            roles: role_map,
            created_at,
            revision: 0,
        })
    }
}

/// Serializable snapshot of a [`Land`]. Adjacency is derived, so it is not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandRecord {
    pub id: Uuid,
    pub name: String,
    pub owner: Uuid,
    pub regions: Vec<Region>,
    pub members: HashMap<Uuid, String>,
    pub roles: Vec<LandRole>,
    pub created_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::permission::{ADMIN_ROLE, OUTSIDER_ROLE};

    fn home() -> Land {
        Land::new(
            Uuid::new_v4(),
            "Home",
            Uuid::new_v4(),
            Region::from_coords(0, 0, 0, 9, 9, 9),
            0,
        )
    }

    #[test]
    fn new_land_registers_owner() {
        let land = home();
        assert_eq!(land.member_role(land.owner()), Some(OWNER_ROLE));
        assert_eq!(land.volume(), 1000);
        assert_eq!(land.roles().len(), 4);
        assert!(land.contains(BlockPos::new(5, 5, 5)));
    }

    #[test]
    fn claim_then_merge_collapses_coplanar_regions() {
        let mut land = home();
        land.claim_regions([Region::from_coords(10, 0, 0, 19, 9, 9)]);
        assert_eq!(land.regions().len(), 2);
        assert_eq!(land.volume(), 2000);
        assert_eq!(land.merge_regions(true), 1);
        assert_eq!(land.regions().len(), 1);
        assert_eq!(land.volume(), 2000);
    }

    #[test]
    fn owner_always_has_permission() {
        let land = home();
        for p in LandPermission::ALL {
            assert!(land.has_permission(land.owner(), p));
        }
        assert!(!land.has_permission(Uuid::new_v4(), LandPermission::Build));
    }

    #[test]
    fn authorize_requires_owner_unless_delegated() {
        let mut land = home();
        let admin = Uuid::new_v4();
        land.set_member(admin, ADMIN_ROLE).expect("admin role exists");

        let err = land
            .authorize(admin, LandPermission::ManageMembers, false)
            .expect_err("owner-only policy");
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);

        let authority = land
            .authorize(admin, LandPermission::ManageMembers, true)
            .expect("admin holds manage_members");
        assert!(matches!(authority, Authority::Delegate { ref role, .. } if role == ADMIN_ROLE));

        assert!(land.authorize(admin, LandPermission::ManageRoles, true).is_err());
        assert_eq!(
            land.authorize(land.owner(), LandPermission::ManageRoles, false),
            Ok(Authority::Owner)
        );
    }

    #[test]
    fn owner_role_is_protected() {
        let mut land = home();
        let owner = land.owner();
        assert_eq!(land.set_member(owner, MEMBER_ROLE).map_err(|e| e.kind()), Err(ErrorKind::InvalidOperation));
        assert_eq!(
            land.set_member(Uuid::new_v4(), OWNER_ROLE).map_err(|e| e.kind()),
            Err(ErrorKind::InvalidOperation)
        );
        assert_eq!(land.delete_role(OWNER_ROLE).map_err(|e| e.kind()), Err(ErrorKind::InvalidOperation));
        assert_eq!(land.remove_member(owner).map_err(|e| e.kind()), Err(ErrorKind::InvalidOperation));
    }

    #[test]
    fn delete_role_falls_back_to_existing_non_admin_role() {
        let mut land = home();
        let player = Uuid::new_v4();
        land.add_role(LandRole::new("vip", [LandPermission::Build, LandPermission::Claim]))
            .expect("new role");
        land.set_member(player, "vip").expect("vip exists");
        let fallback = land.delete_role("vip").expect("vip exists");
        assert_eq!(fallback, MEMBER_ROLE);
        assert_eq!(land.member_role(player), Some(MEMBER_ROLE));
    }

    #[test]
    fn delete_role_materializes_member_role() {
        let mut land = home();
        let player = Uuid::new_v4();
        land.delete_role(MEMBER_ROLE).expect("default role");
        land.delete_role(OUTSIDER_ROLE).expect("default role");
        land.set_member(player, ADMIN_ROLE).expect("admin exists");
        assert_eq!(land.delete_role(ADMIN_ROLE), Ok(MEMBER_ROLE.to_owned()));
        assert_eq!(land.member_role(player), Some(MEMBER_ROLE));
        let member = land.role(MEMBER_ROLE).expect("recreated");
        assert_eq!(member.permissions().len(), 4);
        assert!(!member.is_admin());
    }

    #[test]
    fn owner_role_permissions_are_fixed() {
        let mut land = home();
        assert_eq!(
            land.set_role_permissions(OWNER_ROLE, []).map_err(|e| e.kind()),
            Err(ErrorKind::InvalidOperation)
        );
        assert_eq!(land.role(OWNER_ROLE).map(LandRole::permissions).map(|p| p.len()), Some(8));
    }

    #[test]
    fn delete_role_never_falls_back_to_owner() {
        let land = home();
        let player = Uuid::new_v4();
        let mut record = land.to_record();
        for role in &mut record.roles {
            if role.name() == OWNER_ROLE {
                role.set_permissions([]);
            }
        }
        record.members.insert(player, ADMIN_ROLE.to_owned());
        let mut land = Land::from_record(record).expect("valid record");
        land.delete_role(MEMBER_ROLE).expect("default role");
        land.delete_role(OUTSIDER_ROLE).expect("default role");

        assert_eq!(land.delete_role(ADMIN_ROLE), Ok(MEMBER_ROLE.to_owned()));
        assert_eq!(land.member_role(player), Some(MEMBER_ROLE));
    }

    #[test]
    fn mutations_bump_revision() {
        let mut land = home();
        let before = land.revision();
        land.set_role_permissions(MEMBER_ROLE, [LandPermission::Build])
            .expect("member exists");
        assert!(land.revision() > before);
    }

    #[test]
    fn record_round_trip_rebuilds_adjacency() {
        let mut land = home();
        land.claim_regions([Region::from_coords(0, 10, 0, 9, 12, 9)]);
        land.set_member(Uuid::new_v4(), MEMBER_ROLE).expect("member exists");

        let record = land.to_record();
        let json = serde_json::to_string(&record).expect("serializable");
        let back: LandRecord = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(back, record);

        let restored = Land::from_record(back).expect("valid record");
        assert_eq!(restored.volume(), land.volume());
        assert!(restored.regions().is_contiguous());
        assert_eq!(restored.members(), land.members());
    }

    #[test]
    fn from_record_rejects_broken_invariants() {
        let land = home();

        let mut overlapping = land.to_record();
        overlapping.regions.push(Region::from_coords(5, 5, 5, 12, 12, 12));
        assert_eq!(Land::from_record(overlapping).map(|_| ()).map_err(|e| e.kind()), Err(ErrorKind::InvalidOperation));

        let mut dangling = land.to_record();
        dangling.members.insert(Uuid::new_v4(), "ghost".to_owned());
        assert_eq!(Land::from_record(dangling).map(|_| ()).map_err(|e| e.kind()), Err(ErrorKind::NotFound));

        let mut ownerless = land.to_record();
        ownerless.members.clear();
        assert!(Land::from_record(ownerless).is_err());
    }
}
