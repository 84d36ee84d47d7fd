//! Land registry and the operations players drive: claim, unclaim, trust,
//! untrust and role management.
//!
//! The manager owns every [`Land`], indexes them by id and by name, and tracks
//! which land each player has selected. Selection is the implicit target of
//! all claim and membership operations.

use std::collections::{BTreeSet, HashMap};
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::config::LandsConfig;
use crate::error::{LandError, LandResult};
use crate::graph::{RegionGraph, RegionId};
use crate::land::{Authority, Land, LandRecord};
use crate::permission::{self, LandPermission, LandRole};
use crate::region::{BlockPos, Region};

/// One connected piece of territory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerritoryComponent {
    pub regions: Vec<Region>,
    pub volume: u64,
}

impl TerritoryComponent {
    fn from_ids(graph: &RegionGraph, ids: &BTreeSet<RegionId>) -> Self {
        let regions: Vec<Region> = ids.iter().filter_map(|id| graph.region(*id).copied()).collect();
        let volume = regions.iter().map(Region::volume).sum();
        Self { regions, volume }
    }
}

/// What an unclaim would do, shown to the player before it is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnclaimPreview {
    pub land_id: Uuid,
    pub land_name: String,
    /// Blocks of the land covered by the unclaimed region itself.
    pub released_volume: u64,
    /// The largest remaining piece; becomes the land's territory on confirm.
    pub kept: TerritoryComponent,
    /// Pieces cut off from `kept`, given up on confirm.
    pub relinquished: Vec<TerritoryComponent>,
}

impl UnclaimPreview {
    #[must_use]
    pub fn relinquished_volume(&self) -> u64 {
        self.relinquished.iter().map(|c| c.volume).sum()
    }
}

#[derive(Debug)]
struct PendingUnclaim {
    preview: UnclaimPreview,
    revision: u64,
    territory: RegionGraph,
}

/// Result of a successful claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimOutcome {
    /// Non-overlapping pieces of the requested region that were added.
    pub added: Vec<Region>,
    pub claimed_volume: u64,
    pub land_volume: u64,
}

#[derive(Debug, Default)]
pub struct LandManager {
    config: LandsConfig,
    lands_by_id: HashMap<Uuid, Land>,
    ids_by_name: HashMap<String, Uuid>,
    /// Player -> selected land id.
    selected_land_by_player: HashMap<Uuid, Uuid>,
    pending_unclaims: HashMap<Uuid, PendingUnclaim>,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

fn logged<T>(action: &str, player: Uuid, result: LandResult<T>) -> LandResult<T> {
    if let Err(e) = &result {
        log::debug!("lands_pmc: {action} by {player} rejected: {e}");
    }
    result
}

/// Cut `candidate` against every region of `territory`.
///
/// Returns the pieces of `candidate` not already covered, and whether the
/// candidate touches or overlaps the territory at all.
fn split_against(territory: &RegionGraph, candidate: Region) -> (Vec<Region>, bool) {
    let mut pieces = vec![candidate];
    let mut connected = false;
    for (_, existing) in territory.iter() {
        let mut next = Vec::with_capacity(pieces.len());
        for piece in pieces {
            if existing.overlaps(&piece) {
                connected = true;
                next.extend(piece.subtract(existing));
            } else {
                connected |= existing.is_adjacent_to(&piece);
                next.push(piece);
            }
        }
        pieces = next;
    }
    (pieces, connected)
}

impl LandManager {
    #[must_use]
    pub fn new(config: LandsConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn config(&self) -> &LandsConfig {
        &self.config
    }

    // ── Lands ──

    /// Create a land around `region` with `owner` registered under the owner role.
    pub fn create_land(&mut self, name: &str, owner: Uuid, region: Region) -> LandResult<Uuid> {
        let name = name.trim();
        if name.is_empty() {
            return logged("create land", owner, Err(LandError::invalid("Land name cannot be empty.")));
        }
        if self.ids_by_name.contains_key(name) {
            return logged(
                "create land",
                owner,
                Err(LandError::conflict(format!("Land with name {name} already exists."))),
            );
        }
        if let Some(other) = self.land_overlapping(&region, None) {
            return logged(
                "create land",
                owner,
                Err(LandError::conflict(format!(
                    "The region overlaps land {}.",
                    other.name()
                ))),
            );
        }

        let id = Uuid::new_v4();
        let land = Land::new(id, name, owner, region, now_millis());
        self.ids_by_name.insert(name.to_owned(), id);
        self.lands_by_id.insert(id, land);
        log::info!("lands_pmc: Created land '{name}' ({id}) for {owner} at {region}");
        Ok(id)
    }

    /// Remove a land, along with every selection and pending unclaim that targets it.
    pub fn delete_land(&mut self, name: &str) -> LandResult<Land> {
        let id = self
            .ids_by_name
            .remove(name)
            .ok_or_else(|| LandError::not_found(format!("Land with name {name} does not exist.")))?;
        self.selected_land_by_player.retain(|_, land| *land != id);
        self.pending_unclaims
            .retain(|_, pending| pending.preview.land_id != id);
        let land = self
            .lands_by_id
            .remove(&id)
            .ok_or_else(|| LandError::not_found(format!("Land with name {name} does not exist.")))?;
        log::info!("lands_pmc: Deleted land '{name}' ({id})");
        Ok(land)
    }

    fn land_overlapping(&self, region: &Region, except: Option<Uuid>) -> Option<&Land> {
        self.lands_by_id
            .values()
            .filter(|land| Some(land.id()) != except)
            .find(|land| land.overlaps(region))
    }

    // ── Selection ──

    pub fn select_land_for_player(&mut self, player: Uuid, land_name: &str) -> LandResult<()> {
        let id = *self.ids_by_name.get(land_name).ok_or_else(|| {
            LandError::not_found(format!("Land with name {land_name} does not exist."))
        })?;
        self.selected_land_by_player.insert(player, id);
        Ok(())
    }

    pub fn clear_selected_land_for_player(&mut self, player: Uuid) {
        self.selected_land_by_player.remove(&player);
    }

    #[must_use]
    pub fn selected_land_for_player(&self, player: Uuid) -> Option<&Land> {
        self.selected_land_by_player
            .get(&player)
            .and_then(|id| self.lands_by_id.get(id))
    }

    fn selected_land_id(&self, player: Uuid) -> LandResult<Uuid> {
        self.selected_land_for_player(player)
            .map(Land::id)
            .ok_or_else(LandError::no_selection)
    }

    fn selected_land_mut(&mut self, player: Uuid) -> LandResult<&mut Land> {
        let id = self.selected_land_id(player)?;
        self.lands_by_id.get_mut(&id).ok_or_else(LandError::no_selection)
    }

    // ── Territory ──

    /// Claim `region` for the player's selected land.
    ///
    /// The region must touch or overlap the land. Parts already claimed are
    /// cut away; the rest is added and the territory re-merged. Nothing is
    /// committed if any check fails.
    pub fn claim_region(&mut self, player: Uuid, region: Region) -> LandResult<ClaimOutcome> {
        let result = self.try_claim_region(player, region);
        logged("claim", player, result)
    }

    fn try_claim_region(&mut self, player: Uuid, region: Region) -> LandResult<ClaimOutcome> {
        let until_stable = self.config.regions.merge_until_stable;
        let max_regions = self.config.claims.max_regions_per_land;
        let land_id = self.selected_land_id(player)?;
        if let Some(other) = self.land_overlapping(&region, Some(land_id)) {
            return Err(LandError::conflict(format!(
                "The region overlaps land {}.",
                other.name()
            )));
        }

        let land = self.selected_land_mut(player)?;
        if !land.has_permission(player, LandPermission::Claim) {
            return Err(LandError::denied(
                "Player does not have permission to claim for this land.",
            ));
        }

        let (pieces, connected) = split_against(land.regions(), region);
        if !connected {
            return Err(LandError::invalid(
                "The new region must be adjacent to existing land regions.",
            ));
        }
        if pieces.is_empty() {
            return Err(LandError::invalid("The region is already claimed by this land."));
        }

        if let Some(max) = max_regions {
            let mut trial = land.regions().deep_copy();
            for piece in &pieces {
                trial.insert_linked(*piece);
            }
            trial.merge_pass(until_stable);
            if trial.len() > max {
                return Err(LandError::invalid(format!(
                    "The claim would leave the land with {} regions; the limit is {max}.",
                    trial.len()
                )));
            }
        }

        let claimed_volume = pieces.iter().map(Region::volume).sum();
        land.claim_regions(pieces.iter().copied());
        land.merge_regions(until_stable);
        log::info!(
            "lands_pmc: {player} claimed {claimed_volume} blocks ({} pieces) for '{}', now {} blocks in {} regions",
            pieces.len(),
            land.name(),
            land.volume(),
            land.regions().len()
        );
        Ok(ClaimOutcome {
            added: pieces,
            claimed_volume,
            land_volume: land.volume(),
        })
    }

    /// Plan the removal of `region` from the player's selected land.
    ///
    /// Works on a copy of the territory. If the cut splits the land, the
    /// largest piece is kept and the others are listed for relinquishing. The
    /// plan is stored for the player until [`confirm_unclaim`](Self::confirm_unclaim)
    /// or [`cancel_unclaim`](Self::cancel_unclaim); a newer plan replaces it.
    pub fn unclaim_region(&mut self, player: Uuid, region: Region) -> LandResult<UnclaimPreview> {
        let result = self.try_unclaim_region(player, region);
        logged("unclaim", player, result)
    }

    fn try_unclaim_region(&mut self, player: Uuid, region: Region) -> LandResult<UnclaimPreview> {
        let until_stable = self.config.regions.merge_until_stable;
        let land = self
            .selected_land_for_player(player)
            .ok_or_else(LandError::no_selection)?;
        if !land.has_permission(player, LandPermission::Unclaim) {
            return Err(LandError::denied(
                "Player does not have permission to unclaim for this land.",
            ));
        }

        let mut work = land.regions().deep_copy();
        let hit: Vec<(RegionId, Region)> = work
            .iter()
            .filter(|(_, r)| r.overlaps(&region))
            .map(|(id, r)| (id, *r))
            .collect();
        if hit.is_empty() {
            return Err(LandError::invalid("The region is not part of this land."));
        }

        let mut released_volume = 0;
        for (id, existing) in hit {
            released_volume += existing.intersection(&region).map_or(0, |cut| cut.volume());
            work.subtract(id, &region);
            work.remove(id);
        }

        let components = work.components();
        // Largest volume wins; on a tie the component with the lowest handle.
        let mut keep: Option<(usize, u64)> = None;
        let summaries: Vec<TerritoryComponent> = components
            .iter()
            .map(|ids| TerritoryComponent::from_ids(&work, ids))
            .collect();
        for (i, summary) in summaries.iter().enumerate() {
            if keep.is_none_or(|(_, best)| summary.volume > best) {
                keep = Some((i, summary.volume));
            }
        }
        let Some((keep_index, _)) = keep else {
            return Err(LandError::invalid(
                "Unclaiming this region would release the entire land; delete the land instead.",
            ));
        };
        let Some(&keep_start) = components[keep_index].first() else {
            return Err(LandError::invalid("The remaining territory is empty."));
        };

        let mut territory = work.copy_component(keep_start);
        territory.merge_pass(until_stable);
        let kept = TerritoryComponent {
            regions: territory.regions(),
            volume: territory.volume(),
        };
        let relinquished: Vec<TerritoryComponent> = summaries
            .into_iter()
            .enumerate()
            .filter(|(i, _)| *i != keep_index)
            .map(|(_, c)| c)
            .collect();

        let preview = UnclaimPreview {
            land_id: land.id(),
            land_name: land.name().to_owned(),
            released_volume,
            kept,
            relinquished,
        };
        let revision = land.revision();
        log::info!(
            "lands_pmc: {player} planned unclaim on '{}': releasing {released_volume} blocks, {} cut-off pieces ({} blocks) awaiting confirmation",
            preview.land_name,
            preview.relinquished.len(),
            preview.relinquished_volume()
        );
        self.pending_unclaims.insert(
            player,
            PendingUnclaim {
                preview: preview.clone(),
                revision,
                territory,
            },
        );
        Ok(preview)
    }

    #[must_use]
    pub fn pending_unclaim(&self, player: Uuid) -> Option<&UnclaimPreview> {
        self.pending_unclaims.get(&player).map(|p| &p.preview)
    }

    /// Commit the player's pending unclaim. Fails if the land changed since
    /// the plan was made; the plan is dropped either way.
    pub fn confirm_unclaim(&mut self, player: Uuid) -> LandResult<UnclaimPreview> {
        let result = self.try_confirm_unclaim(player);
        logged("unclaim confirm", player, result)
    }

    fn try_confirm_unclaim(&mut self, player: Uuid) -> LandResult<UnclaimPreview> {
        let pending = self
            .pending_unclaims
            .remove(&player)
            .ok_or_else(|| LandError::not_found("No unclaim is waiting for confirmation."))?;
        let land = self
            .lands_by_id
            .get_mut(&pending.preview.land_id)
            .ok_or_else(|| LandError::not_found("The land no longer exists."))?;
        if land.revision() != pending.revision {
            return Err(LandError::conflict(
                "The land changed since the unclaim was planned; run it again.",
            ));
        }
        land.replace_regions(pending.territory);
        log::info!(
            "lands_pmc: {player} confirmed unclaim on '{}', now {} blocks",
            land.name(),
            land.volume()
        );
        Ok(pending.preview)
    }

    pub fn cancel_unclaim(&mut self, player: Uuid) -> Option<UnclaimPreview> {
        let pending = self.pending_unclaims.remove(&player)?;
        log::info!(
            "lands_pmc: {player} cancelled unclaim on '{}'",
            pending.preview.land_name
        );
        Some(pending.preview)
    }

    // ── Members ──

    /// Give `target` a role on the actor's selected land.
    pub fn trust_player(&mut self, actor: Uuid, target: Uuid, role_name: &str) -> LandResult<()> {
        let result = self.try_trust_player(actor, target, role_name);
        logged("trust", actor, result)
    }

    fn try_trust_player(&mut self, actor: Uuid, target: Uuid, role_name: &str) -> LandResult<()> {
        let delegated = self.config.management.delegated_admins;
        let land = self.selected_land_mut(actor)?;
        if target == land.owner() {
            return Err(LandError::invalid("Cannot assign role to the land owner."));
        }
        if land.is_member(target) {
            return Err(LandError::conflict("Player is already a member of the land."));
        }
        let authority = land.authorize(actor, LandPermission::ManageMembers, delegated)?;
        let role = land
            .role(role_name)
            .ok_or_else(|| LandError::not_found(format!("Role {role_name} does not exist in the land.")))?;
        if !authority.reaches(role.weight()) {
            return Err(LandError::invalid(
                "Player cannot assign a role with more permissions than their own.",
            ));
        }
        land.set_member(target, role_name)?;
        log::info!(
            "lands_pmc: {actor} trusted {target} as '{role_name}' on '{}'",
            land.name()
        );
        Ok(())
    }

    /// Remove `target` from the actor's selected land.
    pub fn untrust_player(&mut self, actor: Uuid, target: Uuid) -> LandResult<()> {
        let result = self.try_untrust_player(actor, target);
        logged("untrust", actor, result)
    }

    fn try_untrust_player(&mut self, actor: Uuid, target: Uuid) -> LandResult<()> {
        let delegated = self.config.management.delegated_admins;
        let land = self.selected_land_mut(actor)?;
        let Some(target_role) = land.member_role(target) else {
            return Err(LandError::not_found("Player is not a member of the land."));
        };
        if actor == target {
            return Err(LandError::invalid("Player cannot untrust themselves."));
        }
        if target == land.owner() {
            return Err(LandError::invalid("Cannot untrust the land owner."));
        }
        let target_weight = land.role(target_role).map_or(0, LandRole::weight);
        let authority = land.authorize(actor, LandPermission::ManageMembers, delegated)?;
        if !authority.reaches(target_weight) {
            return Err(LandError::invalid(
                "Player cannot untrust a member whose role outranks their own.",
            ));
        }
        let role = land.remove_member(target)?;
        log::info!(
            "lands_pmc: {actor} untrusted {target} (was '{role}') on '{}'",
            land.name()
        );
        Ok(())
    }

    // ── Roles ──

    pub fn create_role(
        &mut self,
        actor: Uuid,
        role_name: &str,
        permissions: impl IntoIterator<Item = LandPermission>,
    ) -> LandResult<()> {
        let result = self.try_create_role(actor, role_name, permissions.into_iter().collect());
        logged("create role", actor, result)
    }

    fn try_create_role(
        &mut self,
        actor: Uuid,
        role_name: &str,
        permissions: BTreeSet<LandPermission>,
    ) -> LandResult<()> {
        let delegated = self.config.management.delegated_admins;
        let role_name = role_name.trim();
        if role_name.is_empty() {
            return Err(LandError::invalid("Role name cannot be empty."));
        }
        let land = self.selected_land_mut(actor)?;
        let authority = land.authorize(actor, LandPermission::ManageRoles, delegated)?;
        if land.role(role_name).is_some() {
            return Err(LandError::conflict(format!(
                "Role {role_name} already exists in the land."
            )));
        }
        if !authority.reaches(permission::weight_of(&permissions)) {
            return Err(LandError::invalid(
                "Player cannot create a role with more permissions than their own.",
            ));
        }
        land.add_role(LandRole::new(role_name, permissions))?;
        log::info!("lands_pmc: {actor} created role '{role_name}' on '{}'", land.name());
        Ok(())
    }

    /// Delete a role; its holders move to a non-admin fallback role.
    pub fn delete_role(&mut self, actor: Uuid, role_name: &str) -> LandResult<()> {
        let result = self.try_delete_role(actor, role_name);
        logged("delete role", actor, result)
    }

    fn try_delete_role(&mut self, actor: Uuid, role_name: &str) -> LandResult<()> {
        let delegated = self.config.management.delegated_admins;
        let land = self.selected_land_mut(actor)?;
        let authority = land.authorize(actor, LandPermission::ManageRoles, delegated)?;
        let role = land
            .role(role_name)
            .ok_or_else(|| LandError::not_found(format!("Role {role_name} does not exist in the land.")))?;
        check_hierarchy(&authority, role, "delete")?;
        let fallback = land.delete_role(role_name)?;
        log::info!(
            "lands_pmc: {actor} deleted role '{role_name}' on '{}', holders moved to '{fallback}'",
            land.name()
        );
        Ok(())
    }

    pub fn set_role_permissions(
        &mut self,
        actor: Uuid,
        role_name: &str,
        permissions: impl IntoIterator<Item = LandPermission>,
    ) -> LandResult<()> {
        let result = self.try_set_role_permissions(actor, role_name, permissions.into_iter().collect());
        logged("edit role", actor, result)
    }

    fn try_set_role_permissions(
        &mut self,
        actor: Uuid,
        role_name: &str,
        permissions: BTreeSet<LandPermission>,
    ) -> LandResult<()> {
        let delegated = self.config.management.delegated_admins;
        let land = self.selected_land_mut(actor)?;
        let authority = land.authorize(actor, LandPermission::ManageRoles, delegated)?;
        let role = land
            .role(role_name)
            .ok_or_else(|| LandError::not_found(format!("Role {role_name} does not exist in the land.")))?;
        check_hierarchy(&authority, role, "modify")?;
        if !authority.reaches(permission::weight_of(&permissions)) {
            return Err(LandError::invalid(
                "Player cannot grant more permissions than their own role holds.",
            ));
        }
        let granted: Vec<String> = permissions.iter().map(ToString::to_string).collect();
        land.set_role_permissions(role_name, permissions)?;
        log::info!(
            "lands_pmc: {actor} set role '{role_name}' on '{}' to [{}]",
            land.name(),
            granted.join(", ")
        );
        Ok(())
    }

    // ── Queries ──

    #[must_use]
    pub fn check_permission(&self, player: Uuid, land: &Land, permission: LandPermission) -> bool {
        land.has_permission(player, permission)
    }

    #[must_use]
    pub fn player_role<'a>(&self, player: Uuid, land: &'a Land) -> Option<&'a str> {
        land.member_role(player)
    }

    /// The land whose territory contains `pos`. Linear scan over every region.
    #[must_use]
    pub fn land_at(&self, pos: BlockPos) -> Option<&Land> {
        self.lands_by_id.values().find(|land| land.contains(pos))
    }

    #[must_use]
    pub fn land_by_id(&self, id: Uuid) -> Option<&Land> {
        self.lands_by_id.get(&id)
    }

    #[must_use]
    pub fn land_by_name(&self, name: &str) -> Option<&Land> {
        self.ids_by_name
            .get(name)
            .and_then(|id| self.lands_by_id.get(id))
    }

    /// The owner's earliest-created land.
    #[must_use]
    pub fn land_by_owner(&self, owner: Uuid) -> Option<&Land> {
        self.lands_by_owner(owner).into_iter().next()
    }

    /// All lands of `owner`, oldest first.
    #[must_use]
    pub fn lands_by_owner(&self, owner: Uuid) -> Vec<&Land> {
        let mut lands: Vec<&Land> = self
            .lands_by_id
            .values()
            .filter(|land| land.owner() == owner)
            .collect();
        lands.sort_by(|a, b| a.created_at().cmp(&b.created_at()).then_with(|| a.name().cmp(b.name())));
        lands
    }

    pub fn all_lands(&self) -> impl Iterator<Item = &Land> + '_ {
        self.lands_by_id.values()
    }

    #[must_use]
    pub fn land_count(&self) -> usize {
        self.lands_by_id.len()
    }

    // ── Persistence ──

    /// Plain-data snapshot of every land, ordered by name.
    #[must_use]
    pub fn records(&self) -> Vec<LandRecord> {
        let mut records: Vec<LandRecord> = self.lands_by_id.values().map(Land::to_record).collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }

    /// Rebuild a manager from records. Rejects duplicate ids or names and
    /// territory shared between lands.
    pub fn from_records(
        config: LandsConfig,
        records: impl IntoIterator<Item = LandRecord>,
    ) -> LandResult<Self> {
        let mut manager = Self::new(config);
        for record in records {
            let land = Land::from_record(record)?;
            if manager.lands_by_id.contains_key(&land.id()) {
                return Err(LandError::conflict(format!("Duplicate land id {}.", land.id())));
            }
            if manager.ids_by_name.contains_key(land.name()) {
                return Err(LandError::conflict(format!(
                    "Land with name {} already exists.",
                    land.name()
                )));
            }
            if let Some((other, region)) = land.regions().iter().find_map(|(_, r)| {
                manager.land_overlapping(r, None).map(|other| (other.name().to_owned(), *r))
            }) {
                return Err(LandError::conflict(format!(
                    "Land {} overlaps land {other} at {region}.",
                    land.name()
                )));
            }
            manager.ids_by_name.insert(land.name().to_owned(), land.id());
            manager.lands_by_id.insert(land.id(), land);
        }
        log::info!("lands_pmc: Restored {} lands", manager.land_count());
        Ok(manager)
    }
}

/// Non-owners may not touch their own role or one that outweighs theirs.
fn check_hierarchy(authority: &Authority, role: &LandRole, verb: &str) -> LandResult<()> {
    if let Authority::Delegate { role: own, .. } = authority {
        if own == role.name() {
            return Err(LandError::invalid(format!("Player cannot {verb} their own role.")));
        }
    }
    if !authority.reaches(role.weight()) {
        return Err(LandError::invalid(format!(
            "Player cannot {verb} roles with more permissions."
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cuboid(x1: i32, y1: i32, z1: i32, x2: i32, y2: i32, z2: i32) -> Region {
        Region::from_coords(x1, y1, z1, x2, y2, z2)
    }

    #[test]
    fn split_against_cuts_away_claimed_blocks() {
        let territory = RegionGraph::from_regions([cuboid(0, 0, 0, 9, 9, 9)]);
        let (pieces, connected) = split_against(&territory, cuboid(5, 0, 0, 14, 9, 9));
        assert!(connected);
        assert_eq!(pieces, vec![cuboid(10, 0, 0, 14, 9, 9)]);

        let (pieces, connected) = split_against(&territory, cuboid(30, 0, 0, 31, 1, 1));
        assert!(!connected);
        assert_eq!(pieces.len(), 1);
    }

    #[test]
    fn split_against_counts_face_contact() {
        let territory = RegionGraph::from_regions([cuboid(0, 0, 0, 9, 9, 9)]);
        let (pieces, connected) = split_against(&territory, cuboid(0, 10, 0, 3, 12, 3));
        assert!(connected);
        assert_eq!(pieces.len(), 1);
    }

    #[test]
    fn tied_components_keep_the_earliest() {
        let mut manager = LandManager::default();
        let owner = Uuid::new_v4();
        manager
            .create_land("Twin", owner, cuboid(0, 0, 0, 8, 0, 0))
            .expect("fresh name");
        manager.select_land_for_player(owner, "Twin").expect("exists");
        let preview = manager
            .unclaim_region(owner, cuboid(4, 0, 0, 4, 0, 0))
            .expect("splits in two");
        assert_eq!(preview.kept.volume, 4);
        assert_eq!(preview.kept.regions, vec![cuboid(0, 0, 0, 3, 0, 0)]);
        assert_eq!(preview.relinquished_volume(), 4);
    }

    #[test]
    fn check_hierarchy_blocks_own_and_heavier_roles() {
        let delegate = Authority::Delegate {
            role: "admin".to_owned(),
            weight: 2,
        };
        let own = LandRole::new("admin", [LandPermission::ManageMembers]);
        let heavier = LandRole::new("boss", [LandPermission::ManageRoles]);
        let lighter = LandRole::new("helper", [LandPermission::Claim]);
        assert!(check_hierarchy(&delegate, &own, "modify").is_err());
        assert!(check_hierarchy(&delegate, &heavier, "modify").is_err());
        assert!(check_hierarchy(&delegate, &lighter, "modify").is_ok());
        assert!(check_hierarchy(&Authority::Owner, &heavier, "modify").is_ok());
    }
}
