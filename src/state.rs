//! Shared handle to land and selection state, for commands and event handlers.

use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::LandsConfig;
use crate::error::{LandError, LandResult};
use crate::manager::{ClaimOutcome, LandManager, UnclaimPreview};
use crate::permission::LandPermission;
use crate::region::{BlockPos, Region};
use crate::selection::SelectionStore;

#[derive(Clone, Default)]
pub struct LandsState {
    pub lands: Arc<RwLock<LandManager>>,
    pub selections: Arc<RwLock<SelectionStore>>,
}

impl LandsState {
    #[must_use]
    pub fn new(config: LandsConfig) -> Self {
        Self::from_manager(LandManager::new(config))
    }

    #[must_use]
    pub fn from_manager(manager: LandManager) -> Self {
        Self {
            lands: Arc::new(RwLock::new(manager)),
            selections: Arc::new(RwLock::new(SelectionStore::new())),
        }
    }

    /// Claim the player's completed wand selection for their selected land.
    /// The wand selection is cleared once the claim goes through.
    pub async fn claim_selection(&self, player: Uuid) -> LandResult<ClaimOutcome> {
        let region = self.completed_selection(player).await?;
        let outcome = self.lands.write().await.claim_region(player, region)?;
        self.selections.write().await.clear(player);
        Ok(outcome)
    }

    /// Plan an unclaim of the player's completed wand selection.
    pub async fn unclaim_selection(&self, player: Uuid) -> LandResult<UnclaimPreview> {
        let region = self.completed_selection(player).await?;
        let preview = self.lands.write().await.unclaim_region(player, region)?;
        self.selections.write().await.clear(player);
        Ok(preview)
    }

    /// Whether `player` may do `permission` at `pos`. Unclaimed ground allows everything.
    pub async fn can_act_at(&self, player: Uuid, pos: BlockPos, permission: LandPermission) -> bool {
        let lands = self.lands.read().await;
        lands
            .land_at(pos)
            .is_none_or(|land| land.has_permission(player, permission))
    }

    async fn completed_selection(&self, player: Uuid) -> LandResult<Region> {
        self.selections
            .read()
            .await
            .selection(player)
            .ok_or_else(|| LandError::precondition("Complete a selection with the wand first."))
    }
}
