//! LandsPMC: land claims for [Pumpkin](https://pumpkinmc.org/).
//!
//! A land is a connected set of cuboid regions owned by one player, with
//! members sorted into roles that grant permissions.
//!
//! - **[region](region)**: Block positions and inclusive cuboids: overlap, touch, subtract, merge
//! - **[graph](graph)**: Region adjacency graph: components, split, merge, deep copy
//! - **[permission](permission)**: Permission set and roles
//! - **[land](land)**: The land aggregate and its persisted record
//! - **[manager](manager)**: Land registry and the claim/unclaim/trust/role operations
//! - **[selection](selection)**: Wand selection state
//! - **[state](state)**: Shared handle used by commands and event handlers
//! - **[config](config)**: `config.toml` loading
//! - **[error](error)**: Error taxonomy

pub mod config;
pub mod error;
pub mod graph;
pub mod land;
pub mod manager;
pub mod permission;
pub mod region;
pub mod selection;
pub mod state;

pub use config::LandsConfig;
pub use error::{ConfigError, ErrorKind, LandError, LandResult};
pub use graph::{RegionGraph, RegionId};
pub use land::{Authority, Land, LandRecord};
pub use manager::{ClaimOutcome, LandManager, TerritoryComponent, UnclaimPreview};
pub use permission::{LandPermission, LandRole};
pub use region::{Axis, BlockPos, Region};
pub use selection::SelectionStore;
pub use state::LandsState;
