//! Void Grid Inventory - Spatial Inventory Placement Engine
//!
//! This crate provides a grid-based inventory for the Void Engine: items
//! occupy rectangles of cells, equipment slots sit beside the grid, and
//! every placement is checked against vetoable listener hooks.
//!
//! # Features
//!
//! - Overlap-free grid storage with first-fit search
//! - Equipment slots with blocking and type filters
//! - Item stacking with remainders and stack splitting
//! - Socketing (attaching one item into another)
//! - Atomic equipment swaps with full rollback
//! - Auto-arrange with optional rotation
//! - Periodic reconciliation with a host item list
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                GridInventory                 │
//! │  ┌───────────┐  ┌───────────────────┐        │
//! │  │ GridStore │  │ EquipmentRegistry │        │
//! │  └───────────┘  └───────────────────┘        │
//! │  ┌──────────┐  ┌─────────┐  ┌───────────┐    │
//! │  │ stacking │  │ socket  │  │ Listeners │    │
//! │  └──────────┘  └─────────┘  └───────────┘    │
//! └──────────────────────────────────────────────┘
//!          ▲                         │
//!          │ poll                    ▼ on_event
//!   ┌──────────────┐         ┌───────────────────┐
//!   │ AutoDetector │         │ InventoryListener │
//!   └──────────────┘         └───────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use void_grid_inventory::prelude::*;
//!
//! let config = InventoryConfig::grid(4, 4).with_slot(SlotConfig::new("hand"));
//! let mut inventory = GridInventory::with_config(config);
//!
//! let sword = Item::new(ItemId(1), 1, 3).with_kind("weapon");
//! let outcome = inventory.pickup(sword)?;
//! assert_eq!(outcome.location(), Some(Location::Equipment(0)));
//!
//! let potion = Item::new(ItemId(2), 1, 1).with_stack("potion", 5, 10);
//! inventory.store(potion, 0, 0, true)?;
//! ```

pub mod arrange;
pub mod config;
pub mod detect;
pub mod equipment;
pub mod error;
pub mod events;
pub mod grid;
pub mod inventory;
pub mod item;
pub mod socket;
pub mod stacking;
pub mod swap;

pub mod prelude {
    //! Common imports for grid inventories
    pub use crate::config::{ConfigError, InventoryConfig, SlotConfig};
    pub use crate::detect::{AutoDetector, DetectReport, ItemSource, SharedInventory};
    pub use crate::equipment::{EquipmentRegistry, EquipmentSlot, SlotFilter};
    pub use crate::error::{InventoryError, Result};
    pub use crate::events::{EventCollector, InventoryEvent, InventoryListener, Verdict};
    pub use crate::grid::GridStore;
    pub use crate::inventory::{DirtySet, GridInventory, InsertOutcome};
    pub use crate::item::{Area, Item, ItemId, Location, Placement, Rotation, SocketKind, Sockets};
    pub use crate::stacking::MergeResult;
    pub use crate::swap::SwapOutcome;
}

pub use prelude::*;
