//! Error types for the grid inventory
//!
//! Only structural misuse is an error. Running out of room, a vetoed
//! action or a blocked slot is ordinary refusal and is reported through
//! the operation's outcome instead.

use crate::item::{Area, ItemId};
use thiserror::Error;

/// Structural inventory errors (caller bugs)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// Operation attempted before `initialize()`
    #[error("Inventory has not been initialized")]
    NotInitialized,

    /// Item is not held by this inventory
    #[error("Item not found in inventory: {0}")]
    ItemNotFound(ItemId),

    /// Item is already held by this inventory
    #[error("Item already stored in inventory: {0}")]
    DuplicateItem(ItemId),

    /// Equipment slot index out of range
    #[error("Invalid equipment slot {index} (inventory has {len} slots)")]
    InvalidSlot { index: usize, len: usize },

    /// Unvalidated equip into an occupied slot
    #[error("Equipment slot {0} is already occupied")]
    SlotOccupied(usize),

    /// Unvalidated store outside the grid
    #[error("Area {0:?} is outside the grid")]
    OutOfBounds(Area),

    /// Unvalidated store over another item
    #[error("Area {0:?} overlaps another item")]
    Overlap(Area),

    /// Grid operation on an item that is not in the grid
    #[error("Item is not stored in the grid: {0}")]
    NotStored(ItemId),

    /// Equipment operation on an item that is not equipped
    #[error("Item is not equipped: {0}")]
    NotEquipped(ItemId),

    /// Internal bookkeeping disagrees with the grid or equipment
    #[error("Inventory state corrupted: {0}")]
    Corrupted(String),
}

/// Result type for inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;
