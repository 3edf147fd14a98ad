//! Stack merging and splitting
//!
//! Merging moves units from an incoming item into a resident stack of the
//! same identity. A fully absorbed item is consumed here; the placement
//! engine reports the consumption through a `StackMerged` event.

use crate::item::{Item, ItemId, Placement, Sockets};

/// Result of merging an item into a stack
#[derive(Debug)]
pub enum MergeResult {
    /// Every unit moved; the incoming item no longer exists
    Absorbed { moved: u32 },
    /// The stack is full; the rest of the incoming item is handed back
    Partial { moved: u32, remainder: Item },
    /// Items are not compatible; nothing moved
    Rejected(Item),
}

impl MergeResult {
    /// Whether any units moved
    pub fn merged(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }

    /// Units moved into the stack
    pub fn moved(&self) -> u32 {
        match self {
            Self::Absorbed { moved } | Self::Partial { moved, .. } => *moved,
            Self::Rejected(_) => 0,
        }
    }

    /// Item the caller still owns, if any
    pub fn into_remainder(self) -> Option<Item> {
        match self {
            Self::Absorbed { .. } => None,
            Self::Partial { remainder, .. } | Self::Rejected(remainder) => Some(remainder),
        }
    }
}

/// Check if `moving` may merge into `stationary`
pub fn can_stack(moving: &Item, stationary: &Item) -> bool {
    moving.id != stationary.id
        && moving.is_stackable()
        && stationary.is_stackable()
        && moving.stack_id.is_some()
        && moving.stack_id == stationary.stack_id
        && stationary.stack_count < stationary.max_stack
}

/// Merge `moving` into `stationary`, saturating at the stack maximum
pub fn merge(mut moving: Item, stationary: &mut Item) -> MergeResult {
    if !can_stack(&moving, stationary) {
        return MergeResult::Rejected(moving);
    }

    let moved = moving.stack_count.min(stationary.stack_space());
    stationary.stack_count += moved;
    moving.stack_count -= moved;

    if moving.stack_count == 0 {
        MergeResult::Absorbed { moved }
    } else {
        MergeResult::Partial {
            moved,
            remainder: moving,
        }
    }
}

impl Item {
    /// Split `amount` units off into a new unplaced item with identity `new_id`.
    ///
    /// Returns `None` unless `0 < amount < stack_count`.
    pub fn split(&mut self, amount: u32, new_id: ItemId) -> Option<Item> {
        if amount == 0 || amount >= self.stack_count {
            return None;
        }
        self.stack_count -= amount;

        let mut split = self.clone();
        split.id = new_id;
        split.stack_count = amount;
        split.sockets = split
            .sockets
            .take()
            .map(|s| Sockets::new(s.kind, s.slots.len()));
        split.set_placement(Placement::Unplaced);
        Some(split)
    }
}
