//! Inventory notifications and vetoable predicate hooks
//!
//! Listeners are consulted before an action commits (the `can_*` methods)
//! and told about it afterwards (`on_event`). Votes from every registered
//! listener are combined with logical AND, so any single denial wins and
//! no later listener can re-approve it.

use crate::equipment::EquipmentSlot;
use crate::item::{Area, Item, ItemId, Location};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Outcome of a predicate hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verdict {
    /// Action may proceed
    #[default]
    Allow,
    /// Action is vetoed
    Deny,
}

impl Verdict {
    /// Combine two votes; a denial always wins
    pub fn and(self, other: Verdict) -> Verdict {
        match (self, other) {
            (Verdict::Allow, Verdict::Allow) => Verdict::Allow,
            _ => Verdict::Deny,
        }
    }

    /// Whether the action may proceed
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }

    /// Allow when `condition` holds
    pub fn allow_if(condition: bool) -> Verdict {
        if condition {
            Verdict::Allow
        } else {
            Verdict::Deny
        }
    }
}

/// Something that happened to an inventory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent {
    /// Item entered the inventory
    Stored { item: ItemId, location: Location },
    /// Item left the inventory
    Removed { item: ItemId },
    /// Item was placed in an equipment slot
    Equipped { item: ItemId, slot: usize },
    /// Item was taken out of an equipment slot
    Unequipped { item: ItemId, slot: usize },
    /// A pickup or validated store found no room or was vetoed
    StoreFailed { item: ItemId },
    /// A validated equip was refused
    EquipFailed { item: ItemId, slot: usize },
    /// Item was attached into a socket of a resident host
    Socketed { host: ItemId, item: ItemId, socket: usize },
    /// Item was taken out of a resident host's socket
    Unsocketed { host: ItemId, item: ItemId, socket: usize },
    /// Units moved from `item` into the resident stack `into`.
    ///
    /// `consumed` is true when `item` was fully absorbed and no longer exists.
    StackMerged {
        item: ItemId,
        into: ItemId,
        moved: u32,
        consumed: bool,
    },
    /// Grid is about to be resized
    GridResizeBegin { width: usize, height: usize },
    /// Grid resize finished
    GridResizeEnd { width: usize, height: usize },
}

impl InventoryEvent {
    /// Primary item this event is about, if any
    pub fn item(&self) -> Option<ItemId> {
        match *self {
            Self::Stored { item, .. }
            | Self::Removed { item }
            | Self::Equipped { item, .. }
            | Self::Unequipped { item, .. }
            | Self::StoreFailed { item }
            | Self::EquipFailed { item, .. }
            | Self::Socketed { item, .. }
            | Self::Unsocketed { item, .. }
            | Self::StackMerged { item, .. } => Some(item),
            Self::GridResizeBegin { .. } | Self::GridResizeEnd { .. } => None,
        }
    }
}

/// Observer of a single inventory.
///
/// Every predicate defaults to [`Verdict::Allow`] and the notification
/// defaults to doing nothing, so implementors override only what they need.
pub trait InventoryListener: Send {
    /// May `item` be stored over `area`?
    fn can_store(&mut self, _item: &Item, _area: Area) -> Verdict {
        Verdict::Allow
    }

    /// May the resident `item` be removed or dropped?
    fn can_remove(&mut self, _item: &Item) -> Verdict {
        Verdict::Allow
    }

    /// May `item` be equipped into slot `index`?
    fn can_equip(&mut self, _item: &Item, _index: usize, _slot: &EquipmentSlot) -> Verdict {
        Verdict::Allow
    }

    /// May the equipped `item` leave slot `index`?
    fn can_unequip(&mut self, _item: &Item, _index: usize) -> Verdict {
        Verdict::Allow
    }

    /// May `socketable` be attached into `host`?
    fn can_socket(&mut self, _host: &Item, _socketable: &Item) -> Verdict {
        Verdict::Allow
    }

    /// Called after the inventory changed
    fn on_event(&mut self, _event: &InventoryEvent) {}
}

/// Listener that records every notification.
///
/// Clones share the same buffer, so a test can keep one handle and give
/// the other to the inventory.
#[derive(Debug, Clone, Default)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<InventoryEvent>>>,
}

impl EventCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> Vec<InventoryEvent> {
        self.events.lock().clone()
    }

    /// Take the recorded events, leaving the buffer empty
    pub fn drain(&self) -> Vec<InventoryEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl InventoryListener for EventCollector {
    fn on_event(&mut self, event: &InventoryEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Registered listeners of one inventory
#[derive(Default)]
pub(crate) struct Listeners(Vec<Box<dyn InventoryListener>>);

impl Listeners {
    pub(crate) fn push(&mut self, listener: Box<dyn InventoryListener>) {
        self.0.push(listener);
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    /// Ask every listener; all of them are called even after a denial
    pub(crate) fn vote<F>(&mut self, mut ask: F) -> Verdict
    where
        F: FnMut(&mut dyn InventoryListener) -> Verdict,
    {
        self.0
            .iter_mut()
            .fold(Verdict::Allow, |verdict, listener| verdict.and(ask(listener.as_mut())))
    }

    pub(crate) fn notify(&mut self, event: &InventoryEvent) {
        for listener in &mut self.0 {
            listener.on_event(event);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("count", &self.0.len()).finish()
    }
}
