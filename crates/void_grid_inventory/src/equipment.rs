//! Equipment slots
//!
//! An ordered, fixed-length list of named slots living beside the grid.
//! Each slot holds at most one item and an item occupies at most one slot.

use crate::error::{InventoryError, Result};
use crate::item::{Item, ItemId};
use serde::{Deserialize, Serialize};

/// Per-slot type filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotFilter {
    /// Accepted item kinds (empty = accept everything)
    pub allowed_kinds: Vec<String>,
}

impl SlotFilter {
    /// Filter accepting any item
    pub fn any() -> Self {
        Self::default()
    }

    /// Filter accepting only the listed kinds
    pub fn kinds<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_kinds: kinds.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether an item passes this filter
    pub fn accepts(&self, item: &Item) -> bool {
        if self.allowed_kinds.is_empty() {
            return true;
        }
        item.kind
            .as_deref()
            .map(|kind| self.allowed_kinds.iter().any(|k| k == kind))
            .unwrap_or(false)
    }
}

/// A single equipment slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSlot {
    /// Slot name (e.g. "head", "main_hand")
    pub name: String,
    /// Item in this slot
    item: Option<ItemId>,
    /// Blocked slots reject every item
    pub blocked: bool,
    /// Type filter
    pub filter: SlotFilter,
    /// Skip this slot when auto-equipping
    pub skip_auto_equip: bool,
    /// Disabled slots are ignored when auto-equipping
    pub enabled: bool,
}

impl EquipmentSlot {
    /// Create an empty, unfiltered slot
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            item: None,
            blocked: false,
            filter: SlotFilter::any(),
            skip_auto_equip: false,
            enabled: true,
        }
    }

    /// Set filter
    pub fn with_filter(mut self, filter: SlotFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set blocked
    pub fn with_blocked(mut self, blocked: bool) -> Self {
        self.blocked = blocked;
        self
    }

    /// Exclude from auto-equip
    pub fn without_auto_equip(mut self) -> Self {
        self.skip_auto_equip = true;
        self
    }

    /// Item in this slot
    pub fn item(&self) -> Option<ItemId> {
        self.item
    }

    /// Whether the slot holds an item
    pub fn is_occupied(&self) -> bool {
        self.item.is_some()
    }

    /// Whether auto-equip may use this slot
    pub fn is_auto_equip_target(&self) -> bool {
        self.enabled && !self.skip_auto_equip
    }

    /// Built-in acceptance check, ignoring occupancy
    pub fn admits(&self, item: &Item) -> bool {
        !self.blocked && self.filter.accepts(item)
    }
}

/// Ordered list of equipment slots
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquipmentRegistry {
    slots: Vec<EquipmentSlot>,
}

impl EquipmentRegistry {
    /// Create a registry from slots (index = position)
    pub fn new(slots: Vec<EquipmentSlot>) -> Self {
        Self { slots }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if there are no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Validate a slot index
    pub fn check(&self, index: usize) -> Result<()> {
        if index < self.slots.len() {
            Ok(())
        } else {
            Err(InventoryError::InvalidSlot {
                index,
                len: self.slots.len(),
            })
        }
    }

    /// Get a slot
    pub fn get(&self, index: usize) -> Result<&EquipmentSlot> {
        self.check(index)?;
        Ok(&self.slots[index])
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Result<&mut EquipmentSlot> {
        self.check(index)?;
        Ok(&mut self.slots[index])
    }

    /// Item in a slot
    pub fn item_in(&self, index: usize) -> Result<Option<ItemId>> {
        Ok(self.get(index)?.item)
    }

    /// Put an item in a slot without any validation
    pub fn assign(&mut self, index: usize, item: ItemId) -> Result<()> {
        self.get_mut(index)?.item = Some(item);
        Ok(())
    }

    /// Empty a slot, returning what it held
    pub fn clear(&mut self, index: usize) -> Result<Option<ItemId>> {
        Ok(self.get_mut(index)?.item.take())
    }

    /// Find the slot holding an item
    pub fn find(&self, item: ItemId) -> Option<usize> {
        self.slots.iter().position(|s| s.item == Some(item))
    }

    /// Slot has no item and is not blocked
    pub fn is_free(&self, index: usize) -> Result<bool> {
        let slot = self.get(index)?;
        Ok(slot.item.is_none() && !slot.blocked)
    }

    /// Iterate slots with their indices
    pub fn iter(&self) -> impl Iterator<Item = (usize, &EquipmentSlot)> {
        self.slots.iter().enumerate()
    }

    /// All equipped items in slot order
    pub fn items(&self) -> Vec<ItemId> {
        self.slots.iter().filter_map(|s| s.item).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> EquipmentRegistry {
        EquipmentRegistry::new(vec![
            EquipmentSlot::new("head"),
            EquipmentSlot::new("main_hand").with_filter(SlotFilter::kinds(["weapon"])),
            EquipmentSlot::new("locked").with_blocked(true),
        ])
    }

    #[test]
    fn test_registry_creation() {
        let eq = registry();

        assert_eq!(eq.len(), 3);
        assert!(eq.is_free(0).unwrap());
        assert!(!eq.is_free(2).unwrap());
        assert!(eq.items().is_empty());
    }

    #[test]
    fn test_assign_and_clear() {
        let mut eq = registry();

        eq.assign(0, ItemId(4)).unwrap();
        assert_eq!(eq.find(ItemId(4)), Some(0));
        assert!(!eq.is_free(0).unwrap());

        assert_eq!(eq.clear(0).unwrap(), Some(ItemId(4)));
        assert_eq!(eq.find(ItemId(4)), None);
    }

    #[test]
    fn test_invalid_index() {
        let mut eq = registry();

        assert_eq!(
            eq.assign(3, ItemId(1)),
            Err(InventoryError::InvalidSlot { index: 3, len: 3 })
        );
        assert!(eq.is_free(10).is_err());
    }

    #[test]
    fn test_slot_filter() {
        let eq = registry();
        let sword = Item::new(ItemId(1), 1, 3).with_kind("weapon");
        let helmet = Item::new(ItemId(2), 2, 2).with_kind("armor");
        let rock = Item::new(ItemId(3), 1, 1);

        let hand = eq.get(1).unwrap();
        assert!(hand.admits(&sword));
        assert!(!hand.admits(&helmet));
        assert!(!hand.admits(&rock));

        assert!(eq.get(0).unwrap().admits(&rock));
        assert!(!eq.get(2).unwrap().admits(&rock));
    }
}
