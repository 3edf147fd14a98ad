//! Equipment swapping
//!
//! A swap lifts the moving item from its source, takes the occupant out of
//! the destination slot, equips the moving item and finally re-homes the
//! occupant. Any failing step unwinds the earlier ones in reverse order, so
//! a refused swap leaves every item exactly where it was. Notifications are
//! only fired once the whole swap has committed.

use crate::error::{InventoryError, Result};
use crate::events::InventoryEvent;
use crate::inventory::{GridInventory, InsertOutcome};
use crate::item::{Item, ItemId, Location};
use log::{debug, warn};

/// Result of a swap attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Destination slot was empty; the item was simply equipped
    Equipped,
    /// The previous occupant was moved to `to`
    Swapped { displaced: ItemId, to: Location },
    /// The item was attached into the occupant's socket
    Socketed { host: ItemId, socket: usize },
    /// Nothing changed
    Refused,
}

impl SwapOutcome {
    /// Whether the item ended up in (or attached to) the destination slot
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Refused)
    }
}

/// Verdict of the last `can_swap` query, valid for one drag gesture
#[derive(Debug, Default)]
pub(crate) struct SwapCache {
    key: Option<(ItemId, usize)>,
    verdict: bool,
}

impl SwapCache {
    fn lookup(&self, item: ItemId, slot: usize) -> Option<bool> {
        (self.key == Some((item, slot))).then_some(self.verdict)
    }

    fn remember(&mut self, item: ItemId, slot: usize, verdict: bool) {
        self.key = Some((item, slot));
        self.verdict = verdict;
    }
}

/// Take a resident item out of `inv`, asking the listeners first
fn lift(inv: &mut GridInventory, id: ItemId) -> Result<Option<(Item, Location)>> {
    let from = inv.location_of(id)?;
    let item = match from {
        Location::Grid { .. } => inv.remove(id, true)?,
        Location::Equipment(_) => inv.unequip(id, true)?,
    };
    Ok(item.map(|item| (item, from)))
}

/// Put an item back where it was, without consulting listeners
fn restore(inv: &mut GridInventory, item: Item, at: Location) -> Result<()> {
    match at {
        Location::Grid { x, y } => inv.store(item, x, y, false).map(drop),
        Location::Equipment(slot) => inv.equip(item, slot, false).map(drop),
    }
}

fn notify_lifted(inv: &mut GridInventory, id: ItemId, from: Location) {
    let event = match from {
        Location::Grid { .. } => InventoryEvent::Removed { item: id },
        Location::Equipment(slot) => InventoryEvent::Unequipped { item: id, slot },
    };
    inv.listeners.notify(&event);
}

fn pick<'a>(source: &'a mut Option<&mut GridInventory>, this: &'a mut GridInventory) -> &'a mut GridInventory {
    match source {
        Some(src) => &mut **src,
        None => this,
    }
}

impl GridInventory {
    /// Move a resident item into equipment slot `slot`, swapping out the occupant.
    ///
    /// An occupant displaced by an item that came from another equipment
    /// slot goes back into that slot; otherwise it goes to the first free
    /// grid position.
    pub fn swap_equip(&mut self, id: ItemId, slot: usize) -> Result<SwapOutcome> {
        self.swap_into(None, id, slot)
    }

    /// Move an item from `source` into equipment slot `slot` of this inventory.
    ///
    /// The displaced occupant goes to this inventory's grid.
    pub fn swap_equip_from(&mut self, source: &mut GridInventory, id: ItemId, slot: usize) -> Result<SwapOutcome> {
        source.ensure_initialized()?;
        self.swap_into(Some(source), id, slot)
    }

    fn swap_into(&mut self, mut source: Option<&mut GridInventory>, id: ItemId, slot: usize) -> Result<SwapOutcome> {
        self.ensure_initialized()?;
        self.equipment.check(slot)?;
        let same_inventory = source.is_none();

        if same_inventory && self.location_of(id)? == Location::Equipment(slot) {
            return Ok(SwapOutcome::Equipped);
        }
        if !same_inventory {
            self.ensure_absent(id)?;
        }

        let Some((item, from)) = lift(pick(&mut source, self), id)? else {
            return Ok(SwapOutcome::Refused);
        };

        let Some(occupant) = self.equipment.item_in(slot)? else {
            if self.vote_equip(&item, slot) {
                self.commit_equip(item, slot)?;
                notify_lifted(pick(&mut source, self), id, from);
                self.listeners
                    .notify(&InventoryEvent::Equipped { item: id, slot });
                self.reset_swap_cache();
                return Ok(SwapOutcome::Equipped);
            }
            self.listeners
                .notify(&InventoryEvent::EquipFailed { item: id, slot });
            restore(pick(&mut source, self), item, from)?;
            return Ok(SwapOutcome::Refused);
        };

        if self.vote_socket(&item, occupant) {
            match self.socket_into(item, occupant)? {
                InsertOutcome::Socketed { host, socket } => {
                    notify_lifted(pick(&mut source, self), id, from);
                    self.reset_swap_cache();
                    return Ok(SwapOutcome::Socketed { host, socket });
                }
                other => {
                    if let Some(item) = other.into_unplaced() {
                        restore(pick(&mut source, self), item, from)?;
                    }
                    return Ok(SwapOutcome::Refused);
                }
            }
        }

        let Some(displaced) = self.unequip(occupant, true)? else {
            restore(pick(&mut source, self), item, from)?;
            return Ok(SwapOutcome::Refused);
        };

        if !self.vote_equip(&item, slot) {
            self.commit_equip(displaced, slot)?;
            self.listeners
                .notify(&InventoryEvent::EquipFailed { item: id, slot });
            restore(pick(&mut source, self), item, from)?;
            return Ok(SwapOutcome::Refused);
        }
        self.commit_equip(item, slot)?;

        let target = match from {
            Location::Equipment(origin) if same_inventory => self
                .vote_equip(&displaced, origin)
                .then_some(Location::Equipment(origin)),
            _ => self
                .find_first_free_space(&displaced)
                .map(|(x, y)| Location::Grid { x, y }),
        };

        let Some(to) = target else {
            warn!(
                "Swap of {} into slot {} rolled back: no room for displaced {}",
                id, slot, occupant
            );
            let item = self.take_from_slot(id)?;
            self.commit_equip(displaced, slot)?;
            restore(pick(&mut source, self), item, from)?;
            return Ok(SwapOutcome::Refused);
        };

        match to {
            Location::Equipment(origin) => {
                self.commit_equip(displaced, origin)?;
            }
            Location::Grid { x, y } => {
                self.commit_store(displaced, x, y);
            }
        }

        notify_lifted(pick(&mut source, self), id, from);
        self.listeners.notify(&InventoryEvent::Unequipped {
            item: occupant,
            slot,
        });
        self.listeners
            .notify(&InventoryEvent::Equipped { item: id, slot });
        let placed = match to {
            Location::Equipment(origin) => InventoryEvent::Equipped {
                item: occupant,
                slot: origin,
            },
            Location::Grid { .. } => InventoryEvent::Stored {
                item: occupant,
                location: to,
            },
        };
        self.listeners.notify(&placed);
        self.reset_swap_cache();

        debug!("Swapped {} into slot {}, {} moved to {:?}", id, slot, occupant, to);
        Ok(SwapOutcome::Swapped {
            displaced: occupant,
            to,
        })
    }

    /// Whether `swap_equip(id, slot)` would succeed, without changing anything.
    ///
    /// The verdict is cached per (item, slot) until `reset_swap_cache`, so
    /// listeners are asked at most once per pair during a drag gesture.
    pub fn can_swap(&mut self, id: ItemId, slot: usize) -> Result<bool> {
        self.ensure_initialized()?;
        self.equipment.check(slot)?;
        if let Some(verdict) = self.swap_cache.lookup(id, slot) {
            return Ok(verdict);
        }

        let candidate = self
            .items
            .get(&id)
            .cloned()
            .ok_or(InventoryError::ItemNotFound(id))?;
        let from = self.location_of(id)?;
        let verdict = self.swap_verdict(&candidate, Some(from), slot)?;
        self.swap_cache.remember(id, slot, verdict);
        Ok(verdict)
    }

    /// Like `can_swap`, for an item held by another inventory or the caller
    pub fn can_swap_foreign(&mut self, item: &Item, slot: usize) -> Result<bool> {
        self.ensure_initialized()?;
        self.ensure_absent(item.id)?;
        self.equipment.check(slot)?;
        if let Some(verdict) = self.swap_cache.lookup(item.id, slot) {
            return Ok(verdict);
        }

        let verdict = self.swap_verdict(item, None, slot)?;
        self.swap_cache.remember(item.id, slot, verdict);
        Ok(verdict)
    }

    /// Forget the cached `can_swap` verdict; call when a drag gesture ends
    pub fn reset_swap_cache(&mut self) {
        self.swap_cache = SwapCache::default();
    }

    fn swap_verdict(&mut self, item: &Item, from: Option<Location>, slot: usize) -> Result<bool> {
        if from == Some(Location::Equipment(slot)) {
            return Ok(true);
        }
        let lift_allowed = match from {
            Some(Location::Grid { .. }) => self.can_remove(item.id)?,
            Some(Location::Equipment(_)) => self.can_unequip(item.id)?,
            None => true,
        };
        if !lift_allowed {
            return Ok(false);
        }

        let Some(occupant) = self.equipment.item_in(slot)? else {
            return Ok(self.vote_equip(item, slot));
        };
        if self.vote_socket(item, occupant) {
            return Ok(true);
        }
        let displaced = self
            .items
            .get(&occupant)
            .cloned()
            .ok_or(InventoryError::ItemNotFound(occupant))?;

        if !self.can_unequip(occupant)? || !self.vote_equip_replacing(item, slot) {
            return Ok(false);
        }

        Ok(match from {
            Some(Location::Equipment(origin)) => self.vote_equip_replacing(&displaced, origin),
            Some(Location::Grid { .. }) => self
                .find_free_space_excluding(&displaced, &[displaced.id, item.id])
                .is_some(),
            None => self.find_first_free_space(&displaced).is_some(),
        })
    }
}
