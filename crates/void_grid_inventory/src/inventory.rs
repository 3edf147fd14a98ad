//! The placement engine
//!
//! `GridInventory` owns every resident item and keeps three views of them
//! in agreement: the grid cells, the equipment slots and the placement
//! recorded on each item. Items are moved in by value and handed back by
//! value when they leave.
//!
//! Low-level operations (`store`, `remove`, `equip`, `unequip`) do not fire
//! the did-perform notifications; a drag-and-drop caller decides when those
//! are due. `pickup` and `drop_item` are the entry points that run the full
//! notification contract.

use crate::config::{InventoryConfig, SlotConfig};
use crate::equipment::{EquipmentRegistry, EquipmentSlot, SlotFilter};
use crate::error::{InventoryError, Result};
use crate::events::{InventoryEvent, InventoryListener, Listeners};
use crate::grid::GridStore;
use crate::item::{Area, Item, ItemId, Location, Placement};
use crate::socket;
use crate::stacking::{self, MergeResult};
use crate::swap::SwapCache;
use log::{debug, info, trace};
use std::collections::{BTreeSet, HashMap};

/// Result of an insertion attempt
#[derive(Debug)]
pub enum InsertOutcome {
    /// Item placed in the grid with its top-left cell at (x, y)
    Stored { id: ItemId, x: usize, y: usize },
    /// Item placed in an equipment slot
    Equipped { id: ItemId, slot: usize },
    /// Units merged into a resident stack; any remainder is handed back
    Stacked {
        into: ItemId,
        moved: u32,
        remainder: Option<Item>,
    },
    /// Item attached into a resident host's socket
    Socketed { host: ItemId, socket: usize },
    /// No room or vetoed; the item is handed back.
    ///
    /// Units already merged by an auto-stack pass stay merged (each merge
    /// fired `StackMerged`), so the returned count may be lower than the
    /// one passed in.
    Refused(Item),
}

impl InsertOutcome {
    /// Whether the whole item found a home
    pub fn is_success(&self) -> bool {
        match self {
            Self::Stored { .. } | Self::Equipped { .. } | Self::Socketed { .. } => true,
            Self::Stacked { remainder, .. } => remainder.is_none(),
            Self::Refused(_) => false,
        }
    }

    /// Where the item now lives, if it was placed as a whole
    pub fn location(&self) -> Option<Location> {
        match *self {
            Self::Stored { x, y, .. } => Some(Location::Grid { x, y }),
            Self::Equipped { slot, .. } => Some(Location::Equipment(slot)),
            _ => None,
        }
    }

    /// Whatever the caller still owns (refused item or stack remainder)
    pub fn into_unplaced(self) -> Option<Item> {
        match self {
            Self::Stacked { remainder, .. } => remainder,
            Self::Refused(item) => Some(item),
            _ => None,
        }
    }
}

/// Parts of the inventory changed since the last `take_dirty`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtySet {
    /// Grid contents changed
    pub grid: bool,
    /// Equipment slots whose contents or settings changed
    pub slots: BTreeSet<usize>,
}

impl DirtySet {
    /// Check if nothing changed
    pub fn is_empty(&self) -> bool {
        !self.grid && self.slots.is_empty()
    }
}

/// Built-in region check followed by the listeners' can-store vote
pub(crate) fn vote_store(
    grid: &GridStore,
    listeners: &mut Listeners,
    item: &Item,
    x: usize,
    y: usize,
    exclude: &[ItemId],
) -> bool {
    let area = item.footprint_at(x, y);
    if !grid.is_empty_region(area, exclude) {
        return false;
    }
    let verdict = listeners.vote(|l| l.can_store(item, area));
    if !verdict.is_allowed() {
        trace!("Store of {} at ({}, {}) vetoed", item.id, x, y);
    }
    verdict.is_allowed()
}

/// Grid inventory with equipment slots
#[derive(Debug)]
pub struct GridInventory {
    pub(crate) config: InventoryConfig,
    pub(crate) grid: GridStore,
    pub(crate) equipment: EquipmentRegistry,
    pub(crate) items: HashMap<ItemId, Item>,
    pub(crate) listeners: Listeners,
    pub(crate) swap_cache: SwapCache,
    dirty: DirtySet,
    initialized: bool,
}

impl GridInventory {
    /// Create an inventory that still needs `initialize()`
    pub fn new(config: InventoryConfig) -> Self {
        Self {
            config,
            grid: GridStore::default(),
            equipment: EquipmentRegistry::default(),
            items: HashMap::new(),
            listeners: Listeners::default(),
            swap_cache: SwapCache::default(),
            dirty: DirtySet::default(),
            initialized: false,
        }
    }

    /// Create and initialize in one step
    pub fn with_config(config: InventoryConfig) -> Self {
        let mut inventory = Self::new(config);
        inventory.initialize();
        inventory
    }

    /// Allocate the grid and link equipment slots (indices follow config order).
    ///
    /// Calling this again has no effect.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.grid = GridStore::new(self.config.grid_width, self.config.grid_height);
        self.equipment = EquipmentRegistry::new(
            self.config.equipment.iter().map(SlotConfig::to_slot).collect(),
        );
        self.initialized = true;
        self.dirty.grid = true;
        self.dirty.slots.extend(0..self.equipment.len());
        info!(
            "Initialized {}x{} inventory with {} equipment slots",
            self.grid.width(),
            self.grid.height(),
            self.equipment.len()
        );
    }

    /// Whether `initialize()` has run
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(InventoryError::NotInitialized)
        }
    }

    pub(crate) fn ensure_absent(&self, id: ItemId) -> Result<()> {
        if self.items.contains_key(&id) {
            Err(InventoryError::DuplicateItem(id))
        } else {
            Ok(())
        }
    }

    /// Current configuration (grid size tracks `resize_grid`)
    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    /// Enable or disable auto-equip
    pub fn set_auto_equip(&mut self, enabled: bool) {
        self.config.auto_equip = enabled;
    }

    /// Prefer equipment slots over the grid when auto-equipping
    pub fn set_auto_equip_first(&mut self, first: bool) {
        self.config.auto_equip_first = first;
    }

    /// Enable or disable auto-stacking
    pub fn set_auto_stack(&mut self, enabled: bool) {
        self.config.auto_stack = enabled;
    }

    /// Enable or disable socketing
    pub fn set_allow_socketing(&mut self, enabled: bool) {
        self.config.allow_socketing = enabled;
    }

    /// Block or unblock an equipment slot
    pub fn set_slot_blocked(&mut self, slot: usize, blocked: bool) -> Result<()> {
        self.equipment.get_mut(slot)?.blocked = blocked;
        self.dirty.slots.insert(slot);
        self.reset_swap_cache();
        Ok(())
    }

    /// Replace an equipment slot's type filter
    pub fn set_slot_filter(&mut self, slot: usize, filter: SlotFilter) -> Result<()> {
        self.equipment.get_mut(slot)?.filter = filter;
        self.dirty.slots.insert(slot);
        self.reset_swap_cache();
        Ok(())
    }

    /// Enable or disable an equipment slot for auto-equip
    pub fn set_slot_enabled(&mut self, slot: usize, enabled: bool) -> Result<()> {
        self.equipment.get_mut(slot)?.enabled = enabled;
        self.dirty.slots.insert(slot);
        Ok(())
    }

    /// Register a listener
    pub fn add_listener(&mut self, listener: impl InventoryListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Grid storage
    pub fn grid(&self) -> &GridStore {
        &self.grid
    }

    /// Equipment slots
    pub fn equipment(&self) -> &EquipmentRegistry {
        &self.equipment
    }

    /// Grid columns
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Grid rows
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Number of resident items (grid and equipment)
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if nothing is resident
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Resident item by id
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Whether the item is resident
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Location of a resident item
    pub fn location_of(&self, id: ItemId) -> Result<Location> {
        let item = self.items.get(&id).ok_or(InventoryError::ItemNotFound(id))?;
        item.placement()
            .location()
            .ok_or_else(|| InventoryError::Corrupted(format!("{} is resident but unplaced", id)))
    }

    /// Item covering a cell (None if empty or out of bounds)
    pub fn slot_contents(&self, x: usize, y: usize) -> Option<&Item> {
        self.grid.cell(x, y).and_then(|id| self.items.get(&id))
    }

    /// Whether a cell is inside the grid and empty
    pub fn slot_is_empty(&self, x: usize, y: usize) -> bool {
        self.grid.contains_cell(x, y) && self.grid.cell(x, y).is_none()
    }

    /// Distinct items intersecting an area (None if the area is invalid)
    pub fn range_contents(&self, area: Area) -> Option<Vec<&Item>> {
        let ids = self.grid.query(area, &[])?;
        Some(ids.iter().filter_map(|id| self.items.get(id)).collect())
    }

    /// Whether an area is inside the grid and empty
    pub fn range_is_empty(&self, area: Area) -> bool {
        self.grid.is_empty_region(area, &[])
    }

    /// Grid items in row-major order of their top-left cell
    pub fn grid_items(&self) -> Vec<&Item> {
        self.grid
            .items()
            .iter()
            .filter_map(|id| self.items.get(id))
            .collect()
    }

    /// Equipped items with their slot index
    pub fn equipped_items(&self) -> Vec<(usize, &Item)> {
        self.equipment
            .iter()
            .filter_map(|(index, slot)| slot.item().and_then(|id| self.items.get(&id)).map(|i| (index, i)))
            .collect()
    }

    /// Item in an equipment slot
    pub fn equipped_in(&self, slot: usize) -> Result<Option<&Item>> {
        Ok(self.equipment.item_in(slot)?.and_then(|id| self.items.get(&id)))
    }

    /// Grid items followed by equipped items
    pub fn all_items(&self) -> Vec<&Item> {
        let mut all = self.grid_items();
        all.extend(self.equipped_items().into_iter().map(|(_, item)| item));
        all
    }

    /// Take the dirty set, leaving it clean
    pub fn take_dirty(&mut self) -> DirtySet {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self, placement: Placement) {
        match placement {
            Placement::Stored { .. } => self.dirty.grid = true,
            Placement::Equipped { slot } => {
                self.dirty.slots.insert(slot);
            }
            Placement::Unplaced => {}
        }
    }

    /// Whether `item` could be stored with its top-left cell at (x, y).
    ///
    /// The item's own cells count as free, so a resident item can ask
    /// about a position overlapping where it already sits.
    pub fn can_store(&mut self, item: &Item, x: usize, y: usize) -> bool {
        vote_store(&self.grid, &mut self.listeners, item, x, y, &[item.id])
    }

    /// Like `can_store`, also treating the `exclude` items as absent
    pub fn can_store_excluding(&mut self, item: &Item, x: usize, y: usize, exclude: &[ItemId]) -> bool {
        let mut ignored = exclude.to_vec();
        ignored.push(item.id);
        vote_store(&self.grid, &mut self.listeners, item, x, y, &ignored)
    }

    /// Whether `item` would merge into the single stack under its footprint at (x, y)
    pub fn can_stack_at(&mut self, item: &Item, x: usize, y: usize) -> bool {
        self.stack_target(item, x, y).is_some()
    }

    /// Whether `item` could be equipped into `slot`
    pub fn can_equip(&mut self, item: &Item, slot: usize) -> Result<bool> {
        self.equipment.check(slot)?;
        Ok(self.vote_equip(item, slot))
    }

    /// Whether the equipped item may leave its slot
    pub fn can_unequip(&mut self, id: ItemId) -> Result<bool> {
        let item = self.items.get(&id).ok_or(InventoryError::ItemNotFound(id))?;
        let Placement::Equipped { slot } = item.placement() else {
            return Err(InventoryError::NotEquipped(id));
        };
        Ok(self.listeners.vote(|l| l.can_unequip(item, slot)).is_allowed())
    }

    /// Whether a resident item may be removed or dropped
    pub fn can_remove(&mut self, id: ItemId) -> Result<bool> {
        let item = self.items.get(&id).ok_or(InventoryError::ItemNotFound(id))?;
        Ok(self.listeners.vote(|l| l.can_remove(item)).is_allowed())
    }

    /// Whether `socketable` could attach into the resident `host`
    pub fn can_socket(&mut self, socketable: &Item, host: ItemId) -> Result<bool> {
        if !self.items.contains_key(&host) {
            return Err(InventoryError::ItemNotFound(host));
        }
        Ok(self.vote_socket(socketable, host))
    }

    pub(crate) fn vote_equip(&mut self, item: &Item, slot: usize) -> bool {
        let Ok(def) = self.equipment.get(slot) else {
            return false;
        };
        if def.is_occupied() || !def.admits(item) {
            return false;
        }
        let verdict = self.listeners.vote(|l| l.can_equip(item, slot, def));
        if !verdict.is_allowed() {
            trace!("Equip of {} into slot {} vetoed", item.id, slot);
        }
        verdict.is_allowed()
    }

    /// Slot-level acceptance ignoring whatever currently occupies it
    pub(crate) fn vote_equip_replacing(&mut self, item: &Item, slot: usize) -> bool {
        let Ok(def) = self.equipment.get(slot) else {
            return false;
        };
        if !def.admits(item) {
            return false;
        }
        self.listeners.vote(|l| l.can_equip(item, slot, def)).is_allowed()
    }

    pub(crate) fn vote_socket(&mut self, socketable: &Item, host: ItemId) -> bool {
        let Some(host) = self.items.get(&host) else {
            return false;
        };
        if !socket::can_socket(socketable, host, self.config.allow_socketing) {
            return false;
        }
        let verdict = self.listeners.vote(|l| l.can_socket(host, socketable));
        if !verdict.is_allowed() {
            trace!("Socketing {} into {} vetoed", socketable.id, host.id);
        }
        verdict.is_allowed()
    }

    fn stack_target(&mut self, item: &Item, x: usize, y: usize) -> Option<ItemId> {
        let area = item.footprint_at(x, y);
        let found = self.grid.query(area, &[item.id])?;
        let [target] = found.as_slice() else {
            return None;
        };
        let target = *target;
        let stack = self.items.get(&target)?;
        if !stacking::can_stack(item, stack) {
            return None;
        }
        self.listeners
            .vote(|l| l.can_store(item, area))
            .is_allowed()
            .then_some(target)
    }

    fn auto_equip_slot(&mut self, item: &Item) -> Option<usize> {
        let candidates: Vec<usize> = self
            .equipment
            .iter()
            .filter(|(_, slot)| slot.is_auto_equip_target())
            .map(|(index, _)| index)
            .collect();
        candidates.into_iter().find(|&slot| self.vote_equip(item, slot))
    }

    pub(crate) fn commit_store(&mut self, mut item: Item, x: usize, y: usize) -> ItemId {
        let id = item.id;
        self.grid.place(id, item.footprint_at(x, y));
        item.set_placement(Placement::Stored { x, y });
        self.items.insert(id, item);
        self.dirty.grid = true;
        debug!("Stored {} at ({}, {})", id, x, y);
        id
    }

    pub(crate) fn commit_equip(&mut self, mut item: Item, slot: usize) -> Result<ItemId> {
        let id = item.id;
        self.equipment.assign(slot, id)?;
        item.set_placement(Placement::Equipped { slot });
        self.items.insert(id, item);
        self.dirty.slots.insert(slot);
        debug!("Equipped {} into slot {}", id, slot);
        Ok(id)
    }

    pub(crate) fn take_from_grid(&mut self, id: ItemId) -> Result<Item> {
        let item = self.items.get(&id).ok_or(InventoryError::ItemNotFound(id))?;
        let area = item.footprint().ok_or(InventoryError::NotStored(id))?;
        let mut item = self.items.remove(&id).ok_or(InventoryError::ItemNotFound(id))?;
        self.grid.unplace(area);
        item.set_placement(Placement::Unplaced);
        self.dirty.grid = true;
        debug!("Removed {} from the grid", id);
        Ok(item)
    }

    pub(crate) fn take_from_slot(&mut self, id: ItemId) -> Result<Item> {
        let slot = match self.items.get(&id).map(Item::placement) {
            Some(Placement::Equipped { slot }) => slot,
            Some(_) => return Err(InventoryError::NotEquipped(id)),
            None => return Err(InventoryError::ItemNotFound(id)),
        };
        self.equipment.clear(slot)?;
        let mut item = self.items.remove(&id).ok_or(InventoryError::ItemNotFound(id))?;
        item.set_placement(Placement::Unplaced);
        self.dirty.slots.insert(slot);
        debug!("Unequipped {} from slot {}", id, slot);
        Ok(item)
    }

    fn merge_into(&mut self, item: Item, target: ItemId) -> Result<MergeResult> {
        let item_id = item.id;
        let stack = self
            .items
            .get_mut(&target)
            .ok_or(InventoryError::ItemNotFound(target))?;
        let result = stacking::merge(item, stack);
        let placement = stack.placement();

        if result.merged() {
            let consumed = matches!(result, MergeResult::Absorbed { .. });
            self.mark_dirty(placement);
            debug!("Merged {} units of {} into {}", result.moved(), item_id, target);
            self.listeners.notify(&InventoryEvent::StackMerged {
                item: item_id,
                into: target,
                moved: result.moved(),
                consumed,
            });
        }
        Ok(result)
    }

    pub(crate) fn socket_into(&mut self, item: Item, host: ItemId) -> Result<InsertOutcome> {
        let item_id = item.id;
        let host_item = self
            .items
            .get_mut(&host)
            .ok_or(InventoryError::ItemNotFound(host))?;

        match socket::attach(host_item, item) {
            Ok(socket) => {
                let placement = host_item.placement();
                self.mark_dirty(placement);
                debug!("Socketed {} into {} (socket {})", item_id, host, socket);
                self.listeners.notify(&InventoryEvent::Socketed {
                    host,
                    item: item_id,
                    socket,
                });
                Ok(InsertOutcome::Socketed { host, socket })
            }
            Err(item) => Ok(InsertOutcome::Refused(item)),
        }
    }

    /// Store an item with its top-left cell at (x, y).
    ///
    /// With `validate`, the cell's occupant is first tried as a socket host,
    /// then as a stack to merge into, before the plain can-store check. A
    /// refused validated store fires `StoreFailed`. Without `validate`, the
    /// write is unconditional but still rejects out-of-bounds and overlapping
    /// footprints with an error.
    pub fn store(&mut self, item: Item, x: usize, y: usize, validate: bool) -> Result<InsertOutcome> {
        self.ensure_initialized()?;
        self.ensure_absent(item.id)?;

        if validate {
            if let Some(host) = self.grid.cell(x, y) {
                if self.vote_socket(&item, host) {
                    return self.socket_into(item, host);
                }
            }

            if let Some(target) = self.stack_target(&item, x, y) {
                return Ok(match self.merge_into(item, target)? {
                    MergeResult::Rejected(item) => InsertOutcome::Refused(item),
                    merged => InsertOutcome::Stacked {
                        into: target,
                        moved: merged.moved(),
                        remainder: merged.into_remainder(),
                    },
                });
            }

            if !vote_store(&self.grid, &mut self.listeners, &item, x, y, &[]) {
                self.listeners
                    .notify(&InventoryEvent::StoreFailed { item: item.id });
                return Ok(InsertOutcome::Refused(item));
            }
        } else {
            let area = item.footprint_at(x, y);
            if !self.grid.contains_area(&area) {
                return Err(InventoryError::OutOfBounds(area));
            }
            if !self.grid.is_empty_region(area, &[]) {
                return Err(InventoryError::Overlap(area));
            }
        }

        let id = self.commit_store(item, x, y);
        Ok(InsertOutcome::Stored { id, x, y })
    }

    /// Remove a grid item, returning it. `Ok(None)` when vetoed.
    pub fn remove(&mut self, id: ItemId, validate: bool) -> Result<Option<Item>> {
        self.ensure_initialized()?;
        let item = self.items.get(&id).ok_or(InventoryError::ItemNotFound(id))?;
        if !item.is_stored() {
            return Err(InventoryError::NotStored(id));
        }
        if validate && !self.listeners.vote(|l| l.can_remove(item)).is_allowed() {
            trace!("Removal of {} vetoed", id);
            return Ok(None);
        }
        self.take_from_grid(id).map(Some)
    }

    /// Remove whatever covers cell (x, y). `Ok(None)` when empty or vetoed.
    pub fn remove_at(&mut self, x: usize, y: usize, validate: bool) -> Result<Option<Item>> {
        self.ensure_initialized()?;
        match self.grid.cell(x, y) {
            Some(id) => self.remove(id, validate),
            None => Ok(None),
        }
    }

    /// Put an item into an equipment slot.
    ///
    /// Never replaces an occupant; see `swap_equip` for that. A refused
    /// validated equip fires `EquipFailed`.
    pub fn equip(&mut self, item: Item, slot: usize, validate: bool) -> Result<InsertOutcome> {
        self.ensure_initialized()?;
        self.ensure_absent(item.id)?;
        self.equipment.check(slot)?;

        if validate {
            if !self.vote_equip(&item, slot) {
                self.listeners.notify(&InventoryEvent::EquipFailed {
                    item: item.id,
                    slot,
                });
                return Ok(InsertOutcome::Refused(item));
            }
        } else if self.equipment.item_in(slot)?.is_some() {
            return Err(InventoryError::SlotOccupied(slot));
        }

        let id = self.commit_equip(item, slot)?;
        Ok(InsertOutcome::Equipped { id, slot })
    }

    /// Take an item out of its equipment slot. `Ok(None)` when vetoed.
    pub fn unequip(&mut self, id: ItemId, validate: bool) -> Result<Option<Item>> {
        self.ensure_initialized()?;
        let item = self.items.get(&id).ok_or(InventoryError::ItemNotFound(id))?;
        let Placement::Equipped { slot } = item.placement() else {
            return Err(InventoryError::NotEquipped(id));
        };
        if validate && !self.listeners.vote(|l| l.can_unequip(item, slot)).is_allowed() {
            trace!("Unequip of {} vetoed", id);
            return Ok(None);
        }
        self.take_from_slot(id).map(Some)
    }

    /// First-fit insertion.
    ///
    /// Order: merge into grid stacks (auto-stack), equipment slots when
    /// equipment is preferred, grid first-fit, then equipment when the grid
    /// is preferred. Slots that skip auto-equip or are disabled are never
    /// chosen.
    pub fn store_at_first_free_space(&mut self, item: Item) -> Result<InsertOutcome> {
        self.ensure_initialized()?;
        self.ensure_absent(item.id)?;
        let mut item = item;

        if self.config.auto_stack && item.is_stackable() {
            for target in self.grid.items() {
                let compatible = self
                    .items
                    .get(&target)
                    .map(|stack| stacking::can_stack(&item, stack))
                    .unwrap_or(false);
                if !compatible {
                    continue;
                }
                match self.merge_into(item, target)? {
                    MergeResult::Absorbed { moved } => {
                        return Ok(InsertOutcome::Stacked {
                            into: target,
                            moved,
                            remainder: None,
                        });
                    }
                    MergeResult::Partial { remainder, .. } | MergeResult::Rejected(remainder) => {
                        item = remainder;
                    }
                }
            }
        }

        if self.config.auto_equip && self.config.auto_equip_first {
            if let Some(slot) = self.auto_equip_slot(&item) {
                let id = self.commit_equip(item, slot)?;
                return Ok(InsertOutcome::Equipped { id, slot });
            }
        }

        if let Some((x, y)) = self.find_first_free_space(&item) {
            let id = self.commit_store(item, x, y);
            return Ok(InsertOutcome::Stored { id, x, y });
        }

        if self.config.auto_equip && !self.config.auto_equip_first {
            if let Some(slot) = self.auto_equip_slot(&item) {
                let id = self.commit_equip(item, slot)?;
                return Ok(InsertOutcome::Equipped { id, slot });
            }
        }

        trace!("No room for {}", item.id);
        Ok(InsertOutcome::Refused(item))
    }

    /// Insert an item wherever it fits and fire the full notification set
    pub fn pickup(&mut self, item: Item) -> Result<InsertOutcome> {
        let id = item.id;
        let outcome = self.store_at_first_free_space(item)?;

        match outcome {
            InsertOutcome::Stored { x, y, .. } => {
                self.listeners.notify(&InventoryEvent::Stored {
                    item: id,
                    location: Location::Grid { x, y },
                });
            }
            InsertOutcome::Equipped { slot, .. } => {
                self.listeners.notify(&InventoryEvent::Stored {
                    item: id,
                    location: Location::Equipment(slot),
                });
                self.listeners
                    .notify(&InventoryEvent::Equipped { item: id, slot });
            }
            InsertOutcome::Refused(_) => {
                self.listeners
                    .notify(&InventoryEvent::StoreFailed { item: id });
            }
            InsertOutcome::Stacked { .. } | InsertOutcome::Socketed { .. } => {}
        }
        Ok(outcome)
    }

    /// Pick up with auto-equip suppressed for this call only
    pub(crate) fn pickup_to_grid(&mut self, item: Item) -> Result<InsertOutcome> {
        let auto_equip = self.config.auto_equip;
        self.config.auto_equip = false;
        let outcome = self.pickup(item);
        self.config.auto_equip = auto_equip;
        outcome
    }

    /// Pick up several items; returns the ones that did not fit
    pub fn pickup_all(&mut self, items: impl IntoIterator<Item = Item>) -> Result<Vec<Item>> {
        let mut leftovers = Vec::new();
        for item in items {
            if let Some(rest) = self.pickup(item)?.into_unplaced() {
                leftovers.push(rest);
            }
        }
        Ok(leftovers)
    }

    /// Take an item out of the inventory, wherever it is.
    ///
    /// Returns `Ok(None)` for an unknown item or when a listener vetoes.
    pub fn drop_item(&mut self, id: ItemId) -> Result<Option<Item>> {
        self.ensure_initialized()?;
        let Some(placement) = self.items.get(&id).map(Item::placement) else {
            return Ok(None);
        };

        let item = match placement {
            Placement::Equipped { slot } => {
                let Some(item) = self.unequip(id, true)? else {
                    return Ok(None);
                };
                self.listeners
                    .notify(&InventoryEvent::Unequipped { item: id, slot });
                item
            }
            Placement::Stored { .. } => match self.remove(id, true)? {
                Some(item) => item,
                None => return Ok(None),
            },
            Placement::Unplaced => return Ok(None),
        };

        self.listeners.notify(&InventoryEvent::Removed { item: id });
        Ok(Some(item))
    }

    /// First top-left position (row-major, row 0 first) where the item can be stored
    pub fn find_first_free_space(&mut self, item: &Item) -> Option<(usize, usize)> {
        self.find_free_space_excluding(item, &[item.id])
    }

    pub(crate) fn find_free_space_excluding(&mut self, item: &Item, exclude: &[ItemId]) -> Option<(usize, usize)> {
        for y in 0..self.grid.height() {
            for x in 0..self.grid.width() {
                if vote_store(&self.grid, &mut self.listeners, item, x, y, exclude) {
                    return Some((x, y));
                }
            }
        }
        None
    }

    /// Whether the item would fit anywhere, optionally counting stacks and equipment
    pub fn has_room_for_item(&mut self, item: &Item, check_equip: bool, check_stacks: bool) -> bool {
        for y in 0..self.grid.height() {
            for x in 0..self.grid.width() {
                if vote_store(&self.grid, &mut self.listeners, item, x, y, &[item.id]) {
                    return true;
                }
                if check_stacks && self.stack_target(item, x, y).is_some() {
                    return true;
                }
            }
        }
        check_equip && (0..self.equipment.len()).any(|slot| self.vote_equip(item, slot))
    }

    /// Reallocate the grid, evicting every grid item.
    ///
    /// Evicted items get a `Removed` notification and are handed back;
    /// can-remove hooks are not consulted. Reinsertion is up to the caller
    /// (see `pickup_all`).
    pub fn resize_grid(&mut self, width: usize, height: usize) -> Result<Vec<Item>> {
        self.ensure_initialized()?;
        info!(
            "Resizing grid {}x{} -> {}x{}",
            self.grid.width(),
            self.grid.height(),
            width,
            height
        );
        self.listeners
            .notify(&InventoryEvent::GridResizeBegin { width, height });

        let mut evicted = Vec::new();
        for id in self.grid.resize(width, height) {
            if let Some(mut item) = self.items.remove(&id) {
                item.set_placement(Placement::Unplaced);
                self.listeners.notify(&InventoryEvent::Removed { item: id });
                evicted.push(item);
            }
        }

        self.config.grid_width = width;
        self.config.grid_height = height;
        self.dirty.grid = true;
        self.reset_swap_cache();

        self.listeners
            .notify(&InventoryEvent::GridResizeEnd { width, height });
        Ok(evicted)
    }

    /// Detach `amount` units from a resident stack as a new unplaced item
    pub fn split_stack(&mut self, id: ItemId, amount: u32, new_id: ItemId) -> Result<Option<Item>> {
        self.ensure_initialized()?;
        self.ensure_absent(new_id)?;
        let stack = self.items.get_mut(&id).ok_or(InventoryError::ItemNotFound(id))?;
        let split = stack.split(amount, new_id);
        let placement = stack.placement();
        if split.is_some() {
            self.mark_dirty(placement);
            debug!("Split {} units off {} as {}", amount, id, new_id);
        }
        Ok(split)
    }

    /// Take an attached item out of a resident host's socket.
    ///
    /// Returns `Ok(None)` when the host carries no such item.
    pub fn detach_socketed(&mut self, host: ItemId, id: ItemId) -> Result<Option<Item>> {
        self.ensure_initialized()?;
        let host_item = self
            .items
            .get_mut(&host)
            .ok_or(InventoryError::ItemNotFound(host))?;
        let Some((socket, item)) = socket::detach(host_item, id) else {
            return Ok(None);
        };

        let placement = host_item.placement();
        self.mark_dirty(placement);
        debug!("Detached {} from {} (socket {})", id, host, socket);
        self.listeners.notify(&InventoryEvent::Unsocketed {
            host,
            item: id,
            socket,
        });
        Ok(Some(item))
    }

    /// Confirm every resident item's recorded placement matches the grid and slots
    pub fn verify_integrity(&self) -> Result<()> {
        let corrupted = |msg: String| Err(InventoryError::Corrupted(msg));

        for (id, item) in &self.items {
            if item.id != *id {
                return corrupted(format!("{} is keyed as {}", item.id, id));
            }
            match item.placement() {
                Placement::Stored { x, y } => {
                    let area = item.footprint_at(x, y);
                    if !self.grid.contains_area(&area) {
                        return corrupted(format!("{} lies outside the grid", id));
                    }
                    if area.cells().any(|(cx, cy)| self.grid.cell(cx, cy) != Some(*id)) {
                        return corrupted(format!("{} does not own its whole footprint", id));
                    }
                    if self.grid.cells_of(*id).len() != area.width * area.height {
                        return corrupted(format!("{} covers cells outside its footprint", id));
                    }
                }
                Placement::Equipped { slot } => {
                    if self.equipment.item_in(slot).ok().flatten() != Some(*id) {
                        return corrupted(format!("{} is not in slot {}", id, slot));
                    }
                    if !self.grid.cells_of(*id).is_empty() {
                        return corrupted(format!("equipped {} still covers grid cells", id));
                    }
                }
                Placement::Unplaced => {
                    return corrupted(format!("{} is resident but unplaced", id));
                }
            }
        }

        for id in self.grid.items() {
            if !self.items.contains_key(&id) {
                return corrupted(format!("grid references unknown {}", id));
            }
        }

        for (index, slot) in self.equipment.iter() {
            if let Some(id) = slot.item() {
                match self.items.get(&id).map(Item::placement) {
                    Some(Placement::Equipped { slot: at }) if at == index => {}
                    _ => return corrupted(format!("slot {} references misplaced {}", index, id)),
                }
            }
        }

        Ok(())
    }

    /// Equipment slot definition
    pub fn slot(&self, index: usize) -> Result<&EquipmentSlot> {
        self.equipment.get(index)
    }
}
