//! Auto-arrange and in-place rotation

use crate::error::{InventoryError, Result};
use crate::inventory::{vote_store, GridInventory};
use crate::item::{Area, Item, ItemId, Placement, Rotation};
use log::{debug, info, warn};
use std::cmp::Reverse;

/// Pre-arrangement state of one grid item
#[derive(Debug, Clone, Copy)]
struct Snapshot {
    id: ItemId,
    x: usize,
    y: usize,
    rotation: Rotation,
}

impl GridInventory {
    /// Repack the grid; rotated items turn clockwise
    pub fn arrange_items(&mut self, allow_rotation: bool) -> Result<bool> {
        self.arrange_items_with(allow_rotation, Rotation::Clockwise)
    }

    /// Repack every grid item with a first-fit pass over a size-sorted order.
    ///
    /// With `allow_rotation`, items are turned toward the grid's short side:
    /// in a grid taller than wide, an item narrower than it is tall (and no
    /// wider than the grid) is turned, and the widest items are packed
    /// first. Otherwise an item shorter than it is wide (and no taller than
    /// the grid) is turned, and the tallest items go first. Items already
    /// rotated turn back to `Rotation::None`. If any item fails to find
    /// space the grid is restored exactly, rotations included, and
    /// `Ok(false)` is returned.
    pub fn arrange_items_with(&mut self, allow_rotation: bool, direction: Rotation) -> Result<bool> {
        self.ensure_initialized()?;
        let (grid_w, grid_h) = (self.grid.width(), self.grid.height());
        let narrow_width = grid_w < grid_h;

        let mut snapshots = Vec::new();
        let mut pending = Vec::new();
        for id in self.grid.items() {
            let (item, snapshot) = self.lift_with_snapshot(id)?;
            snapshots.push(snapshot);
            pending.push(item);
        }

        if allow_rotation {
            for item in &mut pending {
                let (w, h) = (item.cell_width(), item.cell_height());
                let turn = if narrow_width {
                    w < h && w <= grid_w
                } else {
                    h < w && h <= grid_h
                };
                if turn {
                    let turned = if item.is_rotated() {
                        Rotation::None
                    } else {
                        direction
                    };
                    item.set_rotation(turned);
                }
            }
        }

        if allow_rotation && narrow_width {
            pending.sort_by_key(|i| (Reverse(i.cell_width()), Reverse(i.cell_height())));
        } else {
            pending.sort_by_key(|i| (Reverse(i.cell_height()), Reverse(i.cell_width())));
        }

        let mut placed = Vec::with_capacity(pending.len());
        let mut remaining = pending.into_iter();
        while let Some(item) = remaining.next() {
            match self.find_first_free_space(&item) {
                Some((x, y)) => placed.push(self.commit_store(item, x, y)),
                None => {
                    warn!(
                        "Arrangement aborted: no room for {}, restoring {} items",
                        item.id,
                        snapshots.len()
                    );
                    let mut lifted = vec![item];
                    lifted.extend(remaining);
                    for id in placed {
                        lifted.push(self.take_from_grid(id)?);
                    }
                    self.restore_snapshots(&snapshots, lifted)?;
                    return Ok(false);
                }
            }
        }

        info!("Arranged {} grid items", placed.len());
        Ok(true)
    }

    fn lift_with_snapshot(&mut self, id: ItemId) -> Result<(Item, Snapshot)> {
        let item = self.items.get(&id).ok_or(InventoryError::ItemNotFound(id))?;
        let Placement::Stored { x, y } = item.placement() else {
            return Err(InventoryError::NotStored(id));
        };
        let snapshot = Snapshot {
            id,
            x,
            y,
            rotation: item.rotation(),
        };
        Ok((self.take_from_grid(id)?, snapshot))
    }

    fn restore_snapshots(&mut self, snapshots: &[Snapshot], lifted: Vec<Item>) -> Result<()> {
        let mut lifted = lifted;
        for snapshot in snapshots {
            let index = lifted
                .iter()
                .position(|i| i.id == snapshot.id)
                .ok_or(InventoryError::ItemNotFound(snapshot.id))?;
            let mut item = lifted.swap_remove(index);
            item.set_rotation(snapshot.rotation);
            let area = item.footprint_at(snapshot.x, snapshot.y);
            if !self.grid.is_empty_region(area, &[]) {
                return Err(InventoryError::Corrupted(format!(
                    "cannot restore {} to ({}, {})",
                    snapshot.id, snapshot.x, snapshot.y
                )));
            }
            self.commit_store(item, snapshot.x, snapshot.y);
        }
        Ok(())
    }

    /// Find where a stored item could sit after turning in place.
    ///
    /// Candidate positions are scanned outward from the item's top-left
    /// cell; clockwise turns try down/right first, counter-clockwise turns
    /// up/left first. A candidate must be collision free and share at least
    /// one cell with the current footprint.
    pub fn find_vailence_position(&self, id: ItemId, direction: Rotation) -> Result<Option<(usize, usize)>> {
        let item = self.items.get(&id).ok_or(InventoryError::ItemNotFound(id))?;
        let current = item.footprint().ok_or(InventoryError::NotStored(id))?;
        let (width, height) = (current.height, current.width);

        let clockwise = match direction {
            Rotation::Clockwise => true,
            Rotation::None => item.rotation() == Rotation::CounterClockwise,
            Rotation::CounterClockwise => false,
        };

        let (x0, y0) = (current.x as i64, current.y as i64);
        let (w, h) = (width as i64, height as i64);
        let forward = move || (y0..y0 + h).flat_map(move |y| (x0..x0 + w).map(move |x| (x, y)));
        let backward =
            move || (0..h).flat_map(move |dy| (0..w).map(move |dx| (x0 - dx, y0 - dy)));

        let candidates: Vec<(i64, i64)> = if clockwise {
            forward().chain(backward()).collect()
        } else {
            backward().chain(forward()).collect()
        };

        let found = candidates.into_iter().find_map(|(x, y)| {
            if x < 0 || y < 0 {
                return None;
            }
            let area = Area::new(x as usize, y as usize, width, height);
            (area.intersects(&current) && self.grid.is_empty_region(area, &[id]))
                .then_some((area.x, area.y))
        });
        Ok(found)
    }

    /// Turn a stored item in place, moving it to a vailence position if needed.
    ///
    /// Returns `Ok(false)` when no position fits or a listener vetoes the
    /// new footprint; the item is then left untouched.
    pub fn rotate_item(&mut self, id: ItemId, direction: Rotation) -> Result<bool> {
        self.ensure_initialized()?;
        let item = self.items.get(&id).ok_or(InventoryError::ItemNotFound(id))?;
        let Placement::Stored { x, y } = item.placement() else {
            return Err(InventoryError::NotStored(id));
        };
        let previous = item.rotation();
        if previous == direction {
            return Ok(true);
        }

        if previous.is_rotated() == direction.is_rotated() {
            if let Some(item) = self.items.get_mut(&id) {
                item.set_rotation(direction);
            }
            self.mark_dirty(Placement::Stored { x, y });
            return Ok(true);
        }

        let Some((nx, ny)) = self.find_vailence_position(id, direction)? else {
            debug!("No room to rotate {}", id);
            return Ok(false);
        };

        let mut item = self.take_from_grid(id)?;
        item.set_rotation(direction);
        if vote_store(&self.grid, &mut self.listeners, &item, nx, ny, &[]) {
            self.commit_store(item, nx, ny);
            debug!("Rotated {} to {:?} at ({}, {})", id, direction, nx, ny);
            Ok(true)
        } else {
            item.set_rotation(previous);
            self.commit_store(item, x, y);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InventoryConfig;
    use crate::events::{InventoryListener, Verdict};
    use crate::item::Location;

    struct DenyArea(Area);

    impl InventoryListener for DenyArea {
        fn can_store(&mut self, _item: &Item, area: Area) -> Verdict {
            Verdict::allow_if(area != self.0)
        }
    }

    fn grid(width: usize, height: usize) -> GridInventory {
        GridInventory::with_config(InventoryConfig::grid(width, height))
    }

    fn item(id: u64, w: usize, h: usize) -> Item {
        Item::new(ItemId(id), w, h)
    }

    fn position(inv: &GridInventory, id: u64) -> Location {
        inv.location_of(ItemId(id)).unwrap()
    }

    #[test]
    fn test_arrange_compacts() {
        let mut inv = grid(4, 2);
        inv.store(item(1, 1, 1), 3, 1, true).unwrap();
        inv.store(item(2, 2, 2), 1, 0, true).unwrap();

        assert!(inv.arrange_items(false).unwrap());
        assert_eq!(position(&inv, 2), Location::Grid { x: 0, y: 0 });
        assert_eq!(position(&inv, 1), Location::Grid { x: 2, y: 0 });
        inv.verify_integrity().unwrap();
    }

    #[test]
    fn test_arrange_rotation_in_wide_grid() {
        let mut inv = grid(4, 2);
        inv.store(item(1, 1, 2), 0, 0, true).unwrap();
        inv.store(item(2, 2, 1), 1, 0, true).unwrap();

        assert!(inv.arrange_items(true).unwrap());
        let upright = inv.item(ItemId(1)).unwrap();
        assert_eq!(upright.rotation(), Rotation::None);
        let turned = inv.item(ItemId(2)).unwrap();
        assert_eq!(turned.rotation(), Rotation::Clockwise);
        assert_eq!((turned.cell_width(), turned.cell_height()), (1, 2));
        inv.verify_integrity().unwrap();
    }

    #[test]
    fn test_arrange_rotation_in_tall_grid() {
        let mut inv = grid(2, 4);
        inv.store(item(1, 1, 2), 0, 0, true).unwrap();
        inv.store(item(2, 2, 1), 0, 2, true).unwrap();

        assert!(inv.arrange_items_with(true, Rotation::CounterClockwise).unwrap());
        let turned = inv.item(ItemId(1)).unwrap();
        assert_eq!(turned.rotation(), Rotation::CounterClockwise);
        assert_eq!((turned.cell_width(), turned.cell_height()), (2, 1));
        assert_eq!(inv.item(ItemId(2)).unwrap().rotation(), Rotation::None);
        inv.verify_integrity().unwrap();
    }

    #[test]
    fn test_arrange_without_rotation_keeps_orientation() {
        let mut inv = grid(2, 4);
        inv.store(item(1, 1, 2), 0, 0, true).unwrap();
        inv.store(item(2, 2, 1), 0, 2, true).unwrap();

        assert!(inv.arrange_items(false).unwrap());
        // Tallest first without rotation, even in a tall grid
        assert_eq!(position(&inv, 1), Location::Grid { x: 0, y: 0 });
        assert_eq!(position(&inv, 2), Location::Grid { x: 0, y: 2 });
        assert_eq!(inv.item(ItemId(1)).unwrap().rotation(), Rotation::None);
    }

    #[test]
    fn test_arrange_rollback_restores_positions_and_rotation() {
        let mut inv = grid(2, 2);
        inv.store(item(1, 1, 2), 1, 0, true).unwrap();
        inv.store(item(2, 1, 1), 0, 1, true).unwrap();
        inv.add_listener(DenyArea(Area::new(0, 0, 1, 1)));
        inv.add_listener(DenyArea(Area::new(1, 0, 1, 1)));
        inv.add_listener(DenyArea(Area::new(0, 1, 1, 1)));
        inv.add_listener(DenyArea(Area::new(1, 1, 1, 1)));

        assert!(!inv.arrange_items(true).unwrap());
        assert_eq!(position(&inv, 1), Location::Grid { x: 1, y: 0 });
        assert_eq!(position(&inv, 2), Location::Grid { x: 0, y: 1 });
        assert_eq!(inv.item(ItemId(1)).unwrap().rotation(), Rotation::None);
        inv.verify_integrity().unwrap();
    }

    #[test]
    fn test_vailence_in_place() {
        let mut inv = grid(4, 4);
        inv.store(item(1, 1, 3), 0, 0, true).unwrap();

        assert_eq!(
            inv.find_vailence_position(ItemId(1), Rotation::Clockwise).unwrap(),
            Some((0, 0))
        );
    }

    #[test]
    fn test_vailence_shifts_back() {
        let mut inv = grid(3, 3);
        inv.store(item(1, 1, 3), 2, 0, true).unwrap();

        // Turning at (2, 0) would need columns 2..5; shift left instead
        assert_eq!(
            inv.find_vailence_position(ItemId(1), Rotation::Clockwise).unwrap(),
            Some((0, 0))
        );
        assert_eq!(
            inv.find_vailence_position(ItemId(1), Rotation::CounterClockwise).unwrap(),
            Some((0, 0))
        );
    }

    #[test]
    fn test_vailence_blocked() {
        let mut inv = grid(3, 3);
        inv.store(item(1, 1, 3), 1, 0, true).unwrap();
        inv.store(item(2, 1, 3), 0, 0, true).unwrap();
        inv.store(item(3, 1, 3), 2, 0, true).unwrap();

        assert_eq!(
            inv.find_vailence_position(ItemId(1), Rotation::Clockwise).unwrap(),
            None
        );
        assert!(!inv.rotate_item(ItemId(1), Rotation::Clockwise).unwrap());
        assert_eq!(inv.item(ItemId(1)).unwrap().rotation(), Rotation::None);
    }

    #[test]
    fn test_rotate_item() {
        let mut inv = grid(4, 4);
        inv.store(item(1, 2, 3), 0, 0, true).unwrap();

        assert!(inv.rotate_item(ItemId(1), Rotation::CounterClockwise).unwrap());
        let rotated = inv.item(ItemId(1)).unwrap();
        assert_eq!((rotated.cell_width(), rotated.cell_height()), (3, 2));
        assert_eq!(rotated.footprint(), Some(Area::new(0, 0, 3, 2)));

        // Same orientation class: no movement needed
        assert!(inv.rotate_item(ItemId(1), Rotation::Clockwise).unwrap());
        assert_eq!(inv.item(ItemId(1)).unwrap().rotation(), Rotation::Clockwise);

        assert!(inv.rotate_item(ItemId(1), Rotation::None).unwrap());
        assert_eq!(inv.item(ItemId(1)).unwrap().footprint(), Some(Area::new(0, 0, 2, 3)));
        inv.verify_integrity().unwrap();
    }

    #[test]
    fn test_rotate_requires_grid_item() {
        let mut inv = GridInventory::with_config(
            InventoryConfig::grid(2, 2).with_slot(crate::config::SlotConfig::new("hand")),
        );
        inv.equip(item(1, 1, 2), 0, true).unwrap();

        assert_eq!(
            inv.rotate_item(ItemId(1), Rotation::Clockwise).unwrap_err(),
            InventoryError::NotStored(ItemId(1))
        );
    }
}
