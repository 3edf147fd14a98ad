//! Periodic reconciliation with the host's item set
//!
//! The host application (scene graph, container entity, network replica)
//! owns the authoritative list of items that belong to an inventory. An
//! `AutoDetector` is polled from the host's update loop and, at the
//! configured rate, brings the inventory in line with that list. The
//! inventory lock is held for the whole pass so reconciliation never
//! interleaves with foreground operations.

use crate::config::InventoryConfig;
use crate::error::Result;
use crate::inventory::GridInventory;
use crate::item::{Item, ItemId};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Inventory shared between the foreground and a polling task
pub type SharedInventory = Arc<Mutex<GridInventory>>;

/// Wrap an inventory for sharing
pub fn shared(inventory: GridInventory) -> SharedInventory {
    Arc::new(Mutex::new(inventory))
}

/// The host-side view of which items belong to an inventory
pub trait ItemSource {
    /// Items that joined the host since the last pass
    fn take_arrivals(&mut self) -> Vec<Item>;

    /// Whether the host still lists the item
    fn is_present(&self, id: ItemId) -> bool;

    /// Receive an item the inventory dropped because the host no longer lists it
    fn release(&mut self, item: Item);

    /// Receive an arrival that did not fit
    fn dump(&mut self, item: Item);
}

/// What one reconciliation pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectReport {
    /// Resident items dropped because they left the host
    pub dropped: Vec<ItemId>,
    /// Arrivals that were picked up
    pub picked_up: Vec<ItemId>,
    /// Arrivals handed back because they did not fit
    pub dumped: Vec<ItemId>,
}

impl DetectReport {
    /// Check if the pass changed nothing
    pub fn is_empty(&self) -> bool {
        self.dropped.is_empty() && self.picked_up.is_empty() && self.dumped.is_empty()
    }
}

/// Rate-limited reconciliation driver
#[derive(Debug, Clone)]
pub struct AutoDetector {
    rate: Duration,
    next_due: Option<Instant>,
}

impl AutoDetector {
    /// Create a detector running every `rate`
    pub fn new(rate: Duration) -> Self {
        Self {
            rate,
            next_due: None,
        }
    }

    /// Create a detector using the configured auto-detect rate.
    ///
    /// A rate that is not a valid duration falls back to the default rate.
    pub fn from_config(config: &InventoryConfig) -> Self {
        let rate = Duration::try_from_secs_f32(config.auto_detect_rate).unwrap_or_else(|_| {
            let fallback = InventoryConfig::default().auto_detect_rate;
            warn!(
                "Invalid auto-detect rate {}, using {}s",
                config.auto_detect_rate, fallback
            );
            Duration::from_secs_f32(fallback)
        });
        Self::new(rate)
    }

    /// Interval between passes
    pub fn rate(&self) -> Duration {
        self.rate
    }

    /// Whether a pass is due at `now` (the first poll always is)
    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due.map_or(true, |due| now >= due)
    }

    /// Run a pass if one is due; `Ok(None)` when it is not yet time
    pub fn poll(
        &mut self,
        now: Instant,
        inventory: &SharedInventory,
        source: &mut dyn ItemSource,
    ) -> Result<Option<DetectReport>> {
        if !self.is_due(now) {
            return Ok(None);
        }
        self.next_due = Some(now + self.rate);

        let mut guard = inventory.lock();
        reconcile(&mut guard, source).map(Some)
    }
}

/// Run one reconciliation pass immediately.
///
/// Residents the source no longer lists are dropped (listeners may veto)
/// and released to the source. Arrivals are picked up with auto-equip
/// suppressed; arrivals that do not fit are dumped back to the source.
pub fn reconcile(inventory: &mut GridInventory, source: &mut dyn ItemSource) -> Result<DetectReport> {
    let mut report = DetectReport::default();

    let departed: Vec<ItemId> = inventory
        .all_items()
        .iter()
        .map(|item| item.id)
        .filter(|id| !source.is_present(*id))
        .collect();

    for id in departed {
        if let Some(item) = inventory.drop_item(id)? {
            report.dropped.push(id);
            source.release(item);
        } else {
            debug!("Drop of departed {} was vetoed", id);
        }
    }

    for item in source.take_arrivals() {
        let id = item.id;
        if inventory.contains(id) {
            continue;
        }
        match inventory.pickup_to_grid(item)?.into_unplaced() {
            Some(rest) => {
                report.dumped.push(id);
                source.dump(rest);
            }
            None => report.picked_up.push(id),
        }
    }

    if !report.is_empty() {
        info!(
            "Auto-detect: {} dropped, {} picked up, {} dumped",
            report.dropped.len(),
            report.picked_up.len(),
            report.dumped.len()
        );
    }
    Ok(report)
}
