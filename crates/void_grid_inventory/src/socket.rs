//! Socketing: attaching one item into another item's socket array
//!
//! Once attached, a socketable item leaves grid and equipment storage and
//! is owned by its host's `Sockets`.

use crate::item::{Item, ItemId, Placement};

/// Check built-in socket compatibility.
///
/// `enabled` is the inventory-wide socketing switch. Stacks of more than
/// one unit are never socketed.
pub fn can_socket(socketable: &Item, host: &Item, enabled: bool) -> bool {
    if !enabled || socketable.id == host.id || socketable.stack_count > 1 {
        return false;
    }
    match (socketable.socketable, host.sockets.as_ref()) {
        (Some(kind), Some(sockets)) => kind == sockets.kind && sockets.first_empty().is_some(),
        _ => false,
    }
}

/// Attach into the host's first free socket.
///
/// Returns the socket index, or hands the item back if it does not fit.
pub fn attach(host: &mut Item, mut socketable: Item) -> Result<usize, Item> {
    let Some(kind) = socketable.socketable else {
        return Err(socketable);
    };
    let Some(sockets) = host.sockets.as_mut() else {
        return Err(socketable);
    };
    if sockets.kind != kind {
        return Err(socketable);
    }
    match sockets.first_empty() {
        Some(index) => {
            socketable.set_placement(Placement::Unplaced);
            sockets.slots[index] = Some(socketable);
            Ok(index)
        }
        None => Err(socketable),
    }
}

/// Detach an attached item, returning the socket it left and the item
pub fn detach(host: &mut Item, id: ItemId) -> Option<(usize, Item)> {
    let sockets = host.sockets.as_mut()?;
    let index = sockets
        .slots
        .iter()
        .position(|slot| slot.as_ref().map_or(false, |i| i.id == id))?;
    sockets.slots[index].take().map(|item| (index, item))
}
