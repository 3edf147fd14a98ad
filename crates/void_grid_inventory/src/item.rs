//! Placeable items and grid geometry

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique item identifier
///
/// Identities are allocated by the host; the inventory only tracks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// Socket type identifier shared by socketed hosts and socketables
pub type SocketKind = u32;

/// Rotation state of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    /// Natural orientation
    None,
    /// Rotated 90 degrees clockwise
    Clockwise,
    /// Rotated 90 degrees counter-clockwise
    CounterClockwise,
}

impl Default for Rotation {
    fn default() -> Self {
        Self::None
    }
}

impl Rotation {
    /// Whether width and height are swapped
    pub fn is_rotated(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// A rectangle of grid cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Area {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Area {
    /// Create a new area
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self { x, y, width, height }
    }

    /// Exclusive right edge (saturates at `usize::MAX`)
    pub fn right(&self) -> usize {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge (saturates at `usize::MAX`)
    pub fn bottom(&self) -> usize {
        self.y.saturating_add(self.height)
    }

    /// Check if a cell lies inside this area
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check if two areas share at least one cell
    pub fn intersects(&self, other: &Area) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Iterate all cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let area = *self;
        (area.y..area.bottom()).flat_map(move |y| (area.x..area.right()).map(move |x| (x, y)))
    }
}

/// Where an item currently lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    /// Held by the caller (dragged, dropped, freshly created)
    Unplaced,
    /// Stored in the grid with its top-left cell at (x, y)
    Stored { x: usize, y: usize },
    /// Held by an equipment slot
    Equipped { slot: usize },
}

impl Default for Placement {
    fn default() -> Self {
        Self::Unplaced
    }
}

/// A concrete storage location inside one inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    /// Grid cell of the item's top-left corner
    Grid { x: usize, y: usize },
    /// Equipment slot index
    Equipment(usize),
}

impl Placement {
    /// The location, if the item is placed
    pub fn location(&self) -> Option<Location> {
        match *self {
            Self::Unplaced => None,
            Self::Stored { x, y } => Some(Location::Grid { x, y }),
            Self::Equipped { slot } => Some(Location::Equipment(slot)),
        }
    }
}

impl From<Location> for Placement {
    fn from(location: Location) -> Self {
        match location {
            Location::Grid { x, y } => Self::Stored { x, y },
            Location::Equipment(slot) => Self::Equipped { slot },
        }
    }
}

/// Socket array carried by a socketed item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sockets {
    /// Socket type accepted by this host
    pub kind: SocketKind,
    /// Socket contents (None = empty socket)
    pub slots: Vec<Option<Item>>,
}

impl Sockets {
    /// Create an empty socket array
    pub fn new(kind: SocketKind, count: usize) -> Self {
        Self {
            kind,
            slots: vec![None; count],
        }
    }

    /// Index of the first empty socket
    pub fn first_empty(&self) -> Option<usize> {
        self.slots.iter().position(|s| s.is_none())
    }

    /// Number of empty sockets
    pub fn empty_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    /// Attached items
    pub fn attached(&self) -> impl Iterator<Item = &Item> {
        self.slots.iter().filter_map(|s| s.as_ref())
    }
}

/// A placeable item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identity
    pub id: ItemId,
    /// Display name
    pub name: String,
    /// Type tag used by equipment slot filters
    pub kind: Option<String>,
    /// Unrotated width in cells
    width: usize,
    /// Unrotated height in cells
    height: usize,
    /// Current rotation
    rotation: Rotation,
    /// Stack identity (items only merge when these match)
    pub stack_id: Option<String>,
    /// Units in this stack
    pub stack_count: u32,
    /// Maximum units per stack (1 = not stackable)
    pub max_stack: u32,
    /// Socket type this item can be attached into
    pub socketable: Option<SocketKind>,
    /// Sockets this item provides
    pub sockets: Option<Sockets>,
    /// Current placement
    placement: Placement,
}

impl Item {
    /// Create a new single, unplaced item
    pub fn new(id: ItemId, width: usize, height: usize) -> Self {
        Self {
            id,
            name: String::new(),
            kind: None,
            width: width.max(1),
            height: height.max(1),
            rotation: Rotation::None,
            stack_id: None,
            stack_count: 1,
            max_stack: 1,
            socketable: None,
            sockets: None,
            placement: Placement::Unplaced,
        }
    }

    /// Set display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set type tag
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Make stackable
    pub fn with_stack(mut self, stack_id: impl Into<String>, count: u32, max: u32) -> Self {
        self.stack_id = Some(stack_id.into());
        self.max_stack = max.max(1);
        self.stack_count = count.clamp(1, self.max_stack);
        self
    }

    /// Make attachable into hosts of the given socket kind
    pub fn with_socketable(mut self, kind: SocketKind) -> Self {
        self.socketable = Some(kind);
        self
    }

    /// Give this item `count` empty sockets of the given kind
    pub fn with_sockets(mut self, kind: SocketKind, count: usize) -> Self {
        self.sockets = Some(Sockets::new(kind, count));
        self
    }

    /// Set initial rotation
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Unrotated dimensions
    pub fn base_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Effective width for the current rotation
    pub fn cell_width(&self) -> usize {
        if self.rotation.is_rotated() {
            self.height
        } else {
            self.width
        }
    }

    /// Effective height for the current rotation
    pub fn cell_height(&self) -> usize {
        if self.rotation.is_rotated() {
            self.width
        } else {
            self.height
        }
    }

    /// Current rotation
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Whether width and height are currently swapped
    pub fn is_rotated(&self) -> bool {
        self.rotation.is_rotated()
    }

    /// Current placement
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Whether the item is stored in a grid
    pub fn is_stored(&self) -> bool {
        matches!(self.placement, Placement::Stored { .. })
    }

    /// Whether the item is held by an equipment slot
    pub fn is_equipped(&self) -> bool {
        matches!(self.placement, Placement::Equipped { .. })
    }

    /// Footprint of this item if its top-left cell were at (x, y)
    pub fn footprint_at(&self, x: usize, y: usize) -> Area {
        Area::new(x, y, self.cell_width(), self.cell_height())
    }

    /// Current grid footprint, if stored
    pub fn footprint(&self) -> Option<Area> {
        match self.placement {
            Placement::Stored { x, y } => Some(self.footprint_at(x, y)),
            _ => None,
        }
    }

    /// Whether this item can hold more than one unit
    pub fn is_stackable(&self) -> bool {
        self.max_stack > 1
    }

    /// Units that can still be added to this stack
    pub fn stack_space(&self) -> u32 {
        self.max_stack.saturating_sub(self.stack_count)
    }

    pub(crate) fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub(crate) fn set_placement(&mut self, placement: Placement) {
        self.placement = placement;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_defaults() {
        let item = Item::new(ItemId(1), 0, 3);

        assert_eq!(item.base_size(), (1, 3));
        assert_eq!(item.placement(), Placement::Unplaced);
        assert!(!item.is_stackable());
        assert_eq!(item.stack_count, 1);
    }

    #[test]
    fn test_rotation_swaps_dimensions() {
        let mut item = Item::new(ItemId(1), 1, 3);
        assert_eq!((item.cell_width(), item.cell_height()), (1, 3));

        item.set_rotation(Rotation::Clockwise);
        assert_eq!((item.cell_width(), item.cell_height()), (3, 1));
        assert_eq!(item.base_size(), (1, 3));

        item.set_rotation(Rotation::CounterClockwise);
        assert_eq!((item.cell_width(), item.cell_height()), (3, 1));
    }

    #[test]
    fn test_stack_builder_clamps() {
        let item = Item::new(ItemId(1), 1, 1).with_stack("potion", 25, 10);
        assert_eq!(item.stack_count, 10);
        assert_eq!(item.stack_space(), 0);
        assert!(item.is_stackable());
    }

    #[test]
    fn test_area_intersection() {
        let a = Area::new(0, 0, 2, 2);
        assert!(a.intersects(&Area::new(1, 1, 2, 2)));
        assert!(!a.intersects(&Area::new(2, 0, 1, 1)));
        assert!(a.contains(1, 1));
        assert!(!a.contains(2, 1));
        assert_eq!(a.cells().count(), 4);
    }

    #[test]
    fn test_sockets_first_empty() {
        let mut sockets = Sockets::new(7, 2);
        assert_eq!(sockets.first_empty(), Some(0));

        sockets.slots[0] = Some(Item::new(ItemId(9), 1, 1));
        assert_eq!(sockets.first_empty(), Some(1));
        assert_eq!(sockets.empty_count(), 1);
        assert_eq!(sockets.attached().count(), 1);
    }
}
