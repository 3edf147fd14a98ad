//! Grid cell storage
//!
//! A fixed-size, row-major array mapping each occupied cell to the item
//! covering it. All bounds and footprint checks for the inventory live
//! here; the placement engine only writes after a query came back empty.

use crate::item::{Area, ItemId};

/// Fixed-size 2D cell array
#[derive(Debug, Clone, Default)]
pub struct GridStore {
    width: usize,
    height: usize,
    /// Row-major cell contents (index = y * width + x)
    cells: Vec<Option<ItemId>>,
}

impl GridStore {
    /// Create an empty grid. Either dimension may be zero (no grid).
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Check that a cell lies inside the grid
    pub fn contains_cell(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Check that a whole area lies inside the grid
    pub fn contains_area(&self, area: &Area) -> bool {
        let fits = |start: usize, len: usize, limit: usize| {
            len > 0 && start.checked_add(len).map_or(false, |end| end <= limit)
        };
        fits(area.x, area.width, self.width) && fits(area.y, area.height, self.height)
    }

    /// Item covering a cell (None if empty or out of bounds)
    pub fn cell(&self, x: usize, y: usize) -> Option<ItemId> {
        if !self.contains_cell(x, y) {
            return None;
        }
        self.cells[self.index(x, y)]
    }

    /// Distinct items intersecting an area, in row-major order of first hit.
    ///
    /// Items listed in `exclude` are skipped. Returns `None` when the area
    /// is not fully inside the grid.
    pub fn query(&self, area: Area, exclude: &[ItemId]) -> Option<Vec<ItemId>> {
        if !self.contains_area(&area) {
            return None;
        }
        let mut found = Vec::new();
        for (x, y) in area.cells() {
            if let Some(id) = self.cells[self.index(x, y)] {
                if !found.contains(&id) && !exclude.contains(&id) {
                    found.push(id);
                }
            }
        }
        Some(found)
    }

    /// True iff the area is inside the grid and holds no items
    pub fn is_empty_region(&self, area: Area, exclude: &[ItemId]) -> bool {
        matches!(self.query(area, exclude), Some(items) if items.is_empty())
    }

    /// Write an item into every cell of its footprint.
    ///
    /// The caller guarantees the area is in bounds and was empty.
    pub fn place(&mut self, id: ItemId, area: Area) {
        debug_assert!(self.contains_area(&area));
        for (x, y) in area.cells() {
            let index = self.index(x, y);
            self.cells[index] = Some(id);
        }
    }

    /// Clear every cell of a footprint
    pub fn unplace(&mut self, area: Area) {
        for (x, y) in area.cells() {
            if self.contains_cell(x, y) {
                let index = self.index(x, y);
                self.cells[index] = None;
            }
        }
    }

    /// Distinct items in the whole grid, row-major order of first cell
    pub fn items(&self) -> Vec<ItemId> {
        let mut found = Vec::new();
        for id in self.cells.iter().flatten() {
            if !found.contains(id) {
                found.push(*id);
            }
        }
        found
    }

    /// Number of occupied cells
    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Replace the storage with an empty grid of the new size.
    ///
    /// Returns the items that were contained; the caller is responsible
    /// for giving each of them full drop semantics.
    pub fn resize(&mut self, width: usize, height: usize) -> Vec<ItemId> {
        let evicted = self.items();
        self.width = width;
        self.height = height;
        self.cells = vec![None; width * height];
        evicted
    }

    /// Cells covered by an item, used for integrity checks
    pub(crate) fn cells_of(&self, id: ItemId) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.cells[self.index(x, y)] == Some(id) {
                    cells.push((x, y));
                }
            }
        }
        cells
    }
}
