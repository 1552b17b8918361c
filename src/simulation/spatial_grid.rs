//! Uniform grid for neighbour lookups
//!
//! Agents are bucketed by quantised position. Entries are agent indices into
//! the world's agent list and are kept up to date as positions are committed
//! during a tick.

use std::collections::HashMap;

use super::geometry::Position;

type Cell = (i32, i32);

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<Cell, Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: if cell_size.is_finite() { cell_size.max(1.0) } else { 1.0 },
            cells: HashMap::new(),
        }
    }

    fn cell_of(&self, position: &Position) -> Cell {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    pub fn insert(&mut self, index: usize, position: &Position) {
        let cell = self.cell_of(position);
        self.cells.entry(cell).or_default().push(index);
    }

    pub fn remove(&mut self, index: usize, position: &Position) {
        let cell = self.cell_of(position);
        if let Some(entries) = self.cells.get_mut(&cell) {
            entries.retain(|&i| i != index);
            if entries.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    pub fn relocate(&mut self, index: usize, from: &Position, to: &Position) {
        if self.cell_of(from) != self.cell_of(to) {
            self.remove(index, from);
            self.insert(index, to);
        }
    }

    /// Indices of everything bucketed within `range` of `position`, in
    /// ascending order. May include entries slightly further than `range`.
    pub fn query(&self, position: &Position, range: f32) -> Vec<usize> {
        let range = range.max(0.0);
        let (min_x, min_y) = self.cell_of(&position.offset(-range, -range));
        let (max_x, max_y) = self.cell_of(&position.offset(range, range));

        let mut found = Vec::new();
        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                if let Some(entries) = self.cells.get(&(cx, cy)) {
                    found.extend_from_slice(entries);
                }
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
