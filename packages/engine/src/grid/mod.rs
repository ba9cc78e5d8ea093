//! Grid - dense cell storage, neighborhood queries and the dirty set.
//!
//! Every flat index in `0..W*H` holds exactly one particle; empty cells are
//! particles of the reserved air element. Sim-space y points up; nothing in
//! here knows about image space.

mod index_set;
mod moves;
mod particle;

pub use index_set::IndexSet;
pub use particle::{Particle, DEFAULT_TEMPERATURE};

use std::sync::Arc;

use crate::domain::element::{Category, Element, ElementId, EMPTY};
use crate::domain::registry::ElementRegistry;

/// Offsets of the full 8-neighborhood.
pub const MOORE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Particle>,
    dirty: IndexSet,
    particle_count: u32,
    elements: Arc<ElementRegistry>,
}

impl Grid {
    /// Create a grid of air cells sharing `elements`.
    pub fn new(width: u32, height: u32, elements: Arc<ElementRegistry>) -> Grid {
        let width = width as i32;
        let height = height as i32;
        let size = (width * height) as usize;

        // Air has identical base and highlight colors, so the sampling seed
        // here is inert.
        let empty = elements
            .get(EMPTY)
            .cloned()
            .unwrap_or_else(Element::empty);
        let mut seed = 1;
        let mut cells = Vec::with_capacity(size);
        for index in 0..size {
            let x = index as i32 % width.max(1);
            let y = index as i32 / width.max(1);
            cells.push(Particle::spawn(&empty, x, y, index, &mut seed));
        }

        Grid {
            width,
            height,
            cells,
            dirty: IndexSet::new(size),
            particle_count: 0,
            elements,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Non-empty cells.
    pub fn particle_count(&self) -> u32 {
        self.particle_count
    }

    pub fn elements(&self) -> &ElementRegistry {
        &self.elements
    }

    pub fn elements_arc(&self) -> Arc<ElementRegistry> {
        Arc::clone(&self.elements)
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    #[inline]
    pub fn index_of(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Particle> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index_of(x, y)])
        } else {
            None
        }
    }

    /// Direct slot access; `index` must be in range.
    #[inline]
    pub fn cell(&self, index: usize) -> &Particle {
        &self.cells[index]
    }

    pub(crate) fn cells(&self) -> &[Particle] {
        &self.cells
    }

    /// The particle at `(dx, dy)` relative to the particle in slot `index`.
    pub fn neighbor(&self, index: usize, dx: i32, dy: i32) -> Option<&Particle> {
        let p = self.cell(index);
        self.get(p.x + dx, p.y + dy)
    }

    /// Map `offsets` to existing neighbors, AND-filtered by category and
    /// element id when given.
    pub fn neighbors(
        &self,
        index: usize,
        offsets: &[(i32, i32)],
        category: Option<Category>,
        element: Option<ElementId>,
    ) -> Vec<&Particle> {
        offsets
            .iter()
            .filter_map(|&(dx, dy)| self.neighbor(index, dx, dy))
            .filter(|p| category.map_or(true, |c| p.category == c))
            .filter(|p| element.map_or(true, |e| p.element == e))
            .collect()
    }

    /// Add `index` to the dirty set, optionally together with its existing
    /// 8-neighborhood.
    pub fn mark_dirty(&mut self, index: usize, include_neighbors: bool) {
        debug_assert!(index < self.cells.len(), "dirty index {} out of range", index);
        if index >= self.cells.len() {
            return;
        }
        self.dirty.insert(index);
        if include_neighbors {
            let (x, y) = (self.cells[index].x, self.cells[index].y);
            for (dx, dy) in MOORE_OFFSETS {
                let (nx, ny) = (x + dx, y + dy);
                if self.in_bounds(nx, ny) {
                    self.dirty.insert(self.index_of(nx, ny));
                }
            }
        }
    }

    pub fn dirty(&self) -> &IndexSet {
        &self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    /// Rebuild the cell at (x, y) as a fresh particle of `element`. Returns
    /// false only when out of bounds; an unknown element id degrades to a
    /// no-op.
    pub fn create_at(
        &mut self,
        x: i32,
        y: i32,
        element: ElementId,
        mark_dirty: bool,
        include_neighbors: bool,
        rng: &mut u32,
    ) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let index = self.index_of(x, y);
        let Some(el) = self.elements.get(element) else {
            debug_assert!(false, "create_at: unknown element {}", element);
            return false;
        };
        let was_empty = self.cells[index].is_empty();
        self.cells[index] = Particle::spawn(el, x, y, index, rng);

        if was_empty && element != EMPTY {
            self.particle_count += 1;
        } else if !was_empty && element == EMPTY {
            self.particle_count -= 1;
        }
        if mark_dirty {
            self.mark_dirty(index, include_neighbors);
        }
        true
    }

    /// Disc brush. A non-zero element paints only onto air, so strokes stack
    /// without destroying the scene; erasing (id 0) overwrites anything.
    pub fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, element: ElementId, rng: &mut u32) {
        let r = r.max(0);
        let r2 = r * r;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy > r2 {
                    continue;
                }
                let (px, py) = (cx + dx, cy + dy);
                if !self.in_bounds(px, py) {
                    continue;
                }
                if element != EMPTY && !self.cells[self.index_of(px, py)].is_empty() {
                    continue;
                }
                self.create_at(px, py, element, true, true, rng);
            }
        }
    }

    /// Reset every cell to air.
    pub fn reset(&mut self) {
        let empty = self
            .elements
            .get(EMPTY)
            .cloned()
            .unwrap_or_else(Element::empty);
        let mut seed = 1;
        for index in 0..self.cells.len() {
            let (x, y) = (self.cells[index].x, self.cells[index].y);
            self.cells[index] = Particle::spawn(&empty, x, y, index, &mut seed);
        }
        self.particle_count = 0;
        self.dirty.clear();
    }
}
