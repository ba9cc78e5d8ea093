//! Movement - the slot swap and the tiered `try_move` primitive.

use crate::core::rng::{coin, shuffle};

use super::Grid;

impl Grid {
    /// Exchange two slots. Both particles keep their identity but adopt the
    /// other slot's `(position, index)`.
    pub fn swap(&mut self, a: usize, b: usize, mark_dirty: bool, include_neighbors: bool) {
        let len = self.cells.len();
        debug_assert!(a < len && b < len, "swap out of range: {} {}", a, b);
        if a == b || a >= len || b >= len {
            return;
        }
        self.cells.swap(a, b);
        for index in [a, b] {
            let p = &mut self.cells[index];
            p.index = index;
            p.x = index as i32 % self.width;
            p.y = index as i32 / self.width;
        }
        if mark_dirty {
            self.mark_dirty(a, include_neighbors);
            self.mark_dirty(b, include_neighbors);
        }
    }

    /// Tiered movement for the particle in slot `index`.
    ///
    /// Tiers are tried in order; a later tier is consulted only when every
    /// candidate of the earlier ones failed. Offsets within a tier run in a
    /// freshly shuffled order each call, and `bump_x` flips a candidate's dx
    /// on a coin toss for lateral jitter. A candidate succeeds when the
    /// target cell is movable and strictly less dense than the mover; that
    /// swap condition is the only selection rule. Returns the mover's new
    /// flat index.
    pub fn try_move<G: AsRef<[(i32, i32)]>>(
        &mut self,
        index: usize,
        direction_groups: &[G],
        bump_x: bool,
        mark_dirty: bool,
        include_neighbors: bool,
        rng: &mut u32,
    ) -> Option<usize> {
        let (px, py, density) = {
            let p = self.cell(index);
            (p.x, p.y, p.density)
        };

        let mut order: Vec<(i32, i32)> = Vec::with_capacity(4);
        for tier in direction_groups {
            order.clear();
            order.extend_from_slice(tier.as_ref());
            shuffle(rng, &mut order);

            for i in 0..order.len() {
                let (mut dx, dy) = order[i];
                if bump_x && coin(rng) {
                    dx = -dx;
                }
                let (tx, ty) = (px + dx, py + dy);
                if !self.in_bounds(tx, ty) {
                    continue;
                }
                let target_index = self.index_of(tx, ty);
                let target = &self.cells[target_index];
                if target.movable && density > target.density {
                    self.swap(index, target_index, mark_dirty, include_neighbors);
                    return Some(target_index);
                }
            }
        }
        None
    }
}
