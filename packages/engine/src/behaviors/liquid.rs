//! LiquidBehavior - fall first, then slide diagonally, then flow sideways.

use super::{Behavior, UpdateContext};

/// Priority tiers: straight down, the two down diagonals, lateral flow.
const FLOW_TIERS: [&[(i32, i32)]; 3] = [&[(0, -1)], &[(-1, -1), (1, -1)], &[(-1, 0), (1, 0)]];

pub struct LiquidBehavior;

impl LiquidBehavior {
    pub fn new() -> Self {
        Self
    }
}

impl Behavior for LiquidBehavior {
    fn update(&self, ctx: &mut UpdateContext) -> Option<usize> {
        ctx.grid
            .try_move(ctx.index, &FLOW_TIERS, false, true, true, ctx.rng)
    }
}
