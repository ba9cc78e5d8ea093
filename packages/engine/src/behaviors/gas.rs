//! GasBehavior - undirected drift.
//!
//! One neighbor is picked uniformly per update. Buoyancy is not modeled
//! head-on: a gas lighter than air cannot displace it and instead gets
//! pushed upward by denser movers falling through the cloud.

use super::{Behavior, UpdateContext};
use crate::core::rng::rand_below;
use crate::grid::MOORE_OFFSETS;

pub struct GasBehavior;

impl GasBehavior {
    pub fn new() -> Self {
        Self
    }
}

impl Behavior for GasBehavior {
    fn update(&self, ctx: &mut UpdateContext) -> Option<usize> {
        let dir = MOORE_OFFSETS[rand_below(ctx.rng, 8) as usize];
        ctx.grid
            .try_move(ctx.index, &[[dir]], false, true, true, ctx.rng)
    }
}
