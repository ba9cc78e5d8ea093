//! SandBehavior - repose-angle settling with lateral jitter.

use super::{Behavior, UpdateContext};

pub struct SandBehavior;

impl SandBehavior {
    pub fn new() -> Self {
        Self
    }
}

impl Behavior for SandBehavior {
    fn update(&self, ctx: &mut UpdateContext) -> Option<usize> {
        let element = ctx.grid.cell(ctx.index).element;
        let elements = ctx.elements;
        let el = elements.get(element)?;
        ctx.grid
            .try_move(ctx.index, &el.repose_directions, true, true, true, ctx.rng)
    }
}
