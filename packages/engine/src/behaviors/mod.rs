//! Behaviors - per-category movement rules.
//!
//! Each moving category implements `Behavior`; the registry dispatches on
//! the particle's cached category. Solids, electronics and technical cells
//! have no movement rule and fall through as no-ops.

mod gas;
mod liquid;
mod sand;

pub use gas::GasBehavior;
pub use liquid::LiquidBehavior;
pub use sand::SandBehavior;

use crate::domain::element::Category;
use crate::domain::registry::ElementRegistry;
use crate::grid::Grid;

/// Update context passed to behaviors.
pub struct UpdateContext<'a> {
    pub grid: &'a mut Grid,
    pub elements: &'a ElementRegistry,
    /// Flat index of the particle being updated.
    pub index: usize,
    pub rng: &'a mut u32,
}

/// Behavior trait - each moving category implements this.
pub trait Behavior {
    /// Try to move the particle at `ctx.index`; returns its new flat index
    /// when it moved.
    fn update(&self, ctx: &mut UpdateContext) -> Option<usize>;
}

/// Behavior registry - dispatch by category.
pub struct BehaviorRegistry {
    sand: SandBehavior,
    liquid: LiquidBehavior,
    gas: GasBehavior,
}

impl BehaviorRegistry {
    pub fn new() -> BehaviorRegistry {
        BehaviorRegistry {
            sand: SandBehavior::new(),
            liquid: LiquidBehavior::new(),
            gas: GasBehavior::new(),
        }
    }

    /// Dispatch update to the appropriate behavior based on category.
    pub fn update(&self, category: Category, ctx: &mut UpdateContext) -> Option<usize> {
        match category {
            Category::Sand => self.sand.update(ctx),
            Category::Liquid => self.liquid.update(ctx),
            Category::Gas => self.gas.update(ctx),
            // Solid never moves, Electronic is reserved, Technical is air.
            Category::Solid | Category::Electronic | Category::Technical => None,
        }
    }
}

impl Default for BehaviorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
