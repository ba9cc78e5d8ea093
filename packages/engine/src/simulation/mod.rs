//! Simulation - the fixed-timestep engine loop and the liquid equaliser.

mod engine;
mod equalise;
mod input;

pub use engine::{Engine, MAX_SUBSTEPS_PER_FRAME};
pub use equalise::{collect_equalisation_groups, equalise, EqualisationGroup, MIN_GROUP_SIZE};
pub use input::{InputEvent, PointerButton};
