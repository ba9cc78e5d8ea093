//! Granula Engine - a falling-sand cellular automaton
//!
//! A dense grid of particles is advanced on a fixed timestep by
//! category-specific movement rules (sands, liquids, gases), driven by user
//! painting. Element data comes from a block-structured text file; the
//! engine exposes a raw RGBA frame, a paint contract and a tick contract,
//! and leaves windowing, input capture and presentation to the embedder.
//!
//! Architecture:
//! - core/        - RNG and color primitives
//! - domain/      - element registry, loaders, settings
//! - grid/        - dense cell storage, dirty set, movement primitive
//! - behaviors/   - per-category movement rules
//! - simulation/  - fixed-timestep scheduler and liquid equalisation
//! - render/      - framebuffer compositor and brush outline
//! - api/         - embedding facade (wasm32)

pub mod behaviors;
pub mod core;
pub mod domain;
pub mod grid;
pub mod render;
pub mod simulation;

#[cfg(target_arch = "wasm32")]
pub mod api;

#[cfg(test)]
pub(crate) mod testutil;

pub use crate::core::color::Rgba;
pub use crate::domain::element::{Category, Element, ElementId, Phase, EMPTY};
pub use crate::domain::registry::ElementRegistry;
pub use crate::domain::settings::Settings;
pub use crate::grid::{Grid, Particle};
pub use crate::render::OverlayPixel;
pub use crate::simulation::{Engine, InputEvent, PointerButton};
