//! Rendering - framebuffer composition and the brush outline.
//!
//! Physics runs y-up everywhere; this module is the only place that flips
//! into top-left image space.

mod compositor;
mod outline;

pub use compositor::{Compositor, OverlayPixel};
pub use outline::circle_outline;
