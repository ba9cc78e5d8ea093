//! Particle - the mutable per-cell state.

use crate::core::color::Rgba;
use crate::core::rng::rand_below;
use crate::domain::element::{Category, Element, ElementId, EMPTY};

pub const DEFAULT_TEMPERATURE: f32 = 21.0;

/// One grid cell. Rebuilt in place on paint, exchanged wholesale on swap.
/// The element props the movement rules consult every tick (`density`,
/// `movable`, `category`) are cached here so the hot path never touches the
/// registry.
#[derive(Clone, Debug)]
pub struct Particle {
    pub element: ElementId,
    pub x: i32,
    pub y: i32,
    /// Flat slot index; always `y * width + x`.
    pub index: usize,
    pub color: Rgba,
    /// Reserved for velocity-based integration.
    pub velocity: (f32, f32),
    /// Reserved; seeded from the element density.
    pub mass: f32,
    pub temperature: f32,
    pub density: f32,
    pub movable: bool,
    pub category: Category,
}

impl Particle {
    /// Build a particle of `element` at (x, y). The spawn color is sampled
    /// between base and highlight at one of six evenly spaced steps.
    pub fn spawn(element: &Element, x: i32, y: i32, index: usize, rng: &mut u32) -> Particle {
        let t = rand_below(rng, 6) as f32 / 5.0;
        Particle {
            element: element.id,
            x,
            y,
            index,
            color: element.base_color.lerp(element.highlight_color, t),
            velocity: (0.0, 0.0),
            mass: element.density,
            temperature: DEFAULT_TEMPERATURE,
            density: element.density,
            movable: element.is_movable,
            category: element.category,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.element == EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::seed_nonzero;

    #[test]
    fn spawn_copies_element_props_and_defaults() {
        let el = Element::empty();
        let mut rng = seed_nonzero(5);
        let p = Particle::spawn(&el, 3, 4, 43, &mut rng);
        assert_eq!(p.element, EMPTY);
        assert_eq!((p.x, p.y, p.index), (3, 4, 43));
        assert_eq!(p.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(p.velocity, (0.0, 0.0));
        assert_eq!(p.density, 0.0);
        assert!(p.movable);
        assert!(p.is_empty());
    }

    #[test]
    fn spawn_color_is_between_base_and_highlight() {
        let mut el = Element::empty();
        el.base_color = Rgba::opaque(0, 0, 0);
        el.highlight_color = Rgba::opaque(250, 250, 250);
        let mut rng = seed_nonzero(11);
        for _ in 0..50 {
            let p = Particle::spawn(&el, 0, 0, 0, &mut rng);
            // six steps of 50 each
            assert_eq!(p.color.r % 50, 0);
            assert!(p.color.r <= 250);
        }
    }
}
