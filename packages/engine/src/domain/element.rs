//! Element definitions - the immutable species table.
//!
//! An element describes a kind of matter (density, colors, movement
//! category); cells hold a reference to one by id. Everything mutable lives
//! on the particle, everything shared lives here.

use serde::Serialize;

use crate::core::color::Rgba;

pub type ElementId = u16;

/// Reserved empty element: air. Movable, density zero.
pub const EMPTY: ElementId = 0;

/// First id a data file may define; 1..=9 stay reserved for technical slots.
pub const FIRST_USER_ID: ElementId = 10;

/// Coarse behavior class. Selects the movement handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Technical = 0,
    Solid = 1,
    Liquid = 2,
    Gas = 3,
    Sand = 4,
    Electronic = 5,
}

impl Category {
    /// Parse the plural spelling used by `elements.data`.
    pub fn parse(text: &str) -> Option<Category> {
        match text {
            "solids" => Some(Category::Solid),
            "liquids" => Some(Category::Liquid),
            "gases" => Some(Category::Gas),
            "sands" => Some(Category::Sand),
            "electronics" => Some(Category::Electronic),
            _ => None,
        }
    }
}

/// Physical phase. `Virtual` is reserved for the technical elements and is
/// not spellable in data files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Virtual = -1,
    Solid = 0,
    Liquid = 1,
    Gas = 2,
    Plasma = 3,
}

impl Phase {
    pub fn parse(text: &str) -> Option<Phase> {
        match text {
            "solid" => Some(Phase::Solid),
            "liquid" => Some(Phase::Liquid),
            "gas" => Some(Phase::Gas),
            "plasma" => Some(Phase::Plasma),
            _ => None,
        }
    }
}

pub const MIN_REPOSE_ANGLE: u8 = 10;
pub const MAX_REPOSE_ANGLE: u8 = 80;

/// Immutable element data.
#[derive(Clone, Debug)]
pub struct Element {
    pub id: ElementId,
    pub name: String,
    pub category: Category,
    pub phase: Phase,
    pub is_movable: bool,
    pub density: f32,
    pub base_color: Rgba,
    pub blend_color: Rgba,
    pub highlight_color: Rgba,
    pub cohesion: u8,
    /// Degrees, clamped to [10, 80].
    pub repose_angle: u8,
    /// Direction tiers derived from `repose_angle`; consulted by the sand
    /// handler, empty cost for everyone else.
    pub repose_directions: Vec<Vec<(i32, i32)>>,
}

impl Element {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ElementId,
        name: String,
        category: Category,
        phase: Phase,
        is_movable: bool,
        density: f32,
        base_color: Rgba,
        blend_color: Rgba,
        highlight_color: Rgba,
        cohesion: u8,
        repose_angle: u8,
    ) -> Element {
        let repose_angle = repose_angle.clamp(MIN_REPOSE_ANGLE, MAX_REPOSE_ANGLE);
        Element {
            id,
            name,
            category,
            phase,
            is_movable,
            density,
            base_color,
            blend_color,
            highlight_color,
            cohesion,
            repose_angle,
            repose_directions: repose_directions(repose_angle),
        }
    }

    /// The hardcoded air element injected at id 0.
    pub fn empty() -> Element {
        let air = Rgba::opaque(0x0E, 0x0E, 0x11);
        Element::new(
            EMPTY,
            "Empty".to_string(),
            Category::Technical,
            Phase::Virtual,
            true,
            0.0,
            air,
            air,
            air,
            0,
            45,
        )
    }
}

/// Direction tiers for settling granular matter, derived from the repose
/// angle. Shallow angles widen the third tier by the slope run; steep angles
/// instead deepen the diagonal step.
pub fn repose_directions(angle: u8) -> Vec<Vec<(i32, i32)>> {
    let theta = (angle.clamp(MIN_REPOSE_ANGLE, MAX_REPOSE_ANGLE) as f32).to_radians();
    if angle < 50 {
        let run = (1.0 / theta.tan()).ceil() as i32;
        vec![
            vec![(0, -1)],
            vec![(1, -1), (-1, -1)],
            vec![(run, -1), (-run, -1)],
        ]
    } else {
        let rise = theta.tan().ceil() as i32;
        vec![vec![(0, -1)], vec![(1, -rise), (-1, -rise)]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_plural_keys() {
        assert_eq!(Category::parse("sands"), Some(Category::Sand));
        assert_eq!(Category::parse("liquids"), Some(Category::Liquid));
        assert_eq!(Category::parse("gases"), Some(Category::Gas));
        assert_eq!(Category::parse("solids"), Some(Category::Solid));
        assert_eq!(Category::parse("electronics"), Some(Category::Electronic));
        assert_eq!(Category::parse("sand"), None);
        assert_eq!(Category::parse("technical"), None);
    }

    #[test]
    fn phase_parses_singular_keys() {
        assert_eq!(Phase::parse("solid"), Some(Phase::Solid));
        assert_eq!(Phase::parse("plasma"), Some(Phase::Plasma));
        assert_eq!(Phase::parse("virtual"), None);
    }

    #[test]
    fn shallow_repose_widens_third_tier() {
        // cot 30 deg = 1.732 -> run 2
        let tiers = repose_directions(30);
        assert_eq!(
            tiers,
            vec![
                vec![(0, -1)],
                vec![(1, -1), (-1, -1)],
                vec![(2, -1), (-2, -1)],
            ]
        );
    }

    #[test]
    fn forty_five_degrees_repeats_the_diagonal() {
        let tiers = repose_directions(45);
        assert_eq!(
            tiers,
            vec![
                vec![(0, -1)],
                vec![(1, -1), (-1, -1)],
                vec![(1, -1), (-1, -1)],
            ]
        );
    }

    #[test]
    fn steep_repose_deepens_the_diagonal() {
        // tan 60 deg = 1.732 -> rise 2
        let tiers = repose_directions(60);
        assert_eq!(tiers, vec![vec![(0, -1)], vec![(1, -2), (-1, -2)]]);

        // tan 80 deg = 5.67 -> rise 6
        let tiers = repose_directions(80);
        assert_eq!(tiers, vec![vec![(0, -1)], vec![(1, -6), (-1, -6)]]);
    }

    #[test]
    fn repose_angle_is_clamped_into_range() {
        let el = Element::new(
            10,
            "Dust".into(),
            Category::Sand,
            Phase::Solid,
            true,
            1.5,
            Rgba::opaque(1, 2, 3),
            Rgba::opaque(1, 2, 3),
            Rgba::opaque(1, 2, 3),
            0,
            3,
        );
        assert_eq!(el.repose_angle, MIN_REPOSE_ANGLE);

        let el = Element::new(
            10,
            "Dust".into(),
            Category::Sand,
            Phase::Solid,
            true,
            1.5,
            Rgba::opaque(1, 2, 3),
            Rgba::opaque(1, 2, 3),
            Rgba::opaque(1, 2, 3),
            0,
            90,
        );
        assert_eq!(el.repose_angle, MAX_REPOSE_ANGLE);
    }

    #[test]
    fn empty_element_is_weightless_air() {
        let empty = Element::empty();
        assert_eq!(empty.id, EMPTY);
        assert_eq!(empty.category, Category::Technical);
        assert_eq!(empty.phase, Phase::Virtual);
        assert!(empty.is_movable);
        assert_eq!(empty.density, 0.0);
        assert_eq!(empty.base_color, Rgba::opaque(0x0E, 0x0E, 0x11));
    }
}
