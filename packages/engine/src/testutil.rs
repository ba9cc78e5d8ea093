//! Shared fixtures for unit tests.

use crate::domain::registry::ElementRegistry;
use crate::domain::settings::Settings;

/// A small element table covering every category.
///
/// 10 Sand (2.0, repose 45), 11 Water (1.0), 12 Stone (immovable 5.0),
/// 13 Steam (-0.5), 14 Oil (0.8), 15 Copper (electronic, immovable),
/// 16 Smoke (0.4).
pub fn test_registry() -> ElementRegistry {
    ElementRegistry::from_data_text(TEST_ELEMENTS)
}

/// Settings for a `w` x `h` test world with a 25 ms physics step.
pub fn test_settings(w: u32, h: u32) -> Settings {
    Settings {
        width: w,
        height: h,
        ..Settings::default()
    }
}

pub const TEST_ELEMENTS: &str = "\
[10]
name: Sand
category: sands
phase: solid
base_color: #E7C678
blend_color: #D9B15C
highlight_color: #F4E3A7
is_movable: true
density: 2.0
cohesion: 2
repose_angle: 45

[11]
name: Water
category: liquids
phase: liquid
base_color: #2E66C9
blend_color: #3A79DE
highlight_color: #7FB3F2
is_movable: true
density: 1.0
cohesion: 1
repose_angle: 10

[12]
name: Stone
category: solids
phase: solid
base_color: #6E6E76
blend_color: #5B5B63
highlight_color: #8A8A93
is_movable: false
density: 5.0
cohesion: 8
repose_angle: 80

[13]
name: Steam
category: gases
phase: gas
base_color: #C9D4DE
blend_color: #B4C2CF
highlight_color: #E8EFF5
is_movable: true
density: -0.5
cohesion: 0
repose_angle: 45

[14]
name: Oil
category: liquids
phase: liquid
base_color: #4A3B2A
blend_color: #3C2F20
highlight_color: #6B543A
is_movable: true
density: 0.8
cohesion: 1
repose_angle: 10

[15]
name: Copper
category: electronics
phase: solid
base_color: #C26E3A
blend_color: #A85A2C
highlight_color: #E08B50
is_movable: false
density: 4.5
cohesion: 8
repose_angle: 80

[16]
name: Smoke
category: gases
phase: gas
base_color: #3A3A40
blend_color: #2E2E33
highlight_color: #55555C
is_movable: true
density: 0.4
cohesion: 0
repose_angle: 45
";
