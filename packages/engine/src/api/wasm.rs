//! WASM bindings - zero-copy frame access plus normalized input entry
//! points for a browser host.
//!
//! The host owns the canvas and the animation loop: it forwards pointer and
//! wheel events in sim-space coordinates, calls `tick(performance.now())`
//! every frame, and blits the frame bytes straight out of linear memory via
//! `frame_ptr`/`frame_len`.

use wasm_bindgen::prelude::*;

use crate::domain::registry::ElementRegistry;
use crate::domain::settings::Settings;
use crate::simulation::{Engine, InputEvent, PointerButton};

/// Install the panic hook so engine panics surface in the console.
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Engine version, for the host's about box.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// The simulation world as seen from JavaScript.
#[wasm_bindgen]
pub struct World {
    engine: Engine,
}

#[wasm_bindgen]
impl World {
    /// Build a world from the two data-file texts (the host fetches them).
    #[wasm_bindgen(constructor)]
    pub fn new(settings_text: &str, elements_text: &str) -> World {
        let settings = Settings::from_data_text(settings_text);
        let elements = ElementRegistry::from_data_text(elements_text);
        World {
            engine: Engine::new(settings, elements),
        }
    }

    pub fn start(&mut self) {
        self.engine.start();
    }

    pub fn stop(&mut self) {
        self.engine.stop();
    }

    pub fn clear(&mut self) {
        self.engine.clear();
    }

    /// One frame; `now_ms` is the host's monotonic clock.
    pub fn tick(&mut self, now_ms: f64) {
        self.engine.tick(now_ms);
    }

    /// Pointer to the composed RGBA8 frame in linear memory.
    pub fn frame_ptr(&self) -> *const u8 {
        self.engine.take_frame().as_ptr()
    }

    pub fn frame_len(&self) -> usize {
        self.engine.take_frame().len()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.engine.width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.engine.height()
    }

    #[wasm_bindgen(getter)]
    pub fn tick_count(&self) -> u64 {
        self.engine.tick_count()
    }

    #[wasm_bindgen(getter)]
    pub fn particle_count(&self) -> u32 {
        self.engine.particle_count()
    }

    pub fn fps(&self) -> f64 {
        self.engine.fps()
    }

    pub fn tps(&self) -> f64 {
        self.engine.tps()
    }

    /// Element table as JSON for building the palette UI.
    pub fn manifest_json(&self) -> String {
        self.engine.elements().manifest_json()
    }

    pub fn set_selected_element(&mut self, id: u16) {
        self.engine.set_selected_element(id);
    }

    pub fn selected_element(&self) -> u16 {
        self.engine.selected_element()
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.engine.set_brush_size(size);
    }

    pub fn paint_circle(&mut self, x: i32, y: i32, radius: i32, id: u16) {
        self.engine.paint_circle(x, y, radius, id);
    }

    pub fn erase_circle(&mut self, x: i32, y: i32, radius: i32) {
        self.engine.erase_circle(x, y, radius);
    }

    /// `button` 0 paints, anything else erases.
    pub fn pointer_down(&mut self, button: u8, x: i32, y: i32) {
        self.engine.push_input(InputEvent::PointerDown {
            button: map_button(button),
            x,
            y,
        });
    }

    pub fn pointer_up(&mut self, button: u8) {
        self.engine.push_input(InputEvent::PointerUp {
            button: map_button(button),
        });
    }

    pub fn pointer_move(&mut self, x: i32, y: i32) {
        self.engine.push_input(InputEvent::PointerMove { x, y });
    }

    pub fn wheel(&mut self, delta: f64) {
        self.engine.push_input(InputEvent::Wheel { delta });
    }
}

fn map_button(button: u8) -> PointerButton {
    if button == 0 {
        PointerButton::Primary
    } else {
        PointerButton::Secondary
    }
}
