//! Normalized input events and the pointer state they drive.
//!
//! The embedder scales display coordinates into sim space before pushing
//! events; the engine only ever sees cell coordinates.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    /// Paints the selected element.
    Primary,
    /// Erases.
    Secondary,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown { button: PointerButton, x: i32, y: i32 },
    PointerUp { button: PointerButton },
    PointerMove { x: i32, y: i32 },
    Wheel { delta: f64 },
}

/// Pointer state folded out of the event stream.
pub(crate) struct PointerState {
    pub cursor: Option<(i32, i32)>,
    pub painting: bool,
    pub erasing: bool,
}

impl PointerState {
    pub fn new() -> PointerState {
        PointerState {
            cursor: None,
            painting: false,
            erasing: false,
        }
    }

    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { button, x, y } => {
                self.cursor = Some((x, y));
                match button {
                    PointerButton::Primary => self.painting = true,
                    PointerButton::Secondary => self.erasing = true,
                }
            }
            InputEvent::PointerUp { button } => match button {
                PointerButton::Primary => self.painting = false,
                PointerButton::Secondary => self.erasing = false,
            },
            InputEvent::PointerMove { x, y } => self.cursor = Some((x, y)),
            InputEvent::Wheel { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_state_tracks_buttons_and_cursor() {
        let mut state = PointerState::new();
        assert_eq!(state.cursor, None);

        state.apply(InputEvent::PointerDown {
            button: PointerButton::Primary,
            x: 3,
            y: 4,
        });
        assert!(state.painting);
        assert_eq!(state.cursor, Some((3, 4)));

        state.apply(InputEvent::PointerMove { x: 5, y: 6 });
        assert_eq!(state.cursor, Some((5, 6)));
        assert!(state.painting);

        state.apply(InputEvent::PointerUp {
            button: PointerButton::Primary,
        });
        assert!(!state.painting);

        state.apply(InputEvent::PointerDown {
            button: PointerButton::Secondary,
            x: 0,
            y: 0,
        });
        assert!(state.erasing);
        assert!(!state.painting);
    }
}
