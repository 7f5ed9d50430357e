use std::collections::HashSet;

/// Mouse buttons the engine distinguishes.  Backends map their own button
/// enums onto this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Source of the current absolute mouse position.
///
/// Widgets query this on demand (wheel hit-testing, drag tracking).  `None`
/// means the host cannot report the mouse right now (the cursor left the
/// window, or focus was lost) and an ongoing drag must be released.
pub trait MouseSource {
    fn mouse_position(&self) -> Option<(i32, i32)>;
}

/// Pointer state fed by the windowing backend.  Widgets read the cursor
/// through [`MouseSource`]; the held buttons let the backend drop releases
/// whose press it never delivered.
#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<MouseButton>,
    /// `None` until the first cursor event, and again after the cursor
    /// leaves the window.
    cursor: Option<(f64, f64)>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.held.insert(button);
        } else {
            self.held.remove(&button);
        }
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.held.contains(&button)
    }

    /// Records a cursor position in window pixels.
    pub fn set_mouse_position(&mut self, x: f64, y: f64) {
        self.cursor = Some((x, y));
    }

    /// The cursor left the window: no position until the next
    /// `set_mouse_position`, and held buttons are forgotten.
    pub fn clear_mouse_position(&mut self) {
        self.cursor = None;
        self.held.clear();
    }

    pub fn cursor(&self) -> Option<(f64, f64)> {
        self.cursor
    }
}

impl MouseSource for InputState {
    fn mouse_position(&self) -> Option<(i32, i32)> {
        self.cursor
            .map(|(x, y)| (x.floor() as i32, y.floor() as i32))
    }
}
