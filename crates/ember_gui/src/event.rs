use ember_core::MouseButton;

/// Mouse input as seen by widgets, already converted from the windowing
/// backend.  Coordinates are window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Positive `delta_y` scrolls towards the top of the content.
    Wheel { delta_y: i32 },
    ButtonDown { x: i32, y: i32, button: MouseButton },
    ButtonUp { x: i32, y: i32, button: MouseButton },
    Motion { x: i32, y: i32 },
}
