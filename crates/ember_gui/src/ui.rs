use ember_core::{InputState, MouseButton, MouseSource};
use winit::event::{ElementState, MouseButton as WinitButton, MouseScrollDelta, WindowEvent};

use crate::canvas::Canvas;
use crate::event::InputEvent;
use crate::layout::RenderCommand;
use crate::widget::Widget;

/// Higher-level UI object intended to be held by applications.  It wraps a
/// [`Canvas`] and routes `winit` window events to it.
///
/// In the event loop call `ui.handle_window_event(&event, &mut input)` and,
/// when rendering, `ui.draw()` to get the frame's commands.  The same
/// `InputState` serves as the widgets' mouse source, so a widget querying
/// the mouse mid-event sees the position the event just reported.
#[derive(Default)]
pub struct Ui {
    canvas: Canvas,
}

impl Ui {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_canvas(canvas: Canvas) -> Self {
        Self { canvas }
    }

    /// Add a widget to the UI tree.
    pub fn add(&mut self, widget: impl Widget + 'static) {
        self.canvas.add(widget);
    }

    /// Updates `input` from `event` and dispatches the converted event.
    /// Returns whether a widget claimed it.
    pub fn handle_window_event(&mut self, event: &WindowEvent, input: &mut InputState) -> bool {
        match translate(event, input) {
            Some(ev) => self.canvas.handle_event(&ev, input),
            None => false,
        }
    }

    pub fn draw(&self) -> Vec<RenderCommand> {
        let mut cmds = Vec::new();
        self.canvas.collect(&mut cmds);
        cmds
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Mutable access to the underlying canvas, e.g. to reach a widget by id.
    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }
}

/// Converts a window event into widget input, updating `input` on the way.
/// Events widgets don't care about yield `None`.
pub fn translate(event: &WindowEvent, input: &mut InputState) -> Option<InputEvent> {
    match event {
        WindowEvent::CursorMoved { position, .. } => {
            input.set_mouse_position(position.x, position.y);
            Some(InputEvent::Motion {
                x: position.x.floor() as i32,
                y: position.y.floor() as i32,
            })
        }
        WindowEvent::CursorLeft { .. } => {
            // the motion still goes out so that a dragging widget notices
            // the mouse is gone
            let (x, y) = input.cursor().unwrap_or_default();
            input.clear_mouse_position();
            Some(InputEvent::Motion {
                x: x.floor() as i32,
                y: y.floor() as i32,
            })
        }
        WindowEvent::MouseInput { state, button, .. } => {
            button_event(input, map_button(*button), *state == ElementState::Pressed)
        }
        WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Wheel {
            delta_y: wheel_direction(delta),
        }),
        _ => None,
    }
}

/// Press or release at the current cursor.  A release whose press happened
/// outside the window (or before the cursor left it) is dropped.
fn button_event(
    input: &mut InputState,
    button: MouseButton,
    pressed: bool,
) -> Option<InputEvent> {
    if !pressed && !input.is_button_down(button) {
        return None;
    }
    input.update_mouse_button(button, pressed);
    let (x, y) = input.mouse_position()?;
    Some(if pressed {
        InputEvent::ButtonDown { x, y, button }
    } else {
        InputEvent::ButtonUp { x, y, button }
    })
}

pub fn map_button(button: WinitButton) -> MouseButton {
    match button {
        WinitButton::Left => MouseButton::Left,
        WinitButton::Right => MouseButton::Right,
        WinitButton::Middle => MouseButton::Middle,
        WinitButton::Back => MouseButton::Other(3),
        WinitButton::Forward => MouseButton::Other(4),
        WinitButton::Other(n) => MouseButton::Other(n),
    }
}

/// Sign of the vertical wheel motion: 1 away from the user, -1 towards.
pub fn wheel_direction(delta: &MouseScrollDelta) -> i32 {
    let dy = match delta {
        MouseScrollDelta::LineDelta(_, y) => f64::from(*y),
        MouseScrollDelta::PixelDelta(p) => p.y,
    };
    if dy > 0.0 {
        1
    } else if dy < 0.0 {
        -1
    } else {
        0
    }
}
