//! Render-facing geometry.  Widgets never talk to the GPU; they append
//! `RenderCommand`s that the host renderer turns into batches.

/// Rectángulo en píxeles de pantalla.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Flat coloured quad.
    Quad { rect: Rect, color: [f32; 4] },
    /// A named skin image ("gui section") stretched over `rect`.
    Section { rect: Rect, name: String },
}

impl RenderCommand {
    pub fn rect(&self) -> Rect {
        match self {
            RenderCommand::Quad { rect, .. } | RenderCommand::Section { rect, .. } => *rect,
        }
    }

    /// Section name, `None` for quads.
    pub fn section(&self) -> Option<&str> {
        match self {
            RenderCommand::Section { name, .. } => Some(name),
            RenderCommand::Quad { .. } => None,
        }
    }
}
