use ember_core::{ConfigError, FieldError, FieldRegistry, Reflect, Value};
use once_cell::sync::Lazy;

use crate::layout::RenderCommand;
use crate::widget::{geometry_value, widget_subtype, Geometry, Widget};

const COLOR_TAG: &str = "[decimal,decimal,decimal,decimal]";

/// Solid colour rectangle.  Mostly used as a skin-less stand in for gui
/// sections (debug layouts, flat themes).
#[derive(Debug, Clone, PartialEq)]
pub struct RectWidget {
    geometry: Geometry,
    pub color: [f32; 4],
}

impl RectWidget {
    pub fn new(width: i32, height: i32, color: [f32; 4]) -> Self {
        Self {
            geometry: Geometry::new(0, 0, width, height),
            color,
        }
    }

    /// Builds from `{ width, height, color }`; colour defaults to opaque white.
    pub fn from_config(config: &Value) -> Result<Self, ConfigError> {
        let dim = |key: &'static str| -> Result<i32, ConfigError> {
            Ok(config
                .get(key)
                .map(|v| v.expect_i32(key))
                .transpose()?
                .unwrap_or(0))
        };
        let color = match config.get("color") {
            Some(v) => parse_color(v)?,
            None => [1.0; 4],
        };
        Ok(Self::new(dim("width")?, dim("height")?, color))
    }
}

/// Accepts `[r, g, b]` or `[r, g, b, a]`.
fn parse_color(v: &Value) -> Result<[f32; 4], FieldError> {
    let items = v
        .as_list()
        .filter(|items| items.len() == 3 || items.len() == 4)
        .ok_or_else(|| FieldError::mismatch("color", COLOR_TAG, v))?;
    let mut out = [1.0f32; 4];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item
            .as_decimal()
            .ok_or_else(|| FieldError::mismatch("color", COLOR_TAG, v))? as f32;
    }
    Ok(out)
}

fn color_value(c: [f32; 4]) -> Value {
    Value::List(c.iter().map(|&x| x.into()).collect())
}

impl Widget for RectWidget {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn set_loc(&mut self, x: i32, y: i32) {
        self.geometry.x = x;
        self.geometry.y = y;
    }

    fn set_dim(&mut self, width: i32, height: i32) {
        self.geometry.width = width;
        self.geometry.height = height;
    }

    fn draw(&self, cmds: &mut Vec<RenderCommand>) {
        cmds.push(RenderCommand::Quad {
            rect: self.geometry.to_rect(),
            color: self.color,
        });
    }

    fn to_value(&self) -> Value {
        let out = Value::map()
            .with("type", "rect")
            .with("color", color_value(self.color));
        geometry_value(out, self.geometry)
    }
}

static RECT: Lazy<FieldRegistry<RectWidget>> = Lazy::new(|| {
    widget_subtype::<RectWidget>("rect").field(
        "color",
        COLOR_TAG,
        |w| color_value(w.color),
        |w, v| {
            w.color = parse_color(&v)?;
            Ok(())
        },
    )
});

impl Reflect for RectWidget {
    fn registry() -> &'static FieldRegistry<Self> {
        &RECT
    }
}
