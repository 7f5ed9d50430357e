use ember_core::{Callable, ConfigError, FieldRegistry, MouseSource, Value};
use once_cell::sync::Lazy;

use crate::event::InputEvent;
use crate::layout::{Rect, RenderCommand};

/// Integer screen rectangle of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Geometry {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Edges are inclusive on both sides.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    // script-written geometry may sit at the ends of the i32 range
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
        )
    }
}

/// Cualquier elemento de la interfaz que pueda dibujarse y recibir eventos.
///
/// Every widget is also a [`Callable`]; the fields shared by all widgets
/// live in [`widget_registry`] and concrete types chain their own registry
/// onto it with [`widget_subtype`].
pub trait Widget: Callable {
    fn geometry(&self) -> Geometry;

    /// Moves the widget.  Composite widgets re-layout their children here.
    fn set_loc(&mut self, x: i32, y: i32);

    /// Resizes the widget.  Implementations may adjust the requested size.
    fn set_dim(&mut self, width: i32, height: i32);

    fn x(&self) -> i32 {
        self.geometry().x
    }

    fn y(&self) -> i32 {
        self.geometry().y
    }

    fn width(&self) -> i32 {
        self.geometry().width
    }

    fn height(&self) -> i32 {
        self.geometry().height
    }

    fn draw(&self, cmds: &mut Vec<RenderCommand>);

    /// Processes one input event.  `claimed` tells whether a widget drawn
    /// above this one already consumed it; the return value is the updated
    /// flag.  Widgets that ignore input keep the default.
    fn handle_event(
        &mut self,
        _event: &InputEvent,
        claimed: bool,
        _mouse: &dyn MouseSource,
    ) -> bool {
        claimed
    }

    fn hit(&self, x: i32, y: i32) -> bool {
        self.geometry().contains(x, y)
    }

    /// Configuration map that rebuilds this widget through a factory.
    fn to_value(&self) -> Value;
}

static WIDGET: Lazy<FieldRegistry<dyn Widget>> = Lazy::new(|| {
    FieldRegistry::<dyn Widget>::new("widget")
        .field(
            "x",
            "int",
            |w| w.x().into(),
            |w, v| {
                let x = v.expect_i32("x")?;
                let y = w.y();
                w.set_loc(x, y);
                Ok(())
            },
        )
        .field(
            "y",
            "int",
            |w| w.y().into(),
            |w, v| {
                let y = v.expect_i32("y")?;
                let x = w.x();
                w.set_loc(x, y);
                Ok(())
            },
        )
        .field(
            "width",
            "int",
            |w| w.width().into(),
            |w, v| {
                let width = v.expect_i32("width")?;
                let height = w.height();
                w.set_dim(width, height);
                Ok(())
            },
        )
        .field(
            "height",
            "int",
            |w| w.height().into(),
            |w, v| {
                let height = v.expect_i32("height")?;
                let width = w.width();
                w.set_dim(width, height);
                Ok(())
            },
        )
        .read_only("type", "string", |w| w.type_name().into())
});

/// Fields every widget exposes: `x`, `y`, `width`, `height` and `type`.
pub fn widget_registry() -> &'static FieldRegistry<dyn Widget> {
    Lazy::force(&WIDGET)
}

fn as_widget<W: Widget + 'static>(w: &W) -> &(dyn Widget + 'static) {
    w
}

fn as_widget_mut<W: Widget + 'static>(w: &mut W) -> &mut (dyn Widget + 'static) {
    w
}

/// Empty registry for a concrete widget type, chained onto the shared
/// widget fields.  Geometry writes go through the widget's own `set_loc` /
/// `set_dim`.
pub fn widget_subtype<W: Widget + 'static>(type_name: &'static str) -> FieldRegistry<W> {
    FieldRegistry::with_base(
        type_name,
        widget_registry(),
        as_widget::<W>,
        as_widget_mut::<W>,
    )
}

/// Applies the optional `x`, `y`, `width` and `height` keys of a widget
/// configuration.  Missing keys keep the current value.
pub fn apply_geometry(widget: &mut dyn Widget, config: &Value) -> Result<(), ConfigError> {
    let read = |key: &'static str| -> Result<Option<i32>, ConfigError> {
        Ok(config.get(key).map(|v| v.expect_i32(key)).transpose()?)
    };
    let (x, y, w, h) = (read("x")?, read("y")?, read("width")?, read("height")?);
    if x.is_some() || y.is_some() {
        let g = widget.geometry();
        widget.set_loc(x.unwrap_or(g.x), y.unwrap_or(g.y));
    }
    if w.is_some() || h.is_some() {
        let g = widget.geometry();
        widget.set_dim(w.unwrap_or(g.width), h.unwrap_or(g.height));
    }
    Ok(())
}

/// Writes the geometry keys read by [`apply_geometry`] into `out`.
pub fn geometry_value(out: Value, g: Geometry) -> Value {
    out.with("x", g.x)
        .with("y", g.y)
        .with("width", g.width)
        .with("height", g.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::{FieldError, FieldKey, Reflect};

    /// Keeps its height at least twice its width, to observe that base
    /// field writes reach the overriding `set_dim`.
    struct Tall {
        geometry: Geometry,
    }

    impl Widget for Tall {
        fn geometry(&self) -> Geometry {
            self.geometry
        }

        fn set_loc(&mut self, x: i32, y: i32) {
            self.geometry.x = x;
            self.geometry.y = y;
        }

        fn set_dim(&mut self, width: i32, height: i32) {
            self.geometry.width = width;
            self.geometry.height = height.max(width * 2);
        }

        fn draw(&self, _cmds: &mut Vec<RenderCommand>) {}

        fn to_value(&self) -> Value {
            geometry_value(Value::map().with("type", "tall"), self.geometry)
        }
    }

    static TALL: Lazy<FieldRegistry<Tall>> = Lazy::new(|| {
        widget_subtype::<Tall>("tall").read_only("ratio", "decimal", |t| {
            (t.geometry.height as f64 / t.geometry.width.max(1) as f64).into()
        })
    });

    impl Reflect for Tall {
        fn registry() -> &'static FieldRegistry<Self> {
            &TALL
        }
    }

    #[test]
    fn inclusive_bounds() {
        let g = Geometry::new(10, 10, 5, 5);
        assert!(g.contains(10, 10));
        assert!(g.contains(15, 15));
        assert!(!g.contains(16, 15));
        assert!(!g.contains(9, 12));
    }

    #[test]
    fn edges_saturate_at_the_ends_of_the_range() {
        let g = Geometry::new(i32::MAX - 2, i32::MAX, 10, i32::MAX);
        assert_eq!((g.right(), g.bottom()), (i32::MAX, i32::MAX));
        assert!(g.contains(i32::MAX, i32::MAX));
        assert!(!g.contains(0, i32::MAX));
    }

    #[test]
    fn base_fields_dispatch_to_overrides() {
        let mut t = Tall {
            geometry: Geometry::new(0, 0, 4, 8),
        };
        t.set("width", Value::Int(10)).unwrap();
        assert_eq!(t.geometry, Geometry::new(0, 0, 10, 20));
        assert_eq!(t.get("type").unwrap(), Value::from("tall"));
        assert_eq!(t.get_field(FieldKey::Index(5)).unwrap(), Value::Decimal(2.0));

        let err = t.set("x", Value::from("left")).unwrap_err();
        assert!(matches!(err, FieldError::TypeMismatch { field: "x", .. }));
        assert_eq!(t.geometry.x, 0);
    }

    #[test]
    fn geometry_config_round_trip() {
        let mut t = Tall {
            geometry: Geometry::default(),
        };
        apply_geometry(&mut t, &Value::map().with("x", 3).with("height", 9)).unwrap();
        assert_eq!(t.geometry, Geometry::new(3, 0, 0, 9));

        let mut copy = Tall {
            geometry: Geometry::default(),
        };
        apply_geometry(&mut copy, &t.to_value()).unwrap();
        assert_eq!(copy.geometry, t.geometry);

        let bad = Value::map().with("y", 1.5);
        assert!(matches!(
            apply_geometry(&mut t, &bad),
            Err(ConfigError::Malformed { key: "y", .. })
        ));
    }
}
