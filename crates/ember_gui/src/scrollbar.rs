//! Vertical scroll bar built from six gui-section children.
//!
//! ```text
//!  +----+  up arrow
//!  |    |  background (track)
//!  |[==]|  handle: top cap, body, bottom cap
//!  |    |
//!  +----+  down arrow
//! ```
//!
//! The bar owns a [`ScrollModel`].  Every input event or field write that
//! moves the position re-lays out the children immediately and notifies
//! the scroll handler once.

use std::fmt;
use std::rc::Rc;

use ember_core::{
    run_handler, ConfigError, Environment, FieldError, FieldRegistry, Formula, MapCallable,
    MouseSource, Reflect, Value,
};
use once_cell::sync::Lazy;

use crate::event::InputEvent;
use crate::factory::WidgetFactory;
use crate::layout::RenderCommand;
use crate::scroll::ScrollModel;
use crate::section;
use crate::widget::{apply_geometry, geometry_value, widget_subtype, Geometry, Widget};

/// Shortest handle drawn, in pixels, however large the range gets.
pub const MIN_HANDLE_LENGTH: i32 = 6;

/// Interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// The handle was grabbed at screen row `anchor_y` while the model was
    /// at `anchor_position`.
    DraggingHandle { anchor_position: i32, anchor_y: i32 },
}

/// One of the six child widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    UpArrow,
    DownArrow,
    Handle,
    HandleBottom,
    HandleTop,
    Background,
}

impl Part {
    pub const ALL: [Part; 6] = [
        Part::UpArrow,
        Part::DownArrow,
        Part::Handle,
        Part::HandleBottom,
        Part::HandleTop,
        Part::Background,
    ];

    /// Configuration key and field name.
    pub fn key(self) -> &'static str {
        match self {
            Part::UpArrow => "up_arrow",
            Part::DownArrow => "down_arrow",
            Part::Handle => "handle",
            Part::HandleBottom => "handle_bottom",
            Part::HandleTop => "handle_top",
            Part::Background => "background",
        }
    }

    pub fn default_section(self) -> &'static str {
        match self {
            Part::UpArrow => section::UP_ARROW,
            Part::DownArrow => section::DOWN_ARROW,
            Part::Handle => section::HANDLE,
            Part::HandleBottom => section::HANDLE_BOTTOM,
            Part::HandleTop => section::HANDLE_TOP,
            Part::Background => section::BACKGROUND,
        }
    }
}

/// What runs when the position changes.
pub enum ScrollHandler {
    None,
    Native(Box<dyn FnMut(i32)>),
    /// Formula compiled from `on_scroll`, run with `yscroll` in scope.
    /// The source is kept so the bar can be written back out.
    Script {
        source: Value,
        formula: Rc<dyn Formula>,
    },
}

struct Children {
    up_arrow: Box<dyn Widget>,
    down_arrow: Box<dyn Widget>,
    handle: Box<dyn Widget>,
    handle_bottom: Box<dyn Widget>,
    handle_top: Box<dyn Widget>,
    background: Box<dyn Widget>,
}

impl Children {
    /// Builds each child from its override in `config`, or from the default
    /// section when there is none.
    fn build(
        config: Option<&Value>,
        env: Option<&Rc<dyn Environment>>,
        factory: &dyn WidgetFactory,
    ) -> Result<Self, ConfigError> {
        let make = |part: Part| match config.and_then(|c| c.get(part.key())) {
            Some(cfg) => factory.create(cfg, env.cloned()),
            None => factory.section(part.default_section()),
        };
        Ok(Self {
            up_arrow: make(Part::UpArrow)?,
            down_arrow: make(Part::DownArrow)?,
            handle: make(Part::Handle)?,
            handle_bottom: make(Part::HandleBottom)?,
            handle_top: make(Part::HandleTop)?,
            background: make(Part::Background)?,
        })
    }

    fn get(&self, part: Part) -> &dyn Widget {
        match part {
            Part::UpArrow => &*self.up_arrow,
            Part::DownArrow => &*self.down_arrow,
            Part::Handle => &*self.handle,
            Part::HandleBottom => &*self.handle_bottom,
            Part::HandleTop => &*self.handle_top,
            Part::Background => &*self.background,
        }
    }

    fn slot(&mut self, part: Part) -> &mut Box<dyn Widget> {
        match part {
            Part::UpArrow => &mut self.up_arrow,
            Part::DownArrow => &mut self.down_arrow,
            Part::Handle => &mut self.handle,
            Part::HandleBottom => &mut self.handle_bottom,
            Part::HandleTop => &mut self.handle_top,
            Part::Background => &mut self.background,
        }
    }
}

pub struct ScrollBarWidget {
    geometry: Geometry,
    model: ScrollModel,
    drag: DragState,
    children: Children,
    handler: ScrollHandler,
    env: Option<Rc<dyn Environment>>,
    factory: Rc<dyn WidgetFactory>,
}

impl ScrollBarWidget {
    /// Scroll bar with the default skin that reports position changes to a
    /// native callback.
    pub fn new(
        factory: Rc<dyn WidgetFactory>,
        handler: impl FnMut(i32) + 'static,
    ) -> Result<Self, ConfigError> {
        let children = Children::build(None, None, &*factory)?;
        let mut bar = Self {
            geometry: Geometry::default(),
            model: ScrollModel::default(),
            drag: DragState::Idle,
            children,
            handler: ScrollHandler::Native(Box::new(handler)),
            env: None,
            factory,
        };
        bar.layout();
        Ok(bar)
    }

    /// Builds a scroll bar from configuration.  A script environment is
    /// required since the handler (`on_scroll`) is a formula.
    pub fn from_config(
        config: &Value,
        env: Option<Rc<dyn Environment>>,
        factory: Rc<dyn WidgetFactory>,
    ) -> Result<Self, ConfigError> {
        let env = env.ok_or(ConfigError::MissingEnvironment("scrollbar"))?;
        let handler = match config.get("on_scroll") {
            Some(source) => ScrollHandler::Script {
                source: source.clone(),
                formula: env.create_formula(source)?,
            },
            None => ScrollHandler::None,
        };
        let children = Children::build(Some(config), Some(&env), &*factory)?;

        let mut model = ScrollModel::default();
        if let Some(range) = config.get("range") {
            let (total, window) = parse_range(range)
                .map_err(|_| ConfigError::malformed("range", "a list of exactly 2 ints", range))?;
            model.set_range(total, window);
        }
        if let Some(step) = config.get("step") {
            model.set_step(step.expect_i32("step")?);
        }
        if let Some(step) = config.get("arrow_step") {
            model.set_arrow_step(step.expect_i32("arrow_step")?);
        }
        // after the range, so the clip sees the configured extents
        if let Some(position) = config.get("position") {
            model.set_position(position.expect_i32("position")?);
        }

        let mut bar = Self {
            geometry: Geometry::default(),
            model,
            drag: DragState::Idle,
            children,
            handler,
            env: Some(env),
            factory,
        };
        apply_geometry(&mut bar, config)?;
        bar.layout();
        Ok(bar)
    }

    pub fn model(&self) -> &ScrollModel {
        &self.model
    }

    pub fn position(&self) -> i32 {
        self.model.position()
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn child(&self, part: Part) -> &dyn Widget {
        self.children.get(part)
    }

    pub fn set_range(&mut self, total: i32, window: i32) {
        self.model.set_range(total, window);
        self.layout();
    }

    pub fn set_position(&mut self, position: i32) {
        self.model.set_position(position);
        self.layout();
    }

    pub fn set_step(&mut self, step: i32) {
        self.model.set_step(step);
    }

    pub fn set_arrow_step(&mut self, arrow_step: i32) {
        self.model.set_arrow_step(arrow_step);
    }

    /// Replaces the handler with a native callback.
    pub fn set_handler(&mut self, handler: impl FnMut(i32) + 'static) {
        self.handler = ScrollHandler::Native(Box::new(handler));
    }

    /// Compiles `source` in the bar's environment and installs it as the
    /// handler.
    pub fn set_on_scroll(&mut self, source: &Value) -> Result<(), FieldError> {
        let env = self
            .env
            .as_ref()
            .ok_or_else(|| FieldError::Script("on_scroll requires a script environment".into()))?;
        self.handler = ScrollHandler::Script {
            source: source.clone(),
            formula: env.create_formula(source)?,
        };
        Ok(())
    }

    /// Rebuilds one child from a configuration map through the factory.
    pub fn set_child(&mut self, part: Part, config: &Value) -> Result<(), ConfigError> {
        let child = self.factory.create(config, self.env.clone())?;
        *self.children.slot(part) = child;
        self.layout();
        Ok(())
    }

    /// Positions the children for the current geometry and model.  The bar
    /// is as wide as its up arrow.
    fn layout(&mut self) {
        let Geometry { x, y, height, .. } = self.geometry;
        let c = &mut self.children;
        let up_h = c.up_arrow.height();
        let down_h = c.down_arrow.height();
        self.geometry.width = c.up_arrow.width();

        c.up_arrow.set_loc(x, y);
        c.down_arrow
            .set_loc(x, y.saturating_add(height).saturating_sub(down_h));

        let track = height.saturating_sub(up_h).saturating_sub(down_h).max(0);
        let track_top = y.saturating_add(up_h);
        c.background.set_loc(x, track_top);
        let bg_w = c.background.width();
        c.background.set_dim(bg_w, track);

        let (offset, length) = self.model.handle_span(track, MIN_HANDLE_LENGTH);
        let top = track_top.saturating_add(offset);
        c.handle.set_loc(x, top);
        let handle_w = c.handle.width();
        c.handle.set_dim(handle_w, length);
        c.handle_top.set_loc(x, top);
        let cap_h = c.handle_bottom.height();
        c.handle_bottom
            .set_loc(x, top.saturating_add(length).saturating_sub(cap_h));
    }

    fn track_length(&self) -> i32 {
        self.geometry
            .height
            .saturating_sub(self.children.up_arrow.height())
            .saturating_sub(self.children.down_arrow.height())
    }

    fn notify(&mut self) {
        let position = self.model.position();
        match &mut self.handler {
            ScrollHandler::None => {}
            ScrollHandler::Native(f) => f(position),
            ScrollHandler::Script { formula, .. } => match &self.env {
                Some(env) => {
                    let args = MapCallable::new().with("yscroll", position);
                    if let Err(err) = run_handler(&**env, &**formula, &args) {
                        log::error!("scrollbar: on_scroll handler failed: {err}");
                    }
                }
                None => log::info!("scrollbar: on_scroll fired without an environment"),
            },
        }
    }

    fn press(&mut self, py: i32) -> bool {
        let c = &self.children;
        if py < c.up_arrow.geometry().bottom() {
            self.model.arrow_up()
        } else if py > c.down_arrow.y() {
            self.model.arrow_down()
        } else if py < c.handle.y() {
            self.model.page_up()
        } else if py > c.handle.geometry().bottom() {
            self.model.page_down()
        } else {
            log::debug!(
                "scrollbar: grabbed handle at y={py} (handle {}+{})",
                c.handle.y(),
                c.handle.height()
            );
            self.drag = DragState::DraggingHandle {
                anchor_position: self.model.position(),
                anchor_y: py,
            };
            false
        }
    }
}

fn parse_range(v: &Value) -> Result<(i32, i32), FieldError> {
    const TAG: &str = "[int,int]";
    let items = v.expect_list("range", TAG, 2)?;
    let int = |item: &Value| {
        item.as_int()
            .and_then(|i| i32::try_from(i).ok())
            .ok_or_else(|| FieldError::mismatch("range", TAG, v))
    };
    Ok((int(&items[0])?, int(&items[1])?))
}

impl Widget for ScrollBarWidget {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn set_loc(&mut self, x: i32, y: i32) {
        self.geometry.x = x;
        self.geometry.y = y;
        self.layout();
    }

    // width always follows the up arrow
    fn set_dim(&mut self, _width: i32, height: i32) {
        self.geometry.height = height;
        self.layout();
    }

    fn draw(&self, cmds: &mut Vec<RenderCommand>) {
        let c = &self.children;
        c.background.draw(cmds);
        c.up_arrow.draw(cmds);
        c.down_arrow.draw(cmds);
        c.handle.draw(cmds);
        c.handle_bottom.draw(cmds);
        c.handle_top.draw(cmds);
    }

    fn handle_event(
        &mut self,
        event: &InputEvent,
        claimed: bool,
        mouse: &dyn MouseSource,
    ) -> bool {
        if claimed {
            return claimed;
        }

        match *event {
            InputEvent::Wheel { delta_y } => {
                if delta_y == 0 {
                    return claimed;
                }
                let Some((mx, my)) = mouse.mouse_position() else {
                    return claimed;
                };
                if !self.geometry.contains(mx, my) {
                    return claimed;
                }
                if self.model.wheel(delta_y) {
                    self.layout();
                    self.notify();
                }
                claimed
            }
            InputEvent::ButtonDown { x, y, .. } => {
                if !self.geometry.contains(x, y) {
                    return claimed;
                }
                if self.press(y) {
                    self.layout();
                    self.notify();
                }
                true
            }
            InputEvent::ButtonUp { .. } => {
                self.drag = DragState::Idle;
                claimed
            }
            InputEvent::Motion { y, .. } => {
                if mouse.mouse_position().is_none() {
                    self.drag = DragState::Idle;
                }
                if let DragState::DraggingHandle {
                    anchor_position,
                    anchor_y,
                } = self.drag
                {
                    let track = self.track_length();
                    if track > 0 {
                        self.model.drag_to(anchor_position, y.saturating_sub(anchor_y), track);
                    }
                    self.layout();
                    self.notify();
                }
                claimed
            }
        }
    }

    fn to_value(&self) -> Value {
        let mut out = Value::map()
            .with("type", "scrollbar")
            .with(
                "range",
                vec![Value::from(self.model.range()), self.model.window().into()],
            )
            .with("position", self.model.position())
            .with("step", self.model.step())
            .with("arrow_step", self.model.arrow_step());
        if let ScrollHandler::Script { source, .. } = &self.handler {
            out = out.with("on_scroll", source.clone());
        }
        for part in Part::ALL {
            out = out.with(part.key(), self.children.get(part).to_value());
        }
        geometry_value(out, self.geometry)
    }
}

impl fmt::Debug for ScrollBarWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollBarWidget")
            .field("geometry", &self.geometry)
            .field("model", &self.model)
            .field("drag", &self.drag)
            .field("has_env", &self.env.is_some())
            .finish()
    }
}

fn replace_child(w: &mut ScrollBarWidget, part: Part, v: &Value) -> Result<(), FieldError> {
    if v.as_map().is_none() {
        return Err(FieldError::mismatch(part.key(), "map|builtin widget", v));
    }
    w.set_child(part, v).map_err(FieldError::from)
}

static SCROLLBAR: Lazy<FieldRegistry<ScrollBarWidget>> = Lazy::new(|| {
    const WIDGET: &str = "builtin widget";
    widget_subtype::<ScrollBarWidget>("scrollbar")
        .field(
            "range",
            "[int,int]",
            |w| vec![Value::from(w.model.range()), w.model.window().into()].into(),
            |w, v| {
                let (total, window) = parse_range(&v)?;
                w.set_range(total, window);
                Ok(())
            },
        )
        .field(
            "position",
            "int",
            |w| w.model.position().into(),
            |w, v| {
                let p = v.expect_i32("position")?;
                w.set_position(p);
                Ok(())
            },
        )
        .field(
            "step",
            "int",
            |w| w.model.step().into(),
            |w, v| {
                w.set_step(v.expect_i32("step")?);
                Ok(())
            },
        )
        .field(
            "arrow_step",
            "int",
            |w| w.model.arrow_step().into(),
            |w, v| {
                w.set_arrow_step(v.expect_i32("arrow_step")?);
                Ok(())
            },
        )
        .field(
            "up_arrow",
            WIDGET,
            |w| w.child(Part::UpArrow).to_value(),
            |w, v| replace_child(w, Part::UpArrow, &v),
        )
        .field(
            "down_arrow",
            WIDGET,
            |w| w.child(Part::DownArrow).to_value(),
            |w, v| replace_child(w, Part::DownArrow, &v),
        )
        .field(
            "handle",
            WIDGET,
            |w| w.child(Part::Handle).to_value(),
            |w, v| replace_child(w, Part::Handle, &v),
        )
        .field(
            "handle_bottom",
            WIDGET,
            |w| w.child(Part::HandleBottom).to_value(),
            |w, v| replace_child(w, Part::HandleBottom, &v),
        )
        .field(
            "handle_top",
            WIDGET,
            |w| w.child(Part::HandleTop).to_value(),
            |w, v| replace_child(w, Part::HandleTop, &v),
        )
        .field(
            "background",
            WIDGET,
            |w| w.child(Part::Background).to_value(),
            |w, v| replace_child(w, Part::Background, &v),
        )
        .field("on_scroll", "null", |_| Value::Null, |w, v| w.set_on_scroll(&v))
});

impl Reflect for ScrollBarWidget {
    fn registry() -> &'static FieldRegistry<Self> {
        &SCROLLBAR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::BuiltinFactory;
    use crate::section::{BACKGROUND, DOWN_ARROW, HANDLE, HANDLE_BOTTOM, HANDLE_TOP, UP_ARROW};
    use ember_core::{Callable, FieldKey, MouseButton};
    use std::cell::RefCell;

    struct Mouse(Option<(i32, i32)>);

    impl MouseSource for Mouse {
        fn mouse_position(&self) -> Option<(i32, i32)> {
            self.0
        }
    }

    const NO_MOUSE: Mouse = Mouse(None);

    fn press(y: i32) -> InputEvent {
        InputEvent::ButtonDown {
            x: 5,
            y,
            button: MouseButton::Left,
        }
    }

    fn release(y: i32) -> InputEvent {
        InputEvent::ButtonUp {
            x: 5,
            y,
            button: MouseButton::Left,
        }
    }

    fn factory() -> Rc<dyn WidgetFactory> {
        Rc::new(BuiltinFactory::default())
    }

    /// 216px tall bar with the stock skin: 16px arrows, 184px track,
    /// range 100 / window 20 / arrow step 5.  The handle starts at y=16
    /// and is 36px long.
    fn bar() -> (ScrollBarWidget, Rc<RefCell<Vec<i32>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let mut sb = ScrollBarWidget::new(factory(), move |p| sink.borrow_mut().push(p)).unwrap();
        sb.set_range(100, 20);
        sb.set_arrow_step(5);
        sb.set_dim(10, 216);
        (sb, calls)
    }

    #[test]
    fn down_arrow_press_moves_one_arrow_step() {
        let (mut sb, calls) = bar();
        let claimed = sb.handle_event(&press(210), false, &NO_MOUSE);
        assert!(claimed);
        assert_eq!(sb.position(), 5);
        assert_eq!(*calls.borrow(), vec![5]);
    }

    #[test]
    fn press_at_boundary_claims_without_notifying() {
        let (mut sb, calls) = bar();
        assert!(sb.handle_event(&press(4), false, &NO_MOUSE));
        assert_eq!(sb.position(), 0);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn claimed_events_pass_through() {
        let (mut sb, calls) = bar();
        assert!(sb.handle_event(&press(210), true, &NO_MOUSE));
        let wheel = InputEvent::Wheel { delta_y: -1 };
        assert!(sb.handle_event(&wheel, true, &Mouse(Some((5, 100)))));
        assert_eq!(sb.position(), 0);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn presses_outside_are_ignored() {
        let (mut sb, calls) = bar();
        let outside = InputEvent::ButtonDown {
            x: 40,
            y: 210,
            button: MouseButton::Left,
        };
        assert!(!sb.handle_event(&outside, false, &NO_MOUSE));
        assert_eq!(sb.position(), 0);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn wheel_scrolls_without_claiming() {
        let (mut sb, calls) = bar();
        let inside = Mouse(Some((5, 100)));
        let down = InputEvent::Wheel { delta_y: -1 };

        assert!(!sb.handle_event(&down, false, &inside));
        assert_eq!(sb.position(), 5);
        sb.handle_event(&InputEvent::Wheel { delta_y: 2 }, false, &inside);
        assert_eq!(sb.position(), 0);

        // outside, no mouse, or no movement: nothing happens
        sb.handle_event(&down, false, &Mouse(Some((50, 100))));
        sb.handle_event(&down, false, &NO_MOUSE);
        sb.handle_event(&InputEvent::Wheel { delta_y: 0 }, false, &inside);
        sb.handle_event(&InputEvent::Wheel { delta_y: 1 }, false, &inside);
        assert_eq!(sb.position(), 0);
        assert_eq!(*calls.borrow(), vec![5, 0]);
    }

    #[test]
    fn track_clicks_page() {
        let (mut sb, calls) = bar();
        sb.handle_event(&press(150), false, &NO_MOUSE);
        assert_eq!(sb.position(), 15);
        // handle now at 16 + 15*184/100 = 43, so y=30 is above it
        sb.handle_event(&press(30), false, &NO_MOUSE);
        assert_eq!(sb.position(), 0);
        assert_eq!(*calls.borrow(), vec![15, 0]);
        assert_eq!(sb.drag_state(), DragState::Idle);
    }

    #[test]
    fn arrow_snaps_to_step() {
        let (mut sb, _) = bar();
        sb.set_step(5);
        sb.set_arrow_step(3);
        sb.set_position(12);
        sb.handle_event(&press(4), false, &NO_MOUSE);
        assert_eq!(sb.position(), 10);
    }

    #[test]
    fn dragging_the_handle() {
        let (mut sb, calls) = bar();
        let mouse = Mouse(Some((5, 0)));

        assert!(sb.handle_event(&press(30), false, &mouse));
        assert_eq!(
            sb.drag_state(),
            DragState::DraggingHandle {
                anchor_position: 0,
                anchor_y: 30
            }
        );
        assert!(calls.borrow().is_empty());

        sb.handle_event(&InputEvent::Motion { x: 5, y: 76 }, false, &mouse);
        assert_eq!(sb.position(), 46 * 100 / 184);
        assert_eq!(sb.child(Part::Handle).y(), 16 + sb.position() * 184 / 100);

        // back to the grab point restores the anchor position
        sb.handle_event(&InputEvent::Motion { x: 5, y: 30 }, false, &mouse);
        assert_eq!(sb.position(), 0);
        // still notified while dragging even though nothing moved
        sb.handle_event(&InputEvent::Motion { x: 5, y: 30 }, false, &mouse);
        assert_eq!(*calls.borrow(), vec![25, 0, 0]);

        sb.handle_event(&release(30), false, &mouse);
        assert_eq!(sb.drag_state(), DragState::Idle);
        sb.handle_event(&InputEvent::Motion { x: 5, y: 100 }, false, &mouse);
        assert_eq!(sb.position(), 0);
        assert_eq!(calls.borrow().len(), 3);
    }

    #[test]
    fn lost_mouse_tracking_ends_the_drag() {
        let (mut sb, calls) = bar();
        sb.handle_event(&press(30), false, &NO_MOUSE);
        sb.handle_event(&InputEvent::Motion { x: 5, y: 90 }, false, &NO_MOUSE);
        assert_eq!(sb.drag_state(), DragState::Idle);
        assert_eq!(sb.position(), 0);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn layout_follows_position() {
        let (mut sb, _) = bar();
        sb.set_loc(100, 10);
        sb.set_position(40);

        assert_eq!(sb.width(), 16);
        let g = |p: Part| sb.child(p).geometry();
        assert_eq!(g(Part::UpArrow), Geometry::new(100, 10, 16, 16));
        assert_eq!(g(Part::DownArrow), Geometry::new(100, 210, 16, 16));
        assert_eq!(g(Part::Background), Geometry::new(100, 26, 16, 184));

        let top = 26 + 40 * 184 / 100;
        assert_eq!(g(Part::Handle), Geometry::new(100, top, 16, 36));
        assert_eq!(g(Part::HandleTop).y, top);
        assert_eq!(g(Part::HandleBottom).y, top + 36 - 3);
    }

    #[test]
    fn draws_back_to_front() {
        let (sb, _) = bar();
        let mut cmds = Vec::new();
        sb.draw(&mut cmds);
        let order: Vec<_> = cmds.iter().filter_map(RenderCommand::section).collect();
        assert_eq!(
            order,
            vec![BACKGROUND, UP_ARROW, DOWN_ARROW, HANDLE, HANDLE_BOTTOM, HANDLE_TOP]
        );
    }

    #[test]
    fn range_field_rejects_partial_writes() {
        let (mut sb, _) = bar();
        sb.set_position(30);
        let before = *sb.model();

        for bad in [
            Value::List(vec![50.into()]),
            Value::List(vec![50.into(), "x".into()]),
            Value::List(vec![1.into(), 2.into(), 3.into()]),
            Value::Int(50),
        ] {
            let err = sb.set("range", bad).unwrap_err();
            assert!(matches!(err, FieldError::TypeMismatch { field: "range", .. }));
            assert_eq!(*sb.model(), before);
        }

        sb.set("range", Value::List(vec![40.into(), 30.into()])).unwrap();
        assert_eq!(sb.get("range").unwrap(), Value::List(vec![40.into(), 30.into()]));
        assert_eq!(sb.get("position").unwrap(), Value::Int(10));
    }

    #[test]
    fn position_field_clips() {
        let (mut sb, _) = bar();
        sb.set("position", Value::Int(1000)).unwrap();
        assert_eq!(sb.position(), 80);
        sb.set("position", Value::Int(-4)).unwrap();
        assert_eq!(sb.position(), 0);

        sb.set("range", Value::List(vec![0.into(), 0.into()])).unwrap();
        sb.set("position", Value::Int(7)).unwrap();
        assert_eq!(sb.position(), 0);
        assert_eq!(sb.child(Part::Handle).height(), 184);
    }

    #[test]
    fn base_fields_relayout_children() {
        let (mut sb, _) = bar();
        sb.set("y", Value::Int(50)).unwrap();
        assert_eq!(sb.child(Part::UpArrow).y(), 50);
        sb.set("width", Value::Int(300)).unwrap();
        assert_eq!(sb.get("width").unwrap(), Value::Int(16));
        assert_eq!(sb.get("type").unwrap(), Value::from("scrollbar"));
        // base fields keep the lowest indices
        assert_eq!(sb.get_field(FieldKey::Index(0)).unwrap(), Value::Int(0));
    }

    #[test]
    fn child_fields_rebuild_through_the_factory() {
        let (mut sb, _) = bar();
        let cfg = Value::map()
            .with("type", "rect")
            .with("width", 16)
            .with("height", 1)
            .with("color", Value::List(vec![1.into(), 0.into(), 0.into()]));
        sb.set("handle", cfg).unwrap();

        let handle = sb.get("handle").unwrap();
        assert_eq!(handle.get("type"), Some(&Value::from("rect")));
        // re-laid out at once
        assert_eq!(sb.child(Part::Handle).height(), 36);

        assert!(matches!(
            sb.set("handle", Value::Int(3)),
            Err(FieldError::TypeMismatch { field: "handle", .. })
        ));
        assert!(matches!(
            sb.set("handle", Value::map().with("type", "dial")),
            Err(FieldError::Config(ConfigError::UnknownWidgetType(_)))
        ));
        assert_eq!(sb.child(Part::Handle).type_name(), "rect");
    }

    #[test]
    fn on_scroll_needs_an_environment() {
        let (mut sb, _) = bar();
        assert_eq!(sb.get("on_scroll").unwrap(), Value::Null);
        assert!(matches!(
            sb.set("on_scroll", Value::from("noop")),
            Err(FieldError::Script(_))
        ));
    }

    // ── script-driven bars ──────────────────────────────────────────────────

    /// Formula returning `{ "scroll_to": yscroll }`, or failing when its
    /// source was "fail".
    struct ScrollTo {
        fail: bool,
    }

    impl Formula for ScrollTo {
        fn execute(&self, args: &dyn Callable) -> Result<Value, FieldError> {
            if self.fail {
                return Err(FieldError::Script("boom".into()));
            }
            Ok(Value::map().with("scroll_to", args.get("yscroll")?))
        }
    }

    #[derive(Default)]
    struct Recorder {
        commands: RefCell<Vec<Value>>,
    }

    impl Environment for Recorder {
        fn create_formula(&self, source: &Value) -> Result<Rc<dyn Formula>, FieldError> {
            match source.as_str() {
                Some(src) => Ok(Rc::new(ScrollTo { fail: src == "fail" })),
                None => Err(FieldError::Script(format!("cannot compile {source}"))),
            }
        }

        fn execute_command(&self, command: Value) -> Result<(), FieldError> {
            self.commands.borrow_mut().push(command);
            Ok(())
        }
    }

    fn config() -> Value {
        Value::map()
            .with("type", "scrollbar")
            .with("on_scroll", "scroll_to(yscroll)")
            .with("range", vec![Value::from(100), 20.into()])
            .with("arrow_step", 5)
            .with("height", 216)
    }

    #[test]
    fn config_requires_an_environment() {
        assert!(matches!(
            ScrollBarWidget::from_config(&config(), None, factory()),
            Err(ConfigError::MissingEnvironment("scrollbar"))
        ));
    }

    #[test]
    fn config_rejects_malformed_range() {
        let env: Rc<dyn Environment> = Rc::new(Recorder::default());
        let cfg = config().with("range", vec![Value::from(1), 2.into(), 3.into()]);
        assert!(matches!(
            ScrollBarWidget::from_config(&cfg, Some(env), factory()),
            Err(ConfigError::Malformed { key: "range", .. })
        ));
    }

    #[test]
    fn script_handler_receives_yscroll() {
        let recorder = Rc::new(Recorder::default());
        let env: Rc<dyn Environment> = recorder.clone();
        let mut sb = ScrollBarWidget::from_config(&config(), Some(env), factory()).unwrap();

        sb.handle_event(&press(210), false, &NO_MOUSE);
        assert_eq!(
            *recorder.commands.borrow(),
            vec![Value::map().with("scroll_to", 5)]
        );

        // a failing handler is logged; the bar keeps working
        sb.set("on_scroll", Value::from("fail")).unwrap();
        sb.handle_event(&press(210), false, &NO_MOUSE);
        assert_eq!(sb.position(), 10);
        assert_eq!(recorder.commands.borrow().len(), 1);

        assert!(sb.set("on_scroll", Value::Int(1)).is_err());
    }

    #[test]
    fn config_overrides_children_and_round_trips() {
        let env: Rc<dyn Environment> = Rc::new(Recorder::default());
        let cfg = config()
            .with("step", 2)
            .with("x", 8)
            .with(
                "background",
                Value::map()
                    .with("type", "rect")
                    .with("width", 16)
                    .with("height", 1),
            );
        let sb = ScrollBarWidget::from_config(&cfg, Some(env.clone()), factory()).unwrap();
        assert_eq!(sb.child(Part::Background).type_name(), "rect");
        assert_eq!(sb.child(Part::Background).height(), 184);
        assert_eq!(sb.model().step(), 2);
        assert_eq!(sb.x(), 8);

        let copy = BuiltinFactory::default()
            .create(&sb.to_value(), Some(env))
            .unwrap();
        assert_eq!(copy.geometry(), sb.geometry());
        assert_eq!(copy.get("range").unwrap(), sb.get("range").unwrap());
        assert_eq!(copy.get("background").unwrap(), sb.get("background").unwrap());
    }

    #[test]
    fn rebuilt_bar_keeps_position_and_handler() {
        let recorder = Rc::new(Recorder::default());
        let env: Rc<dyn Environment> = recorder.clone();
        let cfg = config().with("position", 1000);
        let sb = ScrollBarWidget::from_config(&cfg, Some(env.clone()), factory()).unwrap();
        // clipped against the configured range
        assert_eq!(sb.position(), 80);

        let value = sb.to_value();
        assert_eq!(value.get("position"), Some(&Value::Int(80)));
        assert_eq!(value.get("on_scroll"), Some(&Value::from("scroll_to(yscroll)")));

        let mut copy = BuiltinFactory::default().create(&value, Some(env)).unwrap();
        assert_eq!(copy.get("position").unwrap(), Value::Int(80));
        copy.handle_event(&press(4), false, &NO_MOUSE);
        assert_eq!(
            *recorder.commands.borrow(),
            vec![Value::map().with("scroll_to", 75)]
        );
    }

    #[test]
    fn extreme_script_values_do_not_overflow() {
        let (mut sb, calls) = bar();
        sb.set("arrow_step", Value::Int(i64::from(i32::MAX))).unwrap();
        sb.set("range", Value::List(vec![i32::MAX.into(), 0.into()])).unwrap();
        assert!(sb.handle_event(&press(210), false, &NO_MOUSE));
        assert_eq!(sb.position(), i32::MAX);
        assert!(sb.handle_event(&press(4), false, &NO_MOUSE));
        assert_eq!(sb.position(), 0);
        assert_eq!(*calls.borrow(), vec![i32::MAX, 0]);

        sb.set("y", Value::Int(i64::from(i32::MAX))).unwrap();
        sb.set("height", Value::Int(i64::from(i32::MAX))).unwrap();
        assert_eq!(sb.child(Part::DownArrow).y(), i32::MAX - 16);
        assert!(!sb.handle_event(&press(0), false, &NO_MOUSE));

        sb.set("y", Value::Int(i64::from(i32::MIN))).unwrap();
        sb.set("height", Value::Int(0)).unwrap();
        assert_eq!(sb.child(Part::Handle).height(), MIN_HANDLE_LENGTH);
    }
}
