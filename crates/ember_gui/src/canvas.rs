use std::rc::Rc;

use ember_core::{ConfigError, Environment, MouseSource, Value};

use crate::event::InputEvent;
use crate::factory::WidgetFactory;
use crate::layout::RenderCommand;
use crate::widget::Widget;

struct Entry {
    id: Option<String>,
    widget: Box<dyn Widget>,
}

/// Contenedor genérico que alberga varios widgets y los dibuja por orden.
///
/// Later children are drawn on top and therefore see input first.  Widgets
/// can be registered under an id so scripts can reach their fields.
#[derive(Default)]
pub struct Canvas {
    children: Vec<Entry>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a canvas from a list of widget maps.  An optional `id` key in
    /// each map names the widget.
    pub fn from_config(
        layout: &Value,
        factory: &dyn WidgetFactory,
        env: Option<Rc<dyn Environment>>,
    ) -> Result<Self, ConfigError> {
        let items = layout
            .as_list()
            .ok_or_else(|| ConfigError::malformed("layout", "a list of widgets", layout))?;
        let mut canvas = Self::new();
        for item in items {
            let id = match item.get("id") {
                Some(v) => Some(
                    v.as_str()
                        .ok_or_else(|| ConfigError::malformed("id", "string", v))?
                        .to_string(),
                ),
                None => None,
            };
            let widget = factory.create(item, env.clone())?;
            canvas.push(id, widget);
        }
        Ok(canvas)
    }

    /// Same as [`from_config`](Self::from_config) for a RON document.
    pub fn from_ron(
        source: &str,
        factory: &dyn WidgetFactory,
        env: Option<Rc<dyn Environment>>,
    ) -> Result<Self, ConfigError> {
        let layout: Value = ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_config(&layout, factory, env)
    }

    pub fn add(&mut self, widget: impl Widget + 'static) {
        self.push(None, Box::new(widget));
    }

    pub fn add_with_id(&mut self, id: impl Into<String>, widget: impl Widget + 'static) {
        self.push(Some(id.into()), Box::new(widget));
    }

    pub fn push(&mut self, id: Option<String>, widget: Box<dyn Widget>) {
        self.children.push(Entry { id, widget });
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn collect(&self, cmds: &mut Vec<RenderCommand>) {
        for child in &self.children {
            child.widget.draw(cmds);
        }
    }

    /// Delivers `event` to the children, topmost first, threading the
    /// claimed flag.  Returns whether any child claimed it.
    pub fn handle_event(&mut self, event: &InputEvent, mouse: &dyn MouseSource) -> bool {
        let mut claimed = false;
        for child in self.children.iter_mut().rev() {
            claimed = child.widget.handle_event(event, claimed, mouse);
        }
        claimed
    }

    pub fn widget(&self, id: &str) -> Option<&dyn Widget> {
        self.children
            .iter()
            .find(|c| c.id.as_deref() == Some(id))
            .map(|c| &*c.widget)
    }

    pub fn widget_mut(&mut self, id: &str) -> Option<&mut dyn Widget> {
        self.children
            .iter_mut()
            .find(|c| c.id.as_deref() == Some(id))
            .map(|c| &mut *c.widget as &mut dyn Widget)
    }

    /// Ids of the named children, in draw order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(|c| c.id.as_deref())
    }
}
