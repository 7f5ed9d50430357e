use std::rc::Rc;

use anyhow::{Context, Result};
use ember_core::{Callable, Camera, Environment, FieldError, FieldKey, InputState, Value};
use ember_gui::{BuiltinFactory, Canvas, InputEvent, RenderCommand, SectionTable, Ui};
use winit::event::WindowEvent;

use crate::config::AppConfig;

/// Everything the script runtime can reach: the camera and the named
/// widgets of the UI.
///
/// Objects are addressed with dotted paths.  The first segment names the
/// object (`camera` or a widget id), the second a field name or a numeric
/// field index:
///
/// ```rust,ignore
/// stage.set("camera.fov", Value::Decimal(60.0))?;
/// let pos = stage.get("inventory_scroll.position")?;
/// let fov = stage.get("camera.11")?;
/// ```
pub struct Stage {
    camera: Camera,
    ui: Ui,
    input: InputState,
    factory: BuiltinFactory,
    env: Option<Rc<dyn Environment>>,
}

impl Stage {
    /// Loads the skin and layout files named in `config` and builds the
    /// stage.
    pub fn new(config: &AppConfig, env: Option<Rc<dyn Environment>>) -> Result<Self> {
        let mut sections = SectionTable::default();
        if let Some(path) = &config.ui.sections {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("reading gui sections {}", path.display()))?;
            let table = SectionTable::from_ron(&source)
                .with_context(|| format!("parsing gui sections {}", path.display()))?;
            sections.merge(table);
        }

        let layout = match &config.ui.layout {
            Some(path) => {
                let source = std::fs::read_to_string(path)
                    .with_context(|| format!("reading layout {}", path.display()))?;
                let layout: Value = ron::from_str(&source)
                    .with_context(|| format!("parsing layout {}", path.display()))?;
                Some(layout)
            }
            None => None,
        };

        Self::build(config, sections, layout.as_ref(), env)
    }

    /// Builds the stage from already loaded skin and layout.
    pub fn build(
        config: &AppConfig,
        sections: SectionTable,
        layout: Option<&Value>,
        env: Option<Rc<dyn Environment>>,
    ) -> Result<Self> {
        let camera = Camera::from_config(&config.camera, config.aspect())
            .context("building the camera")?;
        let factory = BuiltinFactory::new(sections);
        let canvas = match layout {
            Some(layout) => {
                Canvas::from_config(layout, &factory, env.clone()).context("building the ui")?
            }
            None => Canvas::new(),
        };
        log::info!(
            "stage ready: {} widget(s), {} gui section(s)",
            canvas.len(),
            factory.sections().len()
        );
        Ok(Self {
            camera,
            ui: Ui::with_canvas(canvas),
            input: InputState::new(),
            factory,
            env,
        })
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn ui(&self) -> &Ui {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut Ui {
        &mut self.ui
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    /// Creates a widget from configuration and adds it on top of the UI.
    pub fn spawn(&mut self, id: Option<String>, config: &Value) -> Result<()> {
        let widget = ember_gui::WidgetFactory::create(&self.factory, config, self.env.clone())
            .context("spawning widget")?;
        self.ui.canvas_mut().push(id, widget);
        Ok(())
    }

    /// The window was resized; keeps the projection's aspect ratio in step.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.camera.set_aspect(width as f32 / height as f32);
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        if let WindowEvent::Resized(size) = event {
            self.resize(size.width, size.height);
            return false;
        }
        self.ui.handle_window_event(event, &mut self.input)
    }

    /// Dispatches an already converted event, with the stage's input state as
    /// the mouse source.
    pub fn dispatch(&mut self, event: &InputEvent) -> bool {
        self.ui.canvas_mut().handle_event(event, &self.input)
    }

    pub fn draw(&self) -> Vec<RenderCommand> {
        self.ui.draw()
    }

    pub fn get(&self, path: &str) -> Result<Value, FieldError> {
        let (object, field) = split_path(path)?;
        let key = field_key(field);
        if object == "camera" {
            return self.camera.get_field(key);
        }
        match self.ui.canvas().widget(object) {
            Some(widget) => widget.get_field(key),
            None => Err(unknown_object(object)),
        }
    }

    pub fn set(&mut self, path: &str, value: Value) -> Result<(), FieldError> {
        let (object, field) = split_path(path)?;
        let key = field_key(field);
        if object == "camera" {
            return self.camera.set_field(key, value);
        }
        match self.ui.canvas_mut().widget_mut(object) {
            Some(widget) => widget.set_field(key, value),
            None => Err(unknown_object(object)),
        }
    }
}

fn split_path(path: &str) -> Result<(&str, &str), FieldError> {
    path.split_once('.').ok_or_else(|| FieldError::UnknownField {
        owner: "stage",
        key: path.to_string(),
    })
}

fn field_key(field: &str) -> FieldKey<'_> {
    match field.parse::<usize>() {
        Ok(index) => FieldKey::Index(index),
        Err(_) => FieldKey::Name(field),
    }
}

fn unknown_object(name: &str) -> FieldError {
    FieldError::UnknownField {
        owner: "stage",
        key: name.to_string(),
    }
}
