use std::rc::Rc;

use ember_core::{ConfigError, Environment, Value};

use crate::rect::RectWidget;
use crate::scrollbar::ScrollBarWidget;
use crate::section::{GuiSectionWidget, SectionTable};
use crate::widget::{apply_geometry, Widget};

/// Builds widgets from declarative configuration maps.
///
/// Composite widgets keep an `Rc` to the factory that built them so that
/// children can be rebuilt later (a script assigning a new `handle`).
pub trait WidgetFactory {
    /// Creates a widget from a map carrying a `type` tag.
    fn create(
        &self,
        config: &Value,
        env: Option<Rc<dyn Environment>>,
    ) -> Result<Box<dyn Widget>, ConfigError>;

    /// Creates a plain gui section widget at its native size.
    fn section(&self, name: &str) -> Result<Box<dyn Widget>, ConfigError> {
        let config = Value::map()
            .with("type", "gui_section")
            .with("section", name);
        self.create(&config, None)
    }
}

/// Factory for the widgets shipped with the engine: `gui_section`, `rect`
/// and `scrollbar`.
#[derive(Debug, Clone, Default)]
pub struct BuiltinFactory {
    sections: Rc<SectionTable>,
}

impl BuiltinFactory {
    pub fn new(sections: SectionTable) -> Self {
        Self {
            sections: Rc::new(sections),
        }
    }

    pub fn sections(&self) -> &SectionTable {
        &self.sections
    }
}

impl WidgetFactory for BuiltinFactory {
    fn create(
        &self,
        config: &Value,
        env: Option<Rc<dyn Environment>>,
    ) -> Result<Box<dyn Widget>, ConfigError> {
        let kind = config
            .get("type")
            .ok_or(ConfigError::MissingKey("type"))?;
        let kind = kind
            .as_str()
            .ok_or_else(|| ConfigError::malformed("type", "string", kind))?;

        let mut widget: Box<dyn Widget> = match kind {
            "gui_section" => {
                let name = config
                    .get("section")
                    .ok_or(ConfigError::MissingKey("section"))?;
                let name = name
                    .as_str()
                    .ok_or_else(|| ConfigError::malformed("section", "string", name))?;
                Box::new(GuiSectionWidget::new(name, &self.sections)?)
            }
            "rect" => Box::new(RectWidget::from_config(config)?),
            "scrollbar" => {
                let factory: Rc<dyn WidgetFactory> = Rc::new(self.clone());
                return Ok(Box::new(ScrollBarWidget::from_config(config, env, factory)?));
            }
            other => return Err(ConfigError::UnknownWidgetType(other.to_string())),
        };
        apply_geometry(widget.as_mut(), config)?;
        Ok(widget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::HANDLE;
    use ember_core::Callable;

    #[test]
    fn builds_by_type_tag() {
        let factory = BuiltinFactory::default();
        let w = factory.section(HANDLE).unwrap();
        assert_eq!(w.type_name(), "gui_section");
        assert_eq!((w.width(), w.height()), (16, 10));

        let cfg = Value::map()
            .with("type", "rect")
            .with("width", 4)
            .with("height", 2)
            .with("x", 10);
        let w = factory.create(&cfg, None).unwrap();
        assert_eq!(w.type_name(), "rect");
        assert_eq!(w.x(), 10);
    }

    #[test]
    fn section_config_round_trips_through_to_value() {
        let factory = BuiltinFactory::default();
        let cfg = Value::map()
            .with("type", "gui_section")
            .with("section", HANDLE)
            .with("y", 30)
            .with("height", 50);
        let w = factory.create(&cfg, None).unwrap();
        let copy = factory.create(&w.to_value(), None).unwrap();
        assert_eq!(copy.geometry(), w.geometry());
        assert_eq!(copy.get("section").unwrap(), Value::from(HANDLE));
    }

    #[test]
    fn rejects_unknown_or_missing_types() {
        let factory = BuiltinFactory::default();
        assert!(matches!(
            factory.create(&Value::map().with("type", "slider"), None),
            Err(ConfigError::UnknownWidgetType(t)) if t == "slider"
        ));
        assert!(matches!(
            factory.create(&Value::map(), None),
            Err(ConfigError::MissingKey("type"))
        ));
        assert!(matches!(
            factory.section("missing-section"),
            Err(ConfigError::UnknownSection(_))
        ));
    }
}
