//! Gui sections: named pieces of the skin texture, drawn stretched over a
//! widget's rectangle.

use std::collections::HashMap;

use ember_core::{ConfigError, FieldRegistry, Reflect, Value};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::layout::RenderCommand;
use crate::widget::{geometry_value, widget_subtype, Geometry, Widget};

pub const UP_ARROW: &str = "scrollbar-vertical-up-arrow";
pub const DOWN_ARROW: &str = "scrollbar-vertical-down-arrow";
pub const HANDLE: &str = "scrollbar-vertical-handle-middle";
pub const HANDLE_BOTTOM: &str = "scrollbar-vertical-handle-bottom";
pub const HANDLE_TOP: &str = "scrollbar-vertical-handle-top";
pub const BACKGROUND: &str = "scrollbar-vertical-background";

/// Native pixel size of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSize {
    pub width: i32,
    pub height: i32,
}

/// Section sizes by name.  Loaded from RON:
///
/// ```ron
/// {
///     "scrollbar-vertical-up-arrow": (width: 16, height: 16),
///     "scrollbar-vertical-background": (width: 16, height: 8),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionTable {
    sections: HashMap<String, SectionSize>,
}

impl SectionTable {
    pub fn empty() -> Self {
        Self {
            sections: HashMap::new(),
        }
    }

    pub fn from_ron(source: &str) -> Result<Self, ConfigError> {
        ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn insert(&mut self, name: impl Into<String>, width: i32, height: i32) {
        self.sections
            .insert(name.into(), SectionSize { width, height });
    }

    pub fn size(&self, name: &str) -> Option<SectionSize> {
        self.sections.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Adds every entry of `other`, replacing sections with the same name.
    pub fn merge(&mut self, other: SectionTable) {
        self.sections.extend(other.sections);
    }
}

impl Default for SectionTable {
    /// The stock vertical scroll bar skin.
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert(UP_ARROW, 16, 16);
        table.insert(DOWN_ARROW, 16, 16);
        table.insert(HANDLE, 16, 10);
        table.insert(HANDLE_BOTTOM, 16, 3);
        table.insert(HANDLE_TOP, 16, 3);
        table.insert(BACKGROUND, 16, 8);
        table
    }
}

/// Widget that draws a single gui section.
#[derive(Debug, Clone, PartialEq)]
pub struct GuiSectionWidget {
    section: String,
    geometry: Geometry,
}

impl GuiSectionWidget {
    /// Section widget at its native size.
    pub fn new(section: &str, table: &SectionTable) -> Result<Self, ConfigError> {
        let size = table
            .size(section)
            .ok_or_else(|| ConfigError::UnknownSection(section.to_string()))?;
        Ok(Self {
            section: section.to_string(),
            geometry: Geometry::new(0, 0, size.width, size.height),
        })
    }

    pub fn section(&self) -> &str {
        &self.section
    }
}

impl Widget for GuiSectionWidget {
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
        cmds.push(RenderCommand::Section {
            rect: self.geometry.to_rect(),
            name: self.section.clone(),
        });
    }

    fn to_value(&self) -> Value {
        let out = Value::map()
            .with("type", "gui_section")
            .with("section", self.section.as_str());
        geometry_value(out, self.geometry)
    }
}

static GUI_SECTION: Lazy<FieldRegistry<GuiSectionWidget>> = Lazy::new(|| {
    widget_subtype::<GuiSectionWidget>("gui_section")
        .read_only("section", "string", |w| w.section.as_str().into())
});

impl Reflect for GuiSectionWidget {
    fn registry() -> &'static FieldRegistry<Self> {
        &GUI_SECTION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::{Callable, FieldError};

    #[test]
    fn default_table_has_scrollbar_skin() {
        let table = SectionTable::default();
        for name in [UP_ARROW, DOWN_ARROW, HANDLE, HANDLE_BOTTOM, HANDLE_TOP, BACKGROUND] {
            assert!(table.contains(name), "missing {name}");
        }
        assert_eq!(table.size(UP_ARROW), Some(SectionSize { width: 16, height: 16 }));
    }

    #[test]
    fn table_loads_from_ron() {
        let mut table = SectionTable::from_ron(
            r#"{
                "button-normal": (width: 40, height: 12),
                "scrollbar-vertical-up-arrow": (width: 20, height: 18),
            }"#,
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.size("button-normal").unwrap().width, 40);

        let mut skin = SectionTable::default();
        skin.merge(table.clone());
        assert_eq!(skin.size(UP_ARROW).unwrap().height, 18);
        assert_eq!(skin.len(), 7);

        table.insert("extra", 1, 1);
        assert!(SectionTable::from_ron("{ \"broken\": (width: 1) }").is_err());
    }

    #[test]
    fn section_widget_draws_its_section() {
        let table = SectionTable::default();
        let mut w = GuiSectionWidget::new(HANDLE_TOP, &table).unwrap();
        w.set_loc(5, 7);
        let mut cmds = Vec::new();
        w.draw(&mut cmds);
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].section(), Some(HANDLE_TOP));
        assert_eq!(cmds[0].rect().y, 7.0);
        assert_eq!(cmds[0].rect().height, 3.0);

        assert!(matches!(
            GuiSectionWidget::new("nope", &table),
            Err(ConfigError::UnknownSection(_))
        ));
    }

    #[test]
    fn section_field_is_read_only() {
        let table = SectionTable::default();
        let mut w = GuiSectionWidget::new(UP_ARROW, &table).unwrap();
        assert_eq!(w.get("section").unwrap(), Value::from(UP_ARROW));
        assert_eq!(w.get("width").unwrap(), Value::Int(16));
        assert_eq!(w.get("type").unwrap(), Value::from("gui_section"));
        assert!(matches!(
            w.set("section", Value::from(HANDLE)),
            Err(FieldError::ReadOnlyField { field: "section", .. })
        ));
    }
}
