pub mod canvas;
pub mod event;
pub mod factory;
pub mod layout;
pub mod rect;
pub mod scroll;
pub mod scrollbar;
pub mod section;
#[cfg(feature = "winit-backend")]
pub mod ui;
pub mod widget;

pub use canvas::Canvas;
pub use event::InputEvent;
pub use factory::{BuiltinFactory, WidgetFactory};
pub use layout::{Rect, RenderCommand};
pub use rect::RectWidget;
pub use scroll::ScrollModel;
pub use scrollbar::{DragState, Part, ScrollBarWidget, ScrollHandler};
pub use section::{GuiSectionWidget, SectionSize, SectionTable};
#[cfg(feature = "winit-backend")]
pub use ui::Ui;
pub use widget::{widget_registry, widget_subtype, Geometry, Widget};
