//! Application layer: reads `app.toml`, installs the logger and assembles
//! the [`Stage`] the script runtime talks to.

pub mod config;
pub mod logging;
pub mod stage;

pub use config::{AppConfig, LogConfig, UiConfig, WindowConfig};
pub use stage::Stage;

// re-export so applications only depend on ember_app
pub use ember_core;
pub use ember_gui;
