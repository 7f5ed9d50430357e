use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use ember_core::Value;
use log::LevelFilter;
use serde::Deserialize;

/// Configuración inicial de la ventana y el motor, leída de `app.toml`.
///
/// ```toml
/// [window]
/// title = "Inventory"
/// width = 1280
/// height = 720
///
/// [log]
/// level = "debug"
///
/// [ui]
/// sections = "skin.ron"
/// layout = "layout.ron"
///
/// [camera]
/// fov = 60.0
/// position = [0.0, 2.0, 8.0]
/// ```
///
/// Every table is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub log: LogConfig,
    pub ui: UiConfig,
    /// Passed untouched to `Camera::from_config`.
    pub camera: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Ember Application".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> Result<LevelFilter> {
        self.level
            .parse::<LevelFilter>()
            .map_err(|_| anyhow!("invalid log level `{}`", self.level))
    }
}

/// RON files describing the skin and the initial widget tree.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub sections: Option<PathBuf>,
    pub layout: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).context("parsing app configuration")
    }

    /// Reads `path`; relative ui paths are resolved against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let mut config = Self::from_toml_str(&source)
            .with_context(|| format!("loading {}", path.display()))?;
        if let Some(dir) = path.parent() {
            config.ui.resolve_against(dir);
        }
        Ok(config)
    }

    pub fn aspect(&self) -> f32 {
        self.window.width as f32 / self.window.height.max(1) as f32
    }
}

impl UiConfig {
    fn resolve_against(&mut self, dir: &Path) {
        for path in [&mut self.sections, &mut self.layout].into_iter().flatten() {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
    }
}
