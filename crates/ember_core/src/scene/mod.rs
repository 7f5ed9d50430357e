//! Scene-level objects exposed to scripts.

pub mod camera;

pub use camera::{Camera, ViewMode};
