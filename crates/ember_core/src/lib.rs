// ember_core: valores dinámicos, registro de campos y cámara

pub mod callable;
pub mod error;
pub mod input;
pub mod scene;
pub mod script;
pub mod value;

pub use callable::{Callable, FieldInfo, FieldKey, FieldRegistry, MapCallable, Reflect};
pub use error::{ConfigError, FieldError};
pub use input::{InputState, MouseButton, MouseSource};
pub use scene::{Camera, ViewMode};
pub use script::{run_handler, Environment, Formula};
pub use value::Value;

// downstream crates use the same math types without a direct dependency
pub use glam;
