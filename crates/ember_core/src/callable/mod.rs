//! Named/indexed field access for the script runtime.
//!
//! Native types describe their scriptable surface once, as a static
//! [`FieldRegistry`], and implement [`Reflect`] to point at it.  Every
//! `Reflect` type is automatically a [`Callable`], which is the object-safe
//! interface the script runtime holds (`&mut dyn Callable`).

mod map;
mod registry;

pub use map::MapCallable;
pub use registry::{FieldDescriptor, FieldInfo, FieldKey, FieldRegistry, Getter, Setter};

use crate::error::FieldError;
use crate::value::Value;

/// Object exposing typed fields to the script runtime.
pub trait Callable {
    fn type_name(&self) -> &'static str;

    fn lookup_field(&self, key: FieldKey<'_>) -> Option<FieldInfo>;

    /// All fields, base chain included, in index order.
    fn fields(&self) -> Vec<FieldInfo>;

    fn get_field(&self, key: FieldKey<'_>) -> Result<Value, FieldError>;

    fn set_field(&mut self, key: FieldKey<'_>, value: Value) -> Result<(), FieldError>;

    /// Shorthand for `get_field(FieldKey::Name(name))`.
    fn get(&self, name: &str) -> Result<Value, FieldError> {
        self.get_field(FieldKey::Name(name))
    }

    /// Shorthand for `set_field(FieldKey::Name(name), value)`.
    fn set(&mut self, name: &str, value: Value) -> Result<(), FieldError> {
        self.set_field(FieldKey::Name(name), value)
    }
}

/// Implemented by types whose fields are described by a static registry.
pub trait Reflect: Sized + 'static {
    fn registry() -> &'static FieldRegistry<Self>;
}

impl<T: Reflect> Callable for T {
    fn type_name(&self) -> &'static str {
        T::registry().type_name()
    }

    fn lookup_field(&self, key: FieldKey<'_>) -> Option<FieldInfo> {
        T::registry().lookup(key)
    }

    fn fields(&self) -> Vec<FieldInfo> {
        T::registry().fields()
    }

    fn get_field(&self, key: FieldKey<'_>) -> Result<Value, FieldError> {
        T::registry().get(self, key)
    }

    fn set_field(&mut self, key: FieldKey<'_>, value: Value) -> Result<(), FieldError> {
        T::registry().set(self, key, value)
    }
}
