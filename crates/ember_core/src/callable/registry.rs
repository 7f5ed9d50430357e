//! Per-type field tables with base-type chaining.
//!
//! A `FieldRegistry<T>` is built once per type (usually inside a
//! `once_cell::sync::Lazy`) and never changes afterwards, so scripts may
//! cache an index for the lifetime of the program.
//!
//! Base fields occupy the lowest index range.  A derived registry links to
//! its base through a pair of upcast functions, which lets the base table be
//! keyed on a trait object (`dyn Widget`) while the derived table is keyed
//! on the concrete type.

use std::fmt;

use crate::error::FieldError;
use crate::value::Value;

/// Reads a field from its owner.
pub type Getter<T> = fn(&T) -> Value;

/// Writes a field.  Must validate the value's shape before mutating.
pub type Setter<T> = fn(&mut T, Value) -> Result<(), FieldError>;

/// Name or absolute index of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey<'a> {
    Name(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for FieldKey<'a> {
    fn from(name: &'a str) -> Self {
        FieldKey::Name(name)
    }
}

impl From<usize> for FieldKey<'_> {
    fn from(index: usize) -> Self {
        FieldKey::Index(index)
    }
}

impl fmt::Display for FieldKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Name(name) => f.write_str(name),
            FieldKey::Index(i) => write!(f, "#{i}"),
        }
    }
}

pub struct FieldDescriptor<T: ?Sized> {
    pub index: usize,
    pub name: &'static str,
    pub type_tag: &'static str,
    pub get: Getter<T>,
    /// `None` means the field is read-only.
    pub set: Option<Setter<T>>,
}

impl<T: ?Sized> FieldDescriptor<T> {
    pub fn info(&self, owner: &'static str) -> FieldInfo {
        FieldInfo {
            index: self.index,
            name: self.name,
            type_tag: self.type_tag,
            writable: self.set.is_some(),
            owner,
        }
    }
}

/// Metadata view of a descriptor, valid across the whole base chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub index: usize,
    pub name: &'static str,
    pub type_tag: &'static str,
    pub writable: bool,
    /// Type name of the registry that declared the field.
    pub owner: &'static str,
}

/// Type-erased view of a base registry as seen from a derived type `T`.
trait BaseLink<T: ?Sized>: Send + Sync {
    fn len(&self) -> usize;
    fn lookup(&self, key: FieldKey<'_>) -> Option<FieldInfo>;
    fn fields(&self, out: &mut Vec<FieldInfo>);
    fn get(&self, obj: &T, key: FieldKey<'_>) -> Result<Value, FieldError>;
    fn set(&self, obj: &mut T, key: FieldKey<'_>, value: Value) -> Result<(), FieldError>;
}

struct Upcast<T: ?Sized, B: ?Sized + 'static> {
    registry: &'static FieldRegistry<B>,
    up: fn(&T) -> &B,
    up_mut: fn(&mut T) -> &mut B,
}

impl<T: ?Sized, B: ?Sized + 'static> BaseLink<T> for Upcast<T, B> {
    fn len(&self) -> usize {
        self.registry.len()
    }

    fn lookup(&self, key: FieldKey<'_>) -> Option<FieldInfo> {
        self.registry.lookup(key)
    }

    fn fields(&self, out: &mut Vec<FieldInfo>) {
        self.registry.collect_fields(out);
    }

    fn get(&self, obj: &T, key: FieldKey<'_>) -> Result<Value, FieldError> {
        self.registry.get((self.up)(obj), key)
    }

    fn set(&self, obj: &mut T, key: FieldKey<'_>, value: Value) -> Result<(), FieldError> {
        self.registry.set((self.up_mut)(obj), key, value)
    }
}

pub struct FieldRegistry<T: ?Sized + 'static> {
    type_name: &'static str,
    fields: Vec<FieldDescriptor<T>>,
    base: Option<Box<dyn BaseLink<T>>>,
}

impl<T: ?Sized + 'static> FieldRegistry<T> {
    /// Registry with no base type.
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            fields: Vec::new(),
            base: None,
        }
    }

    /// Registry that falls back to `base` on a miss.  `up`/`up_mut` project
    /// a `T` onto the base's owner type.
    pub fn with_base<B: ?Sized + 'static>(
        type_name: &'static str,
        base: &'static FieldRegistry<B>,
        up: fn(&T) -> &B,
        up_mut: fn(&mut T) -> &mut B,
    ) -> Self {
        Self {
            type_name,
            fields: Vec::new(),
            base: Some(Box::new(Upcast {
                registry: base,
                up,
                up_mut,
            })),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Number of fields contributed by the base chain.
    pub fn base_len(&self) -> usize {
        self.base.as_ref().map_or(0, |b| b.len())
    }

    /// Total number of fields, base chain included.
    pub fn len(&self) -> usize {
        self.base_len() + self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers one descriptor at an absolute `index`.
    ///
    /// # Panics
    /// On a duplicate index or name within this type, or an index that falls
    /// inside the base range.  Registries are built from code, so these are
    /// programmer errors.
    pub fn register(
        &mut self,
        index: usize,
        name: &'static str,
        type_tag: &'static str,
        get: Getter<T>,
        set: Option<Setter<T>>,
    ) -> &mut Self {
        assert!(
            index >= self.base_len(),
            "{}: field `{name}` index {index} collides with the base range 0..{}",
            self.type_name,
            self.base_len()
        );
        assert!(
            self.fields.iter().all(|f| f.index != index),
            "{}: duplicate field index {index} (`{name}`)",
            self.type_name
        );
        assert!(
            self.fields.iter().all(|f| f.name != name),
            "{}: duplicate field name `{name}`",
            self.type_name
        );
        self.fields.push(FieldDescriptor {
            index,
            name,
            type_tag,
            get,
            set,
        });
        self.fields.sort_by_key(|f| f.index);
        self
    }

    /// Builder form of [`register`](Self::register) using the next free index.
    pub fn field(
        mut self,
        name: &'static str,
        type_tag: &'static str,
        get: Getter<T>,
        set: Setter<T>,
    ) -> Self {
        let index = self.next_index();
        self.register(index, name, type_tag, get, Some(set));
        self
    }

    /// Builder form for a field without a setter.
    pub fn read_only(mut self, name: &'static str, type_tag: &'static str, get: Getter<T>) -> Self {
        let index = self.next_index();
        self.register(index, name, type_tag, get, None);
        self
    }

    fn next_index(&self) -> usize {
        self.fields
            .last()
            .map_or(self.base_len(), |f| f.index + 1)
    }

    /// Descriptor declared by this type itself (base chain not consulted).
    pub fn descriptor(&self, key: FieldKey<'_>) -> Option<&FieldDescriptor<T>> {
        match key {
            FieldKey::Name(name) => self.fields.iter().find(|f| f.name == name),
            FieldKey::Index(index) => self.fields.iter().find(|f| f.index == index),
        }
    }

    /// Own table first, then the base chain.
    pub fn lookup(&self, key: FieldKey<'_>) -> Option<FieldInfo> {
        if let Some(desc) = self.descriptor(key) {
            return Some(desc.info(self.type_name));
        }
        self.base.as_ref()?.lookup(key)
    }

    /// Every field in the chain in index order.
    pub fn fields(&self) -> Vec<FieldInfo> {
        let mut out = Vec::with_capacity(self.len());
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields(&self, out: &mut Vec<FieldInfo>) {
        if let Some(base) = &self.base {
            base.fields(out);
        }
        out.extend(self.fields.iter().map(|f| f.info(self.type_name)));
    }

    pub fn get(&self, obj: &T, key: FieldKey<'_>) -> Result<Value, FieldError> {
        if let Some(desc) = self.descriptor(key) {
            return Ok((desc.get)(obj));
        }
        match &self.base {
            Some(base) => base.get(obj, key).map_err(|e| self.rename_unknown(e, key)),
            None => Err(self.unknown(key)),
        }
    }

    pub fn set(&self, obj: &mut T, key: FieldKey<'_>, value: Value) -> Result<(), FieldError> {
        if let Some(desc) = self.descriptor(key) {
            let Some(set) = desc.set else {
                return Err(FieldError::ReadOnlyField {
                    owner: self.type_name,
                    field: desc.name,
                });
            };
            return set(obj, value);
        }
        match &self.base {
            Some(base) => base
                .set(obj, key, value)
                .map_err(|e| self.rename_unknown(e, key)),
            None => Err(self.unknown(key)),
        }
    }

    fn unknown(&self, key: FieldKey<'_>) -> FieldError {
        FieldError::UnknownField {
            owner: self.type_name,
            key: key.to_string(),
        }
    }

    // a miss anywhere in the chain is reported against the most derived type
    fn rename_unknown(&self, err: FieldError, key: FieldKey<'_>) -> FieldError {
        match err {
            FieldError::UnknownField { .. } => self.unknown(key),
            other => other,
        }
    }
}

impl<T: ?Sized + 'static> fmt::Debug for FieldRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("type_name", &self.type_name)
            .field("base_len", &self.base_len())
            .field(
                "fields",
                &self.fields.iter().map(|d| d.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}
