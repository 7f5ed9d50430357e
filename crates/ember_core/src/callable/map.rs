use crate::callable::{Callable, FieldInfo, FieldKey};
use crate::error::FieldError;
use crate::value::Value;

/// Callable backed by an ordered list of named values.
///
/// Used to hand arguments to a script formula (the scrollbar passes its new
/// position as `yscroll`).  Field indices follow insertion order and every
/// field is writable; assigning an unknown name is an error, since the set
/// of arguments is fixed by whoever built the map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapCallable {
    entries: Vec<(&'static str, Value)>,
}

impl MapCallable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a named value.
    pub fn add(&mut self, name: &'static str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    pub fn with(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.add(name, value);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: FieldKey<'_>) -> Option<usize> {
        match key {
            FieldKey::Name(name) => self.entries.iter().position(|(n, _)| *n == name),
            FieldKey::Index(i) => (i < self.entries.len()).then_some(i),
        }
    }

    fn unknown(key: FieldKey<'_>) -> FieldError {
        FieldError::UnknownField {
            owner: "map",
            key: key.to_string(),
        }
    }
}

impl Callable for MapCallable {
    fn type_name(&self) -> &'static str {
        "map"
    }

    fn lookup_field(&self, key: FieldKey<'_>) -> Option<FieldInfo> {
        let index = self.position(key)?;
        Some(FieldInfo {
            index,
            name: self.entries[index].0,
            type_tag: "any",
            writable: true,
            owner: "map",
        })
    }

    fn fields(&self) -> Vec<FieldInfo> {
        (0..self.entries.len())
            .filter_map(|i| self.lookup_field(FieldKey::Index(i)))
            .collect()
    }

    fn get_field(&self, key: FieldKey<'_>) -> Result<Value, FieldError> {
        self.position(key)
            .map(|i| self.entries[i].1.clone())
            .ok_or_else(|| Self::unknown(key))
    }

    fn set_field(&mut self, key: FieldKey<'_>, value: Value) -> Result<(), FieldError> {
        let i = self.position(key).ok_or_else(|| Self::unknown(key))?;
        self.entries[i].1 = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_by_name_and_index() {
        let mut args = MapCallable::new().with("yscroll", 15).with("source", "wheel");
        assert_eq!(args.get("yscroll").unwrap(), Value::Int(15));
        assert_eq!(args.get_field(FieldKey::Index(1)).unwrap(), Value::from("wheel"));

        args.set("yscroll", Value::Int(20)).unwrap();
        assert_eq!(args.get("yscroll").unwrap(), Value::Int(20));
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn unknown_arguments_are_rejected() {
        let mut args = MapCallable::new().with("yscroll", 0);
        assert!(matches!(args.get("xscroll"), Err(FieldError::UnknownField { .. })));
        assert!(args.set("xscroll", Value::Int(1)).is_err());
        assert!(args.lookup_field(FieldKey::Index(4)).is_none());
    }

    #[test]
    fn add_replaces_existing_entry() {
        let mut args = MapCallable::new();
        args.add("yscroll", 1).add("yscroll", 2);
        assert_eq!(args.len(), 1);
        assert_eq!(args.fields()[0].name, "yscroll");
    }
}
