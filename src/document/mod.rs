//! Format-agnostic workflow document tree.
//!
//! The workflow builder produces a [`Value`] tree and the renderer turns it
//! into text. Nothing in here knows what any key means.

pub mod render;

use indexmap::IndexMap;

pub use render::render;

/// Insertion-ordered mapping; keys are unique by construction.
pub type Mapping = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Mapping(Mapping),
    Sequence(Vec<Value>),
    /// Rendered verbatim after its key or list marker.
    Scalar(String),
    Boolean(bool),
    /// Rendered as a literal block, one source line per output line.
    Multiline(String),
}

impl Value {
    pub fn mapping() -> MappingBuilder {
        MappingBuilder::default()
    }

    pub fn multiline<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined: Vec<String> = lines
            .into_iter()
            .map(|line| line.as_ref().to_string())
            .collect();
        Value::Multiline(joined.join("\n"))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Text of a scalar or multiline value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(text) | Value::Multiline(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Look up `key` if this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping().and_then(|map| map.get(key))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Scalar(value.clone())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Scalar(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<Mapping> for Value {
    fn from(value: Mapping) -> Self {
        Value::Mapping(value)
    }
}

impl From<MappingBuilder> for Value {
    fn from(value: MappingBuilder) -> Self {
        value.build()
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }
}

/// Chained construction of a [`Value::Mapping`].
#[derive(Debug, Default, Clone)]
pub struct MappingBuilder {
    entries: Mapping,
}

impl MappingBuilder {
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn with_opt(self, key: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    pub fn build(self) -> Value {
        Value::Mapping(self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_preserves_insertion_order() {
        let value = Value::mapping()
            .with("zeta", "1")
            .with("alpha", true)
            .with("mid", vec!["a", "b"])
            .build();
        let keys: Vec<_> = value.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn repeated_key_replaces_in_place() {
        let value = Value::mapping()
            .with("a", "1")
            .with("b", "2")
            .with("a", "3")
            .build();
        let map = value.as_mapping().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get_index(0).unwrap().1.as_str(), Some("3"));
    }

    #[test]
    fn multiline_joins_lines() {
        let value = Value::multiline(["echo one", "", "echo two"]);
        assert_eq!(value, Value::Multiline("echo one\n\necho two".into()));
    }

    #[test]
    fn optional_entries_are_skipped() {
        let value = Value::mapping()
            .with_opt("present", Some("x"))
            .with_opt("absent", None::<&str>)
            .build();
        assert!(value.get("present").is_some());
        assert!(value.get("absent").is_none());
    }
}
