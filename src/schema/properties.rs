//! Ordered [`Properties`] map for [`Parameters`].
//!
//! [`Parameters`]: crate::schema::Parameters
use std::fmt;

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

use super::Parameter;

/// Named [`Parameter`]s in the order they were written or added. Serializes
/// as a JSON object. Names are unique; inserting an existing name replaces
/// the [`Parameter`] in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    entries: Vec<(String, Parameter)>,
}

impl Properties {
    /// Create an empty [`Properties`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty [`Properties`] with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a [`Parameter`] by name.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, param)| param)
    }

    /// Get a mutable [`Parameter`] by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, param)| param)
    }

    /// Returns true if a [`Parameter`] named `name` exists.
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert a [`Parameter`]. If `name` already exists the old value is
    /// replaced at the same position and returned.
    pub fn insert<S>(&mut self, name: S, param: Parameter) -> Option<Parameter>
    where
        S: Into<String>,
    {
        let name = name.into();
        match self.get_mut(&name) {
            Some(existing) => Some(std::mem::replace(existing, param)),
            None => {
                self.entries.push((name, param));
                None
            }
        }
    }

    /// Remove a [`Parameter`] by name, keeping the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<Parameter> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Rename a [`Parameter`] without moving it. Returns false if `old` is
    /// missing or `new` is taken by another parameter.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        if old != new && self.contains_key(new) {
            return false;
        }
        match self.entries.iter_mut().find(|(key, _)| key == old) {
            Some((key, _)) => {
                *key = new.to_string();
                true
            }
            None => false,
        }
    }

    /// Iterate over parameter names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Iterate over `(name, parameter)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.entries.iter().map(|(key, param)| (key.as_str(), param))
    }
}

impl<S> FromIterator<(S, Parameter)> for Properties
where
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (S, Parameter)>>(iter: I) -> Self {
        let mut properties = Self::new();
        for (name, param) in iter {
            properties.insert(name, param);
        }
        properties
    }
}

impl IntoIterator for Properties {
    type Item = (String, Parameter);
    type IntoIter = std::vec::IntoIter<(String, Parameter)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Properties {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, param) in &self.entries {
            map.serialize_entry(name, param)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(PropertiesVisitor)
    }
}

struct PropertiesVisitor;

impl<'de> Visitor<'de> for PropertiesVisitor {
    type Value = Properties;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of parameter names to parameters")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut properties =
            Properties::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((name, param)) =
            access.next_entry::<String, Parameter>()?
        {
            properties.insert(name, param);
        }
        Ok(properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ParamType;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut props = Properties::new();
        props.insert("a", Parameter::new(ParamType::String));
        props.insert("b", Parameter::new(ParamType::Integer));

        let old = props.insert("a", Parameter::new(ParamType::Boolean));

        assert_eq!(old.map(|p| p.kind), Some(ParamType::String));
        assert_eq!(props.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(props.get("a").unwrap().kind, ParamType::Boolean);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut props: Properties = [
            ("x", Parameter::new(ParamType::String)),
            ("y", Parameter::new(ParamType::Number)),
            ("z", Parameter::new(ParamType::Object)),
        ]
        .into_iter()
        .collect();

        assert!(props.remove("y").is_some());
        assert!(props.remove("y").is_none());
        assert_eq!(props.keys().collect::<Vec<_>>(), ["x", "z"]);
    }

    #[test]
    fn test_rename_keeps_position() {
        let mut props: Properties = [
            ("a", Parameter::new(ParamType::String)),
            ("b", Parameter::new(ParamType::Integer)),
        ]
        .into_iter()
        .collect();

        assert!(props.rename("a", "c"));
        assert!(!props.rename("c", "b"));
        assert!(!props.rename("missing", "d"));
        assert!(props.rename("b", "b"));
        assert_eq!(props.keys().collect::<Vec<_>>(), ["c", "b"]);
        assert_eq!(props.get("c").unwrap().kind, ParamType::String);
    }

    #[test]
    fn test_deserialize_keeps_document_order() {
        let json = r#"{
            "zeta": {"type": "string"},
            "alpha": {"type": "integer"},
            "mid": {"type": "boolean"}
        }"#;

        let props: Properties = serde_json::from_str(json).unwrap();
        assert_eq!(props.keys().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);

        let out = serde_json::to_string(&props).unwrap();
        assert_eq!(
            out,
            r#"{"zeta":{"type":"string"},"alpha":{"type":"integer"},"mid":{"type":"boolean"}}"#
        );
    }
}
