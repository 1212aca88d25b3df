//! The visual [`Form`] view of a [`FunctionSchema`].
use serde_json::Value;

use crate::schema::{
    FunctionSchema, ItemType, Items, ParamType, Parameter, Parameters,
    Properties,
};

/// Error for a [`Form`] edit that was not applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// No parameter has this name.
    #[error("Parameter `{0}` not found.")]
    NotFound(String),
    /// A parameter cannot be renamed to a blank name.
    #[error("Parameter name cannot be empty.")]
    EmptyName,
    /// Another parameter already has this name.
    #[error("Parameter `{0}` already exists.")]
    Duplicate(String),
}

/// One parameter row of a [`Form`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParamEntry {
    /// Parameter name. Unique within the [`Form`].
    pub key: String,
    /// The parameter.
    pub parameter: Parameter,
    /// Whether the name goes into `required`.
    pub required: bool,
    /// Whether the detail view is open. Not part of the schema.
    pub expanded: bool,
}

/// A change to one field of a [`ParamEntry`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParamEdit {
    /// Change the type.
    Type(ParamType),
    /// Mark or unmark as required.
    Required(bool),
    /// Set the description. Empty clears it.
    Description(String),
    /// Set the allowed values. [`None`] or an empty list clears them.
    Enum(Option<Vec<String>>),
    /// Set the allowed values from comma separated text, as typed into a
    /// single field. Blank entries are dropped.
    EnumCsv(String),
    /// Set or clear the default value.
    Default(Option<Value>),
    /// Set or clear the element type of an array.
    Items(Option<ItemType>),
}

impl ParamEdit {
    fn apply(self, entry: &mut ParamEntry) {
        let param = &mut entry.parameter;
        match self {
            Self::Type(kind) => param.kind = kind,
            Self::Required(required) => entry.required = required,
            Self::Description(description) => {
                param.description =
                    (!description.is_empty()).then_some(description)
            }
            Self::Enum(values) => {
                param.enum_values = values.filter(|v| !v.is_empty())
            }
            Self::EnumCsv(text) => {
                let values: Vec<String> = text
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(String::from)
                    .collect();
                param.enum_values = (!values.is_empty()).then_some(values);
            }
            Self::Default(value) => param.default = value,
            Self::Items(kind) => param.items = kind.map(Items::from),
        }
    }
}

/// The visual editor's fields. Parameters are an ordered list keyed by
/// name, so a rename is a list operation that keeps the row's position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Form {
    /// `function.name`.
    pub name: String,
    /// `function.description`.
    pub description: String,
    /// Parameter rows, in order.
    pub params: Vec<ParamEntry>,
}

impl Form {
    /// Derive the fields from a schema. Each row's `required` flag is merged
    /// from `function.parameters.required`. All rows start collapsed.
    pub fn from_schema(schema: &FunctionSchema) -> Self {
        let function = &schema.function;
        Self {
            name: function.name.clone(),
            description: function.description.clone(),
            params: function
                .parameters
                .properties
                .iter()
                .map(|(key, param)| ParamEntry {
                    key: key.to_string(),
                    parameter: param.clone(),
                    required: schema.is_required(key),
                    expanded: false,
                })
                .collect(),
        }
    }

    /// Build the canonical schema. `required` lists required rows in row
    /// order.
    pub fn build(&self) -> FunctionSchema {
        let properties: Properties = self
            .params
            .iter()
            .map(|entry| (entry.key.clone(), entry.parameter.clone()))
            .collect();
        let required = self
            .params
            .iter()
            .filter(|entry| entry.required)
            .map(|entry| entry.key.clone())
            .collect();

        let mut schema =
            FunctionSchema::new(self.name.clone(), self.description.clone());
        schema.function.parameters = Parameters {
            properties,
            required,
            ..Default::default()
        };
        schema
    }

    /// Index of the row named `key`.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.params.iter().position(|entry| entry.key == key)
    }

    /// Returns true if a row named `key` exists.
    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// The row named `key`.
    pub fn get(&self, key: &str) -> Option<&ParamEntry> {
        self.params.iter().find(|entry| entry.key == key)
    }

    fn get_mut(&mut self, key: &str) -> Result<&mut ParamEntry, EditError> {
        self.params
            .iter_mut()
            .find(|entry| entry.key == key)
            .ok_or_else(|| EditError::NotFound(key.to_string()))
    }

    /// Append a row. Fails if the name is blank or taken.
    pub fn push(&mut self, entry: ParamEntry) -> Result<(), EditError> {
        if entry.key.trim().is_empty() {
            return Err(EditError::EmptyName);
        }
        if self.contains(&entry.key) {
            return Err(EditError::Duplicate(entry.key));
        }
        self.params.push(entry);
        Ok(())
    }

    /// Remove the row named `key`.
    pub fn remove(&mut self, key: &str) -> Result<ParamEntry, EditError> {
        let index = self
            .position(key)
            .ok_or_else(|| EditError::NotFound(key.to_string()))?;
        Ok(self.params.remove(index))
    }

    /// Rename a row in place. Renaming to the same name does nothing.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), EditError> {
        if new.trim().is_empty() {
            return Err(EditError::EmptyName);
        }
        if old != new && self.contains(new) {
            return Err(EditError::Duplicate(new.to_string()));
        }
        self.get_mut(old)?.key = new.to_string();
        Ok(())
    }

    /// Apply a [`ParamEdit`] to the row named `key`.
    pub fn update(
        &mut self,
        key: &str,
        edit: ParamEdit,
    ) -> Result<(), EditError> {
        edit.apply(self.get_mut(key)?);
        Ok(())
    }

    /// Open or close the detail view of the row named `key`.
    pub fn set_expanded(
        &mut self,
        key: &str,
        expanded: bool,
    ) -> Result<(), EditError> {
        self.get_mut(key)?.expanded = expanded;
        Ok(())
    }

    /// Copy `expanded` flags from `previous` for rows that still exist.
    pub(crate) fn carry_expanded(&mut self, previous: &Form) {
        for entry in &mut self.params {
            entry.expanded =
                previous.get(&entry.key).is_some_and(|old| old.expanded);
        }
    }
}
