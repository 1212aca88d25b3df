//! [`SchemaDocument`]: a single [`FunctionSchema`] or a [`ToolsArray`]
//! envelope of them, as accepted from users.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    schema::FunctionSchema,
    validate::{is_no_schema, ValidationResult, Validator},
};

/// Result type for this module. See also [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `{"tools": [...]}` envelope of several [`FunctionSchema`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolsArray {
    /// The functions. A valid envelope has at least one.
    pub tools: Vec<FunctionSchema>,
}

impl FromIterator<FunctionSchema> for ToolsArray {
    fn from_iter<I: IntoIterator<Item = FunctionSchema>>(iter: I) -> Self {
        Self {
            tools: iter.into_iter().collect(),
        }
    }
}

/// A validated document.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_more::From,
    derive_more::IsVariant,
)]
#[serde(untagged)]
pub enum SchemaDocument {
    /// `{"tools": [...]}`.
    Tools(ToolsArray),
    /// A single function.
    Single(FunctionSchema),
}

impl SchemaDocument {
    /// Parse and validate JSON text with the default [`Validator`].
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with(&Validator::default(), text)
    }

    /// Parse and validate JSON text with a custom [`Validator`].
    pub fn parse_with(validator: &Validator, text: &str) -> Result<Self> {
        if is_no_schema(text) {
            return Err(Error::Empty);
        }
        let value: Value = serde_json::from_str(text)?;
        Self::from_value_with(validator, value)
    }

    /// Validate a parsed value with the default [`Validator`].
    pub fn from_value(value: Value) -> Result<Self> {
        Self::from_value_with(&Validator::default(), value)
    }

    /// Validate a parsed value with a custom [`Validator`]. The value is
    /// only deserialized once it has no errors.
    pub fn from_value_with(
        validator: &Validator,
        value: Value,
    ) -> Result<Self> {
        if value.is_null() {
            return Err(Error::Empty);
        }
        let result = validator.validate_value(&value);
        if !result.is_valid {
            return Err(Error::Invalid(result));
        }

        let document: Self = serde_json::from_value(value)?;

        #[cfg(feature = "log")]
        log::debug!(
            "Accepted schema document with functions: {:?}",
            document.function_names()
        );

        Ok(document)
    }

    /// The functions, in order.
    pub fn schemas(&self) -> &[FunctionSchema] {
        match self {
            Self::Tools(array) => &array.tools,
            Self::Single(schema) => std::slice::from_ref(schema),
        }
    }

    /// Consume the document and return the functions, in order.
    pub fn into_schemas(self) -> Vec<FunctionSchema> {
        match self {
            Self::Tools(array) => array.tools,
            Self::Single(schema) => vec![schema],
        }
    }

    /// Names of the functions, in order. A single function gives a one
    /// element list.
    pub fn function_names(&self) -> Vec<String> {
        self.schemas()
            .iter()
            .map(|schema| schema.function.name.clone())
            .collect()
    }

    /// Number of functions.
    pub fn len(&self) -> usize {
        self.schemas().len()
    }

    /// Returns true if there are no functions. A validated document is never
    /// empty.
    pub fn is_empty(&self) -> bool {
        self.schemas().is_empty()
    }
}

/// Why a [`SchemaDocument`] was not accepted.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Text is not JSON, or a validated value did not deserialize.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// The document has validation errors.
    #[error("Invalid schema: {}", .0.errors.join("; "))]
    Invalid(ValidationResult),
    /// Blank text or `null`.
    #[error("No schema given.")]
    Empty,
}

impl Error {
    /// The [`ValidationResult`], if validation is what failed.
    pub fn validation(&self) -> Option<&ValidationResult> {
        match self {
            Self::Invalid(result) => Some(result),
            Self::Parse(_) | Self::Empty => None,
        }
    }
}
