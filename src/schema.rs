//! [`FunctionSchema`] and [`Parameter`] types for OpenAI-style function
//! calling.
//!
//! These types describe a schema that has already passed [`validate`]. To
//! check arbitrary JSON, use the [`validate`] module first or go through
//! [`SchemaDocument::parse`], which does both.
//!
//! [`validate`]: crate::validate
//! [`SchemaDocument::parse`]: crate::SchemaDocument::parse
use serde::{Deserialize, Serialize};
use serde_json::Value;

mod properties;
pub use properties::Properties;

/// The `type` of a [`Parameter`].
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    /// A JSON string. This is the default for new parameters.
    #[default]
    #[display("string")]
    String,
    /// Any JSON number.
    #[display("number")]
    Number,
    /// A JSON number without a fractional part.
    #[display("integer")]
    Integer,
    /// `true` or `false`.
    #[display("boolean")]
    Boolean,
    /// A JSON array. Should come with [`Parameter::items`].
    #[display("array")]
    Array,
    /// A JSON object.
    #[display("object")]
    Object,
}

impl ParamType {
    /// Every [`ParamType`], in the order they are usually presented.
    pub const ALL: [ParamType; 6] = [
        Self::String,
        Self::Number,
        Self::Integer,
        Self::Boolean,
        Self::Array,
        Self::Object,
    ];

    /// The name used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Look up a [`ParamType`] by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Returns true if `value` is a legal value of this type. `null` is not.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => {
                value.is_i64()
                    || value.is_u64()
                    || value.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

/// Element type of an array [`Parameter`]. Arrays of arrays are not
/// supported.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum ItemType {
    #[default]
    #[display("string")]
    String,
    #[display("number")]
    Number,
    #[display("integer")]
    Integer,
    #[display("boolean")]
    Boolean,
    #[display("object")]
    Object,
}

impl ItemType {
    /// Every [`ItemType`].
    pub const ALL: [ItemType; 5] = [
        Self::String,
        Self::Number,
        Self::Integer,
        Self::Boolean,
        Self::Object,
    ];

    /// The name used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
        }
    }

    /// Look up an [`ItemType`] by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

/// `items` of an array [`Parameter`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Items {
    /// Type of each element.
    #[serde(rename = "type")]
    pub kind: ItemType,
}

impl From<ItemType> for Items {
    fn from(kind: ItemType) -> Self {
        Self { kind }
    }
}

/// One argument of a [`Function`].
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Type of the argument.
    #[serde(rename = "type")]
    pub kind: ParamType,
    /// Documentation for the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Allowed values. Only meaningful for [`ParamType::String`]. Must not be
    /// empty if present.
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Default value. Must be a legal value of [`kind`].
    ///
    /// [`kind`]: Self::kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Element type. Expected when [`kind`] is [`ParamType::Array`].
    ///
    /// [`kind`]: Self::kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,
    /// Nested properties when [`kind`] is [`ParamType::Object`]. These are
    /// passed through as-is.
    ///
    /// [`kind`]: Self::kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Map<String, Value>>,
    /// Required nested properties when [`kind`] is [`ParamType::Object`].
    ///
    /// [`kind`]: Self::kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl Parameter {
    /// Create a new [`Parameter`] of the given type with nothing else set.
    pub fn new(kind: ParamType) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Set the [`description`].
    ///
    /// [`description`]: Self::description
    pub fn description<S>(mut self, description: S) -> Self
    where
        S: Into<String>,
    {
        self.description = Some(description.into());
        self
    }

    /// Set the allowed [`enum_values`].
    ///
    /// [`enum_values`]: Self::enum_values
    pub fn enum_values<S, Ss>(mut self, values: Ss) -> Self
    where
        S: Into<String>,
        Ss: IntoIterator<Item = S>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Set the [`default`] value.
    ///
    /// [`default`]: Self::default
    pub fn default_value<V>(mut self, value: V) -> Self
    where
        V: Into<Value>,
    {
        self.default = Some(value.into());
        self
    }

    /// Set the element type of an array parameter.
    pub fn items(mut self, kind: ItemType) -> Self {
        self.items = Some(kind.into());
        self
    }
}

/// Literal `"function"` tag of a [`FunctionSchema`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum FunctionTag {
    #[default]
    Function,
}

/// Literal `"object"` tag of [`Parameters`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum ObjectTag {
    #[default]
    Object,
}

/// The `parameters` object of a [`Function`].
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Always `"object"`.
    #[serde(rename = "type")]
    pub tag: ObjectTag,
    /// Named [`Parameter`]s, in order.
    pub properties: Properties,
    /// Names of required parameters. Every entry must be a key of
    /// [`properties`].
    ///
    /// [`properties`]: Self::properties
    #[serde(default)]
    pub required: Vec<String>,
}

/// The `function` object of a [`FunctionSchema`].
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    /// Identifier the model calls the function by. Must match
    /// `[a-zA-Z_][a-zA-Z0-9_]*`.
    pub name: String,
    /// What the function does, 1 to 1000 characters.
    pub description: String,
    /// Arguments the function accepts.
    pub parameters: Parameters,
}

/// An OpenAI function-calling tool definition:
///
/// ```json
/// {"type": "function", "function": {"name": "...", "description": "...",
///   "parameters": {"type": "object", "properties": {}, "required": []}}}
/// ```
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    /// Always `"function"`.
    #[serde(rename = "type")]
    pub tag: FunctionTag,
    /// The function definition.
    pub function: Function,
}

impl FunctionSchema {
    /// Create a new [`FunctionSchema`] with no parameters.
    pub fn new<N, D>(name: N, description: D) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Self {
            tag: FunctionTag::Function,
            function: Function {
                name: name.into(),
                description: description.into(),
                parameters: Parameters::default(),
            },
        }
    }

    /// Add a [`Parameter`] and optionally mark it required.
    pub fn parameter<S>(
        mut self,
        name: S,
        param: Parameter,
        required: bool,
    ) -> Self
    where
        S: Into<String>,
    {
        let name = name.into();
        let parameters = &mut self.function.parameters;
        if required && !parameters.required.contains(&name) {
            parameters.required.push(name.clone());
        }
        parameters.properties.insert(name, param);
        self
    }

    /// Name of the function.
    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Returns true if the parameter `name` is listed as required.
    pub fn is_required(&self, name: &str) -> bool {
        self.function.parameters.required.iter().any(|r| r == name)
    }

    /// Convert to a [`serde_json::Value`].
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    /// Serialize as pretty-printed JSON with the canonical key order.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON text. This does **not** validate. See
    /// [`SchemaDocument::parse`] for that.
    ///
    /// [`SchemaDocument::parse`]: crate::SchemaDocument::parse
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

static_assertions::assert_impl_all!(FunctionSchema: Send, Sync);
static_assertions::assert_impl_all!(Parameter: Send, Sync);

impl TryFrom<Value> for FunctionSchema {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}
