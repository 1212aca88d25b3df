//! Structural validation of OpenAI function schemas.
//!
//! A [`Validator`] checks an arbitrary [`serde_json::Value`] (or JSON text)
//! against the [`FunctionSchema`] shape, or against a `{"tools": [...]}`
//! envelope of them, and produces a [`Report`] of [`Issue`]s. Nothing here
//! panics or returns `Err`: malformed input is just another [`Issue`]. Blank
//! text and JSON `null` mean "no schema" and produce an empty [`Report`].
//!
//! Issues are emitted in a fixed order for each function: structural, then
//! per-property shape (with warnings), then enum quality, then the `required`
//! cross-check. In a tools envelope, functions are visited in index order.
//!
//! For the common case, use [`validate_json`] or [`validate_value`] which
//! flatten the report into a [`ValidationResult`].
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::{FunctionSchema, ItemType, ParamType};

/// Default upper bound for `function.description`, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Whether an [`Issue`] blocks acceptance of a schema.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The schema is invalid.
    Error,
    /// Advisory only.
    Warning,
}

/// [`Validator`] options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Maximum length of `function.description`, in characters.
    pub max_description_len: usize,
    /// How to report an array parameter without `items`.
    pub missing_items: Severity,
    /// How to report a parameter without a description.
    pub missing_description: Severity,
}

/// Default options. Missing `items` and descriptions are warnings.
pub const DEFAULT_OPTIONS: Options = Options {
    max_description_len: MAX_DESCRIPTION_LEN,
    missing_items: Severity::Warning,
    missing_description: Severity::Warning,
};

/// Strict options. An array parameter without `items` is an error, since
/// its shape is ambiguous to anything generating code from the schema.
pub const STRICT_OPTIONS: Options = Options {
    missing_items: Severity::Error,
    ..DEFAULT_OPTIONS
};

impl Default for Options {
    fn default() -> Self {
        DEFAULT_OPTIONS
    }
}

/// What is wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum IssueKind {
    /// The input text is not JSON. Nothing else was checked.
    InvalidJson,
    /// The schema could not be converted to JSON for checking.
    Malformed {
        /// Serializer error message.
        message: String,
    },
    /// A field is missing or has the wrong shape. `path` is dotted, relative
    /// to the function (or envelope) root, and may be empty.
    Structural {
        #[allow(missing_docs)]
        path: String,
        #[allow(missing_docs)]
        message: String,
    },
    /// A parameter has the wrong shape.
    PropertyShape {
        /// Parameter name.
        name: String,
        /// One reason per problem.
        reasons: Vec<String>,
    },
    /// A parameter's `enum` is not an array or is empty.
    EmptyEnum {
        /// Parameter name.
        name: String,
    },
    /// A name in `required` has no matching parameter.
    MissingRequired {
        /// The required name.
        name: String,
    },
    /// An array parameter has no `items`.
    MissingItems {
        /// Parameter name.
        name: String,
    },
    /// A parameter has no description.
    MissingDescription {
        /// Parameter name.
        name: String,
    },
    /// A valid tools envelope was given where a single function was
    /// expected.
    UnexpectedToolsArray,
}

impl IssueKind {
    /// Dotted path of the offending field, relative to the function root.
    pub fn path(&self) -> String {
        match self {
            Self::InvalidJson | Self::Malformed { .. } => String::new(),
            Self::UnexpectedToolsArray => "tools".to_string(),
            Self::Structural { path, .. } => path.clone(),
            Self::PropertyShape { name, .. }
            | Self::MissingItems { name }
            | Self::MissingDescription { name } => {
                format!("function.parameters.properties.{name}")
            }
            Self::EmptyEnum { name } => {
                format!("function.parameters.properties.{name}.enum")
            }
            Self::MissingRequired { .. } => {
                "function.parameters.required".to_string()
            }
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson => f.write_str("Invalid JSON format"),
            Self::Malformed { message } => {
                write!(f, "Invalid JSON schema format: {message}")
            }
            Self::Structural { path, message } if path.is_empty() => {
                f.write_str(message)
            }
            Self::Structural { path, message } => {
                write!(f, "{path}: {message}")
            }
            Self::PropertyShape { name, reasons } => {
                write!(f, "Property \"{name}\": {}", reasons.join(", "))
            }
            Self::EmptyEnum { name } => {
                write!(f, "Property \"{name}\" enum must be a non-empty array")
            }
            Self::MissingRequired { name } => {
                write!(f, "Required field \"{name}\" not found in properties")
            }
            Self::MissingItems { name } => write!(
                f,
                "Property \"{name}\" is an array but missing \"items\" specification"
            ),
            Self::MissingDescription { name } => {
                write!(f, "Property \"{name}\" is missing a description")
            }
            Self::UnexpectedToolsArray => f.write_str(
                "Expected a single function schema, received a tools array",
            ),
        }
    }
}

/// One finding of a [`Validator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Index into the `tools` envelope, if any. Zero based.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<usize>,
    /// Whether this blocks acceptance.
    pub severity: Severity,
    /// What is wrong.
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl Issue {
    /// Create an [`Severity::Error`] issue.
    pub fn error(tool: Option<usize>, kind: IssueKind) -> Self {
        Self {
            tool,
            severity: Severity::Error,
            kind,
        }
    }

    /// Create a [`Severity::Warning`] issue.
    pub fn warning(tool: Option<usize>, kind: IssueKind) -> Self {
        Self {
            tool,
            severity: Severity::Warning,
            kind,
        }
    }

    /// Dotted path of the offending field from the document root, including
    /// the `tools.<index>` prefix in an envelope.
    pub fn path(&self) -> String {
        let path = self.kind.path();
        match self.tool {
            Some(index) if path.is_empty() => format!("tools.{index}"),
            Some(index) => format!("tools.{index}.{path}"),
            None => path,
        }
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(index) = self.tool {
            // Displayed one based.
            write!(f, "Tool {}: ", index + 1)?;
        }
        write!(f, "{}", self.kind)
    }
}

/// All [`Issue`]s found in one input, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// The issues.
    pub issues: Vec<Issue>,
}

impl Report {
    /// Add an [`Issue`].
    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Iterate over errors.
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity.is_error())
    }

    /// Iterate over warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity.is_warning())
    }

    /// Returns true if there are no errors. Warnings don't count.
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    /// Flatten into a [`ValidationResult`].
    pub fn into_result(self) -> ValidationResult {
        self.into()
    }
}

/// Flattened outcome of validation, ready to display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// True iff `errors` is empty.
    pub is_valid: bool,
    /// Problems that make the schema unusable.
    pub errors: Vec<String>,
    /// Advisory suggestions. May be non-empty for a valid schema.
    pub warnings: Vec<String>,
}

impl From<Report> for ValidationResult {
    fn from(report: Report) -> Self {
        let errors: Vec<String> =
            report.errors().map(ToString::to_string).collect();
        let warnings = report.warnings().map(ToString::to_string).collect();
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Checks JSON against the function schema shape. Cheap to construct and
/// stateless apart from its [`Options`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validator {
    options: Options,
}

impl Validator {
    /// Create a [`Validator`] with the given [`Options`].
    pub const fn new(options: Options) -> Self {
        Self { options }
    }

    /// The [`Options`] in use.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Parse `text` and check it. Text that is not JSON yields a single
    /// [`IssueKind::InvalidJson`] error. See [`is_no_schema`] for input that
    /// yields an empty report.
    pub fn report_json(&self, text: &str) -> Report {
        if is_no_schema(text) {
            return Report::default();
        }
        match serde_json::from_str::<Value>(text) {
            Ok(value) => self.report_value(&value),
            Err(_e) => {
                #[cfg(feature = "log")]
                log::debug!("Schema text is not JSON: {}", _e);

                Report {
                    issues: vec![Issue::error(None, IssueKind::InvalidJson)],
                }
            }
        }
    }

    /// Check a parsed JSON value, either a single function or a `tools`
    /// envelope. `null` is no schema and has no issues.
    pub fn report_value(&self, value: &Value) -> Report {
        let mut report = Report::default();
        if value.is_null() {
            return report;
        }

        match value.get("tools").and_then(Value::as_array) {
            Some(tools) => {
                if tools.is_empty() {
                    report.push(Issue::error(
                        None,
                        IssueKind::Structural {
                            path: "tools".into(),
                            message: "At least one tool is required".into(),
                        },
                    ));
                }
                for (index, tool) in tools.iter().enumerate() {
                    Checker::new(&self.options, Some(index), &mut report)
                        .function(tool);
                }
            }
            None => {
                Checker::new(&self.options, None, &mut report).function(value)
            }
        }

        #[cfg(feature = "log")]
        log::trace!(
            "Validated schema: {} errors, {} warnings",
            report.errors().count(),
            report.warnings().count()
        );

        report
    }

    /// [`report_json`] flattened into a [`ValidationResult`].
    ///
    /// [`report_json`]: Self::report_json
    pub fn validate_json(&self, text: &str) -> ValidationResult {
        self.report_json(text).into()
    }

    /// [`report_value`] flattened into a [`ValidationResult`].
    ///
    /// [`report_value`]: Self::report_value
    pub fn validate_value(&self, value: &Value) -> ValidationResult {
        self.report_value(value).into()
    }

    /// Check a typed [`FunctionSchema`], for example one built from a form.
    /// The types guarantee some of the shape but not names, lengths, or the
    /// `required` cross-check.
    pub fn report_schema(&self, schema: &FunctionSchema) -> Report {
        match schema.to_value() {
            Ok(value) => self.report_value(&value),
            Err(e) => Report {
                issues: vec![Issue::error(
                    None,
                    IssueKind::Malformed {
                        message: e.to_string(),
                    },
                )],
            },
        }
    }

    /// [`report_schema`] flattened into a [`ValidationResult`].
    ///
    /// [`report_schema`]: Self::report_schema
    pub fn validate_schema(&self, schema: &FunctionSchema) -> ValidationResult {
        self.report_schema(schema).into()
    }
}

/// Validate JSON text with [`DEFAULT_OPTIONS`].
pub fn validate_json(text: &str) -> ValidationResult {
    Validator::default().validate_json(text)
}

/// Validate a parsed value with [`DEFAULT_OPTIONS`].
pub fn validate_value(value: &Value) -> ValidationResult {
    Validator::default().validate_value(value)
}

/// Validate a typed [`FunctionSchema`] with [`DEFAULT_OPTIONS`].
pub fn validate_schema(schema: &FunctionSchema) -> ValidationResult {
    Validator::default().validate_schema(schema)
}

/// Validate user input. Blank input and `null` mean "no schema" and return
/// [`None`] rather than an "Invalid JSON format" error.
pub fn validate_input(text: &str) -> Option<ValidationResult> {
    if is_no_schema(text) {
        None
    } else {
        Some(validate_json(text))
    }
}

/// Returns true if `text` is blank or the JSON literal `null`, which both
/// stand for "no schema" rather than an invalid one.
pub fn is_no_schema(text: &str) -> bool {
    matches!(text.trim(), "" | "null")
}

/// Returns true if `name` matches `[a-zA-Z_][a-zA-Z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// JSON type name as used in messages.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expected(what: &str, got: &Value) -> String {
    format!("Expected {what}, received {}", type_name(got))
}

fn invalid_enum<'a>(
    allowed: impl IntoIterator<Item = &'a str>,
    got: &str,
) -> String {
    let allowed: Vec<String> =
        allowed.into_iter().map(|a| format!("'{a}'")).collect();
    format!(
        "Invalid enum value. Expected {}, received '{got}'",
        allowed.join(" | ")
    )
}

const REQUIRED: &str = "Required";

/// Checks one function and pushes what it finds.
struct Checker<'a> {
    options: &'a Options,
    tool: Option<usize>,
    report: &'a mut Report,
}

impl<'a> Checker<'a> {
    fn new(
        options: &'a Options,
        tool: Option<usize>,
        report: &'a mut Report,
    ) -> Self {
        Self {
            options,
            tool,
            report,
        }
    }

    fn push(&mut self, severity: Severity, kind: IssueKind) {
        self.report.push(Issue {
            tool: self.tool,
            severity,
            kind,
        });
    }

    fn structural<P, M>(&mut self, path: P, message: M)
    where
        P: Into<String>,
        M: Into<String>,
    {
        self.push(
            Severity::Error,
            IssueKind::Structural {
                path: path.into(),
                message: message.into(),
            },
        );
    }

    /// A field that must be an object.
    fn object<'v>(
        &mut self,
        path: &str,
        value: Option<&'v Value>,
    ) -> Option<&'v Map<String, Value>> {
        match value {
            None => {
                self.structural(path, REQUIRED);
                None
            }
            Some(Value::Object(map)) => Some(map),
            Some(other) => {
                self.structural(path, expected("object", other));
                None
            }
        }
    }

    /// A field that must be a string. Returns the string if it is one.
    fn string<'v>(
        &mut self,
        path: &str,
        value: Option<&'v Value>,
    ) -> Option<&'v str> {
        match value {
            None => {
                self.structural(path, REQUIRED);
                None
            }
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                self.structural(path, expected("string", other));
                None
            }
        }
    }

    fn literal(&mut self, path: &str, value: Option<&Value>, literal: &str) {
        match value {
            None => self.structural(path, REQUIRED),
            Some(Value::String(s)) if s == literal => {}
            Some(_) => self.structural(
                path,
                format!("Invalid literal value, expected \"{literal}\""),
            ),
        }
    }

    fn function(mut self, value: &Value) {
        let root = match value {
            Value::Object(map) => map,
            other => {
                self.structural("", expected("object", other));
                return;
            }
        };

        self.literal("type", root.get("type"), "function");

        let Some(function) = self.object("function", root.get("function"))
        else {
            return;
        };

        if let Some(name) = self.string("function.name", function.get("name"))
        {
            if name.is_empty() {
                self.structural("function.name", "Function name is required");
            } else if !is_identifier(name) {
                self.structural(
                    "function.name",
                    "Function name must be a valid identifier",
                );
            }
        }

        if let Some(description) =
            self.string("function.description", function.get("description"))
        {
            let len = description.chars().count();
            if len == 0 {
                self.structural(
                    "function.description",
                    "Function description is required",
                );
            } else if len > self.options.max_description_len {
                self.structural(
                    "function.description",
                    format!(
                        "Description must be at most {} characters",
                        self.options.max_description_len
                    ),
                );
            }
        }

        let Some(parameters) =
            self.object("function.parameters", function.get("parameters"))
        else {
            return;
        };

        self.literal(
            "function.parameters.type",
            parameters.get("type"),
            "object",
        );
        let properties = self.object(
            "function.parameters.properties",
            parameters.get("properties"),
        );
        let required = self.required(parameters.get("required"));

        let Some(properties) = properties else {
            return;
        };

        self.property_shapes(properties);
        self.enum_quality(properties);

        for name in required {
            if !properties.contains_key(name) {
                self.push(
                    Severity::Error,
                    IssueKind::MissingRequired { name: name.into() },
                );
            }
        }
    }

    /// `function.parameters.required`, which defaults to empty. Returns the
    /// string entries.
    fn required<'v>(&mut self, value: Option<&'v Value>) -> Vec<&'v str> {
        const PATH: &str = "function.parameters.required";

        let entries = match value {
            None => return Vec::new(),
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                self.structural(PATH, expected("array", other));
                return Vec::new();
            }
        };

        let mut names = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            match entry {
                Value::String(name) => names.push(name.as_str()),
                other => self.structural(
                    format!("{PATH}.{i}"),
                    expected("string", other),
                ),
            }
        }
        names
    }

    fn property_shapes(&mut self, properties: &Map<String, Value>) {
        for (name, prop) in properties {
            let reasons = shape_reasons(prop);
            if !reasons.is_empty() {
                self.push(
                    Severity::Error,
                    IssueKind::PropertyShape {
                        name: name.clone(),
                        reasons,
                    },
                );
            }

            let Value::Object(prop) = prop else {
                continue;
            };

            let is_array =
                prop.get("type").and_then(Value::as_str) == Some("array");
            if is_array && prop.get("items").map_or(true, Value::is_null) {
                self.push(
                    self.options.missing_items,
                    IssueKind::MissingItems { name: name.clone() },
                );
            }

            let undescribed = match prop.get("description") {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            };
            if undescribed {
                self.push(
                    self.options.missing_description,
                    IssueKind::MissingDescription { name: name.clone() },
                );
            }
        }
    }

    fn enum_quality(&mut self, properties: &Map<String, Value>) {
        for (name, prop) in properties {
            let ok = match prop.get("enum") {
                None | Some(Value::Null) => true,
                Some(Value::Array(values)) => !values.is_empty(),
                Some(_) => false,
            };
            if !ok {
                self.push(
                    Severity::Error,
                    IssueKind::EmptyEnum { name: name.clone() },
                );
            }
        }
    }
}

/// Everything wrong with the shape of one parameter. `enum` being an array
/// at all is left to the enum quality check.
fn shape_reasons(prop: &Value) -> Vec<String> {
    let prop = match prop {
        Value::Object(prop) => prop,
        other => return vec![expected("object", other)],
    };

    let mut reasons = Vec::new();

    let kind = match prop.get("type") {
        None => {
            reasons.push(format!("type: {REQUIRED}"));
            None
        }
        Some(Value::String(name)) => {
            let kind = ParamType::from_name(name);
            if kind.is_none() {
                reasons.push(format!(
                    "type: {}",
                    invalid_enum(ParamType::ALL.map(ParamType::as_str), name)
                ));
            }
            kind
        }
        Some(other) => {
            reasons.push(format!("type: {}", expected("string", other)));
            None
        }
    };

    if let Some(description) = prop.get("description") {
        if !description.is_string() {
            reasons.push(format!(
                "description: {}",
                expected("string", description)
            ));
        }
    }

    if let Some(Value::Array(values)) = prop.get("enum") {
        for (i, value) in values.iter().enumerate() {
            if !value.is_string() {
                reasons
                    .push(format!("enum.{i}: {}", expected("string", value)));
            }
        }
    }

    match prop.get("items") {
        None | Some(Value::Null) => {}
        Some(Value::Object(items)) => match items.get("type") {
            None => reasons.push(format!("items.type: {REQUIRED}")),
            Some(Value::String(name)) => {
                if ItemType::from_name(name).is_none() {
                    reasons.push(format!(
                        "items.type: {}",
                        invalid_enum(ItemType::ALL.map(ItemType::as_str), name)
                    ));
                }
            }
            Some(other) => reasons
                .push(format!("items.type: {}", expected("string", other))),
        },
        Some(other) => {
            reasons.push(format!("items: {}", expected("object", other)))
        }
    }

    if let (Some(kind), Some(default)) = (kind, prop.get("default")) {
        if !default.is_null() && !kind.accepts(default) {
            reasons.push(format!(
                "default: {}",
                expected(kind.as_str(), default)
            ));
        }
    }

    match prop.get("properties") {
        None | Some(Value::Object(_)) => {}
        Some(other) => {
            reasons.push(format!("properties: {}", expected("object", other)))
        }
    }

    match prop.get("required") {
        None => {}
        Some(Value::Array(names)) => {
            for (i, name) in names.iter().enumerate() {
                if !name.is_string() {
                    reasons.push(format!(
                        "required.{i}: {}",
                        expected("string", name)
                    ));
                }
            }
        }
        Some(other) => {
            reasons.push(format!("required: {}", expected("array", other)))
        }
    }

    reasons
}
