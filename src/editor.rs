//! [`Editor`] keeps a visual [`Form`] and a JSON text buffer in sync over a
//! single canonical [`FunctionSchema`].
//!
//! The form and the text are two views. Every edit to either goes through
//! one transition that validates the candidate, updates the canonical value
//! (the candidate if valid, [`None`] otherwise) and notifies the listener
//! set with [`Editor::on_change`] exactly once.
//!
//! * A valid form edit rewrites the JSON buffer. An invalid one leaves the
//!   buffer as it was.
//! * A valid JSON edit rebuilds the form. An invalid one leaves the form as
//!   it was, so half-typed JSON never corrupts it.
//! * Blank JSON or `null` clears the schema and the validation state.
use std::{
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

use crate::{
    document::SchemaDocument,
    example::Example,
    schema::{FunctionSchema, ParamType, Parameter},
    validate::{
        is_no_schema, Issue, IssueKind, Options, ValidationResult, Validator,
    },
};

mod form;
pub use form::{EditError, Form, ParamEdit, ParamEntry};

/// Called with the canonical schema after every transition, or [`None`] when
/// there is no valid schema.
pub type Listener = Box<dyn FnMut(Option<&FunctionSchema>) + Send>;

/// Which view is displayed. This does not affect which view is
/// authoritative.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// The form.
    #[default]
    Visual,
    /// The JSON text.
    Json,
}

/// Which view an edit came from.
#[derive(Debug, Clone, Copy)]
enum Edit {
    /// The form changed.
    Form,
    /// The JSON buffer changed and holds something.
    Text,
    /// The JSON buffer is blank or `null`.
    Clear,
}

/// Editing session for one [`FunctionSchema`].
pub struct Editor {
    validator: Validator,
    mode: Mode,
    form: Form,
    json: String,
    schema: Option<FunctionSchema>,
    validation: Option<ValidationResult>,
    listener: Option<Listener>,
}

static_assertions::assert_impl_all!(Editor: Send);

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("mode", &self.mode)
            .field("form", &self.form)
            .field("json", &self.json)
            .field("schema", &self.schema)
            .field("validation", &self.validation)
            .field("listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Editor {
    /// Start a session, loading `value` into both views. The listener is not
    /// called. See [`load`](Self::load).
    pub fn new(value: Option<FunctionSchema>) -> Self {
        let mut editor = Self {
            validator: Validator::default(),
            mode: Mode::default(),
            form: Form::default(),
            json: String::new(),
            schema: None,
            validation: None,
            listener: None,
        };
        editor.load(value);
        editor
    }

    /// Use custom [`Options`] for validation. An accepted schema is checked
    /// again under the new options.
    pub fn with_options(mut self, options: Options) -> Self {
        self.validator = Validator::new(options);
        if let Some(schema) = self.schema.take() {
            self.load(Some(schema));
        }
        self
    }

    /// Set the listener called after every transition.
    pub fn on_change<F>(mut self, listener: F) -> Self
    where
        F: FnMut(Option<&FunctionSchema>) + Send + 'static,
    {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Replace both views with `value`, for example when the caller's copy
    /// changed. [`None`] starts over with an empty form. Expanded rows that
    /// survive stay expanded. The listener is not called.
    ///
    /// An invalid `value` is shown in both views but not accepted:
    /// [`schema`](Self::schema) is [`None`] and [`validation`] holds the
    /// errors. A valid one is accepted with no [`validation`].
    ///
    /// [`validation`]: Self::validation
    pub fn load(&mut self, value: Option<FunctionSchema>) {
        self.validation = None;
        self.schema = match value {
            Some(schema) => {
                let mut form = Form::from_schema(&schema);
                form.carry_expanded(&self.form);
                self.form = form;
                self.json = pretty(&schema).unwrap_or_default();

                let result = self.validator.validate_schema(&schema);
                if result.is_valid {
                    Some(schema)
                } else {
                    #[cfg(feature = "log")]
                    log::debug!(
                        "Loaded schema `{}` is invalid: {:?}",
                        schema.name(),
                        result.errors
                    );
                    self.validation = Some(result);
                    None
                }
            }
            None => {
                self.form = Form::default();
                self.json.clear();
                None
            }
        };
    }

    /// The displayed view.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch the displayed view. Nothing is revalidated.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// The form view.
    pub fn form(&self) -> &Form {
        &self.form
    }

    /// The JSON view.
    pub fn json(&self) -> &str {
        &self.json
    }

    /// The last accepted schema, or [`None`] if the latest edit or load was
    /// invalid or blank. Never an invalid schema.
    pub fn schema(&self) -> Option<&FunctionSchema> {
        self.schema.as_ref()
    }

    /// Outcome of the latest transition. [`None`] before any edit and after
    /// the JSON buffer is cleared.
    pub fn validation(&self) -> Option<&ValidationResult> {
        self.validation.as_ref()
    }

    /// Set `function.name` from the form.
    pub fn set_name<S>(&mut self, name: S) -> Option<&ValidationResult>
    where
        S: Into<String>,
    {
        self.form.name = name.into();
        self.apply_edit(Edit::Form)
    }

    /// Set `function.description` from the form.
    pub fn set_description<S>(
        &mut self,
        description: S,
    ) -> Option<&ValidationResult>
    where
        S: Into<String>,
    {
        self.form.description = description.into();
        self.apply_edit(Edit::Form)
    }

    /// Add an optional string parameter under a placeholder name seeded from
    /// the current time, open its detail view, and return the name.
    pub fn add_parameter(&mut self) -> String {
        let key = self.placeholder_key();
        self.form.params.push(ParamEntry {
            key: key.clone(),
            parameter: Parameter::new(ParamType::String),
            required: false,
            expanded: true,
        });
        self.apply_edit(Edit::Form);
        key
    }

    /// Remove a parameter and its detail view state.
    pub fn remove_parameter(
        &mut self,
        key: &str,
    ) -> Result<ParamEntry, EditError> {
        let entry = self.form.remove(key)?;
        self.apply_edit(Edit::Form);
        Ok(entry)
    }

    /// Rename a parameter, keeping its position, flags, and detail view
    /// state. A blank or taken name is rejected and nothing happens.
    pub fn rename_parameter(
        &mut self,
        old: &str,
        new: &str,
    ) -> Result<(), EditError> {
        if old == new && self.form.contains(old) {
            return Ok(());
        }
        if let Err(e) = self.form.rename(old, new) {
            #[cfg(feature = "log")]
            log::debug!("Rejected rename `{}` -> `{}`: {}", old, new, e);
            return Err(e);
        }
        self.apply_edit(Edit::Form);
        Ok(())
    }

    /// Change one field of a parameter.
    pub fn update_parameter(
        &mut self,
        key: &str,
        edit: ParamEdit,
    ) -> Result<(), EditError> {
        self.form.update(key, edit)?;
        self.apply_edit(Edit::Form);
        Ok(())
    }

    /// Open or close a parameter's detail view. This is not an edit.
    pub fn set_expanded(
        &mut self,
        key: &str,
        expanded: bool,
    ) -> Result<(), EditError> {
        self.form.set_expanded(key, expanded)
    }

    /// Replace the JSON buffer, as on a keystroke or paste.
    pub fn set_json<S>(&mut self, text: S) -> Option<&ValidationResult>
    where
        S: Into<String>,
    {
        self.json = text.into();
        if is_no_schema(&self.json) {
            self.apply_edit(Edit::Clear)
        } else {
            self.apply_edit(Edit::Text)
        }
    }

    /// Replace everything with a built-in [`Example`] and show the JSON view.
    pub fn load_example(
        &mut self,
        example: Example,
    ) -> Option<&ValidationResult> {
        self.mode = Mode::Json;
        let text = pretty(&example.schema()).unwrap_or_default();
        self.set_json(text)
    }

    /// Read a `.json` file into the JSON buffer, as on upload.
    pub fn load_file<P>(
        &mut self,
        path: P,
    ) -> std::io::Result<Option<&ValidationResult>>
    where
        P: AsRef<Path>,
    {
        let text = std::fs::read_to_string(path)?;
        Ok(self.set_json(text))
    }

    /// The single transition every edit goes through.
    fn apply_edit(&mut self, edit: Edit) -> Option<&ValidationResult> {
        self.schema = match edit {
            Edit::Clear => {
                self.validation = None;
                None
            }
            Edit::Form => {
                let candidate = self.form.build();
                let result = self.validator.validate_schema(&candidate);
                let accepted = result.is_valid.then_some(candidate);
                if let Some(schema) = &accepted {
                    if let Some(json) = pretty(schema) {
                        self.json = json;
                    }
                }
                self.validation = Some(result);
                accepted
            }
            Edit::Text => {
                let mut report = self.validator.report_json(&self.json);
                let accepted = if report.is_valid() {
                    match serde_json::from_str::<SchemaDocument>(&self.json) {
                        Ok(SchemaDocument::Single(schema)) => Some(schema),
                        Ok(SchemaDocument::Tools(_)) => {
                            report.push(Issue::error(
                                None,
                                IssueKind::UnexpectedToolsArray,
                            ));
                            None
                        }
                        Err(e) => {
                            report.push(Issue::error(
                                None,
                                IssueKind::Malformed {
                                    message: e.to_string(),
                                },
                            ));
                            None
                        }
                    }
                } else {
                    None
                };
                if let Some(schema) = &accepted {
                    let mut form = Form::from_schema(schema);
                    form.carry_expanded(&self.form);
                    self.form = form;
                }
                self.validation = Some(report.into_result());
                accepted
            }
        };

        #[cfg(feature = "log")]
        log::debug!(
            "{:?} edit: schema is {}",
            edit,
            if self.schema.is_some() { "valid" } else { "unset" }
        );

        if let Some(listener) = self.listener.as_mut() {
            listener(self.schema.as_ref());
        }

        self.validation.as_ref()
    }

    fn placeholder_key(&self) -> String {
        let mut seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        loop {
            let key = format!("param_{seed}");
            if !self.form.contains(&key) {
                return key;
            }
            seed += 1;
        }
    }
}

/// Pretty JSON for the buffer. Serializing these types does not fail in
/// practice; if it ever does the buffer is left alone.
fn pretty(schema: &FunctionSchema) -> Option<String> {
    match schema.to_json_pretty() {
        Ok(json) => Some(json),
        Err(_e) => {
            #[cfg(feature = "log")]
            log::error!("Could not serialize schema: {}", _e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{json, schema::ItemType, validate::STRICT_OPTIONS};

    /// An editor that records every value passed to the listener.
    fn recording(
        value: Option<FunctionSchema>,
    ) -> (Editor, Arc<Mutex<Vec<Option<FunctionSchema>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let editor = Editor::new(value).on_change(move |schema| {
            sink.lock().unwrap().push(schema.cloned());
        });
        (editor, seen)
    }

    #[test]
    fn test_load_fills_both_views() {
        let schema = Example::WebSearch.schema();
        let editor = Editor::new(Some(schema.clone()));

        assert_eq!(editor.form().name, "web_search");
        assert_eq!(editor.form().params.len(), 2);
        assert_eq!(FunctionSchema::from_json(editor.json()).unwrap(), schema);
        assert_eq!(editor.schema(), Some(&schema));
        assert!(editor.validation().is_none());
        assert!(editor.mode().is_visual());

        let empty = Editor::default();
        assert!(empty.json().is_empty());
        assert!(empty.schema().is_none());
    }

    #[test]
    fn test_invalid_load_is_not_accepted() {
        let invalid = FunctionSchema::new("1 bad name", "");
        let (mut editor, seen) = recording(Some(invalid.clone()));

        assert!(editor.schema().is_none());
        assert_eq!(editor.form().name, "1 bad name");
        assert_eq!(FunctionSchema::from_json(editor.json()).unwrap(), invalid);
        let result = editor.validation().unwrap();
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            [
                "function.name: Function name must be a valid identifier",
                "function.description: Function description is required",
            ]
        );

        // A later valid load replaces it and clears the errors.
        editor.load(Some(Example::WebSearch.schema()));
        assert_eq!(editor.schema(), Some(&Example::WebSearch.schema()));
        assert!(editor.validation().is_none());

        editor.load(Some(invalid));
        assert!(editor.schema().is_none());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_visual_edit_rewrites_json() {
        let (mut editor, seen) = recording(Some(Example::WebSearch.schema()));

        let result = editor.set_name("find_pages").unwrap();
        assert!(result.is_valid);

        let from_json = FunctionSchema::from_json(editor.json()).unwrap();
        assert_eq!(from_json.name(), "find_pages");
        assert_eq!(editor.schema().unwrap().name(), "find_pages");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].as_ref().unwrap().name(), "find_pages");
    }

    #[test]
    fn test_invalid_visual_edit_leaves_json_stale() {
        let (mut editor, seen) = recording(Some(Example::WebSearch.schema()));
        let before = editor.json().to_string();

        let result = editor.set_name("not valid").unwrap();
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            ["function.name: Function name must be a valid identifier"]
        );
        assert_eq!(editor.json(), before);
        assert!(editor.schema().is_none());
        assert_eq!(editor.form().name, "not valid");

        // Fixing the form propagates again.
        assert!(editor.set_name("web_search").unwrap().is_valid);
        assert_eq!(
            *seen.lock().unwrap(),
            [None, Some(Example::WebSearch.schema())]
        );
    }

    #[test]
    fn test_json_edit_rebuilds_form() {
        let (mut editor, seen) = recording(None);

        let text = r#"{"type":"function","function":{"name":"lookup","description":"Look up","parameters":{"type":"object","properties":{"id":{"type":"integer","description":"Row id"},"verbose":{"type":"boolean","description":"More"}},"required":["id"]}}}"#;
        let result = editor.set_json(text).unwrap();
        assert!(result.is_valid);

        let form = editor.form();
        assert_eq!(form.name, "lookup");
        assert_eq!(form.description, "Look up");
        let rows: Vec<(&str, ParamType, bool)> = form
            .params
            .iter()
            .map(|e| (e.key.as_str(), e.parameter.kind, e.required))
            .collect();
        assert_eq!(
            rows,
            [
                ("id", ParamType::Integer, true),
                ("verbose", ParamType::Boolean, false)
            ]
        );

        // The JSON buffer is kept as typed.
        assert_eq!(editor.json(), text);
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(editor.schema().unwrap().name(), "lookup");
    }

    #[test]
    fn test_invalid_json_leaves_form_alone() {
        let (mut editor, seen) = recording(Some(Example::SendEmail.schema()));
        let form = editor.form().clone();

        let result = editor
            .set_json(r#"{"type":"function","function":{"#)
            .unwrap();
        assert_eq!(result.errors, ["Invalid JSON format"]);
        assert_eq!(editor.form(), &form);
        assert!(editor.schema().is_none());

        let result = editor
            .set_json(r#"{"type":"function","function":{"name":"x","description":"y","parameters":{"type":"object","properties":{},"required":["z"]}}}"#)
            .unwrap();
        assert!(!result.is_valid);
        assert_eq!(editor.form(), &form);

        assert_eq!(*seen.lock().unwrap(), [None, None]);
    }

    #[test]
    fn test_blank_json_clears() {
        let (mut editor, seen) = recording(Some(Example::WebSearch.schema()));
        editor.set_json("nope");
        assert!(editor.validation().is_some());

        assert!(editor.set_json("   ").is_none());
        assert!(editor.validation().is_none());
        assert!(editor.schema().is_none());
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_null_json_clears() {
        let (mut editor, seen) = recording(Some(Example::SendEmail.schema()));
        let form = editor.form().clone();

        assert!(editor.set_json("null").is_none());
        assert!(editor.validation().is_none());
        assert!(editor.schema().is_none());
        assert_eq!(editor.form(), &form);

        assert!(Editor::default().set_json(" null\n").is_none());
        assert_eq!(*seen.lock().unwrap(), [None]);
    }

    #[test]
    fn test_tools_array_is_not_a_single_schema() {
        let (mut editor, seen) = recording(None);
        let text = serde_json::to_string(&Example::tools_array(Example::ALL))
            .unwrap();

        let result = editor.set_json(text).unwrap();
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            ["Expected a single function schema, received a tools array"]
        );
        assert!(editor.form().name.is_empty());
        assert_eq!(*seen.lock().unwrap(), [None]);
    }

    #[test]
    fn test_load_example_then_rename() {
        let (mut editor, seen) = recording(None);

        let result = editor.load_example(Example::SendEmail).unwrap();
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
        assert!(editor.mode().is_json());
        assert_eq!(editor.schema(), Some(&Example::SendEmail.schema()));

        editor.set_mode(Mode::Visual);
        editor.rename_parameter("to", "recipient").unwrap();

        let schema = editor.schema().unwrap();
        let params = &schema.function.parameters;
        assert_eq!(
            params.properties.keys().collect::<Vec<_>>(),
            ["recipient", "subject", "body", "priority"]
        );
        assert_eq!(params.required, ["recipient", "subject", "body"]);

        let from_json = FunctionSchema::from_json(editor.json()).unwrap();
        assert_eq!(&from_json, schema);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_rejected_rename_is_a_no_op() {
        let (mut editor, seen) = recording(Some(Example::SendEmail.schema()));
        let form = editor.form().clone();

        assert_eq!(
            editor.rename_parameter("to", "body"),
            Err(EditError::Duplicate("body".into()))
        );
        assert_eq!(
            editor.rename_parameter("to", ""),
            Err(EditError::EmptyName)
        );
        assert_eq!(editor.rename_parameter("to", "to"), Ok(()));

        assert_eq!(editor.form(), &form);
        assert!(editor.validation().is_none());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_add_and_remove_parameter() {
        let (mut editor, seen) = recording(Some(Example::WebSearch.schema()));

        let first = editor.add_parameter();
        let second = editor.add_parameter();
        assert_ne!(first, second);
        assert!(first.starts_with("param_"));

        let entry = editor.form().get(&first).unwrap();
        assert!(entry.expanded);
        assert!(!entry.required);
        assert_eq!(entry.parameter, Parameter::new(ParamType::String));

        // Valid, with a warning for the missing description.
        let result = editor.validation().unwrap();
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 2);
        assert!(editor.json().contains(&second));

        editor.remove_parameter(&first).unwrap();
        editor.remove_parameter(&second).unwrap();
        assert_eq!(editor.schema(), Some(&Example::WebSearch.schema()));
        assert_eq!(
            editor.remove_parameter(&first),
            Err(EditError::NotFound(first.clone()))
        );
        assert_eq!(seen.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_update_parameter() {
        let mut editor = Editor::new(Some(Example::DatabaseQuery.schema()));

        editor
            .update_parameter("limit", ParamEdit::Default(Some(json!("ten"))))
            .unwrap();
        let result = editor.validation().unwrap();
        assert_eq!(
            result.errors,
            ["Property \"limit\": default: Expected integer, received string"]
        );
        assert!(editor.schema().is_none());

        editor
            .update_parameter("limit", ParamEdit::Default(Some(json!(10))))
            .unwrap();
        assert!(editor.validation().unwrap().is_valid);

        editor
            .update_parameter("columns", ParamEdit::Items(None))
            .unwrap();
        assert_eq!(
            editor.validation().unwrap().warnings,
            ["Property \"columns\" is an array but missing \"items\" specification"]
        );

        editor
            .update_parameter(
                "columns",
                ParamEdit::Items(Some(ItemType::String)),
            )
            .unwrap();
        editor
            .update_parameter("table", ParamEdit::Required(false))
            .unwrap();
        let schema = editor.schema().unwrap();
        assert!(schema.function.parameters.required.is_empty());
    }

    #[test]
    fn test_expanded_survives_json_edit() {
        let mut editor = Editor::new(Some(Example::SendEmail.schema()));
        editor.set_expanded("subject", true).unwrap();
        assert!(editor.set_expanded("nope", true).is_err());

        editor.set_json(Example::SendEmail.to_json_pretty().unwrap());
        assert!(editor.form().get("subject").unwrap().expanded);
        assert!(!editor.form().get("to").unwrap().expanded);
    }

    #[test]
    fn test_strict_options() {
        let mut editor = Editor::new(Some(Example::DatabaseQuery.schema()))
            .with_options(STRICT_OPTIONS);
        editor
            .update_parameter("columns", ParamEdit::Items(None))
            .unwrap();
        assert!(!editor.validation().unwrap().is_valid);
        assert!(editor.schema().is_none());

        let untyped_list = FunctionSchema::new("f", "d").parameter(
            "list",
            Parameter::new(ParamType::Array).description("l"),
            false,
        );
        let lenient = Editor::new(Some(untyped_list.clone()));
        assert_eq!(lenient.schema(), Some(&untyped_list));
        let strict = lenient.with_options(STRICT_OPTIONS);
        assert!(strict.schema().is_none());
        assert!(!strict.validation().unwrap().is_valid);
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, Example::DatabaseQuery.to_json_pretty().unwrap())
            .unwrap();

        let mut editor = Editor::default();
        let result = editor.load_file(&path).unwrap().unwrap();
        assert!(result.is_valid);
        assert_eq!(editor.form().name, "database_query");

        assert!(editor.load_file(dir.path().join("missing.json")).is_err());
    }
}
