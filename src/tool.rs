//! [`ToolDraft`]: the function-schema part of a Tool record as sent to the
//! backend when the user saves.
use serde::{Deserialize, Serialize};

use crate::{
    document::{self, SchemaDocument},
    schema::FunctionSchema,
};

/// Kind of Tool record.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// An HTTP API described some other way. Default for a record without
    /// function schemas.
    #[default]
    #[display("api")]
    Api,
    /// A collection of tools.
    #[display("collection")]
    Collection,
    /// One or more OpenAI functions.
    #[display("function")]
    Function,
}

/// A Tool record being edited. Field names on the wire follow the backend
/// (`functionSchema`, `functionNames`, `type`).
///
/// The invariant kept by [`apply_document`] is that [`function_names`] lists
/// `function.name` of every function in the last accepted document, in
/// order, and [`function_schema`] is set only when there was exactly one.
///
/// [`apply_document`]: Self::apply_document
/// [`function_names`]: Self::function_names
/// [`function_schema`]: Self::function_schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDraft {
    /// Display name.
    pub name: String,
    /// Display description.
    #[serde(default)]
    pub description: String,
    /// Kind of record.
    #[serde(rename = "type", default)]
    pub kind: ToolKind,
    /// The function, when the record holds exactly one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_schema: Option<FunctionSchema>,
    /// Names of every function in the record, in order.
    #[serde(default)]
    pub function_names: Vec<String>,
}

impl ToolDraft {
    /// Create an empty [`ToolKind::Api`] draft.
    pub fn new<N, D>(name: N, description: D) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Take the functions of a validated [`SchemaDocument`]. An empty
    /// [`name`] or [`description`] is filled in from the first function.
    ///
    /// [`name`]: Self::name
    /// [`description`]: Self::description
    pub fn apply_document(&mut self, document: SchemaDocument) {
        self.function_names = document.function_names();
        let mut schemas = document.into_schemas();

        if let Some(first) = schemas.first() {
            if self.name.is_empty() {
                self.name = first.function.name.clone();
            }
            if self.description.is_empty() {
                self.description = first.function.description.clone();
            }
        }

        self.kind = if schemas.is_empty() {
            ToolKind::Api
        } else {
            ToolKind::Function
        };
        self.function_schema = if schemas.len() == 1 {
            schemas.pop()
        } else {
            None
        };

        #[cfg(feature = "log")]
        log::debug!(
            "Tool draft `{}` now has functions {:?}",
            self.name,
            self.function_names
        );
    }

    /// Validate JSON text and, if it is a valid document, apply it. On error
    /// the draft is left untouched.
    pub fn apply_json(&mut self, text: &str) -> document::Result<()> {
        let document = SchemaDocument::parse(text)?;
        self.apply_document(document);
        Ok(())
    }

    /// Remove every function and go back to [`ToolKind::Api`].
    pub fn clear_functions(&mut self) {
        self.function_schema = None;
        self.function_names.clear();
        self.kind = ToolKind::Api;
    }
}
