#![warn(missing_docs)]
#![forbid(unsafe_code)]
//! `fnschema` validates and edits [OpenAI function-calling] schemas.
//!
//! * [`validate_json`] and [`validate_value`] check a single function schema
//!   or a `{"tools": [...]}` envelope and return a [`ValidationResult`] with
//!   errors and advisory warnings.
//! * [`SchemaDocument::parse`] validates and deserializes in one step.
//! * [`Editor`] keeps a visual form and a JSON text buffer in sync over one
//!   canonical [`FunctionSchema`].
//! * [`Example`] provides ready-made schemas.
//!
//! [OpenAI function-calling]: <https://platform.openai.com/docs/guides/function-calling>
//!
//! See the `demos` directory for a command line validator.

pub mod schema;
pub use schema::{FunctionSchema, ParamType, Parameter};

pub mod validate;
pub use validate::{validate_json, validate_value, ValidationResult, Validator};

pub mod document;
pub use document::SchemaDocument;

pub mod editor;
pub use editor::Editor;

pub mod example;
pub use example::Example;

pub mod tool;
pub use tool::ToolDraft;

/// Re-exports of commonly used crates to avoid version conflicts.
pub mod exports {
    #[cfg(feature = "log")]
    pub use log;
    pub use serde;
    pub use serde_json;
}

/// Re-export of `serde_json::json!` for convenience because this is used
/// frequently.
pub use exports::serde_json::json;
