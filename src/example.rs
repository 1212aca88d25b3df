//! Built-in [`Example`] schemas. Each is a complete, valid function with
//! every parameter described, so they validate without warnings.
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    document::ToolsArray,
    schema::{FunctionSchema, ItemType, ParamType, Parameter},
};

/// A canned [`FunctionSchema`] for documentation and quick starts.
#[derive(
    Debug,
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
pub enum Example {
    /// `web_search(query, max_results?)`
    #[display("web_search")]
    WebSearch,
    /// `send_email(to, subject, body, priority?)`
    #[display("send_email")]
    SendEmail,
    /// `database_query(table, columns?, where_clause?, limit?)`
    #[display("database_query")]
    DatabaseQuery,
}

impl Example {
    /// Every [`Example`], in menu order.
    pub const ALL: [Example; 3] =
        [Self::WebSearch, Self::SendEmail, Self::DatabaseQuery];

    /// Name of the example, which is also the function name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::WebSearch => "web_search",
            Self::SendEmail => "send_email",
            Self::DatabaseQuery => "database_query",
        }
    }

    /// Build the [`FunctionSchema`].
    pub fn schema(self) -> FunctionSchema {
        match self {
            Self::WebSearch => FunctionSchema::new(
                self.name(),
                "Search the web for information on a given topic",
            )
            .parameter(
                "query",
                Parameter::new(ParamType::String)
                    .description("The search query to execute"),
                true,
            )
            .parameter(
                "max_results",
                Parameter::new(ParamType::Integer)
                    .description("Maximum number of results to return")
                    .default_value(5),
                false,
            ),
            Self::SendEmail => {
                FunctionSchema::new(self.name(), "Send an email to a recipient")
                    .parameter(
                        "to",
                        Parameter::new(ParamType::String)
                            .description("Email address of the recipient"),
                        true,
                    )
                    .parameter(
                        "subject",
                        Parameter::new(ParamType::String)
                            .description("Subject line of the email"),
                        true,
                    )
                    .parameter(
                        "body",
                        Parameter::new(ParamType::String)
                            .description("Body content of the email"),
                        true,
                    )
                    .parameter(
                        "priority",
                        Parameter::new(ParamType::String)
                            .description("Email priority level")
                            .enum_values(["low", "normal", "high"])
                            .default_value("normal"),
                        false,
                    )
            }
            Self::DatabaseQuery => FunctionSchema::new(
                self.name(),
                "Execute a database query and return results",
            )
            .parameter(
                "table",
                Parameter::new(ParamType::String)
                    .description("Name of the database table to query"),
                true,
            )
            .parameter(
                "columns",
                Parameter::new(ParamType::Array)
                    .description("List of columns to select")
                    .items(ItemType::String),
                false,
            )
            .parameter(
                "where_clause",
                Parameter::new(ParamType::String)
                    .description("SQL WHERE clause for filtering"),
                false,
            )
            .parameter(
                "limit",
                Parameter::new(ParamType::Integer)
                    .description("Maximum number of rows to return")
                    .default_value(100),
                false,
            ),
        }
    }

    /// The schema as pretty-printed JSON.
    pub fn to_json_pretty(self) -> serde_json::Result<String> {
        self.schema().to_json_pretty()
    }

    /// A [`ToolsArray`] envelope of several examples, in the order given.
    pub fn tools_array<Es>(examples: Es) -> ToolsArray
    where
        Es: IntoIterator<Item = Example>,
    {
        examples.into_iter().map(Example::schema).collect()
    }
}

/// Returned by [`Example::from_str`] for an unknown name.
#[derive(Debug, thiserror::Error)]
#[error("Unknown example `{name}`. Expected one of: web_search, send_email, database_query.")]
pub struct UnknownExample {
    /// The name that was given.
    pub name: String,
}

impl FromStr for Example {
    type Err = UnknownExample;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|example| example.name() == s)
            .ok_or_else(|| UnknownExample { name: s.to_string() })
    }
}
