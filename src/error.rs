//! Structured error types for the report builder.
//!
//! The core performs no local recovery: a report either builds completely and
//! consistently, or the caller receives one of these before any partial
//! result is exposed.

use thiserror::Error;

/// The unified error type returned by all public rapport API functions.
#[derive(Error, Debug)]
pub enum ReportError {
    /// JSON input failed to decode as a configuration document or record set.
    #[error("failed to parse document: {source}{}", format_hint(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// The top-level configuration argument is not a JSON object.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The top-level data argument is not a collection of flat records.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A component names a widget kind absent from the registry.
    #[error("`{0}` is not a registered widget kind")]
    UnknownWidget(String),

    /// A filter/insert/transform instruction references an unregistered operator.
    #[error("`{0}` is not a registered operator")]
    UnknownOperator(String),

    /// A pipeline instruction is missing required keys or carries unusable operands.
    #[error("malformed spec: {0}")]
    MalformedSpec(String),

    /// A page's layout tree cannot be formatted.
    #[error("malformed layout: {0}")]
    MalformedLayout(String),

    /// `set_period` was called with other than exactly two dates.
    #[error("invalid period: expected exactly two dates, got {0}")]
    InvalidPeriod(usize),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {hint}")
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the report configuration schema. Check field names and types."
                    .to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input — is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        ReportError::Parse { source: e, hint }
    }
}
