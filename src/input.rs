//! Request parsing for the `shell-argv` binary.

use serde::Deserialize;
use thiserror::Error;

use crate::config::{EscapeSettings, OptionSettings, SplitSettings};
use crate::shell::AsArgv;

/// Errors that can occur when parsing a request.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One JSON request read from stdin.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    #[serde(flatten)]
    pub operation: Operation,

    /// Directory to look for a project config in (optional).
    #[serde(default)]
    pub cwd: Option<String>,
}

/// The requested operation and its per-request overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    Split {
        input: String,
        #[serde(default)]
        options: SplitSettings,
    },
    Escape {
        value: ArgvInput,
        #[serde(default)]
        options: EscapeSettings,
    },
    Normalize {
        argv: ArgvInput,
        #[serde(default)]
        options: OptionSettings,
    },
}

/// A single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ArgvInput {
    One(String),
    Many(Vec<String>),
}

impl AsArgv for ArgvInput {
    fn as_argv(&self) -> Vec<&str> {
        match self {
            ArgvInput::One(arg) => arg.as_argv(),
            ArgvInput::Many(args) => args.as_argv(),
        }
    }
}

impl Request {
    /// Parse from JSON string.
    pub fn parse(json: &str) -> Result<Self, InputError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Operation name as it appears in the `op` field.
    pub fn op_name(&self) -> &'static str {
        match self.operation {
            Operation::Split { .. } => "split",
            Operation::Escape { .. } => "escape",
            Operation::Normalize { .. } => "normalize",
        }
    }

    /// The primary input, flattened to one line of text.
    pub fn subject(&self) -> String {
        match &self.operation {
            Operation::Split { input, .. } => input.clone(),
            Operation::Escape { value, .. } => value.as_argv().join(" "),
            Operation::Normalize { argv, .. } => argv.as_argv().join(" "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_split() {
        let req = Request::parse(
            r#"{"op":"split","input":"a 'b c'","options":{"keep_quotes":true},"cwd":"/tmp"}"#,
        )
        .unwrap();
        assert_eq!(req.op_name(), "split");
        assert_eq!(req.cwd.as_deref(), Some("/tmp"));
        match req.operation {
            Operation::Split { input, options } => {
                assert_eq!(input, "a 'b c'");
                assert_eq!(options.keep_quotes, Some(true));
            }
            other => panic!("unexpected operation: {:?}", other),
        }
    }

    #[test]
    fn test_parse_escape_list() {
        let req = Request::parse(
            r#"{"op":"escape","value":["a b","c"],"options":{"null_bytes":"strip"}}"#,
        )
        .unwrap();
        assert_eq!(req.subject(), "a b c");
        match req.operation {
            Operation::Escape { value, options } => {
                assert_eq!(
                    value,
                    ArgvInput::Many(vec!["a b".to_string(), "c".to_string()])
                );
                assert_eq!(
                    options.null_bytes,
                    Some(crate::shell::NullBytePolicy::Strip)
                );
            }
            other => panic!("unexpected operation: {:?}", other),
        }
    }

    #[test]
    fn test_parse_normalize_string_argv() {
        let req = Request::parse(r#"{"op":"normalize","argv":"-abc"}"#).unwrap();
        match req.operation {
            Operation::Normalize { argv, options } => {
                assert_eq!(argv.as_argv(), vec!["-abc"]);
                assert_eq!(options, OptionSettings::default());
            }
            other => panic!("unexpected operation: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_op() {
        assert!(Request::parse(r#"{"op":"glob","input":"*"}"#).is_err());
    }

    #[test]
    fn test_missing_field() {
        assert!(Request::parse(r#"{"op":"split"}"#).is_err());
    }
}
