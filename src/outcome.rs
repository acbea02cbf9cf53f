//! Outcome types for request handling.

use serde::Serialize;

use crate::shell::EscapeError;

/// The result of handling one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Words produced by splitting.
    Tokens(Vec<String>),
    /// An escaped command-line fragment.
    Escaped(String),
    /// A normalized argv.
    Argv(Vec<String>),
    /// The escaper refused the input.
    Rejected(RejectInfo),
}

/// Information about why a value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectInfo {
    /// Human-readable reason.
    pub reason: String,
    /// The character class that caused it.
    pub class: String,
}

impl From<EscapeError> for RejectInfo {
    fn from(err: EscapeError) -> Self {
        Self {
            reason: err.to_string(),
            class: err.char_class().to_string(),
        }
    }
}

impl Outcome {
    /// Create a rejected outcome from an escape failure.
    pub fn rejected(err: EscapeError) -> Self {
        Outcome::Rejected(err.into())
    }

    /// Get the reject info if rejected.
    pub fn reject_info(&self) -> Option<&RejectInfo> {
        match self {
            Outcome::Rejected(info) => Some(info),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens() {
        let o = Outcome::Tokens(vec!["a".to_string()]);
        assert!(o.reject_info().is_none());
    }

    #[test]
    fn test_rejected() {
        let o = Outcome::rejected(EscapeError::NullByte);
        let info = o.reject_info().unwrap();
        assert_eq!(info.reason, "Input contains null-bytes");
        assert_eq!(info.class, "null-byte");
    }
}
