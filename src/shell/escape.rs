//! Escaping values for literal inclusion in a POSIX shell command line.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::charset::CharSet;

/// Characters escaped when the value is used bare.
const UNQUOTED_SPECIALS: &str = " \t!\"#$&'()*+:;<=>?@[\\]`{|}~";

/// Characters still unsafe when the caller wraps the value in quotes.
const QUOTED_SPECIALS: &str = "$`\\!\"";

static LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n").expect("line break pattern is valid"));

static LINE_BREAK_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\r?\n)+").expect("line break run pattern is valid"));

static LEADING_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\r?\n)+").expect("leading break pattern is valid"));

/// Raised when the configured policy forbids part of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EscapeError {
    #[error("Input contains null-bytes")]
    NullByte,

    #[error("Input contains newlines")]
    Newline,
}

impl EscapeError {
    /// The character class that triggered the failure.
    pub fn char_class(&self) -> &'static str {
        match self {
            EscapeError::NullByte => "null-byte",
            EscapeError::Newline => "newline",
        }
    }
}

/// An unrecognised policy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} policy '{name}'")]
pub struct PolicyParseError {
    pub kind: &'static str,
    pub name: String,
}

/// What to do with `\0` in the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullBytePolicy {
    #[default]
    Keep,
    Strip,
    Escape,
    Error,
}

/// What to do with line breaks (LF or CRLF) in the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewlinePolicy {
    #[default]
    Keep,
    /// Same as `Keep`.
    Ignore,
    Strip,
    Escape,
    /// Wrap each run of line breaks in single quotes.
    Quote,
    /// Replace each run of line breaks with one space.
    Collapse,
    Error,
}

impl NullBytePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NullBytePolicy::Keep => "keep",
            NullBytePolicy::Strip => "strip",
            NullBytePolicy::Escape => "escape",
            NullBytePolicy::Error => "error",
        }
    }
}

impl NewlinePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewlinePolicy::Keep => "keep",
            NewlinePolicy::Ignore => "ignore",
            NewlinePolicy::Strip => "strip",
            NewlinePolicy::Escape => "escape",
            NewlinePolicy::Quote => "quote",
            NewlinePolicy::Collapse => "collapse",
            NewlinePolicy::Error => "error",
        }
    }
}

impl FromStr for NullBytePolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep" => Ok(NullBytePolicy::Keep),
            "strip" => Ok(NullBytePolicy::Strip),
            "escape" => Ok(NullBytePolicy::Escape),
            "error" => Ok(NullBytePolicy::Error),
            _ => Err(PolicyParseError {
                kind: "null-byte",
                name: s.to_string(),
            }),
        }
    }
}

impl FromStr for NewlinePolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep" => Ok(NewlinePolicy::Keep),
            "ignore" => Ok(NewlinePolicy::Ignore),
            "strip" => Ok(NewlinePolicy::Strip),
            "escape" => Ok(NewlinePolicy::Escape),
            "quote" => Ok(NewlinePolicy::Quote),
            "collapse" => Ok(NewlinePolicy::Collapse),
            "error" => Ok(NewlinePolicy::Error),
            _ => Err(PolicyParseError {
                kind: "newline",
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for NullBytePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for NewlinePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for [`escape`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EscapeOptions {
    /// The caller wraps the result in quotes; only `` $ ` \ ! " `` are escaped.
    pub quoted: bool,
    /// Prefix `./` to values starting with `-` so they aren't read as options.
    pub is_path: bool,
    pub null_bytes: NullBytePolicy,
    pub newlines: NewlinePolicy,
    /// Extra characters to escape. Wins over `exclude`.
    pub include: CharSet,
    /// Characters to leave alone even if escaped by default.
    pub exclude: CharSet,
}

impl EscapeOptions {
    /// Options for a value the caller will wrap in quotes.
    pub fn quoted() -> Self {
        Self {
            quoted: true,
            ..Default::default()
        }
    }

    fn escapes(&self, c: char) -> bool {
        if self.include.contains(c) {
            return true;
        }
        if self.exclude.contains(c) {
            return false;
        }
        let specials = if self.quoted {
            QUOTED_SPECIALS
        } else {
            UNQUOTED_SPECIALS
        };
        specials.contains(c)
    }
}

/// Escape `value` so a POSIX shell reads it back literally.
///
/// Null bytes and line breaks are left to their policies; every other
/// character is escaped or passed through according to the mode and the
/// `include`/`exclude` sets.
///
/// The empty string escapes to itself, which a shell reads as no word at
/// all. Callers that need an empty argument should quote it or use
/// [`escape_args`].
pub fn escape(value: &str, options: &EscapeOptions) -> Result<String, EscapeError> {
    if options.null_bytes == NullBytePolicy::Error && value.contains('\0') {
        return Err(EscapeError::NullByte);
    }
    if options.newlines == NewlinePolicy::Error && value.contains('\n') {
        return Err(EscapeError::Newline);
    }

    // The `./` check must see what the shell will see.
    let value = strip(value, options);
    let (lead, rest) = value.split_at(separating_breaks(&value, options.newlines));

    let mut out = String::with_capacity(value.len() + value.len() / 4 + 2);
    out.push_str(lead);
    if options.is_path && rest.starts_with('-') {
        out.push_str("./");
    }

    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        let line_break = c == '\n' || (c == '\r' && chars.peek() == Some(&'\n'));
        if c != '\0' && !line_break && options.escapes(c) {
            out.push('\\');
        }
        out.push(c);
    }

    let out = apply_null_policy(out, options.null_bytes);
    Ok(apply_newline_policy(out, options.newlines))
}

/// Escape each argument and join them with single spaces.
///
/// Empty arguments are rendered as `''` in unquoted mode so they survive
/// the join.
pub fn escape_args<S: AsRef<str>>(
    args: &[S],
    options: &EscapeOptions,
) -> Result<String, EscapeError> {
    let escaped = args
        .iter()
        .map(|arg| {
            let arg = arg.as_ref();
            if arg.is_empty() && !options.quoted {
                Ok("''".to_string())
            } else {
                escape(arg, options)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(escaped.join(" "))
}

/// Drop what the `strip` policies remove.
fn strip<'a>(value: &'a str, options: &EscapeOptions) -> Cow<'a, str> {
    let mut value = Cow::Borrowed(value);
    if options.null_bytes == NullBytePolicy::Strip && value.contains('\0') {
        value = Cow::Owned(value.replace('\0', ""));
    }
    if options.newlines == NewlinePolicy::Strip && value.contains('\n') {
        value = Cow::Owned(LINE_BREAK.replace_all(&value, "").into_owned());
    }
    value
}

/// Length of the leading line-break run that will end up separating words.
fn separating_breaks(value: &str, policy: NewlinePolicy) -> usize {
    match policy {
        NewlinePolicy::Keep | NewlinePolicy::Ignore | NewlinePolicy::Collapse => {
            LEADING_BREAKS.find(value).map_or(0, |m| m.end())
        }
        _ => 0,
    }
}

fn apply_null_policy(value: String, policy: NullBytePolicy) -> String {
    if !value.contains('\0') {
        return value;
    }
    match policy {
        NullBytePolicy::Keep | NullBytePolicy::Strip | NullBytePolicy::Error => value,
        NullBytePolicy::Escape => value.replace('\0', "\\\0"),
    }
}

fn apply_newline_policy(value: String, policy: NewlinePolicy) -> String {
    if !value.contains('\n') {
        return value;
    }
    match policy {
        NewlinePolicy::Keep
        | NewlinePolicy::Ignore
        | NewlinePolicy::Strip
        | NewlinePolicy::Error => value,
        NewlinePolicy::Escape => LINE_BREAK
            .replace_all(&value, |caps: &Captures| {
                caps[0].chars().flat_map(|c| ['\\', c]).collect::<String>()
            })
            .into_owned(),
        NewlinePolicy::Quote => LINE_BREAK_RUN
            .replace_all(&value, |caps: &Captures| format!("'{}'", &caps[0]))
            .into_owned(),
        NewlinePolicy::Collapse => LINE_BREAK_RUN.replace_all(&value, " ").into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(value: &str) -> String {
        escape(value, &EscapeOptions::default()).unwrap()
    }

    #[test]
    fn test_escape_command_injection() {
        assert_eq!(bare("; rm -rf *"), "\\;\\ rm\\ -rf\\ \\*");
    }

    #[test]
    fn test_plain_value_unchanged() {
        assert_eq!(bare("file-name_1.txt"), "file-name_1.txt");
    }

    #[test]
    fn test_quoted_mode() {
        let options = EscapeOptions::quoted();
        assert_eq!(escape("a b; $HOME", &options).unwrap(), "a b; \\$HOME");
        assert_eq!(escape("`!\"\\", &options).unwrap(), "\\`\\!\\\"\\\\");
    }

    #[test]
    fn test_is_path_prefix() {
        let options = EscapeOptions {
            is_path: true,
            ..Default::default()
        };
        assert_eq!(escape("-rf", &options).unwrap(), "./-rf");
        assert_eq!(escape("rf", &options).unwrap(), "rf");
    }

    #[test]
    fn test_is_path_sees_stripped_value() {
        let nulls = EscapeOptions {
            is_path: true,
            null_bytes: NullBytePolicy::Strip,
            ..Default::default()
        };
        assert_eq!(escape("\0-rf", &nulls).unwrap(), "./-rf");
        assert_eq!(escape("\0\0-a b", &nulls).unwrap(), "./-a\\ b");

        let newlines = EscapeOptions {
            is_path: true,
            newlines: NewlinePolicy::Strip,
            ..Default::default()
        };
        assert_eq!(escape("\n-rf", &newlines).unwrap(), "./-rf");
        assert_eq!(escape("\r\n\n-rf", &newlines).unwrap(), "./-rf");

        let both = EscapeOptions {
            null_bytes: NullBytePolicy::Strip,
            ..newlines
        };
        assert_eq!(escape("\0\r\n\0-x", &both).unwrap(), "./-x");
    }

    #[test]
    fn test_is_path_after_separating_breaks() {
        let with = |newlines| EscapeOptions {
            is_path: true,
            newlines,
            ..Default::default()
        };
        assert_eq!(escape("\n-rf", &with(NewlinePolicy::Collapse)).unwrap(), " ./-rf");
        assert_eq!(escape("\r\n\n-rf", &with(NewlinePolicy::Collapse)).unwrap(), " ./-rf");
        assert_eq!(escape("\n-rf", &with(NewlinePolicy::Keep)).unwrap(), "\n./-rf");
        assert_eq!(escape("\n-rf", &with(NewlinePolicy::Quote)).unwrap(), "'\n'-rf");
        assert_eq!(escape("\n-rf", &with(NewlinePolicy::Escape)).unwrap(), "\\\n-rf");
    }

    #[test]
    fn test_empty_value_escapes_to_nothing() {
        assert_eq!(bare(""), "");
        assert_eq!(escape_args(&[""], &EscapeOptions::default()).unwrap(), "''");
    }

    #[test]
    fn test_include_wins_over_exclude() {
        let options = EscapeOptions {
            include: CharSet::from("a"),
            exclude: CharSet::from("a "),
            ..Default::default()
        };
        assert_eq!(escape("a b", &options).unwrap(), "\\a b");
    }

    #[test]
    fn test_null_policies() {
        let with = |null_bytes| EscapeOptions {
            null_bytes,
            ..Default::default()
        };
        assert_eq!(escape("\0A", &with(NullBytePolicy::Keep)).unwrap(), "\0A");
        assert_eq!(escape("\0A\0B\0", &with(NullBytePolicy::Strip)).unwrap(), "AB");
        assert_eq!(escape("\0A", &with(NullBytePolicy::Escape)).unwrap(), "\\\0A");
        assert_eq!(
            escape("\0", &with(NullBytePolicy::Error)),
            Err(EscapeError::NullByte)
        );
    }

    #[test]
    fn test_newline_policies() {
        let with = |newlines| EscapeOptions {
            newlines,
            ..Default::default()
        };
        assert_eq!(escape("A\r\nB", &with(NewlinePolicy::Strip)).unwrap(), "AB");
        assert_eq!(
            escape("A\r\nB", &with(NewlinePolicy::Escape)).unwrap(),
            "A\\\r\\\nB"
        );
        assert_eq!(
            escape("\nA\n\nB", &with(NewlinePolicy::Quote)).unwrap(),
            "'\n'A'\n\n'B"
        );
        assert_eq!(
            escape("\r\nA\r\nB\r\n", &with(NewlinePolicy::Collapse)).unwrap(),
            " A B "
        );
        assert_eq!(escape("A\nB", &with(NewlinePolicy::Ignore)).unwrap(), "A\nB");
    }

    #[test]
    fn test_error_identifies_class() {
        let options = EscapeOptions {
            null_bytes: NullBytePolicy::Error,
            newlines: NewlinePolicy::Error,
            ..Default::default()
        };
        let err = escape("a\nb", &options).unwrap_err();
        assert_eq!(err.char_class(), "newline");
        assert_eq!(err.to_string(), "Input contains newlines");
        assert_eq!(escape("\0\n", &options).unwrap_err().char_class(), "null-byte");
    }

    #[test]
    fn test_lone_carriage_return_untouched() {
        let options = EscapeOptions {
            newlines: NewlinePolicy::Strip,
            ..Default::default()
        };
        assert_eq!(escape("a\rb", &options).unwrap(), "a\rb");
    }

    #[test]
    fn test_escape_args() {
        let joined = escape_args(&["a b", "", "c"], &EscapeOptions::default()).unwrap();
        assert_eq!(joined, "a\\ b '' c");
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("collapse".parse::<NewlinePolicy>(), Ok(NewlinePolicy::Collapse));
        assert_eq!("strip".parse::<NullBytePolicy>(), Ok(NullBytePolicy::Strip));
        let err = "quote".parse::<NullBytePolicy>().unwrap_err();
        assert_eq!(err.to_string(), "unknown null-byte policy 'quote'");
    }
}
