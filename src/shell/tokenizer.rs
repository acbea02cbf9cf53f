//! Shell-style word splitting (shlex-like) with configurable character classes.

use thiserror::Error;

use super::charset::CharSet;

const DEFAULT_DELIMITERS: &str = " \t\n";
const DEFAULT_QUOTE_CHARS: &str = "'\"`";
const DEFAULT_ESCAPE_CHARS: &str = "\\";

/// Errors raised while building [`SplitOptions`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitOptionsError {
    #[error("character {ch:?} cannot be both a {first} and a {second} character")]
    OverlappingClasses {
        ch: char,
        first: &'static str,
        second: &'static str,
    },
}

/// Character classes and output policy for [`split`].
///
/// A character belongs to at most one class; this is checked by
/// [`SplitOptionsBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOptions {
    delimiters: CharSet,
    quote_chars: CharSet,
    escape_chars: CharSet,
    keep_quotes: bool,
    keep_escapes: bool,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            delimiters: CharSet::from(DEFAULT_DELIMITERS),
            quote_chars: CharSet::from(DEFAULT_QUOTE_CHARS),
            escape_chars: CharSet::from(DEFAULT_ESCAPE_CHARS),
            keep_quotes: false,
            keep_escapes: false,
        }
    }
}

impl SplitOptions {
    /// Start from the defaults: space/tab/newline, `'"` + backtick, backslash.
    pub fn builder() -> SplitOptionsBuilder {
        SplitOptionsBuilder {
            options: Self::default(),
        }
    }
}

/// Builder for [`SplitOptions`].
#[derive(Debug, Clone)]
pub struct SplitOptionsBuilder {
    options: SplitOptions,
}

impl SplitOptionsBuilder {
    pub fn delimiters(mut self, chars: impl Into<CharSet>) -> Self {
        self.options.delimiters = chars.into();
        self
    }

    pub fn quote_chars(mut self, chars: impl Into<CharSet>) -> Self {
        self.options.quote_chars = chars.into();
        self
    }

    pub fn escape_chars(mut self, chars: impl Into<CharSet>) -> Self {
        self.options.escape_chars = chars.into();
        self
    }

    /// Keep quote characters in the emitted tokens.
    pub fn keep_quotes(mut self, keep: bool) -> Self {
        self.options.keep_quotes = keep;
        self
    }

    /// Keep escape characters in the emitted tokens.
    pub fn keep_escapes(mut self, keep: bool) -> Self {
        self.options.keep_escapes = keep;
        self
    }

    /// Validate the character classes and produce the options.
    pub fn build(self) -> Result<SplitOptions, SplitOptionsError> {
        let o = &self.options;
        let classes = [
            ("delimiter", &o.delimiters),
            ("quote", &o.quote_chars),
            ("escape", &o.escape_chars),
        ];
        for (i, (first, a)) in classes.iter().enumerate() {
            for (second, b) in &classes[i + 1..] {
                if let Some(ch) = a.first_shared(b) {
                    return Err(SplitOptionsError::OverlappingClasses {
                        ch,
                        first: *first,
                        second: *second,
                    });
                }
            }
        }
        Ok(self.options)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scanning,
    InQuote(char),
    /// The next character is literal; `resume` is the quote to return to.
    Escaped { marker: char, resume: Option<char> },
}

impl State {
    fn open_quote(&self) -> Option<char> {
        match *self {
            State::InQuote(q) => Some(q),
            State::Escaped { resume, .. } => resume,
            State::Scanning => None,
        }
    }
}

/// Accumulates the current word and the finished ones.
#[derive(Default)]
struct Words {
    done: Vec<String>,
    current: String,
    /// Set once the current word has content or an (empty) quoted region.
    started: bool,
}

impl Words {
    fn push(&mut self, c: char) {
        self.current.push(c);
        self.started = true;
    }

    fn start(&mut self) {
        self.started = true;
    }

    fn flush(&mut self) {
        if self.started {
            self.done.push(std::mem::take(&mut self.current));
            self.started = false;
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.done
    }
}

/// Split `input` into words, respecting quotes and escapes.
///
/// Never fails: unterminated quotes run to the end of input and a trailing
/// escape character is dropped.
pub fn split(input: &str, options: &SplitOptions) -> Vec<String> {
    let mut words = Words::default();
    let mut state = State::Scanning;

    for c in input.chars() {
        state = match state {
            State::Escaped { marker, resume } => {
                if options.keep_escapes {
                    words.push(marker);
                }
                words.push(c);
                resume.map_or(State::Scanning, State::InQuote)
            }
            _ if options.escape_chars.contains(c) => State::Escaped {
                marker: c,
                resume: state.open_quote(),
            },
            State::InQuote(q) => {
                if c != q || options.keep_quotes {
                    words.push(c);
                }
                if c == q {
                    State::Scanning
                } else {
                    State::InQuote(q)
                }
            }
            State::Scanning => {
                if options.quote_chars.contains(c) {
                    words.start();
                    if options.keep_quotes {
                        words.push(c);
                    }
                    State::InQuote(c)
                } else if options.delimiters.contains(c) {
                    words.flush();
                    State::Scanning
                } else {
                    words.push(c);
                    State::Scanning
                }
            }
        };
    }

    words.finish()
}

/// Split with the default options.
pub fn split_default(input: &str) -> Vec<String> {
    split(input, &SplitOptions::default())
}
