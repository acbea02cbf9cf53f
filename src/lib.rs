//! Shell argument handling primitives.
//!
//! Splits raw strings into shell-style words, escapes values for a POSIX
//! shell command line, and normalizes argv by unbundling short options and
//! splitting `--name=value` long options.

pub mod audit;
pub mod config;
pub mod handler;
pub mod input;
pub mod outcome;
pub mod output;
pub mod shell;

pub use config::{CompiledConfig, Config};
pub use handler::handle;
pub use input::Request;
pub use outcome::Outcome;
pub use output::format_response;
pub use shell::{
    EscapeError, EscapeOptions, OptionSpec, SplitOptions, escape, normalize, split,
};
