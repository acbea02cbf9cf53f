//! Dispatch a parsed request to the shell primitives.

use thiserror::Error;

use crate::config::CompiledConfig;
use crate::input::{ArgvInput, Operation, Request};
use crate::outcome::Outcome;
use crate::shell::{SplitOptionsError, escape, escape_args, normalize, split};

/// Errors caused by the request itself rather than by its input text.
#[derive(Debug, Error)]
pub enum HandleError {
    #[error("invalid split options: {0}")]
    Split(#[from] SplitOptionsError),
}

/// Run the operation a request names, with its overrides layered on `config`.
pub fn handle(request: &Request, config: &CompiledConfig) -> Result<Outcome, HandleError> {
    let outcome = match &request.operation {
        Operation::Split { input, options } => {
            let options = config.split_options(options)?;
            Outcome::Tokens(split(input, &options))
        }
        Operation::Escape { value, options } => {
            let options = config.escape_options(options);
            let escaped = match value {
                ArgvInput::One(value) => escape(value, &options),
                ArgvInput::Many(values) => escape_args(values.as_slice(), &options),
            };
            match escaped {
                Ok(escaped) => Outcome::Escaped(escaped),
                Err(err) => Outcome::rejected(err),
            }
        }
        Operation::Normalize { argv, options } => {
            let spec = config.option_spec(options);
            Outcome::Argv(normalize(argv, &spec))
        }
    };
    Ok(outcome)
}
