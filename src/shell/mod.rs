//! Shell argument primitives: splitting, escaping and option normalization.

mod charset;
mod escape;
mod options;
mod tokenizer;

pub use charset::CharSet;
pub use escape::{
    EscapeError, EscapeOptions, NewlinePolicy, NullBytePolicy, PolicyParseError, escape,
    escape_args,
};
pub use options::{Arity, AsArgv, OptionSpec, normalize};
pub use tokenizer::{SplitOptions, SplitOptionsBuilder, SplitOptionsError, split, split_default};
