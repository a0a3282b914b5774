//! Contains infrastructure for configuring the preprocessor, including parsing
//! command-line options.
mod color;
mod options;

pub use self::color::{ColorArg, InvalidColorArg};
pub use self::options::{DebuggingOptions, Options};
pub use self::options::{TRACE_GRAMMAR, TRACE_LEXER, TRACE_MESSAGES};
