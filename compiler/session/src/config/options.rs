use clap::{ArgMatches, Error, ErrorKind};

use super::ColorArg;

/// Log target used for lexer traces
pub const TRACE_LEXER: &str = "preproc::lexer";
/// Log target used for grammar traces
pub const TRACE_GRAMMAR: &str = "preproc::grammar";
/// Log target used for message traces
pub const TRACE_MESSAGES: &str = "preproc::messages";

/// Independent trace switches consumed by the engine during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebuggingOptions {
    /// Trace every line the scanner consumes
    pub trace_lexer: bool,
    /// Trace every directive the grammar recognizes
    pub trace_grammar: bool,
    /// Trace definitions, removals and expansions
    pub trace_messages: bool,
}
impl DebuggingOptions {
    pub fn new(trace_lexer: bool, trace_grammar: bool, trace_messages: bool) -> Self {
        Self {
            trace_lexer,
            trace_grammar,
            trace_messages,
        }
    }

    /// The log targets which should be raised to `trace` for these options
    pub fn targets(&self) -> impl Iterator<Item = &'static str> {
        [
            (self.trace_lexer, TRACE_LEXER),
            (self.trace_grammar, TRACE_GRAMMAR),
            (self.trace_messages, TRACE_MESSAGES),
        ]
        .into_iter()
        .filter_map(|(enabled, target)| if enabled { Some(target) } else { None })
    }
}

/// Options which affect how a run is carried out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub debugging: DebuggingOptions,
    /// Enables extra warnings for questionable constructs
    pub pedantic: bool,
    /// Treats every warning as an error when deciding the run status
    pub warnings_as_errors: bool,
    pub color: ColorArg,
}
impl Options {
    /// Extracts options from parsed command-line arguments
    pub fn new<'a>(matches: &ArgMatches<'a>) -> clap::Result<Self> {
        let debugging = DebuggingOptions::new(
            matches.is_present("trace-lexer"),
            matches.is_present("trace-grammar"),
            matches.is_present("trace-messages"),
        );
        let color = match matches.value_of("color") {
            None => ColorArg::default(),
            Some(value) => value
                .parse()
                .map_err(|err: super::InvalidColorArg| {
                    Error::with_description(&err.to_string(), ErrorKind::InvalidValue)
                })?,
        };
        Ok(Self {
            debugging,
            pedantic: matches.is_present("pedantic"),
            warnings_as_errors: matches.is_present("warnings-as-errors"),
            color,
        })
    }

    pub fn set_debug(&mut self, trace_lexer: bool, trace_grammar: bool, trace_messages: bool) {
        self.debugging = DebuggingOptions::new(trace_lexer, trace_grammar, trace_messages);
    }

    pub fn set_pedantic(&mut self, on: bool) {
        self.pedantic = on;
    }
}
