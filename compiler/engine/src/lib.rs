//! The boundary between the session driver and the engine that actually
//! scans input, expands macros and writes output.
//!
//! The driver only ever talks to an engine through [`Engine`]: it brackets a
//! run with `begin_scope`/`end_scope`, seeds the run with definitions, and
//! reads back a [`Status`]. [`LineEngine`] is a small engine implementing that
//! contract for object-like macros and the common directives.
mod line;
mod scope;

pub use self::line::{quote, DirectiveError, DirectiveWarning, LineEngine, Span};
pub use self::scope::{MacroScopes, ScopeError};

use std::io::{BufRead, Write};
use std::path::Path;

use preproc_defines::{DefineError, Definition};
use preproc_diagnostics::Status;
use preproc_session::{Callbacks, Options};

/// Everything an engine is handed for a single run
pub struct Run<'a> {
    /// The path of the input, `None` when reading standard input
    pub input_name: Option<&'a Path>,
    pub input: &'a mut dyn BufRead,
    pub output: &'a mut dyn Write,
    pub options: &'a Options,
    /// The hooks registered by the embedder, if any
    pub callbacks: Option<&'a dyn Callbacks>,
}

pub trait Engine {
    /// Pushes a save point onto the macro table
    fn begin_scope(&mut self) -> Result<(), ScopeError>;

    /// Pops the most recent save point, discarding every macro defined since
    fn end_scope(&mut self);

    /// Binds a macro in the current scope, replacing any visible binding
    fn define(&mut self, def: Definition) -> Result<(), DefineError>;

    /// Clears the diagnostic state left behind by a previous run
    fn reset_status(&mut self);

    /// Scans `run.input` to completion, writing the result to `run.output`
    fn parse(&mut self, run: Run<'_>) -> Status;

    /// The severity accumulated by the last call to `parse`
    fn diagnostic_state(&self) -> Status;
}
