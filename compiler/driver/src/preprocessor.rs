use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use preproc_defines::{DefineError, DefineTable, Definition, SpecialMacros};
use preproc_diagnostics::Status;
use preproc_engine::{quote, Engine, Run};
use preproc_session::{Callbacks, Options};

use crate::DriverError;

/// The base used for temporary outputs when the caller gives none
pub const FALLBACK_TEMP_BASE: &str = "pptmp";

/// A preprocessing context.
///
/// Holds everything that persists from one run to the next: the command-line
/// definitions, the trace and pedantic flags, the registered callbacks and
/// the engine itself. Each call to [`Preprocessor::parse`] is one run.
pub struct Preprocessor<E: Engine> {
    options: Options,
    defines: DefineTable,
    callbacks: Option<Arc<dyn Callbacks>>,
    engine: E,
}
impl<E: Engine> Preprocessor<E> {
    pub fn new(engine: E) -> Self {
        Self::with_options(engine, Options::default())
    }

    pub fn with_options(engine: E, options: Options) -> Self {
        Self {
            options,
            defines: DefineTable::new(),
            callbacks: None,
            engine,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The command-line definitions applied at the start of every run
    pub fn defines(&self) -> &DefineTable {
        &self.defines
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Registers `name`, or replaces its value if it is already registered.
    ///
    /// A missing value is the empty string.
    pub fn add_define(&mut self, name: &str, value: Option<&str>) -> Result<(), DefineError> {
        debug!("define {}={:?}", name, value.unwrap_or(""));
        self.defines.add_or_update(name, value.unwrap_or(""))
    }

    /// Clears the value of `name` and excludes it from later runs
    pub fn del_define(&mut self, name: &str) {
        debug!("undefine {}", name);
        self.defines.remove(name);
    }

    /// Registers a `NAME` or `NAME=VALUE` token
    pub fn add_cmdline_define(&mut self, spec: &str) -> Result<(), DefineError> {
        debug!("define {}", spec);
        self.defines.add_cmdline(spec)
    }

    pub fn set_debug(&mut self, trace_lexer: bool, trace_grammar: bool, trace_messages: bool) {
        self.options
            .set_debug(trace_lexer, trace_grammar, trace_messages);
    }

    pub fn set_pedantic(&mut self, on: bool) {
        self.options.set_pedantic(on);
    }

    /// Installs the hooks handed to the engine on every run, replacing any previous set
    pub fn set_callbacks(&mut self, callbacks: Arc<dyn Callbacks>) {
        self.callbacks = Some(callbacks);
    }

    pub fn clear_callbacks(&mut self) {
        self.callbacks = None;
    }

    pub fn callbacks(&self) -> Option<&Arc<dyn Callbacks>> {
        self.callbacks.as_ref()
    }

    /// Runs the engine over `input`, or standard input when `None`, writing to `output`.
    ///
    /// `Ok` carries the status of a run that reached the engine, which is
    /// non-zero when diagnostics were reported. Once the macro scope for the
    /// run has been pushed, it is popped exactly once whatever the outcome.
    pub fn parse(&mut self, input: Option<&Path>, output: &mut dyn Write) -> Result<Status, DriverError> {
        self.engine.reset_status();
        self.engine.begin_scope()?;
        let scope = ScopeGuard {
            engine: &mut self.engine,
        };

        for def in self.defines.active() {
            scope
                .engine
                .define(Definition::try_new(&def.name, &def.value, def.kind)?)?;
        }
        for def in SpecialMacros::now().definitions() {
            scope.engine.define(def)?;
        }

        let mut reader: Box<dyn BufRead> = match input {
            None => Box::new(io::stdin().lock()),
            Some(path) => {
                let file = File::open(path).map_err(|source| DriverError::InputOpen {
                    path: path.to_path_buf(),
                    source,
                })?;
                Box::new(BufReader::new(file))
            }
        };
        let name = input
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        writeln!(output, "# 1 {} 1", quote(&name)).map_err(DriverError::Output)?;

        let result = scope.engine.parse(Run {
            input_name: input,
            input: &mut *reader,
            output: &mut *output,
            options: &self.options,
            callbacks: self.callbacks.as_deref(),
        });
        let status = result.or_diagnostics(scope.engine.diagnostic_state());
        drop(reader);
        debug!("run over {:?} finished with status {}", name, status);

        output.flush().map_err(DriverError::Output)?;
        Ok(status)
    }

    /// Runs the engine with its output sent to a new file named `<base>.XXXXXX`.
    ///
    /// The file is left on disk for the caller, who receives its path even if
    /// the run itself fails.
    pub fn parse_temp(&mut self, input: Option<&Path>, base: &str) -> Result<TempOutput, DriverError> {
        let (file, path) = create_temp(base)?;
        debug!("writing output to {}", path.display());

        let mut writer = BufWriter::new(file);
        let mut result = self.parse(input, &mut writer);
        if let Err(err) = writer.into_inner() {
            if result.is_ok() {
                result = Err(DriverError::Output(err.into_error()));
            }
        }
        Ok(TempOutput { path, result })
    }
}

/// Pops the run's macro scope when dropped
struct ScopeGuard<'a, E: Engine> {
    engine: &'a mut E,
}
impl<E: Engine> Drop for ScopeGuard<'_, E> {
    fn drop(&mut self) {
        self.engine.end_scope();
    }
}

/// The outcome of [`Preprocessor::parse_temp`]
#[derive(Debug)]
pub struct TempOutput {
    /// The generated file, which the caller now owns
    pub path: PathBuf,
    pub result: Result<Status, DriverError>,
}
impl TempOutput {
    pub fn status(&self) -> Status {
        match &self.result {
            Ok(status) => *status,
            Err(err) => err.status(),
        }
    }
}

/// Splits a temp base into the directory to create in and the file name prefix
fn temp_location(base: &str) -> (PathBuf, String) {
    let base = Path::new(if base.is_empty() { FALLBACK_TEMP_BASE } else { base });
    let dir = base
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let prefix = match base.file_name() {
        Some(name) => format!("{}.", name.to_string_lossy()),
        None => format!("{}.", FALLBACK_TEMP_BASE),
    };
    (dir, prefix)
}

fn create_temp(base: &str) -> Result<(File, PathBuf), DriverError> {
    let (dir, prefix) = temp_location(base);
    let template = format!("{}XXXXXX", dir.join(&prefix).display());
    tempfile::Builder::new()
        .prefix(&prefix)
        .rand_bytes(6)
        .tempfile_in(&dir)
        .and_then(|file| file.keep().map_err(|err| err.error))
        .map_err(|source| DriverError::TempFile { template, source })
}
