mod codemap;
mod status;

pub use codespan_reporting::diagnostic::Severity;
pub use codespan_reporting::files::{self, Error, Files};
pub use codespan_reporting::term;
pub use codespan_reporting::term::termcolor::ColorChoice;

pub use self::codemap::{CodeMap, SourceFile, SourceId};
pub use self::status::Status;

pub type Diagnostic = codespan_reporting::diagnostic::Diagnostic<SourceId>;
pub type Label = codespan_reporting::diagnostic::Label<SourceId>;

pub trait ToDiagnostic {
    fn to_diagnostic(self) -> Diagnostic;
}

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default, Clone)]
pub struct Reporter(Rc<RefCell<ReporterImpl>>);
impl Reporter {
    /// Creates a new reporter with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether or not warnings will be treated as errors by the reporter
    ///
    /// When true, any warning diagnostics will be automatically promoted to errors
    pub fn warnings_as_errors(&self, value: bool) {
        let mut reporter = self.0.borrow_mut();
        reporter.warnings_as_errors(value);
    }

    /// Returns true if an error was reported
    #[inline]
    pub fn is_failed(&self) -> bool {
        let reporter = self.0.borrow();
        reporter.is_failed()
    }

    /// The accumulated severity of everything reported so far
    pub fn status(&self) -> Status {
        if self.is_failed() {
            Status::FAILED
        } else {
            Status::SUCCESS
        }
    }

    pub fn error_count(&self) -> usize {
        self.0.borrow().count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.0.borrow().count(Severity::Warning)
    }

    /// Moves every diagnostic reported so far out of the reporter
    pub fn take(&self) -> Vec<Diagnostic> {
        let mut reporter = self.0.borrow_mut();
        std::mem::take(&mut reporter.diagnostics)
    }

    /// Report a diagnostic
    #[inline]
    pub fn diagnostic(&self, diagnostic: Diagnostic) {
        let mut reporter = self.0.borrow_mut();
        reporter.diagnostic(diagnostic);
    }

    /// Report a diagnostic, forcing its severity to Warning
    pub fn warning<W: ToDiagnostic>(&self, warning: W) {
        let mut diagnostic = warning.to_diagnostic();
        diagnostic.severity = Severity::Warning;
        let mut reporter = self.0.borrow_mut();
        reporter.diagnostic(diagnostic)
    }

    /// Report a diagnostic, forcing its severity to Error
    pub fn error<E: ToDiagnostic>(&self, error: E) {
        let mut diagnostic = error.to_diagnostic();
        diagnostic.severity = Severity::Error;
        let mut reporter = self.0.borrow_mut();
        reporter.diagnostic(diagnostic)
    }

    /// A convenience method to make expressing common error diagnostics easier
    pub fn show_error(&self, message: &str, labels: &[(SourceId, std::ops::Range<usize>, &str)]) {
        self.diagnostic(with_labels(Diagnostic::error(), message, labels));
    }
}

fn with_labels(
    diagnostic: Diagnostic,
    message: &str,
    labels: &[(SourceId, std::ops::Range<usize>, &str)],
) -> Diagnostic {
    let labels = labels
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, (id, range, message))| {
            if i > 0 {
                Label::secondary(id, range).with_message(message)
            } else {
                Label::primary(id, range).with_message(message)
            }
        })
        .collect();
    diagnostic.with_message(message).with_labels(labels)
}

#[derive(Default, Clone)]
pub struct ReporterImpl {
    diagnostics: Vec<Diagnostic>,
    warnings_as_errors: bool,
    failed: bool,
}
impl ReporterImpl {
    fn warnings_as_errors(&mut self, value: bool) {
        self.warnings_as_errors = value;
    }

    fn is_failed(&self) -> bool {
        self.failed
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn diagnostic(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Bug | Severity::Error => self.failed = true,
            Severity::Warning if self.warnings_as_errors => self.failed = true,
            _ => (),
        }
        self.diagnostics.push(diagnostic);
    }
}

/// Print diagnostics to stderr, using the provided CodeMap to load sources
pub fn print(codemap: &CodeMap, diagnostics: &[Diagnostic], color: ColorChoice) {
    use term::termcolor::StandardStream;

    let config = term::Config::default();
    let out = StandardStream::stderr(color);
    let mut out = out.lock();
    for diagnostic in diagnostics {
        if let Err(err) = term::emit(&mut out, &config, codemap, diagnostic) {
            eprintln!("failed to emit diagnostic: {}", err);
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn warnings_do_not_fail_by_default() {
        let reporter = Reporter::new();
        reporter.diagnostic(Diagnostic::warning().with_message("careful"));

        assert!(!reporter.is_failed());
        assert_eq!(reporter.status(), Status::SUCCESS);
        assert_eq!(reporter.warning_count(), 1);
    }

    #[test]
    fn warnings_as_errors_promotes_warnings() {
        let reporter = Reporter::new();
        reporter.warnings_as_errors(true);
        reporter.diagnostic(Diagnostic::warning().with_message("careful"));

        assert!(reporter.is_failed());
        assert_eq!(reporter.status(), Status::FAILED);
        assert_eq!(reporter.error_count(), 0);
        assert_eq!(reporter.warning_count(), 1);
    }

    #[test]
    fn labels_render_against_the_codemap() {
        use term::termcolor::NoColor;

        let mut codemap = CodeMap::new();
        let id = codemap.add("input.c", "#bogus\n".to_string());
        let reporter = Reporter::new();
        reporter.show_error("invalid directive", &[(id, 0..6, "not a known directive")]);
        let diagnostics = reporter.take();
        assert_eq!(diagnostics.len(), 1);
        assert!(reporter.take().is_empty());

        let mut out = NoColor::new(Vec::new());
        term::emit(&mut out, &term::Config::default(), &codemap, &diagnostics[0]).unwrap();
        let out = String::from_utf8(out.into_inner()).unwrap();

        assert!(out.contains("error: invalid directive"));
        assert!(out.contains("input.c:1:1"));
        assert!(out.contains("not a known directive"));
    }
}
