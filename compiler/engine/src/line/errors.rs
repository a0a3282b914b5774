use std::ops::Range;
use std::path::PathBuf;

use preproc_diagnostics::{Diagnostic, Label, SourceId, ToDiagnostic};
use preproc_session::IncludeKind;

/// A byte range within one of the sources of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub source: SourceId,
    pub range: Range<usize>,
}
impl Span {
    pub fn new(source: SourceId, range: Range<usize>) -> Self {
        Self { source, range }
    }

    fn primary(&self) -> Label {
        Label::primary(self.source, self.range.clone())
    }

    fn secondary(&self) -> Label {
        Label::secondary(self.source, self.range.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectiveError {
    #[error("invalid preprocessing directive `#{name}`")]
    Unknown { span: Span, name: String },

    #[error("no macro name given in #{directive} directive")]
    MissingName { span: Span, directive: &'static str },

    #[error("macro names must be identifiers, found `{found}`")]
    InvalidName { span: Span, found: String },

    #[error("function-like macro `{name}` is not supported")]
    FunctionLike { span: Span, name: String },

    #[error("#{directive} without #ifdef")]
    Orphaned { span: Span, directive: &'static str },

    #[error("#else after #else")]
    DuplicateElse { span: Span, first: Span },

    #[error("unterminated conditional directive")]
    Unterminated { span: Span },

    #[error("#include expects \"FILE\" or <FILE>")]
    BadInclude { span: Span },

    #[error("could not find include file `{name}`")]
    IncludeNotFound {
        span: Span,
        name: String,
        kind: IncludeKind,
    },

    #[error("could not open include file {path:?}")]
    IncludeOpen {
        span: Span,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("#include nested more than {limit} levels deep")]
    TooDeep { span: Span, limit: usize },

    #[error("#error {message}")]
    User { span: Span, message: String },
}
impl ToDiagnostic for DirectiveError {
    fn to_diagnostic(self) -> Diagnostic {
        let message = self.to_string();
        match self {
            DirectiveError::Unknown { span, .. } => Diagnostic::error()
                .with_message(message)
                .with_labels(vec![span.primary()]),
            DirectiveError::MissingName { span, .. } | DirectiveError::InvalidName { span, .. } => {
                Diagnostic::error()
                    .with_message(message)
                    .with_labels(vec![span.primary().with_message("expected an identifier")])
            }
            DirectiveError::FunctionLike { span, .. } => Diagnostic::error()
                .with_message(message)
                .with_labels(vec![span.primary()])
                .with_notes(vec![
                    "only object-like macros can be defined in source".to_string(),
                ]),
            DirectiveError::Orphaned { span, .. } => Diagnostic::error()
                .with_message(message)
                .with_labels(vec![span.primary().with_message("no open conditional")]),
            DirectiveError::DuplicateElse { span, first } => Diagnostic::error()
                .with_message(message)
                .with_labels(vec![
                    span.primary(),
                    first.secondary().with_message("previous #else is here"),
                ]),
            DirectiveError::Unterminated { span } => Diagnostic::error()
                .with_message(message)
                .with_labels(vec![span.primary().with_message("this conditional is never closed")]),
            DirectiveError::BadInclude { span } => Diagnostic::error()
                .with_message(message)
                .with_labels(vec![span.primary()]),
            DirectiveError::IncludeNotFound { span, kind, .. } => Diagnostic::error()
                .with_message(message)
                .with_labels(vec![span.primary().with_message(format!("{} include", kind))]),
            DirectiveError::IncludeOpen { span, source, .. } => Diagnostic::error()
                .with_message(message)
                .with_labels(vec![span.primary().with_message(source.to_string())]),
            DirectiveError::TooDeep { span, .. } => Diagnostic::error()
                .with_message(message)
                .with_labels(vec![span.primary()]),
            DirectiveError::User { span, .. } => Diagnostic::error()
                .with_message(message)
                .with_labels(vec![span.primary()]),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectiveWarning {
    #[error("`{name}` redefined")]
    Redefined {
        span: Span,
        name: String,
        previous: String,
    },

    #[error("extra tokens at end of #{directive} directive")]
    ExtraTokens { span: Span, directive: &'static str },

    #[error("#warning {message}")]
    User { span: Span, message: String },
}
impl ToDiagnostic for DirectiveWarning {
    fn to_diagnostic(self) -> Diagnostic {
        let message = self.to_string();
        match self {
            DirectiveWarning::Redefined { span, previous, .. } => Diagnostic::warning()
                .with_message(message)
                .with_labels(vec![span.primary()])
                .with_notes(vec![format!("previous value was `{}`", previous)]),
            DirectiveWarning::ExtraTokens { span, .. } | DirectiveWarning::User { span, .. } => {
                Diagnostic::warning()
                    .with_message(message)
                    .with_labels(vec![span.primary()])
            }
        }
    }
}
