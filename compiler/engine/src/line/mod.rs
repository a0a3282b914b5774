mod directive;
mod errors;
mod expand;

pub use self::errors::{DirectiveError, DirectiveWarning, Span};
pub use self::expand::quote;

use std::io::{self, Read, Write};
use std::path::Path;

use log::{debug, trace};

use preproc_defines::{DefineError, DefineKind, Definition};
use preproc_diagnostics::{self as diagnostics, CodeMap, ColorChoice, Diagnostic, Reporter, Status};
use preproc_session::{
    Callbacks, DefaultCallbacks, IncludeKind, Options, TRACE_GRAMMAR, TRACE_LEXER, TRACE_MESSAGES,
};

use self::directive::{split_ident, Directive, Malformed};
use self::expand::{expand_line, Site};
use crate::{Engine, MacroScopes, Run, ScopeError};

/// A line-oriented engine for object-like macros.
///
/// Every input line produces exactly one output line, except `#include`,
/// which is replaced by the included file between a pair of line markers.
#[derive(Debug, Default)]
pub struct LineEngine {
    scopes: MacroScopes,
    state: Status,
    codemap: CodeMap,
    diagnostics: Vec<Diagnostic>,
}
impl LineEngine {
    pub const MAX_INCLUDE_DEPTH: usize = 64;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn macros(&self) -> &MacroScopes {
        &self.scopes
    }

    /// The diagnostics reported since the last `reset_status`
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.as_slice()
    }

    /// The sources the diagnostics refer to
    pub fn codemap(&self) -> &CodeMap {
        &self.codemap
    }

    /// Prints the collected diagnostics to stderr
    pub fn emit_diagnostics(&self, color: ColorChoice) {
        diagnostics::print(&self.codemap, &self.diagnostics, color);
    }
}
impl Engine for LineEngine {
    fn begin_scope(&mut self) -> Result<(), ScopeError> {
        self.scopes.push()
    }

    fn end_scope(&mut self) {
        self.scopes.pop()
    }

    fn define(&mut self, def: Definition) -> Result<(), DefineError> {
        self.scopes.define(def).map(|_| ())
    }

    fn reset_status(&mut self) {
        self.state = Status::SUCCESS;
        self.codemap.clear();
        self.diagnostics.clear();
    }

    fn parse(&mut self, run: Run<'_>) -> Status {
        let Run {
            input_name,
            input,
            output,
            options,
            callbacks,
        } = run;
        let callbacks: &dyn Callbacks = callbacks.unwrap_or(&DefaultCallbacks);
        let name = input_name
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        let reporter = Reporter::new();
        reporter.warnings_as_errors(options.warnings_as_errors);

        let mut bytes = Vec::new();
        let status = match input.read_to_end(&mut bytes) {
            Err(err) => {
                reporter.show_error(&format!("failed to read input: {}", err), &[]);
                Status::FAILED
            }
            Ok(_) => {
                let mut cx = Context {
                    scopes: &mut self.scopes,
                    codemap: &mut self.codemap,
                    reporter: &reporter,
                    options,
                    callbacks,
                    output,
                    depth: 0,
                };
                match cx.process(input_name, &name, bytes) {
                    Ok(()) => Status::SUCCESS,
                    Err(err) => {
                        reporter.show_error(&format!("failed to write output: {}", err), &[]);
                        Status::FAILED
                    }
                }
            }
        };

        debug!(
            "finished {:?} with {} errors and {} warnings",
            name,
            reporter.error_count(),
            reporter.warning_count()
        );
        self.state = reporter.status();
        self.diagnostics.extend(reporter.take());
        status
    }

    fn diagnostic_state(&self) -> Status {
        self.state
    }
}

/// An open `#ifdef`/`#ifndef` group
struct Conditional {
    span: Span,
    else_span: Option<Span>,
    /// Whether the enclosing group was being emitted when this one opened
    parent_active: bool,
    taking: bool,
}

struct Context<'a> {
    scopes: &'a mut MacroScopes,
    codemap: &'a mut CodeMap,
    reporter: &'a Reporter,
    options: &'a Options,
    callbacks: &'a dyn Callbacks,
    output: &'a mut dyn Write,
    depth: usize,
}
impl<'a> Context<'a> {
    fn process(&mut self, path: Option<&Path>, name: &str, bytes: Vec<u8>) -> io::Result<()> {
        let source_name = if name.is_empty() { "<stdin>" } else { name };
        let lines: Vec<&[u8]> = bytes.split_inclusive(|&b| b == b'\n').collect();
        let text: String = lines.iter().map(|raw| String::from_utf8_lossy(raw)).collect();
        let id = self.codemap.add(source_name, text);
        let debugging = &self.options.debugging;
        let (trace_lexer, trace_grammar) = (debugging.trace_lexer, debugging.trace_grammar);

        let mut conditionals: Vec<Conditional> = Vec::new();
        let mut in_comment = false;
        let mut offset = 0;
        for (index, raw) in lines.into_iter().enumerate() {
            let line_no = index + 1;
            let decoded = String::from_utf8_lossy(raw);
            // Offsets index the decoded source held by the codemap
            let start = offset;
            offset += decoded.len();
            let line = decoded.trim_end_matches(&['\n', '\r'][..]);
            let active = conditionals.iter().all(|c| c.taking);
            if trace_lexer {
                trace!(target: TRACE_LEXER, "{}:{}: {:?}", source_name, line_no, line);
            }

            let trimmed = line.trim_start();
            let directive_body = if in_comment { None } else { trimmed.strip_prefix('#') };
            let body = match directive_body {
                Some(body) => body,
                None if active => {
                    let site = self.site(name, line_no);
                    let expanded = expand_line(self.scopes, line, site, &mut in_comment);
                    if std::str::from_utf8(raw).is_ok() {
                        writeln!(self.output, "{}", expanded)?;
                    } else {
                        // Text that is not UTF-8 is passed through unexpanded
                        self.output.write_all(trim_newline(raw))?;
                        writeln!(self.output)?;
                    }
                    continue;
                }
                None => {
                    writeln!(self.output)?;
                    continue;
                }
            };

            let span = Span::new(id, start + (line.len() - trimmed.len())..start + line.len());
            let directive = match directive::parse(body) {
                Ok(directive) => directive,
                Err(malformed) => {
                    if opens_conditional(body) {
                        conditionals.push(Conditional {
                            span: span.clone(),
                            else_span: None,
                            parent_active: active,
                            taking: false,
                        });
                    }
                    if active {
                        self.reporter.error(malformed_error(malformed, span));
                    }
                    writeln!(self.output)?;
                    continue;
                }
            };
            if !active && !directive.is_conditional() {
                writeln!(self.output)?;
                continue;
            }
            if trace_grammar {
                trace!(target: TRACE_GRAMMAR, "{}:{}: {:?}", source_name, line_no, directive);
            }

            match directive {
                Directive::Define { name: macro_name, value } => {
                    self.define(macro_name, value, span);
                    writeln!(self.output)?;
                }
                Directive::Undef { name: macro_name, rest } => {
                    self.check_extra_tokens(rest, "undef", &span);
                    let removed = self.scopes.undefine(macro_name);
                    if self.options.debugging.trace_messages {
                        trace!(target: TRACE_MESSAGES, "undef {} (was defined: {})", macro_name, removed);
                    }
                    writeln!(self.output)?;
                }
                Directive::Ifdef { name: macro_name, rest } => {
                    let conditional = self.open_conditional(macro_name, rest, false, active, span);
                    conditionals.push(conditional);
                    writeln!(self.output)?;
                }
                Directive::Ifndef { name: macro_name, rest } => {
                    let conditional = self.open_conditional(macro_name, rest, true, active, span);
                    conditionals.push(conditional);
                    writeln!(self.output)?;
                }
                Directive::Else { rest } => {
                    match conditionals.last_mut() {
                        None => self.reporter.error(DirectiveError::Orphaned {
                            span,
                            directive: "else",
                        }),
                        Some(Conditional {
                            else_span: Some(first),
                            ..
                        }) => self.reporter.error(DirectiveError::DuplicateElse {
                            span,
                            first: first.clone(),
                        }),
                        Some(conditional) => {
                            if conditional.parent_active {
                                self.check_extra_tokens(rest, "else", &span);
                            }
                            conditional.taking = !conditional.taking;
                            conditional.else_span = Some(span);
                        }
                    }
                    writeln!(self.output)?;
                }
                Directive::Endif { rest } => {
                    match conditionals.pop() {
                        None => self.reporter.error(DirectiveError::Orphaned {
                            span,
                            directive: "endif",
                        }),
                        Some(conditional) if conditional.parent_active => {
                            self.check_extra_tokens(rest, "endif", &span)
                        }
                        Some(_) => (),
                    }
                    writeln!(self.output)?;
                }
                Directive::Include { target, kind } => {
                    self.include(path, name, line_no, target, kind, span)?;
                }
                Directive::Error { message } => {
                    self.reporter.error(DirectiveError::User {
                        span,
                        message: message.to_string(),
                    });
                    writeln!(self.output)?;
                }
                Directive::Warning { message } => {
                    self.reporter.warning(DirectiveWarning::User {
                        span,
                        message: message.to_string(),
                    });
                    writeln!(self.output)?;
                }
                Directive::Pragma | Directive::LineMarker => writeln!(self.output, "{}", line)?,
                Directive::Null => writeln!(self.output)?,
            }
        }

        for conditional in conditionals {
            self.reporter.error(DirectiveError::Unterminated {
                span: conditional.span,
            });
        }
        Ok(())
    }

    fn site<'n>(&self, name: &'n str, line: usize) -> Site<'n> {
        Site {
            file: name,
            line,
            trace: self.options.debugging.trace_messages,
        }
    }

    fn define(&mut self, name: &str, value: &str, span: Span) {
        let result = Definition::try_new(name, value, DefineKind::Ordinary)
            .and_then(|def| self.scopes.define(def));
        match result {
            Ok(previous) => {
                if self.options.debugging.trace_messages {
                    trace!(target: TRACE_MESSAGES, "define {} = {:?}", name, value);
                }
                match previous {
                    Some(prev) if self.options.pedantic && (prev.kind != DefineKind::Ordinary || prev.value != value) => {
                        self.reporter.warning(DirectiveWarning::Redefined {
                            span,
                            name: name.to_string(),
                            previous: prev.value,
                        })
                    }
                    _ => (),
                }
            }
            Err(err) => self.reporter.show_error(
                &format!("unable to define `{}`", name),
                &[(span.source, span.range, err.to_string().as_str())],
            ),
        }
    }

    fn open_conditional(
        &self,
        name: &str,
        rest: &str,
        negate: bool,
        active: bool,
        span: Span,
    ) -> Conditional {
        if active {
            self.check_extra_tokens(rest, if negate { "ifndef" } else { "ifdef" }, &span);
        }
        Conditional {
            span,
            else_span: None,
            parent_active: active,
            taking: self.scopes.is_defined(name) != negate,
        }
    }

    fn check_extra_tokens(&self, rest: &str, directive: &'static str, span: &Span) {
        if !self.options.pedantic || rest.is_empty() || rest.starts_with("//") || rest.starts_with("/*") {
            return;
        }
        self.reporter.warning(DirectiveWarning::ExtraTokens {
            span: span.clone(),
            directive,
        });
    }

    fn include(
        &mut self,
        parent: Option<&Path>,
        parent_name: &str,
        line_no: usize,
        target: &str,
        kind: IncludeKind,
        span: Span,
    ) -> io::Result<()> {
        if self.depth >= LineEngine::MAX_INCLUDE_DEPTH {
            self.reporter.error(DirectiveError::TooDeep {
                span,
                limit: LineEngine::MAX_INCLUDE_DEPTH,
            });
            return writeln!(self.output);
        }
        let path = match self.callbacks.lookup(target, kind, parent) {
            Some(path) => path,
            None => {
                self.reporter.error(DirectiveError::IncludeNotFound {
                    span,
                    name: target.to_string(),
                    kind,
                });
                return writeln!(self.output);
            }
        };
        let bytes = match self.callbacks.open(&path).and_then(|mut reader| {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes).map(|_| bytes)
        }) {
            Ok(bytes) => bytes,
            Err(source) => {
                self.reporter.error(DirectiveError::IncludeOpen { span, path, source });
                return writeln!(self.output);
            }
        };

        let name = path.display().to_string();
        debug!("entering {} from {}:{}", name, parent_name, line_no);
        writeln!(self.output, "# 1 {} 1", quote(&name))?;
        self.depth += 1;
        let result = self.process(Some(&path), &name, bytes);
        self.depth -= 1;
        result?;
        writeln!(self.output, "# {} {} 2", line_no + 1, quote(parent_name))
    }
}

fn trim_newline(mut raw: &[u8]) -> &[u8] {
    while let Some((b'\n' | b'\r', rest)) = raw.split_last() {
        raw = rest;
    }
    raw
}

/// True if `body` starts a conditional group, even when it is malformed
fn opens_conditional(body: &str) -> bool {
    matches!(split_ident(body.trim_start()).0, "ifdef" | "ifndef")
}

fn malformed_error(malformed: Malformed<'_>, span: Span) -> DirectiveError {
    match malformed {
        Malformed::Unknown(name) => DirectiveError::Unknown {
            span,
            name: name.to_string(),
        },
        Malformed::MissingName(directive) => DirectiveError::MissingName { span, directive },
        Malformed::InvalidName(found) => DirectiveError::InvalidName {
            span,
            found: found.to_string(),
        },
        Malformed::FunctionLike(name) => DirectiveError::FunctionLike {
            span,
            name: name.to_string(),
        },
        Malformed::BadInclude => DirectiveError::BadInclude { span },
    }
}
