use log::trace;
use rustc_hash::FxHashSet;

use preproc_defines::{special, DefineKind};
use preproc_session::TRACE_MESSAGES;

use super::directive::{is_ident_continue, is_ident_start};
use crate::MacroScopes;

/// Where an expansion takes place, used to resolve the special macros
#[derive(Debug, Clone, Copy)]
pub struct Site<'a> {
    pub file: &'a str,
    pub line: usize,
    pub trace: bool,
}

/// Replaces every macro identifier in `text` with its value.
///
/// String and character literals and comments are copied verbatim. A macro
/// is never expanded again inside its own expansion.
///
/// `in_comment` is the block comment state carried from the previous line of
/// the same file. It is updated to the state at the end of `text`.
pub fn expand_line(scopes: &MacroScopes, text: &str, site: Site<'_>, in_comment: &mut bool) -> String {
    let mut hidden = FxHashSet::default();
    expand(scopes, text, site, &mut hidden, in_comment)
}

fn expand<'s>(
    scopes: &'s MacroScopes,
    text: &str,
    site: Site<'_>,
    hidden: &mut FxHashSet<&'s str>,
    in_comment: &mut bool,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    if *in_comment {
        let end = comment_end(rest, 0);
        out.push_str(&rest[..end.unwrap_or(rest.len())]);
        rest = &rest[end.unwrap_or(rest.len())..];
        *in_comment = end.is_none();
    }

    while let Some(c) = rest.chars().next() {
        if rest.starts_with("//") {
            out.push_str(rest);
            break;
        }
        if rest.starts_with("/*") {
            let end = comment_end(rest, 2);
            *in_comment = end.is_none();
            let end = end.unwrap_or(rest.len());
            out.push_str(&rest[..end]);
            rest = &rest[end..];
            continue;
        }
        if c == '"' || c == '\'' {
            let end = literal_end(rest, c);
            out.push_str(&rest[..end]);
            rest = &rest[end..];
            continue;
        }
        if c.is_ascii_digit() {
            // pp-numbers such as 0x1F or 1e10 must not expand their suffix
            let end = rest
                .char_indices()
                .find(|&(_, c)| !(is_ident_continue(c) || c == '.'))
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            out.push_str(&rest[..end]);
            rest = &rest[end..];
            continue;
        }
        if is_ident_start(c) {
            let end = rest
                .char_indices()
                .find(|&(_, c)| !is_ident_continue(c))
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            let ident = &rest[..end];
            rest = &rest[end..];
            substitute(scopes, ident, site, hidden, &mut out);
            continue;
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    out
}

fn substitute<'s>(
    scopes: &'s MacroScopes,
    ident: &str,
    site: Site<'_>,
    hidden: &mut FxHashSet<&'s str>,
    out: &mut String,
) {
    let def = match scopes.lookup(ident) {
        Some(def) if !hidden.contains(ident) => def,
        _ => {
            out.push_str(ident);
            return;
        }
    };

    let expansion = match (def.kind, def.name.as_str()) {
        (DefineKind::Special, special::FILE) => quote(site.file),
        (DefineKind::Special, special::LINE) => site.line.to_string(),
        // Unknown special macros are left for a later pass
        (DefineKind::Special, _) => ident.to_string(),
        (DefineKind::Ordinary, _) => {
            hidden.insert(def.name.as_str());
            // Macro values never leave a comment open on the line
            let expansion = expand(scopes, &def.value, site, hidden, &mut false);
            hidden.remove(def.name.as_str());
            expansion
        }
    };
    if site.trace {
        trace!(target: TRACE_MESSAGES, "{}:{}: expanded `{}` to `{}`", site.file, site.line, ident, expansion);
    }
    out.push_str(&expansion);
}

/// Returns the offset just past the `*/` closing a comment, searching from `from`
fn comment_end(s: &str, from: usize) -> Option<usize> {
    s[from..].find("*/").map(|i| from + i + 2)
}

/// Returns the byte length of the literal at the start of `s`, including both quotes
fn literal_end(s: &str, quote: char) -> usize {
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            c if c == quote => return i + c.len_utf8(),
            _ => (),
        }
    }
    s.len()
}

/// Renders a path as a string literal
pub fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
