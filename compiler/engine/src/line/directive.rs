use preproc_session::IncludeKind;

/// A recognized directive, borrowing from the source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<'a> {
    /// A lone `#`
    Null,
    /// `# 12 "file.c"`, as emitted by a previous preprocessing pass
    LineMarker,
    Define { name: &'a str, value: &'a str },
    Undef { name: &'a str, rest: &'a str },
    Ifdef { name: &'a str, rest: &'a str },
    Ifndef { name: &'a str, rest: &'a str },
    Else { rest: &'a str },
    Endif { rest: &'a str },
    Include { target: &'a str, kind: IncludeKind },
    Error { message: &'a str },
    Warning { message: &'a str },
    Pragma,
}
impl<'a> Directive<'a> {
    /// Conditionals are tracked even inside skipped groups
    pub fn is_conditional(&self) -> bool {
        matches!(
            self,
            Self::Ifdef { .. } | Self::Ifndef { .. } | Self::Else { .. } | Self::Endif { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Malformed<'a> {
    Unknown(&'a str),
    MissingName(&'static str),
    InvalidName(&'a str),
    FunctionLike(&'a str),
    BadInclude,
}

/// Parses the text following the `#` of a directive line
pub fn parse(body: &str) -> Result<Directive<'_>, Malformed<'_>> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(Directive::Null);
    }
    if body.starts_with(|c: char| c.is_ascii_digit()) {
        return Ok(Directive::LineMarker);
    }

    let (keyword, rest) = split_ident(body);
    let rest = rest.trim_start();
    match keyword {
        "define" => {
            let (name, after) = macro_name(rest, "define")?;
            if after.starts_with('(') {
                return Err(Malformed::FunctionLike(name));
            }
            Ok(Directive::Define {
                name,
                value: after.trim(),
            })
        }
        "undef" => {
            let (name, rest) = macro_name(rest, "undef")?;
            Ok(Directive::Undef {
                name,
                rest: rest.trim(),
            })
        }
        "ifdef" => {
            let (name, rest) = macro_name(rest, "ifdef")?;
            Ok(Directive::Ifdef {
                name,
                rest: rest.trim(),
            })
        }
        "ifndef" => {
            let (name, rest) = macro_name(rest, "ifndef")?;
            Ok(Directive::Ifndef {
                name,
                rest: rest.trim(),
            })
        }
        "else" => Ok(Directive::Else { rest: rest.trim() }),
        "endif" => Ok(Directive::Endif { rest: rest.trim() }),
        "include" => include_target(rest),
        "error" => Ok(Directive::Error {
            message: rest.trim(),
        }),
        "warning" => Ok(Directive::Warning {
            message: rest.trim(),
        }),
        "pragma" => Ok(Directive::Pragma),
        "" => Err(Malformed::Unknown(body.split_whitespace().next().unwrap_or(body))),
        other => Err(Malformed::Unknown(other)),
    }
}

fn macro_name<'a>(
    rest: &'a str,
    directive: &'static str,
) -> Result<(&'a str, &'a str), Malformed<'a>> {
    if rest.is_empty() {
        return Err(Malformed::MissingName(directive));
    }
    match split_ident(rest) {
        ("", _) => Err(Malformed::InvalidName(
            rest.split_whitespace().next().unwrap_or(rest),
        )),
        split => Ok(split),
    }
}

fn include_target(rest: &str) -> Result<Directive<'_>, Malformed<'_>> {
    let (close, kind) = match rest.chars().next() {
        Some('"') => ('"', IncludeKind::Quoted),
        Some('<') => ('>', IncludeKind::System),
        _ => return Err(Malformed::BadInclude),
    };
    let inner = &rest[1..];
    match inner.find(close) {
        Some(end) if end > 0 => Ok(Directive::Include {
            target: &inner[..end],
            kind,
        }),
        _ => Err(Malformed::BadInclude),
    }
}

pub fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

pub fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// Splits a leading identifier off `s`; the identifier is empty if `s` does not start with one
pub fn split_ident(s: &str) -> (&str, &str) {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if is_ident_start(c) => (),
        _ => return ("", s),
    }
    let end = chars
        .find(|&(_, c)| !is_ident_continue(c))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s.split_at(end)
}
