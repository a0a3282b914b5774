use std::fmt;

use crate::errors::{try_copy, DefineError};

/// How the value of a definition is produced
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DefineKind {
    /// Plain text substitution of `value`
    Ordinary,
    /// The engine computes the value at expansion time, e.g. the current line
    Special,
}
impl Default for DefineKind {
    fn default() -> Self {
        Self::Ordinary
    }
}

/// A named macro binding
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Definition {
    pub name: String,
    pub value: String,
    pub kind: DefineKind,
}
impl Definition {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind: DefineKind::Ordinary,
        }
    }

    /// A definition whose value is resolved by the engine when expanded
    pub fn special<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            kind: DefineKind::Special,
        }
    }

    /// Like `new`, but copies into fallibly reserved storage
    pub fn try_new(name: &str, value: &str, kind: DefineKind) -> Result<Self, DefineError> {
        if name.is_empty() {
            return Err(DefineError::EmptyName);
        }
        Ok(Self {
            name: try_copy(name)?,
            value: try_copy(value)?,
            kind,
        })
    }
}
impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}={}", self.name, self.value)
        }
    }
}
