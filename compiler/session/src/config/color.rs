use std::fmt;
use std::str::FromStr;

use preproc_diagnostics::ColorChoice;

/// The `--color` setting for diagnostic output
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ColorArg {
    Auto,
    Always,
    Never,
}
impl ColorArg {
    pub const VARIANTS: &'static [&'static str] = &["auto", "always", "never"];

    pub fn to_color_choice(self) -> ColorChoice {
        match self {
            Self::Auto => ColorChoice::Auto,
            Self::Always => ColorChoice::Always,
            Self::Never => ColorChoice::Never,
        }
    }
}
impl Default for ColorArg {
    fn default() -> Self {
        Self::Auto
    }
}
impl fmt::Display for ColorArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Auto => "auto".fmt(f),
            Self::Always => "always".fmt(f),
            Self::Never => "never".fmt(f),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid color setting `{0}`, expected one of: auto, always, never")]
pub struct InvalidColorArg(String);

impl FromStr for ColorArg {
    type Err = InvalidColorArg;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err(InvalidColorArg(s.to_string())),
        }
    }
}
