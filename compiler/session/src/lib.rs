mod callbacks;
mod config;

pub use self::callbacks::{Callbacks, DefaultCallbacks, IncludeKind};
pub use self::config::*;
