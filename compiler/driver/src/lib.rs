pub mod argparser;
mod commands;
mod driver;
mod errors;
mod preprocessor;

pub use self::driver::run_preprocessor;
pub use self::errors::DriverError;
pub use self::preprocessor::{Preprocessor, TempOutput, FALLBACK_TEMP_BASE};

use clap::crate_version;

pub const PREPROC_RELEASE: &'static str = crate_version!();
