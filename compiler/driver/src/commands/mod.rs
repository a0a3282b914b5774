pub mod run;

use std::error::Error;

use log::error;

use crate::DriverError;

/// Prints a failed run to stderr, returning the exit code it maps to
pub(crate) fn report(err: DriverError) -> i32 {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    error!("{}", message);
    eprintln!("error: {}", message);
    err.exit_code()
}
