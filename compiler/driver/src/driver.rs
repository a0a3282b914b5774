use clap::ArgMatches;

use crate::commands;

/// Runs the preprocessor over already-parsed arguments, returning the exit code.
///
/// Argument errors are returned as `clap::Error` so the caller can use clap's
/// exit behaviour.
pub fn run_preprocessor<'a>(matches: &ArgMatches<'a>) -> anyhow::Result<i32> {
    commands::run::handle_command(matches)
}
