extern crate log;

use std::env;
use std::process;

use anyhow::bail;
use log::LevelFilter;

use preproc_driver as driver;
use preproc_session::Options;

pub fn main() -> anyhow::Result<()> {
    // Handle unexpected panics by presenting a user-friendly bug report prompt;
    // except when we're requesting debug info explicitly, in which case we
    // don't want to hide the panic
    if env::var_os("PREPROC_LOG").is_none() {
        human_panic::setup_panic!();
    }

    let matches = match driver::argparser::parse(env::args_os()) {
        Ok(matches) => matches,
        Err(err) => err.exit(),
    };
    let options = match Options::new(&matches) {
        Ok(options) => options,
        Err(err) => err.exit(),
    };

    // Initialize logger
    let mut builder = env_logger::Builder::from_env("PREPROC_LOG");
    builder.format_indent(Some(2));
    if let Ok(precision) = env::var("PREPROC_LOG_WITH_TIME") {
        match precision.as_str() {
            "s" => builder.format_timestamp_secs(),
            "ms" => builder.format_timestamp_millis(),
            "us" => builder.format_timestamp_micros(),
            "ns" => builder.format_timestamp_nanos(),
            other => bail!(
                "invalid PREPROC_LOG_WITH_TIME precision, expected one of [s, ms, us, ns], got '{}'",
                other
            ),
        };
    } else {
        builder.format_timestamp(None);
    }
    // The trace flags raise their targets regardless of PREPROC_LOG
    for target in options.debugging.targets() {
        builder.filter_module(target, LevelFilter::Trace);
    }
    builder.init();

    match driver::run_preprocessor(&matches) {
        Ok(status_code) => process::exit(status_code),
        Err(err) => {
            if let Some(err) = err.downcast_ref::<clap::Error>() {
                err.exit()
            } else {
                eprintln!("{}", err);
                process::exit(1);
            }
        }
    }
}
