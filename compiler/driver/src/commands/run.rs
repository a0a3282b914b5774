use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use clap::ArgMatches;
use log::debug;

use preproc_engine::LineEngine;
use preproc_session::Options;

use super::report;
use crate::{DriverError, Preprocessor, TempOutput};

/// One edit to the command-line definitions, in the order it was given
enum Edit<'a> {
    Define(&'a str),
    Undefine(&'a str),
}

/// The main entry point for a preprocessing run
pub fn handle_command<'a>(matches: &ArgMatches<'a>) -> anyhow::Result<i32> {
    let options = Options::new(matches)?;
    let color = options.color.to_color_choice();
    let mut preprocessor = Preprocessor::with_options(LineEngine::new(), options);

    for edit in edits(matches) {
        let result = match edit {
            Edit::Define(spec) => preprocessor.add_cmdline_define(spec),
            Edit::Undefine(name) => {
                preprocessor.del_define(name);
                Ok(())
            }
        };
        if let Err(err) = result {
            return Ok(report(DriverError::Define(err)));
        }
    }

    let input = matches
        .value_of_os("input")
        .filter(|input| *input != "-")
        .map(PathBuf::from);
    let input = input.as_deref();
    debug!("preprocessing {:?}", input);

    let result = if let Some(base) = matches.value_of("temp-output") {
        match preprocessor.parse_temp(input, base) {
            Ok(TempOutput { path, result }) => {
                println!("{}", path.display());
                result
            }
            Err(err) => Err(err),
        }
    } else if let Some(path) = matches.value_of_os("output") {
        run_to_file(&mut preprocessor, input, Path::new(path))
    } else {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        preprocessor.parse(input, &mut out)
    };

    preprocessor.engine().emit_diagnostics(color);
    match result {
        Ok(status) => Ok(status.code()),
        Err(err) => Ok(report(err)),
    }
}

fn run_to_file(
    preprocessor: &mut Preprocessor<LineEngine>,
    input: Option<&Path>,
    output: &Path,
) -> Result<preproc_diagnostics::Status, DriverError> {
    let file = File::create(output).map_err(DriverError::Output)?;
    let mut writer = BufWriter::new(file);
    preprocessor.parse(input, &mut writer)
}

/// Merges `-D` and `-U` back into command-line order
fn edits<'m>(matches: &'m ArgMatches<'_>) -> Vec<Edit<'m>> {
    let mut edits = Vec::new();
    if let (Some(indices), Some(values)) = (matches.indices_of("define"), matches.values_of("define")) {
        edits.extend(indices.zip(values).map(|(i, v)| (i, Edit::Define(v))));
    }
    if let (Some(indices), Some(values)) =
        (matches.indices_of("undefine"), matches.values_of("undefine"))
    {
        edits.extend(indices.zip(values).map(|(i, v)| (i, Edit::Undefine(v))));
    }
    edits.sort_by_key(|(i, _)| *i);
    edits.into_iter().map(|(_, edit)| edit).collect()
}

#[cfg(test)]
mod test {
    use std::ffi::OsString;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::argparser;

    #[test]
    fn undefine_only_affects_earlier_defines() {
        let args = ["preproc", "-D", "A=1", "-U", "A", "-D", "B", "-U", "C", "-D", "A=2"];
        let matches = argparser::parse(args.iter().map(|a| OsString::from(*a))).unwrap();

        let edits = edits(&matches)
            .into_iter()
            .map(|edit| match edit {
                Edit::Define(spec) => format!("+{}", spec),
                Edit::Undefine(name) => format!("-{}", name),
            })
            .collect::<Vec<_>>();

        assert_eq!(edits, vec!["+A=1", "-A", "+B", "-C", "+A=2"]);
    }
}
