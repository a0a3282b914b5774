use std::ffi::OsString;

use clap::crate_description;
use clap::{App, AppSettings, Arg, ArgMatches};

use preproc_session::ColorArg;

/// Parses the provided arguments
pub fn parse<'a>(args: impl Iterator<Item = OsString>) -> clap::Result<ArgMatches<'a>> {
    parser().get_matches_from_safe(args)
}

pub fn parser<'a, 'b>() -> App<'a, 'b> {
    App::new("preproc")
        .version(crate::PREPROC_RELEASE)
        .about(crate_description!())
        .setting(AppSettings::UnifiedHelpMessage)
        .setting(AppSettings::DeriveDisplayOrder)
        .arg(
            Arg::with_name("input")
                .index(1)
                .help(
                    "Path to the source file to preprocess.\n\
                     If omitted, or given as `-`, the source is read from stdin.",
                )
                .next_line_help(true)
                .value_name("INPUT"),
        )
        .arg(
            Arg::with_name("define")
                .help("Define a macro, e.g. -D TEST or -D FOO=BAR")
                .short("D")
                .long("define")
                .takes_value(true)
                .value_name("NAME[=VALUE]")
                .multiple(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name("undefine")
                .help(
                    "Remove a macro defined earlier on the command line.\n\
                     -D and -U are applied in the order they are given.",
                )
                .next_line_help(true)
                .short("U")
                .long("undefine")
                .takes_value(true)
                .value_name("NAME")
                .multiple(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name("output")
                .help("Write output to the given filename (default: stdout)")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("FILENAME")
                .conflicts_with("temp-output"),
        )
        .arg(
            Arg::with_name("temp-output")
                .help(
                    "Write output to a new file named BASE.XXXXXX and print its path.\n\
                     An empty BASE uses `pptmp`.",
                )
                .next_line_help(true)
                .long("temp-output")
                .takes_value(true)
                .empty_values(true)
                .value_name("BASE"),
        )
        .arg(
            Arg::with_name("trace-lexer")
                .help("Trace every line read by the scanner")
                .long("trace-lexer"),
        )
        .arg(
            Arg::with_name("trace-grammar")
                .help("Trace every directive recognized")
                .long("trace-grammar"),
        )
        .arg(
            Arg::with_name("trace-messages")
                .help("Trace macro definitions, removals and expansions")
                .long("trace-messages"),
        )
        .arg(
            Arg::with_name("pedantic")
                .help("Warn about questionable but accepted constructs")
                .long("pedantic"),
        )
        .arg(
            Arg::with_name("warnings-as-errors")
                .help("Treat all warnings as errors")
                .long("warnings-as-errors"),
        )
        .arg(
            Arg::with_name("color")
                .help("Configure output colors")
                .long("color")
                .takes_value(true)
                .value_name("WHEN")
                .possible_values(ColorArg::VARIANTS)
                .case_insensitive(true),
        )
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(args: &[&str]) -> impl Iterator<Item = OsString> {
        std::iter::once("preproc")
            .chain(args.iter().copied())
            .map(OsString::from)
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn repeated_defines_keep_their_positions() {
        let matches = parse(args(&["-D", "A=1", "-U", "A", "--define", "B", "in.c"])).unwrap();

        assert_eq!(
            matches.values_of("define").unwrap().collect::<Vec<_>>(),
            vec!["A=1", "B"]
        );
        assert_eq!(
            matches.values_of("undefine").unwrap().collect::<Vec<_>>(),
            vec!["A"]
        );
        let defines = matches.indices_of("define").unwrap().collect::<Vec<_>>();
        let undefine = matches.indices_of("undefine").unwrap().next().unwrap();
        assert!(defines[0] < undefine && undefine < defines[1]);
        assert_eq!(matches.value_of("input"), Some("in.c"));
    }

    #[test]
    fn output_modes_conflict() {
        assert!(parse(args(&["-o", "out.i", "--temp-output", "abc"])).is_err());
    }

    #[test]
    fn warning_flags_reach_the_options() {
        let matches = parse(args(&["--pedantic", "--warnings-as-errors"])).unwrap();
        let options = preproc_session::Options::new(&matches).unwrap();

        assert!(options.pedantic);
        assert!(options.warnings_as_errors);
        assert!(!preproc_session::Options::new(&parse(args(&[])).unwrap())
            .unwrap()
            .warnings_as_errors);
    }

    #[test]
    fn color_is_validated() {
        assert!(parse(args(&["--color", "NEVER"])).is_ok());
        assert!(parse(args(&["--color", "sometimes"])).is_err());
    }
}
