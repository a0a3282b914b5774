use std::fs;
use std::io::{self, BufRead, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pretty_assertions::assert_eq;

use preproc_diagnostics::Status;
use preproc_driver::Preprocessor;
use preproc_engine::{quote, LineEngine};
use preproc_session::{Callbacks, IncludeKind};

struct Fixture {
    dir: tempfile::TempDir,
}
impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }
}

fn run(pp: &mut Preprocessor<LineEngine>, input: &Path) -> (Status, Vec<String>) {
    let mut output = Vec::new();
    let status = pp.parse(Some(input), &mut output).unwrap();
    let output = String::from_utf8(output).unwrap();
    (status, output.lines().map(str::to_string).collect())
}

#[test]
fn runs_share_cmdline_defines_but_not_local_macros() {
    let fixture = Fixture::new();
    let first = fixture.file("first.c", "#define LOCAL 1\nA LOCAL\n");
    let second = fixture.file("second.c", "A LOCAL\n");
    let mut pp = Preprocessor::new(LineEngine::new());
    pp.add_cmdline_define("A=1").unwrap();

    let (status, lines) = run(&mut pp, &first);
    assert_eq!(status, Status::SUCCESS);
    assert_eq!(
        lines,
        vec![
            format!("# 1 {} 1", quote(&first.display().to_string())),
            String::new(),
            "1 1".to_string(),
        ]
    );

    let (_, lines) = run(&mut pp, &second);
    assert_eq!(lines[1], "1 LOCAL");
    assert!(!pp.engine().macros().is_defined("LOCAL"));
    assert!(!pp.engine().macros().is_defined("A"));
    assert_eq!(pp.engine().macros().depth(), 0);
}

#[test]
fn removed_defines_are_not_applied() {
    let fixture = Fixture::new();
    let input = fixture.file("input.c", "X Y\n");
    let mut pp = Preprocessor::new(LineEngine::new());
    pp.add_cmdline_define("X=1").unwrap();
    pp.add_define("Y", Some("2")).unwrap();
    pp.del_define("X");

    let (_, lines) = run(&mut pp, &input);

    assert_eq!(lines[1], "X 2");
}

#[test]
fn special_macros_are_expanded() {
    let fixture = Fixture::new();
    let input = fixture.file("input.c", "\n__DATE__|__TIME__|__LINE__|__FILE__\n");
    let mut pp = Preprocessor::new(LineEngine::new());
    pp.add_cmdline_define("__LINE__=99").unwrap();

    let (_, lines) = run(&mut pp, &input);

    let fields = lines[2].split('|').collect::<Vec<_>>();
    assert_eq!(fields.len(), 4);
    assert_eq!(fields[0].len(), "\"Jan 01 2024\"".len());
    assert!(fields[0].starts_with('"') && fields[0].ends_with('"'));
    assert_eq!(fields[1].len(), "\"00:00:00\"".len());
    assert_eq!(&fields[1][3..4], ":");
    assert_eq!(fields[2], "2");
    assert_eq!(fields[3], quote(&input.display().to_string()));
}

#[test]
fn diagnostics_make_the_run_dirty() {
    let fixture = Fixture::new();
    let input = fixture.file("input.c", "#error boom\nok\n");
    let mut pp = Preprocessor::new(LineEngine::new());

    let (status, lines) = run(&mut pp, &input);

    assert_eq!(status, Status::FAILED);
    assert_eq!(lines.last().map(String::as_str), Some("ok"));
    assert_eq!(pp.engine().diagnostics().len(), 1);

    // Diagnostics do not carry over into the next run
    let clean = fixture.file("clean.c", "ok\n");
    let (status, _) = run(&mut pp, &clean);
    assert_eq!(status, Status::SUCCESS);
    assert!(pp.engine().diagnostics().is_empty());
}

#[test]
fn pedantic_warnings_keep_the_run_clean() {
    let fixture = Fixture::new();
    let input = fixture.file("input.c", "#define X 1\n#define X 2\n");
    let mut pp = Preprocessor::new(LineEngine::new());
    pp.set_pedantic(true);

    let (status, _) = run(&mut pp, &input);

    assert_eq!(status, Status::SUCCESS);
    assert_eq!(pp.engine().diagnostics().len(), 1);
}

struct Headers;
impl Callbacks for Headers {
    fn lookup(&self, name: &str, kind: IncludeKind, _parent: Option<&Path>) -> Option<PathBuf> {
        match (name, kind) {
            ("version.h", IncludeKind::System) => Some(PathBuf::from("<builtin>/version.h")),
            _ => None,
        }
    }

    fn open(&self, _path: &Path) -> io::Result<Box<dyn BufRead>> {
        Ok(Box::new(Cursor::new("#define VERSION 3\n")))
    }
}

#[test]
fn registered_callbacks_serve_includes() {
    let fixture = Fixture::new();
    let input = fixture.file("input.c", "#include <version.h>\nVERSION\n");
    let mut pp = Preprocessor::new(LineEngine::new());

    let (status, _) = run(&mut pp, &input);
    assert_eq!(status, Status::FAILED);

    pp.set_callbacks(Arc::new(Headers));
    let (status, lines) = run(&mut pp, &input);
    assert_eq!(status, Status::SUCCESS);
    assert_eq!(
        lines[1..],
        [
            "# 1 \"<builtin>/version.h\" 1".to_string(),
            String::new(),
            format!("# 2 {} 2", quote(&input.display().to_string())),
            "3".to_string(),
        ]
    );
}

#[test]
fn temp_output_holds_the_run() {
    let fixture = Fixture::new();
    let input = fixture.file("input.c", "#define N 4\nN\n");
    let base = fixture.dir.path().join("result");
    let mut pp = Preprocessor::new(LineEngine::new());

    let temp = pp.parse_temp(Some(&input), base.to_str().unwrap()).unwrap();

    assert_eq!(temp.status(), Status::SUCCESS);
    assert_eq!(temp.path.parent(), Some(fixture.dir.path()));
    let contents = fs::read_to_string(&temp.path).unwrap();
    assert!(contents.ends_with("\n\n4\n"));
}
