use cfg_yacc::oracle::{never_reduced, score, ConflictOracle, Score, YaccOracle};
use cfg_yacc::Error;
use test_case::test_case;

#[test_case("conflicts: 3 shift/reduce, 2 reduce/reduce\n" => Score::Conflicts(5); "both")]
#[test_case("conflicts: 1 shift/reduce\n" => Score::Conflicts(1); "shift reduce only")]
#[test_case("conflicts: 12 reduce/reduce\n" => Score::Conflicts(12); "reduce reduce only")]
#[test_case("" => Score::Conflicts(0); "no conflicts")]
#[test_case("conflicts: many shift/reduce\n" => Score::Indeterminate; "no count")]
#[test_case("3 shift/reduce, x reduce/reduce" => Score::Indeterminate; "second count missing")]
#[test_case("99999999999999999999999 shift/reduce" => Score::Indeterminate; "overflow")]
fn test_score(diagnostics: &str) -> Score {
    score(diagnostics)
}

#[test]
fn test_score_value() {
    assert_eq!(Score::Conflicts(7).value(), 7);
    assert_eq!(Score::Indeterminate.value(), -1);
    assert_eq!(Score::Indeterminate.to_string(), "-1");
    assert_eq!(Score::Conflicts(2).conflicts(), Some(2));
    assert_eq!(Score::Indeterminate.conflicts(), None);
}

#[test]
fn test_never_reduced() {
    let diagnostics = "\
        conflicts: 1 shift/reduce\n\
        \trule Foo:  bar never reduced\n\
        rule Baz_1: never reduced\n\
        2 rules never reduced\n";
    assert_eq!(
        never_reduced(diagnostics).unwrap(),
        vec!["Foo".to_string(), "Baz_1".to_string()]
    );
    assert_eq!(never_reduced("conflicts: 1 shift/reduce\n").unwrap(), Vec::<String>::new());
}

#[test_case("rule Foo bar never reduced"; "missing colon")]
#[test_case("rule Foo-bar: x never reduced"; "not an identifier")]
#[test_case("rule : x never reduced"; "empty name")]
fn test_never_reduced_malformed(line: &str) {
    assert!(matches!(
        never_reduced(line),
        Err(Error::MalformedDiagnostic(text)) if text == line
    ));
}

#[test]
fn test_missing_command() {
    let artifact = tempfile::NamedTempFile::new().unwrap();
    let mut oracle = YaccOracle::new("cfg-yacc-test-no-such-command");
    assert!(matches!(
        oracle.diagnostics(artifact.path()),
        Err(Error::OracleInvocation { .. })
    ));
    let mut oracle = YaccOracle::new("  ");
    assert!(matches!(
        oracle.diagnostics(artifact.path()),
        Err(Error::OracleInvocation { .. })
    ));
}

#[cfg(unix)]
#[test]
fn test_command_output() {
    let artifact = tempfile::NamedTempFile::new().unwrap();
    let absolute = artifact.path().canonicalize().unwrap();
    let mut oracle = YaccOracle::new("echo conflicts:");
    let output = oracle.diagnostics(artifact.path()).unwrap();
    assert_eq!(output, format!("conflicts: {}\n", absolute.display()));

    let mut failing = YaccOracle::new("false");
    assert!(matches!(
        failing.diagnostics(artifact.path()),
        Err(Error::OracleInvocation { command, .. }) if command == "false"
    ));
}
