mod support;

use std::path::Path;

use cfg_yacc::{Error, Improvement, Mode, Search, SearchReport};

const GRAMMAR: &str = r#"
    S = X "c" | Y .
    X = "a" | "b" .
    Y = "d" .
"#;

#[test]
fn test_single_shot() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("parser.y");
    let mut job = support::job(GRAMMAR, &["--start", "S"]);
    let mut calls = 0;
    let report = {
        let mut oracle = |_: &Path| -> Result<String, Error> {
            calls += 1;
            Ok(String::new())
        };
        Search::new(&mut job, &mut oracle, Some(&artifact), Mode::SingleShot)
            .unwrap()
            .run()
            .unwrap()
    };
    assert_eq!(calls, 0);
    assert_eq!(report, SearchReport::default());
    assert!(support::read(&artifact).contains("X:\n"));
}

#[test]
fn test_search_requires_artifact() {
    let mut job = support::job(GRAMMAR, &["--start", "S"]);
    let mut oracle = support::stub(|_| String::new());
    assert!(matches!(
        Search::new(&mut job, &mut oracle, None, Mode::Search { verbose: false }),
        Err(Error::Usage(_))
    ));
}

#[test]
fn test_search_commits_best_inlining() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("parser.y");
    let mut job = support::job(GRAMMAR, &["--start", "S"]);
    let verbose = Mode::Search { verbose: true };
    let mut oracle = support::stub(|text| {
        if text.contains("\nX:\n") {
            support::conflicts(5)
        } else {
            support::conflicts(2)
        }
    });
    let report = Search::new(&mut job, &mut oracle, Some(&artifact), verbose)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(
        report.improvements,
        vec![Improvement {
            name: "X".to_string(),
            from: 5,
            to: 2,
        }]
    );
    assert!(report.repaired.is_empty());
    assert!(!job.grammar().contains("X"));
    let text = support::read(&artifact);
    assert!(!text.contains("\nX:\n"));
    assert!(text.contains("\t'a' 'c'\n"));
    assert!(text.contains("|\t'b' 'c'\n"));
}

#[test]
fn test_committed_scores_decrease() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("parser.y");
    let mut job = support::job(
        r#"S = A B . A = C "a" . B = "b" . C = "c" | "d" ."#,
        &["--start", "S"],
    );
    let mut oracle = support::stub(|text| support::conflicts(support::rule_count(text)));
    let report = support::search(&mut job, &mut oracle, &artifact);

    assert_eq!(report.improvements.len(), 4);
    for pair in report.improvements.windows(2) {
        assert_eq!(pair[0].to, pair[1].from);
    }
    for improvement in &report.improvements {
        assert!(improvement.to < improvement.from);
    }
    assert_eq!(report.improvements.last().map(|last| last.to), Some(1));
    assert_eq!(job.grammar().names().collect::<Vec<_>>(), vec!["Start"]);
}

#[test]
fn test_repetitions_are_kept() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("parser.y");
    let mut job = support::job(r#"S = { E } . E = "e" | "f" ."#, &["--start", "S"]);
    let mut oracle = support::stub(|text| support::conflicts(support::rule_count(text)));
    let report = support::search(&mut job, &mut oracle, &artifact);

    assert_eq!(report.improvements.len(), 1);
    assert_eq!(report.improvements[0].name, "S");
    assert!(job.grammar().contains("S1"));
    assert!(job.grammar().contains("E"));
}

#[test]
fn test_repair_never_reduced_rule() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("parser.y");
    let mut job = support::job(GRAMMAR, &["--start", "S"]);
    let mut oracle = support::stub(|text| {
        let mut diagnostics = String::new();
        if text.contains("\nY:\n") {
            diagnostics.push_str("rule Y:  'd' never reduced\n");
        }
        diagnostics.push_str("rule Start: S never reduced\n");
        diagnostics
    });
    let report = support::search(&mut job, &mut oracle, &artifact);

    assert!(report.improvements.is_empty());
    assert_eq!(report.repaired, vec!["Y".to_string()]);
    assert_eq!(report.unrepairable, vec!["Start".to_string()]);
    assert!(!job.grammar().contains("Y"));
    assert!(job.grammar().contains("Start"));
}

#[test]
fn test_indeterminate_score_skips_exploration() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("parser.y");
    let mut job = support::job(GRAMMAR, &["--start", "S"]);
    let mut calls = 0;
    let report = {
        let mut oracle = support::stub(|_| {
            calls += 1;
            "conflicts: some shift/reduce\n".to_string()
        });
        support::search(&mut job, &mut oracle, &artifact)
    };
    assert_eq!(calls, 2);
    assert_eq!(report, SearchReport::default());
    assert!(job.grammar().contains("X"));
}

#[test]
fn test_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("grammar.ebnf");
    let output = dir.path().join("parser.y");
    let pretty = dir.path().join("pretty.ebnf");
    std::fs::write(&input, GRAMMAR).unwrap();
    let options = support::options(&[
        "-m",
        "--start",
        "S",
        "--ie",
        "1",
        "-o",
        output.to_str().unwrap(),
        "--oe",
        pretty.to_str().unwrap(),
        input.to_str().unwrap(),
    ]);
    let mut oracle = support::stub(|_| support::conflicts(0));
    let report = cfg_yacc::run(&options, &mut oracle).unwrap();
    assert_eq!(report, SearchReport::default());
    assert_eq!(support::read(&pretty), "S = ( \"a\" | \"b\" ) \"c\" | \"d\" .\n");
    assert!(support::read(&output).contains("%start Start\n"));
}

#[test]
fn test_self_referential_candidate_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("parser.y");
    let mut job = support::job(
        r#"S = E ";" . E = E "+" T | T . T = "t" ."#,
        &["--start", "S"],
    );
    let mut oracle = support::stub(|text| support::conflicts(support::rule_count(text)));
    let report = support::search(&mut job, &mut oracle, &artifact);

    let inlined: Vec<&str> = report.improvements.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(inlined, vec!["S", "T"]);
    assert_eq!(report.improvements.last().map(|last| last.to), Some(2));
    assert_eq!(job.grammar().names().collect::<Vec<_>>(), vec!["E", "Start"]);
    assert!(support::read(&artifact).contains("\nE:\n"));
}

#[test]
fn test_repair_continues_past_self_referential_rule() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("parser.y");
    let mut job = support::job(
        r#"S = E ";" | Y . E = E "+" T | T . T = "t" . Y = "d" ."#,
        &["--start", "S"],
    );
    let mut oracle = support::stub(|text| {
        let mut diagnostics = support::conflicts(0);
        if text.contains("\nE:\n") {
            diagnostics.push_str("rule E:  E '+' T never reduced\n");
        }
        if text.contains("\nY:\n") {
            diagnostics.push_str("rule Y:  'd' never reduced\n");
        }
        diagnostics
    });
    let report = support::search(&mut job, &mut oracle, &artifact);

    assert!(report.improvements.is_empty());
    assert_eq!(report.repaired, vec!["Y".to_string()]);
    assert_eq!(report.unrepairable, vec!["E".to_string()]);
    assert!(job.grammar().contains("E"));
    assert!(!job.grammar().contains("Y"));
}
