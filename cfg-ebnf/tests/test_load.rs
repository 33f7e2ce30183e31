mod support;

use cfg_ebnf::{Expr, GrammarError};

fn name(name: &str) -> Expr {
    Expr::Name(name.to_string())
}

fn token(text: &str) -> Expr {
    Expr::Token(text.to_string())
}

#[test]
fn test_load() {
    let grammar = support::load(
        r#"
        S = "a" { "b" | C } [ "c" ] .
        C = ( "x" "y" | ) .
        "#,
    );
    assert_eq!(grammar.len(), 2);
    assert_eq!(
        grammar.get("S").unwrap().expr,
        Expr::Sequence(vec![
            token("a"),
            Expr::Repetition(Box::new(Expr::Alternative(vec![token("b"), name("C")]))),
            Expr::Optional(Box::new(token("c"))),
        ])
    );
    assert_eq!(
        grammar.get("C").unwrap().expr,
        Expr::Group(Box::new(Expr::Alternative(vec![
            Expr::Sequence(vec![token("x"), token("y")]),
            Expr::Empty,
        ])))
    );
}

#[test]
fn test_load_empty_production() {
    let grammar = support::load("Empty = . S = Empty .");
    assert_eq!(grammar.get("Empty").unwrap().expr, Expr::Empty);
}

#[test]
fn test_load_literals() {
    let grammar = support::load(
        r#"
        // line comment
        digit = "0" … "9" .
        /* block
           comment */
        letter = "a" ... "z" .
        S = "\t\"\x41é\101" `raw\n` .
        "#,
    );
    assert_eq!(
        grammar.get("digit").unwrap().expr,
        Expr::Range("0".to_string(), "9".to_string())
    );
    assert_eq!(
        grammar.get("letter").unwrap().expr,
        Expr::Range("a".to_string(), "z".to_string())
    );
    assert_eq!(
        grammar.get("S").unwrap().expr,
        Expr::Sequence(vec![token("\t\"AéA"), token("raw\\n")])
    );
}

#[test]
fn test_parse_error_position() {
    let error = cfg_ebnf::parse("calc.ebnf", "S = \"x\"").unwrap_err();
    assert_eq!(
        error,
        GrammarError::Parse {
            grammar: "calc.ebnf".to_string(),
            line: 1,
            col: 8,
            reason: "expected '.', found end of input".to_string(),
        }
    );
    assert_eq!(
        error.to_string(),
        "calc.ebnf:1:8: expected '.', found end of input"
    );
}

#[test]
fn test_unterminated_string() {
    let error = cfg_ebnf::parse("g", "S =\n  \"abc .").unwrap_err();
    match error {
        GrammarError::Parse { line, col, .. } => assert_eq!((line, col), (2, 3)),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_duplicate_production() {
    let error = cfg_ebnf::parse("g", "S = A .\nA = \"a\" .\nA = \"b\" .").unwrap_err();
    assert_eq!(
        error,
        GrammarError::DuplicateProduction {
            grammar: "g".to_string(),
            name: "A".to_string(),
            line: 3,
            col: 1,
        }
    );
}

#[test]
fn test_pretty_print_reloads() {
    let source = r#"
        Expr = Term { ( "+" | "-" ) Term } .
        Term = Factor { "*" Factor } .
        Factor = number | "(" Expr ")" | [ "-" ] Factor .
        Empty = .
        Quoted = "\"\\\n" | "==" | .
        number = "0" … "9" .
    "#;
    let grammar = support::load(source);
    let text = grammar.to_string();
    assert!(text.contains("Empty = .\n"));
    assert!(text.contains(r#"Quoted = "\"\\\n" | "==" | ."#));
    assert_eq!(support::load(&text), grammar);
}

#[test]
fn test_load_empty_branches() {
    let grammar = support::load(r#"S = | "a" | | "b" . T = | . U = () [] {} ."#);
    assert_eq!(
        grammar.get("S").unwrap().expr,
        Expr::Alternative(vec![Expr::Empty, token("a"), Expr::Empty, token("b")])
    );
    assert_eq!(
        grammar.get("T").unwrap().expr,
        Expr::Alternative(vec![Expr::Empty, Expr::Empty])
    );
    assert_eq!(
        grammar.get("U").unwrap().expr,
        Expr::Sequence(vec![
            Expr::Group(Box::new(Expr::Empty)),
            Expr::Optional(Box::new(Expr::Empty)),
            Expr::Repetition(Box::new(Expr::Empty)),
        ])
    );
}

#[test]
fn test_unexpected_token() {
    let error = cfg_ebnf::parse("g", "S = \"a\" ) .").unwrap_err();
    match error {
        GrammarError::Parse { line, col, reason, .. } => {
            assert_eq!((line, col), (1, 9));
            assert!(reason.starts_with("expected "), "{}", reason);
            assert!(reason.contains("'.'"), "{}", reason);
            assert!(reason.ends_with("found RParen"), "{}", reason);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_pretty_print_is_stable() {
    let mut grammar = cfg_ebnf::Grammar::new();
    grammar.insert(
        "S",
        Expr::Alternative(vec![
            Expr::Sequence(vec![Expr::Empty, token("x")]),
            Expr::Group(Box::new(Expr::Alternative(vec![token("q"), Expr::Empty]))),
        ]),
    );
    let first = grammar.to_string();
    assert_eq!(first, "S = () \"x\" | ( \"q\" | ) .\n");
    let second = support::load(&first).to_string();
    assert_eq!(second, first);
    assert_eq!(support::load(&second).to_string(), second);
}

#[test]
fn test_quote_control_characters() {
    use cfg_ebnf::quote::{quote, quote_char};
    assert_eq!(quote("\x01a\u{85}"), r#""\x01a\u0085""#);
    assert_eq!(quote_char('\x1f'), r"'\x1f'");
    let grammar = support::load(&format!("S = {} .", quote("\x01\u{85}")));
    assert_eq!(grammar.get("S").unwrap().expr, token("\x01\u{85}"));
}
