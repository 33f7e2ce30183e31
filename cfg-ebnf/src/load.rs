//! Allows us to load grammars from an EBNF string.
//!
//! ```text
//! Production  = name "=" [ Expression ] "." .
//! Expression  = Alternative { "|" Alternative } .
//! Alternative = Term { Term } .
//! Term        = name | token [ "…" token ] | Group | Option | Repetition .
//! Group       = "(" Expression ")" .
//! Option      = "[" Expression "]" .
//! Repetition  = "{" Expression "}" .
//! ```
//!
//! An alternative may also be empty, which is how the pretty printer writes
//! empty branches.

use std::str::Chars;

use log::debug;
use tiny_earley::{forest, grammar, Recognizer, Symbol};

use crate::error::GrammarError;
use crate::grammar::{Expr, Grammar};

/// Parses grammar text. `name` identifies the source in error messages.
pub fn parse(name: &str, source: &str) -> Result<Grammar, GrammarError> {
    let (tokens, eof) = Lexer::tokenize(name, source)?;
    let mut grammar = Grammar::new();
    if tokens.is_empty() {
        return Ok(grammar);
    }
    let productions = recognize(name, tokens, eof)?;
    for (production, line, col, expr) in productions {
        if grammar.contains(&production) {
            return Err(GrammarError::DuplicateProduction {
                grammar: name.to_string(),
                name: production,
                line,
                col,
            });
        }
        grammar.insert(production, expr);
    }
    debug!("loaded {} productions from {}", grammar.len(), name);
    Ok(grammar)
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Token {
    Ident(String),
    String(String),
    Eq,
    Dot,
    Pipe,
    Ellipsis,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
}

struct Lexer<'a> {
    grammar: &'a str,
    chars: Chars<'a>,
    line_no: u32,
    col_no: u32,
}

impl<'a> Lexer<'a> {
    /// Returns the tokens and the position of the end of input.
    fn tokenize(
        grammar: &'a str,
        source: &'a str,
    ) -> Result<(Vec<Positioned>, (u32, u32)), GrammarError> {
        let mut lexer = Lexer {
            grammar,
            chars: source.chars(),
            line_no: 1,
            col_no: 1,
        };
        let mut result = vec![];
        loop {
            lexer.skip_trivia()?;
            let (line, col) = (lexer.line_no, lexer.col_no);
            match lexer.peek() {
                Some(ch) => {
                    let token = lexer.eat(ch)?;
                    result.push((token, line, col));
                }
                None => {
                    return Ok((result, (line, col)));
                }
            }
        }
    }

    fn skip_trivia(&mut self) -> Result<(), GrammarError> {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => self.advance(),
                Some('/') if self.chars.as_str().starts_with("//") => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.advance();
                    }
                }
                Some('/') if self.chars.as_str().starts_with("/*") => {
                    let (line, col) = (self.line_no, self.col_no);
                    self.advance();
                    self.advance();
                    while !self.chars.as_str().starts_with("*/") {
                        if self.peek().is_none() {
                            return Err(self.error_at(line, col, "comment not terminated"));
                        }
                        self.advance();
                    }
                    self.advance();
                    self.advance();
                }
                _ => return Ok(()),
            }
        }
    }

    fn eat(&mut self, ch: char) -> Result<Token, GrammarError> {
        let token = match ch {
            ch if ch.is_alphabetic() || ch == '_' => {
                let substring = self.chars.as_str();
                while self.peek().map_or(false, |ch| ch.is_alphanumeric() || ch == '_') {
                    self.advance();
                }
                let len = substring.len() - self.chars.as_str().len();
                return Ok(Token::Ident(substring[..len].to_string()));
            }
            '"' => return self.interpreted_string(),
            '`' => return self.raw_string(),
            '.' if self.chars.as_str().starts_with("...") => {
                self.advance();
                self.advance();
                Token::Ellipsis
            }
            '…' => Token::Ellipsis,
            '=' => Token::Eq,
            '.' => Token::Dot,
            '|' => Token::Pipe,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            other => {
                return Err(self.error(&format!("unexpected character {:?}", other)));
            }
        };
        self.advance();
        Ok(token)
    }

    fn raw_string(&mut self) -> Result<Token, GrammarError> {
        let (line, col) = (self.line_no, self.col_no);
        self.advance();
        let mut result = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error_at(line, col, "string literal not terminated")),
                Some('`') => {
                    self.advance();
                    return Ok(Token::String(result));
                }
                Some(ch) => {
                    result.push(ch);
                    self.advance();
                }
            }
        }
    }

    fn interpreted_string(&mut self) -> Result<Token, GrammarError> {
        let (line, col) = (self.line_no, self.col_no);
        self.advance();
        let mut result = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(self.error_at(line, col, "string literal not terminated"))
                }
                Some('"') => {
                    self.advance();
                    return Ok(Token::String(result));
                }
                Some('\\') => {
                    self.advance();
                    let escaped = self.escape()?;
                    result.push(escaped);
                }
                Some(ch) => {
                    result.push(ch);
                    self.advance();
                }
            }
        }
    }

    fn escape(&mut self) -> Result<char, GrammarError> {
        let ch = match self.peek() {
            Some(ch) => ch,
            None => return Err(self.error("escape sequence not terminated")),
        };
        let simple = match ch {
            'a' => Some('\x07'),
            'b' => Some('\x08'),
            'f' => Some('\x0c'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'v' => Some('\x0b'),
            '\\' | '\'' | '"' => Some(ch),
            _ => None,
        };
        if let Some(simple) = simple {
            self.advance();
            return Ok(simple);
        }
        let (digits, radix) = match ch {
            'x' => (2, 16),
            'u' => (4, 16),
            'U' => (8, 16),
            '0'..='7' => (3, 8),
            _ => return Err(self.error("unknown escape sequence")),
        };
        if radix == 16 {
            self.advance();
        }
        let mut value = 0u32;
        for _ in 0..digits {
            let digit = self.peek().and_then(|ch| ch.to_digit(radix));
            match digit {
                Some(digit) => {
                    value = value * radix + digit;
                    self.advance();
                }
                None => return Err(self.error("illegal character in escape sequence")),
            }
        }
        char::from_u32(value)
            .ok_or_else(|| self.error("escape sequence is invalid Unicode code point"))
    }

    fn advance(&mut self) {
        match self.chars.next() {
            Some('\n') => {
                self.line_no += 1;
                self.col_no = 1;
            }
            Some(_) => {
                self.col_no += 1;
            }
            None => {}
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.as_str().chars().next()
    }

    fn error(&self, reason: &str) -> GrammarError {
        self.error_at(self.line_no, self.col_no, reason)
    }

    fn error_at(&self, line: u32, col: u32, reason: &str) -> GrammarError {
        GrammarError::Parse {
            grammar: self.grammar.to_string(),
            line,
            col,
            reason: reason.to_string(),
        }
    }
}

type Positioned = (Token, u32, u32);

#[derive(Clone, Debug)]
enum Value {
    Leaf(usize),
    Productions(Vec<(String, u32, u32, Expr)>),
    Production(String, u32, u32, Expr),
    Branches(Vec<Expr>),
    Terms(Vec<Expr>),
    Term(Expr),
    None,
}

struct Evaluator {
    tokens: Vec<Positioned>,
}

impl Evaluator {
    fn name(&self, index: usize) -> Option<(String, u32, u32)> {
        match self.tokens.get(index) {
            Some((Token::Ident(name), line, col)) => Some((name.clone(), *line, *col)),
            _ => None,
        }
    }

    fn string(&self, index: usize) -> Option<String> {
        match self.tokens.get(index) {
            Some((Token::String(text), _, _)) => Some(text.clone()),
            _ => None,
        }
    }
}

fn sequence(mut terms: Vec<Expr>) -> Expr {
    match terms.len() {
        0 => Expr::Empty,
        1 => terms.remove(0),
        _ => Expr::Sequence(terms),
    }
}

fn alternative(mut branches: Vec<Expr>) -> Expr {
    if branches.len() == 1 {
        branches.remove(0)
    } else {
        Expr::Alternative(branches)
    }
}

impl forest::Eval for Evaluator {
    type Elem = Value;

    fn leaf(&self, _terminal: Symbol, values: u32) -> Self::Elem {
        Value::Leaf(values as usize)
    }

    fn product(&self, action_num: u32, args: Vec<Self::Elem>) -> Self::Elem {
        let mut args = args.into_iter();
        let first = args.next().unwrap_or(Value::None);
        let second = args.next().unwrap_or(Value::None);
        let third = args.next().unwrap_or(Value::None);
        match (action_num, first, second, third) {
            // start ::= start production;
            (2, Value::Productions(mut list), Value::Production(name, line, col, expr), _) => {
                list.push((name, line, col, expr));
                Value::Productions(list)
            }
            // start ::= production;
            (3, Value::Production(name, line, col, expr), _, _) => {
                Value::Productions(vec![(name, line, col, expr)])
            }
            // production ::= ident eq dot;
            (4, Value::Leaf(i), _, _) => match self.name(i) {
                Some((name, line, col)) => Value::Production(name, line, col, Expr::Empty),
                None => Value::None,
            },
            // production ::= ident eq expression dot;
            (5, Value::Leaf(i), _, Value::Branches(branches)) => match self.name(i) {
                Some((name, line, col)) => {
                    Value::Production(name, line, col, alternative(branches))
                }
                None => Value::None,
            },
            // expression ::= sequence;
            (6, Value::Terms(terms), _, _) => Value::Branches(vec![sequence(terms)]),
            // expression ::= pipe;
            (7, _, _, _) => Value::Branches(vec![Expr::Empty, Expr::Empty]),
            // expression ::= pipe sequence;
            (8, _, Value::Terms(terms), _) => {
                Value::Branches(vec![Expr::Empty, sequence(terms)])
            }
            // expression ::= expression pipe;
            (9, Value::Branches(mut branches), _, _) => {
                branches.push(Expr::Empty);
                Value::Branches(branches)
            }
            // expression ::= expression pipe sequence;
            (10, Value::Branches(mut branches), _, Value::Terms(terms)) => {
                branches.push(sequence(terms));
                Value::Branches(branches)
            }
            // sequence ::= term;
            (11, Value::Term(term), _, _) => Value::Terms(vec![term]),
            // sequence ::= sequence term;
            (12, Value::Terms(mut terms), Value::Term(term), _) => {
                terms.push(term);
                Value::Terms(terms)
            }
            // term ::= ident;
            (13, Value::Leaf(i), _, _) => match self.name(i) {
                Some((name, _, _)) => Value::Term(Expr::Name(name)),
                None => Value::None,
            },
            // term ::= string;
            (14, Value::Leaf(i), _, _) => match self.string(i) {
                Some(text) => Value::Term(Expr::Token(text)),
                None => Value::None,
            },
            // term ::= string ellipsis string;
            (15, Value::Leaf(low), _, Value::Leaf(high)) => {
                match (self.string(low), self.string(high)) {
                    (Some(low), Some(high)) => Value::Term(Expr::Range(low, high)),
                    _ => Value::None,
                }
            }
            // term ::= lparen rparen;
            (16, _, _, _) => Value::Term(Expr::Group(Box::new(Expr::Empty))),
            // term ::= lparen expression rparen;
            (17, _, Value::Branches(branches), _) => {
                Value::Term(Expr::Group(Box::new(alternative(branches))))
            }
            // term ::= lbracket rbracket;
            (18, _, _, _) => Value::Term(Expr::Optional(Box::new(Expr::Empty))),
            // term ::= lbracket expression rbracket;
            (19, _, Value::Branches(branches), _) => {
                Value::Term(Expr::Optional(Box::new(alternative(branches))))
            }
            // term ::= lbrace rbrace;
            (20, _, _, _) => Value::Term(Expr::Repetition(Box::new(Expr::Empty))),
            // term ::= lbrace expression rbrace;
            (21, _, Value::Branches(branches), _) => {
                Value::Term(Expr::Repetition(Box::new(alternative(branches))))
            }
            _ => Value::None,
        }
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Ident(name) => format!("name {:?}", name),
        Token::String(text) => format!("string {:?}", text),
        other => format!("{:?}", other),
    }
}

fn recognize(
    name: &str,
    tokens: Vec<Positioned>,
    eof: (u32, u32),
) -> Result<Vec<(String, u32, u32, Expr)>, GrammarError> {
    use tiny_earley::Grammar;
    let ebnf_grammar = grammar! {
        S = [start, production, expression, sequence, term, ident, string, eq, dot, pipe, ellipsis, lparen, rparen, lbracket, rbracket, lbrace, rbrace]
        R = {
            start ::= start production; // 2
            start ::= production; // 3
            production ::= ident eq dot; // 4
            production ::= ident eq expression dot; // 5
            expression ::= sequence; // 6
            expression ::= pipe; // 7
            expression ::= pipe sequence; // 8
            expression ::= expression pipe; // 9
            expression ::= expression pipe sequence; // 10
            sequence ::= term; // 11
            sequence ::= sequence term; // 12
            term ::= ident; // 13
            term ::= string; // 14
            term ::= string ellipsis string; // 15
            term ::= lparen rparen; // 16
            term ::= lparen expression rparen; // 17
            term ::= lbracket rbracket; // 18
            term ::= lbracket expression rbracket; // 19
            term ::= lbrace rbrace; // 20
            term ::= lbrace expression rbrace; // 21
        }
    };
    #[allow(unused_variables)]
    let [start, production, expression, sequence, term, ident, string, eq, dot, pipe, ellipsis, lparen, rparen, lbracket, rbracket, lbrace, rbrace] =
        ebnf_grammar.symbols();
    let terminals = [
        (ident, "name"),
        (string, "string literal"),
        (eq, "'='"),
        (dot, "'.'"),
        (pipe, "'|'"),
        (ellipsis, "'…'"),
        (lparen, "'('"),
        (rparen, "')'"),
        (lbracket, "'['"),
        (rbracket, "']'"),
        (lbrace, "'{'"),
        (rbrace, "'}'"),
    ];
    let terminal = |token: &Token| match token {
        Token::Ident(_) => ident,
        Token::String(_) => string,
        Token::Eq => eq,
        Token::Dot => dot,
        Token::Pipe => pipe,
        Token::Ellipsis => ellipsis,
        Token::LParen => lparen,
        Token::RParen => rparen,
        Token::LBracket => lbracket,
        Token::RBracket => rbracket,
        Token::LBrace => lbrace,
        Token::RBrace => rbrace,
    };
    let symbols: Vec<Symbol> = tokens.iter().map(|(token, _, _)| terminal(token)).collect();

    // Replays `prefix` followed by `next`, reporting whether `next` is
    // accepted and whether it completes the grammar.
    let accepts = |prefix: &[Symbol], next: Symbol| -> (bool, bool) {
        let mut recognizer = Recognizer::new(&ebnf_grammar);
        for (i, &symbol) in prefix.iter().chain(Some(&next)).enumerate() {
            recognizer.scan(symbol, i as u32);
            if !recognizer.end_earleme() {
                return (false, false);
            }
        }
        (true, recognizer.finished_node.is_some())
    };
    let expected = |prefix: &[Symbol], at_end: bool| -> String {
        let outcomes: Vec<(&str, (bool, bool))> = terminals
            .iter()
            .map(|&(symbol, what)| (what, accepts(prefix, symbol)))
            .collect();
        let completing: Vec<&str> = outcomes
            .iter()
            .filter(|(_, (_, complete))| at_end && *complete)
            .map(|(what, _)| *what)
            .collect();
        let list: Vec<&str> = if completing.is_empty() {
            outcomes
                .iter()
                .filter(|(_, (accepted, _))| *accepted)
                .map(|(what, _)| *what)
                .collect()
        } else {
            completing
        };
        list.join(" or ")
    };
    let error = |line: u32, col: u32, reason: String| GrammarError::Parse {
        grammar: name.to_string(),
        line,
        col,
        reason,
    };

    let mut recognizer = Recognizer::new(&ebnf_grammar);
    for (i, &symbol) in symbols.iter().enumerate() {
        recognizer.scan(symbol, i as u32);
        if !recognizer.end_earleme() {
            let (token, line, col) = &tokens[i];
            let reason = format!(
                "expected {}, found {}",
                expected(&symbols[..i], false),
                describe(token)
            );
            return Err(error(*line, *col, reason));
        }
    }
    let finished_node = match recognizer.finished_node {
        Some(node) => node,
        None => {
            let reason = format!("expected {}, found end of input", expected(&symbols, true));
            return Err(error(eof.0, eof.1, reason));
        }
    };
    let result = recognizer
        .forest
        .evaluator(Evaluator { tokens })
        .evaluate(finished_node);
    match result {
        Value::Productions(productions) => Ok(productions),
        other => Err(error(
            eof.0,
            eof.1,
            format!("evaluation failed: expected productions, got {:?}", other),
        )),
    }
}
