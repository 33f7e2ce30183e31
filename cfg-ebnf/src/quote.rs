//! Quoting of literal text, in the escape syntax both the grammar loader and
//! the yacc output understand.

/// Returns the double-quoted form of `text`.
///
/// ```
/// assert_eq!(cfg_ebnf::quote::quote("a\"b\n"), r#""a\"b\n""#);
/// ```
pub fn quote(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 2);
    result.push('"');
    for ch in text.chars() {
        escape_into(&mut result, ch, '"');
    }
    result.push('"');
    result
}

/// Returns the single-quoted character literal for `ch`.
///
/// ```
/// assert_eq!(cfg_ebnf::quote::quote_char('\''), r"'\''");
/// ```
pub fn quote_char(ch: char) -> String {
    let mut result = String::with_capacity(4);
    result.push('\'');
    escape_into(&mut result, ch, '\'');
    result.push('\'');
    result
}

fn escape_into(out: &mut String, ch: char, delimiter: char) {
    match ch {
        '\x07' => out.push_str("\\a"),
        '\x08' => out.push_str("\\b"),
        '\x0c' => out.push_str("\\f"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\x0b' => out.push_str("\\v"),
        '\\' => out.push_str("\\\\"),
        ch if ch == delimiter => {
            out.push('\\');
            out.push(ch);
        }
        ch if ch.is_ascii_control() => {
            out.push_str(&format!("\\x{:02x}", ch as u32));
        }
        // C1 controls
        ch if ch.is_control() => {
            out.push_str(&format!("\\u{:04x}", ch as u32));
        }
        ch => out.push(ch),
    }
}
