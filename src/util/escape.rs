//! Escaping helpers for request paths and query-string terms

use once_cell::sync::Lazy;
use regex::Regex;

/// A single `<...>` date-math expression
static DATE_MATH_EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^<>]*>").expect("valid date math pattern"));

/// A percent-encoded byte
static PERCENT_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%[0-9A-Fa-f]{2}").expect("valid percent escape pattern"));

static BOOLEAN_AND: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bAND\b").expect("valid AND pattern"));
static BOOLEAN_OR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bOR\b").expect("valid OR pattern"));
static BOOLEAN_NOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bNOT\s+").expect("valid NOT pattern"));

/// Leading part of the path that may hold date math: everything up to the
/// first `/` following the last `>`.
fn date_math_segment(path: &str) -> Option<&str> {
    let last = path.rfind('>')?;
    let end = path[last..].find('/').map_or(path.len(), |offset| last + offset);
    let segment = &path[..end];
    segment.contains('<').then_some(segment)
}

/// Check whether a request path is free of unescaped date math.
///
/// Returns `true` when the path holds no raw `<...>` expression, or when every
/// expression already carries percent-encoded characters.
pub fn is_date_math_escaped(path: &str) -> bool {
    match date_math_segment(path) {
        None => true,
        Some(segment) => DATE_MATH_EXPRESSION
            .find_iter(segment)
            .all(|m| PERCENT_ESCAPE.is_match(m.as_str())),
    }
}

/// Percent-encode date-math expressions in a request path.
///
/// `<log-{now/d}>/type/_search` becomes
/// `%3Clog-%7Bnow%2Fd%7D%3E/type/_search`. Expressions that already hold a
/// percent escape are kept as they are, the rest of the path is left
/// untouched and escaping an already escaped path is a no-op.
pub fn escape_date_math(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    let leading = &path[..path.len() - trimmed.len()];

    if is_date_math_escaped(trimmed) {
        return path.to_string();
    }
    let Some(segment) = date_math_segment(trimmed) else {
        return path.to_string();
    };

    let mut escaped = String::with_capacity(path.len() + 16);
    escaped.push_str(leading);
    let mut last = 0;
    for m in DATE_MATH_EXPRESSION.find_iter(segment) {
        push_encoded(&mut escaped, &segment[last..m.start()]);
        if PERCENT_ESCAPE.is_match(m.as_str()) {
            escaped.push_str(m.as_str());
        } else {
            push_encoded(&mut escaped, m.as_str());
        }
        last = m.end();
    }
    push_encoded(&mut escaped, &segment[last..]);
    escaped.push_str(&trimmed[segment.len()..]);
    escaped
}

fn push_encoded(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            '{' => out.push_str("%7B"),
            '}' => out.push_str("%7D"),
            '|' => out.push_str("%7C"),
            '+' => out.push_str("%2B"),
            ':' => out.push_str("%3A"),
            ',' => out.push_str("%2C"),
            '/' => out.push_str("%2F"),
            _ => out.push(c),
        }
    }
}

/// Escape query-string reserved characters with a backslash.
///
/// `&` and `|` are only escaped as the two-character operators `&&` and
/// `||`. `<` and `>` cannot be escaped in query-string syntax and are
/// removed.
pub fn escape_term(term: &str) -> String {
    let mut result = String::with_capacity(term.len() * 2);
    let mut chars = term.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '<' | '>' => {}
            '&' | '|' if chars.peek() == Some(&c) => {
                chars.next();
                result.push('\\');
                result.push(c);
                result.push(c);
            }
            '\\' | '+' | '-' | '!' | '(' | ')' | '{' | '}' | '[' | ']' | '^' | '"' | '~' | '*'
            | '?' | ':' | '/' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }

    result
}

/// Replace the standalone words `AND`, `OR` and `NOT` with `&&`, `||` and `!`
pub fn replace_boolean_words(term: &str) -> String {
    let result = BOOLEAN_AND.replace_all(term, "&&");
    let result = BOOLEAN_OR.replace_all(&result, "||");
    BOOLEAN_NOT.replace_all(&result, "!").into_owned()
}

/// [`replace_boolean_words`] followed by [`escape_term`]
pub fn replace_boolean_words_and_escape_term(term: &str) -> String {
    escape_term(&replace_boolean_words(term))
}
