//! Quoting for `drawtext` values.
//!
//! A `-vf` argument is tokenized twice: the filtergraph parser splits filters
//! on `[],;`, then the filter option parser splits `key=value` pairs on `:`.
//! Both levels drop a backslash in front of any character and treat `'...'`
//! as literal text.
//!
//! Title text is single-quoted, so the filtergraph level passes it through
//! untouched and only `:` and `%` need a backslash for the option level.
//! Timestamp captions are left unquoted and escaped once per level: every
//! punctuation character is backslashed first, then every backslash is
//! doubled and the filtergraph delimiters are shielded, so the filtergraph
//! level hands the option level the single-escaped form.

const TIMESTAMP_SPECIALS: &str = ":;,.!?@#$%^&*()[]{}<>|~`\"'\\";
const FILTERGRAPH_SPECIALS: &str = "'[],;";

/// Escapes title text and wraps it in single quotes.
pub fn escape_title_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('\'');
    for c in text.chars() {
        if c == ':' || c == '%' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('\'');
    escaped
}

/// Escapes a timestamp caption for the two nested parsing levels. The
/// result is meant to be placed unquoted after `text=`.
pub fn escape_timestamp_text(text: &str) -> String {
    let mut first = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if TIMESTAMP_SPECIALS.contains(c) {
            first.push('\\');
        }
        first.push(c);
    }

    let mut second = String::with_capacity(first.len() * 2);
    for c in first.chars() {
        if c == '\\' || FILTERGRAPH_SPECIALS.contains(c) {
            second.push('\\');
        }
        second.push(c);
    }
    second
}
