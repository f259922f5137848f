use std::sync::LazyLock;

use regex::Regex;

static PLAIN_IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("unable to compile identifier regex")
});

/// Words that collide with SQL syntax in at least one supported dialect.
const RESERVED_WORDS: &[&str] = &[
    "all", "and", "as", "asc", "between", "by", "case", "cross", "default", "delete", "desc",
    "distinct", "else", "end", "except", "exists", "from", "full", "group", "having", "in",
    "inner", "insert", "intersect", "into", "is", "join", "left", "like", "limit", "not", "null",
    "offset", "on", "or", "order", "outer", "recursive", "right", "select", "set", "table",
    "then", "to", "union", "update", "user", "using", "values", "when", "where", "with",
];

/// Returns `true` if `name` can be written without quotes.
///
/// A plain identifier starts with an ASCII letter or underscore, continues with
/// ASCII alphanumerics or underscores, and is not a reserved word.
///
/// # Examples
///
/// ```
/// use tessera_utils::string::is_plain_identifier;
///
/// assert!(is_plain_identifier("user_id"));
/// assert!(!is_plain_identifier("order"));
/// assert!(!is_plain_identifier("first name"));
/// ```
pub fn is_plain_identifier(name: &str) -> bool {
    PLAIN_IDENTIFIER_RE.is_match(name) && !is_reserved_word(name)
}

/// Case-insensitive lookup in the reserved word list.
pub fn is_reserved_word(name: &str) -> bool {
    let lowered = name.to_ascii_lowercase();
    RESERVED_WORDS.binary_search(&lowered.as_str()).is_ok()
}

/// Wraps `name` in `open`/`close`, doubling any embedded `close` character.
///
/// # Examples
///
/// ```
/// use tessera_utils::string::quote_identifier;
///
/// assert_eq!(quote_identifier("order", '"', '"'), "\"order\"");
/// assert_eq!(quote_identifier("a]b", '[', ']'), "[a]]b]");
/// ```
pub fn quote_identifier(name: &str, open: char, close: char) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push(open);
    for c in name.chars() {
        if c == close {
            quoted.push(close);
        }
        quoted.push(c);
    }
    quoted.push(close);
    quoted
}

/// Renders `value` as a single-quoted SQL string literal.
///
/// # Examples
///
/// ```
/// use tessera_utils::string::escape_string_literal;
///
/// assert_eq!(escape_string_literal("it's"), "'it''s'");
/// ```
pub fn escape_string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_words_sorted() {
        let mut sorted = RESERVED_WORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, RESERVED_WORDS);
    }

    #[test]
    fn test_is_plain_identifier() {
        assert!(is_plain_identifier("users"));
        assert!(is_plain_identifier("_tmp1"));
        assert!(!is_plain_identifier("1st"));
        assert!(!is_plain_identifier(""));
        assert!(!is_plain_identifier("has-dash"));
        assert!(!is_plain_identifier("SELECT"));
        assert!(!is_plain_identifier("User"));
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("a\"b", '"', '"'), "\"a\"\"b\"");
        assert_eq!(quote_identifier("col", '`', '`'), "`col`");
    }

    #[test]
    fn test_escape_string_literal() {
        assert_eq!(escape_string_literal(""), "''");
        assert_eq!(escape_string_literal("plain"), "'plain'");
        assert_eq!(escape_string_literal("''"), "''''''");
    }
}
