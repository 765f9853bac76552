//! Utility macros for the lexer.
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_DEFAULT_HANDLER!` - Creates a lexer handler for a fixed-text token
//! - `MK_MATCH_HANDLER!` - Creates a lexer handler for a pattern-matched token
//!
//! These macros reduce boilerplate in the lexer pattern table.

/// Creates a Token instance.
///
/// # Example
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Number, "42".to_string(), span);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: $value,
            span: $span,
        }
    };
}

/// Creates a lexer handler for a token whose text is always the same.
///
/// The handler emits a token with the given kind and advances the lexer
/// by the length of `$value`.
///
/// # Example
///
/// ```ignore
/// RegexPattern {
///     regex: Regex::new("^\\+").unwrap(),
///     handler: MK_DEFAULT_HANDLER!(TokenKind::Plus, "+"),
/// }
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut Lexer, _regex: &Regex| {
            let start = lexer.pos;
            lexer.advance_n($value.len());
            MK_TOKEN!($kind, String::from($value), Span::new(start, lexer.pos))
        }
    };
}

/// Creates a lexer handler that emits whatever `regex` matched as a token of `$kind`.
///
/// # Example
///
/// ```ignore
/// RegexPattern {
///     regex: Regex::new("^\\s+").unwrap(),
///     handler: MK_MATCH_HANDLER!(TokenKind::Whitespace),
/// }
/// ```
#[macro_export]
macro_rules! MK_MATCH_HANDLER {
    ($kind:expr) => {
        |lexer: &mut Lexer, regex: &Regex| {
            let start = lexer.pos;
            let matched = lexer.matched(regex);
            lexer.advance_n(matched.len());
            MK_TOKEN!($kind, String::from(matched), Span::new(start, lexer.pos))
        }
    };
}
