//! Unit tests for the lexer module.
//!
//! This module contains tests for tokenization including:
//! - Keywords, primitives and identifiers
//! - Numeric literals with radix prefixes and width suffixes
//! - String and char literals with escape sequences
//! - Operators and punctuation
//! - Extras (whitespace and comments)
//! - Error tokens and restarting mid-stream

use pretty_assertions::assert_eq;

use super::{
    lexer::{tokenize, tokenize_significant, unescape, Lexer},
    tokens::{LexErrorKind, TokenKind},
};
use crate::Span;

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize_significant(source)
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn test_tokenize_keywords() {
    let source = "fn struct enum const let pub import test if else for in loop break continue return defer match as and or true false null _";
    assert_eq!(
        kinds(source),
        vec![
            TokenKind::Fn,
            TokenKind::Struct,
            TokenKind::Enum,
            TokenKind::Const,
            TokenKind::Let,
            TokenKind::Pub,
            TokenKind::Import,
            TokenKind::Test,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::For,
            TokenKind::In,
            TokenKind::Loop,
            TokenKind::Break,
            TokenKind::Continue,
            TokenKind::Return,
            TokenKind::Defer,
            TokenKind::Match,
            TokenKind::As,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::True,
            TokenKind::False,
            TokenKind::Null,
            TokenKind::Underscore,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_keywords_only_on_exact_match() {
    let tokens = tokenize_significant("iff fns letter _x in_range");
    for token in &tokens[..5] {
        assert_eq!(token.kind, TokenKind::Identifier, "{}", token.value);
    }
}

#[test]
fn test_tokenize_identifiers() {
    let tokens = tokenize_significant("foo baz_123 _underscore CamelCase X1");

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].value, "foo");
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].value, "baz_123");
    assert_eq!(tokens[2].kind, TokenKind::Identifier);
    assert_eq!(tokens[2].value, "_underscore");
    assert_eq!(tokens[3].kind, TokenKind::TypeIdentifier);
    assert_eq!(tokens[3].value, "CamelCase");
    assert_eq!(tokens[4].kind, TokenKind::TypeIdentifier);
    assert_eq!(tokens[5].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_primitives() {
    let tokens = tokenize_significant("i32 u8 usize bool i128");

    assert_eq!(tokens[0].kind, TokenKind::Primitive);
    assert_eq!(tokens[1].kind, TokenKind::Primitive);
    assert_eq!(tokens[2].kind, TokenKind::Primitive);
    assert_eq!(tokens[3].kind, TokenKind::Primitive);
    assert_eq!(tokens[3].value, "bool");
    assert_eq!(tokens[4].kind, TokenKind::Identifier);
}

#[test]
fn test_tokenize_numbers() {
    let tokens = tokenize_significant("42 1_000 0xFF_ff 0b1010 0o777 255u8 7isize");
    let values: Vec<&str> = tokens.iter().map(|t| t.value.as_str()).collect();

    assert_eq!(
        values,
        vec!["42", "1_000", "0xFF_ff", "0b1010", "0o777", "255u8", "7isize", "EOF"]
    );
    assert!(tokens[..7].iter().all(|t| t.kind == TokenKind::Number));
}

#[test]
fn test_tokenize_strings() {
    let tokens = tokenize_significant(r#""hello" "a\tb\n" "say \"hi\"""#);

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "hello");
    assert_eq!(tokens[0].span, Span::new(0, 7));
    assert_eq!(tokens[1].value, "a\tb\n");
    assert_eq!(tokens[2].value, "say \"hi\"");
}

#[test]
fn test_multiline_string() {
    let tokens = tokenize_significant("\"first\nsecond\" x");

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "first\nsecond");
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
}

#[test]
fn test_tokenize_chars() {
    let tokens = tokenize_significant(r"'a' '\n' b'x' b");

    assert_eq!(tokens[0].kind, TokenKind::Char);
    assert_eq!(tokens[0].value, "a");
    assert_eq!(tokens[1].kind, TokenKind::Char);
    assert_eq!(tokens[1].value, "\n");
    assert_eq!(tokens[2].kind, TokenKind::ByteChar);
    assert_eq!(tokens[2].value, "x");
    assert_eq!(tokens[2].span, Span::new(9, 13));
    assert_eq!(tokens[3].kind, TokenKind::Identifier);
    assert_eq!(tokens[3].value, "b");
}

#[test]
fn test_tokenize_directive() {
    let tokens = tokenize_significant("#inline fn");

    assert_eq!(tokens[0].kind, TokenKind::Directive);
    assert_eq!(tokens[0].value, "#inline");
    assert_eq!(tokens[1].kind, TokenKind::Fn);
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        kinds("+ += == = => != ! <= < >= > .. . ?. ?? ? - * / % & | ^ $"),
        vec![
            TokenKind::Plus,
            TokenKind::PlusEquals,
            TokenKind::Equals,
            TokenKind::Assignment,
            TokenKind::FatArrow,
            TokenKind::NotEquals,
            TokenKind::Not,
            TokenKind::LessEquals,
            TokenKind::Less,
            TokenKind::GreaterEquals,
            TokenKind::Greater,
            TokenKind::DotDot,
            TokenKind::Dot,
            TokenKind::QuestionDot,
            TokenKind::QuestionQuestion,
            TokenKind::Question,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Ampersand,
            TokenKind::Pipe,
            TokenKind::Caret,
            TokenKind::Dollar,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_maximal_munch_without_spaces() {
    assert_eq!(
        kinds("a..b?.c??d"),
        vec![
            TokenKind::Identifier,
            TokenKind::DotDot,
            TokenKind::Identifier,
            TokenKind::QuestionDot,
            TokenKind::Identifier,
            TokenKind::QuestionQuestion,
            TokenKind::Identifier,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_punctuation() {
    assert_eq!(
        kinds("(){}[],:;"),
        vec![
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::OpenCurly,
            TokenKind::CloseCurly,
            TokenKind::OpenBracket,
            TokenKind::CloseBracket,
            TokenKind::Comma,
            TokenKind::Colon,
            TokenKind::Semicolon,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_extras_are_tokens() {
    let tokens = tokenize("let x // the answer\n= 42");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();

    assert_eq!(
        kinds,
        vec![
            TokenKind::Let,
            TokenKind::Whitespace,
            TokenKind::Identifier,
            TokenKind::Whitespace,
            TokenKind::Comment,
            TokenKind::Whitespace,
            TokenKind::Assignment,
            TokenKind::Whitespace,
            TokenKind::Number,
            TokenKind::EOF,
        ]
    );
    assert_eq!(tokens[4].value, "// the answer");
}

#[test]
fn test_spans_cover_source() {
    let source = "fn main() {\n    let x = \"hi\" // c\n}\n";
    let tokens = tokenize(source);

    let mut expected_start = 0;
    for token in &tokens {
        assert_eq!(token.span.start, expected_start);
        expected_start = token.span.end;
    }
    assert_eq!(expected_start as usize, source.len());
}

#[test]
fn test_empty_input() {
    let tokens = tokenize("");

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::EOF);
    assert_eq!(tokens[0].span, Span::new(0, 0));
}

#[test]
fn test_unterminated_string() {
    let tokens = tokenize_significant("let s = \"abc\nlet t = 1");

    assert_eq!(
        tokens[3].kind,
        TokenKind::Error(LexErrorKind::UnterminatedString)
    );
    assert_eq!(tokens[3].value, "\"abc");
    assert_eq!(tokens[4].kind, TokenKind::Let);
}

#[test]
fn test_invalid_escape() {
    let tokens = tokenize_significant(r#""bad \q escape" '\z'"#);

    assert_eq!(tokens[0].kind, TokenKind::Error(LexErrorKind::InvalidEscape));
    assert_eq!(tokens[1].kind, TokenKind::Error(LexErrorKind::InvalidEscape));
    assert_eq!(tokens[2].kind, TokenKind::EOF);
}

#[test]
fn test_unterminated_char() {
    let tokens = tokenize_significant("'ab' x");

    assert_eq!(
        tokens[0].kind,
        TokenKind::Error(LexErrorKind::UnterminatedChar)
    );
    assert_eq!(tokens[0].span, Span::new(0, 1));
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].value, "ab");
}

#[test]
fn test_unrecognised_character() {
    let tokens = tokenize_significant("a @ é b");

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(
        tokens[1].kind,
        TokenKind::Error(LexErrorKind::UnrecognisedCharacter)
    );
    assert_eq!(tokens[1].value, "@");
    assert_eq!(
        tokens[2].kind,
        TokenKind::Error(LexErrorKind::UnrecognisedCharacter)
    );
    assert_eq!(tokens[2].span.len(), 2);
    assert_eq!(tokens[3].value, "b");
}

#[test]
fn test_restart_at_token_boundary() {
    let source = "let total = count + 1";
    let full = tokenize(source);
    let restarted: Vec<_> = Lexer::starting_at(source, 12).collect();

    assert_eq!(restarted.as_slice(), &full[6..]);
}

#[test]
fn test_restart_clamps_to_char_boundary() {
    let mut lexer = Lexer::starting_at("é x", 1);
    assert_eq!(lexer.position(), 2);
    assert_eq!(lexer.next().map(|t| t.kind), Some(TokenKind::Whitespace));
}

#[test]
fn test_unescape() {
    assert_eq!(unescape(r"a\nb"), "a\nb");
    assert_eq!(unescape(r"\\\0"), "\\\0");
    assert_eq!(unescape(r"\q"), "\\q");
}

#[test]
fn test_lookahead_end() {
    let tokens = tokenize_significant("x \"open");

    assert_eq!(tokens[0].lookahead_end(), 17);
    assert_eq!(tokens[1].lookahead_end(), u32::MAX);
}
