use lazy_static::lazy_static;
use regex::Regex;

use crate::{Span, MK_DEFAULT_HANDLER, MK_MATCH_HANDLER, MK_TOKEN};

use super::tokens::{LexErrorKind, Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = for<'a, 'src> fn(&'a mut Lexer<'src>, &Regex) -> Token;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

lazy_static! {
    // Tried in order, first match wins. Longer operators come before their prefixes.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern { regex: Regex::new(r"^\s+").unwrap(), handler: MK_MATCH_HANDLER!(TokenKind::Whitespace) },
        RegexPattern { regex: Regex::new(r"^//[^\n]*").unwrap(), handler: MK_MATCH_HANDLER!(TokenKind::Comment) },
        RegexPattern { regex: Regex::new(r#"^"(?:\\[nrt"'\\0]|[^"\\])*""#).unwrap(), handler: string_handler },
        RegexPattern { regex: Regex::new(r#"^"(?:\\.|[^"\\])*""#).unwrap(), handler: MK_MATCH_HANDLER!(TokenKind::Error(LexErrorKind::InvalidEscape)) },
        RegexPattern { regex: Regex::new(r#"^"[^\n]*"#).unwrap(), handler: MK_MATCH_HANDLER!(TokenKind::Error(LexErrorKind::UnterminatedString)) },
        RegexPattern { regex: Regex::new(r#"^b?'(?:\\[nrt"'\\0]|[^'\\])'"#).unwrap(), handler: char_handler },
        RegexPattern { regex: Regex::new(r"^b?'\\[^\n]'").unwrap(), handler: MK_MATCH_HANDLER!(TokenKind::Error(LexErrorKind::InvalidEscape)) },
        RegexPattern { regex: Regex::new(r"^b?'").unwrap(), handler: MK_MATCH_HANDLER!(TokenKind::Error(LexErrorKind::UnterminatedChar)) },
        RegexPattern { regex: Regex::new(r"^#[a-z][a-zA-Z0-9_]*").unwrap(), handler: MK_MATCH_HANDLER!(TokenKind::Directive) },
        RegexPattern {
            regex: Regex::new(r"^(?:0x[0-9a-fA-F_]+|0b[01_]+|0o[0-7_]+|[0-9][0-9_]*(?:i8|i16|i32|i64|isize|u8|u16|u32|u64|usize)?)").unwrap(),
            handler: MK_MATCH_HANDLER!(TokenKind::Number),
        },
        RegexPattern { regex: Regex::new(r"^[a-z_][a-zA-Z0-9_]*").unwrap(), handler: symbol_handler },
        RegexPattern { regex: Regex::new(r"^[A-Z][a-zA-Z0-9_]*").unwrap(), handler: MK_MATCH_HANDLER!(TokenKind::TypeIdentifier) },
        RegexPattern { regex: Regex::new(r"^\.\.").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::DotDot, "..") },
        RegexPattern { regex: Regex::new(r"^\.").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dot, ".") },
        RegexPattern { regex: Regex::new(r"^\?\.").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::QuestionDot, "?.") },
        RegexPattern { regex: Regex::new(r"^\?\?").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::QuestionQuestion, "??") },
        RegexPattern { regex: Regex::new(r"^\?").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Question, "?") },
        RegexPattern { regex: Regex::new(r"^=>").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::FatArrow, "=>") },
        RegexPattern { regex: Regex::new(r"^==").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Equals, "==") },
        RegexPattern { regex: Regex::new(r"^=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=") },
        RegexPattern { regex: Regex::new(r"^\+=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::PlusEquals, "+=") },
        RegexPattern { regex: Regex::new(r"^\+").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Plus, "+") },
        RegexPattern { regex: Regex::new(r"^!=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=") },
        RegexPattern { regex: Regex::new(r"^!").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Not, "!") },
        RegexPattern { regex: Regex::new(r"^<=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=") },
        RegexPattern { regex: Regex::new(r"^<").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Less, "<") },
        RegexPattern { regex: Regex::new(r"^>=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=") },
        RegexPattern { regex: Regex::new(r"^>").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Greater, ">") },
        RegexPattern { regex: Regex::new(r"^\(").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(") },
        RegexPattern { regex: Regex::new(r"^\)").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")") },
        RegexPattern { regex: Regex::new(r"^\{").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{") },
        RegexPattern { regex: Regex::new(r"^\}").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}") },
        RegexPattern { regex: Regex::new(r"^\[").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "[") },
        RegexPattern { regex: Regex::new(r"^\]").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]") },
        RegexPattern { regex: Regex::new(r"^,").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Comma, ",") },
        RegexPattern { regex: Regex::new(r"^:").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Colon, ":") },
        RegexPattern { regex: Regex::new(r"^;").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";") },
        RegexPattern { regex: Regex::new(r"^\$").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dollar, "$") },
        RegexPattern { regex: Regex::new(r"^-").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dash, "-") },
        RegexPattern { regex: Regex::new(r"^\*").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Star, "*") },
        RegexPattern { regex: Regex::new(r"^/").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Slash, "/") },
        RegexPattern { regex: Regex::new(r"^%").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Percent, "%") },
        RegexPattern { regex: Regex::new(r"^&").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Ampersand, "&") },
        RegexPattern { regex: Regex::new(r"^\|").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Pipe, "|") },
        RegexPattern { regex: Regex::new(r"^\^").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Caret, "^") },
    ];
}

/// Lazy tokenizer over a source buffer.
///
/// Produces every token including extras, and a final `EOF` token. Lexing never
/// fails: malformed input becomes `TokenKind::Error` tokens.
#[derive(Clone)]
pub struct Lexer<'src> {
    source: &'src str,
    pos: usize,
    done: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Lexer<'src> {
        Lexer::starting_at(source, 0)
    }

    /// Starts lexing at `offset`. The result is only meaningful when `offset`
    /// is a token boundary of the full stream (the start of the input or the
    /// end of some token).
    pub fn starting_at(source: &'src str, offset: usize) -> Lexer<'src> {
        let mut pos = offset.min(source.len());
        while !source.is_char_boundary(pos) {
            pos += 1;
        }

        Lexer {
            source,
            pos,
            done: false,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remainder(&self) -> &'src str {
        &self.source[self.pos..]
    }

    pub fn matched(&self, regex: &Regex) -> &'src str {
        regex
            .find(self.remainder())
            .map(|found| found.as_str())
            .unwrap_or("")
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }

        if self.at_eof() {
            self.done = true;
            return Some(MK_TOKEN!(
                TokenKind::EOF,
                String::from("EOF"),
                Span::new(self.pos, self.pos)
            ));
        }

        let remainder = self.remainder();
        for pattern in PATTERNS.iter() {
            if let Some(found) = pattern.regex.find(remainder) {
                if found.start() == 0 && !found.is_empty() {
                    return Some((pattern.handler)(self, &pattern.regex));
                }
            }
        }

        let start = self.pos;
        match remainder.chars().next() {
            Some(ch) => {
                self.advance_n(ch.len_utf8());
                Some(MK_TOKEN!(
                    TokenKind::Error(LexErrorKind::UnrecognisedCharacter),
                    ch.to_string(),
                    Span::new(start, self.pos)
                ))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Decodes the escape sequences of a string or char literal body.
pub fn unescape(raw: &str) -> String {
    let mut result = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.peek() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('"') => result.push('"'),
            Some('\'') => result.push('\''),
            Some('\\') => result.push('\\'),
            Some('0') => result.push('\0'),
            _ => {
                result.push(ch); // Keep the lone backslash
                continue;
            }
        }
        chars.next();
    }

    result
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) -> Token {
    let start = lexer.pos;
    let matched = lexer.matched(regex);
    lexer.advance_n(matched.len());

    let body = &matched[1..matched.len() - 1];
    MK_TOKEN!(TokenKind::String, unescape(body), Span::new(start, lexer.pos))
}

fn char_handler(lexer: &mut Lexer, regex: &Regex) -> Token {
    let start = lexer.pos;
    let matched = lexer.matched(regex);
    lexer.advance_n(matched.len());

    let (kind, body) = match matched.strip_prefix('b') {
        Some(rest) => (TokenKind::ByteChar, &rest[1..rest.len() - 1]),
        None => (TokenKind::Char, &matched[1..matched.len() - 1]),
    };
    MK_TOKEN!(kind, unescape(body), Span::new(start, lexer.pos))
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) -> Token {
    let start = lexer.pos;
    let value = lexer.matched(regex);
    lexer.advance_n(value.len());

    let kind = RESERVED_LOOKUP
        .get(value)
        .copied()
        .unwrap_or(TokenKind::Identifier);
    MK_TOKEN!(kind, String::from(value), Span::new(start, lexer.pos))
}

/// Tokenizes a whole source buffer, extras included.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

/// Tokenizes a source buffer and drops the extras, leaving what the parser consumes.
pub fn tokenize_significant(source: &str) -> Vec<Token> {
    Lexer::new(source)
        .filter(|token| !token.kind.is_extra())
        .collect()
}
