use lazy_static::lazy_static;
use serde::Serialize;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("fn", TokenKind::Fn);
        map.insert("struct", TokenKind::Struct);
        map.insert("enum", TokenKind::Enum);
        map.insert("const", TokenKind::Const);
        map.insert("let", TokenKind::Let);
        map.insert("pub", TokenKind::Pub);
        map.insert("import", TokenKind::Import);
        map.insert("test", TokenKind::Test);
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("for", TokenKind::For);
        map.insert("in", TokenKind::In);
        map.insert("loop", TokenKind::Loop);
        map.insert("break", TokenKind::Break);
        map.insert("continue", TokenKind::Continue);
        map.insert("return", TokenKind::Return);
        map.insert("defer", TokenKind::Defer);
        map.insert("match", TokenKind::Match);
        map.insert("as", TokenKind::As);
        map.insert("and", TokenKind::And);
        map.insert("or", TokenKind::Or);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map.insert("null", TokenKind::Null);
        map.insert("_", TokenKind::Underscore);
        for primitive in PRIMITIVE_TYPES {
            map.insert(*primitive, TokenKind::Primitive);
        }
        map
    };
}

/// Built-in type names. They lex as reserved words, so `let i32 = 1` is rejected.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "i8", "i16", "i32", "i64", "isize", "u8", "u16", "u32", "u64", "usize", "bool",
];

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize)]
pub enum LexErrorKind {
    UnterminatedString,
    UnterminatedChar,
    InvalidEscape,
    UnrecognisedCharacter,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize)]
pub enum TokenKind {
    EOF,
    Identifier,
    TypeIdentifier,
    Number,
    String,
    Char,
    ByteChar,
    Directive,

    // Extras
    Whitespace,
    Comment,

    Error(LexErrorKind),

    OpenParen,
    CloseParen,
    OpenCurly,
    CloseCurly,
    OpenBracket,
    CloseBracket,

    Comma,
    Colon,
    Semicolon,
    Dot,
    DotDot,
    Question,
    QuestionDot,
    QuestionQuestion,
    FatArrow,
    Dollar,

    Assignment, // =
    PlusEquals, // +=
    Equals,     // ==
    NotEquals,  // !=
    Not,        // !

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Plus,
    Dash,
    Star,
    Slash,
    Percent,
    Ampersand,
    Pipe,
    Caret,

    // Reserved
    Fn,
    Struct,
    Enum,
    Const,
    Let,
    Pub,
    Import,
    Test,
    If,
    Else,
    For,
    In,
    Loop,
    Break,
    Continue,
    Return,
    Defer,
    Match,
    As,
    And,
    Or,
    True,
    False,
    Null,
    Underscore,
    Primitive,
}

impl TokenKind {
    /// Token kinds that only ever appear as anonymous leaves in the tree.
    pub const ANONYMOUS: &'static [TokenKind] = &[
        TokenKind::OpenParen,
        TokenKind::CloseParen,
        TokenKind::OpenCurly,
        TokenKind::CloseCurly,
        TokenKind::OpenBracket,
        TokenKind::CloseBracket,
        TokenKind::Comma,
        TokenKind::Colon,
        TokenKind::Semicolon,
        TokenKind::Dot,
        TokenKind::DotDot,
        TokenKind::Question,
        TokenKind::QuestionDot,
        TokenKind::QuestionQuestion,
        TokenKind::FatArrow,
        TokenKind::Dollar,
        TokenKind::Assignment,
        TokenKind::PlusEquals,
        TokenKind::Equals,
        TokenKind::NotEquals,
        TokenKind::Not,
        TokenKind::Less,
        TokenKind::LessEquals,
        TokenKind::Greater,
        TokenKind::GreaterEquals,
        TokenKind::Plus,
        TokenKind::Dash,
        TokenKind::Star,
        TokenKind::Slash,
        TokenKind::Percent,
        TokenKind::Ampersand,
        TokenKind::Pipe,
        TokenKind::Caret,
        TokenKind::Fn,
        TokenKind::Struct,
        TokenKind::Enum,
        TokenKind::Const,
        TokenKind::Let,
        TokenKind::Import,
        TokenKind::Test,
        TokenKind::If,
        TokenKind::Else,
        TokenKind::For,
        TokenKind::In,
        TokenKind::Loop,
        TokenKind::Return,
        TokenKind::Defer,
        TokenKind::Match,
        TokenKind::As,
        TokenKind::And,
        TokenKind::Or,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::EOF => "end of file",
            TokenKind::Identifier => "identifier",
            TokenKind::TypeIdentifier => "type_identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Char => "char",
            TokenKind::ByteChar => "byte_char",
            TokenKind::Directive => "directive",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Comment => "line_comment",
            TokenKind::Error(_) => "ERROR",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::OpenCurly => "{",
            TokenKind::CloseCurly => "}",
            TokenKind::OpenBracket => "[",
            TokenKind::CloseBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Dot => ".",
            TokenKind::DotDot => "..",
            TokenKind::Question => "?",
            TokenKind::QuestionDot => "?.",
            TokenKind::QuestionQuestion => "??",
            TokenKind::FatArrow => "=>",
            TokenKind::Dollar => "$",
            TokenKind::Assignment => "=",
            TokenKind::PlusEquals => "+=",
            TokenKind::Equals => "==",
            TokenKind::NotEquals => "!=",
            TokenKind::Not => "!",
            TokenKind::Less => "<",
            TokenKind::LessEquals => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEquals => ">=",
            TokenKind::Plus => "+",
            TokenKind::Dash => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Ampersand => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Fn => "fn",
            TokenKind::Struct => "struct",
            TokenKind::Enum => "enum",
            TokenKind::Const => "const",
            TokenKind::Let => "let",
            TokenKind::Pub => "pub",
            TokenKind::Import => "import",
            TokenKind::Test => "test",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::In => "in",
            TokenKind::Loop => "loop",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Return => "return",
            TokenKind::Defer => "defer",
            TokenKind::Match => "match",
            TokenKind::As => "as",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::Underscore => "_",
            TokenKind::Primitive => "primitive_type",
        }
    }

    /// Whitespace and comments: insertable anywhere, never part of a production.
    pub fn is_extra(&self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

/// Bytes past a token's end the lexer may inspect before committing to it
/// (number suffixes, char literals, multi-byte characters).
const LOOKAHEAD_SLACK: u32 = 16;

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}

impl Token {
    fn is_one_of_many(&self, tokens: &[TokenKind]) -> bool {
        tokens.contains(&self.kind)
    }

    pub fn debug(&self) {
        if self.is_one_of_many(&[
            TokenKind::String,
            TokenKind::Identifier,
            TokenKind::TypeIdentifier,
            TokenKind::Number,
        ]) {
            println!("{} ({})", self.kind, self.value);
        } else {
            println!("{} ()", self.kind);
        }
    }

    /// Last byte offset whose contents can influence how this token was lexed.
    ///
    /// A string that failed to close was scanned for a closing quote all the way
    /// to the end of the input, so it depends on everything after it.
    pub fn lookahead_end(&self) -> u32 {
        match self.kind {
            TokenKind::Error(LexErrorKind::UnterminatedString | LexErrorKind::InvalidEscape)
                if self.value.starts_with('"') =>
            {
                u32::MAX
            }
            _ => self.span.end.saturating_add(LOOKAHEAD_SLACK),
        }
    }
}
