use std::fmt::Display;

use serde::Serialize;
use thiserror::Error;

use crate::{
    lexer::tokens::{LexErrorKind, Token},
    Span,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Error {
    internal_error: ErrorImpl,
    span: Span,
}

/// Broad classes of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    /// Malformed literal, escape or character. Embedded in the tree.
    LexError,
    /// Token not valid in its grammatical context. Embedded in the tree.
    SyntaxError,
    /// Broken parser invariant. Returned to the caller, never embedded.
    Internal,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, span: Span) -> Self {
        Error {
            internal_error: error_impl,
            span,
        }
    }

    /// Builds the diagnostic for a token the lexer could not make sense of.
    pub fn from_lex_token(kind: LexErrorKind, token: &Token) -> Self {
        let error_impl = match kind {
            LexErrorKind::UnterminatedString => ErrorImpl::UnterminatedString,
            LexErrorKind::UnterminatedChar => ErrorImpl::UnterminatedChar,
            LexErrorKind::InvalidEscape => ErrorImpl::InvalidEscape {
                sequence: invalid_escape(&token.value),
            },
            LexErrorKind::UnrecognisedCharacter => ErrorImpl::UnrecognisedCharacter {
                character: token.value.clone(),
            },
        };

        Error::new(error_impl, token.span)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error::new(
            ErrorImpl::InternalInvariant {
                message: message.into(),
            },
            Span::default(),
        )
    }

    pub fn get_span(&self) -> Span {
        self.span
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn shifted(&self, delta: i64) -> Self {
        Error {
            internal_error: self.internal_error.clone(),
            span: self.span.shifted(delta),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match &self.internal_error {
            ErrorImpl::UnterminatedString
            | ErrorImpl::UnterminatedChar
            | ErrorImpl::InvalidEscape { .. }
            | ErrorImpl::UnrecognisedCharacter { .. } => ErrorCategory::LexError,
            ErrorImpl::MissingPrecedenceLevel { .. }
            | ErrorImpl::InternalInvariant { .. }
            | ErrorImpl::SourceTooLarge { .. } => ErrorCategory::Internal,
            _ => ErrorCategory::SyntaxError,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnterminatedString => "UnterminatedString",
            ErrorImpl::UnterminatedChar => "UnterminatedChar",
            ErrorImpl::InvalidEscape { .. } => "InvalidEscape",
            ErrorImpl::UnrecognisedCharacter { .. } => "UnrecognisedCharacter",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::ExpectedToken { .. } => "ExpectedToken",
            ErrorImpl::UnexpectedEndOfInput => "UnexpectedEndOfInput",
            ErrorImpl::InvalidAssignmentTarget { .. } => "InvalidAssignmentTarget",
            ErrorImpl::InvalidCallTarget { .. } => "InvalidCallTarget",
            ErrorImpl::ChainedRange => "ChainedRange",
            ErrorImpl::ChainedCast => "ChainedCast",
            ErrorImpl::MixedVariantShape { .. } => "MixedVariantShape",
            ErrorImpl::MissingInitializer { .. } => "MissingInitializer",
            ErrorImpl::DialectFeature { .. } => "DialectFeature",
            ErrorImpl::AmbiguityResolutionFallthrough { .. } => "AmbiguityResolutionFallthrough",
            ErrorImpl::MissingPrecedenceLevel { .. } => "MissingPrecedenceLevel",
            ErrorImpl::InternalInvariant { .. } => "InternalInvariant",
            ErrorImpl::SourceTooLarge { .. } => "SourceTooLarge",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnterminatedString => {
                ErrorTip::Suggestion(String::from("Close the string literal with `\"`"))
            }
            ErrorImpl::UnterminatedChar => ErrorTip::Suggestion(String::from(
                "A char literal holds exactly one character or escape",
            )),
            ErrorImpl::InvalidEscape { sequence } => ErrorTip::Suggestion(format!(
                "Unknown escape `{}`, expected one of \\n \\r \\t \\\" \\' \\\\ \\0",
                sequence
            )),
            ErrorImpl::UnrecognisedCharacter { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`", token))
            }
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::ExpectedToken { expected, found } => {
                ErrorTip::Suggestion(format!("Expected `{}`, found `{}`", expected, found))
            }
            ErrorImpl::UnexpectedEndOfInput => {
                ErrorTip::Suggestion(String::from("The input ended in the middle of a construct"))
            }
            ErrorImpl::InvalidAssignmentTarget { target } => ErrorTip::Suggestion(format!(
                "Cannot assign to a {}, only to a name, member, index or dereference",
                target
            )),
            ErrorImpl::InvalidCallTarget { target } => ErrorTip::Suggestion(format!(
                "Cannot call a {}, only a name or member access",
                target
            )),
            ErrorImpl::ChainedRange => {
                ErrorTip::Suggestion(String::from("Ranges do not chain, add parentheses"))
            }
            ErrorImpl::ChainedCast => ErrorTip::Suggestion(String::from(
                "Parenthesise the inner cast: `(x as A) as B`",
            )),
            ErrorImpl::MixedVariantShape { variant } => ErrorTip::Suggestion(format!(
                "Variant `{}` has both a payload and a discriminant value",
                variant
            )),
            ErrorImpl::MissingInitializer { name } => {
                ErrorTip::Suggestion(format!("`{}` needs a value: `= ...`", name))
            }
            ErrorImpl::DialectFeature { feature } => ErrorTip::Suggestion(format!(
                "{} are only available in the extended dialect",
                feature
            )),
            ErrorImpl::AmbiguityResolutionFallthrough { token } => ErrorTip::Suggestion(format!(
                "`{}` cannot start a statement or expression here",
                token
            )),
            ErrorImpl::MissingPrecedenceLevel { level } => {
                ErrorTip::Suggestion(format!("Precedence level `{}` is missing", level))
            }
            ErrorImpl::InternalInvariant { message } => ErrorTip::Suggestion(message.clone()),
            ErrorImpl::SourceTooLarge { limit, .. } => ErrorTip::Suggestion(format!(
                "Split the source into units of at most {} bytes",
                limit
            )),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}..{}: {}",
            self.get_error_name(),
            self.span.start,
            self.span.end,
            self.internal_error
        )
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ErrorImpl {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated char literal")]
    UnterminatedChar,
    #[error("invalid escape sequence {sequence:?}")]
    InvalidEscape { sequence: String },
    #[error("unrecognised character {character:?}")]
    UnrecognisedCharacter { character: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("expected {expected:?}, found {found:?}")]
    ExpectedToken { expected: String, found: String },
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("invalid assignment target: {target}")]
    InvalidAssignmentTarget { target: String },
    #[error("invalid call target: {target}")]
    InvalidCallTarget { target: String },
    #[error("range expressions cannot be chained")]
    ChainedRange,
    #[error("cast expressions cannot be chained")]
    ChainedCast,
    #[error("variant {variant:?} mixes a payload with a discriminant")]
    MixedVariantShape { variant: String },
    #[error("{name:?} is declared without a value")]
    MissingInitializer { name: String },
    #[error("{feature} require the extended dialect")]
    DialectFeature { feature: String },
    #[error("no parse rule applies at {token:?}")]
    AmbiguityResolutionFallthrough { token: String },
    #[error("precedence table is missing level {level:?}")]
    MissingPrecedenceLevel { level: String },
    #[error("internal parser error: {message}")]
    InternalInvariant { message: String },
    #[error("source is {len} bytes, spans address at most {limit}")]
    SourceTooLarge { len: usize, limit: usize },
}

/// Picks the first escape in `literal` that is not one of the supported ones.
fn invalid_escape(literal: &str) -> String {
    let mut chars = literal.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n' | 'r' | 't' | '"' | '\'' | '\\' | '0') => {}
                Some(other) => return format!("\\{}", other),
                None => return String::from("\\"),
            }
        }
    }

    String::from("\\")
}
