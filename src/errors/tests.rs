//! Unit tests for error handling.
//!
//! This module contains tests for error types, categories and tips.

use crate::errors::errors::{Error, ErrorCategory, ErrorImpl, ErrorTip};
use crate::lexer::{lexer::tokenize_significant, tokens::LexErrorKind};
use crate::Span;

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedCharacter {
            character: "@".to_string(),
        },
        Span::new(10, 11),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedCharacter");
    assert_eq!(error.get_span(), Span::new(10, 11));
    assert_eq!(error.category(), ErrorCategory::LexError);
}

#[test]
fn test_unexpected_token_error() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "}".to_string(),
        },
        Span::new(0, 1),
    );

    assert_eq!(error.get_error_name(), "UnexpectedToken");
    assert_eq!(error.category(), ErrorCategory::SyntaxError);
    assert_eq!(error.get_tip().to_string(), "Unexpected token: `}`");
}

#[test]
fn test_fallthrough_is_syntax_error() {
    let error = Error::new(
        ErrorImpl::AmbiguityResolutionFallthrough {
            token: "=>".to_string(),
        },
        Span::new(3, 5),
    );

    assert_eq!(error.category(), ErrorCategory::SyntaxError);
}

#[test]
fn test_internal_errors() {
    let error = Error::new(
        ErrorImpl::MissingPrecedenceLevel {
            level: "range".to_string(),
        },
        Span::default(),
    );
    assert_eq!(error.category(), ErrorCategory::Internal);

    let error = Error::internal("no handler for `+`");
    assert_eq!(error.category(), ErrorCategory::Internal);
    assert_eq!(error.get_error_name(), "InternalInvariant");
}

#[test]
fn test_error_tip_none() {
    let error = Error::new(
        ErrorImpl::UnrecognisedCharacter {
            character: "@".to_string(),
        },
        Span::new(0, 1),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
    assert_eq!(error.get_tip().to_string(), "");
}

#[test]
fn test_error_display() {
    let error = Error::new(ErrorImpl::ChainedRange, Span::new(7, 9));
    assert_eq!(
        error.to_string(),
        "ChainedRange at 7..9: range expressions cannot be chained"
    );
}

#[test]
fn test_shifted_error() {
    let error = Error::new(ErrorImpl::UnexpectedEndOfInput, Span::new(4, 4));
    assert_eq!(error.shifted(6).get_span(), Span::new(10, 10));
    assert_eq!(error.shifted(-4).get_span(), Span::new(0, 0));
}

#[test]
fn test_error_from_lex_token() {
    let tokens = tokenize_significant(r#""a\qb""#);
    let error = Error::from_lex_token(LexErrorKind::InvalidEscape, &tokens[0]);

    assert_eq!(
        error.get_impl(),
        &ErrorImpl::InvalidEscape {
            sequence: "\\q".to_string()
        }
    );
    assert_eq!(error.get_span(), Span::new(0, 6));

    let tokens = tokenize_significant("\"abc");
    let error = Error::from_lex_token(LexErrorKind::UnterminatedString, &tokens[0]);
    assert_eq!(error.get_error_name(), "UnterminatedString");
    assert_eq!(error.category(), ErrorCategory::LexError);
}
