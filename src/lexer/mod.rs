//! Lexical analysis.
//!
//! Converts source text into a stream of tokens for parsing:
//!
//! - Ordered regex patterns, first match wins
//! - Reserved-word lookup on identifier-shaped words
//! - Whitespace and comments emitted as extras
//! - Malformed literals emitted as error tokens instead of aborting

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
