//! Error types for lexing and parsing.
//!
//! - Error structures carrying the source span they refer to
//! - Specific variants for lex, syntax and internal failures
//! - Names and suggestions used when rendering diagnostics

pub mod errors;

#[cfg(test)]
mod tests;
