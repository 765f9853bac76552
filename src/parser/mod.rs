//! Parser module for building the concrete syntax tree.
//!
//! This module transforms the significant tokens into a lossless CST. It uses
//! a Pratt parser for expressions and types, with operator precedence taken
//! from a static table, and handles:
//!
//! - Items (functions, structs, enums, constants, imports, tests)
//! - Statements inside blocks
//! - Expressions, types and match patterns
//! - Error recovery into `ERROR` nodes
//!
//! The grammar's ambiguities (if statement or expression, struct literal or
//! block after a condition, generic struct literal or plain name) are
//! resolved with an explicit parse context instead of a generalised parser.

pub mod decl;
pub mod expr;
pub mod lookups;
pub mod parser;
pub mod patterns;
pub mod stmt;
pub mod types;
