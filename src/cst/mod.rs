//! Concrete syntax tree.
//!
//! - `node` - node kinds, fields and the builder the parser assembles nodes with
//! - `tree` - the parse result: root node, tokens and diagnostics
//! - `schema` - static description of every node kind for external tooling

pub mod node;
pub mod schema;
pub mod tree;

#[cfg(test)]
mod tests;
