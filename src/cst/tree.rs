use serde::Serialize;

use crate::{config::ParseOptions, errors::errors::Error, lexer::tokens::Token};

use super::node::Node;

/// Token range of one top-level item, as recorded during a parse.
///
/// `lookahead` is the index of the furthest token the parser examined while
/// building the item. An item can only be reused by an incremental parse if
/// every token in `first_token..=lookahead` is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemExtent {
    pub first_token: usize,
    pub end_token: usize,
    pub lookahead: usize,
}

/// The result of parsing one source unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxTree {
    #[serde(skip)]
    source: String,
    root: Node,
    #[serde(skip)]
    tokens: Vec<Token>,
    #[serde(skip)]
    items: Vec<ItemExtent>,
    options: ParseOptions,
}

impl SyntaxTree {
    pub fn new(
        source: String,
        root: Node,
        tokens: Vec<Token>,
        items: Vec<ItemExtent>,
        options: ParseOptions,
    ) -> Self {
        SyntaxTree {
            source,
            root,
            tokens,
            items,
            options,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// The significant tokens the parser consumed, ending with `EOF`.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn items(&self) -> &[ItemExtent] {
        &self.items
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Every diagnostic embedded in the tree, in source order.
    pub fn errors(&self) -> Vec<&Error> {
        let mut errors: Vec<&Error> = vec![];
        self.root.walk(&mut |node| {
            if let Some(diagnostic) = &node.diagnostic {
                // An error leaf repeats the diagnostic of the ERROR node around it
                if errors.last().map(|last| **last == **diagnostic) != Some(true) {
                    errors.push(diagnostic);
                }
            }
        });
        errors
    }

    pub fn has_errors(&self) -> bool {
        self.root.has_error()
    }

    /// Rebuilds source text from the leaves, one space between tokens.
    pub fn render(&self) -> String {
        self.root
            .leaves()
            .into_iter()
            .filter(|leaf| !leaf.span.is_empty())
            .map(|leaf| leaf.text(&self.source))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn to_sexp(&self) -> String {
        self.root.to_sexp()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.root)
    }
}
