//! Parser state and entry points.
//!
//! The parser walks the significant tokens with a Pratt parser for
//! expressions and types, and recursive descent for statements and items.
//! Handlers are looked up by token kind in tables built once per process:
//!
//! - Item and statement handlers
//! - NUD (null denotation) handlers for prefix expressions
//! - LED (left denotation) handlers for infix and postfix expressions
//! - Binding powers for operator precedence
//! - Type NUD/LED handlers
//!
//! Syntax errors never abort the parse. They propagate as `Err` to the
//! nearest recovery point, which wraps the tokens consumed so far in an
//! `ERROR` node and skips to a synchronisation token.

use std::cell::Cell;

use lazy_static::lazy_static;
use tracing::trace;

use crate::{
    config::ParseOptions,
    cst::{
        node::{leaf_for_token, Node, NodeBuilder, NodeKind},
        tree::{ItemExtent, SyntaxTree},
    },
    errors::errors::{Error, ErrorCategory, ErrorImpl},
    incremental::incremental::ReuseCursor,
    lexer::{
        lexer::tokenize_significant,
        tokens::{Token, TokenKind},
    },
    check_source_len, Span,
};

use super::{
    decl::parse_item,
    lookups::{
        create_token_lookups, BPLookup, ItemLookup, LEDLookup, Lookups, NUDLookup, StmtLookup,
        TypeBPLookup, TypeLEDLookup, TypeNUDLookup,
    },
};

lazy_static! {
    static ref LOOKUPS: Result<Lookups, Error> = create_token_lookups();
}

/// Where the construct being parsed sits grammatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Statement,
    Expression,
}

/// Context threaded through the descent to resolve the grammar's ambiguities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseContext {
    pub position: Position,
    /// Inside an `if` condition or `for` iterable, where `Name {` opens the
    /// body rather than a struct literal.
    pub in_condition: bool,
}

impl ParseContext {
    pub fn statement() -> Self {
        ParseContext {
            position: Position::Statement,
            in_condition: false,
        }
    }

    pub fn expression() -> Self {
        ParseContext {
            position: Position::Expression,
            in_condition: false,
        }
    }

    pub fn condition() -> Self {
        ParseContext {
            position: Position::Expression,
            in_condition: true,
        }
    }
}

/// Where a recovery point resynchronises after a syntax error.
pub struct Recovery {
    /// Tokens that end the skip and are left for the caller.
    pub stop: &'static [TokenKind],
    /// Tokens that end the skip and are swallowed into the error node.
    pub inclusive: &'static [TokenKind],
    /// Consume at least one token when the failing production consumed none.
    pub force_progress: bool,
}

pub const ITEM_RECOVERY: Recovery = Recovery {
    stop: &[
        TokenKind::Fn,
        TokenKind::Struct,
        TokenKind::Enum,
        TokenKind::Const,
        TokenKind::Import,
        TokenKind::Test,
        TokenKind::Pub,
        TokenKind::Directive,
    ],
    inclusive: &[],
    force_progress: true,
};

pub const STATEMENT_RECOVERY: Recovery = Recovery {
    stop: &[
        TokenKind::Let,
        TokenKind::Const,
        TokenKind::Return,
        TokenKind::Defer,
        TokenKind::If,
        TokenKind::For,
        TokenKind::Loop,
        TokenKind::Break,
        TokenKind::Continue,
        TokenKind::CloseCurly,
        TokenKind::Fn,
        TokenKind::Struct,
        TokenKind::Enum,
        TokenKind::Import,
        TokenKind::Test,
        TokenKind::Pub,
        TokenKind::Directive,
    ],
    inclusive: &[],
    force_progress: true,
};

pub const PARAMETER_RECOVERY: Recovery = Recovery {
    stop: &[
        TokenKind::OpenCurly,
        TokenKind::Fn,
        TokenKind::Struct,
        TokenKind::Enum,
        TokenKind::Const,
        TokenKind::Import,
        TokenKind::Test,
        TokenKind::Pub,
        TokenKind::Directive,
    ],
    inclusive: &[TokenKind::CloseParen],
    force_progress: false,
};

/// Struct fields and enum variants.
pub const MEMBER_RECOVERY: Recovery = Recovery {
    stop: &[
        TokenKind::CloseCurly,
        TokenKind::Fn,
        TokenKind::Struct,
        TokenKind::Enum,
        TokenKind::Const,
        TokenKind::Import,
        TokenKind::Test,
        TokenKind::Pub,
        TokenKind::Directive,
    ],
    inclusive: &[TokenKind::Comma],
    force_progress: true,
};

pub const ARM_RECOVERY: Recovery = Recovery {
    stop: &[TokenKind::CloseCurly],
    inclusive: &[TokenKind::Comma],
    force_progress: true,
};

/// The main parser structure that maintains parsing state.
pub struct Parser {
    /// Significant tokens, always ending with `EOF`
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    /// Furthest token index examined since the last reset
    furthest: Cell<usize>,
    context: ParseContext,
    options: ParseOptions,
    lookups: &'static Lookups,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, options: ParseOptions) -> Result<Self, Error> {
        let lookups = LOOKUPS.as_ref().map_err(Clone::clone)?;

        if tokens.last().map(|token| token.kind) != Some(TokenKind::EOF) {
            return Err(Error::internal("token stream does not end with EOF"));
        }

        Ok(Parser {
            tokens,
            pos: 0,
            furthest: Cell::new(0),
            context: ParseContext::statement(),
            options,
            lookups,
        })
    }

    /// Reads the token at `index`, clamped to `EOF`, and records the read.
    fn token_at(&self, index: usize) -> &Token {
        let index = index.min(self.tokens.len() - 1);
        if index > self.furthest.get() {
            self.furthest.set(index);
        }
        &self.tokens[index]
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        self.token_at(self.pos)
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Kind of the token `n` places after the current one.
    pub fn peek_kind(&self, n: usize) -> TokenKind {
        self.token_at(self.pos + n).kind
    }

    /// Advances to the next token and returns the previous one. Never moves past `EOF`.
    pub fn advance(&mut self) -> &Token {
        let index = self.pos;
        if self.tokens[index].kind != TokenKind::EOF {
            self.pos += 1;
        }
        self.token_at(index)
    }

    pub fn at(&self, kind: TokenKind) -> bool {
        self.current_token_kind() == kind
    }

    pub fn at_eof(&self) -> bool {
        self.at(TokenKind::EOF)
    }

    /// Expects a token of the specified kind, with optional custom error.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        if self.current_token_kind() != expected_kind {
            return Err(match error {
                Some(error) => error,
                None => self.expected_error(expected_kind.as_str()),
            });
        }

        Ok(self.advance().clone())
    }

    /// Expects a token of the specified kind with default error message.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Expects a token of the specified kind and returns it as a leaf.
    pub fn expect_leaf(&mut self, expected_kind: TokenKind) -> Result<Node, Error> {
        let token = self.expect(expected_kind)?;
        Ok(leaf_for_token(&token))
    }

    /// Consumes the current token as a leaf.
    pub fn leaf(&mut self) -> Node {
        leaf_for_token(self.advance())
    }

    /// Consumes the current token as a leaf of `kind`.
    pub fn leaf_as(&mut self, kind: NodeKind) -> Node {
        Node::leaf(kind, self.advance().span)
    }

    /// Error for the current token when something else was expected.
    pub fn expected_error(&self, expected: &str) -> Error {
        let token = self.current_token();
        match token.kind {
            TokenKind::Error(lex_error) => Error::from_lex_token(lex_error, token),
            TokenKind::EOF => Error::new(ErrorImpl::UnexpectedEndOfInput, token.span),
            _ => Error::new(
                ErrorImpl::ExpectedToken {
                    expected: String::from(expected),
                    found: token.value.clone(),
                },
                token.span,
            ),
        }
    }

    /// Error for a current token that no rule can start with.
    pub fn unexpected(&self) -> Error {
        let token = self.current_token();
        match token.kind {
            TokenKind::Error(lex_error) => Error::from_lex_token(lex_error, token),
            TokenKind::EOF => Error::new(ErrorImpl::UnexpectedEndOfInput, token.span),
            _ => Error::new(
                ErrorImpl::UnexpectedToken {
                    token: token.value.clone(),
                },
                token.span,
            ),
        }
    }

    /// Error for a statement lead-in that neither a statement rule nor an
    /// expression rule accepts.
    pub fn fallthrough(&self) -> Error {
        let token = self.current_token();
        match token.kind {
            TokenKind::Error(_) | TokenKind::EOF => self.unexpected(),
            _ => Error::new(
                ErrorImpl::AmbiguityResolutionFallthrough {
                    token: token.value.clone(),
                },
                token.span,
            ),
        }
    }

    pub fn context(&self) -> ParseContext {
        self.context
    }

    /// Runs `parse_fn` with `context` in effect, restoring the previous context afterwards.
    pub fn with_context<T>(
        &mut self,
        context: ParseContext,
        parse_fn: impl FnOnce(&mut Parser) -> T,
    ) -> T {
        let saved = self.context;
        self.context = context;
        let result = parse_fn(self);
        self.context = saved;
        result
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn checkpoint(&self) -> usize {
        self.pos
    }

    pub fn rewind(&mut self, checkpoint: usize) {
        self.pos = checkpoint;
    }

    /// Jumps to `index`. Used when an incremental parse reuses an item.
    pub fn seek(&mut self, index: usize) {
        self.pos = index.min(self.tokens.len() - 1);
    }

    pub fn reset_furthest(&mut self) {
        self.furthest.set(self.pos);
    }

    pub fn furthest(&self) -> usize {
        self.furthest.get()
    }

    /// The token stream, read without recording lookahead.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Whether `kind` can begin an expression in the current dialect.
    pub fn starts_expression(&self, kind: TokenKind) -> bool {
        match kind {
            TokenKind::Fn => self.options.dialect.allows_lambdas(),
            _ => self.lookups.nud.contains_key(&kind),
        }
    }

    /// Whether the current token can begin a return type.
    pub fn starts_return_type(&self) -> bool {
        match self.current_token_kind() {
            TokenKind::Fn => self.peek_kind(1) == TokenKind::OpenParen,
            kind => self.lookups.type_nud.contains_key(&kind),
        }
    }

    /// Whether the current token begins a top-level item that cannot occur
    /// inside a body.
    pub fn at_item_start(&self) -> bool {
        match self.current_token_kind() {
            TokenKind::Struct
            | TokenKind::Enum
            | TokenKind::Import
            | TokenKind::Test
            | TokenKind::Pub
            | TokenKind::Directive => true,
            TokenKind::Fn => self.peek_kind(1) == TokenKind::Identifier,
            _ => false,
        }
    }

    /// Wraps the tokens from `start` up to the current position in an `ERROR` node.
    pub fn error_node(&self, start: usize, error: Error) -> Node {
        let start_offset = self.token_at(start).span.start;
        let mut builder = NodeBuilder::new(NodeKind::Error, start_offset);
        for token in &self.tokens[start..self.pos] {
            builder.token(token);
        }
        builder.diagnostic(error);
        builder.finish()
    }

    /// Turns a failed production starting at token `start` into an `ERROR`
    /// node and skips ahead to a synchronisation point.
    ///
    /// Internal errors are not recoverable and are handed back to the caller.
    pub fn recover(
        &mut self,
        start: usize,
        error: Error,
        recovery: &Recovery,
    ) -> Result<Node, Error> {
        if error.category() == ErrorCategory::Internal {
            return Err(error);
        }

        let mut done = false;
        if self.pos == start && recovery.force_progress && !self.at_eof() {
            let kind = self.advance().kind;
            done = recovery.inclusive.contains(&kind);
        }

        while !done && !self.at_eof() {
            let kind = self.current_token_kind();
            if recovery.stop.contains(&kind) {
                break;
            }

            self.advance();
            done = recovery.inclusive.contains(&kind);
        }

        trace!(
            "recovered from {} by skipping tokens {}..{}",
            error.get_error_name(),
            start,
            self.pos
        );

        Ok(self.error_node(start, error))
    }

    /// Returns a reference to the item lookup table.
    pub fn get_item_lookup(&self) -> &'static ItemLookup {
        &self.lookups.item
    }

    /// Returns a reference to the statement lookup table.
    pub fn get_stmt_lookup(&self) -> &'static StmtLookup {
        &self.lookups.stmt
    }

    /// Returns a reference to the NUD (null denotation) lookup table.
    pub fn get_nud_lookup(&self) -> &'static NUDLookup {
        &self.lookups.nud
    }

    /// Returns a reference to the LED (left denotation) lookup table.
    pub fn get_led_lookup(&self) -> &'static LEDLookup {
        &self.lookups.led
    }

    /// Returns a reference to the binding power lookup table.
    pub fn get_bp_lookup(&self) -> &'static BPLookup {
        &self.lookups.bp
    }

    /// Returns a reference to the type NUD lookup table.
    pub fn get_type_nud_lookup(&self) -> &'static TypeNUDLookup {
        &self.lookups.type_nud
    }

    /// Returns a reference to the type LED lookup table.
    pub fn get_type_led_lookup(&self) -> &'static TypeLEDLookup {
        &self.lookups.type_led
    }

    /// Returns a reference to the type binding power lookup table.
    pub fn get_type_bp_lookup(&self) -> &'static TypeBPLookup {
        &self.lookups.type_bp
    }
}

/// Parses the whole token stream into a `source_file` node.
///
/// When `reuse` is given, each item boundary first offers the position to
/// the cursor, which may hand back an unchanged item from a previous parse.
pub fn parse_source_file(
    parser: &mut Parser,
    mut reuse: Option<&mut ReuseCursor>,
) -> Result<(Node, Vec<ItemExtent>), Error> {
    let mut builder = NodeBuilder::new(NodeKind::SourceFile, 0);
    let mut items = vec![];

    while !parser.at_eof() {
        let first_token = parser.position();

        if let Some(cursor) = reuse.as_deref_mut() {
            if let Some((node, extent)) = cursor.take(parser.tokens(), first_token) {
                parser.seek(extent.end_token);
                builder.push(node);
                items.push(extent);
                continue;
            }
        }

        parser.reset_furthest();
        let item = match parse_item(parser) {
            Ok(item) => item,
            Err(error) => parser.recover(first_token, error, &ITEM_RECOVERY)?,
        };

        let end_token = parser.position();
        items.push(ItemExtent {
            first_token,
            end_token,
            lookahead: parser.furthest().max(end_token),
        });
        builder.push(item);
    }

    let eof = parser.current_token().span;
    let mut root = builder.finish();
    root.span = Span {
        start: 0,
        end: eof.end,
    };

    Ok((root, items))
}

/// Parses `source` in the canonical dialect.
///
/// Malformed source still yields a tree: errors are embedded as `ERROR`
/// nodes and listed by [`SyntaxTree::errors`]. `Err` is reserved for
/// internal invariant violations.
pub fn parse(source: &str) -> Result<SyntaxTree, Error> {
    parse_with_options(source, ParseOptions::default())
}

pub fn parse_with_options(source: &str, options: ParseOptions) -> Result<SyntaxTree, Error> {
    check_source_len(source.len())?;
    parse_tokens(source, tokenize_significant(source), options, None)
}

pub(crate) fn parse_tokens(
    source: &str,
    tokens: Vec<Token>,
    options: ParseOptions,
    reuse: Option<&mut ReuseCursor>,
) -> Result<SyntaxTree, Error> {
    let mut parser = Parser::new(tokens, options)?;
    let (root, items) = parse_source_file(&mut parser, reuse)?;

    Ok(SyntaxTree::new(
        String::from(source),
        root,
        parser.into_tokens(),
        items,
        options,
    ))
}
