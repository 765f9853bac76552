use crate::{
    cst::node::{leaf_for_token, Field, Node, NodeBuilder, NodeKind},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{
    expr::parse_if,
    parser::{ParseContext, Parser, STATEMENT_RECOVERY},
    types::parse_type,
};

pub fn parse_stmt(parser: &mut Parser) -> Result<Node, Error> {
    let token_kind = parser.current_token_kind();
    if let Some(stmt_fn) = parser.get_stmt_lookup().get(&token_kind).copied() {
        return stmt_fn(parser);
    }

    if !parser.starts_expression(token_kind) {
        return Err(parser.fallthrough());
    }

    let expr = parse_value(parser)?;

    let mut builder = NodeBuilder::new(NodeKind::ExpressionStatement, expr.span.start);
    builder.push(expr);
    Ok(builder.finish())
}

/// An expression in statement lead-in position. It extends as far as it can.
fn parse_value(parser: &mut Parser) -> Result<Node, Error> {
    parser.with_context(ParseContext::expression(), |parser| {
        parse_expr(parser, BindingPower::Default)
    })
}

/// `{ statements }`. Each failed statement becomes an `ERROR` node.
pub fn parse_block(parser: &mut Parser) -> Result<Node, Error> {
    parser.with_context(ParseContext::statement(), |parser| {
        let open = parser.expect(TokenKind::OpenCurly)?;
        let mut builder = NodeBuilder::new(NodeKind::Block, open.span.start);
        builder.token(&open);

        while !parser.at(TokenKind::CloseCurly) && !parser.at_eof() && !parser.at_item_start() {
            let start = parser.position();
            let stmt = match parse_stmt(parser) {
                Ok(stmt) => stmt,
                Err(error) => parser.recover(start, error, &STATEMENT_RECOVERY)?,
            };
            builder.push(stmt);
        }

        builder.token(&parser.expect(TokenKind::CloseCurly)?);
        Ok(builder.finish())
    })
}

/// `let name [: Type] = value` and `const name [: Type] = value`.
pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Node, Error> {
    let start_token = parser.advance().clone();
    let is_constant = start_token.kind == TokenKind::Const;
    let kind = if is_constant {
        NodeKind::ConstStatement
    } else {
        NodeKind::LetStatement
    };

    let mut builder = NodeBuilder::new(kind, start_token.span.start);
    builder.token(&start_token);

    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from("expected identifier during variable declaration"),
        },
        parser.current_token().span,
    );
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?;
    builder.field(Field::Name, leaf_for_token(&name));

    if parser.at(TokenKind::Colon) {
        builder.token(parser.advance());
        builder.field(Field::Type, parse_type(parser, BindingPower::Default)?);
    }

    if parser.at(TokenKind::Assignment) {
        builder.token(parser.advance());
        builder.field(Field::Value, parse_value(parser)?);
    } else if is_constant || !parser.options().dialect.allows_uninitialized_let() {
        return Err(Error::new(
            ErrorImpl::MissingInitializer { name: name.value },
            parser.current_token().span,
        ));
    }

    Ok(builder.finish())
}

/// `return [value]`
pub fn parse_return_stmt(parser: &mut Parser) -> Result<Node, Error> {
    let return_token = parser.expect(TokenKind::Return)?;
    let mut builder = NodeBuilder::new(NodeKind::ReturnStatement, return_token.span.start);
    builder.token(&return_token);

    if parser.starts_expression(parser.current_token_kind()) {
        builder.push(parse_value(parser)?);
    }

    Ok(builder.finish())
}

/// `defer value`
pub fn parse_defer_stmt(parser: &mut Parser) -> Result<Node, Error> {
    let defer_token = parser.expect(TokenKind::Defer)?;
    let mut builder = NodeBuilder::new(NodeKind::DeferStatement, defer_token.span.start);
    builder.token(&defer_token);
    builder.push(parse_value(parser)?);
    Ok(builder.finish())
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Node, Error> {
    parser.with_context(ParseContext::statement(), parse_if)
}

/// `for name in iterable { .. }` or `for (name in iterable) { .. }`.
pub fn parse_for_stmt(parser: &mut Parser) -> Result<Node, Error> {
    let for_token = parser.expect(TokenKind::For)?;
    let mut builder = NodeBuilder::new(NodeKind::ForStatement, for_token.span.start);
    builder.token(&for_token);

    let parenthesised = parser.at(TokenKind::OpenParen);
    if parenthesised {
        builder.token(parser.advance());
    }

    builder.field(Field::Pattern, parser.expect_leaf(TokenKind::Identifier)?);
    builder.token(&parser.expect(TokenKind::In)?);

    // Without parentheses the iterable runs up to the body's `{`
    let context = if parenthesised {
        ParseContext::expression()
    } else {
        ParseContext::condition()
    };
    let iterable = parser.with_context(context, |parser| {
        parse_expr(parser, BindingPower::Default)
    })?;
    builder.field(Field::Iterable, iterable);

    if parenthesised {
        builder.token(&parser.expect(TokenKind::CloseParen)?);
    }

    builder.field(Field::Body, parse_block(parser)?);
    Ok(builder.finish())
}

/// `loop { .. }`
pub fn parse_loop_stmt(parser: &mut Parser) -> Result<Node, Error> {
    let loop_token = parser.expect(TokenKind::Loop)?;
    let mut builder = NodeBuilder::new(NodeKind::LoopStatement, loop_token.span.start);
    builder.token(&loop_token);
    builder.field(Field::Body, parse_block(parser)?);
    Ok(builder.finish())
}

/// `break` and `continue`
pub fn parse_jump_stmt(parser: &mut Parser) -> Result<Node, Error> {
    Ok(parser.leaf())
}
