//! Type parsing implementation.
//!
//! Types use the same NUD/LED scheme as expressions, with their own lookup
//! tables. Postfix `?` and `[]` are the only type LEDs.

use crate::{
    cst::node::{Field, Node, NodeBuilder, NodeKind},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{
    expr::parse_expr,
    lookups::{BindingPower, Lookups},
    parser::{ParseContext, Parser},
};

/// Registers NUD and LED handlers for parsing type expressions.
pub fn create_token_type_lookups(lookups: &mut Lookups) {
    lookups.type_nud(TokenKind::Primitive, parse_primitive_type);
    lookups.type_nud(TokenKind::Dollar, parse_generic_type_parameter);
    lookups.type_nud(TokenKind::Ampersand, parse_reference_type);
    lookups.type_nud(TokenKind::OpenBracket, parse_array_type);
    lookups.type_nud(TokenKind::Fn, parse_function_type);
    lookups.type_nud(TokenKind::OpenParen, parse_tuple_type);
    lookups.type_nud(TokenKind::TypeIdentifier, parse_named_type);

    lookups.type_led(TokenKind::Question, BindingPower::Member, parse_optional_type);
    lookups.type_led(TokenKind::OpenBracket, BindingPower::Member, parse_slice_type);
}

pub fn parse_type(parser: &mut Parser, bp: BindingPower) -> Result<Node, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud_fn) = parser.get_type_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.expected_error("type"));
    };

    let mut left = nud_fn(parser)?;

    loop {
        let token_kind = parser.current_token_kind();
        let Some(&token_bp) = parser.get_type_bp_lookup().get(&token_kind) else {
            break;
        };

        // `T[` only continues a type as the slice suffix `T[]`
        if token_bp <= bp
            || (token_kind == TokenKind::OpenBracket
                && parser.peek_kind(1) != TokenKind::CloseBracket)
        {
            break;
        }

        let Some(led_fn) = parser.get_type_led_lookup().get(&token_kind).copied() else {
            return Err(Error::internal(format!(
                "type binding power registered for `{}` without a handler",
                token_kind
            )));
        };

        left = led_fn(parser, left, token_bp)?;
    }

    Ok(left)
}

pub fn parse_primitive_type(parser: &mut Parser) -> Result<Node, Error> {
    parser.expect_leaf(TokenKind::Primitive)
}

/// `$name`
pub fn parse_generic_type_parameter(parser: &mut Parser) -> Result<Node, Error> {
    let dollar = parser.expect(TokenKind::Dollar)?;
    let mut builder = NodeBuilder::new(NodeKind::GenericTypeParameter, dollar.span.start);
    builder.token(&dollar);
    builder.push(parser.expect_leaf(TokenKind::Identifier)?);
    Ok(builder.finish())
}

/// `&T`. The referenced type stops before postfix suffixes, so `&T?` is `(&T)?`.
pub fn parse_reference_type(parser: &mut Parser) -> Result<Node, Error> {
    let ampersand = parser.expect(TokenKind::Ampersand)?;
    let mut builder = NodeBuilder::new(NodeKind::ReferenceType, ampersand.span.start);
    builder.token(&ampersand);
    builder.field(Field::Type, parse_type(parser, BindingPower::Member)?);
    Ok(builder.finish())
}

/// `[T; length]`
pub fn parse_array_type(parser: &mut Parser) -> Result<Node, Error> {
    let open = parser.expect(TokenKind::OpenBracket)?;
    let mut builder = NodeBuilder::new(NodeKind::ArrayType, open.span.start);
    builder.token(&open);
    builder.field(Field::Type, parse_type(parser, BindingPower::Default)?);
    builder.token(&parser.expect(TokenKind::Semicolon)?);

    let length = parser.with_context(ParseContext::expression(), |parser| {
        parse_expr(parser, BindingPower::Default)
    })?;
    builder.field(Field::Length, length);
    builder.token(&parser.expect(TokenKind::CloseBracket)?);
    Ok(builder.finish())
}

/// `fn(A, name: B) R`
pub fn parse_function_type(parser: &mut Parser) -> Result<Node, Error> {
    let fn_token = parser.expect(TokenKind::Fn)?;
    let mut builder = NodeBuilder::new(NodeKind::FunctionType, fn_token.span.start);
    builder.token(&fn_token);
    builder.token(&parser.expect(TokenKind::OpenParen)?);

    while !parser.at(TokenKind::CloseParen) && !parser.at_eof() {
        if parser.at(TokenKind::Identifier) && parser.peek_kind(1) == TokenKind::Colon {
            let name = parser.leaf();
            let mut parameter = NodeBuilder::new(NodeKind::Parameter, name.span.start);
            parameter.field(Field::Name, name);
            parameter.token(parser.advance());
            parameter.field(Field::Type, parse_type(parser, BindingPower::Default)?);
            builder.push(parameter.finish());
        } else {
            builder.push(parse_type(parser, BindingPower::Default)?);
        }

        if !parser.at(TokenKind::Comma) {
            break;
        }
        builder.token(parser.advance());
    }

    builder.token(&parser.expect(TokenKind::CloseParen)?);
    builder.field(Field::ReturnType, parse_type(parser, BindingPower::Default)?);
    Ok(builder.finish())
}

/// `(A, B)`
pub fn parse_tuple_type(parser: &mut Parser) -> Result<Node, Error> {
    let open = parser.expect(TokenKind::OpenParen)?;
    let mut builder = NodeBuilder::new(NodeKind::TupleType, open.span.start);
    builder.token(&open);
    parse_type_list(parser, &mut builder)?;
    Ok(builder.finish())
}

/// `Name` or `Name(T, U)`
pub fn parse_named_type(parser: &mut Parser) -> Result<Node, Error> {
    let name = parser.expect_leaf(TokenKind::TypeIdentifier)?;
    let mut builder = NodeBuilder::new(NodeKind::NamedType, name.span.start);
    builder.field(Field::Name, name);

    if parser.at(TokenKind::OpenParen) {
        builder.push(parse_generic_arguments(parser)?);
    }

    Ok(builder.finish())
}

/// `(T, U)` after a type name. At least one type is required.
pub fn parse_generic_arguments(parser: &mut Parser) -> Result<Node, Error> {
    let open = parser.expect(TokenKind::OpenParen)?;
    let mut builder = NodeBuilder::new(NodeKind::GenericArguments, open.span.start);
    builder.token(&open);

    if parser.at(TokenKind::CloseParen) {
        return Err(parser.expected_error("type"));
    }

    parse_type_list(parser, &mut builder)?;
    Ok(builder.finish())
}

/// Comma separated types up to and including the closing `)`.
fn parse_type_list(parser: &mut Parser, builder: &mut NodeBuilder) -> Result<(), Error> {
    while !parser.at(TokenKind::CloseParen) && !parser.at_eof() {
        builder.push(parse_type(parser, BindingPower::Default)?);

        if !parser.at(TokenKind::Comma) {
            break;
        }
        builder.token(parser.advance());
    }

    builder.token(&parser.expect(TokenKind::CloseParen)?);
    Ok(())
}

pub fn parse_optional_type(
    parser: &mut Parser,
    left: Node,
    _bp: BindingPower,
) -> Result<Node, Error> {
    let mut builder = NodeBuilder::new(NodeKind::OptionalType, left.span.start);
    builder.field(Field::Type, left);
    builder.token(parser.advance());
    Ok(builder.finish())
}

pub fn parse_slice_type(
    parser: &mut Parser,
    left: Node,
    _bp: BindingPower,
) -> Result<Node, Error> {
    let mut builder = NodeBuilder::new(NodeKind::SliceType, left.span.start);
    builder.field(Field::Type, left);
    builder.token(&parser.expect(TokenKind::OpenBracket)?);
    builder.token(&parser.expect(TokenKind::CloseBracket)?);
    Ok(builder.finish())
}
