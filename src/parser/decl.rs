//! Top-level items: functions, structs, enums, constants, imports and tests.

use crate::{
    cst::node::{leaf_for_token, Field, Node, NodeBuilder, NodeKind},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{
    expr::parse_expr,
    lookups::BindingPower,
    parser::{ParseContext, Parser, MEMBER_RECOVERY, PARAMETER_RECOVERY},
    stmt::parse_block,
    types::parse_type,
};

/// Parses one item with its leading `pub` and directive, if any.
pub fn parse_item(parser: &mut Parser) -> Result<Node, Error> {
    let mut modifiers = vec![];

    if parser.at(TokenKind::Pub) {
        modifiers.push(parser.leaf());
    }

    if parser.at(TokenKind::Directive) {
        if parser.peek_kind(1) != TokenKind::Fn {
            let token = parser.current_token();
            return Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: token.value.clone(),
                    message: String::from("directives can only be applied to functions"),
                },
                token.span,
            ));
        }
        modifiers.push(parser.leaf());
    }

    let token_kind = parser.current_token_kind();
    let Some(item_fn) = parser.get_item_lookup().get(&token_kind).copied() else {
        return Err(parser.expected_error("item"));
    };

    item_fn(parser, modifiers)
}

fn start_item(parser: &Parser, kind: NodeKind, modifiers: Vec<Node>) -> NodeBuilder {
    let start = modifiers
        .first()
        .map(|modifier| modifier.span.start)
        .unwrap_or(parser.current_token().span.start);

    let mut builder = NodeBuilder::new(kind, start);
    for modifier in modifiers {
        builder.push(modifier);
    }
    builder
}

/// `[pub] [#directive] fn name(params) [ReturnType] [{ .. }]`
pub fn parse_fn_decl(parser: &mut Parser, modifiers: Vec<Node>) -> Result<Node, Error> {
    let mut builder = start_item(parser, NodeKind::FunctionDefinition, modifiers);
    builder.token(&parser.expect(TokenKind::Fn)?);

    if !parser.at(TokenKind::Identifier) {
        return Err(parser.expected_error("function name"));
    }
    builder.field(Field::Name, parser.leaf());
    builder.field(Field::Parameters, parse_parameter_list(parser)?);

    if !parser.at(TokenKind::OpenCurly) && parser.starts_return_type() {
        builder.field(Field::ReturnType, parse_type(parser, BindingPower::Default)?);
    }

    if parser.at(TokenKind::OpenCurly) {
        builder.field(Field::Body, parse_block(parser)?);
    }

    Ok(builder.finish())
}

/// `(name: Type, ..)`. A malformed list becomes an `ERROR` node in its place
/// so the rest of the function still parses.
pub fn parse_parameter_list(parser: &mut Parser) -> Result<Node, Error> {
    let start = parser.position();
    match parse_parameters(parser) {
        Ok(parameters) => Ok(parameters),
        Err(error) => parser.recover(start, error, &PARAMETER_RECOVERY),
    }
}

fn parse_parameters(parser: &mut Parser) -> Result<Node, Error> {
    parser.with_context(ParseContext::expression(), |parser| {
        let open = parser.expect(TokenKind::OpenParen)?;
        let mut builder = NodeBuilder::new(NodeKind::ParameterList, open.span.start);
        builder.token(&open);

        while !parser.at(TokenKind::CloseParen) && !parser.at_eof() {
            builder.push(parse_parameter(parser)?);

            if !parser.at(TokenKind::Comma) {
                break;
            }
            builder.token(parser.advance());
        }

        builder.token(&parser.expect(TokenKind::CloseParen)?);
        Ok(builder.finish())
    })
}

fn parse_parameter(parser: &mut Parser) -> Result<Node, Error> {
    if !parser.at(TokenKind::Identifier) {
        return Err(parser.expected_error("parameter name"));
    }

    let name = parser.leaf();
    let mut builder = NodeBuilder::new(NodeKind::Parameter, name.span.start);
    builder.field(Field::Name, name);
    builder.token(&parser.expect(TokenKind::Colon)?);
    builder.field(Field::Type, parse_type(parser, BindingPower::Default)?);
    Ok(builder.finish())
}

/// `[pub] struct Name [(T, U)] { field: Type, .. }`
pub fn parse_struct_decl(parser: &mut Parser, modifiers: Vec<Node>) -> Result<Node, Error> {
    let mut builder = start_item(parser, NodeKind::StructDefinition, modifiers);
    builder.token(&parser.expect(TokenKind::Struct)?);

    match parser.current_token_kind() {
        TokenKind::TypeIdentifier => {
            builder.field(Field::Name, parser.leaf());
        }
        TokenKind::Identifier if parser.options().dialect.allows_identifier_struct_names() => {
            builder.field(Field::Name, parser.leaf());
        }
        _ => return Err(parser.expected_error("struct name")),
    }

    if parser.at(TokenKind::OpenParen) {
        builder.push(parse_generic_parameters(parser)?);
    }

    builder.field(
        Field::Body,
        parse_member_body(parser, NodeKind::StructBody, parse_struct_field)?,
    );
    Ok(builder.finish())
}

/// `{ member member .. }` where each failed member becomes an `ERROR` node.
fn parse_member_body(
    parser: &mut Parser,
    kind: NodeKind,
    member_fn: fn(&mut Parser) -> Result<Node, Error>,
) -> Result<Node, Error> {
    let open = parser.expect(TokenKind::OpenCurly)?;
    let mut builder = NodeBuilder::new(kind, open.span.start);
    builder.token(&open);

    while !parser.at(TokenKind::CloseCurly) && !parser.at_eof() && !parser.at_item_start() {
        let start = parser.position();
        let member = match member_fn(parser) {
            Ok(member) => member,
            Err(error) => parser.recover(start, error, &MEMBER_RECOVERY)?,
        };
        builder.push(member);
    }

    builder.token(&parser.expect(TokenKind::CloseCurly)?);
    Ok(builder.finish())
}

fn parse_struct_field(parser: &mut Parser) -> Result<Node, Error> {
    if !parser.at(TokenKind::Identifier) {
        return Err(parser.expected_error("field name"));
    }

    let name = parser.leaf();
    let mut builder = NodeBuilder::new(NodeKind::StructField, name.span.start);
    builder.field(Field::Name, name);
    builder.token(&parser.expect(TokenKind::Colon)?);
    builder.field(Field::Type, parse_type(parser, BindingPower::Default)?);

    if parser.at(TokenKind::Comma) {
        builder.token(parser.advance());
    }

    Ok(builder.finish())
}

/// `[pub] enum Name [(T)] { Variant, Variant(Types), Variant = value, .. }`
pub fn parse_enum_decl(parser: &mut Parser, modifiers: Vec<Node>) -> Result<Node, Error> {
    let mut builder = start_item(parser, NodeKind::EnumDefinition, modifiers);
    builder.token(&parser.expect(TokenKind::Enum)?);

    if !parser.at(TokenKind::TypeIdentifier) {
        return Err(parser.expected_error("enum name"));
    }
    builder.field(Field::Name, parser.leaf());

    if parser.at(TokenKind::OpenParen) {
        builder.push(parse_generic_parameters(parser)?);
    }

    builder.field(
        Field::Body,
        parse_member_body(parser, NodeKind::EnumBody, parse_enum_variant)?,
    );
    Ok(builder.finish())
}

fn parse_enum_variant(parser: &mut Parser) -> Result<Node, Error> {
    if !parser.at(TokenKind::TypeIdentifier) {
        return Err(parser.expected_error("variant name"));
    }

    let name_token = parser.advance().clone();
    let mut builder = NodeBuilder::new(NodeKind::EnumVariant, name_token.span.start);
    builder.field(Field::Name, leaf_for_token(&name_token));

    let has_parameters = parser.at(TokenKind::OpenParen);
    if has_parameters {
        builder.push(parse_variant_parameters(parser)?);
    }

    if parser.at(TokenKind::Assignment) {
        if has_parameters {
            return Err(Error::new(
                ErrorImpl::MixedVariantShape {
                    variant: name_token.value,
                },
                parser.current_token().span,
            ));
        }

        builder.token(parser.advance());
        let value = parser.with_context(ParseContext::expression(), |parser| {
            parse_expr(parser, BindingPower::Default)
        })?;
        builder.field(Field::Value, value);
    }

    if parser.at(TokenKind::Comma) {
        builder.token(parser.advance());
    }

    Ok(builder.finish())
}

/// `(Type, ..)` after a variant name.
fn parse_variant_parameters(parser: &mut Parser) -> Result<Node, Error> {
    let open = parser.expect(TokenKind::OpenParen)?;
    let mut builder = NodeBuilder::new(NodeKind::VariantParameters, open.span.start);
    builder.token(&open);

    while !parser.at(TokenKind::CloseParen) && !parser.at_eof() {
        builder.push(parse_type(parser, BindingPower::Default)?);

        if !parser.at(TokenKind::Comma) {
            break;
        }
        builder.token(parser.advance());
    }

    builder.token(&parser.expect(TokenKind::CloseParen)?);
    Ok(builder.finish())
}

/// `(T, U)` after a struct or enum name.
fn parse_generic_parameters(parser: &mut Parser) -> Result<Node, Error> {
    let open = parser.expect(TokenKind::OpenParen)?;
    let mut builder = NodeBuilder::new(NodeKind::GenericParameters, open.span.start);
    builder.token(&open);

    loop {
        builder.push(parser.expect_leaf(TokenKind::TypeIdentifier)?);

        if !parser.at(TokenKind::Comma) {
            break;
        }
        builder.token(parser.advance());

        if parser.at(TokenKind::CloseParen) {
            break;
        }
    }

    builder.token(&parser.expect(TokenKind::CloseParen)?);
    Ok(builder.finish())
}

/// `[pub] const name [: Type] = value`
pub fn parse_const_decl(parser: &mut Parser, modifiers: Vec<Node>) -> Result<Node, Error> {
    let mut builder = start_item(parser, NodeKind::ConstDeclaration, modifiers);
    builder.token(&parser.expect(TokenKind::Const)?);

    if !parser.at(TokenKind::Identifier) {
        return Err(parser.expected_error("constant name"));
    }
    let name = parser.advance().clone();
    builder.field(Field::Name, leaf_for_token(&name));

    if parser.at(TokenKind::Colon) {
        builder.token(parser.advance());
        builder.field(Field::Type, parse_type(parser, BindingPower::Default)?);
    }

    if !parser.at(TokenKind::Assignment) {
        return Err(Error::new(
            ErrorImpl::MissingInitializer { name: name.value },
            parser.current_token().span,
        ));
    }

    builder.token(parser.advance());
    let value = parser.with_context(ParseContext::expression(), |parser| {
        parse_expr(parser, BindingPower::Default)
    })?;
    builder.field(Field::Value, value);
    Ok(builder.finish())
}

/// `[pub] import a.b.c`
pub fn parse_import_decl(parser: &mut Parser, modifiers: Vec<Node>) -> Result<Node, Error> {
    let mut builder = start_item(parser, NodeKind::ImportDeclaration, modifiers);
    builder.token(&parser.expect(TokenKind::Import)?);

    let first = parser.expect_leaf(TokenKind::Identifier)?;
    let mut path = NodeBuilder::new(NodeKind::ModulePath, first.span.start);
    path.push(first);

    while parser.at(TokenKind::Dot) && parser.peek_kind(1) == TokenKind::Identifier {
        path.token(parser.advance());
        path.push(parser.leaf());
    }

    builder.field(Field::Path, path.finish());
    Ok(builder.finish())
}

/// `test "name" { .. }`
pub fn parse_test_decl(parser: &mut Parser, modifiers: Vec<Node>) -> Result<Node, Error> {
    if let Some(modifier) = modifiers.first() {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: String::from(modifier.kind.name()),
                message: String::from("test blocks cannot have modifiers"),
            },
            modifier.span,
        ));
    }

    let test_token = parser.expect(TokenKind::Test)?;
    let mut builder = NodeBuilder::new(NodeKind::TestBlock, test_token.span.start);
    builder.token(&test_token);
    builder.field(Field::Name, parser.expect_leaf(TokenKind::String)?);
    builder.field(Field::Body, parse_block(parser)?);
    Ok(builder.finish())
}
