use crate::{
    cst::node::{Child, Field, Node, NodeBuilder, NodeKind},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{
    decl::parse_parameter_list,
    lookups::BindingPower,
    parser::{ParseContext, Parser, Position, ARM_RECOVERY},
    patterns::parse_pattern,
    stmt::parse_block,
    types::{parse_generic_arguments, parse_type},
};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Node, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud_fn) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected());
    };

    let mut left = nud_fn(parser)?;

    // While the current token binds tighter than `bp`, keep extending the left side
    loop {
        let token_kind = parser.current_token_kind();
        let Some(&token_bp) = parser.get_bp_lookup().get(&token_kind) else {
            break;
        };

        if token_bp <= bp || !continues_expression(parser, token_kind) {
            break;
        }

        let Some(led_fn) = parser.get_led_lookup().get(&token_kind).copied() else {
            return Err(Error::internal(format!(
                "binding power registered for `{}` without a handler",
                token_kind
            )));
        };

        left = led_fn(parser, left, token_bp)?;
    }

    Ok(left)
}

/// `.{` starts an anonymous struct literal, never a member access.
fn continues_expression(parser: &Parser, kind: TokenKind) -> bool {
    match kind {
        TokenKind::Dot => parser.peek_kind(1) != TokenKind::OpenCurly,
        _ => true,
    }
}

fn parse_in_expression(parser: &mut Parser) -> Result<Node, Error> {
    parser.with_context(ParseContext::expression(), |parser| {
        parse_expr(parser, BindingPower::Default)
    })
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Node, Error> {
    match parser.current_token_kind() {
        TokenKind::Identifier
            if parser.options().dialect.allows_identifier_struct_names()
                && parser.peek_kind(1) == TokenKind::OpenCurly
                && !parser.context().in_condition =>
        {
            let name = parser.leaf();
            parse_struct_literal_body(parser, name, None)
        }
        TokenKind::Number
        | TokenKind::String
        | TokenKind::Char
        | TokenKind::ByteChar
        | TokenKind::True
        | TokenKind::False
        | TokenKind::Null
        | TokenKind::Identifier => Ok(parser.leaf()),
        _ => Err(parser.unexpected()),
    }
}

/// `Name`, `Name { .. }` or `Name(Types) { .. }`.
pub fn parse_type_identifier_expr(parser: &mut Parser) -> Result<Node, Error> {
    if !parser.context().in_condition {
        match parser.peek_kind(1) {
            TokenKind::OpenCurly => {
                let name = parser.leaf();
                return parse_struct_literal_body(parser, name, None);
            }
            TokenKind::OpenParen => {
                let checkpoint = parser.checkpoint();
                let name = parser.leaf();

                match parse_generic_arguments(parser) {
                    Ok(arguments) if parser.at(TokenKind::OpenCurly) => {
                        return parse_struct_literal_body(parser, name, Some(arguments));
                    }
                    _ => parser.rewind(checkpoint),
                }
            }
            _ => {}
        }
    }

    Ok(parser.leaf())
}

fn parse_struct_literal_body(
    parser: &mut Parser,
    name: Node,
    generic_arguments: Option<Node>,
) -> Result<Node, Error> {
    let mut builder = NodeBuilder::new(NodeKind::StructLiteral, name.span.start);
    builder.field(Field::Name, name);
    if let Some(arguments) = generic_arguments {
        builder.push(arguments);
    }

    parse_field_entries(parser, &mut builder)?;
    Ok(builder.finish())
}

/// `{ name = value, shorthand, .. }` appended to `builder`.
fn parse_field_entries(parser: &mut Parser, builder: &mut NodeBuilder) -> Result<(), Error> {
    parser.with_context(ParseContext::expression(), |parser| {
        builder.token(&parser.expect(TokenKind::OpenCurly)?);

        while !parser.at(TokenKind::CloseCurly) && !parser.at_eof() {
            builder.push(parse_field_entry(parser)?);

            if !parser.at(TokenKind::Comma) {
                break;
            }
            builder.token(parser.advance());
        }

        builder.token(&parser.expect(TokenKind::CloseCurly)?);
        Ok(())
    })
}

fn parse_field_entry(parser: &mut Parser) -> Result<Node, Error> {
    if !parser.at(TokenKind::Identifier) {
        return Err(parser.expected_error("field name"));
    }
    let name = parser.leaf();

    if !parser.at(TokenKind::Assignment) {
        let mut builder = NodeBuilder::new(NodeKind::FieldShorthand, name.span.start);
        builder.push(name);
        return Ok(builder.finish());
    }

    let mut builder = NodeBuilder::new(NodeKind::FieldInitializer, name.span.start);
    builder.field(Field::Name, name);
    builder.token(parser.advance());
    builder.field(Field::Value, parse_expr(parser, BindingPower::Default)?);
    Ok(builder.finish())
}

/// `.{ name = value, .. }`
pub fn parse_anonymous_struct_expr(parser: &mut Parser) -> Result<Node, Error> {
    let dot = parser.expect(TokenKind::Dot)?;
    let mut builder = NodeBuilder::new(NodeKind::AnonymousStructLiteral, dot.span.start);
    builder.token(&dot);

    parse_field_entries(parser, &mut builder)?;
    Ok(builder.finish())
}

/// `(e)` or a tuple `(a,)`, `(a, b)`.
pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Node, Error> {
    parser.with_context(ParseContext::expression(), |parser| {
        let open = parser.expect(TokenKind::OpenParen)?;
        let mut builder = NodeBuilder::new(NodeKind::GroupedExpression, open.span.start);
        builder.token(&open);
        builder.push(parse_expr(parser, BindingPower::Default)?);

        if parser.at(TokenKind::Comma) {
            builder.set_kind(NodeKind::TupleExpression);

            while parser.at(TokenKind::Comma) {
                builder.token(parser.advance());
                if parser.at(TokenKind::CloseParen) {
                    break;
                }
                builder.push(parse_expr(parser, BindingPower::Default)?);
            }
        }

        builder.token(&parser.expect(TokenKind::CloseParen)?);
        Ok(builder.finish())
    })
}

/// `[]`, `[a, b]` or `[value; length]`.
pub fn parse_array_literal_expr(parser: &mut Parser) -> Result<Node, Error> {
    parser.with_context(ParseContext::expression(), |parser| {
        let open = parser.expect(TokenKind::OpenBracket)?;
        let mut builder = NodeBuilder::new(NodeKind::ArrayLiteral, open.span.start);
        builder.token(&open);

        if parser.at(TokenKind::CloseBracket) {
            builder.token(parser.advance());
            return Ok(builder.finish());
        }

        let first = parse_expr(parser, BindingPower::Default)?;

        if parser.at(TokenKind::Semicolon) {
            builder.field(Field::Value, first);
            builder.token(parser.advance());
            builder.field(Field::Length, parse_expr(parser, BindingPower::Default)?);
        } else {
            builder.push(first);

            while parser.at(TokenKind::Comma) {
                builder.token(parser.advance());
                if parser.at(TokenKind::CloseBracket) {
                    break;
                }
                builder.push(parse_expr(parser, BindingPower::Default)?);
            }
        }

        builder.token(&parser.expect(TokenKind::CloseBracket)?);
        Ok(builder.finish())
    })
}

pub fn parse_unary_expr(parser: &mut Parser) -> Result<Node, Error> {
    let operator = parser.leaf();
    let operand = parse_expr(parser, BindingPower::Unary)?;

    let mut builder = NodeBuilder::new(NodeKind::UnaryExpression, operator.span.start);
    builder.field(Field::Operator, operator);
    builder.field(Field::Operand, operand);
    Ok(builder.finish())
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: Node,
    bp: BindingPower,
) -> Result<Node, Error> {
    let mut builder = NodeBuilder::new(NodeKind::BinaryExpression, left.span.start);
    builder.field(Field::Left, left);
    builder.field(Field::Operator, parser.leaf());

    let right = parse_expr(parser, bp)?;
    builder.field(Field::Right, right);
    Ok(builder.finish())
}

fn is_range(node: &Node) -> bool {
    node.kind == NodeKind::BinaryExpression
        && node.child_by_field(Field::Operator).map(|operator| operator.kind)
            == Some(NodeKind::Token(TokenKind::DotDot))
}

/// `a..b` or `a..`. The right side is present when the next token can start an expression.
pub fn parse_range_expr(parser: &mut Parser, left: Node, bp: BindingPower) -> Result<Node, Error> {
    if is_range(&left) {
        return Err(Error::new(
            ErrorImpl::ChainedRange,
            parser.current_token().span,
        ));
    }

    let mut builder = NodeBuilder::new(NodeKind::BinaryExpression, left.span.start);
    builder.field(Field::Left, left);
    builder.field(Field::Operator, parser.leaf());

    if parser.starts_expression(parser.current_token_kind()) {
        builder.field(Field::Right, parse_expr(parser, bp)?);
    }

    Ok(builder.finish())
}

pub fn parse_assignment_expr(
    parser: &mut Parser,
    left: Node,
    _bp: BindingPower,
) -> Result<Node, Error> {
    match left.kind {
        NodeKind::Identifier
        | NodeKind::MemberExpression
        | NodeKind::IndexExpression
        | NodeKind::DereferenceExpression => {}
        _ => {
            return Err(Error::new(
                ErrorImpl::InvalidAssignmentTarget {
                    target: String::from(left.kind.name()),
                },
                parser.current_token().span,
            ))
        }
    }

    let mut builder = NodeBuilder::new(NodeKind::AssignmentExpression, left.span.start);
    builder.field(Field::Left, left);
    builder.field(Field::Operator, parser.leaf());

    // Parsing the right side from the lowest power makes assignment right-associative
    let right = parse_expr(parser, BindingPower::Default)?;
    builder.field(Field::Right, right);
    Ok(builder.finish())
}

pub fn parse_cast_expr(parser: &mut Parser, left: Node, _bp: BindingPower) -> Result<Node, Error> {
    if left.kind == NodeKind::CastExpression {
        return Err(Error::new(
            ErrorImpl::ChainedCast,
            parser.current_token().span,
        ));
    }

    let mut builder = NodeBuilder::new(NodeKind::CastExpression, left.span.start);
    builder.field(Field::Value, left);
    builder.token(parser.advance());
    builder.field(Field::Type, parse_type(parser, BindingPower::Default)?);
    Ok(builder.finish())
}

/// `object.name`, `object.0` or `object.*`.
pub fn parse_member_expr(
    parser: &mut Parser,
    left: Node,
    _bp: BindingPower,
) -> Result<Node, Error> {
    let start = left.span.start;
    let dot = parser.advance().clone();

    match parser.current_token_kind() {
        TokenKind::Star => {
            let mut builder = NodeBuilder::new(NodeKind::DereferenceExpression, start);
            builder.field(Field::Object, left);
            builder.token(&dot);
            builder.token(parser.advance());
            Ok(builder.finish())
        }
        TokenKind::Identifier | TokenKind::TypeIdentifier | TokenKind::Number => {
            let mut builder = NodeBuilder::new(NodeKind::MemberExpression, start);
            builder.field(Field::Object, left);
            builder.token(&dot);
            builder.field(Field::Property, parser.leaf());
            Ok(builder.finish())
        }
        _ => Err(parser.expected_error("member name")),
    }
}

pub fn parse_optional_chain_expr(
    parser: &mut Parser,
    left: Node,
    _bp: BindingPower,
) -> Result<Node, Error> {
    let mut builder = NodeBuilder::new(NodeKind::OptionalChainExpression, left.span.start);
    builder.field(Field::Object, left);
    builder.token(parser.advance());

    match parser.current_token_kind() {
        TokenKind::Identifier | TokenKind::TypeIdentifier => {
            builder.field(Field::Property, parser.leaf());
            Ok(builder.finish())
        }
        _ => Err(parser.expected_error("member name")),
    }
}

pub fn parse_index_expr(parser: &mut Parser, left: Node, _bp: BindingPower) -> Result<Node, Error> {
    let mut builder = NodeBuilder::new(NodeKind::IndexExpression, left.span.start);
    builder.field(Field::Object, left);
    builder.token(parser.advance());
    builder.field(Field::Index, parse_in_expression(parser)?);
    builder.token(&parser.expect(TokenKind::CloseBracket)?);
    Ok(builder.finish())
}

pub fn parse_call_expr(parser: &mut Parser, left: Node, _bp: BindingPower) -> Result<Node, Error> {
    if !matches!(left.kind, NodeKind::Identifier | NodeKind::MemberExpression) {
        return Err(Error::new(
            ErrorImpl::InvalidCallTarget {
                target: String::from(left.kind.name()),
            },
            parser.current_token().span,
        ));
    }

    let mut builder = NodeBuilder::new(NodeKind::FunctionCall, left.span.start);
    builder.field(Field::Function, left);

    parser.with_context(ParseContext::expression(), |parser| {
        builder.token(parser.advance());

        while !parser.at(TokenKind::CloseParen) && !parser.at_eof() {
            builder.field(Field::Arguments, parse_expr(parser, BindingPower::Default)?);

            if !parser.at(TokenKind::Comma) {
                break;
            }
            builder.token(parser.advance());
        }

        builder.token(&parser.expect(TokenKind::CloseParen)?);
        Ok(builder.finish())
    })
}

/// `scrutinee match { pattern => body, .. }`
pub fn parse_match_expr(parser: &mut Parser, left: Node, _bp: BindingPower) -> Result<Node, Error> {
    let mut builder = NodeBuilder::new(NodeKind::MatchExpression, left.span.start);
    builder.field(Field::Scrutinee, left);
    builder.token(parser.advance());

    parser.with_context(ParseContext::expression(), |parser| {
        builder.token(&parser.expect(TokenKind::OpenCurly)?);

        while !parser.at(TokenKind::CloseCurly) && !parser.at_eof() {
            let start = parser.position();
            let arm = match parse_match_arm(parser) {
                Ok(arm) => arm,
                Err(error) => parser.recover(start, error, &ARM_RECOVERY)?,
            };
            builder.push(arm);
        }

        builder.token(&parser.expect(TokenKind::CloseCurly)?);
        Ok(builder.finish())
    })
}

fn parse_match_arm(parser: &mut Parser) -> Result<Node, Error> {
    let pattern = parse_pattern(parser)?;

    let mut builder = NodeBuilder::new(NodeKind::MatchArm, pattern.span.start);
    builder.field(Field::Pattern, pattern);
    builder.token(&parser.expect(TokenKind::FatArrow)?);
    builder.field(Field::Body, parse_branch(parser)?);

    if parser.at(TokenKind::Comma) {
        builder.token(parser.advance());
    }

    Ok(builder.finish())
}

/// A block, or an expression in expression position.
fn parse_branch(parser: &mut Parser) -> Result<Node, Error> {
    if parser.at(TokenKind::OpenCurly) {
        parse_block(parser)
    } else {
        parse_in_expression(parser)
    }
}

pub fn parse_if_expr(parser: &mut Parser) -> Result<Node, Error> {
    parser.with_context(ParseContext::expression(), parse_if)
}

/// Parses `if`. The current position decides between `if_statement` and
/// `if_expression`; only a statement's alternative may be another statement.
pub fn parse_if(parser: &mut Parser) -> Result<Node, Error> {
    let position = parser.context().position;
    let kind = match position {
        Position::Statement => NodeKind::IfStatement,
        Position::Expression => NodeKind::IfExpression,
    };

    let if_token = parser.expect(TokenKind::If)?;
    let mut builder = NodeBuilder::new(kind, if_token.span.start);
    builder.token(&if_token);

    let condition = parser.with_context(ParseContext::condition(), |parser| {
        parse_expr(parser, BindingPower::Default)
    })?;
    push_condition(&mut builder, condition);

    builder.field(Field::Consequence, parse_branch(parser)?);

    if parser.at(TokenKind::Else) {
        builder.token(parser.advance());

        let alternative = if parser.at(TokenKind::OpenCurly) {
            parse_block(parser)?
        } else if parser.at(TokenKind::If) && position == Position::Statement {
            parser.with_context(ParseContext::statement(), parse_if)?
        } else {
            parse_in_expression(parser)?
        };
        builder.field(Field::Alternative, alternative);
    }

    Ok(builder.finish())
}

/// A parenthesised condition keeps its parentheses as anonymous children of
/// the `if`, with the inner expression in the `condition` field.
fn push_condition(builder: &mut NodeBuilder, condition: Node) {
    if condition.kind != NodeKind::GroupedExpression {
        builder.field(Field::Condition, condition);
        return;
    }

    match <[Child; 3]>::try_from(condition.children) {
        Ok([open, inner, close]) => {
            builder
                .push(open.node)
                .field(Field::Condition, inner.node)
                .push(close.node);
        }
        Err(children) => {
            builder.field(Field::Condition, Node { children, ..condition });
        }
    }
}

/// `fn(params) [ReturnType] { .. }`
pub fn parse_lambda_expr(parser: &mut Parser) -> Result<Node, Error> {
    if !parser.options().dialect.allows_lambdas() {
        return Err(Error::new(
            ErrorImpl::DialectFeature {
                feature: String::from("lambda expressions"),
            },
            parser.current_token().span,
        ));
    }

    let fn_token = parser.expect(TokenKind::Fn)?;
    let mut builder = NodeBuilder::new(NodeKind::LambdaExpression, fn_token.span.start);
    builder.token(&fn_token);
    builder.field(Field::Parameters, parse_parameter_list(parser)?);

    if !parser.at(TokenKind::OpenCurly) && parser.starts_return_type() {
        builder.field(Field::ReturnType, parse_type(parser, BindingPower::Default)?);
    }

    builder.field(Field::Body, parse_block(parser)?);
    Ok(builder.finish())
}
