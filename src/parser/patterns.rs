use crate::{
    cst::node::{Field, Node, NodeBuilder, NodeKind},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

/// Patterns of a match arm: `_`, `name`, `Variant(..)`, `Type.Variant(..)` or `else`.
pub fn parse_pattern(parser: &mut Parser) -> Result<Node, Error> {
    match parser.current_token_kind() {
        TokenKind::Underscore => Ok(parser.leaf()),
        TokenKind::Else => Ok(parser.leaf_as(NodeKind::ElsePattern)),
        TokenKind::Identifier => {
            let name = parser.leaf();
            let mut builder = NodeBuilder::new(NodeKind::IdentifierPattern, name.span.start);
            builder.push(name);
            Ok(builder.finish())
        }
        TokenKind::TypeIdentifier => parse_variant_pattern(parser),
        _ => Err(parser.expected_error("pattern")),
    }
}

fn parse_variant_pattern(parser: &mut Parser) -> Result<Node, Error> {
    let first = parser.leaf();
    let mut builder = NodeBuilder::new(NodeKind::VariantPattern, first.span.start);

    if parser.at(TokenKind::Dot) && parser.peek_kind(1) == TokenKind::TypeIdentifier {
        builder.field(Field::Type, first);
        builder.token(parser.advance());
        builder.field(Field::Name, parser.leaf());
    } else {
        builder.field(Field::Name, first);
    }

    if parser.at(TokenKind::OpenParen) {
        builder.token(parser.advance());

        while !parser.at(TokenKind::CloseParen) && !parser.at_eof() {
            builder.push(parse_pattern(parser)?);

            if !parser.at(TokenKind::Comma) {
                break;
            }
            builder.token(parser.advance());
        }

        builder.token(&parser.expect(TokenKind::CloseParen)?);
    }

    Ok(builder.finish())
}
