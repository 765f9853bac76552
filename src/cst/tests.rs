//! Unit tests for the concrete syntax tree, its schema and renderings.

use pretty_assertions::assert_eq;
use serde_json::Value;

use super::{
    node::{Field, Node, NodeBuilder, NodeKind},
    schema::{
        check_node, node_type, node_types, node_types_json, SchemaError, EXPRESSIONS, ITEMS,
        PATTERNS, STATEMENTS, TYPES,
    },
};
use crate::{lexer::tokens::TokenKind, parser::parser::parse, Span};

fn leaf(kind: NodeKind, start: usize, end: usize) -> Node {
    Node::leaf(kind, Span::new(start, end))
}

#[test]
fn test_every_named_kind_has_schema_entry() {
    for kind in NodeKind::NAMED {
        if *kind == NodeKind::Error {
            assert!(node_type(*kind).is_none());
            continue;
        }

        let info = node_type(*kind).unwrap_or_else(|| panic!("{} has no entry", kind.name()));
        assert!(info.named);
    }
}

#[test]
fn test_anonymous_tokens_are_listed() {
    let info = node_type(NodeKind::Token(TokenKind::Plus)).unwrap();
    assert!(!info.named);
    assert!(info.fields.is_empty());

    assert!(node_types()
        .iter()
        .all(|info| info.named == info.kind.is_named()));
}

#[test]
fn test_node_groups_are_disjoint_named_kinds() {
    let groups = [EXPRESSIONS, TYPES, STATEMENTS, PATTERNS, ITEMS];
    let mut seen = vec![];

    for kind in groups.iter().flat_map(|group| group.iter()) {
        assert!(kind.is_named(), "{}", kind.name());
        assert!(node_type(*kind).is_some(), "{}", kind.name());
        assert!(!seen.contains(kind), "{} is in two groups", kind.name());
        seen.push(*kind);
    }
}

#[test]
fn test_group_slots_accept_their_group() {
    let source_file = node_type(NodeKind::SourceFile).unwrap();
    let items = source_file.children.as_ref().unwrap();
    assert_eq!(items.types.len(), ITEMS.len());
    assert!(ITEMS.iter().all(|kind| items.allows(*kind)));

    let block = node_type(NodeKind::Block).unwrap();
    let statements = block.children.as_ref().unwrap();
    assert!(STATEMENTS.iter().all(|kind| statements.allows(*kind)));
    assert!(!statements.allows(NodeKind::FunctionDefinition));

    let tree = parse("fn f() {\n    let x = 1\n    loop { break }\n}\ntest \"t\" { x }").unwrap();
    tree.root().walk(&mut |node| {
        if node.kind == NodeKind::Block {
            assert!(node
                .named_children()
                .all(|child| STATEMENTS.contains(&child.kind)));
        }
    });
    assert!(tree
        .root()
        .named_children()
        .all(|item| ITEMS.contains(&item.kind)));
}

#[test]
fn test_node_types_json() {
    let json: Value = serde_json::from_str(&node_types_json().unwrap()).unwrap();
    let entries = json.as_array().unwrap();

    let binary = entries
        .iter()
        .find(|entry| entry["type"] == "binary_expression")
        .unwrap();
    assert_eq!(binary["named"], Value::Bool(true));
    assert_eq!(binary["fields"]["left"]["required"], Value::Bool(true));
    assert_eq!(binary["fields"]["right"]["required"], Value::Bool(false));
    assert!(binary["fields"]["operator"]["types"]
        .as_array()
        .unwrap()
        .iter()
        .any(|type_ref| type_ref["type"] == "+" && type_ref["named"] == Value::Bool(false)));

    let block = entries.iter().find(|entry| entry["type"] == "block").unwrap();
    assert_eq!(block["children"]["multiple"], Value::Bool(true));
    assert!(block.get("fields").is_none());

    assert!(!entries.iter().any(|entry| entry["type"] == "ERROR"));
}

#[test]
fn test_check_node_missing_field() {
    let mut builder = NodeBuilder::new(NodeKind::BinaryExpression, 0);
    builder
        .field(Field::Operator, leaf(NodeKind::Token(TokenKind::Plus), 0, 1))
        .field(Field::Right, leaf(NodeKind::NumberLiteral, 2, 3));

    assert_eq!(
        check_node(&builder.finish()),
        Err(SchemaError::Missing {
            parent: "binary_expression",
            slot: "left"
        })
    );
}

#[test]
fn test_check_node_unknown_field() {
    let mut builder = NodeBuilder::new(NodeKind::Block, 0);
    builder.field(Field::Name, leaf(NodeKind::Identifier, 0, 1));

    assert_eq!(
        check_node(&builder.finish()),
        Err(SchemaError::UnknownField {
            parent: "block",
            field: "name"
        })
    );
}

#[test]
fn test_check_node_wrong_child_type() {
    let mut builder = NodeBuilder::new(NodeKind::ExpressionStatement, 0);
    builder.push(leaf(NodeKind::Block, 0, 2));

    assert_eq!(
        check_node(&builder.finish()),
        Err(SchemaError::UnexpectedType {
            parent: "expression_statement",
            slot: "children",
            found: "block"
        })
    );
}

#[test]
fn test_check_node_repeated_child() {
    let mut builder = NodeBuilder::new(NodeKind::GroupedExpression, 0);
    builder
        .push(leaf(NodeKind::Identifier, 1, 2))
        .push(leaf(NodeKind::Identifier, 3, 4));

    assert_eq!(
        check_node(&builder.finish()),
        Err(SchemaError::Repeated {
            parent: "grouped_expression",
            slot: "children"
        })
    );
}

#[test]
fn test_error_nodes_fit_any_slot() {
    let mut builder = NodeBuilder::new(NodeKind::FunctionDefinition, 0);
    builder
        .field(Field::Name, leaf(NodeKind::Identifier, 3, 4))
        .field(Field::Parameters, leaf(NodeKind::Error, 4, 5));

    assert_eq!(check_node(&builder.finish()), Ok(()));
}

#[test]
fn test_parsed_trees_match_schema() {
    let sources = [
        "import std.io\npub const limit: usize = 4\n",
        "struct Pair(T) { first: T, second: T }\nenum E { A, B(&u8[]), C = 1 }\n",
        "fn main() {\n    let p = Pair(i32) { first = 1, second = 2 }\n    for i in 0..p.first { defer f(i) }\n}\n",
        "fn g(x: i32?) bool { x match { Some(v) => v > 0, else => false } }\n",
        "test \"loops\" { loop { if a { break } else { continue } } }\n",
    ];

    for source in sources {
        let tree = parse(source).unwrap();
        assert!(!tree.has_errors(), "{}", tree.to_sexp());
        assert_eq!(check_node(tree.root()), Ok(()));
    }
}

#[test]
fn test_to_sexp() {
    let mut call = NodeBuilder::new(NodeKind::FunctionCall, 0);
    call.field(Field::Function, leaf(NodeKind::Identifier, 0, 1))
        .push(leaf(NodeKind::Token(TokenKind::OpenParen), 1, 2))
        .field(Field::Arguments, leaf(NodeKind::NumberLiteral, 2, 3))
        .push(leaf(NodeKind::Token(TokenKind::CloseParen), 3, 4));

    let call = call.finish();
    assert_eq!(call.span, Span::new(0, 4));
    assert_eq!(
        call.to_sexp(),
        "(function_call function: (identifier) arguments: (number_literal))"
    );
}

#[test]
fn test_empty_node_span() {
    let node = NodeBuilder::new(NodeKind::ParameterList, 7).finish();
    assert_eq!(node.span, Span::empty_at(7));
    assert!(node.is_leaf());
}

#[test]
fn test_field_access() {
    let tree = parse("fn f() { g(a, b) }").unwrap();
    let callee = tree
        .root()
        .leaves()
        .into_iter()
        .find(|node| node.text(tree.source()) == "g")
        .unwrap();
    assert_eq!(callee.kind, NodeKind::Identifier);

    let mut calls = vec![];
    tree.root().walk(&mut |node| {
        if node.kind == NodeKind::FunctionCall {
            calls.push(node);
        }
    });
    assert_eq!(calls.len(), 1);

    let arguments = calls[0].children_by_field(Field::Arguments);
    let texts: Vec<&str> = arguments
        .iter()
        .map(|node| node.text(tree.source()))
        .collect();
    assert_eq!(texts, vec!["a", "b"]);
    assert_eq!(calls[0].fields().len(), 2);
}

#[test]
fn test_shift_moves_spans_and_diagnostics() {
    let tree = parse("x").unwrap();
    let mut error = tree.root().children[0].node.clone();
    assert!(error.is_error());

    error.shift(2);
    assert_eq!(error.span, Span::new(2, 3));
    assert_eq!(
        error.diagnostic.as_ref().map(|diagnostic| diagnostic.get_span()),
        Some(Span::new(2, 3))
    );
    assert_eq!(error.children[0].node.span, Span::new(2, 3));
}

#[test]
fn test_leaves_cover_every_token() {
    let source = "fn  add( a: i32 )  i32 {\n    a // done\n}";
    let tree = parse(source).unwrap();

    assert_eq!(tree.render(), "fn add ( a : i32 ) i32 { a }");
    assert_eq!(tree.root().leaves().len(), tree.tokens().len() - 1);
}

#[test]
fn test_repeated_diagnostic_is_listed_once() {
    let tree = parse("\"abc").unwrap();
    let errors = tree.errors();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_error_name(), "UnterminatedString");
}

#[test]
fn test_tree_to_json() {
    let tree = parse("fn f() {}").unwrap();
    let json: Value = serde_json::from_str(&tree.to_json().unwrap()).unwrap();

    assert_eq!(json["kind"], "source_file");
    assert_eq!(json["children"][0]["node"]["kind"], "function_definition");
    assert_eq!(json["children"][0]["node"]["children"][1]["field"], "name");
    assert_eq!(json["span"]["end"], 9);
}
