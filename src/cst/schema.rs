//! Static description of every node kind, in the shape of tree-sitter's
//! `node-types.json`.
//!
//! The schema is built once and never changes. It covers both dialects, so a
//! tree from either one validates against it.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use serde::Serialize;
use thiserror::Error;

use crate::lexer::tokens::TokenKind;

use super::node::{Field, Node, NodeKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRef {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub named: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    pub multiple: bool,
    pub required: bool,
    pub types: Vec<TypeRef>,
}

impl FieldInfo {
    pub fn allows(&self, kind: NodeKind) -> bool {
        kind == NodeKind::Error || self.types.iter().any(|type_ref| type_ref.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeTypeInfo {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub named: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<&'static str, FieldInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<FieldInfo>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("no schema entry for {kind:?}")]
    UnknownKind { kind: &'static str },
    #[error("{parent} has no field {field:?}")]
    UnknownField {
        parent: &'static str,
        field: &'static str,
    },
    #[error("{parent} is missing required {slot}")]
    Missing {
        parent: &'static str,
        slot: &'static str,
    },
    #[error("{parent} holds more than one {slot}")]
    Repeated {
        parent: &'static str,
        slot: &'static str,
    },
    #[error("{parent} cannot hold {found} in {slot}")]
    UnexpectedType {
        parent: &'static str,
        slot: &'static str,
        found: &'static str,
    },
}

/// Kinds accepted wherever the grammar allows an expression.
pub const EXPRESSIONS: &[NodeKind] = &[
    NodeKind::AssignmentExpression,
    NodeKind::BinaryExpression,
    NodeKind::UnaryExpression,
    NodeKind::CastExpression,
    NodeKind::MatchExpression,
    NodeKind::IfExpression,
    NodeKind::LambdaExpression,
    NodeKind::GroupedExpression,
    NodeKind::TupleExpression,
    NodeKind::ArrayLiteral,
    NodeKind::StructLiteral,
    NodeKind::AnonymousStructLiteral,
    NodeKind::FunctionCall,
    NodeKind::MemberExpression,
    NodeKind::IndexExpression,
    NodeKind::DereferenceExpression,
    NodeKind::OptionalChainExpression,
    NodeKind::Identifier,
    NodeKind::TypeIdentifier,
    NodeKind::NumberLiteral,
    NodeKind::StringLiteral,
    NodeKind::CharLiteral,
    NodeKind::BooleanLiteral,
    NodeKind::NullLiteral,
];

pub const TYPES: &[NodeKind] = &[
    NodeKind::PrimitiveType,
    NodeKind::GenericTypeParameter,
    NodeKind::ReferenceType,
    NodeKind::OptionalType,
    NodeKind::SliceType,
    NodeKind::ArrayType,
    NodeKind::FunctionType,
    NodeKind::TupleType,
    NodeKind::NamedType,
];

pub const STATEMENTS: &[NodeKind] = &[
    NodeKind::LetStatement,
    NodeKind::ConstStatement,
    NodeKind::ReturnStatement,
    NodeKind::DeferStatement,
    NodeKind::IfStatement,
    NodeKind::ForStatement,
    NodeKind::LoopStatement,
    NodeKind::BreakStatement,
    NodeKind::ContinueStatement,
    NodeKind::ExpressionStatement,
];

pub const PATTERNS: &[NodeKind] = &[
    NodeKind::WildcardPattern,
    NodeKind::IdentifierPattern,
    NodeKind::VariantPattern,
    NodeKind::ElsePattern,
];

pub const ITEMS: &[NodeKind] = &[
    NodeKind::FunctionDefinition,
    NodeKind::StructDefinition,
    NodeKind::EnumDefinition,
    NodeKind::ConstDeclaration,
    NodeKind::ImportDeclaration,
    NodeKind::TestBlock,
];

const BINARY_OPERATORS: &[TokenKind] = &[
    TokenKind::QuestionQuestion,
    TokenKind::Or,
    TokenKind::And,
    TokenKind::Equals,
    TokenKind::NotEquals,
    TokenKind::Less,
    TokenKind::Greater,
    TokenKind::LessEquals,
    TokenKind::GreaterEquals,
    TokenKind::DotDot,
    TokenKind::Pipe,
    TokenKind::Caret,
    TokenKind::Ampersand,
    TokenKind::Plus,
    TokenKind::Dash,
    TokenKind::Star,
    TokenKind::Slash,
    TokenKind::Percent,
];

/// Builds a slot description from groups of node kinds.
fn slot(multiple: bool, required: bool, groups: &[&[NodeKind]]) -> FieldInfo {
    let types = groups
        .iter()
        .flat_map(|group| group.iter())
        .map(|kind| TypeRef {
            kind: *kind,
            named: kind.is_named(),
        })
        .collect();

    FieldInfo {
        multiple,
        required,
        types,
    }
}

fn one(groups: &[&[NodeKind]]) -> FieldInfo {
    slot(false, true, groups)
}

fn maybe(groups: &[&[NodeKind]]) -> FieldInfo {
    slot(false, false, groups)
}

fn many(groups: &[&[NodeKind]]) -> FieldInfo {
    slot(true, false, groups)
}

fn some(groups: &[&[NodeKind]]) -> FieldInfo {
    slot(true, true, groups)
}

fn tokens(kinds: &[TokenKind]) -> Vec<NodeKind> {
    kinds.iter().map(|kind| NodeKind::Token(*kind)).collect()
}

struct Entry {
    kind: NodeKind,
    fields: Vec<(Field, FieldInfo)>,
    children: Option<FieldInfo>,
}

impl Entry {
    fn new(kind: NodeKind) -> Self {
        Entry {
            kind,
            fields: vec![],
            children: None,
        }
    }

    fn field(mut self, field: Field, info: FieldInfo) -> Self {
        self.fields.push((field, info));
        self
    }

    fn children(mut self, info: FieldInfo) -> Self {
        self.children = Some(info);
        self
    }

    fn build(self) -> NodeTypeInfo {
        NodeTypeInfo {
            kind: self.kind,
            named: true,
            fields: self
                .fields
                .into_iter()
                .map(|(field, info)| (field.name(), info))
                .collect(),
            children: self.children,
        }
    }
}

fn create_node_types() -> Vec<NodeTypeInfo> {
    use NodeKind as K;

    let modifiers: &[NodeKind] = &[K::VisibilityModifier];
    let assignment_targets: &[NodeKind] = &[
        K::Identifier,
        K::MemberExpression,
        K::IndexExpression,
        K::DereferenceExpression,
    ];
    let assignment_operators = tokens(&[TokenKind::Assignment, TokenKind::PlusEquals]);
    let binary_operators = tokens(BINARY_OPERATORS);
    let unary_operators = tokens(&[TokenKind::Dash, TokenKind::Not, TokenKind::Ampersand]);
    let struct_names: &[NodeKind] = &[K::TypeIdentifier, K::Identifier];
    let block_or_expression: &[&[NodeKind]] = &[&[K::Block], EXPRESSIONS];
    let field_entries: &[NodeKind] = &[K::GenericArguments, K::FieldInitializer, K::FieldShorthand];

    let entries = vec![
        Entry::new(K::SourceFile).children(many(&[ITEMS])),
        Entry::new(K::ImportDeclaration)
            .field(Field::Path, one(&[&[K::ModulePath]]))
            .children(maybe(&[modifiers])),
        Entry::new(K::ModulePath).children(some(&[&[K::Identifier]])),
        Entry::new(K::VisibilityModifier),
        Entry::new(K::Directive),
        Entry::new(K::FunctionDefinition)
            .field(Field::Name, one(&[&[K::Identifier]]))
            .field(Field::Parameters, one(&[&[K::ParameterList]]))
            .field(Field::ReturnType, maybe(&[TYPES]))
            .field(Field::Body, maybe(&[&[K::Block]]))
            .children(many(&[&[K::VisibilityModifier, K::Directive]])),
        Entry::new(K::ParameterList).children(many(&[&[K::Parameter]])),
        Entry::new(K::Parameter)
            .field(Field::Name, one(&[&[K::Identifier]]))
            .field(Field::Type, one(&[TYPES])),
        Entry::new(K::StructDefinition)
            .field(Field::Name, one(&[struct_names]))
            .field(Field::Body, one(&[&[K::StructBody]]))
            .children(many(&[&[K::VisibilityModifier, K::GenericParameters]])),
        Entry::new(K::StructBody).children(many(&[&[K::StructField]])),
        Entry::new(K::StructField)
            .field(Field::Name, one(&[&[K::Identifier]]))
            .field(Field::Type, one(&[TYPES])),
        Entry::new(K::EnumDefinition)
            .field(Field::Name, one(&[&[K::TypeIdentifier]]))
            .field(Field::Body, one(&[&[K::EnumBody]]))
            .children(many(&[&[K::VisibilityModifier, K::GenericParameters]])),
        Entry::new(K::EnumBody).children(many(&[&[K::EnumVariant]])),
        Entry::new(K::EnumVariant)
            .field(Field::Name, one(&[&[K::TypeIdentifier]]))
            .field(Field::Value, maybe(&[EXPRESSIONS]))
            .children(maybe(&[&[K::VariantParameters]])),
        Entry::new(K::VariantParameters).children(many(&[TYPES])),
        Entry::new(K::GenericParameters).children(some(&[&[K::TypeIdentifier]])),
        Entry::new(K::GenericArguments).children(some(&[TYPES])),
        Entry::new(K::ConstDeclaration)
            .field(Field::Name, one(&[&[K::Identifier]]))
            .field(Field::Type, maybe(&[TYPES]))
            .field(Field::Value, one(&[EXPRESSIONS]))
            .children(maybe(&[modifiers])),
        Entry::new(K::TestBlock)
            .field(Field::Name, one(&[&[K::StringLiteral]]))
            .field(Field::Body, one(&[&[K::Block]])),
        Entry::new(K::PrimitiveType),
        Entry::new(K::GenericTypeParameter).children(one(&[&[K::Identifier]])),
        Entry::new(K::ReferenceType).field(Field::Type, one(&[TYPES])),
        Entry::new(K::OptionalType).field(Field::Type, one(&[TYPES])),
        Entry::new(K::SliceType).field(Field::Type, one(&[TYPES])),
        Entry::new(K::ArrayType)
            .field(Field::Type, one(&[TYPES]))
            .field(Field::Length, one(&[EXPRESSIONS])),
        Entry::new(K::FunctionType)
            .field(Field::ReturnType, one(&[TYPES]))
            .children(many(&[&[K::Parameter], TYPES])),
        Entry::new(K::TupleType).children(many(&[TYPES])),
        Entry::new(K::NamedType)
            .field(Field::Name, one(&[&[K::TypeIdentifier]]))
            .children(maybe(&[&[K::GenericArguments]])),
        Entry::new(K::Block).children(many(&[STATEMENTS])),
        Entry::new(K::LetStatement)
            .field(Field::Name, one(&[&[K::Identifier]]))
            .field(Field::Type, maybe(&[TYPES]))
            .field(Field::Value, maybe(&[EXPRESSIONS])),
        Entry::new(K::ConstStatement)
            .field(Field::Name, one(&[&[K::Identifier]]))
            .field(Field::Type, maybe(&[TYPES]))
            .field(Field::Value, one(&[EXPRESSIONS])),
        Entry::new(K::ReturnStatement).children(maybe(&[EXPRESSIONS])),
        Entry::new(K::DeferStatement).children(one(&[EXPRESSIONS])),
        Entry::new(K::IfStatement)
            .field(Field::Condition, one(&[EXPRESSIONS]))
            .field(Field::Consequence, one(block_or_expression))
            .field(
                Field::Alternative,
                maybe(&[&[K::Block, K::IfStatement], EXPRESSIONS]),
            ),
        Entry::new(K::ForStatement)
            .field(Field::Pattern, one(&[&[K::Identifier]]))
            .field(Field::Iterable, one(&[EXPRESSIONS]))
            .field(Field::Body, one(&[&[K::Block]])),
        Entry::new(K::LoopStatement).field(Field::Body, one(&[&[K::Block]])),
        Entry::new(K::BreakStatement),
        Entry::new(K::ContinueStatement),
        Entry::new(K::ExpressionStatement).children(one(&[EXPRESSIONS])),
        Entry::new(K::AssignmentExpression)
            .field(Field::Left, one(&[assignment_targets]))
            .field(Field::Operator, one(&[assignment_operators.as_slice()]))
            .field(Field::Right, one(&[EXPRESSIONS])),
        Entry::new(K::BinaryExpression)
            .field(Field::Left, one(&[EXPRESSIONS]))
            .field(Field::Operator, one(&[binary_operators.as_slice()]))
            .field(Field::Right, maybe(&[EXPRESSIONS])),
        Entry::new(K::UnaryExpression)
            .field(Field::Operator, one(&[unary_operators.as_slice()]))
            .field(Field::Operand, one(&[EXPRESSIONS])),
        Entry::new(K::CastExpression)
            .field(Field::Value, one(&[EXPRESSIONS]))
            .field(Field::Type, one(&[TYPES])),
        Entry::new(K::MatchExpression)
            .field(Field::Scrutinee, one(&[EXPRESSIONS]))
            .children(many(&[&[K::MatchArm]])),
        Entry::new(K::MatchArm)
            .field(Field::Pattern, one(&[PATTERNS]))
            .field(Field::Body, one(block_or_expression)),
        Entry::new(K::IfExpression)
            .field(Field::Condition, one(&[EXPRESSIONS]))
            .field(Field::Consequence, one(block_or_expression))
            .field(Field::Alternative, maybe(block_or_expression)),
        Entry::new(K::LambdaExpression)
            .field(Field::Parameters, one(&[&[K::ParameterList]]))
            .field(Field::ReturnType, maybe(&[TYPES]))
            .field(Field::Body, one(&[&[K::Block]])),
        Entry::new(K::GroupedExpression).children(one(&[EXPRESSIONS])),
        Entry::new(K::TupleExpression).children(some(&[EXPRESSIONS])),
        Entry::new(K::ArrayLiteral)
            .field(Field::Value, maybe(&[EXPRESSIONS]))
            .field(Field::Length, maybe(&[EXPRESSIONS]))
            .children(many(&[EXPRESSIONS])),
        Entry::new(K::StructLiteral)
            .field(Field::Name, one(&[struct_names]))
            .children(many(&[field_entries])),
        Entry::new(K::AnonymousStructLiteral)
            .children(many(&[&[K::FieldInitializer, K::FieldShorthand]])),
        Entry::new(K::FieldInitializer)
            .field(Field::Name, one(&[&[K::Identifier]]))
            .field(Field::Value, one(&[EXPRESSIONS])),
        Entry::new(K::FieldShorthand).children(one(&[&[K::Identifier]])),
        Entry::new(K::FunctionCall)
            .field(
                Field::Function,
                one(&[&[K::Identifier, K::MemberExpression]]),
            )
            .field(Field::Arguments, many(&[EXPRESSIONS])),
        Entry::new(K::MemberExpression)
            .field(Field::Object, one(&[EXPRESSIONS]))
            .field(
                Field::Property,
                one(&[&[K::Identifier, K::TypeIdentifier, K::NumberLiteral]]),
            ),
        Entry::new(K::IndexExpression)
            .field(Field::Object, one(&[EXPRESSIONS]))
            .field(Field::Index, one(&[EXPRESSIONS])),
        Entry::new(K::DereferenceExpression).field(Field::Object, one(&[EXPRESSIONS])),
        Entry::new(K::OptionalChainExpression)
            .field(Field::Object, one(&[EXPRESSIONS]))
            .field(
                Field::Property,
                one(&[&[K::Identifier, K::TypeIdentifier]]),
            ),
        Entry::new(K::WildcardPattern),
        Entry::new(K::IdentifierPattern).children(one(&[&[K::Identifier]])),
        Entry::new(K::VariantPattern)
            .field(Field::Type, maybe(&[&[K::TypeIdentifier]]))
            .field(Field::Name, one(&[&[K::TypeIdentifier]]))
            .children(many(&[PATTERNS])),
        Entry::new(K::ElsePattern),
        Entry::new(K::Identifier),
        Entry::new(K::TypeIdentifier),
        Entry::new(K::NumberLiteral),
        Entry::new(K::StringLiteral),
        Entry::new(K::CharLiteral),
        Entry::new(K::BooleanLiteral),
        Entry::new(K::NullLiteral),
    ];

    let mut node_types: Vec<NodeTypeInfo> = entries.into_iter().map(Entry::build).collect();

    for kind in TokenKind::ANONYMOUS {
        node_types.push(NodeTypeInfo {
            kind: NodeKind::Token(*kind),
            named: false,
            fields: BTreeMap::new(),
            children: None,
        });
    }

    node_types
}

lazy_static! {
    static ref NODE_TYPES: Vec<NodeTypeInfo> = create_node_types();
}

pub fn node_types() -> &'static [NodeTypeInfo] {
    &NODE_TYPES
}

pub fn node_type(kind: NodeKind) -> Option<&'static NodeTypeInfo> {
    NODE_TYPES.iter().find(|info| info.kind == kind)
}

pub fn node_types_json() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(node_types())
}

/// Validates `node` and everything below it against the schema.
///
/// `ERROR` nodes are accepted in any slot and their contents are not checked.
pub fn check_node(node: &Node) -> Result<(), SchemaError> {
    if node.is_error() || !node.kind.is_named() {
        return Ok(());
    }

    let parent = node.kind.name();
    let info = node_type(node.kind).ok_or(SchemaError::UnknownKind { kind: parent })?;

    let fields = node.fields();
    for (field, nodes) in &fields {
        let Some(slot) = info.fields.get(field.name()) else {
            return Err(SchemaError::UnknownField {
                parent,
                field: field.name(),
            });
        };
        check_slot(parent, field.name(), slot, nodes)?;
    }

    for (name, slot) in &info.fields {
        let present = fields.keys().any(|field| field.name() == *name);
        if slot.required && !present {
            return Err(SchemaError::Missing { parent, slot: *name });
        }
    }

    let children: Vec<&Node> = node
        .children
        .iter()
        .filter(|child| child.field.is_none() && child.node.kind.is_named())
        .map(|child| &child.node)
        .collect();

    match &info.children {
        Some(slot) => check_slot(parent, "children", slot, &children)?,
        None => {
            if let Some(found) = children.iter().find(|child| !child.is_error()) {
                return Err(SchemaError::UnexpectedType {
                    parent,
                    slot: "children",
                    found: found.kind.name(),
                });
            }
        }
    }

    for child in &node.children {
        check_node(&child.node)?;
    }

    Ok(())
}

fn check_slot(
    parent: &'static str,
    slot_name: &'static str,
    slot: &FieldInfo,
    nodes: &[&Node],
) -> Result<(), SchemaError> {
    if nodes.len() > 1 && !slot.multiple {
        return Err(SchemaError::Repeated {
            parent,
            slot: slot_name,
        });
    }

    if nodes.is_empty() && slot.required {
        return Err(SchemaError::Missing {
            parent,
            slot: slot_name,
        });
    }

    match nodes.iter().find(|node| !slot.allows(node.kind)) {
        Some(node) => Err(SchemaError::UnexpectedType {
            parent,
            slot: slot_name,
            found: node.kind.name(),
        }),
        None => Ok(()),
    }
}
