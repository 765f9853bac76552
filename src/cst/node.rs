use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::{
    errors::errors::Error,
    lexer::tokens::{Token, TokenKind},
    Span,
};

/// Every kind of node the parser can produce.
///
/// Named kinds carry meaning for downstream tooling. Punctuation and keywords
/// become `Token` leaves, named after their text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    SourceFile,
    ImportDeclaration,
    ModulePath,
    VisibilityModifier,
    Directive,
    FunctionDefinition,
    ParameterList,
    Parameter,
    StructDefinition,
    StructBody,
    StructField,
    EnumDefinition,
    EnumBody,
    EnumVariant,
    VariantParameters,
    GenericParameters,
    GenericArguments,
    ConstDeclaration,
    TestBlock,

    // Types
    PrimitiveType,
    GenericTypeParameter,
    ReferenceType,
    OptionalType,
    SliceType,
    ArrayType,
    FunctionType,
    TupleType,
    NamedType,

    // Statements
    Block,
    LetStatement,
    ConstStatement,
    ReturnStatement,
    DeferStatement,
    IfStatement,
    ForStatement,
    LoopStatement,
    BreakStatement,
    ContinueStatement,
    ExpressionStatement,

    // Expressions
    AssignmentExpression,
    BinaryExpression,
    UnaryExpression,
    CastExpression,
    MatchExpression,
    MatchArm,
    IfExpression,
    LambdaExpression,
    GroupedExpression,
    TupleExpression,
    ArrayLiteral,
    StructLiteral,
    AnonymousStructLiteral,
    FieldInitializer,
    FieldShorthand,
    FunctionCall,
    MemberExpression,
    IndexExpression,
    DereferenceExpression,
    OptionalChainExpression,

    // Patterns
    WildcardPattern,
    IdentifierPattern,
    VariantPattern,
    ElsePattern,

    // Leaves
    Identifier,
    TypeIdentifier,
    NumberLiteral,
    StringLiteral,
    CharLiteral,
    BooleanLiteral,
    NullLiteral,

    Error,
    Token(TokenKind),
}

impl NodeKind {
    /// All named kinds, in schema order.
    pub const NAMED: &'static [NodeKind] = &[
        NodeKind::SourceFile,
        NodeKind::ImportDeclaration,
        NodeKind::ModulePath,
        NodeKind::VisibilityModifier,
        NodeKind::Directive,
        NodeKind::FunctionDefinition,
        NodeKind::ParameterList,
        NodeKind::Parameter,
        NodeKind::StructDefinition,
        NodeKind::StructBody,
        NodeKind::StructField,
        NodeKind::EnumDefinition,
        NodeKind::EnumBody,
        NodeKind::EnumVariant,
        NodeKind::VariantParameters,
        NodeKind::GenericParameters,
        NodeKind::GenericArguments,
        NodeKind::ConstDeclaration,
        NodeKind::TestBlock,
        NodeKind::PrimitiveType,
        NodeKind::GenericTypeParameter,
        NodeKind::ReferenceType,
        NodeKind::OptionalType,
        NodeKind::SliceType,
        NodeKind::ArrayType,
        NodeKind::FunctionType,
        NodeKind::TupleType,
        NodeKind::NamedType,
        NodeKind::Block,
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
        NodeKind::AssignmentExpression,
        NodeKind::BinaryExpression,
        NodeKind::UnaryExpression,
        NodeKind::CastExpression,
        NodeKind::MatchExpression,
        NodeKind::MatchArm,
        NodeKind::IfExpression,
        NodeKind::LambdaExpression,
        NodeKind::GroupedExpression,
        NodeKind::TupleExpression,
        NodeKind::ArrayLiteral,
        NodeKind::StructLiteral,
        NodeKind::AnonymousStructLiteral,
        NodeKind::FieldInitializer,
        NodeKind::FieldShorthand,
        NodeKind::FunctionCall,
        NodeKind::MemberExpression,
        NodeKind::IndexExpression,
        NodeKind::DereferenceExpression,
        NodeKind::OptionalChainExpression,
        NodeKind::WildcardPattern,
        NodeKind::IdentifierPattern,
        NodeKind::VariantPattern,
        NodeKind::ElsePattern,
        NodeKind::Identifier,
        NodeKind::TypeIdentifier,
        NodeKind::NumberLiteral,
        NodeKind::StringLiteral,
        NodeKind::CharLiteral,
        NodeKind::BooleanLiteral,
        NodeKind::NullLiteral,
        NodeKind::Error,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::SourceFile => "source_file",
            NodeKind::ImportDeclaration => "import_declaration",
            NodeKind::ModulePath => "module_path",
            NodeKind::VisibilityModifier => "visibility_modifier",
            NodeKind::Directive => "directive",
            NodeKind::FunctionDefinition => "function_definition",
            NodeKind::ParameterList => "parameter_list",
            NodeKind::Parameter => "parameter",
            NodeKind::StructDefinition => "struct_definition",
            NodeKind::StructBody => "struct_body",
            NodeKind::StructField => "struct_field",
            NodeKind::EnumDefinition => "enum_definition",
            NodeKind::EnumBody => "enum_body",
            NodeKind::EnumVariant => "enum_variant",
            NodeKind::VariantParameters => "variant_parameters",
            NodeKind::GenericParameters => "generic_parameters",
            NodeKind::GenericArguments => "generic_arguments",
            NodeKind::ConstDeclaration => "const_declaration",
            NodeKind::TestBlock => "test_block",
            NodeKind::PrimitiveType => "primitive_type",
            NodeKind::GenericTypeParameter => "generic_type_parameter",
            NodeKind::ReferenceType => "reference_type",
            NodeKind::OptionalType => "optional_type",
            NodeKind::SliceType => "slice_type",
            NodeKind::ArrayType => "array_type",
            NodeKind::FunctionType => "function_type",
            NodeKind::TupleType => "tuple_type",
            NodeKind::NamedType => "named_type",
            NodeKind::Block => "block",
            NodeKind::LetStatement => "let_statement",
            NodeKind::ConstStatement => "const_statement",
            NodeKind::ReturnStatement => "return_statement",
            NodeKind::DeferStatement => "defer_statement",
            NodeKind::IfStatement => "if_statement",
            NodeKind::ForStatement => "for_statement",
            NodeKind::LoopStatement => "loop_statement",
            NodeKind::BreakStatement => "break_statement",
            NodeKind::ContinueStatement => "continue_statement",
            NodeKind::ExpressionStatement => "expression_statement",
            NodeKind::AssignmentExpression => "assignment_expression",
            NodeKind::BinaryExpression => "binary_expression",
            NodeKind::UnaryExpression => "unary_expression",
            NodeKind::CastExpression => "cast_expression",
            NodeKind::MatchExpression => "match_expression",
            NodeKind::MatchArm => "match_arm",
            NodeKind::IfExpression => "if_expression",
            NodeKind::LambdaExpression => "lambda_expression",
            NodeKind::GroupedExpression => "grouped_expression",
            NodeKind::TupleExpression => "tuple_expression",
            NodeKind::ArrayLiteral => "array_literal",
            NodeKind::StructLiteral => "struct_literal",
            NodeKind::AnonymousStructLiteral => "anonymous_struct_literal",
            NodeKind::FieldInitializer => "field_initializer",
            NodeKind::FieldShorthand => "field_shorthand",
            NodeKind::FunctionCall => "function_call",
            NodeKind::MemberExpression => "member_expression",
            NodeKind::IndexExpression => "index_expression",
            NodeKind::DereferenceExpression => "dereference_expression",
            NodeKind::OptionalChainExpression => "optional_chain_expression",
            NodeKind::WildcardPattern => "wildcard_pattern",
            NodeKind::IdentifierPattern => "identifier_pattern",
            NodeKind::VariantPattern => "variant_pattern",
            NodeKind::ElsePattern => "else_pattern",
            NodeKind::Identifier => "identifier",
            NodeKind::TypeIdentifier => "type_identifier",
            NodeKind::NumberLiteral => "number_literal",
            NodeKind::StringLiteral => "string_literal",
            NodeKind::CharLiteral => "char_literal",
            NodeKind::BooleanLiteral => "boolean_literal",
            NodeKind::NullLiteral => "null_literal",
            NodeKind::Error => "ERROR",
            NodeKind::Token(kind) => kind.as_str(),
        }
    }

    pub fn is_named(&self) -> bool {
        !matches!(self, NodeKind::Token(_))
    }
}

impl Serialize for NodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Named slots a child can occupy within its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Parameters,
    ReturnType,
    Body,
    Condition,
    Consequence,
    Alternative,
    Pattern,
    Iterable,
    Value,
    Operator,
    Left,
    Right,
    Function,
    Scrutinee,
    Type,
    Arguments,
    Object,
    Property,
    Index,
    Operand,
    Path,
    Length,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Parameters => "parameters",
            Field::ReturnType => "return_type",
            Field::Body => "body",
            Field::Condition => "condition",
            Field::Consequence => "consequence",
            Field::Alternative => "alternative",
            Field::Pattern => "pattern",
            Field::Iterable => "iterable",
            Field::Value => "value",
            Field::Operator => "operator",
            Field::Left => "left",
            Field::Right => "right",
            Field::Function => "function",
            Field::Scrutinee => "scrutinee",
            Field::Type => "type",
            Field::Arguments => "arguments",
            Field::Object => "object",
            Field::Property => "property",
            Field::Index => "index",
            Field::Operand => "operand",
            Field::Path => "path",
            Field::Length => "length",
        }
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Child {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    pub node: Node,
}

/// A node of the concrete syntax tree.
///
/// Every token of the input is a leaf somewhere below the root, so the
/// source can be rebuilt from the leaves alone. Error nodes carry the
/// diagnostic that caused them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Child>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Box<Error>>,
}

impl Node {
    pub fn leaf(kind: NodeKind, span: Span) -> Self {
        Node {
            kind,
            span,
            children: vec![],
            diagnostic: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_error(&self) -> bool {
        self.kind == NodeKind::Error
    }

    /// Whether this node or anything below it is an error.
    pub fn has_error(&self) -> bool {
        self.is_error()
            || self.diagnostic.is_some()
            || self.children.iter().any(|child| child.node.has_error())
    }

    pub fn child_by_field(&self, field: Field) -> Option<&Node> {
        self.children
            .iter()
            .find(|child| child.field == Some(field))
            .map(|child| &child.node)
    }

    pub fn children_by_field(&self, field: Field) -> Vec<&Node> {
        self.children
            .iter()
            .filter(|child| child.field == Some(field))
            .map(|child| &child.node)
            .collect()
    }

    pub fn fields(&self) -> BTreeMap<Field, Vec<&Node>> {
        let mut fields: BTreeMap<Field, Vec<&Node>> = BTreeMap::new();
        for child in &self.children {
            if let Some(field) = child.field {
                fields.entry(field).or_default().push(&child.node);
            }
        }
        fields
    }

    pub fn named_children(&self) -> impl Iterator<Item = &Node> {
        self.children
            .iter()
            .map(|child| &child.node)
            .filter(|node| node.kind.is_named())
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.text(source)
    }

    /// Pre-order walk over this node and all of its descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in &self.children {
            child.node.walk(visit);
        }
    }

    /// Leaves in source order.
    pub fn leaves(&self) -> Vec<&Node> {
        let mut leaves = vec![];
        self.walk(&mut |node| {
            if node.is_leaf() {
                leaves.push(node);
            }
        });
        leaves
    }

    /// Moves this subtree by `delta` bytes, diagnostics included.
    pub fn shift(&mut self, delta: i64) {
        if delta == 0 {
            return;
        }

        self.span = self.span.shifted(delta);
        if let Some(diagnostic) = &mut self.diagnostic {
            **diagnostic = diagnostic.shifted(delta);
        }
        for child in &mut self.children {
            child.node.shift(delta);
        }
    }

    /// Renders the named structure in tree-sitter's S-expression style:
    /// `(binary_expression left: (number_literal) right: (identifier))`.
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        self.write_sexp(&mut out);
        out
    }

    fn write_sexp(&self, out: &mut String) {
        out.push('(');
        out.push_str(self.kind.name());

        for child in &self.children {
            if !child.node.kind.is_named() {
                continue;
            }

            out.push(' ');
            if let Some(field) = child.field {
                out.push_str(field.name());
                out.push_str(": ");
            }
            child.node.write_sexp(out);
        }

        out.push(')');
    }
}

/// Collects the children of a node under construction.
///
/// The node's span runs from its first child to its last; a node with no
/// children is empty at the position it was started at.
pub struct NodeBuilder {
    kind: NodeKind,
    start: u32,
    children: Vec<Child>,
    diagnostic: Option<Box<Error>>,
}

impl NodeBuilder {
    pub fn new(kind: NodeKind, start: u32) -> Self {
        NodeBuilder {
            kind,
            start,
            children: vec![],
            diagnostic: None,
        }
    }

    pub fn set_kind(&mut self, kind: NodeKind) {
        self.kind = kind;
    }

    /// Appends a token as an unfielded leaf.
    pub fn token(&mut self, token: &Token) -> &mut Self {
        self.push(leaf_for_token(token))
    }

    pub fn push(&mut self, node: Node) -> &mut Self {
        self.children.push(Child { field: None, node });
        self
    }

    pub fn field(&mut self, field: Field, node: Node) -> &mut Self {
        self.children.push(Child {
            field: Some(field),
            node,
        });
        self
    }

    pub fn diagnostic(&mut self, error: Error) -> &mut Self {
        self.diagnostic = Some(Box::new(error));
        self
    }

    pub fn finish(self) -> Node {
        let span = match (self.children.first(), self.children.last()) {
            (Some(first), Some(last)) => Span {
                start: first.node.span.start,
                end: last.node.span.end,
            },
            _ => Span::empty_at(self.start),
        };

        Node {
            kind: self.kind,
            span,
            children: self.children,
            diagnostic: self.diagnostic,
        }
    }
}

/// Kind of the leaf a token of `kind` becomes when no production renames it.
pub fn leaf_kind_for(kind: TokenKind) -> NodeKind {
    match kind {
        TokenKind::Identifier => NodeKind::Identifier,
        TokenKind::TypeIdentifier => NodeKind::TypeIdentifier,
        TokenKind::Number => NodeKind::NumberLiteral,
        TokenKind::String => NodeKind::StringLiteral,
        TokenKind::Char | TokenKind::ByteChar => NodeKind::CharLiteral,
        TokenKind::Directive => NodeKind::Directive,
        TokenKind::True | TokenKind::False => NodeKind::BooleanLiteral,
        TokenKind::Null => NodeKind::NullLiteral,
        TokenKind::Primitive => NodeKind::PrimitiveType,
        TokenKind::Pub => NodeKind::VisibilityModifier,
        TokenKind::Underscore => NodeKind::WildcardPattern,
        TokenKind::Break => NodeKind::BreakStatement,
        TokenKind::Continue => NodeKind::ContinueStatement,
        TokenKind::Error(_) => NodeKind::Error,
        other => NodeKind::Token(other),
    }
}

/// Builds the leaf for `token`. Lex error tokens become error leaves
/// carrying their diagnostic.
pub fn leaf_for_token(token: &Token) -> Node {
    let mut node = Node::leaf(leaf_kind_for(token.kind), token.span);
    if let TokenKind::Error(lex_error) = token.kind {
        node.diagnostic = Some(Box::new(Error::from_lex_token(lex_error, token)));
    }
    node
}
