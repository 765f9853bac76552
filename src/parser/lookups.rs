use std::collections::HashMap;

use serde::Serialize;

use crate::{
    cst::node::Node,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{decl::*, expr::*, parser::Parser, stmt::*, types::create_token_type_lookups};

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Hash, Serialize)]
pub enum BindingPower {
    Default,
    Assignment,
    Coalesce,
    LogicalOr,
    LogicalAnd,
    Equality,
    Comparison,
    Range,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Additive,
    Multiplicative,
    Cast,
    Unary,
    Member,
    Primary,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize)]
pub enum Associativity {
    Left,
    Prefix,
    Postfix,
}

/// One row of the operator precedence table.
#[derive(Debug, Serialize)]
pub struct PrecedenceLevel {
    pub name: &'static str,
    pub binding_power: BindingPower,
    pub associativity: Associativity,
    pub operators: &'static [TokenKind],
}

/// Operator levels, lowest to highest. Assignment and cast bind outside the table.
pub const PRECEDENCE_TABLE: &[PrecedenceLevel] = &[
    PrecedenceLevel {
        name: "coalesce",
        binding_power: BindingPower::Coalesce,
        associativity: Associativity::Left,
        operators: &[TokenKind::QuestionQuestion],
    },
    PrecedenceLevel {
        name: "logical_or",
        binding_power: BindingPower::LogicalOr,
        associativity: Associativity::Left,
        operators: &[TokenKind::Or],
    },
    PrecedenceLevel {
        name: "logical_and",
        binding_power: BindingPower::LogicalAnd,
        associativity: Associativity::Left,
        operators: &[TokenKind::And],
    },
    PrecedenceLevel {
        name: "equality",
        binding_power: BindingPower::Equality,
        associativity: Associativity::Left,
        operators: &[TokenKind::Equals, TokenKind::NotEquals],
    },
    PrecedenceLevel {
        name: "comparison",
        binding_power: BindingPower::Comparison,
        associativity: Associativity::Left,
        operators: &[
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::LessEquals,
            TokenKind::GreaterEquals,
        ],
    },
    PrecedenceLevel {
        name: "range",
        binding_power: BindingPower::Range,
        associativity: Associativity::Left,
        operators: &[TokenKind::DotDot],
    },
    PrecedenceLevel {
        name: "bitwise_or",
        binding_power: BindingPower::BitwiseOr,
        associativity: Associativity::Left,
        operators: &[TokenKind::Pipe],
    },
    PrecedenceLevel {
        name: "bitwise_xor",
        binding_power: BindingPower::BitwiseXor,
        associativity: Associativity::Left,
        operators: &[TokenKind::Caret],
    },
    PrecedenceLevel {
        name: "bitwise_and",
        binding_power: BindingPower::BitwiseAnd,
        associativity: Associativity::Left,
        operators: &[TokenKind::Ampersand],
    },
    PrecedenceLevel {
        name: "additive",
        binding_power: BindingPower::Additive,
        associativity: Associativity::Left,
        operators: &[TokenKind::Plus, TokenKind::Dash],
    },
    PrecedenceLevel {
        name: "multiplicative",
        binding_power: BindingPower::Multiplicative,
        associativity: Associativity::Left,
        operators: &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
    },
    PrecedenceLevel {
        name: "unary",
        binding_power: BindingPower::Unary,
        associativity: Associativity::Prefix,
        operators: &[TokenKind::Dash, TokenKind::Not, TokenKind::Ampersand],
    },
    PrecedenceLevel {
        name: "member",
        binding_power: BindingPower::Member,
        associativity: Associativity::Postfix,
        operators: &[
            TokenKind::Dot,
            TokenKind::QuestionDot,
            TokenKind::OpenBracket,
            TokenKind::OpenParen,
            TokenKind::Match,
        ],
    },
];

/// Level names the parser relies on, in the order they must appear.
pub const REQUIRED_LEVELS: &[&str] = &[
    "coalesce",
    "logical_or",
    "logical_and",
    "equality",
    "comparison",
    "range",
    "bitwise_or",
    "bitwise_xor",
    "bitwise_and",
    "additive",
    "multiplicative",
    "unary",
    "member",
];

/// Checks that every required level is present, in order, with strictly
/// increasing binding powers.
pub fn validate_precedence_table(table: &[PrecedenceLevel]) -> Result<(), Error> {
    let mut previous: Option<&PrecedenceLevel> = None;

    for name in REQUIRED_LEVELS {
        let Some(level) = table.iter().find(|level| level.name == *name) else {
            return Err(Error::new(
                ErrorImpl::MissingPrecedenceLevel {
                    level: String::from(*name),
                },
                Default::default(),
            ));
        };

        if let Some(previous) = previous {
            if previous.binding_power >= level.binding_power {
                return Err(Error::internal(format!(
                    "precedence level `{}` does not bind tighter than `{}`",
                    level.name, previous.name
                )));
            }
        }

        previous = Some(level);
    }

    Ok(())
}

pub type ItemHandler = fn(&mut Parser, Vec<Node>) -> Result<Node, Error>;
pub type StmtHandler = fn(&mut Parser) -> Result<Node, Error>;
pub type NUDHandler = fn(&mut Parser) -> Result<Node, Error>;
pub type LEDHandler = fn(&mut Parser, Node, BindingPower) -> Result<Node, Error>;
pub type TypeNUDHandler = fn(&mut Parser) -> Result<Node, Error>;
pub type TypeLEDHandler = fn(&mut Parser, Node, BindingPower) -> Result<Node, Error>;

pub type ItemLookup = HashMap<TokenKind, ItemHandler>;
pub type StmtLookup = HashMap<TokenKind, StmtHandler>;
pub type NUDLookup = HashMap<TokenKind, NUDHandler>;
pub type LEDLookup = HashMap<TokenKind, LEDHandler>;
pub type BPLookup = HashMap<TokenKind, BindingPower>;
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;
pub type TypeLEDLookup = HashMap<TokenKind, TypeLEDHandler>;
pub type TypeBPLookup = HashMap<TokenKind, BindingPower>;

/// Handler tables, built once and shared by every parse.
#[derive(Default)]
pub struct Lookups {
    pub item: ItemLookup,
    pub stmt: StmtLookup,
    pub nud: NUDLookup,
    pub led: LEDLookup,
    pub bp: BPLookup,
    pub type_nud: TypeNUDLookup,
    pub type_led: TypeLEDLookup,
    pub type_bp: TypeBPLookup,
}

impl Lookups {
    pub fn led(&mut self, kind: TokenKind, bp: BindingPower, led_fn: LEDHandler) {
        self.bp.insert(kind, bp);
        self.led.insert(kind, led_fn);
    }

    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud.insert(kind, nud_fn);
    }

    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt.insert(kind, stmt_fn);
    }

    pub fn item(&mut self, kind: TokenKind, item_fn: ItemHandler) {
        self.item.insert(kind, item_fn);
    }

    pub fn type_led(&mut self, kind: TokenKind, bp: BindingPower, led_fn: TypeLEDHandler) {
        self.type_bp.insert(kind, bp);
        self.type_led.insert(kind, led_fn);
    }

    pub fn type_nud(&mut self, kind: TokenKind, nud_fn: TypeNUDHandler) {
        self.type_nud.insert(kind, nud_fn);
    }
}

fn missing_handler(level: &PrecedenceLevel, kind: TokenKind) -> Error {
    Error::internal(format!(
        "operator `{}` at precedence level `{}` has no handler",
        kind, level.name
    ))
}

pub fn create_token_lookups() -> Result<Lookups, Error> {
    validate_precedence_table(PRECEDENCE_TABLE)?;

    let mut lookups = Lookups::default();

    // Operators from the precedence table
    for level in PRECEDENCE_TABLE {
        for &kind in level.operators {
            match level.associativity {
                Associativity::Prefix => lookups.nud(kind, parse_unary_expr),
                Associativity::Left => {
                    let led_fn: LEDHandler = match kind {
                        TokenKind::DotDot => parse_range_expr,
                        _ => parse_binary_expr,
                    };
                    lookups.led(kind, level.binding_power, led_fn);
                }
                Associativity::Postfix => {
                    let led_fn: LEDHandler = match kind {
                        TokenKind::Dot => parse_member_expr,
                        TokenKind::QuestionDot => parse_optional_chain_expr,
                        TokenKind::OpenBracket => parse_index_expr,
                        TokenKind::OpenParen => parse_call_expr,
                        TokenKind::Match => parse_match_expr,
                        _ => return Err(missing_handler(level, kind)),
                    };
                    lookups.led(kind, level.binding_power, led_fn);
                }
            }
        }
    }

    // Assignment and cast
    lookups.led(TokenKind::Assignment, BindingPower::Assignment, parse_assignment_expr);
    lookups.led(TokenKind::PlusEquals, BindingPower::Assignment, parse_assignment_expr);
    lookups.led(TokenKind::As, BindingPower::Cast, parse_cast_expr);

    // Literals and symbols
    lookups.nud(TokenKind::Number, parse_primary_expr);
    lookups.nud(TokenKind::String, parse_primary_expr);
    lookups.nud(TokenKind::Char, parse_primary_expr);
    lookups.nud(TokenKind::ByteChar, parse_primary_expr);
    lookups.nud(TokenKind::True, parse_primary_expr);
    lookups.nud(TokenKind::False, parse_primary_expr);
    lookups.nud(TokenKind::Null, parse_primary_expr);
    lookups.nud(TokenKind::Identifier, parse_primary_expr);
    lookups.nud(TokenKind::TypeIdentifier, parse_type_identifier_expr);
    lookups.nud(TokenKind::OpenParen, parse_grouping_expr);
    lookups.nud(TokenKind::OpenBracket, parse_array_literal_expr);
    lookups.nud(TokenKind::Dot, parse_anonymous_struct_expr);
    lookups.nud(TokenKind::If, parse_if_expr);
    lookups.nud(TokenKind::Fn, parse_lambda_expr);

    // Statements
    lookups.stmt(TokenKind::Let, parse_var_decl_stmt);
    lookups.stmt(TokenKind::Const, parse_var_decl_stmt);
    lookups.stmt(TokenKind::Return, parse_return_stmt);
    lookups.stmt(TokenKind::Defer, parse_defer_stmt);
    lookups.stmt(TokenKind::If, parse_if_stmt);
    lookups.stmt(TokenKind::For, parse_for_stmt);
    lookups.stmt(TokenKind::Loop, parse_loop_stmt);
    lookups.stmt(TokenKind::Break, parse_jump_stmt);
    lookups.stmt(TokenKind::Continue, parse_jump_stmt);

    // Items
    lookups.item(TokenKind::Fn, parse_fn_decl);
    lookups.item(TokenKind::Struct, parse_struct_decl);
    lookups.item(TokenKind::Enum, parse_enum_decl);
    lookups.item(TokenKind::Const, parse_const_decl);
    lookups.item(TokenKind::Import, parse_import_decl);
    lookups.item(TokenKind::Test, parse_test_decl);

    create_token_type_lookups(&mut lookups);

    Ok(lookups)
}
