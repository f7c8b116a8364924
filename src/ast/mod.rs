pub mod printer;

use serde::Serialize;

use crate::scanner::token::TokenId;

/// Shape tag of a syntax node. The tag fixes the child layout:
///
/// - `Program`, `Block`: any number of statements
/// - `Assign`: `[Identifier, Operator("="), expr]`
/// - `If`: `[cond, Block]` or `[cond, Block, Block]`
/// - `While`: `[cond, Block]`
/// - `For`: `[init, cond, step, Block]`
/// - `Arithmetic`, `Relational`, `Logical`: `[operand, Operator, operand, ...]`
/// - `Negation`: `[Operator("!"), operand]`
/// - `Number`, `Float`, `String`, `Identifier`, `Operator`: leaves carrying `literal`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Program,
    Block,
    Assign,
    If,
    While,
    For,
    Arithmetic,
    Relational,
    Logical,
    Negation,
    Number,
    Float,
    String,
    Identifier,
    Operator,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub literal: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyntaxNode>,
    /// Index of the originating token, for diagnostics only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenId>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, token: Option<TokenId>) -> Self {
        Self {
            kind,
            literal: String::new(),
            children: Vec::new(),
            token,
        }
    }

    pub fn leaf(kind: NodeKind, literal: impl Into<String>, token: TokenId) -> Self {
        Self {
            kind,
            literal: literal.into(),
            children: Vec::new(),
            token: Some(token),
        }
    }

    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }

    pub fn push(&mut self, child: SyntaxNode) {
        self.children.push(child);
    }
}

/// Infix operators, grouped into precedence tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::EnumString)]
pub enum BinaryOp {
    #[strum(serialize = "||")]
    Or,
    #[strum(serialize = "&&")]
    And,
    #[strum(serialize = "==")]
    Equal,
    #[strum(serialize = "!=")]
    NotEqual,
    #[strum(serialize = "<")]
    Less,
    #[strum(serialize = "<=")]
    LessEqual,
    #[strum(serialize = ">")]
    Greater,
    #[strum(serialize = ">=")]
    GreaterEqual,
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    #[strum(serialize = "%")]
    Modulo,
}

impl BinaryOp {
    /// Loosest binding tier.
    pub const MIN_PRECEDENCE: u8 = 1;
    /// Tightest binding tier.
    pub const MAX_PRECEDENCE: u8 = 5;

    pub fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Equal
            | Self::NotEqual
            | Self::Less
            | Self::LessEqual
            | Self::Greater
            | Self::GreaterEqual => 3,
            Self::Add | Self::Subtract => 4,
            Self::Multiply | Self::Divide | Self::Modulo => 5,
        }
    }

    /// Node kind built for a chain of operators of this tier.
    pub fn node_kind(self) -> NodeKind {
        match self.precedence() {
            1 | 2 => NodeKind::Logical,
            3 => NodeKind::Relational,
            _ => NodeKind::Arithmetic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_round_trip_through_text() {
        for text in ["||", "&&", "==", "!=", "<", "<=", ">", ">=", "+", "-", "*", "/", "%"] {
            let op: BinaryOp = text.parse().expect("known operator");
            assert_eq!(op.to_string(), text);
        }
        assert!("=".parse::<BinaryOp>().is_err());
        assert!("!".parse::<BinaryOp>().is_err());
    }

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        assert!(BinaryOp::Multiply.precedence() > BinaryOp::Add.precedence());
        assert!(BinaryOp::Add.precedence() > BinaryOp::Less.precedence());
        assert!(BinaryOp::Less.precedence() > BinaryOp::And.precedence());
        assert!(BinaryOp::And.precedence() > BinaryOp::Or.precedence());
    }

    #[test]
    fn tiers_map_to_node_kinds() {
        assert_eq!(BinaryOp::Or.node_kind(), NodeKind::Logical);
        assert_eq!(BinaryOp::GreaterEqual.node_kind(), NodeKind::Relational);
        assert_eq!(BinaryOp::Modulo.node_kind(), NodeKind::Arithmetic);
    }

    #[test]
    fn kind_displays_as_tag() {
        assert_eq!(NodeKind::Program.to_string(), "PROGRAM");
        assert_eq!(NodeKind::Negation.to_string(), "NEGATION");
    }
}
