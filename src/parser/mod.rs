use tracing::trace;

use crate::ast::{BinaryOp, NodeKind, SyntaxNode};
use crate::error::CompileError;
use crate::scanner::token::{Keyword, Token, TokenId, TokenKind};

/// Recursive-descent parser over a scanned token slice.
///
/// Statements are chosen by the current token alone; the only two-token peek
/// is `identifier '='`, which separates an assignment from an expression
/// statement. Binary operators are parsed by precedence climbing over the
/// tiers defined in [`BinaryOp::precedence`]: each tier folds a left-to-right
/// chain of operands from the next tighter tier into one node.
pub struct Parser<'t> {
    tokens: &'t [Token],
    current: usize,
    depth: usize,
}

/// Deepest nesting of parentheses, `!` and blocks a program may use.
pub const MAX_NESTING: usize = 48;

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            current: 0,
            depth: 0,
        }
    }

    pub fn parse(mut self) -> Result<SyntaxNode, CompileError> {
        let mut program = SyntaxNode::new(NodeKind::Program, None);
        while let Some(token) = self.peek() {
            if !starts_statement(token) {
                return Err(CompileError::trailing_input(token));
            }
            program.push(self.statement()?);
        }
        tracing::debug!(statements = program.children.len(), "parse complete");
        Ok(program)
    }

    fn statement(&mut self) -> Result<SyntaxNode, CompileError> {
        if self.check_keyword(Keyword::Si) {
            self.if_statement()
        } else if self.check_keyword(Keyword::Mientras) {
            self.while_statement()
        } else if self.check_keyword(Keyword::Para) {
            self.for_statement()
        } else {
            self.expression_statement()
        }
    }

    fn if_statement(&mut self) -> Result<SyntaxNode, CompileError> {
        let keyword = self.advance(); // consume 'si'
        self.consume("(", "'(' after 'si'")?;
        let condition = self.expression()?;
        self.consume(")", "')' after condition")?;
        let then_block = self.block()?;

        let mut node = SyntaxNode::new(NodeKind::If, Some(keyword))
            .with_children(vec![condition, then_block]);
        if self.check_keyword(Keyword::Sino) {
            self.advance();
            node.push(self.block()?);
        }
        Ok(node)
    }

    fn while_statement(&mut self) -> Result<SyntaxNode, CompileError> {
        let keyword = self.advance(); // consume 'mientras'
        self.consume("(", "'(' after 'mientras'")?;
        let condition = self.expression()?;
        self.consume(")", "')' after condition")?;
        let body = self.block()?;
        Ok(SyntaxNode::new(NodeKind::While, Some(keyword))
            .with_children(vec![condition, body]))
    }

    fn for_statement(&mut self) -> Result<SyntaxNode, CompileError> {
        let keyword = self.advance(); // consume 'para'
        self.consume("(", "'(' after 'para'")?;
        let initializer = self.expression_statement()?;
        self.consume(";", "';' after loop initializer")?;
        let condition = self.expression()?;
        self.consume(";", "';' after loop condition")?;
        let increment = self.expression_statement()?;
        self.consume(")", "')' after loop increment")?;
        let body = self.block()?;
        Ok(SyntaxNode::new(NodeKind::For, Some(keyword)).with_children(vec![
            initializer,
            condition,
            increment,
            body,
        ]))
    }

    fn block(&mut self) -> Result<SyntaxNode, CompileError> {
        let open = self.consume("{", "'{'")?;
        self.nested(|p| {
            let mut block = SyntaxNode::new(NodeKind::Block, Some(open));
            while p.peek().is_some() && !p.check_operator("}") {
                block.push(p.statement()?);
            }
            p.consume("}", "'}' to close block")?;
            Ok(block)
        })
    }

    fn expression_statement(&mut self) -> Result<SyntaxNode, CompileError> {
        let is_assignment = matches!(self.peek(), Some(t) if t.kind == TokenKind::Identifier)
            && self.peek_next().is_some_and(|t| t.is_operator("="));
        if !is_assignment {
            return self.expression();
        }

        let name = self.advance();
        let equals = self.advance();
        let value = self.expression()?;
        Ok(
            SyntaxNode::new(NodeKind::Assign, Some(name)).with_children(vec![
                self.leaf(NodeKind::Identifier, name),
                self.leaf(NodeKind::Operator, equals),
                value,
            ]),
        )
    }

    fn expression(&mut self) -> Result<SyntaxNode, CompileError> {
        self.binary(BinaryOp::MIN_PRECEDENCE)
    }

    /// Parse a chain of operators of exactly `precedence`, whose operands
    /// come from the next tighter tier.
    fn binary(&mut self, precedence: u8) -> Result<SyntaxNode, CompileError> {
        if precedence > BinaryOp::MAX_PRECEDENCE {
            return self.unary();
        }

        let first = self.binary(precedence + 1)?;
        let Some((op, mut index)) = self.match_binary_op(precedence) else {
            return Ok(first);
        };

        let mut node = SyntaxNode::new(op.node_kind(), Some(index)).with_children(vec![first]);
        loop {
            node.push(self.leaf(NodeKind::Operator, index));
            node.push(self.binary(precedence + 1)?);
            match self.match_binary_op(precedence) {
                Some((_, next)) => index = next,
                None => break,
            }
        }
        Ok(node)
    }

    fn unary(&mut self) -> Result<SyntaxNode, CompileError> {
        if self.check_operator("!") {
            let bang = self.advance();
            let operand = self.nested(Self::unary)?;
            return Ok(
                SyntaxNode::new(NodeKind::Negation, Some(bang))
                    .with_children(vec![self.leaf(NodeKind::Operator, bang), operand]),
            );
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<SyntaxNode, CompileError> {
        let Some(token) = self.peek() else {
            return Err(CompileError::unexpected_token(
                "an expression",
                "end of input",
                self.anchor(),
            ));
        };

        let kind = match token.kind {
            TokenKind::Number => NodeKind::Number,
            TokenKind::Float => NodeKind::Float,
            TokenKind::String => NodeKind::String,
            TokenKind::Identifier => NodeKind::Identifier,
            TokenKind::Operator if token.lexeme == "(" => {
                self.advance();
                return self.nested(|p| {
                    let inner = p.expression()?;
                    p.consume(")", "')' after expression")?;
                    Ok(inner)
                });
            }
            TokenKind::Operator | TokenKind::Keyword => {
                return Err(CompileError::unexpected_token(
                    "an expression",
                    describe(token),
                    self.anchor(),
                ));
            }
        };
        let index = self.advance();
        Ok(self.leaf(kind, index))
    }

    // --- Helper methods ---

    /// Run `parse` one nesting level deeper, failing once the level would
    /// pass [`MAX_NESTING`].
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, CompileError>,
    ) -> Result<T, CompileError> {
        if self.depth >= MAX_NESTING {
            let found = self.peek().map_or_else(|| "end of input".to_string(), describe);
            return Err(CompileError::unexpected_token(
                "a shallower nesting",
                found,
                self.anchor(),
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn leaf(&self, kind: NodeKind, index: TokenId) -> SyntaxNode {
        SyntaxNode::leaf(kind, self.tokens[index].lexeme.as_str(), index)
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.current)
    }

    fn peek_next(&self) -> Option<&'t Token> {
        self.tokens.get(self.current + 1)
    }

    /// Consume the current token and return its index. Callers check that a
    /// token is present first.
    fn advance(&mut self) -> TokenId {
        let index = self.current;
        if let Some(token) = self.tokens.get(index) {
            trace!(pos = index, lexeme = %token.lexeme, "advance");
            self.current += 1;
        }
        index
    }

    fn check_operator(&self, text: &str) -> bool {
        self.peek().is_some_and(|t| t.is_operator(text))
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek().is_some_and(|t| t.is_keyword(keyword))
    }

    fn match_binary_op(&mut self, precedence: u8) -> Option<(BinaryOp, TokenId)> {
        let token = self.peek()?;
        if token.kind != TokenKind::Operator {
            return None;
        }
        let op: BinaryOp = token.lexeme.parse().ok()?;
        if op.precedence() != precedence {
            return None;
        }
        Some((op, self.advance()))
    }

    fn consume(&mut self, text: &str, expected: &str) -> Result<TokenId, CompileError> {
        if self.check_operator(text) {
            Ok(self.advance())
        } else {
            let found = self.peek().map_or_else(|| "end of input".to_string(), describe);
            Err(CompileError::unexpected_token(expected, found, self.anchor()))
        }
    }

    /// Last consumed token, or the current one when nothing was consumed yet.
    fn anchor(&self) -> Option<&'t Token> {
        self.current
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .or_else(|| self.peek())
    }
}

/// Tokens that may begin a statement.
fn starts_statement(token: &Token) -> bool {
    match token.kind {
        TokenKind::Number | TokenKind::Float | TokenKind::String | TokenKind::Identifier => true,
        TokenKind::Keyword => !token.is_keyword(Keyword::Sino),
        TokenKind::Operator => token.lexeme == "(" || token.lexeme == "!",
    }
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::String => format!("string {:?}", token.lexeme),
        _ => format!("'{}'", token.lexeme),
    }
}

/// Parse a token sequence into a PROGRAM tree.
pub fn parse(tokens: &[Token]) -> Result<SyntaxNode, CompileError> {
    Parser::new(tokens).parse()
}
