pub mod environment;
pub mod value;

use crate::ast::{BinaryOp, NodeKind, SyntaxNode};
use crate::error::{Position, RuntimeError};
use crate::interpreter::environment::SymbolTable;
use crate::interpreter::value::Value;
use crate::scanner::token::Token;

/// One executed assignment, reported in execution order.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub value: Value,
}

/// Receives assignment events as they happen.
pub trait AssignmentObserver {
    fn assigned(&mut self, event: &Assignment);
}

impl<F: FnMut(&Assignment)> AssignmentObserver for F {
    fn assigned(&mut self, event: &Assignment) {
        self(event)
    }
}

/// Tree-walking evaluator over a parsed program.
///
/// The store is borrowed for the whole run; writes committed before a
/// failure stay in it.
pub struct Interpreter<'a, O: AssignmentObserver> {
    /// Token sequence the tree was parsed from, for error positions.
    tokens: &'a [Token],
    symbols: &'a mut SymbolTable,
    observer: O,
}

impl<'a, O: AssignmentObserver> Interpreter<'a, O> {
    pub fn new(tokens: &'a [Token], symbols: &'a mut SymbolTable, observer: O) -> Self {
        Self {
            tokens,
            symbols,
            observer,
        }
    }

    /// Execute a tree, returning the value of its last statement, if any.
    pub fn interpret(&mut self, program: &SyntaxNode) -> Result<Option<Value>, RuntimeError> {
        self.execute(program)
    }

    fn execute(&mut self, node: &SyntaxNode) -> Result<Option<Value>, RuntimeError> {
        match node.kind {
            NodeKind::Program | NodeKind::Block => {
                let mut last = None;
                for statement in &node.children {
                    last = self.execute(statement)?;
                }
                Ok(last)
            }
            NodeKind::Assign => self.assign(node).map(Some),
            NodeKind::If => {
                let condition = self.evaluate(self.child(node, 0)?)?;
                if condition.is_truthy() {
                    self.execute(self.child(node, 1)?)
                } else if let Some(else_block) = node.children.get(2) {
                    self.execute(else_block)
                } else {
                    Ok(None)
                }
            }
            NodeKind::While => {
                let condition = self.child(node, 0)?;
                let body = self.child(node, 1)?;
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
                Ok(None)
            }
            NodeKind::For => {
                let condition = self.child(node, 1)?;
                let increment = self.child(node, 2)?;
                let body = self.child(node, 3)?;
                self.execute(self.child(node, 0)?)?;
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                    self.execute(increment)?;
                }
                Ok(None)
            }
            NodeKind::Operator => Err(self.unsupported_node(node)),
            _ => self.evaluate(node).map(Some),
        }
    }

    fn assign(&mut self, node: &SyntaxNode) -> Result<Value, RuntimeError> {
        let name = &self.child(node, 0)?.literal;
        let value = self.evaluate(self.child(node, 2)?)?;
        self.symbols.assign(name, value.clone());
        tracing::trace!(name = %name, value = %value, "assign");

        let event = Assignment {
            name: name.clone(),
            value,
        };
        self.observer.assigned(&event);
        Ok(event.value)
    }

    fn evaluate(&mut self, node: &SyntaxNode) -> Result<Value, RuntimeError> {
        match node.kind {
            NodeKind::Number => node.literal.parse().map(Value::Integer).map_err(|_| {
                RuntimeError::InvalidLiteral {
                    text: node.literal.clone(),
                    position: self.position(node),
                }
            }),
            NodeKind::Float => node.literal.parse().map(Value::Float).map_err(|_| {
                RuntimeError::InvalidLiteral {
                    text: node.literal.clone(),
                    position: self.position(node),
                }
            }),
            NodeKind::String => Ok(Value::Text(node.literal.clone())),
            NodeKind::Identifier => self.symbols.get(&node.literal).cloned().ok_or_else(|| {
                RuntimeError::UndefinedVariable {
                    name: node.literal.clone(),
                    position: self.position(node),
                }
            }),
            NodeKind::Arithmetic | NodeKind::Relational => self.evaluate_binary(node),
            NodeKind::Logical => self.evaluate_logical(node),
            NodeKind::Negation => {
                let operand = self.evaluate(self.child(node, 1)?)?;
                Ok(Value::from_bool(!operand.is_truthy()))
            }
            _ => Err(self.unsupported_node(node)),
        }
    }

    /// Left fold over `[operand, op, operand, op, operand, ...]`.
    fn evaluate_binary(&mut self, node: &SyntaxNode) -> Result<Value, RuntimeError> {
        let mut result = self.evaluate(self.child(node, 0)?)?;
        for pair in node.children[1..].chunks(2) {
            let [op_node, operand] = pair else {
                return Err(self.unsupported_node(node));
            };
            let op = self.operator(op_node)?;
            let right = self.evaluate(operand)?;
            result = apply_binary(op, result, right)
                .map_err(|e| e.or_at(self.position(op_node)))?;
        }
        Ok(result)
    }

    /// Like [`Self::evaluate_binary`], but the right operand is only
    /// evaluated when the left one does not decide the result.
    fn evaluate_logical(&mut self, node: &SyntaxNode) -> Result<Value, RuntimeError> {
        let mut result = self.evaluate(self.child(node, 0)?)?;
        for pair in node.children[1..].chunks(2) {
            let [op_node, operand] = pair else {
                return Err(self.unsupported_node(node));
            };
            let truthy = result.is_truthy();
            result = match self.operator(op_node)? {
                BinaryOp::And if !truthy => Value::from_bool(false),
                BinaryOp::Or if truthy => Value::from_bool(true),
                BinaryOp::And | BinaryOp::Or => {
                    Value::from_bool(self.evaluate(operand)?.is_truthy())
                }
                _ => return Err(self.unsupported_node(op_node)),
            };
        }
        Ok(result)
    }

    fn operator(&self, node: &SyntaxNode) -> Result<BinaryOp, RuntimeError> {
        if node.kind != NodeKind::Operator {
            return Err(self.unsupported_node(node));
        }
        node.literal
            .parse()
            .map_err(|_| self.unsupported_node(node))
    }

    /// Child at `index`, or an error for a tree the parser cannot produce.
    fn child<'n>(
        &self,
        node: &'n SyntaxNode,
        index: usize,
    ) -> Result<&'n SyntaxNode, RuntimeError> {
        node.children
            .get(index)
            .ok_or_else(|| self.unsupported_node(node))
    }

    fn position(&self, node: &SyntaxNode) -> Option<Position> {
        node.token
            .and_then(|index| self.tokens.get(index))
            .map(Position::from)
    }

    fn unsupported_node(&self, node: &SyntaxNode) -> RuntimeError {
        RuntimeError::UnsupportedNode {
            kind: node.kind.to_string(),
            position: self.position(node),
        }
    }
}

/// Pairwise operator dispatch for arithmetic and relational chains.
pub fn apply_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Text(a), Value::Text(b)) => match op {
            BinaryOp::Add => Ok(Value::Text(a + &b)),
            BinaryOp::Equal => Ok(Value::from_bool(a == b)),
            BinaryOp::NotEqual => Ok(Value::from_bool(a != b)),
            _ => Err(unsupported(op, "text", "text")),
        },
        (Value::Text(a), other) if op == BinaryOp::Add => Ok(Value::Text(format!("{a}{other}"))),
        (other, Value::Text(b)) if op == BinaryOp::Add => Ok(Value::Text(format!("{other}{b}"))),
        (left @ Value::Text(_), right) | (left, right @ Value::Text(_)) => {
            Err(unsupported(op, left.kind_name(), right.kind_name()))
        }
        (Value::Integer(a), Value::Integer(b)) => integer_op(op, a, b),
        (left, right) => match (left.as_float(), right.as_float()) {
            (Some(a), Some(b)) => float_op(op, a, b)
                .ok_or_else(|| unsupported(op, left.kind_name(), right.kind_name())),
            _ => Err(unsupported(op, left.kind_name(), right.kind_name())),
        },
    }
}

fn unsupported(op: BinaryOp, left: &'static str, right: &'static str) -> RuntimeError {
    RuntimeError::UnsupportedOperation {
        operator: op.to_string(),
        left,
        right,
        position: None,
    }
}

fn integer_op(op: BinaryOp, a: i64, b: i64) -> Result<Value, RuntimeError> {
    let overflow = || RuntimeError::IntegerOverflow {
        operator: op.to_string(),
        position: None,
    };
    let value = match op {
        BinaryOp::Add => a.checked_add(b).ok_or_else(overflow)?,
        BinaryOp::Subtract => a.checked_sub(b).ok_or_else(overflow)?,
        BinaryOp::Multiply => a.checked_mul(b).ok_or_else(overflow)?,
        BinaryOp::Divide => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero { position: None });
            }
            a.checked_div(b).ok_or_else(overflow)?
        }
        BinaryOp::Modulo => {
            if b == 0 {
                return Err(RuntimeError::ModuloByZero { position: None });
            }
            a.checked_rem(b).ok_or_else(overflow)?
        }
        BinaryOp::Equal => i64::from(a == b),
        BinaryOp::NotEqual => i64::from(a != b),
        BinaryOp::Less => i64::from(a < b),
        BinaryOp::LessEqual => i64::from(a <= b),
        BinaryOp::Greater => i64::from(a > b),
        BinaryOp::GreaterEqual => i64::from(a >= b),
        BinaryOp::And | BinaryOp::Or => return Err(unsupported(op, "integer", "integer")),
    };
    Ok(Value::Integer(value))
}

/// `None` for operators floats do not support.
fn float_op(op: BinaryOp, a: f64, b: f64) -> Option<Value> {
    let value = match op {
        BinaryOp::Add => Value::Float(a + b),
        BinaryOp::Subtract => Value::Float(a - b),
        BinaryOp::Multiply => Value::Float(a * b),
        BinaryOp::Divide => Value::Float(a / b),
        BinaryOp::Equal => Value::from_bool(a == b),
        BinaryOp::NotEqual => Value::from_bool(a != b),
        BinaryOp::Less => Value::from_bool(a < b),
        BinaryOp::LessEqual => Value::from_bool(a <= b),
        BinaryOp::Greater => Value::from_bool(a > b),
        BinaryOp::GreaterEqual => Value::from_bool(a >= b),
        BinaryOp::Modulo | BinaryOp::And | BinaryOp::Or => return None,
    };
    Some(value)
}
