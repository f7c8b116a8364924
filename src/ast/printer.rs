use crate::ast::{NodeKind, SyntaxNode};

/// Render a program as one parenthesized form per top-level statement.
pub fn to_sexp(program: &SyntaxNode) -> String {
    let mut buf = String::new();
    if program.kind == NodeKind::Program {
        for statement in &program.children {
            sexp_node(&mut buf, statement);
            buf.push('\n');
        }
    } else {
        sexp_node(&mut buf, program);
        buf.push('\n');
    }
    buf
}

pub fn to_json(program: &SyntaxNode) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(program)
}

fn sexp_form(buf: &mut String, head: &str, children: &[SyntaxNode]) {
    buf.push('(');
    buf.push_str(head);
    for child in children {
        buf.push(' ');
        sexp_node(buf, child);
    }
    buf.push(')');
}

fn sexp_node(buf: &mut String, node: &SyntaxNode) {
    match node.kind {
        NodeKind::Program => sexp_form(buf, "program", &node.children),
        NodeKind::Block => sexp_form(buf, "block", &node.children),
        NodeKind::Assign => {
            // children: identifier, '=', value
            buf.push_str("(=");
            for child in node.children.iter().step_by(2) {
                buf.push(' ');
                sexp_node(buf, child);
            }
            buf.push(')');
        }
        NodeKind::If => sexp_form(buf, "si", &node.children),
        NodeKind::While => sexp_form(buf, "mientras", &node.children),
        NodeKind::For => sexp_form(buf, "para", &node.children),
        NodeKind::Arithmetic | NodeKind::Relational | NodeKind::Logical => {
            buf.push('(');
            for (i, child) in node.children.iter().enumerate() {
                if i > 0 {
                    buf.push(' ');
                }
                sexp_node(buf, child);
            }
            buf.push(')');
        }
        NodeKind::Negation => {
            buf.push_str("(!");
            if let Some(operand) = node.children.last() {
                buf.push(' ');
                sexp_node(buf, operand);
            }
            buf.push(')');
        }
        NodeKind::String => buf.push_str(&format!("{:?}", node.literal)),
        NodeKind::Number | NodeKind::Float | NodeKind::Identifier | NodeKind::Operator => {
            buf.push_str(&node.literal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: NodeKind, text: &str) -> SyntaxNode {
        SyntaxNode::leaf(kind, text, 0)
    }

    #[test]
    fn sexp_nested_arithmetic() {
        let product = SyntaxNode::new(NodeKind::Arithmetic, None).with_children(vec![
            leaf(NodeKind::Number, "2"),
            leaf(NodeKind::Operator, "*"),
            leaf(NodeKind::Number, "3"),
        ]);
        let sum = SyntaxNode::new(NodeKind::Arithmetic, None).with_children(vec![
            leaf(NodeKind::Number, "1"),
            leaf(NodeKind::Operator, "+"),
            product,
        ]);
        let program = SyntaxNode::new(NodeKind::Program, None).with_children(vec![sum]);
        assert_eq!(to_sexp(&program), "(1 + (2 * 3))\n");
    }

    #[test]
    fn sexp_assignment_and_strings() {
        let assign = SyntaxNode::new(NodeKind::Assign, Some(0)).with_children(vec![
            leaf(NodeKind::Identifier, "s"),
            leaf(NodeKind::Operator, "="),
            leaf(NodeKind::String, "a\"b"),
        ]);
        let program = SyntaxNode::new(NodeKind::Program, None).with_children(vec![assign]);
        assert_eq!(to_sexp(&program), "(= s \"a\\\"b\")\n");
    }

    #[test]
    fn sexp_negation_and_empty_block() {
        let negation = SyntaxNode::new(NodeKind::Negation, Some(0)).with_children(vec![
            leaf(NodeKind::Operator, "!"),
            leaf(NodeKind::Identifier, "x"),
        ]);
        let stmt = SyntaxNode::new(NodeKind::While, Some(0)).with_children(vec![
            negation,
            SyntaxNode::new(NodeKind::Block, Some(1)),
        ]);
        let program = SyntaxNode::new(NodeKind::Program, None).with_children(vec![stmt]);
        assert_eq!(to_sexp(&program), "(mientras (! x) (block))\n");
    }

    #[test]
    fn json_output_is_valid() {
        let program = SyntaxNode::new(NodeKind::Program, None)
            .with_children(vec![leaf(NodeKind::Float, "1.5")]);
        let json = to_json(&program).expect("serializable");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(value["kind"], "PROGRAM");
        assert_eq!(value["children"][0]["literal"], "1.5");
        assert_eq!(value["children"][0]["kind"], "FLOAT");
    }
}
