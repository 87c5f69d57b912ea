//! Helpers shared by the integration tests.

#![allow(dead_code)]

use mdxtree_ast::{Ast, NodeIndex, NodeTag};

/// Renders the tree as one `Tag start..end` line per node.
pub fn dump(ast: &Ast<'_>) -> String {
    let mut out = String::new();
    dump_node(ast, ast.root(), 0, &mut out);
    out
}

fn dump_node(ast: &Ast<'_>, node: NodeIndex, depth: usize, out: &mut String) {
    let span = ast.node_span(node);
    out.push_str(&"  ".repeat(depth));
    out.push_str(&format!("{} {}..{}", ast.tag(node), span.start, span.end));
    match ast.tag(node) {
        NodeTag::Text => out.push_str(&format!(" {:?}", ast.node_text(node))),
        NodeTag::Element | NodeTag::SelfClosingElement => {
            if let Some(name) = ast.element_name(node) {
                out.push_str(&format!(" <{name}>"));
            }
        }
        _ => {}
    }
    out.push('\n');
    for &child in ast.children(node) {
        dump_node(ast, child, depth + 1, out);
    }
}

/// Every node reachable from the root, in preorder.
pub fn reachable(ast: &Ast<'_>) -> Vec<NodeIndex> {
    let mut nodes = Vec::new();
    let mut stack = vec![ast.root()];
    while let Some(node) = stack.pop() {
        nodes.push(node);
        stack.extend(ast.children(node).iter().rev());
    }
    nodes
}

pub fn child_tags(ast: &Ast<'_>, node: NodeIndex) -> Vec<NodeTag> {
    ast.children(node).iter().map(|&n| ast.tag(n)).collect()
}
