//! Walk functions backing the default [`Visitor`] methods.

use std::ops::ControlFlow;

use crate::{Ast, NodeIndex, NodeTag};

use super::visit::{VisitResult, Visitor};

/// Walks a node by dispatching to the tag-specific visitor method.
///
/// Calls `enter_node`, the `visit_*` method for the node's tag, then
/// `exit_node`. Placeholder slots are skipped without any hook.
pub fn walk_node<'src, V>(visitor: &mut V, ast: &Ast<'src>, node: NodeIndex) -> VisitResult
where
    V: Visitor<'src>,
{
    let tag = ast.tag(node);
    if tag == NodeTag::Placeholder {
        return ControlFlow::Continue(());
    }

    visitor.enter_node(ast, node)?;

    let result = match tag {
        NodeTag::Document => visitor.visit_document(ast, node),
        NodeTag::Frontmatter => visitor.visit_frontmatter(ast, node),
        NodeTag::EsmImport | NodeTag::EsmExport => visitor.visit_esm(ast, node),
        NodeTag::Heading => visitor.visit_heading(ast, node),
        NodeTag::Paragraph => visitor.visit_paragraph(ast, node),
        NodeTag::CodeBlock => visitor.visit_code_block(ast, node),
        NodeTag::Blockquote => visitor.visit_blockquote(ast, node),
        NodeTag::ListOrdered | NodeTag::ListUnordered => visitor.visit_list(ast, node),
        NodeTag::ListItem => visitor.visit_list_item(ast, node),
        NodeTag::ThematicBreak => visitor.visit_thematic_break(ast, node),

        NodeTag::Text => visitor.visit_text(ast, node),
        NodeTag::HardBreak => visitor.visit_hard_break(ast, node),
        NodeTag::Strong => visitor.visit_strong(ast, node),
        NodeTag::Emphasis => visitor.visit_emphasis(ast, node),
        NodeTag::InlineCode => visitor.visit_inline_code(ast, node),
        NodeTag::Link => visitor.visit_link(ast, node),
        NodeTag::Image => visitor.visit_image(ast, node),
        NodeTag::LinkLabel => visitor.visit_link_label(ast, node),

        NodeTag::FlowExpression | NodeTag::TextExpression => visitor.visit_expression(ast, node),
        NodeTag::Element | NodeTag::SelfClosingElement | NodeTag::Fragment => {
            visitor.visit_element(ast, node)
        }
        NodeTag::Placeholder => ControlFlow::Continue(()),
    };

    result?;

    visitor.exit_node(ast, node)
}

/// Walks all children of a node in order.
#[inline]
pub fn walk_children<'src, V>(visitor: &mut V, ast: &Ast<'src>, node: NodeIndex) -> VisitResult
where
    V: Visitor<'src>,
{
    for &child in ast.children(node) {
        visitor.visit_node(ast, child)?;
    }
    ControlFlow::Continue(())
}
