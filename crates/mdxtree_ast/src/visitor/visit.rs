//! Visitor trait for traversing the node store.
//!
//! Each `visit_*` method defaults to walking the node's children, so an
//! implementation only overrides the tags it cares about.

use std::ops::ControlFlow;

use crate::{Ast, NodeIndex};

use super::walk::{walk_children, walk_node};

/// Result type for visitor methods to control traversal.
///
/// - `ControlFlow::Continue(())` - continue visiting children
/// - `ControlFlow::Break(())` - stop traversal early
pub type VisitResult = ControlFlow<()>;

/// Read-only visitor over an [`Ast`].
///
/// Return `ControlFlow::Break(())` from any method to stop the walk. The
/// `?` operator propagates a break from nested walks.
pub trait Visitor<'src>: Sized {
    /// Called before a node's tag-specific method.
    #[inline]
    fn enter_node(&mut self, _ast: &Ast<'src>, _node: NodeIndex) -> VisitResult {
        ControlFlow::Continue(())
    }

    /// Called after a node and all of its children were visited.
    #[inline]
    fn exit_node(&mut self, _ast: &Ast<'src>, _node: NodeIndex) -> VisitResult {
        ControlFlow::Continue(())
    }

    #[inline]
    fn visit_node(&mut self, ast: &Ast<'src>, node: NodeIndex) -> VisitResult {
        walk_node(self, ast, node)
    }

    // === Block-level node visitors ===

    fn visit_document(&mut self, ast: &Ast<'src>, node: NodeIndex) -> VisitResult {
        walk_children(self, ast, node)
    }

    /// Visit the preamble. Its content is raw text; see [`Ast::frontmatter`].
    fn visit_frontmatter(&mut self, _ast: &Ast<'src>, _node: NodeIndex) -> VisitResult {
        ControlFlow::Continue(())
    }

    /// Visit an `import` or `export` statement.
    fn visit_esm(&mut self, _ast: &Ast<'src>, _node: NodeIndex) -> VisitResult {
        ControlFlow::Continue(())
    }

    fn visit_heading(&mut self, ast: &Ast<'src>, node: NodeIndex) -> VisitResult {
        walk_children(self, ast, node)
    }

    fn visit_paragraph(&mut self, ast: &Ast<'src>, node: NodeIndex) -> VisitResult {
        walk_children(self, ast, node)
    }

    fn visit_code_block(&mut self, _ast: &Ast<'src>, _node: NodeIndex) -> VisitResult {
        ControlFlow::Continue(())
    }

    fn visit_blockquote(&mut self, ast: &Ast<'src>, node: NodeIndex) -> VisitResult {
        walk_children(self, ast, node)
    }

    /// Visit an ordered or unordered list.
    fn visit_list(&mut self, ast: &Ast<'src>, node: NodeIndex) -> VisitResult {
        walk_children(self, ast, node)
    }

    fn visit_list_item(&mut self, ast: &Ast<'src>, node: NodeIndex) -> VisitResult {
        walk_children(self, ast, node)
    }

    fn visit_thematic_break(&mut self, _ast: &Ast<'src>, _node: NodeIndex) -> VisitResult {
        ControlFlow::Continue(())
    }

    // === Inline-level node visitors ===

    fn visit_text(&mut self, _ast: &Ast<'src>, _node: NodeIndex) -> VisitResult {
        ControlFlow::Continue(())
    }

    fn visit_hard_break(&mut self, _ast: &Ast<'src>, _node: NodeIndex) -> VisitResult {
        ControlFlow::Continue(())
    }

    fn visit_strong(&mut self, ast: &Ast<'src>, node: NodeIndex) -> VisitResult {
        walk_children(self, ast, node)
    }

    fn visit_emphasis(&mut self, ast: &Ast<'src>, node: NodeIndex) -> VisitResult {
        walk_children(self, ast, node)
    }

    fn visit_inline_code(&mut self, _ast: &Ast<'src>, _node: NodeIndex) -> VisitResult {
        ControlFlow::Continue(())
    }

    fn visit_link(&mut self, ast: &Ast<'src>, node: NodeIndex) -> VisitResult {
        walk_children(self, ast, node)
    }

    fn visit_image(&mut self, ast: &Ast<'src>, node: NodeIndex) -> VisitResult {
        walk_children(self, ast, node)
    }

    fn visit_link_label(&mut self, ast: &Ast<'src>, node: NodeIndex) -> VisitResult {
        walk_children(self, ast, node)
    }

    // === Embedded syntax ===

    /// Visit a flow or text expression. The body is opaque.
    fn visit_expression(&mut self, _ast: &Ast<'src>, _node: NodeIndex) -> VisitResult {
        ControlFlow::Continue(())
    }

    /// Visit an element, self-closing element or fragment.
    fn visit_element(&mut self, ast: &Ast<'src>, node: NodeIndex) -> VisitResult {
        walk_children(self, ast, node)
    }
}
