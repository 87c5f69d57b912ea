//! Visitor pattern for syntax tree traversal.
//!
//! - [`Visitor`] - Read-only traversal trait
//! - [`walk_node`] - Dispatch function for tag-specific visitors
//! - [`walk_children`] - Traverse all children of a node
//!
//! # Example
//!
//! ```rust,ignore
//! use std::ops::ControlFlow;
//! use mdxtree_ast::{Ast, NodeIndex};
//! use mdxtree_ast::visitor::{Visitor, VisitResult, walk_node};
//!
//! struct HeadingCollector<'src> {
//!     headings: Vec<&'src str>,
//! }
//!
//! impl<'src> Visitor<'src> for HeadingCollector<'src> {
//!     fn visit_heading(&mut self, ast: &Ast<'src>, node: NodeIndex) -> VisitResult {
//!         self.headings.push(ast.node_text(node));
//!         ControlFlow::Continue(())
//!     }
//! }
//!
//! let ast = mdxtree_parser::parse("# One\n\n## Two\n")?;
//! let mut collector = HeadingCollector { headings: Vec::new() };
//! walk_node(&mut collector, &ast, ast.root());
//! ```

mod visit;
mod walk;

pub use visit::{VisitResult, Visitor};
pub use walk::{walk_children, walk_node};
