//! # mdxtree_ast
//!
//! Data model for the mdxtree MDX parser.
//!
//! ## Architecture
//!
//! A parse produces four flat arrays, handed over together as an [`Ast`]:
//!
//! - **Tokens**: a tag plus a start offset. A token ends where the next
//!   one begins, so the list covers the whole source.
//! - **Nodes**: a structure-of-arrays [`NodeStore`] addressed by
//!   [`NodeIndex`]. A parent always has a lower index than its children.
//! - **Extra data**: `u32` words holding child runs and structured records
//!   such as [`ElementRecord`] or [`HeadingRecord`].
//! - **Errors**: recorded [`SyntaxError`]s. A tree is returned either way.
//!
//! ## Example
//!
//! ```rust,ignore
//! use mdxtree_ast::NodeTag;
//!
//! let ast = mdxtree_parser::parse("# Hello\n")?;
//! let heading = ast.children(ast.root())[0];
//! assert_eq!(ast.tag(heading), NodeTag::Heading);
//! assert_eq!(ast.heading_level(heading), Some(1));
//! ```

mod ast;
mod error;
pub mod extra;
mod node;
mod span;
mod token;
pub mod visitor;

pub use ast::Ast;
pub use error::{ErrorKind, SyntaxError};
pub use extra::{
    AttributeKind, AttributeRecord, CodeBlockRecord, ElementRecord, ExpressionRecord,
    ExtraField, ExtraRecord, FrontmatterRecord, HeadingRecord, LinkRecord, ListItemRecord,
    TaskState,
};
pub use node::{ExtraIndex, IndexRange, Node, NodeData, NodeIndex, NodeStore, NodeTag, SmallSpan};
pub use span::{LineIndex, Position, Span};
pub use token::{ByteOffset, Token, TokenIndex, TokenTag};
