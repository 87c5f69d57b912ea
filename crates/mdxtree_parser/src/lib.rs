//! # mdxtree_parser
//!
//! Lexer and parser for MDX documents.
//!
//! This crate provides:
//! - A mode-stacked lexer producing a flat token list
//! - A recursive-descent parser building an [`Ast`](mdxtree_ast::Ast)
//! - A `Parser` trait and the [`MdxParser`] implementation
//!
//! ## Architecture
//!
//! Parsing runs in two passes. The lexer tokenizes the whole source,
//! switching between markdown, element and expression sub-grammars with an
//! explicit mode stack. The parser then walks the frozen token list and
//! writes nodes into a struct-of-arrays store. Syntax errors never abort a
//! parse: they are collected on the tree and the parser resumes at the
//! next block boundary.
//!
//! ## Example
//!
//! ```rust,ignore
//! use mdxtree_parser::parse;
//!
//! let ast = parse("# Hello\n\n<Note>Hi {name}</Note>\n")?;
//! for &node in ast.children(ast.root()) {
//!     println!("{} {:?}", ast.tag(node), ast.node_text(node));
//! }
//! ```

mod error;
pub mod lexer;
mod mdx;
mod options;
mod parser;
mod traits;

pub use error::ParseError;
pub use mdx::{MdxParser, parse, parse_with_options};
pub use options::{DEFAULT_MAX_ERRORS, DEFAULT_MAX_HEADING_LEVEL, ParseOptions};
pub use traits::Parser;
