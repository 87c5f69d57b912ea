//! Parser trait definition.

use mdxtree_ast::Ast;

use crate::ParseError;

/// Trait for parsing source text into an [`Ast`].
///
/// # Example
///
/// ```rust,ignore
/// use mdxtree_parser::{MdxParser, Parser};
///
/// let parser = MdxParser::new();
/// assert!(parser.can_parse("MDX"));
///
/// let ast = parser.parse("# Hello")?;
/// ```
pub trait Parser {
    /// Returns the name of this parser.
    fn name(&self) -> &str;

    /// Returns the file extensions this parser handles.
    ///
    /// Extensions should not include the leading dot (e.g., `["mdx", "md"]`).
    fn extensions(&self) -> &[&str];

    /// Parses the source text.
    ///
    /// Syntax errors are part of the returned tree; `Err` means the parse
    /// could not complete.
    fn parse<'src>(&self, source: &'src str) -> Result<Ast<'src>, ParseError>;

    /// Returns true if this parser can handle the given file extension.
    fn can_parse(&self, extension: &str) -> bool {
        self.extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}
