//! The MDX parser front end.

use mdxtree_ast::Ast;
use tracing::debug;

use crate::lexer::{Lexer, check_input_len};
use crate::options::ParseOptions;
use crate::parser::Parser as TreeParser;
use crate::{ParseError, Parser};

/// Parses `source` with default options.
pub fn parse(source: &str) -> Result<Ast<'_>, ParseError> {
    parse_with_options(source, &ParseOptions::default())
}

/// Parses `source`: tokenize, then build the tree.
///
/// Returns `Err` only for oversized input, allocation failure or an
/// internal invariant violation. Syntax errors are reported through
/// [`Ast::errors`].
pub fn parse_with_options<'src>(
    source: &'src str,
    options: &ParseOptions,
) -> Result<Ast<'src>, ParseError> {
    check_input_len(source, options)?;
    let tokens = Lexer::new(source, options).tokenize()?;
    let ast = TreeParser::new(source, tokens, options).parse_document()?;
    if ast.has_errors() {
        debug!(errors = ast.errors().len(), "parsed with syntax errors");
    }
    Ok(ast)
}

/// MDX parser: Markdown with JSX-like elements, `{}` expressions, ESM
/// blocks and a `---` preamble.
#[derive(Debug, Clone, Default)]
pub struct MdxParser {
    options: ParseOptions,
}

impl MdxParser {
    /// Creates a parser with default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }
}

impl Parser for MdxParser {
    fn name(&self) -> &str {
        "mdx"
    }

    fn extensions(&self) -> &[&str] {
        &["mdx", "md"]
    }

    fn parse<'src>(&self, source: &'src str) -> Result<Ast<'src>, ParseError> {
        parse_with_options(source, &self.options)
    }
}
