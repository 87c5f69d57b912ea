//! Syntax errors recorded during parsing.
//!
//! Syntax errors never abort a parse. They are collected alongside the
//! tree and can be rendered with `miette`.

use std::fmt;

use miette::{Diagnostic, LabeledSpan, Severity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::span::Span;
use crate::token::TokenIndex;

/// Kinds of syntax errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A specific token was required here.
    ExpectedToken,
    /// The token cannot start any block.
    ExpectedBlockElement,
    /// An element was never closed.
    ExpectedClosingTag,
    /// A `{` without its matching `}`.
    UnclosedExpression,
    /// A preamble without its closing delimiter.
    UnclosedPreamble,
    /// Malformed attribute in an opening tag.
    InvalidAttribute,
    /// Closing tag name differs from the opening tag name.
    MismatchedTags,
    /// A token that has no place at this position.
    UnexpectedToken,
    UnclosedEmphasis,
    UnclosedStrong,
    /// Heading level above the configured maximum.
    HeadingTooDeep,
    /// Containers nested past the parser's depth limit.
    NestingTooDeep,
}

impl ErrorKind {
    /// Stable diagnostic code.
    pub const fn code(&self) -> &'static str {
        match self {
            ErrorKind::ExpectedToken => "mdx::expected_token",
            ErrorKind::ExpectedBlockElement => "mdx::expected_block_element",
            ErrorKind::ExpectedClosingTag => "mdx::expected_closing_tag",
            ErrorKind::UnclosedExpression => "mdx::unclosed_expression",
            ErrorKind::UnclosedPreamble => "mdx::unclosed_preamble",
            ErrorKind::InvalidAttribute => "mdx::invalid_attribute",
            ErrorKind::MismatchedTags => "mdx::mismatched_tags",
            ErrorKind::UnexpectedToken => "mdx::unexpected_token",
            ErrorKind::UnclosedEmphasis => "mdx::unclosed_emphasis",
            ErrorKind::UnclosedStrong => "mdx::unclosed_strong",
            ErrorKind::HeadingTooDeep => "mdx::heading_too_deep",
            ErrorKind::NestingTooDeep => "mdx::nesting_too_deep",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            ErrorKind::ExpectedToken => "expected token",
            ErrorKind::ExpectedBlockElement => "expected a block element",
            ErrorKind::ExpectedClosingTag => "expected closing tag",
            ErrorKind::UnclosedExpression => "unclosed expression",
            ErrorKind::UnclosedPreamble => "unclosed frontmatter",
            ErrorKind::InvalidAttribute => "invalid attribute",
            ErrorKind::MismatchedTags => "closing tag does not match opening tag",
            ErrorKind::UnexpectedToken => "unexpected token",
            ErrorKind::UnclosedEmphasis => "unclosed emphasis",
            ErrorKind::UnclosedStrong => "unclosed strong emphasis",
            ErrorKind::HeadingTooDeep => "heading level exceeds the maximum",
            ErrorKind::NestingTooDeep => "nesting exceeds the maximum depth",
        }
    }

    /// Warnings leave the tree fully formed; errors mark abandoned input.
    pub const fn severity(&self) -> Severity {
        match self {
            ErrorKind::HeadingTooDeep => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A recorded syntax error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[error("{kind}")]
pub struct SyntaxError {
    pub kind: ErrorKind,
    /// The offending token.
    pub token: TokenIndex,
    /// Source range of the offending token.
    pub span: Span,
}

impl SyntaxError {
    pub const fn new(kind: ErrorKind, token: TokenIndex, span: Span) -> Self {
        Self { kind, token, span }
    }

    #[inline]
    pub fn is_warning(&self) -> bool {
        matches!(self.kind.severity(), Severity::Warning)
    }
}

impl Diagnostic for SyntaxError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn severity(&self) -> Option<Severity> {
        Some(self.kind.severity())
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::at(
            self.span,
            self.kind.message(),
        ))))
    }
}
