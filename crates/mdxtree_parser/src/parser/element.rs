//! JSX-like elements, fragments and their attributes.

use mdxtree_ast::extra::append_record;
use mdxtree_ast::{
    AttributeKind, AttributeRecord, ElementRecord, ErrorKind, IndexRange, Node, NodeData,
    NodeIndex, NodeTag, TokenIndex, TokenTag,
};

use super::{PResult, Parser};

/// Where an element appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Placement {
    /// Alone on its line, between blocks.
    Flow,
    /// Inside a line of text.
    Inline,
}

impl<'src> Parser<'src, '_> {
    /// Parses an element, self-closing element or fragment.
    ///
    /// The node is reserved as soon as `<` is seen so it precedes its
    /// children in the node store.
    pub(super) fn parse_element(&mut self, placement: Placement) -> PResult<NodeIndex> {
        self.build(|p, top| {
            let main = p.index;
            p.advance();
            p.skip_element_whitespace();
            let name = p.eat(TokenTag::ElementName);
            let attributes = match name {
                Some(_) => p.parse_attributes()?,
                None => IndexRange::EMPTY,
            };

            let (tag, children) = match p.peek() {
                TokenTag::ElementSelfClose => {
                    p.advance();
                    (NodeTag::SelfClosingElement, IndexRange::EMPTY)
                }
                TokenTag::ElementEnd => {
                    p.advance();
                    p.parse_element_children(placement)?;
                    p.parse_closing_tag(name)?;
                    let tag = if name.is_some() {
                        NodeTag::Element
                    } else {
                        NodeTag::Fragment
                    };
                    (tag, p.children_range(top)?)
                }
                TokenTag::Eof | TokenTag::BlankLine => {
                    return p.abandon(ErrorKind::ExpectedClosingTag, p.index);
                }
                _ => return p.abandon(ErrorKind::InvalidAttribute, p.index),
            };

            let record = ElementRecord {
                name,
                attributes,
                children,
            };
            let extra = append_record(&mut p.extra, &record)?;
            Ok(Node::new(tag, main, NodeData::Extra(extra)))
        })
    }

    /// Writes one [`AttributeRecord`] per attribute, back to back.
    fn parse_attributes(&mut self) -> PResult<IndexRange> {
        let start = self.extra.len() as u32;
        loop {
            self.step()?;
            self.skip_element_whitespace();
            let record = match self.peek() {
                TokenTag::ElementEnd | TokenTag::ElementSelfClose => break,
                TokenTag::Eof | TokenTag::BlankLine => {
                    return self.abandon(ErrorKind::ExpectedClosingTag, self.index);
                }
                TokenTag::ElementName => self.parse_attribute()?,
                TokenTag::ExpressionStart => {
                    let main = self.index;
                    let value = self.parse_attribute_expression()?;
                    if !self.range_text(value).trim_start().starts_with("...") {
                        return self.abandon(ErrorKind::InvalidAttribute, main);
                    }
                    AttributeRecord {
                        name: None,
                        kind: AttributeKind::Spread,
                        value,
                    }
                }
                _ => return self.abandon(ErrorKind::InvalidAttribute, self.index),
            };
            append_record(&mut self.extra, &record)?;
        }
        Ok(IndexRange::new(start, self.extra.len() as u32))
    }

    fn parse_attribute(&mut self) -> PResult<AttributeRecord> {
        let name = Some(self.index);
        self.advance();
        self.skip_element_whitespace();
        if self.eat(TokenTag::ElementEquals).is_none() {
            return Ok(AttributeRecord {
                name,
                kind: AttributeKind::Boolean,
                value: IndexRange::new(self.index, self.index),
            });
        }
        self.skip_element_whitespace();
        let (kind, value) = match self.peek() {
            TokenTag::ElementString => {
                let value = self.index;
                self.advance();
                (AttributeKind::String, IndexRange::new(value, value + 1))
            }
            TokenTag::ExpressionStart => (
                AttributeKind::Expression,
                self.parse_attribute_expression()?,
            ),
            TokenTag::Eof | TokenTag::BlankLine => {
                return self.abandon(ErrorKind::ExpectedClosingTag, self.index);
            }
            _ => return self.abandon(ErrorKind::InvalidAttribute, self.index),
        };
        Ok(AttributeRecord { name, kind, value })
    }

    /// Consumes `{ ... }` inside a tag and returns the body token range.
    fn parse_attribute_expression(&mut self) -> PResult<IndexRange> {
        let start = self.index;
        let Some(end) = self.pair(start) else {
            return self.abandon(ErrorKind::UnclosedExpression, start);
        };
        self.index = end + 1;
        Ok(IndexRange::new(start + 1, end))
    }

    /// Children are blocks when a flow element's content starts on a new
    /// line, and inline content otherwise.
    fn parse_element_children(&mut self, placement: Placement) -> PResult<()> {
        let blocks = placement == Placement::Flow && self.is_line_end_at(self.index);
        self.element_depth += 1;
        let result = self.nested(|p| {
            if blocks {
                p.parse_blocks(|p| p.at_closing_tag())
            } else {
                p.parse_inline_content()
            }
        });
        self.element_depth -= 1;
        result
    }

    /// Parses `</name>`.
    ///
    /// A different name is reported but accepted. A missing closing tag is
    /// reported and the element ends with its last child.
    fn parse_closing_tag(&mut self, name: Option<TokenIndex>) -> PResult<()> {
        let mut at = self.index;
        while matches!(self.tag_at(at), TokenTag::Newline | TokenTag::Indent) {
            at += 1;
        }
        if self.tag_at(at) != TokenTag::ElementStart || self.tag_at(at + 1) != TokenTag::ElementSlash
        {
            return self.error(ErrorKind::ExpectedClosingTag, self.index);
        }
        self.index = at + 2;
        self.skip_element_whitespace();
        let close = self.eat(TokenTag::ElementName);
        let same = match (name, close) {
            (Some(open), Some(close)) => self.token_slice(open) == self.token_slice(close),
            (None, None) => true,
            _ => false,
        };
        if !same {
            self.error(ErrorKind::MismatchedTags, close.unwrap_or(self.index))?;
        }
        self.skip_element_whitespace();
        self.expect(TokenTag::ElementEnd, ErrorKind::ExpectedToken)?;
        Ok(())
    }

    fn skip_element_whitespace(&mut self) {
        while self.peek() == TokenTag::ElementWhitespace {
            self.advance();
        }
    }

    /// Returns true at `</`, optionally after indentation.
    pub(super) fn at_closing_tag(&self) -> bool {
        let mut at = self.index;
        if self.tag_at(at) == TokenTag::Indent {
            at += 1;
        }
        self.tag_at(at) == TokenTag::ElementStart && self.tag_at(at + 1) == TokenTag::ElementSlash
    }

    /// An element at the start of a block is flow content unless text
    /// follows it on the same line.
    pub(super) fn element_is_flow(&self, start: TokenIndex) -> bool {
        let Some(open_end) = self.pair(start) else {
            return true;
        };
        if self.is_line_end_at(open_end + 1) {
            return true;
        }
        if self.tag_at(open_end) == TokenTag::ElementSelfClose {
            return false;
        }
        self.pair(open_end).is_none_or(|close_end| self.is_line_end_at(close_end + 1))
    }

    /// Source text of a token range.
    fn range_text(&self, range: IndexRange) -> &'src str {
        if range.is_empty() {
            return "";
        }
        let start = self.token_span(range.start).start;
        let end = self.token_span(range.end - 1).end;
        self.source.get(start as usize..end as usize).unwrap_or("")
    }
}
