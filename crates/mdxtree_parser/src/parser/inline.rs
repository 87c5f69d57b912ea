//! Inline grammar: text runs, emphasis, code spans, links and expressions.

use mdxtree_ast::extra::append_record;
use mdxtree_ast::{
    ErrorKind, ExpressionRecord, IndexRange, LinkRecord, Node, NodeData, NodeIndex, NodeTag,
    TokenIndex, TokenTag,
};

use super::element::Placement;
use super::{PResult, Parser};

impl<'src> Parser<'src, '_> {
    /// Parses inline nodes into the scratch stack until the content ends.
    pub(super) fn parse_inline_content(&mut self) -> PResult<()> {
        while !self.inline_stops() {
            self.step()?;
            let start = self.index;
            let node = self.parse_inline()?;
            self.push_child(node)?;
            if self.index == start {
                return self.abandon(ErrorKind::UnexpectedToken, start);
            }
        }
        Ok(())
    }

    /// Returns true if the current token ends the inline content being
    /// parsed.
    pub(super) fn inline_stops(&self) -> bool {
        if Some(self.index) == self.label_end {
            return true;
        }
        let tag = self.peek();
        match tag {
            TokenTag::Eof | TokenTag::BlankLine => true,
            TokenTag::Newline => self.line_bound || self.paragraph_ends_at(self.index),
            TokenTag::HardBreak => self.line_bound,
            TokenTag::ElementStart => {
                self.element_depth > 0 && self.peek_nth(1) == TokenTag::ElementSlash
            }
            _ if tag.is_block_marker() => true,
            _ => self.open_inline.contains(&tag),
        }
    }

    fn parse_inline(&mut self) -> PResult<NodeIndex> {
        match self.peek() {
            TokenTag::EmphasisStart => self.parse_delimited(
                NodeTag::Emphasis,
                TokenTag::EmphasisEnd,
                ErrorKind::UnclosedEmphasis,
            ),
            TokenTag::StrongStart => self.parse_delimited(
                NodeTag::Strong,
                TokenTag::StrongEnd,
                ErrorKind::UnclosedStrong,
            ),
            TokenTag::CodeInlineStart => self.parse_code_span(),
            TokenTag::LinkStart | TokenTag::ImageStart => match self.pair(self.index) {
                Some(end) => self.parse_link(end),
                None => self.parse_text(),
            },
            TokenTag::ElementStart => {
                if self.peek_nth(1) == TokenTag::ElementSlash {
                    return self.abandon(ErrorKind::UnexpectedToken, self.index);
                }
                self.parse_element(Placement::Inline)
            }
            TokenTag::ExpressionStart => self.parse_expression(NodeTag::TextExpression),
            TokenTag::HardBreak => {
                let main = self.index;
                self.advance();
                self.push_leaf(Node::new(NodeTag::HardBreak, main, NodeData::None))
            }
            tag if is_literal(tag) => self.parse_text(),
            _ => self.abandon(ErrorKind::UnexpectedToken, self.index),
        }
    }

    /// Merges adjacent literal tokens into one text node.
    ///
    /// Soft line breaks, indentation and unmatched closing markers read as
    /// text. The first token is consumed whatever its tag.
    fn parse_text(&mut self) -> PResult<NodeIndex> {
        let main = self.index;
        self.advance();
        while !self.inline_stops() && is_literal(self.peek()) {
            self.advance();
        }
        self.push_leaf(Node::new(NodeTag::Text, main, NodeData::Token(main)))
    }

    /// Emphasis or strong. An unclosed span is reported but kept.
    fn parse_delimited(
        &mut self,
        tag: NodeTag,
        closer: TokenTag,
        unclosed: ErrorKind,
    ) -> PResult<NodeIndex> {
        self.build(|p, top| {
            let main = p.index;
            p.advance();
            p.open_inline.try_reserve(1)?;
            p.open_inline.push(closer);
            let result = p.parse_inline_content();
            p.open_inline.pop();
            result?;
            if p.eat(closer).is_none() {
                p.error(unclosed, main)?;
            }
            let children = p.children_data(top)?;
            Ok(Node::new(tag, main, children))
        })
    }

    fn parse_code_span(&mut self) -> PResult<NodeIndex> {
        let main = self.index;
        self.advance();
        let data = match self.eat(TokenTag::CodeInlineContent) {
            Some(content) => NodeData::Token(content),
            None => NodeData::None,
        };
        if self.eat(TokenTag::CodeInlineEnd).is_none() {
            self.error(ErrorKind::ExpectedToken, main)?;
        }
        self.push_leaf(Node::new(NodeTag::InlineCode, main, data))
    }

    /// Parses `[label](url)` or `![label](url)`.
    ///
    /// A label of plain text becomes one text node; anything richer is
    /// wrapped in a [`NodeTag::LinkLabel`].
    fn parse_link(&mut self, label_end: TokenIndex) -> PResult<NodeIndex> {
        let tag = if self.peek() == TokenTag::ImageStart {
            NodeTag::Image
        } else {
            NodeTag::Link
        };
        self.build(|p, _| {
            let main = p.index;
            p.advance();
            let label = p.parse_link_label(label_end)?;
            p.expect(TokenTag::LinkEnd, ErrorKind::ExpectedToken)?;
            p.expect(TokenTag::LinkUrlStart, ErrorKind::ExpectedToken)?;
            let url = p.eat(TokenTag::LinkUrl);
            p.expect(TokenTag::LinkUrlEnd, ErrorKind::ExpectedToken)?;
            let extra = append_record(&mut p.extra, &LinkRecord { label, url })?;
            Ok(Node::new(tag, main, NodeData::Extra(extra)))
        })
    }

    fn parse_link_label(&mut self, label_end: TokenIndex) -> PResult<Option<NodeIndex>> {
        if self.index == label_end {
            return Ok(None);
        }
        let plain = (self.index..label_end).all(|i| self.tag_at(i) == TokenTag::Text);
        let open_inline = std::mem::take(&mut self.open_inline);
        let outer_end = self.label_end.replace(label_end);
        let result = if plain {
            self.parse_text()
        } else {
            self.build(|p, top| {
                let main = p.index;
                p.parse_inline_content()?;
                let children = p.children_data(top)?;
                Ok(Node::new(NodeTag::LinkLabel, main, children))
            })
        };
        self.open_inline = open_inline;
        self.label_end = outer_end;
        let label = result?;
        if self.index != label_end {
            return self.abandon(ErrorKind::ExpectedToken, self.index);
        }
        Ok(Some(label))
    }

    /// An expression is flow content when nothing follows it on its line.
    pub(super) fn expression_is_flow(&self, start: TokenIndex) -> bool {
        self.pair(start).is_none_or(|end| self.is_line_end_at(end + 1))
    }

    /// Parses `{ ... }`. The body stays an opaque token range.
    pub(super) fn parse_expression(&mut self, tag: NodeTag) -> PResult<NodeIndex> {
        let main = self.index;
        let Some(end) = self.pair(main) else {
            return self.abandon(ErrorKind::UnclosedExpression, main);
        };
        self.index = end + 1;
        let body = IndexRange::new(main + 1, end);
        let extra = append_record(&mut self.extra, &ExpressionRecord { body })?;
        self.push_leaf(Node::new(tag, main, NodeData::Extra(extra)))
    }
}

/// Tokens read as literal text inside inline content.
fn is_literal(tag: TokenTag) -> bool {
    matches!(
        tag,
        TokenTag::Text
            | TokenTag::Indent
            | TokenTag::Newline
            | TokenTag::EmphasisEnd
            | TokenTag::StrongEnd
            | TokenTag::LinkEnd
            | TokenTag::LinkUrlStart
            | TokenTag::LinkUrl
            | TokenTag::LinkUrlEnd
            | TokenTag::TaskChecked
            | TokenTag::TaskUnchecked
    )
}
