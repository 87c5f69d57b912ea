//! Block grammar: headings, paragraphs, lists, quotes, code and ESM.

use mdxtree_ast::extra::append_record;
use mdxtree_ast::{
    CodeBlockRecord, ErrorKind, FrontmatterRecord, HeadingRecord, ListItemRecord, Node, NodeData,
    NodeIndex, NodeTag, Span, TaskState, TokenIndex, TokenTag,
};

use super::element::Placement;
use super::{PResult, Parser};

impl<'src> Parser<'src, '_> {
    /// Parses the `---` preamble. Its content stays opaque.
    pub(super) fn parse_frontmatter(&mut self) -> PResult<NodeIndex> {
        let main = self.index;
        self.advance();
        self.expect(TokenTag::Newline, ErrorKind::UnclosedPreamble)?;
        let content = self.eat(TokenTag::FrontmatterContent);
        self.eat(TokenTag::Newline);
        if self.eat(TokenTag::FrontmatterEnd).is_none() {
            return self.abandon(ErrorKind::UnclosedPreamble, main);
        }
        let content = match content {
            Some(token) => self.token_span(token),
            None => {
                let at = self.token_span(self.index - 1).start;
                Span::new(at, at)
            }
        };
        let extra = append_record(&mut self.extra, &FrontmatterRecord { content })?;
        self.push_leaf(Node::new(NodeTag::Frontmatter, main, NodeData::Extra(extra)))
    }

    /// Dispatches on the first token of a block.
    pub(super) fn parse_block(&mut self) -> PResult<NodeIndex> {
        match self.peek() {
            TokenTag::Indent => {
                if self.peek_nth(1).is_list_marker() {
                    return self.parse_list();
                }
                self.advance();
                self.parse_block()
            }
            TokenTag::HeadingStart => self.parse_heading(),
            TokenTag::ThematicBreak => {
                let main = self.index;
                self.advance();
                self.push_leaf(Node::new(NodeTag::ThematicBreak, main, NodeData::None))
            }
            TokenTag::CodeFenceStart => self.parse_code_block(),
            TokenTag::BlockquoteMarker => self.parse_blockquote(),
            TokenTag::ListMarkerUnordered | TokenTag::ListMarkerOrdered => self.parse_list(),
            tag @ (TokenTag::EsmImport | TokenTag::EsmExport) => {
                let main = self.index;
                self.advance();
                let node_tag = if tag == TokenTag::EsmImport {
                    NodeTag::EsmImport
                } else {
                    NodeTag::EsmExport
                };
                self.push_leaf(Node::new(node_tag, main, NodeData::Token(main)))
            }
            TokenTag::ElementStart => {
                if self.peek_nth(1) == TokenTag::ElementSlash {
                    return self.abandon(ErrorKind::UnexpectedToken, self.index);
                }
                if self.element_is_flow(self.index) {
                    self.parse_element(Placement::Flow)
                } else {
                    self.parse_paragraph()
                }
            }
            TokenTag::ExpressionStart => {
                if self.expression_is_flow(self.index) {
                    self.parse_expression(NodeTag::FlowExpression)
                } else {
                    self.parse_paragraph()
                }
            }
            tag if starts_paragraph(tag) => self.parse_paragraph(),
            _ => self.abandon(ErrorKind::ExpectedBlockElement, self.index),
        }
    }

    fn parse_heading(&mut self) -> PResult<NodeIndex> {
        let main = self.index;
        let level = self
            .token_slice(main)
            .bytes()
            .take_while(|&b| b == b'#')
            .count() as u32;
        if level > u32::from(self.options.max_heading_level) {
            self.error(ErrorKind::HeadingTooDeep, main)?;
        }
        self.build(|p, top| {
            p.advance();
            let line_bound = std::mem::replace(&mut p.line_bound, true);
            let result = p.parse_inline_content();
            p.line_bound = line_bound;
            result?;
            let children = p.children_range(top)?;
            let extra = append_record(&mut p.extra, &HeadingRecord { level, children })?;
            Ok(Node::new(NodeTag::Heading, main, NodeData::Extra(extra)))
        })
    }

    /// A paragraph ends before the newline that ends it.
    pub(super) fn parse_paragraph(&mut self) -> PResult<NodeIndex> {
        self.build(|p, top| {
            let main = p.index;
            p.parse_inline_content()?;
            let children = p.children_data(top)?;
            Ok(Node::new(NodeTag::Paragraph, main, children))
        })
    }

    fn parse_code_block(&mut self) -> PResult<NodeIndex> {
        let main = self.index;
        self.advance();
        let info = self.eat(TokenTag::CodeFenceInfo);
        self.eat(TokenTag::Newline);
        let content = self.eat(TokenTag::CodeContent);
        // The closing fence may follow indentation and, inside a quote,
        // the quote's own markers.
        let mut close = self.index;
        while matches!(self.tag_at(close), TokenTag::Indent | TokenTag::BlockquoteMarker) {
            close += 1;
        }
        if self.tag_at(close) == TokenTag::CodeFenceEnd {
            self.index = close;
        }
        if self.eat(TokenTag::CodeFenceEnd).is_none() {
            // Unclosed fences keep their content; the block is still usable.
            self.error(ErrorKind::ExpectedToken, main)?;
        }
        let extra = append_record(&mut self.extra, &CodeBlockRecord { info, content })?;
        self.push_leaf(Node::new(NodeTag::CodeBlock, main, NodeData::Extra(extra)))
    }

    /// Parses consecutive `>` lines. Each line holds one line-bound block;
    /// only the outermost quote continues onto following lines.
    fn parse_blockquote(&mut self) -> PResult<NodeIndex> {
        self.build(|p, top| {
            let main = p.index;
            let line_bound = std::mem::replace(&mut p.line_bound, true);
            p.quote_depth += 1;
            let result = p.parse_quote_lines();
            p.quote_depth -= 1;
            p.line_bound = line_bound;
            result?;
            let children = p.children_data(top)?;
            Ok(Node::new(NodeTag::Blockquote, main, children))
        })
    }

    fn parse_quote_lines(&mut self) -> PResult<()> {
        loop {
            self.step()?;
            self.advance();
            if !self.is_line_end_at(self.index) {
                let start = self.index;
                if let Some(node) = self.parse_block_or_recover()? {
                    self.push_child(node)?;
                }
                if self.index == start {
                    self.advance();
                }
            }
            if self.quote_depth > 1 {
                return Ok(());
            }
            // A hard break ending a quoted line stays in the quote.
            self.eat(TokenTag::HardBreak);
            let line_end = self.index;
            self.eat(TokenTag::Newline);
            if self.peek() != TokenTag::BlockquoteMarker {
                self.index = line_end;
                return Ok(());
            }
        }
    }

    /// Parses a list at the current `[Indent] marker` line.
    ///
    /// Items continue while lines carry a marker of the same kind at the
    /// same indentation. Deeper markers nest inside the previous item.
    fn parse_list(&mut self) -> PResult<NodeIndex> {
        let Some((indent, marker)) = self.list_line_at(self.index) else {
            return self.abandon(ErrorKind::ExpectedToken, self.index);
        };
        let marker_tag = self.tag_at(marker);
        let tag = if marker_tag == TokenTag::ListMarkerOrdered {
            NodeTag::ListOrdered
        } else {
            NodeTag::ListUnordered
        };
        self.build(|p, top| {
            loop {
                p.step()?;
                p.eat(TokenTag::Indent);
                let item = p.parse_list_item(indent)?;
                p.push_child(item)?;

                let item_end = p.index;
                while matches!(p.peek(), TokenTag::Newline | TokenTag::BlankLine) {
                    p.advance();
                }
                match p.list_line_at(p.index) {
                    Some((next_indent, next)) if next_indent == indent && p.tag_at(next) == marker_tag => {}
                    _ => {
                        p.index = item_end;
                        break;
                    }
                }
            }
            let children = p.children_data(top)?;
            Ok(Node::new(tag, marker, children))
        })
    }

    fn parse_list_item(&mut self, indent: usize) -> PResult<NodeIndex> {
        self.build(|p, top| {
            let main = p.index;
            p.advance();
            let task = match p.peek() {
                TokenTag::TaskChecked => TaskState::Checked,
                TokenTag::TaskUnchecked => TaskState::Unchecked,
                _ => TaskState::None,
            };
            if task != TaskState::None {
                p.advance();
            }
            p.parse_inline_content()?;

            while p.peek() == TokenTag::Newline {
                match p.list_line_at(p.index + 1) {
                    Some((nested, _)) if nested > indent => {
                        p.step()?;
                        p.advance();
                        let list = p.parse_list()?;
                        p.push_child(list)?;
                    }
                    _ => break,
                }
            }
            let children = p.children_range(top)?;
            let extra = append_record(&mut p.extra, &ListItemRecord { task, children })?;
            Ok(Node::new(NodeTag::ListItem, main, NodeData::Extra(extra)))
        })
    }

    /// Indentation width and marker token of a list line at `index`.
    fn list_line_at(&self, index: TokenIndex) -> Option<(usize, TokenIndex)> {
        match self.tag_at(index) {
            TokenTag::Indent if self.tag_at(index + 1).is_list_marker() => {
                Some((self.indent_width(index), index + 1))
            }
            tag if tag.is_list_marker() => Some((0, index)),
            _ => None,
        }
    }

    /// Column width of an indent token; a tab counts as four columns.
    fn indent_width(&self, index: TokenIndex) -> usize {
        self.token_slice(index)
            .bytes()
            .map(|b| if b == b'\t' { 4 } else { 1 })
            .sum()
    }

    /// Returns true if the newline at `index` ends the current paragraph.
    pub(super) fn paragraph_ends_at(&self, index: TokenIndex) -> bool {
        let mut next = index + 1;
        if self.tag_at(next) == TokenTag::Indent {
            next += 1;
        }
        match self.tag_at(next) {
            TokenTag::Eof | TokenTag::BlankLine => true,
            tag if tag.is_block_marker() => true,
            TokenTag::ElementStart => {
                self.element_depth > 0 && self.tag_at(next + 1) == TokenTag::ElementSlash
            }
            _ => false,
        }
    }
}

/// Tokens that can open a paragraph.
fn starts_paragraph(tag: TokenTag) -> bool {
    matches!(
        tag,
        TokenTag::Text
            | TokenTag::Invalid
            | TokenTag::HardBreak
            | TokenTag::EmphasisStart
            | TokenTag::EmphasisEnd
            | TokenTag::StrongStart
            | TokenTag::StrongEnd
            | TokenTag::CodeInlineStart
            | TokenTag::LinkStart
            | TokenTag::ImageStart
            | TokenTag::LinkEnd
            | TokenTag::LinkUrlStart
            | TokenTag::LinkUrl
            | TokenTag::LinkUrlEnd
            | TokenTag::TaskChecked
            | TokenTag::TaskUnchecked
    )
}
