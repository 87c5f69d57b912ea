//! The frozen parse result and its read-only traversal surface.

use crate::error::SyntaxError;
use crate::extra::{
    AttributeRecord, CodeBlockRecord, ElementRecord, ExpressionRecord, ExtraRecord,
    FrontmatterRecord, HeadingRecord, LinkRecord, ListItemRecord, NONE_WORD,
};
use crate::node::{ExtraIndex, IndexRange, Node, NodeData, NodeIndex, NodeStore, NodeTag};
use crate::span::{LineIndex, Position, Span};
use crate::token::{Token, TokenIndex, TokenTag};

/// A parsed document: tokens, nodes, extra data and syntax errors.
///
/// The root document node is always at index 0. Nothing in an `Ast` is
/// mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ast<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    nodes: NodeStore,
    extra_data: Vec<u32>,
    errors: Vec<SyntaxError>,
}

impl<'src> Ast<'src> {
    pub fn new(
        source: &'src str,
        tokens: Vec<Token>,
        nodes: NodeStore,
        extra_data: Vec<u32>,
        errors: Vec<SyntaxError>,
    ) -> Self {
        Self {
            source,
            tokens,
            nodes,
            extra_data,
            errors,
        }
    }

    #[inline]
    pub fn source(&self) -> &'src str {
        self.source
    }

    // === Tokens ===

    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[inline]
    pub fn token_tag(&self, token: TokenIndex) -> TokenTag {
        self.tokens[token as usize].tag
    }

    /// Byte range covered by a token: its start up to the next token's start.
    pub fn token_span(&self, token: TokenIndex) -> Span {
        let i = token as usize;
        let start = self.tokens[i].start;
        let end = self
            .tokens
            .get(i + 1)
            .map_or(self.source.len() as u32, |next| next.start);
        Span::new(start, end)
    }

    /// Source text covered by a token.
    pub fn token_slice(&self, token: TokenIndex) -> &'src str {
        &self.source[self.token_span(token).range()]
    }

    /// Source text covered by a half-open token range.
    pub fn token_range_slice(&self, range: IndexRange) -> &'src str {
        if range.is_empty() {
            return "";
        }
        let start = self.token_span(range.start).start;
        let end = self.token_span(range.end - 1).end;
        &self.source[start as usize..end as usize]
    }

    // === Nodes ===

    #[inline]
    pub fn nodes(&self) -> &NodeStore {
        &self.nodes
    }

    #[inline]
    pub fn node(&self, node: NodeIndex) -> Node {
        self.nodes.get(node)
    }

    #[inline]
    pub fn tag(&self, node: NodeIndex) -> NodeTag {
        self.nodes.tag(node)
    }

    /// Index of the document node.
    #[inline]
    pub const fn root(&self) -> NodeIndex {
        0
    }

    /// Ordered children of a node, whichever payload form holds them.
    pub fn children(&self, node: NodeIndex) -> &[NodeIndex] {
        let tag = self.nodes.tag(node);
        match self.nodes.data_ref(node) {
            NodeData::Small(span) => span.as_slice(),
            NodeData::Children(range) => &self.extra_data[range.range()],
            &NodeData::Extra(index) => match tag {
                NodeTag::Heading => self.extra_range(self.extra::<HeadingRecord>(index).children),
                NodeTag::ListItem => {
                    self.extra_range(self.extra::<ListItemRecord>(index).children)
                }
                NodeTag::Element | NodeTag::SelfClosingElement | NodeTag::Fragment => {
                    self.extra_range(self.extra::<ElementRecord>(index).children)
                }
                NodeTag::Link | NodeTag::Image => {
                    let i = index as usize;
                    if self.extra_data[i] == NONE_WORD {
                        &[]
                    } else {
                        &self.extra_data[i..i + 1]
                    }
                }
                _ => &[],
            },
            NodeData::None | NodeData::Token(_) => &[],
        }
    }

    fn extra_range(&self, range: IndexRange) -> &[u32] {
        &self.extra_data[range.range()]
    }

    /// Source range from the node's first token to the end of its last.
    pub fn node_span(&self, node: NodeIndex) -> Span {
        let first = self.token_span(self.nodes.main_token(node));
        let last = self.token_span(self.nodes.last_token(node));
        first.merge(&last)
    }

    /// Source text covered by a node.
    pub fn node_text(&self, node: NodeIndex) -> &'src str {
        &self.source[self.node_span(node).range()]
    }

    // === Extra data ===

    #[inline]
    pub fn extra_data(&self) -> &[u32] {
        &self.extra_data
    }

    /// Decodes the record starting at `index`.
    #[inline]
    pub fn extra<R: ExtraRecord>(&self, index: ExtraIndex) -> R {
        R::decode(&self.extra_data[index as usize..])
    }

    fn record<R: ExtraRecord>(&self, node: NodeIndex, tags: &[NodeTag]) -> Option<R> {
        if !tags.contains(&self.nodes.tag(node)) {
            return None;
        }
        match self.nodes.data(node) {
            NodeData::Extra(index) => Some(self.extra(index)),
            _ => None,
        }
    }

    // === Errors ===

    #[inline]
    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// Returns true if any error-severity entry was recorded.
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|e| !e.is_warning())
    }

    // === Typed accessors ===

    pub fn heading_level(&self, node: NodeIndex) -> Option<u32> {
        self.record::<HeadingRecord>(node, &[NodeTag::Heading])
            .map(|r| r.level)
    }

    pub fn element(&self, node: NodeIndex) -> Option<ElementRecord> {
        self.record(
            node,
            &[
                NodeTag::Element,
                NodeTag::SelfClosingElement,
                NodeTag::Fragment,
            ],
        )
    }

    /// Tag name of an element. `None` for fragments.
    pub fn element_name(&self, node: NodeIndex) -> Option<&'src str> {
        self.element(node)?.name.map(|t| self.token_slice(t))
    }

    /// Attributes of an element in source order.
    pub fn attributes(&self, node: NodeIndex) -> impl Iterator<Item = AttributeRecord> + '_ {
        let range = self.element(node).map_or(IndexRange::EMPTY, |e| e.attributes);
        range
            .range()
            .step_by(AttributeRecord::WORDS)
            .map(move |i| self.extra::<AttributeRecord>(i as ExtraIndex))
    }

    pub fn attribute_name(&self, attribute: &AttributeRecord) -> Option<&'src str> {
        attribute.name.map(|t| self.token_slice(t))
    }

    /// Raw value text: the quoted string or the expression body.
    pub fn attribute_value(&self, attribute: &AttributeRecord) -> &'src str {
        self.token_range_slice(attribute.value)
    }

    pub fn link(&self, node: NodeIndex) -> Option<LinkRecord> {
        self.record(node, &[NodeTag::Link, NodeTag::Image])
    }

    pub fn link_url(&self, node: NodeIndex) -> Option<&'src str> {
        self.link(node)?.url.map(|t| self.token_slice(t))
    }

    pub fn list_item(&self, node: NodeIndex) -> Option<ListItemRecord> {
        self.record(node, &[NodeTag::ListItem])
    }

    /// Start number of an ordered list, read from its first marker.
    pub fn list_start(&self, node: NodeIndex) -> Option<u64> {
        if self.nodes.tag(node) != NodeTag::ListOrdered {
            return None;
        }
        let marker = self.token_slice(self.nodes.main_token(node));
        let digits = marker
            .trim_start()
            .split(|c: char| !c.is_ascii_digit())
            .next()?;
        digits.parse().ok()
    }

    pub fn code_block(&self, node: NodeIndex) -> Option<CodeBlockRecord> {
        self.record(node, &[NodeTag::CodeBlock])
    }

    /// Info string of a fenced code block, trimmed.
    pub fn code_info(&self, node: NodeIndex) -> Option<&'src str> {
        let info = self.token_slice(self.code_block(node)?.info?).trim();
        (!info.is_empty()).then_some(info)
    }

    /// Raw content of a code block or inline code span.
    pub fn code_content(&self, node: NodeIndex) -> Option<&'src str> {
        match self.nodes.tag(node) {
            NodeTag::CodeBlock => self.code_block(node)?.content.map(|t| self.token_slice(t)),
            NodeTag::InlineCode => match self.nodes.data(node) {
                NodeData::Token(t) => Some(self.token_slice(t)),
                _ => Some(""),
            },
            _ => None,
        }
    }

    /// Raw preamble text, uninterpreted.
    pub fn frontmatter(&self, node: NodeIndex) -> Option<&'src str> {
        let record = self.record::<FrontmatterRecord>(node, &[NodeTag::Frontmatter])?;
        self.source.get(record.content.range())
    }

    pub fn expression(&self, node: NodeIndex) -> Option<ExpressionRecord> {
        self.record(node, &[NodeTag::FlowExpression, NodeTag::TextExpression])
    }

    /// Opaque body text between the braces of an expression.
    pub fn expression_source(&self, node: NodeIndex) -> Option<&'src str> {
        Some(self.token_range_slice(self.expression(node)?.body))
    }

    // === Positions ===

    /// Line and column of a byte offset. Offsets past the end are clamped
    /// to it.
    ///
    /// Each call indexes the source; use [`Ast::line_index`] for many
    /// lookups.
    pub fn line_col(&self, offset: u32) -> Position {
        let offset = offset.min(self.source.len() as u32);
        self.line_index().position(offset)
    }

    /// Builds a reusable index for many position lookups.
    pub fn line_index(&self) -> LineIndex {
        LineIndex::new(self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extra::{AttributeKind, append_record};
    use crate::node::SmallSpan;
    use pretty_assertions::assert_eq;

    /// `<A b="c">x y z</A>` assembled by hand.
    fn element_ast() -> Ast<'static> {
        let source = "<A b=\"c\">x y z</A>";
        let tokens = vec![
            Token::new(TokenTag::ElementStart, 0),
            Token::new(TokenTag::ElementName, 1),
            Token::new(TokenTag::ElementWhitespace, 2),
            Token::new(TokenTag::ElementName, 3),
            Token::new(TokenTag::ElementEquals, 4),
            Token::new(TokenTag::ElementString, 5),
            Token::new(TokenTag::ElementEnd, 8),
            Token::new(TokenTag::Text, 9),
            Token::new(TokenTag::Text, 11),
            Token::new(TokenTag::Text, 13),
            Token::new(TokenTag::ElementStart, 14),
            Token::new(TokenTag::ElementSlash, 15),
            Token::new(TokenTag::ElementName, 16),
            Token::new(TokenTag::ElementEnd, 17),
            Token::new(TokenTag::Eof, 18),
        ];
        let mut nodes = NodeStore::new();
        let mut extra = Vec::new();

        let doc = nodes.reserve(0).unwrap();
        let element = nodes.reserve(0).unwrap();
        let texts: Vec<_> = (7..10)
            .map(|t| {
                nodes
                    .push(Node::new(NodeTag::Text, t, NodeData::Token(t)), t)
                    .unwrap()
            })
            .collect();

        let attrs_start = extra.len() as u32;
        append_record(
            &mut extra,
            &AttributeRecord {
                name: Some(3),
                kind: AttributeKind::String,
                value: IndexRange::new(5, 6),
            },
        )
        .unwrap();
        let attributes = IndexRange::new(attrs_start, extra.len() as u32);
        let children_start = extra.len() as u32;
        extra.extend_from_slice(&texts);
        let children = IndexRange::new(children_start, extra.len() as u32);
        let record = append_record(
            &mut extra,
            &ElementRecord {
                name: Some(1),
                attributes,
                children,
            },
        )
        .unwrap();
        nodes.finalize(
            element,
            Node::new(NodeTag::Element, 0, NodeData::Extra(record)),
            13,
        );
        nodes.finalize(
            doc,
            Node::new(
                NodeTag::Document,
                0,
                NodeData::Small(SmallSpan::from_slice(&[element]).unwrap()),
            ),
            14,
        );
        Ast::new(source, tokens, nodes, extra, Vec::new())
    }

    #[test]
    fn test_children_from_small_span_and_record() {
        let ast = element_ast();
        assert_eq!(ast.children(ast.root()), &[1]);
        assert_eq!(ast.children(1), &[2, 3, 4]);
        assert!(ast.children(2).is_empty());
    }

    #[test]
    fn test_element_accessors() {
        let ast = element_ast();
        assert_eq!(ast.element_name(1), Some("A"));
        let attributes: Vec<_> = ast.attributes(1).collect();
        assert_eq!(attributes.len(), 1);
        assert_eq!(ast.attribute_name(&attributes[0]), Some("b"));
        assert_eq!(ast.attribute_value(&attributes[0]), "\"c\"");
        assert_eq!(ast.element_name(2), None);
    }

    #[test]
    fn test_spans_and_slices() {
        let ast = element_ast();
        assert_eq!(ast.token_slice(5), "\"c\"");
        assert_eq!(ast.token_span(14), Span::new(18, 18));
        assert_eq!(ast.node_text(1), "<A b=\"c\">x y z</A>");
        assert_eq!(ast.node_text(3), "y ");
        assert_eq!(ast.node_span(ast.root()), Span::new(0, 18));
    }

    #[test]
    fn test_line_col() {
        let ast = Ast::new(
            "a\nbc\n",
            vec![Token::new(TokenTag::Eof, 5)],
            NodeStore::new(),
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(ast.line_col(0), Position::new(1, 0));
        assert_eq!(ast.line_col(3), Position::new(2, 1));
        assert_eq!(ast.line_col(5), Position::new(3, 0));
        assert_eq!(ast.line_index().position(3), Position::new(2, 1));
        assert_eq!(ast.line_col(99), Position::new(3, 0));
    }

    #[test]
    fn test_line_col_agrees_with_line_index() {
        let source = "# T\r\n\nfirst\nsecond\r\n";
        let ast = Ast::new(
            source,
            vec![Token::new(TokenTag::Eof, source.len() as u32)],
            NodeStore::new(),
            Vec::new(),
            Vec::new(),
        );
        let index = ast.line_index();
        for offset in 0..=source.len() as u32 {
            assert_eq!(ast.line_col(offset), index.position(offset), "offset {offset}");
        }
    }
}
