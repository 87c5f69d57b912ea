//! Node store: a structure-of-arrays table of parsed constructs.
//!
//! Every node is addressed by a dense [`NodeIndex`]. Payloads that do not
//! fit the compact [`NodeData`] slot live in the extra data array and are
//! referenced by index.

use std::collections::TryReserveError;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::token::TokenIndex;

/// Index of a node in the node store.
pub type NodeIndex = u32;

/// Index of the first word of a record in the extra data array.
pub type ExtraIndex = u32;

/// Kinds of syntax nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeTag {
    /// Root of every tree, always at index 0.
    Document,
    /// Metadata preamble. Its payload is the raw byte range.
    Frontmatter,
    EsmImport,
    EsmExport,
    Heading,
    Paragraph,
    CodeBlock,
    Blockquote,
    ListOrdered,
    ListUnordered,
    ListItem,
    ThematicBreak,
    Text,
    HardBreak,
    Strong,
    Emphasis,
    InlineCode,
    Link,
    Image,
    /// Container for a link label made of several inline nodes.
    LinkLabel,
    /// Expression standing on its own line.
    FlowExpression,
    /// Expression inside a line of text.
    TextExpression,
    Element,
    SelfClosingElement,
    Fragment,
    /// A reserved slot that was never finalized.
    Placeholder,
}

impl NodeTag {
    /// Returns true if this node is a block-level construct.
    #[inline]
    pub const fn is_block(&self) -> bool {
        matches!(
            self,
            NodeTag::Document
                | NodeTag::Frontmatter
                | NodeTag::EsmImport
                | NodeTag::EsmExport
                | NodeTag::Heading
                | NodeTag::Paragraph
                | NodeTag::CodeBlock
                | NodeTag::Blockquote
                | NodeTag::ListOrdered
                | NodeTag::ListUnordered
                | NodeTag::ListItem
                | NodeTag::ThematicBreak
                | NodeTag::FlowExpression
        )
    }

    /// Returns true if this node is an inline construct.
    #[inline]
    pub const fn is_inline(&self) -> bool {
        matches!(
            self,
            NodeTag::Text
                | NodeTag::HardBreak
                | NodeTag::Strong
                | NodeTag::Emphasis
                | NodeTag::InlineCode
                | NodeTag::Link
                | NodeTag::Image
                | NodeTag::LinkLabel
                | NodeTag::TextExpression
        )
    }

    /// Returns true for the element-tree variants.
    #[inline]
    pub const fn is_element(&self) -> bool {
        matches!(
            self,
            NodeTag::Element | NodeTag::SelfClosingElement | NodeTag::Fragment
        )
    }

    /// Returns the name of this node kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            NodeTag::Document => "Document",
            NodeTag::Frontmatter => "Frontmatter",
            NodeTag::EsmImport => "EsmImport",
            NodeTag::EsmExport => "EsmExport",
            NodeTag::Heading => "Heading",
            NodeTag::Paragraph => "Paragraph",
            NodeTag::CodeBlock => "CodeBlock",
            NodeTag::Blockquote => "Blockquote",
            NodeTag::ListOrdered => "ListOrdered",
            NodeTag::ListUnordered => "ListUnordered",
            NodeTag::ListItem => "ListItem",
            NodeTag::ThematicBreak => "ThematicBreak",
            NodeTag::Text => "Text",
            NodeTag::HardBreak => "HardBreak",
            NodeTag::Strong => "Strong",
            NodeTag::Emphasis => "Emphasis",
            NodeTag::InlineCode => "InlineCode",
            NodeTag::Link => "Link",
            NodeTag::Image => "Image",
            NodeTag::LinkLabel => "LinkLabel",
            NodeTag::FlowExpression => "FlowExpression",
            NodeTag::TextExpression => "TextExpression",
            NodeTag::Element => "Element",
            NodeTag::SelfClosingElement => "SelfClosingElement",
            NodeTag::Fragment => "Fragment",
            NodeTag::Placeholder => "Placeholder",
        }
    }
}

impl std::fmt::Display for NodeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A half-open range of indices into the extra data or token list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexRange {
    pub start: u32,
    pub end: u32,
}

impl IndexRange {
    pub const EMPTY: IndexRange = IndexRange { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub const fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

/// Up to two children stored inline in the node slot.
///
/// With two entries this is also the pair-of-nodes payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SmallSpan {
    len: u8,
    nodes: [NodeIndex; 2],
}

impl SmallSpan {
    /// Largest number of children stored inline.
    pub const CAPACITY: usize = 2;

    /// Builds an inline span from at most two children.
    ///
    /// Returns `None` if `children` has more than [`Self::CAPACITY`] entries.
    pub fn from_slice(children: &[NodeIndex]) -> Option<Self> {
        match *children {
            [] => Some(Self::default()),
            [a] => Some(Self {
                len: 1,
                nodes: [a, 0],
            }),
            [a, b] => Some(Self {
                len: 2,
                nodes: [a, b],
            }),
            _ => None,
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[NodeIndex] {
        &self.nodes[..self.len as usize]
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Compact per-node payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeData {
    #[default]
    None,
    /// A single token reference.
    Token(TokenIndex),
    /// Zero to two children stored inline.
    Small(SmallSpan),
    /// Three or more children stored as a run in extra data.
    Children(IndexRange),
    /// A structured record in extra data.
    Extra(ExtraIndex),
}

/// A node as read back from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub tag: NodeTag,
    pub main_token: TokenIndex,
    pub data: NodeData,
}

impl Node {
    #[inline]
    pub const fn new(tag: NodeTag, main_token: TokenIndex, data: NodeData) -> Self {
        Self {
            tag,
            main_token,
            data,
        }
    }
}

/// Structure-of-arrays node table.
///
/// Nodes are allocated with [`NodeStore::reserve`], which hands out the
/// final index before any child exists, and written once with
/// [`NodeStore::finalize`]. A reservation that is never finalized is
/// [`NodeStore::retract`]ed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStore {
    tags: Vec<NodeTag>,
    main_tokens: Vec<TokenIndex>,
    last_tokens: Vec<TokenIndex>,
    data: Vec<NodeData>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes room for `additional` more nodes without aborting on failure.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.tags.try_reserve(additional)?;
        self.main_tokens.try_reserve(additional)?;
        self.last_tokens.try_reserve(additional)?;
        self.data.try_reserve(additional)?;
        Ok(())
    }

    /// Allocates a slot anchored at `main_token` and returns its index.
    ///
    /// The slot reads as [`NodeTag::Placeholder`] until finalized.
    pub fn reserve(&mut self, main_token: TokenIndex) -> Result<NodeIndex, TryReserveError> {
        self.try_reserve(1)?;
        let index = self.tags.len() as NodeIndex;
        self.tags.push(NodeTag::Placeholder);
        self.main_tokens.push(main_token);
        self.last_tokens.push(main_token);
        self.data.push(NodeData::None);
        Ok(index)
    }

    /// Writes the final tag and payload of a reserved slot.
    ///
    /// `last_token` is the last token covered by the node.
    pub fn finalize(&mut self, index: NodeIndex, node: Node, last_token: TokenIndex) {
        let i = index as usize;
        self.tags[i] = node.tag;
        self.main_tokens[i] = node.main_token;
        self.last_tokens[i] = last_token.max(node.main_token);
        self.data[i] = node.data;
    }

    /// Abandons a reserved slot.
    ///
    /// The most recently allocated slot is removed outright. Any other slot
    /// stays behind as an inert placeholder.
    pub fn retract(&mut self, index: NodeIndex) {
        let i = index as usize;
        if i + 1 == self.tags.len() {
            self.tags.pop();
            self.main_tokens.pop();
            self.last_tokens.pop();
            self.data.pop();
        } else {
            self.tags[i] = NodeTag::Placeholder;
            self.last_tokens[i] = self.main_tokens[i];
            self.data[i] = NodeData::None;
        }
    }

    /// Allocates and finalizes a childless node in one step.
    pub fn push(&mut self, node: Node, last_token: TokenIndex) -> Result<NodeIndex, TryReserveError> {
        let index = self.reserve(node.main_token)?;
        self.finalize(index, node, last_token);
        Ok(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    #[inline]
    pub fn tag(&self, index: NodeIndex) -> NodeTag {
        self.tags[index as usize]
    }

    #[inline]
    pub fn main_token(&self, index: NodeIndex) -> TokenIndex {
        self.main_tokens[index as usize]
    }

    #[inline]
    pub fn last_token(&self, index: NodeIndex) -> TokenIndex {
        self.last_tokens[index as usize]
    }

    #[inline]
    pub fn data(&self, index: NodeIndex) -> NodeData {
        self.data[index as usize]
    }

    #[inline]
    pub fn data_ref(&self, index: NodeIndex) -> &NodeData {
        &self.data[index as usize]
    }

    /// Returns the node at `index`.
    pub fn get(&self, index: NodeIndex) -> Node {
        Node::new(self.tag(index), self.main_token(index), self.data(index))
    }

    /// Column of node tags, in index order.
    pub fn tags(&self) -> &[NodeTag] {
        &self.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reserve_then_finalize() {
        let mut store = NodeStore::new();
        let doc = store.reserve(0).unwrap();
        assert_eq!(store.tag(doc), NodeTag::Placeholder);

        let text = store
            .push(Node::new(NodeTag::Text, 0, NodeData::Token(0)), 0)
            .unwrap();
        let children = SmallSpan::from_slice(&[text]).unwrap();
        store.finalize(doc, Node::new(NodeTag::Document, 0, NodeData::Small(children)), 1);

        assert_eq!(doc, 0);
        assert_eq!(text, 1);
        assert_eq!(store.tag(doc), NodeTag::Document);
        assert_eq!(store.last_token(doc), 1);
        assert_eq!(store.get(text).data, NodeData::Token(0));
    }

    #[test]
    fn test_retract_last_slot_removes_it() {
        let mut store = NodeStore::new();
        store.reserve(0).unwrap();
        let slot = store.reserve(3).unwrap();
        store.retract(slot);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_retract_inner_slot_leaves_placeholder() {
        let mut store = NodeStore::new();
        let slot = store.reserve(0).unwrap();
        store
            .push(Node::new(NodeTag::Text, 1, NodeData::None), 1)
            .unwrap();
        store.retract(slot);
        assert_eq!(store.len(), 2);
        assert_eq!(store.tag(slot), NodeTag::Placeholder);
        assert_eq!(store.data(slot), NodeData::None);
    }

    #[test]
    fn test_small_span_capacity() {
        assert!(SmallSpan::from_slice(&[]).unwrap().is_empty());
        assert_eq!(SmallSpan::from_slice(&[4, 9]).unwrap().as_slice(), &[4, 9]);
        assert!(SmallSpan::from_slice(&[1, 2, 3]).is_none());
    }

    #[test]
    fn test_node_tag_classification() {
        assert!(NodeTag::Paragraph.is_block());
        assert!(!NodeTag::Paragraph.is_inline());
        assert!(NodeTag::Strong.is_inline());
        assert!(NodeTag::Fragment.is_element());
        assert_eq!(NodeTag::ListItem.to_string(), "ListItem");
    }

    #[test]
    fn test_index_range() {
        let range = IndexRange::new(3, 7);
        assert_eq!(range.len(), 4);
        assert_eq!(range.range(), 3..7);
        assert!(IndexRange::EMPTY.is_empty());
    }
}
