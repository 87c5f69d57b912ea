//! Recursive-descent parser over the frozen token list.
//!
//! ## Node construction
//!
//! A construct reserves its node slot before its children are parsed, so
//! a parent's index is always lower than its children's. Children are
//! collected on a shared scratch stack: each construct remembers the stack
//! height on entry and truncates back to it on exit. When the construct is
//! complete its slot is finalized; when it is abandoned its slot is
//! retracted.
//!
//! ## Errors
//!
//! A grammar violation is recorded as a [`SyntaxError`] and unwinds to the
//! nearest block boundary as [`Failure::Abandoned`]. The block loop then
//! [recovers](Parser::recover) by scanning forward to a token that can
//! start a new block. Only [`Failure::Fatal`] escapes a parse.
//!
//! ## Lookahead
//!
//! Before parsing, one pass over the tokens pairs every `[`, `{` and `<`
//! with the token that ends it, and every opening tag with its closing
//! tag. Deciding whether a construct is complete is then a table lookup.

mod block;
mod element;
mod inline;

use std::collections::TryReserveError;

use drop_bomb::DropBomb;
use mdxtree_ast::{
    Ast, ErrorKind, IndexRange, Node, NodeData, NodeIndex, NodeStore, NodeTag, SmallSpan, Span,
    SyntaxError, Token, TokenIndex, TokenTag,
};
use tracing::{debug, trace, warn};

use crate::error::ParseError;
use crate::options::ParseOptions;

/// Why a parse function did not produce a node.
#[derive(Debug)]
pub(crate) enum Failure {
    /// A syntax error was recorded; the enclosing block must recover.
    Abandoned,
    /// The whole parse must stop.
    Fatal(ParseError),
}

impl From<TryReserveError> for Failure {
    fn from(error: TryReserveError) -> Self {
        Failure::Fatal(ParseError::OutOfMemory(error))
    }
}

impl From<ParseError> for Failure {
    fn from(error: ParseError) -> Self {
        Failure::Fatal(error)
    }
}

pub(crate) type PResult<T> = Result<T, Failure>;

/// A reserved node slot that must be finalized or retracted.
struct Reservation {
    index: NodeIndex,
    bomb: DropBomb,
}

/// Loop iterations allowed per token before the parse is declared stuck.
const STEPS_PER_TOKEN: usize = 16;

/// Containers that may be open at once.
pub(crate) const MAX_NESTING: u32 = 128;

/// Entry of the pairing table for a token that closes nothing.
const UNPAIRED: TokenIndex = TokenIndex::MAX;

pub(crate) struct Parser<'src, 'opts> {
    source: &'src str,
    tokens: Vec<Token>,
    index: TokenIndex,
    /// See [`Parser::pair_tokens`].
    pairs: Vec<TokenIndex>,
    nodes: NodeStore,
    extra: Vec<u32>,
    scratch: Vec<NodeIndex>,
    errors: Vec<SyntaxError>,
    options: &'opts ParseOptions,
    steps: usize,
    step_limit: usize,
    error_cap_reached: bool,
    /// Containers currently being built.
    nesting: u32,

    // Inline context.
    /// Inline content stops at every newline (headings, blockquote lines).
    line_bound: bool,
    /// Number of elements whose children are being parsed.
    element_depth: u32,
    quote_depth: u32,
    /// Closing markers of the open emphasis and strong spans.
    open_inline: Vec<TokenTag>,
    /// Index of the `]` ending the link label being parsed.
    label_end: Option<TokenIndex>,
}

impl<'src, 'opts> Parser<'src, 'opts> {
    pub(crate) fn new(source: &'src str, tokens: Vec<Token>, options: &'opts ParseOptions) -> Self {
        let step_limit = tokens.len().saturating_mul(STEPS_PER_TOKEN).saturating_add(1024);
        Self {
            source,
            tokens,
            index: 0,
            pairs: Vec::new(),
            nodes: NodeStore::new(),
            extra: Vec::new(),
            scratch: Vec::new(),
            errors: Vec::new(),
            options,
            steps: 0,
            step_limit,
            error_cap_reached: false,
            nesting: 0,
            line_bound: false,
            element_depth: 0,
            quote_depth: 0,
            open_inline: Vec::new(),
            label_end: None,
        }
    }

    /// Parses `document := preamble? block*`.
    pub(crate) fn parse_document(mut self) -> Result<Ast<'src>, ParseError> {
        self.pair_tokens()?;
        self.nodes.try_reserve(self.tokens.len() / 2 + 1)?;
        let root = self.reserve().map_err(fatal)?;
        let children = match self.parse_document_children() {
            Ok(children) => children,
            Err(failure) => {
                self.retract(root);
                return Err(fatal(failure));
            }
        };
        let last = self.tokens.len().saturating_sub(1) as TokenIndex;
        self.finalize_through(root, Node::new(NodeTag::Document, 0, children), last);
        self.scratch.clear();

        debug!(
            tokens = self.tokens.len(),
            nodes = self.nodes.len(),
            extra_words = self.extra.len(),
            errors = self.errors.len(),
            steps = self.steps,
            "parsed document"
        );
        Ok(Ast::new(
            self.source,
            self.tokens,
            self.nodes,
            self.extra,
            self.errors,
        ))
    }

    fn parse_document_children(&mut self) -> PResult<NodeData> {
        if self.peek() == TokenTag::FrontmatterStart {
            let start = self.index;
            match self.parse_frontmatter() {
                Ok(node) => self.push_child(node)?,
                Err(Failure::Abandoned) => self.recover(start),
                Err(failure) => return Err(failure),
            }
        }
        self.parse_blocks(|_| false)?;
        self.children_data(0)
    }

    // === Token pairing ===

    /// Fills the pairing table in one pass.
    ///
    /// For a `[` or `![`, the entry is the `]` ending its label when a
    /// destination follows; labels never cross a blank line or a block
    /// marker. For a `{`, it is the balancing `}`. For a `<`, it is the `>`
    /// or `/>` ending the tag, and for the `>` of an opening tag, the `>`
    /// of its closing tag. Tags and elements opened inside braces are
    /// dropped when the braces close; tags never cross a blank line.
    fn pair_tokens(&mut self) -> Result<(), TryReserveError> {
        let len = self.tokens.len();
        self.pairs.try_reserve_exact(len)?;
        self.pairs.resize(len, UNPAIRED);

        let mut links: Vec<TokenIndex> = Vec::new();
        let mut braces: Vec<TokenIndex> = Vec::new();
        // Open tags and open elements, with the brace depth they began at.
        let mut tags: Vec<(TokenIndex, usize)> = Vec::new();
        let mut elements: Vec<(TokenIndex, usize)> = Vec::new();
        for i in 0..len {
            let index = i as TokenIndex;
            let tag = self.tokens[i].tag;
            match tag {
                TokenTag::LinkStart | TokenTag::ImageStart => {
                    links.try_reserve(1)?;
                    links.push(index);
                }
                TokenTag::LinkEnd => {
                    if let Some(start) = links.pop()
                        && self.tag_at(index + 1) == TokenTag::LinkUrlStart
                    {
                        self.pairs[start as usize] = index;
                    }
                }
                TokenTag::ExpressionStart => {
                    braces.try_reserve(1)?;
                    braces.push(index);
                }
                TokenTag::ExpressionEnd => {
                    if let Some(start) = braces.pop() {
                        self.pairs[start as usize] = index;
                    }
                    let depth = braces.len();
                    while tags.last().is_some_and(|&(_, d)| d > depth) {
                        tags.pop();
                    }
                    while elements.last().is_some_and(|&(_, d)| d > depth) {
                        elements.pop();
                    }
                }
                TokenTag::ElementStart => {
                    tags.try_reserve(1)?;
                    tags.push((index, braces.len()));
                }
                TokenTag::ElementEnd | TokenTag::ElementSelfClose => {
                    let Some((start, _)) = tags.pop() else {
                        continue;
                    };
                    self.pairs[start as usize] = index;
                    if tag == TokenTag::ElementSelfClose {
                        continue;
                    }
                    if self.tag_at(start + 1) != TokenTag::ElementSlash {
                        elements.try_reserve(1)?;
                        elements.push((index, braces.len()));
                    } else if let Some((open_end, _)) = elements.pop() {
                        self.pairs[open_end as usize] = index;
                    }
                }
                TokenTag::BlankLine => {
                    links.clear();
                    tags.clear();
                    elements.clear();
                }
                _ if tag.is_block_marker() => links.clear(),
                _ => {}
            }
        }
        Ok(())
    }

    /// The token paired with `index`, if any.
    #[inline]
    fn pair(&self, index: TokenIndex) -> Option<TokenIndex> {
        self.pairs
            .get(index as usize)
            .copied()
            .filter(|&pair| pair != UNPAIRED)
    }

    // === Token access ===

    #[inline]
    fn tag_at(&self, index: TokenIndex) -> TokenTag {
        self.tokens
            .get(index as usize)
            .map_or(TokenTag::Eof, |token| token.tag)
    }

    #[inline]
    fn peek(&self) -> TokenTag {
        self.tag_at(self.index)
    }

    #[inline]
    fn peek_nth(&self, n: u32) -> TokenTag {
        self.tag_at(self.index + n)
    }

    /// Moves to the next token. Never moves past end of input.
    #[inline]
    fn advance(&mut self) {
        if self.peek() != TokenTag::Eof {
            self.index += 1;
        }
    }

    fn eat(&mut self, tag: TokenTag) -> Option<TokenIndex> {
        if self.peek() == tag {
            let index = self.index;
            self.advance();
            Some(index)
        } else {
            None
        }
    }

    fn expect(&mut self, tag: TokenTag, kind: ErrorKind) -> PResult<TokenIndex> {
        match self.eat(tag) {
            Some(index) => Ok(index),
            None => self.abandon(kind, self.index),
        }
    }

    fn token_span(&self, index: TokenIndex) -> Span {
        let i = index as usize;
        let start = self.tokens.get(i).map_or(self.source.len() as u32, |t| t.start);
        let end = self
            .tokens
            .get(i + 1)
            .map_or(self.source.len() as u32, |t| t.start);
        Span::new(start, end)
    }

    fn token_slice(&self, index: TokenIndex) -> &'src str {
        let span = self.token_span(index);
        self.source.get(span.range()).unwrap_or("")
    }

    /// Returns true if the token at `index` ends a line.
    fn is_line_end_at(&self, index: TokenIndex) -> bool {
        matches!(
            self.tag_at(index),
            TokenTag::Newline | TokenTag::BlankLine | TokenTag::Eof
        )
    }

    /// Counts one loop iteration against the step budget.
    fn step(&mut self) -> PResult<()> {
        self.steps += 1;
        if self.steps > self.step_limit {
            return Err(Failure::Fatal(ParseError::internal(format!(
                "parser exceeded {} steps at token {}",
                self.step_limit, self.index
            ))));
        }
        Ok(())
    }

    // === Errors ===

    fn error(&mut self, kind: ErrorKind, token: TokenIndex) -> PResult<()> {
        if self.errors.len() >= self.options.max_errors {
            if !self.error_cap_reached {
                self.error_cap_reached = true;
                warn!(
                    max_errors = self.options.max_errors,
                    "error limit reached, further syntax errors are dropped"
                );
            }
            return Ok(());
        }
        self.errors.try_reserve(1)?;
        let span = self.token_span(token);
        self.errors.push(SyntaxError::new(kind, token, span));
        Ok(())
    }

    /// Records an error and abandons the current construct.
    fn abandon<T>(&mut self, kind: ErrorKind, token: TokenIndex) -> PResult<T> {
        self.error(kind, token)?;
        Err(Failure::Abandoned)
    }

    // === Node construction ===

    fn reserve(&mut self) -> PResult<Reservation> {
        let index = self.nodes.reserve(self.index)?;
        Ok(Reservation {
            index,
            bomb: DropBomb::new("node reservation must be finalized or retracted"),
        })
    }

    /// Finalizes a reservation; the node ends at the last consumed token.
    fn finalize(&mut self, reservation: Reservation, node: Node) {
        let last = self.index.saturating_sub(1);
        self.finalize_through(reservation, node, last);
    }

    fn finalize_through(&mut self, mut reservation: Reservation, node: Node, last: TokenIndex) {
        reservation.bomb.defuse();
        self.nodes.finalize(reservation.index, node, last);
    }

    fn retract(&mut self, mut reservation: Reservation) {
        reservation.bomb.defuse();
        self.nodes.retract(reservation.index);
    }

    /// Builds a container node.
    ///
    /// At most [`MAX_NESTING`] containers are open at once; a deeper one
    /// is abandoned. `parse` receives the scratch height its children start at and
    /// returns the finished node. The scratch stack is restored and the
    /// reservation retracted if it fails.
    fn build(&mut self, parse: impl FnOnce(&mut Self, usize) -> PResult<Node>) -> PResult<NodeIndex> {
        if self.nesting >= MAX_NESTING {
            return self.abandon(ErrorKind::NestingTooDeep, self.index);
        }
        let reservation = self.reserve()?;
        let index = reservation.index;
        let top = self.scratch.len();
        self.nesting += 1;
        let result = parse(self, top);
        self.nesting -= 1;
        self.scratch.truncate(top);
        match result {
            Ok(node) => {
                self.finalize(reservation, node);
                Ok(index)
            }
            Err(failure) => {
                self.retract(reservation);
                Err(failure)
            }
        }
    }

    /// Pushes a childless node ending at the last consumed token.
    fn push_leaf(&mut self, node: Node) -> PResult<NodeIndex> {
        let last = self.index.saturating_sub(1);
        Ok(self.nodes.push(node, last)?)
    }

    fn push_child(&mut self, node: NodeIndex) -> PResult<()> {
        self.scratch.try_reserve(1)?;
        self.scratch.push(node);
        Ok(())
    }

    /// Children above `top` as a compact payload.
    fn children_data(&mut self, top: usize) -> PResult<NodeData> {
        if let Some(small) = SmallSpan::from_slice(&self.scratch[top..]) {
            return Ok(NodeData::Small(small));
        }
        Ok(NodeData::Children(self.children_range(top)?))
    }

    /// Copies the children above `top` into extra data.
    fn children_range(&mut self, top: usize) -> PResult<IndexRange> {
        let count = self.scratch.len() - top;
        self.extra.try_reserve(count)?;
        let start = self.extra.len() as u32;
        self.extra.extend_from_slice(&self.scratch[top..]);
        Ok(IndexRange::new(start, self.extra.len() as u32))
    }

    // === Blocks and recovery ===

    /// Parses blocks into the scratch stack until end of input or until
    /// `at_end` holds.
    fn parse_blocks(&mut self, at_end: impl Fn(&Self) -> bool) -> PResult<()> {
        loop {
            self.step()?;
            while matches!(self.peek(), TokenTag::Newline | TokenTag::BlankLine) {
                self.advance();
            }
            if self.peek() == TokenTag::Eof || at_end(&*self) {
                return Ok(());
            }
            let start = self.index;
            if let Some(node) = self.parse_block_or_recover()? {
                self.push_child(node)?;
            }
            if self.index == start {
                self.error(ErrorKind::UnexpectedToken, start)?;
                self.advance();
            }
        }
    }

    /// Parses one block. A syntax failure is recovered from here.
    fn parse_block_or_recover(&mut self) -> PResult<Option<NodeIndex>> {
        let start = self.index;
        match self.parse_block() {
            Ok(node) => Ok(Some(node)),
            Err(Failure::Abandoned) => {
                self.recover(start);
                Ok(None)
            }
            Err(fatal) => Err(fatal),
        }
    }

    /// Skips forward from a failed block to a token that can start a new
    /// one.
    ///
    /// Always moves past `start`. Brackets and braces opened during the
    /// scan must close before a block marker is accepted, so recovery does
    /// not resume inside a nested construct. A blank line or end of input
    /// always stops the scan.
    fn recover(&mut self, start: TokenIndex) {
        if self.index <= start {
            self.index = start;
            self.advance();
        }
        let mut depth = 0u32;
        loop {
            let tag = self.peek();
            match tag {
                TokenTag::Eof | TokenTag::BlankLine => break,
                TokenTag::ExpressionStart | TokenTag::LinkStart | TokenTag::ImageStart => {
                    depth += 1;
                }
                TokenTag::ExpressionEnd | TokenTag::LinkEnd => depth = depth.saturating_sub(1),
                _ if depth == 0 && self.is_block_boundary() => break,
                _ => {}
            }
            self.advance();
        }
        trace!(start, resume = self.index, "recovered from syntax error");
    }

    fn is_block_boundary(&self) -> bool {
        let tag = self.peek();
        if tag.is_block_marker() {
            return true;
        }
        if tag != TokenTag::ElementStart {
            return false;
        }
        let closing = self.peek_nth(1) == TokenTag::ElementSlash;
        let line_start = self.index == 0
            || matches!(
                self.tag_at(self.index - 1),
                TokenTag::Newline | TokenTag::BlankLine | TokenTag::Indent
            );
        (closing && self.element_depth > 0) || (line_start && !closing)
    }

    /// Runs `parse` with a fresh inline context, as element children do.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let open_inline = std::mem::take(&mut self.open_inline);
        let label_end = self.label_end.take();
        let line_bound = std::mem::replace(&mut self.line_bound, false);
        let quote_depth = std::mem::replace(&mut self.quote_depth, 0);
        let result = parse(self);
        self.open_inline = open_inline;
        self.label_end = label_end;
        self.line_bound = line_bound;
        self.quote_depth = quote_depth;
        result
    }
}

fn fatal(failure: Failure) -> ParseError {
    match failure {
        Failure::Fatal(error) => error,
        Failure::Abandoned => ParseError::internal("syntax failure escaped the block loop"),
    }
}
