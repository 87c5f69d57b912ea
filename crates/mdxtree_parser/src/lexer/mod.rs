//! Mode-stacked lexer.
//!
//! The lexer turns the whole source into a flat token list in one pass.
//! Three sub-grammars share one [`Cursor`]:
//!
//! - `markdown` (default): block markers at the start of a line, then
//!   inline markers and text.
//! - `element`: from `<` through the end of the tag.
//! - `expression`: from `{` to its balancing `}`.
//!
//! Entering a nested region pushes the current mode onto an explicit stack
//! and the region's closing delimiter pops it, so nesting depth is plain
//! data rather than call-stack recursion.
//!
//! Every step must advance the cursor and emit at least one token. A step
//! that does neither is reported as [`ParseError::Internal`] instead of
//! looping forever.

mod cursor;
mod element;
mod expression;
mod markdown;

use mdxtree_ast::{Token, TokenTag};
use tracing::debug;

use crate::error::ParseError;
use crate::options::ParseOptions;

use cursor::Cursor;

/// Active sub-grammar of the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Markdown,
    Element,
    Expression,
}

/// Tokenizes `source` with the given options.
///
/// Fails only when the source is too large to address, on allocation
/// failure, or on an internal invariant violation.
pub fn tokenize(source: &str, options: &ParseOptions) -> Result<Vec<Token>, ParseError> {
    check_input_len(source, options)?;
    Lexer::new(source, options).tokenize()
}

pub(crate) fn check_input_len(source: &str, options: &ParseOptions) -> Result<(), ParseError> {
    let limit = options.input_limit();
    if source.len() > limit {
        return Err(ParseError::InputTooLarge {
            len: source.len(),
            limit,
        });
    }
    Ok(())
}

/// Lexer state for one invocation.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    tokens: Vec<Token>,
    mode: Mode,
    stack: Vec<Mode>,
    /// Offset where the current line starts.
    line_start: usize,
    /// Offset where block markers are recognized: the line start, moved
    /// past indentation and blockquote markers.
    block_start: usize,
    emphasis_depth: u32,
    strong_depth: u32,
    bracket_depth: u32,
    /// The current line opened with a heading marker.
    heading_line: bool,
    /// Elements opened from markdown whose closing tag has not been seen.
    element_depth: u32,
    /// The tag being lexed starts with `</`.
    closing_tag: bool,
    /// Matching `)` offsets for the `(`s of the line scanned last, indexed
    /// from `paren_start`.
    paren_match: Vec<u32>,
    paren_start: usize,
    paren_end: usize,
    frontmatter: bool,
    esm: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str, options: &ParseOptions) -> Self {
        Self {
            cursor: Cursor::new(source),
            tokens: Vec::new(),
            mode: Mode::Markdown,
            stack: Vec::new(),
            line_start: 0,
            block_start: 0,
            emphasis_depth: 0,
            strong_depth: 0,
            bracket_depth: 0,
            heading_line: false,
            element_depth: 0,
            closing_tag: false,
            paren_match: Vec::new(),
            paren_start: 0,
            paren_end: 0,
            frontmatter: options.frontmatter,
            esm: options.esm,
        }
    }

    /// Open emphasis and strong markers at the current position.
    pub fn marker_depths(&self) -> (u32, u32) {
        (self.emphasis_depth, self.strong_depth)
    }

    /// Open elements whose body is being lexed as markdown.
    pub fn element_depth(&self) -> u32 {
        self.element_depth
    }

    /// Number of enclosing modes below the active one.
    pub fn mode_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Runs the lexer to the end of the source.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, ParseError> {
        let len = self.cursor.text().len();
        if len > u32::MAX as usize {
            return Err(ParseError::InputTooLarge {
                len,
                limit: u32::MAX as usize,
            });
        }
        self.tokens.try_reserve(len / 4 + 2)?;

        if self.frontmatter {
            self.lex_frontmatter()?;
        }

        while !self.cursor.is_eof() {
            let before = self.cursor.pos();
            let emitted = self.tokens.len();
            match self.mode {
                Mode::Markdown => self.lex_markdown()?,
                Mode::Element => self.lex_element()?,
                Mode::Expression => self.lex_expression()?,
            }
            if self.cursor.pos() <= before || self.tokens.len() == emitted {
                return Err(ParseError::internal(format!(
                    "lexer made no progress at offset {before} in {:?} mode",
                    self.mode
                )));
            }
        }

        self.push(TokenTag::Eof, len)?;
        self.check_tokens()?;

        debug!(
            tokens = self.tokens.len(),
            bytes = len,
            mode_depth = self.stack.len(),
            "tokenized source"
        );
        Ok(std::mem::take(&mut self.tokens))
    }

    /// Verifies that no token except the last is empty.
    fn check_tokens(&self) -> Result<(), ParseError> {
        if let Some(first) = self.tokens.first()
            && first.start != 0
        {
            return Err(ParseError::internal("first token does not start at 0"));
        }
        for pair in self.tokens.windows(2) {
            if pair[0].start >= pair[1].start {
                return Err(ParseError::internal(format!(
                    "empty {:?} token at offset {}",
                    pair[0].tag, pair[0].start
                )));
            }
        }
        Ok(())
    }

    #[inline]
    fn push(&mut self, tag: TokenTag, start: usize) -> Result<(), ParseError> {
        self.tokens.try_reserve(1)?;
        self.tokens.push(Token::new(tag, start as u32));
        Ok(())
    }

    /// Emits a token from the cursor to `end` and moves the cursor there.
    fn emit_to(&mut self, tag: TokenTag, end: usize) -> Result<(), ParseError> {
        self.push(tag, self.cursor.pos())?;
        self.cursor.seek(end);
        Ok(())
    }

    fn enter(&mut self, mode: Mode) -> Result<(), ParseError> {
        self.stack.try_reserve(1)?;
        self.stack.push(self.mode);
        self.mode = mode;
        Ok(())
    }

    fn leave(&mut self) {
        self.mode = self.stack.pop().unwrap_or(Mode::Markdown);
    }

    /// Emits `<` and switches to element mode.
    fn open_tag(&mut self, pos: usize) -> Result<(), ParseError> {
        self.emit_to(TokenTag::ElementStart, pos + 1)?;
        self.closing_tag = false;
        self.enter(Mode::Element)
    }

    /// Marks a new line starting at `offset`.
    fn start_line(&mut self, offset: usize) {
        self.line_start = offset;
        self.block_start = offset;
    }

    /// Resets inline marker state at a block boundary.
    fn end_block(&mut self) {
        self.emphasis_depth = 0;
        self.strong_depth = 0;
        self.bracket_depth = 0;
        self.heading_line = false;
    }

    /// Returns true if the line at `offset` is `---` plus optional blanks.
    fn is_preamble_delimiter(&self, offset: usize) -> bool {
        let end = self.cursor.line_end(offset);
        self.cursor.rest_from(offset).starts_with("---")
            && self.cursor.text().as_bytes()[offset + 3..end]
                .iter()
                .all(|&b| b == b' ' || b == b'\t')
    }

    /// Lexes a `---` preamble at offset 0.
    ///
    /// The content is one opaque token. Without a closing delimiter the
    /// content runs to the end of the source.
    fn lex_frontmatter(&mut self) -> Result<(), ParseError> {
        if !self.is_preamble_delimiter(0) {
            return Ok(());
        }
        let len = self.cursor.text().len();
        let open_end = self.cursor.line_end(0);
        self.push(TokenTag::FrontmatterStart, 0)?;
        let newline = self.cursor.newline_len(open_end);
        if newline == 0 {
            self.cursor.seek(open_end);
            return Ok(());
        }
        self.push(TokenTag::Newline, open_end)?;

        let content_start = open_end + newline;
        let mut line = content_start;
        let mut close = None;
        while line < len {
            if self.is_preamble_delimiter(line) {
                close = Some(line);
                break;
            }
            let next = self.cursor.next_line_start(line);
            if next == line {
                break;
            }
            line = next;
        }

        match close {
            Some(close) => {
                if close > content_start {
                    let mut content_end = close - 1;
                    if content_end > content_start && self.cursor.byte_at(content_end - 1) == b'\r'
                    {
                        content_end -= 1;
                    }
                    if content_end > content_start {
                        self.push(TokenTag::FrontmatterContent, content_start)?;
                    }
                    self.push(TokenTag::Newline, content_end)?;
                }
                self.push(TokenTag::FrontmatterEnd, close)?;
                self.cursor.seek(self.cursor.line_end(close));
                self.line_start = close;
                self.block_start = usize::MAX;
            }
            None => {
                if content_start < len {
                    self.push(TokenTag::FrontmatterContent, content_start)?;
                }
                self.cursor.seek(len);
            }
        }
        Ok(())
    }
}
