//! Markdown mode: block markers at line start, inline markers and text.

use mdxtree_ast::TokenTag;

use super::{Lexer, Mode};
use crate::error::ParseError;

#[inline]
fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

#[inline]
fn is_line_end(b: u8) -> bool {
    matches!(b, b'\n' | b'\r' | b'\0')
}

#[inline]
fn is_control(b: u8) -> bool {
    (b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r')) || b == 0x7f
}

/// First byte after `<` that opens an element: a name, `/` or `>`.
#[inline]
pub(super) fn is_element_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || matches!(b, b'_' | b'$' | b'/' | b'>')
}

/// Which way an emphasis marker resolves.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Marker {
    Open,
    Close,
}

impl<'src> Lexer<'src> {
    pub(super) fn lex_markdown(&mut self) -> Result<(), ParseError> {
        let pos = self.cursor.pos();
        if pos == self.line_start {
            if self.cursor.is_blank_line(pos) {
                return self.lex_blank_line();
            }
            if self.esm && self.at_esm_boundary() && self.lex_esm()? {
                return Ok(());
            }
            if is_blank(self.cursor.peek()) {
                self.cursor.advance_while(is_blank);
                self.push(TokenTag::Indent, pos)?;
                self.block_start = self.cursor.pos();
                return Ok(());
            }
        }
        if pos == self.block_start && self.lex_block_marker()? {
            return Ok(());
        }
        // No block construct matched: the same offset is read as inline
        // content. Block checks only peek, so `pos` is still current.
        self.lex_inline()
    }

    fn lex_blank_line(&mut self) -> Result<(), ParseError> {
        let start = self.cursor.pos();
        let next = self.cursor.next_line_start(start);
        self.push(TokenTag::BlankLine, start)?;
        self.cursor.seek(next);
        self.start_line(next);
        self.end_block();
        Ok(())
    }

    /// ESM is read only at the top level: outside any element body, on the
    /// first line or after a blank line or the frontmatter.
    fn at_esm_boundary(&self) -> bool {
        if self.element_depth > 0 {
            return false;
        }
        let mut tags = self.tokens.iter().rev().map(|t| t.tag);
        matches!(
            (tags.next(), tags.next()),
            (None, _)
                | (Some(TokenTag::BlankLine), _)
                | (Some(TokenTag::Newline), Some(TokenTag::FrontmatterEnd))
        )
    }

    /// `import`/`export` at column 0, running to the next blank line.
    fn lex_esm(&mut self) -> Result<bool, ParseError> {
        let pos = self.cursor.pos();
        let rest = self.cursor.rest_from(pos);
        let tag = if rest.starts_with("import") {
            TokenTag::EsmImport
        } else if rest.starts_with("export") {
            TokenTag::EsmExport
        } else {
            return Ok(false);
        };
        if !matches!(self.cursor.byte_at(pos + 6), b' ' | b'\t' | b'{' | b'*') {
            return Ok(false);
        }

        let len = self.cursor.text().len();
        let mut end = self.cursor.line_end(pos);
        loop {
            let newline = self.cursor.newline_len(end);
            let next = end + newline;
            if newline == 0 || next >= len || self.cursor.is_blank_line(next) {
                break;
            }
            end = self.cursor.line_end(next);
        }
        self.emit_to(tag, end)?;
        self.end_block();
        Ok(true)
    }

    /// Tries every block marker at the block start.
    fn lex_block_marker(&mut self) -> Result<bool, ParseError> {
        match self.cursor.peek() {
            b'#' => self.lex_heading(),
            b'`' | b'~' => self.lex_code_fence(),
            b'>' => {
                let pos = self.cursor.pos();
                let width = if is_blank(self.cursor.peek_nth(1)) { 2 } else { 1 };
                self.emit_to(TokenTag::BlockquoteMarker, pos + width)?;
                self.block_start = self.cursor.pos();
                Ok(true)
            }
            b @ (b'-' | b'*' | b'_') => {
                if self.lex_thematic_break(b)? {
                    return Ok(true);
                }
                if b == b'_' {
                    return Ok(false);
                }
                self.lex_list_marker(1, TokenTag::ListMarkerUnordered)
            }
            b'+' => self.lex_list_marker(1, TokenTag::ListMarkerUnordered),
            b'0'..=b'9' => {
                let pos = self.cursor.pos();
                let digits = self.cursor.text().as_bytes()[pos..]
                    .iter()
                    .take_while(|b| b.is_ascii_digit())
                    .count();
                if digits > 9 || !matches!(self.cursor.byte_at(pos + digits), b'.' | b')') {
                    return Ok(false);
                }
                self.lex_list_marker(digits + 1, TokenTag::ListMarkerOrdered)
            }
            _ => Ok(false),
        }
    }

    fn lex_heading(&mut self) -> Result<bool, ParseError> {
        let pos = self.cursor.pos();
        let level = self.cursor.run_len(pos, b'#');
        let after = self.cursor.byte_at(pos + level);
        if !is_blank(after) && !is_line_end(after) {
            return Ok(false);
        }
        self.end_block();
        self.cursor.advance(level);
        self.cursor.advance_while(is_blank);
        self.push(TokenTag::HeadingStart, pos)?;
        self.heading_line = true;
        Ok(true)
    }

    fn lex_thematic_break(&mut self, marker: u8) -> Result<bool, ParseError> {
        let pos = self.cursor.pos();
        let end = self.cursor.line_end(pos);
        let line = &self.cursor.text().as_bytes()[pos..end];
        let count = line.iter().filter(|&&b| b == marker).count();
        if count < 3 || !line.iter().all(|&b| b == marker || is_blank(b)) {
            return Ok(false);
        }
        self.end_block();
        self.emit_to(TokenTag::ThematicBreak, end)?;
        Ok(true)
    }

    /// Emits a list marker of `width` bytes if a blank or line end follows,
    /// then a task checkbox if one is present.
    fn lex_list_marker(&mut self, width: usize, tag: TokenTag) -> Result<bool, ParseError> {
        let pos = self.cursor.pos();
        let after = self.cursor.byte_at(pos + width);
        if !is_blank(after) && !is_line_end(after) {
            return Ok(false);
        }
        self.end_block();
        self.cursor.advance(width);
        self.cursor.advance_while(is_blank);
        self.push(tag, pos)?;

        let at = self.cursor.pos();
        let task = match (
            self.cursor.byte_at(at),
            self.cursor.byte_at(at + 1),
            self.cursor.byte_at(at + 2),
            self.cursor.byte_at(at + 3),
        ) {
            (b'[', b' ', b']', b) if is_blank(b) || is_line_end(b) => Some(TokenTag::TaskUnchecked),
            (b'[', b'x' | b'X', b']', b) if is_blank(b) || is_line_end(b) => {
                Some(TokenTag::TaskChecked)
            }
            _ => None,
        };
        if let Some(task) = task {
            self.cursor.advance(3);
            self.cursor.advance_while(is_blank);
            self.push(task, at)?;
        }
        Ok(true)
    }

    /// Fenced code block: opening fence, info, one content token and the
    /// closing fence. An unclosed fence runs to the end of the source.
    ///
    /// A fence opened inside blockquotes only continues on lines carrying
    /// the same number of `>` markers. Those markers stay in the content
    /// token, except on the closing line where they are emitted as tokens.
    /// The first line without them ends the block unclosed.
    fn lex_code_fence(&mut self) -> Result<bool, ParseError> {
        let pos = self.cursor.pos();
        let fence = self.cursor.peek();
        let width = self.cursor.run_len(pos, fence);
        if width < 3 {
            return Ok(false);
        }
        let open_end = self.cursor.line_end(pos);
        let info = &self.cursor.text()[pos + width..open_end];
        if fence == b'`' && info.contains('`') {
            return Ok(false);
        }

        let quotes = self
            .tokens
            .iter()
            .rev()
            .take_while(|t| t.start as usize >= self.line_start)
            .filter(|t| t.tag == TokenTag::BlockquoteMarker)
            .count();

        self.end_block();
        self.push(TokenTag::CodeFenceStart, pos)?;
        if !info.is_empty() {
            self.push(TokenTag::CodeFenceInfo, pos + width)?;
        }
        let newline = self.cursor.newline_len(open_end);
        if newline == 0 {
            self.cursor.seek(open_end);
            return Ok(true);
        }
        self.push(TokenTag::Newline, open_end)?;

        let len = self.cursor.text().len();
        let content_start = open_end + newline;
        let mut line = content_start;
        while line < len {
            let Some(body) = self.quoted_line_body(line, quotes) else {
                if content_start < line {
                    self.push(TokenTag::CodeContent, content_start)?;
                }
                self.cursor.seek(line);
                self.start_line(line);
                return Ok(true);
            };
            let indent = self.cursor.text().as_bytes()[body..]
                .iter()
                .take_while(|&&b| is_blank(b))
                .count();
            let run = self.cursor.run_len(body + indent, fence);
            if run >= width && self.cursor.is_blank_line(body + indent + run) {
                if line > content_start {
                    self.push(TokenTag::CodeContent, content_start)?;
                }
                self.push_quote_markers(line, quotes)?;
                if indent > 0 {
                    self.push(TokenTag::Indent, body)?;
                }
                self.push(TokenTag::CodeFenceEnd, body + indent)?;
                self.cursor.seek(self.cursor.line_end(line));
                self.line_start = line;
                self.block_start = usize::MAX;
                return Ok(true);
            }
            let next = self.cursor.next_line_start(line);
            if next == line {
                break;
            }
            line = next;
        }

        if content_start < len {
            self.push(TokenTag::CodeContent, content_start)?;
        }
        self.cursor.seek(len);
        Ok(true)
    }

    /// Offset after `quotes` blockquote markers at the start of `line`, or
    /// `None` if the line has fewer.
    fn quoted_line_body(&self, line: usize, quotes: usize) -> Option<usize> {
        let mut at = line;
        for _ in 0..quotes {
            at += self.cursor.run_while(at, is_blank);
            if self.cursor.byte_at(at) != b'>' {
                return None;
            }
            at += 1;
            if is_blank(self.cursor.byte_at(at)) {
                at += 1;
            }
        }
        Some(at)
    }

    /// Emits the blockquote markers of a closing fence line.
    fn push_quote_markers(&mut self, line: usize, quotes: usize) -> Result<(), ParseError> {
        let mut at = line;
        for _ in 0..quotes {
            let blanks = self.cursor.run_while(at, is_blank);
            if blanks > 0 {
                self.push(TokenTag::Indent, at)?;
                at += blanks;
            }
            self.push(TokenTag::BlockquoteMarker, at)?;
            at += 1;
            if is_blank(self.cursor.byte_at(at)) {
                at += 1;
            }
        }
        Ok(())
    }

    fn lex_inline(&mut self) -> Result<(), ParseError> {
        let pos = self.cursor.pos();
        match self.cursor.peek() {
            b'\n' => self.lex_newline(1),
            b'\r' if self.cursor.peek_nth(1) == b'\n' => self.lex_newline(2),
            b' ' if self.hard_break_len(pos) > 0 => self.lex_hard_break(),
            b'\\' if self.cursor.newline_len(pos + 1) > 0 => self.lex_hard_break(),
            b'*' | b'_' => self.lex_emphasis(),
            b'`' => self.lex_code_span(),
            b'[' => {
                self.bracket_depth += 1;
                self.emit_to(TokenTag::LinkStart, pos + 1)
            }
            b'!' if self.cursor.peek_nth(1) == b'[' => {
                self.bracket_depth += 1;
                self.emit_to(TokenTag::ImageStart, pos + 2)
            }
            b']' if self.bracket_depth > 0 => self.lex_link_end(),
            b'<' if is_element_start(self.cursor.peek_nth(1)) => self.open_tag(pos),
            b'{' => {
                self.emit_to(TokenTag::ExpressionStart, pos + 1)?;
                self.enter(Mode::Expression)
            }
            b if is_control(b) => self.emit_to(TokenTag::Invalid, pos + 1),
            _ => self.lex_text(),
        }
    }

    fn lex_newline(&mut self, width: usize) -> Result<(), ParseError> {
        let pos = self.cursor.pos();
        self.emit_to(TokenTag::Newline, pos + width)?;
        self.start_line(pos + width);
        if self.heading_line {
            self.end_block();
        }
        Ok(())
    }

    /// Length of a run of two or more spaces ending the line at `offset`,
    /// terminator included. Zero if there is none.
    fn hard_break_len(&self, offset: usize) -> usize {
        let spaces = self.cursor.run_len(offset, b' ');
        let newline = self.cursor.newline_len(offset + spaces);
        if spaces >= 2 && newline > 0 {
            spaces + newline
        } else {
            0
        }
    }

    fn lex_hard_break(&mut self) -> Result<(), ParseError> {
        let pos = self.cursor.pos();
        // A heading ends with its line: a trailing backslash stays text and
        // trailing spaces belong to the newline.
        if self.heading_line {
            if self.cursor.peek() == b'\\' {
                return self.emit_to(TokenTag::Text, pos + 1);
            }
            return self.lex_newline(self.hard_break_len(pos));
        }
        let len = if self.cursor.peek() == b'\\' {
            1 + self.cursor.newline_len(pos + 1)
        } else {
            self.hard_break_len(pos)
        };
        self.emit_to(TokenTag::HardBreak, pos + len)?;
        self.start_line(pos + len);
        Ok(())
    }

    /// Resolves a `*` or `_` run against the open marker counters.
    ///
    /// A run of one is emphasis, two is strong, three is both. Runs inside
    /// a word, longer runs and runs that can neither open nor close are
    /// literal text.
    fn lex_emphasis(&mut self) -> Result<(), ParseError> {
        let pos = self.cursor.pos();
        let marker = self.cursor.peek();
        let run = self.cursor.run_len(pos, marker);
        let prev = self.cursor.char_before(pos);
        let next = self.cursor.char_at(pos + run);

        let mid_word = prev.is_some_and(char::is_alphanumeric) && next.is_some_and(char::is_alphanumeric);
        let can_open = next.is_some_and(|c| !c.is_whitespace());
        let can_close = prev.is_some_and(|c| !c.is_whitespace());
        let resolve = |depth: u32| {
            if depth > 0 && can_close {
                Some(Marker::Close)
            } else if depth == 0 && can_open {
                Some(Marker::Open)
            } else {
                None
            }
        };

        let emphasis = resolve(self.emphasis_depth);
        let strong = resolve(self.strong_depth);
        let plan = match (mid_word, run) {
            (false, 1) => emphasis.map(|e| (Some(e), None)),
            (false, 2) => strong.map(|s| (None, Some(s))),
            (false, 3) => emphasis.zip(strong).map(|(e, s)| (Some(e), Some(s))),
            _ => None,
        };
        let Some((emphasis, strong)) = plan else {
            return self.emit_to(TokenTag::Text, pos + run);
        };

        // Closers before openers; emphasis is the inner marker of a triple.
        let mut at = pos;
        if emphasis == Some(Marker::Close) {
            self.push(TokenTag::EmphasisEnd, at)?;
            self.emphasis_depth -= 1;
            at += 1;
        }
        if strong == Some(Marker::Close) {
            self.push(TokenTag::StrongEnd, at)?;
            self.strong_depth -= 1;
            at += 2;
        }
        if strong == Some(Marker::Open) {
            self.push(TokenTag::StrongStart, at)?;
            self.strong_depth += 1;
            at += 2;
        }
        if emphasis == Some(Marker::Open) {
            self.push(TokenTag::EmphasisStart, at)?;
            self.emphasis_depth += 1;
            at += 1;
        }
        self.cursor.seek(at);
        Ok(())
    }

    /// Code span: a backtick run closed by a run of the same length before
    /// the next blank line. Otherwise the run is literal.
    fn lex_code_span(&mut self) -> Result<(), ParseError> {
        let pos = self.cursor.pos();
        let width = self.cursor.run_len(pos, b'`');
        let bytes = self.cursor.text().as_bytes();

        let mut i = pos + width;
        let mut close = None;
        while i < bytes.len() {
            match bytes[i] {
                b'`' => {
                    let run = self.cursor.run_len(i, b'`');
                    if run == width {
                        close = Some(i);
                        break;
                    }
                    i += run;
                }
                b'\n' => {
                    if i + 1 >= bytes.len() || self.cursor.is_blank_line(i + 1) {
                        break;
                    }
                    i += 1;
                }
                _ => i += 1,
            }
        }

        let Some(close) = close else {
            return self.emit_to(TokenTag::Text, pos + width);
        };
        self.push(TokenTag::CodeInlineStart, pos)?;
        if close > pos + width {
            self.push(TokenTag::CodeInlineContent, pos + width)?;
            if let Some(newline) = bytes[pos + width..close].iter().rposition(|&b| b == b'\n') {
                self.line_start = pos + width + newline + 1;
            }
        }
        self.push(TokenTag::CodeInlineEnd, close)?;
        self.cursor.seek(close + width);
        Ok(())
    }

    /// `]`, plus a `(destination)` when one directly follows.
    fn lex_link_end(&mut self) -> Result<(), ParseError> {
        let pos = self.cursor.pos();
        self.bracket_depth -= 1;
        self.emit_to(TokenTag::LinkEnd, pos + 1)?;
        if self.cursor.peek() != b'(' {
            return Ok(());
        }

        let url_start = pos + 2;
        let Some(i) = self.paren_close(pos + 1)? else {
            return Ok(());
        };

        self.push(TokenTag::LinkUrlStart, pos + 1)?;
        if i > url_start {
            self.push(TokenTag::LinkUrl, url_start)?;
        }
        self.push(TokenTag::LinkUrlEnd, i)?;
        self.cursor.seek(i + 1);
        Ok(())
    }

    /// The `)` balancing the `(` at `open` on the same line.
    ///
    /// Matches are computed for the rest of the line on first use and
    /// reused by later destinations on that line.
    fn paren_close(&mut self, open: usize) -> Result<Option<usize>, ParseError> {
        if open < self.paren_start || open >= self.paren_end {
            self.match_parens(open)?;
        }
        let close = self.paren_match[open - self.paren_start];
        Ok((close != u32::MAX).then_some(close as usize))
    }

    fn match_parens(&mut self, start: usize) -> Result<(), ParseError> {
        let bytes = self.cursor.text().as_bytes();
        let end = bytes[start..]
            .iter()
            .position(|&b| matches!(b, b'\n' | b'\r'))
            .map_or(bytes.len(), |i| start + i);
        self.paren_match.clear();
        self.paren_match.try_reserve(end - start)?;
        self.paren_match.resize(end - start, u32::MAX);

        let mut open = Vec::new();
        let mut i = start;
        while i < end {
            match bytes[i] {
                b'\\' => i += 1,
                b'(' => {
                    open.try_reserve(1)?;
                    open.push(i);
                }
                b')' => {
                    if let Some(at) = open.pop() {
                        self.paren_match[at - start] = i as u32;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        self.paren_start = start;
        self.paren_end = end;
        Ok(())
    }

    /// Returns true if the byte at `offset` must stop a text run.
    fn stops_text(&self, offset: usize) -> bool {
        match self.cursor.byte_at(offset) {
            b'\n' | b'\r' | b'*' | b'_' | b'`' | b'[' | b'{' | b'\\' => true,
            b'!' => self.cursor.byte_at(offset + 1) == b'[',
            b']' => self.bracket_depth > 0,
            b'<' => is_element_start(self.cursor.byte_at(offset + 1)),
            b' ' => self.hard_break_len(offset) > 0,
            b => is_control(b),
        }
    }

    /// Plain text. The first character is always consumed, so a byte that
    /// looked like a construct but opened nothing still advances the cursor.
    fn lex_text(&mut self) -> Result<(), ParseError> {
        let pos = self.cursor.pos();
        let first = match self.cursor.peek() {
            b'\\' if self.cursor.peek_nth(1).is_ascii_punctuation() => 2,
            b if b.is_ascii() => 1,
            _ => self.cursor.char_at(pos).map_or(1, char::len_utf8),
        };
        self.cursor.advance(first);
        loop {
            let at = self.cursor.pos();
            if self.cursor.is_eof() {
                break;
            }
            if self.cursor.peek() == b'\\' {
                let next = self.cursor.peek_nth(1);
                if next.is_ascii_punctuation() {
                    self.cursor.advance(2);
                    continue;
                }
                if self.cursor.newline_len(at + 1) > 0 {
                    break;
                }
                self.cursor.advance(1);
                continue;
            }
            if self.stops_text(at) {
                break;
            }
            // Non-ASCII bytes never stop a run, so byte steps stay on
            // character boundaries at every stop.
            self.cursor.advance(1);
        }
        self.push(TokenTag::Text, pos)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::lex;
    use super::super::{Lexer, tokenize};
    use crate::options::ParseOptions;
    use mdxtree_ast::TokenTag::{self, *};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn tags(source: &str) -> Vec<TokenTag> {
        lex(source).into_iter().map(|(tag, _)| tag).collect()
    }

    #[test]
    fn test_heading_and_paragraph() {
        assert_eq!(
            lex("# Hello World\n\nThis is a test.\n"),
            vec![
                (HeadingStart, "# "),
                (Text, "Hello World"),
                (Newline, "\n"),
                (BlankLine, "\n"),
                (Text, "This is a test."),
                (Newline, "\n"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn test_heading_level_is_not_capped() {
        assert_eq!(lex("######## deep")[0], (HeadingStart, "######## "));
    }

    #[test]
    fn test_hash_without_space_is_text() {
        assert_eq!(lex("#tag"), vec![(Text, "#tag"), (Eof, "")]);
    }

    #[test]
    fn test_strong() {
        assert_eq!(
            lex("This has **bold text** in it.\n"),
            vec![
                (Text, "This has "),
                (StrongStart, "**"),
                (Text, "bold text"),
                (StrongEnd, "**"),
                (Text, " in it."),
                (Newline, "\n"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn test_triple_marker_opens_and_closes_both() {
        assert_eq!(
            tags("***x***"),
            vec![StrongStart, EmphasisStart, Text, EmphasisEnd, StrongEnd, Eof]
        );
    }

    #[rstest]
    #[case("snake_case_name")]
    #[case("a * b")]
    #[case("a ****b")]
    fn test_literal_markers(#[case] source: &str) {
        assert!(
            tags(source)
                .iter()
                .all(|tag| matches!(tag, Text | Eof)),
            "{source}"
        );
    }

    #[rstest]
    #[case("*a*", (0, 0))]
    #[case("**a** *b*", (0, 0))]
    #[case("*a", (1, 0))]
    #[case("**a", (0, 1))]
    #[case("*a\n\n**b", (0, 1))]
    fn test_marker_depths(#[case] source: &str, #[case] expected: (u32, u32)) {
        let mut lexer = Lexer::new(source, &ParseOptions::default());
        lexer.tokenize().unwrap();
        assert_eq!(lexer.marker_depths(), expected);
    }

    #[test]
    fn test_line_start_marker_falls_back_to_inline() {
        assert_eq!(
            lex("**bold** start"),
            vec![
                (StrongStart, "**"),
                (Text, "bold"),
                (StrongEnd, "**"),
                (Text, " start"),
                (Eof, ""),
            ]
        );
        assert_eq!(
            tags("-x"),
            vec![Text, Eof],
        );
    }

    #[test]
    fn test_lists_and_tasks() {
        assert_eq!(
            lex("- [ ] a\n  1. [x] b\n"),
            vec![
                (ListMarkerUnordered, "- "),
                (TaskUnchecked, "[ ] "),
                (Text, "a"),
                (Newline, "\n"),
                (Indent, "  "),
                (ListMarkerOrdered, "1. "),
                (TaskChecked, "[x] "),
                (Text, "b"),
                (Newline, "\n"),
                (Eof, ""),
            ]
        );
    }

    #[rstest]
    #[case("---", ThematicBreak)]
    #[case("* * *", ThematicBreak)]
    #[case("___", ThematicBreak)]
    #[case("> q", BlockquoteMarker)]
    #[case("+ a", ListMarkerUnordered)]
    #[case("12) a", ListMarkerOrdered)]
    fn test_block_markers(#[case] source: &str, #[case] expected: TokenTag) {
        let options = ParseOptions {
            frontmatter: false,
            ..ParseOptions::default()
        };
        let tokens = tokenize(source, &options).unwrap();
        assert_eq!(tokens[0].tag, expected);
    }

    #[test]
    fn test_code_fence() {
        assert_eq!(
            lex("```rust\nlet a = *b*;\n  ```\nafter"),
            vec![
                (CodeFenceStart, "```"),
                (CodeFenceInfo, "rust"),
                (Newline, "\n"),
                (CodeContent, "let a = *b*;\n"),
                (Indent, "  "),
                (CodeFenceEnd, "```"),
                (Newline, "\n"),
                (Text, "after"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn test_unclosed_code_fence_runs_to_end() {
        assert_eq!(
            lex("~~~\ncode\n\nmore"),
            vec![
                (CodeFenceStart, "~~~"),
                (Newline, "\n"),
                (CodeContent, "code\n\nmore"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn test_code_fence_inside_blockquote() {
        assert_eq!(
            lex("> ```\n> a\n>  ```\n\nb"),
            vec![
                (BlockquoteMarker, "> "),
                (CodeFenceStart, "```"),
                (Newline, "\n"),
                (CodeContent, "> a\n"),
                (BlockquoteMarker, "> "),
                (Indent, " "),
                (CodeFenceEnd, "```"),
                (Newline, "\n"),
                (BlankLine, "\n"),
                (Text, "b"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn test_quoted_code_fence_ends_at_unquoted_line() {
        assert_eq!(
            lex("> ```\n> a\n\n# T"),
            vec![
                (BlockquoteMarker, "> "),
                (CodeFenceStart, "```"),
                (Newline, "\n"),
                (CodeContent, "> a\n"),
                (BlankLine, "\n"),
                (HeadingStart, "# "),
                (Text, "T"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn test_code_span() {
        assert_eq!(
            lex("a `b*c` d"),
            vec![
                (Text, "a "),
                (CodeInlineStart, "`"),
                (CodeInlineContent, "b*c"),
                (CodeInlineEnd, "`"),
                (Text, " d"),
                (Eof, ""),
            ]
        );
        assert_eq!(tags("a `` b"), vec![Text, Text, Text, Eof]);
    }

    #[test]
    fn test_link_and_image() {
        assert_eq!(
            lex("[a](b(c)) ![i](u)"),
            vec![
                (LinkStart, "["),
                (Text, "a"),
                (LinkEnd, "]"),
                (LinkUrlStart, "("),
                (LinkUrl, "b(c)"),
                (LinkUrlEnd, ")"),
                (Text, " "),
                (ImageStart, "!["),
                (Text, "i"),
                (LinkEnd, "]"),
                (LinkUrlStart, "("),
                (LinkUrl, "u"),
                (LinkUrlEnd, ")"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn test_destinations_sharing_a_line() {
        assert_eq!(
            tags("[a](x [b](y) [c](z"),
            vec![
                LinkStart, Text, LinkEnd, Text, LinkStart, Text, LinkEnd, LinkUrlStart, LinkUrl,
                LinkUrlEnd, Text, LinkStart, Text, LinkEnd, Text, Eof,
            ]
        );
    }

    #[test]
    fn test_lone_punctuation_is_consumed_as_text() {
        assert_eq!(lex("a ! b ] c"), vec![(Text, "a ! b ] c"), (Eof, "")]);
        assert_eq!(lex("1 < 2"), vec![(Text, "1 < 2"), (Eof, "")]);
    }

    #[test]
    fn test_hard_breaks() {
        assert_eq!(
            tags("a  \nb\\\nc"),
            vec![Text, HardBreak, Text, HardBreak, Text, Eof]
        );
    }

    #[rstest]
    #[case::spaces("# Title  \nBody", (Text, "Title"), (Newline, "  \n"))]
    #[case::backslash("# Title\\\nBody", (Text, "\\"), (Newline, "\n"))]
    fn test_heading_line_has_no_hard_break(
        #[case] source: &str,
        #[case] before: (TokenTag, &str),
        #[case] newline: (TokenTag, &str),
    ) {
        let tokens = lex(source);
        assert!(tokens.iter().all(|(tag, _)| *tag != HardBreak));
        let end = tokens.iter().position(|t| t.0 == Newline).unwrap();
        assert_eq!(tokens[end - 1], before);
        assert_eq!(tokens[end], newline);
        assert_eq!(tokens[end + 1], (Text, "Body"));
    }

    #[test]
    fn test_blank_line_with_spaces() {
        assert_eq!(
            lex("a\n  \nb"),
            vec![
                (Text, "a"),
                (Newline, "\n"),
                (BlankLine, "  \n"),
                (Text, "b"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn test_esm() {
        assert_eq!(
            lex("import A from 'a'\nimport B from 'b'\n\n# T"),
            vec![
                (EsmImport, "import A from 'a'\nimport B from 'b'"),
                (Newline, "\n"),
                (BlankLine, "\n"),
                (HeadingStart, "# "),
                (Text, "T"),
                (Eof, ""),
            ]
        );
        assert_eq!(tags("important"), vec![Text, Eof]);
    }

    #[rstest]
    #[case::mid_paragraph("You must\nimport it first.")]
    #[case::after_heading("# T\nexport const a = 1")]
    #[case::element_body("<Note>\n\nimport x from 'y'\n\n</Note>")]
    fn test_esm_only_at_top_level(#[case] source: &str) {
        let tags = tags(source);
        assert!(!tags.contains(&EsmImport) && !tags.contains(&EsmExport), "{tags:?}");
    }

    #[test]
    fn test_esm_after_frontmatter_and_closed_element() {
        assert_eq!(tags("---\na: 1\n---\nimport a from 'a'")[6], EsmImport);
        let source = "<A>\nx\n</A>\n\nexport const b = 2";
        assert_eq!(tags(source).iter().filter(|&&t| t == EsmExport).count(), 1);
        let mut lexer = Lexer::new(source, &ParseOptions::default());
        lexer.tokenize().unwrap();
        assert_eq!(lexer.element_depth(), 0);
    }

    #[test]
    fn test_control_character_is_invalid() {
        assert_eq!(lex("a\u{1}b"), vec![(Text, "a"), (Invalid, "\u{1}"), (Text, "b"), (Eof, "")]);
    }

    #[test]
    fn test_escaped_marker_stays_in_text() {
        assert_eq!(lex(r"\*not\*"), vec![(Text, r"\*not\*"), (Eof, "")]);
    }
}
