//! Element mode: names, attributes and delimiters inside a tag.

use mdxtree_ast::TokenTag;

use super::{Lexer, Mode};
use crate::error::ParseError;

#[inline]
fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || matches!(b, b'_' | b'$')
}

#[inline]
fn is_name_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'$' | b'-' | b'.' | b':')
}

impl<'src> Lexer<'src> {
    pub(super) fn lex_element(&mut self) -> Result<(), ParseError> {
        let pos = self.cursor.pos();
        match self.cursor.peek() {
            b' ' | b'\t' | b'\n' | b'\r' => self.lex_element_whitespace(),
            b if is_name_start(b) => {
                self.cursor.advance(1);
                self.cursor.advance_while(is_name_continue);
                self.push(TokenTag::ElementName, pos)
            }
            b'=' => self.emit_to(TokenTag::ElementEquals, pos + 1),
            quote @ (b'"' | b'\'') => {
                let end = self.cursor.line_end(pos);
                let body = &self.cursor.text().as_bytes()[pos + 1..end];
                match body.iter().position(|&b| b == quote) {
                    Some(close) => self.emit_to(TokenTag::ElementString, pos + close + 2),
                    None => self.emit_to(TokenTag::Invalid, end),
                }
            }
            b'{' => {
                self.emit_to(TokenTag::ExpressionStart, pos + 1)?;
                self.enter(Mode::Expression)
            }
            // `</>` closes a fragment; `/>` anywhere else closes the tag.
            b'/' if self.cursor.peek_nth(1) == b'>'
                && self.tokens.last().map(|t| t.tag) != Some(TokenTag::ElementStart) =>
            {
                self.emit_to(TokenTag::ElementSelfClose, pos + 2)?;
                self.leave();
                Ok(())
            }
            b'/' => {
                if self.tokens.last().map(|t| t.tag) == Some(TokenTag::ElementStart) {
                    self.closing_tag = true;
                }
                self.emit_to(TokenTag::ElementSlash, pos + 1)
            }
            b'>' => {
                self.emit_to(TokenTag::ElementEnd, pos + 1)?;
                if self.stack.len() == 1 {
                    self.element_depth = if self.closing_tag {
                        self.element_depth.saturating_sub(1)
                    } else {
                        self.element_depth + 1
                    };
                }
                self.leave();
                Ok(())
            }
            // `a <b}`: the `<` was a comparison and the expression ends here.
            b'}' if self.stack.last() == Some(&Mode::Expression) => {
                self.leave();
                self.lex_expression()
            }
            _ => {
                let width = self.cursor.char_at(pos).map_or(1, char::len_utf8);
                self.emit_to(TokenTag::Invalid, pos + width)
            }
        }
    }

    /// Whitespace inside a tag. A tag never spans a blank line: the mode is
    /// left so the blank line ends the block, or, inside an expression, so
    /// the expression reads it as text.
    fn lex_element_whitespace(&mut self) -> Result<(), ParseError> {
        let pos = self.cursor.pos();
        let len = self.cursor.text().len();
        let from_markdown = self.stack.last() == Some(&Mode::Markdown);
        let mut leave = false;
        while !self.cursor.is_eof() {
            let at = self.cursor.pos();
            let newline = self.cursor.newline_len(at);
            if newline > 0 {
                let next = at + newline;
                self.cursor.seek(next);
                self.line_start = next;
                if next < len && self.cursor.is_blank_line(next) {
                    leave = true;
                    break;
                }
                continue;
            }
            if !matches!(self.cursor.peek(), b' ' | b'\t') {
                break;
            }
            self.cursor.advance(1);
        }
        if self.cursor.pos() == pos {
            // A lone `\r`.
            self.cursor.advance(1);
        }
        self.push(TokenTag::ElementWhitespace, pos)?;
        if leave {
            self.leave();
            if from_markdown {
                self.start_line(self.cursor.pos());
            }
        }
        Ok(())
    }
}
