//! Expression mode: opaque text up to the balancing `}`.
//!
//! Brace balance is tracked by the mode stack: every `{` pushes a frame
//! and every `}` pops one. String literals, template literals and comments
//! are skipped so braces inside them do not count.

use mdxtree_ast::TokenTag;

use super::markdown::is_element_start;
use super::{Lexer, Mode};
use crate::error::ParseError;

impl<'src> Lexer<'src> {
    pub(super) fn lex_expression(&mut self) -> Result<(), ParseError> {
        let pos = self.cursor.pos();
        match self.cursor.peek() {
            b'{' => {
                self.emit_to(TokenTag::ExpressionStart, pos + 1)?;
                self.enter(Mode::Expression)
            }
            b'}' => {
                self.emit_to(TokenTag::ExpressionEnd, pos + 1)?;
                self.leave();
                Ok(())
            }
            b'<' if is_element_start(self.cursor.peek_nth(1)) => self.open_tag(pos),
            _ => self.lex_expression_text(),
        }
    }

    fn lex_expression_text(&mut self) -> Result<(), ParseError> {
        let pos = self.cursor.pos();
        let len = self.cursor.text().len();
        loop {
            let at = self.cursor.pos();
            if at >= len {
                break;
            }
            match self.cursor.peek() {
                b'{' | b'}' => break,
                b'<' if is_element_start(self.cursor.peek_nth(1)) => break,
                quote @ (b'"' | b'\'') => {
                    let end = self.cursor.line_end(at);
                    let body = &self.cursor.text().as_bytes()[at + 1..end];
                    let close = skip_quoted(body, quote).map_or(end, |i| at + i + 2);
                    self.cursor.seek(close);
                }
                b'`' => {
                    let body = &self.cursor.text().as_bytes()[at + 1..];
                    let close = skip_quoted(body, b'`').map_or(len, |i| at + i + 2);
                    if let Some(newline) = body[..close - at - 1].iter().rposition(|&b| b == b'\n')
                    {
                        self.line_start = at + 1 + newline + 1;
                    }
                    self.cursor.seek(close);
                }
                b'/' if self.cursor.peek_nth(1) == b'/' => {
                    self.cursor.seek(self.cursor.line_end(at));
                }
                b'/' if self.cursor.peek_nth(1) == b'*' => {
                    let close = self
                        .cursor
                        .rest_from(at + 2)
                        .find("*/")
                        .map_or(len, |i| at + 2 + i + 2);
                    self.cursor.seek(close);
                }
                b'\n' => {
                    self.cursor.advance(1);
                    self.line_start = at + 1;
                }
                _ => self.cursor.advance(1),
            }
        }
        self.push(TokenTag::ExpressionText, pos)
    }
}

/// Index of the closing `quote` in `body`, honoring backslash escapes.
fn skip_quoted(body: &[u8], quote: u8) -> Option<usize> {
    let mut i = 0;
    while i < body.len() {
        match body[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i),
            _ => i += 1,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::super::tests::lex;
    use super::skip_quoted;
    use mdxtree_ast::TokenTag::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nested_braces() {
        assert_eq!(
            lex("{a {b} c}"),
            vec![
                (ExpressionStart, "{"),
                (ExpressionText, "a "),
                (ExpressionStart, "{"),
                (ExpressionText, "b"),
                (ExpressionEnd, "}"),
                (ExpressionText, " c"),
                (ExpressionEnd, "}"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn test_braces_in_strings_and_comments_are_skipped() {
        assert_eq!(
            lex("{'}' + `{` /* } */ // }\n}"),
            vec![
                (ExpressionStart, "{"),
                (ExpressionText, "'}' + `{` /* } */ // }\n"),
                (ExpressionEnd, "}"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn test_element_inside_expression() {
        assert_eq!(
            lex("{x && <B>y</B>}"),
            vec![
                (ExpressionStart, "{"),
                (ExpressionText, "x && "),
                (ElementStart, "<"),
                (ElementName, "B"),
                (ElementEnd, ">"),
                (ExpressionText, "y"),
                (ElementStart, "<"),
                (ElementSlash, "/"),
                (ElementName, "B"),
                (ElementEnd, ">"),
                (ExpressionEnd, "}"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn test_comparison_is_not_an_element() {
        assert_eq!(
            lex("{a < b}"),
            vec![
                (ExpressionStart, "{"),
                (ExpressionText, "a < b"),
                (ExpressionEnd, "}"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn test_unclosed_expression_runs_to_end() {
        assert_eq!(
            lex("{a\n\nb"),
            vec![(ExpressionStart, "{"), (ExpressionText, "a\n\nb"), (Eof, "")]
        );
    }

    #[test]
    fn test_skip_quoted() {
        assert_eq!(skip_quoted(br#"a\"b"c"#, b'"'), Some(4));
        assert_eq!(skip_quoted(b"abc", b'"'), None);
    }
}
