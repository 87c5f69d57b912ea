//! Byte cursor over the source text.
//!
//! All structural characters of the grammar are ASCII, so the cursor works
//! on bytes and only decodes a `char` where word boundaries matter.

pub(crate) const EOF_BYTE: u8 = b'\0';

pub(crate) struct Cursor<'src> {
    text: &'src str,
    pos: usize,
}

impl<'src> Cursor<'src> {
    pub(crate) fn new(text: &'src str) -> Self {
        Self { text, pos: 0 }
    }

    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    #[inline]
    pub(crate) fn text(&self) -> &'src str {
        self.text
    }

    /// Byte at the cursor, or [`EOF_BYTE`] past the end.
    #[inline]
    pub(crate) fn peek(&self) -> u8 {
        self.byte_at(self.pos)
    }

    /// Byte `n` positions after the cursor.
    #[inline]
    pub(crate) fn peek_nth(&self, n: usize) -> u8 {
        self.byte_at(self.pos + n)
    }

    #[inline]
    pub(crate) fn byte_at(&self, offset: usize) -> u8 {
        self.text.as_bytes().get(offset).copied().unwrap_or(EOF_BYTE)
    }

    /// The character ending right before `offset`.
    pub(crate) fn char_before(&self, offset: usize) -> Option<char> {
        self.text.get(..offset)?.chars().next_back()
    }

    /// The character starting at `offset`.
    pub(crate) fn char_at(&self, offset: usize) -> Option<char> {
        self.text.get(offset..)?.chars().next()
    }

    /// Remaining text from `offset`.
    #[inline]
    pub(crate) fn rest_from(&self, offset: usize) -> &'src str {
        self.text.get(offset..).unwrap_or("")
    }

    /// Counts bytes equal to `byte` starting at `offset`.
    pub(crate) fn run_len(&self, offset: usize, byte: u8) -> usize {
        self.text.as_bytes()[offset.min(self.text.len())..]
            .iter()
            .take_while(|&&b| b == byte)
            .count()
    }

    /// Counts bytes matching `pred` starting at `offset`.
    pub(crate) fn run_while(&self, offset: usize, pred: impl Fn(u8) -> bool) -> usize {
        self.text.as_bytes()[offset.min(self.text.len())..]
            .iter()
            .take_while(|&&b| pred(b))
            .count()
    }

    /// Offset of the end of the line containing `offset`, excluding the
    /// line terminator.
    pub(crate) fn line_end(&self, offset: usize) -> usize {
        let bytes = self.text.as_bytes();
        let mut end = offset.min(bytes.len());
        while end < bytes.len() && bytes[end] != b'\n' {
            end += 1;
        }
        if end > offset && bytes.get(end) == Some(&b'\n') && bytes[end - 1] == b'\r' {
            end -= 1;
        }
        end
    }

    /// Offset just past the line terminator at `offset`, if there is one.
    pub(crate) fn newline_len(&self, offset: usize) -> usize {
        match (self.byte_at(offset), self.byte_at(offset + 1)) {
            (b'\n', _) => 1,
            (b'\r', b'\n') => 2,
            _ => 0,
        }
    }

    /// Returns true if the line starting at `offset` holds only spaces and
    /// tabs.
    pub(crate) fn is_blank_line(&self, offset: usize) -> bool {
        let end = self.line_end(offset);
        self.text.as_bytes()[offset.min(end)..end]
            .iter()
            .all(|&b| b == b' ' || b == b'\t')
    }

    /// Offset just past the terminator of the line containing `offset`.
    pub(crate) fn next_line_start(&self, offset: usize) -> usize {
        let end = self.line_end(offset);
        end + self.newline_len(end)
    }

    #[inline]
    pub(crate) fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.text.len());
    }

    #[inline]
    pub(crate) fn seek(&mut self, offset: usize) {
        debug_assert!(offset >= self.pos, "cursor must never move backwards");
        self.pos = offset.min(self.text.len());
    }

    pub(crate) fn advance_while(&mut self, f: impl Fn(u8) -> bool) {
        while !self.is_eof() && f(self.peek()) {
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_and_advance() {
        let mut cursor = Cursor::new("ab");
        assert_eq!(cursor.peek(), b'a');
        assert_eq!(cursor.peek_nth(1), b'b');
        assert_eq!(cursor.peek_nth(2), EOF_BYTE);
        cursor.advance(5);
        assert!(cursor.is_eof());
        assert_eq!(cursor.pos(), 2);
    }

    #[test]
    fn test_line_helpers() {
        let cursor = Cursor::new("ab\r\n  \nc");
        assert_eq!(cursor.line_end(0), 2);
        assert_eq!(cursor.newline_len(2), 2);
        assert_eq!(cursor.next_line_start(0), 4);
        assert!(cursor.is_blank_line(4));
        assert!(!cursor.is_blank_line(7));
        assert_eq!(cursor.next_line_start(7), 8);
    }

    #[test]
    fn test_chars_around_offset() {
        let cursor = Cursor::new("é*x");
        assert_eq!(cursor.char_before(2), Some('é'));
        assert_eq!(cursor.char_at(3), Some('x'));
        assert_eq!(cursor.char_before(0), None);
    }

    #[test]
    fn test_run_len() {
        let cursor = Cursor::new("***a");
        assert_eq!(cursor.run_len(0, b'*'), 3);
        assert_eq!(cursor.run_len(4, b'*'), 0);
    }
}
