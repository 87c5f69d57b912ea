//! Token model shared by the lexer and the parser.
//!
//! A token is a tag plus the byte offset where it starts. Its end is the
//! start of the following token, so the token list covers the source
//! without gaps and the final [`TokenTag::Eof`] token marks the end.

use serde::{Deserialize, Serialize};

/// Index of a token in the token list.
pub type TokenIndex = u32;

/// Byte offset into the source text.
pub type ByteOffset = u32;

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenTag {
    /// End of input. The only token allowed to be empty.
    Eof,
    /// A byte sequence that fits no grammar, such as a control character.
    Invalid,
    /// Plain text, including literal punctuation that opened nothing.
    Text,
    /// Leading spaces or tabs of a line.
    Indent,
    /// Line terminator of a non-blank line.
    Newline,
    /// A whole whitespace-only line including its terminator.
    BlankLine,
    /// A backslash or two or more spaces, followed by a line terminator.
    HardBreak,

    /// `#` run plus the following spaces.
    HeadingStart,
    /// `---`, `***` or `___`.
    ThematicBreak,
    /// `-`, `*` or `+` plus the following spaces.
    ListMarkerUnordered,
    /// `1.` or `1)` plus the following spaces.
    ListMarkerOrdered,
    /// `[ ]` after a list marker.
    TaskUnchecked,
    /// `[x]` after a list marker.
    TaskChecked,
    /// `>` plus an optional space.
    BlockquoteMarker,

    /// Opening fence of three or more backticks or tildes.
    CodeFenceStart,
    /// Info string after an opening fence.
    CodeFenceInfo,
    /// Everything between the fences.
    CodeContent,
    /// Closing fence.
    CodeFenceEnd,

    /// `---` opening the preamble.
    FrontmatterStart,
    /// Raw preamble text.
    FrontmatterContent,
    /// `---` closing the preamble.
    FrontmatterEnd,

    /// A module `import` statement.
    EsmImport,
    /// A module `export` statement.
    EsmExport,

    EmphasisStart,
    EmphasisEnd,
    StrongStart,
    StrongEnd,
    CodeInlineStart,
    CodeInlineContent,
    CodeInlineEnd,

    /// `[`
    LinkStart,
    /// `![`
    ImageStart,
    /// `]`
    LinkEnd,
    /// `(` directly after `]`.
    LinkUrlStart,
    LinkUrl,
    /// `)` closing a link destination.
    LinkUrlEnd,

    /// `<`
    ElementStart,
    /// `/` inside a tag.
    ElementSlash,
    ElementName,
    ElementWhitespace,
    ElementEquals,
    /// A quoted attribute value, quotes included.
    ElementString,
    /// `>`
    ElementEnd,
    /// `/>`
    ElementSelfClose,

    /// `{`
    ExpressionStart,
    /// Opaque expression body text.
    ExpressionText,
    /// `}`
    ExpressionEnd,
}

impl TokenTag {
    /// Returns true if this token can only appear at the start of a block.
    #[inline]
    pub const fn is_block_marker(self) -> bool {
        matches!(
            self,
            TokenTag::HeadingStart
                | TokenTag::ThematicBreak
                | TokenTag::ListMarkerUnordered
                | TokenTag::ListMarkerOrdered
                | TokenTag::BlockquoteMarker
                | TokenTag::CodeFenceStart
                | TokenTag::FrontmatterStart
                | TokenTag::EsmImport
                | TokenTag::EsmExport
        )
    }

    /// Returns true for list item markers.
    #[inline]
    pub const fn is_list_marker(self) -> bool {
        matches!(
            self,
            TokenTag::ListMarkerUnordered | TokenTag::ListMarkerOrdered
        )
    }

    /// Returns true for tokens that end the current line.
    #[inline]
    pub const fn is_line_end(self) -> bool {
        matches!(
            self,
            TokenTag::Newline | TokenTag::BlankLine | TokenTag::HardBreak | TokenTag::Eof
        )
    }
}

/// A lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub tag: TokenTag,
    pub start: ByteOffset,
}

impl Token {
    /// Creates a new token.
    #[inline]
    pub const fn new(tag: TokenTag, start: ByteOffset) -> Self {
        Self { tag, start }
    }
}
