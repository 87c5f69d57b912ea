//! Structured records stored in the extra data array.
//!
//! Extra data is a flat list of `u32` words. A record is written field by
//! field with [`ExtraRecord::encode`] and read back in the same order with
//! [`ExtraRecord::decode`]. The [`extra_record!`] macro derives both from
//! a single field list so the two directions cannot drift apart.

use std::collections::TryReserveError;

use serde::{Deserialize, Serialize};

use crate::node::{ExtraIndex, IndexRange, NodeIndex};
use crate::span::Span;
use crate::token::TokenIndex;

/// Sentinel word for an absent optional field.
pub const NONE_WORD: u32 = u32::MAX;

/// A value with a fixed-width word encoding.
pub trait ExtraField: Sized {
    /// Number of words the field occupies.
    const WORDS: usize;

    fn encode(&self, out: &mut Vec<u32>);

    /// Decodes from the front of `words`, which holds at least
    /// [`Self::WORDS`] entries.
    fn decode(words: &[u32]) -> Self;
}

impl ExtraField for u32 {
    const WORDS: usize = 1;

    fn encode(&self, out: &mut Vec<u32>) {
        out.push(*self);
    }

    fn decode(words: &[u32]) -> Self {
        words[0]
    }
}

impl ExtraField for Option<u32> {
    const WORDS: usize = 1;

    fn encode(&self, out: &mut Vec<u32>) {
        out.push(self.unwrap_or(NONE_WORD));
    }

    fn decode(words: &[u32]) -> Self {
        (words[0] != NONE_WORD).then_some(words[0])
    }
}

impl ExtraField for IndexRange {
    const WORDS: usize = 2;

    fn encode(&self, out: &mut Vec<u32>) {
        out.push(self.start);
        out.push(self.end);
    }

    fn decode(words: &[u32]) -> Self {
        IndexRange::new(words[0], words[1])
    }
}

impl ExtraField for Span {
    const WORDS: usize = 2;

    fn encode(&self, out: &mut Vec<u32>) {
        out.push(self.start);
        out.push(self.end);
    }

    fn decode(words: &[u32]) -> Self {
        Span::new(words[0], words[1])
    }
}

/// A multi-field payload stored in extra data.
pub trait ExtraRecord: Sized {
    /// Total number of words of the record.
    const WORDS: usize;

    fn encode(&self, out: &mut Vec<u32>);

    fn decode(words: &[u32]) -> Self;
}

/// Appends `record` to `extra` and returns the index of its first word.
pub fn append_record<R: ExtraRecord>(
    extra: &mut Vec<u32>,
    record: &R,
) -> Result<ExtraIndex, TryReserveError> {
    extra.try_reserve(R::WORDS)?;
    let index = extra.len() as ExtraIndex;
    record.encode(extra);
    Ok(index)
}

/// Declares a record struct and derives its field-order codec.
#[macro_export]
macro_rules! extra_record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                pub $field:ident : $ty:ty,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $ty,
            )+
        }

        impl $crate::extra::ExtraRecord for $name {
            const WORDS: usize = 0 $(+ <$ty as $crate::extra::ExtraField>::WORDS)+;

            fn encode(&self, out: &mut Vec<u32>) {
                $(
                    $crate::extra::ExtraField::encode(&self.$field, out);
                )+
            }

            fn decode(words: &[u32]) -> Self {
                let mut at = 0usize;
                $(
                    let $field = <$ty as $crate::extra::ExtraField>::decode(&words[at..]);
                    at += <$ty as $crate::extra::ExtraField>::WORDS;
                )+
                debug_assert_eq!(at, <Self as $crate::extra::ExtraRecord>::WORDS);
                Self { $($field,)+ }
            }
        }
    };
}

/// How an element attribute carries its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKind {
    /// `<X disabled />`
    Boolean,
    /// `<X a="b" />`
    String,
    /// `<X a={b} />`
    Expression,
    /// `<X {...props} />`
    Spread,
}

impl ExtraField for AttributeKind {
    const WORDS: usize = 1;

    fn encode(&self, out: &mut Vec<u32>) {
        out.push(*self as u32);
    }

    fn decode(words: &[u32]) -> Self {
        match words[0] {
            1 => AttributeKind::String,
            2 => AttributeKind::Expression,
            3 => AttributeKind::Spread,
            _ => AttributeKind::Boolean,
        }
    }
}

/// Checkbox state of a list item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    #[default]
    None,
    Unchecked,
    Checked,
}

impl ExtraField for TaskState {
    const WORDS: usize = 1;

    fn encode(&self, out: &mut Vec<u32>) {
        out.push(*self as u32);
    }

    fn decode(words: &[u32]) -> Self {
        match words[0] {
            1 => TaskState::Unchecked,
            2 => TaskState::Checked,
            _ => TaskState::None,
        }
    }
}

extra_record! {
    /// Heading level and the run of inline children.
    pub struct HeadingRecord {
        /// Number of `#` characters, uncapped.
        pub level: u32,
        pub children: IndexRange,
    }
}

extra_record! {
    /// Element or fragment descriptor.
    pub struct ElementRecord {
        /// Name token of the opening tag. `None` for fragments.
        pub name: Option<TokenIndex>,
        /// Extra data range holding consecutive [`AttributeRecord`]s.
        pub attributes: IndexRange,
        pub children: IndexRange,
    }
}

extra_record! {
    /// One attribute of an opening tag.
    pub struct AttributeRecord {
        /// Name token. `None` for spread attributes.
        pub name: Option<TokenIndex>,
        pub kind: AttributeKind,
        /// Token range of the value. Empty for boolean attributes and,
        /// for expressions, the tokens between the braces.
        pub value: IndexRange,
    }
}

extra_record! {
    /// Link or image payload.
    pub struct LinkRecord {
        /// Text node or [`crate::NodeTag::LinkLabel`] holding the label.
        pub label: Option<NodeIndex>,
        /// Destination token.
        pub url: Option<TokenIndex>,
    }
}

extra_record! {
    pub struct ListItemRecord {
        pub task: TaskState,
        pub children: IndexRange,
    }
}

extra_record! {
    pub struct CodeBlockRecord {
        pub info: Option<TokenIndex>,
        pub content: Option<TokenIndex>,
    }
}

extra_record! {
    /// Raw byte range of the preamble text.
    pub struct FrontmatterRecord {
        pub content: Span,
    }
}

extra_record! {
    /// Opaque expression body as a token range.
    pub struct ExpressionRecord {
        pub body: IndexRange,
    }
}
