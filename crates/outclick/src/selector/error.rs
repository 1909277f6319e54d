use std::borrow::Cow;

/// Reasons a selector string cannot be used.
#[outclick_derive::outclick_error]
#[derive(Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The selector (or one entry of a selector list) has no content.
    #[error("Empty selector at offset {offset}{}", format_context(context))]
    Empty { offset: usize, context: Option<Cow<'static, str>> },

    #[error("Unexpected '{found}' at offset {offset}{}", format_context(context))]
    UnexpectedToken { found: char, offset: usize, context: Option<Cow<'static, str>> },

    #[error("Unexpected end of selector at offset {offset}{}", format_context(context))]
    UnexpectedEnd { offset: usize, context: Option<Cow<'static, str>> },

    /// Valid CSS that the matcher does not implement (pseudo-classes, sibling combinators).
    #[error("Unsupported {syntax} at offset {offset}{}", format_context(context))]
    Unsupported { syntax: Cow<'static, str>, offset: usize, context: Option<Cow<'static, str>> },
}

impl SelectorError {
    /// Byte offset in the source string where parsing stopped.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::Empty { offset, .. }
            | Self::UnexpectedToken { offset, .. }
            | Self::UnexpectedEnd { offset, .. }
            | Self::Unsupported { offset, .. } => *offset,
        }
    }
}
