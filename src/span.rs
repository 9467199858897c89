//! Source positions and the `Spanning` wrapper used throughout the AST.

use std::fmt;

/// A reference to a line and column in an input source file.
///
/// Both fields are zero-based; the wire representation produced by the
/// `serde` integration is one-based.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SourcePosition {
    line: usize,
    col: usize,
}

/// A range of characters in the input source, starting at the character
/// pointed by the `start` field and ending just before the `end` marker.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Span {
    /// Start position of the span.
    pub start: SourcePosition,

    /// First source position _after_ the span.
    pub end: SourcePosition,
}

impl Span {
    #[doc(hidden)]
    pub fn new(start: SourcePosition, end: SourcePosition) -> Self {
        Self { start, end }
    }

    #[doc(hidden)]
    pub fn zero_width(pos: SourcePosition) -> Self {
        Self::new(pos, pos)
    }

    #[doc(hidden)]
    pub fn unlocated() -> Self {
        Self::zero_width(SourcePosition::new_origin())
    }
}

/// Data structure used to wrap items with start and end markers in the
/// input source.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Spanning<T> {
    /// The wrapped item.
    pub item: T,

    /// The span.
    pub span: Span,
}

impl<T> Spanning<T> {
    #[doc(hidden)]
    pub fn new(span: Span, item: T) -> Self {
        Self { item, span }
    }

    #[doc(hidden)]
    pub fn zero_width(pos: SourcePosition, item: T) -> Self {
        Self::new(Span::zero_width(pos), item)
    }

    #[doc(hidden)]
    pub fn unlocated(item: T) -> Self {
        Self::new(Span::unlocated(), item)
    }

    #[doc(hidden)]
    pub fn start(&self) -> SourcePosition {
        self.span.start
    }

    /// Modify the contents of the spanned item.
    pub fn map<O, F: FnOnce(T) -> O>(self, f: F) -> Spanning<O> {
        Spanning::new(self.span, f(self.item))
    }

    /// Modifies the contents of the spanned item in case `f` returns
    /// [`Some`], or returns [`None`] otherwise.
    pub fn and_then<O, F: FnOnce(T) -> Option<O>>(self, f: F) -> Option<Spanning<O>> {
        f(self.item).map(|item| Spanning::new(self.span, item))
    }
}

impl<T: fmt::Display> fmt::Display for Spanning<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. At {}", self.item, self.span.start)
    }
}

impl<T: fmt::Display + fmt::Debug> std::error::Error for Spanning<T> {}

impl SourcePosition {
    #[doc(hidden)]
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    #[doc(hidden)]
    pub fn new_origin() -> Self {
        Self { line: 0, col: 0 }
    }

    /// The line of the character in the input source.
    ///
    /// Zero-based index: the first line is line zero.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The column of the character in the input source.
    ///
    /// Zero-based index: the first column is column zero.
    pub fn column(&self) -> usize {
        self.col
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
