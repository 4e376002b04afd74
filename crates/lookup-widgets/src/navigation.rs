#![forbid(unsafe_code)]

//! Highlight cursor and scroll window for the floating listbox.
//!
//! The highlight is a single tagged value: either nothing, the row under the
//! pointer, or the row reached with arrow keys. Both input streams write the
//! same value, so there is never a pointer index and a keyboard index to
//! reconcile at commit time.
//!
//! # Invariants
//!
//! 1. An index is always `< len` of the filtered set it was computed for.
//! 2. `next` and `prev` wrap: `len` presses of `next` return to the start.
//! 3. Hover always produces `Pointer`, arrow keys always `Directional`.

/// The currently highlighted filtered-set position and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Highlight {
    /// Nothing highlighted.
    #[default]
    None,
    /// Highlighted by pointer hover.
    Pointer(usize),
    /// Highlighted by directional keys.
    Directional(usize),
}

impl Highlight {
    /// Highlighted position, if any.
    #[inline]
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::None => None,
            Self::Pointer(i) | Self::Directional(i) => Some(i),
        }
    }

    /// True for `Pointer`.
    #[inline]
    #[must_use]
    pub const fn is_pointer(self) -> bool {
        matches!(self, Self::Pointer(_))
    }

    /// True for `Directional`.
    #[inline]
    #[must_use]
    pub const fn is_directional(self) -> bool {
        matches!(self, Self::Directional(_))
    }

    /// Arrow down: next row with wraparound. From `None`, the first row.
    #[must_use]
    pub fn next(self, len: usize) -> Self {
        if len == 0 {
            return Self::None;
        }
        match self.index() {
            Some(i) if i + 1 < len => Self::Directional(i + 1),
            _ => Self::Directional(0),
        }
    }

    /// Arrow up: previous row with wraparound. From `None`, the last row.
    #[must_use]
    pub fn prev(self, len: usize) -> Self {
        if len == 0 {
            return Self::None;
        }
        match self.index() {
            Some(i) if i > 0 && i < len => Self::Directional(i - 1),
            _ => Self::Directional(len - 1),
        }
    }

    /// Home.
    #[must_use]
    pub fn first(len: usize) -> Self {
        if len == 0 { Self::None } else { Self::Directional(0) }
    }

    /// End.
    #[must_use]
    pub fn last(len: usize) -> Self {
        if len == 0 {
            Self::None
        } else {
            Self::Directional(len - 1)
        }
    }

    /// Page down: `page` rows forward, stopping at the last row.
    #[must_use]
    pub fn page_down(self, len: usize, page: usize) -> Self {
        if len == 0 {
            return Self::None;
        }
        let from = self.index().unwrap_or(0);
        Self::Directional(from.saturating_add(page.max(1)).min(len - 1))
    }

    /// Page up: `page` rows back, stopping at the first row.
    #[must_use]
    pub fn page_up(self, len: usize, page: usize) -> Self {
        if len == 0 {
            return Self::None;
        }
        let from = self.index().unwrap_or(0).min(len - 1);
        Self::Directional(from.saturating_sub(page.max(1)))
    }

    /// Pointer over row `index`.
    #[must_use]
    pub fn hover(index: usize, len: usize) -> Self {
        if index < len {
            Self::Pointer(index)
        } else {
            Self::None
        }
    }

    /// Drop the highlight if the filtered set shrank below it.
    #[must_use]
    pub fn clamp(self, len: usize) -> Self {
        match self.index() {
            Some(i) if i >= len => Self::None,
            _ => self,
        }
    }

    /// Resolve to a candidate index through the filtered set.
    #[must_use]
    pub fn resolve(self, filtered: &[usize]) -> Option<usize> {
        self.index().and_then(|i| filtered.get(i).copied())
    }
}

/// The window of listbox rows currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollWindow {
    offset: usize,
}

impl ScrollWindow {
    /// First visible row.
    #[inline]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Back to the top.
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Adjust the offset so `index` is inside a window of `visible` rows.
    pub fn ensure_visible(&mut self, index: usize, visible: usize) {
        if visible == 0 {
            return;
        }
        if index < self.offset {
            self.offset = index;
        } else if index >= self.offset + visible {
            self.offset = index + 1 - visible;
        }
    }

    /// Scroll by `delta` rows, keeping a full window where possible.
    pub fn scroll_by(&mut self, delta: isize, len: usize, visible: usize) {
        let max = len.saturating_sub(visible);
        self.offset = self.offset.saturating_add_signed(delta).min(max);
    }

    /// Clamp after the list shrank.
    pub fn clamp(&mut self, len: usize, visible: usize) {
        self.offset = self.offset.min(len.saturating_sub(visible));
    }

    /// Visible row positions for a list of `len` rows.
    pub fn range(&self, len: usize, visible: usize) -> std::ops::Range<usize> {
        let start = self.offset.min(len);
        start..(start + visible).min(len)
    }
}
