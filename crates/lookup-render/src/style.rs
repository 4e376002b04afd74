#![forbid(unsafe_code)]

//! Partial cell styles.
//!
//! A [`Style`] only sets what it names: unset colors and flags leave the
//! cell underneath unchanged, so styles layer (base, then highlight).

use crate::cell::{Cell, PackedRgba, StyleFlags};

/// Foreground, background, and flags, each optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    /// Foreground color.
    pub fg: Option<PackedRgba>,
    /// Background color.
    pub bg: Option<PackedRgba>,
    /// Style flags (replace the cell's flags when set).
    pub attrs: Option<StyleFlags>,
}

impl Style {
    /// An empty style.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            attrs: None,
        }
    }

    /// Set the foreground color.
    #[must_use]
    pub const fn fg(mut self, color: PackedRgba) -> Self {
        self.fg = Some(color);
        self
    }

    /// Set the background color.
    #[must_use]
    pub const fn bg(mut self, color: PackedRgba) -> Self {
        self.bg = Some(color);
        self
    }

    /// Add style flags.
    #[must_use]
    pub fn attrs(mut self, flags: StyleFlags) -> Self {
        self.attrs = Some(self.attrs.unwrap_or_default() | flags);
        self
    }

    /// Add bold.
    #[must_use]
    pub fn bold(self) -> Self {
        self.attrs(StyleFlags::BOLD)
    }

    /// Add dim.
    #[must_use]
    pub fn dim(self) -> Self {
        self.attrs(StyleFlags::DIM)
    }

    /// Add reverse video.
    #[must_use]
    pub fn reverse(self) -> Self {
        self.attrs(StyleFlags::REVERSE)
    }

    /// Add underline.
    #[must_use]
    pub fn underline(self) -> Self {
        self.attrs(StyleFlags::UNDERLINE)
    }

    /// True if nothing is set.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.attrs.is_none()
    }

    /// Layer `other` on top of `self`: fields set in `other` win.
    #[must_use]
    pub fn patch(self, other: Style) -> Self {
        Self {
            fg: other.fg.or(self.fg),
            bg: other.bg.or(self.bg),
            attrs: match (self.attrs, other.attrs) {
                (Some(a), Some(b)) => Some(a | b),
                (a, b) => b.or(a),
            },
        }
    }

    /// Apply to a cell, leaving its content untouched.
    pub fn apply_to(&self, cell: &mut Cell) {
        if let Some(fg) = self.fg {
            cell.fg = fg;
        }
        if let Some(bg) = self.bg {
            cell.bg = bg;
        }
        if let Some(flags) = self.attrs {
            cell.flags = flags;
        }
    }
}
