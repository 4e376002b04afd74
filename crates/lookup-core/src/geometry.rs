#![forbid(unsafe_code)]

//! Cell rectangles and scroll offsets.
//!
//! A trigger's [`Rect`] is the anchor of its floating listbox; the listbox,
//! its rows and the hover card are rectangles too, and every pointer press
//! is resolved by `contains` against them.

/// A rectangle of terminal cells. `x`/`y` are inclusive, `right()` and
/// `bottom()` exclusive; all edges saturate at `u16::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A `width` x `height` rectangle at the origin, e.g. a whole viewport.
    #[inline]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    #[inline]
    pub const fn left(&self) -> u16 {
        self.x
    }

    #[inline]
    pub const fn top(&self) -> u16 {
        self.y
    }

    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether cell `(x, y)` lies inside.
    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Overlap of two rectangles; `Rect::default()` when they are disjoint.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if x < right && y < bottom {
            Rect::new(x, y, right - x, bottom - y)
        } else {
            Rect::default()
        }
    }

    /// The rectangle inset by `n` cells on every side, e.g. the body of a
    /// bordered box.
    pub fn shrink(&self, n: u16) -> Rect {
        let twice = n.saturating_mul(2);
        Rect::new(
            self.x.saturating_add(n),
            self.y.saturating_add(n),
            self.width.saturating_sub(twice),
            self.height.saturating_sub(twice),
        )
    }

    /// The single row at `offset` from the top, or `None` past the bottom edge.
    #[inline]
    pub fn row(&self, offset: u16) -> Option<Rect> {
        (offset < self.height)
            .then(|| Rect::new(self.x, self.y.saturating_add(offset), self.width, 1))
    }
}

/// How far the canvas holding the controls is scrolled.
///
/// Anchors are reported in viewport coordinates; a listbox positioned in the
/// scrolled canvas adds this offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ScrollOffset {
    pub x: u16,
    pub y: u16,
}

impl ScrollOffset {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}
