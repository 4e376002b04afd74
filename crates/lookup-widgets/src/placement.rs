#![forbid(unsafe_code)]

//! Floating layer placement.
//!
//! The listbox hangs below the trigger: `left = anchor.left`,
//! `top = anchor.bottom + scroll.y`, `width = anchor.width`. The anchor is the
//! rectangle the trigger was last rendered into; the scroll offset is that of
//! the canvas the floating layers are drawn on.
//!
//! The hover card sits beside the listbox, to the right when it fits the
//! viewport and to the left otherwise, with its top on the highlighted row.

use lookup_core::geometry::{Rect, ScrollOffset};
use serde::{Deserialize, Serialize};

/// When the listbox position is recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositionPolicy {
    /// On open and on every query change only. Moving the trigger while the
    /// query is unchanged leaves the listbox where it was.
    #[default]
    OnQueryChange,
    /// Additionally on every anchor move, resize, and scroll change.
    TrackAnchor,
}

/// Position and size of the listbox layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct MenuGeometry {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
}

impl MenuGeometry {
    /// Geometry below `anchor` with `height` rows.
    #[must_use]
    pub fn below(anchor: Rect, scroll: ScrollOffset, height: u16) -> Self {
        Self {
            left: anchor.left(),
            top: anchor.bottom().saturating_add(scroll.y),
            width: anchor.width,
            height,
        }
    }

    /// As a rectangle.
    #[inline]
    #[must_use]
    pub const fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width, self.height)
    }
}

/// Fit `rect` into `viewport`: shift it left and up when it overflows the
/// right or bottom edge, then trim whatever still does not fit.
#[must_use]
pub fn clamp_to_viewport(rect: Rect, viewport: Rect) -> Rect {
    let width = rect.width.min(viewport.width);
    let height = rect.height.min(viewport.height);
    let max_x = viewport.right().saturating_sub(width);
    let max_y = viewport.bottom().saturating_sub(height);
    Rect::new(
        rect.x.clamp(viewport.x, max_x.max(viewport.x)),
        rect.y.clamp(viewport.y, max_y.max(viewport.y)),
        width,
        height,
    )
}

/// Place a `width` x `height` card beside `menu`, top aligned with `row_y`.
#[must_use]
pub fn card_beside(menu: Rect, row_y: u16, width: u16, height: u16, viewport: Rect) -> Rect {
    let fits_right = menu.right().saturating_add(width) <= viewport.right();
    let x = if fits_right || menu.x < width {
        menu.right()
    } else {
        menu.x - width
    };
    clamp_to_viewport(Rect::new(x, row_y, width, height), viewport)
}
