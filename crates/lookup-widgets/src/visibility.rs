#![forbid(unsafe_code)]

//! Dropdown visibility state machine.
//!
//! ```text
//!            query >= threshold / arrow key / trigger click
//!   Closed ─────────────────────────────────────────────▶ Open
//!     ▲                                                   │
//!     └───────────────────────────────────────────────────┘
//!   below threshold | escape | outside | commit | clear | toggle
//! ```
//!
//! An open dropdown is `OpenEmpty` or `OpenListing` depending on the match
//! count; zero matches is a valid open state that hosts the "Add New" row.

use std::fmt;

/// Observable dropdown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropdownState {
    /// No floating layer.
    Closed,
    /// Open with zero matches.
    OpenEmpty,
    /// Open with at least one match.
    OpenListing,
}

/// Why the dropdown last closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    /// Query dropped below the minimum search length.
    BelowThreshold,
    /// Escape key.
    Escape,
    /// Pointer press or focus change outside the control.
    Outside,
    /// A selection was committed.
    Committed,
    /// The clear affordance was used.
    Cleared,
    /// The control was disabled.
    Disabled,
    /// The trigger was clicked while open (select-style toggle).
    Toggled,
    /// The control was dropped or reset.
    Unmounted,
}

impl CloseReason {
    /// Whether closing for this reason reconciles the query against the
    /// committed selection. Other reasons leave the query alone.
    #[inline]
    pub const fn is_dismissal(self) -> bool {
        matches!(self, Self::Escape | Self::Outside | Self::Toggled)
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BelowThreshold => "below-threshold",
            Self::Escape => "escape",
            Self::Outside => "outside",
            Self::Committed => "committed",
            Self::Cleared => "cleared",
            Self::Disabled => "disabled",
            Self::Toggled => "toggled",
            Self::Unmounted => "unmounted",
        };
        f.write_str(s)
    }
}

/// Open/closed flag plus the last close reason.
#[derive(Debug, Clone, Default)]
pub struct Visibility {
    open: bool,
    last_close: Option<CloseReason>,
}

impl Visibility {
    /// A closed dropdown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open. Returns `true` if this was a transition.
    pub fn open(&mut self) -> bool {
        if self.open {
            return false;
        }
        self.open = true;
        true
    }

    /// Close. Returns `true` if this was a transition.
    pub fn close(&mut self, reason: CloseReason) -> bool {
        if !self.open {
            return false;
        }
        self.open = false;
        self.last_close = Some(reason);
        true
    }

    /// Whether the floating layer is shown.
    #[inline]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// State for the given match count.
    #[must_use]
    pub const fn state(&self, match_count: usize) -> DropdownState {
        match (self.open, match_count) {
            (false, _) => DropdownState::Closed,
            (true, 0) => DropdownState::OpenEmpty,
            (true, _) => DropdownState::OpenListing,
        }
    }

    /// Reason for the most recent close.
    #[inline]
    pub const fn last_close_reason(&self) -> Option<CloseReason> {
        self.last_close
    }
}

/// On dismissal, the query survives only if it is exactly the committed
/// display value.
#[must_use]
pub fn must_clear_on_dismiss(query: &str, committed_display: Option<&str>) -> bool {
    match committed_display {
        Some(display) => query != display,
        None => !query.is_empty(),
    }
}
