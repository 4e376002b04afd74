#![forbid(unsafe_code)]

//! Lookup public facade crate.
//!
//! Re-exports the controls and the terminal plumbing a host needs, plus a
//! prelude and a top-level error type for host applications.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use lookup_core::debounce::Debouncer;
pub use lookup_core::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
    PasteEvent,
};
pub use lookup_core::geometry::{Rect, ScrollOffset};
#[cfg(not(target_arch = "wasm32"))]
pub use lookup_core::terminal_session::{SessionOptions, TerminalSession};

// --- Render re-exports -----------------------------------------------------

pub use lookup_render::buffer::Buffer;
pub use lookup_render::cell::{Cell, PackedRgba, StyleFlags};
pub use lookup_render::diff::BufferDiff;
pub use lookup_render::presenter::Presenter;
pub use lookup_render::style::Style;

// --- Widget re-exports -----------------------------------------------------

pub use lookup_widgets::hover_card::CardStyle;
pub use lookup_widgets::listeners::{DocumentListeners, ListenerGuard};
pub use lookup_widgets::matcher::ShortTokenPolicy;
pub use lookup_widgets::navigation::Highlight;
pub use lookup_widgets::placement::{MenuGeometry, RepositionPolicy};
pub use lookup_widgets::visibility::{CloseReason, DropdownState};
pub use lookup_widgets::{
    Candidate, CandidateId, ConfigError, FieldError, InitialValue, SearchableSelect, SelectView,
    StatefulWidget, Typeahead, TypeaheadConfig, TypeaheadEvent, TypeaheadStyle, TypeaheadView,
    Widget,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for lookup hosts.
#[derive(Debug)]
pub enum Error {
    /// I/O failure during terminal operations or file access.
    Io(std::io::Error),
    /// Invalid control configuration.
    Config(ConfigError),
    /// Candidate data could not be loaded.
    Data(String),
    /// Terminal error with message.
    Terminal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::Data(msg) => write!(f, "bad candidate data: {msg}"),
            Self::Terminal(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Data(_) | Self::Terminal(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Data(err.to_string())
    }
}

/// Standard result type for lookup hosts.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Buffer, Candidate, CandidateId, CloseReason, DocumentListeners, DropdownState, Error,
        Event, KeyCode, Rect, Result, SearchableSelect, SelectView, StatefulWidget, Style,
        Typeahead, TypeaheadConfig, TypeaheadEvent, TypeaheadStyle, TypeaheadView,
    };

    pub use crate::{core, render, widgets};
}

pub use lookup_core as core;
pub use lookup_render as render;
pub use lookup_widgets as widgets;
