#![forbid(unsafe_code)]

//! Engine-independent plumbing for the lookup controls.
//!
//! [`geometry`] and [`event`] are the vocabulary every control speaks,
//! [`debounce`] times the hover card, [`logging`] carries the optional
//! `tracing` macros, and [`terminal_session`] owns the tty for native hosts.

pub mod debounce;
pub mod event;
pub mod geometry;
pub mod logging;
#[cfg(not(target_arch = "wasm32"))]
pub mod terminal_session;

#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
