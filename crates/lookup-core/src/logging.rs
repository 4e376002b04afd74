#![forbid(unsafe_code)]

//! Logging macros for the engine crates.
//!
//! Library code logs through `lookup_core::debug!` and friends. With the
//! `tracing` feature these are the `tracing` macros; without it they vanish.
//!
//! With `tracing-json`, [`init_json`] installs a JSON subscriber filtered by
//! `LOOKUP_LOG` (falling back to `RUST_LOG`) that writes to the given sink. A
//! terminal UI owns stdout, so the sink is normally a log file.

#[cfg(feature = "tracing")]
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

// Without the `tracing` feature every logging macro expands to nothing and
// every span macro to a `NoopSpan`, so call sites compile unchanged.
#[cfg(not(feature = "tracing"))]
mod disabled {
    /// Discards its arguments.
    #[macro_export]
    macro_rules! trace { ($($t:tt)*) => {}; }
    /// Discards its arguments.
    #[macro_export]
    macro_rules! debug { ($($t:tt)*) => {}; }
    /// Discards its arguments.
    #[macro_export]
    macro_rules! info { ($($t:tt)*) => {}; }
    /// Discards its arguments.
    #[macro_export]
    macro_rules! warn { ($($t:tt)*) => {}; }
    /// Discards its arguments.
    #[macro_export]
    macro_rules! error { ($($t:tt)*) => {}; }

    /// Yields a [`NoopSpan`](crate::logging::NoopSpan).
    #[macro_export]
    macro_rules! trace_span { ($($t:tt)*) => { $crate::logging::NoopSpan }; }
    /// Yields a [`NoopSpan`](crate::logging::NoopSpan).
    #[macro_export]
    macro_rules! debug_span { ($($t:tt)*) => { $crate::logging::NoopSpan }; }
    /// Yields a [`NoopSpan`](crate::logging::NoopSpan).
    #[macro_export]
    macro_rules! info_span { ($($t:tt)*) => { $crate::logging::NoopSpan }; }
    /// Yields a [`NoopSpan`](crate::logging::NoopSpan).
    #[macro_export]
    macro_rules! warn_span { ($($t:tt)*) => { $crate::logging::NoopSpan }; }
    /// Yields a [`NoopSpan`](crate::logging::NoopSpan).
    #[macro_export]
    macro_rules! error_span { ($($t:tt)*) => { $crate::logging::NoopSpan }; }
}

/// Stand-in for `tracing::Span` when logging is compiled out.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }
}

/// Returned by [`NoopSpan::enter`]; dropping it does nothing.
#[cfg(not(feature = "tracing"))]
#[derive(Debug)]
pub struct NoopGuard;

/// Environment variable consulted for the log filter before `RUST_LOG`.
pub const LOG_FILTER_ENV: &str = "LOOKUP_LOG";

/// Install a global JSON subscriber writing to `writer`.
///
/// Returns `false` if a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json<W>(writer: W) -> bool
where
    W: for<'a> tracing_subscriber::fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(writer)
        .try_init()
        .is_ok()
}
