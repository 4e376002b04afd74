#![forbid(unsafe_code)]

//! Terminal ownership for a full-screen form.
//!
//! [`TerminalSession`] enters raw mode, then switches on the optional modes
//! in [`SessionOptions`]. Each mode that was actually switched on is pushed
//! onto a stack; dropping the session (normally, on an early `?` return, or
//! from the panic hook) switches them off in reverse order, shows the
//! cursor, and leaves raw mode.
//!
//! ```no_run
//! use lookup_core::terminal_session::{SessionOptions, TerminalSession};
//!
//! let session = TerminalSession::new(SessionOptions {
//!     alternate_screen: true,
//!     mouse_capture: true,
//!     ..Default::default()
//! })?;
//! // ... run the form ...
//! drop(session); // terminal restored
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use crossterm::{cursor, event as cte, execute, terminal};

use crate::event::Event;

/// Which optional terminal modes a session switches on. All off by default.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Draw on the alternate screen and restore the shell's screen on exit.
    pub alternate_screen: bool,
    /// Report presses and motion. Row hover and outside-click dismissal need
    /// this.
    pub mouse_capture: bool,
    /// Deliver pastes as one [`Event::Paste`] instead of a burst of keys.
    pub bracketed_paste: bool,
    /// Report terminal focus changes. A focus loss blurs the active control.
    pub focus_events: bool,
}

/// An optional mode that has been switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    AlternateScreen,
    MouseCapture,
    BracketedPaste,
    FocusEvents,
}

impl Mode {
    fn enable(self, out: &mut impl Write) -> io::Result<()> {
        match self {
            Self::AlternateScreen => execute!(out, terminal::EnterAlternateScreen),
            Self::MouseCapture => execute!(out, cte::EnableMouseCapture),
            Self::BracketedPaste => execute!(out, cte::EnableBracketedPaste),
            Self::FocusEvents => execute!(out, cte::EnableFocusChange),
        }
    }

    fn disable(self, out: &mut impl Write) -> io::Result<()> {
        match self {
            Self::AlternateScreen => execute!(out, terminal::LeaveAlternateScreen),
            Self::MouseCapture => execute!(out, cte::DisableMouseCapture),
            Self::BracketedPaste => execute!(out, cte::DisableBracketedPaste),
            Self::FocusEvents => execute!(out, cte::DisableFocusChange),
        }
    }

    /// Modes requested by `options`, in the order they are switched on.
    fn requested(options: &SessionOptions) -> Vec<Mode> {
        [
            (options.alternate_screen, Self::AlternateScreen),
            (options.mouse_capture, Self::MouseCapture),
            (options.bracketed_paste, Self::BracketedPaste),
            (options.focus_events, Self::FocusEvents),
        ]
        .into_iter()
        .filter_map(|(on, mode)| on.then_some(mode))
        .collect()
    }
}

/// Raw mode plus the requested modes, restored on drop.
///
/// Only one session should exist at a time.
#[derive(Debug)]
pub struct TerminalSession {
    options: SessionOptions,
    enabled: Vec<Mode>,
}

impl TerminalSession {
    /// Enter raw mode and switch on the requested modes.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error. Modes switched on before the failure are
    /// switched off again before returning.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();
        terminal::enable_raw_mode()?;

        let mut session = Self {
            options: options.clone(),
            enabled: Vec::new(),
        };
        let mut out = io::stdout();
        for mode in Mode::requested(&options) {
            // On error `session` drops here and unwinds what is on the stack.
            mode.enable(&mut out)?;
            session.enabled.push(mode);
        }

        #[cfg(feature = "tracing")]
        tracing::info!(?options, "terminal session started");
        Ok(session)
    }

    /// Terminal size as `(columns, rows)`.
    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Wait up to `timeout` for input. `Ok(false)` on timeout.
    pub fn poll_event(&self, timeout: Duration) -> io::Result<bool> {
        cte::poll(timeout)
    }

    /// Read one event, blocking. `Ok(None)` for input the controls ignore.
    pub fn read_event(&self) -> io::Result<Option<Event>> {
        Ok(Event::from_crossterm(cte::read()?))
    }

    /// Place the text cursor in the focused field.
    pub fn show_cursor_at(&self, x: u16, y: u16) -> io::Result<()> {
        execute!(io::stdout(), cursor::MoveTo(x, y), cursor::Show)
    }

    pub fn hide_cursor(&self) -> io::Result<()> {
        execute!(io::stdout(), cursor::Hide)
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let mut out = io::stdout();
        while let Some(mode) = self.enabled.pop() {
            let _ = mode.disable(&mut out);
        }
        let _ = execute!(out, cursor::Show);
        let _ = terminal::disable_raw_mode();
        let _ = out.flush();
        #[cfg(feature = "tracing")]
        tracing::info!("terminal session restored");
    }
}

/// On panic, restore everything a session could have switched on before the
/// message prints. The session's own `Drop` runs later and is harmless.
fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let mut out = io::stdout();
            for mode in [
                Mode::FocusEvents,
                Mode::BracketedPaste,
                Mode::MouseCapture,
                Mode::AlternateScreen,
            ] {
                let _ = mode.disable(&mut out);
            }
            let _ = execute!(out, cursor::Show);
            let _ = terminal::disable_raw_mode();
            let _ = out.flush();
            previous(info);
        }));
    });
}
