#![forbid(unsafe_code)]

//! Input events as the lookup controls see them.
//!
//! Controls never touch backend events: the host converts once with
//! [`Event::from_crossterm`], and tests script these values directly.
//! Coordinates are 0-indexed cells in the same space the buffer uses, so a
//! mouse position can be hit-tested against a rendered rectangle as is.
//!
//! Keys the controls have no use for (function keys, media keys, lone
//! modifier presses) are dropped during conversion.

use bitflags::bitflags;
#[cfg(not(target_arch = "wasm32"))]
use crossterm::event as cte;

/// One input event delivered to a control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// The terminal now has `width` x `height` cells.
    Resize { width: u16, height: u16 },
    /// Text inserted in one piece, e.g. from bracketed paste.
    Paste(PasteEvent),
    /// The terminal window gained (`true`) or lost (`false`) focus.
    Focus(bool),
    /// Timer wake-up from the host loop.
    Tick,
}

impl Event {
    /// Plain key press without modifiers.
    #[must_use]
    pub const fn key(code: KeyCode) -> Self {
        Self::Key(KeyEvent::new(code))
    }

    /// Mouse event without modifiers.
    #[must_use]
    pub const fn mouse(kind: MouseEventKind, x: u16, y: u16) -> Self {
        Self::Mouse(MouseEvent::new(kind, x, y))
    }

    /// Convert a crossterm event. Returns `None` for input with no meaning
    /// to a combobox.
    #[must_use]
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_crossterm(event: cte::Event) -> Option<Self> {
        Some(match event {
            cte::Event::Key(key) => Self::Key(KeyEvent {
                code: KeyCode::from_crossterm(key.code)?,
                modifiers: Modifiers::from_crossterm(key.modifiers),
                kind: match key.kind {
                    cte::KeyEventKind::Press => KeyEventKind::Press,
                    cte::KeyEventKind::Repeat => KeyEventKind::Repeat,
                    cte::KeyEventKind::Release => KeyEventKind::Release,
                },
            }),
            cte::Event::Mouse(mouse) => Self::Mouse(MouseEvent::from_crossterm(mouse)?),
            cte::Event::Resize(width, height) => Self::Resize { width, height },
            cte::Event::Paste(text) => Self::Paste(PasteEvent::new(text)),
            cte::Event::FocusGained => Self::Focus(true),
            cte::Event::FocusLost => Self::Focus(false),
        })
    }
}

// ---------------------------------------------------------------------------
// Keyboard
// ---------------------------------------------------------------------------

/// A key with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A press of `code` with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Presses and auto-repeats act; releases are ignored by every control.
    #[must_use]
    pub const fn is_press(&self) -> bool {
        !matches!(self.kind, KeyEventKind::Release)
    }
}

/// Keys a combobox reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Printable input, appended to the query.
    Char(char),
    Backspace,
    /// Commit the highlighted row.
    Enter,
    /// Dismiss the dropdown.
    Escape,
    /// Leave the control.
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

impl KeyCode {
    #[cfg(not(target_arch = "wasm32"))]
    fn from_crossterm(code: cte::KeyCode) -> Option<Self> {
        Some(match code {
            cte::KeyCode::Char(c) => Self::Char(c),
            cte::KeyCode::Backspace => Self::Backspace,
            cte::KeyCode::Enter => Self::Enter,
            cte::KeyCode::Esc => Self::Escape,
            cte::KeyCode::Tab => Self::Tab,
            cte::KeyCode::BackTab => Self::BackTab,
            cte::KeyCode::Up => Self::Up,
            cte::KeyCode::Down => Self::Down,
            cte::KeyCode::Left => Self::Left,
            cte::KeyCode::Right => Self::Right,
            cte::KeyCode::Home => Self::Home,
            cte::KeyCode::End => Self::End,
            cte::KeyCode::PageUp => Self::PageUp,
            cte::KeyCode::PageDown => Self::PageDown,
            _ => return None,
        })
    }
}

/// Press, auto-repeat, or release. Terminals without release reporting
/// only ever send `Press`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

bitflags! {
    /// Held modifier keys.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE  = 0;
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

impl Modifiers {
    #[cfg(not(target_arch = "wasm32"))]
    fn from_crossterm(modifiers: cte::KeyModifiers) -> Self {
        [
            (cte::KeyModifiers::SHIFT, Self::SHIFT),
            (cte::KeyModifiers::ALT, Self::ALT),
            (cte::KeyModifiers::CONTROL, Self::CTRL),
        ]
        .into_iter()
        .filter(|(ct, _)| modifiers.contains(*ct))
        .fold(Self::NONE, |acc, (_, ours)| acc | ours)
    }
}

// ---------------------------------------------------------------------------
// Pointer
// ---------------------------------------------------------------------------

/// A pointer event at cell `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub x: u16,
    pub y: u16,
    pub modifiers: Modifiers,
}

impl MouseEvent {
    #[must_use]
    pub const fn new(kind: MouseEventKind, x: u16, y: u16) -> Self {
        Self {
            kind,
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn position(&self) -> (u16, u16) {
        (self.x, self.y)
    }

    /// Horizontal wheel input has no meaning for a vertical listbox and is
    /// dropped.
    #[cfg(not(target_arch = "wasm32"))]
    fn from_crossterm(event: cte::MouseEvent) -> Option<Self> {
        let button = |b: cte::MouseButton| match b {
            cte::MouseButton::Left => MouseButton::Left,
            cte::MouseButton::Right => MouseButton::Right,
            cte::MouseButton::Middle => MouseButton::Middle,
        };
        let kind = match event.kind {
            cte::MouseEventKind::Down(b) => MouseEventKind::Down(button(b)),
            cte::MouseEventKind::Up(b) => MouseEventKind::Up(button(b)),
            cte::MouseEventKind::Drag(b) => MouseEventKind::Drag(button(b)),
            cte::MouseEventKind::Moved => MouseEventKind::Moved,
            cte::MouseEventKind::ScrollUp => MouseEventKind::ScrollUp,
            cte::MouseEventKind::ScrollDown => MouseEventKind::ScrollDown,
            cte::MouseEventKind::ScrollLeft | cte::MouseEventKind::ScrollRight => return None,
        };
        Some(
            Self::new(kind, event.column, event.row)
                .with_modifiers(Modifiers::from_crossterm(event.modifiers)),
        )
    }
}

/// What the pointer did. A press (`Down`) is what outside-click dismissal
/// listens for; `Moved` drives row hover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Down(MouseButton),
    Up(MouseButton),
    Drag(MouseButton),
    Moved,
    ScrollUp,
    ScrollDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pasted text. Control characters are the receiving control's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteEvent {
    pub text: String,
}

impl PasteEvent {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_key_is_unmodified_press() {
        let key = KeyEvent::new(KeyCode::Enter);
        assert_eq!(key.kind, KeyEventKind::Press);
        assert_eq!(key.modifiers, Modifiers::NONE);
        assert!(key.is_press());
    }

    #[test]
    fn release_does_not_act_but_repeat_does() {
        assert!(!KeyEvent::new(KeyCode::Down).with_kind(KeyEventKind::Release).is_press());
        assert!(KeyEvent::new(KeyCode::Down).with_kind(KeyEventKind::Repeat).is_press());
    }

    #[test]
    fn ctrl_and_alt_helpers() {
        let clear = KeyEvent::new(KeyCode::Char('u')).with_modifiers(Modifiers::CTRL);
        assert!(clear.ctrl());
        assert!(!clear.alt());
        let both = clear.with_modifiers(Modifiers::CTRL | Modifiers::ALT);
        assert!(both.ctrl() && both.alt());
    }

    #[test]
    fn event_shorthands_match_long_form() {
        assert_eq!(
            Event::key(KeyCode::Escape),
            Event::Key(KeyEvent::new(KeyCode::Escape))
        );
        let press = Event::mouse(MouseEventKind::Down(MouseButton::Left), 1, 2);
        let Event::Mouse(mouse) = press else {
            panic!("expected a mouse event");
        };
        assert_eq!(mouse.position(), (1, 2));
    }

    #[cfg(not(target_arch = "wasm32"))]
    mod crossterm_conversion {
        use super::super::*;

        fn ct_key(code: cte::KeyCode, mods: cte::KeyModifiers) -> cte::Event {
            cte::Event::Key(cte::KeyEvent::new(code, mods))
        }

        fn ct_mouse(kind: cte::MouseEventKind) -> cte::Event {
            cte::Event::Mouse(cte::MouseEvent {
                kind,
                column: 4,
                row: 6,
                modifiers: cte::KeyModifiers::NONE,
            })
        }

        #[test]
        fn refresh_shortcut_keeps_ctrl() {
            let mapped = Event::from_crossterm(ct_key(
                cte::KeyCode::Char('r'),
                cte::KeyModifiers::CONTROL,
            ));
            assert_eq!(
                mapped,
                Some(Event::Key(
                    KeyEvent::new(KeyCode::Char('r')).with_modifiers(Modifiers::CTRL)
                ))
            );
        }

        #[test]
        fn esc_becomes_escape() {
            let mapped = Event::from_crossterm(ct_key(cte::KeyCode::Esc, cte::KeyModifiers::NONE));
            assert_eq!(mapped, Some(Event::key(KeyCode::Escape)));
        }

        #[test]
        fn function_keys_are_dropped() {
            let mapped = Event::from_crossterm(ct_key(cte::KeyCode::F(5), cte::KeyModifiers::NONE));
            assert_eq!(mapped, None);
        }

        #[test]
        fn press_keeps_cell_position() {
            let mapped = Event::from_crossterm(ct_mouse(cte::MouseEventKind::Down(
                cte::MouseButton::Left,
            )));
            assert_eq!(
                mapped,
                Some(Event::mouse(MouseEventKind::Down(MouseButton::Left), 4, 6))
            );
        }

        #[test]
        fn horizontal_wheel_is_dropped() {
            assert_eq!(
                Event::from_crossterm(ct_mouse(cte::MouseEventKind::ScrollLeft)),
                None
            );
        }

        #[test]
        fn focus_paste_and_resize() {
            assert_eq!(
                Event::from_crossterm(cte::Event::FocusLost),
                Some(Event::Focus(false))
            );
            assert_eq!(
                Event::from_crossterm(cte::Event::Paste("Acme".into())),
                Some(Event::Paste(PasteEvent::new("Acme")))
            );
            assert_eq!(
                Event::from_crossterm(cte::Event::Resize(80, 24)),
                Some(Event::Resize {
                    width: 80,
                    height: 24
                })
            );
        }
    }
}
