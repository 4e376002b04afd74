#![forbid(unsafe_code)]

//! ANSI escape sequence generation helpers.
//!
//! Pure byte-generation functions; state tracking lives in the presenter.
//!
//! | Sequence | Description |
//! |----------|-------------|
//! | `ESC [ n m` | SGR (Select Graphic Rendition) |
//! | `ESC [ row ; col H` | CUP (Cursor Position, 1-indexed) |
//! | `ESC [ 2 J` | ED (Erase Display) |
//! | `ESC [ ? 2026 h/l` | Synchronized Output (DEC) |

use std::io::{self, Write};

use crate::cell::{PackedRgba, StyleFlags};

/// SGR reset: `CSI 0 m`
pub const SGR_RESET: &[u8] = b"\x1b[0m";

/// Write SGR reset sequence.
#[inline]
pub fn sgr_reset<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(SGR_RESET)
}

/// SGR "on" code for a single style flag.
#[must_use]
pub fn sgr_code_for_flag(flag: StyleFlags) -> Option<u8> {
    const CODES: [(StyleFlags, u8); 6] = [
        (StyleFlags::BOLD, 1),
        (StyleFlags::DIM, 2),
        (StyleFlags::ITALIC, 3),
        (StyleFlags::UNDERLINE, 4),
        (StyleFlags::REVERSE, 7),
        (StyleFlags::STRIKETHROUGH, 9),
    ];
    CODES
        .iter()
        .find(|(f, _)| *f == flag)
        .map(|(_, code)| *code)
}

/// Write one SGR sequence enabling every set flag, e.g. `CSI 1;7 m`.
///
/// Does not reset first.
pub fn sgr_flags<W: Write>(w: &mut W, flags: StyleFlags) -> io::Result<()> {
    if flags.is_empty() {
        return Ok(());
    }
    let codes: Vec<String> = flags
        .iter()
        .filter_map(sgr_code_for_flag)
        .map(|c| c.to_string())
        .collect();
    write!(w, "\x1b[{}m", codes.join(";"))
}

/// True-color foreground: `CSI 38;2;r;g;b m`
pub fn sgr_fg_rgb<W: Write>(w: &mut W, r: u8, g: u8, b: u8) -> io::Result<()> {
    write!(w, "\x1b[38;2;{r};{g};{b}m")
}

/// True-color background: `CSI 48;2;r;g;b m`
pub fn sgr_bg_rgb<W: Write>(w: &mut W, r: u8, g: u8, b: u8) -> io::Result<()> {
    write!(w, "\x1b[48;2;{r};{g};{b}m")
}

/// Foreground from a packed color; transparent selects the default (`CSI 39 m`).
pub fn sgr_fg_packed<W: Write>(w: &mut W, color: PackedRgba) -> io::Result<()> {
    if color.a() == 0 {
        return w.write_all(b"\x1b[39m");
    }
    sgr_fg_rgb(w, color.r(), color.g(), color.b())
}

/// Background from a packed color; transparent selects the default (`CSI 49 m`).
pub fn sgr_bg_packed<W: Write>(w: &mut W, color: PackedRgba) -> io::Result<()> {
    if color.a() == 0 {
        return w.write_all(b"\x1b[49m");
    }
    sgr_bg_rgb(w, color.r(), color.g(), color.b())
}

/// CUP (Cursor Position): `CSI row ; col H`. Inputs are 0-indexed.
pub fn cup<W: Write>(w: &mut W, row: u16, col: u16) -> io::Result<()> {
    write!(
        w,
        "\x1b[{};{}H",
        row.saturating_add(1),
        col.saturating_add(1)
    )
}

/// Erase the whole display: `CSI 2 J`
pub fn erase_display<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Begin synchronized output: `CSI ? 2026 h`
pub fn sync_begin<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

/// End synchronized output: `CSI ? 2026 l`
pub fn sync_end<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}
