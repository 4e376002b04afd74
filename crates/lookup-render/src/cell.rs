#![forbid(unsafe_code)]

//! One grid position: what it shows and how.
//!
//! A wide character is stored as a head cell carrying the character plus one
//! [`CellContent::Continuation`] cell per extra column.

use crate::char_width;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellContent {
    /// Presented as a space.
    #[default]
    Empty,
    Char(char),
    /// Covered by the wide character to the left.
    Continuation,
}

impl CellContent {
    #[inline]
    pub const fn as_char(self) -> Option<char> {
        if let Self::Char(c) = self { Some(c) } else { None }
    }

    /// Columns the content spans; 0 for empty and continuation cells.
    #[inline]
    pub fn width(self) -> usize {
        self.as_char().map_or(0, char_width)
    }
}

/// Content plus colors and attributes.
///
/// `Cell::default()` is blank, white on transparent, unstyled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub content: CellContent,
    pub fg: PackedRgba,
    pub bg: PackedRgba,
    pub flags: StyleFlags,
}

impl Cell {
    /// Tail of a wide character. Colors are filled in by the buffer.
    pub const CONTINUATION: Self = Self {
        content: CellContent::Continuation,
        ..Self::new(CellContent::Empty).with_fg(PackedRgba::TRANSPARENT)
    };

    #[inline]
    pub const fn new(content: CellContent) -> Self {
        Self {
            content,
            fg: PackedRgba::WHITE,
            bg: PackedRgba::TRANSPARENT,
            flags: StyleFlags::empty(),
        }
    }

    #[inline]
    pub const fn from_char(c: char) -> Self {
        Self::new(CellContent::Char(c))
    }

    #[inline]
    pub const fn is_continuation(&self) -> bool {
        matches!(self.content, CellContent::Continuation)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        matches!(self.content, CellContent::Empty)
    }

    #[inline]
    #[must_use]
    pub const fn with_fg(self, fg: PackedRgba) -> Self {
        Self { fg, ..self }
    }

    #[inline]
    #[must_use]
    pub const fn with_bg(self, bg: PackedRgba) -> Self {
        Self { bg, ..self }
    }

    #[inline]
    #[must_use]
    pub const fn with_flags(self, flags: StyleFlags) -> Self {
        Self { flags, ..self }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(CellContent::Empty)
    }
}

/// RGBA color packed big-endian into a `u32` (`0xRRGGBBAA`).
///
/// Alpha 0 is "unset": the presenter leaves the terminal's default color in
/// place and [`PackedRgba::over`] keeps whatever is underneath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct PackedRgba(pub u32);

impl PackedRgba {
    pub const TRANSPARENT: Self = Self(0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, u8::MAX)
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(u32::from_be_bytes([r, g, b, a]))
    }

    #[inline]
    const fn channels(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    #[inline]
    pub const fn r(self) -> u8 {
        self.channels()[0]
    }

    #[inline]
    pub const fn g(self) -> u8 {
        self.channels()[1]
    }

    #[inline]
    pub const fn b(self) -> u8 {
        self.channels()[2]
    }

    #[inline]
    pub const fn a(self) -> u8 {
        self.channels()[3]
    }

    /// Source-over composite onto `dst`. The result is opaque unless `self`
    /// is fully transparent.
    #[inline]
    pub fn over(self, dst: Self) -> Self {
        let alpha = u16::from(self.a());
        match alpha {
            255 => self,
            0 => dst,
            _ => {
                let mix = |s: u8, d: u8| {
                    let v = (u16::from(s) * alpha + u16::from(d) * (255 - alpha) + 127) / 255;
                    u8::try_from(v).unwrap_or(u8::MAX)
                };
                let [sr, sg, sb, _] = self.channels();
                let [dr, dg, db, _] = dst.channels();
                Self::rgb(mix(sr, dr), mix(sg, dg), mix(sb, db))
            }
        }
    }
}

bitflags::bitflags! {
    /// SGR attributes a cell can carry. Bit positions follow the SGR codes
    /// where they fit in a byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        /// Swap foreground and background. Marks the highlighted row.
        const REVERSE = 1 << 5;
        const STRIKETHROUGH = 1 << 6;
    }
}
