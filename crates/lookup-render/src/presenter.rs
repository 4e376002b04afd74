#![forbid(unsafe_code)]

//! Presenter: state-tracked ANSI emission.
//!
//! Turns a [`BufferDiff`] into terminal output, tracking the last emitted
//! style and cursor position so unchanged state is never re-sent. Output is
//! buffered and flushed once per frame.
//!
//! ```
//! use lookup_render::buffer::Buffer;
//! use lookup_render::cell::Cell;
//! use lookup_render::diff::BufferDiff;
//! use lookup_render::presenter::Presenter;
//!
//! let mut presenter = Presenter::new(Vec::new());
//! let prev = Buffer::new(10, 1);
//! let mut next = Buffer::new(10, 1);
//! next.set(0, 0, Cell::from_char('A'));
//!
//! presenter.present(&next, &BufferDiff::compute(&prev, &next))?;
//! assert!(String::from_utf8_lossy(presenter.get_ref()).contains('A'));
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, BufWriter, Write};

use crate::ansi;
use crate::buffer::Buffer;
use crate::cell::{Cell, CellContent, PackedRgba, StyleFlags};
use crate::diff::BufferDiff;

const BUFFER_CAPACITY: usize = 16 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellStyle {
    fg: PackedRgba,
    bg: PackedRgba,
    flags: StyleFlags,
}

impl CellStyle {
    fn from_cell(cell: &Cell) -> Self {
        Self {
            fg: cell.fg,
            bg: cell.bg,
            flags: cell.flags,
        }
    }
}

/// State-tracked ANSI presenter.
pub struct Presenter<W: Write> {
    writer: BufWriter<W>,
    current_style: Option<CellStyle>,
    cursor: Option<(u16, u16)>,
    sync_output: bool,
}

impl<W: Write> Presenter<W> {
    /// Create a presenter writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(BUFFER_CAPACITY, writer),
            current_style: None,
            cursor: None,
            sync_output: false,
        }
    }

    /// Wrap frames in DEC 2026 synchronized output.
    #[must_use]
    pub fn with_sync_output(mut self, enabled: bool) -> Self {
        self.sync_output = enabled;
        self
    }

    /// The underlying writer. Everything presented so far has been flushed.
    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    /// Forget tracked state so the next frame re-sends style and position.
    pub fn invalidate(&mut self) {
        self.current_style = None;
        self.cursor = None;
    }

    /// Clear the screen and forget tracked state.
    pub fn clear_screen(&mut self) -> io::Result<()> {
        ansi::sgr_reset(&mut self.writer)?;
        ansi::erase_display(&mut self.writer)?;
        self.invalidate();
        self.writer.flush()
    }

    /// Emit the cells of `buffer` listed in `diff`, then reset style and flush.
    pub fn present(&mut self, buffer: &Buffer, diff: &BufferDiff) -> io::Result<()> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "present",
            width = buffer.width(),
            height = buffer.height(),
            changes = diff.len()
        )
        .entered();

        if self.sync_output {
            ansi::sync_begin(&mut self.writer)?;
        }

        for run in diff.runs() {
            self.move_cursor_to(run.x0, run.y)?;
            for x in run.x0..=run.x1 {
                if let Some(cell) = buffer.get(x, run.y) {
                    self.emit_cell(cell)?;
                }
            }
        }

        ansi::sgr_reset(&mut self.writer)?;
        self.current_style = None;

        if self.sync_output {
            ansi::sync_end(&mut self.writer)?;
        }
        self.writer.flush()
    }

    fn emit_cell(&mut self, cell: &Cell) -> io::Result<()> {
        if cell.is_continuation() {
            return Ok(());
        }
        self.emit_style_changes(cell)?;
        match cell.content {
            CellContent::Char(ch) => {
                let mut utf8 = [0u8; 4];
                self.writer.write_all(ch.encode_utf8(&mut utf8).as_bytes())?;
            }
            _ => self.writer.write_all(b" ")?,
        }
        if let Some((x, y)) = self.cursor {
            let advance = cell.content.width().max(1) as u16;
            self.cursor = Some((x.saturating_add(advance), y));
        }
        Ok(())
    }

    fn emit_style_changes(&mut self, cell: &Cell) -> io::Result<()> {
        let style = CellStyle::from_cell(cell);
        if self.current_style == Some(style) {
            return Ok(());
        }
        ansi::sgr_reset(&mut self.writer)?;
        if style.fg.a() > 0 {
            ansi::sgr_fg_packed(&mut self.writer, style.fg)?;
        }
        if style.bg.a() > 0 {
            ansi::sgr_bg_packed(&mut self.writer, style.bg)?;
        }
        ansi::sgr_flags(&mut self.writer, style.flags)?;
        self.current_style = Some(style);
        Ok(())
    }

    fn move_cursor_to(&mut self, x: u16, y: u16) -> io::Result<()> {
        if self.cursor == Some((x, y)) {
            return Ok(());
        }
        ansi::cup(&mut self.writer, y, x)?;
        self.cursor = Some((x, y));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(presenter: &Presenter<Vec<u8>>) -> String {
        String::from_utf8_lossy(presenter.get_ref()).into_owned()
    }

    #[test]
    fn adjacent_cells_share_one_cursor_move() {
        let prev = Buffer::new(10, 2);
        let mut next = Buffer::new(10, 2);
        next.set(2, 1, Cell::from_char('o'));
        next.set(3, 1, Cell::from_char('k'));
        let mut presenter = Presenter::new(Vec::new());
        presenter
            .present(&next, &BufferDiff::compute(&prev, &next))
            .expect("present");
        let out = output(&presenter);
        assert_eq!(out.matches("\x1b[2;3H").count(), 1);
        assert!(out.contains("ok"));
    }

    #[test]
    fn unchanged_frame_emits_only_reset() {
        let buf = Buffer::new(4, 1);
        let mut presenter = Presenter::new(Vec::new());
        presenter
            .present(&buf, &BufferDiff::compute(&buf, &buf))
            .expect("present");
        assert_eq!(output(&presenter), "\x1b[0m");
    }

    #[test]
    fn sync_output_wraps_frame() {
        let buf = Buffer::new(2, 1);
        let mut presenter = Presenter::new(Vec::new()).with_sync_output(true);
        presenter
            .present(&buf, &BufferDiff::full(2, 1))
            .expect("present");
        let out = output(&presenter);
        assert!(out.starts_with("\x1b[?2026h"));
        assert!(out.ends_with("\x1b[?2026l"));
    }

    #[test]
    fn style_sent_once_for_uniform_run() {
        let prev = Buffer::new(3, 1);
        let mut next = Buffer::new(3, 1);
        let cell = Cell::from_char('x').with_flags(StyleFlags::REVERSE);
        for x in 0..3 {
            next.set(x, 0, cell);
        }
        let mut presenter = Presenter::new(Vec::new());
        presenter
            .present(&next, &BufferDiff::compute(&prev, &next))
            .expect("present");
        assert_eq!(output(&presenter).matches("\x1b[7m").count(), 1);
    }
}
