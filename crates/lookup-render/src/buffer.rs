#![forbid(unsafe_code)]

//! The frame the controls draw into.
//!
//! Cells are stored row-major. Writes go through a clip stack: host content
//! narrows it with [`Buffer::push_scissor`], while the floating listbox and
//! hover card use [`Buffer::push_portal_scissor`], which ignores every clip
//! below it and only respects the frame edges.
//!
//! A wide character is never split. Writing one that does not fully fit
//! writes nothing, and overwriting any column of an existing wide character
//! blanks all of its columns first.

use crate::cell::{Cell, CellContent};
use lookup_core::geometry::Rect;

/// Fixed-size cell grid with a clip stack.
///
/// ```
/// use lookup_render::buffer::Buffer;
/// use lookup_render::cell::Cell;
///
/// let mut frame = Buffer::new(10, 2);
/// frame.set(3, 1, Cell::from_char('O'));
/// frame.set(4, 1, Cell::from_char('K'));
/// assert_eq!(frame.row_text(1), "   OK     ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    // Never empty; the first entry is the whole frame.
    clips: Vec<Rect>,
}

impl Buffer {
    /// A blank frame. Each dimension is at least 1.
    pub fn new(width: u16, height: u16) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let frame = Rect::from_size(width, height);
        Self {
            width,
            height,
            cells: vec![Cell::default(); usize::from(width) * usize::from(height)],
            clips: vec![frame],
        }
    }

    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The whole frame as a rect at the origin.
    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    #[inline]
    fn offset(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(usize::from(y) * usize::from(self.width) + usize::from(x))
        } else {
            None
        }
    }

    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        let at = self.offset(x, y)?;
        self.cells.get(at)
    }

    /// Direct access that bypasses clipping and wide-character bookkeeping.
    #[inline]
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        let at = self.offset(x, y)?;
        self.cells.get_mut(at)
    }

    /// Blank every column of the wide character that covers `(x, y)`.
    fn break_wide(&mut self, x: u16, y: u16) {
        let mut head = x;
        while head > 0 && self.get(head, y).is_some_and(Cell::is_continuation) {
            head -= 1;
        }
        let span = self
            .get(head, y)
            .map_or(1, |cell| cell.content.width().max(1));
        let span = u16::try_from(span).unwrap_or(1);
        if span < 2 || head.saturating_add(span) <= x {
            return;
        }
        for col in head..head.saturating_add(span) {
            if let Some(cell) = self.get_mut(col, y) {
                *cell = Cell::default();
            }
        }
    }

    /// Write `cell` at `(x, y)` under the current clip.
    ///
    /// The background is composited over the existing one, so a transparent
    /// background keeps what a container painted earlier.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let span = u16::try_from(cell.content.width().max(1)).unwrap_or(1);
        let clip = self.current_scissor();
        let fits = (0..span).all(|dx| {
            let col = x.saturating_add(dx);
            self.offset(col, y).is_some() && clip.contains(col, y)
        });
        if !fits {
            return;
        }

        for dx in 0..span {
            self.break_wide(x + dx, y);
        }

        let Some(head) = self.get_mut(x, y) else {
            return;
        };
        let bg = cell.bg.over(head.bg);
        *head = Cell { bg, ..cell };
        for dx in 1..span {
            if let Some(tail) = self.get_mut(x + dx, y) {
                *tail = Cell { bg, ..Cell::CONTINUATION };
            }
        }
    }

    /// Write `cell` into every position of `rect` that the clip allows.
    pub fn fill(&mut self, rect: Rect, cell: Cell) {
        let area = self.current_scissor().intersection(&rect);
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                self.set(x, y, cell);
            }
        }
    }

    /// Blank the whole frame. The clip stack is untouched.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Visible text of one row: blanks become spaces, wide characters appear
    /// once. Out-of-range rows are empty.
    pub fn row_text(&self, y: u16) -> String {
        let Some(start) = self.offset(0, y) else {
            return String::new();
        };
        let row = &self.cells[start..start + usize::from(self.width)];
        let mut text = String::with_capacity(row.len());
        for cell in row {
            match cell.content {
                CellContent::Char(c) => text.push(c),
                CellContent::Empty => text.push(' '),
                CellContent::Continuation => {}
            }
        }
        text
    }

    // ------------------------------------------------------------------
    // Clipping
    // ------------------------------------------------------------------

    /// Narrow the clip to its intersection with `rect`.
    pub fn push_scissor(&mut self, rect: Rect) {
        let narrowed = self.current_scissor().intersection(&rect);
        self.clips.push(narrowed);
    }

    /// Clip to `rect` within the frame, ignoring enclosing clips.
    pub fn push_portal_scissor(&mut self, rect: Rect) {
        let inside = self.bounds().intersection(&rect);
        self.clips.push(inside);
    }

    /// Undo the last push. The frame-wide clip stays.
    pub fn pop_scissor(&mut self) {
        if self.clips.len() > 1 {
            self.clips.truncate(self.clips.len() - 1);
        }
    }

    #[inline]
    pub fn current_scissor(&self) -> Rect {
        self.clips.last().copied().unwrap_or_else(|| self.bounds())
    }

    /// Number of active clips, counting the frame-wide one.
    #[inline]
    pub fn scissor_depth(&self) -> usize {
        self.clips.len()
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::PackedRgba;

    fn ch(frame: &Buffer, x: u16, y: u16) -> Option<char> {
        frame.get(x, y).and_then(|c| c.content.as_char())
    }

    #[test]
    fn degenerate_sizes_become_one() {
        let frame = Buffer::new(0, 7);
        assert_eq!(frame.width(), 1);
        assert_eq!(frame.height(), 7);
        assert_eq!(frame.cells().len(), 7);
    }

    #[test]
    fn writes_land_and_outside_is_ignored() {
        let mut frame = Buffer::new(3, 2);
        frame.set(2, 1, Cell::from_char('z'));
        frame.set(3, 1, Cell::from_char('!'));
        frame.set(0, 9, Cell::from_char('!'));
        assert_eq!(ch(&frame, 2, 1), Some('z'));
        assert!(frame.get(3, 1).is_none());
        assert_eq!(frame.cells().iter().filter(|c| !c.is_empty()).count(), 1);
    }

    #[test]
    fn nested_clips_intersect() {
        let mut frame = Buffer::new(8, 1);
        frame.push_scissor(Rect::new(1, 0, 5, 1));
        frame.push_scissor(Rect::new(3, 0, 5, 1));
        frame.fill(frame.bounds(), Cell::from_char('='));
        frame.pop_scissor();
        frame.pop_scissor();
        assert_eq!(frame.row_text(0), "   ===  ");
    }

    #[test]
    fn portal_clip_ignores_host_clip() {
        let mut frame = Buffer::new(5, 4);
        frame.push_scissor(Rect::new(0, 0, 5, 2));
        frame.set(1, 3, Cell::from_char('h'));
        frame.push_portal_scissor(Rect::new(0, 2, 9, 9));
        assert_eq!(frame.current_scissor(), Rect::new(0, 2, 5, 2));
        frame.set(1, 3, Cell::from_char('p'));
        frame.pop_scissor();
        frame.pop_scissor();
        assert_eq!(ch(&frame, 1, 3), Some('p'));
        assert_eq!(frame.scissor_depth(), 1);
    }

    #[test]
    fn frame_clip_survives_extra_pops() {
        let mut frame = Buffer::new(2, 2);
        frame.pop_scissor();
        frame.pop_scissor();
        assert_eq!(frame.current_scissor(), frame.bounds());
    }

    #[test]
    fn wide_character_occupies_two_columns() {
        let mut frame = Buffer::new(5, 1);
        frame.set(1, 0, Cell::from_char('界'));
        assert!(frame.get(2, 0).is_some_and(Cell::is_continuation));
        assert_eq!(frame.row_text(0), " 界  ");
    }

    #[test]
    fn wide_character_at_edge_is_dropped() {
        let mut frame = Buffer::new(2, 1);
        frame.set(1, 0, Cell::from_char('界'));
        assert_eq!(frame.row_text(0), "  ");
    }

    #[test]
    fn writing_over_a_tail_blanks_the_head() {
        let mut frame = Buffer::new(3, 1);
        frame.set(0, 0, Cell::from_char('界'));
        frame.set(1, 0, Cell::from_char('a'));
        assert_eq!(frame.row_text(0), " a ");
    }

    #[test]
    fn transparent_background_shows_through() {
        let mut frame = Buffer::new(2, 1);
        let panel = PackedRgba::rgb(20, 20, 30);
        frame.fill(frame.bounds(), Cell::default().with_bg(panel));
        frame.set(1, 0, Cell::from_char('x'));
        assert_eq!(frame.get(1, 0).map(|c| c.bg), Some(panel));
    }

    #[test]
    fn clear_blanks_everything() {
        let mut frame = Buffer::new(3, 3);
        frame.fill(frame.bounds(), Cell::from_char('#'));
        frame.clear();
        assert!(frame.cells().iter().all(Cell::is_empty));
        assert_eq!(frame.row_text(9), "");
    }
}
