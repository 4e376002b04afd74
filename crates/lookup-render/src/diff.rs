#![forbid(unsafe_code)]

//! Diff computation between buffers.
//!
//! Row-major scan comparing cells; changed cells on a row are coalesced into
//! [`ChangeRun`]s so the presenter positions the cursor once per run.
//!
//! ```
//! use lookup_render::buffer::Buffer;
//! use lookup_render::cell::Cell;
//! use lookup_render::diff::BufferDiff;
//!
//! let old = Buffer::new(10, 2);
//! let mut new = Buffer::new(10, 2);
//! new.set(5, 1, Cell::from_char('X'));
//! new.set(6, 1, Cell::from_char('Y'));
//!
//! let diff = BufferDiff::compute(&old, &new);
//! assert_eq!(diff.len(), 2);
//! assert_eq!(diff.runs().len(), 1);
//! ```

use crate::buffer::Buffer;

/// A contiguous run of changed cells on a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRun {
    /// Row index.
    pub y: u16,
    /// Start column (inclusive).
    pub x0: u16,
    /// End column (inclusive).
    pub x1: u16,
}

/// Positions where two buffers differ, in row-major order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferDiff {
    changes: Vec<(u16, u16)>,
}

impl BufferDiff {
    /// Compare two buffers of the same size.
    ///
    /// Buffers of different sizes produce a full diff of `new`.
    pub fn compute(old: &Buffer, new: &Buffer) -> Self {
        if old.width() != new.width() || old.height() != new.height() {
            return Self::full(new.width(), new.height());
        }
        let width = new.width() as usize;
        let changes = old
            .cells()
            .iter()
            .zip(new.cells())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| ((i % width) as u16, (i / width) as u16))
            .collect();
        Self { changes }
    }

    /// Every cell of a `width` x `height` grid (first frame, resize).
    pub fn full(width: u16, height: u16) -> Self {
        let changes = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .collect();
        Self { changes }
    }

    /// Number of changed cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// True if nothing changed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changed `(x, y)` positions.
    #[inline]
    pub fn changes(&self) -> &[(u16, u16)] {
        &self.changes
    }

    /// Coalesce horizontally adjacent changes into runs.
    pub fn runs(&self) -> Vec<ChangeRun> {
        let mut runs: Vec<ChangeRun> = Vec::new();
        for &(x, y) in &self.changes {
            if let Some(last) = runs.last_mut()
                && last.y == y
                && last.x1.saturating_add(1) == x
            {
                last.x1 = x;
                continue;
            }
            runs.push(ChangeRun { y, x0: x, x1: x });
        }
        runs
    }
}
