#![forbid(unsafe_code)]

//! Render kernel: cells, buffers, styles, diffs, and ANSI presentation.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod diff;
pub mod presenter;
pub mod style;

mod text_width {
    use unicode_segmentation::UnicodeSegmentation;
    use unicode_width::UnicodeWidthChar;

    #[inline]
    pub(crate) fn char_width(ch: char) -> usize {
        if ch.is_ascii() {
            return match ch {
                ' '..='~' => 1,
                _ => 0,
            };
        }
        ch.width().unwrap_or(0)
    }

    #[inline]
    pub(crate) fn grapheme_width(grapheme: &str) -> usize {
        // A cluster occupies the width of its base character; combining
        // marks and joiners contribute nothing.
        grapheme.chars().next().map_or(0, char_width)
    }

    pub(crate) fn display_width(text: &str) -> usize {
        if text.bytes().all(|b| (0x20..=0x7E).contains(&b)) {
            return text.len();
        }
        text.graphemes(true).map(grapheme_width).sum()
    }

    pub(crate) fn truncate_to_width(text: &str, max: usize) -> &str {
        let mut used = 0;
        for (idx, grapheme) in text.grapheme_indices(true) {
            let w = grapheme_width(grapheme);
            if used + w > max {
                return &text[..idx];
            }
            used += w;
        }
        text
    }
}

/// Display width of a single character in terminal cells.
#[inline]
#[must_use]
pub fn char_width(ch: char) -> usize {
    text_width::char_width(ch)
}

/// Display width of a string in terminal cells (grapheme aware).
#[inline]
#[must_use]
pub fn display_width(text: &str) -> usize {
    text_width::display_width(text)
}

/// Longest prefix of `text` that fits in `max` cells without splitting a
/// grapheme cluster.
#[inline]
#[must_use]
pub fn truncate_to_width(text: &str, max: usize) -> &str {
    text_width::truncate_to_width(text, max)
}
