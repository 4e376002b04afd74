#![forbid(unsafe_code)]

//! Combobox widgets: a typeahead with a committed selection and a
//! searchable select with single and multiple modes.
//!
//! Both controls share one engine: a prefix [`matcher`], a tagged
//! [`navigation`] cursor, a [`visibility`] state machine, floating-layer
//! [`placement`], a debounced [`hover_card`], and document-level
//! [`listeners`] for outside-click dismissal.
//!
//! Rendering happens in two passes. The trigger is a [`StatefulWidget`]
//! drawn in the host's layout; the floating listbox and card are drawn by
//! `render_portal` after all host content, so they sit above it and escape
//! the host's clipping region.

pub mod candidate;
mod combo;
pub mod config;
pub mod hover_card;
pub mod listeners;
pub mod matcher;
pub mod navigation;
pub mod placement;
pub mod searchable_select;
pub mod typeahead;
pub mod visibility;

pub use candidate::{Candidate, CandidateId};
pub use config::{ConfigError, FieldError, InitialValue, TypeaheadConfig};
pub use listeners::{DocumentListeners, ListenerGuard};
pub use searchable_select::{SearchableSelect, SelectView};
pub use typeahead::{Typeahead, TypeaheadEvent, TypeaheadStyle, TypeaheadView};

use lookup_core::geometry::Rect;
use lookup_render::buffer::Buffer;
use lookup_render::cell::Cell;
use lookup_render::style::Style;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Something that draws itself into `area` of a frame.
pub trait Widget {
    fn render(&self, area: Rect, buf: &mut Buffer);
}

/// A widget whose drawing reads or records external state.
///
/// The trigger views use the state to record where the trigger was drawn;
/// that rectangle anchors the floating layers.
pub trait StatefulWidget {
    type State;

    fn render(&self, area: Rect, buf: &mut Buffer, state: &mut Self::State);
}

/// Restyle every cell of `area` without touching its content.
pub(crate) fn set_style_area(buf: &mut Buffer, area: Rect, style: Style) {
    if style.is_empty() {
        return;
    }
    let area = area.intersection(&buf.bounds());
    for (x, y) in (area.top()..area.bottom())
        .flat_map(|y| (area.left()..area.right()).map(move |x| (x, y)))
    {
        if let Some(cell) = buf.get_mut(x, y) {
            style.apply_to(cell);
        }
    }
}

/// Write `content` from column `x` on row `y`, one grapheme per cell run,
/// never crossing `max_x`. Returns the column after the last grapheme
/// written. Zero-width clusters are skipped.
pub(crate) fn draw_text_span(
    buf: &mut Buffer,
    x: u16,
    y: u16,
    content: &str,
    style: Style,
    max_x: u16,
) -> u16 {
    let mut col = x;
    for cluster in content.graphemes(true) {
        let span = u16::try_from(UnicodeWidthStr::width(cluster)).unwrap_or(u16::MAX);
        if span == 0 {
            continue;
        }
        if col.saturating_add(span) > max_x {
            break;
        }
        let Some(base) = cluster.chars().next() else {
            continue;
        };
        let mut cell = Cell::from_char(base);
        style.apply_to(&mut cell);
        buf.set(col, y, cell);
        col = col.saturating_add(span);
    }
    col
}

/// Draw `content` truncated with an ellipsis when it does not fit.
pub(crate) fn draw_text_clipped(
    buf: &mut Buffer,
    x: u16,
    y: u16,
    content: &str,
    style: Style,
    max_x: u16,
) -> u16 {
    let room = max_x.saturating_sub(x) as usize;
    if lookup_render::display_width(content) <= room {
        return draw_text_span(buf, x, y, content, style, max_x);
    }
    if room == 0 {
        return x;
    }
    let head = lookup_render::truncate_to_width(content, room - 1);
    let end = draw_text_span(buf, x, y, head, style, max_x);
    draw_text_span(buf, end, y, "…", style, max_x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lookup_render::cell::PackedRgba;

    #[test]
    fn draw_text_span_stops_at_max() {
        let mut buf = Buffer::new(10, 1);
        let end = draw_text_span(&mut buf, 1, 0, "Apricot", Style::new(), 5);
        assert_eq!(end, 5);
        assert_eq!(buf.row_text(0), " Apri     ");
    }

    #[test]
    fn draw_text_clipped_adds_ellipsis() {
        let mut buf = Buffer::new(6, 1);
        draw_text_clipped(&mut buf, 0, 0, "Banana split", Style::new(), 6);
        assert_eq!(buf.row_text(0), "Banan…");
    }

    #[test]
    fn draw_text_clipped_fits_verbatim() {
        let mut buf = Buffer::new(6, 1);
        let end = draw_text_clipped(&mut buf, 0, 0, "Fig", Style::new(), 6);
        assert_eq!(end, 3);
        assert_eq!(buf.row_text(0), "Fig   ");
    }

    #[test]
    fn set_style_area_keeps_content() {
        let mut buf = Buffer::new(3, 1);
        draw_text_span(&mut buf, 0, 0, "abc", Style::new(), 3);
        let area = buf.bounds();
        set_style_area(&mut buf, area, Style::new().bg(PackedRgba::BLACK));
        assert_eq!(buf.row_text(0), "abc");
        assert_eq!(buf.get(1, 0).map(|c| c.bg), Some(PackedRgba::BLACK));
    }
}
