#![forbid(unsafe_code)]

//! Hover description card.
//!
//! The card shows extra fields of the highlighted candidate beside the
//! listbox. When the pointer leaves both the listbox and the card, hiding is
//! delayed so the pointer can cross the gap between them; coming back
//! cancels the pending hide.
//!
//! Time is passed in by the caller ([`Instant`]), so the dismissal delay is
//! deterministic under test.

use std::time::{Duration, Instant};

use lookup_core::debounce::Debouncer;
use lookup_core::geometry::Rect;
use lookup_render::buffer::Buffer;
use lookup_render::cell::Cell;
use lookup_render::style::Style;

use crate::candidate::{Candidate, display_text};
use crate::{Widget, draw_text_clipped};

/// Default delay before an abandoned card hides.
pub const DEFAULT_DISMISS_DELAY: Duration = Duration::from_millis(100);

/// Widest card, borders included.
pub const MAX_CARD_WIDTH: u16 = 48;

/// Card visibility and its pending dismissal.
#[derive(Debug, Clone)]
pub struct HoverCard {
    dismiss: Debouncer,
    target: Option<usize>,
    pointer_inside: bool,
}

impl Default for HoverCard {
    fn default() -> Self {
        Self::new(DEFAULT_DISMISS_DELAY)
    }
}

impl HoverCard {
    /// Hidden card with the given dismissal delay.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            dismiss: Debouncer::new(delay),
            target: None,
            pointer_inside: false,
        }
    }

    /// Show the card for filtered-set position `position`.
    pub fn show(&mut self, position: usize) {
        self.target = Some(position);
        self.dismiss.cancel();
    }

    /// Hide now and drop any pending dismissal.
    pub fn hide(&mut self) {
        self.target = None;
        self.dismiss.cancel();
    }

    /// Reset everything, including pointer tracking (close, unmount).
    pub fn clear(&mut self) {
        self.hide();
        self.pointer_inside = false;
    }

    /// Position the card describes, if shown.
    #[inline]
    pub const fn target(&self) -> Option<usize> {
        self.target
    }

    /// Whether the card is shown.
    #[inline]
    pub const fn is_visible(&self) -> bool {
        self.target.is_some()
    }

    /// Whether a dismissal is scheduled.
    #[inline]
    pub const fn is_pending(&self) -> bool {
        self.dismiss.is_pending()
    }

    /// Pointer is over the listbox or the card. Returns whether a pending
    /// dismissal was cancelled.
    pub fn pointer_entered(&mut self) -> bool {
        self.pointer_inside = true;
        self.dismiss.cancel()
    }

    /// Pointer left the listbox and the card.
    pub fn pointer_left(&mut self, now: Instant) {
        if !self.pointer_inside {
            return;
        }
        self.pointer_inside = false;
        if self.is_visible() {
            self.dismiss.schedule(now);
        }
    }

    /// Advance time. Returns `true` if the card was hidden by this call.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.dismiss.poll(now) {
            self.target = None;
            return true;
        }
        false
    }
}

/// Text shown on a card: a title line and `label: value` lines for each
/// description field the candidate has.
pub fn card_lines<C: Candidate>(
    candidate: &C,
    display_field: &str,
    description_fields: &[String],
) -> (String, Vec<String>) {
    let title = display_text(candidate, display_field).into_owned();
    let lines = description_fields
        .iter()
        .filter_map(|name| {
            let value = candidate.field(name)?;
            (!value.trim().is_empty()).then(|| format!("{}: {value}", field_label(name)))
        })
        .collect();
    (title, lines)
}

/// Last path segment with underscores as spaces: `billing.tax_id` → `tax id`.
fn field_label(name: &str) -> String {
    name.rsplit('.').next().unwrap_or(name).replace('_', " ")
}

/// Visual styling for the card.
#[derive(Debug, Clone, Copy, Default)]
pub struct CardStyle {
    pub border: Style,
    pub title: Style,
    pub text: Style,
    pub background: Style,
}

/// Renders a bordered card with a title and detail lines.
#[derive(Debug, Clone)]
pub struct CardWidget<'a> {
    title: &'a str,
    lines: &'a [String],
    style: CardStyle,
}

impl<'a> CardWidget<'a> {
    pub fn new(title: &'a str, lines: &'a [String], style: CardStyle) -> Self {
        Self {
            title,
            lines,
            style,
        }
    }

    /// Size the card wants: widest line plus borders, one row per line plus
    /// title and borders.
    pub fn desired_size(&self) -> (u16, u16) {
        let widest = self
            .lines
            .iter()
            .map(|l| lookup_render::display_width(l))
            .chain(std::iter::once(lookup_render::display_width(self.title)))
            .max()
            .unwrap_or(0);
        let width = (widest as u16).saturating_add(4).min(MAX_CARD_WIDTH);
        let height = (self.lines.len() as u16).saturating_add(3);
        (width, height)
    }
}

impl Widget for CardWidget<'_> {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height < 3 {
            return;
        }
        let mut blank = Cell::from_char(' ');
        self.style.background.apply_to(&mut blank);
        buf.fill(area, blank);
        draw_box(buf, area, self.style.border);

        let max_x = area.right() - 2;
        draw_text_clipped(buf, area.x + 2, area.y + 1, self.title, self.style.title, max_x);
        for (i, line) in self.lines.iter().enumerate() {
            let y = area.y + 2 + i as u16;
            if y >= area.bottom() - 1 {
                break;
            }
            draw_text_clipped(buf, area.x + 2, y, line, self.style.text, max_x);
        }
    }
}

/// Single-line box border.
pub(crate) fn draw_box(buf: &mut Buffer, area: Rect, style: Style) {
    if area.width < 2 || area.height < 2 {
        return;
    }
    let right = area.right() - 1;
    let bottom = area.bottom() - 1;
    let put = |buf: &mut Buffer, x: u16, y: u16, c: char| {
        let mut cell = Cell::from_char(c);
        if let Some(existing) = buf.get(x, y) {
            cell.bg = existing.bg;
        }
        style.apply_to(&mut cell);
        buf.set(x, y, cell);
    };
    for x in area.x + 1..right {
        put(buf, x, area.y, '─');
        put(buf, x, bottom, '─');
    }
    for y in area.y + 1..bottom {
        put(buf, area.x, y, '│');
        put(buf, right, y, '│');
    }
    put(buf, area.x, area.y, '┌');
    put(buf, right, area.y, '┐');
    put(buf, area.x, bottom, '└');
    put(buf, right, bottom, '┘');
}
