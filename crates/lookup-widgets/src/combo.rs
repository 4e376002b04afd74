#![forbid(unsafe_code)]

//! Engine shared by [`Typeahead`](crate::Typeahead) and
//! [`SearchableSelect`](crate::SearchableSelect).
//!
//! A [`Combo`] owns the candidates, the query and everything derived from it:
//! the filtered set, the cursor, the visibility state, the floating geometry,
//! the hover card and the outside-click listener. The two controls layer
//! their selection semantics on top.
//!
//! # Invariants
//!
//! 1. `filtered` holds indices into `data`, in data order.
//! 2. `highlight` indexes `filtered` or is `None`.
//! 3. A listener guard is held exactly while the dropdown is open.
//! 4. `geometry` is `Some` only while open and anchored.

use std::time::Instant;

use bitflags::bitflags;
use lookup_core::geometry::{Rect, ScrollOffset};
use lookup_render::buffer::Buffer;
use lookup_render::cell::Cell;

use crate::candidate::{Candidate, display_text};
use crate::config::TypeaheadConfig;
use crate::hover_card::{CardStyle, CardWidget, HoverCard, card_lines, draw_box};
use crate::listeners::{DocumentListeners, ListenerGuard};
use crate::matcher::{Matcher, meets_threshold};
use crate::navigation::{Highlight, ScrollWindow};
use crate::placement::{MenuGeometry, RepositionPolicy, card_beside, clamp_to_viewport};
use crate::typeahead::TypeaheadStyle;
use crate::visibility::{CloseReason, DropdownState, Visibility, must_clear_on_dismiss};
use crate::{Widget, draw_text_clipped, draw_text_span, set_style_area};

bitflags! {
    /// Glyphs drawn at the right edge of the trigger.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub(crate) struct Affordances: u8 {
        const CHEVRON = 0b001;
        const REFRESH = 0b010;
        const CLEAR = 0b100;
    }
}

impl Affordances {
    /// Right-to-left slot order.
    const SLOTS: [(Self, &'static str); 3] = [
        (Self::CHEVRON, "▾"),
        (Self::REFRESH, "↻"),
        (Self::CLEAR, "×"),
    ];

    /// `(flag, glyph, x)` for every glyph in `self`, right to left.
    pub(crate) fn slots(self, line: Rect) -> impl Iterator<Item = (Self, &'static str, u16)> {
        Self::SLOTS
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .enumerate()
            .filter_map(move |(i, (flag, glyph))| {
                let x = line.right().checked_sub(1 + i as u16)?;
                (x >= line.x).then_some((flag, glyph, x))
            })
    }

    /// The glyph occupying column `x`, if any.
    pub(crate) fn at(self, line: Rect, x: u16) -> Option<Self> {
        self.slots(line).find(|(_, _, gx)| *gx == x).map(|(flag, _, _)| flag)
    }

    /// First column not available to trigger text.
    pub(crate) fn text_end(self, line: Rect) -> u16 {
        let used = self.bits().count_ones() as u16;
        if used == 0 {
            line.right()
        } else {
            line.right().saturating_sub(used + 1).max(line.x)
        }
    }
}

// ---------------------------------------------------------------------------
// Menu layout
// ---------------------------------------------------------------------------

/// A row of the floating listbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MenuRow {
    /// Multi-select "Select all" toggle.
    SelectAll,
    /// Filtered-set position.
    Candidate(usize),
    /// Placeholder shown when nothing matches.
    NoData,
    /// "Add New" action.
    AddNew,
}

/// Listbox rectangle and its rows, in buffer coordinates.
#[derive(Debug, Clone, Default)]
pub(crate) struct MenuLayout {
    pub(crate) outer: Rect,
    pub(crate) rows: Vec<(MenuRow, Rect)>,
}

impl MenuLayout {
    pub(crate) fn row_at(&self, x: u16, y: u16) -> Option<MenuRow> {
        self.rows
            .iter()
            .find(|(_, rect)| rect.contains(x, y))
            .map(|(row, _)| *row)
    }

    pub(crate) fn row_rect(&self, row: MenuRow) -> Option<Rect> {
        self.rows
            .iter()
            .find(|(r, _)| *r == row)
            .map(|(_, rect)| *rect)
    }
}

/// What a pointer position lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Hit {
    Outside,
    Trigger,
    Affordance(Affordances),
    Row(MenuRow),
    /// Listbox border or padding.
    Menu,
    Card,
}

// ---------------------------------------------------------------------------
// Combo
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct Combo<C> {
    pub(crate) config: TypeaheadConfig,
    pub(crate) data: Vec<C>,
    pub(crate) query: String,
    pub(crate) filtered: Vec<usize>,
    pub(crate) highlight: Highlight,
    pub(crate) focused: bool,
    /// Show a "Select all" row above the candidates.
    pub(crate) select_all_row: bool,
    window: ScrollWindow,
    visibility: Visibility,
    card: HoverCard,
    anchor: Option<Rect>,
    viewport: Rect,
    scroll: ScrollOffset,
    geometry: Option<MenuGeometry>,
    listeners: DocumentListeners,
    guard: Option<ListenerGuard>,
}

impl<C> Combo<C> {
    pub(crate) fn is_open(&self) -> bool {
        self.visibility.is_open()
    }

    pub(crate) fn state(&self) -> DropdownState {
        self.visibility.state(self.filtered.len())
    }

    pub(crate) fn last_close_reason(&self) -> Option<CloseReason> {
        self.visibility.last_close_reason()
    }

    pub(crate) fn threshold_met(&self) -> bool {
        meets_threshold(&self.query, self.config.min_search_length)
    }

    pub(crate) fn set_listeners(&mut self, listeners: DocumentListeners) {
        self.listeners = listeners;
    }

    pub(crate) fn anchor(&self) -> Option<Rect> {
        self.anchor
    }

    pub(crate) fn geometry(&self) -> Option<MenuGeometry> {
        self.geometry
    }

    pub(crate) fn card(&self) -> &HoverCard {
        &self.card
    }

    /// Open the dropdown and register the outside-click listener.
    pub(crate) fn open(&mut self) -> bool {
        if !self.visibility.open() {
            return false;
        }
        self.guard = Some(self.listeners.register(&self.config.name));
        self.reposition();
        lookup_core::debug!(
            name = %self.config.name,
            matches = self.filtered.len(),
            "dropdown opened"
        );
        true
    }

    /// Close the dropdown, releasing the listener and the card timer.
    pub(crate) fn close(&mut self, reason: CloseReason) -> bool {
        if !self.visibility.close(reason) {
            return false;
        }
        self.guard = None;
        self.card.clear();
        self.highlight = Highlight::None;
        self.window.reset();
        self.geometry = None;
        lookup_core::debug!(name = %self.config.name, %reason, "dropdown closed");
        true
    }

    pub(crate) fn set_disabled(&mut self, disabled: bool) {
        self.config.disabled = disabled;
        if disabled {
            self.close(CloseReason::Disabled);
            self.focused = false;
        }
    }

    /// Recompute left/top/width from the anchor.
    pub(crate) fn reposition(&mut self) {
        if !self.is_open() {
            return;
        }
        if let Some(anchor) = self.anchor {
            self.geometry = Some(MenuGeometry::below(anchor, self.scroll, self.menu_height()));
        }
    }

    fn desired_rows(&self) -> usize {
        let listed = self.filtered.len().min(self.config.max_visible.max(1));
        if self.filtered.is_empty() {
            1 + usize::from(self.config.add_new)
        } else {
            listed + usize::from(self.select_all_row)
        }
    }

    fn menu_height(&self) -> u16 {
        u16::try_from(self.desired_rows() + 2).unwrap_or(u16::MAX)
    }

    /// Listbox rectangle after fitting it into the viewport.
    fn outer(&self) -> Option<Rect> {
        let geometry = self.geometry?;
        let outer = clamp_to_viewport(geometry.rect(), self.viewport);
        (outer.width >= 3 && outer.height >= 3).then_some(outer)
    }

    /// Candidate rows that fit in a listbox with `capacity` inner rows.
    fn listed_rows(&self, capacity: usize) -> usize {
        let head = usize::from(self.select_all_row && !self.filtered.is_empty());
        self.filtered
            .len()
            .min(self.config.max_visible.max(1))
            .min(capacity.saturating_sub(head))
    }

    /// Rows moved by PageUp/PageDown and kept in view by arrow keys.
    pub(crate) fn page_size(&self) -> usize {
        let capacity = self
            .outer()
            .map_or(usize::MAX, |outer| usize::from(outer.height - 2));
        self.listed_rows(capacity).max(1)
    }

    pub(crate) fn layout(&self) -> Option<MenuLayout> {
        if !self.is_open() {
            return None;
        }
        let outer = self.outer()?;
        let inner = outer.shrink(1);
        let capacity = usize::from(inner.height);

        let head = (self.select_all_row && !self.filtered.is_empty()).then_some(MenuRow::SelectAll);
        let tail: &[MenuRow] = match (self.filtered.is_empty(), self.config.add_new) {
            (true, true) => &[MenuRow::NoData, MenuRow::AddNew],
            (true, false) => &[MenuRow::NoData],
            (false, _) => &[],
        };
        let listed = self
            .window
            .range(self.filtered.len(), self.listed_rows(capacity))
            .map(MenuRow::Candidate);

        let rows = head
            .into_iter()
            .chain(listed)
            .chain(tail.iter().copied())
            .take(capacity)
            .enumerate()
            .map(|(i, row)| (row, Rect::new(inner.x, inner.y + i as u16, inner.width, 1)))
            .collect();
        Some(MenuLayout { outer, rows })
    }

    /// Whether a press at `(x, y)` lands outside this control. While open
    /// the answer comes from the listener guard's region.
    pub(crate) fn is_outside(&self, x: u16, y: u16) -> bool {
        match &self.guard {
            Some(guard) => guard.is_outside(x, y),
            None => !self.anchor.is_some_and(|a| a.contains(x, y)),
        }
    }

    pub(crate) fn scroll_wheel(&mut self, x: u16, y: u16, delta: isize) {
        let over_menu = self.layout().is_some_and(|l| l.outer.contains(x, y));
        if over_menu {
            let page = self.page_size();
            self.window.scroll_by(delta, self.filtered.len(), page);
        }
    }

    pub(crate) fn move_highlight(&mut self, to: Highlight) {
        self.highlight = to;
        if let Some(pos) = to.index() {
            let page = self.page_size();
            self.window.ensure_visible(pos, page);
            self.show_card(pos);
        }
    }

    /// Handle a keyboard navigation key while open.
    pub(crate) fn navigate(&mut self, code: lookup_core::event::KeyCode) {
        use lookup_core::event::KeyCode;

        let len = self.filtered.len();
        let page = self.page_size();
        let to = match code {
            KeyCode::Down => self.highlight.next(len),
            KeyCode::Up => self.highlight.prev(len),
            KeyCode::Home => Highlight::first(len),
            KeyCode::End => Highlight::last(len),
            KeyCode::PageDown => self.highlight.page_down(len, page),
            KeyCode::PageUp => self.highlight.page_up(len, page),
            _ => return,
        };
        self.move_highlight(to);
    }

    fn show_card(&mut self, pos: usize) {
        if !self.config.description_fields.is_empty() {
            self.card.show(pos);
        }
    }

    /// Advance timers. A hidden card also drops a pointer highlight.
    pub(crate) fn tick(&mut self, now: Instant) -> bool {
        if !self.card.tick(now) {
            return false;
        }
        if self.highlight.is_pointer() {
            self.highlight = Highlight::None;
        }
        lookup_core::trace!(name = %self.config.name, "hover card dismissed");
        true
    }
}

impl<C: Candidate> Combo<C> {
    pub(crate) fn new(config: TypeaheadConfig, data: Vec<C>) -> Self {
        let card = HoverCard::new(config.hover_dismiss_delay());
        let select_all_row = config.multiple;
        let mut combo = Self {
            config,
            data,
            query: String::new(),
            filtered: Vec::new(),
            highlight: Highlight::None,
            focused: false,
            select_all_row,
            window: ScrollWindow::default(),
            visibility: Visibility::new(),
            card,
            anchor: None,
            viewport: Rect::default(),
            scroll: ScrollOffset::ZERO,
            geometry: None,
            listeners: DocumentListeners::new(),
            guard: None,
        };
        combo.refilter();
        combo
    }

    /// Candidate whose `id_field` equals `id`.
    pub(crate) fn find(&self, id: &crate::CandidateId) -> Option<(usize, &C)> {
        self.data
            .iter()
            .enumerate()
            .find(|(_, c)| c.id_of(&self.config.id_field).as_ref() == Some(id))
    }

    /// Candidate at filtered-set position `pos`.
    pub(crate) fn candidate_at(&self, pos: usize) -> Option<&C> {
        self.filtered.get(pos).and_then(|&i| self.data.get(i))
    }

    pub(crate) fn display_of(&self, candidate: &C) -> String {
        display_text(candidate, &self.config.display_field).into_owned()
    }

    /// Recompute the filtered set. Resets the cursor, the scroll window and
    /// the card; keeps the listbox position.
    pub(crate) fn refilter(&mut self) {
        let matcher = Matcher::new(
            &self.query,
            &self.config.search_fields,
            self.config.min_search_length,
            self.config.short_token_policy,
        );
        self.filtered = matcher.filter(&self.data);
        self.highlight = Highlight::None;
        self.window.reset();
        self.card.hide();
        let height = self.menu_height();
        if let Some(geometry) = &mut self.geometry {
            geometry.height = height;
        }
        lookup_core::trace!(
            name = %self.config.name,
            query = %self.query,
            matches = self.filtered.len(),
            "filter recomputed"
        );
    }

    /// The query changed: refilter, then open (and reposition) or close on
    /// the threshold.
    pub(crate) fn query_changed(&mut self) {
        self.refilter();
        if self.threshold_met() {
            self.open();
            self.reposition();
        } else {
            self.close(CloseReason::BelowThreshold);
        }
        self.sync_region();
    }

    /// Close, and for a dismissal reason reconcile the query against the
    /// committed display value. Returns `true` if the query was cleared.
    pub(crate) fn dismiss(&mut self, reason: CloseReason, committed_display: Option<&str>) -> bool {
        self.close(reason);
        if !reason.is_dismissal() || !must_clear_on_dismiss(&self.query, committed_display) {
            return false;
        }
        self.query.clear();
        self.refilter();
        true
    }

    pub(crate) fn set_data(&mut self, data: Vec<C>) {
        self.data = data;
        self.refilter();
        self.sync_region();
    }

    pub(crate) fn hit(&self, x: u16, y: u16, affordances: Affordances) -> Hit {
        if let Some(layout) = self.layout() {
            if let Some(row) = layout.row_at(x, y) {
                return Hit::Row(row);
            }
            if layout.outer.contains(x, y) {
                return Hit::Menu;
            }
            if self
                .card_content(&layout)
                .is_some_and(|(rect, _, _)| rect.contains(x, y))
            {
                return Hit::Card;
            }
        }
        match self.anchor {
            Some(anchor) if anchor.contains(x, y) => {
                affordances.at(anchor, x).map_or(Hit::Trigger, Hit::Affordance)
            }
            _ => Hit::Outside,
        }
    }

    /// Pointer moved: hover overrides directional mode; leaving the listbox
    /// and the card schedules the card's dismissal.
    pub(crate) fn hover(&mut self, x: u16, y: u16, now: Instant) {
        if !self.is_open() {
            return;
        }
        match self.hit(x, y, Affordances::empty()) {
            Hit::Row(MenuRow::Candidate(pos)) => {
                self.card.pointer_entered();
                self.highlight = Highlight::hover(pos, self.filtered.len());
                self.show_card(pos);
            }
            Hit::Row(_) | Hit::Menu | Hit::Card => {
                self.card.pointer_entered();
            }
            Hit::Outside | Hit::Trigger | Hit::Affordance(_) => self.card.pointer_left(now),
        }
        self.sync_region();
    }

    /// Card rectangle, title and lines for the card target.
    fn card_content(&self, layout: &MenuLayout) -> Option<(Rect, String, Vec<String>)> {
        let pos = self.card.target()?;
        let candidate = self.candidate_at(pos)?;
        let (title, lines) = card_lines(
            candidate,
            &self.config.display_field,
            &self.config.description_fields,
        );
        let (width, height) = CardWidget::new(&title, &lines, CardStyle::default()).desired_size();
        let row_y = layout
            .row_rect(MenuRow::Candidate(pos))
            .map_or(layout.outer.y, |r| r.y);
        let rect = card_beside(layout.outer, row_y, width, height, self.viewport);
        Some((rect, title, lines))
    }

    pub(crate) fn set_scroll(&mut self, scroll: ScrollOffset) {
        if self.scroll == scroll {
            return;
        }
        self.scroll = scroll;
        if self.config.reposition == RepositionPolicy::TrackAnchor {
            self.reposition();
        }
        self.sync_region();
    }

    /// Record where the trigger was drawn. The listbox follows an anchor
    /// move only under [`RepositionPolicy::TrackAnchor`], or when it has no
    /// geometry yet.
    pub(crate) fn set_anchor(&mut self, anchor: Rect, viewport: Rect) {
        let moved = self.anchor != Some(anchor) || self.viewport != viewport;
        self.anchor = Some(anchor);
        self.viewport = viewport;
        let track = moved && self.config.reposition == RepositionPolicy::TrackAnchor;
        if self.is_open() && (self.geometry.is_none() || track) {
            self.reposition();
        }
        self.sync_region();
    }

    /// Push the trigger, listbox and card rectangles to the listener guard.
    pub(crate) fn sync_region(&self) {
        let Some(guard) = &self.guard else {
            return;
        };
        let mut region: Vec<Rect> = self.anchor.into_iter().collect();
        if let Some(layout) = self.layout() {
            region.push(layout.outer);
            if let Some((card, _, _)) = self.card_content(&layout) {
                region.push(card);
            }
        }
        guard.set_region(&region);
    }

    // --- Rendering ---

    pub(crate) fn render_trigger(
        &self,
        line: Rect,
        buf: &mut Buffer,
        style: &TypeaheadStyle,
        text: &str,
        affordances: Affordances,
    ) {
        let base = if self.config.disabled {
            style.disabled
        } else if self.focused {
            style.trigger_focused
        } else {
            style.trigger
        };
        let mut blank = Cell::from_char(' ');
        base.apply_to(&mut blank);
        buf.fill(line, blank);

        let end = affordances.text_end(line);
        if text.is_empty() {
            let hint = base.patch(style.placeholder);
            draw_text_clipped(buf, line.x, line.y, &self.config.placeholder, hint, end);
        } else {
            draw_text_clipped(buf, line.x, line.y, text, base, end);
        }
        let glyph_style = base.patch(style.affordance);
        for (_, glyph, x) in affordances.slots(line) {
            draw_text_span(buf, x, line.y, glyph, glyph_style, x + 1);
        }
    }

    /// Draw the listbox and the card above everything else. `checked`
    /// returns the checkbox state for a data index (`None` draws no box).
    pub(crate) fn render_portal(
        &self,
        buf: &mut Buffer,
        style: &TypeaheadStyle,
        checked: &dyn Fn(usize) -> Option<bool>,
        all_checked: bool,
    ) {
        let Some(layout) = self.layout() else {
            return;
        };
        buf.push_portal_scissor(layout.outer);
        let mut blank = Cell::from_char(' ');
        style.menu.apply_to(&mut blank);
        buf.fill(layout.outer, blank);
        draw_box(buf, layout.outer, style.border);
        for &(row, rect) in &layout.rows {
            self.render_row(buf, style, row, rect, checked, all_checked);
        }
        buf.pop_scissor();

        if let Some((rect, title, lines)) = self.card_content(&layout) {
            buf.push_portal_scissor(rect);
            CardWidget::new(&title, &lines, style.card).render(rect, buf);
            buf.pop_scissor();
        }
    }

    fn render_row(
        &self,
        buf: &mut Buffer,
        style: &TypeaheadStyle,
        row: MenuRow,
        rect: Rect,
        checked: &dyn Fn(usize) -> Option<bool>,
        all_checked: bool,
    ) {
        let (x, y, max_x) = (rect.x + 1, rect.y, rect.right());
        match row {
            MenuRow::Candidate(pos) => {
                let Some(&index) = self.filtered.get(pos) else {
                    return;
                };
                let Some(candidate) = self.data.get(index) else {
                    return;
                };
                let row_style = if self.highlight.index() == Some(pos) {
                    set_style_area(buf, rect, style.item_highlighted);
                    style.menu.patch(style.item_highlighted)
                } else {
                    style.menu.patch(style.item)
                };
                let x = match checked(index) {
                    Some(true) => draw_text_span(buf, x, y, "[x] ", row_style, max_x),
                    Some(false) => draw_text_span(buf, x, y, "[ ] ", row_style, max_x),
                    None => x,
                };
                let label = display_text(candidate, &self.config.display_field);
                draw_text_clipped(buf, x, y, &label, row_style, max_x);
            }
            MenuRow::SelectAll => {
                let text = if all_checked {
                    "[x] Select all"
                } else {
                    "[ ] Select all"
                };
                draw_text_clipped(buf, x, y, text, style.menu.patch(style.item), max_x);
            }
            MenuRow::NoData => {
                draw_text_clipped(buf, x, y, "No data", style.menu.patch(style.hint), max_x);
            }
            MenuRow::AddNew => {
                draw_text_clipped(buf, x, y, "+ Add New", style.menu.patch(style.add_new), max_x);
            }
        }
    }
}

impl<C> Drop for Combo<C> {
    fn drop(&mut self) {
        self.close(CloseReason::Unmounted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn fruit() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "Apple"}),
            json!({"id": 2, "name": "Apricot"}),
            json!({"id": 3, "name": "Banana"}),
        ]
    }

    fn combo(config: TypeaheadConfig) -> Combo<Value> {
        let mut combo = Combo::new(config, fruit());
        combo.set_anchor(Rect::new(2, 1, 20, 1), Rect::from_size(60, 20));
        combo
    }

    #[test]
    fn affordance_slots_run_right_to_left() {
        let line = Rect::new(0, 0, 10, 1);
        let set = Affordances::CLEAR | Affordances::REFRESH;
        let slots: Vec<_> = set.slots(line).map(|(_, g, x)| (g, x)).collect();
        assert_eq!(slots, vec![("↻", 9), ("×", 8)]);
        assert_eq!(set.at(line, 8), Some(Affordances::CLEAR));
        assert_eq!(set.at(line, 5), None);
        assert_eq!(set.text_end(line), 7);
        assert_eq!(Affordances::empty().text_end(line), 10);
    }

    #[test]
    fn open_holds_guard_and_close_releases_it() {
        let listeners = DocumentListeners::new();
        let mut c = combo(TypeaheadConfig::new("fruit").with_min_search_length(1));
        c.set_listeners(listeners.clone());
        c.query.push('a');
        c.query_changed();
        assert!(c.is_open());
        assert_eq!(listeners.active_count(), 1);
        c.close(CloseReason::Escape);
        assert_eq!(listeners.active_count(), 0);
        assert_eq!(c.geometry(), None);
    }

    #[test]
    fn layout_lists_candidates_inside_border() {
        let mut c = combo(TypeaheadConfig::new("fruit").with_min_search_length(1));
        c.query.push('a');
        c.query_changed();
        let layout = c.layout().expect("open layout");
        assert_eq!(layout.outer, Rect::new(2, 2, 20, 4));
        assert_eq!(
            layout.rows,
            vec![
                (MenuRow::Candidate(0), Rect::new(3, 3, 18, 1)),
                (MenuRow::Candidate(1), Rect::new(3, 4, 18, 1)),
            ]
        );
    }

    #[test]
    fn empty_layout_offers_add_new() {
        let cfg = TypeaheadConfig::new("fruit")
            .with_min_search_length(1)
            .with_add_new(true);
        let mut c = combo(cfg);
        c.query.push_str("xyz");
        c.query_changed();
        assert_eq!(c.state(), DropdownState::OpenEmpty);
        let rows: Vec<_> = c.layout().expect("layout").rows.iter().map(|r| r.0).collect();
        assert_eq!(rows, vec![MenuRow::NoData, MenuRow::AddNew]);
    }

    #[test]
    fn max_visible_windows_the_list() {
        let cfg = TypeaheadConfig::new("fruit")
            .with_min_search_length(0)
            .with_max_visible(2);
        let mut c = combo(cfg);
        c.open();
        assert_eq!(c.page_size(), 2);
        c.navigate(lookup_core::event::KeyCode::End);
        let rows: Vec<_> = c.layout().expect("layout").rows.iter().map(|r| r.0).collect();
        assert_eq!(rows, vec![MenuRow::Candidate(1), MenuRow::Candidate(2)]);
    }

    #[test]
    fn viewport_shrinks_capacity() {
        let cfg = TypeaheadConfig::new("fruit").with_min_search_length(0);
        let mut c = Combo::new(cfg, fruit());
        c.set_anchor(Rect::new(0, 0, 20, 1), Rect::from_size(40, 4));
        c.open();
        let layout = c.layout().expect("layout");
        assert_eq!(layout.outer.height, 4);
        assert_eq!(layout.rows.len(), 2);
        assert_eq!(c.page_size(), 2);
    }

    #[test]
    fn hit_prefers_menu_over_trigger() {
        let mut c = combo(TypeaheadConfig::new("fruit").with_min_search_length(1));
        c.query.push('a');
        c.query_changed();
        assert_eq!(c.hit(5, 3, Affordances::empty()), Hit::Row(MenuRow::Candidate(0)));
        assert_eq!(c.hit(2, 3, Affordances::empty()), Hit::Menu);
        assert_eq!(c.hit(4, 1, Affordances::CLEAR), Hit::Trigger);
        assert_eq!(c.hit(21, 1, Affordances::CLEAR), Hit::Affordance(Affordances::CLEAR));
        assert_eq!(c.hit(40, 10, Affordances::empty()), Hit::Outside);
        assert!(c.is_outside(40, 10));
        assert!(!c.is_outside(5, 4));
    }

    #[test]
    fn anchor_move_respects_policy() {
        let mut c = combo(TypeaheadConfig::new("fruit").with_min_search_length(1));
        c.query.push('a');
        c.query_changed();
        c.set_anchor(Rect::new(2, 6, 20, 1), Rect::from_size(60, 20));
        assert_eq!(c.geometry().map(|g| g.top), Some(2));

        let cfg = TypeaheadConfig::new("fruit")
            .with_min_search_length(1)
            .with_reposition(RepositionPolicy::TrackAnchor);
        let mut c = combo(cfg);
        c.query.push('a');
        c.query_changed();
        c.set_anchor(Rect::new(2, 6, 20, 1), Rect::from_size(60, 20));
        assert_eq!(c.geometry().map(|g| g.top), Some(7));
    }

    #[test]
    fn tracked_anchor_and_scroll_refresh_outside_region() {
        let listeners = DocumentListeners::new();
        let cfg = TypeaheadConfig::new("fruit")
            .with_min_search_length(1)
            .with_reposition(RepositionPolicy::TrackAnchor);
        let mut c = combo(cfg);
        c.set_listeners(listeners.clone());
        c.query.push('a');
        c.query_changed();
        assert!(!c.is_outside(5, 1));

        c.set_anchor(Rect::new(2, 6, 20, 1), Rect::from_size(60, 20));
        assert!(c.is_outside(5, 1));
        assert!(!c.is_outside(5, 6));
        assert!(!c.is_outside(5, 8));

        c.set_scroll(ScrollOffset::new(0, 3));
        assert_eq!(c.geometry().map(|g| g.top), Some(10));
        assert!(!c.is_outside(5, 11));
        assert!(c.is_outside(5, 8));
        assert_eq!(listeners.active_count(), 1);
    }

    #[test]
    fn only_dismissal_reasons_reconcile_the_query() {
        let mut c = combo(TypeaheadConfig::new("fruit").with_min_search_length(1));
        c.query.push_str("ap");
        c.query_changed();
        assert!(!c.dismiss(CloseReason::Committed, None));
        assert_eq!(c.query, "ap");

        c.open();
        assert!(c.dismiss(CloseReason::Outside, None));
        assert!(c.query.is_empty());
        assert!(c.filtered.is_empty());
    }

    #[test]
    fn drop_releases_listener() {
        let listeners = DocumentListeners::new();
        let mut c = combo(TypeaheadConfig::new("fruit").with_min_search_length(0));
        c.set_listeners(listeners.clone());
        c.open();
        assert_eq!(listeners.active_count(), 1);
        drop(c);
        assert_eq!(listeners.active_count(), 0);
    }
}
