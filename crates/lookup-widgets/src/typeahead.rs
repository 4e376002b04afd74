#![forbid(unsafe_code)]

//! Typeahead: a free-text query with a single committed selection.
//!
//! The selection is only valid while the query is exactly its display
//! value; the first edit that diverges clears it and emits
//! [`TypeaheadEvent::Cleared`].
//!
//! # Usage
//!
//! ```ignore
//! let mut customer = Typeahead::new(config, customers);
//!
//! // In the event loop:
//! if let Some(event) = customer.handle_event(&event, Instant::now()) {
//!     match event {
//!         TypeaheadEvent::Committed(id) => { /* store the id */ }
//!         TypeaheadEvent::AddNewRequested => { /* open a create form */ }
//!         _ => {}
//!     }
//! }
//!
//! // Render: trigger in the layout, floating layers last.
//! TypeaheadView::new(&style).render(area, &mut buf, &mut customer);
//! customer.render_portal(&style, &mut buf);
//! ```

use std::marker::PhantomData;
use std::time::Instant;

use lookup_core::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use lookup_core::geometry::{Rect, ScrollOffset};
use lookup_render::buffer::Buffer;
use lookup_render::cell::PackedRgba;
use lookup_render::style::Style;
use serde_json::Value;

use crate::StatefulWidget;
use crate::candidate::{Candidate, CandidateId};
use crate::combo::{Affordances, Combo, Hit, MenuRow};
use crate::config::{FieldError, TypeaheadConfig};
use crate::hover_card::CardStyle;
use crate::listeners::DocumentListeners;
use crate::navigation::Highlight;
use crate::placement::MenuGeometry;
use crate::visibility::{CloseReason, DropdownState};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Outcome of an input event, for the host to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeaheadEvent {
    /// A candidate was selected.
    Committed(CandidateId),
    /// The value became empty.
    Cleared,
    /// The "Add New" row was activated.
    AddNewRequested,
    /// The refresh affordance was activated.
    RefreshRequested,
    /// Multi-value selection changed (searchable select).
    Changed(Vec<CandidateId>),
}

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// Visual styling shared by both controls.
#[derive(Debug, Clone)]
pub struct TypeaheadStyle {
    /// Unfocused trigger.
    pub trigger: Style,
    /// Focused trigger.
    pub trigger_focused: Style,
    /// Disabled trigger.
    pub disabled: Style,
    /// Placeholder text, layered on the trigger style.
    pub placeholder: Style,
    /// Clear / refresh / chevron glyphs.
    pub affordance: Style,
    /// Listbox background.
    pub menu: Style,
    /// Listbox border.
    pub border: Style,
    /// Normal row.
    pub item: Style,
    /// Highlighted row.
    pub item_highlighted: Style,
    /// "No data" row.
    pub hint: Style,
    /// "Add New" row.
    pub add_new: Style,
    /// Hover card.
    pub card: CardStyle,
}

impl Default for TypeaheadStyle {
    fn default() -> Self {
        let panel = PackedRgba::rgb(30, 30, 40);
        Self {
            trigger: Style::new()
                .fg(PackedRgba::rgb(210, 210, 220))
                .bg(PackedRgba::rgb(45, 45, 58)),
            trigger_focused: Style::new()
                .fg(PackedRgba::rgb(255, 255, 255))
                .bg(PackedRgba::rgb(55, 55, 80)),
            disabled: Style::new()
                .fg(PackedRgba::rgb(110, 110, 120))
                .bg(PackedRgba::rgb(40, 40, 46)),
            placeholder: Style::new().fg(PackedRgba::rgb(120, 120, 140)),
            affordance: Style::new().fg(PackedRgba::rgb(100, 180, 255)),
            menu: Style::new().fg(PackedRgba::rgb(190, 190, 200)).bg(panel),
            border: Style::new().fg(PackedRgba::rgb(100, 100, 120)),
            item: Style::new().fg(PackedRgba::rgb(190, 190, 200)),
            item_highlighted: Style::new()
                .fg(PackedRgba::rgb(255, 255, 255))
                .bg(PackedRgba::rgb(50, 50, 75)),
            hint: Style::new().fg(PackedRgba::rgb(140, 140, 160)),
            add_new: Style::new().fg(PackedRgba::rgb(255, 210, 60)),
            card: CardStyle {
                border: Style::new().fg(PackedRgba::rgb(100, 100, 120)),
                title: Style::new().fg(PackedRgba::rgb(255, 255, 255)).bold(),
                text: Style::new().fg(PackedRgba::rgb(170, 170, 190)),
                background: Style::new().bg(PackedRgba::rgb(36, 36, 50)),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Typeahead
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct Committed {
    id: CandidateId,
    display: String,
}

/// Free-text typeahead with one committed selection.
///
/// # Invariants
///
/// 1. A selection exists only while the query equals its display value.
/// 2. The dropdown is open only while the query meets
///    `min_search_length` (arrow keys and trigger clicks reopen it).
/// 3. Dismissal (Escape, outside press, blur) leaves either the committed
///    display value or an empty query.
#[derive(Debug)]
pub struct Typeahead<C = Value> {
    combo: Combo<C>,
    selection: Option<Committed>,
}

impl<C: Candidate> Typeahead<C> {
    /// Build a typeahead over `data`. An `initial_value` naming a candidate
    /// in `data` becomes the committed selection.
    pub fn new(config: TypeaheadConfig, data: Vec<C>) -> Self {
        let mut typeahead = Self {
            combo: Combo::new(config, data),
            selection: None,
        };
        let initial = typeahead
            .combo
            .config
            .initial_value
            .as_ref()
            .and_then(|v| v.ids().into_iter().next());
        if let Some(id) = initial {
            match typeahead.combo.find(&id) {
                Some((_, candidate)) => {
                    let display = typeahead.combo.display_of(candidate);
                    typeahead.combo.query.clone_from(&display);
                    typeahead.combo.refilter();
                    typeahead.selection = Some(Committed { id, display });
                }
                None => {
                    lookup_core::warn!(
                        name = %typeahead.combo.config.name,
                        %id,
                        "initial value not found in data"
                    );
                }
            }
        }
        typeahead
    }

    /// Share a document listener registry with other controls (builder).
    #[must_use]
    pub fn with_listeners(mut self, listeners: DocumentListeners) -> Self {
        self.combo.set_listeners(listeners);
        self
    }

    // --- Accessors ---

    pub fn config(&self) -> &TypeaheadConfig {
        &self.combo.config
    }

    pub fn data(&self) -> &[C] {
        &self.combo.data
    }

    /// Current query text.
    pub fn query(&self) -> &str {
        &self.combo.query
    }

    /// Data indices of the current matches, in data order.
    pub fn filtered(&self) -> &[usize] {
        &self.combo.filtered
    }

    /// Matching candidates, in data order.
    pub fn matches(&self) -> impl Iterator<Item = &C> + '_ {
        self.combo.filtered.iter().filter_map(|&i| self.combo.data.get(i))
    }

    pub fn highlight(&self) -> Highlight {
        self.combo.highlight
    }

    /// Candidate under the cursor.
    pub fn highlighted(&self) -> Option<&C> {
        self.combo
            .highlight
            .index()
            .and_then(|pos| self.combo.candidate_at(pos))
    }

    pub fn state(&self) -> DropdownState {
        self.combo.state()
    }

    pub fn is_open(&self) -> bool {
        self.combo.is_open()
    }

    pub fn last_close_reason(&self) -> Option<CloseReason> {
        self.combo.last_close_reason()
    }

    /// Id of the committed selection.
    pub fn selected_id(&self) -> Option<&CandidateId> {
        self.selection.as_ref().map(|s| &s.id)
    }

    /// Display value of the committed selection.
    pub fn selected_display(&self) -> Option<&str> {
        self.selection.as_ref().map(|s| s.display.as_str())
    }

    /// The committed candidate, if it is still present in the data.
    pub fn selected(&self) -> Option<&C> {
        let id = self.selected_id()?;
        self.combo.find(id).map(|(_, c)| c)
    }

    /// Listbox placement, while open.
    pub fn menu_geometry(&self) -> Option<MenuGeometry> {
        self.combo.geometry()
    }

    /// Listbox rectangle as drawn (fitted to the viewport), while open.
    pub fn menu_area(&self) -> Option<Rect> {
        self.combo.layout().map(|l| l.outer)
    }

    /// Filtered-set position described by the hover card.
    pub fn card_target(&self) -> Option<usize> {
        self.combo.card().target()
    }

    pub fn is_focused(&self) -> bool {
        self.combo.focused
    }

    /// Terminal cursor position for the focused trigger.
    pub fn cursor_position(&self) -> Option<(u16, u16)> {
        if !self.combo.focused {
            return None;
        }
        let line = self.combo.anchor()?;
        let end = self.affordances().text_end(line).saturating_sub(1).max(line.x);
        let typed = lookup_render::display_width(&self.combo.query);
        let typed = u16::try_from(typed).unwrap_or(u16::MAX);
        Some((line.x.saturating_add(typed).min(end), line.y))
    }

    // --- Host operations ---

    /// Replace the candidates (after a refresh). The committed selection is
    /// kept.
    pub fn set_data(&mut self, data: Vec<C>) {
        self.combo.set_data(data);
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.combo.set_disabled(disabled);
    }

    /// Canvas scroll offset used to place the listbox.
    pub fn set_scroll_offset(&mut self, scroll: ScrollOffset) {
        self.combo.set_scroll(scroll);
    }

    pub fn focus(&mut self) {
        if !self.combo.config.disabled {
            self.combo.focused = true;
        }
    }

    /// Lose focus: dismiss the dropdown and reconcile the query.
    pub fn blur(&mut self) {
        if !self.combo.focused && !self.combo.is_open() {
            return;
        }
        self.dismiss(CloseReason::Outside);
        self.combo.focused = false;
    }

    /// Form validation.
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.combo.config.required && self.selection.is_none() {
            return Err(FieldError::Required {
                name: self.combo.config.name.clone(),
            });
        }
        Ok(())
    }

    /// Advance the hover card timer. Returns `true` if the card hid.
    pub fn tick(&mut self, now: Instant) -> bool {
        let hidden = self.combo.tick(now);
        if hidden {
            self.combo.sync_region();
        }
        hidden
    }

    // --- Event Handling ---

    /// Handle an input event. `now` drives the hover card timer.
    ///
    /// Keys are handled only while focused; pointer presses outside the
    /// control blur it.
    pub fn handle_event(&mut self, event: &Event, now: Instant) -> Option<TypeaheadEvent> {
        if self.combo.config.disabled {
            return None;
        }
        #[cfg(feature = "tracing")]
        let _span = tracing::trace_span!("typeahead.event", name = %self.combo.config.name).entered();

        let out = match event {
            Event::Key(key) if key.is_press() && self.combo.focused => self.handle_key(key),
            Event::Paste(paste) if self.combo.focused => {
                let text: String = paste.text.chars().filter(|c| !c.is_control()).collect();
                self.edit(|q| q.push_str(&text))
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse, now),
            Event::Focus(false) => {
                self.blur();
                None
            }
            Event::Tick => {
                self.combo.tick(now);
                None
            }
            _ => None,
        };
        self.combo.sync_region();
        out
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Option<TypeaheadEvent> {
        match key.code {
            KeyCode::Char('u') if key.ctrl() => Some(self.clear()),
            KeyCode::Char('r') if key.ctrl() && self.combo.config.refresh => Some(self.refresh()),
            KeyCode::Char(_) if key.ctrl() || key.alt() => None,
            KeyCode::Char(c) => self.edit(|q| q.push(c)),
            KeyCode::Backspace => self.edit(|q| {
                q.pop();
            }),
            KeyCode::Escape => {
                self.dismiss(CloseReason::Escape);
                None
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.blur();
                None
            }
            KeyCode::Enter => self.enter(),
            KeyCode::Down | KeyCode::Up if !self.combo.is_open() => {
                if self.combo.threshold_met() {
                    self.combo.open();
                }
                None
            }
            KeyCode::Down
            | KeyCode::Up
            | KeyCode::Home
            | KeyCode::End
            | KeyCode::PageUp
            | KeyCode::PageDown => {
                if self.combo.is_open() {
                    self.combo.navigate(key.code);
                }
                None
            }
            _ => None,
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent, now: Instant) -> Option<TypeaheadEvent> {
        let (x, y) = mouse.position();
        match mouse.kind {
            MouseEventKind::Down(button) => {
                if self.combo.is_outside(x, y) {
                    self.blur();
                    return None;
                }
                self.combo.focused = true;
                if button != MouseButton::Left {
                    return None;
                }
                match self.combo.hit(x, y, self.affordances()) {
                    Hit::Affordance(a) if a == Affordances::CLEAR => Some(self.clear()),
                    Hit::Affordance(a) if a == Affordances::REFRESH => Some(self.refresh()),
                    Hit::Row(MenuRow::Candidate(pos)) => self.commit(pos),
                    Hit::Row(MenuRow::AddNew) => Some(self.add_new()),
                    Hit::Trigger => {
                        if !self.combo.is_open() && self.combo.threshold_met() {
                            self.combo.open();
                        }
                        None
                    }
                    _ => None,
                }
            }
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                self.combo.hover(x, y, now);
                None
            }
            MouseEventKind::ScrollUp => {
                self.combo.scroll_wheel(x, y, -1);
                None
            }
            MouseEventKind::ScrollDown => {
                self.combo.scroll_wheel(x, y, 1);
                None
            }
            MouseEventKind::Up(_) => None,
        }
    }

    /// Apply a query edit. A query that diverges from the committed display
    /// value invalidates the selection.
    fn edit(&mut self, apply: impl FnOnce(&mut String)) -> Option<TypeaheadEvent> {
        let previous = self.combo.query.clone();
        apply(&mut self.combo.query);
        if self.combo.query == previous {
            return None;
        }
        self.combo.query_changed();

        let query = &self.combo.query;
        #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
        let stale = self.selection.take_if(|s| s.display != *query)?;
        lookup_core::debug!(
            name = %self.combo.config.name,
            id = %stale.id,
            "selection invalidated by edit"
        );
        Some(TypeaheadEvent::Cleared)
    }

    fn enter(&mut self) -> Option<TypeaheadEvent> {
        if !self.combo.is_open() {
            return None;
        }
        if let Some(pos) = self.combo.highlight.index() {
            return self.commit(pos);
        }
        if self.combo.filtered.is_empty() && self.combo.config.add_new {
            return Some(self.add_new());
        }
        None
    }

    /// Commit the candidate at filtered-set position `pos`.
    fn commit(&mut self, pos: usize) -> Option<TypeaheadEvent> {
        let candidate = self.combo.candidate_at(pos)?;
        let Some(id) = candidate.id_of(&self.combo.config.id_field) else {
            lookup_core::warn!(
                name = %self.combo.config.name,
                position = pos,
                "candidate has no id; commit ignored"
            );
            return None;
        };
        let display = self.combo.display_of(candidate);

        self.combo.query.clone_from(&display);
        self.combo.close(CloseReason::Committed);
        self.combo.refilter();
        lookup_core::debug!(name = %self.combo.config.name, %id, "selection committed");
        self.selection = Some(Committed {
            id: id.clone(),
            display,
        });
        Some(TypeaheadEvent::Committed(id))
    }

    fn clear(&mut self) -> TypeaheadEvent {
        self.combo.query.clear();
        self.selection = None;
        self.combo.close(CloseReason::Cleared);
        self.combo.refilter();
        self.combo.focused = true;
        lookup_core::debug!(name = %self.combo.config.name, "selection cleared");
        TypeaheadEvent::Cleared
    }

    fn refresh(&mut self) -> TypeaheadEvent {
        self.combo.focused = true;
        lookup_core::info!(name = %self.combo.config.name, "refresh requested");
        TypeaheadEvent::RefreshRequested
    }

    fn add_new(&mut self) -> TypeaheadEvent {
        lookup_core::info!(
            name = %self.combo.config.name,
            query = %self.combo.query,
            "add new requested"
        );
        TypeaheadEvent::AddNewRequested
    }

    fn dismiss(&mut self, reason: CloseReason) {
        let committed = self.selection.as_ref().map(|s| s.display.as_str());
        if self.combo.dismiss(reason, committed) {
            self.selection = None;
        }
    }

    fn affordances(&self) -> Affordances {
        let mut affordances = Affordances::empty();
        if self.combo.config.refresh {
            affordances |= Affordances::REFRESH;
        }
        if !self.combo.query.is_empty() && !self.combo.config.disabled {
            affordances |= Affordances::CLEAR;
        }
        affordances
    }

    // --- Rendering ---

    /// Draw the listbox and hover card. Call after all host content.
    pub fn render_portal(&self, style: &TypeaheadStyle, buf: &mut Buffer) {
        self.combo.render_portal(buf, style, &|_| None, false);
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Renders the trigger line of a [`Typeahead`] and records it as the anchor
/// of the floating layers.
#[derive(Debug)]
pub struct TypeaheadView<'a, C = Value> {
    style: &'a TypeaheadStyle,
    _candidate: PhantomData<fn() -> C>,
}

impl<'a, C> TypeaheadView<'a, C> {
    pub fn new(style: &'a TypeaheadStyle) -> Self {
        Self {
            style,
            _candidate: PhantomData,
        }
    }
}

impl<C: Candidate> StatefulWidget for TypeaheadView<'_, C> {
    type State = Typeahead<C>;

    fn render(&self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let Some(line) = area.row(0) else {
            return;
        };
        state.combo.set_anchor(line, buf.bounds());
        let affordances = state.affordances();
        state
            .combo
            .render_trigger(line, buf, self.style, &state.combo.query, affordances);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InitialValue;
    use lookup_core::event::Modifiers;
    use serde_json::json;
    use std::time::Duration;

    fn fruit() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "Apple", "color": "red"}),
            json!({"id": 2, "name": "Apricot", "color": "orange"}),
            json!({"id": 3, "name": "Banana", "color": "yellow"}),
        ]
    }

    fn typeahead(config: TypeaheadConfig) -> Typeahead {
        let mut t = Typeahead::new(config, fruit());
        t.focus();
        t
    }

    fn press(t: &mut Typeahead, code: KeyCode) -> Option<TypeaheadEvent> {
        t.handle_event(&Event::key(code), Instant::now())
    }

    fn type_str(t: &mut Typeahead, text: &str) {
        for c in text.chars() {
            press(t, KeyCode::Char(c));
        }
    }

    fn ctrl(t: &mut Typeahead, c: char) -> Option<TypeaheadEvent> {
        let key = KeyEvent::new(KeyCode::Char(c)).with_modifiers(Modifiers::CTRL);
        t.handle_event(&Event::Key(key), Instant::now())
    }

    fn click(t: &mut Typeahead, x: u16, y: u16) -> Option<TypeaheadEvent> {
        let down = Event::mouse(MouseEventKind::Down(MouseButton::Left), x, y);
        t.handle_event(&down, Instant::now())
    }

    fn render(t: &mut Typeahead) -> Buffer {
        let style = TypeaheadStyle::default();
        let mut buf = Buffer::new(40, 12);
        TypeaheadView::new(&style).render(Rect::new(2, 1, 20, 1), &mut buf, t);
        t.render_portal(&style, &mut buf);
        buf
    }

    fn glyph(buf: &Buffer, x: u16, y: u16) -> Option<char> {
        buf.get(x, y).and_then(|c| c.content.as_char())
    }

    #[test]
    fn keys_ignored_until_focused() {
        let mut t = Typeahead::new(TypeaheadConfig::new("fruit"), fruit());
        assert_eq!(press(&mut t, KeyCode::Char('a')), None);
        assert_eq!(t.query(), "");
        t.focus();
        press(&mut t, KeyCode::Char('a'));
        assert_eq!(t.query(), "a");
    }

    #[test]
    fn down_then_enter_commits_first_match() {
        let mut t = typeahead(TypeaheadConfig::new("fruit").with_min_search_length(2));
        type_str(&mut t, "ap");
        assert_eq!(t.state(), DropdownState::OpenListing);
        assert_eq!(t.filtered(), &[0, 1]);

        press(&mut t, KeyCode::Down);
        assert_eq!(t.highlight(), Highlight::Directional(0));
        let event = press(&mut t, KeyCode::Enter);
        assert_eq!(event, Some(TypeaheadEvent::Committed(CandidateId::Number(1))));
        assert_eq!(t.query(), "Apple");
        assert_eq!(t.selected_display(), Some("Apple"));
        assert_eq!(t.state(), DropdownState::Closed);
        assert_eq!(t.last_close_reason(), Some(CloseReason::Committed));
        assert_eq!(t.highlight(), Highlight::None);
    }

    #[test]
    fn diverging_edit_clears_selection() {
        let mut t = typeahead(TypeaheadConfig::new("fruit").with_min_search_length(2));
        type_str(&mut t, "apr");
        press(&mut t, KeyCode::Down);
        press(&mut t, KeyCode::Enter);
        assert_eq!(t.query(), "Apricot");

        let event = press(&mut t, KeyCode::Backspace);
        assert_eq!(event, Some(TypeaheadEvent::Cleared));
        assert_eq!(t.query(), "Aprico");
        assert_eq!(t.selected_id(), None);
        assert!(t.is_open());
    }

    #[test]
    fn escape_reconciles_query() {
        let mut t = typeahead(TypeaheadConfig::new("fruit").with_min_search_length(2));
        type_str(&mut t, "ban");
        press(&mut t, KeyCode::Escape);
        assert_eq!(t.query(), "");
        assert_eq!(t.last_close_reason(), Some(CloseReason::Escape));

        type_str(&mut t, "ban");
        press(&mut t, KeyCode::Down);
        press(&mut t, KeyCode::Enter);
        press(&mut t, KeyCode::Down);
        assert!(t.is_open());
        press(&mut t, KeyCode::Escape);
        assert_eq!(t.query(), "Banana");
        assert_eq!(t.selected_id(), Some(&CandidateId::Number(3)));
    }

    #[test]
    fn below_threshold_closes() {
        let mut t = typeahead(TypeaheadConfig::new("fruit"));
        type_str(&mut t, "apr");
        assert!(t.is_open());
        press(&mut t, KeyCode::Backspace);
        assert_eq!(t.state(), DropdownState::Closed);
        assert_eq!(t.last_close_reason(), Some(CloseReason::BelowThreshold));
        assert!(t.filtered().is_empty());
        press(&mut t, KeyCode::Down);
        assert!(!t.is_open());
    }

    #[test]
    fn empty_state_offers_add_new() {
        let cfg = TypeaheadConfig::new("fruit").with_add_new(true);
        let mut t = typeahead(cfg);
        type_str(&mut t, "xyz");
        assert_eq!(t.state(), DropdownState::OpenEmpty);
        assert_eq!(press(&mut t, KeyCode::Enter), Some(TypeaheadEvent::AddNewRequested));

        let mut t = typeahead(TypeaheadConfig::new("fruit"));
        type_str(&mut t, "xyz");
        assert_eq!(press(&mut t, KeyCode::Enter), None);
    }

    #[test]
    fn ctrl_shortcuts() {
        let mut t = typeahead(TypeaheadConfig::new("fruit").with_refresh(true));
        type_str(&mut t, "apple");
        assert_eq!(ctrl(&mut t, 'r'), Some(TypeaheadEvent::RefreshRequested));
        assert_eq!(ctrl(&mut t, 'u'), Some(TypeaheadEvent::Cleared));
        assert_eq!(t.query(), "");
        assert_eq!(t.last_close_reason(), Some(CloseReason::Cleared));

        let mut t = typeahead(TypeaheadConfig::new("fruit"));
        assert_eq!(ctrl(&mut t, 'r'), None);
        assert_eq!(ctrl(&mut t, 'x'), None);
        assert_eq!(t.query(), "");
    }

    #[test]
    fn paste_strips_control_characters() {
        let mut t = typeahead(TypeaheadConfig::new("fruit"));
        let paste = Event::Paste(lookup_core::event::PasteEvent::new("ban\nana"));
        t.handle_event(&paste, Instant::now());
        assert_eq!(t.query(), "banana");
        assert_eq!(t.filtered(), &[2]);
    }

    #[test]
    fn click_on_row_commits() {
        let mut t = typeahead(TypeaheadConfig::new("fruit").with_min_search_length(2));
        type_str(&mut t, "ap");
        render(&mut t);
        assert_eq!(t.menu_area(), Some(Rect::new(2, 2, 20, 4)));
        let event = click(&mut t, 5, 4);
        assert_eq!(event, Some(TypeaheadEvent::Committed(CandidateId::Number(2))));
        assert_eq!(t.query(), "Apricot");
    }

    #[test]
    fn outside_click_clears_partial_query() {
        let listeners = DocumentListeners::new();
        let mut t = Typeahead::new(TypeaheadConfig::new("fruit").with_min_search_length(2), fruit())
            .with_listeners(listeners.clone());
        t.focus();
        type_str(&mut t, "ap");
        render(&mut t);
        assert_eq!(listeners.active_count(), 1);

        assert_eq!(click(&mut t, 39, 11), None);
        assert_eq!(t.query(), "");
        assert_eq!(t.selected_id(), None);
        assert_eq!(t.state(), DropdownState::Closed);
        assert_eq!(t.last_close_reason(), Some(CloseReason::Outside));
        assert!(!t.is_focused());
        assert_eq!(listeners.active_count(), 0);
    }

    #[test]
    fn clear_glyph_click() {
        let mut t = typeahead(TypeaheadConfig::new("fruit").with_min_search_length(2));
        type_str(&mut t, "ap");
        let buf = render(&mut t);
        assert_eq!(glyph(&buf, 21, 1), Some('×'));
        assert_eq!(click(&mut t, 21, 1), Some(TypeaheadEvent::Cleared));
        assert_eq!(t.query(), "");
        assert!(t.is_focused());
    }

    #[test]
    fn hover_then_arrow_continues_from_pointer() {
        let mut t = typeahead(TypeaheadConfig::new("fruit").with_min_search_length(2));
        type_str(&mut t, "ap");
        render(&mut t);
        t.handle_event(&Event::mouse(MouseEventKind::Moved, 5, 4), Instant::now());
        assert_eq!(t.highlight(), Highlight::Pointer(1));
        press(&mut t, KeyCode::Down);
        assert_eq!(t.highlight(), Highlight::Directional(0));
    }

    #[test]
    fn hover_card_hides_after_delay() {
        let cfg = TypeaheadConfig::new("fruit")
            .with_min_search_length(2)
            .with_description_fields(["color"]);
        let mut t = typeahead(cfg);
        type_str(&mut t, "ap");
        render(&mut t);

        let t0 = Instant::now();
        t.handle_event(&Event::mouse(MouseEventKind::Moved, 5, 3), t0);
        assert_eq!(t.card_target(), Some(0));
        let buf = render(&mut t);
        assert_eq!(glyph(&buf, 22, 3), Some('┌'));

        t.handle_event(&Event::mouse(MouseEventKind::Moved, 39, 11), t0);
        assert!(!t.tick(t0 + Duration::from_millis(50)));
        assert_eq!(t.card_target(), Some(0));
        assert!(t.tick(t0 + Duration::from_millis(100)));
        assert_eq!(t.card_target(), None);
        assert_eq!(t.highlight(), Highlight::None);
    }

    #[test]
    fn click_on_card_is_inside() {
        let cfg = TypeaheadConfig::new("fruit")
            .with_min_search_length(2)
            .with_description_fields(["color"]);
        let mut t = typeahead(cfg);
        type_str(&mut t, "ap");
        render(&mut t);
        t.handle_event(&Event::mouse(MouseEventKind::Moved, 5, 3), Instant::now());
        render(&mut t);
        assert_eq!(click(&mut t, 25, 4), None);
        assert!(t.is_open());
        assert_eq!(t.query(), "ap");
    }

    #[test]
    fn renders_trigger_and_menu() {
        let cfg = TypeaheadConfig::new("fruit")
            .with_min_search_length(2)
            .with_placeholder("Search fruit")
            .with_refresh(true);
        let mut t = typeahead(cfg);
        let buf = render(&mut t);
        assert!(buf.row_text(1).starts_with("  Search fruit"));
        assert_eq!(glyph(&buf, 21, 1), Some('↻'));

        type_str(&mut t, "ap");
        let buf = render(&mut t);
        let row: String = buf.row_text(3).chars().take(22).collect();
        assert_eq!(row, "  │ Apple            │");
        assert_eq!(glyph(&buf, 20, 1), Some('×'));
        assert_eq!(t.cursor_position(), Some((4, 1)));
    }

    #[test]
    fn cursor_clamps_for_queries_wider_than_u16() {
        let paste = Event::Paste(lookup_core::event::PasteEvent::new("日".repeat(32_768)));
        let mut wide = typeahead(TypeaheadConfig::new("fruit"));
        render(&mut wide);
        wide.handle_event(&paste, Instant::now());

        let mut long = typeahead(TypeaheadConfig::new("fruit"));
        render(&mut long);
        type_str(&mut long, &"x".repeat(40));

        let end = long.cursor_position().map(|(x, _)| x);
        assert!(end.is_some_and(|x| x > 2));
        assert_eq!(wide.cursor_position().map(|(x, _)| x), end);
    }

    #[test]
    fn initial_value_and_validation() {
        let cfg = TypeaheadConfig::new("fruit")
            .with_required(true)
            .with_initial_value(InitialValue::One(CandidateId::Number(3)));
        let t = Typeahead::new(cfg, fruit());
        assert_eq!(t.query(), "Banana");
        assert_eq!(t.selected().and_then(|c| c.field("color")).as_deref(), Some("yellow"));
        assert!(t.validate().is_ok());

        let t = Typeahead::new(TypeaheadConfig::new("fruit").with_required(true), fruit());
        assert_eq!(
            t.validate(),
            Err(FieldError::Required {
                name: "fruit".into()
            })
        );
    }

    #[test]
    fn disabled_ignores_input() {
        let mut t = typeahead(TypeaheadConfig::new("fruit").with_min_search_length(1));
        type_str(&mut t, "a");
        assert!(t.is_open());
        t.set_disabled(true);
        assert_eq!(t.last_close_reason(), Some(CloseReason::Disabled));
        assert_eq!(press(&mut t, KeyCode::Char('p')), None);
        assert_eq!(t.query(), "a");
    }
}
