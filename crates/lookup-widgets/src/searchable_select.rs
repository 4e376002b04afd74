#![forbid(unsafe_code)]

//! Searchable select: a filter box over a list, with single or multiple
//! selection.
//!
//! Unlike [`Typeahead`](crate::Typeahead), the query is only a filter: it is
//! cleared when the dropdown closes and never affects the value. In multiple
//! mode activating a row toggles it, the dropdown stays open, and a
//! "Select all" row toggles the whole filtered set.

use std::marker::PhantomData;
use std::time::Instant;

use lookup_core::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use lookup_core::geometry::{Rect, ScrollOffset};
use lookup_render::buffer::Buffer;
use serde_json::Value;

use crate::StatefulWidget;
use crate::candidate::{Candidate, CandidateId};
use crate::combo::{Affordances, Combo, Hit, MenuRow};
use crate::config::{FieldError, TypeaheadConfig};
use crate::listeners::DocumentListeners;
use crate::navigation::Highlight;
use crate::typeahead::{TypeaheadEvent, TypeaheadStyle};
use crate::visibility::{CloseReason, DropdownState};

/// Select control with a search box.
#[derive(Debug)]
pub struct SearchableSelect<C = Value> {
    combo: Combo<C>,
    /// Selected ids in selection order; at most one in single mode.
    selected: Vec<CandidateId>,
}

impl<C: Candidate> SearchableSelect<C> {
    /// Build a select over `data`. Initial ids missing from `data` are
    /// dropped.
    pub fn new(config: TypeaheadConfig, data: Vec<C>) -> Self {
        let mut select = Self {
            combo: Combo::new(config, data),
            selected: Vec::new(),
        };
        let initial = select
            .combo
            .config
            .initial_value
            .as_ref()
            .map(|v| v.ids())
            .unwrap_or_default();
        for id in initial {
            if select.selected.contains(&id) {
                continue;
            }
            if select.combo.find(&id).is_none() {
                lookup_core::warn!(name = %select.combo.config.name, %id, "initial value not found in data");
                continue;
            }
            select.selected.push(id);
        }
        if !select.is_multiple() {
            select.selected.truncate(1);
        }
        select
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

    pub fn is_multiple(&self) -> bool {
        self.combo.config.multiple
    }

    pub fn data(&self) -> &[C] {
        &self.combo.data
    }

    /// Current filter text.
    pub fn query(&self) -> &str {
        &self.combo.query
    }

    /// Data indices of the current matches, in data order.
    pub fn filtered(&self) -> &[usize] {
        &self.combo.filtered
    }

    pub fn highlight(&self) -> Highlight {
        self.combo.highlight
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

    pub fn is_focused(&self) -> bool {
        self.combo.focused
    }

    /// Selected ids, in selection order.
    pub fn selected_ids(&self) -> &[CandidateId] {
        &self.selected
    }

    /// Selected candidates still present in the data, in selection order.
    pub fn selected(&self) -> Vec<&C> {
        self.selected
            .iter()
            .filter_map(|id| self.combo.find(id).map(|(_, c)| c))
            .collect()
    }

    /// Listbox rectangle as drawn, while open.
    pub fn menu_area(&self) -> Option<Rect> {
        self.combo.layout().map(|l| l.outer)
    }

    /// Filtered-set position described by the hover card.
    pub fn card_target(&self) -> Option<usize> {
        self.combo.card().target()
    }

    /// Terminal cursor position while typing a filter.
    pub fn cursor_position(&self) -> Option<(u16, u16)> {
        if !self.combo.focused || !self.combo.is_open() {
            return None;
        }
        let line = self.combo.anchor()?;
        let end = self.affordances().text_end(line).saturating_sub(1).max(line.x);
        let typed = lookup_render::display_width(&self.combo.query);
        let typed = u16::try_from(typed).unwrap_or(u16::MAX);
        Some((line.x.saturating_add(typed).min(end), line.y))
    }

    fn is_selected(&self, index: usize) -> bool {
        self.combo
            .data
            .get(index)
            .and_then(|c| c.id_of(&self.combo.config.id_field))
            .is_some_and(|id| self.selected.contains(&id))
    }

    /// Ids of the filtered set, in order.
    fn filtered_ids(&self) -> Vec<CandidateId> {
        self.combo
            .filtered
            .iter()
            .filter_map(|&i| self.combo.data.get(i)?.id_of(&self.combo.config.id_field))
            .collect()
    }

    /// Whether every filtered candidate is selected.
    pub fn all_selected(&self) -> bool {
        let ids = self.filtered_ids();
        !ids.is_empty() && ids.iter().all(|id| self.selected.contains(id))
    }

    // --- Host operations ---

    /// Replace the candidates. The selection is kept.
    pub fn set_data(&mut self, data: Vec<C>) {
        self.combo.set_data(data);
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.combo.set_disabled(disabled);
    }

    pub fn set_scroll_offset(&mut self, scroll: ScrollOffset) {
        self.combo.set_scroll(scroll);
    }

    pub fn focus(&mut self) {
        if !self.combo.config.disabled {
            self.combo.focused = true;
        }
    }

    /// Lose focus: close the dropdown and drop the filter.
    pub fn blur(&mut self) {
        if !self.combo.focused && !self.combo.is_open() {
            return;
        }
        self.combo.dismiss(CloseReason::Outside, None);
        self.combo.focused = false;
    }

    /// Form validation.
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.combo.config.required && self.selected.is_empty() {
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

    /// Handle an input event. Keys are handled only while focused.
    pub fn handle_event(&mut self, event: &Event, now: Instant) -> Option<TypeaheadEvent> {
        if self.combo.config.disabled {
            return None;
        }
        #[cfg(feature = "tracing")]
        let _span = tracing::trace_span!("select.event", name = %self.combo.config.name).entered();

        let out = match event {
            Event::Key(key) if key.is_press() && self.combo.focused => self.handle_key(key),
            Event::Paste(paste) if self.combo.focused => {
                let text: String = paste.text.chars().filter(|c| !c.is_control()).collect();
                self.edit(|q| q.push_str(&text));
                None
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
            KeyCode::Char('a') if key.ctrl() && self.is_multiple() => self.toggle_all(),
            KeyCode::Char('u') if key.ctrl() => Some(self.clear()),
            KeyCode::Char('r') if key.ctrl() && self.combo.config.refresh => Some(self.refresh()),
            KeyCode::Char(_) if key.ctrl() || key.alt() => None,
            KeyCode::Char(c) => {
                self.edit(|q| q.push(c));
                None
            }
            KeyCode::Backspace => {
                self.edit(|q| {
                    q.pop();
                });
                None
            }
            KeyCode::Escape => {
                self.combo.dismiss(CloseReason::Escape, None);
                None
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.blur();
                None
            }
            KeyCode::Enter | KeyCode::Down | KeyCode::Up if !self.combo.is_open() => {
                self.open_if_allowed();
                None
            }
            KeyCode::Enter => self.enter(),
            KeyCode::Down
            | KeyCode::Up
            | KeyCode::Home
            | KeyCode::End
            | KeyCode::PageUp
            | KeyCode::PageDown => {
                self.combo.navigate(key.code);
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
                    Hit::Trigger | Hit::Affordance(_) => {
                        if self.combo.is_open() {
                            self.combo.dismiss(CloseReason::Toggled, None);
                        } else {
                            self.open_if_allowed();
                        }
                        None
                    }
                    Hit::Row(MenuRow::Candidate(pos)) => self.activate(pos),
                    Hit::Row(MenuRow::SelectAll) => self.toggle_all(),
                    Hit::Row(MenuRow::AddNew) => Some(self.add_new()),
                    Hit::Row(MenuRow::NoData) | Hit::Menu | Hit::Card | Hit::Outside => None,
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

    fn open_if_allowed(&mut self) {
        if self.combo.threshold_met() {
            self.combo.open();
        }
    }

    /// Filter edits never touch the selection.
    fn edit(&mut self, apply: impl FnOnce(&mut String)) {
        let previous = self.combo.query.clone();
        apply(&mut self.combo.query);
        if self.combo.query != previous {
            self.combo.query_changed();
        }
    }

    fn enter(&mut self) -> Option<TypeaheadEvent> {
        if let Some(pos) = self.combo.highlight.index() {
            return self.activate(pos);
        }
        if self.combo.filtered.is_empty() && self.combo.config.add_new {
            return Some(self.add_new());
        }
        None
    }

    /// Activate the row at filtered-set position `pos`: toggle it in
    /// multiple mode, commit it otherwise.
    fn activate(&mut self, pos: usize) -> Option<TypeaheadEvent> {
        let candidate = self.combo.candidate_at(pos)?;
        let Some(id) = candidate.id_of(&self.combo.config.id_field) else {
            lookup_core::warn!(
                name = %self.combo.config.name,
                position = pos,
                "candidate has no id; activation ignored"
            );
            return None;
        };

        if self.is_multiple() {
            match self.selected.iter().position(|s| *s == id) {
                Some(at) => {
                    self.selected.remove(at);
                }
                None => self.selected.push(id),
            }
            lookup_core::debug!(
                name = %self.combo.config.name,
                selected = self.selected.len(),
                "selection toggled"
            );
            return Some(TypeaheadEvent::Changed(self.selected.clone()));
        }

        self.selected = vec![id.clone()];
        self.combo.close(CloseReason::Committed);
        self.combo.query.clear();
        self.combo.refilter();
        lookup_core::debug!(name = %self.combo.config.name, %id, "selection committed");
        Some(TypeaheadEvent::Committed(id))
    }

    /// Select every filtered candidate, or deselect them all when they are
    /// all selected already.
    fn toggle_all(&mut self) -> Option<TypeaheadEvent> {
        let ids = self.filtered_ids();
        if ids.is_empty() {
            return None;
        }
        if ids.iter().all(|id| self.selected.contains(id)) {
            self.selected.retain(|s| !ids.contains(s));
        } else {
            for id in ids {
                if !self.selected.contains(&id) {
                    self.selected.push(id);
                }
            }
        }
        lookup_core::debug!(
            name = %self.combo.config.name,
            selected = self.selected.len(),
            "select all toggled"
        );
        Some(TypeaheadEvent::Changed(self.selected.clone()))
    }

    fn clear(&mut self) -> TypeaheadEvent {
        self.selected.clear();
        self.combo.query.clear();
        self.combo.close(CloseReason::Cleared);
        self.combo.refilter();
        self.combo.focused = true;
        lookup_core::debug!(name = %self.combo.config.name, "selection cleared");
        if self.is_multiple() {
            TypeaheadEvent::Changed(Vec::new())
        } else {
            TypeaheadEvent::Cleared
        }
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

    fn affordances(&self) -> Affordances {
        let mut affordances = Affordances::CHEVRON;
        if self.combo.config.refresh {
            affordances |= Affordances::REFRESH;
        }
        if !self.selected.is_empty() && !self.combo.config.disabled {
            affordances |= Affordances::CLEAR;
        }
        affordances
    }

    /// Text shown in the trigger: the filter while typing, otherwise the
    /// selected display values.
    fn trigger_text(&self) -> String {
        if !self.combo.query.is_empty() {
            return self.combo.query.clone();
        }
        self.selected
            .iter()
            .map(|id| match self.combo.find(id) {
                Some((_, c)) => self.combo.display_of(c),
                None => id.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    // --- Rendering ---

    /// Draw the listbox and hover card. Call after all host content.
    pub fn render_portal(&self, style: &TypeaheadStyle, buf: &mut Buffer) {
        if self.is_multiple() {
            let checked = |index: usize| Some(self.is_selected(index));
            self.combo
                .render_portal(buf, style, &checked, self.all_selected());
        } else {
            self.combo.render_portal(buf, style, &|_| None, false);
        }
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Renders the trigger line of a [`SearchableSelect`] and records it as the
/// anchor of the floating layers.
#[derive(Debug)]
pub struct SelectView<'a, C = Value> {
    style: &'a TypeaheadStyle,
    _candidate: PhantomData<fn() -> C>,
}

impl<'a, C> SelectView<'a, C> {
    pub fn new(style: &'a TypeaheadStyle) -> Self {
        Self {
            style,
            _candidate: PhantomData,
        }
    }
}

impl<C: Candidate> StatefulWidget for SelectView<'_, C> {
    type State = SearchableSelect<C>;

    fn render(&self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let Some(line) = area.row(0) else {
            return;
        };
        state.combo.set_anchor(line, buf.bounds());
        let text = state.trigger_text();
        let affordances = state.affordances();
        state
            .combo
            .render_trigger(line, buf, self.style, &text, affordances);
    }
}
