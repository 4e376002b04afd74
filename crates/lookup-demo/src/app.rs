#![forbid(unsafe_code)]

//! The invoice form: three lookup fields, focus cycling, and submission.
//!
//! The form owns one [`DocumentListeners`] registry shared by every field,
//! so a press that opens one dropdown is seen as an outside press by the
//! others and at most one list is ever registered.

use std::fmt;
use std::time::Instant;

use lookup::prelude::*;
use lookup::{
    CandidateId, Cell, FieldError, InitialValue, KeyEvent, Modifiers, MouseEventKind,
    PackedRgba, RepositionPolicy, SelectView, ShortTokenPolicy,
};
use serde_json::{Value, json};

use crate::data::DataSource;

const LABEL_WIDTH: u16 = 10;
const FORM_WIDTH: u16 = 64;

/// Form fields in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Customer,
    Products,
    Status,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Customer, Field::Products, Field::Status];

    pub fn label(self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::Products => "Products",
            Self::Status => "Status",
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Customer => Self::Products,
            Self::Products => Self::Status,
            Self::Status => Self::Customer,
        }
    }

    #[must_use]
    pub fn prev(self) -> Self {
        match self {
            Self::Customer => Self::Status,
            Self::Products => Self::Customer,
            Self::Status => Self::Products,
        }
    }

    /// Row of the field's trigger relative to the form top.
    fn row(self) -> u16 {
        match self {
            Self::Customer => 2,
            Self::Products => 4,
            Self::Status => 6,
        }
    }
}

/// What the host loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A validated form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub customer: CandidateId,
    pub products: Vec<CandidateId>,
    pub status: CandidateId,
}

impl fmt::Display for Submission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let products: Vec<String> = self.products.iter().map(ToString::to_string).collect();
        write!(
            f,
            "customer={} products=[{}] status={}",
            self.customer,
            products.join(","),
            self.status
        )
    }
}

/// Form construction options.
#[derive(Debug, Clone)]
pub struct FormOptions {
    pub min_search: usize,
    pub track_anchor: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            min_search: 2,
            track_anchor: false,
        }
    }
}

fn status_records() -> Vec<Value> {
    vec![
        json!({"id": "draft", "name": "Draft", "note": "Not sent to the customer"}),
        json!({"id": "sent", "name": "Sent", "note": "Awaiting payment"}),
        json!({"id": "paid", "name": "Paid", "note": "Settled in full"}),
        json!({"id": "void", "name": "Void", "note": "Cancelled, kept for audit"}),
    ]
}

/// The invoice form state.
#[derive(Debug)]
pub struct InvoiceForm {
    customer: Typeahead,
    products: SearchableSelect,
    status: SearchableSelect,
    listeners: DocumentListeners,
    customer_source: DataSource,
    style: TypeaheadStyle,
    focus: Field,
    message: String,
    submission: Option<Submission>,
}

impl InvoiceForm {
    /// Build the form over loaded records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a field configuration is rejected.
    pub fn new(
        customer_source: DataSource,
        customers: Vec<Value>,
        products: Vec<Value>,
        options: &FormOptions,
    ) -> Result<Self> {
        let reposition = if options.track_anchor {
            RepositionPolicy::TrackAnchor
        } else {
            RepositionPolicy::OnQueryChange
        };
        let listeners = DocumentListeners::new();

        let customer_config = TypeaheadConfig::new("customer")
            .with_placeholder("Search by name, city or contact")
            .with_required(true)
            .with_search_fields(["name", "city", "contact"])
            .with_description_fields(["city", "contact", "terms"])
            .with_min_search_length(options.min_search)
            .with_short_token_policy(ShortTokenPolicy::Skip)
            .with_add_new(true)
            .with_refresh(true)
            .with_reposition(reposition);
        customer_config.validate()?;

        let products_config = TypeaheadConfig::select("products")
            .with_placeholder("Choose products")
            .with_required(true)
            .with_multiple(true)
            .with_search_fields(["name", "category", "id"])
            .with_description_fields(["category", "unit", "price"])
            .with_reposition(reposition);
        products_config.validate()?;

        let status_config = TypeaheadConfig::select("status")
            .with_required(true)
            .with_description_fields(["note"])
            .with_initial_value(InitialValue::One(CandidateId::Text("draft".into())))
            .with_reposition(reposition);
        status_config.validate()?;

        let mut form = Self {
            customer: Typeahead::new(customer_config, customers).with_listeners(listeners.clone()),
            products: SearchableSelect::new(products_config, products)
                .with_listeners(listeners.clone()),
            status: SearchableSelect::new(status_config, status_records())
                .with_listeners(listeners.clone()),
            listeners,
            customer_source,
            style: TypeaheadStyle::default(),
            focus: Field::Customer,
            message: String::from("Tab moves between fields. Ctrl+S submits, Ctrl+C quits."),
            submission: None,
        };
        form.customer.focus();
        tracing::info!("invoice form ready");
        Ok(form)
    }

    pub fn focus(&self) -> Field {
        self.focus
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn submission(&self) -> Option<&Submission> {
        self.submission.as_ref()
    }

    pub fn customer(&self) -> &Typeahead {
        &self.customer
    }

    pub fn products(&self) -> &SearchableSelect {
        &self.products
    }

    pub fn status(&self) -> &SearchableSelect {
        &self.status
    }

    pub fn listeners(&self) -> &DocumentListeners {
        &self.listeners
    }

    // --- Focus ---

    fn is_focused(&self, field: Field) -> bool {
        match field {
            Field::Customer => self.customer.is_focused(),
            Field::Products => self.products.is_focused(),
            Field::Status => self.status.is_focused(),
        }
    }

    fn move_focus(&mut self, to: Field) {
        match self.focus {
            Field::Customer => self.customer.blur(),
            Field::Products => self.products.blur(),
            Field::Status => self.status.blur(),
        }
        self.focus = to;
        match to {
            Field::Customer => self.customer.focus(),
            Field::Products => self.products.focus(),
            Field::Status => self.status.focus(),
        }
        tracing::debug!(field = to.label(), "focus moved");
    }

    // --- Events ---

    /// Route an event to the fields. Returns [`Flow::Quit`] on Ctrl+C and
    /// after a successful submit.
    pub fn handle_event(&mut self, event: &Event, now: Instant) -> Flow {
        match event {
            Event::Key(key) if key.is_press() => self.handle_key(key, now),
            Event::Mouse(mouse) => {
                let pressed = matches!(mouse.kind, MouseEventKind::Down(_));
                self.broadcast(event, now);
                if pressed
                    && let Some(field) = Field::ALL.into_iter().find(|f| self.is_focused(*f))
                {
                    self.focus = field;
                }
                Flow::Continue
            }
            Event::Focus(_) | Event::Tick => {
                self.broadcast(event, now);
                Flow::Continue
            }
            Event::Paste(_) => {
                self.dispatch(self.focus, event, now);
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent, now: Instant) -> Flow {
        if key.modifiers.contains(Modifiers::CTRL) {
            match key.code {
                KeyCode::Char('c') => return Flow::Quit,
                KeyCode::Char('s') => return self.submit(),
                _ => {}
            }
        }
        match key.code {
            KeyCode::Tab => self.move_focus(self.focus.next()),
            KeyCode::BackTab => self.move_focus(self.focus.prev()),
            _ => self.dispatch(self.focus, &Event::Key(*key), now),
        }
        Flow::Continue
    }

    /// Every field sees pointer presses so each can detect outside clicks.
    fn broadcast(&mut self, event: &Event, now: Instant) {
        for field in Field::ALL {
            self.dispatch(field, event, now);
        }
    }

    fn dispatch(&mut self, field: Field, event: &Event, now: Instant) {
        let emitted = match field {
            Field::Customer => self.customer.handle_event(event, now),
            Field::Products => self.products.handle_event(event, now),
            Field::Status => self.status.handle_event(event, now),
        };
        if let Some(emitted) = emitted {
            self.on_field_event(field, emitted);
        }
    }

    fn on_field_event(&mut self, field: Field, event: TypeaheadEvent) {
        tracing::debug!(field = field.label(), ?event, "field event");
        match (field, event) {
            (Field::Customer, TypeaheadEvent::AddNewRequested) => self.add_customer(),
            (Field::Customer, TypeaheadEvent::RefreshRequested) => self.refresh_customers(),
            (Field::Customer, TypeaheadEvent::Committed(_)) => {
                let name = self.customer.selected_display().unwrap_or_default();
                self.message = format!("Customer: {name}");
            }
            (Field::Products, TypeaheadEvent::Changed(ids)) => {
                self.message = format!("{} product(s) selected", ids.len());
            }
            (Field::Status, TypeaheadEvent::Committed(id)) => {
                self.message = format!("Status: {id}");
            }
            (_, TypeaheadEvent::Cleared) => {
                self.message = format!("{} cleared", field.label());
            }
            _ => {}
        }
    }

    /// Append a customer named after the current query.
    fn add_customer(&mut self) {
        let name = self.customer.query().trim().to_string();
        if name.is_empty() {
            self.message = String::from("Type a name before adding a customer");
            return;
        }
        let next_id = self
            .customer
            .data()
            .iter()
            .filter_map(|c| c["id"].as_i64())
            .max()
            .map_or(1, |id| id + 1);
        let mut data = self.customer.data().to_vec();
        data.push(json!({"id": next_id, "name": name, "city": "", "contact": "", "terms": "New account"}));
        self.customer.set_data(data);
        tracing::info!(id = next_id, name = %name, "customer added");
        self.message = format!("Added customer {name}; press Enter to select it");
    }

    fn refresh_customers(&mut self) {
        match self.customer_source.load() {
            Ok(records) => {
                let count = records.len();
                self.customer.set_data(records);
                self.message = format!("Reloaded {count} customers");
            }
            Err(err) => {
                tracing::warn!(error = %err, "customer refresh failed");
                self.message = format!("Refresh failed: {err}");
            }
        }
    }

    fn submit(&mut self) -> Flow {
        let checks = [
            self.customer.validate(),
            self.products.validate(),
            self.status.validate(),
        ];
        let missing: Vec<String> = checks
            .into_iter()
            .filter_map(|r| r.err())
            .map(|FieldError::Required { name }| name)
            .collect();
        if !missing.is_empty() {
            tracing::info!(?missing, "submit rejected");
            self.message = format!("Required: {}", missing.join(", "));
            return Flow::Continue;
        }

        let (Some(customer), Some(status)) = (
            self.customer.selected_id().cloned(),
            self.status.selected_ids().first().cloned(),
        ) else {
            return Flow::Continue;
        };
        let submission = Submission {
            customer,
            products: self.products.selected_ids().to_vec(),
            status,
        };
        tracing::info!(%submission, "invoice submitted");
        self.submission = Some(submission);
        Flow::Quit
    }

    /// Advance hover card timers. Returns `true` when a redraw is needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let a = self.customer.tick(now);
        let b = self.products.tick(now);
        let c = self.status.tick(now);
        a || b || c
    }

    // --- Rendering ---

    /// Form origin for a terminal of `width` columns: centered horizontally.
    fn origin(width: u16) -> (u16, u16) {
        (width.saturating_sub(FORM_WIDTH) / 2, 1)
    }

    fn trigger_area(field: Field, width: u16) -> Rect {
        let (left, top) = Self::origin(width);
        let form_width = FORM_WIDTH.min(width.saturating_sub(left));
        Rect::new(
            left + LABEL_WIDTH,
            top + field.row(),
            form_width.saturating_sub(LABEL_WIDTH),
            1,
        )
    }

    /// Draw the whole form, then the floating layers on top.
    pub fn render(&mut self, buf: &mut Buffer) {
        let (left, top) = Self::origin(buf.width());
        let title = Style::new().fg(PackedRgba::rgb(120, 200, 255)).bold();
        let label = Style::new().fg(PackedRgba::rgb(200, 200, 200));
        let focused_label = Style::new().fg(PackedRgba::WHITE).bold();
        let hint = Style::new().fg(PackedRgba::rgb(130, 130, 130));

        put_str(buf, left, top, "New invoice", title);
        for field in Field::ALL {
            let style = if field == self.focus { focused_label } else { label };
            put_str(buf, left, top + field.row(), field.label(), style);
        }

        let width = buf.width();
        TypeaheadView::new(&self.style).render(
            Self::trigger_area(Field::Customer, width),
            buf,
            &mut self.customer,
        );
        SelectView::new(&self.style).render(
            Self::trigger_area(Field::Products, width),
            buf,
            &mut self.products,
        );
        SelectView::new(&self.style).render(
            Self::trigger_area(Field::Status, width),
            buf,
            &mut self.status,
        );

        put_str(buf, left, top + 8, &self.message, hint);

        self.customer.render_portal(&self.style, buf);
        self.products.render_portal(&self.style, buf);
        self.status.render_portal(&self.style, buf);
    }

    /// Terminal cursor for the focused field, if it shows one.
    pub fn cursor(&self) -> Option<(u16, u16)> {
        match self.focus {
            Field::Customer => self.customer.cursor_position(),
            Field::Products => self.products.cursor_position(),
            Field::Status => self.status.cursor_position(),
        }
    }
}

fn put_str(buf: &mut Buffer, x: u16, y: u16, text: &str, style: Style) {
    for (i, c) in text.chars().enumerate() {
        let Some(cx) = x.checked_add(i as u16) else {
            break;
        };
        if cx >= buf.width() {
            break;
        }
        let mut cell = Cell::from_char(c);
        style.apply_to(&mut cell);
        buf.set(cx, y, cell);
    }
}
