#![forbid(unsafe_code)]

//! Tracing integration tests for the combobox controls.
//!
//! Spans and events enabled:
//!   cargo test -p lookup-widgets --features tracing --test tracing_tests
//!
//! Zero-overhead verification (no feature):
//!   cargo test -p lookup-widgets --test tracing_tests -- zero_overhead

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use lookup_core::event::{Event, KeyCode};
use lookup_widgets::{SearchableSelect, Typeahead, TypeaheadConfig};
use serde_json::{Value, json};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Test Infrastructure
// ============================================================================

/// A captured span or event with its fields and enclosing span.
#[derive(Debug, Clone)]
#[allow(dead_code)]
struct Captured {
    name: String,
    fields: HashMap<String, String>,
    parent_name: Option<String>,
}

/// A tracing Layer that records spans and events.
struct Capture {
    spans: Arc<Mutex<Vec<Captured>>>,
    events: Arc<Mutex<Vec<Captured>>>,
}

/// Handle to read captured records after the closure returns.
struct CaptureHandle {
    spans: Arc<Mutex<Vec<Captured>>>,
    events: Arc<Mutex<Vec<Captured>>>,
}

impl CaptureHandle {
    fn spans(&self) -> Vec<Captured> {
        self.spans.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    fn events(&self) -> Vec<Captured> {
        self.events.lock().unwrap().clone()
    }

    /// Messages of all captured events, in emission order.
    #[allow(dead_code)]
    fn messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.fields.get("message").cloned())
            .collect()
    }
}

/// Visitor that extracts fields.
struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);

        let parent_name = ctx
            .current_span()
            .id()
            .and_then(|id| ctx.span(id))
            .map(|span_ref| span_ref.name().to_string());

        self.spans.lock().unwrap().push(Captured {
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
            parent_name,
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);

        let parent_name = ctx.event_span(event).map(|span_ref| span_ref.name().to_string());

        self.events.lock().unwrap().push(Captured {
            name: event.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
            parent_name,
        });
    }
}

/// Set up a tracing subscriber with capture and run a closure.
fn with_captured<F>(f: F) -> CaptureHandle
where
    F: FnOnce(),
{
    let spans = Arc::new(Mutex::new(Vec::new()));
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = Capture {
        spans: spans.clone(),
        events: events.clone(),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    CaptureHandle { spans, events }
}

fn fruit() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "Apple"}),
        json!({"id": 2, "name": "Apricot"}),
        json!({"id": 3, "name": "Banana"}),
    ]
}

fn drive_commit(t: &mut Typeahead) {
    let now = Instant::now();
    t.focus();
    for code in [
        KeyCode::Char('a'),
        KeyCode::Char('p'),
        KeyCode::Down,
        KeyCode::Enter,
    ] {
        t.handle_event(&Event::key(code), now);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

/// Every handled event runs inside a `typeahead.event` span naming the field.
#[test]
#[cfg(feature = "tracing")]
fn event_spans_carry_control_name() {
    let handle = with_captured(|| {
        let mut t = Typeahead::new(TypeaheadConfig::new("customer").with_min_search_length(2), fruit());
        drive_commit(&mut t);
    });

    let spans = handle.spans();
    let event_spans: Vec<_> = spans.iter().filter(|s| s.name == "typeahead.event").collect();
    assert_eq!(event_spans.len(), 4, "got {spans:?}");
    assert!(
        event_spans
            .iter()
            .all(|s| s.fields.get("name").is_some_and(|n| n.contains("customer")))
    );
}

/// Opening and committing are logged at the points they happen.
#[test]
#[cfg(feature = "tracing")]
fn lifecycle_events_logged_in_order() {
    let handle = with_captured(|| {
        let mut t = Typeahead::new(TypeaheadConfig::new("customer").with_min_search_length(2), fruit());
        drive_commit(&mut t);
    });

    let messages = handle.messages();
    let opened = messages.iter().position(|m| m == "dropdown opened");
    let committed = messages.iter().position(|m| m == "selection committed");
    assert!(opened.is_some(), "missing open event: {messages:?}");
    assert!(committed.is_some(), "missing commit event: {messages:?}");
    assert!(opened < committed);

    let commit = handle
        .events()
        .into_iter()
        .find(|e| e.fields.get("message").is_some_and(|m| m == "selection committed"));
    assert_eq!(
        commit.and_then(|e| e.parent_name),
        Some("typeahead.event".to_string())
    );
}

/// An unknown initial value is reported as a warning.
#[test]
#[cfg(feature = "tracing")]
fn missing_initial_value_warns() {
    let handle = with_captured(|| {
        let config = TypeaheadConfig::new("customer")
            .with_initial_value(lookup_widgets::InitialValue::One(lookup_widgets::CandidateId::Number(99)));
        let t = Typeahead::new(config, fruit());
        assert_eq!(t.query(), "");
    });

    let warned = handle.events().into_iter().any(|e| {
        e.fields
            .get("message")
            .is_some_and(|m| m == "initial value not found in data")
    });
    assert!(warned);
}

/// Select events run inside their own span.
#[test]
#[cfg(feature = "tracing")]
fn select_spans_created() {
    let handle = with_captured(|| {
        let mut s = SearchableSelect::new(TypeaheadConfig::select("status"), fruit());
        s.focus();
        s.handle_event(&Event::key(KeyCode::Down), Instant::now());
    });
    assert!(handle.spans().iter().any(|s| s.name == "select.event"));
}

/// Without the feature no spans are created even with a subscriber set.
#[test]
#[cfg(not(feature = "tracing"))]
fn zero_overhead_no_spans_without_feature() {
    let handle = with_captured(|| {
        let mut t = Typeahead::new(TypeaheadConfig::new("customer").with_min_search_length(2), fruit());
        drive_commit(&mut t);
        let mut s = SearchableSelect::new(TypeaheadConfig::select("status"), fruit());
        s.focus();
        s.handle_event(&Event::key(KeyCode::Down), Instant::now());
    });
    assert!(handle.spans().is_empty());
    assert!(handle.events().is_empty());
}

/// Controls behave identically whether or not a subscriber is installed.
#[test]
fn zero_overhead_behavior_unchanged() {
    let mut plain = Typeahead::new(TypeaheadConfig::new("customer").with_min_search_length(2), fruit());
    drive_commit(&mut plain);

    let mut traced = Typeahead::new(TypeaheadConfig::new("customer").with_min_search_length(2), fruit());
    let _ = with_captured(|| drive_commit(&mut traced));

    assert_eq!(plain.query(), traced.query());
    assert_eq!(plain.selected_id(), traced.selected_id());
    assert_eq!(plain.query(), "Apple");
}
