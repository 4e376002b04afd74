#![forbid(unsafe_code)]

//! Control configuration and validation errors.
//!
//! [`TypeaheadConfig`] is plain data: every field has a default, every field
//! has a `with_*` builder, and the whole struct deserializes from JSON so a
//! host can declare its form fields in a file.
//!
//! ```
//! use lookup_widgets::config::TypeaheadConfig;
//!
//! let cfg = TypeaheadConfig::from_json(r#"{"name": "customer", "min_search_length": 2}"#)?;
//! assert_eq!(cfg.search_fields, vec!["name".to_string()]);
//! assert_eq!(cfg.min_search_length, 2);
//! # Ok::<(), lookup_widgets::config::ConfigError>(())
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::candidate::CandidateId;
use crate::matcher::ShortTokenPolicy;
use crate::placement::RepositionPolicy;

/// Initial selection: one id for single-value controls, a list for
/// multi-value selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitialValue {
    One(CandidateId),
    Many(Vec<CandidateId>),
}

impl InitialValue {
    /// All ids, in order.
    pub fn ids(&self) -> Vec<CandidateId> {
        match self {
            Self::One(id) => vec![id.clone()],
            Self::Many(ids) => ids.clone(),
        }
    }
}

fn default_search_fields() -> Vec<String> {
    vec!["name".to_string()]
}

fn default_display_field() -> String {
    "name".to_string()
}

fn default_id_field() -> String {
    "id".to_string()
}

const fn default_min_search_length() -> usize {
    3
}

const fn default_max_visible() -> usize {
    8
}

const fn default_hover_dismiss_ms() -> u64 {
    100
}

/// Construction parameters shared by [`Typeahead`](crate::Typeahead) and
/// [`SearchableSelect`](crate::SearchableSelect).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeaheadConfig {
    /// Form field identity.
    pub name: String,
    /// Shown in the empty trigger.
    pub placeholder: String,
    /// Form validation requires a selection.
    pub required: bool,
    /// Fields the query is matched against.
    #[serde(default = "default_search_fields")]
    pub search_fields: Vec<String>,
    /// Field shown in rows and copied into the query on commit.
    #[serde(default = "default_display_field")]
    pub display_field: String,
    /// Field holding the candidate identity.
    #[serde(default = "default_id_field")]
    pub id_field: String,
    /// Characters (after trimming) before the dropdown opens.
    #[serde(default = "default_min_search_length")]
    pub min_search_length: usize,
    /// Ignore all input.
    pub disabled: bool,
    /// Selection applied at construction.
    pub initial_value: Option<InitialValue>,
    /// Multi-value selection (searchable select only).
    pub multiple: bool,
    /// Offer an "Add New" row when nothing matches.
    pub add_new: bool,
    /// Offer a refresh affordance in the trigger.
    pub refresh: bool,
    /// Fields shown on the hover card; empty disables the card.
    pub description_fields: Vec<String>,
    /// Listbox rows shown before scrolling.
    #[serde(default = "default_max_visible")]
    pub max_visible: usize,
    /// Delay before an abandoned hover card hides.
    #[serde(default = "default_hover_dismiss_ms")]
    pub hover_dismiss_ms: u64,
    /// Handling of query tokens shorter than `min_search_length`.
    pub short_token_policy: ShortTokenPolicy,
    /// When the listbox position is recomputed.
    pub reposition: RepositionPolicy,
}

impl Default for TypeaheadConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            placeholder: String::new(),
            required: false,
            search_fields: default_search_fields(),
            display_field: default_display_field(),
            id_field: default_id_field(),
            min_search_length: default_min_search_length(),
            disabled: false,
            initial_value: None,
            multiple: false,
            add_new: false,
            refresh: false,
            description_fields: Vec::new(),
            max_visible: default_max_visible(),
            hover_dismiss_ms: default_hover_dismiss_ms(),
            short_token_policy: ShortTokenPolicy::default(),
            reposition: RepositionPolicy::default(),
        }
    }
}

impl TypeaheadConfig {
    /// Defaults with the given field name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Defaults for a searchable select: every candidate is listed before
    /// anything is typed.
    pub fn select(name: impl Into<String>) -> Self {
        Self {
            min_search_length: 0,
            ..Self::new(name)
        }
    }

    /// Parse and validate a JSON object.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the controls cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_fields.is_empty() || self.search_fields.iter().all(|f| f.trim().is_empty()) {
            return Err(ConfigError::EmptySearchFields);
        }
        if self.display_field.trim().is_empty() {
            return Err(ConfigError::EmptyDisplayField);
        }
        if self.max_visible == 0 {
            return Err(ConfigError::ZeroMaxVisible);
        }
        Ok(())
    }

    /// Hover card dismissal delay.
    pub fn hover_dismiss_delay(&self) -> Duration {
        Duration::from_millis(self.hover_dismiss_ms)
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn with_search_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_display_field(mut self, field: impl Into<String>) -> Self {
        self.display_field = field.into();
        self
    }

    #[must_use]
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    #[must_use]
    pub fn with_min_search_length(mut self, len: usize) -> Self {
        self.min_search_length = len;
        self
    }

    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    #[must_use]
    pub fn with_initial_value(mut self, value: InitialValue) -> Self {
        self.initial_value = Some(value);
        self
    }

    #[must_use]
    pub fn with_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    #[must_use]
    pub fn with_add_new(mut self, add_new: bool) -> Self {
        self.add_new = add_new;
        self
    }

    #[must_use]
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    #[must_use]
    pub fn with_description_fields<S: Into<String>>(
        mut self,
        fields: impl IntoIterator<Item = S>,
    ) -> Self {
        self.description_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_max_visible(mut self, rows: usize) -> Self {
        self.max_visible = rows;
        self
    }

    #[must_use]
    pub fn with_hover_dismiss_ms(mut self, ms: u64) -> Self {
        self.hover_dismiss_ms = ms;
        self
    }

    #[must_use]
    pub fn with_short_token_policy(mut self, policy: ShortTokenPolicy) -> Self {
        self.short_token_policy = policy;
        self
    }

    #[must_use]
    pub fn with_reposition(mut self, policy: RepositionPolicy) -> Self {
        self.reposition = policy;
        self
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Invalid or unparsable configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Malformed JSON or wrong field types.
    Json(serde_json::Error),
    /// No usable search field.
    EmptySearchFields,
    /// Blank display field.
    EmptyDisplayField,
    /// `max_visible` of zero would hide every row.
    ZeroMaxVisible,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "invalid control config: {e}"),
            Self::EmptySearchFields => write!(f, "search_fields must name at least one field"),
            Self::EmptyDisplayField => write!(f, "display_field must not be empty"),
            Self::ZeroMaxVisible => write!(f, "max_visible must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Form validation failure for one control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// A required control has no selection.
    Required { name: String },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required { name } => write!(f, "{name} is required"),
        }
    }
}

impl std::error::Error for FieldError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = TypeaheadConfig::default();
        assert_eq!(cfg.search_fields, vec!["name"]);
        assert_eq!(cfg.display_field, "name");
        assert_eq!(cfg.id_field, "id");
        assert_eq!(cfg.min_search_length, 3);
        assert_eq!(cfg.max_visible, 8);
        assert_eq!(cfg.hover_dismiss_delay(), Duration::from_millis(100));
        assert_eq!(cfg.short_token_policy, ShortTokenPolicy::Reject);
        assert_eq!(cfg.reposition, RepositionPolicy::OnQueryChange);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let cfg = TypeaheadConfig::from_json(
            r#"{"name": "products", "multiple": true, "initial_value": [1, "SKU-2"],
                "short_token_policy": "prefix", "reposition": "track_anchor"}"#,
        )
        .expect("valid config");
        assert!(cfg.multiple);
        assert_eq!(cfg.display_field, "name");
        assert_eq!(cfg.min_search_length, 3);
        assert_eq!(
            cfg.initial_value,
            Some(InitialValue::Many(vec![
                CandidateId::Number(1),
                CandidateId::Text("SKU-2".into())
            ]))
        );
        assert_eq!(cfg.short_token_policy, ShortTokenPolicy::Prefix);
        assert_eq!(cfg.reposition, RepositionPolicy::TrackAnchor);
    }

    #[test]
    fn single_initial_value() {
        let cfg = TypeaheadConfig::from_json(r#"{"initial_value": 4}"#).expect("valid config");
        assert_eq!(cfg.initial_value.map(|v| v.ids()), Some(vec![CandidateId::Number(4)]));
    }

    #[test]
    fn validation_errors() {
        let err = TypeaheadConfig::new("x")
            .with_search_fields(Vec::<String>::new())
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptySearchFields));

        let err = TypeaheadConfig::new("x").with_display_field(" ").validate().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyDisplayField));

        let err = TypeaheadConfig::new("x").with_max_visible(0).validate().unwrap_err();
        assert_eq!(err.to_string(), "max_visible must be at least 1");
    }

    #[test]
    fn malformed_json_is_json_error() {
        let err = TypeaheadConfig::from_json(r#"{"min_search_length": "three"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn builders_compose() {
        let cfg = TypeaheadConfig::new("customer")
            .with_placeholder("Search customers")
            .with_search_fields(["name", "email"])
            .with_description_fields(["email", "phone"])
            .with_add_new(true)
            .with_refresh(true)
            .with_min_search_length(1);
        assert_eq!(cfg.name, "customer");
        assert_eq!(cfg.search_fields, vec!["name", "email"]);
        assert!(cfg.add_new && cfg.refresh);
    }

    #[test]
    fn select_lists_without_typing() {
        let cfg = TypeaheadConfig::select("status");
        assert_eq!(cfg.min_search_length, 0);
        assert_eq!(cfg.name, "status");
    }

    #[test]
    fn field_error_message() {
        let err = FieldError::Required {
            name: "customer".into(),
        };
        assert_eq!(err.to_string(), "customer is required");
    }
}
