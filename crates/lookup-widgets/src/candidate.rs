#![forbid(unsafe_code)]

//! Candidate records and their identities.
//!
//! The controls never own the shape of a record. They read it through the
//! [`Candidate`] trait: a textual value per field name, and an identity
//! taken from the configured id field.
//!
//! [`serde_json::Value`] implements the trait so JSON arrays from a backend
//! can be handed over unchanged. Field names are dotted paths into nested
//! objects (`"customer.name"`).

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable identity of a candidate.
///
/// Serialized untagged: `7` or `"SKU-7"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CandidateId {
    /// Integer identity.
    Number(i64),
    /// Textual identity.
    Text(String),
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CandidateId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for CandidateId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for CandidateId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// A selectable record.
pub trait Candidate {
    /// Textual value of a field, or `None` if the record has no such field.
    fn field(&self, name: &str) -> Option<Cow<'_, str>>;

    /// Identity read from `id_field`.
    ///
    /// The default parses the field's text: integers become
    /// [`CandidateId::Number`], anything else [`CandidateId::Text`].
    fn id_of(&self, id_field: &str) -> Option<CandidateId> {
        let raw = self.field(id_field)?;
        Some(match raw.parse::<i64>() {
            Ok(n) => CandidateId::Number(n),
            Err(_) => CandidateId::Text(raw.into_owned()),
        })
    }
}

fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |node, key| node.as_object()?.get(key))
}

impl Candidate for Value {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match lookup_path(self, name)? {
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn id_of(&self, id_field: &str) -> Option<CandidateId> {
        match lookup_path(self, id_field)? {
            Value::Number(n) => n
                .as_i64()
                .map(CandidateId::Number)
                .or_else(|| Some(CandidateId::Text(n.to_string()))),
            Value::String(s) => Some(CandidateId::Text(s.clone())),
            _ => None,
        }
    }
}

/// Display text of a candidate, empty when the field is missing.
pub(crate) fn display_text<'c, C: Candidate>(candidate: &'c C, display_field: &str) -> Cow<'c, str> {
    candidate.field(display_field).unwrap_or(Cow::Borrowed(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Sku(&'static str, &'static str);

    impl Candidate for Sku {
        fn field(&self, name: &str) -> Option<Cow<'_, str>> {
            match name {
                "code" => Some(Cow::Borrowed(self.0)),
                "name" => Some(Cow::Borrowed(self.1)),
                _ => None,
            }
        }
    }

    #[test]
    fn json_fields_and_paths() {
        let v = json!({"id": 7, "name": "Apple", "vendor": {"name": "Orchard Co"}, "price": 1.5});
        assert_eq!(v.field("name").as_deref(), Some("Apple"));
        assert_eq!(v.field("vendor.name").as_deref(), Some("Orchard Co"));
        assert_eq!(v.field("price").as_deref(), Some("1.5"));
        assert_eq!(v.field("vendor"), None);
        assert_eq!(v.field("missing.path"), None);
    }

    #[test]
    fn json_ids() {
        assert_eq!(json!({"id": 3}).id_of("id"), Some(CandidateId::Number(3)));
        assert_eq!(
            json!({"id": "INV-1"}).id_of("id"),
            Some(CandidateId::Text("INV-1".into()))
        );
        assert_eq!(json!({"id": null}).id_of("id"), None);
    }

    #[test]
    fn default_id_parses_text() {
        assert_eq!(Sku("42", "Bolt").id_of("code"), Some(CandidateId::Number(42)));
        assert_eq!(Sku("B-42", "Bolt").id_of("code"), Some(CandidateId::Text("B-42".into())));
        assert_eq!(Sku("1", "Bolt").id_of("id"), None);
    }

    #[test]
    fn id_serde_is_untagged() {
        let ids: Vec<CandidateId> = serde_json::from_str(r#"[1, "x"]"#).expect("parse ids");
        assert_eq!(ids, vec![CandidateId::Number(1), CandidateId::Text("x".into())]);
        assert_eq!(CandidateId::Number(9).to_string(), "9");
    }

    #[test]
    fn display_text_defaults_to_empty() {
        let v = json!({"id": 1});
        assert_eq!(display_text(&v, "name"), "");
    }
}
