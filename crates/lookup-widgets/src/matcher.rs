#![forbid(unsafe_code)]

//! Word-prefix matching.
//!
//! A query is split on whitespace into lowercase tokens. A candidate matches
//! when at least one of its search fields, split into lowercase words, has
//! every token as a prefix of some word in that field. Matching never
//! reorders: the filtered set keeps the order of the candidate list.
//!
//! ```
//! use lookup_widgets::matcher::{Matcher, ShortTokenPolicy};
//! use serde_json::json;
//!
//! let data = vec![
//!     json!({"id": 1, "name": "Apple"}),
//!     json!({"id": 2, "name": "Apricot"}),
//!     json!({"id": 3, "name": "Banana"}),
//! ];
//! let fields = vec!["name".to_string()];
//! let matcher = Matcher::new("ap", &fields, 1, ShortTokenPolicy::Reject);
//! assert_eq!(matcher.filter(&data), vec![0, 1]);
//! ```

use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;

/// What to do with query tokens shorter than the minimum search length.
///
/// Only relevant once the whole query meets the threshold, e.g. `"red x"`
/// with a threshold of 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortTokenPolicy {
    /// A short token can never be satisfied, so the query matches nothing.
    #[default]
    Reject,
    /// Short tokens are dropped before matching.
    Skip,
    /// Short tokens match as ordinary prefixes.
    Prefix,
}

/// True when the trimmed query has at least `min_len` characters.
#[inline]
#[must_use]
pub fn meets_threshold(query: &str, min_len: usize) -> bool {
    query.trim().chars().count() >= min_len
}

/// A compiled query ready to test candidates.
#[derive(Debug, Clone)]
pub struct Matcher<'f> {
    /// `None` when the query cannot match anything.
    tokens: Option<Vec<String>>,
    search_fields: &'f [String],
}

impl<'f> Matcher<'f> {
    /// Compile `query` against `search_fields`.
    pub fn new(
        query: &str,
        search_fields: &'f [String],
        min_len: usize,
        policy: ShortTokenPolicy,
    ) -> Self {
        let tokens = if meets_threshold(query, min_len) {
            Self::tokenize(query, min_len, policy)
        } else {
            None
        };
        Self {
            tokens,
            search_fields,
        }
    }

    /// Lowercase whitespace tokens of `query` after applying `policy`.
    ///
    /// Returns `None` when a short token makes the query unsatisfiable.
    pub fn tokenize(query: &str, min_len: usize, policy: ShortTokenPolicy) -> Option<Vec<String>> {
        let mut tokens = Vec::new();
        for token in query.split_whitespace() {
            let short = token.chars().count() < min_len;
            match (short, policy) {
                (true, ShortTokenPolicy::Reject) => return None,
                (true, ShortTokenPolicy::Skip) => continue,
                _ => tokens.push(token.to_lowercase()),
            }
        }
        Some(tokens)
    }

    /// Whether the query can match anything at all.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.tokens.is_some()
    }

    /// Test one candidate.
    ///
    /// A query with no tokens left (empty query under a zero threshold, or
    /// every token skipped) matches every candidate.
    pub fn matches<C: Candidate>(&self, candidate: &C) -> bool {
        let Some(tokens) = &self.tokens else {
            return false;
        };
        if tokens.is_empty() {
            return true;
        }
        self.search_fields.iter().any(|name| {
            candidate
                .field(name)
                .is_some_and(|text| field_matches(&text, tokens))
        })
    }

    /// Indices of matching candidates, in their original order.
    pub fn filter<C: Candidate>(&self, candidates: &[C]) -> Vec<usize> {
        if !self.is_active() {
            return Vec::new();
        }
        candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| self.matches(*c))
            .map(|(i, _)| i)
            .collect()
    }
}

fn field_matches(text: &str, tokens: &[String]) -> bool {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    tokens
        .iter()
        .all(|token| words.iter().any(|word| word.starts_with(token.as_str())))
}
