#![forbid(unsafe_code)]

//! Candidate record loading.
//!
//! Records are JSON arrays of objects. The bundled files under `data/` are
//! compiled in so the demo runs without arguments.

use std::fs;
use std::path::PathBuf;

use lookup::{Error, Result};
use serde_json::Value;

const BUNDLED_CUSTOMERS: &str = include_str!("../data/customers.json");
const BUNDLED_PRODUCTS: &str = include_str!("../data/products.json");

/// Where a field's records come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Compiled-in sample data.
    Bundled(&'static str),
    /// A JSON file on disk, re-read on every load.
    File(PathBuf),
}

impl DataSource {
    /// Customers from `path`, or the bundled sample.
    pub fn customers(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Bundled(BUNDLED_CUSTOMERS), Self::File)
    }

    /// Products from `path`, or the bundled sample.
    pub fn products(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Bundled(BUNDLED_PRODUCTS), Self::File)
    }

    /// Read and parse the records.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] when the file cannot be read, [`Error::Data`] when it is
    /// not a JSON array of objects.
    pub fn load(&self) -> Result<Vec<Value>> {
        match self {
            Self::Bundled(text) => parse_records(text, "bundled data"),
            Self::File(path) => {
                let text = fs::read_to_string(path)?;
                parse_records(&text, &path.display().to_string())
            }
        }
    }
}

/// Parse a JSON array of objects. `origin` names the source in errors.
pub fn parse_records(text: &str, origin: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|err| Error::Data(format!("{origin}: {err}")))?;
    let Value::Array(records) = value else {
        return Err(Error::Data(format!("{origin}: expected a JSON array")));
    };
    if let Some(pos) = records.iter().position(|r| !r.is_object()) {
        return Err(Error::Data(format!("{origin}: record {pos} is not an object")));
    }
    tracing::debug!(origin, count = records.len(), "records loaded");
    Ok(records)
}
