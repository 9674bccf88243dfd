//! Core type definitions for compile-time safety.
//!
//! Newtype wrapper around the person identifier so a raw, unvalidated string
//! never reaches URL construction.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// `Planning Center` person identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
    /// Parse a user-supplied identifier.
    ///
    /// Surrounding whitespace is ignored. Empty identifiers and identifiers
    /// with characters that would need escaping in a URL path are rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let id = raw.trim();
        if id.is_empty() {
            return Err(Error::InvalidInput("Please enter Person ID".to_string()));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(Error::InvalidInput(format!("Invalid Person ID: {id:?}")));
        }
        Ok(Self(id.to_string()))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
