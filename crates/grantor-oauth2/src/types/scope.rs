//! Scope record and scope-set helpers.
//!
//! A scope is a named permission unit. The set of valid scope names is the
//! union of all stored `Scope` records. Requests carry scopes as a
//! space-delimited string (RFC 6749 section 3.3); entities carry them as an
//! order-irrelevant `Vec<String>`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A named permission unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    /// Unique scope name, e.g. `demoscope1`.
    pub name: String,
}

impl Scope {
    /// Creates a new scope record.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Splits a space-delimited scope parameter into individual names.
///
/// Empty input yields an empty set. Repeated whitespace is tolerated.
#[must_use]
pub fn parse_scope(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// Joins scope names back into the space-delimited wire format.
#[must_use]
pub fn join_scope(scope: &[String]) -> String {
    scope.join(" ")
}

/// Returns `true` if every name in `requested` appears in `granted`.
///
/// Order is irrelevant on both sides; an empty request is a subset of
/// anything.
#[must_use]
pub fn scope_is_subset(requested: &[String], granted: &[String]) -> bool {
    let granted: HashSet<&str> = granted.iter().map(String::as_str).collect();
    requested.iter().all(|name| granted.contains(name.as_str()))
}
