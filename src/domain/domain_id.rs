// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain identifier newtype.
//!
//! A [`DomainId`] names one configuration record. It is a *literal* when it names
//! a concrete host (`app.example.com`) and a *template* when it contains the
//! wildcard character `*` (`*.example.com`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The wildcard token that turns a domain identifier into a template.
pub const WILDCARD: char = '*';

/// A type-safe wrapper for domain identifiers.
///
/// # Examples
///
/// ```
/// use hsconfig::domain::DomainId;
///
/// let literal = DomainId::from("app.example.com");
/// let template = DomainId::from("*.example.com");
///
/// assert!(!literal.is_template());
/// assert!(template.is_template());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainId(String);

impl DomainId {
    /// Creates a new `DomainId` from a `String`.
    pub fn new(domain: String) -> Self {
        DomainId(domain)
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the `DomainId` into its inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns `true` if this identifier contains the wildcard and therefore
    /// names a template rather than a concrete host.
    pub fn is_template(&self) -> bool {
        self.0.contains(WILDCARD)
    }

    /// Returns `true` if this identifier names a concrete host.
    pub fn is_literal(&self) -> bool {
        !self.is_template()
    }
}

impl From<String> for DomainId {
    fn from(s: String) -> Self {
        DomainId(s)
    }
}

impl From<&str> for DomainId {
    fn from(s: &str) -> Self {
        DomainId(s.to_string())
    }
}

impl From<DomainId> for String {
    fn from(domain: DomainId) -> Self {
        domain.0
    }
}

impl AsRef<str> for DomainId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
