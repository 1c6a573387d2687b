// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wildcard matching for template domains.
//!
//! Only `*` is special: it matches any run of characters, including an empty
//! one. Every other character, including `?`, `[` and `{`, must match itself.
//! Matching is case-sensitive and always spans the whole candidate.

use crate::domain::domain_id::WILDCARD;
use globset::{GlobBuilder, GlobMatcher};

/// A compiled wildcard pattern.
///
/// # Examples
///
/// ```
/// use hsconfig::domain::glob::Pattern;
///
/// let pattern = Pattern::new("*.example.com");
/// assert!(pattern.matches("a.example.com"));
/// assert!(!pattern.matches("example.com"));
/// ```
#[derive(Clone, Debug)]
pub struct Pattern {
    source: String,
    matcher: Option<GlobMatcher>,
}

impl Pattern {
    /// Compiles a wildcard pattern.
    pub fn new(pattern: &str) -> Self {
        let matcher = GlobBuilder::new(&escape(pattern))
            .literal_separator(false)
            .backslash_escape(true)
            .case_insensitive(false)
            .build()
            .map(|glob| glob.compile_matcher());

        let matcher = match matcher {
            Ok(matcher) => Some(matcher),
            Err(e) => {
                // Escaping leaves only `*` special, so this is never expected.
                tracing::warn!("Failed to compile pattern '{}': {}", pattern, e);
                None
            }
        };

        Self {
            source: pattern.to_string(),
            matcher,
        }
    }

    /// Returns the pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns `true` if `candidate` matches this pattern.
    pub fn matches(&self, candidate: &str) -> bool {
        match &self.matcher {
            Some(matcher) => matcher.is_match(candidate),
            None => self.source == candidate,
        }
    }
}

/// Returns `true` if `candidate` matches the wildcard `pattern`.
///
/// Without a `*` the pattern requires exact equality.
pub fn matches(pattern: &str, candidate: &str) -> bool {
    if !pattern.contains(WILDCARD) {
        return pattern == candidate;
    }
    Pattern::new(pattern).matches(candidate)
}

/// Rewrites a wildcard pattern into globset syntax.
///
/// Runs of `*` collapse into one (globset rejects `**` next to other
/// characters) and every other glob metacharacter is backslash-escaped.
fn escape(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut previous_was_wildcard = false;
    for c in pattern.chars() {
        if c == WILDCARD {
            if !previous_was_wildcard {
                out.push(c);
            }
            previous_was_wildcard = true;
            continue;
        }
        previous_was_wildcard = false;
        if matches!(c, '?' | '[' | ']' | '{' | '}' | '\\' | '!' | ',') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
