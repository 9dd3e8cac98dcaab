//! Request path normalization.
//!
//! Deployments that mount the API under a prefix (`http://host/api`) while
//! callers also spell that prefix (`/api/v1/...`) would otherwise hit
//! `/api/api/v1/...`.

use reqwest::Url;

/// Strips leading duplicates of the base URL's last path segment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathNormalizer {
    // "/api/" for a base ending in "/api"; `None` when the base has no path.
    duplicate_prefix: Option<String>,
}

impl PathNormalizer {
    pub fn from_base(base: &Url) -> Self {
        let segment = base
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last());

        Self {
            duplicate_prefix: segment.map(|s| format!("/{s}/")),
        }
    }

    /// Idempotent: `normalize(normalize(p)) == normalize(p)`.
    pub fn normalize<'a>(&self, path: &'a str) -> &'a str {
        let Some(prefix) = self.duplicate_prefix.as_deref() else {
            return path;
        };
        // Keep the slash that starts the remainder.
        let strip = prefix.len() - 1;
        let mut rest = path;
        while rest.starts_with(prefix) {
            rest = &rest[strip..];
        }
        rest
    }
}
