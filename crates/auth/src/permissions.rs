
use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Suffix that turns a permission into a prefix grant (e.g. `"card:*"`).
pub const WILDCARD_SUFFIX: &str = ":*";

/// Permission code (e.g. `"card:recharge"`).
///
/// Codes are opaque strings. An entry ending in `:*` grants every code that
/// starts with the entry minus its trailing `*`, so `"card:*"` grants
/// `"card:recharge"` but not `"cards:list"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(code: impl Into<Cow<'static, str>>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str().ends_with(WILDCARD_SUFFIX)
    }

    /// Whether holding this permission allows `code`.
    pub fn grants(&self, code: &str) -> bool {
        if self.as_str() == code {
            return true;
        }
        match self.as_str().strip_suffix('*') {
            Some(prefix) if self.is_wildcard() => code.starts_with(prefix),
            _ => false,
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Permission {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl From<String> for Permission {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match() {
        let p = Permission::from("card:recharge");
        assert!(p.grants("card:recharge"));
        assert!(!p.grants("card:refund"));
        assert!(!p.is_wildcard());
    }

    #[test]
    fn wildcard_grants_codes_under_prefix() {
        let p = Permission::from("card:*");
        assert!(p.is_wildcard());
        assert!(p.grants("card:recharge"));
        assert!(p.grants("card:type:edit"));
        assert!(!p.grants("cards:list"));
        assert!(!p.grants("card"));
    }

    #[test]
    fn bare_star_is_not_a_wildcard() {
        let p = Permission::from("*");
        assert!(!p.is_wildcard());
        assert!(p.grants("*"));
        assert!(!p.grants("card:recharge"));
    }
}
