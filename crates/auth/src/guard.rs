//! Navigation guard consulted before entering a route.

use crate::PermissionGate;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

pub const NO_PAGE_ACCESS_NOTICE: &str = "no access to this page";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Proceed,
    Redirect {
        to: String,
        notice: Option<&'static str>,
    },
}

/// Decides whether navigation to a route may proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    login_path: String,
    fallback_path: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(LOGIN_PATH, DASHBOARD_PATH)
    }
}

impl RouteGuard {
    pub fn new(login_path: impl Into<String>, fallback_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            fallback_path: fallback_path.into(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// - the login route is always reachable, even with a stale token;
    /// - without a token everything else redirects to login;
    /// - routes that require auth are menu-checked once the gate has loaded.
    pub fn check(
        &self,
        target_path: &str,
        requires_auth: bool,
        has_token: bool,
        gate: &PermissionGate,
    ) -> GuardOutcome {
        if target_path == self.login_path {
            return GuardOutcome::Proceed;
        }
        if !has_token {
            return GuardOutcome::Redirect {
                to: self.login_path.clone(),
                notice: None,
            };
        }
        if requires_auth && gate.is_loaded() && !gate.allow_menu(Some(target_path)) {
            tracing::debug!(path = target_path, "route blocked by menu permissions");
            return GuardOutcome::Redirect {
                to: self.fallback_path.clone(),
                notice: Some(NO_PAGE_ACCESS_NOTICE),
            };
        }
        GuardOutcome::Proceed
    }
}
