//! Gateway configuration.

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use campuscard_core::{SessionContext, TokenRoute, TokenSlot};

pub const API_BASE_ENV: &str = "CAMPUSCARD_API_BASE";
pub const TIMEOUT_ENV: &str = "CAMPUSCARD_TIMEOUT_MS";

pub const DEFAULT_API_BASE: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API base URL '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },
}

/// Portal family served by a gateway instance.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Portal {
    /// Administrator back office.
    Admin,
    /// Parent and teacher mobile web.
    Wechat,
}

impl Portal {
    /// Token slot layout for this portal.
    pub fn token_layout(self) -> (Vec<TokenRoute>, Vec<TokenSlot>) {
        match self {
            Portal::Admin => SessionContext::admin_slots(),
            Portal::Wechat => SessionContext::wechat_slots(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub portal: Portal,
    pub base_url: Url,
    pub timeout: Duration,
    pub login_path: String,
}

impl GatewayConfig {
    pub fn new(portal: Portal, base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url.trim()).map_err(|e| ConfigError::InvalidBaseUrl {
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                value: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        Ok(Self {
            portal,
            base_url,
            timeout: DEFAULT_TIMEOUT,
            login_path: LOGIN_PATH.to_string(),
        })
    }

    pub fn admin(base_url: &str) -> Result<Self, ConfigError> {
        Self::new(Portal::Admin, base_url)
    }

    pub fn wechat(base_url: &str) -> Result<Self, ConfigError> {
        Self::new(Portal::Wechat, base_url)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    /// Read `CAMPUSCARD_API_BASE` / `CAMPUSCARD_TIMEOUT_MS`, falling back to
    /// defaults when unset or unparsable.
    pub fn from_env(portal: Portal) -> Result<Self, ConfigError> {
        let base = std::env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let config = Self::new(portal, &base)?;

        let timeout = match std::env::var(TIMEOUT_ENV) {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    tracing::warn!(value = %raw, "{TIMEOUT_ENV} is not a positive integer; using default");
                    DEFAULT_TIMEOUT
                }
            },
            Err(_) => DEFAULT_TIMEOUT,
        };

        Ok(config.with_timeout(timeout))
    }

    /// Fresh in-memory session laid out for this portal.
    pub fn in_memory_session(&self) -> SessionContext {
        let (routes, defaults) = self.portal.token_layout();
        SessionContext::in_memory(routes, defaults)
    }
}
