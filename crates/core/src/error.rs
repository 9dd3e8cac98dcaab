//! Gateway error model.

use thiserror::Error;

use crate::envelope::{FORBIDDEN, UNAUTHENTICATED};

/// Result type returned by every gateway call.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Everything a gateway call can fail with.
///
/// Only `AuthExpired` and `Forbidden` carry side effects (session teardown and
/// notices); those are performed by the gateway before the error reaches the
/// caller. Unrecognized envelopes are not errors and never show up here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// No response was received (connect failure, timeout, truncated body).
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The server answered with a recognized envelope that reports failure.
    #[error("{message}")]
    Business { code: Option<i64>, message: String },

    /// The session is no longer valid (code 401).
    #[error("session expired: {message}")]
    AuthExpired { message: String },

    /// The session lacks the rights for this resource (code 403).
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    /// Non-success HTTP status other than 401/403.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The payload could not be decoded into the requested type.
    #[error("decode error: {message}")]
    Decode { message: String },
}

impl GatewayError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport {
            message: msg.into(),
        }
    }

    pub fn business(code: Option<i64>, msg: impl Into<String>) -> Self {
        Self::Business {
            code,
            message: msg.into(),
        }
    }

    pub fn auth_expired(msg: impl Into<String>) -> Self {
        Self::AuthExpired {
            message: msg.into(),
        }
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden {
            message: msg.into(),
        }
    }

    pub fn status(status: u16, msg: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: msg.into(),
        }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    /// Numeric code attached to the failure, if the server supplied one.
    ///
    /// Transport and decode failures never carry a code.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Business { code, .. } => *code,
            Self::AuthExpired { .. } => Some(UNAUTHENTICATED),
            Self::Forbidden { .. } => Some(FORBIDDEN),
            Self::Status { status, .. } => Some(i64::from(*status)),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }

    /// Human-readable message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Transport { message }
            | Self::Business { message, .. }
            | Self::AuthExpired { message }
            | Self::Forbidden { message }
            | Self::Status { message, .. }
            | Self::Decode { message } => message,
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
