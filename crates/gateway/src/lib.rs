//! `campuscard-gateway`: HTTP gateway client shared by every portal.
//!
//! **Responsibility:** auth-header injection, response envelope normalization
//! and session-expiry signalling.
//!
//! The gateway is a thin shell around the backend API: it never retries and
//! never navigates. Navigation reacts to [`SessionSignal`]s through a
//! [`SessionObserver`].

pub mod client;
pub mod config;
pub mod observer;
pub mod path;
pub mod request;

pub use client::GatewayClient;
pub use config::{ConfigError, GatewayConfig, Portal};
pub use observer::{
    MemoryNavigator, Navigator, Notifier, SessionObserver, SessionSignal, TracingNotifier,
};
pub use path::PathNormalizer;
pub use request::{ApiRequest, RequestBody};
