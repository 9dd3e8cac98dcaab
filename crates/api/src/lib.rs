//! Typed endpoint wrappers per portal, plus console wiring.
//!
//! Every wrapper is a thin function over [`GatewayClient`]: the gateway owns
//! headers, envelopes and session expiry, so these only name paths and shapes.
//!
//! [`GatewayClient`]: campuscard_gateway::GatewayClient

pub mod admin;
pub mod console;
pub mod grant;
pub mod identity;
pub mod page;
pub mod parent;
pub mod teacher;

pub use console::Console;
pub use grant::{PhoneLogin, TokenGrant, WechatBinding};
pub use identity::GatewayIdentitySource;
pub use page::Page;
