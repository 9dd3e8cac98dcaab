//! Administrator back office endpoints.

pub mod auth;
pub mod logs;

pub use auth::{ADMIN_TOKEN_KEY, AdminLogin, AdminProfile, ForgotCodeSent};
pub use logs::{DataChangeLog, DeviceOpLog, LogQuery, OpLog};
