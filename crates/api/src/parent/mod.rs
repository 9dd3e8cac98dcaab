//! Parent portal (WeChat mobile web) endpoints.

pub mod auth;

pub use auth::{BoundChild, PARENT_TOKEN_KEY, ParentProfile, ProfileUpdate};
