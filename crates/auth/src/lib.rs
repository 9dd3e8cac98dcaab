//! `campuscard-auth`: client-side permission gating.
//!
//! The server enforces every permission authoritatively; this crate only
//! decides what the client shows and where navigation may go. It is decoupled
//! from HTTP: identity arrives through the [`IdentitySource`] trait.

pub mod gate;
pub mod guard;
pub mod identity;
pub mod permissions;
pub mod roles;

pub use gate::{GateState, PermissionGate, PermissionSnapshot};
pub use guard::{GuardOutcome, RouteGuard};
pub use identity::{IdentityInfo, IdentitySource, UserIdentity};
pub use permissions::Permission;
pub use roles::Role;
