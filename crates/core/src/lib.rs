//! `campuscard-core`: protocol building blocks shared by every portal.
//!
//! This crate has no transport: it classifies response envelopes, defines the
//! error taxonomy and owns the client-side session state (token slots, expiry
//! flag, notice debounce).

pub mod envelope;
pub mod error;
pub mod session;
pub mod storage;

pub use envelope::{Classified, classify};
pub use error::{GatewayError, GatewayResult};
pub use session::{NOTICE_DEBOUNCE, SessionContext, StorageScope, TokenRoute, TokenSlot};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, StorageError};
