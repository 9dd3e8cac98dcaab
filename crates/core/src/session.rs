//! Client-side session state.
//!
//! One [`SessionContext`] exists per gateway instance and is shared (via `Arc`)
//! by the gateway, its observer and the permission gate. It owns:
//!
//! - the token slots, spread over a persistent and a session-scoped store;
//! - the routing table that picks slots by request path;
//! - the "redirected due to expiry" flag;
//! - the debounce timestamp of the last expiry notice.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, Utc};

use crate::storage::{KeyValueStore, MemoryStore};

/// Minimum gap between two user-visible session-expiry notices.
pub const NOTICE_DEBOUNCE: TimeDelta = TimeDelta::milliseconds(2000);

/// Session-scoped key set after an authentication failure.
pub const EXPIRY_FLAG_KEY: &str = "redirected_due_to_401";

/// Which store a slot lives in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StorageScope {
    /// Survives restarts ("remember me").
    Persistent,
    /// Dropped with the session.
    Session,
}

/// A named token slot in one of the two stores.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenSlot {
    pub key: String,
    pub scope: StorageScope,
}

impl TokenSlot {
    pub fn persistent(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            scope: StorageScope::Persistent,
        }
    }

    pub fn session(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            scope: StorageScope::Session,
        }
    }
}

/// Paths starting with `prefix` read their token from `slots`, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRoute {
    pub prefix: String,
    pub slots: Vec<TokenSlot>,
}

impl TokenRoute {
    pub fn new(prefix: impl Into<String>, slots: Vec<TokenSlot>) -> Self {
        Self {
            prefix: prefix.into(),
            slots,
        }
    }
}

/// Explicit, injectable session state.
pub struct SessionContext {
    persistent: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
    routes: Vec<TokenRoute>,
    default_slots: Vec<TokenSlot>,
    last_notice_at: Mutex<Option<DateTime<Utc>>>,
}

impl core::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionContext")
            .field("routes", &self.routes)
            .field("default_slots", &self.default_slots)
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    pub fn new(
        persistent: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
        routes: Vec<TokenRoute>,
        default_slots: Vec<TokenSlot>,
    ) -> Self {
        Self {
            persistent,
            session,
            routes,
            default_slots,
            last_notice_at: Mutex::new(None),
        }
    }

    /// Session with fresh in-memory stores for both scopes.
    pub fn in_memory(routes: Vec<TokenRoute>, default_slots: Vec<TokenSlot>) -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
            routes,
            default_slots,
        )
    }

    /// Admin console layout: `token`, persistent first, then session-scoped.
    pub fn admin_slots() -> (Vec<TokenRoute>, Vec<TokenSlot>) {
        (
            Vec::new(),
            vec![TokenSlot::persistent("token"), TokenSlot::session("token")],
        )
    }

    /// WeChat portal layout: teacher paths use `t_token`, the rest `wx_token`.
    pub fn wechat_slots() -> (Vec<TokenRoute>, Vec<TokenSlot>) {
        (
            vec![TokenRoute::new(
                "/api/v1/t/",
                vec![TokenSlot::persistent("t_token")],
            )],
            vec![TokenSlot::persistent("wx_token")],
        )
    }

    fn store(&self, scope: StorageScope) -> &dyn KeyValueStore {
        match scope {
            StorageScope::Persistent => self.persistent.as_ref(),
            StorageScope::Session => self.session.as_ref(),
        }
    }

    fn slots_for(&self, path: &str) -> &[TokenSlot] {
        self.routes
            .iter()
            .find(|route| path.starts_with(&route.prefix))
            .map(|route| route.slots.as_slice())
            .unwrap_or(&self.default_slots)
    }

    fn read(&self, slot: &TokenSlot) -> Option<String> {
        self.store(slot.scope)
            .get(&slot.key)
            .filter(|token| !token.is_empty())
    }

    /// Token to send with a request to `path`, if any.
    pub fn token_for(&self, path: &str) -> Option<String> {
        self.slots_for(path).iter().find_map(|slot| self.read(slot))
    }

    /// True when any default slot holds a token.
    pub fn has_token(&self) -> bool {
        self.default_slots.iter().any(|slot| self.read(slot).is_some())
    }

    pub fn store_token(&self, slot: &TokenSlot, token: &str) {
        self.store(slot.scope).set(&slot.key, token);
    }

    pub fn remove_token(&self, slot: &TokenSlot) {
        self.store(slot.scope).remove(&slot.key);
    }

    /// Every slot named by the routing table.
    pub fn all_slots(&self) -> impl Iterator<Item = &TokenSlot> {
        self.default_slots
            .iter()
            .chain(self.routes.iter().flat_map(|route| route.slots.iter()))
    }

    /// Remove every token slot. Idempotent.
    pub fn clear_tokens(&self) {
        for slot in self.all_slots() {
            self.store(slot.scope).remove(&slot.key);
        }
    }

    /// Session teardown after an authentication failure. Idempotent.
    pub fn mark_expired(&self) {
        self.clear_tokens();
        self.session.set(EXPIRY_FLAG_KEY, "1");
        tracing::info!("session tokens cleared after authentication failure");
    }

    /// Read and consume the "redirected due to expiry" flag.
    pub fn take_expiry_flag(&self) -> bool {
        let set = self.session.get(EXPIRY_FLAG_KEY).is_some();
        if set {
            self.session.remove(EXPIRY_FLAG_KEY);
        }
        set
    }

    /// Atomically decide whether an expiry notice may be shown at `now`.
    ///
    /// Returns true (and records `now`) if no notice was shown yet or at least
    /// [`NOTICE_DEBOUNCE`] has elapsed since the last one.
    pub fn try_claim_expiry_notice(&self, now: DateTime<Utc>) -> bool {
        let mut last = self.last_notice_at.lock().unwrap_or_else(|e| e.into_inner());
        let allowed = match *last {
            None => true,
            Some(prev) => now - prev >= NOTICE_DEBOUNCE,
        };
        if allowed {
            *last = Some(now);
        }
        allowed
    }
}
