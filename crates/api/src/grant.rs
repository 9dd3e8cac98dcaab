//! Login shapes shared by the portals.

use serde::{Deserialize, Serialize};

use campuscard_core::{SessionContext, TokenSlot};

/// Token issued by any login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    pub token: String,
    /// Lifetime in seconds, as reported by the server.
    #[serde(default)]
    pub expire_in: i64,
}

impl TokenGrant {
    /// Put the token into `slot`.
    pub fn store(&self, session: &SessionContext, slot: &TokenSlot) {
        session.store_token(slot, &self.token);
        tracing::info!(slot = %slot.key, scope = ?slot.scope, "session token stored");
    }
}

/// SMS-code login used by the parent and teacher portals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneLogin {
    pub phone: String,
    pub code: String,
}

/// Links a WeChat open id to the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WechatBinding {
    pub open_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}
