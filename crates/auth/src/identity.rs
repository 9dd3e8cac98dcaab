//! Identity of the signed-in console user.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use campuscard_core::GatewayResult;

use crate::{Permission, Role};

/// Who is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: i64,
    pub username: String,
}

/// Full permission view returned by the identity endpoint.
///
/// Missing lists are treated as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityInfo {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub menus: Vec<String>,
}

impl IdentityInfo {
    pub fn user(&self) -> UserIdentity {
        UserIdentity {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// Where the gate fetches identity from (the `/auth/me` endpoint in practice).
#[async_trait]
pub trait IdentitySource: Send + Sync {
    async fn fetch_identity(&self) -> GatewayResult<IdentityInfo>;
}
