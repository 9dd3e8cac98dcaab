use serde::{Deserialize, Serialize};

use campuscard_core::{GatewayResult, TokenSlot};
use campuscard_gateway::GatewayClient;

use crate::{PhoneLogin, TokenGrant, WechatBinding};

/// Slot the parent token lives in.
pub const PARENT_TOKEN_KEY: &str = "wx_token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundChild {
    pub id: i64,
    pub name: String,
    pub class_id: i64,
    #[serde(default)]
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentProfile {
    pub parent_id: i64,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub school_name: Option<String>,
    #[serde(default)]
    pub bound_children: Vec<BoundChild>,
}

/// Partial profile update; `None` fields are left untouched server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

pub async fn login(client: &GatewayClient, req: &PhoneLogin) -> GatewayResult<TokenGrant> {
    client.post("/api/v1/auth/login", req).await
}

/// Log in and keep the token in the parent slot.
pub async fn login_and_store(client: &GatewayClient, req: &PhoneLogin) -> GatewayResult<TokenGrant> {
    let grant = login(client, req).await?;
    grant.store(client.session(), &TokenSlot::persistent(PARENT_TOKEN_KEY));
    Ok(grant)
}

pub async fn profile(client: &GatewayClient) -> GatewayResult<ParentProfile> {
    client.get("/api/v1/auth/profile", &[]).await
}

pub async fn bind_wechat(client: &GatewayClient, binding: &WechatBinding) -> GatewayResult<String> {
    client.post("/api/v1/auth/bind", binding).await
}

pub async fn update_profile(
    client: &GatewayClient,
    update: &ProfileUpdate,
) -> GatewayResult<ParentProfile> {
    client.put("/api/v1/auth/profile", update).await
}
