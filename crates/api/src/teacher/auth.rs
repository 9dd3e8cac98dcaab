use serde::{Deserialize, Serialize};
use serde_json::json;

use campuscard_core::{GatewayResult, TokenSlot};
use campuscard_gateway::GatewayClient;

use crate::teacher::ClassBrief;
use crate::{PhoneLogin, TokenGrant, WechatBinding};

pub const TEACHER_TOKEN_KEY: &str = "t_token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherProfile {
    pub teacher_id: i64,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub school_name: Option<String>,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub assigned_classes: Vec<ClassBrief>,
}

pub async fn login(client: &GatewayClient, req: &PhoneLogin) -> GatewayResult<TokenGrant> {
    client.post("/api/v1/t/auth/login", req).await
}

pub async fn bind_wechat(client: &GatewayClient, binding: &WechatBinding) -> GatewayResult<String> {
    client.post("/api/v1/t/auth/bind", binding).await
}

pub async fn profile(client: &GatewayClient) -> GatewayResult<TeacherProfile> {
    client.get("/api/v1/t/auth/profile", &[]).await
}

pub async fn update_password(
    client: &GatewayClient,
    old_password: Option<&str>,
    new_password: &str,
) -> GatewayResult<String> {
    let mut body = json!({ "newPassword": new_password });
    if let Some(old) = old_password {
        body["oldPassword"] = json!(old);
    }
    client.put("/api/v1/t/auth/password", &body).await
}

/// Sign out of the teacher portal; the teacher slot is cleared either way.
pub async fn logout(client: &GatewayClient) -> GatewayResult<String> {
    let result = client.post("/api/v1/t/auth/logout", &json!({})).await;
    client
        .session()
        .remove_token(&TokenSlot::persistent(TEACHER_TOKEN_KEY));
    result
}
