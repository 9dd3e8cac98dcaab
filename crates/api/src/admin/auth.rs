//! Admin sign-in, profile and password recovery.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::json;

use campuscard_auth::IdentityInfo;
use campuscard_core::{GatewayResult, TokenSlot};
use campuscard_gateway::GatewayClient;

use crate::TokenGrant;

pub const ADMIN_TOKEN_KEY: &str = "token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminLogin {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotCodeSent {
    pub sent_at: i64,
    pub expire_in: i64,
    pub phone_masked: String,
}

#[derive(Deserialize)]
struct ResetOutcome {
    #[serde(default)]
    success: bool,
}

pub async fn login(client: &GatewayClient, req: &AdminLogin) -> GatewayResult<TokenGrant> {
    client.post("/api/v1/auth/login", req).await
}

/// Log in and keep the token: persistent when `remember`, session-scoped
/// otherwise. Any token left in the other scope is dropped.
pub async fn login_and_store(
    client: &GatewayClient,
    req: &AdminLogin,
    remember: bool,
) -> GatewayResult<TokenGrant> {
    let grant = login(client, req).await?;
    let session = client.session();
    session.clear_tokens();
    let slot = if remember {
        TokenSlot::persistent(ADMIN_TOKEN_KEY)
    } else {
        TokenSlot::session(ADMIN_TOKEN_KEY)
    };
    grant.store(session, &slot);
    Ok(grant)
}

/// Tell the server, then drop local tokens whatever it answered.
pub async fn logout(client: &GatewayClient) -> GatewayResult<()> {
    let result = client
        .post::<IgnoredAny, _>("/api/v1/auth/logout", &json!({}))
        .await;
    client.session().clear_tokens();
    result.map(|_| ())
}

pub async fn profile(client: &GatewayClient, username: &str) -> GatewayResult<AdminProfile> {
    client
        .get("/api/v1/auth/profile", &[("username", username.to_string())])
        .await
}

/// Full permission view of the signed-in user.
pub async fn me(client: &GatewayClient) -> GatewayResult<IdentityInfo> {
    client.get("/api/v1/auth/me", &[]).await
}

pub async fn reset_password_by_id(
    client: &GatewayClient,
    id: i64,
    new_password: &str,
) -> GatewayResult<()> {
    client
        .put::<IgnoredAny, _>(
            &format!("/api/v1/users/{id}/password"),
            &json!({ "newPassword": new_password }),
        )
        .await
        .map(|_| ())
}

pub async fn send_forgot_code(client: &GatewayClient, username: &str) -> GatewayResult<ForgotCodeSent> {
    client
        .post("/api/v1/auth/forgot/send-code", &json!({ "username": username }))
        .await
}

/// Returns whether the server accepted the code.
pub async fn reset_password_with_code(
    client: &GatewayClient,
    username: &str,
    code: &str,
    new_password: &str,
) -> GatewayResult<bool> {
    let outcome: ResetOutcome = client
        .post(
            "/api/v1/auth/forgot/reset",
            &json!({ "username": username, "code": code, "newPassword": new_password }),
        )
        .await?;
    Ok(outcome.success)
}
