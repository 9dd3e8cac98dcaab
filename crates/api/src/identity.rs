use async_trait::async_trait;

use campuscard_auth::{IdentityInfo, IdentitySource};
use campuscard_core::GatewayResult;
use campuscard_gateway::GatewayClient;

/// Identity fetched from `/api/v1/auth/me` through the gateway.
#[derive(Clone)]
pub struct GatewayIdentitySource {
    client: GatewayClient,
}

impl GatewayIdentitySource {
    pub fn new(client: GatewayClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentitySource for GatewayIdentitySource {
    async fn fetch_identity(&self) -> GatewayResult<IdentityInfo> {
        crate::admin::auth::me(&self.client).await
    }
}
